//! Turn-instruction codes attached to original edges.
//!
//! The numeric values are part of the on-disk metadata format and must not
//! be renumbered.

use thiserror::Error;

/// Maneuver performed when entering an original edge.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TurnInstruction {
    #[default]
    NoTurn = 0,
    GoStraight = 1,
    TurnSlightRight = 2,
    TurnRight = 3,
    TurnSharpRight = 4,
    UTurn = 5,
    TurnSharpLeft = 6,
    TurnLeft = 7,
    TurnSlightLeft = 8,
    ReachViaPoint = 9,
    HeadOn = 10,
    EnterRoundAbout = 11,
    LeaveRoundAbout = 12,
    StayOnRoundAbout = 13,
    StartAtEndOfStreet = 14,
    ReachedYourDestination = 15,
    EnterAgainstAllowedDirection = 16,
    LeaveAgainstAllowedDirection = 17,
}

/// A byte that does not name any [`TurnInstruction`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Error)]
#[error("unknown turn instruction code {0}")]
pub struct UnknownTurnInstruction(pub u8);

impl TurnInstruction {
    const ALL: [TurnInstruction; 18] = [
        TurnInstruction::NoTurn,
        TurnInstruction::GoStraight,
        TurnInstruction::TurnSlightRight,
        TurnInstruction::TurnRight,
        TurnInstruction::TurnSharpRight,
        TurnInstruction::UTurn,
        TurnInstruction::TurnSharpLeft,
        TurnInstruction::TurnLeft,
        TurnInstruction::TurnSlightLeft,
        TurnInstruction::ReachViaPoint,
        TurnInstruction::HeadOn,
        TurnInstruction::EnterRoundAbout,
        TurnInstruction::LeaveRoundAbout,
        TurnInstruction::StayOnRoundAbout,
        TurnInstruction::StartAtEndOfStreet,
        TurnInstruction::ReachedYourDestination,
        TurnInstruction::EnterAgainstAllowedDirection,
        TurnInstruction::LeaveAgainstAllowedDirection,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// `true` for the three roundabout maneuvers.
    pub fn is_roundabout(self) -> bool {
        matches!(
            self,
            TurnInstruction::EnterRoundAbout
                | TurnInstruction::LeaveRoundAbout
                | TurnInstruction::StayOnRoundAbout
        )
    }

    /// `true` if a driver has to be told about this edge at all.
    pub fn is_maneuver(self) -> bool {
        !matches!(self, TurnInstruction::NoTurn | TurnInstruction::GoStraight)
    }
}

impl TryFrom<u8> for TurnInstruction {
    type Error = UnknownTurnInstruction;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        TurnInstruction::ALL
            .get(code as usize)
            .copied()
            .ok_or(UnknownTurnInstruction(code))
    }
}

impl From<TurnInstruction> for u8 {
    #[inline]
    fn from(t: TurnInstruction) -> u8 {
        t.code()
    }
}
