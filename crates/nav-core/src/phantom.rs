//! Snapped query locations.

use crate::{FixedPointCoordinate, NameId};

/// Zoom level handed to the spatial index on every nearest-neighbor query.
///
/// Below [`ZoomLevel::TINY_COMPONENT_CUTOFF`] the index ignores segments that
/// belong to tiny connected components, so a coarse click never snaps onto
/// an isolated fragment of road.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoomLevel(pub u32);

impl ZoomLevel {
    /// The index's calibrated operating point.
    pub const DEFAULT: ZoomLevel = ZoomLevel(18);

    /// Lowest zoom at which tiny-component segments are candidates.
    pub const TINY_COMPONENT_CUTOFF: ZoomLevel = ZoomLevel(14);

    #[inline]
    pub fn admits_tiny_components(self) -> bool {
        self >= Self::TINY_COMPONENT_CUTOFF
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A query coordinate spliced onto a graph segment.
///
/// `weight1` is the share of the segment weight from its start to
/// `location`; `weight2` is the remainder.  Routing seeds its forward and
/// reverse searches with these offsets.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhantomNode {
    /// Edge-based node id of the snapped segment.
    pub edge_based_node: u32,
    pub name_id: NameId,
    pub weight1: u32,
    pub weight2: u32,
    /// Position of `location` along the segment, `0.0` at the start.
    pub ratio: f64,
    /// Projection of the query coordinate onto the segment.
    pub location: FixedPointCoordinate,
    pub segment_start: FixedPointCoordinate,
    pub segment_end: FixedPointCoordinate,
}

impl PhantomNode {
    /// Bearing of the snapped segment in its stored direction.
    pub fn bearing(&self) -> f64 {
        self.segment_start.bearing_to(self.segment_end)
    }

    /// `true` if the two phantoms lie on the same segment.
    pub fn same_segment(&self, other: &PhantomNode) -> bool {
        self.edge_based_node == other.edge_based_node
    }
}
