//! `nav-core` — foundational types for the `nav-*` routing data crates.
//!
//! This crate is a dependency of every other `nav-*` crate.  It has no
//! `nav-*` dependencies and only `thiserror` and `bytemuck` (plus optional
//! `serde`) from the outside.
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `NodeId`, `EdgeId`, `OriginalEdgeId`, `NameId`             |
//! | [`geo`]     | `FixedPointCoordinate`, haversine distance, bearing        |
//! | [`turn`]    | `TurnInstruction` codes                                    |
//! | [`phantom`] | `PhantomNode`, `ZoomLevel`                                 |
//! | [`codec`]   | `Record`, `RecordCursor`, `read_record`                    |
//! | [`error`]   | `DataError`, `DataResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod codec;
pub mod error;
pub mod geo;
pub mod ids;
pub mod phantom;
pub mod turn;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use codec::{read_record, Record, RecordCursor};
pub use error::{DataError, DataResult};
pub use geo::{FixedPointCoordinate, COORDINATE_PRECISION};
pub use ids::{EdgeId, NameId, NodeId, OriginalEdgeId};
pub use phantom::{PhantomNode, ZoomLevel};
pub use turn::{TurnInstruction, UnknownTurnInstruction};
