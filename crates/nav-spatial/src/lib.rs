//! `nav-spatial` — nearest-neighbor lookups over road segments.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`records`] | Packed `SegmentRecord` / `PageRecord`, decoded `EdgeSegment` |
//! | [`rtree`]   | `StaticRTree`: RAM page directory plus on-disk leaf file  |
//!
//! The facade only sees the [`SpatialIndex`] trait, so a different index
//! backend can be slotted in without touching the graph side.
//!
//! With the `serde` feature, [`EdgeSegment`] derives `Serialize`/`Deserialize`.

pub mod records;
pub mod rtree;


use nav_core::{DataResult, FixedPointCoordinate, PhantomNode, ZoomLevel};

pub use records::{EdgeSegment, PageRecord, SegmentRecord};
pub use rtree::StaticRTree;

/// Read-only nearest-neighbor queries.
///
/// Both methods return `Ok(None)` when no segment qualifies, which happens
/// for an empty index or when every segment is filtered out by `zoom`.
pub trait SpatialIndex: Send + Sync {
    /// The segment endpoint closest to `query`.
    fn nearest_endpoint(
        &self,
        query: FixedPointCoordinate,
        zoom: ZoomLevel,
    ) -> DataResult<Option<FixedPointCoordinate>>;

    /// `query` projected onto the closest segment, with the segment weight
    /// split at the projection point.
    fn nearest_phantom(
        &self,
        query: FixedPointCoordinate,
        zoom: ZoomLevel,
    ) -> DataResult<Option<PhantomNode>>;
}
