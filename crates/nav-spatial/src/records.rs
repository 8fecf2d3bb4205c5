//! On-disk record layouts of the two index files.

use bytemuck::{Pod, Zeroable};

use nav_core::{FixedPointCoordinate, NameId, Record};

/// One road segment in the leaf file.
#[derive(Copy, Clone, Pod, Zeroable)]
#[repr(C, packed)]
pub struct SegmentRecord {
    pub id:      u32,
    pub lat1:    i32,
    pub lon1:    i32,
    pub lat2:    i32,
    pub lon2:    i32,
    pub name_id: u32,
    pub weight:  u32,
    pub flags:   u8,
}

impl Record for SegmentRecord {}

impl SegmentRecord {
    pub const TINY_COMPONENT: u8 = 0b1;
}

/// One leaf page in the RAM directory: its bounding box and the range of
/// segments it covers in the leaf file.
#[derive(Copy, Clone, Pod, Zeroable)]
#[repr(C, packed)]
pub struct PageRecord {
    pub min_lat: i32,
    pub min_lon: i32,
    pub max_lat: i32,
    pub max_lon: i32,
    pub first:   u32,
    pub count:   u32,
}

impl Record for PageRecord {}

/// A decoded leaf segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeSegment {
    /// Edge-based node id the segment belongs to.
    pub id:                u32,
    pub start:             FixedPointCoordinate,
    pub end:               FixedPointCoordinate,
    pub name_id:           NameId,
    pub weight:            u32,
    pub in_tiny_component: bool,
}

impl From<SegmentRecord> for EdgeSegment {
    fn from(r: SegmentRecord) -> Self {
        EdgeSegment {
            id:                r.id,
            start:             FixedPointCoordinate::new(r.lat1, r.lon1),
            end:               FixedPointCoordinate::new(r.lat2, r.lon2),
            name_id:           NameId(r.name_id),
            weight:            r.weight,
            in_tiny_component: r.flags & SegmentRecord::TINY_COMPONENT != 0,
        }
    }
}

impl From<&EdgeSegment> for SegmentRecord {
    fn from(s: &EdgeSegment) -> Self {
        SegmentRecord {
            id:      s.id,
            lat1:    s.start.lat,
            lon1:    s.start.lon,
            lat2:    s.end.lat,
            lon2:    s.end.lon,
            name_id: s.name_id.0,
            weight:  s.weight,
            flags:   if s.in_tiny_component { SegmentRecord::TINY_COMPONENT } else { 0 },
        }
    }
}
