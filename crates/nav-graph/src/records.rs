//! On-disk record layouts for the topology and metadata files.
//!
//! All records are packed and in native byte order: the files are an
//! offline-preprocessing-to-server contract on the same machine class, not a
//! portable interchange format.

use bytemuck::{Pod, Zeroable};

use nav_core::{FixedPointCoordinate, Record};

/// One entry of the node-coordinate file.
#[derive(Copy, Clone, Pod, Zeroable)]
#[repr(C, packed)]
pub struct NodeRecord {
    pub lat: i32,
    pub lon: i32,
}

impl Record for NodeRecord {}

impl From<NodeRecord> for FixedPointCoordinate {
    #[inline]
    fn from(r: NodeRecord) -> Self {
        FixedPointCoordinate::new(r.lat, r.lon)
    }
}

impl From<FixedPointCoordinate> for NodeRecord {
    #[inline]
    fn from(c: FixedPointCoordinate) -> Self {
        NodeRecord { lat: c.lat, lon: c.lon }
    }
}

/// One entry of the original-edge metadata file.
#[derive(Copy, Clone, Pod, Zeroable)]
#[repr(C, packed)]
pub struct OriginalEdgeRecord {
    pub via_node:         u32,
    pub name_id:          u32,
    pub turn_instruction: u8,
}

impl Record for OriginalEdgeRecord {}

/// CSR row pointer entry of the topology file.
#[derive(Copy, Clone, Pod, Zeroable)]
#[repr(C, packed)]
pub struct GraphNodeRecord {
    pub first_edge: u32,
}

impl Record for GraphNodeRecord {}

/// Payload of a contracted-graph edge as stored after its target id.
#[derive(Copy, Clone, Pod, Zeroable)]
#[repr(C, packed)]
pub struct QueryEdgeRecord {
    pub distance: u32,
    pub id:       u32,
    pub flags:    u8,
}

impl Record for QueryEdgeRecord {}

impl QueryEdgeRecord {
    pub const SHORTCUT: u8 = 0b001;
    pub const FORWARD:  u8 = 0b010;
    pub const BACKWARD: u8 = 0b100;
}
