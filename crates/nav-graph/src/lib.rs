//! `nav-graph` — the contracted routing graph and its per-edge metadata.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`records`]  | Packed on-disk record layouts                                |
//! | [`graph`]    | `GraphSnapshot` trait, `StaticGraph` (CSR), `QueryEdgeData`  |
//! | [`hsgr`]     | Topology file loader/writer                                  |
//! | [`metadata`] | Coordinate list and original-edge table loaders/writers      |
//!
//! Errors are reported as [`nav_core::DataError`].
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                          |
//! |---------|-----------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on `QueryEdgeData`, `OriginalEdgeTable` |

pub mod graph;
pub mod hsgr;
pub mod metadata;
pub mod records;


pub use graph::{EdgePayload, GraphSnapshot, QueryEdgeData, StagedEdge, StaticGraph, StaticGraphBuilder};
pub use hsgr::{load_hsgr, write_hsgr, LoadedGraph};
pub use metadata::{
    load_node_and_edge_information, load_node_coordinates, load_original_edges,
    write_node_coordinates, write_original_edges, NodeAndEdgeData, OriginalEdgeTable,
};
