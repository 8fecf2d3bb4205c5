//! Topology file (`.hsgr`) loader and writer.
//!
//! # File layout
//!
//! ```text
//! [checksum: u32]
//! [node_count: u32]
//! [GraphNodeRecord; node_count + 1]      CSR row pointer, last entry = edge_count
//! [edge_count: u32]
//! [(target: u32, E::Record); edge_count]
//! ```
//!
//! Everything is native byte order.  The whole file is read into memory and
//! walked with a [`RecordCursor`], so a truncated or padded file is reported
//! as `CorruptData` before any per-record allocation happens.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use nav_core::{DataError, DataResult, NodeId, Record, RecordCursor};

use crate::graph::{EdgePayload, GraphSnapshot, StagedEdge, StaticGraph};
use crate::records::GraphNodeRecord;

/// Result of [`load_hsgr`]: the graph plus the values the caller
/// cross-checks against the other preprocessed files.
#[derive(Debug)]
pub struct LoadedGraph<E> {
    pub graph:      StaticGraph<E>,
    pub checksum:   u32,
    pub node_count: u32,
}

/// Load a topology file into a [`StaticGraph`].
///
/// # Errors
///
/// - [`DataError::MissingInput`] if `path` does not exist.
/// - [`DataError::CorruptData`] if the file is truncated, has trailing
///   bytes, or its row pointer / edge targets are inconsistent.
///
/// # Panics
///
/// If the staging buffers are not fully drained into the graph.  That is a
/// loader bug, not a data error.
pub fn load_hsgr<E: EdgePayload>(path: &Path) -> DataResult<LoadedGraph<E>> {
    let data = fs::read(path).map_err(|e| DataError::from_open(path, e))?;
    let mut cur = RecordCursor::new(&data, path);

    let checksum   = cur.read_u32("checksum")?;
    let node_count = cur.read_u32("node count")?;

    let row_len = node_count as usize + 1;
    let node_bytes = cur.take(row_len, GraphNodeRecord::SIZE, "node array")?;
    let mut staged_nodes: Vec<u32> = node_bytes
        .chunks_exact(GraphNodeRecord::SIZE)
        .map(|c| GraphNodeRecord::decode(c).first_edge)
        .collect();

    let edge_count = cur.read_u32("edge count")?;
    let edge_size  = 4 + <E::Record as Record>::SIZE;
    let edge_bytes = cur.take(edge_count as usize, edge_size, "edge array")?;
    cur.finish()?;

    check_row_pointer(&staged_nodes, edge_count, path)?;

    let mut staged_edges: Vec<StagedEdge<E>> = Vec::with_capacity(edge_count as usize);
    for (i, chunk) in edge_bytes.chunks_exact(edge_size).enumerate() {
        let target = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        if target >= node_count {
            return Err(DataError::corrupt(
                path,
                format!("edge {i} targets node {target} but the graph has {node_count} nodes"),
            ));
        }
        let data = E::from_record(<E::Record as Record>::decode(&chunk[4..]));
        staged_edges.push(StagedEdge { target: NodeId(target), data });
    }

    let graph = StaticGraph::from_staging(&mut staged_nodes, &mut staged_edges);
    assert!(staged_nodes.is_empty(), "node list not flushed");
    assert!(staged_edges.is_empty(), "edge list not flushed");

    debug!(nodes = node_count, edges = edge_count, "loaded topology");
    info!("data checksum is {checksum}");

    Ok(LoadedGraph { graph, checksum, node_count })
}

/// The row pointer must start at 0, never decrease, and end at `edge_count`.
fn check_row_pointer(first_edge: &[u32], edge_count: u32, path: &Path) -> DataResult<()> {
    if first_edge.first().copied() != Some(0) {
        return Err(DataError::corrupt(path, "first node does not start at edge 0"));
    }
    if let Some(i) = first_edge.windows(2).position(|w| w[0] > w[1]) {
        return Err(DataError::corrupt(
            path,
            format!("edge offsets decrease between node {i} and node {}", i + 1),
        ));
    }
    match first_edge.last().copied() {
        Some(sentinel) if sentinel == edge_count => Ok(()),
        sentinel => Err(DataError::corrupt(
            path,
            format!(
                "node array sentinel {} does not match edge count {edge_count}",
                sentinel.unwrap_or(0)
            ),
        )),
    }
}

/// Write `graph` in the layout [`load_hsgr`] reads.
pub fn write_hsgr<E: EdgePayload>(graph: &StaticGraph<E>, checksum: u32, path: &Path) -> DataResult<()> {
    let file = fs::File::create(path).map_err(|e| DataError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let io = |e| DataError::io(path, e);

    out.write_all(&checksum.to_ne_bytes()).map_err(io)?;
    out.write_all(&(graph.node_count() as u32).to_ne_bytes()).map_err(io)?;
    for &first_edge in graph.first_edges() {
        out.write_all(GraphNodeRecord { first_edge }.encode()).map_err(io)?;
    }
    out.write_all(&(graph.edge_count() as u32).to_ne_bytes()).map_err(io)?;
    for e in 0..graph.edge_count() as u32 {
        let edge = nav_core::EdgeId(e);
        out.write_all(&graph.target(edge).0.to_ne_bytes()).map_err(io)?;
        out.write_all(graph.edge_data(edge).to_record().encode()).map_err(io)?;
    }
    out.flush().map_err(io)
}
