//! Immutable contracted routing graph.
//!
//! # Data layout
//!
//! [`StaticGraph`] stores outgoing edges in **Compressed Sparse Row (CSR)**
//! form.  The outgoing edges of `NodeId n` are the `EdgeId`s
//!
//! ```text
//! first_edge[n] .. first_edge[n + 1]
//! ```
//!
//! Topology (`first_edge`, `targets`) is kept apart from the payload array
//! (`edge_data`) so a search that only walks targets never pulls payload
//! bytes into cache.
//!
//! # Pluggability
//!
//! The facade reads the graph through the [`GraphSnapshot`] trait, so a
//! backend that keeps these arrays somewhere else (shared memory, a memory
//! map) can stand in for [`StaticGraph`] without touching query code.

use nav_core::{EdgeId, NodeId};

use crate::records::QueryEdgeRecord;

// ── Edge payloads ─────────────────────────────────────────────────────────────

/// Per-edge payload stored in the topology file after each edge's target.
///
/// The graph layer treats the payload as opaque apart from [`weight`], which
/// breaks ties when several parallel edges connect the same pair of nodes.
///
/// [`weight`]: EdgePayload::weight
pub trait EdgePayload: Sized {
    /// Fixed-size on-disk form.
    type Record: nav_core::Record;

    fn from_record(record: Self::Record) -> Self;
    fn to_record(&self) -> Self::Record;
    fn weight(&self) -> u32;
}

/// Payload of a contracted query graph edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryEdgeData {
    /// Edge weight (travel time in deciseconds).
    pub distance: u32,
    /// Middle node for shortcuts, original edge id otherwise.
    pub id:       u32,
    pub shortcut: bool,
    pub forward:  bool,
    pub backward: bool,
}

impl EdgePayload for QueryEdgeData {
    type Record = QueryEdgeRecord;

    fn from_record(r: QueryEdgeRecord) -> Self {
        let flags = r.flags;
        QueryEdgeData {
            distance: r.distance,
            id:       r.id,
            shortcut: flags & QueryEdgeRecord::SHORTCUT != 0,
            forward:  flags & QueryEdgeRecord::FORWARD != 0,
            backward: flags & QueryEdgeRecord::BACKWARD != 0,
        }
    }

    fn to_record(&self) -> QueryEdgeRecord {
        let mut flags = 0;
        if self.shortcut { flags |= QueryEdgeRecord::SHORTCUT; }
        if self.forward  { flags |= QueryEdgeRecord::FORWARD; }
        if self.backward { flags |= QueryEdgeRecord::BACKWARD; }
        QueryEdgeRecord { distance: self.distance, id: self.id, flags }
    }

    #[inline]
    fn weight(&self) -> u32 {
        self.distance
    }
}

// ── GraphSnapshot trait ───────────────────────────────────────────────────────

/// Read access to an immutable directed graph with per-edge payloads.
///
/// Node and edge ids passed in must be in range; out-of-range ids panic, as
/// they would on a slice.
pub trait GraphSnapshot {
    type EdgeData: EdgePayload;

    fn node_count(&self) -> usize;
    fn edge_count(&self) -> usize;

    /// First outgoing edge of `node`.
    fn begin_edges(&self, node: NodeId) -> EdgeId;

    /// One past the last outgoing edge of `node`.
    fn end_edges(&self, node: NodeId) -> EdgeId;

    fn target(&self, edge: EdgeId) -> NodeId;
    fn edge_data(&self, edge: EdgeId) -> &Self::EdgeData;

    /// Mutable payload access for in-place weight updates.  Callers that
    /// share the graph across threads must synchronise this themselves.
    fn edge_data_mut(&mut self, edge: EdgeId) -> &mut Self::EdgeData;

    #[inline]
    fn out_degree(&self, node: NodeId) -> usize {
        (self.end_edges(node).0 - self.begin_edges(node).0) as usize
    }

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    fn edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        (self.begin_edges(node).0..self.end_edges(node).0).map(EdgeId)
    }

    /// The lightest edge `from → to`, or `None` if the nodes are not
    /// adjacent in that direction.
    fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.edges(from)
            .filter(|&e| self.target(e) == to)
            .min_by_key(|&e| self.edge_data(e).weight())
    }

    /// `find_edge(from, to)`, falling back to `find_edge(to, from)`.
    fn find_edge_either_direction(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.find_edge(from, to).or_else(|| self.find_edge(to, from))
    }

    /// Like [`find_edge_either_direction`], also reporting whether the edge
    /// was found in the reverse (`to → from`) direction.
    ///
    /// [`find_edge_either_direction`]: GraphSnapshot::find_edge_either_direction
    fn find_edge_indicate_if_reverse(&self, from: NodeId, to: NodeId) -> Option<(EdgeId, bool)> {
        match self.find_edge(from, to) {
            Some(e) => Some((e, false)),
            None => self.find_edge(to, from).map(|e| (e, true)),
        }
    }
}

// ── StaticGraph ───────────────────────────────────────────────────────────────

/// CSR graph with owned arrays.
///
/// Built either from the staging buffers of the topology loader
/// ([`StaticGraph::from_staging`]) or from an edge list
/// ([`StaticGraphBuilder`]).
#[derive(Clone, Debug)]
pub struct StaticGraph<E> {
    /// CSR row pointer.  Length = `node_count + 1`.
    first_edge: Vec<u32>,
    /// Target node of each edge.
    targets:    Vec<NodeId>,
    /// Payload of each edge.
    edge_data:  Vec<E>,
}

/// An edge waiting in a loader's staging buffer.
#[derive(Clone, Debug)]
pub struct StagedEdge<E> {
    pub target: NodeId,
    pub data:   E,
}

impl<E: EdgePayload> StaticGraph<E> {
    /// Move the contents of the staging buffers into a new graph.
    ///
    /// Both buffers are drained; the caller can check they are empty
    /// afterwards.  `first_edge` must already be a valid row pointer for
    /// `edges` (length `node_count + 1`, non-decreasing, ending at
    /// `edges.len()`).
    pub fn from_staging(first_edge: &mut Vec<u32>, edges: &mut Vec<StagedEdge<E>>) -> Self {
        debug_assert!(!first_edge.is_empty());
        debug_assert_eq!(first_edge.last().copied().unwrap_or(0) as usize, edges.len());

        let first_edge: Vec<u32> = first_edge.drain(..).collect();
        let (targets, edge_data): (Vec<NodeId>, Vec<E>) =
            edges.drain(..).map(|e| (e.target, e.data)).unzip();

        StaticGraph { first_edge, targets, edge_data }
    }

    /// Raw CSR row pointer, as written to the topology file.
    pub fn first_edges(&self) -> &[u32] {
        &self.first_edge
    }
}

impl<E: EdgePayload> GraphSnapshot for StaticGraph<E> {
    type EdgeData = E;

    #[inline]
    fn node_count(&self) -> usize {
        self.first_edge.len().saturating_sub(1)
    }

    #[inline]
    fn edge_count(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    fn begin_edges(&self, node: NodeId) -> EdgeId {
        EdgeId(self.first_edge[node.index()])
    }

    #[inline]
    fn end_edges(&self, node: NodeId) -> EdgeId {
        EdgeId(self.first_edge[node.index() + 1])
    }

    #[inline]
    fn target(&self, edge: EdgeId) -> NodeId {
        self.targets[edge.index()]
    }

    #[inline]
    fn edge_data(&self, edge: EdgeId) -> &E {
        &self.edge_data[edge.index()]
    }

    #[inline]
    fn edge_data_mut(&mut self, edge: EdgeId) -> &mut E {
        &mut self.edge_data[edge.index()]
    }
}

// ── StaticGraphBuilder ────────────────────────────────────────────────────────

/// Collect directed edges in any order, then call [`build`](Self::build).
///
/// Used by preprocessing tools and tests to produce graphs that are then
/// written with [`crate::write_hsgr`].
///
/// # Example
///
/// ```
/// use nav_core::NodeId;
/// use nav_graph::{GraphSnapshot, QueryEdgeData, StaticGraphBuilder};
///
/// let mut b = StaticGraphBuilder::new(2);
/// b.add_edge(NodeId(0), NodeId(1), QueryEdgeData { distance: 10, ..Default::default() });
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.find_edge(NodeId(0), NodeId(1)).map(|e| g.target(e)), Some(NodeId(1)));
/// ```
pub struct StaticGraphBuilder<E> {
    node_count: usize,
    raw_edges:  Vec<(NodeId, StagedEdge<E>)>,
}

impl<E: EdgePayload> StaticGraphBuilder<E> {
    pub fn new(node_count: usize) -> Self {
        Self { node_count, raw_edges: Vec::new() }
    }

    /// Add a directed edge.  Both endpoints must be `< node_count`.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, data: E) {
        assert!(from.index() < self.node_count && to.index() < self.node_count);
        self.raw_edges.push((from, StagedEdge { target: to, data }));
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    /// Sort edges by source node and lay out the CSR arrays.
    ///
    /// The sort is stable so parallel edges keep their insertion order.
    pub fn build(self) -> StaticGraph<E> {
        let node_count = self.node_count;
        let mut raw = self.raw_edges;
        raw.sort_by_key(|(from, _)| from.0);

        let mut first_edge = vec![0u32; node_count + 1];
        for (from, _) in &raw {
            first_edge[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            first_edge[i] += first_edge[i - 1];
        }

        let mut edges: Vec<StagedEdge<E>> = raw.into_iter().map(|(_, e)| e).collect();
        StaticGraph::from_staging(&mut first_edge, &mut edges)
    }
}
