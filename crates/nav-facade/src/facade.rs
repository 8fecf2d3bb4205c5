//! The query facade and its in-process implementation.

use std::fs;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::Path;

use tracing::{debug, info};

use nav_core::{
    DataError, DataResult, EdgeId, FixedPointCoordinate, NameId, NodeId, OriginalEdgeId,
    PhantomNode, TurnInstruction, ZoomLevel,
};
use nav_graph::{
    load_hsgr, load_node_and_edge_information, EdgePayload, GraphSnapshot, LoadedGraph,
    NodeAndEdgeData, OriginalEdgeTable, StaticGraph,
};
use nav_spatial::{SpatialIndex, StaticRTree};

use crate::config::{ServerConfig, ServerPaths};
use crate::timestamp::load_timestamp;

// ── Traits ────────────────────────────────────────────────────────────────────

/// Street-name lookup, attached to backends that load a names file.
pub trait NameTable: Send + Sync {
    fn name(&self, id: NameId) -> Option<&str>;
}

/// Everything path search and map matching may ask about the loaded data.
///
/// Graph accessors take ids the caller got from this same facade and panic
/// on anything else.  Metadata accessors are bounds-checked and return
/// [`DataError::OutOfRange`].
pub trait DataFacade {
    type EdgeData: EdgePayload;

    // graph
    fn node_count(&self) -> usize;
    fn edge_count(&self) -> usize;
    fn out_degree(&self, node: NodeId) -> usize;
    fn target(&self, edge: EdgeId) -> NodeId;
    fn edge_data(&self, edge: EdgeId) -> &Self::EdgeData;
    fn edge_data_mut(&mut self, edge: EdgeId) -> &mut Self::EdgeData;
    fn begin_edges(&self, node: NodeId) -> EdgeId;
    fn end_edges(&self, node: NodeId) -> EdgeId;

    /// `begin_edges(node)..end_edges(node)`.
    fn edges_range(&self, node: NodeId) -> Range<EdgeId> {
        self.begin_edges(node)..self.end_edges(node)
    }

    fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId>;
    fn find_edge_either_direction(&self, from: NodeId, to: NodeId) -> Option<EdgeId>;

    /// Like [`find_edge_either_direction`](Self::find_edge_either_direction);
    /// the flag is `true` when the edge runs `to → from`.
    fn find_edge_with_direction_flag(&self, from: NodeId, to: NodeId) -> Option<(EdgeId, bool)>;

    // original-edge metadata
    /// Coordinate of the via node of an original edge.
    fn coordinate_of_original_edge(&self, id: OriginalEdgeId) -> DataResult<FixedPointCoordinate>;
    fn turn_instruction_of(&self, id: OriginalEdgeId) -> DataResult<TurnInstruction>;

    // spatial
    fn nearest_endpoint(
        &self,
        query: FixedPointCoordinate,
        zoom: ZoomLevel,
    ) -> DataResult<Option<FixedPointCoordinate>>;
    fn nearest_phantom(
        &self,
        query: FixedPointCoordinate,
        zoom: ZoomLevel,
    ) -> DataResult<Option<PhantomNode>>;

    // dataset
    fn checksum(&self) -> u32;
    fn timestamp(&self) -> &str;

    // names
    fn name_table(&self) -> Option<&dyn NameTable> {
        None
    }

    /// Street-name id of an original edge; [`NameId::EMPTY`] without a name
    /// table.
    fn name_index_of(&self, id: OriginalEdgeId) -> NameId;

    /// Street name for `id`; empty without a name table or for an unknown id.
    fn name_text(&self, id: NameId) -> String {
        self.name_table()
            .and_then(|table| table.name(id))
            .map(str::to_owned)
            .unwrap_or_default()
    }
}

// ── InternalDataFacade ────────────────────────────────────────────────────────

/// Facade that owns all data in process memory.
///
/// Built once at startup; every query afterwards is a lookup or a delegation
/// to the graph or the spatial index.  Names are not loaded by this backend.
#[derive(Debug)]
pub struct InternalDataFacade<E> {
    graph:          StaticGraph<E>,
    checksum:       u32,
    coordinates:    Vec<FixedPointCoordinate>,
    original_edges: OriginalEdgeTable,
    rtree:          StaticRTree,
    timestamp:      String,
}

impl<E: EdgePayload> InternalDataFacade<E> {
    /// Load every data file named by `paths`.
    ///
    /// Files are loaded in the order graph, node/edge metadata, spatial
    /// index, timestamp; the first failure aborts construction.
    ///
    /// # Errors
    ///
    /// - [`DataError::MissingInput`] if the node or edge data file is absent
    ///   or empty, or any other required file is absent.
    /// - Any error the individual loaders report.
    pub fn new(paths: &ServerPaths) -> DataResult<Self> {
        require_non_empty(&paths.nodes_data, "nodes file is empty")?;
        require_non_empty(&paths.edges_data, "edges file is empty")?;

        info!("loading graph data");
        let LoadedGraph { graph, checksum, .. } = load_hsgr::<E>(&paths.hsgr_data)?;

        let NodeAndEdgeData { coordinates, original_edges } =
            load_node_and_edge_information(&paths.nodes_data, &paths.edges_data)?;

        debug!("opening NN indices");
        let rtree = StaticRTree::open(&paths.ram_index, &paths.file_index)?;

        let timestamp = load_timestamp(&paths.timestamp);

        Ok(InternalDataFacade { graph, checksum, coordinates, original_edges, rtree, timestamp })
    }

    /// Resolve `config` against `base_dir`, then [`new`](Self::new).
    pub fn from_config(config: &ServerConfig, base_dir: &Path) -> DataResult<Self> {
        let paths = ServerPaths::from_config(config, base_dir)?;
        Self::new(&paths)
    }

    pub fn graph(&self) -> &StaticGraph<E> {
        &self.graph
    }

    pub fn coordinates(&self) -> &[FixedPointCoordinate] {
        &self.coordinates
    }

    pub fn original_edges(&self) -> &OriginalEdgeTable {
        &self.original_edges
    }

    pub fn spatial_index(&self) -> &StaticRTree {
        &self.rtree
    }

    fn via_node(&self, id: OriginalEdgeId) -> DataResult<NodeId> {
        self.original_edges.via_node(id).ok_or(DataError::OutOfRange {
            what:  "original edge",
            index: id.index(),
            len:   self.original_edges.len(),
        })
    }
}

/// `MissingInput` unless `path` is a file with at least one byte.
fn require_non_empty(path: &Path, reason: &'static str) -> DataResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(DataError::MissingInput { path: path.to_path_buf(), reason }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(DataError::from_open(path, e)),
        Err(e) => Err(DataError::io(path, e)),
    }
}

impl<E: EdgePayload> DataFacade for InternalDataFacade<E> {
    type EdgeData = E;

    #[inline]
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[inline]
    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[inline]
    fn out_degree(&self, node: NodeId) -> usize {
        self.graph.out_degree(node)
    }

    #[inline]
    fn target(&self, edge: EdgeId) -> NodeId {
        self.graph.target(edge)
    }

    #[inline]
    fn edge_data(&self, edge: EdgeId) -> &E {
        self.graph.edge_data(edge)
    }

    #[inline]
    fn edge_data_mut(&mut self, edge: EdgeId) -> &mut E {
        self.graph.edge_data_mut(edge)
    }

    #[inline]
    fn begin_edges(&self, node: NodeId) -> EdgeId {
        self.graph.begin_edges(node)
    }

    #[inline]
    fn end_edges(&self, node: NodeId) -> EdgeId {
        self.graph.end_edges(node)
    }

    fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.graph.find_edge(from, to)
    }

    fn find_edge_either_direction(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.graph.find_edge_either_direction(from, to)
    }

    fn find_edge_with_direction_flag(&self, from: NodeId, to: NodeId) -> Option<(EdgeId, bool)> {
        self.graph.find_edge_indicate_if_reverse(from, to)
    }

    fn coordinate_of_original_edge(&self, id: OriginalEdgeId) -> DataResult<FixedPointCoordinate> {
        let node = self.via_node(id)?;
        self.coordinates.get(node.index()).copied().ok_or(DataError::OutOfRange {
            what:  "node coordinate",
            index: node.index(),
            len:   self.coordinates.len(),
        })
    }

    fn turn_instruction_of(&self, id: OriginalEdgeId) -> DataResult<TurnInstruction> {
        self.original_edges.turn_instruction(id).ok_or(DataError::OutOfRange {
            what:  "original edge",
            index: id.index(),
            len:   self.original_edges.len(),
        })
    }

    fn nearest_endpoint(
        &self,
        query: FixedPointCoordinate,
        zoom: ZoomLevel,
    ) -> DataResult<Option<FixedPointCoordinate>> {
        self.rtree.nearest_endpoint(query, zoom)
    }

    fn nearest_phantom(
        &self,
        query: FixedPointCoordinate,
        zoom: ZoomLevel,
    ) -> DataResult<Option<PhantomNode>> {
        self.rtree.nearest_phantom(query, zoom)
    }

    fn checksum(&self) -> u32 {
        self.checksum
    }

    fn timestamp(&self) -> &str {
        &self.timestamp
    }

    fn name_index_of(&self, _id: OriginalEdgeId) -> NameId {
        NameId::EMPTY
    }
}
