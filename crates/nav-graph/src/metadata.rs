//! Node-coordinate and original-edge metadata files.
//!
//! # File layouts
//!
//! Node coordinates (`.nodes`): back-to-back [`NodeRecord`]s until end of
//! file.  There is no count prefix; the record count is the file size
//! divided by the record size.
//!
//! Original-edge metadata (`.edges`):
//!
//! ```text
//! [count: u32]
//! [OriginalEdgeRecord; count]
//! ```
//!
//! The metadata is stored as three parallel arrays (via node, name id, turn
//! instruction) so each query only touches the column it needs.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use nav_core::{
    read_record, DataError, DataResult, FixedPointCoordinate, NameId, NodeId, OriginalEdgeId,
    Record, TurnInstruction,
};

use crate::records::{NodeRecord, OriginalEdgeRecord};

// ── OriginalEdgeTable ─────────────────────────────────────────────────────────

/// Per-original-edge metadata as three equal-length columns indexed by
/// `OriginalEdgeId`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OriginalEdgeTable {
    via_nodes:         Vec<NodeId>,
    name_ids:          Vec<NameId>,
    turn_instructions: Vec<TurnInstruction>,
}

impl OriginalEdgeTable {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            via_nodes:         Vec::with_capacity(n),
            name_ids:          Vec::with_capacity(n),
            turn_instructions: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, via_node: NodeId, name_id: NameId, turn: TurnInstruction) {
        self.via_nodes.push(via_node);
        self.name_ids.push(name_id);
        self.turn_instructions.push(turn);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.via_nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.via_nodes.is_empty()
    }

    #[inline]
    pub fn via_node(&self, id: OriginalEdgeId) -> Option<NodeId> {
        self.via_nodes.get(id.index()).copied()
    }

    #[inline]
    pub fn name_id(&self, id: OriginalEdgeId) -> Option<NameId> {
        self.name_ids.get(id.index()).copied()
    }

    #[inline]
    pub fn turn_instruction(&self, id: OriginalEdgeId) -> Option<TurnInstruction> {
        self.turn_instructions.get(id.index()).copied()
    }

    pub fn via_nodes(&self) -> &[NodeId] {
        &self.via_nodes
    }

    pub fn name_ids(&self) -> &[NameId] {
        &self.name_ids
    }

    pub fn turn_instructions(&self) -> &[TurnInstruction] {
        &self.turn_instructions
    }
}

/// Output of [`load_node_and_edge_information`].
#[derive(Clone, Debug, Default)]
pub struct NodeAndEdgeData {
    pub coordinates:    Vec<FixedPointCoordinate>,
    pub original_edges: OriginalEdgeTable,
}

// ── Loaders ───────────────────────────────────────────────────────────────────

/// Load the coordinate list and the original-edge table.
pub fn load_node_and_edge_information(
    nodes_path: &Path,
    edges_path: &Path,
) -> DataResult<NodeAndEdgeData> {
    let coordinates = load_node_coordinates(nodes_path)?;
    let original_edges = load_original_edges(edges_path)?;
    Ok(NodeAndEdgeData { coordinates, original_edges })
}

/// Open `path` and return it with its length in bytes.
fn open_sized(path: &Path) -> DataResult<(File, u64)> {
    let file = File::open(path).map_err(|e| DataError::from_open(path, e))?;
    let len = file.metadata().map_err(|e| DataError::io(path, e))?.len();
    Ok((file, len))
}

/// Stream the node-coordinate file into a `Vec` indexed by `NodeId`.
///
/// # Errors
///
/// `MissingInput` if the file does not exist; `CorruptData` if it is empty
/// or its size is not a multiple of the record size.
pub fn load_node_coordinates(path: &Path) -> DataResult<Vec<FixedPointCoordinate>> {
    let (file, len) = open_sized(path)?;
    let size = NodeRecord::SIZE as u64;
    if len == 0 {
        return Err(DataError::corrupt(path, "node file is empty"));
    }
    if len % size != 0 {
        return Err(DataError::corrupt(
            path,
            format!("node file size {len} is not a multiple of the {size}-byte record"),
        ));
    }

    debug!("loading node data");
    let mut reader = BufReader::new(file);
    let mut coordinates = Vec::with_capacity((len / size) as usize);
    while let Some(record) = read_record::<NodeRecord, _>(&mut reader, path)? {
        coordinates.push(FixedPointCoordinate::from(record));
    }
    coordinates.shrink_to_fit();

    Ok(coordinates)
}

/// Read the original-edge metadata file into an [`OriginalEdgeTable`].
///
/// # Errors
///
/// `MissingInput` if the file does not exist; `CorruptData` if the count
/// prefix is missing, the declared count does not match the bytes that
/// follow, or a record carries an unknown turn-instruction code.
pub fn load_original_edges(path: &Path) -> DataResult<OriginalEdgeTable> {
    let (file, len) = open_sized(path)?;
    let mut reader = BufReader::new(file);

    debug!("loading edge data");
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => DataError::corrupt(path, "edge file has no count prefix"),
        _ => DataError::io(path, e),
    })?;
    let count = u32::from_ne_bytes(prefix) as u64;

    let available = len - 4;
    let declared = count * OriginalEdgeRecord::SIZE as u64;
    if declared != available {
        return Err(DataError::corrupt(
            path,
            format!(
                "declared {count} original edges ({declared} bytes) but {available} bytes follow"
            ),
        ));
    }

    let mut table = OriginalEdgeTable::with_capacity(count as usize);
    for i in 0..count {
        let record = read_record::<OriginalEdgeRecord, _>(&mut reader, path)?
            .ok_or_else(|| DataError::corrupt(path, format!("edge file ends at record {i}")))?;
        let turn = TurnInstruction::try_from(record.turn_instruction)
            .map_err(|e| DataError::corrupt(path, format!("original edge {i}: {e}")))?;
        table.push(NodeId(record.via_node), NameId(record.name_id), turn);
    }
    debug!("loaded {count} orig edges");

    Ok(table)
}

// ── Writers ───────────────────────────────────────────────────────────────────

/// Write `coordinates` in the layout [`load_node_coordinates`] reads.
pub fn write_node_coordinates(coordinates: &[FixedPointCoordinate], path: &Path) -> DataResult<()> {
    let file = File::create(path).map_err(|e| DataError::io(path, e))?;
    let mut out = BufWriter::new(file);
    for &c in coordinates {
        out.write_all(NodeRecord::from(c).encode()).map_err(|e| DataError::io(path, e))?;
    }
    out.flush().map_err(|e| DataError::io(path, e))
}

/// Write `table` in the layout [`load_original_edges`] reads.
pub fn write_original_edges(table: &OriginalEdgeTable, path: &Path) -> DataResult<()> {
    let file = File::create(path).map_err(|e| DataError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let io = |e| DataError::io(path, e);

    out.write_all(&(table.len() as u32).to_ne_bytes()).map_err(io)?;
    for i in 0..table.len() {
        let record = OriginalEdgeRecord {
            via_node:         table.via_nodes[i].0,
            name_id:          table.name_ids[i].0,
            turn_instruction: table.turn_instructions[i].code(),
        };
        out.write_all(record.encode()).map_err(io)?;
    }
    out.flush().map_err(io)
}
