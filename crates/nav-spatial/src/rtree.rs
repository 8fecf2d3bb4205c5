//! Static R-tree split across a RAM directory file and an on-disk leaf file.
//!
//! # File layouts
//!
//! RAM directory (`.ramIndex`):
//!
//! ```text
//! [page_count: u32]
//! [PageRecord; page_count]
//! ```
//!
//! Leaf file (`.fileIndex`):
//!
//! ```text
//! [segment_count: u64]
//! [SegmentRecord; segment_count]
//! ```
//!
//! Each page covers a contiguous run of segments.  At open time the
//! directory is bulk-loaded into an in-memory `rstar` tree over page bounding
//! boxes; segments stay on disk and are read one page at a time while a
//! query runs.
//!
//! # Distance
//!
//! Searches work in the planar fixed-point `[lat, lon]` space, the same
//! metric the pages were packed in.  That is enough to rank candidates
//! within a city-sized neighbourhood; callers that need metres convert the
//! result with [`FixedPointCoordinate::distance_m`].

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use rstar::{
    ParentNode, PointDistance, RStarInsertionStrategy, RTree, RTreeNode, RTreeObject,
    RTreeParams, AABB,
};
use tracing::debug;

use nav_core::{
    DataError, DataResult, FixedPointCoordinate, PhantomNode, Record, RecordCursor, ZoomLevel,
};

use crate::records::{EdgeSegment, PageRecord, SegmentRecord};
use crate::SpatialIndex;

/// Size of the leaf file's count prefix.
const LEAF_HEADER: u64 = 8;

// ── Directory entries ─────────────────────────────────────────────────────────

/// A leaf page as held in the in-memory directory tree.
#[derive(Clone, Debug)]
struct PageEntry {
    bbox:  AABB<[f64; 2]>,
    first: u32,
    count: u32,
}

impl RTreeObject for PageEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bbox
    }
}

impl PointDistance for PageEntry {
    /// Squared distance from `point` to the page's bounding box; zero inside.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.bbox.distance_2(point)
    }
}

// ── StaticRTree ───────────────────────────────────────────────────────────────

/// Nearest-neighbor index over road segments.
///
/// Immutable after [`open`](Self::open).  Leaf pages are read with
/// positioned reads that never move a shared cursor, so concurrent queries
/// share one file handle without locking.
pub struct StaticRTree {
    pages:         RTree<PageEntry>,
    leaf_file:     File,
    leaf_path:     PathBuf,
    segment_count: u64,
}

impl std::fmt::Debug for StaticRTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticRTree")
            .field("pages", &self.pages.size())
            .field("segments", &self.segment_count)
            .field("leaf_path", &self.leaf_path)
            .finish()
    }
}

impl StaticRTree {
    /// Open a two-file index.
    ///
    /// # Errors
    ///
    /// `MissingInput` if either file does not exist.  `CorruptData` if the
    /// directory or the leaf file is truncated, padded, or a page points
    /// past the last segment.
    pub fn open(ram_index_path: &Path, leaf_path: &Path) -> DataResult<Self> {
        debug!("opening nearest-neighbor index");

        let mut leaf_file = File::open(leaf_path).map_err(|e| DataError::from_open(leaf_path, e))?;
        let directory = fs::read(ram_index_path).map_err(|e| DataError::from_open(ram_index_path, e))?;

        let segment_count = read_leaf_header(&mut leaf_file, leaf_path)?;
        let entries = read_directory(&directory, ram_index_path, segment_count)?;
        debug!(pages = entries.len(), segments = segment_count, "loaded index directory");

        Ok(StaticRTree {
            pages: RTree::bulk_load(entries),
            leaf_file,
            leaf_path: leaf_path.to_path_buf(),
            segment_count,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.size()
    }

    pub fn segment_count(&self) -> u64 {
        self.segment_count
    }

    /// Read the segments of one page from the leaf file.
    fn read_page(&self, page: &PageEntry) -> DataResult<Vec<EdgeSegment>> {
        let size = SegmentRecord::SIZE;
        let offset = LEAF_HEADER + u64::from(page.first) * size as u64;
        let mut buf = vec![0u8; page.count as usize * size];
        read_exact_at(&self.leaf_file, &mut buf, offset)
            .map_err(|e| DataError::io(&self.leaf_path, e))?;
        Ok(buf.chunks_exact(size).map(|c| EdgeSegment::from(SegmentRecord::decode(c))).collect())
    }

    /// Visit candidate segments page by page in increasing bounding-box
    /// distance.  `visit` returns the best squared distance found so far;
    /// the walk stops once the next page is farther away than that.
    fn scan<F>(&self, query: FixedPointCoordinate, zoom: ZoomLevel, mut visit: F) -> DataResult<()>
    where
        F: FnMut(&EdgeSegment) -> Option<f64>,
    {
        let q = query.to_plane();
        let mut best: Option<f64> = None;
        for (page, page_dist2) in self.pages.nearest_neighbor_iter_with_distance_2(&q) {
            if best.is_some_and(|d| page_dist2 > d) {
                break;
            }
            for segment in self.read_page(page)? {
                if segment.in_tiny_component && !zoom.admits_tiny_components() {
                    continue;
                }
                if let Some(d) = visit(&segment) {
                    best = Some(d);
                }
            }
        }
        Ok(())
    }

    /// Bulk-build an index over `segments` and write both files.
    ///
    /// Segments are STR-packed by `rstar`; every bottom-level node of the
    /// packed tree becomes one leaf page.
    pub fn write(segments: &[EdgeSegment], ram_index_path: &Path, leaf_path: &Path) -> DataResult<()> {
        let entries: Vec<SegmentEntry> = segments.iter().copied().map(SegmentEntry).collect();
        let packed = RTree::<SegmentEntry, LeafPageParams>::bulk_load_with_params(entries);

        let mut pages: Vec<Vec<EdgeSegment>> = Vec::new();
        collect_pages(packed.root(), &mut pages);

        let leaf = File::create(leaf_path).map_err(|e| DataError::io(leaf_path, e))?;
        let mut leaf = BufWriter::new(leaf);
        let leaf_io = |e| DataError::io(leaf_path, e);
        leaf.write_all(&(segments.len() as u64).to_ne_bytes()).map_err(leaf_io)?;

        let ram = File::create(ram_index_path).map_err(|e| DataError::io(ram_index_path, e))?;
        let mut ram = BufWriter::new(ram);
        let ram_io = |e| DataError::io(ram_index_path, e);
        ram.write_all(&(pages.len() as u32).to_ne_bytes()).map_err(ram_io)?;

        let mut first = 0u32;
        for page in &pages {
            let mut min = [i32::MAX; 2];
            let mut max = [i32::MIN; 2];
            for s in page {
                for c in [s.start, s.end] {
                    min = [min[0].min(c.lat), min[1].min(c.lon)];
                    max = [max[0].max(c.lat), max[1].max(c.lon)];
                }
                leaf.write_all(SegmentRecord::from(s).encode()).map_err(leaf_io)?;
            }
            let record = PageRecord {
                min_lat: min[0],
                min_lon: min[1],
                max_lat: max[0],
                max_lon: max[1],
                first,
                count: page.len() as u32,
            };
            ram.write_all(record.encode()).map_err(ram_io)?;
            first += page.len() as u32;
        }

        leaf.flush().map_err(leaf_io)?;
        ram.flush().map_err(ram_io)
    }
}

impl SpatialIndex for StaticRTree {
    fn nearest_endpoint(
        &self,
        query: FixedPointCoordinate,
        zoom: ZoomLevel,
    ) -> DataResult<Option<FixedPointCoordinate>> {
        let q = query.to_plane();
        let mut best: Option<(f64, FixedPointCoordinate)> = None;

        self.scan(query, zoom, |segment| {
            for endpoint in [segment.start, segment.end] {
                let d = distance_2(q, endpoint.to_plane());
                if best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((d, endpoint));
                }
            }
            best.map(|(d, _)| d)
        })?;

        Ok(best.map(|(_, c)| c))
    }

    fn nearest_phantom(
        &self,
        query: FixedPointCoordinate,
        zoom: ZoomLevel,
    ) -> DataResult<Option<PhantomNode>> {
        let q = query.to_plane();
        let mut best: Option<(f64, EdgeSegment, f64, [f64; 2])> = None;

        self.scan(query, zoom, |segment| {
            let (ratio, foot) = project(q, segment.start.to_plane(), segment.end.to_plane());
            let d = distance_2(q, foot);
            if best.as_ref().is_none_or(|(bd, ..)| d < *bd) {
                best = Some((d, *segment, ratio, foot));
            }
            best.as_ref().map(|(d, ..)| *d)
        })?;

        Ok(best.map(|(_, segment, ratio, foot)| {
            let weight1 = (f64::from(segment.weight) * ratio).round() as u32;
            PhantomNode {
                edge_based_node: segment.id,
                name_id: segment.name_id,
                weight1,
                weight2: segment.weight - weight1.min(segment.weight),
                ratio,
                location: FixedPointCoordinate::new(foot[0].round() as i32, foot[1].round() as i32),
                segment_start: segment.start,
                segment_end: segment.end,
            }
        }))
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

#[inline]
fn distance_2(a: [f64; 2], b: [f64; 2]) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    d0 * d0 + d1 * d1
}

/// Perpendicular foot of `q` on segment `a..b`, clamped to the segment.
/// Returns the position along the segment (`0.0` at `a`) and the foot.
fn project(q: [f64; 2], a: [f64; 2], b: [f64; 2]) -> (f64, [f64; 2]) {
    let d = [b[0] - a[0], b[1] - a[1]];
    let len2 = d[0] * d[0] + d[1] * d[1];
    if len2 == 0.0 {
        return (0.0, a);
    }
    let t = (((q[0] - a[0]) * d[0] + (q[1] - a[1]) * d[1]) / len2).clamp(0.0, 1.0);
    (t, [a[0] + t * d[0], a[1] + t * d[1]])
}

// ── File parsing ──────────────────────────────────────────────────────────────

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    std::os::unix::fs::FileExt::read_exact_at(file, buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> std::io::Result<()> {
    use std::io::ErrorKind;
    use std::os::windows::fs::FileExt;

    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => return Err(ErrorKind::UnexpectedEof.into()),
            Ok(n) => {
                buf = &mut std::mem::take(&mut buf)[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Read the segment count and check the leaf file holds exactly that many
/// records.
fn read_leaf_header(file: &mut File, path: &Path) -> DataResult<u64> {
    let len = file.metadata().map_err(|e| DataError::io(path, e))?.len();
    let mut prefix = [0u8; LEAF_HEADER as usize];
    file.read_exact(&mut prefix).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => DataError::corrupt(path, "leaf file has no count prefix"),
        _ => DataError::io(path, e),
    })?;
    let count = u64::from_ne_bytes(prefix);

    let expected = count
        .checked_mul(SegmentRecord::SIZE as u64)
        .and_then(|n| n.checked_add(LEAF_HEADER));
    if expected != Some(len) {
        return Err(DataError::corrupt(
            path,
            format!("declared {count} segments but the file is {len} bytes"),
        ));
    }
    Ok(count)
}

fn read_directory(data: &[u8], path: &Path, segment_count: u64) -> DataResult<Vec<PageEntry>> {
    let mut cur = RecordCursor::new(data, path);
    let page_count = cur.read_u32("page count")? as usize;
    let bytes = cur.take(page_count, PageRecord::SIZE, "page directory")?;
    cur.finish()?;

    bytes
        .chunks_exact(PageRecord::SIZE)
        .enumerate()
        .map(|(i, chunk)| {
            let r = PageRecord::decode(chunk);
            let (first, count) = (r.first, r.count);
            if u64::from(first) + u64::from(count) > segment_count {
                return Err(DataError::corrupt(
                    path,
                    format!("page {i} runs past the last of {segment_count} segments"),
                ));
            }
            let min = FixedPointCoordinate::new(r.min_lat, r.min_lon);
            let max = FixedPointCoordinate::new(r.max_lat, r.max_lon);
            if min.lat > max.lat || min.lon > max.lon {
                return Err(DataError::corrupt(path, format!("page {i} has an inverted bounding box")));
            }
            Ok(PageEntry {
                bbox: AABB::from_corners(min.to_plane(), max.to_plane()),
                first,
                count,
            })
        })
        .collect()
}

// ── Offline packing ───────────────────────────────────────────────────────────

/// Leaf page capacity used when packing.
struct LeafPageParams;

impl RTreeParams for LeafPageParams {
    const MIN_SIZE: usize = 16;
    const MAX_SIZE: usize = 64;
    const REINSERTION_COUNT: usize = 8;
    type DefaultInsertionStrategy = RStarInsertionStrategy;
}

struct SegmentEntry(EdgeSegment);

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.0.start.to_plane(), self.0.end.to_plane())
    }
}

/// Flatten the bottom level of a packed tree into pages, left to right.
fn collect_pages(node: &ParentNode<SegmentEntry>, pages: &mut Vec<Vec<EdgeSegment>>) {
    let leaves: Vec<EdgeSegment> = node
        .children()
        .iter()
        .filter_map(|child| match child {
            RTreeNode::Leaf(entry) => Some(entry.0),
            RTreeNode::Parent(_) => None,
        })
        .collect();
    if !leaves.is_empty() {
        pages.push(leaves);
    }
    for child in node.children() {
        if let RTreeNode::Parent(parent) = child {
            collect_pages(parent, pages);
        }
    }
}
