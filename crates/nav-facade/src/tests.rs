//! Unit tests for nav-facade.
//!
//! `helpers::dataset` writes a complete four-node dataset with the
//! `nav-graph` and `nav-spatial` writers plus a `server.ini` that names the
//! files relative to the temp dir.

#[cfg(test)]
mod helpers {
    use std::fs;
    use std::path::Path;

    use nav_core::{FixedPointCoordinate, NameId, NodeId, TurnInstruction};
    use nav_graph::{
        write_hsgr, write_node_coordinates, write_original_edges, OriginalEdgeTable,
        QueryEdgeData, StaticGraphBuilder,
    };
    use nav_spatial::{EdgeSegment, StaticRTree};

    pub const CHECKSUM: u32 = 0x00C0_FFEE;

    pub const INI: &str = "\
# dataset for tests
hsgrData  = map.hsgr
ramIndex  = map.ramIndex
fileIndex = map.fileIndex
nodesData = map.nodes
edgesData = map.edges
namesData = map.names
timestamp = map.timestamp
";

    pub fn edge(distance: u32, forward: bool, backward: bool) -> QueryEdgeData {
        QueryEdgeData { distance, id: distance, shortcut: false, forward, backward }
    }

    /// Square of four nodes, 0 → 1 → 2 → 3, with a parallel 0 → 1 edge:
    ///
    /// ```text
    ///   3 ─── 2
    ///         │
    ///   0 ─── 1
    /// ```
    pub fn dataset() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        let p = |name: &str| dir.path().join(name);

        let mut b = StaticGraphBuilder::new(4);
        b.add_edge(NodeId(0), NodeId(1), edge(12, true, false));
        b.add_edge(NodeId(0), NodeId(1), edge(10, true, true));
        b.add_edge(NodeId(1), NodeId(2), edge(20, true, false));
        b.add_edge(NodeId(2), NodeId(3), edge(30, true, false));
        write_hsgr(&b.build(), CHECKSUM, &p("map.hsgr")).unwrap();

        let coordinates = [
            FixedPointCoordinate::new(0, 0),
            FixedPointCoordinate::new(0, 1000),
            FixedPointCoordinate::new(1000, 1000),
            FixedPointCoordinate::new(1000, 0),
        ];
        write_node_coordinates(&coordinates, &p("map.nodes")).unwrap();

        let mut table = OriginalEdgeTable::with_capacity(3);
        table.push(NodeId(1), NameId(4), TurnInstruction::TurnLeft);
        table.push(NodeId(2), NameId(4), TurnInstruction::GoStraight);
        table.push(NodeId(9), NameId(5), TurnInstruction::NoTurn);
        write_original_edges(&table, &p("map.edges")).unwrap();

        let segments = [
            segment(0, coordinates[0], coordinates[1], 10),
            segment(1, coordinates[1], coordinates[2], 20),
            segment(2, coordinates[2], coordinates[3], 30),
        ];
        StaticRTree::write(&segments, &p("map.ramIndex"), &p("map.fileIndex")).unwrap();

        fs::write(p("map.names"), b"").unwrap();
        fs::write(p("map.timestamp"), "2024-01-01T00:00:00Z-extra-chars\n").unwrap();
        fs::write(p("server.ini"), INI).unwrap();
        dir
    }

    fn segment(
        id: u32,
        start: FixedPointCoordinate,
        end: FixedPointCoordinate,
        weight: u32,
    ) -> EdgeSegment {
        EdgeSegment { id, start, end, name_id: NameId(4), weight, in_tiny_component: false }
    }

    pub fn config(dir: &Path) -> crate::ServerConfig {
        crate::ServerConfig::load(&dir.join("server.ini")).unwrap()
    }

    pub fn load(dir: &Path) -> crate::InternalDataFacade<QueryEdgeData> {
        crate::InternalDataFacade::from_config(&config(dir), dir).expect("load facade")
    }
}

// ── ServerConfig / ServerPaths ────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::path::Path;

    use nav_core::DataError;

    use crate::{ServerConfig, ServerPaths};

    #[test]
    fn parse_skips_comments_and_trims() {
        let c = ServerConfig::parse("  # comment\n; other\n\n key =  value \nempty=\n").unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("key"), Some("value"));
        assert_eq!(c.get("empty"), Some(""));
        assert!(!c.holds("comment"));
    }

    #[test]
    fn parse_keeps_last_duplicate() {
        let c: ServerConfig = "a=1\na=2".parse().unwrap();
        assert_eq!(c.get("a"), Some("2"));
    }

    #[test]
    fn parse_rejects_line_without_equals() {
        let err = ServerConfig::parse("hsgrData=x\njust text\n").unwrap_err();
        assert!(matches!(err, DataError::Config(ref m) if m.contains("line 2")), "{err}");
    }

    #[test]
    fn parse_rejects_empty_key() {
        let err = ServerConfig::parse(" = value").unwrap_err();
        assert!(matches!(err, DataError::Config(_)), "{err}");
    }

    #[test]
    fn load_missing_file_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::load(&dir.path().join("server.ini")).unwrap_err();
        assert!(matches!(err, DataError::MissingInput { .. }), "{err}");
    }

    #[test]
    fn paths_resolve_against_base_dir() {
        let c = ServerConfig::parse(super::helpers::INI).unwrap();
        let paths = ServerPaths::from_config(&c, Path::new("/srv/map")).unwrap();
        assert_eq!(paths.hsgr_data, Path::new("/srv/map/map.hsgr"));
        assert_eq!(paths.file_index, Path::new("/srv/map/map.fileIndex"));
        assert_eq!(paths.timestamp, Path::new("/srv/map/map.timestamp"));
    }

    #[test]
    fn relative_base_dir_still_yields_absolute_paths() {
        let c = ServerConfig::parse(super::helpers::INI).unwrap();
        let paths = ServerPaths::from_config(&c, Path::new("data")).unwrap();
        let cwd = std::env::current_dir().unwrap();
        for p in [
            &paths.hsgr_data,
            &paths.ram_index,
            &paths.file_index,
            &paths.nodes_data,
            &paths.edges_data,
            &paths.names_data,
            &paths.timestamp,
        ] {
            assert!(p.is_absolute(), "{}", p.display());
        }
        assert_eq!(paths.hsgr_data, cwd.join("data").join("map.hsgr"));
    }

    #[test]
    fn empty_base_dir_resolves_against_working_dir() {
        let c = ServerConfig::parse(super::helpers::INI).unwrap();
        let paths = ServerPaths::from_config(&c, Path::new("")).unwrap();
        assert_eq!(paths.edges_data, std::env::current_dir().unwrap().join("map.edges"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let mut c = ServerConfig::parse(super::helpers::INI).unwrap();
        c.set("nodesData", "/data/other.nodes");
        let paths = ServerPaths::from_config(&c, Path::new("/srv/map")).unwrap();
        assert_eq!(paths.nodes_data, Path::new("/data/other.nodes"));
    }

    #[test]
    fn every_required_key_is_checked() {
        let full = ServerConfig::parse(super::helpers::INI).unwrap();
        for key in ServerPaths::REQUIRED_KEYS {
            let partial: ServerConfig = ServerPaths::REQUIRED_KEYS
                .iter()
                .filter(|&&k| k != key)
                .map(|&k| (k, full.get(k).unwrap()))
                .collect();
            let err = ServerPaths::from_config(&partial, Path::new("/nowhere")).unwrap_err();
            assert!(matches!(err, DataError::Config(ref m) if m.contains(key)), "{key}: {err}");
        }
    }
}

// ── Timestamp ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod timestamp {
    use std::fs;

    use crate::{load_timestamp, TIMESTAMP_UNAVAILABLE};

    fn with_contents(contents: &[u8]) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ts");
        fs::write(&path, contents).unwrap();
        load_timestamp(&path)
    }

    #[test]
    fn long_line_is_cut_to_25_chars() {
        assert_eq!(with_contents(b"2024-01-01T00:00:00Z-extra-chars"), "2024-01-01T00:00:00Z-extr");
    }

    #[test]
    fn only_first_line_counts() {
        assert_eq!(with_contents(b"2024-05-01\r\nsecond line\n"), "2024-05-01");
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_timestamp(&dir.path().join("absent")), TIMESTAMP_UNAVAILABLE);
    }

    #[test]
    fn empty_file_or_blank_line_is_unavailable() {
        assert_eq!(with_contents(b""), "n/a");
        assert_eq!(with_contents(b"\nlater"), "n/a");
    }

    #[test]
    fn cut_respects_char_boundaries() {
        let ts = with_contents("ééééééééééééééééééééééééééééé".as_bytes());
        assert_eq!(ts.chars().count(), 25);
        assert!(ts.chars().all(|c| c == 'é'));
    }

    #[test]
    fn invalid_utf8_is_unavailable() {
        assert_eq!(with_contents(&[0xff, 0xfe, b'\n']), "n/a");
    }
}

// ── InternalDataFacade ────────────────────────────────────────────────────────

#[cfg(test)]
mod facade {
    use std::fs;
    use std::path::Path;

    use nav_core::{
        DataError, EdgeId, FixedPointCoordinate, NameId, NodeId, OriginalEdgeId, TurnInstruction,
        ZoomLevel,
    };
    use nav_graph::QueryEdgeData;

    use super::helpers::{self, CHECKSUM};
    use crate::{DataFacade, InternalDataFacade, ServerConfig, ServerPaths};

    #[test]
    fn facade_is_send_and_sync() {
        fn check<T: Send + Sync>() {}
        check::<InternalDataFacade<QueryEdgeData>>();
    }

    #[test]
    fn loads_counts_checksum_and_timestamp() {
        let dir = helpers::dataset();
        let f = helpers::load(dir.path());
        assert_eq!(f.node_count(), 4);
        assert_eq!(f.edge_count(), 4);
        assert_eq!(f.checksum(), CHECKSUM);
        assert_eq!(f.timestamp(), "2024-01-01T00:00:00Z-extr");
        assert_eq!(f.coordinates().len(), 4);
        assert_eq!(f.original_edges().len(), 3);
        assert_eq!(f.spatial_index().segment_count(), 3);
    }

    #[test]
    fn every_target_is_a_valid_node() {
        let dir = helpers::dataset();
        let f = helpers::load(dir.path());
        for n in 0..f.node_count() as u32 {
            let range = f.edges_range(NodeId(n));
            assert_eq!((range.end.0 - range.start.0) as usize, f.out_degree(NodeId(n)));
            for e in range.start.0..range.end.0 {
                assert!(f.target(EdgeId(e)).index() < f.node_count());
            }
        }
        assert_eq!(f.begin_edges(NodeId(0)), EdgeId(0));
        assert_eq!(f.end_edges(NodeId(3)), EdgeId(4));
    }

    #[test]
    fn find_edge_variants() {
        let dir = helpers::dataset();
        let f = helpers::load(dir.path());

        let e = f.find_edge(NodeId(0), NodeId(1)).unwrap();
        assert_eq!(f.target(e), NodeId(1));
        assert_eq!(f.edge_data(e).distance, 10);

        assert!(f.find_edge(NodeId(1), NodeId(0)).is_none());
        assert!(f.find_edge(NodeId(0), NodeId(3)).is_none());

        let back = f.find_edge_either_direction(NodeId(2), NodeId(1)).unwrap();
        assert_eq!(f.target(back), NodeId(2));

        assert_eq!(f.find_edge_with_direction_flag(NodeId(1), NodeId(2)).map(|(_, r)| r), Some(false));
        assert_eq!(f.find_edge_with_direction_flag(NodeId(2), NodeId(1)).map(|(_, r)| r), Some(true));
        assert_eq!(f.find_edge_with_direction_flag(NodeId(0), NodeId(2)), None);
    }

    #[test]
    fn edge_data_mut_updates_in_place() {
        let dir = helpers::dataset();
        let mut f = helpers::load(dir.path());
        let e = f.find_edge(NodeId(1), NodeId(2)).unwrap();
        f.edge_data_mut(e).distance = 99;
        assert_eq!(f.edge_data(e).distance, 99);
    }

    #[test]
    fn original_edge_lookups() {
        let dir = helpers::dataset();
        let f = helpers::load(dir.path());
        assert_eq!(
            f.coordinate_of_original_edge(OriginalEdgeId(0)).unwrap(),
            FixedPointCoordinate::new(0, 1000)
        );
        assert_eq!(f.turn_instruction_of(OriginalEdgeId(1)).unwrap(), TurnInstruction::GoStraight);
    }

    #[test]
    fn original_edge_out_of_range() {
        let dir = helpers::dataset();
        let f = helpers::load(dir.path());
        let err = f.coordinate_of_original_edge(OriginalEdgeId(3)).unwrap_err();
        assert!(matches!(err, DataError::OutOfRange { index: 3, len: 3, .. }), "{err}");
        let err = f.turn_instruction_of(OriginalEdgeId(7)).unwrap_err();
        assert!(matches!(err, DataError::OutOfRange { index: 7, .. }), "{err}");
    }

    #[test]
    fn via_node_without_coordinate_is_out_of_range() {
        let dir = helpers::dataset();
        let f = helpers::load(dir.path());
        let err = f.coordinate_of_original_edge(OriginalEdgeId(2)).unwrap_err();
        assert!(matches!(err, DataError::OutOfRange { index: 9, len: 4, .. }), "{err}");
    }

    #[test]
    fn spatial_queries_delegate_to_index() {
        let dir = helpers::dataset();
        let f = helpers::load(dir.path());
        let q = FixedPointCoordinate::new(-5, 600);

        assert_eq!(
            f.nearest_endpoint(q, ZoomLevel::DEFAULT).unwrap(),
            Some(FixedPointCoordinate::new(0, 1000))
        );

        let p = f.nearest_phantom(q, ZoomLevel::DEFAULT).unwrap().unwrap();
        assert_eq!(p.edge_based_node, 0);
        assert_eq!(p.location, FixedPointCoordinate::new(0, 600));
        assert_eq!((p.weight1, p.weight2), (6, 4));
    }

    #[test]
    fn names_are_empty_without_a_name_table() {
        let dir = helpers::dataset();
        let f = helpers::load(dir.path());
        assert!(f.name_table().is_none());
        assert_eq!(f.name_index_of(OriginalEdgeId(0)), NameId::EMPTY);
        assert_eq!(f.name_text(NameId(4)), "");
    }

    #[test]
    fn missing_timestamp_file_reads_na() {
        let dir = helpers::dataset();
        fs::remove_file(dir.path().join("map.timestamp")).unwrap();
        let f = helpers::load(dir.path());
        assert_eq!(f.timestamp(), "n/a");
    }

    #[test]
    fn missing_edges_key_fails_before_io() {
        let mut c = ServerConfig::new();
        for key in ServerPaths::REQUIRED_KEYS.iter().filter(|&&k| k != "edgesData") {
            c.set(*key, "does-not-exist");
        }
        let err = InternalDataFacade::<QueryEdgeData>::from_config(&c, Path::new("/nowhere"))
            .unwrap_err();
        assert!(matches!(err, DataError::Config(ref m) if m.contains("edgesData")), "{err}");
    }

    #[test]
    fn zero_byte_nodes_file_is_missing_input() {
        let dir = helpers::dataset();
        fs::write(dir.path().join("map.nodes"), b"").unwrap();
        let err = InternalDataFacade::<QueryEdgeData>::from_config(&helpers::config(dir.path()), dir.path())
            .unwrap_err();
        assert!(matches!(err, DataError::MissingInput { reason: "nodes file is empty", .. }), "{err}");
    }

    #[test]
    fn zero_byte_edges_file_is_missing_input() {
        let dir = helpers::dataset();
        fs::write(dir.path().join("map.edges"), b"").unwrap();
        let err = InternalDataFacade::<QueryEdgeData>::from_config(&helpers::config(dir.path()), dir.path())
            .unwrap_err();
        assert!(matches!(err, DataError::MissingInput { reason: "edges file is empty", .. }), "{err}");
    }

    #[test]
    fn absent_graph_file_is_missing_input() {
        let dir = helpers::dataset();
        fs::remove_file(dir.path().join("map.hsgr")).unwrap();
        let err = InternalDataFacade::<QueryEdgeData>::from_config(&helpers::config(dir.path()), dir.path())
            .unwrap_err();
        assert!(matches!(err, DataError::MissingInput { ref path, .. } if path.ends_with("map.hsgr")), "{err}");
    }

    #[test]
    fn corrupt_spatial_index_aborts_load() {
        let dir = helpers::dataset();
        fs::write(dir.path().join("map.fileIndex"), [0u8; 5]).unwrap();
        let err = InternalDataFacade::<QueryEdgeData>::from_config(&helpers::config(dir.path()), dir.path())
            .unwrap_err();
        assert!(matches!(err, DataError::CorruptData { .. }), "{err}");
    }
}
