//! `nav-facade` — one read-only entry point over all preprocessed routing
//! data.
//!
//! # Load sequence
//!
//! ```text
//! ServerConfig ──from_config──▶ ServerPaths
//!   ① non-empty check   nodesData, edgesData
//!   ② topology          hsgrData             → StaticGraph<E> + checksum
//!   ③ metadata          nodesData, edgesData → coordinates, original edges
//!   ④ spatial index     ramIndex, fileIndex  → StaticRTree
//!   ⑤ timestamp         timestamp            → String ("n/a" if absent)
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use nav_facade::{DataFacade, InternalDataFacade, ServerConfig};
//! use nav_graph::QueryEdgeData;
//!
//! let config = ServerConfig::load(Path::new("data/server.ini"))?;
//! let facade = InternalDataFacade::<QueryEdgeData>::from_config(&config, Path::new("data"))?;
//! println!("{} nodes, checksum {}", facade.node_count(), facade.checksum());
//! ```

pub mod config;
pub mod facade;
pub mod timestamp;

#[cfg(test)]
mod tests;

pub use config::{ServerConfig, ServerPaths};
pub use facade::{DataFacade, InternalDataFacade, NameTable};
pub use timestamp::{load_timestamp, TIMESTAMP_MAX_CHARS, TIMESTAMP_UNAVAILABLE};
