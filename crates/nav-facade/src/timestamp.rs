//! Dataset timestamp.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use tracing::{debug, warn};

/// Longest timestamp kept, in characters.
pub const TIMESTAMP_MAX_CHARS: usize = 25;

/// Reported when no timestamp is available.
pub const TIMESTAMP_UNAVAILABLE: &str = "n/a";

/// First line of the timestamp file, cut to [`TIMESTAMP_MAX_CHARS`].
///
/// Never fails: a missing, unreadable or empty file yields
/// [`TIMESTAMP_UNAVAILABLE`].
pub fn load_timestamp(path: &Path) -> String {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no timestamp file");
            return TIMESTAMP_UNAVAILABLE.to_owned();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot open timestamp file");
            return TIMESTAMP_UNAVAILABLE.to_owned();
        }
    };

    debug!("loading timestamp");
    let mut line = String::new();
    if let Err(e) = BufReader::new(file).read_line(&mut line) {
        warn!(path = %path.display(), error = %e, "cannot read timestamp file");
        return TIMESTAMP_UNAVAILABLE.to_owned();
    }

    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return TIMESTAMP_UNAVAILABLE.to_owned();
    }
    line.chars().take(TIMESTAMP_MAX_CHARS).collect()
}
