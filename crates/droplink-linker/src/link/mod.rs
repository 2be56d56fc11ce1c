//! Link creation engine

pub mod linker;

pub use linker::{LinkStats, Linker, DEFAULT_FAN_OUT};

use camino::Utf8PathBuf;

/// One link operation: materialize `source` as `dest_dir/dest_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTask {
    /// Raw source path, possibly a UNC share reference.
    pub source: String,
    /// Directory the link lands in.
    pub dest_dir: Utf8PathBuf,
    /// Name of the link inside `dest_dir`.
    pub dest_name: String,
}
