use std::{num::NonZeroU32, path::PathBuf};

/// Immutable per-run parameters, shared by reference with every stage.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root for temporary files. The run works inside `<root>/<run_id>/`.
    pub root: PathBuf,
    /// Identifier namespacing this run's working directory.
    pub run_id: String,
    /// URL of the remote master playlist.
    pub url: String,
    /// Maximum number of requests in flight at once.
    pub tasks: NonZeroU32,
    /// Emit a line for each request before it starts.
    pub verbose: bool,
    /// Reuse files that are already present instead of fetching them again.
    pub skip: bool,
}

/// Parameters that only a full download run carries.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Ordinal id of the rendition to mirror, as listed by `extract`.
    pub rendition: usize,
    /// Final output file produced by the muxer.
    pub output: PathBuf,
    /// Arguments inserted between the muxer's input and output.
    pub muxer_args: String,
}
