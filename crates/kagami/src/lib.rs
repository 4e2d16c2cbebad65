//! Mirror one rendition of a remote HLS stream into a fully self-contained
//! local playlist tree, then hand the rewritten master playlist to ffmpeg
//! for muxing.
//!
//! The pipeline is strictly ordered; only the fetcher suspends, and each
//! fetch batch completes before the next stage reads the files it wrote:
//!
//! ```text
//! master.m3u8 ──► parse_master ──► build_local_master ──► fetch keys + playlists
//!                                                               │
//!            fetch segments ◄── rewrite_media_playlist ◄────────┘
//!                  │
//!                  └──► ffmpeg -i tmp_master.m3u8 ... output
//! ```

pub mod asset;
pub mod config;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod master;
pub mod media;
pub mod mux;
pub mod pipeline;
pub mod resolver;
mod util;

pub use asset::{AssetKind, AssetReference, FetchJob};
pub use config::{Config, DownloadOptions};
pub use error::{KagamiError, KagamiResult};
pub use layout::TrackKind;
pub use master::Rendition;
pub use pipeline::Pipeline;
