//! Working-directory layout of a run and the deterministic local file names
//! every stage agrees on.

use std::path::{Path, PathBuf};

use crate::error::KagamiResult;

/// Remote master playlist, cached as fetched.
pub const MASTER_PLAYLIST: &str = "master.m3u8";
/// Synthesized master playlist referencing only local file names.
pub const LOCAL_MASTER_PLAYLIST: &str = "tmp_master.m3u8";
/// Local copy of the presentation-wide session key.
pub const SESSION_KEY_FILE: &str = "encrypt_tmp_master.key";

/// One media track of the selected rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    fn tag(self) -> char {
        match self {
            TrackKind::Video => 'v',
            TrackKind::Audio => 'a',
        }
    }

    fn extension(self) -> &'static str {
        match self {
            TrackKind::Video => "ts",
            TrackKind::Audio => "aac",
        }
    }

    /// Local name of this track's media playlist.
    pub fn playlist_file(self) -> &'static str {
        match self {
            TrackKind::Video => "tmp_index.m3u8",
            TrackKind::Audio => "tmp_audio.m3u8",
        }
    }

    /// Local name of this track's active encryption key.
    pub fn key_file(self) -> &'static str {
        match self {
            TrackKind::Video => "encrypt_tmp_index.key",
            TrackKind::Audio => "encrypt_tmp_audio.key",
        }
    }
}

/// Local name of the `index`-th segment of a track.
pub fn segment_file(kind: TrackKind, index: usize) -> String {
    format!("seg_{}{}.{}", kind.tag(), index, kind.extension())
}

/// Working directory of a single run, `<root>/<run_id>`.
#[derive(Debug, Clone)]
pub struct RunLayout {
    dir: PathBuf,
}

impl RunLayout {
    pub fn new(root: &Path, run_id: &str) -> Self {
        Self {
            dir: root.join(run_id),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure(&self) -> KagamiResult<()> {
        if !self.dir.exists() {
            tokio::fs::create_dir_all(&self.dir).await?;
        }
        Ok(())
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}
