use std::path::PathBuf;

use crate::layout::TrackKind;

/// What an [`AssetReference`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Audio,
    Key,
}

impl From<TrackKind> for AssetKind {
    fn from(kind: TrackKind) -> Self {
        match kind {
            TrackKind::Video => AssetKind::Video,
            TrackKind::Audio => AssetKind::Audio,
        }
    }
}

/// One remote resource to mirror, together with the playlist line that now
/// points at its local name.
#[derive(Debug, Clone)]
pub struct AssetReference {
    pub kind: AssetKind,
    pub remote_url: String,
    pub local_path: PathBuf,
    pub line: String,
}

/// A single unit of work for the fetcher. Carries no state after completion
/// besides the file existing on disk or not.
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub url: String,
    pub path: PathBuf,
}

impl FetchJob {
    pub fn new(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }
}

impl From<&AssetReference> for FetchJob {
    fn from(asset: &AssetReference) -> Self {
        Self {
            url: asset.remote_url.clone(),
            path: asset.local_path.clone(),
        }
    }
}
