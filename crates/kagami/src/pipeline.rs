//! Strictly ordered orchestration of a run: parse, resolve, fetch the
//! playlist tree, rewrite, fetch segments, mux. Later stages depend on files
//! written by earlier fetch batches, so each batch is awaited in full before
//! the pipeline advances.

use std::path::Path;

use reqwest::Client;

use crate::{
    asset::{AssetKind, FetchJob},
    config::{Config, DownloadOptions},
    error::{KagamiError, KagamiResult},
    fetch::ParallelFetcher,
    layout::{RunLayout, TrackKind, LOCAL_MASTER_PLAYLIST, MASTER_PLAYLIST, SESSION_KEY_FILE},
    master::{parse_master, Rendition},
    media::rewrite_media_playlist,
    mux,
    resolver::build_local_master,
};

pub struct Pipeline {
    config: Config,
    layout: RunLayout,
    fetcher: ParallelFetcher,
}

impl Pipeline {
    pub fn new(config: Config, client: Client) -> Self {
        let layout = RunLayout::new(&config.root, &config.run_id);
        let fetcher = ParallelFetcher::new(
            client,
            config.run_id.clone(),
            config.tasks,
            config.verbose,
        );
        Self {
            config,
            layout,
            fetcher,
        }
    }

    /// Lists the renditions advertised by the remote master playlist.
    pub async fn extract(&self) -> KagamiResult<Vec<Rendition>> {
        let content = self.master_content().await?;
        parse_master(&content)
    }

    /// Mirrors the selected rendition, muxes it into `opts.output` and
    /// removes the run directory on success.
    pub async fn download(&self, opts: &DownloadOptions) -> KagamiResult<()> {
        if opts.output.exists() {
            if self.config.skip {
                log::warn!("File not downloaded because it already exists.");
                return Ok(());
            }
            tokio::fs::remove_file(&opts.output).await?;
            log::warn!("Existing file deleted.");
        }

        self.prepare(opts.rendition).await?;

        log::info!("Merging video with ffmpeg in progress...");
        mux::mux(
            &self.layout.path(LOCAL_MASTER_PLAYLIST),
            &opts.output,
            &opts.muxer_args,
        )
        .await?;
        log::info!("The video has been downloaded.");

        tokio::fs::remove_dir_all(self.layout.dir()).await?;
        Ok(())
    }

    /// Materializes the self-contained local copy of the rendition: the
    /// synthesized master, both media playlists, key files and every
    /// segment, all referencing local names only.
    pub async fn prepare(&self, rendition: usize) -> KagamiResult<()> {
        let content = self.master_content().await?;
        let renditions = parse_master(&content)?;
        if !renditions.iter().any(|r| r.id == rendition) {
            return Err(KagamiError::RenditionNotFound(rendition));
        }

        self.clear_local_tree().await?;

        let local = build_local_master(&content, rendition, &self.layout)?;
        tokio::fs::write(self.layout.path(LOCAL_MASTER_PLAYLIST), &local.playlist).await?;

        self.fetcher
            .fetch_all(local.assets.iter().map(FetchJob::from).collect())
            .await?;

        let mut segments = Vec::new();
        for asset in &local.assets {
            let kind = match asset.kind {
                AssetKind::Video => TrackKind::Video,
                AssetKind::Audio => TrackKind::Audio,
                AssetKind::Key => continue,
            };
            if !asset.local_path.exists() {
                return Err(KagamiError::MediaPlaylistMissing(asset.local_path.clone()));
            }
            let assets =
                rewrite_media_playlist(&asset.local_path, &asset.remote_url, kind, &self.layout)
                    .await?;
            segments.extend(assets.iter().map(FetchJob::from));
        }

        self.fetcher.fetch_all(segments).await
    }

    /// Fetched master manifest, cached as `master.m3u8` in the run
    /// directory. Without the skip flag a cached copy is discarded first;
    /// an empty download is treated as absent.
    async fn master_content(&self) -> KagamiResult<String> {
        self.layout.ensure().await?;
        let path = self.layout.path(MASTER_PLAYLIST);
        if !self.config.skip && path.exists() {
            tokio::fs::remove_file(&path).await?;
        }
        if !path.exists() {
            self.fetcher
                .fetch_all(vec![FetchJob::new(self.config.url.as_str(), &path)])
                .await?;
        }
        match read_playlist(&path).await? {
            Some(content) => Ok(content),
            None => {
                log::error!("Error downloading master file.");
                Err(KagamiError::PlaylistDownload("master"))
            }
        }
    }

    /// Resets the rewritable part of the local tree. Segments stay so an
    /// interrupted run can resume; playlists and keys are rebuilt from
    /// scratch.
    async fn clear_local_tree(&self) -> KagamiResult<()> {
        for name in [
            SESSION_KEY_FILE,
            TrackKind::Audio.key_file(),
            TrackKind::Video.key_file(),
            TrackKind::Audio.playlist_file(),
            TrackKind::Video.playlist_file(),
        ] {
            let path = self.layout.path(name);
            if path.exists() {
                tokio::fs::remove_file(path).await?;
            }
        }
        Ok(())
    }
}

/// Removes every temporary file below the working-directory root. Cleanup is
/// an explicit operation; failed runs keep their files for inspection and
/// resumption.
pub async fn clear(root: &Path) -> KagamiResult<()> {
    if root.exists() {
        tokio::fs::remove_dir_all(root).await?;
    }
    Ok(())
}

/// Reads a cached playlist, deleting an empty file and reporting it absent
/// so a later run fetches it again.
async fn read_playlist(path: &Path) -> KagamiResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = tokio::fs::read_to_string(path).await?;
    if content.is_empty() {
        tokio::fs::remove_file(path).await?;
        return Ok(None);
    }
    Ok(Some(content))
}
