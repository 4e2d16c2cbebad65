//! Media-playlist rewriting: every segment and key reference of a fetched
//! playlist is renamed to a deterministic local file, and the remote
//! original is queued for the fetch stage.

use std::path::Path;

use crate::{
    asset::{AssetKind, AssetReference},
    error::{KagamiError, KagamiResult},
    layout::{segment_file, RunLayout, TrackKind},
    util::{base_uri, quoted_attr},
};

/// Rewrites one media playlist. Relative segment URIs are resolved against
/// the playlist's own base URI (`source_url` minus query string and last
/// path segment); segments are numbered with a zero-based running counter;
/// every `#EXT-X-KEY:` URI is redirected to the track's single local key
/// file, repeated key tags overwriting the same reference.
pub fn rewrite_playlist(
    content: &str,
    source_url: &str,
    kind: TrackKind,
    layout: &RunLayout,
) -> KagamiResult<(String, Vec<AssetReference>)> {
    let base = base_uri(source_url);
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let mut assets = Vec::new();
    let mut index = 0;

    for i in 0..lines.len() {
        if lines[i].starts_with("#EXTINF:") {
            if i + 1 >= lines.len() {
                return Err(KagamiError::M3u8ParseError(lines[i].clone()));
            }
            let uri = &lines[i + 1];
            let url = if uri.starts_with("http") {
                uri.clone()
            } else {
                format!("{base}/{uri}")
            };

            let file = segment_file(kind, index);
            assets.push(AssetReference {
                kind: kind.into(),
                remote_url: url,
                local_path: layout.path(&file),
                line: file.clone(),
            });
            lines[i + 1] = file;
            index += 1;
        } else if lines[i].starts_with("#EXT-X-KEY:") {
            let url = quoted_attr(&lines[i], "URI=\"")
                .ok_or_else(|| KagamiError::M3u8ParseError(lines[i].clone()))?
                .to_string();
            let file = kind.key_file();
            let rewritten = lines[i].replace(&url, file);
            assets.push(AssetReference {
                kind: AssetKind::Key,
                remote_url: url,
                local_path: layout.path(file),
                line: rewritten.clone(),
            });
            lines[i] = rewritten;
        }
    }

    Ok((lines.join("\n"), assets))
}

/// Rewrites the playlist at `path` in place and returns the assets it now
/// references. Safe to call once per fetched playlist.
pub async fn rewrite_media_playlist(
    path: &Path,
    source_url: &str,
    kind: TrackKind,
    layout: &RunLayout,
) -> KagamiResult<Vec<AssetReference>> {
    let content = tokio::fs::read_to_string(path).await?;
    let (rewritten, assets) = rewrite_playlist(&content, source_url, kind, layout)?;
    tokio::fs::write(path, rewritten).await?;
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn layout() -> RunLayout {
        RunLayout::new(Path::new("tmp"), "test")
    }

    const PLAYLIST: &str = "#EXTM3U
#EXT-X-TARGETDURATION:10
#EXT-X-KEY:METHOD=AES-128,URI=\"https://example.com/hls/1080/file.key\",IV=0x1234
#EXTINF:9.009,
seg-000.ts
#EXTINF:9.009,
seg-001.ts
#EXTINF:4.129,
https://other.example.com/seg-002.ts
#EXT-X-ENDLIST";

    #[test]
    fn test_segments_are_renamed_in_order() {
        let (rewritten, assets) = rewrite_playlist(
            PLAYLIST,
            "https://example.com/hls/1080/index.m3u8?token=abc",
            TrackKind::Video,
            &layout(),
        )
        .unwrap();

        let lines: Vec<&str> = rewritten.split('\n').collect();
        assert_eq!(lines[4], "seg_v0.ts");
        assert_eq!(lines[6], "seg_v1.ts");
        assert_eq!(lines[8], "seg_v2.ts");

        let segments: Vec<&AssetReference> = assets
            .iter()
            .filter(|a| a.kind == AssetKind::Video)
            .collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[0].remote_url,
            "https://example.com/hls/1080/seg-000.ts"
        );
        assert_eq!(
            segments[1].remote_url,
            "https://example.com/hls/1080/seg-001.ts"
        );
        // absolute URIs pass through untouched
        assert_eq!(segments[2].remote_url, "https://other.example.com/seg-002.ts");
        assert_eq!(segments[0].local_path, layout().path("seg_v0.ts"));
    }

    #[test]
    fn test_key_reference_is_relocated() {
        let (rewritten, assets) = rewrite_playlist(
            PLAYLIST,
            "https://example.com/hls/1080/index.m3u8",
            TrackKind::Video,
            &layout(),
        )
        .unwrap();

        assert!(rewritten
            .contains("#EXT-X-KEY:METHOD=AES-128,URI=\"encrypt_tmp_index.key\",IV=0x1234"));
        let key = &assets[0];
        assert_eq!(key.kind, AssetKind::Key);
        assert_eq!(key.remote_url, "https://example.com/hls/1080/file.key");
        assert_eq!(key.local_path, layout().path("encrypt_tmp_index.key"));
    }

    #[test]
    fn test_audio_naming_and_key_file() {
        let playlist = "#EXTINF:5.0,
part-000.aac
#EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\"
#EXTINF:5.0,
part-001.aac";
        let (rewritten, assets) = rewrite_playlist(
            playlist,
            "https://example.com/audio/192/index.m3u8",
            TrackKind::Audio,
            &layout(),
        )
        .unwrap();

        assert!(rewritten.contains("seg_a0.aac"));
        assert!(rewritten.contains("seg_a1.aac"));
        assert!(rewritten.contains("URI=\"encrypt_tmp_audio.key\""));
        assert_eq!(assets.len(), 3);
        assert_eq!(assets[1].remote_url, "key.bin");
    }

    #[test]
    fn test_repeated_keys_share_one_local_file() {
        let playlist = "#EXT-X-KEY:METHOD=AES-128,URI=\"first.key\"
#EXTINF:5.0,
a.ts
#EXT-X-KEY:METHOD=AES-128,URI=\"second.key\"
#EXTINF:5.0,
b.ts";
        let (_, assets) = rewrite_playlist(
            playlist,
            "https://example.com/v/index.m3u8",
            TrackKind::Video,
            &layout(),
        )
        .unwrap();

        let keys: Vec<&AssetReference> =
            assets.iter().filter(|a| a.kind == AssetKind::Key).collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].local_path, keys[1].local_path);
    }

    #[test]
    fn test_extinf_without_uri_line_is_fatal() {
        let playlist = "#EXTM3U
#EXTINF:5.0,";
        assert!(matches!(
            rewrite_playlist(
                playlist,
                "https://example.com/v/index.m3u8",
                TrackKind::Video,
                &layout(),
            ),
            Err(KagamiError::M3u8ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_rewrite_in_place() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let layout = RunLayout::new(dir.path(), "run");
        layout.ensure().await?;
        let path = layout.path("tmp_index.m3u8");
        tokio::fs::write(&path, PLAYLIST).await?;

        let assets = rewrite_media_playlist(
            &path,
            "https://example.com/hls/1080/index.m3u8",
            TrackKind::Video,
            &layout,
        )
        .await?;

        let rewritten = tokio::fs::read_to_string(&path).await?;
        assert!(rewritten.contains("seg_v0.ts"));
        assert!(!rewritten.contains("seg-000.ts"));
        assert_eq!(assets.len(), 4);
        Ok(())
    }
}
