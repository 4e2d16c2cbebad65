//! Rendition resolution: turns a master manifest and a selected rendition id
//! into a synthesized local master playlist plus the ordered list of assets
//! the playlist now references.

use crate::{
    asset::{AssetKind, AssetReference},
    error::{KagamiError, KagamiResult},
    layout::{RunLayout, TrackKind, SESSION_KEY_FILE},
    util::{attr, quoted_attr},
};

/// Outcome of resolving one rendition against a master manifest.
#[derive(Debug, Clone)]
pub struct LocalMaster {
    /// Assets to fetch before the media playlists can be rewritten. Order:
    /// session key (if any), audio playlist (if any), video playlist.
    pub assets: Vec<AssetReference>,
    /// Synthesized master playlist text referencing only local file names.
    pub playlist: String,
}

struct AudioCandidate {
    line: String,
    url: String,
    rate: u32,
}

/// Resolves the stream-info line at ordinal index `selected` together with
/// the presentation-wide session key (first declaration wins) and the
/// highest-bitrate audio group.
///
/// Pure with respect to its inputs: the same manifest and selection always
/// produce byte-identical output.
pub fn build_local_master(
    content: &str,
    selected: usize,
    layout: &RunLayout,
) -> KagamiResult<LocalMaster> {
    let lines: Vec<&str> = content.split('\n').collect();

    let mut session_key: Option<AssetReference> = None;
    let mut audio: Option<AudioCandidate> = None;
    let mut stream: Option<(String, String)> = None;

    for i in 0..lines.len() {
        let line = lines[i];
        if line.starts_with("#EXT-X-SESSION-KEY:") {
            if session_key.is_some() {
                continue;
            }
            let url = quoted_attr(line, "URI=\"")
                .ok_or_else(|| KagamiError::M3u8ParseError(line.to_string()))?;
            session_key = Some(AssetReference {
                kind: AssetKind::Key,
                remote_url: url.to_string(),
                local_path: layout.path(SESSION_KEY_FILE),
                line: line.replace(url, SESSION_KEY_FILE),
            });
        } else if line.starts_with("#EXT-X-MEDIA:TYPE=AUDIO,") {
            let group_id = quoted_attr(line, "GROUP-ID=\"")
                .ok_or_else(|| KagamiError::M3u8ParseError(line.to_string()))?
                .to_lowercase();
            let name = quoted_attr(line, "NAME=\"")
                .ok_or_else(|| KagamiError::M3u8ParseError(line.to_string()))?;
            let url = quoted_attr(line, "URI=\"")
                .ok_or_else(|| KagamiError::M3u8ParseError(line.to_string()))?;

            // A group id that is literally "audio" carries no bitrate; the
            // NAME attribute does instead.
            let rate = parse_bitrate(if group_id == "audio" { name } else { &group_id });
            if audio.as_ref().map_or(true, |kept| rate > kept.rate) {
                let file = TrackKind::Audio.playlist_file();
                audio = Some(AudioCandidate {
                    line: format!(
                        "#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"audio\",NAME=\"AAC_und_ch2_{rate}kbps\",CHANNELS=\"2\",URI=\"{file}\""
                    ),
                    url: url.to_string(),
                    rate,
                });
            }
        } else if i == selected {
            let bandwidth = attr(line, "BANDWIDTH=")
                .ok_or_else(|| KagamiError::M3u8ParseError(line.to_string()))?;
            let resolution = attr(line, "RESOLUTION=")
                .ok_or_else(|| KagamiError::M3u8ParseError(line.to_string()))?;
            let codecs = quoted_attr(line, "CODECS=\"")
                .ok_or_else(|| KagamiError::M3u8ParseError(line.to_string()))?;
            let url = lines
                .get(i + 1)
                .map(|next| next.trim())
                .filter(|next| !next.is_empty())
                .ok_or(KagamiError::RenditionNotFound(selected))?;

            stream = Some((
                format!(
                    "#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH={bandwidth},RESOLUTION={resolution},CODECS=\"{codecs}\""
                ),
                url.to_string(),
            ));
        }
    }

    let Some((mut stream_line, stream_url)) = stream else {
        return Err(KagamiError::RenditionNotFound(selected));
    };

    let mut assets = Vec::new();
    let mut master = vec!["#EXTM3U".to_string(), "#EXT-X-VERSION:4".to_string()];

    if let Some(key) = session_key {
        master.push(key.line.clone());
        assets.push(key);
    }
    if let Some(audio) = audio {
        master.push(audio.line.clone());
        assets.push(AssetReference {
            kind: AssetKind::Audio,
            remote_url: audio.url,
            local_path: layout.path(TrackKind::Audio.playlist_file()),
            line: audio.line,
        });
        stream_line.push_str(",AUDIO=\"audio\"");
    }
    master.push(stream_line.clone());
    master.push(TrackKind::Video.playlist_file().to_string());
    assets.push(AssetReference {
        kind: AssetKind::Video,
        remote_url: stream_url,
        local_path: layout.path(TrackKind::Video.playlist_file()),
        line: stream_line,
    });

    Ok(LocalMaster {
        assets,
        playlist: master.join("\n"),
    })
}

/// Bitrate hidden in an attribute value, e.g. `AAC_192` or `128kbps`.
/// Defaults to 128 when no digits are left after stripping.
fn parse_bitrate(value: &str) -> u32 {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(128)
}
