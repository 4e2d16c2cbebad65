//! Master-manifest parsing.

use crate::{
    error::{KagamiError, KagamiResult},
    util::attr,
};

/// One variant stream advertised by a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    /// Ordinal index of the `#EXT-X-STREAM-INF:` line in the manifest.
    /// Stable across the whole manifest, so it can be passed back later to
    /// select this rendition.
    pub id: usize,
    /// Advertised bandwidth in bits per second.
    pub bandwidth: u64,
    /// Vertical resolution.
    pub resolution: u32,
    /// URL of the rendition's media playlist.
    pub url: String,
}

/// Collects the variant streams of a master playlist, keeping at most one
/// entry per resolution. When two streams share a resolution the higher
/// bandwidth replaces the kept one in place; the first seen stays on a tie.
///
/// A stream-info line only counts when the following line is its URL. Other
/// tags are skipped; a matched line with a malformed `BANDWIDTH=` or
/// `RESOLUTION=` is an error.
pub fn parse_master(content: &str) -> KagamiResult<Vec<Rendition>> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut renditions: Vec<Rendition> = Vec::new();

    for id in 0..lines.len() {
        let line = lines[id];
        if !line.starts_with("#EXT-X-STREAM-INF:") {
            continue;
        }
        let Some(url) = lines.get(id + 1).filter(|next| next.starts_with("http")) else {
            continue;
        };

        let bandwidth = attr(line, "BANDWIDTH=")
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| KagamiError::M3u8ParseError(line.to_string()))?;
        let resolution = attr(line, "RESOLUTION=")
            .and_then(|value| value.split('x').nth(1))
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| KagamiError::M3u8ParseError(line.to_string()))?;

        let rendition = Rendition {
            id,
            bandwidth,
            resolution,
            url: url.trim().to_string(),
        };
        match renditions.iter_mut().find(|r| r.resolution == resolution) {
            Some(kept) if kept.bandwidth < bandwidth => *kept = rendition,
            Some(_) => {}
            None => renditions.push(rendition),
        }
    }

    Ok(renditions)
}
