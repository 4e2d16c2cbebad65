//! One-shot ffmpeg CLI invocation over the rewritten local master playlist.

use std::path::Path;

use tokio::process::Command;

use crate::error::{KagamiError, KagamiResult};

/// Muxes the local playlist tree rooted at `input` into `output`.
///
/// `extra_args` is split shell-style and inserted between the input and the
/// output arguments, so callers control the stream mapping (`-c copy` by
/// default at the CLI).
pub async fn mux(input: &Path, output: &Path, extra_args: &str) -> KagamiResult<()> {
    let ffmpeg = which::which("ffmpeg")?;

    let args = shlex::split(extra_args)
        .ok_or_else(|| KagamiError::MuxerArguments(extra_args.to_string()))?;

    tracing::debug!("Merging with ffmpeg CLI...");

    let mut command = Command::new(ffmpeg);
    command
        .args(["-hide_banner", "-v", "warning"])
        .args(["-allowed_extensions", "ALL"])
        .args(["-protocol_whitelist", "file,http,https,tcp,tls,crypto"])
        .arg("-i")
        .arg(input)
        .args(args)
        .arg(output);

    let status = command.status().await?;
    if !status.success() {
        return Err(KagamiError::MuxerFailed(status));
    }
    Ok(())
}
