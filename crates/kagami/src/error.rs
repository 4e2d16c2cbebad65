use thiserror::Error;

#[derive(Error, Debug)]
pub enum KagamiError {
    #[error("Unsupported or invalid protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("HTTP error: {0}")]
    HttpError(reqwest::StatusCode),

    #[error("Error downloading {0} file")]
    PlaylistDownload(&'static str),

    #[error("Invalid m3u8 line: {0}")]
    M3u8ParseError(String),

    #[error("Rendition {0} does not exist")]
    RenditionNotFound(usize),

    #[error("Media playlist missing after fetch: {0}")]
    MediaPlaylistMissing(std::path::PathBuf),

    #[error("The download was interrupted")]
    Interrupted,

    #[error("Invalid muxer arguments: {0}")]
    MuxerArguments(String),

    #[error("Muxer exited with status {0}")]
    MuxerFailed(std::process::ExitStatus),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error(transparent)]
    MissingExecutable(#[from] which::Error),
}

pub type KagamiResult<T> = Result<T, KagamiError>;
