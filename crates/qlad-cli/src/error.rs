use thiserror::Error;

/// Top-level error type for the binary: invalid configuration, a fatal
/// capture or scoring failure, or an invalid run. `main` maps every variant
/// to a one-line diagnostic on stderr and exits non-zero.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Engine(#[from] qlad_engine::Error),

    #[error(transparent)]
    Capture(#[from] qlad_capture::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
