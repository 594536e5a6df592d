use thiserror::Error;

/// Errors surfaced by the engine/detector/controller layer. Wraps
/// [`qlad_core::Error`] (scoring failures) and [`qlad_capture::Error`]
/// (capture-source failures) behind one type so `qlad-cli`'s `main` has a
/// single `Result` to match on.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] qlad_core::Error),

    #[error(transparent)]
    Capture(#[from] qlad_capture::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
