use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the effect subsystems.
///
/// None of these reach the visitor: every caller contains the failure in
/// the subsystem that hit it and degrades to a missing visual.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown theme {0:?}, expected \"modern\" or \"retro\"")]
    UnknownTheme(String),

    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("dom operation failed: {0}")]
    Dom(String),

    #[error("could not schedule callback: {0}")]
    Scheduler(String),

    #[error("render backend unavailable: {0}")]
    Render(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
