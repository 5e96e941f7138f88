use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("phase engine was already started")]
    AlreadyStarted,
    #[error("invalid cycle config: {0}")]
    InvalidConfig(String),
    #[error("failed to spawn phase cycle thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("phase cycle thread panicked")]
    CycleThreadPanicked,
}
