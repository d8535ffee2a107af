use thiserror::Error;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Mirror task failed: {0}")]
    MirrorTask(#[from] tokio::task::JoinError),
}
