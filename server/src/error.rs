use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error")]
    Config,
    /// Failed to load the error page templates
    #[error("Failed to load error pages")]
    Pages,
    /// Failed to start the HTTP server
    #[error("Failed to start server")]
    ServerStart,
}
