/// Errors raised while starting or running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub type WebResult<T> = std::result::Result<T, WebError>;
