#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("identity provider error: {0}")]
    Provider(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token decode error: {0}")]
    Token(String),
    #[error("backend error during {operation}: status {status:?}: {detail}")]
    Backend {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },
    #[error("configuration error: {0}")]
    Config(String),
}
