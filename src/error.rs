use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("http error: {0}")]
    Http(reqwest::Error),
    #[error("invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SmokeError>;

impl SmokeError {
    pub fn is_connection(&self) -> bool { matches!(self, SmokeError::Connection(_)) }
}

// Refused, reset or dropped connections get their own variant so the runner
// can print the "start the server" hint instead of the generic message.
impl From<reqwest::Error> for SmokeError {
    fn from(e: reqwest::Error) -> Self {
        if is_connection_failure(&e) { SmokeError::Connection(e.to_string()) } else { SmokeError::Http(e) }
    }
}

fn is_connection_failure(e: &reqwest::Error) -> bool {
    if e.is_connect() { return true; }
    if e.is_timeout() { return false; }
    // A peer that accepts and then hangs up surfaces as a failed send.
    if e.is_request() { return true; }
    let mut source = std::error::Error::source(e);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if matches!(io.kind(), std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted | std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::UnexpectedEof) {
                return true;
            }
        }
        source = err.source();
    }
    false
}
