/// Errors.

/// Everything that can go wrong. All of it is fatal.
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    BadConfig,
    ConnectError(String),
    QueryError(String),
    DecodeError(String),
    WorkerPanicked(String),
}

impl Error {
    /// Process exit code for this error, see sysexits(3).
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::BadConfig => exitcode::CONFIG,
            Error::ConnectError(_) => exitcode::UNAVAILABLE,
            Error::QueryError(_) | Error::DecodeError(_) | Error::WorkerPanicked(_) => {
                exitcode::SOFTWARE
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BadConfig => write!(f, "bad configuration"),
            Error::ConnectError(err) => write!(f, "could not connect: {}", err),
            Error::QueryError(err) => write!(f, "query failed: {}", err),
            Error::DecodeError(err) => write!(f, "could not read result: {}", err),
            Error::WorkerPanicked(err) => write!(f, "worker panicked: {}", err),
        }
    }
}

impl std::error::Error for Error {}
