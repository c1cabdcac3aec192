use std::fmt;

/// Identifier of one processing endpoint. Each host gets exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host(String);

impl Host {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Host {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Host {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Raw answer of a host for one URL, before any policy is applied.
pub type HostReply = Result<String, ProcessError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to launch {program}: {message}")]
    Spawn { program: String, message: String },
    #[error("process exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },
    #[error("process produced no output")]
    EmptyOutput,
    #[error("host reported an error: {0}")]
    Reported(String),
    #[error("host error: {0}")]
    Host(String),
    #[error("worker panicked: {0}")]
    Panicked(String),
    #[error("worker pool is not running")]
    PoolUnavailable,
    #[error("task dropped before a worker answered")]
    Dropped,
}
