use thiserror::Error;

/// Boxed cause preserved through the taxonomy.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Caller-facing error taxonomy of the job core.
///
/// Every variant carries the name of the job it belongs to, readable through
/// [`CoreError::job`], so log processing can filter by job without parsing
/// message text.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Registration attempted for a job identity with an existing live entry.
    #[error("job rejected because it is already running [job={job}]")]
    Rejected { job: String },

    /// Cancellation, interruption or timeout observed while waiting for completion.
    #[error("{message} [job={job}]")]
    JobExecution { job: String, message: String },

    /// The job body raised a failure; the original cause is preserved.
    #[error("job execution failed [job={job}]")]
    ExecutionFailed {
        job: String,
        #[source]
        source: BoxError,
    },

    /// Failure mode outside the executor's documented vocabulary.
    #[error("unexpected error during job execution [job={job}]")]
    Unexpected {
        job: String,
        #[source]
        source: BoxError,
    },

    /// Blocking wait requested on a handle that forbids it (synchronous execution).
    #[error("blocking wait is not supported on a synchronous job future [job={job}]")]
    WaitUnsupported { job: String },
}

impl CoreError {
    /// Name of the job this error belongs to.
    pub fn job(&self) -> &str {
        match self {
            CoreError::Rejected { job }
            | CoreError::JobExecution { job, .. }
            | CoreError::ExecutionFailed { job, .. }
            | CoreError::Unexpected { job, .. }
            | CoreError::WaitUnsupported { job } => job,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
