//! Single choke point mapping executor wait failures into the job error
//! taxonomy. Pure functions: same failure kind, job name and duration always
//! produce the same error kind and message shape.
use std::time::Duration;

use crate::error::CoreError;
use crate::future::WaitFailure;

/// Map a low-level wait failure to a taxonomy error carrying the job name.
///
/// Mapping, in priority order:
/// - `Failed` with a cause that already is a [`CoreError`] passes through
///   unchanged; any other cause is wrapped as *execution failed*;
/// - `Cancelled` and `Interrupted` become *job execution* errors;
/// - `Unsupported` becomes the unsupported-wait error;
/// - `Unexpected` is wrapped, never swallowed.
///
/// A `TimedOut` reaching this function came from an untimed wait (a primitive
/// misreporting), so the message carries no configured duration; timed waits
/// go through [`translate_timeout`] instead.
pub fn translate(job: &str, failure: WaitFailure) -> CoreError {
    match failure {
        WaitFailure::Failed(cause) => match cause.downcast::<CoreError>() {
            Ok(translated) => *translated,
            Err(cause) => CoreError::ExecutionFailed {
                job: job.to_string(),
                source: cause,
            },
        },
        WaitFailure::Cancelled => CoreError::JobExecution {
            job: job.to_string(),
            message: "wait for completion aborted because the job was cancelled".to_string(),
        },
        WaitFailure::Interrupted => CoreError::JobExecution {
            job: job.to_string(),
            message: "interrupted while waiting for completion".to_string(),
        },
        WaitFailure::TimedOut => CoreError::JobExecution {
            job: job.to_string(),
            message: "failed to wait for completion because the maximal wait time elapsed"
                .to_string(),
        },
        WaitFailure::Unsupported => CoreError::WaitUnsupported {
            job: job.to_string(),
        },
        WaitFailure::Unexpected(cause) => CoreError::Unexpected {
            job: job.to_string(),
            source: cause,
        },
    }
}

/// Timed-wait overload of [`translate`]; the message carries the configured
/// timeout in milliseconds.
pub fn translate_timeout(job: &str, timeout: Duration) -> CoreError {
    CoreError::JobExecution {
        job: job.to_string(),
        message: format!(
            "failed to wait for completion because it took longer than {}ms",
            timeout.as_millis()
        ),
    }
}
