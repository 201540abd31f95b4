use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Identity of one logical unit of work.
///
/// The registry keys live entries by job equality, so a job type decides
/// what "the same job" means (identity, value, whatever the caller needs).
/// The name is used for diagnostics only and never participates in equality
/// unless the implementor says so.
pub trait Job: Clone + Eq + Hash + Send + Sync {
    /// Human-readable name used in logs and error messages.
    fn name(&self) -> &str;
}

/// Opaque job identifier based on a v4 UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ready-made [`Job`] implementation: a generated identity plus a display name.
///
/// Two descriptors are equal only if they share the same generated id, so each
/// call to [`JobDesc::new`] produces a distinct logical job even when names
/// collide. Callers with their own identity semantics implement [`Job`] on
/// their own type instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDesc {
    /// Stable identity of this job.
    id: JobId,
    /// Diagnostic name attached to errors and log records.
    name: String,
}

impl JobDesc {
    /// Create a descriptor with a fresh id and the given display name.
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: JobId::new(),
            name: name.into(),
        }
    }

    /// Get the job identity.
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Validate the descriptor.
    ///
    /// Rules:
    /// - `name` is not empty or whitespace-only.
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::Invalid("job name is empty".into()));
        }
        Ok(())
    }
}

impl Job for JobDesc {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for JobDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}
