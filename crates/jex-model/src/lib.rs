mod error;
pub use error::{ModelError, ModelResult};

mod job;
pub use job::{Job, JobDesc, JobId};
