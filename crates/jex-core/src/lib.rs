pub mod error;
pub mod future;
pub mod registry;
pub mod translate;

pub mod prelude {
    pub use crate::error::{BoxError, CoreError, CoreResult};
    pub use crate::future::{
        CompletionCell, CompletionPrimitive, InterruptFlag, JobFuture, RunNowFuture, WaitFailure,
    };
    pub use crate::registry::JobMap;
    pub use jex_model::{Job, JobDesc};
}
