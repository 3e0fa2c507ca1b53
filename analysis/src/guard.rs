//! Running analysis steps so that panics become [`Failure`] values

use crate::crash::Failure;
use crate::crash::StackFrame;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::warn;

impl Failure {
    /// Build a failure from a caught panic payload
    pub fn from_panic_payload(payload: &(dyn Any + Send), frames: Vec<StackFrame>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            Some((*message).to_string())
        } else {
            payload.downcast_ref::<String>().cloned()
        };
        Self { message, frames }
    }
}

/// Run `step`, converting a panic into a [`Failure`] located at `frame`.
///
/// `frame` names the analysis step being run; it becomes the failure's
/// only stack frame.
pub fn catch_failure<T, F>(frame: StackFrame, step: F) -> Result<T, Failure>
where
    F: FnOnce() -> T,
{
    match std::panic::catch_unwind(AssertUnwindSafe(step)) {
        Ok(value) => Ok(value),
        Err(payload) => {
            let failure = Failure::from_panic_payload(payload.as_ref(), vec![frame]);
            warn!(failure = %failure, "analysis step panicked");
            Err(failure)
        }
    }
}
