//! Common interface over trigger strategies.

use async_trait::async_trait;

use crate::error::TriggerResult;
use crate::event::TriggerEvent;

/// A stream of relocation triggers.
///
/// The dispatcher owns exactly one source for the life of the process and never needs to
/// know which strategy it is driving.
#[async_trait]
pub trait TriggerSource: Send {
    /// Short strategy name used in logs.
    fn name(&self) -> &'static str;

    /// Wait for the next trigger. Returns `None` once the source has shut down.
    async fn next_trigger(&mut self) -> Option<TriggerEvent>;

    /// Stop producing triggers and release any subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error when an underlying subscription could not be removed.
    fn shutdown(&mut self) -> TriggerResult<()>;
}
