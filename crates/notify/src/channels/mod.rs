//! Outbound message channels.

pub mod slack;

use async_trait::async_trait;

use crate::error::ChannelError;
use slack::SlackPayload;

/// Seam between the notifier and the network.
///
/// Implementations post one payload per call and resolve once delivery has
/// been attempted. The response is not inspected.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Get the name of this transport.
    fn name(&self) -> &'static str;

    /// Post a payload to the destination.
    async fn post(&self, payload: &SlackPayload) -> Result<(), ChannelError>;
}
