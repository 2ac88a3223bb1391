use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

/// A message that has been received and acknowledged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    pub message_id: String,
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

/// Topic, subscription, publish and receive operations used by the walkthrough.
///
/// Topic and subscription arguments are ids within the bus's project, not fully qualified names.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn topic_exists(&self, topic: &str) -> Result<bool, BoxError>;

    async fn create_topic(&self, topic: &str) -> Result<(), BoxError>;

    async fn subscription_exists(&self, subscription: &str) -> Result<bool, BoxError>;

    async fn create_subscription(&self, subscription: &str, topic: &str) -> Result<(), BoxError>;

    /// Publishes one message and waits until the service has accepted it.
    /// Returns the server-assigned message id.
    async fn publish(&self, topic: &str, message: OutgoingMessage) -> Result<String, BoxError>;

    /// Streams messages from the subscription into `deliveries` until `cancel` fires.
    /// Every message is acknowledged before it is forwarded.
    ///
    /// `subscribed` fires once the stream is open. It is dropped unsent when subscribing fails.
    async fn receive(
        &self,
        subscription: &str,
        deliveries: UnboundedSender<Delivery>,
        subscribed: oneshot::Sender<()>,
        cancel: CancellationToken,
    ) -> Result<(), BoxError>;
}
