use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use google_cloud_gax::conn::Environment;
use google_cloud_googleapis::pubsub::v1::PubsubMessage;
use google_cloud_pubsub::client::{Client, ClientConfig};
use google_cloud_pubsub::publisher::Publisher;
use google_cloud_pubsub::subscription::SubscriptionConfig;

use crate::bus::{Delivery, MessageBus, OutgoingMessage};
use crate::error::BoxError;

/// [`MessageBus`] backed by the Pub/Sub gRPC API of an emulator.
pub struct PubSubBus {
    client: Client,
    publishers: Mutex<HashMap<String, Publisher>>,
}

impl PubSubBus {
    /// Connects to the emulator at `emulator_host` (`host:port`) on behalf of `project_id`.
    pub async fn connect(emulator_host: &str, project_id: &str) -> Result<Self, BoxError> {
        let config = ClientConfig {
            project_id: Some(project_id.to_string()),
            environment: Environment::Emulator(emulator_host.to_string()),
            ..Default::default()
        };
        let client = Client::new(config).await?;
        Ok(Self {
            client,
            publishers: Mutex::new(HashMap::new()),
        })
    }

    /// One publisher per topic, started on first use.
    fn publisher(&self, topic: &str) -> Publisher {
        let mut publishers = self.publishers.lock().unwrap_or_else(|e| e.into_inner());
        publishers
            .entry(topic.to_string())
            .or_insert_with(|| self.client.topic(topic).new_publisher(None))
            .clone()
    }

    /// Flushes and stops every publisher started by this bus.
    pub async fn shutdown(&self) {
        let publishers: Vec<(String, Publisher)> = {
            let mut publishers = self.publishers.lock().unwrap_or_else(|e| e.into_inner());
            publishers.drain().collect()
        };
        for (topic, mut publisher) in publishers {
            publisher.shutdown().await;
            tracing::debug!("publisher for {} stopped", topic);
        }
    }
}

#[async_trait]
impl MessageBus for PubSubBus {
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn topic_exists(&self, topic: &str) -> Result<bool, BoxError> {
        Ok(self.client.topic(topic).exists(None).await?)
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn create_topic(&self, topic: &str) -> Result<(), BoxError> {
        self.client.topic(topic).create(None, None).await?;
        Ok(())
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn subscription_exists(&self, subscription: &str) -> Result<bool, BoxError> {
        Ok(self.client.subscription(subscription).exists(None).await?)
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn create_subscription(&self, subscription: &str, topic: &str) -> Result<(), BoxError> {
        let topic = self.client.topic(topic);
        self.client
            .subscription(subscription)
            .create(topic.fully_qualified_name(), SubscriptionConfig::default(), None)
            .await?;
        Ok(())
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn publish(&self, topic: &str, message: OutgoingMessage) -> Result<String, BoxError> {
        let message = PubsubMessage {
            data: message.data,
            attributes: message.attributes,
            ..Default::default()
        };
        let message_id = self.publisher(topic).publish(message).await.get().await?;
        tracing::debug!("published message_id={}", message_id);
        Ok(message_id)
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn receive(
        &self,
        subscription: &str,
        deliveries: UnboundedSender<Delivery>,
        subscribed: oneshot::Sender<()>,
        cancel: CancellationToken,
    ) -> Result<(), BoxError> {
        let mut stream = self.client.subscription(subscription).subscribe(None).await?;
        let _ = subscribed.send(());
        while let Some(message) = tokio::select! {
            v = stream.next() => v,
            _ = cancel.cancelled() => None,
        } {
            let message_id = message.message.message_id.clone();
            if let Err(e) = message.ack().await {
                tracing::error!("failed to ack message_id={}: {:?}", message_id, e);
                continue;
            }
            let delivery = Delivery {
                message_id,
                data: message.message.data,
                attributes: message.message.attributes,
            };
            if deliveries.send(delivery).is_err() {
                tracing::debug!("delivery channel closed, stop receiving");
                break;
            }
        }
        let unprocessed = stream.dispose().await;
        tracing::debug!("subscriber stopped, {} unprocessed message(s) nacked", unprocessed);
        Ok(())
    }
}
