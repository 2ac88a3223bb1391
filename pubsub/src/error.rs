pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to create pubsub client: {0}")]
    Connect(BoxError),

    #[error("failed to check if topic exists: {0}")]
    CheckTopic(BoxError),

    #[error("failed to create topic: {0}")]
    CreateTopic(BoxError),

    #[error("failed to check if subscription exists: {0}")]
    CheckSubscription(BoxError),

    #[error("failed to create subscription: {0}")]
    CreateSubscription(BoxError),

    #[error("failed to publish message {index}: {reason}")]
    Publish { index: usize, reason: BoxError },

    #[error("failed to subscribe: {0}")]
    Receive(BoxError),

    #[error("message listener stopped unexpectedly: {0}")]
    Listener(#[from] tokio::task::JoinError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
