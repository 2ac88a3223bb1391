//! Runs against a live emulator: `gcloud beta emulators pubsub start --host-port=localhost:8085`,
//! then `cargo test -p pubsub-walkthrough -- --ignored`.
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use pubsub_walkthrough::bus::MessageBus;
use pubsub_walkthrough::cloud::PubSubBus;
use pubsub_walkthrough::config::Config;
use pubsub_walkthrough::walkthrough::{self, ResourceStatus, TIMESTAMP_ATTRIBUTE};

#[ctor::ctor]
fn init() {
    let _ = tracing_subscriber::fmt().with_env_filter("pubsub_walkthrough=trace").try_init();
}

fn config() -> Config {
    let uuid = Uuid::new_v4().to_string();
    Config {
        topic: format!("t{uuid}"),
        subscription: format!("s{uuid}"),
        publish_interval: Duration::from_millis(100),
        drain_timeout: Duration::from_secs(30),
        ..Config::from_env()
    }
}

async fn connect(config: &Config) -> Arc<PubSubBus> {
    Arc::new(
        PubSubBus::connect(&config.emulator_host, &config.project_id)
            .await
            .unwrap(),
    )
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore = "requires a pubsub emulator"]
async fn test_setup_twice() {
    let config = config();
    let bus = connect(&config).await;
    assert_eq!(
        walkthrough::ensure_topic(bus.as_ref(), &config).await.unwrap(),
        ResourceStatus::Created
    );
    assert_eq!(
        walkthrough::ensure_subscription(bus.as_ref(), &config).await.unwrap(),
        ResourceStatus::Created
    );
    assert_eq!(
        walkthrough::ensure_topic(bus.as_ref(), &config).await.unwrap(),
        ResourceStatus::AlreadyExists
    );
    assert_eq!(
        walkthrough::ensure_subscription(bus.as_ref(), &config).await.unwrap(),
        ResourceStatus::AlreadyExists
    );
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore = "requires a pubsub emulator"]
async fn test_run_receives_every_message() {
    let config = config();
    let bus = connect(&config).await;
    let summary = walkthrough::run(bus.clone(), &config, std::io::sink()).await.unwrap();
    bus.shutdown().await;

    let expected: HashSet<String> = config.numbered_messages().into_iter().collect();
    let received: HashSet<String> = summary.received.into_iter().collect();
    assert_eq!(expected, received);
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore = "requires a pubsub emulator"]
async fn test_timestamp_attribute_arrives() {
    let config = config();
    let bus = connect(&config).await;
    walkthrough::ensure_topic(bus.as_ref(), &config).await.unwrap();
    walkthrough::ensure_subscription(bus.as_ref(), &config).await.unwrap();
    let message_id = walkthrough::publish_message(bus.as_ref(), &config.topic, "with attributes")
        .await
        .unwrap();

    let (sender, mut receiver) = mpsc::unbounded_channel();
    let (subscribed_sender, _subscribed) = oneshot::channel();
    let cancel = CancellationToken::new();
    let task = {
        let bus = bus.clone();
        let cancel = cancel.clone();
        let subscription = config.subscription.clone();
        tokio::spawn(async move { bus.receive(&subscription, sender, subscribed_sender, cancel).await })
    };
    let delivery = tokio::time::timeout(Duration::from_secs(30), receiver.recv())
        .await
        .unwrap()
        .unwrap();
    cancel.cancel();
    task.await.unwrap().unwrap();
    bus.shutdown().await;

    assert_eq!(delivery.message_id, message_id);
    assert_eq!(delivery.data, b"with attributes");
    assert!(delivery.attributes.contains_key(TIMESTAMP_ATTRIBUTE));
}
