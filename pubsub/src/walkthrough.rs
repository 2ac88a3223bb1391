use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::bus::{Delivery, MessageBus, OutgoingMessage};
use crate::config::Config;
use crate::error::{BoxError, Error};

/// Attribute carrying the publish time in RFC 3339.
pub const TIMESTAMP_ATTRIBUTE: &str = "timestamp";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceStatus {
    Created,
    AlreadyExists,
}

/// What happened during one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Payloads in publishing order.
    pub published: Vec<String>,
    /// Server-assigned ids, parallel to `published`.
    pub message_ids: Vec<String>,
    /// Payloads in the order they arrived.
    pub received: Vec<String>,
}

impl RunSummary {
    /// Published payloads that never arrived.
    pub fn missing(&self) -> Vec<&str> {
        let received: HashSet<&str> = self.received.iter().map(String::as_str).collect();
        self.published
            .iter()
            .map(String::as_str)
            .filter(|v| !received.contains(v))
            .collect()
    }
}

pub async fn ensure_topic<B: MessageBus + ?Sized>(bus: &B, config: &Config) -> Result<ResourceStatus, Error> {
    if bus.topic_exists(&config.topic).await.map_err(Error::CheckTopic)? {
        return Ok(ResourceStatus::AlreadyExists);
    }
    bus.create_topic(&config.topic).await.map_err(Error::CreateTopic)?;
    tracing::info!("created topic {}", config.topic);
    Ok(ResourceStatus::Created)
}

pub async fn ensure_subscription<B: MessageBus + ?Sized>(bus: &B, config: &Config) -> Result<ResourceStatus, Error> {
    if bus
        .subscription_exists(&config.subscription)
        .await
        .map_err(Error::CheckSubscription)?
    {
        return Ok(ResourceStatus::AlreadyExists);
    }
    bus.create_subscription(&config.subscription, &config.topic)
        .await
        .map_err(Error::CreateSubscription)?;
    tracing::info!("created subscription {} on {}", config.subscription, config.topic);
    Ok(ResourceStatus::Created)
}

/// Publishes `payload` with a `timestamp` attribute and waits for the service to confirm it.
pub async fn publish_message<B: MessageBus + ?Sized>(bus: &B, topic: &str, payload: &str) -> Result<String, BoxError> {
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339)?;
    let message = OutgoingMessage {
        data: payload.as_bytes().to_vec(),
        attributes: HashMap::from([(TIMESTAMP_ATTRIBUTE.to_string(), timestamp)]),
    };
    bus.publish(topic, message).await
}

/// Attributes as `k=v` pairs sorted by key.
pub fn format_attributes(attributes: &HashMap<String, String>) -> String {
    attributes
        .iter()
        .collect::<BTreeMap<_, _>>()
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Output shared between the publishing sequence and the listener.
struct Output<W>(Arc<Mutex<W>>);

impl<W> Clone for Output<W> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<W: Write> Output<W> {
    fn new(out: W) -> Self {
        Self(Arc::new(Mutex::new(out)))
    }

    fn line(&self, args: fmt::Arguments<'_>) -> std::io::Result<()> {
        let mut out = self.0.lock().unwrap_or_else(|e| e.into_inner());
        out.write_fmt(args)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

/// Prints every delivery and signals once all expected payloads have been seen.
struct Listener<W> {
    out: Output<W>,
    expected: HashSet<String>,
    seen: HashSet<String>,
    received: Vec<String>,
    done: Option<oneshot::Sender<()>>,
}

impl<W: Write> Listener<W> {
    fn new(out: Output<W>, expected: &[String], done: oneshot::Sender<()>) -> Self {
        Self {
            out,
            expected: expected.iter().cloned().collect(),
            seen: HashSet::new(),
            received: vec![],
            done: Some(done),
        }
    }

    fn on_delivery(&mut self, delivery: Delivery) -> Result<(), Error> {
        let payload = String::from_utf8_lossy(&delivery.data).into_owned();
        self.out.line(format_args!("Received message: {payload}"))?;
        if !delivery.attributes.is_empty() {
            self.out
                .line(format_args!("  Attributes: {}", format_attributes(&delivery.attributes)))?;
        }
        tracing::debug!("message_id={} acked", delivery.message_id);

        self.seen.insert(payload.clone());
        self.received.push(payload);
        if self.expected.is_subset(&self.seen) {
            if let Some(done) = self.done.take() {
                let _ = done.send(());
            }
        }
        Ok(())
    }
}

/// The background task: runs the subscription's receive loop and feeds the listener until the
/// loop ends. A listener failure cancels the loop.
async fn receive_messages<B, W>(
    bus: Arc<B>,
    subscription: String,
    mut listener: Listener<W>,
    subscribed: oneshot::Sender<()>,
    cancel: CancellationToken,
) -> Result<Vec<String>, Error>
where
    B: MessageBus + ?Sized,
    W: Write,
{
    listener.out.line(format_args!("Starting message subscriber..."))?;
    let (sender, mut deliveries) = mpsc::unbounded_channel();
    let receive = bus.receive(&subscription, sender, subscribed, cancel.clone());
    let listen = async move {
        // Ends once the receive loop has returned and dropped its sender.
        while let Some(delivery) = deliveries.recv().await {
            if let Err(e) = listener.on_delivery(delivery) {
                cancel.cancel();
                return Err(e);
            }
        }
        Ok(listener.received)
    };
    let (received, listened) = tokio::join!(receive, listen);
    received.map_err(Error::Receive)?;
    listened
}

/// Turns the result of a listener that ended before it was asked to stop into the run's error.
fn listener_failure(result: Result<Result<Vec<String>, Error>, JoinError>) -> Error {
    match result {
        Ok(Ok(_)) => Error::Receive("receive loop ended before the run finished".into()),
        Ok(Err(e)) => e,
        Err(e) => Error::Listener(e),
    }
}

async fn publish_all<B, W>(bus: &B, config: &Config, out: &Output<W>, summary: &mut RunSummary) -> Result<(), Error>
where
    B: MessageBus + ?Sized,
    W: Write,
{
    for (i, payload) in config.numbered_messages().into_iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(config.publish_interval).await;
        }
        let message_id = publish_message(bus, &config.topic, &payload)
            .await
            .map_err(|reason| Error::Publish { index: i + 1, reason })?;
        out.line(format_args!("Published: Message {}", i + 1))?;
        summary.published.push(payload);
        summary.message_ids.push(message_id);
    }
    Ok(())
}

/// Sets up the topic and subscription, starts the listener, publishes the configured messages and
/// waits until the listener has seen all of them or `drain_timeout` elapses.
pub async fn run<B, W>(bus: Arc<B>, config: &Config, out: W) -> Result<RunSummary, Error>
where
    B: MessageBus + ?Sized + 'static,
    W: Write + Send + 'static,
{
    let out = Output::new(out);

    match ensure_topic(bus.as_ref(), config).await? {
        ResourceStatus::Created => out.line(format_args!("Created topic: {}", config.topic))?,
        ResourceStatus::AlreadyExists => out.line(format_args!("Topic '{}' already exists", config.topic))?,
    }
    match ensure_subscription(bus.as_ref(), config).await? {
        ResourceStatus::Created => out.line(format_args!("Created subscription: {}", config.subscription))?,
        ResourceStatus::AlreadyExists => {
            out.line(format_args!("Subscription '{}' already exists", config.subscription))?
        }
    }

    let expected = config.numbered_messages();
    let cancel = CancellationToken::new();
    let (done_sender, done) = oneshot::channel();
    let (subscribed_sender, subscribed) = oneshot::channel();
    let listener = Listener::new(out.clone(), &expected, done_sender);
    let mut handle = tokio::spawn(receive_messages(
        bus.clone(),
        config.subscription.clone(),
        listener,
        subscribed_sender,
        cancel.clone(),
    ));
    if subscribed.await.is_err() {
        cancel.cancel();
        return Err(listener_failure(handle.await));
    }

    let mut summary = RunSummary::default();
    let published = tokio::select! {
        published = publish_all(bus.as_ref(), config, &out, &mut summary) => published,
        listened = &mut handle => {
            cancel.cancel();
            return Err(listener_failure(listened));
        }
    };
    if let Err(e) = published {
        cancel.cancel();
        match handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(listener_error)) => tracing::warn!("listener failed during shutdown: {}", listener_error),
            Err(join_error) => tracing::warn!("listener task failed during shutdown: {}", join_error),
        }
        return Err(e);
    }

    match tokio::time::timeout(config.drain_timeout, done).await {
        Ok(Ok(())) => tracing::debug!("all {} messages received", expected.len()),
        // The listener went away before seeing everything; its result below tells why.
        Ok(Err(_)) => {}
        Err(_) => tracing::debug!("drain timeout of {:?} elapsed", config.drain_timeout),
    }
    cancel.cancel();
    summary.received = handle.await??;

    let missing = summary.missing();
    if !missing.is_empty() {
        tracing::warn!("{} message(s) not received: {:?}", missing.len(), missing);
    }
    out.line(format_args!("Demo completed!"))?;
    Ok(summary)
}
