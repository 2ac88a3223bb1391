//! # pubsub-walkthrough
//!
//! Walks through the basic Pub/Sub operations against the local
//! [Pub/Sub emulator](https://cloud.google.com/pubsub/docs/emulator).
//!
//! The topic and subscription are created when missing, a listener is started in the background,
//! four messages are published one after another and the run ends once the listener has received
//! all of them (or the drain timeout elapses). The listener is stopped through a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) rather than left running.
//!
//! ```
//! use std::sync::Arc;
//! use pubsub_walkthrough::cloud::PubSubBus;
//! use pubsub_walkthrough::config::Config;
//! use pubsub_walkthrough::error::Error;
//! use pubsub_walkthrough::walkthrough;
//!
//! async fn run() -> Result<(), Error> {
//!     let config = Config::from_env();
//!     let bus = Arc::new(PubSubBus::connect(&config.emulator_host, &config.project_id).await.map_err(Error::Connect)?);
//!     let summary = walkthrough::run(bus.clone(), &config, std::io::stdout()).await?;
//!     bus.shutdown().await;
//!     assert!(summary.missing().is_empty());
//!     Ok(())
//! }
//! ```
pub mod bus;
pub mod cloud;
pub mod config;
pub mod error;
pub mod walkthrough;
