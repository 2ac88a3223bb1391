//! # storage-walkthrough
//!
//! Walks through the basic Cloud Storage operations against a local emulator such as
//! [fake-gcs-server](https://github.com/fsouza/fake-gcs-server):
//!
//! 1. ensure the bucket exists, creating it when the service reports it missing
//! 2. upload one object
//! 3. list every object in the bucket
//! 4. download the object again
//!
//! ```
//! use storage_walkthrough::config::Config;
//! use storage_walkthrough::gcs::GcsStore;
//! use storage_walkthrough::walkthrough;
//!
//! async fn run() -> Result<(), storage_walkthrough::error::Error> {
//!     let config = Config::from_env();
//!     let store = GcsStore::new(&config.endpoint);
//!     walkthrough::run(&store, &config, &mut std::io::stdout()).await
//! }
//! ```
pub mod config;
pub mod error;
pub mod gcs;
pub mod store;
pub mod walkthrough;
