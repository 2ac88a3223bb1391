//! Runs against a live emulator: `docker run -p 4443:4443 fsouza/fake-gcs-server -scheme http`,
//! then `cargo test -p storage-walkthrough -- --ignored`.
use serial_test::serial;
use uuid::Uuid;

use storage_walkthrough::config::Config;
use storage_walkthrough::gcs::GcsStore;
use storage_walkthrough::store::ObjectStore;
use storage_walkthrough::walkthrough::{self, BucketStatus};

#[ctor::ctor]
fn init() {
    let _ = tracing_subscriber::fmt().with_env_filter("storage_walkthrough=trace").try_init();
}

fn config() -> Config {
    Config {
        bucket: format!("rust-walkthrough-{}", Uuid::new_v4()),
        ..Config::from_env()
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a storage emulator"]
async fn test_ensure_bucket_twice() {
    let config = config();
    let store = GcsStore::new(&config.endpoint);
    assert!(!store.bucket_exists(&config.bucket).await.unwrap());
    assert_eq!(
        walkthrough::ensure_bucket(&store, &config).await.unwrap(),
        BucketStatus::Created
    );
    assert_eq!(
        walkthrough::ensure_bucket(&store, &config).await.unwrap(),
        BucketStatus::AlreadyExists
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires a storage emulator"]
async fn test_empty_bucket() {
    let config = config();
    let store = GcsStore::new(&config.endpoint);
    walkthrough::ensure_bucket(&store, &config).await.unwrap();
    let listed = walkthrough::list_files(&store, &config).await.unwrap();
    assert!(listed.is_empty(), "{listed:?}");
}

#[tokio::test]
#[serial]
#[ignore = "requires a storage emulator"]
async fn test_write_list_read() {
    let config = config();
    let store = GcsStore::new(&config.endpoint);
    let mut out = vec![];
    walkthrough::run(&store, &config, &mut out).await.unwrap();

    let listed = walkthrough::list_files(&store, &config).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, config.object_name);
    assert_eq!(listed[0].size, config.content.len() as i64);

    let data = walkthrough::read_file(&store, &config).await.unwrap();
    assert_eq!(data, config.content.as_bytes());

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(&format!("Content: {}", config.content)), "{text}");
}
