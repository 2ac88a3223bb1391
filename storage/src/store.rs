use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::BoxError;

/// Metadata of a stored object, as reported by the service when listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSummary {
    pub name: String,
    pub size: i64,
    pub created: Option<OffsetDateTime>,
}

/// Bucket and object operations used by the walkthrough.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reports whether the bucket exists. Only a "not found" answer yields `Ok(false)`.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, BoxError>;

    async fn create_bucket(&self, project_id: &str, bucket: &str) -> Result<(), BoxError>;

    async fn write_object(&self, bucket: &str, name: &str, content: Vec<u8>) -> Result<(), BoxError>;

    /// Lists every object in the bucket, following page tokens until exhausted.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, BoxError>;

    async fn read_object(&self, bucket: &str, name: &str) -> Result<Vec<u8>, BoxError>;
}
