use async_trait::async_trait;

use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::buckets::get::GetBucketRequest;
use google_cloud_storage::http::buckets::insert::{InsertBucketParam, InsertBucketRequest};
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::list::ListObjectsRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use google_cloud_storage::http::Error;

use crate::error::BoxError;
use crate::store::{ObjectStore, ObjectSummary};

/// [`ObjectStore`] backed by the Cloud Storage JSON API, pointed at an emulator endpoint.
#[derive(Clone)]
pub struct GcsStore {
    client: Client,
}

impl GcsStore {
    /// Creates a client for `endpoint` without credentials. Emulators accept unauthenticated requests.
    pub fn new(endpoint: &str) -> Self {
        let config = ClientConfig {
            storage_endpoint: endpoint.to_string(),
            ..Default::default()
        }
        .anonymous();
        Self {
            client: Client::new(config),
        }
    }
}

fn is_not_found(err: &Error) -> bool {
    matches!(err, Error::Response(e) if e.code == 404)
}

#[async_trait]
impl ObjectStore for GcsStore {
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, BoxError> {
        let result = self
            .client
            .get_bucket(&GetBucketRequest {
                bucket: bucket.to_string(),
                ..Default::default()
            })
            .await;
        match result {
            Ok(found) => {
                tracing::debug!("bucket {} found", found.name);
                Ok(true)
            }
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn create_bucket(&self, project_id: &str, bucket: &str) -> Result<(), BoxError> {
        let created = self
            .client
            .insert_bucket(&InsertBucketRequest {
                name: bucket.to_string(),
                param: InsertBucketParam {
                    project: project_id.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await?;
        tracing::debug!("bucket {} created in {}", created.name, created.location);
        Ok(())
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn write_object(&self, bucket: &str, name: &str, content: Vec<u8>) -> Result<(), BoxError> {
        let upload_type = UploadType::Simple(Media::new(name.to_string()));
        let uploaded = self
            .client
            .upload_object(
                &UploadObjectRequest {
                    bucket: bucket.to_string(),
                    ..Default::default()
                },
                content,
                &upload_type,
            )
            .await?;
        tracing::debug!("uploaded {} generation={}", uploaded.name, uploaded.generation);
        Ok(())
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, BoxError> {
        let mut summaries = vec![];
        let mut page_token = None;
        loop {
            let response = self
                .client
                .list_objects(&ListObjectsRequest {
                    bucket: bucket.to_string(),
                    page_token,
                    ..Default::default()
                })
                .await?;
            if let Some(items) = response.items {
                summaries.extend(items.into_iter().map(|o| ObjectSummary {
                    name: o.name,
                    size: o.size,
                    created: o.time_created,
                }));
            }
            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        tracing::debug!("listed {} objects in {}", summaries.len(), bucket);
        Ok(summaries)
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn read_object(&self, bucket: &str, name: &str) -> Result<Vec<u8>, BoxError> {
        let data = self
            .client
            .download_object(
                &GetObjectRequest {
                    bucket: bucket.to_string(),
                    object: name.to_string(),
                    ..Default::default()
                },
                &Range::default(),
            )
            .await?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use google_cloud_storage::http::error::ErrorResponse;

    use super::*;

    fn response(code: u16) -> Error {
        Error::Response(ErrorResponse {
            code,
            errors: vec![],
            message: "error".to_string(),
        })
    }

    #[test]
    fn test_not_found_only_for_404() {
        assert!(is_not_found(&response(404)));
        assert!(!is_not_found(&response(403)));
        assert!(!is_not_found(&response(500)));
    }
}
