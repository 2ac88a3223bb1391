use std::io::Write;

use time::format_description::well_known::Rfc3339;

use crate::config::Config;
use crate::error::Error;
use crate::store::{ObjectStore, ObjectSummary};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketStatus {
    Created,
    AlreadyExists,
}

/// Creates the configured bucket unless it already exists.
pub async fn ensure_bucket<S: ObjectStore + ?Sized>(store: &S, config: &Config) -> Result<BucketStatus, Error> {
    if store.bucket_exists(&config.bucket).await.map_err(Error::CheckBucket)? {
        return Ok(BucketStatus::AlreadyExists);
    }
    store
        .create_bucket(&config.project_id, &config.bucket)
        .await
        .map_err(Error::CreateBucket)?;
    tracing::info!("created bucket {} in project {}", config.bucket, config.project_id);
    Ok(BucketStatus::Created)
}

pub async fn write_file<S: ObjectStore + ?Sized>(store: &S, config: &Config) -> Result<(), Error> {
    store
        .write_object(&config.bucket, &config.object_name, config.content.as_bytes().to_vec())
        .await
        .map_err(Error::WriteObject)
}

pub async fn list_files<S: ObjectStore + ?Sized>(store: &S, config: &Config) -> Result<Vec<ObjectSummary>, Error> {
    store.list_objects(&config.bucket).await.map_err(Error::ListObjects)
}

pub async fn read_file<S: ObjectStore + ?Sized>(store: &S, config: &Config) -> Result<Vec<u8>, Error> {
    store
        .read_object(&config.bucket, &config.object_name)
        .await
        .map_err(Error::ReadObject)
}

/// One listing line: `- name (size: N bytes, created: RFC3339)`.
pub fn format_summary(summary: &ObjectSummary) -> String {
    let created = summary
        .created
        .and_then(|v| v.format(&Rfc3339).ok())
        .unwrap_or_else(|| "unknown".to_string());
    format!("- {} (size: {} bytes, created: {})", summary.name, summary.size, created)
}

/// Runs bucket setup, upload, listing and download in order, stopping at the first failure.
pub async fn run<S, W>(store: &S, config: &Config, out: &mut W) -> Result<(), Error>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    match ensure_bucket(store, config).await? {
        BucketStatus::AlreadyExists => writeln!(out, "Bucket '{}' already exists", config.bucket)?,
        BucketStatus::Created => writeln!(out, "Created bucket '{}'", config.bucket)?,
    }

    write_file(store, config).await?;
    writeln!(
        out,
        "Successfully wrote file '{}' to bucket '{}'",
        config.object_name, config.bucket
    )?;

    writeln!(out, "\nListing files in bucket:")?;
    for summary in list_files(store, config).await? {
        writeln!(out, "{}", format_summary(&summary))?;
    }

    writeln!(out, "\nReading file '{}' content:", config.object_name)?;
    let content = read_file(store, config).await?;
    writeln!(out, "Content: {}", String::from_utf8_lossy(&content))?;
    Ok(())
}
