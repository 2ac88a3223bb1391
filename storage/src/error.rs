pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to check bucket: {0}")]
    CheckBucket(BoxError),

    #[error("failed to create bucket: {0}")]
    CreateBucket(BoxError),

    #[error("failed to write content: {0}")]
    WriteObject(BoxError),

    #[error("failed to iterate objects: {0}")]
    ListObjects(BoxError),

    #[error("failed to read content: {0}")]
    ReadObject(BoxError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
