use crate::{dto::RawDataset, error::SourceError};

#[async_trait::async_trait]
pub trait DatasetSource: Send + Sync {
    /// Location the dataset is downloaded from.
    fn source_url(&self) -> &str;

    async fn fetch(&self) -> Result<RawDataset, SourceError>;

    /// Drops any cached copy. Returns whether something was removed.
    async fn clear_cache(&self) -> Result<bool, SourceError>;
}
