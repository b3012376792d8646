pub mod cache;
pub mod clients;
pub mod config;
pub mod dto;
pub mod error;
pub mod traits;

pub use cache::DatasetCache;
pub use clients::HttpDatasetSource;
pub use config::SourceConfig;
pub use error::{ErrorOrigin, SourceError};
pub use traits::DatasetSource;

pub use dto::*;
