mod http;

pub use http::HttpDatasetSource;
