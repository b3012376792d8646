use chrono::Utc;
use reqwest::{
    Client, StatusCode,
    header::{ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED},
};

use crate::{
    cache::DatasetCache,
    config::SourceConfig,
    dto::{CacheMeta, FetchStatus, RawDataset},
    error::SourceError,
    traits::DatasetSource,
};

enum Download {
    NotModified,
    Fresh {
        text: String,
        etag: Option<String>,
        last_modified: Option<String>,
    },
}

/// Downloads the dataset over HTTP and keeps a copy on disk.
///
/// A cached copy younger than the TTL is served without touching the network.
/// Older copies are revalidated with `If-None-Match`/`If-Modified-Since`, and
/// served as stale when the download fails.
pub struct HttpDatasetSource {
    client: Client,
    config: SourceConfig,
    cache: DatasetCache,
}

impl HttpDatasetSource {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| SourceError::Request(format!("Could not build HTTP client: {e}")))?;
        let cache = DatasetCache::new(&config.cache_dir);
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    pub const fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    async fn download(&self, meta: &CacheMeta, revalidate: bool) -> Result<Download, SourceError> {
        let mut req = self.client.get(self.config.url.clone());
        if revalidate {
            if let Some(etag) = &meta.etag {
                req = req.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = &meta.last_modified {
                req = req.header(IF_MODIFIED_SINCE, last_modified);
            }
        }

        let resp = req.send().await?;
        if resp.status() == StatusCode::NOT_MODIFIED {
            if revalidate {
                return Ok(Download::NotModified);
            }
            return Err(SourceError::InvalidResponse(
                "Unexpected 304 without a cached copy".to_string(),
            ));
        }
        let resp = resp.error_for_status()?;

        let header = |name: HeaderName| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let etag = header(ETAG);
        let last_modified = header(LAST_MODIFIED);

        let bytes = resp.bytes().await?;
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| SourceError::InvalidResponse(format!("Dataset is not UTF-8: {e}")))?;
        if text.trim().is_empty() {
            return Err(SourceError::InvalidResponse("Dataset is empty".to_string()));
        }

        Ok(Download::Fresh {
            text,
            etag,
            last_modified,
        })
    }
}

#[async_trait::async_trait]
impl DatasetSource for HttpDatasetSource {
    fn source_url(&self) -> &str {
        self.config.url.as_str()
    }

    async fn fetch(&self) -> Result<RawDataset, SourceError> {
        let meta = self.cache.read_meta().await;
        let cache_age = self.cache.age().await;

        let mut status = FetchStatus::new(self.source_url().to_string());
        status.etag.clone_from(&meta.etag);
        status.last_modified_header.clone_from(&meta.last_modified);
        status.last_cached_at = self.cache.last_cached_at().await;

        if let Some(age) = cache_age
            && age < self.config.cache_ttl
        {
            tracing::debug!(age_secs = age.as_secs(), "Serving IPC dataset from fresh cache");
            let text = self.cache.read().await?;
            status.used_cache = true;
            return Ok(RawDataset { text, status });
        }

        status.last_checked_at = Some(Utc::now());
        match self.download(&meta, cache_age.is_some()).await {
            Ok(Download::NotModified) => {
                tracing::debug!("IPC dataset not modified upstream, serving cache");
                let text = self.cache.read().await?;
                status.used_cache = true;
                Ok(RawDataset { text, status })
            }
            Ok(Download::Fresh {
                text,
                etag,
                last_modified,
            }) => {
                let fetched_at = Utc::now();
                let new_meta = CacheMeta {
                    etag,
                    last_modified,
                    fetched_at: Some(fetched_at),
                };
                if let Err(e) = self.cache.store(&text, &new_meta).await {
                    tracing::warn!(
                        path = %self.cache.dataset_path().display(),
                        error = %e,
                        "Could not write IPC dataset cache"
                    );
                }
                tracing::info!(bytes = text.len(), "Downloaded IPC dataset");

                status.updated = true;
                status.etag = new_meta.etag;
                status.last_modified_header = new_meta.last_modified;
                status.last_cached_at = Some(fetched_at);
                status.last_checked_at = Some(fetched_at);
                Ok(RawDataset { text, status })
            }
            Err(e) if cache_age.is_some() => {
                tracing::warn!(
                    error = %e,
                    code = e.code(),
                    origin = %e.origin(),
                    "Could not refresh the IPC dataset, falling back to cached copy"
                );
                let text = self.cache.read().await?;
                status.used_cache = true;
                status.stale = cache_age.is_some_and(|age| age >= self.config.cache_ttl);
                status.error = Some(e.to_string());
                Ok(RawDataset { text, status })
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    code = e.code(),
                    origin = %e.origin(),
                    "Could not fetch the IPC dataset"
                );
                Err(e)
            }
        }
    }

    async fn clear_cache(&self) -> Result<bool, SourceError> {
        let removed = self.cache.clear().await?;
        tracing::info!(removed, "Cleared IPC dataset cache");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::{Path, PathBuf},
        time::Duration,
    };

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };
    use url::Url;

    use super::*;

    const CSV: &str = "fecha,indice\n2024-01-01,100\n2024-02-01,101\n";

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("ipc-source-{}", uuid::Uuid::new_v4()))
    }

    fn source(url: &str, dir: &Path, ttl: Duration) -> HttpDatasetSource {
        HttpDatasetSource::new(SourceConfig {
            url: Url::parse(url).unwrap(),
            cache_dir: dir.to_path_buf(),
            cache_ttl: ttl,
            fetch_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    /// Answers a single HTTP request with `response`, yielding the raw request.
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });
        (format!("http://{addr}/ipc.csv"), handle)
    }

    fn ok_response(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nETag: \"v1\"\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn downloads_and_stores_the_dataset() {
        let dir = temp_dir();
        let (url, server) = serve_once(ok_response(CSV)).await;
        let source = source(&url, &dir, Duration::from_secs(3600));

        let dataset = source.fetch().await.unwrap();
        assert_eq!(dataset.text, CSV);
        assert!(dataset.status.updated);
        assert!(!dataset.status.used_cache);
        assert_eq!(dataset.status.etag.as_deref(), Some("\"v1\""));
        assert!(!server.await.unwrap().contains("if-none-match"));

        // Within the TTL the cached copy is served without a request.
        let cached = source.fetch().await.unwrap();
        assert_eq!(cached.text, CSV);
        assert!(cached.status.used_cache);
        assert!(!cached.status.stale);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn revalidates_expired_cache_with_etag() {
        let dir = temp_dir();
        let cache = DatasetCache::new(&dir);
        let meta = CacheMeta {
            etag: Some("\"v1\"".to_string()),
            ..CacheMeta::default()
        };
        cache.store(CSV, &meta).await.unwrap();

        let (url, server) = serve_once(
            "HTTP/1.1 304 Not Modified\r\nConnection: close\r\n\r\n".to_string(),
        )
        .await;
        let source = source(&url, &dir, Duration::ZERO);

        let dataset = source.fetch().await.unwrap();
        assert_eq!(dataset.text, CSV);
        assert!(dataset.status.used_cache);
        assert!(!dataset.status.updated);
        assert!(server.await.unwrap().contains("if-none-match: \"v1\""));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn falls_back_to_stale_cache_when_download_fails() {
        let dir = temp_dir();
        DatasetCache::new(&dir)
            .store(CSV, &CacheMeta::default())
            .await
            .unwrap();
        // Nothing listens on the discard port.
        let source = source("http://127.0.0.1:9/ipc.csv", &dir, Duration::ZERO);

        let dataset = source.fetch().await.unwrap();
        assert_eq!(dataset.text, CSV);
        assert!(dataset.status.used_cache);
        assert!(dataset.status.stale);
        assert!(dataset.status.error.is_some());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn fails_without_cache() {
        let dir = temp_dir();
        let source = source("http://127.0.0.1:9/ipc.csv", &dir, Duration::from_secs(3600));

        let err = source.fetch().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(!source.clear_cache().await.unwrap());
    }

    #[tokio::test]
    async fn server_errors_are_reported() {
        let dir = temp_dir();
        let (url, _server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string(),
        )
        .await;
        let source = source(&url, &dir, Duration::from_secs(3600));

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::HttpStatus { status: 503, .. }));
        assert_eq!(err.code(), "http_error");
    }
}
