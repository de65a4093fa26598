use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::AssetError;

/// Relative path of the program catalog under the assets root.
pub const CONFIG_PATH: &str = "config.json";

const MIB: f64 = 1_048_576.0;

/// Cumulative progress of a streamed binary download.
///
/// Reported after every received chunk. `total_bytes` is present only when
/// the server supplied a content length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub bytes_read: u64,
    pub total_bytes: Option<u64>,
}

impl DownloadProgress {
    /// Whole percentage of the download completed, when the total is known.
    pub fn percent(&self) -> Option<u32> {
        match self.total_bytes {
            Some(total) if total > 0 => {
                Some(((self.bytes_read as f64 / total as f64) * 100.0).round() as u32)
            }
            _ => None,
        }
    }
}

impl fmt::Display for DownloadProgress {
    /// `"1.2 / 12.0 MB (10%)"` with a content length, `"1.2 MB"` without.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mb = self.bytes_read as f64 / MIB;
        match (self.total_bytes, self.percent()) {
            (Some(total), Some(pct)) => {
                write!(f, "{mb:.1} / {:.1} MB ({pct}%)", total as f64 / MIB)
            }
            _ => write!(f, "{mb:.1} MB"),
        }
    }
}

/// Transport boundary for the read-only asset tree.
///
/// Implementations fetch by path relative to the assets root. No retry
/// policy: a single failure is surfaced immediately and the caller decides
/// how to present it.
pub trait AssetFetcher: Send + Sync {
    /// Fetch a text asset (source, intermediate, listing, config).
    fn fetch_text<'a>(
        &'a self,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AssetError>> + Send + 'a>>;

    /// Fetch a binary asset as a stream, invoking `progress` after each
    /// chunk with the cumulative byte count. Chunks are accumulated in
    /// arrival order into one contiguous buffer.
    fn fetch_binary<'a>(
        &'a self,
        path: &'a str,
        progress: &'a (dyn Fn(DownloadProgress) + Send + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, AssetError>> + Send + 'a>>;
}

/// HTTP asset client backed by reqwest.
pub struct HttpAssetClient {
    http: reqwest::Client,
    assets_root: String,
}

impl HttpAssetClient {
    pub fn new(assets_root: impl Into<String>) -> Self {
        let assets_root = assets_root.into();
        let assets_root = assets_root.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            assets_root,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.assets_root)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, AssetError> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| AssetError::Network {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AssetError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(AssetError::Http {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}

impl AssetFetcher for HttpAssetClient {
    fn fetch_text<'a>(
        &'a self,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AssetError>> + Send + 'a>> {
        Box::pin(async move {
            let resp = self.get(path).await?;
            resp.text().await.map_err(|e| AssetError::Network {
                path: path.to_string(),
                message: e.to_string(),
            })
        })
    }

    fn fetch_binary<'a>(
        &'a self,
        path: &'a str,
        progress: &'a (dyn Fn(DownloadProgress) + Send + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, AssetError>> + Send + 'a>> {
        Box::pin(async move {
            let mut resp = self.get(path).await?;
            let total_bytes = resp.content_length();

            let mut buf: Vec<u8> = match total_bytes {
                Some(total) => Vec::with_capacity(total as usize),
                None => Vec::new(),
            };

            loop {
                let chunk = resp.chunk().await.map_err(|e| AssetError::Network {
                    path: path.to_string(),
                    message: e.to_string(),
                })?;
                let Some(chunk) = chunk else { break };
                buf.extend_from_slice(&chunk);
                progress(DownloadProgress {
                    bytes_read: buf.len() as u64,
                    total_bytes,
                });
            }

            tracing::debug!(path, bytes = buf.len(), "binary asset downloaded");
            Ok(buf)
        })
    }
}

/// In-memory fetcher serving a fixed set of assets.
///
/// Used by tests and offline demos. Binary fetches are delivered in small
/// chunks so progress reporting behaves like the HTTP client.
#[derive(Default)]
pub struct StaticAssetFetcher {
    texts: HashMap<String, String>,
    binaries: HashMap<String, Vec<u8>>,
}

impl StaticAssetFetcher {
    const CHUNK: usize = 8 * 1024;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(path.into(), text.into());
        self
    }

    pub fn with_binary(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.binaries.insert(path.into(), bytes.into());
        self
    }
}

impl AssetFetcher for StaticAssetFetcher {
    fn fetch_text<'a>(
        &'a self,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AssetError>> + Send + 'a>> {
        Box::pin(async move {
            self.texts
                .get(path)
                .cloned()
                .ok_or_else(|| AssetError::NotFound(path.to_string()))
        })
    }

    fn fetch_binary<'a>(
        &'a self,
        path: &'a str,
        progress: &'a (dyn Fn(DownloadProgress) + Send + Sync),
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, AssetError>> + Send + 'a>> {
        Box::pin(async move {
            let bytes = self
                .binaries
                .get(path)
                .ok_or_else(|| AssetError::NotFound(path.to_string()))?;

            let total = Some(bytes.len() as u64);
            let mut buf = Vec::with_capacity(bytes.len());
            for chunk in bytes.chunks(Self::CHUNK) {
                buf.extend_from_slice(chunk);
                progress(DownloadProgress {
                    bytes_read: buf.len() as u64,
                    total_bytes: total,
                });
            }
            Ok(buf)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn progress_formats_with_content_length() {
        let p = DownloadProgress {
            bytes_read: 1_258_291, // ~1.2 MiB
            total_bytes: Some(12_582_912),
        };
        assert_eq!(p.percent(), Some(10));
        assert_eq!(p.to_string(), "1.2 / 12.0 MB (10%)");
    }

    #[test]
    fn progress_formats_without_content_length() {
        let p = DownloadProgress {
            bytes_read: 3_355_443,
            total_bytes: None,
        };
        assert_eq!(p.percent(), None);
        assert_eq!(p.to_string(), "3.2 MB");
    }

    #[tokio::test]
    async fn static_fetcher_serves_text() {
        let fetcher = StaticAssetFetcher::new().with_text("clojure/src/fact.clj", "(defn fact ...)");
        let text = fetcher.fetch_text("clojure/src/fact.clj").await.unwrap();
        assert_eq!(text, "(defn fact ...)");
    }

    #[tokio::test]
    async fn static_fetcher_reports_missing_text() {
        let fetcher = StaticAssetFetcher::new();
        let err = fetcher.fetch_text("nope.txt").await.unwrap_err();
        assert!(matches!(err, AssetError::NotFound(p) if p == "nope.txt"));
    }

    #[tokio::test]
    async fn binary_fetch_reports_monotonic_progress() {
        let payload = vec![0u8; 20_000];
        let fetcher = StaticAssetFetcher::new().with_binary("clojure/js/fact.js", payload.clone());

        let seen = Mutex::new(Vec::new());
        let bytes = fetcher
            .fetch_binary("clojure/js/fact.js", &|p| {
                seen.lock().unwrap().push(p.bytes_read);
            })
            .await
            .unwrap();

        assert_eq!(bytes, payload);
        let seen = seen.into_inner().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*seen.last().unwrap(), 20_000);
    }
}
