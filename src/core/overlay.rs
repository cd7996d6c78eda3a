use crate::domain::ports::ImageSource;
use crate::utils::error::{OverlayLoadError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use std::time::Duration;

/// 從 http(s) 或 `data:` URL 讀取疊加圖片
///
/// 本機檔案只有在 `with_local_files` 之後才允許，商品資料裡的圖片欄位不能指向本機
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: Client,
    local_files: bool,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            local_files: false,
        })
    }

    /// 允許本機路徑與 `file://`，給命令列使用
    pub fn with_local_files(mut self) -> Self {
        self.local_files = true;
        self
    }

    async fn fetch_remote(&self, url: &str) -> std::result::Result<Vec<u8>, OverlayLoadError> {
        tracing::debug!("Fetching overlay image from: {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!("Overlay response status: {}", status);
        if !status.is_success() {
            return Err(OverlayLoadError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, source: &str) -> std::result::Result<Vec<u8>, OverlayLoadError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(OverlayLoadError::EmptySource);
        }

        let lower = source.to_ascii_lowercase();
        if lower.starts_with("data:") {
            return decode_data_url(&source[5..]);
        }
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return self.fetch_remote(source).await;
        }

        if !self.local_files {
            return Err(OverlayLoadError::UnsupportedSource(source.to_string()));
        }

        let path = if lower.starts_with("file://") {
            &source[7..]
        } else {
            source
        };
        Ok(tokio::fs::read(path).await?)
    }
}

fn decode_data_url(rest: &str) -> std::result::Result<Vec<u8>, OverlayLoadError> {
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| OverlayLoadError::DataUrl("missing ',' separator".to_string()))?;

    if !meta.to_ascii_lowercase().ends_with(";base64") {
        return Err(OverlayLoadError::DataUrl(
            "only base64 data URLs are supported".to_string(),
        ));
    }

    STANDARD
        .decode(data.trim())
        .map_err(|e| OverlayLoadError::DataUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source() -> HttpImageSource {
        HttpImageSource::new(Duration::from_secs(5)).unwrap()
    }

    fn local_source() -> HttpImageSource {
        source().with_local_files()
    }

    #[tokio::test]
    async fn test_fetch_http_image() {
        let server = MockServer::start();
        let image_mock = server.mock(|when, then| {
            when.method(GET).path("/honey.png");
            then.status(200)
                .header("Content-Type", "image/png")
                .body(b"png-bytes");
        });

        let bytes = source().fetch(&server.url("/honey.png")).await.unwrap();

        image_mock.assert();
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn test_fetch_http_error_status() {
        let server = MockServer::start();
        let image_mock = server.mock(|when, then| {
            when.method(GET).path("/404.png");
            then.status(404);
        });

        let result = source().fetch(&server.url("/404.png")).await;

        image_mock.assert();
        assert!(matches!(result, Err(OverlayLoadError::Status(404))));
    }

    #[tokio::test]
    async fn test_fetch_data_url() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(b"abc"));
        assert_eq!(source().fetch(&url).await.unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_fetch_rejects_plain_data_url() {
        let result = source().fetch("data:text/plain,hello").await;
        assert!(matches!(result, Err(OverlayLoadError::DataUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"local").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        assert_eq!(local_source().fetch(&path).await.unwrap(), b"local");
        assert_eq!(
            local_source()
                .fetch(&format!("file://{}", path))
                .await
                .unwrap(),
            b"local"
        );
    }

    #[tokio::test]
    async fn test_default_source_refuses_local_files() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"secret").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        for candidate in [path.clone(), format!("file://{}", path)] {
            assert!(matches!(
                source().fetch(&candidate).await,
                Err(OverlayLoadError::UnsupportedSource(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_file_and_empty_source() {
        assert!(matches!(
            local_source().fetch("/definitely/not/here.png").await,
            Err(OverlayLoadError::Io(_))
        ));
        assert!(matches!(
            source().fetch("  ").await,
            Err(OverlayLoadError::EmptySource)
        ));
    }
}
