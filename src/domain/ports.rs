use crate::core::compositor::QrOptions;
use crate::utils::error::{OverlayLoadError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn verification_base_url(&self) -> &str;
    fn output_directory(&self) -> &str;
    fn qr_options(&self) -> QrOptions;
}

/// 依來源字串（URL、data URL 或本機路徑）取得疊加圖片的原始位元組
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, source: &str) -> std::result::Result<Vec<u8>, OverlayLoadError>;
}
