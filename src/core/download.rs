use crate::domain::model::QrImage;
use crate::domain::ports::Storage;

pub const DEFAULT_QR_FILENAME: &str = "qr-code.png";

/// `<商品名稱>-qr-code.png`，名稱中的路徑字元會被替換
pub fn qr_filename(product_name: &str) -> String {
    let name: String = product_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        DEFAULT_QR_FILENAME.to_string()
    } else {
        format!("{}-{}", name, DEFAULT_QR_FILENAME)
    }
}

/// 盡力寫出 PNG；失敗只記錄警告
pub async fn download<S: Storage>(storage: &S, image: &QrImage, filename: &str) {
    let filename = if filename.trim().is_empty() {
        DEFAULT_QR_FILENAME
    } else {
        filename
    };

    match storage.write_file(filename, image.as_png()).await {
        Ok(()) => tracing::info!("📁 Saved QR code to {} ({} bytes)", filename, image.as_png().len()),
        Err(e) => tracing::warn!("Could not save QR code to {}: {}", filename, e),
    }
}
