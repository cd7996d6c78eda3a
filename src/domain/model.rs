use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// 後端 API 的統一回應格式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninData {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub contact_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number2: Option<String>,
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub expiry_date: String,
    pub shop_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_id: Option<String>,
}

impl Product {
    /// 有驗證 ID 但尚未產生 QR code
    pub fn needs_qr(&self) -> bool {
        self.qr_code.as_deref().map_or(true, str::is_empty)
            && self
                .verification_id
                .as_deref()
                .is_some_and(|id| !id.is_empty())
    }
}

/// `POST /shop/create` 與 `PUT /shop/` 共用的內容；更新時帶 `id`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub contact_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number2: Option<String>,
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub expiry_date: String,
    pub shop_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_id: Option<String>,
}

impl From<&Product> for ProductPayload {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.clone(),
            image: product.image.clone(),
            expiry_date: product.expiry_date.clone(),
            shop_id: product.shop_id.clone(),
            qr_code: product.qr_code.clone(),
            verification_id: product.verification_id.clone(),
        }
    }
}

/// 合成完成的 QR 圖片（PNG）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl QrImage {
    pub fn new(png: Vec<u8>, width: u32, height: u32) -> Self {
        Self { png, width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_png(&self) -> &[u8] {
        &self.png
    }

    /// 可直接嵌入 `<img src>`，也是 `Product.qrCode` 的儲存格式
    pub fn to_data_url(&self) -> String {
        format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(&self.png))
    }

    /// 只解出 PNG 位元組，不解碼像素；尺寸由 IHDR 讀取
    pub fn from_data_url(data_url: &str) -> Option<Self> {
        let encoded = data_url.strip_prefix(PNG_DATA_URL_PREFIX)?;
        let png = STANDARD.decode(encoded.trim()).ok()?;
        let (width, height) = png_dimensions(&png)?;
        Some(Self { png, width, height })
    }
}

fn png_dimensions(png: &[u8]) -> Option<(u32, u32)> {
    const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    if png.len() < 24 || png[..8] != SIGNATURE || &png[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(png[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(png[20..24].try_into().ok()?);
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(qr_code: Option<&str>, verification_id: Option<&str>) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Organic Honey".to_string(),
            description: "Raw forest honey".to_string(),
            price: "250".to_string(),
            image: "https://img.example.com/honey.png".to_string(),
            expiry_date: "2026-12-31T23:59".to_string(),
            shop_id: "s1".to_string(),
            qr_code: qr_code.map(str::to_string),
            verification_id: verification_id.map(str::to_string),
        }
    }

    #[test]
    fn test_product_uses_camel_case_fields() {
        let json = serde_json::to_value(product(None, Some("v-1"))).unwrap();
        assert_eq!(json["expiryDate"], "2026-12-31T23:59");
        assert_eq!(json["shopId"], "s1");
        assert_eq!(json["verificationId"], "v-1");
        assert!(json.get("qrCode").is_none());
    }

    #[test]
    fn test_needs_qr() {
        assert!(product(None, Some("v-1")).needs_qr());
        assert!(product(Some(""), Some("v-1")).needs_qr());
        assert!(!product(Some("data:image/png;base64,AAAA"), Some("v-1")).needs_qr());
        assert!(!product(None, None).needs_qr());
    }

    #[test]
    fn test_api_response_without_data() {
        let response: ApiResponse<Vec<Shop>> =
            serde_json::from_str(r#"{"success":false,"message":"nope"}"#).unwrap();
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.message.as_deref(), Some("nope"));
    }

    #[test]
    fn test_data_url_rejects_non_png() {
        assert!(QrImage::from_data_url("data:image/jpeg;base64,AAAA").is_none());
        assert!(QrImage::from_data_url("data:image/png;base64,not-base64!").is_none());
    }
}
