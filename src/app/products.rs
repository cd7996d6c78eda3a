use crate::adapters::http::ApiClient;
use crate::core::compositor::QrCompositor;
use crate::core::download::{download, qr_filename};
use crate::core::overlay::HttpImageSource;
use crate::core::{ConfigProvider, ImageSource, QrImage, Storage};
use crate::domain::forms::ProductFormData;
use crate::domain::model::{Product, ProductPayload, Shop};
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use std::sync::Arc;
use tokio::task::JoinSet;

/// 商品清單與驗證 QR code 的流程
pub struct ProductCatalog<C: ConfigProvider, S: ImageSource = HttpImageSource> {
    client: ApiClient,
    compositor: Arc<QrCompositor<S>>,
    config: Arc<C>,
}

impl<C: ConfigProvider, S: ImageSource> Clone for ProductCatalog<C, S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            compositor: Arc::clone(&self.compositor),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C, S> ProductCatalog<C, S>
where
    C: ConfigProvider + 'static,
    S: ImageSource + 'static,
{
    pub fn new(client: ApiClient, compositor: QrCompositor<S>, config: C) -> Self {
        Self {
            client,
            compositor: Arc::new(compositor),
            config: Arc::new(config),
        }
    }

    fn ensure_signed_in(&self) -> Result<()> {
        if self.client.session().is_authenticated() {
            Ok(())
        } else {
            Err(AdminError::Unauthorized)
        }
    }

    pub fn verification_url(&self, verification_id: &Option<String>) -> Result<String> {
        let id = validate_required_field("verificationId", verification_id)?;
        if id.trim().is_empty() {
            return Err(AdminError::MissingFieldError {
                field: "verificationId".to_string(),
            });
        }
        Ok(format!("{}{}", self.config.verification_base_url(), id))
    }

    pub async fn generate_qr(&self, product: &Product) -> Result<QrImage> {
        let url = self.verification_url(&product.verification_id)?;
        let options = self.config.qr_options();
        self.compositor
            .compose(&url, Some(product.image.as_str()), &options)
            .await
    }

    /// 產生並上傳 QR code，失敗時回傳錯誤
    pub async fn regenerate_qr(&self, product: Product) -> Result<Product> {
        let image = self.generate_qr(&product).await?;
        let mut updated = product;
        updated.qr_code = Some(image.to_data_url());

        let stored = self
            .client
            .update_product(&ProductPayload::from(&updated))
            .await?;
        tracing::info!("🔳 Stored QR code for product {}", updated.name);
        // 後端回傳的資料可能不含 qrCode，保留剛產生的
        Ok(match stored {
            Some(stored) if stored.qr_code.as_deref().is_some_and(|q| !q.is_empty()) => stored,
            Some(stored) => Product {
                qr_code: updated.qr_code,
                ..stored
            },
            None => updated,
        })
    }

    /// 與 `regenerate_qr` 相同，但任何失敗都只記錄並回傳原商品
    pub async fn attach_qr(&self, product: Product) -> Product {
        let fallback = product.clone();
        match self.regenerate_qr(product).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::error!("Error generating QR code for product {}: {}", fallback.name, e);
                fallback
            }
        }
    }

    /// 讀取商店與其商品，並為缺少 QR code 的商品同時產生
    pub async fn load_shop(&self, shop_id: &str) -> Result<(Shop, Vec<Product>)> {
        self.ensure_signed_in()?;

        let shop = self
            .client
            .list_shops()
            .await?
            .into_iter()
            .find(|shop| shop.id == shop_id)
            .ok_or_else(|| AdminError::NotFound {
                resource: "Shop".to_string(),
                id: shop_id.to_string(),
            })?;

        let mut products = self.client.list_products(shop_id).await?;
        tracing::debug!("Loaded {} products for shop {}", products.len(), shop.name);

        let mut tasks = JoinSet::new();
        for (index, product) in products.iter().enumerate() {
            if product.needs_qr() {
                let catalog = self.clone();
                let product = product.clone();
                tasks.spawn(async move { (index, catalog.attach_qr(product).await) });
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, product)) => products[index] = product,
                Err(e) => tracing::error!("QR generation task failed: {}", e),
            }
        }

        Ok((shop, products))
    }

    /// 建立或更新商品；有驗證 ID 時附上 QR code，QR 失敗不影響儲存
    pub async fn save_product(
        &self,
        shop_id: &str,
        form: ProductFormData,
        editing: Option<&Product>,
    ) -> Result<Product> {
        self.ensure_signed_in()?;
        form.validate()?;

        let saved = match editing {
            Some(existing) => {
                let mut payload = form.into_payload(Some(existing.id.clone()), shop_id);
                if payload.verification_id.is_none() {
                    payload.verification_id = existing.verification_id.clone();
                }
                match self.client.update_product(&payload).await? {
                    Some(product) => product,
                    None => product_from_payload(payload, &existing.id),
                }
            }
            None => {
                let payload = form.into_payload(None, shop_id);
                self.client.create_product(&payload).await?
            }
        };

        if saved.verification_id.is_some() {
            Ok(self.attach_qr(saved).await)
        } else {
            Ok(saved)
        }
    }

    pub async fn delete_product(&self, id: &str) -> Result<()> {
        self.ensure_signed_in()?;
        self.client.delete_product(id).await?;
        tracing::info!("Deleted product {}", id);
        Ok(())
    }

    /// 將已儲存的 QR code 寫到 storage；沒有 QR code 時回傳 false
    pub async fn export_qr<St: Storage>(&self, product: &Product, storage: &St) -> bool {
        let Some(image) = product.qr_code.as_deref().and_then(QrImage::from_data_url) else {
            tracing::warn!("Product {} has no stored QR code", product.name);
            return false;
        };
        download(storage, &image, &qr_filename(&product.name)).await;
        true
    }
}

fn product_from_payload(payload: ProductPayload, id: &str) -> Product {
    Product {
        id: id.to_string(),
        name: payload.name,
        description: payload.description,
        price: payload.price,
        image: payload.image,
        expiry_date: payload.expiry_date,
        shop_id: payload.shop_id,
        qr_code: payload.qr_code,
        verification_id: payload.verification_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session::Session;
    use crate::config::AppConfig;
    use std::time::Duration;

    fn catalog(session: Session) -> ProductCatalog<AppConfig> {
        let mut config = AppConfig::default();
        config.qr.verification_base_url = "https://verify.example.com/".to_string();
        let client = ApiClient::new("http://127.0.0.1:9", session, Duration::from_secs(1)).unwrap();
        let compositor = QrCompositor::new(Duration::from_secs(1)).unwrap();
        ProductCatalog::new(client, compositor, config)
    }

    fn product(verification_id: Option<&str>) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Organic Honey".to_string(),
            description: "Raw wildflower honey".to_string(),
            price: "12.50".to_string(),
            image: String::new(),
            expiry_date: "2027-01-01T00:00".to_string(),
            shop_id: "s1".to_string(),
            qr_code: None,
            verification_id: verification_id.map(str::to_string),
        }
    }

    #[test]
    fn test_verification_url_appends_id() {
        let catalog = catalog(Session::new());
        let url = catalog.verification_url(&Some("abc123".to_string())).unwrap();
        assert_eq!(url, "https://verify.example.com/abc123");
    }

    #[test]
    fn test_verification_url_requires_id() {
        let catalog = catalog(Session::new());
        assert!(matches!(
            catalog.verification_url(&None),
            Err(AdminError::MissingFieldError { .. })
        ));
        assert!(matches!(
            catalog.verification_url(&Some("  ".to_string())),
            Err(AdminError::MissingFieldError { .. })
        ));
    }

    #[tokio::test]
    async fn test_generate_qr_without_overlay_image() {
        let catalog = catalog(Session::new());
        let image = catalog.generate_qr(&product(Some("abc123"))).await.unwrap();
        assert_eq!((image.width(), image.height()), (200, 200));
    }

    #[tokio::test]
    async fn test_operations_require_sign_in() {
        let catalog = catalog(Session::new());
        assert!(matches!(
            catalog.load_shop("s1").await,
            Err(AdminError::Unauthorized)
        ));
        assert!(matches!(
            catalog.delete_product("p1").await,
            Err(AdminError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_local_product_image_is_not_composited() {
        let overlay = image::RgbaImage::from_pixel(32, 32, image::Rgba([200, 30, 30, 255]));
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        overlay.save(file.path()).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let catalog = catalog(Session::new());
        let mut local = product(Some("abc123"));
        local.image = path.clone();
        let generated = catalog.generate_qr(&local).await.unwrap();

        let url = "https://verify.example.com/abc123";
        let options = catalog.config.qr_options();
        let plain = QrCompositor::new(Duration::from_secs(1))
            .unwrap()
            .compose_plain(url, &options)
            .unwrap();
        assert_eq!(generated, plain);

        // 同一張圖透過命令列的來源會被疊上去
        let local_files = QrCompositor::with_source(
            HttpImageSource::new(Duration::from_secs(1))
                .unwrap()
                .with_local_files(),
        );
        let composited = local_files.compose(url, Some(&path), &options).await.unwrap();
        assert_ne!(composited, plain);
    }

    #[tokio::test]
    async fn test_attach_qr_returns_original_on_failure() {
        // 沒有驗證 ID，無法產生 QR code
        let catalog = catalog(Session::new());
        let original = product(None);
        let result = catalog.attach_qr(original.clone()).await;
        assert_eq!(result, original);
    }
}
