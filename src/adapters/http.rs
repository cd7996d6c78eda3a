//! HTTP client for the shop administration REST API.
//!
//! Every request carries the bearer token of the injected [`Session`]. A 401
//! from the API clears that session before the error is returned.

use crate::adapters::session::Session;
use crate::domain::model::{
    ApiResponse, Product, ProductPayload, Shop, ShopPayload, SigninData, User,
};
use crate::utils::error::{AdminError, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // --- Auth ---

    pub async fn signin(&self, email: &str, password: &str) -> Result<User> {
        let body = serde_json::json!({ "email": email, "password": password });
        let data: SigninData = self.send(Method::POST, "/auth/signin", Some(&body)).await?;

        tracing::info!("Signed in as {}", data.user.email);
        self.session.establish(data.token, data.user.clone());
        Ok(data.user)
    }

    pub fn signout(&self) {
        self.session.clear();
        tracing::info!("Signed out");
    }

    // --- Shops ---

    pub async fn list_shops(&self) -> Result<Vec<Shop>> {
        self.send::<_, Vec<Shop>>(Method::GET, "/shop/", None::<&()>)
            .await
    }

    pub async fn create_shop(&self, shop: &ShopPayload) -> Result<Shop> {
        self.send(Method::POST, "/shop/create", Some(shop)).await
    }

    /// 後端不一定回傳更新後的資料
    pub async fn update_shop(&self, shop: &ShopPayload) -> Result<Option<Shop>> {
        self.send_optional(Method::PUT, "/shop/", Some(shop)).await
    }

    pub async fn delete_shop(&self, id: &str) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("/shop/delete/{}", id))
            .await
    }

    // --- Products ---

    pub async fn list_products(&self, shop_id: &str) -> Result<Vec<Product>> {
        let products: Option<Vec<Product>> = self
            .send_optional(Method::GET, &format!("/product/{}", shop_id), None::<&()>)
            .await?;
        Ok(products.unwrap_or_default())
    }

    pub async fn create_product(&self, product: &ProductPayload) -> Result<Product> {
        self.send(Method::POST, "/product/create", Some(product)).await
    }

    pub async fn update_product(&self, product: &ProductPayload) -> Result<Option<Product>> {
        self.send_optional(Method::PUT, "/product/update", Some(product))
            .await
    }

    pub async fn delete_product(&self, id: &str) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("/product/delete/{}", id))
            .await
    }

    // --- Internal helpers ---

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        self.send_optional(method, path, body)
            .await?
            .ok_or_else(|| AdminError::ProcessingError {
                message: format!("API response for {} carried no data", path),
            })
    }

    async fn send_unit(&self, method: Method, path: &str) -> Result<()> {
        self.send_optional::<(), serde_json::Value>(method, path, None)
            .await?;
        Ok(())
    }

    async fn send_optional<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>> {
        tracing::debug!("{} {}", method, path);

        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("API rejected the session token, clearing session");
            self.session.clear();
            return Err(AdminError::Unauthorized);
        }

        let text = response.text().await?;
        let envelope: Option<ApiResponse<T>> = serde_json::from_str(&text).ok();

        match envelope {
            Some(envelope) if status.is_success() && envelope.success => Ok(envelope.data),
            Some(envelope) => Err(AdminError::ApiError {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            }),
            None if status.is_success() => Err(AdminError::ProcessingError {
                message: format!("unexpected response body from {}", path),
            }),
            None => Err(AdminError::ApiError {
                status: status.as_u16(),
                message: text,
            }),
        }
    }
}
