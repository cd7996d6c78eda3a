use crate::adapters::http::ApiClient;
use crate::domain::forms::ShopFormData;
use crate::domain::model::{Shop, ShopPayload};
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::Validate;

/// 目前登入使用者的商店
#[derive(Debug, Clone)]
pub struct ShopDirectory {
    client: ApiClient,
}

impl ShopDirectory {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn current_user_id(&self) -> Result<String> {
        if !self.client.session().is_authenticated() {
            return Err(AdminError::Unauthorized);
        }
        self.client
            .session()
            .user()
            .map(|user| user.id)
            .ok_or(AdminError::Unauthorized)
    }

    pub async fn list(&self) -> Result<Vec<Shop>> {
        self.current_user_id()?;
        let shops = self.client.list_shops().await?;
        tracing::debug!("Fetched {} shops", shops.len());
        Ok(shops)
    }

    /// 新增或更新商店，`userId` 一律取自目前的 session
    pub async fn save(&self, form: ShopFormData, editing: Option<&Shop>) -> Result<Shop> {
        let user_id = self.current_user_id()?;
        form.validate()?;

        match editing {
            Some(existing) => {
                let payload = form.into_payload(Some(existing.id.clone()), Some(user_id));
                let updated = self.client.update_shop(&payload).await?;
                tracing::info!("Updated shop {}", payload.name);
                Ok(updated.unwrap_or_else(|| shop_from_payload(payload, &existing.id)))
            }
            None => {
                let payload = form.into_payload(None, Some(user_id));
                let created = self.client.create_shop(&payload).await?;
                tracing::info!("Created shop {} ({})", created.name, created.id);
                Ok(created)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.current_user_id()?;
        self.client.delete_shop(id).await?;
        tracing::info!("Deleted shop {}", id);
        Ok(())
    }
}

fn shop_from_payload(payload: ShopPayload, id: &str) -> Shop {
    Shop {
        id: id.to_string(),
        name: payload.name,
        description: payload.description,
        logo: payload.logo,
        contact_number: payload.contact_number,
        contact_number2: payload.contact_number2,
        contact_email: payload.contact_email,
        postal_code: payload.postal_code,
        block_name: payload.block_name,
        district: payload.district,
    }
}
