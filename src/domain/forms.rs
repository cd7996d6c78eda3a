use crate::domain::model::{Product, ProductPayload, Shop, ShopPayload};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_datetime, validate_email, validate_exact_length, validate_min_length,
    validate_non_empty_string, validate_url, Validate,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopFormData {
    pub name: String,
    pub description: String,
    pub logo: String,
    pub contact_number: String,
    #[serde(default)]
    pub contact_number2: Option<String>,
    pub contact_email: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub block_name: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
}

impl ShopFormData {
    pub fn from_shop(shop: &Shop) -> Self {
        Self {
            name: shop.name.clone(),
            description: shop.description.clone(),
            logo: shop.logo.clone(),
            contact_number: shop.contact_number.clone(),
            contact_number2: shop.contact_number2.clone(),
            contact_email: shop.contact_email.clone(),
            postal_code: shop.postal_code.clone(),
            block_name: shop.block_name.clone(),
            district: shop.district.clone(),
        }
    }

    pub fn into_payload(self, id: Option<String>, user_id: Option<String>) -> ShopPayload {
        ShopPayload {
            id,
            user_id,
            name: self.name,
            description: self.description,
            logo: self.logo,
            contact_number: self.contact_number,
            contact_number2: non_blank(self.contact_number2),
            contact_email: self.contact_email,
            postal_code: non_blank(self.postal_code),
            block_name: non_blank(self.block_name),
            district: non_blank(self.district),
        }
    }
}

impl Validate for ShopFormData {
    fn validate(&self) -> Result<()> {
        validate_min_length("name", &self.name, 4)?;
        validate_min_length("description", &self.description, 10)?;
        validate_url("logo", &self.logo)?;
        validate_exact_length("contactNumber", &self.contact_number, 10)?;
        validate_email("contactEmail", &self.contact_email)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFormData {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub expiry_date: String,
    #[serde(default)]
    pub verification_id: Option<String>,
}

impl ProductFormData {
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.clone(),
            image: product.image.clone(),
            expiry_date: product.expiry_date.clone(),
            verification_id: product.verification_id.clone(),
        }
    }

    pub fn into_payload(self, id: Option<String>, shop_id: &str) -> ProductPayload {
        ProductPayload {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            image: self.image,
            expiry_date: self.expiry_date,
            shop_id: shop_id.to_string(),
            qr_code: None,
            verification_id: non_blank(self.verification_id),
        }
    }
}

impl Validate for ProductFormData {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_min_length("name", &self.name, 5)?;
        validate_non_empty_string("description", &self.description)?;
        validate_non_empty_string("price", &self.price)?;
        validate_url("image", &self.image)?;
        validate_datetime("expiryDate", &self.expiry_date)?;
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
