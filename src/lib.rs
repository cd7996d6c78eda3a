pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{http::ApiClient, session::Session, storage::LocalStorage};
pub use app::{ProductCatalog, ShopDirectory};
pub use core::compositor::{QrCompositor, QrOptions};
pub use domain::model::QrImage;
pub use utils::error::{AdminError, Result};
