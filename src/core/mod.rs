pub mod compositor;
pub mod download;
pub mod occlusion;
pub mod overlay;

pub use crate::domain::model::QrImage;
pub use crate::domain::ports::{ConfigProvider, ImageSource, Storage};
pub use crate::utils::error::Result;
