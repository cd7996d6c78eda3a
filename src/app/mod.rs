// Application layer: product and shop workflows on top of the REST client and QR compositor.

pub mod products;
pub mod shops;

pub use products::ProductCatalog;
pub use shops::ShopDirectory;
