pub mod assets;
pub mod health;
pub mod index;
pub mod proxy;

pub use assets::assets_handler;
pub use health::health_handler;
pub use index::index_handler;
pub use proxy::proxy_handler;
