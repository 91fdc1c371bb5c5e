pub mod app_config;
pub mod config;
pub mod credentials;
pub mod documents;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod validation;

pub use app_config::{AppConfig, Environment, StoreConfig};
pub use config::{load_app_config, load_app_config_from_env, load_store_config};
pub use credentials::AdminCredentials;
pub use documents::{ImageField, Reference};
pub use orders::{
    NewOrder, NewOrderItem, OrderDocument, OrderFields, OrderItemFields, OrderItemView, OrderStatus,
};
pub use products::{
    CatalogEntry, CategoryDocument, NewProduct, ProductDocument, ProductFields, ProductTag,
    ProductUpdate,
};
pub use reviews::{parse_review_date, Rating, ReviewDocument, ReviewFields, ReviewUpdate};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
