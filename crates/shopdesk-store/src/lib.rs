//! Typed client and repositories for the hosted document store.

pub mod client;
pub mod dashboard;
pub mod error;
pub mod mutation;
pub mod orders;
pub mod products;
pub(crate) mod retry;
pub mod reviews;

pub use client::{AssetDocument, StoreClient};
pub use dashboard::{ChartPoint, DashboardSummary};
pub use error::StoreError;
pub use mutation::{Mutation, MutationResponse, MutationResult, Patch, Transaction};
pub use products::ImageUpload;
