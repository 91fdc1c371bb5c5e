//! Review moderation repository.

use shopdesk_core::documents::REVIEW_TYPE;
use shopdesk_core::{ReviewDocument, ReviewUpdate};

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::mutation::{Mutation, Transaction};

pub const REVIEWS_QUERY: &str =
    r#"*[_type == "review"]{_id, user, rating, comment, date, productId}"#;

/// Every review document, unfiltered.
///
/// # Errors
///
/// Propagates [`StoreError`] from the query.
pub async fn list(client: &StoreClient) -> Result<Vec<ReviewDocument>, StoreError> {
    client.query(REVIEWS_QUERY, &[]).await
}

/// Replaces the five editable fields of a review.
///
/// # Errors
///
/// [`StoreError::NotFound`] when `id` is not a review or the store reports
/// no patched document.
pub async fn update(client: &StoreClient, id: &str, update: &ReviewUpdate) -> Result<(), StoreError> {
    client.require_document(REVIEW_TYPE, "review", id).await?;
    let tx = Transaction::from(vec![Mutation::set(id, update)?]);
    let response = client.mutate(&tx).await?;
    if !response.touched(id) {
        return Err(StoreError::NotFound {
            kind: "review",
            id: id.to_owned(),
        });
    }
    tracing::info!(review_id = %id, rating = %update.rating, "review updated");
    Ok(())
}

/// # Errors
///
/// [`StoreError::NotFound`] when `id` is not a review or nothing was deleted.
pub async fn delete(client: &StoreClient, id: &str) -> Result<(), StoreError> {
    client.require_document(REVIEW_TYPE, "review", id).await?;
    let response = client
        .mutate(&Transaction::from(vec![Mutation::delete(id)]))
        .await?;
    if !response.touched(id) {
        return Err(StoreError::NotFound {
            kind: "review",
            id: id.to_owned(),
        });
    }
    tracing::info!(review_id = %id, "review deleted");
    Ok(())
}
