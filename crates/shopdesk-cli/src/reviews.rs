use clap::Subcommand;
use shopdesk_store::{reviews, StoreClient};

use crate::cell;

/// Sub-commands available under `reviews`.
#[derive(Debug, Subcommand)]
pub enum ReviewsCommands {
    /// List reviews
    List,
    /// Delete a review
    Delete {
        #[arg(long)]
        id: String,
    },
}

pub(crate) async fn run(client: &StoreClient, command: ReviewsCommands) -> anyhow::Result<()> {
    match command {
        ReviewsCommands::List => {
            let list = reviews::list(client).await?;
            for review in &list {
                println!(
                    "{:<38} {:<20} {:>6} {:>8} {:<26} {}",
                    review.doc_id,
                    cell(review.user.as_deref()),
                    cell(review.rating),
                    cell(review.product_id),
                    cell(review.date.as_deref()),
                    review.comment.as_deref().unwrap_or(""),
                );
            }
            println!("{} reviews", list.len());
        }
        ReviewsCommands::Delete { id } => {
            reviews::delete(client, &id).await?;
            println!("deleted review {id}");
        }
    }
    Ok(())
}
