//! Order command handlers for the CLI.

use clap::Subcommand;
use shopdesk_core::OrderStatus;
use shopdesk_store::{orders, StoreClient};

use crate::cell;

/// Sub-commands available under `orders`.
#[derive(Debug, Subcommand)]
pub enum OrdersCommands {
    /// List orders, newest first
    List {
        /// Case-insensitive match on email address or status
        #[arg(long)]
        search: Option<String>,
    },
    /// Move an order to another status
    SetStatus {
        #[arg(long)]
        id: String,
        /// One of pending, shipped, delivered, cancelled
        #[arg(long)]
        status: OrderStatus,
    },
    /// Delete an order and its line items
    Delete {
        #[arg(long)]
        id: String,
    },
}

pub(crate) async fn run(client: &StoreClient, command: OrdersCommands) -> anyhow::Result<()> {
    match command {
        OrdersCommands::List { search } => {
            let list = orders::list(client, search.as_deref()).await?;
            println!(
                "{:<38} {:<24} {:<32} {:<10} {:>10} {:>6}",
                "ID", "NAME", "EMAIL", "STATUS", "TOTAL", "ITEMS"
            );
            for order in &list {
                println!(
                    "{:<38} {:<24} {:<32} {:<10} {:>10} {:>6}",
                    order.doc_id,
                    cell(order.full_name.as_deref()),
                    cell(order.email_address.as_deref()),
                    cell(order.status.as_deref()),
                    cell(order.total.map(|t| format!("{t:.2}"))),
                    order.items.len(),
                );
            }
            println!("{} orders", list.len());
        }
        OrdersCommands::SetStatus { id, status } => {
            orders::update_status(client, &id, status).await?;
            println!("order {id} is now {status}");
        }
        OrdersCommands::Delete { id } => {
            orders::delete(client, &id).await?;
            println!("deleted order {id}");
        }
    }
    Ok(())
}
