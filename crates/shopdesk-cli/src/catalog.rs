//! Product command handlers for the CLI.
//!
//! Creation goes through the same validation as `POST /api/products`, so a
//! product made here is indistinguishable from one made by the admin UI.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use shopdesk_core::{CatalogEntry, ProductFields};
use shopdesk_store::{products, ImageUpload, StoreClient};

use crate::cell;

/// Sub-commands available under `products`.
#[derive(Debug, Subcommand)]
pub enum ProductsCommands {
    /// List products and categories
    List {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a product, optionally uploading an image file first
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        price_without_discount: Option<f64>,
        #[arg(long)]
        inventory: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        badge: Option<String>,
        /// Store id of the category document
        #[arg(long)]
        category: Option<String>,
        /// Tag to apply; repeat for several (featured, ourProducts, ...)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Path to a PNG, JPEG, GIF, WebP or SVG file
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Change some fields of a product; omitted flags are left as they are
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        price_without_discount: Option<f64>,
        #[arg(long)]
        inventory: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        badge: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Replaces the tag list; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Upload this file and make it the product image
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a product that nothing references
    Delete {
        #[arg(long)]
        id: String,
    },
}

pub(crate) async fn run(client: &StoreClient, command: ProductsCommands) -> anyhow::Result<()> {
    match command {
        ProductsCommands::List { json } => run_list(client, json).await,
        ProductsCommands::Create {
            title,
            price,
            price_without_discount,
            inventory,
            description,
            badge,
            category,
            tags,
            image,
        } => {
            let fields = ProductFields {
                catalog_id: None,
                title: Some(title),
                price: Some(price),
                price_without_discount,
                badge,
                description,
                inventory,
                image: None,
                category,
                tags: (!tags.is_empty()).then_some(tags),
            };
            run_create(client, fields, image.as_deref()).await
        }
        ProductsCommands::Update {
            id,
            title,
            price,
            price_without_discount,
            inventory,
            description,
            badge,
            category,
            tags,
            image,
        } => {
            let fields = ProductFields {
                catalog_id: None,
                title,
                price,
                price_without_discount,
                badge,
                description,
                inventory,
                image: None,
                category,
                tags: (!tags.is_empty()).then_some(tags),
            };
            run_update(client, &id, fields, image.as_deref()).await
        }
        ProductsCommands::Delete { id } => {
            products::delete(client, &id).await?;
            println!("deleted product {id}");
            Ok(())
        }
    }
}

async fn run_list(client: &StoreClient, json: bool) -> anyhow::Result<()> {
    let entries = products::list(client).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{:<38} {:<10} {:<32} {:>10} {:>9}", "ID", "TYPE", "TITLE", "PRICE", "STOCK");
    for entry in &entries {
        let (kind, price, stock) = match entry {
            CatalogEntry::Product(p) => ("product", p.price, p.inventory),
            CatalogEntry::Category(c) => ("category", c.price, c.inventory),
        };
        println!(
            "{:<38} {:<10} {:<32} {:>10} {:>9}",
            entry.doc_id(),
            kind,
            entry.title().unwrap_or("-"),
            cell(price.map(|p| format!("{p:.2}"))),
            cell(stock),
        );
    }
    println!("{} entries", entries.len());
    Ok(())
}

async fn run_create(
    client: &StoreClient,
    fields: ProductFields,
    image_path: Option<&Path>,
) -> anyhow::Result<()> {
    let product = fields.into_new_product()?;
    let image = match image_path {
        Some(path) => Some(read_image(path).await?),
        None => None,
    };

    let created = products::create(client, product, image).await?;
    println!("created product {}", created.doc_id);
    Ok(())
}

async fn run_update(
    client: &StoreClient,
    id: &str,
    fields: ProductFields,
    image_path: Option<&Path>,
) -> anyhow::Result<()> {
    let update = fields.into_update()?;
    let image = match image_path {
        Some(path) => Some(read_image(path).await?),
        None => None,
    };

    products::update(client, id, update, image).await?;
    println!("updated product {id}");
    Ok(())
}

async fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let content_type = image_content_type(path).ok_or_else(|| {
        anyhow::anyhow!("unsupported image type for '{}'", path.display())
    })?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read '{}': {e}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_owned();
    Ok(ImageUpload {
        filename,
        content_type: content_type.to_owned(),
        bytes,
    })
}

/// Maps a file extension to the image MIME type the asset endpoint expects.
pub(crate) fn image_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
