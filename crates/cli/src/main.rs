//! Boutique CLI - Inspect and edit the persisted shopping cart.
//!
//! Every invocation hydrates the cart from its slot file, applies one
//! command, and writes the cart back, so consecutive runs behave like page
//! reloads of the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of inventory unit 7 (5 in stock)
//! bq-cart add --inventory-id 7 --product-id 3 --name "Classic Tee" --price 50 --quantity 2 --stock 5
//!
//! # Show the cart
//! bq-cart show
//!
//! # Change quantity, remove, clear
//! bq-cart update 7 1
//! bq-cart remove 7
//! bq-cart clear
//! ```
//!
//! # Commands
//!
//! - `show` - Print line items and totals (`--json` for machine output)
//! - `add` - Add a line item or merge into an existing one
//! - `update` - Set a line's quantity (clamped to stock)
//! - `remove` - Remove a line
//! - `clear` - Empty the cart and delete its slot
//! - `contains` - Report whether an inventory unit is in the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use boutique_cart::{CartConfig, SlotName};
use boutique_core::{InventoryId, LineItemId, ProductId};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "bq-cart")]
#[command(author, version, about = "Boutique cart tools")]
struct Cli {
    /// Directory holding persisted carts (overrides `BOUTIQUE_CART_DIR`)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Cart slot name (overrides `BOUTIQUE_CART_SLOT`)
    #[arg(long, global = true)]
    slot: Option<SlotName>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print line items and totals
    Show {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a line item, merging with an existing line for the same inventory unit
    Add(AddArgs),
    /// Set the quantity of a line (clamped to its stock)
    Update {
        inventory_id: InventoryId,
        quantity: u32,
    },
    /// Remove a line
    Remove { inventory_id: InventoryId },
    /// Empty the cart and delete its slot
    Clear,
    /// Report whether an inventory unit is in the cart
    Contains { inventory_id: InventoryId },
}

#[derive(Args)]
struct AddArgs {
    /// Inventory unit (product + variant) to add
    #[arg(long)]
    inventory_id: InventoryId,

    #[arg(long)]
    product_id: ProductId,

    /// Display name
    #[arg(short, long)]
    name: String,

    /// Unit price, e.g. 19.99
    #[arg(short, long)]
    price: Decimal,

    #[arg(short, long, default_value_t = 1)]
    quantity: u32,

    /// Units currently in stock for this inventory unit
    #[arg(short, long)]
    stock: u32,

    #[arg(long)]
    size: Option<String>,

    #[arg(long)]
    color: Option<String>,

    #[arg(long)]
    image_url: Option<String>,

    /// Line item ID (defaults to the inventory ID)
    #[arg(long)]
    line_id: Option<LineItemId>,
}

fn main() {
    // Logs go to stderr so command output stays clean on stdout.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "boutique_cart=info,bq_cart=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CartConfig::from_env()?;
    if let Some(dir) = cli.dir {
        config.storage_dir = dir;
    }
    if let Some(slot) = cli.slot {
        config.slot = slot;
    }

    let mut store = commands::cart::open(&config);
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Show { json } => commands::cart::show(&store, json, &mut out)?,
        Commands::Add(args) => {
            let item = commands::cart::line_item(commands::cart::NewLine {
                line_id: args.line_id,
                inventory_id: args.inventory_id,
                product_id: args.product_id,
                name: args.name,
                unit_price: args.price,
                quantity: args.quantity,
                stock: args.stock,
                size: args.size,
                color: args.color,
                image_url: args.image_url,
            });
            store.add_item(item);
            commands::cart::ensure_saved(&store, &config)?;
            commands::cart::show(&store, false, &mut out)?;
        }
        Commands::Update {
            inventory_id,
            quantity,
        } => {
            store.update_quantity(inventory_id, quantity);
            commands::cart::ensure_saved(&store, &config)?;
            commands::cart::show(&store, false, &mut out)?;
        }
        Commands::Remove { inventory_id } => {
            store.remove_item(inventory_id);
            commands::cart::ensure_saved(&store, &config)?;
            commands::cart::show(&store, false, &mut out)?;
        }
        Commands::Clear => {
            store.clear_cart();
            commands::cart::ensure_saved(&store, &config)?;
            commands::cart::show(&store, false, &mut out)?;
        }
        Commands::Contains { inventory_id } => {
            commands::cart::contains(&store, inventory_id, &mut out)?;
        }
    }
    Ok(())
}
