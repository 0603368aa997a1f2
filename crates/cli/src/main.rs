//! Café Aroma command line client.
//!
//! # Usage
//!
//! ```bash
//! # Show the menu
//! cafe menu
//!
//! # Add a large espresso and show the cart
//! cafe add espresso --opcion Grande
//! cafe cart
//!
//! # Work against the server-side cart instead of the local slot
//! cafe --remote-cart add te --variante Rooibos
//!
//! # Place the order
//! cafe checkout
//!
//! # Send a message to the shop
//! cafe contact --nombre "Lucía" --email lucia@example.com --mensaje "Hola"
//!
//! # Run storefront database migrations
//! cafe migrate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cafe")]
#[command(author, version, about = "Café Aroma shop client")]
struct Cli {
    /// Storefront base URL
    #[arg(
        long,
        env = "CAFE_SERVER_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    server: String,

    /// Keep the cart on the server instead of the local slot
    #[arg(long, env = "CAFE_REMOTE_CART", global = true)]
    remote_cart: bool,

    /// Directory holding the local cart and the session cookie
    #[arg(long, env = "CAFE_DATA_DIR", default_value = ".cafe", global = true)]
    data_dir: PathBuf,

    /// Name of the local cart slot
    #[arg(long, default_value = "carrito", global = true)]
    slot: String,

    /// YAML menu replacing the bundled one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Print carts as HTML list markup
    #[arg(long, global = true)]
    html: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the menu
    Menu,
    /// Add a product to the cart
    Add {
        /// Product slug, as listed by `menu`
        product: String,

        /// Size or bean format
        #[arg(long)]
        opcion: Option<String>,

        /// Dropdown choice (tea, origin)
        #[arg(long)]
        variante: Option<String>,

        /// Number of units
        #[arg(long, default_value_t = 1)]
        cantidad: u32,
    },
    /// Show the cart
    Cart,
    /// One more unit of a cart line
    Inc {
        /// Line name, e.g. "Espresso (Grande)"
        nombre: String,
    },
    /// One less unit of a cart line
    Dec {
        /// Line name
        nombre: String,
    },
    /// Delete a cart line
    Remove {
        /// Line name
        nombre: String,
    },
    /// Empty the cart
    Clear,
    /// Place the cart as an order
    Checkout,
    /// Send a message to the shop
    Contact {
        #[arg(long)]
        nombre: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        mensaje: String,
    },
    /// Run storefront database migrations
    Migrate,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{output}");
            }
        }
        Err(e) => {
            tracing::debug!("Command failed: {e:?}");
            #[allow(clippy::print_stderr)]
            {
                eprintln!("{e}");
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    let output = match &cli.command {
        Commands::Menu => commands::shop::menu(&cli)?,
        Commands::Add {
            product,
            opcion,
            variante,
            cantidad,
        } => {
            commands::shop::add(&cli, product, opcion.clone(), variante.clone(), *cantidad).await?
        }
        Commands::Cart => commands::shop::show(&cli).await?,
        Commands::Inc { nombre } => commands::shop::increment(&cli, nombre).await?,
        Commands::Dec { nombre } => commands::shop::decrement(&cli, nombre).await?,
        Commands::Remove { nombre } => commands::shop::remove(&cli, nombre).await?,
        Commands::Clear => commands::shop::clear(&cli).await?,
        Commands::Checkout => commands::shop::checkout(&cli).await?,
        Commands::Contact {
            nombre,
            email,
            mensaje,
        } => commands::contact::send(&cli, nombre, email, mensaje).await?,
        Commands::Migrate => {
            commands::migrate::storefront().await?;
            "Migraciones aplicadas.".to_owned()
        }
    };
    Ok(output)
}
