//! Menu and cart commands.

use cafe_aroma_cli::backend::{CartBackend, LocalCart, RemoteCart};
use cafe_aroma_cli::catalog::load_catalog;
use cafe_aroma_cli::display::{cart_html, cart_text, menu_text};
use cafe_aroma_cli::persistence::FileSlot;
use cafe_aroma_cli::{ClientError, RemoteClient};
use cafe_aroma_core::Selection;
use cafe_aroma_storefront::render::CartView;

use crate::Cli;

/// File in the data directory holding the storefront session cookie.
const SESSION_FILE: &str = "session";

type CommandResult = Result<String, Box<dyn std::error::Error>>;

pub fn client(cli: &Cli) -> Result<RemoteClient, ClientError> {
    RemoteClient::with_session_file(&cli.server, cli.data_dir.join(SESSION_FILE))
}

fn backend(cli: &Cli) -> Result<Box<dyn CartBackend>, ClientError> {
    let client = client(cli)?;
    if cli.remote_cart {
        tracing::debug!(server = %client.base_url(), "Using server cart");
        return Ok(Box::new(RemoteCart::new(client)));
    }

    let slot = FileSlot::new(&cli.data_dir, &cli.slot)?;
    tracing::debug!(path = %slot.path().display(), "Using local cart");
    Ok(Box::new(LocalCart::open(slot, client)))
}

fn render(cli: &Cli, view: &CartView) -> CommandResult {
    if cli.html {
        Ok(cart_html(view)?)
    } else {
        Ok(cart_text(view))
    }
}

pub fn menu(cli: &Cli) -> CommandResult {
    let catalog = load_catalog(cli.catalog.as_deref()).map_err(ClientError::from)?;
    Ok(menu_text(&catalog))
}

pub async fn add(
    cli: &Cli,
    product: &str,
    radio: Option<String>,
    dropdown: Option<String>,
    quantity: u32,
) -> CommandResult {
    let catalog = load_catalog(cli.catalog.as_deref()).map_err(ClientError::from)?;
    let item = catalog
        .resolve(product, &Selection { radio, dropdown })
        .map_err(ClientError::from)?;

    let view = backend(cli)?.add(&item, quantity).await?;
    render(cli, &view)
}

pub async fn show(cli: &Cli) -> CommandResult {
    let view = backend(cli)?.load().await?;
    render(cli, &view)
}

pub async fn increment(cli: &Cli, name: &str) -> CommandResult {
    let view = backend(cli)?.increment(name).await?;
    render(cli, &view)
}

pub async fn decrement(cli: &Cli, name: &str) -> CommandResult {
    let view = backend(cli)?.decrement(name).await?;
    render(cli, &view)
}

pub async fn remove(cli: &Cli, name: &str) -> CommandResult {
    let view = backend(cli)?.remove(name).await?;
    render(cli, &view)
}

pub async fn clear(cli: &Cli) -> CommandResult {
    let view = backend(cli)?.clear().await?;
    render(cli, &view)
}

pub async fn checkout(cli: &Cli) -> CommandResult {
    Ok(backend(cli)?.checkout().await?)
}
