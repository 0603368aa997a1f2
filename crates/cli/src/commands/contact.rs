//! Contact command.

use cafe_aroma_cli::ContactSubmitter;
use cafe_aroma_core::ContactForm;

use super::shop::client;
use crate::Cli;

/// Send a contact message.
///
/// A rejected or undeliverable message is an error carrying the text the
/// shopper should see.
pub async fn send(
    cli: &Cli,
    name: &str,
    email: &str,
    message: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let client = client(cli)?;
    let mut submitter = ContactSubmitter::new(ContactForm {
        name: name.to_owned(),
        email: email.to_owned(),
        message: message.to_owned(),
    });

    match submitter.submit(&client).await {
        Some(status) if status.is_success() => Ok(status.message().to_owned()),
        Some(status) => Err(status.message().into()),
        None => Err("Ya se está enviando un mensaje.".into()),
    }
}
