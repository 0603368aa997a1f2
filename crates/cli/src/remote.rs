//! HTTP client for the storefront API.
//!
//! Every endpoint answers with the [`ApiResponse`] envelope, also on error
//! statuses, so responses are decoded before the status is looked at. The
//! server keys the cart by session, so the client keeps a cookie jar and can
//! persist the session cookie between runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cafe_aroma_core::{
    ApiResponse, CartAction, CartLine, CartLineId, ContactForm, StoredCartLine, UnitPrice,
};
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};

use crate::error::ClientError;

const CART_PATH: &str = "api/carrito";
const ORDER_PATH: &str = "api/pedido";
const CONTACT_PATH: &str = "api/contacto";

/// Longest body excerpt kept in an `UnexpectedResponse` error.
const DETAIL_LIMIT: usize = 200;

/// Storefront API client.
#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<RemoteClientInner>,
}

struct RemoteClientInner {
    client: reqwest::Client,
    base: Url,
    jar: Arc<Jar>,
    session_file: Option<PathBuf>,
}

/// Make sure relative joins keep any path prefix of the base URL.
fn normalize_base(server: &str) -> Result<Url, ClientError> {
    let mut base = Url::parse(server.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn excerpt(body: &str) -> String {
    body.chars().take(DETAIL_LIMIT).collect()
}

impl RemoteClient {
    /// Create a client for the storefront at `server`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the HTTP client fails to
    /// build.
    pub fn new(server: &str) -> Result<Self, ClientError> {
        Self::build(server, None)
    }

    /// Create a client whose session cookie is kept in `path` between runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the HTTP client fails to
    /// build. An unreadable session file only starts a new session.
    pub fn with_session_file(server: &str, path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        Self::build(server, Some(path.into()))
    }

    fn build(server: &str, session_file: Option<PathBuf>) -> Result<Self, ClientError> {
        let base = normalize_base(server)?;
        let jar = Arc::new(Jar::default());

        if let Some(path) = &session_file {
            restore_cookies(&jar, &base, path);
        }

        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self {
            inner: Arc::new(RemoteClientInner {
                client,
                base,
                jar,
                session_file,
            }),
        })
    }

    /// The storefront base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.inner.base.join(path)?)
    }

    /// Read the server cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a rejected request.
    pub async fn read(&self) -> Result<Vec<StoredCartLine>, ClientError> {
        let mut url = self.endpoint(CART_PATH)?;
        url.query_pairs_mut()
            .append_pair("accion", CartAction::Leer.as_str());

        let response = self.inner.client.get(url).send().await?;
        self.cart_response(response).await
    }

    /// Add `quantity` units of a line to the server cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a rejected request.
    pub async fn add(
        &self,
        name: &str,
        unit_price: UnitPrice,
        quantity: u32,
    ) -> Result<Vec<StoredCartLine>, ClientError> {
        self.cart_action(&[
            ("accion", CartAction::Agregar.as_str().to_owned()),
            ("nombre", name.to_owned()),
            ("precio", unit_price.to_string()),
            ("cantidad", quantity.to_string()),
        ])
        .await
    }

    /// Set the quantity of a server line; zero deletes it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a rejected request.
    pub async fn update(
        &self,
        id: CartLineId,
        quantity: u32,
    ) -> Result<Vec<StoredCartLine>, ClientError> {
        self.cart_action(&[
            ("accion", CartAction::Actualizar.as_str().to_owned()),
            ("id", id.to_string()),
            ("cantidad", quantity.to_string()),
        ])
        .await
    }

    /// Delete a server line.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a rejected request.
    pub async fn delete(&self, id: CartLineId) -> Result<Vec<StoredCartLine>, ClientError> {
        self.cart_action(&[
            ("accion", CartAction::Eliminar.as_str().to_owned()),
            ("id", id.to_string()),
        ])
        .await
    }

    /// Empty the server cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a rejected request.
    pub async fn clear(&self) -> Result<Vec<StoredCartLine>, ClientError> {
        self.cart_action(&[("accion", CartAction::Vaciar.as_str().to_owned())])
            .await
    }

    /// Submit a full cart as an order. Returns the server message.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a rejected order.
    pub async fn submit_order(&self, lines: &[CartLine]) -> Result<String, ClientError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(ORDER_PATH)?)
            .json(lines)
            .send()
            .await?;

        Ok(self.envelope(response).await?.message)
    }

    /// Send a contact message. Returns the server message.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a rejected message.
    pub async fn send_contact(&self, form: &ContactForm) -> Result<String, ClientError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(CONTACT_PATH)?)
            .form(form)
            .send()
            .await?;

        Ok(self.envelope(response).await?.message)
    }

    async fn cart_action(
        &self,
        form: &[(&str, String)],
    ) -> Result<Vec<StoredCartLine>, ClientError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(CART_PATH)?)
            .form(form)
            .send()
            .await?;

        self.cart_response(response).await
    }

    async fn cart_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Vec<StoredCartLine>, ClientError> {
        let status = response.status().as_u16();
        self.envelope(response)
            .await?
            .carrito
            .ok_or_else(|| ClientError::UnexpectedResponse {
                status,
                detail: "response has no cart".to_owned(),
            })
    }

    /// Decode the envelope and turn `success: false` into an error.
    async fn envelope(&self, response: reqwest::Response) -> Result<ApiResponse, ClientError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        self.save_session();

        let envelope: ApiResponse =
            serde_json::from_str(&body).map_err(|_| ClientError::UnexpectedResponse {
                status,
                detail: excerpt(&body),
            })?;

        if !envelope.success {
            tracing::debug!(status, message = %envelope.message, "Request rejected");
            return Err(ClientError::Rejected {
                status,
                message: envelope.message,
            });
        }

        Ok(envelope)
    }

    /// Write the current session cookie to the session file, if any.
    ///
    /// Failures are logged; the next run simply starts a new session.
    fn save_session(&self) {
        let Some(path) = &self.inner.session_file else {
            return;
        };
        let Some(cookies) = self.inner.jar.cookies(&self.inner.base) else {
            return;
        };
        let Ok(cookies) = cookies.to_str() else {
            return;
        };

        let result = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(path, cookies));
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "Could not save session");
        }
    }
}

fn restore_cookies(jar: &Jar, base: &Url, path: &Path) {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            for pair in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                jar.add_cookie_str(pair, base);
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not read session"),
    }
}
