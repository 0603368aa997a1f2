//! Contact form submission.
//!
//! The submitter moves `Idle -> Submitting -> Idle`. While submitting the
//! button shows a busy label and further submits are refused; every outcome
//! returns it to idle. Fields are reset only after a successful send.

use async_trait::async_trait;
use cafe_aroma_core::ContactForm;

use crate::error::ClientError;
use crate::remote::RemoteClient;

/// Submit button label when idle.
pub const SUBMIT_LABEL: &str = "Enviar Mensaje";
/// Submit button label while a message is in flight.
pub const BUSY_LABEL: &str = "Enviando...";
/// Shown when the server cannot be reached or answers unexpectedly.
pub const CONNECTION_ERROR: &str = "Error de conexión. Inténtalo de nuevo más tarde.";

/// Something that delivers a contact form and returns the server message.
#[async_trait]
pub trait ContactTransport: Send + Sync {
    async fn send_contact(&self, form: &ContactForm) -> Result<String, ClientError>;
}

#[async_trait]
impl ContactTransport for RemoteClient {
    async fn send_contact(&self, form: &ContactForm) -> Result<String, ClientError> {
        Self::send_contact(self, form).await
    }
}

/// Status text shown under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Success(String),
    Failure(String),
}

impl SubmitStatus {
    /// The text to show.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Failure(message) => message,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Contact form state.
#[derive(Debug, Default)]
pub struct ContactSubmitter {
    /// Current field values.
    pub form: ContactForm,
    submitting: bool,
    status: Option<SubmitStatus>,
}

impl ContactSubmitter {
    /// A submitter with the given field values.
    #[must_use]
    pub const fn new(form: ContactForm) -> Self {
        Self {
            form,
            submitting: false,
            status: None,
        }
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Current label of the submit button.
    #[must_use]
    pub const fn button_label(&self) -> &'static str {
        if self.submitting {
            BUSY_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    /// Status text of the last submission, if any.
    #[must_use]
    pub const fn status(&self) -> Option<&SubmitStatus> {
        self.status.as_ref()
    }

    /// Enter the submitting state and return the form to send.
    ///
    /// Returns `None` while a submission is already in flight.
    pub fn begin(&mut self) -> Option<ContactForm> {
        if self.submitting {
            tracing::debug!("Contact form already submitting");
            return None;
        }

        self.submitting = true;
        self.status = None;
        Some(self.form.clone())
    }

    /// Record the outcome of a submission and return to idle.
    pub fn finish(&mut self, outcome: Result<String, ClientError>) -> &SubmitStatus {
        let status = match outcome {
            Ok(message) => {
                self.form = ContactForm::default();
                SubmitStatus::Success(message)
            }
            Err(ClientError::Rejected { message, .. }) => SubmitStatus::Failure(message),
            Err(e) => {
                tracing::warn!(error = %e, "Contact form could not be sent");
                SubmitStatus::Failure(CONNECTION_ERROR.to_owned())
            }
        };

        self.submitting = false;
        self.status.insert(status)
    }

    /// Send the form through `transport`.
    ///
    /// Returns `None` if a submission was already in flight.
    pub async fn submit(&mut self, transport: &dyn ContactTransport) -> Option<&SubmitStatus> {
        let form = self.begin()?;
        let outcome = transport.send_contact(&form).await;
        Some(self.finish(outcome))
    }
}
