//! Mail store collaborators.
//!
//! The itinerary service never talks to a mail server itself. It obtains a
//! connection through a [`MailConnector`] and reads message content through
//! a [`MessageReader`], so any mail backend (or a test double) can be used.

mod local;

pub use local::{LocalConnection, LocalMailStore};

use async_trait::async_trait;

use crate::Account;

/// Errors that can occur while reading mail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    /// The mail store could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Message content could not be retrieved.
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// A raw message attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttachment {
    /// Decoded attachment bytes.
    pub content: Vec<u8>,
    /// Declared MIME type.
    pub mime_type: String,
    /// Filename, if the sender provided one.
    pub filename: Option<String>,
}

impl RawAttachment {
    /// Create an attachment without a filename.
    #[must_use]
    pub fn new(content: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            mime_type: mime_type.into(),
            filename: None,
        }
    }

    /// Set the filename.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Opens connections to an account's mail store.
#[async_trait]
pub trait MailConnector: Send + Sync {
    /// Connection handle passed to the [`MessageReader`].
    type Connection: Send;

    /// Connect to the account's mail store.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Connection`] if the store cannot be reached.
    async fn connect(&self, account: &Account) -> Result<Self::Connection, MailError>;
}

/// Reads message content over a connection.
#[async_trait]
pub trait MessageReader<C: Send>: Send + Sync {
    /// Fetch the HTML body of a message; `None` if it has none.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Fetch`] on transport or protocol failure.
    async fn html_body(
        &self,
        connection: &mut C,
        mailbox: &str,
        uid: u32,
    ) -> Result<Option<Vec<u8>>, MailError>;

    /// Fetch all attachments of a message, in message order.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Fetch`] on transport or protocol failure.
    async fn raw_attachments(
        &self,
        connection: &mut C,
        mailbox: &str,
        uid: u32,
    ) -> Result<Vec<RawAttachment>, MailError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_attachment_filename() {
        let attachment = RawAttachment::new(b"{}".as_slice(), "application/json");
        assert_eq!(attachment.filename, None);

        let named = attachment.with_filename("booking.json");
        assert_eq!(named.filename.as_deref(), Some("booking.json"));
        assert_eq!(named.content, b"{}");
        assert_eq!(named.mime_type, "application/json");
    }
}
