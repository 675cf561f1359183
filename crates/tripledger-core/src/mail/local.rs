//! Local directory mail store.
//!
//! Messages are stored as RFC 5322 files laid out as
//! `<root>/<account id>/<mailbox>/<uid>.eml`. Nested mailboxes use path
//! separators (`INBOX/Travel`).

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use mail_parser::{MessageParser, MimeHeaders, PartType};

use super::{MailConnector, MailError, MessageReader, RawAttachment};
use crate::Account;

/// Mail store reading `.eml` files from a directory tree.
#[derive(Debug, Clone)]
pub struct LocalMailStore {
    root: PathBuf,
}

/// Connection to one account directory of a [`LocalMailStore`].
#[derive(Debug)]
pub struct LocalConnection {
    account_dir: PathBuf,
    /// Last message read, so body and attachments are loaded once.
    loaded: Option<(PathBuf, Vec<u8>)>,
}

impl LocalMailStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LocalConnection {
    fn message_path(&self, mailbox: &str, uid: u32) -> Result<PathBuf, MailError> {
        let relative = Path::new(mailbox);
        let valid = !mailbox.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(MailError::Fetch(format!("Invalid mailbox name: {mailbox:?}")));
        }
        Ok(self.account_dir.join(relative).join(format!("{uid}.eml")))
    }

    async fn load(&mut self, mailbox: &str, uid: u32) -> Result<&[u8], MailError> {
        let path = self.message_path(mailbox, uid)?;
        let cached = self.loaded.as_ref().is_some_and(|(p, _)| *p == path);
        if !cached {
            let raw = tokio::fs::read(&path).await.map_err(|e| {
                MailError::Fetch(format!("Cannot read message {}: {e}", path.display()))
            })?;
            self.loaded = Some((path, raw));
        }
        Ok(self
            .loaded
            .as_ref()
            .map_or(&[][..], |(_, raw)| raw.as_slice()))
    }
}

fn parse_failure(mailbox: &str, uid: u32) -> MailError {
    MailError::Fetch(format!("Cannot parse message {uid} in {mailbox}"))
}

#[async_trait]
impl MailConnector for LocalMailStore {
    type Connection = LocalConnection;

    async fn connect(&self, account: &Account) -> Result<LocalConnection, MailError> {
        let account_dir = self.root.join(account.id.to_string());
        let metadata = tokio::fs::metadata(&account_dir).await.map_err(|e| {
            MailError::Connection(format!(
                "Mail directory {} unavailable: {e}",
                account_dir.display()
            ))
        })?;
        if !metadata.is_dir() {
            return Err(MailError::Connection(format!(
                "{} is not a directory",
                account_dir.display()
            )));
        }

        tracing::debug!(account = %account.id, dir = %account_dir.display(), "Opened local mail store");
        Ok(LocalConnection {
            account_dir,
            loaded: None,
        })
    }
}

#[async_trait]
impl MessageReader<LocalConnection> for LocalMailStore {
    async fn html_body(
        &self,
        connection: &mut LocalConnection,
        mailbox: &str,
        uid: u32,
    ) -> Result<Option<Vec<u8>>, MailError> {
        let raw = connection.load(mailbox, uid).await?;
        let message = MessageParser::default()
            .parse(raw)
            .ok_or_else(|| parse_failure(mailbox, uid))?;

        // Plain-text-only messages list their text part among the HTML bodies
        let html = message.html_bodies().find_map(|part| match &part.body {
            PartType::Html(html) => Some(html.as_bytes().to_vec()),
            _ => None,
        });
        Ok(html)
    }

    async fn raw_attachments(
        &self,
        connection: &mut LocalConnection,
        mailbox: &str,
        uid: u32,
    ) -> Result<Vec<RawAttachment>, MailError> {
        let raw = connection.load(mailbox, uid).await?;
        let message = MessageParser::default()
            .parse(raw)
            .ok_or_else(|| parse_failure(mailbox, uid))?;

        let attachments = message
            .attachments()
            .map(|part| {
                let mime_type = part.content_type().map_or_else(
                    || "application/octet-stream".to_string(),
                    |ct| match ct.subtype() {
                        Some(sub) => format!("{}/{sub}", ct.ctype()),
                        None => ct.ctype().to_string(),
                    },
                );
                let attachment = RawAttachment::new(part.contents(), mime_type.to_lowercase());
                match part.attachment_name() {
                    Some(name) => attachment.with_filename(name),
                    None => attachment,
                }
            })
            .collect();
        Ok(attachments)
    }
}
