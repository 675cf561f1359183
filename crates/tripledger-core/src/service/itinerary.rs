//! Itinerary extraction service.
//!
//! Extracts reservations from a message's HTML body and each attachment,
//! merges the partial results, and feeds the merged itinerary through the
//! engine once more so it can combine entries found in different sources.
//! Final results are cached per message.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};
use tripledger_itinerary::{Extractor, Itinerary};

use crate::cache::{CacheKey, CacheStore};
use crate::mail::{MailConnector, MessageReader, RawAttachment};
use crate::{Account, Result};

/// Tuning options for [`ItineraryService`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Run attachment extractions concurrently.
    ///
    /// Results are merged in attachment order either way.
    pub concurrent_attachments: bool,
}

/// Service producing one consolidated itinerary per message.
pub struct ItineraryService<M, R> {
    connector: M,
    reader: R,
    extractor: Arc<dyn Extractor>,
    cache: Arc<dyn CacheStore>,
    options: ServiceOptions,
}

impl<M, R> ItineraryService<M, R>
where
    M: MailConnector,
    R: MessageReader<M::Connection>,
{
    /// Create a service from its collaborators.
    pub fn new(
        connector: M,
        reader: R,
        extractor: Arc<dyn Extractor>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            connector,
            reader,
            extractor,
            cache,
            options: ServiceOptions::default(),
        }
    }

    /// Replace the service options.
    #[must_use]
    pub const fn with_options(mut self, options: ServiceOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract the itinerary of a message.
    ///
    /// Cached results are returned without touching the mail store. Sources
    /// the engine cannot process contribute nothing instead of failing the
    /// request, and cache failures are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Connection`] if the mail store cannot be
    /// reached and [`crate::Error::Fetch`] if the message content cannot be
    /// retrieved.
    pub async fn extract(&self, account: &Account, mailbox: &str, uid: u32) -> Result<Itinerary> {
        let key = CacheKey::for_message(account.id, mailbox, uid);
        if let Some(cached) = self.cached(&key).await {
            debug!(%key, entries = cached.len(), "Itinerary cache hit");
            return Ok(cached);
        }
        debug!(%key, "Itinerary cache miss");

        let mut connection = self.connector.connect(account).await?;

        let mut itinerary = Itinerary::new();
        if let Some(html) = self.reader.html_body(&mut connection, mailbox, uid).await? {
            itinerary.merge_from(self.extract_source(&html, "html body").await);
        }

        let attachments = self
            .reader
            .raw_attachments(&mut connection, mailbox, uid)
            .await?;
        for partial in self.extract_attachments(&attachments).await {
            itinerary.merge_from(partial);
        }

        // Let the engine combine entries that were found in different sources
        match self.extractor.extract(itinerary.to_json().as_bytes()).await {
            Ok(refined) => {
                self.store(&key, &refined).await;
                debug!(%key, entries = refined.len(), "Itinerary extracted");
                Ok(refined)
            }
            Err(e) => {
                // Not cached, so the next request retries refinement
                warn!(%key, engine = self.extractor.name(), "Refinement failed, returning merged sources: {e}");
                Ok(itinerary)
            }
        }
    }

    async fn cached(&self, key: &CacheKey) -> Option<Itinerary> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(%key, "Itinerary cache read failed: {e}");
                return None;
            }
        };

        match Itinerary::from_slice(&raw) {
            Ok(itinerary) => Some(itinerary),
            Err(e) => {
                warn!(%key, "Discarding undecodable cached itinerary: {e}");
                None
            }
        }
    }

    async fn store(&self, key: &CacheKey, itinerary: &Itinerary) {
        if let Err(e) = self.cache.set(key, itinerary.to_json().into_bytes()).await {
            warn!(%key, "Itinerary cache write failed: {e}");
        }
    }

    async fn extract_attachments(&self, attachments: &[RawAttachment]) -> Vec<Itinerary> {
        let sources = attachments.iter().enumerate().map(|(index, attachment)| {
            let label = match &attachment.filename {
                Some(name) => format!("attachment {index} ({name}, {})", attachment.mime_type),
                None => format!("attachment {index} ({})", attachment.mime_type),
            };
            async move { self.extract_source(&attachment.content, &label).await }
        });

        if self.options.concurrent_attachments {
            join_all(sources).await
        } else {
            let mut results = Vec::with_capacity(attachments.len());
            for source in sources {
                results.push(source.await);
            }
            results
        }
    }

    /// Run one source through the engine; failures count as "nothing found".
    async fn extract_source(&self, input: &[u8], source: &str) -> Itinerary {
        match self.extractor.extract(input).await {
            Ok(itinerary) => {
                debug!(source, entries = itinerary.len(), "Extracted source");
                itinerary
            }
            Err(e) => {
                warn!(source, engine = self.extractor.name(), "Extraction failed: {e}");
                Itinerary::new()
            }
        }
    }
}
