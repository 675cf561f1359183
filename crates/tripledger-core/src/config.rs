//! Service configuration.
//!
//! Settings are stored as JSON, by default in
//! `<config dir>/tripledger/settings.json`. Every field has a default, so a
//! missing file or a partial file are both valid.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tripledger_itinerary::{Extractor, JsonLdExtractor, KItineraryConfig, KItineraryExtractor};

use crate::cache::{CacheStore, MemoryCache, NoCache, SqliteCache};
use crate::service::ServiceOptions;
use crate::{Error, Result};

const APP_DIR: &str = "tripledger";

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the local mail store (`<root>/<account>/<mailbox>/<uid>.eml`).
    pub mail_root: Option<PathBuf>,
    /// Result cache settings.
    pub cache: CacheSettings,
    /// Extraction engine settings.
    pub extractor: ExtractorSettings,
    /// Extract attachments concurrently.
    pub concurrent_attachments: bool,
}

/// Which cache store to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local LRU cache.
    #[default]
    Memory,
    /// `SQLite` database on disk.
    Sqlite,
    /// No caching.
    Disabled,
}

/// Result cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Cache store.
    pub backend: CacheBackend,
    /// Maximum entries held by the memory cache.
    pub capacity: usize,
    /// Entry lifetime in seconds; `None` keeps entries until evicted.
    pub ttl_secs: Option<u64>,
    /// Database file for the `SQLite` cache.
    pub path: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            capacity: 1024,
            ttl_secs: Some(7 * 24 * 60 * 60),
            path: None,
        }
    }
}

/// Which extraction engine to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Built-in JSON-LD engine.
    #[default]
    Builtin,
    /// External `kitinerary-extractor` program.
    KItinerary,
}

/// Extraction engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Engine to use.
    pub engine: EngineKind,
    /// Inputs larger than this are not extracted.
    pub max_input_bytes: usize,
    /// Program for the `kitinerary` engine.
    pub binary: PathBuf,
    /// Extra arguments for the program.
    pub args: Vec<String>,
    /// Per-document time limit for the program, in seconds.
    pub timeout_secs: u64,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        let kitinerary = KItineraryConfig::default();
        Self {
            engine: EngineKind::Builtin,
            max_input_bytes: kitinerary.max_input_bytes,
            binary: kitinerary.binary,
            args: kitinerary.args,
            timeout_secs: kitinerary.timeout.as_secs(),
        }
    }
}

impl Settings {
    /// Default settings file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("settings.json")
    }

    /// Load settings from a file; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds invalid values.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let settings: Self = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.cache.backend == CacheBackend::Memory && self.cache.capacity == 0 {
            return Err(Error::Config("cache.capacity must be at least 1".to_string()));
        }
        if self.extractor.timeout_secs == 0 {
            return Err(Error::Config(
                "extractor.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.extractor.max_input_bytes == 0 {
            return Err(Error::Config(
                "extractor.max_input_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Options for the itinerary service.
    #[must_use]
    pub const fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            concurrent_attachments: self.concurrent_attachments,
        }
    }
}

impl CacheSettings {
    /// Entry lifetime.
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }

    /// Entry lifetime for the `SQLite` cache.
    ///
    /// Lifetimes beyond what a timestamp can represent never expire.
    #[must_use]
    pub fn sqlite_ttl(&self) -> Option<chrono::TimeDelta> {
        let secs = self.ttl_secs?;
        i64::try_from(secs).ok().and_then(chrono::TimeDelta::try_seconds)
    }

    /// Database file for the `SQLite` cache.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("itinerary-cache.db")
        })
    }

    /// Open the configured cache store.
    ///
    /// # Errors
    ///
    /// Returns an error if the `SQLite` database cannot be opened.
    pub async fn open(&self) -> Result<Arc<dyn CacheStore>> {
        match self.backend {
            CacheBackend::Memory => Ok(Arc::new(MemoryCache::new(self.capacity, self.ttl()))),
            CacheBackend::Disabled => Ok(Arc::new(NoCache)),
            CacheBackend::Sqlite => Ok(Arc::new(self.open_sqlite().await?)),
        }
    }

    /// Open the `SQLite` cache regardless of the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or opened.
    pub async fn open_sqlite(&self) -> Result<SqliteCache> {
        let path = self.database_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let path = path
            .to_str()
            .ok_or_else(|| Error::Config(format!("Non UTF-8 cache path: {}", path.display())))?;

        SqliteCache::new(path, self.sqlite_ttl()).await
    }
}

impl ExtractorSettings {
    /// Settings for the `kitinerary-extractor` program.
    #[must_use]
    pub fn kitinerary_config(&self) -> KItineraryConfig {
        KItineraryConfig {
            binary: self.binary.clone(),
            args: self.args.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_input_bytes: self.max_input_bytes,
        }
    }

    /// Build the configured engine.
    #[must_use]
    pub fn build(&self) -> Arc<dyn Extractor> {
        match self.engine {
            EngineKind::Builtin => Arc::new(JsonLdExtractor::new(self.max_input_bytes)),
            EngineKind::KItinerary => Arc::new(KItineraryExtractor::new(self.kitinerary_config())),
        }
    }
}
