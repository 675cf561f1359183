//! Adapter for the external `kitinerary-extractor` program.
//!
//! The program reads a document on standard input and prints the extracted
//! reservations as a JSON-LD array on standard output.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::Extractor;
use super::jsonld::{DEFAULT_MAX_INPUT_BYTES, itinerary_from_value};
use crate::Itinerary;
use crate::error::{ExtractError, Result};

/// Configuration for [`KItineraryExtractor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KItineraryConfig {
    /// Program to run (looked up in `PATH` when relative).
    pub binary: PathBuf,
    /// Extra command line arguments.
    pub args: Vec<String>,
    /// Maximum run time per document.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Inputs larger than this are rejected without starting the program.
    pub max_input_bytes: usize,
}

impl Default for KItineraryConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("kitinerary-extractor"),
            args: Vec::new(),
            timeout: Duration::from_secs(10),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

/// Extraction engine backed by the `kitinerary-extractor` program.
#[derive(Debug, Clone, Default)]
pub struct KItineraryExtractor {
    config: KItineraryConfig,
}

impl KItineraryExtractor {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub const fn new(config: KItineraryConfig) -> Self {
        Self { config }
    }

    async fn run(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.config.binary)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExtractError::Unavailable(format!("{}: {e}", self.config.binary.display()))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExtractError::Unavailable("stdin not captured".to_string()))?;

        let write = async move {
            stdin.write_all(input).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());

        // The program may exit without consuming all input
        if let Err(e) = written
            && e.kind() != ErrorKind::BrokenPipe
        {
            return Err(e.into());
        }

        let output = output?;
        if !output.status.success() {
            return Err(ExtractError::Engine {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl Extractor for KItineraryExtractor {
    async fn extract(&self, input: &[u8]) -> Result<Itinerary> {
        if input.len() > self.config.max_input_bytes {
            return Err(ExtractError::InputTooLarge {
                size: input.len(),
                limit: self.config.max_input_bytes,
            });
        }

        let stdout = tokio::time::timeout(self.config.timeout, self.run(input))
            .await
            .map_err(|_| ExtractError::Timeout(self.config.timeout))??;

        if stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(Itinerary::new());
        }

        let value: Value = serde_json::from_slice(&stdout)?;
        Ok(itinerary_from_value(value))
    }

    fn name(&self) -> &'static str {
        "kitinerary"
    }
}

/// Serde helpers for durations stored as whole seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
