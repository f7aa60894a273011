use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::EmbedError;
use crate::EmbedResult;

/// Document file name scanned for when none is configured.
pub const DEFAULT_DOCUMENT_NAME: &str = "README.md";

/// Default runnable-directive timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["mdembed.toml", ".mdembed.toml"];

/// Configuration loaded from an `mdembed.toml` file.
///
/// ```toml
/// document = "README.md"
/// recurse = true
/// backup = false
/// timeout_secs = 2
/// ```
///
/// Command-line flags override any value set here.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedConfig {
	/// Document file name to look for when scanning directories.
	#[serde(default = "default_document_name")]
	pub document: String,
	/// Whether directory scanning descends into subdirectories.
	#[serde(default)]
	pub recurse: bool,
	/// Whether to retain the `.old` snapshot of each rewritten document.
	#[serde(default)]
	pub backup: bool,
	/// Timeout in seconds applied to runnable directives.
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
}

fn default_document_name() -> String {
	DEFAULT_DOCUMENT_NAME.to_string()
}

fn default_timeout_secs() -> u64 {
	DEFAULT_TIMEOUT_SECS
}

impl Default for EmbedConfig {
	fn default() -> Self {
		Self {
			document: default_document_name(),
			recurse: false,
			backup: false,
			timeout_secs: DEFAULT_TIMEOUT_SECS,
		}
	}
}

impl EmbedConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> EmbedResult<Option<Self>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: Self =
			toml::from_str(&content).map_err(|e| EmbedError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// The runnable-directive timeout as a [`Duration`].
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}
