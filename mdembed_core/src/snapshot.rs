use std::path::Path;
use std::path::PathBuf;

use crate::EmbedResult;

/// A pristine sibling copy of a document, taken before rewriting.
///
/// The copy lives next to the original with `.old` appended to the file
/// name. It serves two purposes: byte-for-byte change detection after the
/// rewrite, and optional retention as a user-visible backup.
#[derive(Debug)]
pub struct Snapshot {
	source: PathBuf,
	backup: PathBuf,
}

impl Snapshot {
	/// Copy `source` to `source.old`, overwriting any stale backup.
	pub fn create(source: &Path) -> EmbedResult<Self> {
		let mut backup = source.as_os_str().to_os_string();
		backup.push(".old");
		let backup = PathBuf::from(backup);

		std::fs::copy(source, &backup)?;

		Ok(Self {
			source: source.to_path_buf(),
			backup,
		})
	}

	/// Whether the source file now differs from the snapshot, byte for byte.
	pub fn differs(&self) -> EmbedResult<bool> {
		let original = std::fs::read(&self.backup)?;
		let current = std::fs::read(&self.source)?;
		Ok(original != current)
	}

	/// Remove the backup copy.
	pub fn discard(self) -> EmbedResult<()> {
		std::fs::remove_file(&self.backup)?;
		Ok(())
	}

	/// Keep the backup copy on disk and return its path.
	pub fn retain(self) -> PathBuf {
		self.backup
	}
}
