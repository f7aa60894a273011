use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use crate::EmbedResult;

/// Find documents with the given file name under `root`, optionally
/// recursing into subdirectories. Hidden directories and common build
/// output directories are skipped; symlink cycles are detected via
/// canonical-path tracking. Results are sorted for deterministic ordering.
pub fn find_documents(
	root: &Path,
	document_name: &str,
	recurse: bool,
) -> EmbedResult<Vec<PathBuf>> {
	let mut documents = Vec::new();
	let mut visited_dirs = HashSet::new();

	walk_dir(root, document_name, recurse, &mut documents, &mut visited_dirs)?;
	documents.sort();

	Ok(documents)
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

fn walk_dir(
	dir: &Path,
	document_name: &str,
	recurse: bool,
	documents: &mut Vec<PathBuf>,
	visited_dirs: &mut HashSet<PathBuf>,
) -> EmbedResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	// Detect symlink cycles by tracking canonical paths.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		tracing::debug!(dir = %dir.display(), "skipping already-visited directory");
		return Ok(());
	}

	let candidate = dir.join(document_name);
	if candidate.is_file() {
		tracing::debug!(document = %candidate.display(), "found document");
		documents.push(candidate);
	}

	if !recurse {
		return Ok(());
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();

		if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
			if is_ignored_directory_name(name) {
				continue;
			}
		}

		if path.is_dir() {
			walk_dir(&path, document_name, recurse, documents, visited_dirs)?;
		}
	}

	Ok(())
}
