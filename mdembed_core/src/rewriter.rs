use std::path::Path;
use std::time::Duration;

use crate::EmbedResult;
use crate::fence::FenceTracker;
use crate::fence::TrackerAction;
use crate::resolver::DEFAULT_RUN_TIMEOUT;
use crate::resolver::Resolver;
use crate::snapshot::Snapshot;

/// Result of rewriting one document in memory.
#[derive(Debug)]
pub struct RewriteOutcome {
	/// The fully assembled output document.
	pub output: String,
	/// Whether any byte differs from the input document.
	pub changed: bool,
}

/// File-level rewrite options.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
	/// Timeout applied to runnable directives.
	pub timeout: Duration,
	/// Whether to retain the `.old` snapshot after a successful rewrite.
	pub keep_backup: bool,
}

impl Default for RewriteOptions {
	fn default() -> Self {
		Self {
			timeout: DEFAULT_RUN_TIMEOUT,
			keep_backup: false,
		}
	}
}

/// Drive the fence tracker over a document's lines and assemble the output.
///
/// Directive open and close lines are always emitted verbatim. When a block
/// opens with an embed target its resolved content is appended immediately
/// after the open line, and every line until the close is suppressed — it is
/// stale content from a previous run. Targetless fences pass their content
/// through untouched. Running the rewrite twice therefore produces identical
/// output on the second pass.
///
/// Any resolution failure aborts the whole document: the error carries the
/// 1-based line number of the offending directive and no output is produced.
pub fn rewrite_document(content: &str, resolver: &Resolver) -> EmbedResult<RewriteOutcome> {
	let mut tracker = FenceTracker::new();
	let mut output = String::with_capacity(content.len());

	for (index, line) in content.split_inclusive('\n').enumerate() {
		match tracker.step(line) {
			TrackerAction::OpenBlock(directive) => {
				output.push_str(line);
				if directive.has_embed() {
					let resolved = resolver
						.resolve(&directive)
						.map_err(|e| e.at_line(index + 1))?;
					for resolved_line in &resolved {
						output.push_str(resolved_line);
					}
				}
			}
			TrackerAction::CloseBlock => output.push_str(line),
			TrackerAction::PassThrough => {
				if !tracker.is_suppressing() {
					output.push_str(line);
				}
			}
		}
	}

	let changed = output != content;
	Ok(RewriteOutcome { output, changed })
}

/// Rewrite a document on disk, reporting whether its content changed.
///
/// A sibling `.old` snapshot is taken before anything else. The document is
/// transformed fully in memory and written back only after the entire
/// traversal succeeded, so a failing directive can never leave a partially
/// rewritten file behind. Change detection is a byte comparison against the
/// snapshot, which is discarded afterwards unless `keep_backup` is set.
pub fn rewrite_file(path: &Path, options: &RewriteOptions) -> EmbedResult<bool> {
	// `parent()` yields an empty path for bare file names.
	let base_dir = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};
	let resolver = Resolver::new(base_dir).with_timeout(options.timeout);

	let original = std::fs::read_to_string(path)?;
	let snapshot = Snapshot::create(path)?;

	let outcome = match rewrite_document(&original, &resolver) {
		Ok(outcome) => outcome,
		Err(e) => {
			// The document was never written; drop the sidecar copy.
			discard_snapshot(snapshot);
			return Err(e);
		}
	};

	if outcome.changed {
		if let Err(e) = std::fs::write(path, &outcome.output) {
			discard_snapshot(snapshot);
			return Err(e.into());
		}
	}

	let changed = snapshot.differs()?;
	if options.keep_backup {
		let backup = snapshot.retain();
		tracing::debug!(backup = %backup.display(), "retained document snapshot");
	} else {
		snapshot.discard()?;
	}

	Ok(changed)
}

/// Best-effort removal on failure paths; the error already in flight takes
/// precedence over a cleanup problem.
fn discard_snapshot(snapshot: Snapshot) {
	if let Err(e) = snapshot.discard() {
		tracing::debug!(error = %e, "failed to remove document snapshot");
	}
}
