use std::path::Path;
use std::process::Command;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use std::time::Instant;

const GIT_TIMEOUT: Duration = Duration::from_secs(2);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Version-control classification of a document, as reported by git.
///
/// The two booleans are independent: `tracked` answers "does git know this
/// path" and `modified` answers "does it differ from the last commit". When
/// git is unavailable or errors, both degrade to `false` — the tool keeps
/// working outside repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VcsStatus {
	pub tracked: bool,
	pub modified: bool,
}

/// Classify a path against the repository it lives in. Commands run in the
/// file's own directory so nested repositories resolve correctly.
pub fn classify(path: &Path) -> VcsStatus {
	VcsStatus {
		tracked: is_tracked(path),
		modified: is_modified(path),
	}
}

fn split_for_git(path: &Path) -> Option<(&Path, &std::ffi::OsStr)> {
	let dir = path.parent().filter(|parent| !parent.as_os_str().is_empty())?;
	let name = path.file_name()?;
	Some((dir, name))
}

/// Run a git query for its exit code alone, bounded by [`GIT_TIMEOUT`].
/// Returns `None` when git cannot be invoked, errors unexpectedly, or hangs.
fn git_exit_code(dir: &Path, args: &[&std::ffi::OsStr]) -> Option<i32> {
	let child = Command::new("git")
		.args(args)
		.current_dir(dir)
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.spawn();

	let mut child = match child {
		Ok(child) => child,
		Err(e) => {
			tracing::debug!(dir = %dir.display(), error = %e, "could not invoke git");
			return None;
		}
	};

	let deadline = Instant::now() + GIT_TIMEOUT;
	loop {
		match child.try_wait() {
			Ok(Some(status)) => return status.code(),
			Ok(None) => {}
			Err(e) => {
				tracing::debug!(dir = %dir.display(), error = %e, "git wait failed");
				let _ = child.kill();
				let _ = child.wait();
				return None;
			}
		}
		if Instant::now() >= deadline {
			tracing::debug!(dir = %dir.display(), "git query timed out");
			let _ = child.kill();
			let _ = child.wait();
			return None;
		}
		thread::sleep(EXIT_POLL_INTERVAL);
	}
}

/// `git ls-files --error-unmatch` exits 0 for tracked paths and 1 for
/// untracked ones; anything else means git itself had a problem.
fn is_tracked(path: &Path) -> bool {
	let Some((dir, name)) = split_for_git(path) else {
		return false;
	};

	let args = ["ls-files".as_ref(), "--error-unmatch".as_ref(), name];
	match git_exit_code(dir, &args) {
		Some(0) => true,
		Some(1) | None => false,
		code => {
			tracing::debug!(path = %path.display(), ?code, "git ls-files failed");
			false
		}
	}
}

/// `git diff-index --quiet HEAD --` exits 1 when the path differs from the
/// last committed version.
fn is_modified(path: &Path) -> bool {
	let Some((dir, name)) = split_for_git(path) else {
		return false;
	};

	let args = [
		"diff-index".as_ref(),
		"--quiet".as_ref(),
		"HEAD".as_ref(),
		"--".as_ref(),
		name,
	];
	git_exit_code(dir, &args) == Some(1)
}
