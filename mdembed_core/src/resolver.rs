use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process::Child;
use std::process::Command;
use std::process::Stdio;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use crate::EmbedError;
use crate::EmbedResult;
use crate::directive::Directive;

/// How long a runnable directive's program may run before it is killed.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(2);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Produces the replacement lines for a directive: either a bounded slice of
/// a source file, or the captured stdout of an executed program. Relative
/// targets are resolved against `base_dir` (the containing document's
/// directory).
#[derive(Debug, Clone)]
pub struct Resolver {
	base_dir: PathBuf,
	timeout: Duration,
}

impl Resolver {
	pub fn new(base_dir: impl Into<PathBuf>) -> Self {
		Self {
			base_dir: base_dir.into(),
			timeout: DEFAULT_RUN_TIMEOUT,
		}
	}

	/// Override the runnable-directive timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Resolve a directive into its replacement lines. Each returned line
	/// carries its terminator, ready to be spliced into the output verbatim.
	/// Directives without a target resolve to nothing.
	pub fn resolve(&self, directive: &Directive) -> EmbedResult<Vec<String>> {
		let Some(target) = &directive.target else {
			return Ok(Vec::new());
		};

		let path = self.base_dir.join(target);

		if directive.runnable {
			let args = directive.decode_arguments()?;
			self.capture_program_output(&path, &args)
		} else {
			slice_source_lines(&path, directive.range_start, directive.range_end)
		}
	}

	/// Execute a program and capture its stdout as the replacement lines.
	///
	/// Both output streams are drained on dedicated reader threads so a
	/// chatty child can never deadlock against a full pipe; the child is
	/// polled for exit and killed once the timeout elapses. On timeout the
	/// detached reader threads finish on their own once the pipes close.
	fn capture_program_output(&self, program: &Path, args: &[String]) -> EmbedResult<Vec<String>> {
		tracing::debug!(program = %program.display(), ?args, "running embedded program");

		let mut child = Command::new(program)
			.args(args)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.spawn()
			.map_err(|e| EmbedError::ProcessFailed {
				program: program.display().to_string(),
				stderr: e.to_string(),
			})?;

		let stdout_reader = spawn_pipe_reader(child.stdout.take());
		let stderr_reader = spawn_pipe_reader(child.stderr.take());

		let status = match wait_with_deadline(&mut child, self.timeout)? {
			Some(status) => status,
			None => {
				// Timed out: kill and reap the direct child. Grandchildren
				// may outlive it while holding the pipe write ends, so the
				// reader threads are dropped rather than joined.
				let _ = child.kill();
				let _ = child.wait();
				drop(stdout_reader);
				drop(stderr_reader);
				return Err(EmbedError::ProcessTimeout {
					program: program.display().to_string(),
					timeout_ms: self.timeout.as_millis() as u64,
				});
			}
		};

		let stdout = drain_pipe_reader(stdout_reader);
		let stderr = drain_pipe_reader(stderr_reader);

		if !status.success() {
			return Err(EmbedError::ProcessFailed {
				program: program.display().to_string(),
				stderr: String::from_utf8_lossy(&stderr).trim_end().to_string(),
			});
		}

		let captured = String::from_utf8_lossy(&stdout);
		Ok(captured.lines().map(|line| format!("{line}\n")).collect())
	}
}

/// Poll the child for exit until the deadline. `Ok(None)` means the deadline
/// passed with the child still running.
fn wait_with_deadline(
	child: &mut Child,
	timeout: Duration,
) -> EmbedResult<Option<std::process::ExitStatus>> {
	let deadline = Instant::now() + timeout;

	loop {
		if let Some(status) = child.try_wait()? {
			return Ok(Some(status));
		}
		if Instant::now() >= deadline {
			return Ok(None);
		}
		thread::sleep(EXIT_POLL_INTERVAL);
	}
}

fn spawn_pipe_reader<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
	R: Read + Send + 'static,
{
	pipe.map(|mut pipe| {
		thread::spawn(move || {
			let mut buffer = Vec::new();
			let _ = pipe.read_to_end(&mut buffer);
			buffer
		})
	})
}

fn drain_pipe_reader(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
	reader
		.and_then(|handle| handle.join().ok())
		.unwrap_or_default()
}

/// Read a bounded slice of lines from a source file.
///
/// Bounds are 1-based and inclusive. With both bounds absent the whole file
/// is selected; a single bound — whichever capture slot it landed in —
/// selects exactly that one line. A bound of `0` or beyond the end of the
/// file is an out-of-range error. Returned lines keep their original
/// terminators.
fn slice_source_lines(
	path: &Path,
	range_start: Option<usize>,
	range_end: Option<usize>,
) -> EmbedResult<Vec<String>> {
	let content = std::fs::read_to_string(path).map_err(|e| EmbedError::SourceRead {
		path: path.display().to_string(),
		reason: e.to_string(),
	})?;

	let lines: Vec<&str> = content.split_inclusive('\n').collect();
	let len = lines.len();

	let (start, end) = match (range_start, range_end) {
		(None, None) => (1, len),
		(Some(start), None) => (start, start),
		(None, Some(end)) => (end, end),
		(Some(start), Some(end)) => (start, end),
	};

	if start == 0 || end == 0 || start > len || end > len {
		return Err(EmbedError::OutOfRangeSlice {
			path: path.display().to_string(),
			start,
			end,
			len,
		});
	}

	tracing::trace!(path = %path.display(), start, end, "slicing source lines");

	if start > end {
		return Ok(Vec::new());
	}

	Ok(lines[start - 1..end].iter().map(ToString::to_string).collect())
}

#[cfg(test)]
mod slice_tests {
	use std::io::Write;

	use super::*;

	fn source_file(dir: &tempfile::TempDir, lines: usize) -> PathBuf {
		let path = dir.path().join("source.txt");
		let mut file = std::fs::File::create(&path).expect("create source file");
		for n in 1..=lines {
			writeln!(file, "line {n}").expect("write source line");
		}
		path
	}

	#[test]
	fn whole_file_when_no_bounds() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = source_file(&dir, 4);
		let lines = slice_source_lines(&path, None, None).expect("slice");
		assert_eq!(lines.len(), 4);
		assert_eq!(lines[0], "line 1\n");
		assert_eq!(lines[3], "line 4\n");
	}

	#[test]
	fn inclusive_range() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = source_file(&dir, 10);
		let lines = slice_source_lines(&path, Some(3), Some(5)).expect("slice");
		assert_eq!(lines, vec!["line 3\n", "line 4\n", "line 5\n"]);
	}

	#[test]
	fn single_bound_selects_one_line() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = source_file(&dir, 10);
		assert_eq!(
			slice_source_lines(&path, Some(7), None).expect("slice"),
			vec!["line 7\n"]
		);
		assert_eq!(
			slice_source_lines(&path, None, Some(7)).expect("slice"),
			vec!["line 7\n"]
		);
	}

	#[test]
	fn out_of_bounds_is_an_error() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = source_file(&dir, 3);
		let err = slice_source_lines(&path, Some(2), Some(9)).unwrap_err();
		assert!(matches!(err, EmbedError::OutOfRangeSlice { len: 3, .. }));

		let err = slice_source_lines(&path, Some(0), Some(2)).unwrap_err();
		assert!(matches!(err, EmbedError::OutOfRangeSlice { .. }));
	}

	#[test]
	fn inverted_range_is_empty() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = source_file(&dir, 5);
		let lines = slice_source_lines(&path, Some(4), Some(2)).expect("slice");
		assert!(lines.is_empty());
	}
}
