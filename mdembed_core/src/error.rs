use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum EmbedError {
	#[error(transparent)]
	#[diagnostic(code(mdembed::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid argument payload `{raw}`: {reason}")]
	#[diagnostic(
		code(mdembed::malformed_arguments),
		help("argument payloads must be a JSON array or string, e.g. `<[\"--flag\", \"value\"]>`")
	)]
	MalformedArguments { raw: String, reason: String },

	#[error("line range {start}-{end} is out of bounds for `{path}` ({len} line(s))")]
	#[diagnostic(
		code(mdembed::out_of_range),
		help("line ranges are 1-based and inclusive; both bounds must fall within the file")
	)]
	OutOfRangeSlice {
		path: String,
		start: usize,
		end: usize,
		len: usize,
	},

	#[error("failed to read source file `{path}`: {reason}")]
	#[diagnostic(code(mdembed::source_read))]
	SourceRead { path: String, reason: String },

	#[error("process `{program}` failed:\n{stderr}")]
	#[diagnostic(code(mdembed::process_failed))]
	ProcessFailed { program: String, stderr: String },

	#[error("process `{program}` did not finish within {timeout_ms} ms")]
	#[diagnostic(
		code(mdembed::process_timeout),
		help("runnable directives must produce their output promptly; long-running programs are not supported")
	)]
	ProcessTimeout { program: String, timeout_ms: u64 },

	#[error("directive at line {line} failed")]
	#[diagnostic(code(mdembed::directive_failed))]
	DirectiveFailed {
		line: usize,
		#[source]
		source: Box<EmbedError>,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mdembed::config_parse),
		help("check that mdembed.toml is valid TOML; see the readme for the supported keys")
	)]
	ConfigParse(String),
}

impl EmbedError {
	/// Wrap a resolution failure with the 1-based line number of the
	/// directive that triggered it.
	pub fn at_line(self, line: usize) -> Self {
		Self::DirectiveFailed {
			line,
			source: Box::new(self),
		}
	}
}

pub type EmbedResult<T> = Result<T, EmbedError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
