use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::EmbedError;
use crate::EmbedResult;

/// The fence-opening grammar, matched against a single line:
///
/// ```text
/// <fence>[syntax][run][:][target][range][ <args>]
/// ```
///
/// Every component after the fence markers is optional, and matching is
/// leftmost-greedy: in `` ```run:prog `` the word `run` is captured as the
/// syntax tag, so a runnable directive needs both, e.g. `` ```sh:run:prog ``.
/// `range` is `[start]`, `[start-end]`, or `[start:end]`; `args` is a raw
/// JSON payload delimited by angle brackets.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)^(?P<fence>`+)\s*(?P<syntax>\w+)?:?(?P<runnable>run)?\s*:?\s*(?P<target>[\w\-./]+)?\s*\[?(?P<start>\d+)?-?:?(?P<end>\d+)?\]?\s*(?:<(?P<args>.*?)>)?",
	)
	.expect("fence directive pattern must compile")
});

/// The parsed intent of a fence-opening line. A directive is exactly one of:
///
/// - a plain fence marker (`target` absent) — the block is left alone,
/// - a file-slice directive (`target` set, `runnable` false) — the block is
///   refilled with a line range from the target file,
/// - a runnable directive (`target` set, `runnable` true) — the block is
///   refilled with the captured stdout of executing the target.
///
/// `range_start`/`range_end` are only meaningful for file-slice directives;
/// `arguments` (a raw JSON payload) only for runnable ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
	/// Number of fence marker characters on the opening line, used for the
	/// nesting length tie-break when looking for the matching close.
	pub marker_length: usize,
	/// Whether the target is a program to execute rather than a file to slice.
	pub runnable: bool,
	/// File or executable path, resolved relative to the document's directory.
	pub target: Option<String>,
	/// 1-based inclusive lower line bound for file slices.
	pub range_start: Option<usize>,
	/// 1-based inclusive upper line bound for file slices.
	pub range_end: Option<usize>,
	/// Raw JSON argument payload for runnable directives (the text between
	/// the angle brackets, undecoded).
	pub arguments: Option<String>,
}

impl Directive {
	/// Whether this directive embeds anything at all. Plain fences without a
	/// target open a block whose content passes through untouched.
	pub fn has_embed(&self) -> bool {
		self.target.is_some()
	}

	/// Decode the raw argument payload into a positional argument list.
	///
	/// A JSON array yields its elements (non-strings are stringified); a JSON
	/// string yields a single-element list; no payload, or a bare scalar,
	/// yields an empty list. JSON objects are rejected — runnable directives
	/// take positional arguments only.
	pub fn decode_arguments(&self) -> EmbedResult<Vec<String>> {
		let Some(raw) = &self.arguments else {
			return Ok(Vec::new());
		};

		let value: Value =
			serde_json::from_str(raw).map_err(|e| EmbedError::MalformedArguments {
				raw: raw.clone(),
				reason: e.to_string(),
			})?;

		match value {
			Value::Object(_) => Err(EmbedError::MalformedArguments {
				raw: raw.clone(),
				reason: "objects are not supported; arguments are positional".to_string(),
			}),
			Value::Array(items) => {
				Ok(items
					.into_iter()
					.map(|item| {
						match item {
							Value::String(s) => s,
							other => other.to_string(),
						}
					})
					.collect())
			}
			Value::String(s) => Ok(vec![s]),
			_ => Ok(Vec::new()),
		}
	}
}

/// Classification of one document line against the currently open block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LineEvent {
	/// The line opens a fenced block described by the directive.
	Open(Directive),
	/// The line closes the currently open block.
	Close,
	/// An ordinary content line.
	Text,
}

/// Classify a single line given the directive of the currently open block
/// (if any).
///
/// With no block open, any line matching the fence grammar is an [`Open`].
/// With a block open, a fence line closes it only when its marker run is at
/// least as long as the opening marker — a shorter fence inside the block is
/// treated as ordinary content, which lets an outer fence swallow a nested
/// one-line fenced example without closing early.
///
/// [`Open`]: LineEvent::Open
pub fn classify(line: &str, open: Option<&Directive>) -> LineEvent {
	let Some(caps) = FENCE_RE.captures(line) else {
		return LineEvent::Text;
	};

	let marker_length = caps
		.name("fence")
		.map_or(0, |fence| fence.as_str().len());

	match open {
		None => {
			LineEvent::Open(Directive {
				marker_length,
				runnable: caps.name("runnable").is_some(),
				target: caps.name("target").map(|m| m.as_str().to_string()),
				range_start: caps.name("start").and_then(|m| m.as_str().parse().ok()),
				range_end: caps.name("end").and_then(|m| m.as_str().parse().ok()),
				arguments: caps.name("args").map(|m| m.as_str().to_string()),
			})
		}
		Some(current) if marker_length >= current.marker_length => LineEvent::Close,
		Some(_) => LineEvent::Text,
	}
}
