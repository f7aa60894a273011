use crate::directive::Directive;
use crate::directive::LineEvent;
use crate::directive::classify;

/// What the tracker decided about one line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrackerAction {
	/// The line opened a block; the directive is also retained as the new
	/// open state. The line itself is always emitted.
	OpenBlock(Directive),
	/// The line closed the open block. The line itself is always emitted.
	CloseBlock,
	/// An ordinary line. Emitted verbatim unless a block with an embed
	/// target is open, in which case it is stale embedded content and is
	/// suppressed.
	PassThrough,
}

/// Sequential reducer over a document's lines, tracking at most one open
/// fenced block (non-reentrant — nesting is handled by the marker-length
/// tie-break in [`classify`], not by a stack).
#[derive(Debug, Default)]
pub struct FenceTracker {
	open: Option<Directive>,
}

impl FenceTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Feed one line through the tracker and report the resulting action.
	pub fn step(&mut self, line: &str) -> TrackerAction {
		match classify(line, self.open.as_ref()) {
			LineEvent::Open(directive) => {
				self.open = Some(directive.clone());
				TrackerAction::OpenBlock(directive)
			}
			LineEvent::Close => {
				self.open = None;
				TrackerAction::CloseBlock
			}
			LineEvent::Text => TrackerAction::PassThrough,
		}
	}

	/// Whether lines are currently being suppressed: a block is open and it
	/// carries an embed target, so its stale content will be regenerated.
	pub fn is_suppressing(&self) -> bool {
		self.open.as_ref().is_some_and(Directive::has_embed)
	}

	/// The directive of the currently open block, if any.
	pub fn open_block(&self) -> Option<&Directive> {
		self.open.as_ref()
	}
}
