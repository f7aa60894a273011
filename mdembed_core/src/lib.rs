//! `mdembed_core` is the core library for the [mdembed](https://github.com/ippie52/mdembed) documentation sync tool. It recognizes embed directives on the opening marker of fenced code blocks and replaces the block body with a slice of a source file or the captured stdout of a program, keeping embedded snippets in README-style documents in lockstep with the code they describe.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown document
//!   → Directive parser (matches the opening fence marker against the embed grammar)
//!   → Fence tracker (tracks the single open block, suppresses stale body lines)
//!   → Resolver (slices source files or runs programs and captures stdout)
//!   → Rewriter (splices resolved content into the document, writes only on success)
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Configuration loading from `mdembed.toml`: document name, recursion, backups, and the runnable timeout.
//! - [`discover`] — Directory walking. Finds every instance of the target document name under a root.
//! - [`vcs`] — Git classification of documents (tracked, modified) used for exit-code reporting.
//!
//! ## Key Types
//!
//! - [`Directive`] — A parsed opening fence marker: syntax tag, runnable flag, target, line range, and argument payload.
//! - [`FenceTracker`] — Line-by-line fence state; decides which lines of the old body are dropped.
//! - [`Resolver`] — Turns a directive into replacement lines, reading files or running programs.
//! - [`RewriteOutcome`] — A rewritten document body plus whether anything changed.
//! - [`EmbedConfig`] — Configuration loaded from `mdembed.toml`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdembed_core::RewriteOptions;
//! use mdembed_core::rewrite_file;
//! use std::path::Path;
//!
//! let options = RewriteOptions::default();
//! let changed = rewrite_file(Path::new("README.md"), &options).unwrap();
//! if changed {
//! 	eprintln!("README.md updated");
//! }
//! ```

pub use config::*;
pub use directive::*;
pub use error::*;
pub use fence::*;
pub use resolver::*;
pub use rewriter::*;
pub use snapshot::*;

pub mod config;
mod directive;
pub mod discover;
mod error;
mod fence;
mod resolver;
mod rewriter;
mod snapshot;
pub mod vcs;
