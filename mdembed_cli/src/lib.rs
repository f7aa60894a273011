use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
	name = "mdembed",
	author,
	version,
	about = "Embed source file slices and program output into markdown code blocks.",
	long_about = "mdembed keeps fenced code blocks in markdown documents synchronized with the \
	              code they quote.\n\nAn opening fence marker can name a source file and an \
	              optional line range:\n  ```py:example.py [3-5]\nor a program to run, whose \
	              stdout fills the block:\n  ```sh:run:./script.sh <[\"--flag\"]>\n\nEvery run \
	              replaces the body of each directive block with freshly resolved content, so \
	              documents can be regenerated at any time and checked in CI via the exit code."
)]
#[allow(clippy::struct_excessive_bools)]
pub struct EmbedCli {
	/// Directories to scan for documents.
	#[arg(long, short = 'd', value_name = "DIRECTORY", num_args = 1..)]
	pub directories: Vec<PathBuf>,

	/// Individual document files to process.
	#[arg(long, short = 'f', value_name = "FILE", num_args = 1..)]
	pub files: Vec<PathBuf>,

	/// Also scan sub-directories of each directory.
	#[arg(long, short = 's', default_value_t = false)]
	pub sub: bool,

	/// Keep the original of each document, appending `.old` to its name.
	#[arg(long, short = 'b', default_value_t = false)]
	pub backup: bool,

	/// Exit value ignores changes to files tracked by git.
	#[arg(long, short = 'g', default_value_t = false)]
	pub ignore_git: bool,

	/// Exit value ignores changes to untracked files.
	#[arg(long, short = 'u', default_value_t = false)]
	pub ignore_untracked: bool,

	/// Reduce the number of messages printed.
	#[arg(long, short = 'q', default_value_t = false)]
	pub quiet: bool,

	/// Show a unified diff for each updated document.
	#[arg(long, default_value_t = false)]
	pub diff: bool,

	/// Enable verbose output.
	#[arg(long, short = 'v', default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}
