use std::path::Path;
use std::process;

use clap::Parser;
use mdembed_cli::EmbedCli;
use mdembed_core::EmbedConfig;
use mdembed_core::EmbedError;
use mdembed_core::RewriteOptions;
use mdembed_core::discover;
use mdembed_core::rewrite_file;
use mdembed_core::vcs;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = EmbedCli::parse();

	// Respect NO_COLOR, --no-color, and terminal capability detection.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose);

	match run(&args) {
		Ok(code) => process::exit(code),
		Err(e) => {
			report_error(e);
			process::exit(2);
		}
	}
}

fn init_tracing(verbose: bool) {
	let default_directive = if verbose { "mdembed_core=debug" } else { "warn" };
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn report_error(e: mdembed_core::AnyError) {
	// Try to render through miette for rich diagnostics with help text and
	// error codes.
	match e.downcast::<EmbedError>() {
		Ok(embed_err) => {
			let report: miette::Report = (*embed_err).into();
			eprintln!("{report:?}");
		}
		Err(e) => {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn run(args: &EmbedCli) -> Result<i32, mdembed_core::AnyError> {
	let cwd = std::env::current_dir()?;
	let config = EmbedConfig::load(&cwd)?.unwrap_or_default();

	let document_name = config.document.clone();
	let recurse = args.sub || config.recurse;
	let options = RewriteOptions {
		timeout: config.timeout(),
		keep_backup: args.backup || config.backup,
	};

	let mut directories = args.directories.clone();
	let mut files = args.files.clone();
	if files.is_empty() && directories.is_empty() {
		directories.push(cwd);
	}

	for dir in &directories {
		if !args.quiet {
			if recurse {
				println!("Checking {} and sub-directories", dir.display());
			} else {
				println!("Checking {}", dir.display());
			}
		}

		if dir.is_dir() {
			files.extend(discover::find_documents(dir, &document_name, recurse)?);
		} else {
			eprintln!(
				"{} not a directory: {}",
				colored!("warning:", yellow),
				dir.display()
			);
		}
	}

	let mut changed = Vec::new();
	let mut failures = 0usize;

	let total = files.len();
	for (index, file) in files.iter().enumerate() {
		if !file.is_file() {
			eprintln!(
				"{} not a file: {}",
				colored!("warning:", yellow),
				file.display()
			);
			continue;
		}

		if !args.quiet {
			let progress = (100.0 * (index + 1) as f64 / total as f64).round();
			println!("Parsing: [{progress}%] {}", file.display());
		}

		match process_document(file, &options, args.diff) {
			Ok(true) => changed.push(file.clone()),
			Ok(false) => {}
			Err(e) => {
				eprintln!(
					"{} failed to update {}",
					colored!("error:", red),
					file.display()
				);
				report_error(e);
				failures += 1;
			}
		}
	}

	let mut tracked_changes = Vec::new();
	if !changed.is_empty() {
		if !args.quiet {
			println!();
			println!("Files updated on this run:");
		}
		for file in &changed {
			if !args.quiet {
				println!("\t{}", file.display());
			}
			let status = vcs::classify(file);
			if status.tracked && status.modified {
				tracked_changes.push(file.clone());
			}
		}
	}

	if !args.ignore_git && !tracked_changes.is_empty() {
		println!(
			"{}",
			colored!("Files tracked by Git modified on this run:", yellow)
		);
		for file in &tracked_changes {
			println!("{}", colored!(format!("\t{}", file.display()), yellow));
		}
	}

	if failures > 0 {
		return Ok(2);
	}
	if !args.ignore_untracked {
		return Ok(exit_code_for(changed.len()));
	}
	if !args.ignore_git {
		return Ok(exit_code_for(tracked_changes.len()));
	}

	Ok(0)
}

/// The exit code reports the number of updated documents.
fn exit_code_for(count: usize) -> i32 {
	i32::try_from(count).unwrap_or(i32::MAX)
}

/// Rewrite one document, optionally printing a diff of what changed.
fn process_document(
	path: &Path,
	options: &RewriteOptions,
	show_diff: bool,
) -> Result<bool, mdembed_core::AnyError> {
	let before = if show_diff {
		Some(std::fs::read_to_string(path)?)
	} else {
		None
	};

	let changed = rewrite_file(path, options)?;

	if let (true, Some(before)) = (changed, before) {
		let after = std::fs::read_to_string(path)?;
		print_diff_header(path);
		print_diff(&before, &after);
	}

	Ok(changed)
}

fn print_diff_header(path: &Path) {
	eprintln!("{}", colored!(format!("--- {}", path.display()), bold));
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}
