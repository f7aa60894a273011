mod common;

use mdembed_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;

fn write_source(dir: &std::path::Path) -> AnyEmptyResult {
	std::fs::write(
		dir.join("example.py"),
		"def one():\n    pass\n\ndef two():\n    pass\n",
	)?;

	Ok(())
}

fn git(dir: &std::path::Path, args: &[&str]) -> AnyEmptyResult {
	let status = std::process::Command::new("git")
		.args(args)
		.current_dir(dir)
		.status()?;
	assert!(status.success(), "git {args:?} failed");

	Ok(())
}

/// Turn the directory into a repository with every current file committed.
fn git_repo_with_commit(dir: &std::path::Path) -> AnyEmptyResult {
	git(dir, &["init", "-q"])?;
	git(dir, &["add", "."])?;
	git(
		dir,
		&[
			"-c",
			"user.name=mdembed",
			"-c",
			"user.email=mdembed@example.com",
			"-c",
			"commit.gpgsign=false",
			"commit",
			"-q",
			"-m",
			"initial",
		],
	)?;

	Ok(())
}

#[test]
fn updates_document_and_exits_with_change_count() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	let readme = tmp.path().join("README.md");
	std::fs::write(
		&readme,
		"# Docs\n\n```py:example.py [4-5]\nstale\n```\n",
	)?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.assert()
		.code(1)
		.stdout(predicates::str::contains("Files updated on this run:"));

	assert_eq!(
		std::fs::read_to_string(&readme)?,
		"# Docs\n\n```py:example.py [4-5]\ndef two():\n    pass\n```\n"
	);

	Ok(())
}

#[test]
fn second_run_is_idempotent() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	let readme = tmp.path().join("README.md");
	std::fs::write(&readme, "```py:example.py [1-2]\n```\n")?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path()).arg("-d").arg(".").assert().code(1);

	let after_first = std::fs::read_to_string(&readme)?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.assert()
		.code(0)
		.stdout(predicates::str::contains("Files updated on this run:").not());

	assert_eq!(std::fs::read_to_string(&readme)?, after_first);

	Ok(())
}

#[test]
fn explicit_files_are_processed_without_scanning() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	let doc = tmp.path().join("notes.md");
	std::fs::write(&doc, "```py:example.py [1]\n```\n")?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-f")
		.arg("notes.md")
		.assert()
		.code(1);

	assert_eq!(
		std::fs::read_to_string(&doc)?,
		"```py:example.py [1]\ndef one():\n```\n"
	);

	Ok(())
}

#[test]
fn backup_flag_retains_the_original() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	let readme = tmp.path().join("README.md");
	let original = "```py:example.py [1]\n```\n";
	std::fs::write(&readme, original)?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.arg("-b")
		.assert()
		.code(1);

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("README.md.old"))?,
		original
	);

	Ok(())
}

#[test]
fn no_backup_file_without_the_flag() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	std::fs::write(tmp.path().join("README.md"), "```py:example.py [1]\n```\n")?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path()).arg("-d").arg(".").assert().code(1);

	assert!(!tmp.path().join("README.md.old").exists());

	Ok(())
}

#[test]
fn sub_flag_descends_into_directories() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let nested = tmp.path().join("docs/module");
	std::fs::create_dir_all(&nested)?;
	write_source(&nested)?;
	let readme = nested.join("README.md");
	std::fs::write(&readme, "```py:example.py [2]\n```\n")?;

	// Without -s the nested document is not found.
	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path()).arg("-d").arg(".").assert().code(0);

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.arg("-s")
		.assert()
		.code(1);

	assert_eq!(
		std::fs::read_to_string(&readme)?,
		"```py:example.py [2]\n    pass\n```\n"
	);

	Ok(())
}

#[test]
fn ignore_untracked_suppresses_the_change_count() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	std::fs::write(tmp.path().join("README.md"), "```py:example.py [1]\n```\n")?;

	// The tempdir is not a git repository, so nothing is tracked; with -u
	// the untracked changes are excluded and the run exits cleanly.
	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.arg("-u")
		.assert()
		.code(0);

	Ok(())
}

#[test]
fn tracked_and_modified_documents_are_summarized() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	std::fs::write(tmp.path().join("README.md"), "```py:example.py [1]\n```\n")?;
	git_repo_with_commit(tmp.path())?;

	// The committed document is rewritten, so git reports it as tracked
	// and modified.
	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.assert()
		.code(1)
		.stdout(predicates::str::contains(
			"Files tracked by Git modified on this run:",
		))
		.stdout(predicates::str::contains("README.md"));

	Ok(())
}

#[test]
fn ignore_untracked_counts_tracked_changes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	std::fs::write(tmp.path().join("README.md"), "```py:example.py [1]\n```\n")?;
	git_repo_with_commit(tmp.path())?;

	// With -u the exit value is the number of tracked-and-modified
	// documents, which here equals the single committed document.
	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.arg("-u")
		.assert()
		.code(1);

	Ok(())
}

#[test]
fn ignoring_git_and_untracked_always_exits_cleanly() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	std::fs::write(tmp.path().join("README.md"), "```py:example.py [1]\n```\n")?;
	git_repo_with_commit(tmp.path())?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.arg("-u")
		.arg("-g")
		.assert()
		.code(0)
		.stdout(predicates::str::contains("Files tracked by Git modified on this run:").not());

	Ok(())
}

#[test]
fn failing_directive_aborts_the_document() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let readme = tmp.path().join("README.md");
	let original = "intro\n\n```py:missing.py [1-3]\nstale\n```\n";
	std::fs::write(&readme, original)?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to update"));

	// The failing document is left untouched, with no leftover backup.
	assert_eq!(std::fs::read_to_string(&readme)?, original);
	assert!(!tmp.path().join("README.md.old").exists());

	Ok(())
}

#[test]
fn out_of_range_slice_is_a_failure() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("short.py"), "only line\n")?;
	std::fs::write(
		tmp.path().join("README.md"),
		"```py:short.py [5-9]\n```\n",
	)?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("out of bounds"));

	Ok(())
}

#[cfg(unix)]
#[test]
fn runnable_directive_captures_stdout() -> AnyEmptyResult {
	use std::os::unix::fs::PermissionsExt;

	let tmp = tempfile::tempdir()?;
	let script = tmp.path().join("greet.sh");
	std::fs::write(&script, "#!/bin/sh\necho \"hello $1\"\n")?;
	std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;

	let readme = tmp.path().join("README.md");
	std::fs::write(
		&readme,
		"```sh:run:./greet.sh <[\"world\"]>\nstale\n```\n",
	)?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path()).arg("-d").arg(".").assert().code(1);

	assert_eq!(
		std::fs::read_to_string(&readme)?,
		"```sh:run:./greet.sh <[\"world\"]>\nhello world\n```\n"
	);

	Ok(())
}

#[test]
fn quiet_suppresses_progress_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	std::fs::write(tmp.path().join("README.md"), "```py:example.py [1]\n```\n")?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.arg("-q")
		.assert()
		.code(1)
		.stdout(predicates::str::contains("Parsing:").not());

	Ok(())
}

#[test]
fn diff_flag_prints_changes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	std::fs::write(
		tmp.path().join("README.md"),
		"```py:example.py [1]\nstale\n```\n",
	)?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path())
		.arg("-d")
		.arg(".")
		.arg("--diff")
		.assert()
		.code(1)
		.stderr(
			predicates::str::contains("-stale")
				.and(predicates::str::contains("+def one():")),
		);

	Ok(())
}

#[test]
fn config_file_sets_the_document_name() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_source(tmp.path())?;
	std::fs::write(tmp.path().join("mdembed.toml"), "document = \"DOCS.md\"\n")?;
	let docs = tmp.path().join("DOCS.md");
	std::fs::write(&docs, "```py:example.py [1]\n```\n")?;
	std::fs::write(tmp.path().join("README.md"), "```py:example.py [1]\n```\n")?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path()).arg("-d").arg(".").assert().code(1);

	// Only the configured document name is picked up.
	assert_eq!(
		std::fs::read_to_string(&docs)?,
		"```py:example.py [1]\ndef one():\n```\n"
	);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("README.md"))?,
		"```py:example.py [1]\n```\n"
	);

	Ok(())
}

#[test]
fn plain_fences_pass_through_unchanged() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let readme = tmp.path().join("README.md");
	let content = "# Docs\n\n```rust\nfn main() {}\n```\n";
	std::fs::write(&readme, content)?;

	let mut cmd = common::mdembed_cmd();
	cmd.current_dir(tmp.path()).arg("-d").arg(".").assert().code(0);

	assert_eq!(std::fs::read_to_string(&readme)?, content);

	Ok(())
}
