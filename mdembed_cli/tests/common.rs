use assert_cmd::Command;

pub fn mdembed_cmd() -> Command {
	let mut cmd = Command::cargo_bin("mdembed").expect("mdembed binary should be built");
	cmd.env("NO_COLOR", "1");
	cmd
}
