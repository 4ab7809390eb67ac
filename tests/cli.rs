use nix::sys::stat::{Mode, umask};
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn shell(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_minishell"));
    cmd.current_dir(dir)
        .arg("--config")
        .arg(dir.join("no-such-config.toml"))
        .arg("--log-level")
        .arg("off");
    cmd
}

fn run_line(dir: &Path, line: &str) -> Output {
    shell(dir).arg("-c").arg(line).output().unwrap()
}

fn run_stdin(dir: &Path, input: &str) -> Output {
    let mut child = shell(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_external_command_receives_arguments() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "echo hello   world");

    assert!(output.status.success());
    assert_eq!(stdout(&output), "hello world\n");
}

#[test]
fn test_quoted_argument_stays_one_word() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "printf '%s|' 'a b' \"c\"");

    assert_eq!(stdout(&output), "a b|c|");
}

#[test]
fn test_three_stage_pipeline() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "printf 'b\\na\\nb\\n' | sort | uniq");

    assert_eq!(stdout(&output), "a\nb\n");
}

#[test]
fn test_pipeline_carries_large_output() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "seq 1 100000 | wc -l");

    assert_eq!(stdout(&output).trim(), "100000");
}

#[test]
fn test_early_exiting_consumer_does_not_hang() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "yes | head -n 2");

    assert!(output.status.success());
    assert_eq!(stdout(&output), "y\ny\n");
}

#[test]
fn test_redirection_round_trip() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "echo hello > f.txt ; cat < f.txt");

    assert_eq!(stdout(&output), "hello\n");
    assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "hello\n");
}

#[test]
fn test_output_redirection_truncates() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("f.txt"), "a much longer previous content\n").unwrap();

    run_line(dir.path(), "echo short > f.txt");

    assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "short\n");
}

#[test]
fn test_redirection_inside_pipeline() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.txt"), "c\na\nb\n").unwrap();

    let output = run_line(dir.path(), "sort < in.txt | head -n 1 > out.txt ; cat out.txt");

    assert_eq!(stdout(&output), "a\n");
}

#[test]
fn test_input_and_output_redirection_on_one_stage() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.txt"), "c\na\nb\n").unwrap();
    umask(Mode::from_bits_truncate(0o022));

    let output = run_line(dir.path(), "sort < in.txt > out.txt ; cat out.txt");
    let mode = fs::metadata(dir.path().join("out.txt"))
        .unwrap()
        .permissions()
        .mode();

    assert_eq!(stdout(&output), "a\nb\nc\n");
    assert_eq!(mode & 0o777, 0o644);
}

#[test]
fn test_empty_atom_with_redirection_creates_file() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "> created.txt");

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("created.txt")).unwrap(), "");
}

#[test]
fn test_missing_input_file_fails_only_that_statement() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "cat < missing.txt ; echo after");

    assert!(stderr(&output).contains("missing.txt"));
    assert_eq!(stdout(&output), "after\n");
}

#[test]
fn test_missing_redirect_target_is_syntax_error() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "echo hi > ; echo after");

    assert!(stderr(&output).contains("syntax error"));
    assert_eq!(stdout(&output), "after\n");
}

#[test]
fn test_prev_replays_previous_line() {
    let dir = TempDir::new().unwrap();
    let output = run_stdin(dir.path(), "echo hi\nprev\nprev\n");

    let out = stdout(&output);
    assert_eq!(out.matches("hi\n").count(), 5, "{out}");
    assert_eq!(out.matches("echo hi\n").count(), 2, "{out}");
    assert!(out.ends_with("\nBye bye.\n"));
}

#[test]
fn test_cd_to_missing_directory_keeps_cwd() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();

    let output = run_line(dir.path(), "cd nonexistent_dir ; pwd ; cd sub ; pwd");
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 3, "{out}");
    assert!(lines[0].contains("nonexistent_dir"));
    assert!(!lines[1].ends_with("sub"));
    assert!(lines[2].ends_with("sub"));
}

#[test]
fn test_cd_inside_pipeline_does_not_change_shell() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();

    let output = run_line(dir.path(), "cd sub | cat ; pwd");

    assert!(!stdout(&output).trim_end().ends_with("sub"));
}

#[test]
fn test_exit_skips_remaining_statements() {
    let dir = TempDir::new().unwrap();
    let output = run_stdin(dir.path(), "echo before ; exit ; echo after\necho never\n");

    let out = stdout(&output);
    assert!(output.status.success());
    assert!(out.contains("before\n"));
    assert!(out.ends_with("Bye bye.\n"));
    assert!(!out.contains("after"));
    assert!(!out.contains("never"));
}

#[test]
fn test_exit_inside_pipeline_ends_session() {
    let dir = TempDir::new().unwrap();
    let output = run_stdin(dir.path(), "echo a | exit\necho never\n");

    assert!(!stdout(&output).contains("never"));
}

#[test]
fn test_exit_at_pipeline_head_does_not_stop_the_tail() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "exit | echo tail_ran");

    assert!(output.status.success());
    assert_eq!(stdout(&output), "tail_ran\n");
}

#[test]
fn test_end_of_input_says_goodbye() {
    let dir = TempDir::new().unwrap();
    let output = run_stdin(dir.path(), "");

    assert!(output.status.success());
    assert_eq!(stdout(&output), "Welcome to mini-shell\nshell $ \nBye bye.\n");
}

#[test]
fn test_source_runs_every_line() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(
        dir.path().join("script.txt"),
        "echo one\ncd sub\npwd\necho two | tr a-z A-Z\n",
    )
    .unwrap();

    let output = run_line(dir.path(), "source script.txt ; echo done");
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 4, "{out}");
    assert_eq!(lines[0], "one");
    assert!(lines[1].ends_with("sub"));
    assert_eq!(lines[2], "TWO");
    assert_eq!(lines[3], "done");
}

#[test]
fn test_source_missing_script_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "source missing.txt ; echo still here");

    assert!(output.status.success());
    assert!(stdout(&output).contains("source: missing.txt"));
    assert!(stdout(&output).ends_with("still here\n"));
}

#[test]
fn test_source_of_directory_continues_with_next_statement() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("adir")).unwrap();

    let output = run_line(dir.path(), "source adir ; echo after");
    let out = stdout(&output);

    assert!(out.starts_with("source: adir: "), "{out}");
    assert!(out.ends_with("after\n"), "{out}");
}

#[test]
fn test_nul_byte_argument_fails_only_its_statement() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("nul.txt");
    fs::write(&script, "echo a\0b ; echo after\n").unwrap();

    let output = shell(dir.path()).arg(&script).output().unwrap();

    assert!(stderr(&output).contains("NUL"));
    assert_eq!(stdout(&output), "after\n");
}

#[test]
fn test_script_argument_runs_like_source() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("run.txt");
    fs::write(&script, "echo from script\nexit\necho unreachable\n").unwrap();

    let output = shell(dir.path()).arg(&script).output().unwrap();
    let out = stdout(&output);

    assert!(out.starts_with("from script\n"));
    assert!(!out.contains("unreachable"));
}

#[test]
fn test_trailing_pipe_reports_broken_pipe() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "echo hi |");

    assert!(output.status.success());
    assert!(stdout(&output).contains("Broken pipe"));
}

#[test]
fn test_unknown_command_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "definitely-not-a-command-xyz ; echo next");

    assert_eq!(
        stdout(&output),
        "[definitely-not-a-command-xyz]: command not found\nnext\n"
    );
}

#[test]
fn test_unterminated_quote_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = run_line(dir.path(), "echo 'oops");

    assert!(output.status.success());
    assert!(stderr(&output).contains("syntax error"));
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_config_file_sets_prompt_and_greeting() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("shell.toml");
    fs::write(&config, "prompt = \"% \"\ngreeting = \"\"\n").unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_minishell"))
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"echo x\n").unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(stdout(&output), "% x\n% \nBye bye.\n");
}
