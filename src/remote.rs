use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Seam over process execution. `Err` means the program could not be run to completion
/// (missing binary, timeout); a non-zero exit is an `Ok` with `success == false`.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, String>;
}

#[derive(Clone, Debug)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, String> {
        debug!(program, ?args, "running command");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| format!("failed to run {program}: {err}"))?;
        let stdout = drain_pipe(child.stdout.take());
        let stderr = drain_pipe(child.stderr.take());

        let status = wait_with_deadline(&mut child, self.timeout).map_err(|err| {
            format!("{program} {err}")
        })?;
        Ok(CommandOutput {
            success: status.success(),
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        })
    }
}

fn drain_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).to_string()
    })
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, String> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!("timed out after {}s", timeout.as_secs()));
            }
            Ok(None) => thread::sleep(Duration::from_millis(20)),
            Err(err) => return Err(format!("wait failed: {err}")),
        }
    }
}

/// Non-interactive ssh invocation: never prompts, trusts new host keys, bounded connect.
pub fn batch_ssh_args(node: &str, connect_timeout_secs: u64, remote_command: &str) -> Vec<String> {
    vec![
        "-o".to_string(),
        "BatchMode=yes".to_string(),
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        format!("ConnectTimeout={connect_timeout_secs}"),
        node.to_string(),
        remote_command.to_string(),
    ]
}

pub fn attach_ssh_args(node: &str, session: &str) -> Vec<String> {
    vec![
        "-t".to_string(),
        node.to_string(),
        format!("tmux attach -t {}", shell_quote(session)),
    ]
}

pub fn shell_ssh_args(node: &str) -> Vec<String> {
    vec!["-t".to_string(), node.to_string()]
}

/// Runs ssh attached to the caller's terminal. The caller must release the terminal first.
pub fn exec_interactive(args: &[String]) -> Result<ExitStatus, String> {
    Command::new("ssh")
        .args(args)
        .status()
        .map_err(|err| format!("failed to run ssh: {err}"))
}

/// Single-quotes a value for a POSIX remote shell.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("train"), "'train'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn batch_ssh_args_disable_prompts_and_bound_connect() {
        let args = batch_ssh_args("gpu01", 2, "tmux ls");
        assert_eq!(
            args,
            vec![
                "-o",
                "BatchMode=yes",
                "-o",
                "StrictHostKeyChecking=no",
                "-o",
                "ConnectTimeout=2",
                "gpu01",
                "tmux ls"
            ]
        );
    }

    #[test]
    fn system_runner_reports_missing_binary_as_error() {
        let runner = SystemRunner::new(Duration::from_secs(1));
        let err = runner
            .run("slurmux-definitely-missing-binary", &[])
            .expect_err("missing binary should fail");
        assert!(err.contains("failed to run"));
    }

    #[test]
    fn system_runner_kills_commands_past_deadline() {
        let runner = SystemRunner::new(Duration::from_millis(200));
        let err = runner
            .run("sleep", &["5".to_string()])
            .expect_err("sleep should time out");
        assert!(err.contains("timed out"), "unexpected error: {err}");
    }
}
