//! Sequential executor: run sanitized commands one after another.
//!
//! Each command is awaited to completion before the next one starts. A
//! failing step never aborts the rest; its outcome becomes one fragment of
//! the aggregated report.
//!
//! `cd` is handled in-process: it moves the [`ShellSession`] cursor so that
//! later commands (in this turn and later turns) run in the new directory.

use promptsh_config::{ShellConfig, dirs_home};
use promptsh_security::{AuditEvent, AuditLogger, AuditOutcome};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

/// Report text for a turn with nothing to run.
pub const NO_VALID_COMMANDS: &str = "No valid commands found.";

/// Working-directory cursor shared by every command of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSession {
    cwd: PathBuf,
    previous: Option<PathBuf>,
}

impl ShellSession {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            previous: None,
        }
    }

    /// Session rooted at the process working directory.
    pub fn from_current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn current_dir(&self) -> &Path {
        &self.cwd
    }

    pub fn previous_dir(&self) -> Option<&Path> {
        self.previous.as_deref()
    }

    /// Move the cursor. `None` means the home directory, `-` the previous
    /// directory, and a leading `~` is expanded. On error the session is
    /// left untouched.
    pub fn change_dir(&mut self, arg: Option<&str>) -> Result<PathBuf, String> {
        let target = match arg {
            None => dirs_home(),
            Some("-") => self
                .previous
                .clone()
                .ok_or_else(|| "no previous directory".to_string())?,
            Some("~") => dirs_home(),
            Some(path) => match path.strip_prefix("~/") {
                Some(rest) => dirs_home().join(rest),
                None => self.cwd.join(path),
            },
        };

        let resolved = target.canonicalize().map_err(|e| e.to_string())?;
        if !resolved.is_dir() {
            return Err("Not a directory".into());
        }

        let old = std::mem::replace(&mut self.cwd, resolved.clone());
        self.previous = Some(old);
        Ok(resolved)
    }
}

/// Captured outcome of one subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub command: String,
    /// `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// One executor step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepOutcome {
    DirectoryChanged { path: PathBuf },
    DirectoryChangeFailed { target: String, reason: String },
    Completed(ExecutionResult),
    SpawnFailed { command: String, reason: String },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            Self::DirectoryChanged { .. } => true,
            Self::Completed(result) => result.success(),
            Self::DirectoryChangeFailed { .. } | Self::SpawnFailed { .. } => false,
        }
    }

    /// The report fragment for this step.
    pub fn render(&self) -> String {
        match self {
            Self::DirectoryChanged { path } => {
                format!("Changed directory to {}", path.display())
            }
            Self::DirectoryChangeFailed { target, reason } => {
                format!("Error: cd {target}: {reason}")
            }
            Self::SpawnFailed { command, reason } => {
                format!("Execution error in '{command}': {reason}")
            }
            Self::Completed(result) => render_result(result),
        }
    }
}

fn render_result(result: &ExecutionResult) -> String {
    let stdout = result.stdout.trim();
    let stderr = result.stderr.trim();

    if !result.success() {
        let code = result
            .status
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        let detail = if stderr.is_empty() { stdout } else { stderr };
        return format!("Error (exit {code}) in '{}': {detail}", result.command)
            .trim_end()
            .to_string();
    }

    let mut text = if stdout.is_empty() {
        format!("Command '{}' executed successfully.", result.command)
    } else {
        stdout.to_string()
    };
    if !stderr.is_empty() {
        text.push_str("\n[stderr]: ");
        text.push_str(stderr);
    }
    text
}

/// Ordered outcomes of one executor pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub steps: Vec<StepOutcome>,
}

impl ExecutionReport {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(StepOutcome::is_success)
    }

    /// Fragments joined with newlines, empty ones dropped.
    pub fn render(&self) -> String {
        if self.steps.is_empty() {
            return NO_VALID_COMMANDS.to_string();
        }
        self.steps
            .iter()
            .map(StepOutcome::render)
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Runs commands through the host shell.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    /// Shell program invoked as `<program> -c <command>`; platform shell if unset
    program: Option<String>,
    audit: Option<Arc<AuditLogger>>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            program: config.program.clone(),
            audit: None,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Run `commands` in order against `session`.
    pub async fn execute(&self, session: &mut ShellSession, commands: &[String]) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for command in commands {
            let cwd = session.current_dir().display().to_string();

            let step = match parse_cd(command) {
                Some(arg) => self.change_dir(session, arg.as_deref(), command, &cwd),
                None => self.run(session.current_dir(), command, &cwd).await,
            };

            report.steps.push(step);
        }

        report
    }

    fn change_dir(
        &self,
        session: &mut ShellSession,
        arg: Option<&str>,
        command: &str,
        cwd: &str,
    ) -> StepOutcome {
        match session.change_dir(arg) {
            Ok(path) => {
                debug!(to = %path.display(), "Changed session directory");
                self.audit(
                    AuditEvent::DirectoryChanged {
                        to: path.display().to_string(),
                    },
                    cwd,
                    command,
                    AuditOutcome::Success,
                    None,
                );
                StepOutcome::DirectoryChanged { path }
            }
            Err(reason) => {
                let target = arg.unwrap_or("~").to_string();
                warn!(target = %target, reason = %reason, "cd failed");
                self.audit(
                    AuditEvent::DirectoryChanged { to: target.clone() },
                    cwd,
                    command,
                    AuditOutcome::Failure,
                    Some(reason.clone()),
                );
                StepOutcome::DirectoryChangeFailed { target, reason }
            }
        }
    }

    async fn run(&self, dir: &Path, command: &str, cwd: &str) -> StepOutcome {
        debug!(command = %command, cwd = %cwd, "Executing shell command");

        let output = self
            .shell_command(command)
            .current_dir(dir)
            .env("PWD", dir)
            .output()
            .await;

        match output {
            Ok(output) => {
                let result = ExecutionResult {
                    command: command.to_string(),
                    status: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                let outcome = if result.success() {
                    AuditOutcome::Success
                } else {
                    warn!(command = %command, exit_code = ?result.status, "Command failed");
                    AuditOutcome::Failure
                };
                self.audit(
                    AuditEvent::CommandExecuted {
                        exit_code: result.status,
                    },
                    cwd,
                    command,
                    outcome,
                    None,
                );

                StepOutcome::Completed(result)
            }
            Err(e) => {
                warn!(command = %command, error = %e, "Failed to start shell");
                self.audit(
                    AuditEvent::SpawnFailed,
                    cwd,
                    command,
                    AuditOutcome::Failure,
                    Some(e.to_string()),
                );
                StepOutcome::SpawnFailed {
                    command: command.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn shell_command(&self, command: &str) -> Command {
        match &self.program {
            Some(program) => {
                let mut cmd = Command::new(program);
                cmd.args(["-c", command]);
                cmd
            }
            None if cfg!(target_os = "windows") => {
                let mut cmd = Command::new("cmd");
                cmd.args(["/C", command]);
                cmd
            }
            None => {
                let mut cmd = Command::new("sh");
                cmd.args(["-c", command]);
                cmd
            }
        }
    }

    fn audit(
        &self,
        event: AuditEvent,
        cwd: &str,
        target: &str,
        outcome: AuditOutcome,
        details: Option<String>,
    ) {
        if let Some(audit) = &self.audit {
            audit.log(event, cwd, target, outcome, details);
        }
    }
}

/// `Some(arg)` when `command` is a plain `cd` or `cd <arg>`.
fn parse_cd(command: &str) -> Option<Option<String>> {
    let mut tokens = shell_words::split(command).ok()?.into_iter();
    if tokens.next()? != "cd" {
        return None;
    }
    match (tokens.next(), tokens.next()) {
        (None, _) => Some(None),
        (Some(arg), None) => Some(Some(arg)),
        (Some(_), Some(_)) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_tempdir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().canonicalize().unwrap();
        (dir, path)
    }

    fn cmds(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_cd_forms() {
        assert_eq!(parse_cd("cd"), Some(None));
        assert_eq!(parse_cd("cd sub"), Some(Some("sub".into())));
        assert_eq!(parse_cd("cd \"my dir\""), Some(Some("my dir".into())));
        assert_eq!(parse_cd("cd a b"), None);
        assert_eq!(parse_cd("cd \"oops"), None);
        assert_eq!(parse_cd("ls cd"), None);
        assert_eq!(parse_cd("cdx"), None);
    }

    #[test]
    fn render_zero_exit_without_output() {
        let step = StepOutcome::Completed(ExecutionResult {
            command: "mkdir demo".into(),
            status: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        });
        assert_eq!(step.render(), "Command 'mkdir demo' executed successfully.");
    }

    #[test]
    fn render_zero_exit_with_stderr() {
        let step = StepOutcome::Completed(ExecutionResult {
            command: "git status".into(),
            status: Some(0),
            stdout: "clean\n".into(),
            stderr: "warning: x\n".into(),
        });
        assert_eq!(step.render(), "clean\n[stderr]: warning: x");
    }

    #[test]
    fn render_non_zero_exit_prefers_stderr() {
        let step = StepOutcome::Completed(ExecutionResult {
            command: "ls nope".into(),
            status: Some(2),
            stdout: "ignored".into(),
            stderr: "ls: nope: No such file or directory\n".into(),
        });
        assert_eq!(
            step.render(),
            "Error (exit 2) in 'ls nope': ls: nope: No such file or directory"
        );
    }

    #[test]
    fn render_non_zero_exit_falls_back_to_stdout() {
        let step = StepOutcome::Completed(ExecutionResult {
            command: "git diff --exit-code".into(),
            status: Some(1),
            stdout: "diff".into(),
            stderr: String::new(),
        });
        assert_eq!(step.render(), "Error (exit 1) in 'git diff --exit-code': diff");
    }

    #[test]
    fn render_signal_kill() {
        let step = StepOutcome::Completed(ExecutionResult {
            command: "cat".into(),
            status: None,
            stdout: String::new(),
            stderr: String::new(),
        });
        assert_eq!(step.render(), "Error (exit signal) in 'cat':");
    }

    #[tokio::test]
    async fn empty_input_reports_nothing_to_do() {
        let audit = Arc::new(AuditLogger::new());
        let executor = Executor::new().with_audit(audit.clone());
        let mut session = ShellSession::new("/");

        let report = executor.execute(&mut session, &[]).await;
        assert!(report.is_empty());
        assert_eq!(report.to_string(), NO_VALID_COMMANDS);
        assert_eq!(audit.count(), 0);
    }

    #[tokio::test]
    async fn bad_cd_leaves_session_unchanged() {
        let (_guard, root) = canonical_tempdir();
        let mut session = ShellSession::new(&root);

        let report = Executor::new()
            .execute(&mut session, &cmds(&["cd does-not-exist"]))
            .await;

        assert_eq!(session.current_dir(), root.as_path());
        assert!(report.render().starts_with("Error: cd does-not-exist:"));
        assert!(!report.all_succeeded());
    }

    #[tokio::test]
    async fn cd_to_file_is_rejected() {
        let (_guard, root) = canonical_tempdir();
        std::fs::write(root.join("plain.txt"), "x").unwrap();
        let mut session = ShellSession::new(&root);

        let report = Executor::new()
            .execute(&mut session, &cmds(&["cd plain.txt"]))
            .await;

        assert_eq!(session.current_dir(), root.as_path());
        assert_eq!(report.render(), "Error: cd plain.txt: Not a directory");
    }

    #[tokio::test]
    async fn cd_dash_returns_to_previous() {
        let (_guard, root) = canonical_tempdir();
        std::fs::create_dir(root.join("sub")).unwrap();
        let mut session = ShellSession::new(&root);

        let report = Executor::new()
            .execute(&mut session, &cmds(&["cd sub", "cd -"]))
            .await;

        assert_eq!(session.current_dir(), root.as_path());
        assert_eq!(session.previous_dir(), Some(root.join("sub").as_path()));
        assert!(report.all_succeeded());
    }

    #[test]
    fn cd_dash_without_history_fails() {
        let mut session = ShellSession::new("/");
        assert_eq!(session.change_dir(Some("-")).unwrap_err(), "no previous directory");
        assert_eq!(session.current_dir(), Path::new("/"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cd_persists_for_following_commands() {
        let (_guard, root) = canonical_tempdir();
        std::fs::create_dir(root.join("sub")).unwrap();
        let mut session = ShellSession::new(&root);
        let sub = root.join("sub");

        let report = Executor::new()
            .execute(&mut session, &cmds(&["cd sub", "pwd"]))
            .await;

        assert_eq!(session.current_dir(), sub.as_path());
        assert_eq!(
            report.render(),
            format!("Changed directory to {0}\n{0}", sub.display())
        );

        // The cursor survives into the next pass.
        let report = Executor::new().execute(&mut session, &cmds(&["pwd"])).await;
        assert_eq!(report.render(), sub.display().to_string());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn mkdir_then_touch_creates_file() {
        let (_guard, root) = canonical_tempdir();
        let mut session = ShellSession::new(&root);

        let report = Executor::new()
            .execute(&mut session, &cmds(&["mkdir demo", "touch demo/a.txt"]))
            .await;

        assert!(root.join("demo/a.txt").is_file());
        assert_eq!(
            report.render(),
            "Command 'mkdir demo' executed successfully.\n\
             Command 'touch demo/a.txt' executed successfully."
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failure_does_not_abort_remaining_steps() {
        let (_guard, root) = canonical_tempdir();
        let mut session = ShellSession::new(&root);

        let report = Executor::new()
            .execute(&mut session, &cmds(&["cat missing.txt", "echo after"]))
            .await;

        assert_eq!(report.len(), 2);
        assert!(!report.steps[0].is_success());
        let rendered = report.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].starts_with("Error (exit 1) in 'cat missing.txt':"));
        assert_eq!(*lines.last().unwrap(), "after");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stderr_on_success_is_appended() {
        let (_guard, root) = canonical_tempdir();
        let mut session = ShellSession::new(&root);

        let report = Executor::new()
            .execute(&mut session, &cmds(&["echo out; echo err >&2"]))
            .await;

        assert_eq!(report.render(), "out\n[stderr]: err");
    }

    #[tokio::test]
    async fn spawn_failure_is_reported_not_raised() {
        let (_guard, root) = canonical_tempdir();
        let audit = Arc::new(AuditLogger::new());
        let executor = Executor::new()
            .with_program("/nonexistent/promptsh-shell")
            .with_audit(audit.clone());
        let mut session = ShellSession::new(&root);

        let report = executor.execute(&mut session, &cmds(&["ls", "pwd"])).await;

        assert_eq!(report.len(), 2);
        assert!(report.render().starts_with("Execution error in 'ls':"));
        assert_eq!(audit.entries()[0].event, AuditEvent::SpawnFailed);
        assert_eq!(audit.entries_by_outcome(&AuditOutcome::Failure).len(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn steps_are_audited() {
        let (_guard, root) = canonical_tempdir();
        std::fs::create_dir(root.join("sub")).unwrap();
        let audit = Arc::new(AuditLogger::new());
        let executor = Executor::new().with_audit(audit.clone());
        let mut session = ShellSession::new(&root);

        executor
            .execute(&mut session, &cmds(&["cd sub", "ls"]))
            .await;

        let entries = audit.entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0].event, AuditEvent::DirectoryChanged { .. }));
        assert_eq!(entries[0].cwd, root.display().to_string());
        assert_eq!(entries[1].event, AuditEvent::CommandExecuted { exit_code: Some(0) });
        assert_eq!(entries[1].cwd, root.join("sub").display().to_string());
    }

    #[test]
    fn report_serializes_steps() {
        let report = ExecutionReport {
            steps: vec![StepOutcome::DirectoryChanged { path: "/tmp".into() }],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""step":"directory_changed""#));
    }
}
