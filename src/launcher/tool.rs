use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;
use thiserror::Error;

/// One invocation of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub current_dir: PathBuf,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>, current_dir: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            current_dir: current_dir.as_ref().to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(&self.current_dir);
        command
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to launch `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` {}", describe_exit(.code))]
    Failed { command: String, code: Option<i32> },
}

impl ToolError {
    /// Exit code the launcher should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::Failed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// Executes tool commands. Implementations stop at the first failure by
/// returning an error.
pub trait ToolRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<(), ToolError>;

    /// Whether commands actually touch the system.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs commands to completion with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<(), ToolError> {
        info!("running `{command}` in {}", command.current_dir.display());
        let status = command
            .to_command()
            .status()
            .map_err(|source| ToolError::Spawn {
                command: command.to_string(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                command: command.to_string(),
                code: status.code(),
            })
        }
    }
}

/// Logs commands without running them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunner;

impl ToolRunner for DryRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<(), ToolError> {
        info!("would run `{command}` in {}", command.current_dir.display());
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
