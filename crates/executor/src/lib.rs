use derive_more::{Display, Error};
use miette::Diagnostic;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
};
use tokio::process::Command;

#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum ExecutorError {
    #[display("Cannot find the program {program:?}")]
    #[diagnostic(
        code(modup_executor::program_not_found),
        help("Make sure the program is installed and available in PATH.")
    )]
    ProgramNotFound {
        program: String,
        #[error(source)]
        error: which::Error,
    },

    #[display("Failed to execute {command:?}")]
    #[diagnostic(code(modup_executor::io_error))]
    Io {
        command: String,
        #[error(source)]
        error: std::io::Error,
    },
}

/// Captured result of a finished process.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Stdout without surrounding whitespace, or `None` if nothing was printed.
    pub fn trimmed_stdout(&self) -> Option<&str> {
        Some(self.stdout.trim()).filter(|stdout| !stdout.is_empty())
    }
}

/// An external program invoked from a fixed working directory.
#[derive(Debug, Clone)]
pub struct Program {
    program: String,
    current_dir: PathBuf,
}

impl Program {
    pub fn new(program: impl Into<String>, current_dir: impl Into<PathBuf>) -> Self {
        Program { program: program.into(), current_dir: current_dir.into() }
    }

    pub fn name(&self) -> &'_ str {
        &self.program
    }

    pub fn current_dir(&self) -> &'_ Path {
        &self.current_dir
    }

    /// Run the program with `args` to completion, capturing stdout and stderr.
    ///
    /// A non-zero exit status is not an error here, callers decide what it means.
    pub async fn capture<Args>(&self, args: Args) -> Result<CommandOutput, ExecutorError>
    where
        Args: IntoIterator,
        Args::Item: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|arg| arg.as_ref().to_os_string()).collect();
        let command_line = || {
            args.iter().fold(self.program.clone(), |mut line, arg| {
                line.push(' ');
                line.push_str(&arg.to_string_lossy());
                line
            })
        };

        let resolved = which::which_in(&self.program, std::env::var_os("PATH"), &self.current_dir)
            .map_err(|error| ExecutorError::ProgramNotFound {
                program: self.program.clone(),
                error,
            })?;

        let output = Command::new(resolved)
            .args(&args)
            .current_dir(&self.current_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|error| ExecutorError::Io { command: command_line(), error })?;

        Ok(CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
