use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Driver for GNU parallel. Commands are fed one per line over stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parallel {
    pub program: String,
    pub jobs: usize,
    pub joblog: Option<PathBuf>,
    pub halt_on_error: bool,
    pub extra_args: Vec<String>,
}

impl Default for Parallel {
    fn default() -> Self {
        Self {
            program: String::from("parallel"),
            jobs: 8,
            joblog: None,
            halt_on_error: false,
            extra_args: vec![],
        }
    }
}

impl Parallel {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![String::from("--jobs"), self.jobs.to_string()];

        if let Some(joblog) = &self.joblog {
            args.push(String::from("--joblog"));
            args.push(joblog.display().to_string());
        }

        if self.halt_on_error {
            args.push(String::from("--halt"));
            args.push(String::from("now,fail=1"));
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }

    #[tracing::instrument(skip(commands), fields(n = commands.len()))]
    pub fn run(&self, commands: &[String]) -> Result<()> {
        let spawn_err = |source: std::io::Error| Error::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // Dropping stdin sends EOF to parallel
        let written = match child.stdin.take() {
            Some(stdin) => write_commands(stdin, commands),
            None => Err(std::io::Error::other(format!("No stdin for {}", self.program))),
        };

        // A failed write usually means parallel halted early, so its exit status comes first
        let status = child.wait()?;
        if !status.success() {
            return Err(Error::JobsFailed {
                program: self.program.clone(),
                code: status.code(),
            });
        }
        written?;

        tracing::info!("{} jobs finished", commands.len());
        Ok(())
    }
}

fn write_commands<W: Write>(stdin: W, commands: &[String]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(stdin);
    for command in commands {
        tracing::trace!("{command}");
        writeln!(writer, "{command}")?;
    }
    writer.flush()
}
