//! External commands run by the pipeline

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::error::{Error, Result};

lazy_static! {
    static ref VERSION_RE: Regex = Regex::new(r"(\d+)\.(\d+)\.(\d+)").unwrap();
}

/// One external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Step {
    pub fn new(name: &str, program: &str, args: Vec<String>, cwd: &Path) -> Self {
        Self {
            name: name.to_string(),
            program: program.to_string(),
            args,
            cwd: cwd.to_path_buf(),
        }
    }

    /// Run to completion, forwarding output lines to the log.
    /// Any exit other than zero is an error; nothing is retried.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("[{}] {} {}", self.name, self.program, self.args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let name = self.name.as_str();

        let forward_stdout = async {
            if let Some(out) = stdout {
                let mut lines = BufReader::new(out).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::info!("[{}] {}", name, line);
                }
            }
        };
        let forward_stderr = async {
            if let Some(err) = stderr {
                let mut lines = BufReader::new(err).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::warn!("[{}] {}", name, line);
                }
            }
        };

        let (status, _, _) = tokio::join!(child.wait(), forward_stdout, forward_stderr);
        let status = status.map_err(|source| self.spawn_error(source))?;

        if !status.success() {
            tracing::error!("[{}] failed with {}", self.name, status);
            return Err(Error::StepFailed {
                step: self.name.clone(),
                code: status.code(),
            });
        }
        Ok(())
    }

    /// Run and capture stdout and stderr instead of logging them
    pub async fn capture(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| self.spawn_error(source))?;
        if !output.status.success() {
            return Err(Error::StepFailed {
                step: self.name.clone(),
                code: output.status.code(),
            });
        }
        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    fn spawn_error(&self, source: std::io::Error) -> Error {
        Error::Spawn {
            step: self.name.clone(),
            program: self.program.clone(),
            source,
        }
    }
}

/// First `major.minor.patch` in a tool's version banner
pub fn extract_version(output: &str) -> Option<semver::Version> {
    let caps = VERSION_RE.captures(output)?;
    let part = |i: usize| caps.get(i)?.as_str().parse::<u64>().ok();
    Some(semver::Version::new(part(1)?, part(2)?, part(3)?))
}

/// Ask the generator for its version and hold it to `requirement`
pub async fn check_version(step: &Step, requirement: &str) -> Result<semver::Version> {
    let req = semver::VersionReq::parse(requirement).map_err(|e| Error::GeneratorVersion {
        required: requirement.to_string(),
        found: format!("an unusable requirement ({e})"),
    })?;
    let banner = step.capture().await?;
    let version = extract_version(&banner).ok_or_else(|| Error::UnknownGeneratorVersion {
        program: step.program.clone(),
    })?;
    if !req.matches(&version) {
        return Err(Error::GeneratorVersion {
            required: requirement.to_string(),
            found: version.to_string(),
        });
    }
    tracing::info!("Generator version {} satisfies {}", version, requirement);
    Ok(version)
}
