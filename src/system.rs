// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Operating system access.
//!
//! Provisioning steps never touch the machine directly. They describe
//! external commands as [`Invocation`]s, and hand them, along with any file
//! edits, to a [`System`]. The real machine is [`HostSystem`]. Tests swap in
//! a recorder.
//!
//! # Output
//!
//! External commands inherit standard output and standard error, so the
//! operator sees each tool's own diagnostics as they happen. Nothing is
//! captured or rewritten.

use crate::step::{Result, StepError};

use std::{
    ffi::{OsStr, OsString},
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{copy, read_to_string, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
};
use tracing::{debug, instrument, warn};

/// Source of standard input for an external command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Input {
    /// Share the operator's terminal.
    #[default]
    Inherit,

    /// Feed contents of a file.
    File(PathBuf),

    /// Feed fixed text.
    Text(String),
}

/// Description of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    input: Input,
    tolerate_failure: bool,
}

impl Invocation {
    /// Construct new invocation of target program without arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            input: Input::Inherit,
            tolerate_failure: false,
        }
    }

    /// Construct new invocation of target program through sudo.
    pub fn sudo(program: impl Into<OsString>) -> Self {
        Self::new("sudo").arg(program)
    }

    /// Construct new invocation of a shell script through `sh -c`.
    pub fn shell(script: impl Into<OsString>) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Feed target file to standard input.
    pub fn stdin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Input::File(path.into());
        self
    }

    /// Feed target text to standard input.
    pub fn stdin_text(mut self, text: impl Into<String>) -> Self {
        self.input = Input::Text(text.into());
        self
    }

    /// Treat unsuccessful exit as a warning instead of a failure.
    pub fn tolerate_failure(mut self) -> Self {
        self.tolerate_failure = true;
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn tolerates_failure(&self) -> bool {
        self.tolerate_failure
    }
}

impl Display for Invocation {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.program.to_string_lossy().as_ref())?;
        for arg in &self.args {
            write!(fmt, " {}", arg.to_string_lossy())?;
        }

        Ok(())
    }
}

/// Layer of indirection for machine access.
pub trait System {
    /// Run external command to completion.
    ///
    /// # Errors
    ///
    /// - Return [`StepError::Command`] if command exits unsuccessfully,
    ///   unless the invocation tolerates failure.
    /// - Return [`StepError::Interrupted`] if command is killed by Ctrl-C.
    /// - Return [`StepError::Spawn`] if command cannot be started.
    /// - Return [`StepError::Io`] if standard input file cannot be opened.
    fn invoke(&mut self, invocation: &Invocation) -> Result<()>;

    /// Read file into string.
    ///
    /// # Errors
    ///
    /// - Return [`StepError::Io`] if file cannot be read.
    fn read_to_string(&mut self, path: &Path) -> Result<String>;

    /// Append text to user-owned file, creating it if missing.
    ///
    /// # Errors
    ///
    /// - Return [`StepError::Io`] if file cannot be opened or written.
    fn append(&mut self, path: &Path, text: &str) -> Result<()>;

    /// Copy file into target directory under the same file name.
    ///
    /// # Errors
    ///
    /// - Return [`StepError::Io`] if file cannot be copied.
    fn copy_into(&mut self, file: &Path, dir: &Path) -> Result<PathBuf>;

    /// Login name of the invoking user.
    ///
    /// # Errors
    ///
    /// - Return [`StepError::NoLoginName`] if it cannot be determined.
    fn login_name(&self) -> Result<String>;
}

/// The machine bootstrap is running on.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostSystem;

impl HostSystem {
    /// Construct new host system access.
    pub fn new() -> Self {
        Self
    }

    fn spawn(&self, invocation: &Invocation) -> Result<Child> {
        let mut command = Command::new(invocation.program());
        command.args(invocation.arguments());

        match invocation.input() {
            Input::Inherit => {}
            Input::File(path) => {
                let file = File::open(path).map_err(|err| StepError::Io {
                    source: err,
                    path: path.clone(),
                })?;
                command.stdin(Stdio::from(file));
            }
            Input::Text(_) => {
                command.stdin(Stdio::piped());
            }
        }

        command.spawn().map_err(|err| StepError::Spawn {
            source: err,
            command: invocation.to_string(),
        })
    }
}

impl System for HostSystem {
    #[instrument(skip(self, invocation), level = "debug")]
    fn invoke(&mut self, invocation: &Invocation) -> Result<()> {
        debug!("invoke {invocation}");
        let mut child = self.spawn(invocation)?;

        if let Input::Text(text) = invocation.input() {
            // INVARIANT: Drop stdin handle after writing so child sees EOF.
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(text.as_bytes())
                    .map_err(|err| StepError::Spawn {
                        source: err,
                        command: invocation.to_string(),
                    })?;
            }
        }

        let status = child.wait().map_err(|err| StepError::Spawn {
            source: err,
            command: invocation.to_string(),
        })?;

        check_status(invocation, status)
    }

    fn read_to_string(&mut self, path: &Path) -> Result<String> {
        read_to_string(path).map_err(|err| StepError::Io {
            source: err,
            path: path.to_path_buf(),
        })
    }

    fn append(&mut self, path: &Path, text: &str) -> Result<()> {
        debug!("append {text:?} to {:?}", path.display());
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(text.as_bytes()))
            .map_err(|err| StepError::Io {
                source: err,
                path: path.to_path_buf(),
            })
    }

    fn copy_into(&mut self, file: &Path, dir: &Path) -> Result<PathBuf> {
        let name = file.file_name().ok_or_else(|| StepError::Io {
            source: std::io::Error::other("path has no file name"),
            path: file.to_path_buf(),
        })?;
        let target = dir.join(name);

        debug!("copy {:?} to {:?}", file.display(), target.display());
        copy(file, &target).map_err(|err| StepError::Io {
            source: err,
            path: file.to_path_buf(),
        })?;

        Ok(target)
    }

    fn login_name(&self) -> Result<String> {
        std::env::var("LOGNAME")
            .or_else(|_| std::env::var("USER"))
            .ok()
            .filter(|name| !name.is_empty())
            .ok_or(StepError::NoLoginName)
    }
}

fn check_status(invocation: &Invocation, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    if killed_by_interrupt(status) {
        return Err(StepError::Interrupted);
    }

    if invocation.tolerates_failure() {
        warn!("command {:?} failed with {status}, continuing", invocation.to_string());
        return Ok(());
    }

    Err(StepError::Command {
        command: invocation.to_string(),
        status,
    })
}

#[cfg(unix)]
fn killed_by_interrupt(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    // SIGINT
    status.signal() == Some(2)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: ExitStatus) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[test]
    fn invocation_builder_and_display() {
        let invocation = Invocation::sudo("pacman")
            .args(["-S", "--needed", "-"])
            .stdin_file("/srv/arch.txt");

        assert_eq!(invocation.to_string(), "sudo pacman -S --needed -");
        assert_eq!(invocation.program(), OsStr::new("sudo"));
        assert_eq!(invocation.input(), &Input::File("/srv/arch.txt".into()));
        assert!(!invocation.tolerates_failure());

        let invocation = Invocation::shell("curl -s https://get.sdkman.io | bash");
        assert_eq!(
            invocation.arguments(),
            &[OsString::from("-c"), OsString::from("curl -s https://get.sdkman.io | bash")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn host_invoke_reports_exit_status() {
        let mut system = HostSystem::new();

        assert!(system.invoke(&Invocation::new("true")).is_ok());
        assert!(matches!(
            system.invoke(&Invocation::new("false")),
            Err(StepError::Command { .. })
        ));
        assert!(system.invoke(&Invocation::new("false").tolerate_failure()).is_ok());
        assert!(matches!(
            system.invoke(&Invocation::new("this-program-does-not-exist-anywhere")),
            Err(StepError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn host_invoke_detects_interrupted_child() {
        let mut system = HostSystem::new();
        let result = system.invoke(&Invocation::shell("kill -INT $$"));
        assert!(matches!(result, Err(StepError::Interrupted)));
    }

    #[cfg(unix)]
    #[sealed_test]
    fn host_invoke_feeds_stdin() -> anyhow::Result<()> {
        let mut system = HostSystem::new();

        std::fs::write("packages.txt", "zsh\nzip\n")?;
        system.invoke(
            &Invocation::shell("cat > copied.txt").stdin_file("packages.txt"),
        )?;
        assert_eq!(std::fs::read_to_string("copied.txt")?, "zsh\nzip\n");

        system.invoke(&Invocation::shell("cat > text.txt").stdin_text("i2c-dev\n"))?;
        assert_eq!(std::fs::read_to_string("text.txt")?, "i2c-dev\n");

        let result = system.invoke(&Invocation::new("cat").stdin_file("missing.txt"));
        assert!(matches!(result, Err(StepError::Io { .. })));

        Ok(())
    }

    #[sealed_test]
    fn host_file_edits() -> anyhow::Result<()> {
        let mut system = HostSystem::new();

        system.append(Path::new(".zshrc"), "export A=1\n")?;
        system.append(Path::new(".zshrc"), "export B=2\n")?;
        assert_eq!(system.read_to_string(Path::new(".zshrc"))?, "export A=1\nexport B=2\n");

        std::fs::create_dir("home")?;
        let target = system.copy_into(Path::new(".zshrc"), Path::new("home"))?;
        assert_eq!(target, PathBuf::from("home/.zshrc"));
        assert_eq!(std::fs::read_to_string(target)?, "export A=1\nexport B=2\n");

        assert!(system.read_to_string(Path::new("missing")).is_err());

        Ok(())
    }

    #[sealed_test(env = [("LOGNAME", "blah")])]
    fn host_login_name_from_env() -> anyhow::Result<()> {
        assert_eq!(HostSystem::new().login_name()?, "blah");
        Ok(())
    }
}
