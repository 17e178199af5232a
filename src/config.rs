// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of bootstrap's configuration file, and resolve it into
//! the explicit set of paths that provisioning steps operate on. Steps never
//! look at the current working directory on their own; everything they read
//! is decided here once at startup.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

/// Bootstrap settings layout.
///
/// # General Layout
///
/// ```toml
/// data_dir = "$HOME/dotfiles/bootstrap"
/// nerd_font = "meslo"
///
/// [lists]
/// distro = "arch.txt"
/// aur = "aur.txt"
/// flatpak_remotes = "flatpak-repos.txt"
/// flatpak_minimal = "flatpak-minimal.txt"
/// flatpak_full = "flatpak-full.txt"
/// shell_config = "zsh-config.sh"
/// ```
///
/// Every key is optional. File names listed under `[lists]` are relative to
/// `data_dir` unless they are absolute.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding package lists and shell configuration.
    pub data_dir: PathBuf,

    /// Nerd Font to install through oh-my-posh.
    pub nerd_font: String,

    /// Names of the files bootstrap reads from the data directory.
    pub lists: ListFiles,
}

impl Settings {
    /// Load settings from target file.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file is not valid.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        debug!("load settings from {:?}", path.as_ref().display());
        read_to_string(path.as_ref())
            .map_err(|err| ConfigError::Read {
                source: err,
                path: path.as_ref().to_path_buf(),
            })?
            .parse()
    }

    /// Load settings from target file, falling back to defaults if missing.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file exists but cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file is not valid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match read_to_string(path.as_ref()) {
            Ok(data) => data.parse(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    "no settings at {:?}, using defaults",
                    path.as_ref().display()
                );
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Read {
                source: err,
                path: path.as_ref().to_path_buf(),
            }),
        }
    }

    /// Resolve settings into absolute paths for provisioning.
    ///
    /// Relative data directory is anchored at the current working directory.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Resolve`] if data directory cannot be made
    ///   absolute.
    pub fn resolve(&self, home: impl Into<PathBuf>) -> Result<ProvisionPaths> {
        let data_dir = std::path::absolute(&self.data_dir).map_err(|err| ConfigError::Resolve {
            source: err,
            path: self.data_dir.clone(),
        })?;

        Ok(ProvisionPaths {
            distro_list: data_dir.join(&self.lists.distro),
            aur_list: data_dir.join(&self.lists.aur),
            flatpak_remotes: data_dir.join(&self.lists.flatpak_remotes),
            flatpak_minimal: data_dir.join(&self.lists.flatpak_minimal),
            flatpak_full: data_dir.join(&self.lists.flatpak_full),
            shell_config: data_dir.join(&self.lists.shell_config),
            home: home.into(),
            nerd_font: self.nerd_font.clone(),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            nerd_font: "meslo".into(),
            lists: ListFiles::default(),
        }
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on data directory.
        settings.data_dir = expand(&settings.data_dir)?;

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

fn expand(path: &Path) -> Result<PathBuf> {
    Ok(PathBuf::from(
        shellexpand::full(path.to_string_lossy().as_ref())
            .map_err(ConfigError::ShellExpansion)?
            .into_owned(),
    ))
}

/// File names bootstrap reads from its data directory.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListFiles {
    /// Distribution packages, one per line.
    pub distro: PathBuf,

    /// AUR packages, one per line.
    pub aur: PathBuf,

    /// Flatpak remotes as `name url` lines.
    pub flatpak_remotes: PathBuf,

    /// Minimal Flatpak selection as `remote ref` lines.
    pub flatpak_minimal: PathBuf,

    /// Full Flatpak selection as `remote ref` lines.
    pub flatpak_full: PathBuf,

    /// Shell configuration to source from `~/.zshrc`.
    pub shell_config: PathBuf,
}

impl Default for ListFiles {
    fn default() -> Self {
        Self {
            distro: "arch.txt".into(),
            aur: "aur.txt".into(),
            flatpak_remotes: "flatpak-repos.txt".into(),
            flatpak_minimal: "flatpak-minimal.txt".into(),
            flatpak_full: "flatpak-full.txt".into(),
            shell_config: "zsh-config.sh".into(),
        }
    }
}

/// Absolute paths and values that provisioning steps operate on.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ProvisionPaths {
    pub distro_list: PathBuf,
    pub aur_list: PathBuf,
    pub flatpak_remotes: PathBuf,
    pub flatpak_minimal: PathBuf,
    pub flatpak_full: PathBuf,
    pub shell_config: PathBuf,
    pub home: PathBuf,
    pub nerd_font: String,
}

/// Execution-wide setting of a single run.
///
/// Parsed once from the command line, immutable thereafter.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct RunConfiguration {
    /// Describe and prompt for steps, but never invoke their effects.
    pub dry_run: bool,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Configuration file cannot be read.
    #[error("failed to read settings at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Relative path cannot be made absolute.
    #[error("failed to resolve {:?} to an absolute path", path.display())]
    Resolve {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
