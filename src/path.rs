// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that bootstrap
//! needs to read from or edit during provisioning.

use std::path::PathBuf;

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default absolute path to bootstrap's configuration file.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/bootstrap/config.toml` as
/// the default. Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_config_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("bootstrap").join("config.toml"))
        .ok_or(NoWayHome)
}

/// Determine default absolute path to Alacritty's configuration file.
pub fn default_alacritty_config() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("alacritty").join("alacritty.yml"))
        .ok_or(NoWayHome)
}

/// Determine default absolute path to VSCodium's user settings file.
pub fn default_vscodium_settings() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("VSCodium").join("User").join("settings.json"))
        .ok_or(NoWayHome)
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
