// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Terminal theme syncing.
//!
//! Copies terminal colors and font from Alacritty's YAML configuration into
//! the integrated terminal settings of VSCodium. This is unrelated to the step
//! runner, and shares no state with it.
//!
//! # Mapping
//!
//! | Alacritty                    | VSCodium                                                  |
//! |------------------------------|-----------------------------------------------------------|
//! | `colors.primary.<name>`      | `workbench.colorCustomizations["terminal.<name>"]`        |
//! | `colors.normal.<color>`      | `workbench.colorCustomizations["terminal.ansi<Color>"]`   |
//! | `colors.bright.<color>`      | `workbench.colorCustomizations["terminal.ansiBright<Color>"]` |
//! | `font.normal.family`         | `terminal.integrated.fontFamily`                          |
//! | `font.size`                  | `terminal.integrated.fontSize`                            |
//!
//! Values are copied as written, so a font size of `11.5` stays a float and
//! a size of `12` stays an integer.

use serde::{Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Map, Serializer, Value};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

const COLOR_CUSTOMIZATIONS: &str = "workbench.colorCustomizations";
const FONT_FAMILY: &str = "terminal.integrated.fontFamily";
const FONT_SIZE: &str = "terminal.integrated.fontSize";

/// Subset of Alacritty's configuration that gets copied.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlacrittyTheme {
    pub colors: Colors,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Colors {
    pub primary: PrimaryColors,
    pub normal: AnsiColors,
    pub bright: AnsiColors,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrimaryColors {
    pub background: Value,
    pub foreground: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnsiColors {
    pub black: Value,
    pub red: Value,
    pub green: Value,
    pub yellow: Value,
    pub blue: Value,
    pub magenta: Value,
    pub cyan: Value,
    pub white: Value,
}

impl AnsiColors {
    /// Colors paired with their capitalized names.
    fn named(&self) -> [(&'static str, &Value); 8] {
        [
            ("Black", &self.black),
            ("Red", &self.red),
            ("Green", &self.green),
            ("Yellow", &self.yellow),
            ("Blue", &self.blue),
            ("Magenta", &self.magenta),
            ("Cyan", &self.cyan),
            ("White", &self.white),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Font {
    pub normal: FontFace,
    pub size: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FontFace {
    pub family: Value,
}

impl AlacrittyTheme {
    /// Parse theme out of Alacritty's YAML configuration.
    ///
    /// # Errors
    ///
    /// - Return [`ThemeError::Yaml`] if data is not valid YAML, or misses a
    ///   copied key.
    pub fn from_yaml(data: &str) -> Result<Self> {
        serde_yaml::from_str(data).map_err(ThemeError::Yaml)
    }

    /// Copy theme into VSCodium settings.
    ///
    /// Creates color customization table if missing. Leaves every other key
    /// untouched.
    ///
    /// # Errors
    ///
    /// - Return [`ThemeError::NotAnObject`] if color customization key holds
    ///   anything but an object.
    pub fn apply(&self, settings: &mut Map<String, Value>) -> Result<()> {
        let colors = settings
            .entry(COLOR_CUSTOMIZATIONS)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| ThemeError::NotAnObject(COLOR_CUSTOMIZATIONS.into()))?;

        colors.insert(
            "terminal.background".into(),
            self.colors.primary.background.clone(),
        );
        colors.insert(
            "terminal.foreground".into(),
            self.colors.primary.foreground.clone(),
        );

        for (name, value) in self.colors.bright.named() {
            colors.insert(format!("terminal.ansiBright{name}"), value.clone());
        }

        for (name, value) in self.colors.normal.named() {
            colors.insert(format!("terminal.ansi{name}"), value.clone());
        }

        settings.insert(FONT_FAMILY.into(), self.font.normal.family.clone());
        settings.insert(FONT_SIZE.into(), self.font.size.clone());

        Ok(())
    }
}

/// Sync Alacritty theme into VSCodium settings file.
///
/// Rewrites the settings file with keys sorted, and four space indentation.
///
/// # Errors
///
/// - Return [`ThemeError::Read`] if either file cannot be read.
/// - Return [`ThemeError::Yaml`] if Alacritty configuration is invalid.
/// - Return [`ThemeError::Json`] if VSCodium settings are invalid.
/// - Return [`ThemeError::NotAnObject`] if VSCodium settings are not an
///   object.
/// - Return [`ThemeError::Write`] if settings file cannot be written.
#[instrument(skip(alacritty, vscodium), level = "debug")]
pub fn sync_theme(alacritty: impl AsRef<Path>, vscodium: impl AsRef<Path>) -> Result<()> {
    let (alacritty, vscodium) = (alacritty.as_ref(), vscodium.as_ref());

    info!("load alacritty configuration {:?}", alacritty.display());
    let theme = AlacrittyTheme::from_yaml(&read(alacritty)?)?;

    info!("load vscodium settings {:?}", vscodium.display());
    let mut settings = match serde_json::from_str(&read(vscodium)?).map_err(ThemeError::Json)? {
        Value::Object(settings) => settings,
        _ => return Err(ThemeError::NotAnObject(vscodium.display().to_string())),
    };

    theme.apply(&mut settings)?;

    info!("save vscodium settings {:?}", vscodium.display());
    write(vscodium, to_sorted_json(Value::Object(settings))?).map_err(|err| ThemeError::Write {
        source: err,
        path: vscodium.to_path_buf(),
    })
}

/// Render JSON with sorted keys at every level, indented by four spaces.
pub fn to_sorted_json(value: Value) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    sort_keys(value)
        .serialize(&mut serializer)
        .map_err(ThemeError::Json)?;

    Ok(buffer)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries = map.into_iter().collect::<Vec<_>>();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sort_keys).collect()),
        value => value,
    }
}

fn read(path: &Path) -> Result<String> {
    read_to_string(path).map_err(|err| ThemeError::Read {
        source: err,
        path: path.to_path_buf(),
    })
}

/// Theme syncing error types.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// Configuration file cannot be read.
    #[error("failed to read {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Settings file cannot be written.
    #[error("failed to write {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Alacritty configuration cannot be parsed.
    #[error("error during alacritty config parsing")]
    Yaml(#[source] serde_yaml::Error),

    /// VSCodium settings cannot be parsed or rendered.
    #[error("error during vscodium config parsing")]
    Json(#[source] serde_json::Error),

    /// Value expected to be a JSON object is something else.
    #[error("expected {0:?} to be a JSON object")]
    NotAnObject(String),
}

/// Friendly result alias :3
type Result<T, E = ThemeError> = std::result::Result<T, E>;
