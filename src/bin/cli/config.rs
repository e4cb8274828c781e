//! Saved dataset profiles for the CLI.
//!
//! ```toml
//! default_profile = "prod"
//!
//! [profiles.prod]
//! dir = "/data/taste"
//! delimiter = "\t"
//! has_headers = false
//! partitions = 8
//! preference_columns = ["user_id", "artist_id"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Where one dataset's three relations live and how to read them. Every field
/// is optional; command-line flags fill or override them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(skip)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dislikes: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friends: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_headers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preference_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    friend_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<usize>,
}

impl Profile {
    /// Field delimiter as a byte. Validated on load.
    pub fn delimiter(&self) -> Option<u8> {
        self.delimiter.as_deref().and_then(parse_delimiter)
    }

    /// Header names of the `likes` and `dislikes` columns.
    pub fn preference_columns(&self) -> Option<(&str, &str)> {
        as_pair(&self.preference_columns)
    }

    /// Header names of the `friends` columns.
    pub fn friend_columns(&self) -> Option<(&str, &str)> {
        as_pair(&self.friend_columns)
    }

    fn apply(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            dir,
            likes,
            dislikes,
            friends,
            has_headers,
            delimiter,
            partitions,
        } = update;
        self.dir = dir.or(self.dir.take());
        self.likes = likes.or(self.likes.take());
        self.dislikes = dislikes.or(self.dislikes.take());
        self.friends = friends.or(self.friends.take());
        self.has_headers = has_headers.or(self.has_headers);
        self.delimiter = delimiter.map(|c| c.to_string()).or(self.delimiter.take());
        self.partitions = partitions.or(self.partitions);
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(value) = self.delimiter.as_deref() {
            if parse_delimiter(value).is_none() {
                return Err(ConfigError::InvalidDelimiter {
                    profile: self.name.clone(),
                    value: value.to_string(),
                });
            }
        }
        for (key, columns) in [
            ("preference_columns", &self.preference_columns),
            ("friend_columns", &self.friend_columns),
        ] {
            if let Some(columns) = columns {
                if columns.len() != 2 {
                    return Err(ConfigError::InvalidColumns {
                        profile: self.name.clone(),
                        key,
                        count: columns.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn as_pair(columns: &Option<Vec<String>>) -> Option<(&str, &str)> {
    match columns.as_deref() {
        Some([left, right]) => Some((left.as_str(), right.as_str())),
        _ => None,
    }
}

/// Values to merge into a saved profile; `None` keeps what is stored.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub dir: Option<PathBuf>,
    pub likes: Option<PathBuf>,
    pub dislikes: Option<PathBuf>,
    pub friends: Option<PathBuf>,
    pub has_headers: Option<bool>,
    pub delimiter: Option<char>,
    pub partitions: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_profile: Option<String>,
    #[serde(default)]
    profiles: BTreeMap<String, Profile>,
}

/// The CLI config file, loaded once per invocation.
#[derive(Debug, Default)]
pub struct CliConfig {
    path: Option<PathBuf>,
    file: ConfigFile,
}

impl CliConfig {
    /// Reads `explicit`, or the per-user default location. A missing file is
    /// an empty config.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(default_config_path);
        let mut file = match path.as_deref() {
            Some(path) if path.exists() => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    action: "read",
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str::<ConfigFile>(&text).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            _ => ConfigFile::default(),
        };
        for (name, profile) in file.profiles.iter_mut() {
            profile.name.clone_from(name);
            profile.validate()?;
        }
        if let Some(name) = file.default_profile.as_deref() {
            if !file.profiles.contains_key(name) {
                return Err(ConfigError::UnknownProfile(name.to_string()));
            }
        }
        Ok(Self { path, file })
    }

    pub fn default_profile_name(&self) -> Option<&str> {
        self.file.default_profile.as_deref()
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.file
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    /// Profiles in name order.
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.file.profiles.values()
    }

    /// The profile named on the command line, else the saved default.
    pub fn select(&self, requested: Option<&str>) -> Result<Option<&Profile>, ConfigError> {
        match requested.or(self.default_profile_name()) {
            Some(name) => self.profile(name).map(Some),
            None => Ok(None),
        }
    }

    pub fn save_profile(&mut self, name: &str, update: ProfileUpdate) -> Result<(), ConfigError> {
        let mut profile = self.file.profiles.get(name).cloned().unwrap_or_default();
        profile.name = name.to_string();
        profile.apply(update);
        profile.validate()?;
        self.file.profiles.insert(name.to_string(), profile);
        Ok(())
    }

    /// Removes a profile, clearing the default if it pointed there.
    pub fn remove_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        self.file
            .profiles
            .remove(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;
        if self.default_profile_name() == Some(name) {
            self.file.default_profile = None;
        }
        Ok(())
    }

    pub fn set_default(&mut self, name: Option<&str>) -> Result<(), ConfigError> {
        if let Some(name) = name {
            self.profile(name)?;
        }
        self.file.default_profile = name.map(str::to_string);
        Ok(())
    }

    /// Writes the config back, creating the directory if needed.
    pub fn write(&self) -> Result<PathBuf, ConfigError> {
        let path = self
            .path
            .clone()
            .or_else(default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                action: "create",
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let text = toml::to_string_pretty(&self.file)?;
        fs::write(&path, text).map_err(|source| ConfigError::Io {
            action: "write",
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// A single ASCII character, or `\t` / `tab` for a tab.
pub fn parse_delimiter(value: &str) -> Option<u8> {
    match value {
        "\\t" | "tab" => Some(b'\t'),
        _ if value.len() == 1 && value.is_ascii() => value.bytes().next(),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("profile '{0}' not found")]
    UnknownProfile(String),
    #[error("profile '{profile}': delimiter '{value}' must be a single ASCII character")]
    InvalidDelimiter { profile: String, value: String },
    #[error("profile '{profile}': {key} needs exactly two column names, got {count}")]
    InvalidColumns {
        profile: String,
        key: &'static str,
        count: usize,
    },
    #[error("no config directory available; pass --config or set TASTEGRAPH_CONFIG")]
    NoConfigPath,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tastegraph").join("cli.toml"))
}
