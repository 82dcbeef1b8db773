mod custom_deserializer;

use pipe_trait::Pipe;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::{fs, path::Path};

use crate::custom_deserializer::{default_registry, deserialize_registry};

pub use crate::custom_deserializer::with_trailing_slash;

/// Settings read from `.npmrc` that affect registry lookups.
///
/// Keys modup doesn't know about are ignored.
#[derive(Debug, Deserialize, SmartDefault, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Npmrc {
    /// The base URL of the npm package registry (trailing slash included).
    #[default(default_registry())]
    #[serde(default = "default_registry", deserialize_with = "deserialize_registry")]
    pub registry: String,
}

impl Npmrc {
    /// Parse the content of an `.npmrc` file.
    pub fn from_ini(content: &str) -> Result<Self, serde_ini::de::Error> {
        serde_ini::from_str(content)
    }

    /// Read `.npmrc` from `project_dir`, falling back to the one in the home directory.
    ///
    /// A missing or malformed file yields the defaults.
    pub fn current<HomeDir>(project_dir: &Path, home_dir: HomeDir) -> Self
    where
        HomeDir: FnOnce() -> Option<std::path::PathBuf>,
    {
        let read = |dir: &Path| -> Option<Npmrc> {
            let path = dir.join(".npmrc");
            let content = fs::read_to_string(&path).ok()?;
            match Npmrc::from_ini(&content) {
                Ok(npmrc) => Some(npmrc),
                Err(error) => {
                    tracing::debug!(target: "modup::npmrc", ?path, %error, "Ignoring invalid .npmrc");
                    None
                }
            }
        };

        read(project_dir)
            .or_else(|| home_dir()?.pipe_as_ref(read))
            .unwrap_or_default()
    }
}
