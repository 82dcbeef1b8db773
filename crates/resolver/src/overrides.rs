use crate::strip_comments;
use derive_more::{Display, Error};
use miette::Diagnostic;
use modup_package_manifest::{DependencyGroup, DependencyMap};
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Override value that means "keep whatever the manifest currently declares".
pub const SKIP_MARKER: &str = "*";

/// File names searched for pinned overrides, in order.
pub const OVERRIDES_FILE_NAMES: [&str; 2] = ["fixedModules.json", "fixedModules.jsonc"];

/// Error when loading a pinned-overrides file.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum LoadOverridesError {
    #[display("No overrides file at {}", _0.display())]
    #[diagnostic(code(modup_resolver::overrides_not_found))]
    NotFound(#[error(not(source))] PathBuf),

    #[display("Failed to read {}", path.display())]
    #[diagnostic(code(modup_resolver::read_overrides))]
    Read {
        path: PathBuf,
        #[error(source)]
        error: io::Error,
    },

    #[display("Failed to parse {}", path.display())]
    #[diagnostic(code(modup_resolver::parse_overrides))]
    Parse {
        path: PathBuf,
        #[error(source)]
        error: serde_json::Error,
    },
}

/// Versions the user wants to keep regardless of what the registry reports.
///
/// Keys other than the two dependency groups are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct PinnedOverrides {
    #[serde(default)]
    pub dependencies: DependencyMap,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: DependencyMap,
}

impl PinnedOverrides {
    pub fn group(&self, group: DependencyGroup) -> &'_ DependencyMap {
        match group {
            DependencyGroup::Prod => &self.dependencies,
            DependencyGroup::Dev => &self.dev_dependencies,
        }
    }

    /// Parse overrides from JSON text that may contain comments and trailing commas.
    ///
    /// A leading byte order mark is ignored.
    pub fn from_jsonc_str(text: &str) -> Result<Self, serde_json::Error> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        serde_json::from_str(&strip_comments(text))
    }

    /// Load overrides from an explicit file.
    pub fn from_path(path: &Path) -> Result<Self, LoadOverridesError> {
        let text = fs::read_to_string(path).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => LoadOverridesError::NotFound(path.to_path_buf()),
            _ => LoadOverridesError::Read { path: path.to_path_buf(), error },
        })?;
        PinnedOverrides::from_jsonc_str(&text)
            .map_err(|error| LoadOverridesError::Parse { path: path.to_path_buf(), error })
    }

    /// Load the first overrides file found in `dir`.
    ///
    /// Returns [`LoadOverridesError::NotFound`] pointing at the first candidate when none exists.
    pub fn from_dir(dir: &Path) -> Result<(PathBuf, Self), LoadOverridesError> {
        for file_name in OVERRIDES_FILE_NAMES {
            let path = dir.join(file_name);
            match PinnedOverrides::from_path(&path) {
                Ok(overrides) => return Ok((path, overrides)),
                Err(LoadOverridesError::NotFound(_)) => continue,
                Err(error) => return Err(error),
            }
        }
        Err(LoadOverridesError::NotFound(dir.join(OVERRIDES_FILE_NAMES[0])))
    }
}
