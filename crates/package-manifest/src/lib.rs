use derive_more::{Display, Error};
use miette::Diagnostic;
use pipe_trait::Pipe;
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// Dependency name to version constraint, ordered by name.
pub type DependencyMap = BTreeMap<String, String>;

/// Suffix appended to the manifest path when the manifest is not overwritten.
pub const SIBLING_SUFFIX: &str = ".new";

#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum PackageManifestError {
    #[display("No package.json was found at {_0}")]
    #[diagnostic(
        code(modup_package_manifest::no_manifest_found),
        help("Run modup from a directory that contains a package.json, or pass --dir.")
    )]
    NoManifestFound(#[error(not(source))] String),

    #[display("Failed to read {path}")]
    #[diagnostic(code(modup_package_manifest::read_error))]
    Read {
        path: String,
        #[error(source)]
        error: std::io::Error,
    },

    #[display("Failed to parse {path} as JSON")]
    #[diagnostic(code(modup_package_manifest::parse_error))]
    Parse {
        path: String,
        #[error(source)]
        error: serde_json::Error,
    },

    #[display("{path} should contain a JSON object")]
    #[diagnostic(code(modup_package_manifest::not_an_object))]
    NotAnObject {
        #[error(not(source))]
        path: String,
    },

    #[display("{group:?} in {path} should map dependency names to version strings")]
    #[diagnostic(code(modup_package_manifest::invalid_dependency_group))]
    InvalidDependencyGroup { path: String, group: &'static str },
}

#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum WriteManifestError {
    #[display("Failed to serialize the updated manifest")]
    #[diagnostic(code(modup_package_manifest::serialization_error))]
    Serialization(#[error(source)] serde_json::Error),

    #[display("Problem writing the updated manifest to {path}")]
    #[diagnostic(code(modup_package_manifest::write_error))]
    Write {
        path: String,
        #[error(source)]
        error: std::io::Error,
    },
}

/// The two dependency groups whose versions get upgraded.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, IntoStaticStr)]
pub enum DependencyGroup {
    #[display("dependencies")]
    #[strum(serialize = "dependencies")]
    Prod,
    #[display("devDependencies")]
    #[strum(serialize = "devDependencies")]
    Dev,
}

impl DependencyGroup {
    /// Key of the group inside `package.json`.
    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// Where the updated manifest is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestDestination {
    /// Replace the original `package.json`.
    Overwrite,
    /// Write next to it as `package.json.new`, leaving the original untouched.
    Sibling,
}

impl ManifestDestination {
    pub fn from_overwrite(overwrite: bool) -> Self {
        if overwrite {
            ManifestDestination::Overwrite
        } else {
            ManifestDestination::Sibling
        }
    }

    pub fn target_path(self, manifest_path: &Path) -> PathBuf {
        match self {
            ManifestDestination::Overwrite => manifest_path.to_path_buf(),
            ManifestDestination::Sibling => {
                let mut path = manifest_path.as_os_str().to_os_string();
                path.push(SIBLING_SUFFIX);
                PathBuf::from(path)
            }
        }
    }
}

/// Content of the `package.json` file and its path.
///
/// Top-level key order is kept as it was read.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    value: Map<String, Value>,
}

impl PackageManifest {
    pub fn from_path(path: PathBuf) -> Result<PackageManifest, PackageManifestError> {
        if !path.exists() {
            return Err(PackageManifestError::NoManifestFound(path.display().to_string()));
        }

        let contents = fs::read_to_string(&path).map_err(|error| PackageManifestError::Read {
            path: path.display().to_string(),
            error,
        })?;

        let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);
        let value = serde_json::from_str::<Value>(contents).map_err(|error| {
            PackageManifestError::Parse { path: path.display().to_string(), error }
        })?;

        PackageManifest::from_value(path, value)
    }

    /// Validate an already parsed manifest.
    pub fn from_value(path: PathBuf, value: Value) -> Result<PackageManifest, PackageManifestError> {
        let Value::Object(value) = value else {
            return Err(PackageManifestError::NotAnObject { path: path.display().to_string() });
        };

        for group in DependencyGroup::iter() {
            let Some(field) = value.get(group.key()) else { continue };
            let is_valid = field
                .as_object()
                .is_some_and(|dependencies| dependencies.values().all(Value::is_string));
            if !is_valid {
                return Err(PackageManifestError::InvalidDependencyGroup {
                    path: path.display().to_string(),
                    group: group.key(),
                });
            }
        }

        Ok(PackageManifest { path, value })
    }

    pub fn path(&self) -> &'_ Path {
        &self.path
    }

    pub fn value(&self) -> &'_ Map<String, Value> {
        &self.value
    }

    /// Whether the manifest declares `group` at all.
    pub fn has_group(&self, group: DependencyGroup) -> bool {
        self.value.contains_key(group.key())
    }

    /// Declared dependencies of `group`. A missing group is empty.
    pub fn dependencies(&self, group: DependencyGroup) -> DependencyMap {
        self.value
            .get(group.key())
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .filter_map(|(name, version)| {
                version.as_str().map(|version| (name.clone(), version.to_string()))
            })
            .collect()
    }

    /// Copy of the manifest with the given groups replaced.
    ///
    /// Replaced groups stay at their original position. Groups the manifest never declared are
    /// not added.
    pub fn with_dependencies<'a, Groups>(&self, groups: Groups) -> Value
    where
        Groups: IntoIterator<Item = (DependencyGroup, &'a DependencyMap)>,
    {
        let mut value = self.value.clone();
        for (group, dependencies) in groups {
            if let Some(field) = value.get_mut(group.key()) {
                *field = dependencies
                    .iter()
                    .map(|(name, version)| (name.clone(), Value::String(version.clone())))
                    .collect::<Map<_, _>>()
                    .pipe(Value::Object);
            }
        }
        Value::Object(value)
    }

    /// Write `value` to the path chosen by `destination` and return that path.
    pub fn write(
        &self,
        value: &Value,
        destination: ManifestDestination,
    ) -> Result<PathBuf, WriteManifestError> {
        let target = destination.target_path(&self.path);
        let contents = to_manifest_string(value).map_err(WriteManifestError::Serialization)?;
        fs::write(&target, contents).map_err(|error| WriteManifestError::Write {
            path: target.display().to_string(),
            error,
        })?;
        Ok(target)
    }
}

/// Serialize a manifest with two-space indentation and a trailing newline.
///
/// The same value always produces the same bytes.
pub fn to_manifest_string(value: &Value) -> Result<String, serde_json::Error> {
    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');
    Ok(contents)
}
