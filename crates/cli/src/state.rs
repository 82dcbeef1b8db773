use crate::{CliArgs, LookupKind};
use derive_more::{Display, Error};
use miette::Diagnostic;
use modup_diagnostics::Logger;
use modup_executor::Program;
use modup_network::ThrottledClient;
use modup_npmrc::{with_trailing_slash, Npmrc};
use modup_package_manifest::{PackageManifest, PackageManifestError};
use modup_registry::{HttpRegistryClient, NpmViewClient, Registry};
use modup_resolver::{LoadOverridesError, PinnedOverrides};
use pipe_trait::Pipe;
use std::path::{Path, PathBuf};

/// Application state of a run.
pub struct State {
    /// Project directory, where the report is saved.
    pub dir: PathBuf,
    /// Data from the `package.json` file.
    pub manifest: PackageManifest,
    /// Pinned versions from `fixedModules.json`.
    pub overrides: PinnedOverrides,
    /// Where latest versions come from.
    pub registry: Registry,
    /// The npm executable, run from the project directory.
    pub npm: Program,
}

/// Error type of [`State::init`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum InitStateError {
    #[diagnostic(transparent)]
    LoadManifest(#[error(source)] PackageManifestError),

    #[diagnostic(transparent)]
    LoadOverrides(#[error(source)] LoadOverridesError),
}

impl State {
    /// Initialize the application state.
    pub fn init(args: &CliArgs, logger: Logger) -> Result<Self, InitStateError> {
        let CliArgs { dir, overrides, lookup, registry, npm, .. } = args;
        let npm = Program::new(npm.as_str(), dir.as_path());

        let registry = match lookup {
            LookupKind::Npm => npm.clone().pipe(NpmViewClient::new).pipe(Registry::NpmView),
            LookupKind::Http => {
                let registry = match registry {
                    Some(registry) => with_trailing_slash(registry.clone()),
                    None => Npmrc::current(dir, home::home_dir).registry,
                };
                logger.debug(format_args!("Looking up versions from {registry}"));
                HttpRegistryClient::new(ThrottledClient::new_from_cpu_count(), registry)
                    .pipe(Registry::Http)
            }
        };

        Ok(State {
            manifest: dir
                .join("package.json")
                .pipe(PackageManifest::from_path)
                .map_err(InitStateError::LoadManifest)?,
            overrides: load_overrides(dir, overrides.as_deref(), logger)
                .map_err(InitStateError::LoadOverrides)?,
            registry,
            npm,
            dir: dir.clone(),
        })
    }
}

/// Load the overrides from `explicit`, or else from the first overrides file in `dir`.
///
/// Only a missing file in `dir` is tolerated.
fn load_overrides(
    dir: &Path,
    explicit: Option<&Path>,
    logger: Logger,
) -> Result<PinnedOverrides, LoadOverridesError> {
    if let Some(path) = explicit {
        return PinnedOverrides::from_path(path);
    }
    match PinnedOverrides::from_dir(dir) {
        Ok((path, overrides)) => {
            logger.debug(format_args!("Using pinned versions from {}", path.display()));
            Ok(overrides)
        }
        Err(LoadOverridesError::NotFound(_)) => {
            logger.debug("Couldn't find a fixedModules file - assuming latest modules desired.");
            Ok(PinnedOverrides::default())
        }
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_overrides_file_is_empty() {
        let dir = tempdir().unwrap();
        let overrides = load_overrides(dir.path(), None, Logger::default()).unwrap();
        assert_eq!(overrides, PinnedOverrides::default());
    }

    #[test]
    fn missing_explicit_overrides_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pins.json");
        let error = load_overrides(dir.path(), Some(&path), Logger::default()).unwrap_err();
        assert!(matches!(error, LoadOverridesError::NotFound(_)), "unexpected error: {error:?}");
    }

    #[test]
    fn malformed_overrides_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("fixedModules.json"), "{ \"dependencies\": ").unwrap();
        let error = load_overrides(dir.path(), None, Logger::default()).unwrap_err();
        assert!(matches!(error, LoadOverridesError::Parse { .. }), "unexpected error: {error:?}");
    }

    #[test]
    fn explicit_overrides_file_is_used() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pins.jsonc");
        fs::write(&path, "// pins\n{ \"dependencies\": { \"react\": \"17.0.2\" } }").unwrap();
        let overrides = load_overrides(dir.path(), Some(&path), Logger::default()).unwrap();
        assert_eq!(overrides.dependencies.get("react").map(String::as_str), Some("17.0.2"));
    }
}
