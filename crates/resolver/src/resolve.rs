use crate::{PinnedOverrides, SKIP_MARKER};
use futures_util::future;
use modup_diagnostics::Logger;
use modup_package_manifest::{DependencyGroup, DependencyMap, PackageManifest};
use modup_registry::RegistryClient;
use pipe_trait::Pipe;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of resolving one dependency group.
///
/// All three maps have the same key set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Versions declared by the manifest.
    pub current: DependencyMap,
    /// Registry answers, with the current value standing in for skipped or failed lookups.
    pub latest: DependencyMap,
    /// Versions to write: the override where one is pinned, else `latest`.
    pub resolved: DependencyMap,
}

/// Resolve the versions of a single dependency group.
#[must_use]
pub struct ResolveDependencies<'a, Client> {
    pub client: &'a Client,
    pub logger: Logger,
    pub current: &'a DependencyMap,
    pub overrides: &'a DependencyMap,
}

impl<'a, Client> ResolveDependencies<'a, Client>
where
    Client: RegistryClient,
{
    /// Execute the subroutine.
    pub async fn run(self) -> Resolution {
        let ResolveDependencies { client, logger, current, overrides } = self;

        let (skipped, pinned): (BTreeSet<&str>, BTreeMap<&str, &str>) = {
            let mut skipped = BTreeSet::new();
            let mut pinned = BTreeMap::new();
            for (name, version) in overrides {
                if version == SKIP_MARKER {
                    skipped.insert(name.as_str());
                } else {
                    pinned.insert(name.as_str(), version.as_str());
                }
            }
            (skipped, pinned)
        };
        let skipped = &skipped;

        let latest: DependencyMap = current
            .iter()
            .map(|(name, current_version)| async move {
                if skipped.contains(name.as_str()) {
                    logger.debug(format_args!(
                        "Keeping {name} at {current_version} as requested by the overrides"
                    ));
                    return (name.clone(), current_version.clone());
                }
                match client.lookup_latest_version(name).await {
                    Ok(version) => {
                        logger.debug(format_args!(
                            "Setting package to latest stable version: {{ {name}: \"{version}\" }}"
                        ));
                        (name.clone(), version)
                    }
                    Err(error) => {
                        logger.debug(format_args!("Unable to find version for package: {name}"));
                        logger.debug(format_args!("{error}"));
                        logger.debug(format_args!(
                            "Setting to existing version: {{ {name}: \"{current_version}\" }}"
                        ));
                        (name.clone(), current_version.clone())
                    }
                }
            })
            .pipe(future::join_all)
            .await
            .into_iter()
            .collect();

        let resolved = latest
            .iter()
            .map(|(name, version)| {
                let version = pinned.get(name.as_str()).copied().unwrap_or(version);
                (name.clone(), version.to_string())
            })
            .collect();

        Resolution { current: current.clone(), latest, resolved }
    }
}

/// Resolutions of both dependency groups of a manifest.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedGroups {
    pub prod: Resolution,
    pub dev: Resolution,
}

impl ResolvedGroups {
    pub fn get(&self, group: DependencyGroup) -> &'_ Resolution {
        match group {
            DependencyGroup::Prod => &self.prod,
            DependencyGroup::Dev => &self.dev,
        }
    }

    /// Pairs of group and resolved versions, in manifest-writing form.
    pub fn resolved(&self) -> [(DependencyGroup, &'_ DependencyMap); 2] {
        [(DependencyGroup::Prod, &self.prod.resolved), (DependencyGroup::Dev, &self.dev.resolved)]
    }
}

/// Resolve both dependency groups of a manifest without either waiting on the other.
#[must_use]
pub struct ResolveGroups<'a, Client> {
    pub client: &'a Client,
    pub logger: Logger,
    pub manifest: &'a PackageManifest,
    pub overrides: &'a PinnedOverrides,
}

impl<'a, Client> ResolveGroups<'a, Client>
where
    Client: RegistryClient,
{
    /// Execute the subroutine.
    pub async fn run(self) -> ResolvedGroups {
        let ResolveGroups { client, logger, manifest, overrides } = self;
        let prod_current = manifest.dependencies(DependencyGroup::Prod);
        let dev_current = manifest.dependencies(DependencyGroup::Dev);

        let prod = ResolveDependencies {
            client,
            logger,
            current: &prod_current,
            overrides: overrides.group(DependencyGroup::Prod),
        };
        let dev = ResolveDependencies {
            client,
            logger,
            current: &dev_current,
            overrides: overrides.group(DependencyGroup::Dev),
        };

        let (prod, dev) = future::join(prod.run(), dev.run()).await;
        ResolvedGroups { prod, dev }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modup_registry::LookupError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::{collections::HashMap, path::PathBuf, sync::Mutex};

    /// Registry stand-in that answers from a table and records every query.
    #[derive(Default)]
    struct RecordingRegistry {
        versions: HashMap<&'static str, &'static str>,
        queries: Mutex<Vec<String>>,
    }

    impl RecordingRegistry {
        fn new(versions: &[(&'static str, &'static str)]) -> Self {
            RecordingRegistry { versions: versions.iter().copied().collect(), ..Default::default() }
        }

        fn queries(&self) -> Vec<String> {
            let mut queries = self.queries.lock().unwrap().clone();
            queries.sort();
            queries
        }
    }

    impl RegistryClient for RecordingRegistry {
        async fn lookup_latest_version(&self, name: &str) -> Result<String, LookupError> {
            self.queries.lock().unwrap().push(name.to_string());
            self.versions
                .get(name)
                .map(|version| version.to_string())
                .ok_or_else(|| LookupError::EmptyOutput { name: name.to_string() })
        }
    }

    fn map(entries: &[(&str, &str)]) -> DependencyMap {
        entries.iter().map(|(name, version)| (name.to_string(), version.to_string())).collect()
    }

    async fn resolve(
        registry: &RecordingRegistry,
        current: &DependencyMap,
        overrides: &DependencyMap,
    ) -> Resolution {
        ResolveDependencies { client: registry, logger: Logger::default(), current, overrides }
            .run()
            .await
    }

    #[tokio::test]
    async fn lookups_without_overrides() {
        let registry = RecordingRegistry::new(&[("a", "2.0.0"), ("b", "3.1.0")]);
        let current = map(&[("a", "^1.0.0"), ("b", "3.1.0")]);
        let resolution = resolve(&registry, &current, &DependencyMap::new()).await;
        assert_eq!(resolution.latest, map(&[("a", "2.0.0"), ("b", "3.1.0")]));
        assert_eq!(resolution.resolved, resolution.latest);
        assert_eq!(resolution.current, current);
        assert_eq!(registry.queries(), ["a", "b"]);
    }

    #[tokio::test]
    async fn pinned_override_wins_and_skip_marker_keeps_current() {
        let registry = RecordingRegistry::new(&[("react", "18.3.1"), ("lodash", "4.17.21")]);
        let current = map(&[("react", "^16.0.0"), ("lodash", "^4.0.0")]);
        let overrides = map(&[("react", "17.0.2"), ("lodash", "*")]);
        let resolution = resolve(&registry, &current, &overrides).await;
        assert_eq!(resolution.latest, map(&[("react", "18.3.1"), ("lodash", "^4.0.0")]));
        assert_eq!(resolution.resolved, map(&[("react", "17.0.2"), ("lodash", "^4.0.0")]));
        assert_eq!(registry.queries(), ["react"]);
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_to_current() {
        let registry = RecordingRegistry::new(&[("good", "1.2.3")]);
        let current = map(&[("good", "1.0.0"), ("missing", "~0.4.0")]);
        let resolution = resolve(&registry, &current, &DependencyMap::new()).await;
        assert_eq!(resolution.latest, map(&[("good", "1.2.3"), ("missing", "~0.4.0")]));
        assert_eq!(resolution.resolved, resolution.latest);
        assert_eq!(registry.queries(), ["good", "missing"]);
    }

    #[tokio::test]
    async fn pinned_override_wins_when_lookup_fails() {
        let registry = RecordingRegistry::new(&[]);
        let current = map(&[("unpublished", "^1.0.0")]);
        let overrides = map(&[("unpublished", "1.4.2")]);
        let resolution = resolve(&registry, &current, &overrides).await;
        assert_eq!(resolution.resolved, overrides);
        assert_eq!(resolution.latest, current);
        assert_eq!(registry.queries(), ["unpublished"]);
    }

    #[tokio::test]
    async fn override_for_undeclared_dependency_is_ignored() {
        let registry = RecordingRegistry::new(&[("a", "2.0.0")]);
        let current = map(&[("a", "1.0.0")]);
        let overrides = map(&[("ghost", "9.9.9"), ("phantom", "*")]);
        let resolution = resolve(&registry, &current, &overrides).await;
        assert_eq!(resolution.resolved, map(&[("a", "2.0.0")]));
        assert_eq!(registry.queries(), ["a"]);
    }

    #[tokio::test]
    async fn key_sets_always_match_current() {
        let registry = RecordingRegistry::new(&[("a", "2.0.0"), ("c", "0.1.0")]);
        let current = map(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);
        let overrides = map(&[("b", "*"), ("c", "0.0.9"), ("x", "1")]);
        let resolution = resolve(&registry, &current, &overrides).await;
        let keys = |map: &DependencyMap| map.keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys(&resolution.latest), keys(&current));
        assert_eq!(keys(&resolution.resolved), keys(&current));
        assert!(resolution.resolved.values().all(|version| version != SKIP_MARKER));
    }

    #[tokio::test]
    async fn empty_group_issues_no_lookup() {
        let registry = RecordingRegistry::new(&[]);
        let resolution = resolve(&registry, &DependencyMap::new(), &map(&[("a", "1")])).await;
        assert_eq!(resolution, Resolution::default());
        assert!(registry.queries().is_empty());
    }

    #[tokio::test]
    async fn skipped_dependency_keeps_version_while_others_upgrade() {
        let registry = RecordingRegistry::new(&[("a", "9.9.9"), ("b", "2.1.0")]);
        let current = map(&[("a", "1.0.0"), ("b", "2.0.0")]);
        let resolution = resolve(&registry, &current, &map(&[("a", "*")])).await;
        assert_eq!(resolution.resolved, map(&[("a", "1.0.0"), ("b", "2.1.0")]));
        assert_eq!(resolution.latest, resolution.resolved);
        assert_eq!(registry.queries(), ["b"]);
    }

    #[tokio::test]
    async fn single_failed_lookup_keeps_version() {
        let registry = RecordingRegistry::new(&[]);
        let current = map(&[("c", "1.0.0")]);
        let resolution = resolve(&registry, &current, &DependencyMap::new()).await;
        assert_eq!(resolution.resolved, current);
        assert_eq!(resolution.latest, current);
    }

    #[tokio::test]
    async fn resolve_groups_handles_both_groups() {
        let manifest = PackageManifest::from_value(
            PathBuf::from("package.json"),
            json!({
                "name": "demo",
                "dependencies": { "express": "^4.0.0" },
                "devDependencies": { "jest": "^27.0.0", "eslint": "^7.0.0" },
            }),
        )
        .unwrap();
        let overrides = PinnedOverrides {
            dependencies: DependencyMap::new(),
            dev_dependencies: map(&[("eslint", "*")]),
        };
        let registry = RecordingRegistry::new(&[("express", "4.21.2"), ("jest", "29.7.0")]);
        let groups = ResolveGroups {
            client: &registry,
            logger: Logger::default(),
            manifest: &manifest,
            overrides: &overrides,
        }
        .run()
        .await;
        assert_eq!(groups.get(DependencyGroup::Prod).resolved, map(&[("express", "4.21.2")]));
        assert_eq!(
            groups.get(DependencyGroup::Dev).resolved,
            map(&[("eslint", "^7.0.0"), ("jest", "29.7.0")]),
        );
        assert_eq!(registry.queries(), ["express", "jest"]);
    }
}
