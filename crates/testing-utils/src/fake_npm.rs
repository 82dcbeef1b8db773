//! A shell script standing in for `npm` in tests.
//!
//! It answers `view`, `install` and `audit` the way it was configured to, and appends every
//! invocation's arguments to a log file.

use std::{
    collections::BTreeMap,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Default)]
pub struct FakeNpm {
    versions: BTreeMap<String, String>,
    failing: Vec<String>,
    install_fails: bool,
    audit: Option<(String, i32)>,
    audit_fix: Option<Result<String, String>>,
}

/// Location of a written fake `npm` and of its invocation log.
#[derive(Debug, Clone)]
pub struct FakeNpmBin {
    pub path: PathBuf,
    pub log: PathBuf,
}

impl FakeNpm {
    pub fn new() -> Self {
        FakeNpm::default()
    }

    /// `npm view <name> version` prints `version`.
    pub fn version(mut self, name: &str, version: &str) -> Self {
        self.versions.insert(name.to_string(), version.to_string());
        self
    }

    /// `npm view <name> version` exits with status 1.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    /// `npm install` exits with status 1.
    pub fn install_fails(mut self) -> Self {
        self.install_fails = true;
        self
    }

    /// `npm audit --json` prints `json` and exits with `status`.
    pub fn audit(mut self, json: &str, status: i32) -> Self {
        self.audit = Some((json.to_string(), status));
        self
    }

    /// `npm audit fix` prints `output` and succeeds.
    pub fn audit_fix(mut self, output: &str) -> Self {
        self.audit_fix = Some(Ok(output.to_string()));
        self
    }

    /// `npm audit fix` prints `output` to stderr and fails.
    pub fn audit_fix_fails(mut self, output: &str) -> Self {
        self.audit_fix = Some(Err(output.to_string()));
        self
    }

    /// Write the script as `<dir>/bin/npm`.
    #[cfg(unix)]
    pub fn write(&self, dir: &Path) -> FakeNpmBin {
        use std::os::unix::fs::PermissionsExt;

        let bin_dir = dir.join("bin");
        fs::create_dir_all(&bin_dir).expect("create bin directory for fake npm");
        let path = bin_dir.join("npm");
        let log = bin_dir.join("npm.log");
        fs::write(&path, self.script(&log)).expect("write fake npm");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("make fake npm executable");
        FakeNpmBin { path, log }
    }

    fn script(&self, log: &Path) -> String {
        let mut script = String::from("#!/bin/sh\n");
        writeln!(script, "echo \"$*\" >> {}", quote(&log.to_string_lossy())).unwrap();
        script.push_str("case \"$1\" in\n");

        script.push_str("view)\n  case \"$2\" in\n");
        for (name, version) in &self.versions {
            writeln!(script, "  {}) printf '%s\\n' {} ;;", quote(name), quote(version)).unwrap();
        }
        for name in &self.failing {
            writeln!(script, "  {}) echo 'npm ERR! 404 Not Found' >&2; exit 1 ;;", quote(name))
                .unwrap();
        }
        script.push_str("  *) echo 'npm ERR! 404 Not Found' >&2; exit 1 ;;\n  esac ;;\n");

        let install_status = if self.install_fails { 1 } else { 0 };
        writeln!(script, "install) exit {install_status} ;;").unwrap();

        script.push_str("audit)\n  if [ \"$2\" = fix ]; then\n");
        match &self.audit_fix {
            Some(Ok(output)) => writeln!(script, "    printf '%s\\n' {}; exit 0", quote(output)).unwrap(),
            Some(Err(output)) => {
                writeln!(script, "    printf '%s\\n' {} >&2; exit 1", quote(output)).unwrap()
            }
            None => script.push_str("    exit 0\n"),
        }
        script.push_str("  fi\n");
        match &self.audit {
            Some((json, status)) => {
                writeln!(script, "  printf '%s\\n' {}; exit {status} ;;", quote(json)).unwrap()
            }
            None => script.push_str("  exit 1 ;;\n"),
        }

        script.push_str("*) exit 1 ;;\nesac\n");
        script
    }
}

impl FakeNpmBin {
    /// Path of the script, usable as a program name.
    pub fn program(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Arguments of every invocation so far, one entry per call.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_single_quotes() {
        assert_eq!(quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn script_mentions_configured_versions() {
        let script = FakeNpm::new().version("lodash", "4.17.21").failing("left-pad").script(
            Path::new("/tmp/npm.log"),
        );
        assert!(script.contains(r"'lodash') printf '%s\n' '4.17.21' ;;"));
        assert!(script.contains("'left-pad') echo 'npm ERR! 404 Not Found' >&2; exit 1 ;;"));
    }
}
