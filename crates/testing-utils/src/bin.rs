use assert_cmd::prelude::*;
use command_extra::CommandExtra;
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};
use tempfile::{tempdir, TempDir};

/// A `modup` command running inside a fresh temporary workspace.
#[derive(Debug)]
pub struct CommandTempCwd {
    pub modup: Command,
    pub root: TempDir,
    pub workspace: PathBuf,
}

impl CommandTempCwd {
    /// Create a temporary directory, a `workspace` subdirectory, and a command to run `modup`
    /// inside it.
    pub fn init() -> Self {
        let root = tempdir().expect("create temporary directory");
        let workspace = root.path().join("workspace");
        fs::create_dir(&workspace).expect("create temporary workspace for modup");
        let mut modup = Command::cargo_bin("modup")
            .expect("find the modup binary")
            .with_current_dir(&workspace);
        modup.env_remove("TRACE");
        CommandTempCwd { modup, root, workspace }
    }

    /// Write `package.json` into the workspace.
    pub fn with_manifest(self, contents: &str) -> Self {
        write_file(&self.workspace, "package.json", contents);
        self
    }

    /// Write `fixedModules.json` into the workspace.
    pub fn with_fixed_modules(self, contents: &str) -> Self {
        write_file(&self.workspace, "fixedModules.json", contents);
        self
    }
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap_or_else(|_| panic!("write to {name}"));
}
