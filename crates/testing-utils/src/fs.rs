use std::{fs, path::Path};

/// Names of the entries directly inside `dir`, sorted.
pub fn get_filenames_in_folder(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .expect("list directory")
        .map(|entry| entry.expect("read directory entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
