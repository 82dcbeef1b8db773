use serde::Deserialize;
use std::collections::HashMap;

/// The part of a registry packument that names its tagged releases.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct PackageDistTags {
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
}

impl PackageDistTags {
    pub fn latest(&self) -> Option<&'_ str> {
        self.dist_tags.get("latest").map(String::as_str).map(str::trim).filter(|v| !v.is_empty())
    }
}
