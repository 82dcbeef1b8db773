use serde::{Deserialize, Deserializer};

pub fn default_registry() -> String {
    "https://registry.npmjs.org/".to_string()
}

/// This deserializer adds a trailing "/" if not exist to make our life easier.
pub fn deserialize_registry<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(with_trailing_slash(s))
}

pub fn with_trailing_slash(registry: String) -> String {
    if registry.ends_with('/') {
        return registry;
    }

    format!("{registry}/")
}
