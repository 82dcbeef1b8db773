mod jsonc;
mod overrides;
mod resolve;

pub use jsonc::strip_comments;
pub use overrides::{LoadOverridesError, PinnedOverrides, OVERRIDES_FILE_NAMES, SKIP_MARKER};
pub use resolve::{ResolveDependencies, ResolveGroups, Resolution, ResolvedGroups};
