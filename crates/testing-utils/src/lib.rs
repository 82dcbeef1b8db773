pub mod bin;
pub mod fake_npm;
pub mod fs;
