//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the software root.
pub const SW_ROOT_ENV_VAR: &str = "SHUTTLE_SW_ROOT";

/// Get the root directory of the software from the environment.
///
/// Parameter files, paths, and session directories are all resolved relative
/// to this root.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var(SW_ROOT_ENV_VAR)?))
}
