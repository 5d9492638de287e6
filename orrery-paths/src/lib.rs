//! XDG Base Directory paths for orrery.
//!
//! Config lives under XDG paths on every platform, the way gh and kubectl
//! do it, rather than under platform-native locations.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "orrery";

/// File name of both the user and the project config.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name holding a project's config, relative to the project root.
pub const PROJECT_DIR_NAME: &str = ".orrery";

/// Get the orrery config directory.
///
/// Returns `$XDG_CONFIG_HOME/orrery` if set, otherwise `~/.config/orrery`.
///
/// # Examples
///
/// ```
/// use orrery_paths::config_dir;
///
/// let config = config_dir();
/// assert!(config.ends_with("orrery"));
/// ```
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Path of the user-level config file.
pub fn user_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Path of the project-level config file under `root`.
pub fn project_config_file(root: &Path) -> PathBuf {
    root.join(PROJECT_DIR_NAME).join(CONFIG_FILE_NAME)
}

fn xdg_dir(var: &str, home_relative: &str) -> PathBuf {
    match std::env::var_os(var) {
        Some(base) if !base.is_empty() => PathBuf::from(base).join(APP_DIR),
        _ => dirs::home_dir()
            .unwrap_or_default()
            .join(home_relative)
            .join(APP_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn config_dir_respects_xdg_env() {
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "/tmp/test-config");
        }
        assert_eq!(config_dir(), PathBuf::from("/tmp/test-config/orrery"));
        assert_eq!(
            user_config_file(),
            PathBuf::from("/tmp/test-config/orrery/config.toml")
        );
        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    #[serial]
    fn empty_xdg_var_falls_back_to_home() {
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "");
        }
        let path = config_dir();
        assert!(path.ends_with(".config/orrery"), "{path:?}");
        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    fn project_config_lives_under_dot_dir() {
        assert_eq!(
            project_config_file(Path::new("/work/app")),
            PathBuf::from("/work/app/.orrery/config.toml")
        );
    }
}
