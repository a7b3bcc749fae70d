use std::path::{Path, PathBuf};

/// Environment variable overriding [`Config::output_root`]
pub const OUTPUT_ROOT_ENV: &str = "WEBTEMPLATE_OUTPUT_ROOT";

/// Environment variable overriding [`Config::upload_root`]
pub const UPLOAD_ROOT_ENV: &str = "WEBTEMPLATE_UPLOAD_ROOT";

/// Where runs and uploaded inputs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Parent directory of every run directory
    pub output_root: PathBuf,

    /// Directory for uploaded source images
    pub upload_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            upload_root: PathBuf::from("uploads"),
        }
    }
}

impl Config {
    /// Create config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, overridden by `WEBTEMPLATE_OUTPUT_ROOT` and `WEBTEMPLATE_UPLOAD_ROOT`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup(OUTPUT_ROOT_ENV).filter(|v| !v.trim().is_empty()) {
            config.output_root = PathBuf::from(root);
        }
        if let Some(root) = lookup(UPLOAD_ROOT_ENV).filter(|v| !v.trim().is_empty()) {
            config.upload_root = PathBuf::from(root);
        }
        config
    }

    /// Builder method: set output root
    pub fn output_root(mut self, root: impl AsRef<Path>) -> Self {
        self.output_root = root.as_ref().to_path_buf();
        self
    }

    /// Builder method: set upload root
    pub fn upload_root(mut self, root: impl AsRef<Path>) -> Self {
        self.upload_root = root.as_ref().to_path_buf();
        self
    }
}
