use std::env;
use std::fmt::Display;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirError {
    #[error("Directory not found: {0}")]
    DirNotFound(String),
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type DirResult<T> = Result<T, DirError>;

/// Application name used to namespace directories.
pub static APP_NAME: &str = "commit-lanes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirType {
    Config,
}

impl Display for DirType {
    /// Pretty-print the default directory path hint for this dir type.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirType::Config => write!(f, "~/.config/")?,
        };
        write!(f, "{}", APP_NAME)
    }
}

impl DirType {
    fn xdg_key(&self) -> &'static str {
        match self {
            DirType::Config => "XDG_CONFIG_HOME",
        }
    }

    fn rel_path(&self) -> &'static str {
        match self {
            DirType::Config => ".config",
        }
    }

    /// Resolve the directory path from XDG or fallback environment hints.
    pub fn get_dir(&self) -> DirResult<PathBuf> {
        if let Some(dir) = env::var_os(self.xdg_key()) {
            Ok(PathBuf::from(dir).join(APP_NAME))
        } else if let Some(home_dir) = env::home_dir() {
            Ok(home_dir.join(self.rel_path()).join(APP_NAME))
        } else if let Ok(userprofile) = env::var("USERPROFILE") {
            Ok(PathBuf::from(userprofile)
                .join(self.rel_path())
                .join(APP_NAME))
        } else {
            Err(DirError::DirNotFound(self.to_string()))
        }
    }

    /// Path of `file_name` inside this directory, whether or not it exists yet.
    pub fn file(&self, file_name: &str) -> DirResult<PathBuf> {
        Ok(self.get_dir()?.join(file_name))
    }

    /// Like [`DirType::file`], but `None` when the file is not on disk.
    pub fn existing_file(&self, file_name: &str) -> DirResult<Option<PathBuf>> {
        let path = self.file(file_name)?;
        Ok(path.is_file().then_some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_hints_at_namespaced_dir() {
        assert_eq!(DirType::Config.to_string(), "~/.config/commit-lanes");
    }

    #[test]
    fn file_is_joined_under_app_dir() {
        let path = DirType::Config.file("config.json").unwrap();
        assert!(path.ends_with("commit-lanes/config.json"));
    }
}
