use std::{
    env, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use directories::ProjectDirs;
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use crate::paths::Paths;

mod paths;

/// Overrides [`Paths::data_root`] when set.
pub const DATA_PATH_ENV: &str = "TOEE_DATA_PATH";

const SETTINGS_FILENAME: &str = "settings.toml";

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Options {
    #[serde(default)]
    pub paths: Paths,

    /// Data root taken from the environment. Never written back to disk.
    #[serde(skip)]
    data_root_override: Option<PathBuf>,
}

fn env_override_str<T: FromStr>(value: &mut Option<T>, env_name: &str) {
    if let Some(env_var) = env::var(env_name)
        .ok()
        .filter(|env_var| !env_var.is_empty())
        .and_then(|env_var| T::from_str(&env_var).ok())
    {
        *value = Some(env_var);
    }
}

fn config_path() -> Result<PathBuf, io::Error> {
    Options::path().ok_or(io::Error::other("Couldn't determine config directory"))
}

impl Options {
    pub fn path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("io.github", "toee-modding", "toetools")?;

        Some(dirs.config_dir().join(SETTINGS_FILENAME))
    }

    pub fn load() -> Result<Self, io::Error> {
        let mut options = Self::load_from(config_path()?);
        options.apply_env(DATA_PATH_ENV);

        Ok(options)
    }

    /// Takes the data root from `env_name` for this process only.
    fn apply_env(&mut self, env_name: &str) {
        env_override_str(&mut self.data_root_override, env_name);
    }

    pub fn save(&self) -> Result<(), io::Error> {
        self.save_to(config_path()?)
    }

    /// The data root from the environment if set, otherwise the stored one.
    pub fn data_root(&self) -> Option<&Path> {
        self.data_root_override
            .as_deref()
            .or(self.paths.data_root.as_deref())
    }

    /// Reads settings from `path`. A missing or unparsable file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
                warn!(path = %path.display(), "Ignoring unreadable settings: {err}");
                Self::default()
            }),
            Err(err) => {
                debug!(path = %path.display(), "No settings loaded: {err}");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), io::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let output = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, output)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_data_root() {
        const ENV: &str = "TOETOOLS_TEST_DATA_ROOT";

        let mut options = Options::default();
        options.paths.data_root = Some(PathBuf::from("/stored"));

        env::set_var(ENV, "");
        options.apply_env(ENV);
        assert_eq!(options.data_root(), Some(Path::new("/stored")));

        env::set_var(ENV, "/from/env");
        options.apply_env(ENV);
        env::remove_var(ENV);
        assert_eq!(options.data_root(), Some(Path::new("/from/env")));
        assert_eq!(options.paths.data_root, Some(PathBuf::from("/stored")));
    }

    #[test]
    fn override_is_not_saved() {
        const ENV: &str = "TOETOOLS_TEST_UNSAVED_DATA_ROOT";

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);

        let mut options = Options::default();
        options.paths.data_root = Some(PathBuf::from("/stored"));
        env::set_var(ENV, "/from/env");
        options.apply_env(ENV);
        env::remove_var(ENV);
        assert_eq!(options.data_root(), Some(Path::new("/from/env")));

        options.save_to(&path).unwrap();
        let loaded = Options::load_from(&path);
        assert_eq!(loaded.data_root(), Some(Path::new("/stored")));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(Options::load_from(dir.path().join("nope.toml")), Options::default());
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "paths = 12\n[[[").unwrap();

        assert_eq!(Options::load_from(path), Options::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config").join(SETTINGS_FILENAME);

        let meshes = dir.path().join("meshes");
        fs::create_dir(&meshes).unwrap();

        let mut options = Options::default();
        options.paths.data_root = Some(PathBuf::from("/games/toee/data"));
        options.paths.remember_import(meshes.join("door.skm"));
        options.save_to(&path).unwrap();

        let loaded = Options::load_from(&path);
        assert_eq!(loaded, options);
        assert_eq!(loaded.paths.last_import_dir(), Some(meshes.as_path()));
        assert_eq!(loaded.paths.last_export_dir(), None);
    }
}
