use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Paths {
    /// Directory that material and texture paths stored in models are relative to.
    pub data_root: Option<PathBuf>,
    pub last_import_dir: Option<PathBuf>,
    pub last_export_dir: Option<PathBuf>,
}

impl Paths {
    pub fn remember_import(&mut self, file: impl AsRef<Path>) {
        self.last_import_dir = parent_dir(file.as_ref());
    }

    pub fn remember_export(&mut self, file: impl AsRef<Path>) {
        self.last_export_dir = parent_dir(file.as_ref());
    }

    /// The directory of the last import, if it still exists.
    pub fn last_import_dir(&self) -> Option<&Path> {
        existing_dir(&self.last_import_dir)
    }

    /// The directory of the last export, if it still exists.
    pub fn last_export_dir(&self) -> Option<&Path> {
        existing_dir(&self.last_export_dir)
    }
}

fn parent_dir(file: &Path) -> Option<PathBuf> {
    let file = PathBuf::from(file.to_string_lossy().replace('\\', "/"));

    file.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

fn existing_dir(dir: &Option<PathBuf>) -> Option<&Path> {
    dir.as_deref().filter(|dir| dir.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_parent_with_forward_slashes() {
        let mut paths = Paths::default();
        paths.remember_export("C:\\ToEE\\data\\art\\clip.dag");

        assert_eq!(
            paths.last_export_dir,
            Some(PathBuf::from("C:/ToEE/data/art"))
        );
    }

    #[test]
    fn bare_file_name_has_no_directory() {
        let mut paths = Paths::default();
        paths.remember_import("door.skm");

        assert_eq!(paths.last_import_dir, None);
    }

    #[test]
    fn vanished_directory_is_forgotten() {
        let paths = Paths {
            last_import_dir: Some(PathBuf::from("/definitely/not/here")),
            ..Default::default()
        };

        assert_eq!(paths.last_import_dir(), None);
    }
}
