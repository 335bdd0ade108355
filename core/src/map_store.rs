//! Map files on disk

use std::io;
use std::path::{Component, Path, PathBuf};

use warband_shared::fs::{MAX_MAP_BYTES, read_file_with_limit};

use crate::error::MapLoadError;
use crate::resolver::MapStore;

/// Map store rooted at a directory.
///
/// References are relative paths below the root. Absolute paths and `..`
/// components are rejected.
#[derive(Debug, Clone)]
pub struct DirectoryMapStore {
    root: PathBuf,
}

impl DirectoryMapStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, reference: &str) -> Result<PathBuf, MapLoadError> {
        let relative = Path::new(reference);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if reference.is_empty() || escapes {
            return Err(MapLoadError::InvalidReference(reference.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl MapStore for DirectoryMapStore {
    fn read_map(&self, reference: &str) -> Result<String, MapLoadError> {
        let path = self.path_for(reference)?;
        let bytes = read_file_with_limit(&path, MAX_MAP_BYTES).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                MapLoadError::NotFound(reference.to_string())
            } else {
                MapLoadError::Io {
                    reference: reference.to_string(),
                    source,
                }
            }
        })?;
        String::from_utf8(bytes).map_err(|_| MapLoadError::InvalidEncoding {
            reference: reference.to_string(),
        })
    }
}
