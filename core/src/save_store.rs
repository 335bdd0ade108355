use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use warband_shared::fs::{MAX_SAVE_BYTES, read_file_with_limit};
use warband_shared::sanitize_save_name;

use crate::checkpoint::{Persistence, SaveGame};
use crate::error::SaveError;
use crate::preferences::SaveCompression;

pub const SAVE_MAGIC: [u8; 4] = *b"WBSV";
pub const SAVE_VERSION: u32 = 1;
pub const SAVE_EXTENSION: &str = "wbsave";

const FLAG_LZ4: u8 = 0b0000_0001;

fn read_u32_le(cursor: &mut io::Cursor<&[u8]>) -> Option<u32> {
    let mut buf = [0u8; 4];
    cursor.read_exact(&mut buf).ok()?;
    Some(u32::from_le_bytes(buf))
}

fn write_u32_le(dst: &mut Vec<u8>, v: u32) {
    dst.extend_from_slice(&v.to_le_bytes());
}

/// Encode a save into its on-disk representation.
pub fn encode(save: &SaveGame, compression: SaveCompression) -> Result<Vec<u8>, SaveError> {
    let payload = serde_json::to_vec(save).map_err(|e| SaveError::Encode(e.to_string()))?;

    let mut out = Vec::with_capacity(payload.len() + 9);
    out.extend_from_slice(&SAVE_MAGIC);
    write_u32_le(&mut out, SAVE_VERSION);

    match compression {
        SaveCompression::None => {
            out.push(0);
            out.extend_from_slice(&payload);
        }
        SaveCompression::Lz4 => {
            out.push(FLAG_LZ4);
            out.extend_from_slice(&lz4_flex::compress_prepend_size(&payload));
        }
    }
    Ok(out)
}

/// Decode a save produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<SaveGame, SaveError> {
    let mut cursor = io::Cursor::new(bytes);

    let mut magic = [0u8; 4];
    cursor
        .read_exact(&mut magic)
        .map_err(|_| SaveError::BadMagic)?;
    if magic != SAVE_MAGIC {
        return Err(SaveError::BadMagic);
    }

    let version = read_u32_le(&mut cursor)
        .ok_or_else(|| SaveError::Decode("truncated header".to_string()))?;
    if version != SAVE_VERSION {
        return Err(SaveError::UnsupportedVersion(version));
    }

    let mut flags = [0u8; 1];
    cursor
        .read_exact(&mut flags)
        .map_err(|_| SaveError::Decode("truncated header".to_string()))?;

    let body = &bytes[cursor.position() as usize..];
    let payload = if flags[0] & FLAG_LZ4 != 0 {
        lz4_flex::decompress_size_prepended(body).map_err(|e| SaveError::Decode(e.to_string()))?
    } else {
        body.to_vec()
    };

    serde_json::from_slice(&payload).map_err(|e| SaveError::Decode(e.to_string()))
}

/// Directory of `.wbsave` files.
pub struct FileSaveStore {
    dir: PathBuf,
    compression: SaveCompression,
}

impl FileSaveStore {
    pub fn new(dir: PathBuf, compression: SaveCompression) -> Self {
        Self { dir, compression }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a save named `name` is stored at.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{SAVE_EXTENSION}", sanitize_save_name(name)))
    }

    /// Load a save file.
    pub fn load(path: &Path) -> Result<SaveGame, SaveError> {
        let bytes = read_file_with_limit(path, MAX_SAVE_BYTES)?;
        decode(&bytes)
    }

    /// Write `bytes` to `path` through a temporary file and a rename.
    fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = match path.file_name() {
            Some(name) => {
                let mut tmp_name = OsString::from(name);
                tmp_name.push(".tmp");
                path.with_file_name(tmp_name)
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "save path has no file name",
                ));
            }
        };

        {
            let mut f = fs::File::create(&tmp_path)?;
            f.write_all(bytes)?;
            f.sync_all()?;
        }

        #[cfg(windows)]
        {
            if path.exists() {
                // Windows rename fails if destination exists.
                fs::remove_file(path)?;
            }
        }

        fs::rename(&tmp_path, path)
    }
}

impl Persistence for FileSaveStore {
    fn write_automatic_save(&mut self, save: &SaveGame) -> Result<(), SaveError> {
        let bytes = encode(save, self.compression)?;
        if bytes.len() as u64 > MAX_SAVE_BYTES {
            return Err(SaveError::Encode("save exceeds the maximum save size".to_string()));
        }
        let path = self.path_for(&save.name());
        Self::write_atomic(&path, &bytes)?;
        tracing::debug!(target: "savegame", path = %path.display(), bytes = bytes.len(), "Save written");
        Ok(())
    }

    fn delete_saves(&mut self, label: &str) -> Result<(), SaveError> {
        let start = sanitize_save_name(label);
        let replay = sanitize_save_name(&format!("{label} replay"));
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            let is_save = path.extension().is_some_and(|ext| ext == SAVE_EXTENSION);
            let matches = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem == start || stem == replay);
            if is_save && matches {
                tracing::debug!(target: "savegame", path = %path.display(), "Deleting save");
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
