//! DiskImageStore - writes each image to `<dir>/<id><type>`.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::store::{new_image_id, MAX_ID_ATTEMPTS};
use super::{ImageRecord, ImageStore};
use crate::error::StoreError;

/// Image folder plus an in-memory index of what this process has written.
pub struct DiskImageStore {
    dir: PathBuf,
    images: RwLock<HashMap<String, ImageRecord>>,
}

impl DiskImageStore {
    /// Create a store writing into `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            images: RwLock::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the bytes of `record` live on disk.
    pub fn path_of(&self, record: &ImageRecord) -> PathBuf {
        self.dir
            .join(format!("{}{}", record.id, sanitize_type(&record.image_type)))
    }
}

/// Keep only characters that are safe in a file extension.
fn sanitize_type(image_type: &str) -> String {
    image_type
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect()
}

impl ImageStore for DiskImageStore {
    fn save(
        &self,
        laptop_id: &str,
        image_type: &str,
        data: Vec<u8>,
    ) -> Result<ImageRecord, StoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let record = ImageRecord {
                id: new_image_id(),
                laptop_id: laptop_id.to_string(),
                image_type: image_type.to_string(),
                size: data.len(),
            };
            let path = self.path_of(&record);

            // create_new refuses to reuse an existing file, so no image is ever overwritten.
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            };
            if let Err(err) = file.write_all(&data).and_then(|_| file.sync_all()) {
                let _ = fs::remove_file(&path);
                return Err(err.into());
            }

            let mut images = self
                .images
                .write()
                .map_err(|_| StoreError::LockPoisoned("save"))?;
            images.insert(record.id.clone(), record.clone());
            return Ok(record);
        }

        Err(StoreError::Io("cannot allocate an unused image id".into()))
    }

    fn find(&self, id: &str) -> Result<Option<ImageRecord>, StoreError> {
        let images = self
            .images
            .read()
            .map_err(|_| StoreError::LockPoisoned("find"))?;
        Ok(images.get(id).cloned())
    }
}
