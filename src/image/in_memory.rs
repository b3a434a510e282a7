//! InMemoryImageStore - HashMap-backed image store for tests and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::store::{new_image_id, MAX_ID_ATTEMPTS};
use super::{ImageRecord, ImageStore};
use crate::error::StoreError;

struct StoredImage {
    record: ImageRecord,
    data: Vec<u8>,
}

#[derive(Clone, Default)]
pub struct InMemoryImageStore {
    images: Arc<RwLock<HashMap<String, StoredImage>>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the bytes stored under `id`.
    pub fn data(&self, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let images = self
            .images
            .read()
            .map_err(|_| StoreError::LockPoisoned("data"))?;
        Ok(images.get(id).map(|image| image.data.clone()))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let images = self
            .images
            .read()
            .map_err(|_| StoreError::LockPoisoned("len"))?;
        Ok(images.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl ImageStore for InMemoryImageStore {
    fn save(
        &self,
        laptop_id: &str,
        image_type: &str,
        data: Vec<u8>,
    ) -> Result<ImageRecord, StoreError> {
        let mut images = self
            .images
            .write()
            .map_err(|_| StoreError::LockPoisoned("save"))?;

        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| new_image_id())
            .find(|id| !images.contains_key(id))
            .ok_or_else(|| StoreError::Io("cannot allocate an unused image id".into()))?;

        let record = ImageRecord {
            id: id.clone(),
            laptop_id: laptop_id.to_string(),
            image_type: image_type.to_string(),
            size: data.len(),
        };
        images.insert(
            id,
            StoredImage {
                record: record.clone(),
                data,
            },
        );
        Ok(record)
    }

    fn find(&self, id: &str) -> Result<Option<ImageRecord>, StoreError> {
        let images = self
            .images
            .read()
            .map_err(|_| StoreError::LockPoisoned("find"))?;
        Ok(images.get(id).map(|image| image.record.clone()))
    }
}
