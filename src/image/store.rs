//! ImageStore - write-once storage for uploaded laptop images.

use crate::error::StoreError;

/// Metadata of a stored image. Images are never revised once saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: String,
    pub laptop_id: String,
    pub image_type: String,
    pub size: usize,
}

pub trait ImageStore: Send + Sync {
    /// Persist `data` under a freshly generated id and return its record.
    fn save(
        &self,
        laptop_id: &str,
        image_type: &str,
        data: Vec<u8>,
    ) -> Result<ImageRecord, StoreError>;

    /// Get the record of a stored image. Returns None if not found.
    fn find(&self, id: &str) -> Result<Option<ImageRecord>, StoreError>;
}

/// Attempts at drawing an unused id before giving up.
pub(crate) const MAX_ID_ATTEMPTS: usize = 8;

pub(crate) fn new_image_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
