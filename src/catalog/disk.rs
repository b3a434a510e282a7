//! DiskLaptopStore - one bitcode document per laptop under a directory.

use std::fs::{self, OpenOptions, ReadDir};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::filter;
use super::{LaptopStore, Matches};
use crate::context::CallContext;
use crate::error::StoreError;
use crate::pb::{Filter, Laptop};

const EXTENSION: &str = "laptop";

/// Catalog persisted as `<dir>/<id>.laptop` files.
///
/// Writes hold the lock exclusively, so a reader never sees a half-written
/// document. Ids are validated as UUIDs by the service before they reach
/// the store; anything that is not a plain file name is rejected here.
pub struct DiskLaptopStore {
    dir: RwLock<PathBuf>,
}

impl DiskLaptopStore {
    /// Open (creating if needed) a catalog directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: RwLock::new(dir),
        })
    }

    fn document_path(dir: &Path, id: &str) -> Result<PathBuf, StoreError> {
        let plain = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !plain {
            return Err(StoreError::Io(format!("invalid document id: {:?}", id)));
        }
        Ok(dir.join(format!("{}.{}", id, EXTENSION)))
    }

    fn read_document(path: &Path) -> Result<Laptop, StoreError> {
        let bytes = fs::read(path)?;
        bitcode::deserialize(&bytes).map_err(|e| StoreError::Serde(e.to_string()))
    }
}

impl LaptopStore for DiskLaptopStore {
    fn save(&self, laptop: &Laptop) -> Result<(), StoreError> {
        let bytes = bitcode::serialize(laptop).map_err(|e| StoreError::Serde(e.to_string()))?;
        let dir = self
            .dir
            .write()
            .map_err(|_| StoreError::LockPoisoned("save"))?;
        let path = Self::document_path(&dir, &laptop.id)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(laptop.id.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        if let Err(err) = file.write_all(&bytes).and_then(|_| file.sync_all()) {
            let _ = fs::remove_file(&path);
            return Err(err.into());
        }
        Ok(())
    }

    fn find(&self, id: &str) -> Result<Option<Laptop>, StoreError> {
        let dir = self
            .dir
            .read()
            .map_err(|_| StoreError::LockPoisoned("find"))?;
        let path = match Self::document_path(&dir, id) {
            Ok(path) => path,
            // An id that can never have been stored is simply absent.
            Err(_) => return Ok(None),
        };

        match Self::read_document(&path) {
            Ok(laptop) => Ok(Some(laptop)),
            Err(StoreError::Io(_)) if !path.exists() => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn search<'a>(
        &'a self,
        ctx: &'a CallContext,
        filter: &'a Filter,
    ) -> Result<Matches<'a>, StoreError> {
        let entries = {
            let dir = self
                .dir
                .read()
                .map_err(|_| StoreError::LockPoisoned("search"))?;
            fs::read_dir(&*dir)?
        };

        Ok(Box::new(DiskScan {
            store: self,
            ctx,
            filter,
            entries,
            done: false,
        }))
    }

    fn len(&self) -> Result<usize, StoreError> {
        let dir = self
            .dir
            .read()
            .map_err(|_| StoreError::LockPoisoned("len"))?;
        let mut count = 0;
        for entry in fs::read_dir(&*dir)? {
            if is_document(&entry?.path()) {
                count += 1;
            }
        }
        Ok(count)
    }
}

fn is_document(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(EXTENSION)
}

/// Directory walk that reads one document per step under the read lock.
struct DiskScan<'a> {
    store: &'a DiskLaptopStore,
    ctx: &'a CallContext,
    filter: &'a Filter,
    entries: ReadDir,
    done: bool,
}

impl DiskScan<'_> {
    fn advance(&mut self) -> Result<Option<Laptop>, StoreError> {
        let _dir = self
            .store
            .dir
            .read()
            .map_err(|_| StoreError::LockPoisoned("search"))?;

        for entry in self.entries.by_ref() {
            self.ctx.check()?;
            let path = entry?.path();
            if !is_document(&path) {
                continue;
            }
            let laptop = DiskLaptopStore::read_document(&path)?;
            if filter::matches(self.filter, &laptop) {
                return Ok(Some(laptop));
            }
        }

        Ok(None)
    }
}

impl Iterator for DiskScan<'_> {
    type Item = Result<Laptop, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.advance() {
            Ok(Some(laptop)) => Some(Ok(laptop)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
