//! InMemoryLaptopStore - BTreeMap-backed catalog, the reference store.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock};

use super::filter;
use super::{LaptopStore, Matches};
use crate::context::CallContext;
use crate::error::StoreError;
use crate::pb::{Filter, Laptop};

/// In-memory catalog behind a single reader/writer lock.
///
/// Clone-friendly via Arc: clones share the same collection.
#[derive(Clone, Default)]
pub struct InMemoryLaptopStore {
    storage: Arc<RwLock<BTreeMap<String, Laptop>>>,
}

impl InMemoryLaptopStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LaptopStore for InMemoryLaptopStore {
    fn save(&self, laptop: &Laptop) -> Result<(), StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("save"))?;

        if storage.contains_key(&laptop.id) {
            return Err(StoreError::AlreadyExists(laptop.id.clone()));
        }

        storage.insert(laptop.id.clone(), laptop.clone());
        Ok(())
    }

    fn find(&self, id: &str) -> Result<Option<Laptop>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("find"))?;
        Ok(storage.get(id).cloned())
    }

    fn search<'a>(
        &'a self,
        ctx: &'a CallContext,
        filter: &'a Filter,
    ) -> Result<Matches<'a>, StoreError> {
        Ok(Box::new(Scan {
            store: self,
            ctx,
            filter,
            cursor: None,
            done: false,
        }))
    }

    fn len(&self) -> Result<usize, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("len"))?;
        Ok(storage.len())
    }
}

/// Key-ordered scan that takes the read lock once per step and resumes after
/// the last key it yielded, so a slow consumer never holds writers off.
struct Scan<'a> {
    store: &'a InMemoryLaptopStore,
    ctx: &'a CallContext,
    filter: &'a Filter,
    cursor: Option<String>,
    done: bool,
}

impl Scan<'_> {
    fn advance(&mut self) -> Result<Option<Laptop>, StoreError> {
        let storage = self
            .store
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("search"))?;

        let lower = match self.cursor.as_deref() {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };

        for (id, laptop) in storage.range::<str, _>((lower, Bound::Unbounded)) {
            self.ctx.check()?;
            if filter::matches(self.filter, laptop) {
                self.cursor = Some(id.clone());
                return Ok(Some(laptop.clone()));
            }
        }

        Ok(None)
    }
}

impl Iterator for Scan<'_> {
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
