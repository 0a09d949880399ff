use crate::error::{impossible, Result};

/// Per-port storage of upstream tuples, indexed by the producer's slot.
///
/// Producers hand out dense slot handles, so a vector gives O(1) insert,
/// lookup and removal. A handle arriving twice, or a removal of a handle
/// never stored, means the producer broke its protocol.
pub(crate) struct InputStore<E> {
    entries: Vec<Option<E>>,
    len: usize,
}

impl<E> InputStore<E> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn insert(&mut self, slot: usize, entry: E) -> Result<()> {
        if slot >= self.entries.len() {
            self.entries.resize_with(slot + 1, || None);
        }
        let place = &mut self.entries[slot];
        if place.is_some() {
            return Err(impossible(format!("upstream slot {} inserted twice", slot)));
        }
        *place = Some(entry);
        self.len += 1;
        Ok(())
    }

    pub(crate) fn get(&self, slot: usize) -> Result<&E> {
        self.entries
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or_else(|| impossible(format!("upstream slot {} is not stored", slot)))
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Result<&mut E> {
        self.entries
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or_else(|| impossible(format!("upstream slot {} is not stored", slot)))
    }

    pub(crate) fn remove(&mut self, slot: usize) -> Result<E> {
        let entry = self
            .entries
            .get_mut(slot)
            .and_then(Option::take)
            .ok_or_else(|| impossible(format!("upstream slot {} retracted twice", slot)))?;
        self.len -= 1;
        Ok(entry)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &E)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|e| (slot, e)))
    }
}
