//! Working facts owned by a score director.
//!
//! Facts live in a generational slab. A [`FactId`] names one slot at one
//! generation, so a handle to a removed fact never resolves to whatever
//! reuses the slot later. Identity is the slot, not the value: two equal
//! values inserted twice are two facts.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

/// Any type that can be stored as a working fact.
pub trait Fact: Any + Clone + fmt::Debug + Send + Sync {}

impl<T: Any + Clone + fmt::Debug + Send + Sync> Fact for T {}

/// Stable identity of a fact in a [`Facts`] store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactId {
    index: u32,
    generation: u32,
}

impl FactId {
    /// Slot index inside the store.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this fact was inserted.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Typed [`FactId`].
pub struct FactHandle<T> {
    id: FactId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FactHandle<T> {
    pub(crate) fn new(id: FactId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> FactId {
        self.id
    }
}

impl<T> Clone for FactHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FactHandle<T> {}

impl<T> PartialEq for FactHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for FactHandle<T> {}

impl<T> std::hash::Hash for FactHandle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for FactHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FactHandle<{}>({})",
            short_type_name(std::any::type_name::<T>()),
            self.id
        )
    }
}

impl<T> From<FactHandle<T>> for FactId {
    fn from(handle: FactHandle<T>) -> Self {
        handle.id
    }
}

pub(crate) fn short_type_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

trait AnyFact: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_box(&self) -> Box<dyn AnyFact>;
}

impl<T: Fact> AnyFact for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_box(&self) -> Box<dyn AnyFact> {
        Box::new(self.clone())
    }
}

struct StoredFact {
    type_id: TypeId,
    type_name: &'static str,
    value: Box<dyn AnyFact>,
}

impl StoredFact {
    fn value(&self) -> &dyn AnyFact {
        &*self.value
    }

    fn value_mut(&mut self) -> &mut dyn AnyFact {
        &mut *self.value
    }
}

impl Clone for StoredFact {
    fn clone(&self) -> Self {
        Self {
            type_id: self.type_id,
            type_name: self.type_name,
            value: self.value().clone_box(),
        }
    }
}

#[derive(Clone)]
struct Slot {
    generation: u32,
    fact: Option<StoredFact>,
}

/// Generational slab of heterogeneous facts.
///
/// Cloning a store deep-copies every fact, which is how independent
/// workers obtain their own working solution.
#[derive(Clone, Default)]
pub struct Facts {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores a fact and returns its new identity.
    pub fn insert<T: Fact>(&mut self, value: T) -> FactHandle<T> {
        let stored = StoredFact {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: Box::new(value),
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].fact = Some(stored);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    fact: Some(stored),
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.len += 1;
        FactHandle::new(FactId {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    fn stored(&self, id: FactId) -> Option<&StoredFact> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.fact.as_ref())
    }

    fn stored_mut(&mut self, id: FactId) -> Option<&mut StoredFact> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.fact.as_mut())
    }

    /// Returns true if the identity names a live fact.
    pub fn contains(&self, id: FactId) -> bool {
        self.stored(id).is_some()
    }

    pub fn get<T: Fact>(&self, handle: FactHandle<T>) -> Option<&T> {
        self.get_any(handle.id)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Fact>(&mut self, handle: FactHandle<T>) -> Option<&mut T> {
        self.stored_mut(handle.id)?
            .value_mut()
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Type-erased access by identity.
    pub fn get_any(&self, id: FactId) -> Option<&dyn Any> {
        self.stored(id).map(|stored| stored.value().as_any())
    }

    /// Returns a typed handle if the identity names a live fact of type `T`.
    pub fn handle_of<T: Fact>(&self, id: FactId) -> Option<FactHandle<T>> {
        self.stored(id)
            .filter(|stored| stored.type_id == TypeId::of::<T>())
            .map(|_| FactHandle::new(id))
    }

    pub fn type_of(&self, id: FactId) -> Option<TypeId> {
        self.stored(id).map(|stored| stored.type_id)
    }

    pub fn type_name_of(&self, id: FactId) -> Option<&'static str> {
        self.stored(id).map(|stored| short_type_name(stored.type_name))
    }

    /// `Debug` rendering of a fact, used for justifications.
    pub fn describe(&self, id: FactId) -> Option<String> {
        self.stored(id).map(|stored| format!("{:?}", stored.value()))
    }

    /// Removes a fact, invalidating its identity.
    pub fn remove<T: Fact>(&mut self, handle: FactHandle<T>) -> Option<T> {
        if self.handle_of::<T>(handle.id).is_none() {
            return None;
        }
        let stored = self.take(handle.id)?;
        stored.value.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Removes a fact of any type. Returns false if the identity was stale.
    pub fn remove_any(&mut self, id: FactId) -> bool {
        self.take(id).is_some()
    }

    fn take(&mut self, id: FactId) -> Option<StoredFact> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let stored = slot.fact.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(stored)
    }

    /// Live facts in slot order, with their runtime type.
    pub fn iter(&self) -> impl Iterator<Item = (FactId, TypeId)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.fact.as_ref().map(|stored| {
                (
                    FactId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    stored.type_id,
                )
            })
        })
    }

    /// Live facts of one type, in slot order.
    pub fn iter_of<T: Fact>(&self) -> impl Iterator<Item = (FactHandle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let stored = slot.fact.as_ref()?;
            let value = stored.value().as_any().downcast_ref::<T>()?;
            let id = FactId {
                index: index as u32,
                generation: slot.generation,
            };
            Some((FactHandle::new(id), value))
        })
    }
}

impl fmt::Debug for Facts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facts")
            .field("len", &self.len)
            .field("slots", &self.slots.len())
            .finish()
    }
}
