use super::{Tuple, TupleState};
use crate::error::{impossible, Result};
use crate::node::TupleOp;

/// A tuple owned by the node that created it.
pub(crate) struct OutTuple<P> {
    pub(crate) elements: Tuple,
    pub(crate) state: TupleState,
    pub(crate) payload: P,
}

/// Slab of a node's output tuples plus its dirty queue.
///
/// Changes made while a node applies its inbox only move tuples between
/// states; nothing reaches downstream until [`Outbound::propagate`], which
/// collapses every change of one tuple within a flush into one signal.
/// Slots are freed only during propagation, so a handle never changes
/// meaning while downstream nodes may still hold it.
pub(crate) struct Outbound<P> {
    slots: Vec<Option<OutTuple<P>>>,
    free: Vec<usize>,
    dirty: Vec<usize>,
    active: usize,
}

impl<P> Outbound<P> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            dirty: Vec::new(),
            active: 0,
        }
    }

    /// Tuples that are, or are about to be, visible downstream.
    pub(crate) fn active_count(&self) -> usize {
        self.active
    }

    pub(crate) fn state(&self, slot: usize) -> TupleState {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .map_or(TupleState::Dead, |tuple| tuple.state)
    }

    pub(crate) fn get(&self, slot: usize) -> Result<&OutTuple<P>> {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or_else(|| impossible(format!("output slot {} is dead", slot)))
    }

    fn get_mut(&mut self, slot: usize) -> Result<&mut OutTuple<P>> {
        self.slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or_else(|| impossible(format!("output slot {} is dead", slot)))
    }

    pub(crate) fn create(&mut self, elements: Tuple, payload: P) -> usize {
        let tuple = OutTuple {
            elements,
            state: TupleState::Creating,
            payload,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(tuple);
                slot
            }
            None => {
                self.slots.push(Some(tuple));
                self.slots.len() - 1
            }
        };
        self.dirty.push(slot);
        self.active += 1;
        slot
    }

    /// Marks a tuple as changed in place.
    pub(crate) fn update(&mut self, slot: usize) -> Result<()> {
        let tuple = self.get_mut(slot)?;
        match tuple.state {
            TupleState::Creating | TupleState::Updating => Ok(()),
            TupleState::Ok => {
                tuple.state = TupleState::Updating;
                self.dirty.push(slot);
                Ok(())
            }
            state => Err(impossible(format!(
                "update of output slot {} in state {:?}",
                slot, state
            ))),
        }
    }

    /// Replaces the elements of a tuple and marks it changed.
    pub(crate) fn update_elements(&mut self, slot: usize, elements: Tuple) -> Result<()> {
        self.get_mut(slot)?.elements = elements;
        self.update(slot)
    }

    pub(crate) fn retract(&mut self, slot: usize) -> Result<()> {
        let tuple = self.get_mut(slot)?;
        match tuple.state {
            TupleState::Creating => tuple.state = TupleState::Aborting,
            TupleState::Updating => tuple.state = TupleState::Dying,
            TupleState::Ok => {
                tuple.state = TupleState::Dying;
                self.dirty.push(slot);
            }
            state => {
                return Err(impossible(format!(
                    "retract of output slot {} in state {:?}",
                    slot, state
                )))
            }
        }
        self.active -= 1;
        Ok(())
    }

    /// Drains the dirty queue into downstream signals.
    pub(crate) fn propagate(&mut self, emit: &mut Vec<TupleOp>) -> Result<()> {
        for slot in std::mem::take(&mut self.dirty) {
            let place = &mut self.slots[slot];
            let tuple = place
                .as_mut()
                .ok_or_else(|| impossible(format!("dirty output slot {} is dead", slot)))?;
            match tuple.state {
                TupleState::Creating => {
                    tuple.state = TupleState::Ok;
                    emit.push(TupleOp::Insert {
                        slot,
                        tuple: tuple.elements.clone(),
                    });
                }
                TupleState::Updating => {
                    tuple.state = TupleState::Ok;
                    emit.push(TupleOp::Update {
                        slot,
                        tuple: tuple.elements.clone(),
                    });
                }
                TupleState::Dying => {
                    emit.push(TupleOp::Retract { slot });
                    *place = None;
                    self.free.push(slot);
                }
                TupleState::Aborting => {
                    *place = None;
                    self.free.push(slot);
                }
                state => {
                    return Err(impossible(format!(
                        "output slot {} queued in state {:?}",
                        slot, state
                    )))
                }
            }
        }
        Ok(())
    }

    /// Checks that nothing is left in a transient state.
    pub(crate) fn check_quiescent(&self) -> Result<()> {
        if !self.dirty.is_empty() {
            return Err(impossible(format!(
                "{} output tuples still queued after propagation",
                self.dirty.len()
            )));
        }
        let live = self.slots.iter().flatten().count();
        if live != self.active {
            return Err(impossible(format!(
                "{} stored output tuples but {} active",
                live, self.active
            )));
        }
        let stuck = (0..self.slots.len())
            .map(|slot| (slot, self.state(slot)))
            .find(|(_, state)| !matches!(state, TupleState::Ok | TupleState::Dead));
        match stuck {
            Some((slot, state)) => Err(impossible(format!(
                "output slot {} left in state {:?}",
                slot, state
            ))),
            None => Ok(()),
        }
    }
}
