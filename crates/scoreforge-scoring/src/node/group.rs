use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::{Node, NodeKind, Port, TupleOp};
use crate::error::{impossible, Result};
use crate::fact::Facts;
use crate::stream::collector::{Accumulator, Collector};
use crate::stream::function::TupleFn;
use crate::tuple::{Element, InputStore, Outbound, Tuple, TupleView};

/// Which parts of a group make up its output tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupOutput {
    KeyAndResult,
    Key,
    Result,
}

/// Recipe for a group-by node; stored in the stream definition and
/// instantiated once per session.
pub(crate) trait GroupSpec: Send + Sync {
    fn instantiate(&self) -> Box<dyn Node>;
}

pub(crate) struct Grouping<In, K, C> {
    key: TupleFn<K>,
    collector: Arc<C>,
    output: GroupOutput,
    _phantom: PhantomData<fn(In)>,
}

impl<In, K, C> Grouping<In, K, C> {
    pub(crate) fn new(key: TupleFn<K>, collector: C, output: GroupOutput) -> Self {
        Self {
            key,
            collector: Arc::new(collector),
            output,
            _phantom: PhantomData,
        }
    }
}

impl<In, K, C> GroupSpec for Grouping<In, K, C>
where
    In: 'static,
    K: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static,
    C: Collector<In>,
{
    fn instantiate(&self) -> Box<dyn Node> {
        Box::new(GroupNode::<In, K, C>::new(
            self.key.clone(),
            self.collector.clone(),
            self.output,
        ))
    }
}

struct Member<K, V> {
    key: K,
    value: V,
}

struct Group<A, R> {
    accumulator: A,
    size: usize,
    out: Option<usize>,
    result: Option<R>,
}

/// Groups upstream tuples by key and folds each group with a collector.
///
/// Accumulators are updated per signal; results are only read in
/// [`Node::settle`], once per touched group, so a group changing several
/// times within a flush emits at most one signal. A group whose result is
/// unchanged emits nothing, and an emptied group is retracted.
pub(crate) struct GroupNode<In, K, C: Collector<In>> {
    key: TupleFn<K>,
    collector: Arc<C>,
    output: GroupOutput,
    members: InputStore<Member<K, C::Value>>,
    groups: IndexMap<K, Group<C::Accumulator, C::Result>>,
    touched: IndexSet<K>,
    out: Outbound<()>,
    _phantom: PhantomData<fn(In)>,
}

impl<In, K, C> GroupNode<In, K, C>
where
    K: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static,
    C: Collector<In>,
{
    pub(crate) fn new(key: TupleFn<K>, collector: Arc<C>, output: GroupOutput) -> Self {
        Self {
            key,
            collector,
            output,
            members: InputStore::new(),
            groups: IndexMap::new(),
            touched: IndexSet::new(),
            out: Outbound::new(),
            _phantom: PhantomData,
        }
    }

    fn add(&mut self, key: &K, value: &C::Value) {
        let collector = &self.collector;
        let group = self.groups.entry(key.clone()).or_insert_with(|| Group {
            accumulator: collector.create_accumulator(),
            size: 0,
            out: None,
            result: None,
        });
        group.accumulator.accumulate(value);
        group.size += 1;
        self.touched.insert(key.clone());
    }

    fn remove(&mut self, key: &K, value: &C::Value) -> Result<()> {
        let group = self
            .groups
            .get_mut(key)
            .ok_or_else(|| impossible(format!("group {:?} is missing", key)))?;
        group.accumulator.retract(value);
        group.size -= 1;
        self.touched.insert(key.clone());
        Ok(())
    }

    fn elements(output: GroupOutput, key: &K, result: &C::Result) -> Tuple {
        let mut tuple = Tuple::new();
        if output != GroupOutput::Result {
            tuple.push(Element::value(key.clone()));
        }
        if output != GroupOutput::Key {
            tuple.push(Element::value(result.clone()));
        }
        tuple
    }
}

impl<In, K, C> Node for GroupNode<In, K, C>
where
    In: 'static,
    K: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static,
    C: Collector<In>,
{
    fn kind(&self) -> NodeKind {
        NodeKind::GroupBy
    }

    fn insert(&mut self, _port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let view = TupleView::new(facts, &tuple);
        let key = (self.key)(&view);
        let value = self.collector.extract(&view);
        self.add(&key, &value);
        self.members.insert(slot, Member { key, value })
    }

    fn update(&mut self, _port: Port, slot: usize, tuple: Tuple, facts: &Facts) -> Result<()> {
        let view = TupleView::new(facts, &tuple);
        let key = (self.key)(&view);
        let value = self.collector.extract(&view);
        let old = self.members.remove(slot)?;
        self.remove(&old.key, &old.value)?;
        self.add(&key, &value);
        self.members.insert(slot, Member { key, value })
    }

    fn retract(&mut self, _port: Port, slot: usize) -> Result<()> {
        let member = self.members.remove(slot)?;
        self.remove(&member.key, &member.value)
    }

    fn settle(&mut self) -> Result<()> {
        for key in std::mem::take(&mut self.touched) {
            let Some(group) = self.groups.get_mut(&key) else {
                continue;
            };
            if group.size == 0 {
                if let Some(out) = group.out {
                    self.out.retract(out)?;
                }
                self.groups.swap_remove(&key);
                continue;
            }
            let result = group.accumulator.finish();
            match group.out {
                None => {
                    let elements = Self::elements(self.output, &key, &result);
                    group.out = Some(self.out.create(elements, ()));
                    group.result = Some(result);
                }
                Some(out) if group.result.as_ref() != Some(&result) => {
                    if self.output != GroupOutput::Key {
                        let elements = Self::elements(self.output, &key, &result);
                        self.out.update_elements(out, elements)?;
                    }
                    group.result = Some(result);
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn propagate(&mut self, emit: &mut Vec<TupleOp>) -> Result<()> {
        self.out.propagate(emit)
    }

    fn live_tuples(&self) -> usize {
        self.out.active_count()
    }

    fn check_quiescent(&self) -> Result<()> {
        self.out.check_quiescent()?;
        if !self.touched.is_empty() {
            return Err(impossible("group-by settled with touched groups left"));
        }
        let members: usize = self.groups.values().map(|group| group.size).sum();
        if members != self.members.len() || self.groups.len() != self.out.active_count() {
            return Err(impossible(format!(
                "group-by holds {} members in {} groups but {} inputs and {} outputs",
                members,
                self.groups.len(),
                self.members.len(),
                self.out.active_count()
            )));
        }
        Ok(())
    }
}
