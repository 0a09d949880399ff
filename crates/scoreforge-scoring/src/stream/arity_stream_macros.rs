//! Macros generating the arity-specific constraint streams.
//!
//! Uni, bi, tri and quad streams share filtering, gating, mapping,
//! grouping and the penalize/reward terminals; only the number of
//! closure arguments differs. Arity-specific operations (joins,
//! `flatten_last`) live in the individual stream files.

macro_rules! impl_arity_stream {
    ($stream:ident, $arity:expr, $($t:ident : $i:tt),+) => {
        pub struct $stream<$($t),+> {
            pub(crate) def: std::sync::Arc<super::def::StreamDef>,
            _phantom: std::marker::PhantomData<fn() -> ($($t,)+)>,
        }

        impl<$($t),+> Clone for $stream<$($t),+> {
            fn clone(&self) -> Self {
                Self::from_def(self.def.clone())
            }
        }

        impl<$($t),+> std::fmt::Debug for $stream<$($t),+> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($stream))
                    .field("node", &self.def.node_kind())
                    .finish()
            }
        }

        impl<$($t),+> $stream<$($t),+> {
            pub(crate) fn from_def(def: std::sync::Arc<super::def::StreamDef>) -> Self {
                Self {
                    def,
                    _phantom: std::marker::PhantomData,
                }
            }
        }

        impl<$($t: 'static),+> $stream<$($t),+> {
            /// Keeps only the tuples matching the predicate.
            pub fn filter<P>(self, predicate: P) -> Self
            where
                P: Fn($(&$t),+) -> bool + Send + Sync + 'static,
            {
                let predicate: super::function::Predicate = std::sync::Arc::new(
                    move |t: &crate::tuple::TupleView<'_>| predicate($(t.get::<$t>($i)),+),
                );
                Self::from_def(super::def::StreamDef::derive(
                    super::def::StreamKind::Filter(predicate),
                    vec![self.def],
                    $arity,
                ))
            }

            /// Keeps the tuples for which at least one `X` fact matches.
            pub fn if_exists<X: crate::fact::Fact>(
                self,
                joiner: super::joiner::Joiner<($($t,)+), X>,
            ) -> Self {
                self.gate(super::def::StreamDef::for_each::<X>(), joiner, true)
            }

            /// Keeps the tuples for which no `X` fact matches.
            pub fn if_not_exists<X: crate::fact::Fact>(
                self,
                joiner: super::joiner::Joiner<($($t,)+), X>,
            ) -> Self {
                self.gate(super::def::StreamDef::for_each::<X>(), joiner, false)
            }

            pub fn if_exists_stream<X: 'static>(
                self,
                other: super::UniConstraintStream<X>,
                joiner: super::joiner::Joiner<($($t,)+), X>,
            ) -> Self {
                self.gate(other.def, joiner, true)
            }

            pub fn if_not_exists_stream<X: 'static>(
                self,
                other: super::UniConstraintStream<X>,
                joiner: super::joiner::Joiner<($($t,)+), X>,
            ) -> Self {
                self.gate(other.def, joiner, false)
            }

            fn gate<X>(
                self,
                other: std::sync::Arc<super::def::StreamDef>,
                joiner: super::joiner::Joiner<($($t,)+), X>,
                should_exist: bool,
            ) -> Self {
                let plan = std::sync::Arc::new(crate::node::JoinPlan::new(&joiner.components));
                Self::from_def(super::def::StreamDef::derive(
                    super::def::StreamKind::Exists { plan, should_exist },
                    vec![self.def, other],
                    $arity,
                ))
            }

            /// Replaces every tuple by a single derived value.
            pub fn map<R, F>(self, mapper: F) -> super::UniConstraintStream<R>
            where
                R: std::fmt::Debug + Send + Sync + 'static,
                F: Fn($(&$t),+) -> R + Send + Sync + 'static,
            {
                let mapper: super::function::ValueFn = std::sync::Arc::new(
                    move |t: &crate::tuple::TupleView<'_>| {
                        std::sync::Arc::new(mapper($(t.get::<$t>($i)),+))
                            as std::sync::Arc<dyn crate::tuple::Value>
                    },
                );
                super::UniConstraintStream::from_def(super::def::StreamDef::derive(
                    super::def::StreamKind::Map(mapper),
                    vec![self.def],
                    1,
                ))
            }

            /// Groups by key and aggregates each group: `(key, result)`.
            pub fn group_by<K, Col, F>(
                self,
                key: F,
                collector: Col,
            ) -> super::BiConstraintStream<K, Col::Result>
            where
                K: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
                Col: super::collector::Collector<($($t,)+)>,
                F: Fn($(&$t),+) -> K + Send + Sync + 'static,
            {
                let key: super::function::TupleFn<K> = std::sync::Arc::new(
                    move |t: &crate::tuple::TupleView<'_>| key($(t.get::<$t>($i)),+),
                );
                super::BiConstraintStream::from_def(self.group(
                    key,
                    collector,
                    crate::node::GroupOutput::KeyAndResult,
                ))
            }

            /// The distinct keys of the stream.
            pub fn group_by_key<K, F>(self, key: F) -> super::UniConstraintStream<K>
            where
                K: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
                F: Fn($(&$t),+) -> K + Send + Sync + 'static,
            {
                let key: super::function::TupleFn<K> = std::sync::Arc::new(
                    move |t: &crate::tuple::TupleView<'_>| key($(t.get::<$t>($i)),+),
                );
                super::UniConstraintStream::from_def(self.group(
                    key,
                    super::collector::count(),
                    crate::node::GroupOutput::Key,
                ))
            }

            /// Aggregates the whole stream into one tuple, present while the
            /// stream is non-empty.
            pub fn group_by_collect<Col>(self, collector: Col) -> super::UniConstraintStream<Col::Result>
            where
                Col: super::collector::Collector<($($t,)+)>,
            {
                let key: super::function::TupleFn<()> =
                    std::sync::Arc::new(|_: &crate::tuple::TupleView<'_>| ());
                super::UniConstraintStream::from_def(self.group(
                    key,
                    collector,
                    crate::node::GroupOutput::Result,
                ))
            }

            fn group<K, Col>(
                self,
                key: super::function::TupleFn<K>,
                collector: Col,
                output: crate::node::GroupOutput,
            ) -> std::sync::Arc<super::def::StreamDef>
            where
                K: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
                Col: super::collector::Collector<($($t,)+)>,
            {
                let arity = match output {
                    crate::node::GroupOutput::KeyAndResult => 2,
                    _ => 1,
                };
                let spec = crate::node::Grouping::<($($t,)+), K, Col>::new(key, collector, output);
                super::def::StreamDef::derive(
                    super::def::StreamKind::Group(std::sync::Arc::new(spec)),
                    vec![self.def],
                    arity,
                )
            }

            /// Subtracts `weight` per match.
            pub fn penalize<Sc: scoreforge_core::Score>(
                self,
                weight: Sc,
            ) -> super::ConstraintBuilder<Sc> {
                self.impact(scoreforge_core::ImpactType::Penalty, crate::node::Impact::Fixed(weight))
            }

            /// Subtracts `weight` times the match weight per match.
            pub fn penalize_weighted<Sc, W>(self, weight: Sc, match_weight: W) -> super::ConstraintBuilder<Sc>
            where
                Sc: scoreforge_core::Score,
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                let impact = Self::weighted(weight, match_weight);
                self.impact(scoreforge_core::ImpactType::Penalty, impact)
            }

            /// Subtracts a score computed from each match.
            pub fn penalize_with<Sc, W>(self, score: W) -> super::ConstraintBuilder<Sc>
            where
                Sc: scoreforge_core::Score,
                W: Fn($(&$t),+) -> Sc + Send + Sync + 'static,
            {
                let impact = Self::dynamic(score);
                self.impact(scoreforge_core::ImpactType::Penalty, impact)
            }

            /// Adds `weight` per match.
            pub fn reward<Sc: scoreforge_core::Score>(self, weight: Sc) -> super::ConstraintBuilder<Sc> {
                self.impact(scoreforge_core::ImpactType::Reward, crate::node::Impact::Fixed(weight))
            }

            pub fn reward_weighted<Sc, W>(self, weight: Sc, match_weight: W) -> super::ConstraintBuilder<Sc>
            where
                Sc: scoreforge_core::Score,
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                let impact = Self::weighted(weight, match_weight);
                self.impact(scoreforge_core::ImpactType::Reward, impact)
            }

            pub fn reward_with<Sc, W>(self, score: W) -> super::ConstraintBuilder<Sc>
            where
                Sc: scoreforge_core::Score,
                W: Fn($(&$t),+) -> Sc + Send + Sync + 'static,
            {
                let impact = Self::dynamic(score);
                self.impact(scoreforge_core::ImpactType::Reward, impact)
            }

            fn weighted<Sc, W>(weight: Sc, match_weight: W) -> crate::node::Impact<Sc>
            where
                Sc: scoreforge_core::Score,
                W: Fn($(&$t),+) -> i64 + Send + Sync + 'static,
            {
                crate::node::Impact::Weighted(
                    weight,
                    std::sync::Arc::new(move |t: &crate::tuple::TupleView<'_>| {
                        match_weight($(t.get::<$t>($i)),+)
                    }),
                )
            }

            fn dynamic<Sc, W>(score: W) -> crate::node::Impact<Sc>
            where
                Sc: scoreforge_core::Score,
                W: Fn($(&$t),+) -> Sc + Send + Sync + 'static,
            {
                crate::node::Impact::Dynamic(std::sync::Arc::new(
                    move |t: &crate::tuple::TupleView<'_>| score($(t.get::<$t>($i)),+),
                ))
            }

            fn impact<Sc: scoreforge_core::Score>(
                self,
                impact_type: scoreforge_core::ImpactType,
                impact: crate::node::Impact<Sc>,
            ) -> super::ConstraintBuilder<Sc> {
                super::ConstraintBuilder::new(self.def, impact_type, impact)
            }
        }
    };
}
