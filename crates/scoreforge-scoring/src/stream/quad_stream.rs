//! Four-element constraint streams.

impl_arity_stream!(QuadConstraintStream, 4, A: 0, B: 1, C: 2, D: 3);
