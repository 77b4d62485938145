//! Library for constructing and transforming finite state automata.
//!
//! The central type is [`nfa::Nfa`], a nondeterministic finite automaton with epsilon
//! transitions over an arbitrary symbol type. An automaton owns its states (opaque dense
//! identifiers minted by a per-automaton allocator), a set of labeled edges, designated
//! begin and end states, and forward/backward adjacency indices that are maintained
//! incrementally as edges are inserted. An automaton is grown by mutation ([`nfa::Nfa::connect`],
//! [`nfa::Nfa::mark_begin`], [`nfa::Nfa::mark_end`]) and afterwards treated as immutable: every
//! transformation borrows its operand(s) and returns a fresh automaton.
//!
//! On top of the store, the crate provides the classical automaton algebra:
//! - construction operators (union, concatenation, optional/star/plus/bounded repetition,
//!   completion and complementation) in [`operations`],
//! - determinization via subset construction and Brzozowski's double-reversal
//!   minimization in [`determinize`],
//! - product and synchronized intersection composition together with language
//!   containment, equivalence and emptiness tests in [`compose`],
//! - canonical state renaming and the flat `(begin, ends, edges)` export triple consumed
//!   by a downstream solver in [`canonical`].
//!
//! All precondition violations (non-disjoint operands to [`nfa::Nfa::union`], nondeterministic
//! operands to [`operations`] that require determinism, symbols outside a declared
//! alphabet, malformed repetition bounds) are programmer defects and fail fast with a
//! panic; no operation returns a partially constructed automaton.
//!
//! Everything here is single threaded and purely functional over finished automata, so
//! sharing a built [`nfa::Nfa`] across threads for reading is safe by construction.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use itertools::Itertools;

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use fsa::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet,
        alphabet::{Alphabet, Label, LabelFilter, LengthLexWords, Symbol},
        canonical::{FlatFsa, RenamePolicy},
        math,
        nfa::{Edge, Nfa, NfaBuilder, Predecessors, StateId, Successors},
        Show,
    };
}

/// Definitions of mathematical containers (hashed and ordered sets/maps, bijections)
/// which are used throughout the crate.
pub mod math;

/// Symbols, edge labels, declared alphabets and label filters.
pub mod alphabet;

/// The automaton store: states, labeled edges, begin/end sets and adjacency indices.
pub mod nfa;

/// Construction operators that build new automata from one or two existing ones.
pub mod operations;

/// Subset construction and double-reversal minimization.
pub mod determinize;

/// Product and intersection composition, language comparison and reachability pruning.
pub mod compose;

/// Canonical state renaming and the flat export triple for the downstream solver.
pub mod canonical;

/// Graphviz output for debugging automata visually.
pub mod dot;

/// Helper trait which can be used to display states, labels and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state index that should
    /// be for example 0, 1, 2, ... and for an edge (0, a, 1) it should be (0, a, 1).
    /// Just use something that makes sense. This is mainly used for debugging purposes.
    fn show(&self) -> String;

    /// Show a collection of the thing, for a collection of states this should be
    /// {0, 1, 2, ...}.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a + Sized,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("{{{}}}", iter.into_iter().map(|x| x.show()).join(", "))
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }

    fn show_collection<'a, I: IntoIterator<Item = &'a Self>>(iter: I) -> String {
        format!("\"{}\"", iter.into_iter().join(""))
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for u32 {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        self.iter().map(|x| x.show()).join("")
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        self[..].show()
    }
}
