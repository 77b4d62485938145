use crate::alphabet::{Alphabet, Label, Symbol};
use crate::nfa::{Nfa, StateId};

/// Helper struct for the construction of automata from plain integer state ids.
///
/// # Example
///
/// We want to create an automaton accepting exactly the word "ab" over the alphabet
/// `['a', 'b']`: three states 0, 1 and 2, an 'a' edge from 0 to 1, a 'b' edge from 1
/// to 2, initial state 0 and accepting state 2. This can be done as follows
/// ```
/// use fsa::prelude::*;
///
/// let nfa = Nfa::builder()
///     .with_alphabet(['a', 'b'])
///     .with_edges([(0, 'a', 1), (1, 'b', 2)])
///     .with_begins([0])
///     .with_ends([2])
///     .into_nfa();
/// assert!(nfa.accepts("ab".chars()));
/// ```
pub struct NfaBuilder<S: Symbol> {
    alphabet: Option<Vec<S>>,
    edges: Vec<(u32, Label<S>, u32)>,
    begins: Vec<u32>,
    ends: Vec<u32>,
}

impl<S: Symbol> Default for NfaBuilder<S> {
    fn default() -> Self {
        Self {
            alphabet: None,
            edges: vec![],
            begins: vec![],
            ends: vec![],
        }
    }
}

impl<S: Symbol> NfaBuilder<S> {
    /// Declares a fixed alphabet for the automaton that is built. Without this call
    /// the alphabet is inferred from the symbols appearing on edges.
    pub fn with_alphabet<I: IntoIterator<Item = S>>(mut self, symbols: I) -> Self {
        self.alphabet
            .get_or_insert_with(Vec::new)
            .extend(symbols);
        self
    }

    /// Adds a list of labeled edges given as `(source, symbol, target)` triples over
    /// integer state ids. The edges are added in the order in which they are given.
    pub fn with_edges<I: IntoIterator<Item = (u32, S, u32)>>(mut self, iter: I) -> Self {
        self.edges
            .extend(iter.into_iter().map(|(q, sym, p)| (q, Label::Sym(sym), p)));
        self
    }

    /// Adds a list of epsilon edges given as `(source, target)` pairs.
    pub fn with_epsilon_edges<I: IntoIterator<Item = (u32, u32)>>(mut self, iter: I) -> Self {
        self.edges
            .extend(iter.into_iter().map(|(q, p)| (q, Label::Epsilon, p)));
        self
    }

    /// Designates the given states as initial.
    pub fn with_begins<I: IntoIterator<Item = u32>>(mut self, iter: I) -> Self {
        self.begins.extend(iter);
        self
    }

    /// Designates the given states as accepting.
    pub fn with_ends<I: IntoIterator<Item = u32>>(mut self, iter: I) -> Self {
        self.ends.extend(iter);
        self
    }

    /// Builds the automaton.
    pub fn into_nfa(self) -> Nfa<S> {
        let mut nfa = match self.alphabet {
            Some(symbols) => Nfa::with_alphabet(Alphabet::new(symbols)),
            None => Nfa::new(),
        };
        for (q, label, p) in self.edges {
            nfa.connect(StateId(q), StateId(p), label);
        }
        for q in self.begins {
            nfa.mark_begin(StateId(q));
        }
        for q in self.ends {
            nfa.mark_end(StateId(q));
        }
        nfa
    }
}
