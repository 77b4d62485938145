use std::collections::VecDeque;

use itertools::Itertools;

use crate::alphabet::{Alphabet, Label, LabelFilter, Symbol};
use crate::math::{Map, OrderedSet, Set};
use crate::Show;

mod builder;
pub use builder::NfaBuilder;

/// Dense identifier of a state. States carry no payload; only equality, ordering and
/// hashing are meaningful. Fresh identifiers are minted by the allocator of the
/// automaton they belong to, so two independently built automata will generally share
/// identifiers and must be renamed before they can be combined.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub(crate) u32);

impl StateId {
    /// The numeric value of the identifier.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for StateId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Debug for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Show for StateId {
    fn show(&self) -> String {
        self.0.to_string()
    }
}

/// Identifier of an edge in the arena of an automaton.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct EdgeId(u32);

impl EdgeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One edge of an automaton: an ordered `(source, target, label)` triple where the
/// label is either a concrete symbol or epsilon.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Edge<S> {
    /// State the edge leaves from.
    pub source: StateId,
    /// State the edge points to.
    pub target: StateId,
    /// Symbol consumed by taking the edge, or epsilon.
    pub label: Label<S>,
}

/// A nondeterministic finite automaton with epsilon transitions.
///
/// The edge arena is the single source of truth; the forward and backward adjacency
/// indices are rebuilt incrementally inside [`Nfa::connect`] and always agree with it.
/// The set of states is derived: a state exists exactly if it is a begin state, an end
/// state or an endpoint of some edge.
///
/// An automaton is grown by mutation and then treated as immutable: all transformation
/// operators borrow `self` and return a new automaton.
#[derive(Clone)]
pub struct Nfa<S: Symbol> {
    pub(crate) alphabet: Option<Alphabet<S>>,
    pub(crate) sigma: OrderedSet<S>,
    pub(crate) begins: OrderedSet<StateId>,
    pub(crate) ends: OrderedSet<StateId>,
    pub(crate) edges: Vec<Edge<S>>,
    pub(crate) forward: Map<StateId, OrderedSet<EdgeId>>,
    pub(crate) backward: Map<StateId, OrderedSet<EdgeId>>,
    pub(crate) next_state: u32,
}

impl<S: Symbol> Nfa<S> {
    /// Creates an empty automaton without a declared alphabet; the alphabet is then
    /// inferred as the set of symbols actually used on edges.
    pub fn new() -> Self {
        Self {
            alphabet: None,
            sigma: OrderedSet::new(),
            begins: OrderedSet::new(),
            ends: OrderedSet::new(),
            edges: Vec::new(),
            forward: Map::default(),
            backward: Map::default(),
            next_state: 0,
        }
    }

    /// Creates an empty automaton with the given declared alphabet. Every concrete
    /// symbol ever attached to an edge must then belong to it.
    pub fn with_alphabet(alphabet: Alphabet<S>) -> Self {
        Self {
            alphabet: Some(alphabet),
            ..Self::new()
        }
    }

    /// Creates an empty automaton carrying over the declared alphabet of `self`,
    /// if there is one.
    pub(crate) fn empty_like(&self) -> Self {
        match &self.alphabet {
            Some(alphabet) => Self::with_alphabet(alphabet.clone()),
            None => Self::new(),
        }
    }

    /// Returns a builder for assembling an automaton from integer state ids.
    pub fn builder() -> NfaBuilder<S> {
        NfaBuilder::default()
    }

    /// The declared alphabet, if one was given at creation time.
    pub fn alphabet(&self) -> Option<&Alphabet<S>> {
        self.alphabet.as_ref()
    }

    /// The set of concrete symbols actually used on edges. Always a subset of the
    /// declared alphabet when one exists.
    pub fn sigma(&self) -> &OrderedSet<S> {
        &self.sigma
    }

    /// The symbols the automaton is considered to range over: the declared alphabet
    /// when present, the used symbols otherwise.
    pub fn symbol_universe(&self) -> OrderedSet<S> {
        match &self.alphabet {
            Some(alphabet) => alphabet.universe().collect(),
            None => self.sigma.clone(),
        }
    }

    /// The set of initial states.
    pub fn begins(&self) -> &OrderedSet<StateId> {
        &self.begins
    }

    /// The set of accepting states.
    pub fn ends(&self) -> &OrderedSet<StateId> {
        &self.ends
    }

    /// All states of the automaton: every identifier referenced by the begin set, the
    /// end set or an edge endpoint, each counted once.
    pub fn states(&self) -> OrderedSet<StateId> {
        let mut states: OrderedSet<StateId> = self.begins.iter().copied().collect();
        states.extend(self.ends.iter().copied());
        for edge in &self.edges {
            states.insert(edge.source);
            states.insert(edge.target);
        }
        states
    }

    /// Number of states.
    pub fn state_count(&self) -> usize {
        self.states().len()
    }

    /// Iterates over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge<S>> {
        self.edges.iter()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Mints a fresh state that is guaranteed to be distinct from every state the
    /// automaton currently references.
    pub fn add_state(&mut self) -> StateId {
        let id = StateId(self.next_state);
        self.next_state += 1;
        id
    }

    /// Keeps the allocator ahead of externally supplied identifiers.
    fn note_state(&mut self, q: StateId) {
        self.next_state = self.next_state.max(q.0 + 1);
    }

    /// Designates `q` as an initial state.
    pub fn mark_begin(&mut self, q: StateId) {
        self.note_state(q);
        self.begins.insert(q);
    }

    /// Designates `q` as an accepting state.
    pub fn mark_end(&mut self, q: StateId) {
        self.note_state(q);
        self.ends.insert(q);
    }

    /// Adds one edge from `source` to `target` with the given label, updating the
    /// used-symbol set and both adjacency indices.
    ///
    /// Panics if a declared alphabet exists and a concrete label lies outside it.
    pub fn connect(&mut self, source: StateId, target: StateId, label: Label<S>) {
        if let Label::Sym(sym) = label {
            if let Some(alphabet) = &self.alphabet {
                assert!(
                    alphabet.contains(sym),
                    "symbol {} is not part of the declared alphabet",
                    sym.show()
                );
            }
            self.sigma.insert(sym);
        }
        self.note_state(source);
        self.note_state(target);

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge {
            source,
            target,
            label,
        });
        self.forward.entry(source).or_default().insert(id);
        self.backward.entry(target).or_default().insert(id);
    }

    /// Returns a lazy iterator over the distinct states reachable from `q` by one edge
    /// passing `filter`. Epsilon edges are only followed when the filter explicitly
    /// asks for them.
    pub fn successors(&self, q: StateId, filter: LabelFilter<S>) -> Successors<'_, S> {
        Successors {
            nfa: self,
            filter,
            edges: self.forward.get(&q).map(|ids| ids.iter()),
            seen: Set::default(),
        }
    }

    /// Symmetric to [`Nfa::successors`], driven by the backward index.
    pub fn predecessors(&self, q: StateId, filter: LabelFilter<S>) -> Predecessors<'_, S> {
        Predecessors {
            nfa: self,
            filter,
            edges: self.backward.get(&q).map(|ids| ids.iter()),
            seen: Set::default(),
        }
    }

    /// The unique successor of `q` on `sym`, if any. Mostly useful on deterministic
    /// automata where there is at most one.
    pub fn successor_on(&self, q: StateId, sym: S) -> Option<StateId> {
        self.successors(q, LabelFilter::Sym(sym)).next()
    }

    /// Iterates over the `(symbol, target)` pairs of all concrete edges leaving `q`.
    pub fn transitions_from(&self, q: StateId) -> impl Iterator<Item = (S, StateId)> + '_ {
        self.forward
            .get(&q)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| {
                let edge = &self.edges[id.index()];
                edge.label.symbol().map(|sym| (sym, edge.target))
            })
    }

    /// All states reachable from `states` using zero or more epsilon edges, computed as
    /// an iterative fixed point over a worklist.
    pub fn epsilon_closure<I: IntoIterator<Item = StateId>>(
        &self,
        states: I,
    ) -> OrderedSet<StateId> {
        let mut closure: OrderedSet<StateId> = states.into_iter().collect();
        let mut queue: VecDeque<StateId> = closure.iter().copied().collect();
        while let Some(q) = queue.pop_front() {
            for p in self.successors(q, LabelFilter::Epsilon) {
                if closure.insert(p) {
                    queue.push_back(p);
                }
            }
        }
        closure
    }

    /// Whether the automaton is deterministic: exactly one begin state, no epsilon
    /// edges, and at most one outgoing edge per `(state, symbol)` pair. This is a
    /// predicate over the structure, not a stored flag.
    pub fn is_deterministic(&self) -> bool {
        if self.begins.len() != 1 {
            return false;
        }
        let mut seen = Set::default();
        for edge in &self.edges {
            match edge.label {
                Label::Epsilon => return false,
                Label::Sym(sym) => {
                    if !seen.insert((edge.source, sym)) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Whether the automaton is deterministic and has exactly one outgoing edge per
    /// `(state, symbol)` pair for every symbol of its [`Nfa::symbol_universe`].
    pub fn is_complete(&self) -> bool {
        self.is_complete_over(&self.symbol_universe())
    }

    pub(crate) fn is_complete_over(&self, universe: &OrderedSet<S>) -> bool {
        self.is_deterministic()
            && self.states().iter().all(|&q| {
                universe
                    .iter()
                    .all(|&sym| self.successor_on(q, sym).is_some())
            })
    }

    /// The single begin state. Panics when the automaton does not have exactly one.
    pub fn sole_begin(&self) -> StateId {
        assert!(
            self.begins.len() == 1,
            "expected exactly one begin state, found {}",
            self.begins.len()
        );
        *self.begins.first().expect("nonempty after assertion")
    }

    /// The single end state. Panics when the automaton does not have exactly one.
    pub fn sole_end(&self) -> StateId {
        assert!(
            self.ends.len() == 1,
            "expected exactly one end state, found {}",
            self.ends.len()
        );
        *self.ends.first().expect("nonempty after assertion")
    }

    /// Returns a new automaton with every edge reversed and the begin/end sets
    /// swapped. The building block of double-reversal minimization.
    pub fn mirror(&self) -> Self {
        let mut out = self.empty_like();
        for edge in &self.edges {
            out.connect(edge.target, edge.source, edge.label);
        }
        for &q in &self.ends {
            out.mark_begin(q);
        }
        for &q in &self.begins {
            out.mark_end(q);
        }
        out.next_state = out.next_state.max(self.next_state);
        out
    }

    /// Runs the automaton on `word` with the usual closure-stepping semantics and
    /// reports whether an accepting state is reached.
    pub fn accepts<W: IntoIterator<Item = S>>(&self, word: W) -> bool {
        let mut current = self.epsilon_closure(self.begins.iter().copied());
        for sym in word {
            let mut step = OrderedSet::new();
            for &q in &current {
                step.extend(self.successors(q, LabelFilter::Sym(sym)));
            }
            current = self.epsilon_closure(step);
            if current.is_empty() {
                return false;
            }
        }
        current.iter().any(|q| self.ends.contains(q))
    }

    /// Returns a string representation of the transition table of the automaton.
    /// Begin states are marked with an arrow, end states are highlighted.
    pub fn transition_table(&self) -> String {
        use owo_colors::OwoColorize;

        let universe = self.symbol_universe();
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("state".to_string())
                .chain(universe.iter().map(|sym| sym.show()))
                .chain(std::iter::once("ε".to_string())),
        );
        for q in self.states() {
            let mut ident = q.show();
            if self.begins.contains(&q) {
                ident = format!("→{ident}");
            }
            if self.ends.contains(&q) {
                ident = ident.bright_green().to_string();
            }
            let mut row = vec![ident];
            for &sym in &universe {
                row.push(self.cell(q, LabelFilter::Sym(sym)));
            }
            row.push(self.cell(q, LabelFilter::Epsilon));
            builder.push_record(row);
        }
        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }

    fn cell(&self, q: StateId, filter: LabelFilter<S>) -> String {
        let targets = self.successors(q, filter).map(|p| p.show()).join(", ");
        if targets.is_empty() {
            "-".to_string()
        } else {
            targets
        }
    }
}

impl<S: Symbol> Default for Nfa<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two automata are equal when their observable structure agrees: declared alphabet,
/// used symbols, begin/end sets and the set of edges. Edge insertion order and the
/// state of the allocator are bookkeeping and do not participate.
impl<S: Symbol> PartialEq for Nfa<S> {
    fn eq(&self, other: &Self) -> bool {
        self.alphabet == other.alphabet
            && self.sigma == other.sigma
            && self.begins == other.begins
            && self.ends == other.ends
            && self.edges.iter().collect::<OrderedSet<_>>()
                == other.edges.iter().collect::<OrderedSet<_>>()
    }
}

impl<S: Symbol> Eq for Nfa<S> {}

impl<S: Symbol> std::fmt::Debug for Nfa<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "begins {} ends {} edges {{{}}}",
            StateId::show_collection(self.begins.iter()),
            StateId::show_collection(self.ends.iter()),
            self.edges
                .iter()
                .map(|e| format!(
                    "({}, {}, {})",
                    e.source.show(),
                    e.label.show(),
                    e.target.show()
                ))
                .join(", ")
        )
    }
}

/// Restartable iterator over the distinct successor states of one state, see
/// [`Nfa::successors`]. Deduplicates by target identity.
pub struct Successors<'a, S: Symbol> {
    nfa: &'a Nfa<S>,
    filter: LabelFilter<S>,
    edges: Option<std::collections::btree_set::Iter<'a, EdgeId>>,
    seen: Set<StateId>,
}

impl<'a, S: Symbol> Iterator for Successors<'a, S> {
    type Item = StateId;

    fn next(&mut self) -> Option<Self::Item> {
        let edges = self.edges.as_mut()?;
        for &id in edges {
            let edge = &self.nfa.edges[id.index()];
            if self.filter.admits(&edge.label) && self.seen.insert(edge.target) {
                return Some(edge.target);
            }
        }
        None
    }
}

/// Restartable iterator over the distinct predecessor states of one state, see
/// [`Nfa::predecessors`].
pub struct Predecessors<'a, S: Symbol> {
    nfa: &'a Nfa<S>,
    filter: LabelFilter<S>,
    edges: Option<std::collections::btree_set::Iter<'a, EdgeId>>,
    seen: Set<StateId>,
}

impl<'a, S: Symbol> Iterator for Predecessors<'a, S> {
    type Item = StateId;

    fn next(&mut self) -> Option<Self::Item> {
        let edges = self.edges.as_mut()?;
        for &id in edges {
            let edge = &self.nfa.edges[id.index()];
            if self.filter.admits(&edge.label) && self.seen.insert(edge.source) {
                return Some(edge.source);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn branching() -> Nfa<char> {
        // two 'a' edges out of 0 plus an epsilon into a small tail
        Nfa::builder()
            .with_edges([(0, 'a', 1), (0, 'a', 2), (2, 'b', 3)])
            .with_epsilon_edges([(1, 2), (3, 0)])
            .with_begins([0])
            .with_ends([3])
            .into_nfa()
    }

    #[test]
    fn successor_queries() {
        let nfa = branching();
        assert_eq!(
            nfa.successors(StateId(0), LabelFilter::Sym('a'))
                .collect::<Vec<_>>(),
            vec![StateId(1), StateId(2)]
        );
        // epsilon successors only show up when asked for explicitly
        assert_eq!(
            nfa.successors(StateId(1), LabelFilter::AnySymbol).count(),
            0
        );
        assert_eq!(
            nfa.successors(StateId(1), LabelFilter::Epsilon)
                .collect::<Vec<_>>(),
            vec![StateId(2)]
        );
        assert_eq!(
            nfa.predecessors(StateId(2), LabelFilter::AnySymbol)
                .collect::<Vec<_>>(),
            vec![StateId(0)]
        );
    }

    #[test]
    fn successors_deduplicate() {
        let mut nfa: Nfa<char> = Nfa::new();
        let q0 = nfa.add_state();
        let q1 = nfa.add_state();
        nfa.connect(q0, q1, Label::Sym('a'));
        nfa.connect(q0, q1, Label::Sym('b'));
        nfa.mark_begin(q0);
        nfa.mark_end(q1);
        assert_eq!(nfa.successors(q0, LabelFilter::AnySymbol).count(), 1);
    }

    #[test]
    fn closure_is_idempotent() {
        let nfa = branching();
        let once = nfa.epsilon_closure([StateId(1), StateId(3)]);
        let twice = nfa.epsilon_closure(once.iter().copied());
        assert_eq!(once, twice);
        assert_eq!(
            once,
            [StateId(0), StateId(1), StateId(2), StateId(3)]
                .into_iter()
                .collect()
        );
    }

    #[test]
    fn determinism_predicate() {
        assert!(crate::tests::ab_nfa().is_deterministic());
        assert!(!branching().is_deterministic());

        let two_begins = Nfa::builder()
            .with_edges([(0, 'a', 2), (1, 'b', 2)])
            .with_begins([0, 1])
            .with_ends([2])
            .into_nfa();
        assert!(!two_begins.is_deterministic());
    }

    #[test]
    fn mirror_swaps_and_reverses() {
        let nfa = crate::tests::ab_nfa();
        let mirrored = nfa.mirror();
        assert_eq!(mirrored.begins(), nfa.ends());
        assert_eq!(mirrored.ends(), nfa.begins());
        assert!(mirrored.accepts("ba".chars()));
        assert!(!mirrored.accepts("ab".chars()));
        assert_eq!(mirrored.mirror(), nfa);
    }

    #[test]
    fn acceptance() {
        let nfa = crate::tests::ab_nfa();
        assert!(nfa.accepts("ab".chars()));
        for rejected in ["", "a", "b", "ba", "abb"] {
            assert!(!nfa.accepts(rejected.chars()), "accepted {:?}", rejected);
        }
    }

    #[test]
    #[should_panic(expected = "not part of the declared alphabet")]
    fn declared_alphabet_is_enforced() {
        let mut nfa = Nfa::with_alphabet(Alphabet::of_size(2));
        let q0 = nfa.add_state();
        let q1 = nfa.add_state();
        nfa.connect(q0, q1, Label::Sym('z'));
    }

    #[test]
    #[should_panic(expected = "exactly one begin state")]
    fn sole_begin_requires_uniqueness() {
        let nfa: Nfa<char> = Nfa::new();
        nfa.sole_begin();
    }

    #[test]
    fn table_lists_all_symbols() {
        let table = crate::tests::ab_nfa().transition_table();
        assert!(table.contains('a') && table.contains('b') && table.contains('ε'));
    }
}
