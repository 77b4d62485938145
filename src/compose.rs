use std::collections::VecDeque;

use itertools::Itertools;

use crate::math::{Map, OrderedSet};
use crate::prelude::*;

impl<S: Symbol> Nfa<S> {
    /// The product of two deterministic automata: states are pairs, and an edge
    /// labeled `(a, b)` exists from `(s, t)` to `(s', t')` precisely when `self`
    /// steps `s → s'` on `a` and `other` steps `t → t'` on `b`. Only pairs reachable
    /// from the joint begin pair are materialized; a pair accepts when both of its
    /// components accept. When both operands declare an alphabet, the result declares
    /// their cartesian product.
    ///
    /// Panics when either operand is not deterministic.
    pub fn product(&self, other: &Self) -> Nfa<(S, S)> {
        assert!(
            self.is_deterministic() && other.is_deterministic(),
            "product requires deterministic operands"
        );
        let mut out: Nfa<(S, S)> = match (self.alphabet(), other.alphabet()) {
            (Some(a), Some(b)) => {
                let theirs: Vec<S> = b.universe().collect();
                Nfa::with_alphabet(a.universe().cartesian_product(theirs).collect())
            }
            _ => Nfa::new(),
        };

        let mut ids: Map<(StateId, StateId), StateId> = Map::default();
        let mut queue: VecDeque<(StateId, StateId)> = VecDeque::new();

        let start = (self.sole_begin(), other.sole_begin());
        let start_id = out.add_state();
        out.mark_begin(start_id);
        if self.ends().contains(&start.0) && other.ends().contains(&start.1) {
            out.mark_end(start_id);
        }
        ids.insert(start, start_id);
        queue.push_back(start);

        while let Some((q1, q2)) = queue.pop_front() {
            let source = ids[&(q1, q2)];
            for (a, p1) in self.transitions_from(q1) {
                for (b, p2) in other.transitions_from(q2) {
                    let target = match ids.get(&(p1, p2)) {
                        Some(&id) => id,
                        None => {
                            let id = out.add_state();
                            if self.ends().contains(&p1) && other.ends().contains(&p2) {
                                out.mark_end(id);
                            }
                            ids.insert((p1, p2), id);
                            queue.push_back((p1, p2));
                            id
                        }
                    };
                    out.connect(source, target, Label::Sym((a, b)));
                }
            }
        }
        out
    }

    /// The synchronized intersection of two deterministic automata: the variant of
    /// [`Nfa::product`] that only keeps transitions where both operands move on the
    /// same symbol, relabeled with that symbol. Accepts exactly the words accepted by
    /// both operands.
    ///
    /// Panics when either operand is not deterministic.
    pub fn inter(&self, other: &Self) -> Self {
        assert!(
            self.is_deterministic() && other.is_deterministic(),
            "intersection requires deterministic operands"
        );
        let mut out = match (self.alphabet(), other.alphabet()) {
            (Some(a), Some(b)) => Nfa::with_alphabet(a.meet(b)),
            _ => Nfa::new(),
        };

        let mut ids: Map<(StateId, StateId), StateId> = Map::default();
        let mut queue: VecDeque<(StateId, StateId)> = VecDeque::new();

        let start = (self.sole_begin(), other.sole_begin());
        let start_id = out.add_state();
        out.mark_begin(start_id);
        if self.ends().contains(&start.0) && other.ends().contains(&start.1) {
            out.mark_end(start_id);
        }
        ids.insert(start, start_id);
        queue.push_back(start);

        while let Some((q1, q2)) = queue.pop_front() {
            let source = ids[&(q1, q2)];
            for (sym, p1) in self.transitions_from(q1) {
                let Some(p2) = other.successor_on(q2, sym) else {
                    continue;
                };
                let target = match ids.get(&(p1, p2)) {
                    Some(&id) => id,
                    None => {
                        let id = out.add_state();
                        if self.ends().contains(&p1) && other.ends().contains(&p2) {
                            out.mark_end(id);
                        }
                        ids.insert((p1, p2), id);
                        queue.push_back((p1, p2));
                        id
                    }
                };
                out.connect(source, target, Label::Sym(sym));
            }
        }
        out
    }

    /// Whether the language of `self` includes the language of `other`, tested by
    /// complementing `self` over the union of both symbol universes and intersecting
    /// with `other`: the containment holds precisely when that difference language is
    /// empty. Both operands are determinized internally, so any automaton may be
    /// passed.
    pub fn contains(&self, other: &Self) -> bool {
        let mine = self.symbol_universe();
        let theirs = other.symbol_universe();
        let universe: OrderedSet<S> = mine.union(&theirs).copied().collect();
        self.det()
            .neg_over(universe)
            .inter(&other.det())
            .is_empty_language()
    }

    /// Whether `self` and `other` accept exactly the same language.
    pub fn equiv(&self, other: &Self) -> bool {
        self.contains(other) && other.contains(self)
    }

    /// Whether no accepting state is reachable from the begin set, i.e. the accepted
    /// language is empty.
    pub fn is_empty_language(&self) -> bool {
        let reachable = self.reachable_states();
        !self.ends().iter().any(|q| reachable.contains(q))
    }

    /// The set of states reachable from the begin set, following edges of every kind
    /// including epsilon.
    pub fn reachable_states(&self) -> OrderedSet<StateId> {
        let mut seen: OrderedSet<StateId> = self.begins.iter().copied().collect();
        let mut queue: VecDeque<StateId> = seen.iter().copied().collect();
        while let Some(q) = queue.pop_front() {
            if let Some(ids) = self.forward.get(&q) {
                for &id in ids {
                    let target = self.edges[id.index()].target;
                    if seen.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
        seen
    }

    /// Restricts the automaton to the given states, keeping only edges whose both
    /// endpoints survive.
    pub(crate) fn restrict_to(&self, keep: &OrderedSet<StateId>) -> Self {
        let mut out = self.empty_like();
        for edge in &self.edges {
            if keep.contains(&edge.source) && keep.contains(&edge.target) {
                out.connect(edge.source, edge.target, edge.label);
            }
        }
        for q in self.begins.iter().copied().filter(|q| keep.contains(q)) {
            out.mark_begin(q);
        }
        for q in self.ends.iter().copied().filter(|q| keep.contains(q)) {
            out.mark_end(q);
        }
        out.next_state = out.next_state.max(self.next_state);
        out
    }

    /// Restricts the automaton to the states reachable from the begin set.
    pub fn reachable(&self) -> Self {
        self.restrict_to(&self.reachable_states())
    }

    /// Restricts the automaton to states that are both reachable from a begin state
    /// and able to reach an end state (reachability on the mirror).
    pub fn trim(&self) -> Self {
        let forward = self.reachable_states();
        let backward = self.mirror().reachable_states();
        let keep: OrderedSet<StateId> = forward.intersection(&backward).copied().collect();
        self.restrict_to(&keep)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::{ab_nfa, accepted_words, ba_nfa};

    fn starts_with_a() -> Nfa<char> {
        Nfa::builder()
            .with_edges([(0, 'a', 1), (1, 'a', 1), (1, 'b', 1)])
            .with_begins([0])
            .with_ends([1])
            .into_nfa()
    }

    fn ends_with_b() -> Nfa<char> {
        Nfa::builder()
            .with_edges([(0, 'a', 0), (0, 'b', 1), (1, 'a', 0), (1, 'b', 1)])
            .with_begins([0])
            .with_ends([1])
            .into_nfa()
    }

    #[test]
    fn intersection_keeps_common_words() {
        let both = starts_with_a().inter(&ends_with_b());
        assert_eq!(
            accepted_words(&both, ['a', 'b'], 3),
            vec!["ab", "aab", "abb"]
        );
    }

    #[test]
    fn intersection_of_disjoint_languages_is_empty() {
        let nothing = ab_nfa().inter(&ba_nfa());
        assert!(nothing.is_empty_language());
    }

    #[test]
    fn product_pairs_states_and_labels() {
        let prod = ab_nfa().product(&ba_nfa());
        assert_eq!(prod.state_count(), 3);
        assert!(prod.accepts([('a', 'b'), ('b', 'a')]));
        assert!(!prod.accepts([('a', 'b')]));
    }

    #[test]
    #[should_panic(expected = "requires deterministic operands")]
    fn product_rejects_nondeterminism() {
        let nfa = Nfa::builder()
            .with_edges([(0, 'a', 1), (0, 'a', 2)])
            .with_begins([0])
            .with_ends([1])
            .into_nfa();
        nfa.product(&ab_nfa());
    }

    #[test]
    fn containment() {
        let a = ab_nfa();
        let b = ba_nfa();
        assert!(a.contains(&a));
        assert!(!a.contains(&b));
        assert!(!b.contains(&a));

        // containment is not symmetric
        let star = a.star();
        assert!(star.contains(&a));
        assert!(!a.contains(&star));
    }

    #[test]
    fn containment_across_alphabets() {
        let just_a = Nfa::builder()
            .with_edges([(0, 'a', 1)])
            .with_begins([0])
            .with_ends([1])
            .into_nfa();
        let just_b = Nfa::builder()
            .with_edges([(0, 'b', 1)])
            .with_begins([0])
            .with_ends([1])
            .into_nfa();
        assert!(!just_a.contains(&just_b));
        assert!(!just_b.contains(&just_a));
    }

    #[test]
    fn equivalence() {
        let a = ab_nfa();
        assert!(a.equiv(&a));
        assert!(a.equiv(&a.min()));
        assert!(!a.equiv(&ba_nfa()));
        assert!(!a.equiv(&a.star()));
    }

    #[test]
    fn emptiness() {
        assert!(!ab_nfa().is_empty_language());
        let unreachable_end = Nfa::builder()
            .with_edges([(0, 'a', 1), (2, 'b', 3)])
            .with_begins([0])
            .with_ends([3])
            .into_nfa();
        assert!(unreachable_end.is_empty_language());
    }

    #[test]
    fn reachability_pruning() {
        // state 2 is a reachable dead end, state 3 is unreachable
        let nfa = Nfa::builder()
            .with_edges([(0, 'a', 1), (1, 'b', 2), (3, 'a', 1)])
            .with_begins([0])
            .with_ends([1])
            .into_nfa();

        let reachable = nfa.reachable();
        assert_eq!(
            reachable.states(),
            [StateId(0), StateId(1), StateId(2)].into_iter().collect()
        );

        let trimmed = nfa.trim();
        assert_eq!(
            trimmed.states(),
            [StateId(0), StateId(1)].into_iter().collect()
        );
        assert_eq!(accepted_words(&trimmed, ['a', 'b'], 2), vec!["a"]);
    }
}
