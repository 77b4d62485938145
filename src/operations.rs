use bit_set::BitSet;
use tracing::trace;

use crate::math::OrderedSet;
use crate::prelude::*;

/// Construction operators. Every operator borrows its operand(s), never mutates them
/// and returns a freshly built automaton.
impl<S: Symbol> Nfa<S> {
    /// The automaton accepting exactly the empty word: one begin and one end state
    /// joined by a single epsilon edge.
    pub fn epsilon() -> Self {
        Nfa::new().epsilon_like()
    }

    /// Like [`Nfa::epsilon`], but carrying over the declared alphabet of `self`.
    fn epsilon_like(&self) -> Self {
        let mut out = self.empty_like();
        let begin = out.add_state();
        let end = out.add_state();
        out.connect(begin, end, Label::Epsilon);
        out.mark_begin(begin);
        out.mark_end(end);
        out
    }

    /// Returns a copy of `self` with one fresh begin state that reaches all prior
    /// begin states through epsilon edges, collapsing a multi-entry automaton into
    /// single-entry form.
    pub fn add_begin(&self) -> Self {
        let mut out = self.clone();
        let fresh = out.add_state();
        for &q in self.begins() {
            out.connect(fresh, q, Label::Epsilon);
        }
        out.begins.clear();
        out.mark_begin(fresh);
        out
    }

    /// Returns a copy of `self` with one fresh end state reached from all prior end
    /// states through epsilon edges, collapsing a multi-exit automaton into
    /// single-exit form.
    pub fn add_end(&self) -> Self {
        let mut out = self.clone();
        let fresh = out.add_state();
        for &q in self.ends() {
            out.connect(q, fresh, Label::Epsilon);
        }
        out.ends.clear();
        out.mark_end(fresh);
        out
    }

    /// Applies both [`Nfa::add_begin`] and [`Nfa::add_end`].
    pub fn add_extremities(&self) -> Self {
        self.add_begin().add_end()
    }

    /// Checks the disjointness precondition of [`Nfa::union`] and [`Nfa::concat`] and
    /// prepares an empty result automaton with the merged declared alphabet.
    fn merged_shell(&self, other: &Self) -> Self {
        assert!(
            self.states().is_disjoint(&other.states()),
            "state sets of the operands must be disjoint, rename one of them first"
        );
        match (self.alphabet(), other.alphabet()) {
            (Some(a), Some(b)) => Nfa::with_alphabet(a.merge(b)),
            _ => Nfa::new(),
        }
    }

    /// The union of two automata over disjoint state sets: the result simply merges
    /// edges, begin and end states. Panics when the state sets intersect; callers
    /// needing automatic disjointness rename one operand first.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.merged_shell(other);
        for edge in self.edges().chain(other.edges()) {
            out.connect(edge.source, edge.target, edge.label);
        }
        for &q in self.begins().iter().chain(other.begins()) {
            out.mark_begin(q);
        }
        for &q in self.ends().iter().chain(other.ends()) {
            out.mark_end(q);
        }
        out
    }

    /// The concatenation of two automata over disjoint state sets: every end state of
    /// `self` is joined to every begin state of `other` by an epsilon edge. Panics
    /// when the state sets intersect.
    pub fn concat(&self, other: &Self) -> Self {
        let mut out = self.merged_shell(other);
        for edge in self.edges().chain(other.edges()) {
            out.connect(edge.source, edge.target, edge.label);
        }
        for &end in self.ends() {
            for &begin in other.begins() {
                out.connect(end, begin, Label::Epsilon);
            }
        }
        for &q in self.begins() {
            out.mark_begin(q);
        }
        for &q in other.ends() {
            out.mark_end(q);
        }
        out
    }

    /// The optional form accepting `L ∪ {ε}`: single-entry/exit with an epsilon
    /// shortcut from begin to end.
    pub fn opt(&self) -> Self {
        let mut out = self.add_extremities();
        let (begin, end) = (out.sole_begin(), out.sole_end());
        out.connect(begin, end, Label::Epsilon);
        out
    }

    /// The Kleene closure accepting `L*`: single-entry/exit with epsilon edges in both
    /// directions between begin and end, allowing zero or more repetitions.
    pub fn star(&self) -> Self {
        let mut out = self.add_extremities();
        let (begin, end) = (out.sole_begin(), out.sole_end());
        out.connect(begin, end, Label::Epsilon);
        out.connect(end, begin, Label::Epsilon);
        out
    }

    /// The one-or-more form accepting `L⁺`: single-entry/exit with an epsilon edge
    /// from end back to begin only, forcing at least one repetition.
    pub fn plus(&self) -> Self {
        let mut out = self.add_extremities();
        let (begin, end) = (out.sole_begin(), out.sole_end());
        out.connect(end, begin, Label::Epsilon);
        out
    }

    /// Bounded or unbounded repetition: `min` mandatory copies followed by a
    /// [`Nfa::plus`] tail when `max` is `None`, or by `max - min` optional copies
    /// otherwise. The copies are renamed internally, so no disjointness precondition
    /// applies. Panics when `max < min`.
    pub fn repeat(&self, min: usize, max: Option<usize>) -> Self {
        if let Some(max) = max {
            assert!(
                min <= max,
                "repeat upper bound {} must not be smaller than lower bound {}",
                max,
                min
            );
        }
        match (min, max) {
            (0, None) => self.star(),
            (0, Some(0)) => self.epsilon_like(),
            (min, max) => {
                let mut pieces: Vec<Nfa<S>> = Vec::new();
                match max {
                    None => {
                        for _ in 1..min {
                            pieces.push(self.clone());
                        }
                        pieces.push(self.plus());
                    }
                    Some(max) => {
                        for _ in 0..min {
                            pieces.push(self.clone());
                        }
                        for _ in min..max {
                            pieces.push(self.opt());
                        }
                    }
                }
                let mut it = pieces.into_iter();
                let mut result = it.next().expect("bounds leave at least one piece");
                for piece in it {
                    let disjoint = piece.rename(RenamePolicy::Offset(result.next_state));
                    result = result.concat(&disjoint);
                }
                result
            }
        }
    }

    /// Completes a deterministic automaton over its own [`Nfa::symbol_universe`],
    /// see [`Nfa::complete_over`].
    pub fn complete(&self) -> Self {
        self.complete_over(self.symbol_universe())
    }

    /// Completes a deterministic automaton over the given symbols: one fresh sink
    /// state with self loops for every symbol is added and every missing
    /// `(state, symbol)` transition is redirected to it. Returns an unchanged copy
    /// when the automaton is already complete.
    ///
    /// Panics when the operand is not deterministic or when the given symbols do not
    /// cover every symbol the automaton already uses.
    pub fn complete_over<I: IntoIterator<Item = S>>(&self, symbols: I) -> Self {
        assert!(
            self.is_deterministic(),
            "completion requires a deterministic operand"
        );
        let universe: OrderedSet<S> = symbols.into_iter().collect();
        assert!(
            universe.is_superset(self.sigma()),
            "completion alphabet must cover every used symbol"
        );

        let mut out = self.clone();
        if let Some(alphabet) = &mut out.alphabet {
            alphabet.extend(universe.iter().copied());
        }
        if out.is_complete_over(&universe) {
            return out;
        }

        let index: Vec<S> = universe.iter().copied().collect();
        let sink = out.add_state();
        trace!("completing with sink state {}", sink.show());
        for &sym in &index {
            out.connect(sink, sink, Label::Sym(sym));
        }
        let mut seen = BitSet::with_capacity(index.len());
        for q in self.states() {
            seen.clear();
            for (sym, _) in self.transitions_from(q) {
                seen.insert(index.binary_search(&sym).expect("universe covers sigma"));
            }
            for missing in (0..index.len()).filter(|i| !seen.contains(*i)) {
                out.connect(q, sink, Label::Sym(index[missing]));
            }
        }
        out
    }

    /// The complement over the automaton's own [`Nfa::symbol_universe`], see
    /// [`Nfa::neg_over`].
    pub fn neg(&self) -> Self {
        self.neg_over(self.symbol_universe())
    }

    /// The complement over the given symbols: completes the automaton, then flips the
    /// accepting status of every state. The operand must be deterministic; starting
    /// from a nondeterministic automaton callers determinize first.
    pub fn neg_over<I: IntoIterator<Item = S>>(&self, symbols: I) -> Self {
        let mut out = self.complete_over(symbols);
        let flipped: OrderedSet<StateId> = out.states().difference(&out.ends).copied().collect();
        out.ends = flipped;
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::{ab_nfa, accepted_words, ba_nfa};

    #[test]
    fn union_of_disjoint_languages() {
        let a = ab_nfa();
        let b = ba_nfa().rename(RenamePolicy::Offset(3));
        let both = a.union(&b);
        assert_eq!(accepted_words(&both, ['a', 'b'], 4), vec!["ab", "ba"]);
    }

    #[test]
    #[should_panic(expected = "must be disjoint")]
    fn union_rejects_overlapping_states() {
        let a = ab_nfa();
        a.union(&ab_nfa());
    }

    #[test]
    fn concat_joins_languages() {
        let a = ab_nfa();
        let b = ba_nfa().rename(RenamePolicy::Offset(3));
        assert_eq!(accepted_words(&a.concat(&b), ['a', 'b'], 5), vec!["abba"]);
    }

    #[test]
    fn opt_admits_the_empty_word() {
        assert_eq!(accepted_words(&ab_nfa().opt(), ['a', 'b'], 3), vec!["", "ab"]);
    }

    #[test]
    fn star_iterates() {
        let star = ab_nfa().star();
        assert_eq!(accepted_words(&star, ['a', 'b'], 4), vec!["", "ab", "abab"]);
        assert!(!star.accepts("a".chars()));
        assert!(!star.accepts("aab".chars()));
    }

    #[test]
    fn plus_forces_one_repetition() {
        let plus = ab_nfa().plus();
        assert!(!plus.accepts("".chars()));
        assert_eq!(accepted_words(&plus, ['a', 'b'], 4), vec!["ab", "abab"]);
    }

    #[test]
    fn bounded_repeat() {
        let single = Nfa::builder()
            .with_edges([(0, 'a', 1)])
            .with_begins([0])
            .with_ends([1])
            .into_nfa();
        assert_eq!(
            accepted_words(&single.repeat(2, Some(3)), ['a'], 4),
            vec!["aa", "aaa"]
        );
    }

    #[test]
    fn unbounded_repeat() {
        let single = Nfa::builder()
            .with_edges([(0, 'a', 1)])
            .with_begins([0])
            .with_ends([1])
            .into_nfa();
        assert_eq!(
            accepted_words(&single.repeat(2, None), ['a'], 4),
            vec!["aa", "aaa", "aaaa"]
        );
    }

    #[test]
    fn zero_repeat_is_the_empty_word() {
        assert_eq!(accepted_words(&ab_nfa().repeat(0, Some(0)), ['a', 'b'], 2), vec![""]);
    }

    #[test]
    #[should_panic(expected = "must not be smaller")]
    fn repeat_rejects_crossed_bounds() {
        ab_nfa().repeat(3, Some(2));
    }

    #[test]
    fn epsilon_accepts_only_the_empty_word() {
        assert_eq!(accepted_words(&Nfa::epsilon(), ['a', 'b'], 2), vec![""]);
    }

    #[test]
    fn completion_adds_a_sink() {
        let complete = ab_nfa().complete();
        assert!(complete.is_complete());
        assert_eq!(complete.state_count(), 4);
        // completing a complete automaton changes nothing
        assert_eq!(complete.complete(), complete);
    }

    #[test]
    #[should_panic(expected = "requires a deterministic operand")]
    fn completion_rejects_nondeterminism() {
        let nfa = Nfa::builder()
            .with_edges([(0, 'a', 1), (0, 'a', 2)])
            .with_begins([0])
            .with_ends([1])
            .into_nfa();
        nfa.complete();
    }

    #[test]
    fn negation_flips_the_language() {
        let neg = ab_nfa().neg();
        assert_eq!(
            accepted_words(&neg, ['a', 'b'], 2),
            vec!["", "a", "b", "aa", "ba", "bb"]
        );
        assert!(neg.accepts("ba".chars()));
        assert!(!neg.accepts("ab".chars()));
    }

    #[test]
    fn double_negation_restores_the_language() {
        let a = ab_nfa();
        assert_eq!(
            accepted_words(&a.neg().neg(), ['a', 'b'], 4),
            accepted_words(&a, ['a', 'b'], 4)
        );
    }

    #[test]
    fn extremities_preserve_the_language() {
        let framed = ab_nfa().add_extremities();
        framed.sole_begin();
        framed.sole_end();
        assert_eq!(accepted_words(&framed, ['a', 'b'], 3), vec!["ab"]);
    }
}
