use std::collections::VecDeque;

use tracing::trace;

use crate::math::{Map, OrderedSet};
use crate::prelude::*;

impl<S: Symbol> Nfa<S> {
    /// Determinization by subset construction.
    ///
    /// Each state of the result stands for the set of operand states reachable after
    /// consuming some prefix; the initial state is the epsilon closure of the begin
    /// set and from a subset the `sym`-successor is the epsilon closure of the union
    /// of all `sym`-successors of its members. Only subsets reachable from the
    /// initial one are materialized, so the result is already pruned. A subset is
    /// accepting when it intersects the operand's end set.
    ///
    /// When the operand is already deterministic this short-circuits to a structural
    /// copy.
    pub fn det(&self) -> Self {
        if self.is_deterministic() {
            return self.clone();
        }

        let mut out = self.empty_like();
        let mut ids: Map<OrderedSet<StateId>, StateId> = Map::default();
        let mut queue: VecDeque<OrderedSet<StateId>> = VecDeque::new();

        let initial = self.epsilon_closure(self.begins().iter().copied());
        let initial_id = out.add_state();
        out.mark_begin(initial_id);
        if initial.iter().any(|q| self.ends().contains(q)) {
            out.mark_end(initial_id);
        }
        ids.insert(initial.clone(), initial_id);
        queue.push_back(initial);

        while let Some(subset) = queue.pop_front() {
            let source = ids[&subset];
            for &sym in self.sigma() {
                let mut step = OrderedSet::new();
                for &q in &subset {
                    step.extend(self.successors(q, LabelFilter::Sym(sym)));
                }
                if step.is_empty() {
                    continue;
                }
                let next = self.epsilon_closure(step);
                let target = match ids.get(&next) {
                    Some(&id) => id,
                    None => {
                        let id = out.add_state();
                        if next.iter().any(|q| self.ends().contains(q)) {
                            out.mark_end(id);
                        }
                        trace!(
                            "subset {} becomes state {}",
                            StateId::show_collection(next.iter()),
                            id.show()
                        );
                        ids.insert(next.clone(), id);
                        queue.push_back(next);
                        id
                    }
                };
                out.connect(source, target, Label::Sym(sym));
            }
        }
        out
    }

    /// Minimization by double reversal: mirror, determinize, mirror, determinize.
    /// Two applications of reverse-then-determinize yield the minimal deterministic
    /// automaton for the original language; there is no separate partition
    /// refinement step. The operand is trimmed first so that the intermediate
    /// automaton is accessible even when the first determinization short-circuits.
    pub fn min(&self) -> Self {
        self.trim().mirror().det().mirror().det()
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::{ab_nfa, accepted_words};

    lazy_static::lazy_static! {
        /// Accepts words over {a, b} whose second to last symbol is 'a'.
        static ref SECOND_TO_LAST_A: Nfa<char> = Nfa::builder()
            .with_alphabet(['a', 'b'])
            .with_edges([
                (0, 'a', 0),
                (0, 'b', 0),
                (0, 'a', 1),
                (1, 'a', 2),
                (1, 'b', 2),
            ])
            .with_begins([0])
            .with_ends([2])
            .into_nfa();
    }

    #[test]
    fn det_of_deterministic_is_a_copy() {
        let a = ab_nfa();
        assert_eq!(a.det(), a);
    }

    #[test_log::test]
    fn subset_construction_is_sound() {
        let dfa = SECOND_TO_LAST_A.det();
        assert!(dfa.is_deterministic());
        for word in LengthLexWords::new(['a', 'b']).take_while(|w| w.len() <= 6) {
            assert_eq!(
                SECOND_TO_LAST_A.accepts(word.iter().copied()),
                dfa.accepts(word.iter().copied()),
                "disagreement on {:?}",
                word.show()
            );
        }
    }

    #[test]
    fn det_removes_epsilon_edges() {
        let star = ab_nfa().star();
        let dfa = star.det();
        assert!(dfa.edges().all(|e| !e.label.is_epsilon()));
        assert_eq!(
            accepted_words(&dfa, ['a', 'b'], 4),
            accepted_words(&star, ['a', 'b'], 4)
        );
    }

    #[test_log::test]
    fn minimization_preserves_the_language() {
        let min = SECOND_TO_LAST_A.min();
        assert!(min.is_deterministic());
        assert_eq!(
            accepted_words(&min, ['a', 'b'], 6),
            accepted_words(&SECOND_TO_LAST_A, ['a', 'b'], 6)
        );
    }

    #[test]
    fn minimization_is_idempotent() {
        let min = SECOND_TO_LAST_A.min();
        assert_eq!(
            min.min().rename(RenamePolicy::Offset(0)),
            min.rename(RenamePolicy::Offset(0))
        );
    }

    #[test]
    fn minimization_collapses_redundant_states() {
        // two equivalent accepting tails that a minimal automaton merges
        let bloated = Nfa::builder()
            .with_alphabet(['a', 'b'])
            .with_edges([(0, 'a', 1), (0, 'b', 2), (1, 'a', 3), (2, 'a', 4)])
            .with_begins([0])
            .with_ends([3, 4])
            .into_nfa();
        let min = bloated.min();
        assert!(min.state_count() < bloated.state_count());
        assert_eq!(
            accepted_words(&min, ['a', 'b'], 3),
            accepted_words(&bloated, ['a', 'b'], 3)
        );
    }
}
