use std::collections::VecDeque;

use crate::math::{Bijection, OrderedMap, OrderedSet, Set};
use crate::prelude::*;

/// Policy choosing the fresh identifier every state is replaced with during
/// [`Nfa::rename`]. The traversal order that the policies number states in is fixed:
/// breadth first from the begin set, followed by the unreachable states in sorted
/// order, so renaming is deterministic.
#[derive(Debug, Clone)]
pub enum RenamePolicy {
    /// Consecutive integers starting at the given value.
    Offset(u32),
    /// Identifiers minted past everything the renamed automaton already uses, which
    /// guarantees the result is state-disjoint from the operand.
    Fresh,
    /// Consecutive integers from zero, skipping the given identifiers. Useful to make
    /// an automaton disjoint from another one's state set.
    Avoid(OrderedSet<StateId>),
    /// A caller-supplied mapping; it must cover every state and be injective.
    Explicit(OrderedMap<StateId, StateId>),
}

/// Flat, order-independent view of a determinized automaton: the shape consumed by
/// the downstream constraint solver. The state identifiers are consecutive integers
/// starting at zero, there is exactly one begin state and no edge carries epsilon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatFsa<S: Symbol> {
    /// The unique initial state.
    pub begin: StateId,
    /// The accepting states, duplicate-free.
    pub ends: Vec<StateId>,
    /// All transitions as `(source, target, symbol)` triples, duplicate-free.
    pub edges: Vec<(StateId, StateId, S)>,
}

impl<S: Symbol> Nfa<S> {
    /// The order in which renaming assigns identifiers: breadth first from the begin
    /// set following edges of every kind, then whatever was not reached, sorted.
    fn bfs_order(&self) -> Vec<StateId> {
        let mut order = Vec::new();
        let mut seen: Set<StateId> = Set::default();
        let mut queue: VecDeque<StateId> = VecDeque::new();
        for &q in self.begins() {
            if seen.insert(q) {
                queue.push_back(q);
            }
        }
        while let Some(q) = queue.pop_front() {
            order.push(q);
            if let Some(ids) = self.forward.get(&q) {
                for &id in ids {
                    let target = self.edges[id.index()].target;
                    if seen.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
        for q in self.states() {
            if seen.insert(q) {
                order.push(q);
            }
        }
        order
    }

    /// Replaces every state identifier with a fresh one chosen by `policy`,
    /// see [`RenamePolicy`]. Returns the renamed automaton.
    pub fn rename(&self, policy: RenamePolicy) -> Self {
        self.rename_with_bijection(policy).0
    }

    /// Like [`Nfa::rename`], but additionally returns the bijection between old and
    /// new state identifiers.
    pub fn rename_with_bijection(&self, policy: RenamePolicy) -> (Self, Bijection<StateId, StateId>) {
        let order = self.bfs_order();
        let mut map = Bijection::new();
        match policy {
            RenamePolicy::Offset(start) => {
                for (i, &q) in order.iter().enumerate() {
                    map.insert(q, StateId(start + i as u32));
                }
            }
            RenamePolicy::Fresh => {
                for (i, &q) in order.iter().enumerate() {
                    map.insert(q, StateId(self.next_state + i as u32));
                }
            }
            RenamePolicy::Avoid(avoid) => {
                let mut next = 0u32;
                for &q in &order {
                    while avoid.contains(&StateId(next)) {
                        next += 1;
                    }
                    map.insert(q, StateId(next));
                    next += 1;
                }
            }
            RenamePolicy::Explicit(assignment) => {
                for &q in &order {
                    let target = *assignment
                        .get(&q)
                        .expect("explicit renaming must cover every state");
                    map.insert_no_overwrite(q, target)
                        .expect("explicit renaming must be injective");
                }
            }
        }

        let mut out = self.empty_like();
        let renamed = |q: &StateId| -> StateId {
            *map.get_by_left(q).expect("every state was assigned a name")
        };
        for edge in &self.edges {
            out.connect(renamed(&edge.source), renamed(&edge.target), edge.label);
        }
        for q in self.begins() {
            out.mark_begin(renamed(q));
        }
        for q in self.ends() {
            out.mark_end(renamed(q));
        }
        (out, map)
    }

    /// Produces the flat export triple for the downstream solver.
    ///
    /// With `minimize` set the automaton is minimized first; otherwise it is trimmed
    /// and determinized. Either way the result is canonically renamed to consecutive
    /// integers starting at zero, has exactly one begin state and carries no epsilon
    /// edges.
    pub fn export(&self, minimize: bool) -> FlatFsa<S> {
        let canonical = if minimize {
            self.min()
        } else {
            self.trim().det()
        }
        .rename(RenamePolicy::Offset(0));

        FlatFsa {
            begin: canonical.sole_begin(),
            ends: canonical.ends().iter().copied().collect(),
            edges: canonical
                .edges()
                .map(|e| {
                    let sym = e
                        .label
                        .symbol()
                        .expect("determinized automaton carries no epsilon edges");
                    (e.source, e.target, sym)
                })
                .collect(),
        }
    }
}
