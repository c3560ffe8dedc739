use std::collections::{BTreeMap, BTreeSet};
use std::mem;

use crate::enfa::{EpsilonNFA, EPSILON};
use crate::sparse_set::SparseSet;
use crate::StateID;

#[derive(Clone, Debug, Default)]
struct State {
    trans: BTreeMap<u8, BTreeSet<StateID>>,
}

/// A non-deterministic finite automaton without epsilon transitions.
///
/// An NFA is derived from an [`EpsilonNFA`] by composing every transition
/// through epsilon closures. State indices carry over one-to-one from the
/// source automaton, so state `0` remains the dead state. Instead of a
/// single exit, the NFA has a set of accepting states: every state whose
/// epsilon closure contained the source automaton's exit.
#[derive(Clone, Debug)]
pub struct NFA {
    states: Vec<State>,
    start: StateID,
    accept: BTreeSet<StateID>,
}

impl NFA {
    /// Eliminate epsilon transitions from the given automaton.
    ///
    /// For every state `q` and byte `b`, the derived transition set is
    /// the union of `closure(r)` over every `r` reachable by a `b` edge
    /// from any state in `closure(q)`.
    pub(crate) fn from_epsilon(enfa: &EpsilonNFA) -> NFA {
        let len = enfa.len();

        let mut closures: Vec<Vec<StateID>> = Vec::with_capacity(len);
        let mut scratch = SparseSet::new(len);
        for id in 0..len {
            scratch.clear();
            enfa.epsilon_closure(id, &mut scratch);
            let mut closure: Vec<StateID> = scratch.iter().copied().collect();
            closure.sort_unstable();
            closures.push(closure);
        }

        let mut states = vec![State::default(); len];
        for id in 0..len {
            for &p in &closures[id] {
                for (label, targets) in enfa.transitions(p) {
                    if label == EPSILON {
                        continue;
                    }
                    let entry =
                        states[id].trans.entry(label as u8).or_default();
                    for &r in targets {
                        entry.extend(closures[r].iter().copied());
                    }
                }
            }
        }

        let accept = (0..len)
            .filter(|&id| closures[id].binary_search(&enfa.end()).is_ok())
            .collect();
        NFA { states, start: enfa.start(), accept }
    }

    /// Return the total number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Return the start state.
    pub fn start(&self) -> StateID {
        self.start
    }

    /// Returns true if and only if the given state is accepting.
    pub fn is_accept(&self, id: StateID) -> bool {
        self.accept.contains(&id)
    }

    pub(crate) fn targets(
        &self,
        id: StateID,
        byte: u8,
    ) -> Option<&BTreeSet<StateID>> {
        self.states[id].trans.get(&byte)
    }

    /// Return all transitions out of the given state, in ascending byte
    /// order.
    pub(crate) fn transitions(
        &self,
        id: StateID,
    ) -> impl Iterator<Item = (u8, &BTreeSet<StateID>)> {
        self.states[id].trans.iter().map(|(&byte, targets)| (byte, targets))
    }

    /// Returns true if and only if the automaton accepts the entire
    /// input.
    pub fn is_match(&self, input: &[u8]) -> bool {
        let mut curr = SparseSet::new(self.len());
        let mut next = SparseSet::new(self.len());
        curr.insert(self.start);
        for &byte in input {
            next.clear();
            for &id in curr.iter() {
                if let Some(targets) = self.targets(id, byte) {
                    for &to in targets {
                        next.insert(to);
                    }
                }
            }
            mem::swap(&mut curr, &mut next);
        }
        curr.iter().any(|&id| self.accept.contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn compile(pattern: &str) -> NFA {
        NFA::from_epsilon(&parser::parse(pattern).unwrap())
    }

    #[test]
    fn accepts_like_the_source_automaton() {
        let nfa = compile("(a|b)*abb");
        assert!(nfa.is_match(b"abb"));
        assert!(nfa.is_match(b"aababb"));
        assert!(!nfa.is_match(b"ab"));
        assert!(!nfa.is_match(b"abbc"));
    }

    #[test]
    fn start_state_accepts_when_empty_input_matches() {
        let nfa = compile("a*");
        assert!(nfa.is_accept(nfa.start()));
        assert!(nfa.is_match(b""));

        let nfa = compile("a");
        assert!(!nfa.is_accept(nfa.start()));
        assert!(!nfa.is_match(b""));
    }

    #[test]
    fn dead_state_is_preserved_and_inert() {
        let nfa = compile("ab");
        assert!(!nfa.is_accept(0));
        assert_eq!(0, nfa.transitions(0).count());
    }
}
