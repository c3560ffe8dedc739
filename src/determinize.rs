use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::dfa::DFA;
use crate::nfa::NFA;
use crate::{StateID, DEAD};

/// Converts an NFA into a DFA via subset construction.
///
/// Each DFA state stands for a set of NFA states. Sets are kept as sorted
/// vectors so that two subsets built in different orders still map to the
/// same DFA state. The empty subset is the pre-allocated dead state `0`;
/// transitions that would lead to it are simply left routed there.
pub(crate) struct Determinizer<'a> {
    nfa: &'a NFA,
    dfa: DFA,
    /// Maps each ordered set of NFA states to its DFA state.
    cache: HashMap<Vec<StateID>, StateID>,
}

impl<'a> Determinizer<'a> {
    pub(crate) fn new(nfa: &'a NFA) -> Determinizer<'a> {
        let mut cache = HashMap::new();
        cache.insert(vec![], DEAD);
        Determinizer { nfa, dfa: DFA::empty(), cache }
    }

    pub(crate) fn build(mut self) -> DFA {
        // The start subset is just the NFA start state; epsilon closures
        // were already folded into the transitions when the NFA was
        // derived.
        let start_set = vec![self.nfa.start()];
        let start_id = self.add_state(start_set.clone());
        self.dfa.set_start(start_id);

        let mut uncompiled = vec![(start_id, start_set)];
        while let Some((dfa_id, set)) = uncompiled.pop() {
            for byte in 0..=255u8 {
                let next = self.next_set(&set, byte);
                if next.is_empty() {
                    continue;
                }
                let next_id = match self.cache.get(&next).copied() {
                    Some(id) => id,
                    None => {
                        let id = self.add_state(next.clone());
                        uncompiled.push((id, next));
                        id
                    }
                };
                self.dfa.set_transition(dfa_id, byte, next_id);
            }
        }

        debug!(
            "subset construction: {} NFA states into {} DFA states",
            self.nfa.len(),
            self.dfa.len(),
        );
        self.dfa
    }

    /// The set of NFA states reachable from any state in `set` on `byte`,
    /// in sorted order.
    fn next_set(&self, set: &[StateID], byte: u8) -> Vec<StateID> {
        let mut next = BTreeSet::new();
        for &id in set {
            if let Some(targets) = self.nfa.targets(id, byte) {
                next.extend(targets.iter().copied());
            }
        }
        next.into_iter().collect()
    }

    fn add_state(&mut self, set: Vec<StateID>) -> StateID {
        let id = self.dfa.add_empty_state();
        if set.iter().any(|&q| self.nfa.is_accept(q)) {
            self.dfa.add_accept(id);
        }
        self.cache.insert(set, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::NFA;
    use crate::parser;

    fn compile(pattern: &str) -> DFA {
        let enfa = parser::parse(pattern).unwrap();
        Determinizer::new(&NFA::from_epsilon(&enfa)).build()
    }

    #[test]
    fn accepts_like_the_source_nfa() {
        let dfa = compile("([hc]at)?[mp]at");
        assert!(dfa.is_match(b"mat"));
        assert!(dfa.is_match(b"catmat"));
        assert!(!dfa.is_match(b"hat"));
        assert!(!dfa.is_match(b"catcat"));
    }

    #[test]
    fn identical_subsets_share_a_state() {
        // Both branches lead through identical subsets, so the redundant
        // alternation must not double the state count.
        let once = compile("ab");
        let twice = compile("ab|ab");
        // The duplicated branch adds NFA states, but the subsets reached
        // after each input byte collapse: at most one extra state for the
        // distinct start subset.
        assert!(twice.len() <= once.len() + 1);
    }

    #[test]
    fn start_state_is_first_allocated() {
        let dfa = compile("xyz");
        assert_eq!(1, dfa.start());
        assert!(!dfa.is_accept(DEAD));
    }
}
