use std::collections::BTreeSet;
use std::fmt;

use crate::dot;
use crate::{StateID, ALPHABET_LEN, DEAD};

/// A deterministic finite automaton with a dense transition table.
///
/// The transition function is total: every state has an entry for every
/// byte value, and inputs that were never given an explicit transition
/// route to the dead state `0`. This is the representation used both for
/// the automaton produced by subset construction and for its minimized
/// form.
#[derive(Clone)]
pub struct DFA {
    /// The transition table, laid out row-major: the transition for state
    /// `s` on byte `b` is at `s * ALPHABET_LEN + b`.
    trans: Vec<StateID>,
    start: StateID,
    accept: BTreeSet<StateID>,
}

impl DFA {
    /// Create a DFA containing only the dead state.
    pub(crate) fn empty() -> DFA {
        DFA {
            trans: vec![DEAD; ALPHABET_LEN],
            start: DEAD,
            accept: BTreeSet::new(),
        }
    }

    /// Return the total number of states.
    pub fn len(&self) -> usize {
        self.trans.len() / ALPHABET_LEN
    }

    /// Return the start state.
    pub fn start(&self) -> StateID {
        self.start
    }

    /// Returns true if and only if the given state is accepting.
    pub fn is_accept(&self, id: StateID) -> bool {
        self.accept.contains(&id)
    }

    /// Return the state reached from `from` on `byte`.
    pub fn next_state(&self, from: StateID, byte: u8) -> StateID {
        self.trans[from * ALPHABET_LEN + usize::from(byte)]
    }

    /// Return the full transition row of the given state.
    pub(crate) fn row(&self, id: StateID) -> &[StateID] {
        &self.trans[id * ALPHABET_LEN..(id + 1) * ALPHABET_LEN]
    }

    /// Allocate a new state with every transition routed to the dead
    /// state.
    pub(crate) fn add_empty_state(&mut self) -> StateID {
        let id = self.len();
        self.trans.resize(self.trans.len() + ALPHABET_LEN, DEAD);
        id
    }

    pub(crate) fn set_transition(
        &mut self,
        from: StateID,
        byte: u8,
        to: StateID,
    ) {
        self.trans[from * ALPHABET_LEN + usize::from(byte)] = to;
    }

    pub(crate) fn set_start(&mut self, id: StateID) {
        self.start = id;
    }

    pub(crate) fn add_accept(&mut self, id: StateID) {
        self.accept.insert(id);
    }

    /// Return the transition row of the given state as maximal runs of
    /// consecutive bytes sharing a target.
    pub(crate) fn sparse_row(&self, id: StateID) -> Vec<(u8, u8, StateID)> {
        let mut runs = vec![];
        let mut cur: Option<(u8, u8, StateID)> = None;
        for (byte, &next) in self.row(id).iter().enumerate() {
            let byte = byte as u8;
            match cur {
                Some((lo, _, prev)) if prev == next => {
                    cur = Some((lo, byte, prev));
                }
                Some(run) => {
                    runs.push(run);
                    cur = Some((byte, byte, next));
                }
                None => {
                    cur = Some((byte, byte, next));
                }
            }
        }
        if let Some(run) = cur {
            runs.push(run);
        }
        runs
    }

    /// Returns true if and only if the automaton accepts the entire
    /// input.
    ///
    /// This short circuits as soon as the dead state is entered, since no
    /// suffix of the input can then lead to an accepting state.
    pub fn is_match(&self, input: &[u8]) -> bool {
        let mut curr = self.start;
        for &byte in input {
            curr = self.next_state(curr, byte);
            if curr == DEAD {
                return false;
            }
        }
        self.is_accept(curr)
    }
}

impl fmt::Debug for DFA {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "DFA(states: {}, start: {})", self.len(), self.start)?;
        for id in 0..self.len() {
            let mut transitions = vec![];
            for (lo, hi, to) in self.sparse_row(id) {
                if to == DEAD {
                    continue;
                }
                let line = if lo == hi {
                    format!("{} => {}", dot::escape(lo), to)
                } else {
                    format!("{}-{} => {}", dot::escape(lo), dot::escape(hi), to)
                };
                transitions.push(line);
            }
            let marker = if self.is_accept(id) { '*' } else { ' ' };
            writeln!(f, "{}{:04}: {}", marker, id, transitions.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Regex;

    #[test]
    fn transition_function_is_total() {
        let re = Regex::new("(ab|cd)+").unwrap();
        for dfa in [re.dfa(), re.minimized_dfa()] {
            for id in 0..dfa.len() {
                for byte in 0..=255u8 {
                    assert!(dfa.next_state(id, byte) < dfa.len());
                }
            }
        }
    }

    #[test]
    fn dead_state_is_inert() {
        let re = Regex::new("a+b").unwrap();
        for dfa in [re.dfa(), re.minimized_dfa()] {
            assert!(!dfa.is_accept(DEAD));
            assert!(dfa.row(DEAD).iter().all(|&next| next == DEAD));
        }
    }

    #[test]
    fn sparse_row_collapses_consecutive_bytes() {
        let re = Regex::new("[a-c]").unwrap();
        let dfa = re.dfa();
        let runs = dfa.sparse_row(dfa.start());
        let live: Vec<(u8, u8, StateID)> = runs
            .into_iter()
            .filter(|&(_, _, to)| to != DEAD)
            .collect();
        assert_eq!(1, live.len());
        assert_eq!((b'a', b'c'), (live[0].0, live[0].1));
    }
}
