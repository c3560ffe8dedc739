use std::collections::BTreeMap;

use log::debug;

use crate::dfa::DFA;
use crate::{StateID, DEAD};

/// Builds the minimal DFA equivalent to a given DFA, by partition
/// refinement.
///
/// Minimization runs in three phases. First, states unreachable from the
/// start are discarded. Second, dead states (those from which no
/// accepting state can be reached) are folded into the reserved dead
/// state `0`. Third, the remaining states are partitioned into
/// {accepting} and {non-accepting} classes and the partition is refined:
/// a class splits whenever two of its members disagree, for some input
/// byte, on the class of their successor. The scan over input bytes
/// restarts after every split and minimization finishes once a full scan
/// leaves the partition unchanged.
pub(crate) struct Minimizer<'a> {
    dfa: &'a DFA,
}

impl<'a> Minimizer<'a> {
    pub(crate) fn new(dfa: &'a DFA) -> Minimizer<'a> {
        Minimizer { dfa }
    }

    pub(crate) fn build(self) -> DFA {
        let reachable = self.reachable();
        let live = self.live(&reachable);

        // classes[id] is the partition class of each state; None excludes
        // unreachable states from the automaton entirely. Class 0 is the
        // dead class.
        let mut classes: Vec<Option<usize>> = (0..self.dfa.len())
            .map(|id| {
                if id == DEAD {
                    Some(0)
                } else if !reachable[id] {
                    None
                } else if !live[id] {
                    Some(0)
                } else if self.dfa.is_accept(id) {
                    Some(1)
                } else {
                    Some(2)
                }
            })
            .collect();

        loop {
            let mut changed = false;
            for byte in 0..=255u8 {
                let refined = self.refine(&classes, byte);
                if refined != classes {
                    classes = refined;
                    changed = true;
                    break;
                }
            }
            if !changed {
                break;
            }
        }

        self.assemble(&classes)
    }

    /// Regroup all states by the pair (own class, class of the successor
    /// on `byte`) and renumber the groups. When no class splits under
    /// `byte`, the renumbering reproduces the input exactly: each class
    /// maps to a single pair and the pairs sort by the class number.
    fn refine(
        &self,
        classes: &[Option<usize>],
        byte: u8,
    ) -> Vec<Option<usize>> {
        let mut groups: BTreeMap<(usize, usize), Vec<StateID>> =
            BTreeMap::new();
        for id in 0..self.dfa.len() {
            let class = match classes[id] {
                Some(class) => class,
                None => continue,
            };
            let next = self.dfa.next_state(id, byte);
            let next_class = classes[next].unwrap_or(0);
            groups.entry((class, next_class)).or_default().push(id);
        }

        let mut refined = vec![None; self.dfa.len()];
        for (number, states) in groups.values().enumerate() {
            for &id in states {
                refined[id] = Some(number);
            }
        }
        refined
    }

    /// The states reachable from the start by any input.
    fn reachable(&self) -> Vec<bool> {
        let mut seen = vec![false; self.dfa.len()];
        seen[self.dfa.start()] = true;
        let mut stack = vec![self.dfa.start()];
        while let Some(id) = stack.pop() {
            for &next in self.dfa.row(id) {
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        seen
    }

    /// The states from which some accepting state is reachable, computed
    /// as reverse reachability from the accepting states.
    fn live(&self, reachable: &[bool]) -> Vec<bool> {
        let mut incoming: Vec<Vec<StateID>> = vec![vec![]; self.dfa.len()];
        for id in 0..self.dfa.len() {
            if !reachable[id] {
                continue;
            }
            for &next in self.dfa.row(id) {
                incoming[next].push(id);
            }
        }

        let mut live = vec![false; self.dfa.len()];
        let mut stack: Vec<StateID> = (0..self.dfa.len())
            .filter(|&id| reachable[id] && self.dfa.is_accept(id))
            .collect();
        for &id in &stack {
            live[id] = true;
        }
        while let Some(id) = stack.pop() {
            for &prev in &incoming[id] {
                if !live[prev] {
                    live[prev] = true;
                    stack.push(prev);
                }
            }
        }
        live
    }

    /// Build the minimized DFA: one state per class, with transitions,
    /// start and acceptance carried over through the class mapping.
    fn assemble(&self, classes: &[Option<usize>]) -> DFA {
        let count = classes
            .iter()
            .flatten()
            .copied()
            .max()
            .map_or(1, |max| max + 1);

        let mut min = DFA::empty();
        while min.len() < count {
            min.add_empty_state();
        }

        for id in 0..self.dfa.len() {
            let class = match classes[id] {
                Some(class) => class,
                None => continue,
            };
            if class != DEAD {
                for byte in 0..=255u8 {
                    let next = self.dfa.next_state(id, byte);
                    let next_class = classes[next].unwrap_or(DEAD);
                    if next_class != DEAD {
                        min.set_transition(class, byte, next_class);
                    }
                }
                if id == self.dfa.start() {
                    min.set_start(class);
                }
            }
            if self.dfa.is_accept(id) {
                min.add_accept(class);
            }
        }

        debug!(
            "minimization: {} DFA states into {} states",
            self.dfa.len(),
            min.len(),
        );
        min
    }
}

#[cfg(test)]
mod tests {
    use crate::Regex;

    #[test]
    fn never_grows_the_automaton() {
        let patterns = [
            "a",
            "a*",
            "(a|b)*abb",
            "([hc]at)?[mp]at",
            r"[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?",
            "(a|b){2,4}",
        ];
        for pattern in patterns {
            let re = Regex::new(pattern).unwrap();
            assert!(
                re.minimized_dfa().len() <= re.dfa().len(),
                "minimization grew the automaton for {:?}",
                pattern,
            );
        }
    }

    #[test]
    fn collapses_equivalent_states() {
        // All three branches are the same language, so the minimal
        // automaton is the one for a single `a`: dead state, start state
        // and accepting state.
        let re = Regex::new("a|a|a").unwrap();
        assert_eq!(3, re.minimized_dfa().len());

        // A single accepting state that loops on `a`, plus the dead
        // state.
        let re = Regex::new("a*").unwrap();
        assert_eq!(2, re.minimized_dfa().len());
    }

    #[test]
    fn classic_suffix_automaton_has_five_states() {
        // (a|b)*abb needs states for making progress through the suffix
        // `abb` (four of them) plus the dead state.
        let re = Regex::new("(a|b)*abb").unwrap();
        assert_eq!(5, re.minimized_dfa().len());
    }

    #[test]
    fn preserves_acceptance() {
        let re = Regex::new("(a|b){2,4}").unwrap();
        let inputs: [&[u8]; 6] =
            [b"", b"a", b"ba", b"aba", b"abba", b"abbab"];
        for input in inputs {
            assert_eq!(
                re.dfa().is_match(input),
                re.minimized_dfa().is_match(input),
                "stage disagreement on {:?}",
                input,
            );
        }
    }
}
