use std::collections::BTreeMap;

use crate::dfa::DFA;
use crate::enfa::{EpsilonNFA, EPSILON};
use crate::nfa::NFA;
use crate::{StateID, DEAD};

/// Render the epsilon NFA as a Graphviz digraph named `epsilon_nfa`.
pub(crate) fn render_epsilon_nfa(enfa: &EpsilonNFA) -> String {
    let mut edges: BTreeMap<(StateID, StateID), Vec<usize>> = BTreeMap::new();
    for id in 0..enfa.len() {
        for (label, targets) in enfa.transitions(id) {
            for &to in targets {
                if to == DEAD {
                    continue;
                }
                edges.entry((id, to)).or_default().push(label);
            }
        }
    }
    render("epsilon_nfa", enfa.start(), &[enfa.end()], &edges)
}

/// Render the NFA as a Graphviz digraph named `nfa`.
pub(crate) fn render_nfa(nfa: &NFA) -> String {
    let mut edges: BTreeMap<(StateID, StateID), Vec<usize>> = BTreeMap::new();
    for id in 0..nfa.len() {
        for (byte, targets) in nfa.transitions(id) {
            for &to in targets {
                if to == DEAD {
                    continue;
                }
                edges.entry((id, to)).or_default().push(usize::from(byte));
            }
        }
    }
    let accepting: Vec<StateID> =
        (0..nfa.len()).filter(|&id| nfa.is_accept(id)).collect();
    render("nfa", nfa.start(), &accepting, &edges)
}

/// Render a DFA as a Graphviz digraph with the given name.
pub(crate) fn render_dfa(dfa: &DFA, name: &str) -> String {
    let mut edges: BTreeMap<(StateID, StateID), Vec<usize>> = BTreeMap::new();
    for id in 0..dfa.len() {
        for (lo, hi, to) in dfa.sparse_row(id) {
            if to == DEAD {
                continue;
            }
            edges
                .entry((id, to))
                .or_default()
                .extend(usize::from(lo)..=usize::from(hi));
        }
    }
    let accepting: Vec<StateID> =
        (0..dfa.len()).filter(|&id| dfa.is_accept(id)).collect();
    render(name, dfa.start(), &accepting, &edges)
}

fn render(
    name: &str,
    start: StateID,
    accepting: &[StateID],
    edges: &BTreeMap<(StateID, StateID), Vec<usize>>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("digraph {} {{\n", name));
    out.push_str("    rankdir=LR;\n");
    out.push_str("    node [shape=circle];\n");
    out.push_str("    start [shape=point];\n");
    for &id in accepting {
        out.push_str(&format!("    {} [shape=doublecircle];\n", id));
    }
    out.push_str(&format!("    start -> {};\n", start));
    for (&(from, to), labels) in edges {
        out.push_str(&format!(
            "    {} -> {} [label=\"{}\"];\n",
            from,
            to,
            compress(labels),
        ));
    }
    out.push_str("}\n");
    out
}

/// Collapse a multiset of edge labels into ascending runs: a lone byte
/// prints as itself, a run of two as both bytes, and a longer run as an
/// inclusive range. The epsilon label prints as `e` and always sorts
/// last.
pub(crate) fn compress(labels: &[usize]) -> String {
    let mut labels = labels.to_vec();
    labels.sort_unstable();
    labels.dedup();

    let has_epsilon = labels.last() == Some(&EPSILON);
    if has_epsilon {
        labels.pop();
    }

    let mut parts: Vec<String> = vec![];
    let mut i = 0;
    while i < labels.len() {
        let lo = labels[i];
        while i + 1 < labels.len() && labels[i + 1] == labels[i] + 1 {
            i += 1;
        }
        let hi = labels[i];
        match hi - lo {
            0 => parts.push(escape(lo as u8)),
            1 => {
                parts.push(escape(lo as u8));
                parts.push(escape(hi as u8));
            }
            _ => {
                parts.push(format!("{}-{}", escape(lo as u8), escape(hi as u8)))
            }
        }
        i += 1;
    }
    if has_epsilon {
        parts.push("e".to_string());
    }
    parts.join(" ")
}

/// Return the given byte in its escaped string form.
pub(crate) fn escape(byte: u8) -> String {
    use std::ascii;

    String::from_utf8(ascii::escape_default(byte).collect::<Vec<_>>())
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Regex;

    #[test]
    fn label_runs() {
        assert_eq!("a", compress(&[97]));
        assert_eq!("a b", compress(&[97, 98]));
        assert_eq!("a-c", compress(&[97, 98, 99]));
        assert_eq!("a-c x", compress(&[99, 97, 98, 120]));
        assert_eq!("e", compress(&[EPSILON]));
        assert_eq!("a e", compress(&[EPSILON, 97]));
        let all: Vec<usize> = (0..256).collect();
        assert_eq!(r"\x00-\xff", compress(&all));
    }

    #[test]
    fn duplicate_labels_collapse() {
        assert_eq!("a", compress(&[97, 97, 97]));
    }

    #[test]
    fn dfa_rendering_marks_start_and_acceptance() {
        let re = Regex::new("ab").unwrap();
        let dot = render_dfa(re.minimized_dfa(), "minimized_dfa");
        assert!(dot.starts_with("digraph minimized_dfa {"));
        assert!(dot.contains("start [shape=point];"));
        assert!(dot.contains("[shape=doublecircle];"));
        assert!(dot.contains("[label=\"a\"]"));
        assert!(dot.contains("[label=\"b\"]"));
    }

    #[test]
    fn epsilon_edges_render_as_e() {
        let re = Regex::new("a|b").unwrap();
        let dot = render_epsilon_nfa(re.epsilon_nfa());
        assert!(dot.contains("[label=\"e\"]"));
    }

    #[test]
    fn edges_into_the_dead_state_are_suppressed() {
        let re = Regex::new("ab").unwrap();
        let dot = render_dfa(re.dfa(), "dfa");
        assert!(!dot.contains("-> 0 "));
    }
}
