use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::debug;

use crate::determinize::Determinizer;
use crate::dfa::DFA;
use crate::dot;
use crate::enfa::EpsilonNFA;
use crate::error::Result;
use crate::minimize::Minimizer;
use crate::nfa::NFA;
use crate::parser;

/// A compiled regular expression.
///
/// Compilation runs the full pipeline up front: the pattern is parsed
/// into an epsilon NFA by Thompson's construction, the epsilon
/// transitions are eliminated, the NFA is determinized by subset
/// construction and the resulting DFA is minimized. Matching then runs
/// the minimized DFA, while the earlier stages remain available for
/// inspection and dumping.
///
/// Matching is anchored at both ends: the entire input must be consumed
/// and end in an accepting state. There is no searching, and no notion of
/// a partial or prefix match.
///
/// A compiled `Regex` is immutable. Matching allocates nothing beyond
/// function-local scratch, so a single value can serve concurrent
/// matchers through a shared reference.
///
/// # Example
///
/// ```
/// use regex_stages::Regex;
///
/// # fn example() -> Result<(), regex_stages::Error> {
/// let re = Regex::new("(a|b)*abb")?;
/// assert!(re.is_match(b"aababb"));
/// assert!(!re.is_match(b"aabab"));
/// # Ok(()) }; example().unwrap()
/// ```
#[derive(Clone)]
pub struct Regex {
    pattern: String,
    enfa: EpsilonNFA,
    nfa: NFA,
    dfa: DFA,
    min: DFA,
}

impl Regex {
    /// Compile the given pattern through every pipeline stage.
    ///
    /// Returns an error if the pattern is not well formed; see
    /// [`ErrorKind`](crate::ErrorKind) for the possible failures. Every
    /// error carries the pattern offset at which it was detected.
    pub fn new(pattern: &str) -> Result<Regex> {
        let enfa = parser::parse(pattern)?;
        debug!(
            "parsed {:?} into an epsilon NFA with {} states",
            pattern,
            enfa.len(),
        );
        let nfa = NFA::from_epsilon(&enfa);
        let dfa = Determinizer::new(&nfa).build();
        let min = Minimizer::new(&dfa).build();
        Ok(Regex { pattern: pattern.to_string(), enfa, nfa, dfa, min })
    }

    /// Returns true if and only if the entire input matches the pattern.
    ///
    /// This runs the minimized DFA. The matchers on the individual stage
    /// types answer identically; they exist for diagnostics.
    pub fn is_match(&self, input: &[u8]) -> bool {
        self.min.is_match(input)
    }

    /// Return the pattern this regex was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Return the epsilon NFA produced by parsing.
    pub fn epsilon_nfa(&self) -> &EpsilonNFA {
        &self.enfa
    }

    /// Return the NFA produced by epsilon elimination.
    pub fn nfa(&self) -> &NFA {
        &self.nfa
    }

    /// Return the DFA produced by subset construction.
    pub fn dfa(&self) -> &DFA {
        &self.dfa
    }

    /// Return the minimized DFA.
    pub fn minimized_dfa(&self) -> &DFA {
        &self.min
    }

    /// Write Graphviz renderings of all four stages into the
    /// conventional `graphviz/` directory.
    pub fn write_graphviz(&self) -> io::Result<()> {
        self.write_graphviz_to("graphviz")
    }

    /// Write Graphviz renderings of all four stages into the given
    /// directory, creating it if necessary. The files are named
    /// `epsilon_nfa.gv`, `nfa.gv`, `dfa.gv` and `minimized_dfa.gv`.
    pub fn write_graphviz_to<P: AsRef<Path>>(&self, dir: P) -> io::Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        fs::write(
            dir.join("epsilon_nfa.gv"),
            dot::render_epsilon_nfa(&self.enfa),
        )?;
        fs::write(dir.join("nfa.gv"), dot::render_nfa(&self.nfa))?;
        fs::write(dir.join("dfa.gv"), dot::render_dfa(&self.dfa, "dfa"))?;
        fs::write(
            dir.join("minimized_dfa.gv"),
            dot::render_dfa(&self.min, "minimized_dfa"),
        )?;
        Ok(())
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Regex").field("pattern", &self.pattern).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_stages_agree() {
        let tests: &[(&str, &[u8])] = &[
            ("a*", b"aaaa"),
            ("a*", b"aab"),
            ("(a|b)*abb", b"ababb"),
            ("(a|b)*abb", b"abab"),
            (r"\w*", b"under_score42"),
            (r"\w*", b"no-dash"),
            ("(a|b){2,4}", b"abab"),
            ("(a|b){2,4}", b"ababa"),
        ];
        for &(pattern, input) in tests {
            let re = Regex::new(pattern).unwrap();
            let want = re.epsilon_nfa().is_match(input);
            assert_eq!(want, re.nfa().is_match(input), "{:?}", pattern);
            assert_eq!(want, re.dfa().is_match(input), "{:?}", pattern);
            assert_eq!(want, re.is_match(input), "{:?}", pattern);
        }
    }

    #[test]
    fn matches_empty_input_iff_entry_closure_reaches_exit() {
        for (pattern, matches_empty) in
            [("a*", true), ("a", false), ("(a|b){0,0}", true), ("a?", true)]
        {
            let re = Regex::new(pattern).unwrap();
            assert_eq!(matches_empty, re.is_match(b""), "{:?}", pattern);
            assert_eq!(
                matches_empty,
                re.epsilon_nfa().is_match(b""),
                "{:?}",
                pattern,
            );
        }
    }

    #[test]
    fn graphviz_files_are_written_for_every_stage() {
        let dir = std::env::temp_dir()
            .join(format!("regex-stages-test-{}", std::process::id()));
        let re = Regex::new("(ab|cd)+").unwrap();
        re.write_graphviz_to(&dir).unwrap();
        for name in ["epsilon_nfa.gv", "nfa.gv", "dfa.gv", "minimized_dfa.gv"]
        {
            let contents = fs::read_to_string(dir.join(name)).unwrap();
            assert!(contents.starts_with("digraph"), "{} is malformed", name);
        }
        fs::remove_dir_all(&dir).unwrap();
    }
}
