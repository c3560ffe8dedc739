/*!
A regular expression engine that builds and exposes every stage of the
classical compilation pipeline.

Compiling a pattern with [`Regex::new`] runs the whole pipeline at once:

1. A recursive-descent parse of the pattern emits an epsilon NFA via
   Thompson's construction ([`EpsilonNFA`]).
2. Epsilon elimination composes every transition through epsilon closures
   ([`NFA`]).
3. Subset construction derives a deterministic automaton ([`DFA`]).
4. Partition refinement collapses equivalent states into the minimal
   DFA.

Matching with [`Regex::is_match`] runs the minimized DFA, but each stage
keeps its own matcher and all four answer identically for every input.
The intermediate automata can be inspected through the accessors on
[`Regex`] or rendered to Graphviz with [`Regex::write_graphviz`].

Matching is anchored on both ends: a pattern matches an input if and only
if the *entire* input is in the pattern's language. The alphabet is the
256 byte values, so inputs are `&[u8]` and `.` matches any single byte.

# Example

```
use regex_stages::Regex;

# fn example() -> Result<(), regex_stages::Error> {
let re = Regex::new(r"[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?")?;
assert!(re.is_match(b"6.022e+23"));
assert!(!re.is_match(b"e+23"));

// The minimized DFA never has more states than the raw one.
assert!(re.minimized_dfa().len() <= re.dfa().len());
# Ok(()) }; example().unwrap()
```

# Syntax

Alternation `a|b`, grouping `(..)`, the quantifiers `*`, `+`, `?`,
`{n}`, `{n,}` and `{n,m}`, the any-byte `.`, character classes with
ranges and negation (`[a-z]`, `[^0-9]`), and escapes for the meta
characters, the class shorthands `\w \W \s \S \d \D` and the control
codes `\a \b \f \n \r \t \v`. There are no anchors, captures,
backreferences or lazy quantifiers.
*/

pub use crate::dfa::DFA;
pub use crate::enfa::EpsilonNFA;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::nfa::NFA;
pub use crate::regex::Regex;

mod determinize;
mod dfa;
mod dot;
mod enfa;
mod error;
mod minimize;
mod nfa;
mod parser;
mod regex;
mod sparse_set;

/// The identifier of a state within a single automaton's state pool.
pub type StateID = usize;

/// The reserved dead state. It is present in every automaton stage, has
/// no outgoing transitions and is never accepting.
pub const DEAD: StateID = 0;

/// The number of distinct input byte values.
pub const ALPHABET_LEN: usize = 256;
