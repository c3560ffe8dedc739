use crate::enfa::{EpsilonNFA, Fragment};
use crate::error::{Error, Result};
use crate::ALPHABET_LEN;

/// The bytes that cannot appear bare outside a character class.
const META: &[u8] = br"[]\.^$*+?{}|()";

/// The bytes that cannot appear bare inside a character class.
const CLASS_META: &[u8] = br"[]\";

/// Compile the given pattern into an epsilon NFA.
///
/// The grammar is alternation of concatenations of optionally quantified
/// atoms, where an atom is a single byte, `.`, a character class or a
/// parenthesized group. The whole pattern must be consumed; anything the
/// grammar cannot account for is an error.
pub(crate) fn parse(pattern: &str) -> Result<EpsilonNFA> {
    let mut parser = Parser {
        reader: Reader::new(pattern.as_bytes()),
        enfa: EpsilonNFA::new(),
    };
    let root = parser.alternation()?;
    if parser.reader.peek().is_some() {
        return Err(Error::trailing_input(parser.reader.pos()));
    }
    parser.enfa.finish(root);
    Ok(parser.enfa)
}

/// A one-byte lookahead cursor over the pattern.
struct Reader<'p> {
    pattern: &'p [u8],
    pos: usize,
}

impl<'p> Reader<'p> {
    fn new(pattern: &'p [u8]) -> Reader<'p> {
        Reader { pattern, pos: 0 }
    }

    /// The position of the next unread byte. Once the pattern is
    /// exhausted, this is the pattern length.
    fn pos(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.pattern.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Consume the given byte or fail.
    fn eat(&mut self, want: u8) -> Result<u8> {
        match self.peek() {
            Some(byte) if byte == want => {
                self.pos += 1;
                Ok(byte)
            }
            Some(byte) => Err(Error::unexpected_byte(self.pos, byte)),
            None => Err(Error::unexpected_eof(self.pos)),
        }
    }

    /// Consume the next byte if it is one of `set`, or fail.
    fn eat_one_of(&mut self, set: &[u8]) -> Result<u8> {
        match self.peek() {
            Some(byte) if set.contains(&byte) => {
                self.pos += 1;
                Ok(byte)
            }
            Some(byte) => Err(Error::unexpected_byte(self.pos, byte)),
            None => Err(Error::unexpected_eof(self.pos)),
        }
    }

    /// Consume the next byte if it is not one of `set`, or fail.
    fn eat_none_of(&mut self, set: &[u8]) -> Result<u8> {
        match self.peek() {
            Some(byte) if !set.contains(&byte) => {
                self.pos += 1;
                Ok(byte)
            }
            Some(byte) => Err(Error::unexpected_byte(self.pos, byte)),
            None => Err(Error::unexpected_eof(self.pos)),
        }
    }
}

struct Parser<'p> {
    reader: Reader<'p>,
    enfa: EpsilonNFA,
}

impl<'p> Parser<'p> {
    /// One or more concatenations separated by `|`.
    fn alternation(&mut self) -> Result<Fragment> {
        let mut frag = self.concat()?;
        while self.reader.peek() == Some(b'|') {
            self.reader.eat(b'|')?;
            let rhs = self.concat()?;
            frag = self.enfa.alternate(frag, rhs);
        }
        Ok(frag)
    }

    /// One or more quantified atoms in sequence. An empty branch (as in
    /// `a|` or `()`) is an error.
    fn concat(&mut self) -> Result<Fragment> {
        let mut frag = match self.repetition()? {
            Some(frag) => frag,
            None => return Err(self.expected_expression()),
        };
        while let Some(next) = self.repetition()? {
            frag = self.enfa.concat(frag, next);
        }
        Ok(frag)
    }

    fn expected_expression(&self) -> Error {
        match self.reader.peek() {
            None => Error::unexpected_eof(self.reader.pos()),
            Some(byte) => Error::unexpected_byte(self.reader.pos(), byte),
        }
    }

    /// An atom followed by at most one quantifier.
    fn repetition(&mut self) -> Result<Option<Fragment>> {
        let frag = match self.atom()? {
            None => return Ok(None),
            Some(frag) => frag,
        };
        match self.reader.peek() {
            Some(b'*') => {
                self.reader.eat(b'*')?;
                Ok(Some(self.enfa.star(frag)))
            }
            Some(b'+') => {
                self.reader.eat(b'+')?;
                Ok(Some(self.enfa.plus(frag)))
            }
            Some(b'?') => {
                self.reader.eat(b'?')?;
                Ok(Some(self.enfa.question(frag)))
            }
            Some(b'{') => self.counted(frag).map(Some),
            _ => Ok(Some(frag)),
        }
    }

    /// A group, `.`, a character class, an escape or a literal byte.
    /// Returns `None` without consuming anything when the next byte
    /// cannot start an atom.
    fn atom(&mut self) -> Result<Option<Fragment>> {
        match self.reader.peek() {
            None => Ok(None),
            Some(b'(') => self.group().map(Some),
            Some(b'.') => {
                self.reader.eat(b'.')?;
                Ok(Some(self.enfa.class(&[true; ALPHABET_LEN], false)))
            }
            Some(b'[') => self.class().map(Some),
            Some(b'\\') => self.escape().map(Some),
            Some(byte) if META.contains(&byte) => Ok(None),
            Some(_) => {
                let byte = self.reader.eat_none_of(META)?;
                Ok(Some(self.enfa.byte(byte)))
            }
        }
    }

    fn group(&mut self) -> Result<Fragment> {
        self.reader.eat(b'(')?;
        let frag = self.alternation()?;
        self.reader.eat(b')')?;
        Ok(frag)
    }

    /// An escape outside a character class: a literal meta character, a
    /// class shorthand or a control code.
    fn escape(&mut self) -> Result<Fragment> {
        self.reader.eat(b'\\')?;
        let offset = self.reader.pos();
        let byte = match self.reader.bump() {
            None => return Err(Error::unexpected_eof(offset)),
            Some(byte) => byte,
        };
        let frag = match byte {
            byte if META.contains(&byte) => self.enfa.byte(byte),
            b'w' => self.enfa.class(&word_bytes(), false),
            b'W' => self.enfa.class(&word_bytes(), true),
            b's' => self.enfa.class(&space_bytes(), false),
            b'S' => self.enfa.class(&space_bytes(), true),
            b'd' => self.enfa.class(&digit_bytes(), false),
            b'D' => self.enfa.class(&digit_bytes(), true),
            b'a' => self.enfa.byte(0x07),
            b'b' => self.enfa.byte(0x08),
            b'f' => self.enfa.byte(0x0C),
            b'n' => self.enfa.byte(b'\n'),
            b'r' => self.enfa.byte(b'\r'),
            b't' => self.enfa.byte(b'\t'),
            b'v' => self.enfa.byte(0x0B),
            _ => return Err(Error::unknown_escape(offset, byte)),
        };
        Ok(frag)
    }

    /// A character class `[...]` or `[^...]`.
    fn class(&mut self) -> Result<Fragment> {
        let open = self.reader.pos();
        self.reader.eat(b'[')?;
        let negate = if self.reader.peek() == Some(b'^') {
            self.reader.eat(b'^')?;
            true
        } else {
            false
        };

        let mut include = [false; ALPHABET_LEN];
        let mut items = 0;
        while let Some(lo) = self.class_byte()? {
            items += 1;
            if self.reader.peek() != Some(b'-') {
                include[usize::from(lo)] = true;
                continue;
            }
            self.reader.eat(b'-')?;
            match self.class_byte()? {
                // A trailing `-` is a literal.
                None => {
                    include[usize::from(lo)] = true;
                    include[usize::from(b'-')] = true;
                }
                Some(hi) if lo <= hi => {
                    for byte in lo..=hi {
                        include[usize::from(byte)] = true;
                    }
                }
                // An ill-ordered range like `z-a` contributes its three
                // bytes as literals.
                Some(hi) => {
                    include[usize::from(lo)] = true;
                    include[usize::from(b'-')] = true;
                    include[usize::from(hi)] = true;
                }
            }
        }
        if items == 0 {
            return Err(Error::empty_class(open));
        }
        self.reader.eat(b']')?;
        Ok(self.enfa.class(&include, negate))
    }

    /// A single byte inside a character class, possibly escaped. Returns
    /// `None` without consuming anything at `[`, `]`, `\`-less end of
    /// input, i.e. wherever an item cannot start.
    fn class_byte(&mut self) -> Result<Option<u8>> {
        match self.reader.peek() {
            None => Ok(None),
            Some(b'\\') => {
                self.reader.eat(b'\\')?;
                let offset = self.reader.pos();
                let byte = match self.reader.bump() {
                    None => return Err(Error::unexpected_eof(offset)),
                    Some(byte) => byte,
                };
                match byte {
                    b'[' | b']' | b'\\' => Ok(Some(byte)),
                    b'a' => Ok(Some(0x07)),
                    b'b' => Ok(Some(0x08)),
                    b'f' => Ok(Some(0x0C)),
                    b'n' => Ok(Some(b'\n')),
                    b'r' => Ok(Some(b'\r')),
                    b't' => Ok(Some(b'\t')),
                    b'v' => Ok(Some(0x0B)),
                    _ => Err(Error::unknown_escape(offset, byte)),
                }
            }
            Some(byte) if CLASS_META.contains(&byte) => Ok(None),
            Some(_) => Ok(self.reader.bump()),
        }
    }

    /// A counted repetition `{n}`, `{n,}` or `{n,m}` applied to `frag`.
    ///
    /// The operand is spliced in as deep copies: `n` mandatory copies in
    /// sequence, then either a starred copy (no upper bound) or `m - n`
    /// optional copies. A fresh outer fragment wraps the chain so that
    /// the operand's own states never leak into the result.
    fn counted(&mut self, frag: Fragment) -> Result<Fragment> {
        self.reader.eat(b'{')?;
        let counts = self.reader.pos();
        let min = self.decimal()?;
        let max = match self.reader.peek() {
            Some(b',') => {
                self.reader.eat(b',')?;
                match self.reader.peek() {
                    Some(byte) if byte.is_ascii_digit() => {
                        Some(self.decimal()?)
                    }
                    _ => None,
                }
            }
            _ => Some(min),
        };
        self.reader.eat(b'}')?;
        if let Some(max) = max {
            if max < min {
                return Err(Error::invalid_repetition(counts, min, max));
            }
        }

        let outer = Fragment {
            start: self.enfa.add_state(),
            end: self.enfa.add_state(),
        };
        if min == 0 {
            self.enfa.add_epsilon(outer.start, outer.end);
        }

        let mut chain: Option<Fragment> = None;
        for _ in 0..min {
            let copy = self.enfa.deep_copy(frag);
            chain = Some(match chain {
                Some(prev) => self.enfa.concat(prev, copy),
                None => copy,
            });
        }
        match max {
            None => {
                let copy = self.enfa.deep_copy(frag);
                let star = self.enfa.star(copy);
                chain = Some(match chain {
                    Some(prev) => self.enfa.concat(prev, star),
                    None => star,
                });
            }
            Some(max) => {
                for _ in min..max {
                    let copy = self.enfa.deep_copy(frag);
                    let question = self.enfa.question(copy);
                    chain = Some(match chain {
                        Some(prev) => self.enfa.concat(prev, question),
                        None => question,
                    });
                }
            }
        }

        if let Some(chain) = chain {
            self.enfa.add_epsilon(outer.start, chain.start);
            self.enfa.add_epsilon(chain.end, outer.end);
        }
        Ok(outer)
    }

    /// One or more decimal digits.
    fn decimal(&mut self) -> Result<u32> {
        let mut n: u32 = self
            .reader
            .eat_one_of(b"0123456789")
            .map(|byte| u32::from(byte - b'0'))?;
        while matches!(self.reader.peek(), Some(byte) if byte.is_ascii_digit()) {
            let byte = self.reader.eat_one_of(b"0123456789")?;
            n = n.saturating_mul(10).saturating_add(u32::from(byte - b'0'));
        }
        Ok(n)
    }
}

fn word_bytes() -> [bool; ALPHABET_LEN] {
    let mut set = [false; ALPHABET_LEN];
    for byte in b'a'..=b'z' {
        set[usize::from(byte)] = true;
    }
    for byte in b'A'..=b'Z' {
        set[usize::from(byte)] = true;
    }
    for byte in b'0'..=b'9' {
        set[usize::from(byte)] = true;
    }
    set[usize::from(b'_')] = true;
    set
}

fn space_bytes() -> [bool; ALPHABET_LEN] {
    let mut set = [false; ALPHABET_LEN];
    for byte in [b'\t', b'\n', 0x0C, b'\r', b' '] {
        set[usize::from(byte)] = true;
    }
    set
}

fn digit_bytes() -> [bool; ALPHABET_LEN] {
    let mut set = [false; ALPHABET_LEN];
    for byte in b'0'..=b'9' {
        set[usize::from(byte)] = true;
    }
    set
}
