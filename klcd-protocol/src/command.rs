//! Command frames sent by the screen
//!
//! A command line starts with an opcode (`A` followed by digits) and may
//! carry one parameter. The parameter is extracted by the first rule that
//! matches, in this order:
//!
//! 1. Axis move: `X|Y|Z`, signed decimal distance, `F<digits>` feed
//! 2. Numeric: a token `S<digits>`
//! 3. Composite: a token `C<alnum>`
//! 4. Alternate name: `<...>` anywhere after the opcode
//! 5. Bare word: the first run of `[A-Za-z0-9_./-]` after the opcode
//!
//! The order matters: `A13 S2 <1-f.idx>` is numeric, never a token.

use core::fmt;

use heapless::String;

use crate::line::MAX_LINE_LEN;

/// Text payload of a token or bare-word parameter
pub type Token = String<MAX_LINE_LEN>;

/// Errors that can occur while parsing a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Line does not start with `A<digits>`
    MissingOpcode,
    /// Opcode number does not fit
    InvalidOpcode,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingOpcode => f.write_str("no opcode at start of line"),
            ParseError::InvalidOpcode => f.write_str("opcode number out of range"),
        }
    }
}

/// Command opcode (`A0`, `A13`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Opcode(pub u16);

impl Opcode {
    /// Split a line into its opcode and the remaining text
    fn split(text: &str) -> Result<(Self, &str), ParseError> {
        let rest = text.strip_prefix('A').ok_or(ParseError::MissingOpcode)?;
        let digits = rest
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits == 0 {
            return Err(ParseError::MissingOpcode);
        }

        let (number, rest) = rest.split_at(digits);
        let number = number.parse().map_err(|_| ParseError::InvalidOpcode)?;
        Ok((Opcode(number), rest))
    }

    /// Opcode number
    pub const fn number(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Motion axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Parse an axis letter (uppercase only, as the screen sends it)
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'X' => Some(Axis::X),
            b'Y' => Some(Axis::Y),
            b'Z' => Some(Axis::Z),
            _ => None,
        }
    }

    /// G-code letter for this axis
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

/// Relative jog requested by the screen
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisMove {
    /// Axis to move
    pub axis: Axis,
    /// Distance in mm, signed
    pub distance: f32,
    /// Feed rate in mm/min
    pub feed: u32,
}

/// Shape of a parameter, declared by handlers at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArgKind {
    None,
    Numeric,
    Token,
    AxisMove,
    BareWord,
}

/// Parameter decoded from a command line
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParsedArg {
    /// No recognizable parameter
    None,
    /// `S<digits>`
    Numeric(u32),
    /// `C<alnum>` (without the `C`) or `<...>` (with the brackets)
    Token(Token),
    /// `X|Y|Z <distance> F<feed>`
    AxisMove(AxisMove),
    /// First word after the opcode
    BareWord(Token),
}

impl ParsedArg {
    /// Shape of this parameter
    pub fn kind(&self) -> ArgKind {
        match self {
            ParsedArg::None => ArgKind::None,
            ParsedArg::Numeric(_) => ArgKind::Numeric,
            ParsedArg::Token(_) => ArgKind::Token,
            ParsedArg::AxisMove(_) => ArgKind::AxisMove,
            ParsedArg::BareWord(_) => ArgKind::BareWord,
        }
    }

    /// Extract the parameter from the text following the opcode
    pub fn parse(rest: &str) -> Self {
        if let Some(movement) = parse_axis_move(rest) {
            return ParsedArg::AxisMove(movement);
        }
        if let Some(value) = parse_numeric(rest) {
            return ParsedArg::Numeric(value);
        }
        if let Some(token) = parse_composite(rest) {
            return ParsedArg::Token(token);
        }
        if let Some(token) = parse_bracketed(rest) {
            return ParsedArg::Token(token);
        }
        if let Some(word) = parse_bare_word(rest) {
            return ParsedArg::BareWord(word);
        }
        ParsedArg::None
    }
}

/// A decoded command line
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame {
    /// Command opcode
    pub opcode: Opcode,
    /// Decoded parameter
    pub argument: ParsedArg,
}

impl CommandFrame {
    /// Parse a command from a received line
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let (opcode, rest) = Opcode::split(line.trim())?;
        Ok(Self {
            opcode,
            argument: ParsedArg::parse(rest),
        })
    }
}

fn to_token(text: &str) -> Option<Token> {
    let mut token = Token::new();
    token.push_str(text).ok()?;
    Some(token)
}

fn skip_while(bytes: &[u8], mut pos: usize, pred: impl Fn(u8) -> bool) -> usize {
    while pos < bytes.len() && pred(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn parse_axis_move(rest: &str) -> Option<AxisMove> {
    let text = rest.trim_start();
    let bytes = text.as_bytes();
    let axis = Axis::from_byte(*bytes.first()?)?;

    // Signed decimal distance
    let start = skip_while(bytes, 1, |b| b.is_ascii_whitespace());
    let mut pos = start;
    if matches!(bytes.get(pos), Some(b'+') | Some(b'-')) {
        pos += 1;
    }
    let int_start = pos;
    pos = skip_while(bytes, pos, |b| b.is_ascii_digit());
    if pos == int_start {
        return None;
    }
    if bytes.get(pos) == Some(&b'.') {
        let frac_end = skip_while(bytes, pos + 1, |b| b.is_ascii_digit());
        if frac_end > pos + 1 {
            pos = frac_end;
        }
    }
    let distance: f32 = text.get(start..pos)?.parse().ok()?;

    // Feed token
    pos = skip_while(bytes, pos, |b| b.is_ascii_whitespace());
    if bytes.get(pos) != Some(&b'F') {
        return None;
    }
    let feed_end = skip_while(bytes, pos + 1, |b| b.is_ascii_digit());
    let feed: u32 = text.get(pos + 1..feed_end)?.parse().ok()?;

    Some(AxisMove {
        axis,
        distance,
        feed,
    })
}

fn parse_numeric(rest: &str) -> Option<u32> {
    rest.split_ascii_whitespace().find_map(|word| {
        let digits = word.strip_prefix('S')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    })
}

fn parse_composite(rest: &str) -> Option<Token> {
    rest.split_ascii_whitespace().find_map(|word| {
        let body = word.strip_prefix('C')?;
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        to_token(body)
    })
}

fn parse_bracketed(rest: &str) -> Option<Token> {
    // An empty `<>` does not end the search
    rest.match_indices('<').find_map(|(open, _)| {
        let close = rest[open..].find('>')? + open;
        if close == open + 1 {
            return None;
        }
        to_token(&rest[open..=close])
    })
}

fn parse_bare_word(rest: &str) -> Option<Token> {
    let is_word = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'/' | b'-');
    let bytes = rest.as_bytes();
    let start = bytes.iter().position(|&b| is_word(b))?;
    let end = skip_while(bytes, start, is_word);
    to_token(&rest[start..end])
}
