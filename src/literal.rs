// 🔤 Literal Parser - Python-style cell literals
// Annotation tools write lists into spreadsheet cells as text like "['Alice', 'Bob']".
// This module turns that text back into values without ever failing loudly.

use std::fmt;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Literal - A value recovered from a cell's text
///
/// Mirrors the subset of Python literals that show up in annotation sheets.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i128),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
}

impl Literal {
    /// Build a string literal
    pub fn str(value: impl Into<String>) -> Self {
        Literal::Str(value.into())
    }

    /// Python `repr()` form - quoted strings, bracketed containers
    pub fn repr(&self) -> String {
        match self {
            Literal::Str(s) => python_str_repr(s),
            Literal::List(items) => list_repr(items),
            Literal::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()),
            Literal::Tuple(items) => format!("({})", join_repr(items)),
            other => other.to_string(),
        }
    }

    /// Identity used for deduplication: the trimmed display form
    ///
    /// `'Alice'`, `' Alice '` and `Alice` all share one identity.
    pub fn identity(&self) -> String {
        self.to_string().trim().to_string()
    }
}

/// Display is Python `str()`: strings print bare, everything else as repr
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => f.write_str(s),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(x) => f.write_str(&python_float_repr(*x)),
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
            Literal::None => f.write_str("None"),
            Literal::List(_) | Literal::Tuple(_) => f.write_str(&self.repr()),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Str(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Str(value)
    }
}

/// Python repr of a list holding `items`
pub fn list_repr(items: &[Literal]) -> String {
    format!("[{}]", join_repr(items))
}

fn join_repr(items: &[Literal]) -> String {
    items
        .iter()
        .map(Literal::repr)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// PARSE OUTCOME
// ============================================================================

/// Result of parsing a cell's text
///
/// Only a top-level list counts as a sequence. A top-level tuple is a scalar,
/// the same way the annotation pipeline treats it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Sequence(Vec<Literal>),
    Scalar(Literal),
    Failed,
}

impl ParseOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ParseOutcome::Failed)
    }
}

/// Parse text as a literal value
///
/// Never panics. Anything outside the supported grammar yields `Failed`.
pub fn parse_literal(text: &str) -> ParseOutcome {
    let mut parser = LiteralParser::new(text);
    match parser.parse_document() {
        Some(Literal::List(items)) => ParseOutcome::Sequence(items),
        Some(value) => ParseOutcome::Scalar(value),
        None => ParseOutcome::Failed,
    }
}

// ============================================================================
// PARSER
// ============================================================================

/// Deepest bracket nesting accepted; deeper input fails to parse
pub const MAX_NESTING: usize = 200;

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl LiteralParser {
    fn new(text: &str) -> Self {
        LiteralParser {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Whole input: one expression, or a bare comma-separated tuple
    fn parse_document(&mut self) -> Option<Literal> {
        self.skip_whitespace();
        let first = self.parse_value()?;
        self.skip_whitespace();

        if self.peek() != Some(',') {
            return if self.at_end() { Some(first) } else { None };
        }

        let mut items = vec![first];
        while self.peek() == Some(',') {
            self.pos += 1;
            self.skip_whitespace();
            if self.at_end() {
                break;
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
        }

        if self.at_end() {
            Some(Literal::Tuple(items))
        } else {
            None
        }
    }

    fn parse_value(&mut self) -> Option<Literal> {
        self.skip_whitespace();
        match self.peek()? {
            '[' => self.parse_list(),
            '(' => self.parse_parenthesized(),
            '\'' | '"' => self.parse_strings(),
            '+' | '-' => self.parse_signed_number(),
            c if c.is_ascii_digit() => self.parse_number(),
            '.' if matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) => self.parse_number(),
            c if c.is_alphabetic() || c == '_' => self.parse_word(),
            _ => None,
        }
    }

    /// Items up to `close`, trailing comma allowed
    fn parse_items(&mut self, close: char) -> Option<(Vec<Literal>, bool)> {
        let mut items = Vec::new();
        let mut saw_comma = false;

        loop {
            self.skip_whitespace();
            if self.peek()? == close {
                self.pos += 1;
                return Some((items, saw_comma));
            }

            items.push(self.parse_value()?);
            self.skip_whitespace();

            match self.bump()? {
                ',' => saw_comma = true,
                c if c == close => return Some((items, saw_comma)),
                _ => return None,
            }
        }
    }

    /// Open a bracket level; `None` past `MAX_NESTING` levels
    fn enter(&mut self) -> Option<()> {
        if self.depth >= MAX_NESTING {
            return None;
        }
        self.depth += 1;
        self.pos += 1;
        Some(())
    }

    fn parse_list(&mut self) -> Option<Literal> {
        self.enter()?;
        let (items, _) = self.parse_items(']')?;
        self.depth -= 1;
        Some(Literal::List(items))
    }

    /// `()` and `(x,)` are tuples, `(x)` is just x
    fn parse_parenthesized(&mut self) -> Option<Literal> {
        self.enter()?;
        let (mut items, saw_comma) = self.parse_items(')')?;
        self.depth -= 1;
        if items.len() == 1 && !saw_comma {
            items.pop()
        } else {
            Some(Literal::Tuple(items))
        }
    }

    fn parse_word(&mut self) -> Option<Literal> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();

        if matches!(self.peek(), Some('\'') | Some('"')) {
            // String prefix. Bytes and f-strings are not plain literals.
            return match word.to_ascii_lowercase().as_str() {
                "r" | "u" => {
                    self.pos = start;
                    self.parse_strings()
                }
                _ => None,
            };
        }

        match word.as_str() {
            "True" => Some(Literal::Bool(true)),
            "False" => Some(Literal::Bool(false)),
            "None" => Some(Literal::None),
            _ => None,
        }
    }

    /// One or more adjacent string literals, concatenated
    fn parse_strings(&mut self) -> Option<Literal> {
        let mut value = self.parse_string()?;
        loop {
            let checkpoint = self.pos;
            self.skip_whitespace();
            if !self.at_string_start() {
                self.pos = checkpoint;
                break;
            }
            value.push_str(&self.parse_string()?);
        }
        Some(Literal::Str(value))
    }

    fn at_string_start(&self) -> bool {
        match self.peek() {
            Some('\'') | Some('"') => true,
            Some(c) if matches!(c, 'r' | 'R' | 'u' | 'U') => {
                matches!(self.peek_at(1), Some('\'') | Some('"'))
            }
            _ => false,
        }
    }

    fn parse_string(&mut self) -> Option<String> {
        let mut raw = false;
        match self.peek()? {
            'r' | 'R' => {
                raw = true;
                self.pos += 1;
            }
            'u' | 'U' => self.pos += 1,
            _ => {}
        }

        let quote = self.bump()?;
        if quote != '\'' && quote != '"' {
            return None;
        }

        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }

        let mut out = String::new();
        loop {
            let c = self.bump()?;

            if c == quote {
                if !triple {
                    return Some(out);
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.pos += 2;
                    return Some(out);
                }
                out.push(c);
                continue;
            }

            match c {
                '\n' if !triple => return None,
                '\\' if raw => {
                    // Raw strings keep the backslash; it still protects the next char
                    out.push('\\');
                    out.push(self.bump()?);
                }
                '\\' => self.parse_escape(&mut out)?,
                _ => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Option<()> {
        let c = self.bump()?;
        match c {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut code = c.to_digit(8)?;
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code)?);
            }
            'x' => out.push(self.parse_hex_escape(2)?),
            'u' => out.push(self.parse_hex_escape(4)?),
            'U' => out.push(self.parse_hex_escape(8)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Some(())
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..digits {
            let d = self.bump()?.to_digit(16)?;
            code = code.checked_mul(16)?.checked_add(d)?;
        }
        char::from_u32(code)
    }

    /// A single sign applied directly to a numeric literal
    fn parse_signed_number(&mut self) -> Option<Literal> {
        let negative = self.bump()? == '-';
        self.skip_whitespace();

        let starts_number = match self.peek()? {
            c if c.is_ascii_digit() => true,
            '.' => matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()),
            _ => false,
        };
        if !starts_number {
            return None;
        }

        match self.parse_number()? {
            Literal::Int(i) if negative => Some(Literal::Int(-i)),
            Literal::Float(x) if negative => Some(Literal::Float(-x)),
            value => Some(value),
        }
    }

    fn parse_number(&mut self) -> Option<Literal> {
        let start = self.pos;
        let radix_prefixed = self.peek() == Some('0')
            && matches!(self.peek_at(1), Some(c) if "xXoObB".contains(c));

        while let Some(c) = self.peek() {
            let is_exponent_sign = !radix_prefixed
                && (c == '+' || c == '-')
                && matches!(self.chars.get(self.pos.wrapping_sub(1)), Some('e') | Some('E'));
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || is_exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }

        let token: String = self.chars[start..self.pos].iter().collect();
        parse_number_token(&token)
    }
}

// ============================================================================
// NUMBERS
// ============================================================================

fn parse_number_token(token: &str) -> Option<Literal> {
    if !valid_underscores(token) {
        return None;
    }
    let digits: String = token.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            if rest.is_empty() {
                return None;
            }
            return i128::from_str_radix(rest, radix).ok().map(Literal::Int);
        }
    }

    if lower.contains('.') || lower.contains('e') {
        if !lower
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | '+' | '-'))
        {
            return None;
        }
        return lower.parse::<f64>().ok().map(Literal::Float);
    }

    if !lower.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // Leading zeros are only legal for zero itself
    if lower.len() > 1 && lower.starts_with('0') && lower.chars().any(|c| c != '0') {
        return None;
    }
    lower.parse::<i128>().ok().map(Literal::Int)
}

/// Underscores only between digits
fn valid_underscores(token: &str) -> bool {
    let chars: Vec<char> = token.chars().collect();
    chars.iter().enumerate().all(|(i, &c)| {
        if c != '_' {
            return true;
        }
        let before = i.checked_sub(1).and_then(|j| chars.get(j));
        let after = chars.get(i + 1);
        matches!(before, Some(b) if b.is_ascii_alphanumeric())
            && matches!(after, Some(a) if a.is_ascii_hexdigit())
    })
}

/// Python's `repr(float)`: shortest round-trip digits, `.0` on integral values,
/// scientific notation outside [1e-4, 1e16)
pub fn python_float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }

    let scientific = format!("{:e}", x);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (scientific.clone(), 0),
    };

    if (-4..16).contains(&exponent) {
        let fixed = format!("{}", x);
        if fixed.contains('.') {
            fixed
        } else {
            format!("{}.0", fixed)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

// ============================================================================
// STRINGS
// ============================================================================

/// Python's `repr(str)`: single quotes unless the text holds only single quotes
pub fn python_str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || ((c as u32) >= 0x7f && (c as u32) <= 0xa0) => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(items: &[&str]) -> Vec<Literal> {
        items.iter().map(|s| Literal::str(*s)).collect()
    }

    #[test]
    fn test_parse_list_of_strings() {
        assert_eq!(
            parse_literal("['Alice', \"Bob\"]"),
            ParseOutcome::Sequence(strs(&["Alice", "Bob"]))
        );
    }

    #[test]
    fn test_parse_empty_list_and_trailing_comma() {
        assert_eq!(parse_literal("[]"), ParseOutcome::Sequence(vec![]));
        assert_eq!(
            parse_literal(" [ 'a' , 'b', ] "),
            ParseOutcome::Sequence(strs(&["a", "b"]))
        );
    }

    #[test]
    fn test_parse_nested_and_mixed_list() {
        let outcome = parse_literal("[1, 2.5, None, True, ['x']]");
        assert_eq!(
            outcome,
            ParseOutcome::Sequence(vec![
                Literal::Int(1),
                Literal::Float(2.5),
                Literal::None,
                Literal::Bool(true),
                Literal::List(strs(&["x"])),
            ])
        );
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_literal("'rose'"), ParseOutcome::Scalar(Literal::str("rose")));
        assert_eq!(parse_literal("42"), ParseOutcome::Scalar(Literal::Int(42)));
        assert_eq!(parse_literal("-3"), ParseOutcome::Scalar(Literal::Int(-3)));
        assert_eq!(parse_literal("1e3"), ParseOutcome::Scalar(Literal::Float(1000.0)));
        assert_eq!(parse_literal(".5"), ParseOutcome::Scalar(Literal::Float(0.5)));
        assert_eq!(parse_literal("0x1F"), ParseOutcome::Scalar(Literal::Int(31)));
        assert_eq!(parse_literal("1_000"), ParseOutcome::Scalar(Literal::Int(1000)));
        assert_eq!(parse_literal("None"), ParseOutcome::Scalar(Literal::None));
    }

    #[test]
    fn test_tuple_is_scalar() {
        assert_eq!(
            parse_literal("'a', 'b'"),
            ParseOutcome::Scalar(Literal::Tuple(strs(&["a", "b"])))
        );
        assert_eq!(
            parse_literal("('a',)"),
            ParseOutcome::Scalar(Literal::Tuple(strs(&["a"])))
        );
        assert_eq!(parse_literal("('a')"), ParseOutcome::Scalar(Literal::str("a")));
        assert_eq!(parse_literal("()"), ParseOutcome::Scalar(Literal::Tuple(vec![])));
    }

    #[test]
    fn test_string_escapes_and_prefixes() {
        assert_eq!(
            parse_literal(r"'it\'s\n\x41\u00e9'"),
            ParseOutcome::Scalar(Literal::str("it's\nAé"))
        );
        assert_eq!(
            parse_literal(r"r'C:\path'"),
            ParseOutcome::Scalar(Literal::str(r"C:\path"))
        );
        assert_eq!(parse_literal("u'moon'"), ParseOutcome::Scalar(Literal::str("moon")));
        assert_eq!(
            parse_literal("'''three\nlines'''"),
            ParseOutcome::Scalar(Literal::str("three\nlines"))
        );
        assert_eq!(
            parse_literal("'sun' 'flower'"),
            ParseOutcome::Scalar(Literal::str("sunflower"))
        );
        assert_eq!(
            parse_literal(r"'\d'"),
            ParseOutcome::Scalar(Literal::str(r"\d"))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let deepest = format!("{}{}", "[".repeat(MAX_NESTING), "]".repeat(MAX_NESTING));
        assert!(matches!(parse_literal(&deepest), ParseOutcome::Sequence(_)));

        let too_deep = format!("{}{}", "[".repeat(MAX_NESTING + 1), "]".repeat(MAX_NESTING + 1));
        assert!(parse_literal(&too_deep).is_failed());
        assert!(parse_literal(&"(".repeat(5_000)).is_failed());
        assert!(parse_literal(&"[".repeat(200_000)).is_failed());
    }

    #[test]
    fn test_parse_failures() {
        for text in [
            "Bob",
            "happy, sad",
            "",
            "   ",
            "[1, 2",
            "['a' 'b'",
            "{'a': 1}",
            "b'bytes'",
            "007",
            "--1",
            "1 + 2",
            "'unterminated",
            "'line\nbreak'",
            "[a]",
            "1__0",
        ] {
            assert!(parse_literal(text).is_failed(), "expected failure for {:?}", text);
        }
    }

    #[test]
    fn test_display_matches_python_str() {
        assert_eq!(Literal::str("Alice").to_string(), "Alice");
        assert_eq!(Literal::Float(1.0).to_string(), "1.0");
        assert_eq!(Literal::Bool(false).to_string(), "False");
        assert_eq!(Literal::List(strs(&["a", "b"])).to_string(), "['a', 'b']");
        assert_eq!(Literal::Tuple(vec![Literal::Int(1)]).to_string(), "(1,)");
    }

    #[test]
    fn test_identity_is_trimmed_display() {
        assert_eq!(Literal::str("  Alice ").identity(), "Alice");
        assert_eq!(Literal::Int(7).identity(), "7");
        assert_eq!(Literal::str("   ").identity(), "");
    }

    #[test]
    fn test_python_float_repr() {
        assert_eq!(python_float_repr(0.1), "0.1");
        assert_eq!(python_float_repr(3.0), "3.0");
        assert_eq!(python_float_repr(-0.0), "-0.0");
        assert_eq!(python_float_repr(1e16), "1e+16");
        assert_eq!(python_float_repr(1.5e-5), "1.5e-05");
        assert_eq!(python_float_repr(123456.789), "123456.789");
        assert_eq!(python_float_repr(f64::NAN), "nan");
    }

    #[test]
    fn test_python_str_repr() {
        assert_eq!(python_str_repr("Alice"), "'Alice'");
        assert_eq!(python_str_repr("O'Neil"), "\"O'Neil\"");
        assert_eq!(python_str_repr("say \"hi\" it's"), "'say \"hi\" it\\'s'");
        assert_eq!(python_str_repr("a\\b\n"), "'a\\\\b\\n'");
    }

    #[test]
    fn test_repr_reparses_to_same_list() {
        let items = vec![
            Literal::str("O'Neil"),
            Literal::str("line\nbreak"),
            Literal::Int(3),
            Literal::Float(0.25),
        ];
        let text = Literal::List(items.clone()).repr();
        assert_eq!(parse_literal(&text), ParseOutcome::Sequence(items));
    }
}
