// File: src/lexer.rs
//
// Lexical layer for the VB6 parser.
// There is no separate token stream: the grammar drives a Cursor over the
// source buffer and recognizes tokens in place.
//
// Supports:
// - Case-insensitive keywords with word boundaries, and the reserved subset
//   that can never be an identifier
// - Identifiers: letter, '_' or '£' first, then alphanumerics, '_', '£'
// - Numeric literals with type suffixes (% & ! #), hex (&H) and octal (&O, &0)
// - String literals with "" as an escaped quote
// - Comments starting with ' or Rem, up to the end of the line
// - Statement terminators: end of line, ':' or end of input
// - Blanks (space, tab) and " _" line continuations are skipped; newlines are not

use ahash::AHashMap;
use once_cell::sync::Lazy;

use crate::ast::{Literal, RelationalOperator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Alias,
    As,
    Attribute,
    Base,
    Binary,
    ByRef,
    ByVal,
    Call,
    Case,
    Compare,
    Const,
    Declare,
    Dim,
    Do,
    Each,
    Else,
    ElseIf,
    End,
    Enum,
    Error,
    Event,
    Exit,
    Explicit,
    False,
    For,
    Friend,
    Function,
    Get,
    Global,
    GoSub,
    GoTo,
    If,
    In,
    Is,
    Let,
    Lib,
    Local,
    Loop,
    Module,
    New,
    Next,
    Nothing,
    On,
    Option,
    Optional,
    ParamArray,
    Preserve,
    Private,
    Property,
    Public,
    RaiseEvent,
    ReDim,
    Rem,
    Resume,
    Return,
    Select,
    Set,
    Static,
    Step,
    Sub,
    Text,
    Then,
    To,
    True,
    Type,
    Until,
    Wend,
    While,
    With,
    WithEvents,
}

/// Every keyword the grammar knows, in alphabetical order
pub const KEYWORDS: &[Keyword] = &[
    Keyword::Alias,
    Keyword::As,
    Keyword::Attribute,
    Keyword::Base,
    Keyword::Binary,
    Keyword::ByRef,
    Keyword::ByVal,
    Keyword::Call,
    Keyword::Case,
    Keyword::Compare,
    Keyword::Const,
    Keyword::Declare,
    Keyword::Dim,
    Keyword::Do,
    Keyword::Each,
    Keyword::Else,
    Keyword::ElseIf,
    Keyword::End,
    Keyword::Enum,
    Keyword::Error,
    Keyword::Event,
    Keyword::Exit,
    Keyword::Explicit,
    Keyword::False,
    Keyword::For,
    Keyword::Friend,
    Keyword::Function,
    Keyword::Get,
    Keyword::Global,
    Keyword::GoSub,
    Keyword::GoTo,
    Keyword::If,
    Keyword::In,
    Keyword::Is,
    Keyword::Let,
    Keyword::Lib,
    Keyword::Local,
    Keyword::Loop,
    Keyword::Module,
    Keyword::New,
    Keyword::Next,
    Keyword::Nothing,
    Keyword::On,
    Keyword::Option,
    Keyword::Optional,
    Keyword::ParamArray,
    Keyword::Preserve,
    Keyword::Private,
    Keyword::Property,
    Keyword::Public,
    Keyword::RaiseEvent,
    Keyword::ReDim,
    Keyword::Rem,
    Keyword::Resume,
    Keyword::Return,
    Keyword::Select,
    Keyword::Set,
    Keyword::Static,
    Keyword::Step,
    Keyword::Sub,
    Keyword::Text,
    Keyword::Then,
    Keyword::To,
    Keyword::True,
    Keyword::Type,
    Keyword::Until,
    Keyword::Wend,
    Keyword::While,
    Keyword::With,
    Keyword::WithEvents,
];

/// Keywords that are rejected as identifiers. Everything else in
/// [`KEYWORDS`] may also name a variable or member (`frm.Type`, `Text`).
pub const RESERVED: &[Keyword] = &[
    Keyword::For,
    Keyword::Each,
    Keyword::Step,
    Keyword::To,
    Keyword::Next,
    Keyword::End,
    Keyword::While,
    Keyword::Wend,
    Keyword::Loop,
    Keyword::Do,
    Keyword::Until,
    Keyword::If,
    Keyword::Else,
    Keyword::ElseIf,
    Keyword::Exit,
    Keyword::Select,
    Keyword::Case,
    Keyword::Public,
    Keyword::Private,
    Keyword::Global,
    Keyword::Dim,
    Keyword::Get,
    Keyword::Set,
    Keyword::Let,
    Keyword::On,
    Keyword::Local,
    Keyword::GoTo,
    Keyword::GoSub,
    Keyword::Return,
    Keyword::Call,
    Keyword::RaiseEvent,
    Keyword::Sub,
    Keyword::Function,
    Keyword::Event,
    Keyword::Property,
    Keyword::ByVal,
    Keyword::ByRef,
    Keyword::As,
    Keyword::In,
    Keyword::Option,
];

static KEYWORD_TABLE: Lazy<AHashMap<String, Keyword>> =
    Lazy::new(|| KEYWORDS.iter().map(|kw| (kw.as_str().to_ascii_lowercase(), *kw)).collect());

impl Keyword {
    /// Canonical spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Alias => "Alias",
            Keyword::As => "As",
            Keyword::Attribute => "Attribute",
            Keyword::Base => "Base",
            Keyword::Binary => "Binary",
            Keyword::ByRef => "ByRef",
            Keyword::ByVal => "ByVal",
            Keyword::Call => "Call",
            Keyword::Case => "Case",
            Keyword::Compare => "Compare",
            Keyword::Const => "Const",
            Keyword::Declare => "Declare",
            Keyword::Dim => "Dim",
            Keyword::Do => "Do",
            Keyword::Each => "Each",
            Keyword::Else => "Else",
            Keyword::ElseIf => "ElseIf",
            Keyword::End => "End",
            Keyword::Enum => "Enum",
            Keyword::Error => "Error",
            Keyword::Event => "Event",
            Keyword::Exit => "Exit",
            Keyword::Explicit => "Explicit",
            Keyword::False => "False",
            Keyword::For => "For",
            Keyword::Friend => "Friend",
            Keyword::Function => "Function",
            Keyword::Get => "Get",
            Keyword::Global => "Global",
            Keyword::GoSub => "GoSub",
            Keyword::GoTo => "GoTo",
            Keyword::If => "If",
            Keyword::In => "In",
            Keyword::Is => "Is",
            Keyword::Let => "Let",
            Keyword::Lib => "Lib",
            Keyword::Local => "Local",
            Keyword::Loop => "Loop",
            Keyword::Module => "Module",
            Keyword::New => "New",
            Keyword::Next => "Next",
            Keyword::Nothing => "Nothing",
            Keyword::On => "On",
            Keyword::Option => "Option",
            Keyword::Optional => "Optional",
            Keyword::ParamArray => "ParamArray",
            Keyword::Preserve => "Preserve",
            Keyword::Private => "Private",
            Keyword::Property => "Property",
            Keyword::Public => "Public",
            Keyword::RaiseEvent => "RaiseEvent",
            Keyword::ReDim => "ReDim",
            Keyword::Rem => "Rem",
            Keyword::Resume => "Resume",
            Keyword::Return => "Return",
            Keyword::Select => "Select",
            Keyword::Set => "Set",
            Keyword::Static => "Static",
            Keyword::Step => "Step",
            Keyword::Sub => "Sub",
            Keyword::Text => "Text",
            Keyword::Then => "Then",
            Keyword::To => "To",
            Keyword::True => "True",
            Keyword::Type => "Type",
            Keyword::Until => "Until",
            Keyword::Wend => "Wend",
            Keyword::While => "While",
            Keyword::With => "With",
            Keyword::WithEvents => "WithEvents",
        }
    }

    /// Case-insensitive lookup of a whole word
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORD_TABLE.get(&word.to_ascii_lowercase()).copied()
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED.contains(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    Plus,
    Minus,
    Mult,
    Div,
    IntDiv,
    Exp,
    Concat,
    Mod,
    And,
    Or,
    Xor,
    Not,
    Eqv,
    Imp,
    Like,
    Is,
}

/// Symbolic operators, longest spelling first so `<=` wins over `<`
pub const SYMBOL_OPERATORS: &[(&str, Operator)] = &[
    ("<=", Operator::LessEqual),
    (">=", Operator::GreaterEqual),
    ("<>", Operator::NotEqual),
    ("<", Operator::Less),
    (">", Operator::Greater),
    ("=", Operator::Equal),
    ("+", Operator::Plus),
    ("-", Operator::Minus),
    ("*", Operator::Mult),
    ("/", Operator::Div),
    ("\\", Operator::IntDiv),
    ("^", Operator::Exp),
    ("&", Operator::Concat),
];

pub const WORD_OPERATORS: &[(&str, Operator)] = &[
    ("Mod", Operator::Mod),
    ("And", Operator::And),
    ("Or", Operator::Or),
    ("Xor", Operator::Xor),
    ("Not", Operator::Not),
    ("Eqv", Operator::Eqv),
    ("Imp", Operator::Imp),
    ("Like", Operator::Like),
    ("Is", Operator::Is),
];

impl Operator {
    pub fn relational(&self) -> Option<RelationalOperator> {
        match self {
            Operator::Less => Some(RelationalOperator::Less),
            Operator::Greater => Some(RelationalOperator::Greater),
            Operator::LessEqual => Some(RelationalOperator::LessEqual),
            Operator::GreaterEqual => Some(RelationalOperator::GreaterEqual),
            Operator::Equal => Some(RelationalOperator::Equal),
            Operator::NotEqual => Some(RelationalOperator::NotEqual),
            _ => None,
        }
    }
}

pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '£'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '£'
}

/// Position in the source buffer plus the in-place token recognizers.
///
/// Recognizers that return `None`/`false` leave the position where it was.
/// All of them except [`Cursor::eat_eol`] and [`Cursor::blank_line`] skip
/// leading blanks first.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    src: &'src str,
    pos: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(src: &'src str) -> Self {
        Cursor { src, pos: 0 }
    }

    pub fn source(&self) -> &'src str {
        self.src
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn rest(&self) -> &'src str {
        &self.src[self.pos..]
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    /// Skips spaces, tabs, and `" _"` line continuations
    pub fn skip_blanks(&mut self) {
        loop {
            while let Some(c @ (' ' | '\t')) = self.peek_char() {
                self.bump(c);
            }
            if !self.line_continuation() {
                break;
            }
        }
    }

    fn line_continuation(&mut self) -> bool {
        let after_blank = self.pos > 0 && matches!(self.src.as_bytes()[self.pos - 1], b' ' | b'\t');
        if !after_blank || self.peek_char() != Some('_') {
            return false;
        }
        let start = self.pos;
        self.pos += 1;
        while let Some(c @ (' ' | '\t')) = self.peek_char() {
            self.bump(c);
        }
        if self.eat_eol() {
            true
        } else {
            self.pos = start;
            false
        }
    }

    /// Consumes one line break: `\r\n`, `\n` or `\r`
    pub fn eat_eol(&mut self) -> bool {
        let rest = self.rest();
        if rest.starts_with("\r\n") {
            self.pos += 2;
            true
        } else if rest.starts_with('\n') || rest.starts_with('\r') {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn eat_char(&mut self, expected: char) -> bool {
        let start = self.pos;
        self.skip_blanks();
        if self.peek_char() == Some(expected) {
            self.bump(expected);
            true
        } else {
            self.pos = start;
            false
        }
    }

    /// Matches `expected` at the current position, no blanks skipped
    pub fn eat_adjacent(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.bump(expected);
            true
        } else {
            false
        }
    }

    pub fn eat_str(&mut self, expected: &str) -> bool {
        let start = self.pos;
        self.skip_blanks();
        if self.rest().starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            self.pos = start;
            false
        }
    }

    /// Matches `kw` case-insensitively, not followed by an identifier character
    pub fn eat_keyword(&mut self, kw: Keyword) -> bool {
        let start = self.pos;
        self.skip_blanks();
        let text = kw.as_str();
        let rest = self.rest();
        let matched = rest.len() >= text.len()
            && rest.is_char_boundary(text.len())
            && rest[..text.len()].eq_ignore_ascii_case(text)
            && !rest[text.len()..].chars().next().is_some_and(is_ident_char);
        if matched {
            self.pos += text.len();
            true
        } else {
            self.pos = start;
            false
        }
    }

    pub fn peek_keyword(&mut self, kw: Keyword) -> bool {
        let start = self.pos;
        let found = self.eat_keyword(kw);
        self.pos = start;
        found
    }

    /// Any identifier-shaped word, reserved or not
    pub fn word(&mut self) -> Option<&'src str> {
        let start = self.pos;
        self.skip_blanks();
        let word_start = self.pos;
        match self.peek_char() {
            Some(c) if is_ident_start(c) => self.bump(c),
            _ => {
                self.pos = start;
                return None;
            }
        }
        while let Some(c) = self.peek_char().filter(|c| is_ident_char(*c)) {
            self.bump(c);
        }
        Some(&self.src[word_start..self.pos])
    }

    /// Looks at the next word without consuming it
    pub fn peek_word(&mut self) -> Option<&'src str> {
        let start = self.pos;
        let word = self.word();
        self.pos = start;
        word
    }

    /// Identifier that is not a reserved word. `End` is rejected,
    /// `EndValue` is accepted.
    pub fn identifier(&mut self) -> Option<&'src str> {
        let start = self.pos;
        let word = self.word()?;
        if Keyword::lookup(word).is_some_and(|kw| kw.is_reserved()) {
            self.pos = start;
            return None;
        }
        Some(word)
    }

    /// `"..."` with `""` standing for one quote; no line breaks inside
    pub fn quoted_string(&mut self) -> Option<String> {
        let start = self.pos;
        self.skip_blanks();
        if self.peek_char() != Some('"') {
            self.pos = start;
            return None;
        }
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.pos += 1;
                    if self.peek_char() == Some('"') {
                        self.pos += 1;
                        value.push('"');
                    } else {
                        return Some(value);
                    }
                }
                Some('\r' | '\n') | None => {
                    self.pos = start;
                    return None;
                }
                Some(c) => {
                    self.bump(c);
                    value.push(c);
                }
            }
        }
    }

    /// Numeric literal, optionally signed.
    ///
    /// Suffixes pick the variant: `%` integer, `&` long, `!` single,
    /// `#` double. Without a suffix a decimal point (or exponent) means
    /// single, and an integer takes the narrowest of integer, long, double
    /// that holds it. `&H`/`&O`/`&0` prefixes give hex and octal.
    pub fn number(&mut self) -> Option<Literal> {
        let start = self.pos;
        self.skip_blanks();
        let literal = self.number_body();
        let at_boundary = !self.peek_char().is_some_and(is_ident_char);
        match literal {
            Some(lit) if at_boundary => Some(lit),
            _ => {
                self.pos = start;
                None
            }
        }
    }

    fn number_body(&mut self) -> Option<Literal> {
        let negative = match self.peek_char() {
            Some('-') => {
                self.pos += 1;
                true
            }
            Some('+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };
        if self.peek_char() == Some('&') {
            return self.radix_number(negative);
        }

        let digits_start = self.pos;
        let int_digits = self.eat_digits(10);
        let mut is_real = false;
        if self.peek_char() == Some('.') && self.rest()[1..].starts_with(|c: char| c.is_ascii_digit()) {
            self.pos += 1;
            self.eat_digits(10);
            is_real = true;
        } else if int_digits == 0 {
            return None;
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.pos += 1;
            }
            if self.eat_digits(10) > 0 {
                is_real = true;
            } else {
                self.pos = mark;
            }
        }
        let text = &self.src[digits_start..self.pos];
        let sign = if negative { "-" } else { "" };
        let signed = format!("{}{}", sign, text);

        match self.peek_char() {
            Some('!') => {
                self.pos += 1;
                signed.parse::<f32>().ok().map(Literal::Single)
            }
            Some('#') => {
                self.pos += 1;
                signed.parse::<f64>().ok().map(Literal::Double)
            }
            Some('%') if !is_real => {
                self.pos += 1;
                signed.parse::<i16>().ok().map(Literal::IntegerDec)
            }
            Some('&') if !is_real => {
                self.pos += 1;
                signed.parse::<i32>().ok().map(Literal::LongDec)
            }
            _ if is_real => signed.parse::<f32>().ok().map(Literal::Single),
            _ => {
                if let Ok(v) = signed.parse::<i16>() {
                    Some(Literal::IntegerDec(v))
                } else if let Ok(v) = signed.parse::<i32>() {
                    Some(Literal::LongDec(v))
                } else {
                    signed.parse::<f64>().ok().map(Literal::Double)
                }
            }
        }
    }

    /// `&H...` or `&O...`/`&0...`, cursor on the `&`
    fn radix_number(&mut self, negative: bool) -> Option<Literal> {
        self.pos += 1;
        let radix = match self.peek_char() {
            Some('H' | 'h') => 16,
            Some('O' | 'o' | '0') => 8,
            _ => return None,
        };
        self.pos += 1;
        let digits_start = self.pos;
        if self.eat_digits(radix) == 0 {
            return None;
        }
        let raw = u32::from_str_radix(&self.src[digits_start..self.pos], radix).ok()?;
        let suffix = self.peek_char();
        if matches!(suffix, Some('&' | '%')) {
            self.pos += 1;
        }
        let long = match suffix {
            Some('&') => true,
            Some('%') => {
                if raw > u16::MAX as u32 {
                    return None;
                }
                false
            }
            _ => raw > u16::MAX as u32,
        };
        // Literals are two's complement: &HFFFF% is -1
        let lit = if long {
            let v = (raw as i32).wrapping_mul(if negative { -1 } else { 1 });
            if radix == 16 {
                Literal::LongHex(v)
            } else {
                Literal::LongOct(v)
            }
        } else {
            let v = (raw as u16 as i16).wrapping_mul(if negative { -1 } else { 1 });
            if radix == 16 {
                Literal::IntegerHex(v)
            } else {
                Literal::IntegerOct(v)
            }
        };
        Some(lit)
    }

    fn eat_digits(&mut self, radix: u32) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek_char().filter(|c| c.is_digit(radix)) {
            self.bump(c);
            count += 1;
        }
        count
    }

    /// Comment body after `'` or `Rem`, up to but excluding the line break
    pub fn comment(&mut self) -> Option<&'src str> {
        let start = self.pos;
        self.skip_blanks();
        if self.peek_char() == Some('\'') {
            self.pos += 1;
        } else if !self.eat_keyword(Keyword::Rem) {
            self.pos = start;
            return None;
        }
        let body_start = self.pos;
        let len = self.rest().find(['\r', '\n']).unwrap_or(self.rest().len());
        self.pos += len;
        Some(&self.src[body_start..self.pos])
    }

    /// A line holding only blanks, line break included. Returns false at
    /// end of input so that repetition over blank lines always advances.
    pub fn blank_line(&mut self) -> bool {
        let start = self.pos;
        while let Some(c @ (' ' | '\t')) = self.peek_char() {
            self.bump(c);
        }
        if self.eat_eol() {
            true
        } else {
            self.pos = start;
            false
        }
    }

    /// Rest of the physical line: blanks, an optional trailing comment
    /// (discarded), then a line break or end of input
    pub fn eat_line_end(&mut self) -> bool {
        let start = self.pos;
        self.skip_blanks();
        self.comment();
        if self.eat_eol() || self.is_eof() {
            true
        } else {
            self.pos = start;
            false
        }
    }

    /// Statement terminator: `:` or [`Cursor::eat_line_end`]
    pub fn end_of_statement(&mut self) -> bool {
        self.eat_char(':') || self.eat_line_end()
    }

    /// Operator starting at the next non-blank character, if any
    pub fn peek_operator(&mut self) -> Option<Operator> {
        let start = self.pos;
        self.skip_blanks();
        let rest = self.rest();
        let found = SYMBOL_OPERATORS
            .iter()
            .find(|(text, _)| rest.starts_with(text))
            .map(|(_, op)| *op)
            .or_else(|| {
                let word = self.peek_word()?;
                WORD_OPERATORS
                    .iter()
                    .find(|(text, _)| text.eq_ignore_ascii_case(word))
                    .map(|(_, op)| *op)
            });
        self.pos = start;
        found
    }

    /// Relational operator, consumed
    pub fn relational_operator(&mut self) -> Option<RelationalOperator> {
        for (text, op) in SYMBOL_OPERATORS {
            if let Some(rel) = op.relational() {
                if self.eat_str(text) {
                    return Some(rel);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(Keyword::lookup("elseif"), Some(Keyword::ElseIf));
        assert_eq!(Keyword::lookup("WITHEVENTS"), Some(Keyword::WithEvents));
        assert_eq!(Keyword::lookup("Print"), None);
        assert_eq!(KEYWORDS.len(), 70);
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        let mut c = Cursor::new("EndValue");
        assert!(!c.eat_keyword(Keyword::End));
        assert_eq!(c.pos(), 0);

        let mut c = Cursor::new("  end If");
        assert!(c.eat_keyword(Keyword::End));
        assert!(c.eat_keyword(Keyword::If));
        assert!(c.is_eof());
    }

    #[test]
    fn test_identifier_rejects_reserved_words_only() {
        assert_eq!(Cursor::new("End").identifier(), None);
        assert_eq!(Cursor::new("EndValue").identifier(), Some("EndValue"));
        assert_eq!(Cursor::new("Type").identifier(), Some("Type"));
        assert_eq!(Cursor::new("£total_1 x").identifier(), Some("£total_1"));
        assert_eq!(Cursor::new("1abc").identifier(), None);
    }

    #[test]
    fn test_numeric_suffixes() {
        assert_eq!(Cursor::new("1234%").number(), Some(Literal::IntegerDec(1234)));
        assert_eq!(Cursor::new("1234&").number(), Some(Literal::LongDec(1234)));
        assert_eq!(Cursor::new("&Hcafedead&").number(), Some(Literal::LongHex(0xCAFE_DEADu32 as i32)));
        assert_eq!(Cursor::new("&01234&").number(), Some(Literal::LongOct(0o1234)));
        assert_eq!(Cursor::new("&O17").number(), Some(Literal::IntegerOct(0o17)));
        assert_eq!(Cursor::new("&HFFFF%").number(), Some(Literal::IntegerHex(-1)));
        assert_eq!(Cursor::new("1234!").number(), Some(Literal::Single(1234.0)));
        assert_eq!(Cursor::new("1234#").number(), Some(Literal::Double(1234.0)));
        assert_eq!(Cursor::new("2.8").number(), Some(Literal::Single(2.8)));
        assert_eq!(Cursor::new("-1").number(), Some(Literal::IntegerDec(-1)));
        assert_eq!(Cursor::new("40000").number(), Some(Literal::LongDec(40000)));
    }

    #[test]
    fn test_number_requires_boundary() {
        let mut c = Cursor::new("12abc");
        assert_eq!(c.number(), None);
        assert_eq!(c.pos(), 0);
        assert_eq!(Cursor::new("7Up").number(), None);
    }

    #[test]
    fn test_quoted_string_with_doubled_quotes() {
        assert_eq!(Cursor::new("\"Quoted string.\"").quoted_string().as_deref(), Some("Quoted string."));
        assert_eq!(Cursor::new("\"say \"\"hi\"\"\"").quoted_string().as_deref(), Some("say \"hi\""));
        assert_eq!(Cursor::new("\"open\r\n").quoted_string(), None);
    }

    #[test]
    fn test_comment_body_excludes_marker_and_line_break() {
        let mut c = Cursor::new("' This is comment line 1\r\nnext");
        assert_eq!(c.comment(), Some(" This is comment line 1"));
        assert!(c.eat_eol());
        assert_eq!(Cursor::new("Rem old code").comment(), Some(" old code"));
        assert_eq!(Cursor::new("Remark = 1").comment(), None);
    }

    #[test]
    fn test_terminators() {
        assert!(Cursor::new("  : x").end_of_statement());
        assert!(Cursor::new("\r\n").end_of_statement());
        assert!(Cursor::new("   ").end_of_statement());
        assert!(Cursor::new(" ' trailing\n").end_of_statement());
        assert!(!Cursor::new(" x\n").end_of_statement());
    }

    #[test]
    fn test_line_continuation_is_a_blank() {
        let mut c = Cursor::new("a _\r\n    b");
        assert_eq!(c.identifier(), Some("a"));
        assert_eq!(c.identifier(), Some("b"));
    }

    #[test]
    fn test_blank_line_never_matches_at_end_of_input() {
        assert!(Cursor::new("   \n").blank_line());
        assert!(!Cursor::new("   ").blank_line());
        assert!(!Cursor::new(" x\n").blank_line());
    }

    #[test]
    fn test_operators() {
        assert_eq!(Cursor::new(" <= 3").peek_operator(), Some(Operator::LessEqual));
        assert_eq!(Cursor::new(" And b").peek_operator(), Some(Operator::And));
        assert_eq!(Cursor::new(" Andy").peek_operator(), None);
        let mut c = Cursor::new("<> 3");
        assert_eq!(c.relational_operator(), Some(RelationalOperator::NotEqual));
        assert_eq!(c.number(), Some(Literal::IntegerDec(3)));
    }
}
