// File: src/errors.rs
//
// Error handling and reporting for the VB6 parser.
// Provides the structured parse error raised at commit points, the
// diagnostic sink that stamps and logs it, and pretty-printed reports
// with source location information.

use colored::Colorize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::lexer::{Keyword, KEYWORDS};

/// Source location information for tracking where code appears in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub file: Option<String>,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column, file: None }
    }

    pub fn unknown() -> Self {
        Self { line: 0, column: 0, file: None }
    }

    /// Resolves a byte offset into a 1-based line and column.
    ///
    /// `\r\n`, `\n` and a lone `\r` all count as one line break, matching
    /// the statement terminator. Columns count characters, not bytes.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = clamp_to_char_boundary(source, offset);
        let mut line = 1;
        let mut line_start = 0;
        let bytes = source.as_bytes();
        let mut i = 0;
        while i < offset {
            match bytes[i] {
                b'\n' => {
                    line += 1;
                    line_start = i + 1;
                }
                b'\r' => {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        i += 1;
                        if i >= offset {
                            break;
                        }
                    }
                    line += 1;
                    line_start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        let column = source[line_start..offset].chars().count() + 1;
        Self::new(line, column)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Types of errors the parser can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required token was missing after a commit point
    Syntax,
    /// Top-level items appear in an order the grouped module view rejects
    ModuleLayout,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "Syntax Error"),
            ErrorKind::ModuleLayout => write!(f, "Module Layout Error"),
            ErrorKind::Io => write!(f, "I/O Error"),
        }
    }
}

/// A hard failure, located against the parsed buffer.
///
/// `Display` gives the one-line form
/// `<context>: expecting <description> here: <snippet>`; [`ParseError::render`]
/// gives the full multi-line report.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{context}: expecting {expected} here: {snippet}")]
pub struct ParseError {
    pub kind: ErrorKind,
    /// Name of the innermost grammar rule active at the failure
    pub context: String,
    pub expected: String,
    /// Byte offset of the failure point from the start of the buffer
    pub offset: usize,
    pub location: SourceLocation,
    pub snippet: String,
    pub source_line: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
    pub note: Option<String>,
}

impl ParseError {
    pub fn new(kind: ErrorKind, context: impl Into<String>, expected: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            context: context.into(),
            expected: expected.into(),
            offset,
            location: SourceLocation::unknown(),
            snippet: String::new(),
            source_line: None,
            suggestion: None,
            help: None,
            note: None,
        }
    }

    /// Create a syntax error and locate it against `source`
    pub fn syntax(
        context: impl Into<String>,
        expected: impl Into<String>,
        source: &str,
        offset: usize,
        snippet_width: usize,
    ) -> Self {
        Self::new(ErrorKind::Syntax, context, expected, offset).locate(source, snippet_width)
    }

    /// A source file that could not be read
    pub fn io(file: &str, err: &std::io::Error) -> Self {
        Self::new(ErrorKind::Io, file, "a readable file", 0).with_file(file).with_note(err.to_string())
    }

    /// Fills in line/column, the failing source line and the remaining-input snippet
    pub fn locate(mut self, source: &str, snippet_width: usize) -> Self {
        let offset = clamp_to_char_boundary(source, self.offset);
        self.offset = offset;
        let file = self.location.file.take();
        self.location = SourceLocation::from_offset(source, offset);
        self.location.file = file;
        self.snippet = snippet_at(source, offset, snippet_width);
        self.source_line = Some(line_containing(source, offset).to_string());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.location.file = Some(file.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Pretty report in the compiler style: header, `-->` location, the
    /// offending line with a caret, then help/suggestion/note lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let header = format!("{}", self.kind);
        out.push_str(&format!(
            "{}: {}\n",
            header.red().bold(),
            format!("{}: expecting {}", self.context, self.expected).bold()
        ));
        out.push_str(&format!("{}\n", format!("  --> {}", self.location).bright_blue()));

        if let Some(ref source) = self.source_line {
            let line_num = self.location.line;
            let col_num = self.location.column;
            out.push_str(&format!("   {}\n", "|".bright_blue()));
            out.push_str(&format!(
                "{} {} {}\n",
                format!("{:3}", line_num).bright_blue(),
                "|".bright_blue(),
                source
            ));
            out.push_str(&format!(
                "   {} {}{}\n",
                "|".bright_blue(),
                " ".repeat(col_num.saturating_sub(1)),
                "^".red().bold()
            ));
            out.push_str(&format!("   {}\n", "|".bright_blue()));
        }

        if let Some(ref help) = self.help {
            out.push_str(&format!(
                "   {} {}\n",
                "=".bright_yellow(),
                format!("help: {}", help).bright_yellow()
            ));
        }

        if let Some(ref suggestion) = self.suggestion {
            out.push_str(&format!(
                "   {} {}\n",
                "=".bright_green(),
                format!("Did you mean '{}'?", suggestion).bright_green()
            ));
        }

        if let Some(ref note) = self.note {
            out.push_str(&format!("   {} {}\n", "=".bright_cyan(), format!("note: {}", note).bright_cyan()));
        }

        out
    }
}

/// Diagnostic sink for one parse.
///
/// Holds the buffer being parsed and the label it came from. The driver
/// hands every hard failure to [`ErrorHandler::report`], which locates it
/// if needed, stamps the file name, logs it, and keeps it for later
/// rendering.
#[derive(Debug)]
pub struct ErrorHandler<'src> {
    source: &'src str,
    file: Option<String>,
    snippet_width: usize,
    reported: Vec<ParseError>,
}

impl<'src> ErrorHandler<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, file: None, snippet_width: 40, reported: Vec::new() }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_snippet_width(mut self, width: usize) -> Self {
        self.snippet_width = width;
        self
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn report(&mut self, mut error: ParseError) -> ParseError {
        // Errors built with `ParseError::new` carry no location yet
        if error.source_line.is_none() && error.kind != ErrorKind::Io {
            error = error.locate(self.source, self.snippet_width);
        }
        if let Some(ref file) = self.file {
            error.location.file = Some(file.clone());
        }
        debug!(
            kind = %error.kind,
            offset = error.offset,
            location = %error.location,
            "parse failed: {}",
            error
        );
        self.reported.push(error.clone());
        error
    }

    pub fn diagnostics(&self) -> &[ParseError] {
        &self.reported
    }

    pub fn has_errors(&self) -> bool {
        !self.reported.is_empty()
    }

    pub fn render(&self) -> String {
        self.reported.iter().map(ParseError::render).collect::<Vec<_>>().join("\n")
    }
}

/// Computes the Levenshtein distance between two strings
/// Used for "Did you mean?" suggestions
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    // Two rolling rows are enough
    let mut prev: Vec<usize> = (0..=len2).collect();
    let mut cur = vec![0; len2 + 1];

    for i in 1..=len1 {
        cur[0] = i;
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            cur[j] = std::cmp::min(std::cmp::min(prev[j] + 1, cur[j - 1] + 1), prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev[len2]
}

/// Largest edit distance still worth suggesting for a word of this length
fn suggestion_limit(word: &str) -> usize {
    if word.chars().count() < 5 {
        1
    } else {
        3
    }
}

/// Find the closest candidate, ignoring case.
/// Returns None when nothing is within the distance limit for `target`.
pub fn find_closest_match<'a>(target: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let target_lower = target.to_ascii_lowercase();
    let limit = suggestion_limit(target);

    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(&target_lower, &candidate.to_ascii_lowercase());
        if distance <= limit && distance < best_distance {
            best_distance = distance;
            best_match = Some(*candidate);
        }
    }

    best_match
}

/// Suggests a keyword for a misspelled word, e.g. `Thne` -> `Then`.
/// Exact (case-insensitive) matches are not typos and yield None.
pub fn suggest_keyword(word: &str) -> Option<&'static str> {
    if word.is_empty() || Keyword::lookup(word).is_some() {
        return None;
    }
    let names: Vec<&'static str> = KEYWORDS.iter().map(|kw| kw.as_str()).collect();
    find_closest_match(word, &names)
}

fn clamp_to_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn line_containing(source: &str, offset: usize) -> &str {
    let start = source[..offset].rfind(['\n', '\r']).map(|i| i + 1).unwrap_or(0);
    let end = source[offset..].find(['\n', '\r']).map(|i| offset + i).unwrap_or(source.len());
    &source[start..end]
}

/// Remaining unconsumed input, line breaks made visible, cut at `width` chars
fn snippet_at(source: &str, offset: usize, width: usize) -> String {
    let rest = &source[offset..];
    if rest.is_empty() {
        return "<end of input>".to_string();
    }
    let mut snippet = String::new();
    let mut taken = 0;
    for c in rest.chars() {
        if taken == width {
            snippet.push_str("...");
            break;
        }
        match c {
            '\r' => snippet.push_str("\\r"),
            '\n' => snippet.push_str("\\n"),
            '\t' => snippet.push_str("\\t"),
            _ => snippet.push(c),
        }
        taken += 1;
    }
    snippet
}
