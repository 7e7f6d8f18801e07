// File: src/parser/mod.rs
//
// Recursive descent parser for VB6 modules.
// Transforms source text directly into an Abstract Syntax Tree (AST); the
// lexical recognizers in `lexer.rs` are called in place, there is no token
// stream.
//
// Every grammar rule returns a PResult:
// - Ok(Some(node)) on a match, with the cursor after it
// - Ok(None) when the rule does not apply here; the cursor is restored so
//   the caller can try its next alternative
// - Err(ParseError) once a rule has committed (seen its introducing
//   keyword) and something required is missing; this aborts the parse
//
// The grammar is split by layer: expressions (expr.rs), declarations and
// procedure heads (decl.rs), statements (stmt.rs). Module composition
// lives here.

mod decl;
mod expr;
mod stmt;

use tracing::{debug, trace};

use crate::ast::{Attribute, EmptyLine, Literal, LonelyComment, Module, ModuleItem, ModuleOption, OptionStmt, Span};
use crate::errors::{suggest_keyword, ErrorHandler, ParseError};
use crate::lexer::{Cursor, Keyword, Operator};

/// Result of a grammar rule: soft no-match is `Ok(None)`, hard failure is `Err`
pub type PResult<T> = Result<Option<T>, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Characters of remaining input quoted in a diagnostic
    pub snippet_width: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions { snippet_width: 40 }
    }
}

const OPERATOR_NOTE: &str =
    "operator expressions are not supported; an expression is a literal, a function call or a variable reference";

/// Parser over one source buffer. Holds the cursor, the stack of active
/// rule names used as error context, and the diagnostic sink.
pub struct Parser<'src> {
    cursor: Cursor<'src>,
    options: ParserOptions,
    rules: Vec<&'static str>,
    handler: ErrorHandler<'src>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_options(source, ParserOptions::default())
    }

    pub fn with_options(source: &'src str, options: ParserOptions) -> Self {
        Parser {
            cursor: Cursor::new(source),
            options,
            rules: Vec::new(),
            handler: ErrorHandler::new(source).with_snippet_width(options.snippet_width),
        }
    }

    /// Names the buffer in reported diagnostics
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.handler = self.handler.with_file(file);
        self
    }

    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    pub fn handler(&self) -> &ErrorHandler<'src> {
        &self.handler
    }

    /// True when only blanks remain
    pub fn is_at_end(&mut self) -> bool {
        let start = self.cursor.pos();
        self.cursor.skip_blanks();
        let at_end = self.cursor.is_eof();
        self.cursor.set_pos(start);
        at_end
    }

    /// Requires that the whole buffer was consumed, trailing blanks aside
    pub fn finish(&mut self) -> Result<(), ParseError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error("end of input"))
        }
    }

    /// Parses the whole buffer as a module (flat form). A hard failure is
    /// reported to the diagnostic sink and returned.
    pub fn parse_module(&mut self) -> Result<Module, ParseError> {
        debug!(bytes = self.cursor.source().len(), file = ?self.handler.file(), "parsing module");
        match self.module() {
            Ok(module) => {
                debug!(items = module.len(), "module parsed");
                Ok(module)
            }
            Err(err) => Err(self.handler.report(err)),
        }
    }

    fn module(&mut self) -> Result<Module, ParseError> {
        let mut items = Vec::new();
        while let Some(item) = self.module_item()? {
            trace!(kind = item.kind_name(), start = item.span().start, "module item");
            items.push(item);
        }
        if !self.is_at_end() {
            let mut err = self.error_in("module", "module-level declaration or procedure");
            if let Some(kw) = self.cursor.peek_word().and_then(suggest_keyword) {
                err = err.with_suggestion(kw);
            }
            return Err(err);
        }
        Ok(Module { items })
    }

    /// One top-level item. Comments are tried first so that a `Rem` line is
    /// never taken for anything else.
    pub fn module_item(&mut self) -> PResult<ModuleItem> {
        if let Some(comment) = self.lonely_comment()? {
            return Ok(Some(ModuleItem::Comment(comment)));
        }
        if let Some(empty) = self.empty_line() {
            return Ok(Some(ModuleItem::EmptyLine(empty)));
        }
        if let Some(attr) = self.attribute()? {
            return Ok(Some(ModuleItem::Attribute(attr)));
        }
        if let Some(opt) = self.option_item()? {
            return Ok(Some(ModuleItem::Option(opt)));
        }
        if let Some(decl) = self.declaration()? {
            return Ok(Some(ModuleItem::Declaration(decl)));
        }
        if let Some(sub) = self.sub_def()? {
            return Ok(Some(ModuleItem::Sub(sub)));
        }
        if let Some(func) = self.function_def()? {
            return Ok(Some(ModuleItem::Function(func)));
        }
        if let Some(prop) = self.property_def()? {
            return Ok(Some(ModuleItem::Property(prop)));
        }
        Ok(None)
    }

    /// Comment occupying a whole line, line break included
    pub fn lonely_comment(&mut self) -> PResult<LonelyComment> {
        let start = self.cursor.pos();
        let begin = self.mark();
        let Some(content) = self.cursor.comment() else {
            self.cursor.set_pos(start);
            return Ok(None);
        };
        let span = self.span_from(begin);
        if !(self.cursor.eat_eol() || self.cursor.is_eof()) {
            self.cursor.set_pos(start);
            return Ok(None);
        }
        Ok(Some(LonelyComment { content: content.to_string(), span }))
    }

    /// Line holding nothing but blanks
    pub fn empty_line(&mut self) -> Option<EmptyLine> {
        let start = self.cursor.pos();
        if self.cursor.blank_line() {
            Some(EmptyLine { span: Span::new(start, self.cursor.pos()) })
        } else {
            None
        }
    }

    /// `Attribute name = "value"`. Non-string values (`False`, `0`) are kept
    /// as written.
    pub fn attribute(&mut self) -> PResult<Attribute> {
        self.rule("attribute", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::Attribute) {
                return Ok(None);
            }
            let mut name = p.expect_identifier("attribute name")?;
            while p.cursor.eat_adjacent('.') {
                name.push('.');
                name.push_str(&p.expect_identifier("attribute name")?);
            }
            p.expect_char('=')?;
            let value_start = p.mark();
            let value = match p.cursor.quoted_string() {
                Some(s) => s,
                None => {
                    p.require("attribute value", Self::literal)?;
                    p.cursor.source()[value_start..p.cursor.pos()].to_string()
                }
            };
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(Attribute { name, value, span }))
        })
    }

    /// `Option Explicit | Compare Text|Binary | Base 0|1 | Private Module`
    pub fn option_item(&mut self) -> PResult<OptionStmt> {
        self.rule("option", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::Option) {
                return Ok(None);
            }
            let option = if p.cursor.eat_keyword(Keyword::Explicit) {
                ModuleOption::Explicit
            } else if p.cursor.eat_keyword(Keyword::Compare) {
                if p.cursor.eat_keyword(Keyword::Text) {
                    ModuleOption::CompareText
                } else if p.cursor.eat_keyword(Keyword::Binary) {
                    ModuleOption::CompareBinary
                } else {
                    return Err(p.error("'Text' or 'Binary'"));
                }
            } else if p.cursor.eat_keyword(Keyword::Base) {
                let at = p.skip_to_token();
                match p.cursor.number() {
                    Some(Literal::IntegerDec(0)) => ModuleOption::Base0,
                    Some(Literal::IntegerDec(1)) => ModuleOption::Base1,
                    _ => return Err(p.error_at("'0' or '1'", at)),
                }
            } else if p.cursor.eat_keyword(Keyword::Private) {
                p.expect_keyword(Keyword::Module)?;
                ModuleOption::PrivateModule
            } else {
                return Err(p.error("'Explicit', 'Compare', 'Base' or 'Private Module'"));
            };
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(OptionStmt { option, span }))
        })
    }

    // -----------------------------------------------------------------
    // Combinators shared by the grammar layers
    // -----------------------------------------------------------------

    /// Runs `f` as the named rule: the name is error context while `f`
    /// runs, and a soft failure restores the cursor.
    fn rule<T>(&mut self, name: &'static str, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let start = self.cursor.pos();
        self.rules.push(name);
        let result = f(self);
        self.rules.pop();
        if let Ok(None) = result {
            self.cursor.set_pos(start);
        }
        result
    }

    /// Runs a rule that must match; a soft failure becomes a hard one
    fn require<T>(&mut self, what: &str, f: impl FnOnce(&mut Self) -> PResult<T>) -> Result<T, ParseError> {
        match f(self)? {
            Some(node) => Ok(node),
            None => Err(self.error(what)),
        }
    }

    /// Skips blanks and returns the position of the next token
    fn mark(&mut self) -> usize {
        self.cursor.skip_blanks();
        self.cursor.pos()
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.cursor.pos().max(start))
    }

    /// Position of the next token without consuming anything
    fn skip_to_token(&self) -> usize {
        let mut probe = self.cursor.clone();
        probe.skip_blanks();
        probe.pos()
    }

    fn error(&self, expected: &str) -> ParseError {
        self.error_at(expected, self.skip_to_token())
    }

    fn error_in(&self, context: &str, expected: &str) -> ParseError {
        self.decorate(ParseError::syntax(
            context,
            expected,
            self.cursor.source(),
            self.skip_to_token(),
            self.options.snippet_width,
        ))
    }

    fn error_at(&self, expected: &str, offset: usize) -> ParseError {
        let context = self.rules.last().copied().unwrap_or("module");
        self.decorate(ParseError::syntax(
            context,
            expected,
            self.cursor.source(),
            offset,
            self.options.snippet_width,
        ))
    }

    /// Adds the operator note when the failure sits on an operator
    fn decorate(&self, err: ParseError) -> ParseError {
        let mut probe = self.cursor.clone();
        probe.set_pos(err.offset);
        match probe.peek_operator() {
            Some(Operator::Minus | Operator::Plus) if probe.clone().number().is_some() => err,
            Some(_) => err.with_note(OPERATOR_NOTE),
            None => err,
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<(), ParseError> {
        if self.cursor.eat_keyword(kw) {
            return Ok(());
        }
        let mut err = self.error(&format!("'{}'", kw.as_str()));
        if let Some(word) = self.cursor.peek_word() {
            let limit = if word.chars().count() < 5 { 1 } else { 3 };
            let distance = crate::errors::levenshtein_distance(
                &word.to_ascii_lowercase(),
                &kw.as_str().to_ascii_lowercase(),
            );
            if distance > 0 && distance <= limit {
                err = err.with_suggestion(kw.as_str());
            }
        }
        Err(err)
    }

    fn expect_char(&mut self, c: char) -> Result<(), ParseError> {
        if self.cursor.eat_char(c) {
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", c)))
        }
    }

    fn expect_eos(&mut self) -> Result<(), ParseError> {
        if self.cursor.end_of_statement() {
            Ok(())
        } else {
            Err(self.error("end of statement"))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String, ParseError> {
        if let Some(id) = self.cursor.identifier() {
            return Ok(id.to_string());
        }
        let mut err = self.error(what);
        if let Some(word) = self.cursor.peek_word() {
            if Keyword::lookup(word).is_some_and(|kw| kw.is_reserved()) {
                err = err.with_help(format!("'{}' is a reserved word and cannot be used as a name", word));
            }
        }
        Err(err)
    }

    fn expect_string(&mut self, what: &str) -> Result<String, ParseError> {
        match self.cursor.quoted_string() {
            Some(s) => Ok(s),
            None => Err(self.error(what)),
        }
    }

    /// `End <kw>` closing a block; the caller takes the terminator
    fn expect_end(&mut self, kw: Keyword) -> Result<(), ParseError> {
        if !self.cursor.eat_keyword(Keyword::End) {
            return Err(self.error(&format!("'End {}'", kw.as_str())));
        }
        self.expect_keyword(kw)
    }

    /// Comment and blank lines inside bodies that do not keep them
    fn skip_trivia_lines(&mut self) -> Result<(), ParseError> {
        loop {
            if self.lonely_comment()?.is_some() || self.empty_line().is_some() {
                continue;
            }
            return Ok(());
        }
    }
}
