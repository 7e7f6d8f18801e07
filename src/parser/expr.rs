// File: src/parser/expr.rs
//
// Expression layer: literal constants, function calls, and dotted
// identifier chains. Expressions never commit; a malformed expression is a
// soft failure and the enclosing rule decides whether that is fatal.
//
// Only these three forms make up an expression. Arithmetic, relational and
// logical operators are not part of this grammar; diagnostics point that
// out when a parse stops at one.

use super::{PResult, Parser};
use crate::ast::{ContextElement, DecoratedVariable, Expression, FunctionCall, IdentifierContext, Literal, Span};
use crate::lexer::Keyword;

impl<'src> Parser<'src> {
    /// Literal, then function call, then decorated variable
    pub fn expression(&mut self) -> PResult<Expression> {
        let before = self.cursor.pos();
        let start = self.mark();
        if let Some(lit) = self.literal()? {
            return Ok(Some(Expression::Literal(lit, self.span_from(start))));
        }
        if let Some(call) = self.function_call()? {
            return Ok(Some(Expression::Call(call)));
        }
        if let Some(var) = self.decorated_variable()? {
            return Ok(Some(Expression::Variable(var)));
        }
        self.cursor.set_pos(before);
        Ok(None)
    }

    /// Number, quoted string, `True`/`False`, or `Nothing`
    pub fn literal(&mut self) -> PResult<Literal> {
        if let Some(number) = self.cursor.number() {
            return Ok(Some(number));
        }
        if let Some(s) = self.cursor.quoted_string() {
            return Ok(Some(Literal::String(s)));
        }
        if self.cursor.eat_keyword(Keyword::True) {
            return Ok(Some(Literal::Boolean(true)));
        }
        if self.cursor.eat_keyword(Keyword::False) {
            return Ok(Some(Literal::Boolean(false)));
        }
        if self.cursor.eat_keyword(Keyword::Nothing) {
            return Ok(Some(Literal::Nothing));
        }
        Ok(None)
    }

    /// `name '(' [expr {',' expr}] ')'`; empty parentheses are a call too
    pub fn function_call(&mut self) -> PResult<FunctionCall> {
        self.rule("function call", |p| {
            let start = p.mark();
            let Some(name) = p.cursor.identifier() else {
                return Ok(None);
            };
            if !p.cursor.eat_char('(') {
                return Ok(None);
            }
            let Some(args) = p.call_arguments()? else {
                return Ok(None);
            };
            Ok(Some(FunctionCall { name: name.to_string(), args, span: p.span_from(start) }))
        })
    }

    /// Arguments after an opening parenthesis, up to and including `)`
    pub(super) fn call_arguments(&mut self) -> PResult<Vec<Expression>> {
        let mut args = Vec::new();
        if self.cursor.eat_char(')') {
            return Ok(Some(args));
        }
        loop {
            let Some(arg) = self.expression()? else {
                return Ok(None);
            };
            args.push(arg);
            if self.cursor.eat_char(')') {
                return Ok(Some(args));
            }
            if !self.cursor.eat_char(',') {
                return Ok(None);
            }
        }
    }

    /// Optional leading `.` then every `name.` / `call().` segment.
    /// Always matches; an empty context consumes nothing.
    pub fn identifier_context(&mut self) -> PResult<IdentifierContext> {
        let before = self.cursor.pos();
        let start = self.mark();
        let leading_dot = self.cursor.eat_adjacent('.');
        let mut elements = Vec::new();
        loop {
            let before = self.cursor.pos();
            let element = if let Some(call) = self.function_call()? {
                ContextElement::Call(call)
            } else if let Some(name) = self.cursor.identifier() {
                ContextElement::Name(name.to_string())
            } else {
                break;
            };
            if !self.cursor.eat_adjacent('.') {
                self.cursor.set_pos(before);
                break;
            }
            elements.push(element);
        }
        if !leading_dot && elements.is_empty() {
            self.cursor.set_pos(before);
            return Ok(Some(IdentifierContext { span: Span::new(start, start), ..Default::default() }));
        }
        Ok(Some(IdentifierContext { leading_dot, elements, span: self.span_from(start) }))
    }

    /// Identifier chain plus the final variable name, e.g. `a.b().c`
    pub fn decorated_variable(&mut self) -> PResult<DecoratedVariable> {
        self.rule("variable reference", |p| {
            let start = p.mark();
            let Some(context) = p.identifier_context()? else {
                return Ok(None);
            };
            let Some(name) = p.cursor.identifier() else {
                return Ok(None);
            };
            Ok(Some(DecoratedVariable { context, name: name.to_string(), span: p.span_from(start) }))
        })
    }

    /// Comma-separated expressions with at least one entry. After a comma
    /// another expression is required.
    pub(super) fn expression_list(&mut self) -> PResult<Vec<Expression>> {
        let Some(first) = self.expression()? else {
            return Ok(None);
        };
        let mut list = vec![first];
        while self.cursor.eat_char(',') {
            list.push(self.require("expression", Self::expression)?);
        }
        Ok(Some(list))
    }
}
