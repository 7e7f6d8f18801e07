// File: src/parser/stmt.rs
//
// Statement layer: simple statements (assignment, declarations, jumps,
// calls) and compound statements whose bodies are nested statement blocks.
//
// A statement is picked by its first word. Keyword statements commit right
// after the keyword; anything else is tried as an assignment, a label, then
// an implicit call. Comment and blank lines inside a block are kept as
// statements so the block reflects the source line for line.

use super::{PResult, Parser};
use crate::ast::{
    AssignStmt, AssignmentKind, CallStmt, CaseBlock, CaseClause, ConditionalLoop, DoStmt, ExitKind, ExitStmt,
    Expression, ForEachStmt, ForStmt, GotoKind, GotoStmt, IfBranch, IfStmt, LabelStmt, Literal, LocalDeclKind,
    LocalVarDeclStmt, OnErrorStmt, OnErrorTarget, RaiseEventStmt, ReDimStmt, ResumeStmt, ResumeTarget, SelectStmt, Span,
    Statement, StatementBlock, WhileStmt, WithStmt,
};
use crate::errors::ParseError;
use crate::lexer::Keyword;

const SINGLE_LINE_IF_HELP: &str =
    "single-line If statements are not supported; put the body on its own lines and close it with 'End If'";

const DOUBLE_CONDITION_HELP: &str = "a Do loop takes its condition either after 'Do' or after 'Loop', not both";

impl<'src> Parser<'src> {
    /// Statements up to the first line that is not one (`End`, `Next`,
    /// `Loop`, `Case`, ...). Always succeeds, possibly empty.
    pub fn statement_block(&mut self) -> Result<StatementBlock, ParseError> {
        let mut block = Vec::new();
        while let Some(stmt) = self.statement()? {
            block.push(stmt);
        }
        Ok(block)
    }

    pub fn statement(&mut self) -> PResult<Statement> {
        if let Some(comment) = self.lonely_comment()? {
            return Ok(Some(Statement::Comment(comment)));
        }
        if let Some(empty) = self.empty_line() {
            return Ok(Some(Statement::EmptyLine(empty)));
        }
        let keyword = self.cursor.peek_word().and_then(Keyword::lookup);
        match keyword {
            Some(Keyword::Set | Keyword::Let) => Ok(self.assignment()?.map(Statement::Assign)),
            Some(Keyword::Dim | Keyword::Static) => Ok(self.local_var_decl()?.map(Statement::LocalVarDecl)),
            Some(Keyword::ReDim) => Ok(self.redim()?.map(Statement::ReDim)),
            Some(Keyword::Exit) => Ok(self.exit_stmt()?.map(Statement::Exit)),
            Some(Keyword::GoTo | Keyword::GoSub) => Ok(self.goto_stmt()?.map(Statement::Goto)),
            Some(Keyword::On) => Ok(self.on_error()?.map(Statement::OnError)),
            Some(Keyword::Resume) => Ok(self.resume()?.map(Statement::Resume)),
            Some(Keyword::Call) => Ok(self.call_explicit()?.map(Statement::Call)),
            Some(Keyword::RaiseEvent) => Ok(self.raise_event()?.map(Statement::RaiseEvent)),
            Some(Keyword::While) => Ok(self.while_stmt()?.map(|s| Statement::While(Box::new(s)))),
            Some(Keyword::Do) => self.do_stmt(),
            Some(Keyword::For) => self.for_stmt(),
            Some(Keyword::If) => Ok(self.if_stmt()?.map(|s| Statement::If(Box::new(s)))),
            Some(Keyword::With) => Ok(self.with_stmt()?.map(|s| Statement::With(Box::new(s)))),
            Some(Keyword::Select) => Ok(self.select_stmt()?.map(|s| Statement::Select(Box::new(s)))),
            _ => self.simple_statement(),
        }
    }

    fn simple_statement(&mut self) -> PResult<Statement> {
        if let Some(assign) = self.assignment()? {
            return Ok(Some(Statement::Assign(assign)));
        }
        if let Some(label) = self.label()? {
            return Ok(Some(Statement::Label(label)));
        }
        Ok(self.call_implicit()?.map(Statement::Call))
    }

    /// `[Set|Let] target = expr`. Without a keyword the rule stays soft
    /// until the `=`.
    pub fn assignment(&mut self) -> PResult<AssignStmt> {
        self.rule("assignment", |p| {
            let start = p.mark();
            let kind = if p.cursor.eat_keyword(Keyword::Set) {
                AssignmentKind::Set
            } else if p.cursor.eat_keyword(Keyword::Let) {
                AssignmentKind::Let
            } else {
                AssignmentKind::Na
            };
            let target = if kind == AssignmentKind::Na {
                let Some(target) = p.decorated_variable()? else {
                    return Ok(None);
                };
                if !p.cursor.eat_char('=') {
                    return Ok(None);
                }
                target
            } else {
                let target = p.require("variable", Self::decorated_variable)?;
                p.expect_char('=')?;
                target
            };
            let value = p.require("expression", Self::expression)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(AssignStmt { kind, target, value, span }))
        })
    }

    /// `Dim|Static variable {, variable}`
    pub fn local_var_decl(&mut self) -> PResult<LocalVarDeclStmt> {
        self.rule("local declaration", |p| {
            let start = p.mark();
            let kind = if p.cursor.eat_keyword(Keyword::Dim) {
                LocalDeclKind::Dim
            } else if p.cursor.eat_keyword(Keyword::Static) {
                LocalDeclKind::Static
            } else {
                return Ok(None);
            };
            let mut vars = vec![p.require("variable", Self::variable)?];
            while p.cursor.eat_char(',') {
                vars.push(p.require("variable", Self::variable)?);
            }
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(LocalVarDeclStmt { kind, vars, span }))
        })
    }

    /// `ReDim [Preserve] var(dim {, dim})`
    pub fn redim(&mut self) -> PResult<ReDimStmt> {
        self.rule("redim statement", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::ReDim) {
                return Ok(None);
            }
            let preserve = p.cursor.eat_keyword(Keyword::Preserve);
            let var = p.require("array variable", Self::decorated_variable)?;
            p.expect_char('(')?;
            let dims = p.require("dimension", Self::expression_list)?;
            p.expect_char(')')?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(ReDimStmt { preserve, var, dims, span }))
        })
    }

    /// `Exit Sub|Function|Property|Do|While|For`
    pub fn exit_stmt(&mut self) -> PResult<ExitStmt> {
        const TARGETS: [(Keyword, ExitKind); 6] = [
            (Keyword::Sub, ExitKind::Sub),
            (Keyword::Function, ExitKind::Function),
            (Keyword::Property, ExitKind::Property),
            (Keyword::Do, ExitKind::Do),
            (Keyword::While, ExitKind::While),
            (Keyword::For, ExitKind::For),
        ];
        self.rule("exit statement", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::Exit) {
                return Ok(None);
            }
            let Some(kind) = TARGETS.iter().find(|(kw, _)| p.cursor.eat_keyword(*kw)).map(|(_, kind)| *kind) else {
                return Err(p.error("'Sub', 'Function', 'Property', 'Do', 'While' or 'For'"));
            };
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(ExitStmt { kind, span }))
        })
    }

    /// `GoTo label` / `GoSub label`
    pub fn goto_stmt(&mut self) -> PResult<GotoStmt> {
        self.rule("goto statement", |p| {
            let start = p.mark();
            let kind = if p.cursor.eat_keyword(Keyword::GoTo) {
                GotoKind::GoTo
            } else if p.cursor.eat_keyword(Keyword::GoSub) {
                GotoKind::GoSub
            } else {
                return Ok(None);
            };
            let label = p.expect_identifier("label")?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(GotoStmt { kind, label, span }))
        })
    }

    /// `On Error Resume Next | GoTo 0 | GoTo -1 | GoTo label | Exit Sub|Function|Property`
    pub fn on_error(&mut self) -> PResult<OnErrorStmt> {
        self.rule("on error statement", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::On) {
                return Ok(None);
            }
            p.expect_keyword(Keyword::Error)?;
            let target = if p.cursor.eat_keyword(Keyword::Resume) {
                p.expect_keyword(Keyword::Next)?;
                OnErrorTarget::ResumeNext
            } else if p.cursor.eat_keyword(Keyword::GoTo) {
                let at = p.skip_to_token();
                match p.cursor.number() {
                    Some(Literal::IntegerDec(0)) => OnErrorTarget::GoTo0,
                    Some(Literal::IntegerDec(-1)) => OnErrorTarget::GoToNeg1,
                    Some(_) => return Err(p.error_at("'0', '-1' or a label", at)),
                    None => OnErrorTarget::GoToLabel(p.expect_identifier("'0', '-1' or a label")?),
                }
            } else if p.cursor.eat_keyword(Keyword::Exit) {
                if p.cursor.eat_keyword(Keyword::Sub) {
                    OnErrorTarget::ExitSub
                } else if p.cursor.eat_keyword(Keyword::Function) {
                    OnErrorTarget::ExitFunction
                } else if p.cursor.eat_keyword(Keyword::Property) {
                    OnErrorTarget::ExitProperty
                } else {
                    return Err(p.error("'Sub', 'Function' or 'Property'"));
                }
            } else {
                return Err(p.error("'Resume Next', 'GoTo' or 'Exit'"));
            };
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(OnErrorStmt { target, span }))
        })
    }

    /// `Resume [Next | label | line]`
    pub fn resume(&mut self) -> PResult<ResumeStmt> {
        self.rule("resume statement", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::Resume) {
                return Ok(None);
            }
            let at = p.skip_to_token();
            let target = if p.cursor.eat_keyword(Keyword::Next) {
                ResumeTarget::Next
            } else if let Some(number) = p.cursor.number() {
                match number {
                    Literal::IntegerDec(n) => ResumeTarget::LineNumber(i32::from(n)),
                    Literal::LongDec(n) => ResumeTarget::LineNumber(n),
                    _ => return Err(p.error_at("line number", at)),
                }
            } else if let Some(label) = p.cursor.identifier() {
                ResumeTarget::Label(label.to_string())
            } else {
                ResumeTarget::Implicit
            };
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(ResumeStmt { target, span }))
        })
    }

    /// `name:`; the rest of the line is taken when it holds nothing else
    pub fn label(&mut self) -> PResult<LabelStmt> {
        self.rule("label", |p| {
            let start = p.mark();
            let Some(label) = p.cursor.identifier() else {
                return Ok(None);
            };
            if !p.cursor.eat_adjacent(':') {
                return Ok(None);
            }
            let span = p.span_from(start);
            p.cursor.eat_line_end();
            Ok(Some(LabelStmt { label: label.to_string(), span }))
        })
    }

    /// `Call name(args)`; the parentheses are mandatory, even when empty
    pub fn call_explicit(&mut self) -> PResult<CallStmt> {
        self.rule("call statement", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::Call) {
                return Ok(None);
            }
            let Some(sub_name) = p.sub_name() else {
                return Err(p.error("procedure name"));
            };
            p.expect_char('(')?;
            let args = p.require("argument list", Self::call_arguments)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(CallStmt { sub_name, args, explicit: true, span }))
        })
    }

    /// `name arg {, arg}`, or `name(args)` filling the whole statement
    pub fn call_implicit(&mut self) -> PResult<CallStmt> {
        self.rule("call statement", |p| {
            let start = p.mark();
            let Some(sub_name) = p.sub_name() else {
                return Ok(None);
            };
            let before = p.cursor.pos();
            if p.cursor.eat_char('(') {
                if let Some(args) = p.call_arguments()? {
                    let span = p.span_from(start);
                    if p.cursor.end_of_statement() {
                        return Ok(Some(CallStmt { sub_name, args, explicit: false, span }));
                    }
                }
                p.cursor.set_pos(before);
            }
            let args = p.expression_list()?.unwrap_or_default();
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(CallStmt { sub_name, args, explicit: false, span }))
        })
    }

    /// `RaiseEvent name(args)`
    pub fn raise_event(&mut self) -> PResult<RaiseEventStmt> {
        self.rule("raise event statement", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::RaiseEvent) {
                return Ok(None);
            }
            let event_name = p.expect_identifier("event name")?;
            p.expect_char('(')?;
            let args = p.require("argument list", Self::call_arguments)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(RaiseEventStmt { event_name, args, span }))
        })
    }

    /// Procedure name of a call: `Foo`, `Module1.Foo`, `.Foo`. Dots must
    /// touch the names around them.
    fn sub_name(&mut self) -> Option<String> {
        let start = self.mark();
        let mut name = String::new();
        if self.cursor.eat_adjacent('.') {
            name.push('.');
        }
        let Some(first) = self.cursor.identifier() else {
            self.cursor.set_pos(start);
            return None;
        };
        name.push_str(first);
        loop {
            let before = self.cursor.pos();
            if !self.cursor.eat_adjacent('.') {
                break;
            }
            match self.cursor.word() {
                Some(member) if self.cursor.pos() - member.len() == before + 1 => {
                    name.push('.');
                    name.push_str(member);
                }
                _ => {
                    self.cursor.set_pos(before);
                    break;
                }
            }
        }
        Some(name)
    }

    /// `While cond` block `Wend`
    pub fn while_stmt(&mut self) -> PResult<WhileStmt> {
        self.rule("while loop", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::While) {
                return Ok(None);
            }
            let condition = p.require("condition", Self::expression)?;
            p.expect_eos()?;
            let block = p.statement_block()?;
            p.expect_keyword(Keyword::Wend)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(WhileStmt { condition, block, span }))
        })
    }

    /// Every `Do ... Loop` form. The condition may follow `Do` or `Loop`,
    /// but not both.
    pub fn do_stmt(&mut self) -> PResult<Statement> {
        self.rule("do loop", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::Do) {
                return Ok(None);
            }
            let pre = p.loop_condition()?;
            p.expect_eos()?;
            let block = p.statement_block()?;
            p.expect_keyword(Keyword::Loop)?;
            let post_at = p.skip_to_token();
            let post = p.loop_condition()?;
            if pre.is_some() && post.is_some() {
                return Err(p.error_at("end of statement", post_at).with_help(DOUBLE_CONDITION_HELP));
            }
            let span = p.span_from(start);
            p.expect_eos()?;
            let stmt = match (pre, post) {
                (Some((true, condition)), _) => Statement::DoWhile(Box::new(ConditionalLoop { condition, block, span })),
                (Some((false, condition)), _) => Statement::DoUntil(Box::new(ConditionalLoop { condition, block, span })),
                (None, Some((true, condition))) => {
                    Statement::LoopWhile(Box::new(ConditionalLoop { condition, block, span }))
                }
                (None, Some((false, condition))) => {
                    Statement::LoopUntil(Box::new(ConditionalLoop { condition, block, span }))
                }
                (None, None) => Statement::Do(Box::new(DoStmt { block, span })),
            };
            Ok(Some(stmt))
        })
    }

    /// `While cond` (true) or `Until cond` (false)
    fn loop_condition(&mut self) -> Result<Option<(bool, Expression)>, ParseError> {
        let is_while = if self.cursor.eat_keyword(Keyword::While) {
            true
        } else if self.cursor.eat_keyword(Keyword::Until) {
            false
        } else {
            return Ok(None);
        };
        let condition = self.require("condition", Self::expression)?;
        Ok(Some((is_while, condition)))
    }

    /// `For var = from To to [Step step]` or `For Each var In container`,
    /// block, `Next [var]`
    pub fn for_stmt(&mut self) -> PResult<Statement> {
        self.rule("for loop", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::For) {
                return Ok(None);
            }
            if p.cursor.eat_keyword(Keyword::Each) {
                let var = p.require("loop variable", Self::decorated_variable)?;
                p.expect_keyword(Keyword::In)?;
                let container = p.require("collection", Self::expression)?;
                p.expect_eos()?;
                let block = p.statement_block()?;
                let span = p.loop_next(start)?;
                return Ok(Some(Statement::ForEach(Box::new(ForEachStmt { var, container, block, span }))));
            }
            let var = p.require("loop variable", Self::decorated_variable)?;
            p.expect_char('=')?;
            let from = p.require("start value", Self::expression)?;
            p.expect_keyword(Keyword::To)?;
            let to = p.require("end value", Self::expression)?;
            let step = if p.cursor.eat_keyword(Keyword::Step) {
                Some(p.require("step value", Self::expression)?)
            } else {
                None
            };
            p.expect_eos()?;
            let block = p.statement_block()?;
            let span = p.loop_next(start)?;
            Ok(Some(Statement::For(Box::new(ForStmt { var, from, to, step, block, span }))))
        })
    }

    /// `Next [var]` closing a loop; the variable is not checked
    fn loop_next(&mut self, start: usize) -> Result<Span, ParseError> {
        self.expect_keyword(Keyword::Next)?;
        self.decorated_variable()?;
        let span = self.span_from(start);
        self.expect_eos()?;
        Ok(span)
    }

    /// `If cond Then` block {`ElseIf cond Then` block} [`Else` block] `End If`
    pub fn if_stmt(&mut self) -> PResult<IfStmt> {
        self.rule("if statement", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::If) {
                return Ok(None);
            }
            let first_branch = p.if_branch(start)?;
            let mut elseif_branches = Vec::new();
            loop {
                let branch_start = p.mark();
                if !p.cursor.eat_keyword(Keyword::ElseIf) {
                    break;
                }
                elseif_branches.push(p.if_branch(branch_start)?);
            }
            let else_block = if p.cursor.eat_keyword(Keyword::Else) {
                p.expect_eos()?;
                Some(p.statement_block()?)
            } else {
                None
            };
            p.expect_end(Keyword::If)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(IfStmt { first_branch, elseif_branches, else_block, span }))
        })
    }

    /// Condition, `Then`, line end and block of one branch
    fn if_branch(&mut self, start: usize) -> Result<IfBranch, ParseError> {
        let condition = self.require("condition", Self::expression)?;
        self.expect_keyword(Keyword::Then)?;
        if !self.cursor.end_of_statement() {
            return Err(self.error("end of statement").with_help(SINGLE_LINE_IF_HELP));
        }
        let block = self.statement_block()?;
        Ok(IfBranch { condition, block, span: self.span_from(start) })
    }

    /// `With target` block `End With`
    pub fn with_stmt(&mut self) -> PResult<WithStmt> {
        self.rule("with block", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::With) {
                return Ok(None);
            }
            let target = p.require("object", Self::decorated_variable)?;
            p.expect_eos()?;
            let block = p.statement_block()?;
            p.expect_end(Keyword::With)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(WithStmt { target, block, span }))
        })
    }

    /// `Select Case expr`, case blocks, optional `Case Else`, `End Select`.
    /// Comment lines before the first `Case` are dropped.
    pub fn select_stmt(&mut self) -> PResult<SelectStmt> {
        self.rule("select case", |p| {
            let start = p.mark();
            if !p.cursor.eat_keyword(Keyword::Select) {
                return Ok(None);
            }
            p.expect_keyword(Keyword::Case)?;
            let condition = p.require("expression", Self::expression)?;
            p.expect_eos()?;
            p.skip_trivia_lines()?;
            let mut cases = Vec::new();
            let mut else_block = None;
            loop {
                let case_start = p.mark();
                if !p.cursor.eat_keyword(Keyword::Case) {
                    break;
                }
                if p.cursor.eat_keyword(Keyword::Else) {
                    p.expect_eos()?;
                    else_block = Some(p.statement_block()?);
                    break;
                }
                let mut clauses = vec![p.case_clause()?];
                while p.cursor.eat_char(',') {
                    clauses.push(p.case_clause()?);
                }
                p.expect_eos()?;
                let block = p.statement_block()?;
                cases.push(CaseBlock { clauses, block, span: p.span_from(case_start) });
            }
            p.expect_end(Keyword::Select)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(SelectStmt { condition, cases, else_block, span }))
        })
    }

    /// `expr`, `expr To expr` or `Is <relop> expr`
    fn case_clause(&mut self) -> Result<CaseClause, ParseError> {
        if self.cursor.eat_keyword(Keyword::Is) {
            let at = self.skip_to_token();
            let Some(op) = self.cursor.relational_operator() else {
                return Err(self.error_at("relational operator", at));
            };
            let value = self.require("expression", Self::expression)?;
            return Ok(CaseClause::Relational(op, value));
        }
        let first = self.require("case expression", Self::expression)?;
        if self.cursor.eat_keyword(Keyword::To) {
            let last = self.require("expression", Self::expression)?;
            return Ok(CaseClause::Range(first, last));
        }
        Ok(CaseClause::Value(first))
    }
}
