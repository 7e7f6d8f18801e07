// File: src/parser/decl.rs
//
// Declaration layer: module-level variables, constants, records (`Type`),
// enums, external library declarations, events, procedure heads and the
// procedure definitions built on them.
//
// Declarations start with an optional access modifier. Each rule is soft
// until its introducing keyword (`Const`, `Enum`, `Type`, `Declare`,
// `Event`, `Sub`, `Function`, `Property`) and committed afterwards. Global
// variable lists have no keyword of their own beyond the modifier, so they
// are tried last and commit only after the first variable.

use super::{PResult, Parser};
use crate::ast::{
    AccessModifier, ArrayBound, ConstDecl, ConstGroup, Declaration, EnumDecl, EnumItem, EventHead, ExternalFunction,
    ExternalSub, FunctionDef, FunctionHead, GlobalVarDecl, Literal, ParamQualifier, Parameter, PropertyDef,
    PropertyGetHead, PropertyHead, PropertyLetHead, PropertySetHead, Record, SubDef, SubHead, Variable,
};
use crate::errors::ParseError;
use crate::lexer::Keyword;

const ACCESS_MODIFIERS: [(Keyword, AccessModifier); 4] = [
    (Keyword::Public, AccessModifier::Public),
    (Keyword::Private, AccessModifier::Private),
    (Keyword::Friend, AccessModifier::Friend),
    (Keyword::Global, AccessModifier::Global),
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum PropertyKind {
    Let,
    Set,
    Get,
}

impl<'src> Parser<'src> {
    /// Any module-level declaration
    pub fn declaration(&mut self) -> PResult<Declaration> {
        if let Some(group) = self.const_decl()? {
            return Ok(Some(Declaration::Consts(group)));
        }
        if let Some(decl) = self.enum_decl()? {
            return Ok(Some(Declaration::Enum(decl)));
        }
        if let Some(record) = self.record_decl()? {
            return Ok(Some(Declaration::Record(record)));
        }
        if let Some(ext) = self.external_decl()? {
            return Ok(Some(ext));
        }
        if let Some(event) = self.event_head()? {
            return Ok(Some(Declaration::Event(event)));
        }
        Ok(self.global_var_decl()?.map(Declaration::GlobalVars))
    }

    /// `Public`, `Private`, `Friend` or `Global`; `Na` when absent
    fn access_modifier(&mut self) -> AccessModifier {
        for (kw, access) in ACCESS_MODIFIERS {
            if self.cursor.eat_keyword(kw) {
                return access;
            }
        }
        AccessModifier::Na
    }

    /// `name [bounds] [As [New] type]`
    pub fn variable(&mut self) -> PResult<Variable> {
        self.rule("variable", |p| {
            let start = p.mark();
            let Some(name) = p.cursor.identifier() else {
                return Ok(None);
            };
            let name = name.to_string();
            let array = p.array_bounds()?;
            let mut construct = false;
            let mut type_name = None;
            if p.cursor.eat_keyword(Keyword::As) {
                construct = p.cursor.eat_keyword(Keyword::New);
                type_name = Some(p.type_name()?);
            }
            Ok(Some(Variable { name, type_name, construct, array, span: p.span_from(start) }))
        })
    }

    /// `()`, `(10)`, `(1 To 10, 5)`
    fn array_bounds(&mut self) -> Result<Option<Vec<ArrayBound>>, ParseError> {
        if !self.cursor.eat_char('(') {
            return Ok(None);
        }
        let mut bounds = Vec::new();
        if self.cursor.eat_char(')') {
            return Ok(Some(bounds));
        }
        loop {
            let first = self.bound_value()?;
            let bound = if self.cursor.eat_keyword(Keyword::To) {
                ArrayBound { lower: Some(first), upper: self.bound_value()? }
            } else {
                ArrayBound { lower: None, upper: first }
            };
            bounds.push(bound);
            if self.cursor.eat_char(')') {
                return Ok(Some(bounds));
            }
            if !self.cursor.eat_char(',') {
                return Err(self.error("',' or ')'"));
            }
        }
    }

    fn bound_value(&mut self) -> Result<i32, ParseError> {
        let at = self.skip_to_token();
        match self.cursor.number() {
            Some(Literal::IntegerDec(v) | Literal::IntegerHex(v) | Literal::IntegerOct(v)) => Ok(i32::from(v)),
            Some(Literal::LongDec(v) | Literal::LongHex(v) | Literal::LongOct(v)) => Ok(v),
            _ => Err(self.error_at("integer array bound", at)),
        }
    }

    /// `Long`, `VB.Form`; qualified names are kept as written
    pub fn type_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_identifier("type name")?;
        if self.cursor.eat_adjacent('.') {
            name.push('.');
            name.push_str(&self.expect_identifier("type name")?);
        }
        Ok(name)
    }

    /// `Dim|Global|Public|Private [WithEvents] variable {, variable}`
    pub fn global_var_decl(&mut self) -> PResult<GlobalVarDecl> {
        self.rule("variable declaration", |p| {
            let start = p.mark();
            let mut access = p.access_modifier();
            if access == AccessModifier::Na {
                if !p.cursor.eat_keyword(Keyword::Dim) {
                    return Ok(None);
                }
                access = AccessModifier::Dim;
            }
            let with_events = p.cursor.eat_keyword(Keyword::WithEvents);
            let Some(first) = p.variable()? else {
                return Ok(None);
            };
            let mut vars = vec![first];
            while p.cursor.eat_char(',') {
                vars.push(p.require("variable", Self::variable)?);
            }
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(GlobalVarDecl { access, with_events, vars, span }))
        })
    }

    /// `[access] Const name [As type] = literal {, ...}`
    pub fn const_decl(&mut self) -> PResult<ConstGroup> {
        self.rule("constant declaration", |p| {
            let start = p.mark();
            let access = p.access_modifier();
            if !p.cursor.eat_keyword(Keyword::Const) {
                return Ok(None);
            }
            let mut consts = vec![p.const_item()?];
            while p.cursor.eat_char(',') {
                consts.push(p.const_item()?);
            }
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(ConstGroup { access, consts, span }))
        })
    }

    fn const_item(&mut self) -> Result<ConstDecl, ParseError> {
        let var = self.require("constant name", Self::variable)?;
        self.expect_char('=')?;
        let value = self.require("constant value", Self::literal)?;
        Ok(ConstDecl { var, value })
    }

    /// `[access] Type name` member lines `End Type`
    pub fn record_decl(&mut self) -> PResult<Record> {
        self.rule("type declaration", |p| {
            let start = p.mark();
            let access = p.access_modifier();
            if !p.cursor.eat_keyword(Keyword::Type) {
                return Ok(None);
            }
            let name = p.expect_identifier("type name")?;
            p.expect_eos()?;
            let mut members = Vec::new();
            loop {
                p.skip_trivia_lines()?;
                let Some(member) = p.variable()? else {
                    break;
                };
                p.expect_eos()?;
                members.push(member);
            }
            if members.is_empty() {
                return Err(p.error("type member"));
            }
            p.expect_end(Keyword::Type)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(Record { access, name, members, span }))
        })
    }

    /// `[access] Enum name` item lines `End Enum`
    pub fn enum_decl(&mut self) -> PResult<EnumDecl> {
        self.rule("enum declaration", |p| {
            let start = p.mark();
            let access = p.access_modifier();
            if !p.cursor.eat_keyword(Keyword::Enum) {
                return Ok(None);
            }
            let name = p.expect_identifier("enum name")?;
            p.expect_eos()?;
            let mut items = Vec::new();
            loop {
                p.skip_trivia_lines()?;
                let Some(item) = p.cursor.identifier() else {
                    break;
                };
                let name = item.to_string();
                let value = if p.cursor.eat_char('=') {
                    Some(p.require("enum value", Self::literal)?)
                } else {
                    None
                };
                p.expect_eos()?;
                items.push(EnumItem { name, value });
            }
            if items.is_empty() {
                return Err(p.error("enum item"));
            }
            p.expect_end(Keyword::Enum)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(EnumDecl { access, name, items, span }))
        })
    }

    /// `[Optional] [ByVal|ByRef] [ParamArray] variable [= literal]`
    pub fn param(&mut self) -> PResult<Parameter> {
        self.rule("parameter", |p| {
            let optional = p.cursor.eat_keyword(Keyword::Optional);
            let qualifier = if p.cursor.eat_keyword(Keyword::ByVal) {
                Some(ParamQualifier::ByVal)
            } else if p.cursor.eat_keyword(Keyword::ByRef) {
                Some(ParamQualifier::ByRef)
            } else {
                None
            };
            let param_array = p.cursor.eat_keyword(Keyword::ParamArray);
            let Some(var) = p.variable()? else {
                if optional || qualifier.is_some() || param_array {
                    return Err(p.error("parameter name"));
                }
                return Ok(None);
            };
            let default = if p.cursor.eat_char('=') {
                Some(p.require("default value", Self::literal)?)
            } else {
                None
            };
            Ok(Some(Parameter { optional, qualifier, param_array, var, default }))
        })
    }

    /// Comma-separated parameters without the parentheses
    pub fn params(&mut self) -> PResult<Vec<Parameter>> {
        let Some(first) = self.param()? else {
            return Ok(None);
        };
        let mut params = vec![first];
        while self.cursor.eat_char(',') {
            params.push(self.require("parameter", Self::param)?);
        }
        Ok(Some(params))
    }

    /// `'(' [params] ')'`
    pub fn param_list(&mut self) -> PResult<Vec<Parameter>> {
        if !self.cursor.eat_char('(') {
            return Ok(None);
        }
        let params = self.params()?.unwrap_or_default();
        self.expect_char(')')?;
        Ok(Some(params))
    }

    fn external_decl(&mut self) -> PResult<Declaration> {
        self.rule("external declaration", |p| {
            let start = p.mark();
            let access = p.access_modifier();
            if !p.cursor.eat_keyword(Keyword::Declare) {
                return Ok(None);
            }
            let is_function = if p.cursor.eat_keyword(Keyword::Sub) {
                false
            } else if p.cursor.eat_keyword(Keyword::Function) {
                true
            } else {
                return Err(p.error("'Sub' or 'Function'"));
            };
            let name = p.expect_identifier("procedure name")?;
            p.expect_keyword(Keyword::Lib)?;
            let lib = p.expect_string("library name")?;
            let alias = if p.cursor.eat_keyword(Keyword::Alias) {
                Some(p.expect_string("alias name")?)
            } else {
                None
            };
            let params = p.param_list()?.unwrap_or_default();
            let return_type = if is_function && p.cursor.eat_keyword(Keyword::As) {
                Some(p.type_name()?)
            } else {
                None
            };
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(if is_function {
                Declaration::ExternalFunction(ExternalFunction { access, name, lib, alias, params, return_type, span })
            } else {
                Declaration::ExternalSub(ExternalSub { access, name, lib, alias, params, span })
            }))
        })
    }

    /// `[access] Declare Sub name Lib "lib" [Alias "alias"] [(params)]`
    pub fn external_sub(&mut self) -> PResult<ExternalSub> {
        self.rule("external declaration", |p| match p.external_decl()? {
            Some(Declaration::ExternalSub(ext)) => Ok(Some(ext)),
            _ => Ok(None),
        })
    }

    /// `[access] Declare Function name Lib "lib" [Alias "alias"] [(params)] [As type]`
    pub fn external_function(&mut self) -> PResult<ExternalFunction> {
        self.rule("external declaration", |p| match p.external_decl()? {
            Some(Declaration::ExternalFunction(ext)) => Ok(Some(ext)),
            _ => Ok(None),
        })
    }

    /// `[access] Event name [(params)]`
    pub fn event_head(&mut self) -> PResult<EventHead> {
        self.rule("event declaration", |p| {
            let start = p.mark();
            let access = p.access_modifier();
            if !p.cursor.eat_keyword(Keyword::Event) {
                return Ok(None);
            }
            let name = p.expect_identifier("event name")?;
            let params = p.param_list()?.unwrap_or_default();
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(EventHead { access, name, params, span }))
        })
    }

    pub fn sub_head(&mut self) -> PResult<SubHead> {
        self.rule("sub head", |p| {
            let start = p.mark();
            let access = p.access_modifier();
            if !p.cursor.eat_keyword(Keyword::Sub) {
                return Ok(None);
            }
            let name = p.expect_identifier("sub name")?;
            let params = p.param_list()?.unwrap_or_default();
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(SubHead { access, name, params, span }))
        })
    }

    pub fn function_head(&mut self) -> PResult<FunctionHead> {
        self.rule("function head", |p| {
            let start = p.mark();
            let access = p.access_modifier();
            if !p.cursor.eat_keyword(Keyword::Function) {
                return Ok(None);
            }
            let name = p.expect_identifier("function name")?;
            let params = p.param_list()?.unwrap_or_default();
            let return_type = if p.cursor.eat_keyword(Keyword::As) { Some(p.type_name()?) } else { None };
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(FunctionHead { access, name, params, return_type, span }))
        })
    }

    /// `[access] Property Let|Set|Get name [(params)] [As type]`; the
    /// return type is only read for `Get`.
    pub fn property_head(&mut self) -> PResult<PropertyHead> {
        self.rule("property head", |p| {
            let start = p.mark();
            let access = p.access_modifier();
            if !p.cursor.eat_keyword(Keyword::Property) {
                return Ok(None);
            }
            let kind = if p.cursor.eat_keyword(Keyword::Let) {
                PropertyKind::Let
            } else if p.cursor.eat_keyword(Keyword::Set) {
                PropertyKind::Set
            } else if p.cursor.eat_keyword(Keyword::Get) {
                PropertyKind::Get
            } else {
                return Err(p.error("'Get', 'Let' or 'Set'"));
            };
            let name = p.expect_identifier("property name")?;
            let params = p.param_list()?.unwrap_or_default();
            let return_type = if kind == PropertyKind::Get && p.cursor.eat_keyword(Keyword::As) {
                Some(p.type_name()?)
            } else {
                None
            };
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(match kind {
                PropertyKind::Let => PropertyHead::Let(PropertyLetHead { access, name, params, span }),
                PropertyKind::Set => PropertyHead::Set(PropertySetHead { access, name, params, span }),
                PropertyKind::Get => PropertyHead::Get(PropertyGetHead { access, name, params, return_type, span }),
            }))
        })
    }

    pub fn property_let_head(&mut self) -> PResult<PropertyLetHead> {
        self.rule("property head", |p| match p.property_head()? {
            Some(PropertyHead::Let(head)) => Ok(Some(head)),
            _ => Ok(None),
        })
    }

    pub fn property_set_head(&mut self) -> PResult<PropertySetHead> {
        self.rule("property head", |p| match p.property_head()? {
            Some(PropertyHead::Set(head)) => Ok(Some(head)),
            _ => Ok(None),
        })
    }

    pub fn property_get_head(&mut self) -> PResult<PropertyGetHead> {
        self.rule("property head", |p| match p.property_head()? {
            Some(PropertyHead::Get(head)) => Ok(Some(head)),
            _ => Ok(None),
        })
    }

    /// Sub head, body, `End Sub`
    pub fn sub_def(&mut self) -> PResult<SubDef> {
        self.rule("sub", |p| {
            let start = p.mark();
            let Some(head) = p.sub_head()? else {
                return Ok(None);
            };
            let body = p.statement_block()?;
            p.expect_end(Keyword::Sub)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(SubDef { head, body, span }))
        })
    }

    /// Function head, body, `End Function`
    pub fn function_def(&mut self) -> PResult<FunctionDef> {
        self.rule("function", |p| {
            let start = p.mark();
            let Some(head) = p.function_head()? else {
                return Ok(None);
            };
            let body = p.statement_block()?;
            p.expect_end(Keyword::Function)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(FunctionDef { head, body, span }))
        })
    }

    /// Property head, body, `End Property`
    pub fn property_def(&mut self) -> PResult<PropertyDef> {
        self.rule("property", |p| {
            let start = p.mark();
            let Some(head) = p.property_head()? else {
                return Ok(None);
            };
            let body = p.statement_block()?;
            p.expect_end(Keyword::Property)?;
            let span = p.span_from(start);
            p.expect_eos()?;
            Ok(Some(PropertyDef { head, body, span }))
        })
    }
}
