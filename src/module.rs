// File: src/module.rs
//
// Grouped view of a parsed module.
// The flat module keeps every top-level item in source order; this view
// regroups the same items into attributes, options, declarations and
// procedures, and only accepts modules laid out in that order (preamble,
// then declarations, then procedures).
//
// Comment and blank lines stay with the group being filled when they
// appear. Lines between the attributes and the options belong to the
// options group, which matches how a .bas file header is usually read.

use ahash::AHashMap;
use serde::Serialize;
use tracing::debug;

use crate::ast::{
    Attribute, Declaration, EmptyLine, FunctionDef, LonelyComment, Module, ModuleItem, ModuleOption, PropertyDef,
    Span, SubDef,
};
use crate::errors::{ErrorKind, ParseError};
use crate::parser::ParserOptions;

/// An entry of a group: a real item, or a comment/blank line kept in place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Grouped<T> {
    Item(T),
    Comment(LonelyComment),
    EmptyLine(EmptyLine),
}

impl<T> Grouped<T> {
    pub fn item(&self) -> Option<&T> {
        match self {
            Grouped::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_trivia(&self) -> bool {
        !matches!(self, Grouped::Item(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Procedure {
    Sub(SubDef),
    Function(FunctionDef),
    Property(PropertyDef),
}

impl Procedure {
    pub fn name(&self) -> &str {
        match self {
            Procedure::Sub(s) => &s.head.name,
            Procedure::Function(f) => &f.head.name,
            Procedure::Property(p) => p.head.name(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Procedure::Sub(s) => s.span,
            Procedure::Function(f) => f.span,
            Procedure::Property(p) => p.span,
        }
    }
}

/// Sections of a module, in the order they must appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Attributes,
    Options,
    Declarations,
    Procedures,
}

impl Phase {
    fn describe(self) -> &'static str {
        match self {
            Phase::Attributes => "attribute",
            Phase::Options => "option",
            Phase::Declarations => "declaration",
            Phase::Procedures => "procedure",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupedModule {
    /// Attributes in source order; a repeated name keeps its first value
    pub attributes: Vec<Attribute>,
    #[serde(skip)]
    attribute_index: AHashMap<String, usize>,
    pub options: Vec<Grouped<ModuleOption>>,
    pub declarations: Vec<Grouped<Declaration>>,
    pub procedures: Vec<Grouped<Procedure>>,
}

impl GroupedModule {
    /// Regroups a flat module. `source` is the buffer the module was parsed
    /// from and, with `options`, is only used to locate a layout error.
    pub fn from_module(module: Module, source: &str, options: &ParserOptions) -> Result<Self, ParseError> {
        let mut grouped = GroupedModule::default();
        let mut phase = Phase::Attributes;

        for item in module.items {
            let item_phase = match &item {
                ModuleItem::Comment(_) | ModuleItem::EmptyLine(_) => None,
                ModuleItem::Attribute(_) => Some(Phase::Attributes),
                ModuleItem::Option(_) => Some(Phase::Options),
                ModuleItem::Declaration(_) => Some(Phase::Declarations),
                ModuleItem::Sub(_) | ModuleItem::Function(_) | ModuleItem::Property(_) => Some(Phase::Procedures),
            };
            if let Some(next) = item_phase {
                if next < phase {
                    return Err(layout_error(source, options, item.span(), next, phase));
                }
                phase = next;
            }

            match item {
                ModuleItem::Comment(c) => grouped.push_trivia(phase, Trivia::Comment(c)),
                ModuleItem::EmptyLine(e) => grouped.push_trivia(phase, Trivia::EmptyLine(e)),
                ModuleItem::Attribute(attr) => grouped.add_attribute(attr),
                ModuleItem::Option(opt) => grouped.options.push(Grouped::Item(opt.option)),
                ModuleItem::Declaration(decl) => grouped.declarations.push(Grouped::Item(decl)),
                ModuleItem::Sub(s) => grouped.procedures.push(Grouped::Item(Procedure::Sub(s))),
                ModuleItem::Function(f) => grouped.procedures.push(Grouped::Item(Procedure::Function(f))),
                ModuleItem::Property(p) => grouped.procedures.push(Grouped::Item(Procedure::Property(p))),
            }
        }

        debug!(
            attributes = grouped.attributes.len(),
            declarations = grouped.declarations.len(),
            procedures = grouped.procedures.len(),
            "module grouped"
        );
        Ok(grouped)
    }

    /// Value of the attribute `name`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attribute_index.get(name).map(|&i| self.attributes[i].value.as_str())
    }

    /// Options without the interleaved comment and blank lines
    pub fn option_values(&self) -> impl Iterator<Item = ModuleOption> + '_ {
        self.options.iter().filter_map(|o| o.item().copied())
    }

    pub fn declaration_items(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter_map(Grouped::item)
    }

    pub fn procedure_items(&self) -> impl Iterator<Item = &Procedure> {
        self.procedures.iter().filter_map(Grouped::item)
    }

    fn add_attribute(&mut self, attr: Attribute) {
        if self.attribute_index.contains_key(&attr.name) {
            debug!(name = %attr.name, "duplicate attribute ignored");
            return;
        }
        self.attribute_index.insert(attr.name.clone(), self.attributes.len());
        self.attributes.push(attr);
    }

    fn push_trivia(&mut self, phase: Phase, trivia: Trivia) {
        match phase {
            Phase::Attributes | Phase::Options => self.options.push(trivia.into()),
            Phase::Declarations => self.declarations.push(trivia.into()),
            Phase::Procedures => self.procedures.push(trivia.into()),
        }
    }
}

enum Trivia {
    Comment(LonelyComment),
    EmptyLine(EmptyLine),
}

impl<T> From<Trivia> for Grouped<T> {
    fn from(trivia: Trivia) -> Self {
        match trivia {
            Trivia::Comment(c) => Grouped::Comment(c),
            Trivia::EmptyLine(e) => Grouped::EmptyLine(e),
        }
    }
}

fn layout_error(source: &str, options: &ParserOptions, span: Span, found: Phase, phase: Phase) -> ParseError {
    ParseError::new(
        ErrorKind::ModuleLayout,
        "module",
        format!("{} or later section", phase.describe()),
        span.start,
    )
    .locate(source, options.snippet_width)
    .with_help(format!(
        "{} found after a {}; attributes, options, declarations and procedures must appear in that order",
        found.describe(),
        phase.describe()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn grouped(src: &str) -> Result<GroupedModule, ParseError> {
        let module = Parser::new(src).parse_module()?;
        GroupedModule::from_module(module, src, &ParserOptions::default())
    }

    #[test]
    fn test_groups_in_order() {
        let src = "Attribute VB_Name = \"Mod1\"\r\n\
                   Option Explicit\r\n\
                   \r\n\
                   ' state\r\n\
                   Dim counter As Long\r\n\
                   Sub Tick()\r\n\
                   End Sub\r\n";
        let m = grouped(src).unwrap();
        assert_eq!(m.attribute("VB_Name"), Some("Mod1"));
        assert_eq!(m.option_values().collect::<Vec<_>>(), vec![ModuleOption::Explicit]);
        // blank line and comment follow the option
        assert_eq!(m.options.len(), 3);
        assert_eq!(m.declaration_items().count(), 1);
        assert_eq!(m.procedure_items().map(Procedure::name).collect::<Vec<_>>(), vec!["Tick"]);
    }

    #[test]
    fn test_first_attribute_wins() {
        let src = "Attribute A = \"1\"\r\nAttribute A = \"2\"\r\n";
        let m = grouped(src).unwrap();
        assert_eq!(m.attributes.len(), 1);
        assert_eq!(m.attribute("A"), Some("1"));
    }

    #[test]
    fn test_declaration_after_procedure_is_rejected() {
        let src = "Sub A()\r\nEnd Sub\r\nDim x As Long\r\n";
        let err = grouped(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModuleLayout);
        assert_eq!(err.location.line, 3);
        assert!(err.help.as_deref().unwrap_or("").contains("declaration found after a procedure"));
    }

    #[test]
    fn test_layout_error_uses_snippet_width() {
        let src = "Sub A()\r\nEnd Sub\r\nDim x As Long\r\n";
        let module = Parser::new(src).parse_module().unwrap();
        let err = GroupedModule::from_module(module, src, &ParserOptions { snippet_width: 5 }).unwrap_err();
        assert_eq!(err.snippet, "Dim x...");
    }

    #[test]
    fn test_procedure_spans_locate_procedures() {
        let src = "Sub A()\r\nEnd Sub\r\nFunction B()\r\nEnd Function\r\n";
        let m = grouped(src).unwrap();
        let spans: Vec<Span> = m.procedure_items().map(Procedure::span).collect();
        assert_eq!(spans[0].slice(src), "Sub A()\r\nEnd Sub");
        assert_eq!(spans[1].start, 18);
    }

    #[test]
    fn test_trivia_goes_to_current_section() {
        let src = "Dim x\r\n' between\r\nSub A()\r\nEnd Sub\r\n\r\n";
        let m = grouped(src).unwrap();
        assert_eq!(m.declarations.len(), 2);
        assert!(m.declarations[1].is_trivia());
        assert_eq!(m.procedures.len(), 2);
        assert!(m.procedures[1].is_trivia());
    }
}
