// File: src/lib.rs
//
// Library interface for the VB6 parser.
// Exposes the AST, the parser and the grouped module view for the command
// line tool, integration tests and external use.

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod module;
pub mod parser;
pub mod visit;

pub use ast::Module;
pub use errors::{ErrorHandler, ErrorKind, ParseError};
pub use module::GroupedModule;
pub use parser::{PResult, Parser, ParserOptions};

/// Parses a whole module into its flat, source-ordered form
pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    Parser::new(source).parse_module()
}

/// Parses a whole module and regroups it into attributes, options,
/// declarations and procedures
pub fn parse_module_grouped(source: &str) -> Result<GroupedModule, ParseError> {
    let module = parse_module(source)?;
    GroupedModule::from_module(module, source, &ParserOptions::default())
}
