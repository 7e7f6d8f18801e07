// Integration tests for whole-module parsing
//
// Covers the flat module (every top-level item in source order), the
// grouped view built from it, and the diagnostics produced when a module
// cannot be parsed.

use vb6_parser::ast::*;
use vb6_parser::module::Procedure;
use vb6_parser::visit::ModuleStats;
use vb6_parser::{parse_module, parse_module_grouped, ErrorKind, ParseError, Parser};

const BAS_UNIT: &str = "Attribute VB_Name = \"Module1\"\r\n\
Attribute VB_GlobalNameSpace = False\r\n\
Option Explicit\r\n\
Option Base 0\r\n\
\r\n\
' shared state\r\n\
Const u As Integer = 1234\r\n\
Global g_logger As Long\r\n\
Enum MyEnum1\r\n\
  c1 = 0\r\n\
  c2 = 1\r\n\
End Enum\r\n\
Sub my_sub(ByRef str As String)\r\n\
End Sub\r\n\
Function my_fun(ByRef str As String) As Long\r\n\
End Function\r\n";

fn parse_err(src: &str) -> ParseError {
    match parse_module(src) {
        Ok(module) => panic!("Expected parse error, got {} items", module.len()),
        Err(err) => err,
    }
}

#[test]
fn test_lonely_comments() {
    let module = parse_module("' This is comment line 1\r\n' Comment line 2\r\n").unwrap();
    assert_eq!(module.len(), 2);
    let ModuleItem::Comment(first) = &module.items[0] else {
        panic!("Expected comment, got {:?}", module.items[0]);
    };
    assert_eq!(first.content, " This is comment line 1");
    let ModuleItem::Comment(second) = &module.items[1] else {
        panic!("Expected comment, got {:?}", module.items[1]);
    };
    assert_eq!(second.content, " Comment line 2");
}

#[test]
fn test_comments_and_empty_lines() {
    let module = parse_module("' comment1\r\n\r\nRem comment2\r\n").unwrap();
    let kinds: Vec<&str> = module.items.iter().map(ModuleItem::kind_name).collect();
    assert_eq!(kinds, vec!["comment", "empty line", "comment"]);
    let ModuleItem::Comment(rem) = &module.items[2] else {
        panic!("Expected comment");
    };
    assert_eq!(rem.content, " comment2");
}

#[test]
fn test_attributes() {
    let module = parse_module("Attribute ModuleName = \"MyForm\"\r\nAttribute ProgID = \"00-00-00-00\"\r\n").unwrap();
    assert_eq!(module.len(), 2);
    let ModuleItem::Attribute(first) = &module.items[0] else {
        panic!("Expected attribute");
    };
    assert_eq!(first.name, "ModuleName");
    assert_eq!(first.value, "MyForm");
    let ModuleItem::Attribute(second) = &module.items[1] else {
        panic!("Expected attribute");
    };
    assert_eq!(second.name, "ProgID");
    assert_eq!(second.value, "00-00-00-00");
}

#[test]
fn test_indented_attributes_with_trailing_blanks() {
    let module = parse_module(
        r#"Attribute ModuleName = "MyForm"
                  Attribute ProgID = "00-00-00-00"
                  "#,
    )
    .unwrap();
    assert_eq!(module.len(), 2);
}

#[test]
fn test_non_string_attribute_keeps_raw_text() {
    let module = parse_module("Attribute VB_Exposed = False\r\nAttribute Form.Tag = 0\r\n").unwrap();
    let ModuleItem::Attribute(exposed) = &module.items[0] else {
        panic!("Expected attribute");
    };
    assert_eq!(exposed.value, "False");
    let ModuleItem::Attribute(tag) = &module.items[1] else {
        panic!("Expected attribute");
    };
    assert_eq!(tag.name, "Form.Tag");
    assert_eq!(tag.value, "0");
}

#[test]
fn test_options() {
    let module = parse_module(
        "Option Explicit\r\nOption Base 1\r\nOption Compare Text\r\nOption Private Module\r\n",
    )
    .unwrap();
    let options: Vec<ModuleOption> = module
        .items
        .iter()
        .filter_map(|item| match item {
            ModuleItem::Option(o) => Some(o.option),
            _ => None,
        })
        .collect();
    assert_eq!(
        options,
        vec![ModuleOption::Explicit, ModuleOption::Base1, ModuleOption::CompareText, ModuleOption::PrivateModule]
    );
}

#[test]
fn test_bas_unit() {
    let module = parse_module(BAS_UNIT).unwrap();
    let kinds: Vec<&str> = module.items.iter().map(ModuleItem::kind_name).collect();
    assert_eq!(
        kinds,
        vec![
            "attribute",
            "attribute",
            "option",
            "option",
            "empty line",
            "comment",
            "declaration",
            "declaration",
            "declaration",
            "sub",
            "function",
        ]
    );

    let ModuleItem::Declaration(Declaration::Enum(e)) = &module.items[8] else {
        panic!("Expected enum, got {:?}", module.items[8]);
    };
    assert_eq!(e.name, "MyEnum1");
    assert_eq!(e.items.len(), 2);
    assert_eq!(e.items[1].value, Some(Literal::IntegerDec(1)));

    let ModuleItem::Function(f) = &module.items[10] else {
        panic!("Expected function");
    };
    assert_eq!(f.head.name, "my_fun");
    assert_eq!(f.head.return_type.as_deref(), Some("Long"));
    assert!(f.body.is_empty());
}

#[test]
fn test_indented_module() {
    let module = parse_module(
        r#"Attribute VB_Name = "Module1"
                  Option Explicit
                  Global g_logger As Long
                  Sub my_sub(ByRef str As String)
                    Dim x As Integer
                    x = CInt(str)
                  End Sub
                  "#,
    )
    .unwrap();
    assert_eq!(module.len(), 4);
    let ModuleItem::Sub(sub) = &module.items[3] else {
        panic!("Expected sub");
    };
    assert_eq!(sub.body.len(), 2);
}

#[test]
fn test_procedures_with_bodies() {
    let module = parse_module(
        "Private Sub Form_Load()\r\n\
         On Error GoTo ErrHandler\r\n\
         Me.Caption = \"Ready\"\r\n\
         Exit Sub\r\n\
         ErrHandler:\r\n\
         MsgBox Err.Description\r\n\
         End Sub\r\n\
         \r\n\
         Public Property Get Width() As Integer\r\n\
         Width = m_width\r\n\
         End Property\r\n\
         \r\n\
         Friend Function Area() As Double\r\n\
         Area = Compute(m_width, m_height)\r\n\
         End Function\r\n",
    )
    .unwrap();

    let ModuleItem::Sub(load) = &module.items[0] else {
        panic!("Expected sub");
    };
    assert_eq!(load.head.access, AccessModifier::Private);
    let kinds: Vec<&str> = load.body.iter().map(Statement::kind_name).collect();
    assert_eq!(kinds, vec!["on error", "assignment", "exit", "label", "call"]);

    let ModuleItem::Property(prop) = &module.items[2] else {
        panic!("Expected property");
    };
    let PropertyHead::Get(head) = &prop.head else {
        panic!("Expected Property Get");
    };
    assert_eq!(head.name, "Width");
    assert_eq!(prop.body.len(), 1);

    let ModuleItem::Function(area) = &module.items[4] else {
        panic!("Expected function");
    };
    assert_eq!(area.head.access, AccessModifier::Friend);
}

#[test]
fn test_declare_and_event_at_module_level() {
    let module = parse_module(
        "Private Declare Function GetTickCount Lib \"kernel32\" () As Long\r\n\
         Public Event Changed(ByVal Value As Long)\r\n\
         Private WithEvents m_timer As Timer\r\n",
    )
    .unwrap();
    assert!(matches!(module.items[0], ModuleItem::Declaration(Declaration::ExternalFunction(_))));
    assert!(matches!(module.items[1], ModuleItem::Declaration(Declaration::Event(_))));
    assert!(matches!(module.items[2], ModuleItem::Declaration(Declaration::GlobalVars(ref g)) if g.with_events));
}

#[test]
fn test_trailing_comment_after_declaration() {
    let module = parse_module("Global g_var As Long ' how can we catch a trailing comment?\r\n").unwrap();
    assert_eq!(module.len(), 1);
    assert!(matches!(module.items[0], ModuleItem::Declaration(Declaration::GlobalVars(_))));
}

#[test]
fn test_item_spans_cover_source() {
    let src = "Option Explicit\r\nDim x As Long\r\n";
    let module = parse_module(src).unwrap();
    assert_eq!(module.items[0].span().slice(src), "Option Explicit");
    assert_eq!(module.items[1].span().slice(src), "Dim x As Long");
}

#[test]
fn test_empty_module() {
    assert!(parse_module("").unwrap().is_empty());
    assert_eq!(parse_module("\r\n\r\n").unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Grouped view
// ---------------------------------------------------------------------------

#[test]
fn test_grouped_bas_unit() {
    let grouped = parse_module_grouped(BAS_UNIT).unwrap();
    assert_eq!(grouped.attributes.len(), 2);
    assert_eq!(grouped.attribute("VB_Name"), Some("Module1"));
    assert_eq!(grouped.attribute("VB_GlobalNameSpace"), Some("False"));
    assert_eq!(grouped.attribute("Missing"), None);

    assert_eq!(grouped.options.len(), 4);
    assert_eq!(grouped.option_values().collect::<Vec<_>>(), vec![ModuleOption::Explicit, ModuleOption::Base0]);

    assert_eq!(grouped.declarations.len(), 3);
    let names: Vec<&str> = grouped.procedure_items().map(Procedure::name).collect();
    assert_eq!(names, vec!["my_sub", "my_fun"]);
}

#[test]
fn test_grouped_rejects_option_after_declaration() {
    let err = parse_module_grouped("Dim x As Long\r\nOption Explicit\r\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ModuleLayout);
    assert_eq!(err.location.line, 2);
    assert_eq!(err.context, "module");
}

#[test]
fn test_module_serializes_to_json() {
    let module = parse_module("Attribute ModuleName = \"MyForm\"\r\n").unwrap();
    let json = serde_json::to_value(&module).unwrap();
    assert_eq!(json["items"][0]["Attribute"]["name"], "ModuleName");
    assert_eq!(json["items"][0]["Attribute"]["value"], "MyForm");
}

#[test]
fn test_stats_over_bas_unit() {
    let stats = ModuleStats::collect(&parse_module(BAS_UNIT).unwrap());
    assert_eq!(stats.attributes, 2);
    assert_eq!(stats.options, 2);
    assert_eq!(stats.declarations, 3);
    assert_eq!(stats.procedures, 2);
    assert_eq!(stats.comments, 1);
    assert_eq!(stats.statements, 0);
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[test]
fn test_error_message_shape() {
    let err = parse_err("Sub Main()\r\nIf x Thne\r\nEnd If\r\nEnd Sub\r\n");
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.context, "if statement");
    assert_eq!(err.expected, "'Then'");
    assert_eq!(err.location.line, 2);
    assert_eq!(err.location.column, 6);
    assert_eq!(err.offset, 17);
    assert!(err.to_string().starts_with("if statement: expecting 'Then' here: Thne\\r\\nEnd If"));
    assert_eq!(err.source_line.as_deref(), Some("If x Thne"));
}

#[test]
fn test_keyword_typo_suggestion() {
    let err = parse_err("Sub Main()\r\nSelect Cas x\r\nEnd Select\r\nEnd Sub\r\n");
    assert_eq!(err.context, "select case");
    assert_eq!(err.suggestion.as_deref(), Some("Case"));
    assert!(err.render().contains("Did you mean 'Case'?"));
}

#[test]
fn test_unknown_module_item() {
    let err = parse_err("Option Explicit\r\nFunctoin Foo()\r\nEnd Function\r\n");
    assert_eq!(err.context, "module");
    assert_eq!(err.expected, "module-level declaration or procedure");
    assert_eq!(err.location.line, 2);
    assert_eq!(err.suggestion.as_deref(), Some("Function"));
}

#[test]
fn test_operator_expression_gets_note() {
    let err = parse_err("Sub Main()\r\nx = a + b\r\nEnd Sub\r\n");
    assert_eq!(err.context, "assignment");
    assert_eq!(err.expected, "end of statement");
    assert!(err.note.as_deref().unwrap_or("").contains("operator"));
}

#[test]
fn test_negative_literal_is_not_an_operator() {
    let module = parse_module("Sub Main()\r\nx = -1\r\nEnd Sub\r\n").unwrap();
    let ModuleItem::Sub(sub) = &module.items[0] else {
        panic!("Expected sub");
    };
    let Statement::Assign(assign) = &sub.body[0] else {
        panic!("Expected assignment");
    };
    assert_eq!(assign.value.as_literal(), Some(&Literal::IntegerDec(-1)));
}

#[test]
fn test_reserved_word_as_name_gets_help() {
    let err = parse_err("Sub End()\r\nEnd Sub\r\n");
    assert_eq!(err.context, "sub head");
    assert!(err.help.as_deref().unwrap_or("").contains("reserved word"));
}

#[test]
fn test_missing_end_sub() {
    let err = parse_err("Sub Main()\r\nx = 1\r\n");
    assert_eq!(err.context, "sub");
    assert_eq!(err.expected, "'End Sub'");
    assert_eq!(err.to_string(), "sub: expecting 'End Sub' here: <end of input>");
}

#[test]
fn test_call_without_parentheses_fails() {
    let err = parse_err("Sub Main()\r\nCall Foo 13\r\nEnd Sub\r\n");
    assert_eq!(err.context, "call statement");
    assert_eq!(err.location.line, 2);
}

#[test]
fn test_call_and_raise_event_without_parentheses_fail() {
    let err = parse_err("Sub M()\r\nCall Refresh\r\nEnd Sub\r\n");
    assert_eq!(err.context, "call statement");
    assert_eq!(err.location.line, 2);

    let err = parse_err("Sub M()\r\nRaiseEvent Done\r\nEnd Sub\r\n");
    assert_eq!(err.context, "raise event statement");
    assert_eq!(err.location.line, 2);
}

#[test]
fn test_empty_enum_is_rejected() {
    let err = parse_err("Enum E\r\nEnd Enum\r\n");
    assert_eq!(err.expected, "enum item");
    assert_eq!(err.location.line, 2);
}

#[test]
fn test_handler_keeps_reported_error() {
    let src = "Sub Main()\r\nWend\r\n";
    let mut parser = Parser::new(src).with_file("Main.bas");
    let err = parser.parse_module().unwrap_err();
    assert_eq!(err.location.file.as_deref(), Some("Main.bas"));
    assert!(parser.handler().has_errors());
    assert_eq!(parser.handler().diagnostics().len(), 1);
    assert!(parser.handler().render().contains("Main.bas:2:1"));
}
