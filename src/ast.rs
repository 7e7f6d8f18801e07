// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for VB6 modules.
// Defines the structure of a parsed module.
//
// Nodes are built once, bottom-up, as each grammar rule succeeds and are
// never mutated afterwards. Literals (Literal) and expressions (Expression)
// are values; statements (Statement) are grouped into ordered blocks;
// declarations and procedure definitions make up the module (Module).
// Most nodes carry the byte span they were parsed from.

use serde::Serialize;

/// Half-open byte range `[start, end)` into the parsed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// The source text this span covers
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessModifier {
    /// No modifier written
    Na,
    Dim,
    Global,
    Public,
    Private,
    Friend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamQualifier {
    ByVal,
    ByRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignmentKind {
    /// Implicit assignment, no `Let` or `Set`
    Na,
    Let,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocalDeclKind {
    Dim,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GotoKind {
    GoTo,
    GoSub,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OnErrorTarget {
    /// `On Error GoTo 0`
    GoTo0,
    /// `On Error GoTo -1`
    GoToNeg1,
    GoToLabel(String),
    ExitSub,
    ExitFunction,
    ExitProperty,
    ResumeNext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResumeTarget {
    /// Bare `Resume`
    Implicit,
    Next,
    Label(String),
    LineNumber(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitKind {
    Sub,
    Function,
    Property,
    Do,
    While,
    For,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModuleOption {
    Explicit,
    Base0,
    Base1,
    CompareText,
    CompareBinary,
    PrivateModule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationalOperator {
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
}

/// Built-in VB6 data types, as classified from a declared type name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NativeType {
    Boolean,
    Byte,
    Integer,
    Long,
    Single,
    Double,
    Currency,
    Date,
    String,
    Object,
    Variant,
    /// A user type, class, or qualified name
    NonNative,
}

impl NativeType {
    pub fn classify(type_name: &str) -> NativeType {
        match type_name.to_ascii_lowercase().as_str() {
            "boolean" => NativeType::Boolean,
            "byte" => NativeType::Byte,
            "integer" => NativeType::Integer,
            "long" => NativeType::Long,
            "single" => NativeType::Single,
            "double" => NativeType::Double,
            "currency" => NativeType::Currency,
            "date" => NativeType::Date,
            "string" => NativeType::String,
            "object" => NativeType::Object,
            "variant" => NativeType::Variant,
            _ => NativeType::NonNative,
        }
    }
}

/// Constant value. Integer variants keep the radix they were written in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Single(f32),
    Double(f64),
    LongDec(i32),
    LongHex(i32),
    LongOct(i32),
    IntegerDec(i16),
    IntegerHex(i16),
    IntegerOct(i16),
    String(String),
    Boolean(bool),
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
    pub span: Span,
}

/// One `.`-terminated segment of an identifier chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ContextElement {
    Name(String),
    Call(FunctionCall),
}

/// Every segment of a dotted reference except the last, e.g. `a.b().` in `a.b().c`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IdentifierContext {
    /// Access relative to the target of an enclosing `With`
    pub leading_dot: bool,
    pub elements: Vec<ContextElement>,
    pub span: Span,
}

impl IdentifierContext {
    pub fn is_empty(&self) -> bool {
        !self.leading_dot && self.elements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedVariable {
    pub context: IdentifierContext,
    pub name: String,
    pub span: Span,
}

impl DecoratedVariable {
    /// Plain name with no chain, as in `For i = ...`
    pub fn is_simple(&self) -> bool {
        self.context.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Literal(Literal, Span),
    Variable(DecoratedVariable),
    Call(FunctionCall),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(_, span) => *span,
            Expression::Variable(var) => var.span,
            Expression::Call(call) => call.span,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Expression::Literal(lit, _) => Some(lit),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&DecoratedVariable> {
        match self {
            Expression::Variable(var) => Some(var),
            _ => None,
        }
    }
}

/// One dimension of an array declaration: `10` or `1 To 10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArrayBound {
    pub lower: Option<i32>,
    pub upper: i32,
}

/// A declared variable: field, parameter, local or global
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    /// Declared type as written, qualified names included (`VB.Form`)
    pub type_name: Option<String>,
    /// `As New ...`
    pub construct: bool,
    /// `Some(vec![])` for `name()`, `None` when not an array
    pub array: Option<Vec<ArrayBound>>,
    pub span: Span,
}

impl Variable {
    pub fn native_type(&self) -> Option<NativeType> {
        self.type_name.as_deref().map(NativeType::classify)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalVarDecl {
    pub access: AccessModifier,
    pub with_events: bool,
    pub vars: Vec<Variable>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstDecl {
    pub var: Variable,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstGroup {
    pub access: AccessModifier,
    pub consts: Vec<ConstDecl>,
    pub span: Span,
}

/// `Type ... End Type`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub access: AccessModifier,
    pub name: String,
    pub members: Vec<Variable>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumItem {
    pub name: String,
    pub value: Option<Literal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub access: AccessModifier,
    pub name: String,
    pub items: Vec<EnumItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub optional: bool,
    pub qualifier: Option<ParamQualifier>,
    pub param_array: bool,
    pub var: Variable,
    pub default: Option<Literal>,
}

/// `Declare Sub name Lib "dll" [Alias "entry"] (params)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalSub {
    pub access: AccessModifier,
    pub name: String,
    pub lib: String,
    pub alias: Option<String>,
    pub params: Vec<Parameter>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalFunction {
    pub access: AccessModifier,
    pub name: String,
    pub lib: String,
    pub alias: Option<String>,
    pub params: Vec<Parameter>,
    pub return_type: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubHead {
    pub access: AccessModifier,
    pub name: String,
    pub params: Vec<Parameter>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionHead {
    pub access: AccessModifier,
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventHead {
    pub access: AccessModifier,
    pub name: String,
    pub params: Vec<Parameter>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyLetHead {
    pub access: AccessModifier,
    pub name: String,
    pub params: Vec<Parameter>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySetHead {
    pub access: AccessModifier,
    pub name: String,
    pub params: Vec<Parameter>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyGetHead {
    pub access: AccessModifier,
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyHead {
    Let(PropertyLetHead),
    Set(PropertySetHead),
    Get(PropertyGetHead),
}

impl PropertyHead {
    pub fn name(&self) -> &str {
        match self {
            PropertyHead::Let(h) => &h.name,
            PropertyHead::Set(h) => &h.name,
            PropertyHead::Get(h) => &h.name,
        }
    }

    pub fn params(&self) -> &[Parameter] {
        match self {
            PropertyHead::Let(h) => &h.params,
            PropertyHead::Set(h) => &h.params,
            PropertyHead::Get(h) => &h.params,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            PropertyHead::Let(h) => h.span,
            PropertyHead::Set(h) => h.span,
            PropertyHead::Get(h) => h.span,
        }
    }
}

/// Module-level declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Declaration {
    GlobalVars(GlobalVarDecl),
    Consts(ConstGroup),
    Enum(EnumDecl),
    Record(Record),
    ExternalSub(ExternalSub),
    ExternalFunction(ExternalFunction),
    Event(EventHead),
}

impl Declaration {
    pub fn span(&self) -> Span {
        match self {
            Declaration::GlobalVars(d) => d.span,
            Declaration::Consts(d) => d.span,
            Declaration::Enum(d) => d.span,
            Declaration::Record(d) => d.span,
            Declaration::ExternalSub(d) => d.span,
            Declaration::ExternalFunction(d) => d.span,
            Declaration::Event(d) => d.span,
        }
    }
}

/// Comment alone on its line. `content` excludes the `'` or `Rem` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LonelyComment {
    pub content: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptyLine {
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

pub type StatementBlock = Vec<Statement>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignStmt {
    pub kind: AssignmentKind,
    pub target: DecoratedVariable,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalVarDeclStmt {
    pub kind: LocalDeclKind,
    pub vars: Vec<Variable>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReDimStmt {
    pub preserve: bool,
    pub var: DecoratedVariable,
    pub dims: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitStmt {
    pub kind: ExitKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GotoStmt {
    pub kind: GotoKind,
    pub label: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnErrorStmt {
    pub target: OnErrorTarget,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeStmt {
    pub target: ResumeTarget,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelStmt {
    pub label: String,
    pub span: Span,
}

/// Sub call. `explicit` is set for the `Call name(args)` form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallStmt {
    /// Possibly qualified (`Module1.Foo`, `.Refresh`)
    pub sub_name: String,
    pub args: Vec<Expression>,
    pub explicit: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaiseEventStmt {
    pub event_name: String,
    pub args: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhileStmt {
    pub condition: Expression,
    pub block: StatementBlock,
    pub span: Span,
}

/// Unconditional `Do ... Loop`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoStmt {
    pub block: StatementBlock,
    pub span: Span,
}

/// `Do While`/`Do Until` with the condition before the block, or
/// `Loop While`/`Loop Until` with it after.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalLoop {
    pub condition: Expression,
    pub block: StatementBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForStmt {
    pub var: DecoratedVariable,
    pub from: Expression,
    pub to: Expression,
    pub step: Option<Expression>,
    pub block: StatementBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForEachStmt {
    pub var: DecoratedVariable,
    pub container: Expression,
    pub block: StatementBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfBranch {
    pub condition: Expression,
    pub block: StatementBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub first_branch: IfBranch,
    pub elseif_branches: Vec<IfBranch>,
    pub else_block: Option<StatementBlock>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithStmt {
    pub target: DecoratedVariable,
    pub block: StatementBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CaseClause {
    Value(Expression),
    /// `lower To upper`
    Range(Expression, Expression),
    /// `Is <op> expr`
    Relational(RelationalOperator, Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseBlock {
    pub clauses: Vec<CaseClause>,
    pub block: StatementBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectStmt {
    pub condition: Expression,
    pub cases: Vec<CaseBlock>,
    /// `Case Else`
    pub else_block: Option<StatementBlock>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Comment(LonelyComment),
    EmptyLine(EmptyLine),
    Assign(AssignStmt),
    LocalVarDecl(LocalVarDeclStmt),
    ReDim(ReDimStmt),
    Exit(ExitStmt),
    Goto(GotoStmt),
    OnError(OnErrorStmt),
    Resume(ResumeStmt),
    Label(LabelStmt),
    Call(CallStmt),
    RaiseEvent(RaiseEventStmt),
    While(Box<WhileStmt>),
    Do(Box<DoStmt>),
    DoWhile(Box<ConditionalLoop>),
    DoUntil(Box<ConditionalLoop>),
    LoopWhile(Box<ConditionalLoop>),
    LoopUntil(Box<ConditionalLoop>),
    For(Box<ForStmt>),
    ForEach(Box<ForEachStmt>),
    If(Box<IfStmt>),
    With(Box<WithStmt>),
    Select(Box<SelectStmt>),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Comment(s) => s.span,
            Statement::EmptyLine(s) => s.span,
            Statement::Assign(s) => s.span,
            Statement::LocalVarDecl(s) => s.span,
            Statement::ReDim(s) => s.span,
            Statement::Exit(s) => s.span,
            Statement::Goto(s) => s.span,
            Statement::OnError(s) => s.span,
            Statement::Resume(s) => s.span,
            Statement::Label(s) => s.span,
            Statement::Call(s) => s.span,
            Statement::RaiseEvent(s) => s.span,
            Statement::While(s) => s.span,
            Statement::Do(s) => s.span,
            Statement::DoWhile(s) | Statement::DoUntil(s) | Statement::LoopWhile(s) | Statement::LoopUntil(s) => {
                s.span
            }
            Statement::For(s) => s.span,
            Statement::ForEach(s) => s.span,
            Statement::If(s) => s.span,
            Statement::With(s) => s.span,
            Statement::Select(s) => s.span,
        }
    }

    /// Short kind name, used in logs and CLI statistics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Comment(_) => "comment",
            Statement::EmptyLine(_) => "empty line",
            Statement::Assign(_) => "assignment",
            Statement::LocalVarDecl(_) => "local declaration",
            Statement::ReDim(_) => "redim",
            Statement::Exit(_) => "exit",
            Statement::Goto(_) => "goto",
            Statement::OnError(_) => "on error",
            Statement::Resume(_) => "resume",
            Statement::Label(_) => "label",
            Statement::Call(_) => "call",
            Statement::RaiseEvent(_) => "raise event",
            Statement::While(_) => "while",
            Statement::Do(_) => "do",
            Statement::DoWhile(_) => "do while",
            Statement::DoUntil(_) => "do until",
            Statement::LoopWhile(_) => "loop while",
            Statement::LoopUntil(_) => "loop until",
            Statement::For(_) => "for",
            Statement::ForEach(_) => "for each",
            Statement::If(_) => "if",
            Statement::With(_) => "with",
            Statement::Select(_) => "select",
        }
    }
}

// ---------------------------------------------------------------------------
// Procedures and modules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubDef {
    pub head: SubHead,
    pub body: StatementBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDef {
    pub head: FunctionHead,
    pub body: StatementBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDef {
    pub head: PropertyHead,
    pub body: StatementBlock,
    pub span: Span,
}

/// `Attribute name = "value"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionStmt {
    pub option: ModuleOption,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ModuleItem {
    Comment(LonelyComment),
    EmptyLine(EmptyLine),
    Attribute(Attribute),
    Option(OptionStmt),
    Declaration(Declaration),
    Sub(SubDef),
    Function(FunctionDef),
    Property(PropertyDef),
}

impl ModuleItem {
    pub fn span(&self) -> Span {
        match self {
            ModuleItem::Comment(c) => c.span,
            ModuleItem::EmptyLine(e) => e.span,
            ModuleItem::Attribute(a) => a.span,
            ModuleItem::Option(o) => o.span,
            ModuleItem::Declaration(d) => d.span(),
            ModuleItem::Sub(s) => s.span,
            ModuleItem::Function(f) => f.span,
            ModuleItem::Property(p) => p.span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ModuleItem::Comment(_) => "comment",
            ModuleItem::EmptyLine(_) => "empty line",
            ModuleItem::Attribute(_) => "attribute",
            ModuleItem::Option(_) => "option",
            ModuleItem::Declaration(_) => "declaration",
            ModuleItem::Sub(_) => "sub",
            ModuleItem::Function(_) => "function",
            ModuleItem::Property(_) => "property",
        }
    }
}

/// Flat module: every top-level item in source order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Module {
    pub items: Vec<ModuleItem>,
}

impl Module {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
