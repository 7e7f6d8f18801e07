// File: src/visit.rs
//
// Read-only, depth-first traversal of the module AST.
// Implement `Visitor` and override the `visit_*` methods of interest; the
// default of each calls the matching `walk_*` function, which visits the
// node's children in source order. Overrides that still want the children
// visited call `walk_*` themselves.

use serde::Serialize;

use crate::ast::*;

pub trait Visitor: Sized {
    fn visit_module(&mut self, module: &Module) {
        walk_module(self, module);
    }

    fn visit_module_item(&mut self, item: &ModuleItem) {
        walk_module_item(self, item);
    }

    fn visit_comment(&mut self, _comment: &LonelyComment) {}

    fn visit_attribute(&mut self, _attr: &Attribute) {}

    fn visit_option(&mut self, _opt: &OptionStmt) {}

    fn visit_declaration(&mut self, decl: &Declaration) {
        walk_declaration(self, decl);
    }

    fn visit_variable_decl(&mut self, _var: &Variable) {}

    fn visit_parameter(&mut self, param: &Parameter) {
        walk_parameter(self, param);
    }

    fn visit_sub(&mut self, sub: &SubDef) {
        walk_sub(self, sub);
    }

    fn visit_function(&mut self, func: &FunctionDef) {
        walk_function(self, func);
    }

    fn visit_property(&mut self, prop: &PropertyDef) {
        walk_property(self, prop);
    }

    fn visit_block(&mut self, block: &[Statement]) {
        walk_block(self, block);
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_literal(&mut self, _lit: &Literal) {}

    fn visit_variable(&mut self, var: &DecoratedVariable) {
        walk_variable(self, var);
    }

    fn visit_function_call(&mut self, call: &FunctionCall) {
        walk_function_call(self, call);
    }
}

pub fn walk_module<V: Visitor>(v: &mut V, module: &Module) {
    for item in &module.items {
        v.visit_module_item(item);
    }
}

pub fn walk_module_item<V: Visitor>(v: &mut V, item: &ModuleItem) {
    match item {
        ModuleItem::Comment(c) => v.visit_comment(c),
        ModuleItem::EmptyLine(_) => {}
        ModuleItem::Attribute(a) => v.visit_attribute(a),
        ModuleItem::Option(o) => v.visit_option(o),
        ModuleItem::Declaration(d) => v.visit_declaration(d),
        ModuleItem::Sub(s) => v.visit_sub(s),
        ModuleItem::Function(f) => v.visit_function(f),
        ModuleItem::Property(p) => v.visit_property(p),
    }
}

pub fn walk_declaration<V: Visitor>(v: &mut V, decl: &Declaration) {
    match decl {
        Declaration::GlobalVars(g) => {
            for var in &g.vars {
                v.visit_variable_decl(var);
            }
        }
        Declaration::Consts(group) => {
            for c in &group.consts {
                v.visit_variable_decl(&c.var);
                v.visit_literal(&c.value);
            }
        }
        Declaration::Enum(e) => {
            for value in e.items.iter().filter_map(|item| item.value.as_ref()) {
                v.visit_literal(value);
            }
        }
        Declaration::Record(r) => {
            for member in &r.members {
                v.visit_variable_decl(member);
            }
        }
        Declaration::ExternalSub(ext) => walk_params(v, &ext.params),
        Declaration::ExternalFunction(ext) => walk_params(v, &ext.params),
        Declaration::Event(ev) => walk_params(v, &ev.params),
    }
}

fn walk_params<V: Visitor>(v: &mut V, params: &[Parameter]) {
    for param in params {
        v.visit_parameter(param);
    }
}

pub fn walk_parameter<V: Visitor>(v: &mut V, param: &Parameter) {
    v.visit_variable_decl(&param.var);
    if let Some(default) = &param.default {
        v.visit_literal(default);
    }
}

pub fn walk_sub<V: Visitor>(v: &mut V, sub: &SubDef) {
    walk_params(v, &sub.head.params);
    v.visit_block(&sub.body);
}

pub fn walk_function<V: Visitor>(v: &mut V, func: &FunctionDef) {
    walk_params(v, &func.head.params);
    v.visit_block(&func.body);
}

pub fn walk_property<V: Visitor>(v: &mut V, prop: &PropertyDef) {
    walk_params(v, prop.head.params());
    v.visit_block(&prop.body);
}

pub fn walk_block<V: Visitor>(v: &mut V, block: &[Statement]) {
    for stmt in block {
        v.visit_statement(stmt);
    }
}

pub fn walk_statement<V: Visitor>(v: &mut V, stmt: &Statement) {
    match stmt {
        Statement::Comment(c) => v.visit_comment(c),
        Statement::EmptyLine(_)
        | Statement::Exit(_)
        | Statement::Goto(_)
        | Statement::OnError(_)
        | Statement::Resume(_)
        | Statement::Label(_) => {}
        Statement::Assign(s) => {
            v.visit_variable(&s.target);
            v.visit_expression(&s.value);
        }
        Statement::LocalVarDecl(s) => {
            for var in &s.vars {
                v.visit_variable_decl(var);
            }
        }
        Statement::ReDim(s) => {
            v.visit_variable(&s.var);
            for dim in &s.dims {
                v.visit_expression(dim);
            }
        }
        Statement::Call(s) => {
            for arg in &s.args {
                v.visit_expression(arg);
            }
        }
        Statement::RaiseEvent(s) => {
            for arg in &s.args {
                v.visit_expression(arg);
            }
        }
        Statement::While(s) => {
            v.visit_expression(&s.condition);
            v.visit_block(&s.block);
        }
        Statement::Do(s) => v.visit_block(&s.block),
        Statement::DoWhile(s) | Statement::DoUntil(s) => {
            v.visit_expression(&s.condition);
            v.visit_block(&s.block);
        }
        Statement::LoopWhile(s) | Statement::LoopUntil(s) => {
            v.visit_block(&s.block);
            v.visit_expression(&s.condition);
        }
        Statement::For(s) => {
            v.visit_variable(&s.var);
            v.visit_expression(&s.from);
            v.visit_expression(&s.to);
            if let Some(step) = &s.step {
                v.visit_expression(step);
            }
            v.visit_block(&s.block);
        }
        Statement::ForEach(s) => {
            v.visit_variable(&s.var);
            v.visit_expression(&s.container);
            v.visit_block(&s.block);
        }
        Statement::If(s) => {
            for branch in std::iter::once(&s.first_branch).chain(&s.elseif_branches) {
                v.visit_expression(&branch.condition);
                v.visit_block(&branch.block);
            }
            if let Some(block) = &s.else_block {
                v.visit_block(block);
            }
        }
        Statement::With(s) => {
            v.visit_variable(&s.target);
            v.visit_block(&s.block);
        }
        Statement::Select(s) => {
            v.visit_expression(&s.condition);
            for case in &s.cases {
                for clause in &case.clauses {
                    match clause {
                        CaseClause::Value(e) | CaseClause::Relational(_, e) => v.visit_expression(e),
                        CaseClause::Range(from, to) => {
                            v.visit_expression(from);
                            v.visit_expression(to);
                        }
                    }
                }
                v.visit_block(&case.block);
            }
            if let Some(block) = &s.else_block {
                v.visit_block(block);
            }
        }
    }
}

pub fn walk_expression<V: Visitor>(v: &mut V, expr: &Expression) {
    match expr {
        Expression::Literal(lit, _) => v.visit_literal(lit),
        Expression::Variable(var) => v.visit_variable(var),
        Expression::Call(call) => v.visit_function_call(call),
    }
}

pub fn walk_variable<V: Visitor>(v: &mut V, var: &DecoratedVariable) {
    for element in &var.context.elements {
        if let ContextElement::Call(call) = element {
            v.visit_function_call(call);
        }
    }
}

pub fn walk_function_call<V: Visitor>(v: &mut V, call: &FunctionCall) {
    for arg in &call.args {
        v.visit_expression(arg);
    }
}

/// Node counts over a module, as printed by `vb6-parser parse --stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleStats {
    pub comments: usize,
    pub attributes: usize,
    pub options: usize,
    pub declarations: usize,
    pub procedures: usize,
    pub statements: usize,
    /// Deepest statement-block nesting; a procedure body is depth 1
    pub max_depth: usize,
    pub function_calls: usize,
    #[serde(skip)]
    depth: usize,
}

impl ModuleStats {
    pub fn collect(module: &Module) -> Self {
        let mut stats = ModuleStats::default();
        stats.visit_module(module);
        stats
    }
}

impl Visitor for ModuleStats {
    fn visit_comment(&mut self, _comment: &LonelyComment) {
        self.comments += 1;
    }

    fn visit_attribute(&mut self, _attr: &Attribute) {
        self.attributes += 1;
    }

    fn visit_option(&mut self, _opt: &OptionStmt) {
        self.options += 1;
    }

    fn visit_declaration(&mut self, decl: &Declaration) {
        self.declarations += 1;
        walk_declaration(self, decl);
    }

    fn visit_sub(&mut self, sub: &SubDef) {
        self.procedures += 1;
        walk_sub(self, sub);
    }

    fn visit_function(&mut self, func: &FunctionDef) {
        self.procedures += 1;
        walk_function(self, func);
    }

    fn visit_property(&mut self, prop: &PropertyDef) {
        self.procedures += 1;
        walk_property(self, prop);
    }

    fn visit_block(&mut self, block: &[Statement]) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        walk_block(self, block);
        self.depth -= 1;
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        if !matches!(stmt, Statement::Comment(_) | Statement::EmptyLine(_)) {
            self.statements += 1;
        }
        walk_statement(self, stmt);
    }

    fn visit_function_call(&mut self, call: &FunctionCall) {
        self.function_calls += 1;
        walk_function_call(self, call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse(src: &str) -> Module {
        Parser::new(src).parse_module().unwrap()
    }

    #[derive(Default)]
    struct CallNames(Vec<String>);

    impl Visitor for CallNames {
        fn visit_statement(&mut self, stmt: &Statement) {
            if let Statement::Call(call) = stmt {
                self.0.push(call.sub_name.clone());
            }
            walk_statement(self, stmt);
        }

        fn visit_function_call(&mut self, call: &FunctionCall) {
            self.0.push(call.name.clone());
            walk_function_call(self, call);
        }
    }

    #[test]
    fn test_visits_in_source_order() {
        let module = parse(
            "Sub Main()\r\n\
             If Ready(x) Then\r\n\
             Log Format(Now(), \"hh\")\r\n\
             End If\r\n\
             End Sub\r\n",
        );
        let mut names = CallNames::default();
        names.visit_module(&module);
        assert_eq!(names.0, vec!["Ready", "Log", "Format", "Now"]);
    }

    #[test]
    fn test_module_stats() {
        let module = parse(
            "Attribute VB_Name = \"M\"\r\n\
             Option Explicit\r\n\
             ' header\r\n\
             Const Max As Integer = 10\r\n\
             Function F(ByVal n As Integer) As Integer\r\n\
             For i = 1 To Max\r\n\
             While Busy()\r\n\
             ' wait\r\n\
             Wend\r\n\
             Next i\r\n\
             End Function\r\n",
        );
        let stats = ModuleStats::collect(&module);
        assert_eq!(stats.comments, 2);
        assert_eq!(stats.attributes, 1);
        assert_eq!(stats.options, 1);
        assert_eq!(stats.declarations, 1);
        assert_eq!(stats.procedures, 1);
        assert_eq!(stats.statements, 2);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.function_calls, 1);
    }
}
