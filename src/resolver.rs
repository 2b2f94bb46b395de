//! Static variable resolution pass.
//!
//! Walks the AST between parsing and interpretation, computing for every
//! local reference the number of scopes between the reference and its
//! binding.  Distances are recorded on the interpreter keyed by occurrence
//! id; references not found in any lexical scope are left for dynamic
//! global lookup.
//!
//! The pass also rejects binding misuse that is detectable statically:
//! reading a local inside its own initializer, duplicate declarations in
//! one scope, `return` outside a function, `this`/`super` outside their
//! classes.  Diagnostics accumulate; the walk never stops at the first
//! error.

use std::collections::HashMap;

use log::debug;

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::token::Token;

/// What kind of function body the walker is currently inside.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

/// Whether the walker is inside a class body, and if so whether that class
/// has a superclass.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

pub struct Resolver<'a, 'i> {
    interpreter: &'i mut Interpreter<'a>,

    /// Lexical scope stack, innermost last.  `false` marks a name that is
    /// declared but whose initializer has not finished resolving.
    scopes: Vec<HashMap<&'a str, bool>>,

    current_function: FunctionType,
    current_class: ClassType,
    errors: Vec<LoxError>,
}

impl<'a, 'i> Resolver<'a, 'i> {
    pub fn new(interpreter: &'i mut Interpreter<'a>) -> Self {
        Self {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            errors: Vec::new(),
        }
    }

    /// Resolve a whole program (or one REPL line), returning every
    /// diagnostic found.  An empty vector means the program is safe to run.
    pub fn resolve(&mut self, statements: &[Stmt<'a>]) -> Vec<LoxError> {
        debug!("Resolving {} top-level statements", statements.len());

        for statement in statements {
            self.resolve_stmt(statement);
        }

        std::mem::take(&mut self.errors)
    }

    // ───────────────────────── statements ─────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt<'a>) {
        match stmt {
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),

            Stmt::Var { name, initializer } => {
                self.declare(name);

                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }

                self.define(name);
            }

            Stmt::Block(statements) => {
                self.begin_scope();

                for statement in statements {
                    self.resolve_stmt(statement);
                }

                self.end_scope();
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);

                if let Some(else_stmt) = else_branch {
                    self.resolve_stmt(else_stmt);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            // Loop placement is validated by the parser.
            Stmt::Break { .. } | Stmt::Continue { .. } => {}

            Stmt::Function(declaration) => {
                if let Some(name) = declaration.name {
                    // Defined before the body resolves, so the function can
                    // recurse into itself.
                    self.declare(name);
                    self.define(name);
                }

                self.resolve_function(declaration, FunctionType::Function);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword, "Can't return a value from an initializer.");
                    }

                    self.resolve_expr(expr);
                }
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),
        }
    }

    fn resolve_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&Expr<'a>>,
        methods: &[std::rc::Rc<FunctionDecl<'a>>],
    ) {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(superclass_expr) = superclass {
            if let Expr::Variable {
                name: super_name, ..
            } = superclass_expr
            {
                if super_name.lexeme == name.lexeme {
                    self.error(super_name, "A class can't inherit from itself.");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass_expr);

            // Extra scope binding `super`, mirroring the frame the
            // interpreter inserts at class definition time.
            self.begin_scope();
            self.scopes
                .last_mut()
                .expect("scope just pushed")
                .insert("super", true);
        }

        self.begin_scope();
        self.scopes
            .last_mut()
            .expect("scope just pushed")
            .insert("this", true);

        for method in methods {
            let declaration = if method.name.map_or(false, |t| t.lexeme == "init") {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };

            self.resolve_function(method, declaration);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, declaration: &FunctionDecl<'a>, function_type: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = function_type;

        self.begin_scope();

        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }

        for statement in &declaration.body {
            self.resolve_stmt(statement);
        }

        self.end_scope();

        self.current_function = enclosing_function;
    }

    // ───────────────────────── expressions ─────────────────────────

    fn resolve_expr(&mut self, expr: &Expr<'a>) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme) == Some(&false) {
                        self.error(name, "Can't read local variable in its own initializer.");
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);

                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.error(keyword, "Can't use 'this' outside of a class.");
                    return;
                }

                self.resolve_local(*id, keyword);
            }

            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        self.error(keyword, "Can't use 'super' outside of a class.");
                        return;
                    }

                    ClassType::Class => {
                        self.error(keyword, "Can't use 'super' in a class with no superclass.");
                        return;
                    }

                    ClassType::Subclass => {}
                }

                self.resolve_local(*id, keyword);
            }

            Expr::Lambda(declaration) => {
                self.resolve_function(declaration, FunctionType::Function);
            }
        }
    }

    // ───────────────────────── scope bookkeeping ─────────────────────────

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Add `name` to the innermost scope, unready.  Shadowing an outer
    /// binding is fine; redeclaring within the same local scope is not.
    fn declare(&mut self, name: &'a Token<'a>) {
        let Some(scope) = self.scopes.last_mut() else {
            // Globals may be redefined freely.
            return;
        };

        if scope.contains_key(name.lexeme) {
            self.error(name, "Already a variable with this name in this scope.");
            return;
        }

        scope.insert(name.lexeme, false);
    }

    /// Mark `name` ready for reads in the innermost scope.
    fn define(&mut self, name: &'a Token<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme, true);
        }
    }

    /// Find the innermost scope declaring `name` and record its distance
    /// (0 = innermost).  No match means the reference is (or will be) a
    /// global, handled dynamically at runtime.
    fn resolve_local(&mut self, id: crate::ast::NodeId, name: &Token<'a>) {
        for (distance, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme) {
                debug!(
                    "Resolved '{}' (line {}) at distance {}",
                    name.lexeme, name.line, distance
                );

                self.interpreter.note_local(id, distance);
                return;
            }
        }
    }

    fn error<S: Into<String>>(&mut self, token: &Token<'_>, message: S) {
        self.errors.push(LoxError::resolve(token, message));
    }
}
