//! Tree-walking evaluator.
//!
//! Statements execute against an environment chain and yield a [`Flow`]
//! outcome; expressions evaluate to [`Value`]s.  Variable references that the
//! resolver annotated jump straight to their frame (`get_at`/`assign_at`);
//! everything else falls back to global lookup by name.
//!
//! `break`/`continue`/`return` are carried as `Flow` tags checked by each
//! statement's caller — they are data flow, not error propagation, and never
//! reach the top-level error reporter.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::ast::{Expr, LiteralValue, NodeId, Stmt};
use crate::callable::{LoxCallable, LoxFunction, NativeFunction};
use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Outcome of executing one statement.
///
/// `Break`/`Continue` are consumed by the nearest enclosing loop;
/// `Return` unwinds to the enclosing function call boundary.
#[derive(Debug)]
pub enum Flow<'a> {
    Normal,
    Break,
    Continue,
    Return(Value<'a>),
}

/// Wall-clock time in milliseconds, exposed to programs as `clock()`.
fn clock_native<'b>(_args: &[Value<'b>]) -> std::result::Result<Value<'b>, String> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Clock error: {}", e))?
        .as_millis();

    Ok(Value::Number(millis as f64))
}

pub struct Interpreter<'a> {
    /// The global frame; lives for the interpreter's (hence process) lifetime.
    globals: Rc<RefCell<Environment<'a>>>,

    /// Currently active innermost frame.
    environment: Rc<RefCell<Environment<'a>>>,

    /// Resolution table: occurrence identity → scope distance.  Written once
    /// by the resolver, never mutated during execution.
    locals: HashMap<NodeId, usize>,

    /// Where `print` writes.  Injected so tests capture output in-process.
    output: Rc<RefCell<dyn Write>>,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter printing to stdout, with globals seeded with
    /// the native `clock` function.
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    /// Create an interpreter with a custom `print` sink.
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: clock_native,
            })),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Record a resolved occurrence: `id` refers to the scope `depth` frames
    /// out from its point of reference.  Called by the resolver.
    pub fn note_local(&mut self, id: NodeId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Interprets a list of statements (a "program" or one REPL line).
    ///
    /// The first runtime error unwinds the current top-level execution and is
    /// returned; a persistent interpreter stays usable afterwards.
    pub fn interpret(&mut self, statements: &[Stmt<'a>]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}

                // Parser/resolver validation keeps loop and return signals
                // inside their constructs; reaching here is a defect, not a
                // user-facing error.
                flow => unreachable!("control-flow signal {:?} escaped to top level", flow),
            }
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    // ───────────────────────── statement execution ──────────────────────────

    /// Executes a single statement, yielding its control-flow outcome.
    pub fn execute(&mut self, stmt: &Stmt<'a>) -> Result<Flow<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                writeln!(self.output.borrow_mut(), "{}", value)?;

                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Variable '{}' defined with value: {}", name.lexeme, value);

                self.environment.borrow_mut().define(name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let enclosing = Rc::clone(&self.environment);

                self.execute_block(
                    statements,
                    Rc::new(RefCell::new(Environment::with_enclosing(enclosing))),
                )
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    match self.execute(body)? {
                        // Signals affect only the nearest enclosing loop.
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal => {}
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Break { .. } => Ok(Flow::Break),

            Stmt::Continue { .. } => Ok(Flow::Continue),

            Stmt::Function(declaration) => {
                // Capture the environment active at declaration time.
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                if let Some(name) = declaration.name {
                    debug!(
                        "Function '{}' defined with {} parameters",
                        name.lexeme,
                        declaration.params.len()
                    );

                    self.environment
                        .borrow_mut()
                        .define(name.lexeme, Value::Function(Rc::new(function)));
                }

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Execute `statements` in `environment`, restoring the previous frame
    /// before returning — also on error, so REPL sessions stay consistent.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt<'a>],
        environment: Rc<RefCell<Environment<'a>>>,
    ) -> Result<Flow<'a>> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut outcome = Ok(Flow::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}

                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;

        outcome
    }

    fn execute_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&Expr<'a>>,
        methods: &[Rc<crate::ast::FunctionDecl<'a>>],
    ) -> Result<Flow<'a>> {
        // Declare the name before evaluating the superclass so methods can
        // refer to the class being defined.
        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        let superclass_value: Option<Rc<LoxClass<'a>>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    // The parser only produces Variable nodes here.
                    let token = match expr {
                        Expr::Variable { name, .. } => *name,
                        _ => name,
                    };

                    return Err(LoxError::runtime(token, "Superclass must be a class."));
                }
            },

            None => None,
        };

        // Methods close over an intermediate frame binding `super`, so
        // super-dispatch is fixed at class definition time.
        let method_env = match &superclass_value {
            Some(class) => {
                let mut env = Environment::with_enclosing(Rc::clone(&self.environment));
                env.define("super", Value::Class(Rc::clone(class)));

                Rc::new(RefCell::new(env))
            }

            None => Rc::clone(&self.environment),
        };

        let mut method_map: HashMap<String, Rc<LoxFunction<'a>>> = HashMap::new();

        for declaration in methods {
            let is_initializer = declaration.name.map_or(false, |t| t.lexeme == "init");

            let function = LoxFunction::new(
                Rc::clone(declaration),
                Rc::clone(&method_env),
                is_initializer,
            );

            method_map.insert(declaration.name_str().to_string(), Rc::new(function));
        }

        let class = LoxClass::new(name.lexeme.to_string(), superclass_value, method_map);

        self.environment.borrow_mut().assign(
            name.lexeme,
            Value::Class(Rc::new(class)),
            name.line,
        )?;

        info!("Class '{}' defined", name.lexeme);

        Ok(Flow::Normal)
    }

    // ───────────────────────── expression evaluation ────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr<'a>) -> Result<Value<'a>> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable { id, name } => self.look_up_variable(name, *id),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(
                            &self.environment,
                            distance,
                            name.lexeme,
                            value.clone(),
                        );
                    }

                    None => {
                        self.globals
                            .borrow_mut()
                            .assign(name.lexeme, value.clone(), name.line)?;
                    }
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_value = self.evaluate(callee)?;

                let mut argument_values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    argument_values.push(self.evaluate(argument)?);
                }

                self.invoke_callable(&callee_value, paren, argument_values)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),

                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value = self.evaluate(value)?;

                    instance.borrow_mut().set(name, value.clone());

                    Ok(value)
                }

                _ => Err(LoxError::runtime(name, "Only instances have fields.")),
            },

            Expr::This { id, keyword } => self.look_up_variable(keyword, *id),

            Expr::Super {
                id,
                keyword: _,
                method,
            } => self.evaluate_super(*id, method),

            Expr::Lambda(declaration) => {
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                Ok(Value::Function(Rc::new(function)))
            }
        }
    }

    fn look_up_variable(&self, name: &'a Token<'a>, id: NodeId) -> Result<Value<'a>> {
        match self.locals.get(&id) {
            Some(&distance) => Ok(Environment::get_at(&self.environment, distance, name.lexeme)),

            None => self.globals.borrow().get(name.lexeme, name.line),
        }
    }

    /// `super.method`: dispatch starts at the statically bound superclass
    /// (at the resolved distance), not the instance's dynamic class, then
    /// binds to the current instance (`this`, one frame nearer).
    fn evaluate_super(&mut self, id: NodeId, method: &'a Token<'a>) -> Result<Value<'a>> {
        let distance = *self
            .locals
            .get(&id)
            .expect("unresolved 'super' reached evaluation");

        let superclass = match Environment::get_at(&self.environment, distance, "super") {
            Value::Class(class) => class,
            _ => unreachable!("'super' bound to a non-class value"),
        };

        let instance = match Environment::get_at(&self.environment, distance - 1, "this") {
            Value::Instance(instance) => instance,
            _ => unreachable!("'this' bound to a non-instance value"),
        };

        let function = superclass.find_method(method.lexeme).ok_or_else(|| {
            LoxError::runtime(method, format!("Undefined property '{}'.", method.lexeme))
        })?;

        Ok(Value::Function(Rc::new(function.bind(instance))))
    }

    /// Evaluates a unary expression.
    fn evaluate_unary(&mut self, operator: &'a Token<'a>, expr: &Expr<'a>) -> Result<Value<'a>> {
        let right = self.evaluate(expr)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&right))),

            _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
        }
    }

    /// Evaluates a short-circuiting `and`/`or`: yields the operand value
    /// that determined the result, not a boolean.
    fn evaluate_logical(
        &mut self,
        left: &Expr<'a>,
        operator: &'a Token<'a>,
        right: &Expr<'a>,
    ) -> Result<Value<'a>> {
        let left_value = self.evaluate(left)?;

        match operator.token_type {
            TokenType::OR if is_truthy(&left_value) => Ok(left_value),
            TokenType::AND if !is_truthy(&left_value) => Ok(left_value),
            _ => self.evaluate(right),
        }
    }

    /// Evaluates a binary expression.
    fn evaluate_binary(
        &mut self,
        left: &Expr<'a>,
        operator: &'a Token<'a>,
        right: &Expr<'a>,
    ) -> Result<Value<'a>> {
        let left_value = self.evaluate(left)?;
        let right_value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(LoxError::runtime(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => self.numeric_op(left_value, right_value, operator, |a, b| {
                Value::Number(a - b)
            }),

            TokenType::STAR => self.numeric_op(left_value, right_value, operator, |a, b| {
                Value::Number(a * b)
            }),

            TokenType::SLASH => self.numeric_op(left_value, right_value, operator, |a, b| {
                Value::Number(a / b)
            }),

            TokenType::GREATER => self.numeric_op(left_value, right_value, operator, |a, b| {
                Value::Bool(a > b)
            }),

            TokenType::GREATER_EQUAL => self
                .numeric_op(left_value, right_value, operator, |a, b| {
                    Value::Bool(a >= b)
                }),

            TokenType::LESS => self.numeric_op(left_value, right_value, operator, |a, b| {
                Value::Bool(a < b)
            }),

            TokenType::LESS_EQUAL => self
                .numeric_op(left_value, right_value, operator, |a, b| {
                    Value::Bool(a <= b)
                }),

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left_value, &right_value))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left_value, &right_value))),

            _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
        }
    }

    fn numeric_op(
        &self,
        left: Value<'a>,
        right: Value<'a>,
        operator: &'a Token<'a>,
        op: fn(f64, f64) -> Value<'a>,
    ) -> Result<Value<'a>> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(op(a, b)),
            _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
        }
    }

    /// Invokes a callable (native function, user function, or class) after
    /// checking that the argument count matches its arity exactly.
    fn invoke_callable(
        &mut self,
        callee: &Value<'a>,
        paren: &'a Token<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        let callable: &dyn LoxCallable<'a> = match callee {
            Value::NativeFunction(func) => func.as_ref(),
            Value::Function(func) => func.as_ref(),
            Value::Class(class) => class,

            _ => {
                return Err(LoxError::runtime(
                    paren,
                    "Can only call functions and classes.",
                ));
            }
        };

        if arguments.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arguments.len()
                ),
            ));
        }

        callable.call(self, arguments, paren)
    }
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────── value helpers ─────────────────────────

fn literal_value<'a>(literal: &LiteralValue) -> Value<'a> {
    match literal {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::String(s.clone()),
        LiteralValue::True => Value::Bool(true),
        LiteralValue::False => Value::Bool(false),
        LiteralValue::Nil => Value::Nil,
    }
}

/// `nil` and `false` are falsy; everything else (including `0` and `""`)
/// is truthy.
pub fn is_truthy(value: &Value<'_>) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        _ => true,
    }
}

/// `nil` equals only `nil`; cross-type equality is always false; heap
/// values compare by identity.
pub fn is_equal<'a>(left: &Value<'a>, right: &Value<'a>) -> bool {
    match (left, right) {
        (Value::Nil, Value::Nil) => true,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}
