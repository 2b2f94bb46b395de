//! The callable object model: native functions and user functions.
//!
//! Everything invocable implements [`LoxCallable`]; the interpreter checks
//! arity before dispatching, so `call` may assume `arguments.len() ==
//! self.arity()`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::class::LoxInstance;
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Polymorphic call interface over native functions, user functions, and
/// classes (instantiation).
pub trait LoxCallable<'a> {
    /// The fixed number of arguments this callable accepts.
    fn arity(&self) -> usize;

    /// Invoke with already-evaluated arguments.  `paren` is the closing `)`
    /// of the call site, used for error attribution.
    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
        paren: &Token<'a>,
    ) -> Result<Value<'a>>;
}

/// Signature of a host-implemented function.  Higher-ranked over the value
/// lifetime so one `fn` item serves every interpreter session.
pub type NativeFn = for<'b> fn(&[Value<'b>]) -> std::result::Result<Value<'b>, String>;

/// A callable implemented by the host runtime rather than by user code.
#[derive(Debug, Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

impl<'a> LoxCallable<'a> for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        _interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
        paren: &Token<'a>,
    ) -> Result<Value<'a>> {
        debug!("Calling native function '{}'", self.name);

        (self.func)(&arguments).map_err(|msg| LoxError::runtime(paren, msg))
    }
}

/// A user-declared function value: the shared declaration plus the
/// environment frame captured at creation time.
pub struct LoxFunction<'a> {
    declaration: Rc<FunctionDecl<'a>>,
    closure: Rc<RefCell<Environment<'a>>>,
    is_initializer: bool,
}

impl<'a> LoxFunction<'a> {
    pub fn new(
        declaration: Rc<FunctionDecl<'a>>,
        closure: Rc<RefCell<Environment<'a>>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    /// Display name (`lambda` for anonymous functions).
    pub fn name(&self) -> &str {
        self.declaration.name_str()
    }

    /// Produce a copy of this function whose closure is a fresh frame
    /// binding `this` to `instance`.  Used for method lookup and for
    /// `super.method` binding.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance<'a>>>) -> LoxFunction<'a> {
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.define("this", Value::Instance(instance));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }

    /// The `this` binding of an initializer's closure.  Only called when
    /// `is_initializer`, in which case `bind` installed it at distance 0.
    fn bound_this(&self) -> Value<'a> {
        Environment::get_at(&self.closure, 0, "this")
    }
}

impl<'a> LoxCallable<'a> for LoxFunction<'a> {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
        _paren: &Token<'a>,
    ) -> Result<Value<'a>> {
        debug!("Calling function '{}'", self.name());

        // Fresh frame per call, chained to the captured closure; reentrant
        // calls each get their own frame.
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(param.lexeme, argument);
        }

        let flow = interpreter.execute_block(
            &self.declaration.body,
            Rc::new(RefCell::new(environment)),
        )?;

        let result = match flow {
            // An initializer's return value is always the new instance.
            Flow::Return(value) => {
                if self.is_initializer {
                    self.bound_this()
                } else {
                    value
                }
            }

            Flow::Normal => {
                if self.is_initializer {
                    self.bound_this()
                } else {
                    Value::Nil
                }
            }

            // The parser rejects break/continue outside loops, so a loop
            // signal can never cross a function boundary.
            Flow::Break | Flow::Continue => {
                unreachable!("loop control signal escaped its enclosing loop")
            }
        };

        Ok(result)
    }
}

impl<'a> fmt::Debug for LoxFunction<'a> {
    // Closures can be cyclic through their environment; print the name only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
