//! Classes and instances.
//!
//! A class is itself callable: invoking it constructs an instance and runs
//! the `init` method if one exists anywhere in the superclass chain.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::{LoxCallable, LoxFunction};
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Runtime representation of a class declaration: its name, a method table,
/// and an optional superclass for inherited lookup.
#[derive(Debug)]
pub struct LoxClass<'a> {
    pub name: String,
    pub superclass: Option<Rc<LoxClass<'a>>>,
    methods: HashMap<String, Rc<LoxFunction<'a>>>,
}

impl<'a> LoxClass<'a> {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass<'a>>>,
        methods: HashMap<String, Rc<LoxFunction<'a>>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    /// Search own methods, then the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction<'a>>> {
        self.methods.get(name).cloned().or_else(|| {
            self.superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name))
        })
    }
}

// Implemented on `Rc<LoxClass>` because constructing an instance needs a
// shared handle to the class.
impl<'a> LoxCallable<'a> for Rc<LoxClass<'a>> {
    /// A class's arity is its initializer's, or 0 when it has none.
    fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
        paren: &Token<'a>,
    ) -> Result<Value<'a>> {
        debug!("Instantiating class '{}'", self.name);

        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(self))));

        // The initializer's own return value is discarded; instantiation
        // always yields the new instance.
        if let Some(initializer) = self.find_method("init") {
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, arguments, paren)?;
        }

        Ok(Value::Instance(instance))
    }
}

impl<'a> fmt::Display for LoxClass<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An object: a back-reference to its class plus fields created lazily on
/// first write.
pub struct LoxInstance<'a> {
    class: Rc<LoxClass<'a>>,
    fields: HashMap<String, Value<'a>>,
}

impl<'a> LoxInstance<'a> {
    pub fn new(class: Rc<LoxClass<'a>>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class.name
    }

    /// Property read: fields shadow methods; method lookup walks the full
    /// superclass chain and binds `this` before the miss becomes an error.
    pub fn get(this: &Rc<RefCell<LoxInstance<'a>>>, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(value) = this.borrow().fields.get(name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = this.borrow().class.find_method(name.lexeme) {
            return Ok(Value::Function(Rc::new(method.bind(Rc::clone(this)))));
        }

        Err(LoxError::runtime(
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    /// Field write: always succeeds, creating the field on first set.
    pub fn set(&mut self, name: &Token<'a>, value: Value<'a>) {
        self.fields.insert(name.lexeme.to_string(), value);
    }
}

impl<'a> fmt::Debug for LoxInstance<'a> {
    // Fields can refer back to the instance itself; avoid recursing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
