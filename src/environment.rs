//! Runtime scope chain.
//!
//! Frames are shared (`Rc<RefCell<_>>`) rather than exclusively owned: every
//! closure created while a frame was active keeps that frame alive, and a
//! mutation through one closure is visible to all siblings holding the same
//! chain.  The global frame has no parent and lives for the process lifetime.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{LoxError, Result};
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct Environment<'a> {
    values: HashMap<String, Value<'a>>,
    pub enclosing: Option<Rc<RefCell<Environment<'a>>>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'a>>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Insert a binding into *this* frame only.  Redefinition is allowed at
    /// the global scope; the resolver rejects it in local scopes.
    pub fn define(&mut self, name: &str, value: Value<'a>) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up through the frame chain, outward to global.
    pub fn get(&self, name: &str, line: usize) -> Result<Value<'a>> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(LoxError::runtime_at(
                line,
                format!("Undefined variable '{}'.", name),
            ))
        }
    }

    /// Assign to an existing binding somewhere in the frame chain.
    pub fn assign(&mut self, name: &str, value: Value<'a>, line: usize) -> Result<()> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(LoxError::runtime_at(
                line,
                format!("Undefined variable '{}'.", name),
            ))
        }
    }

    /// Walk exactly `distance` parent links.  The resolver guarantees the
    /// chain is at least that deep.
    fn ancestor(env: &Rc<RefCell<Environment<'a>>>, distance: usize) -> Rc<RefCell<Environment<'a>>> {
        let mut frame = Rc::clone(env);

        for _ in 0..distance {
            let parent = frame
                .borrow()
                .enclosing
                .as_ref()
                .map(Rc::clone)
                .expect("resolved distance exceeds environment chain depth");

            frame = parent;
        }

        frame
    }

    /// Fast path for resolved references: read `name` from the frame exactly
    /// `distance` hops out.  No fallback chain search — absence at the target
    /// frame after successful resolution is a resolver/interpreter
    /// inconsistency, not a recoverable runtime condition.
    pub fn get_at(env: &Rc<RefCell<Environment<'a>>>, distance: usize, name: &str) -> Value<'a> {
        Self::ancestor(env, distance)
            .borrow()
            .values
            .get(name)
            .cloned()
            .expect("resolved local missing from its scope frame")
    }

    /// Fast path for resolved assignments; same contract as [`get_at`].
    ///
    /// [`get_at`]: Environment::get_at
    pub fn assign_at(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
        name: &str,
        value: Value<'a>,
    ) {
        let frame = Self::ancestor(env, distance);
        let mut frame = frame.borrow_mut();

        let slot = frame
            .values
            .get_mut(name)
            .expect("resolved local missing from its scope frame");

        *slot = value;
    }
}
