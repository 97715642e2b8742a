use crate::ast::{Builtin, Expr, BUILTIN_NAMES};
use crate::error::LambError;
use std::collections::HashMap;

/// One frame of the scope chain. Child frames borrow their parent, so a
/// frame is popped simply by dropping it.
#[derive(Debug)]
pub struct Environment<'a> {
    values: HashMap<String, Expr>,
    enclosing: Option<&'a Environment<'a>>,
}

impl Environment<'static> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// Root frame holding a fresh, argument-less node for every builtin.
    pub fn global() -> Self {
        let mut environment = Self::new();
        for name in BUILTIN_NAMES {
            if let Some(builtin) = Builtin::from_name(name) {
                environment
                    .values
                    .insert(name.to_string(), Expr::Predefined(builtin));
            }
        }
        environment
    }
}

impl Default for Environment<'static> {
    fn default() -> Self {
        Self::global()
    }
}

impl<'a> Environment<'a> {
    pub fn with_enclosing(enclosing: &'a Environment<'a>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Binds `name` in this frame. Shadowing a parent's binding is fine;
    /// binding a name twice in the same frame is not.
    pub fn define(&mut self, name: &str, value: Expr) -> Result<(), LambError> {
        if self.values.contains_key(name) {
            return Err(LambError::redefinition(name));
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Binds or rebinds `name` in this frame.
    pub fn assign(&mut self, name: &str, value: Expr) {
        self.values.insert(name.to_string(), value);
    }

    pub fn find(&self, name: &str) -> Option<&Expr> {
        if let Some(value) = self.values.get(name) {
            Some(value)
        } else if let Some(enclosing) = self.enclosing {
            enclosing.find(name)
        } else {
            None
        }
    }

    /// Number of frames from this one up to the root, inclusive.
    pub fn depth(&self) -> usize {
        1 + self.enclosing.map_or(0, |enclosing| enclosing.depth())
    }
}
