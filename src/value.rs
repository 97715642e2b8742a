use crate::ast::Expr;
use std::fmt;

/// Result of running a program: an integer, or whatever normal form the
/// last expression statement reached (a record, a function, a stuck term).
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Term(Expr),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Term(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Term(expr) => expr.kind_name(),
        }
    }
}

impl From<Expr> for Value {
    fn from(expr: Expr) -> Self {
        match expr {
            Expr::Integer(n) => Value::Integer(n),
            other => Value::Term(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Term(expr) => write!(f, "{}", expr),
        }
    }
}
