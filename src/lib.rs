// Lamb Language Interpreter Library
//
// Core of the lamb interpreter: a lexer, a recursive-descent parser and a
// normal-order tree-rewriting evaluator for a small lambda-calculus language
// with integers, named bindings, records-as-environments and curried
// arithmetic/conditional builtins.

pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod substitute;
pub mod value;

pub use ast::{Builtin, Expr, Program, Record, Stmt};
pub use environment::Environment;
pub use error::{ErrorKind, LambError, RuntimeErrorKind, Span};
pub use evaluator::Evaluator;
pub use lexer::{tokenize, Lexer, Token, TokenType};
pub use parser::{parse, Parser};
pub use value::Value;

pub use runner::{execute, run, run_with};
