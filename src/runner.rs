use crate::ast::{Expr, Program};
use crate::environment::Environment;
use crate::error::LambError;
use crate::evaluator::Evaluator;
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::value::Value;
use log::{debug, info};

/// Runs the statements of `program` against a fresh root environment.
pub fn run(program: Program) -> Result<Value, LambError> {
    run_with(program, &mut Evaluator::new())
}

/// Like [`run`], reducing expression statements with `evaluator`.
///
/// Assignments bind their right-hand side unreduced in the root frame;
/// expression statements are reduced to normal form. The value of the last
/// expression statement is the program's value, `0` if there is none.
pub fn run_with(program: Program, evaluator: &mut Evaluator) -> Result<Value, LambError> {
    let mut environment = Environment::global();
    let mut output = Value::Integer(0);

    debug!("Running {} statements", program.statements.len());
    for stmt in program.statements {
        match stmt.expr {
            Expr::Assign { target, value } => {
                debug!("Defining '{}' at line {}", target, stmt.span.line);
                environment
                    .define(&target, *value)
                    .map_err(|e| e.or_span(&stmt.span))?;
            }
            expr => {
                debug!("Reducing statement at line {}: {}", stmt.span.line, expr);
                let result = evaluator
                    .reduce(expr, &mut environment)
                    .map_err(|e| e.or_span(&stmt.span))?;
                debug!("Normal form after {} passes: {}", evaluator.passes(), result);
                output = Value::from(result);
            }
        }
    }

    info!("Program finished with {}", output);
    Ok(output)
}

/// Tokenizes, parses and runs `source`.
pub fn execute(source: &str) -> Result<Value, LambError> {
    run(parse(tokenize(source)?)?)
}

/// Runs `source`, printing its value on success or a diagnostic on failure.
/// Returns whether the run succeeded.
pub fn run_source(source: &str, filename: Option<&str>, evaluator: &mut Evaluator) -> bool {
    let result = tokenize(source)
        .and_then(parse)
        .and_then(|program| run_with(program, evaluator));

    match result {
        Ok(value) => {
            println!("{}", value);
            true
        }
        Err(error) => {
            error.report(source, filename);
            false
        }
    }
}
