use crate::ast::{ArithOp, Builtin, CondArgs, Expr, Operands};
use crate::environment::Environment;
use crate::error::{LambError, RuntimeErrorKind};
use crate::substitute::substitute;
use log::trace;

/// Parameters of the functions enclosing the node being visited. Names in
/// this chain are placeholders and are never looked up.
enum Bound<'a> {
    Empty,
    Param(&'a str, &'a Bound<'a>),
}

impl Bound<'_> {
    fn contains(&self, name: &str) -> bool {
        let mut bound = self;
        while let Bound::Param(param, outer) = bound {
            if *param == name {
                return true;
            }
            bound = *outer;
        }
        false
    }
}

/// Normal-order tree rewriter. Each pass visits the whole tree and performs
/// at most one rewrite per node; reduction stops at the first pass that
/// rewrites nothing.
#[derive(Debug, Default)]
pub struct Evaluator {
    changes: usize,
    passes: usize,
    max_passes: Option<usize>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `PassLimitExceeded` instead of rewriting more than
    /// `limit` passes for a single expression.
    pub fn with_pass_limit(limit: usize) -> Self {
        Self {
            max_passes: Some(limit),
            ..Self::default()
        }
    }

    /// Number of rewriting passes the last `reduce` call performed.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn reduce(&mut self, expr: Expr, env: &mut Environment<'_>) -> Result<Expr, LambError> {
        self.passes = 0;
        let mut tree = expr;

        loop {
            let before = self.changes;
            tree = self.visit(tree, env, &Bound::Empty)?;
            if self.changes == before {
                return Ok(tree);
            }

            self.passes += 1;
            trace!("pass {}: {}", self.passes, tree);

            if let Some(limit) = self.max_passes {
                if self.passes > limit {
                    return Err(LambError::runtime_error(
                        RuntimeErrorKind::PassLimitExceeded,
                        None,
                        format!("Expression did not reach a normal form within {} passes", limit),
                    )
                    .with_help("Raise --max-passes, or check for unbounded recursion."));
                }
            }
        }
    }

    fn visit(
        &mut self,
        expr: Expr,
        env: &mut Environment<'_>,
        bound: &Bound<'_>,
    ) -> Result<Expr, LambError> {
        match expr {
            Expr::Integer(_) | Expr::Env(_) => Ok(expr),
            Expr::Name { name, span } => {
                if bound.contains(&name) {
                    Ok(Expr::Name { name, span })
                } else {
                    self.resolve(&name, env).map_err(|e| e.or_span(&span))
                }
            }
            Expr::Assign { target, value } => {
                let value = self.visit(*value, env, bound)?;
                env.assign(&target, value.clone());
                Ok(Expr::Assign {
                    target,
                    value: Box::new(value),
                })
            }
            Expr::Function { param, body } => {
                let inner = Bound::Param(&param, bound);
                let body = self.visit(*body, env, &inner)?;
                Ok(Expr::Function {
                    param,
                    body: Box::new(body),
                })
            }
            Expr::Apply { left, right } => self.visit_apply(*left, *right, env, bound),
            Expr::Predefined(builtin) => self.visit_builtin(builtin, env, bound),
        }
    }

    /// Substitutes a copy of the node bound to a free name.
    fn resolve(&mut self, name: &str, env: &Environment<'_>) -> Result<Expr, LambError> {
        match env.find(name) {
            Some(value) => {
                self.changes += 1;
                trace!("substituting '{}' with {}", name, value);
                Ok(value.clone())
            }
            None => Err(LambError::undefined_name(name, None)),
        }
    }

    fn visit_apply(
        &mut self,
        left: Expr,
        right: Expr,
        env: &mut Environment<'_>,
        bound: &Bound<'_>,
    ) -> Result<Expr, LambError> {
        match left {
            Expr::Function { param, body } => {
                self.changes += 1;
                Ok(substitute(*body, &param, &right))
            }
            Expr::Predefined(builtin) => match builtin.accept(right) {
                Ok(builtin) => {
                    self.changes += 1;
                    Ok(Expr::Predefined(builtin))
                }
                Err((builtin @ Builtin::Cond(_), right)) => {
                    let left = self.visit_builtin(builtin, env, bound)?;
                    Ok(Expr::apply(left, right))
                }
                Err((builtin, _)) => Err(LambError::runtime_error(
                    RuntimeErrorKind::InvalidApplication,
                    None,
                    format!("Cannot apply '{}': it already has all its arguments", builtin),
                )),
            },
            Expr::Env(record) => {
                if let Expr::Integer(_) = right {
                    return Ok(right);
                }

                let mut frame = Environment::with_enclosing(&*env);
                trace!("entering scope of {} entries", record.len());
                for (name, value) in record.iter() {
                    frame.define(name, value.clone())?;
                }

                let before = self.changes;
                let right = self.visit(right, &mut frame, bound)?;
                drop(frame);

                if self.changes == before {
                    self.changes += 1;
                    Ok(right)
                } else {
                    Ok(Expr::apply(Expr::Env(record), right))
                }
            }
            Expr::Name { name, span } => {
                let left = if bound.contains(&name) {
                    Expr::Name { name, span }
                } else {
                    self.resolve(&name, env).map_err(|e| e.or_span(&span))?
                };
                Ok(Expr::apply(left, right))
            }
            Expr::Apply {
                left: inner_left,
                right: inner_right,
            } => {
                let left = self.visit_apply(*inner_left, *inner_right, env, bound)?;
                Ok(Expr::apply(left, right))
            }
            other => Err(LambError::runtime_error(
                RuntimeErrorKind::InvalidApplication,
                None,
                format!("Cannot apply {} '{}' to '{}'", other.kind_name(), other, right),
            )
            .with_help("Only functions, builtins and records can be applied.")),
        }
    }

    fn visit_builtin(
        &mut self,
        builtin: Builtin,
        env: &mut Environment<'_>,
        bound: &Bound<'_>,
    ) -> Result<Expr, LambError> {
        match builtin {
            Builtin::Cond(CondArgs::Three(test, then, otherwise)) => match *test {
                Expr::Integer(value) => {
                    self.changes += 1;
                    Ok(if value != 0 { *then } else { *otherwise })
                }
                Expr::Env(ref record) => {
                    self.changes += 1;
                    Ok(if !record.is_empty() { *then } else { *otherwise })
                }
                test => {
                    trace!("cond pending at frame depth {}", env.depth());
                    let test = self.visit(test, env, bound)?;
                    // Branches still see this frame; a record scope may be
                    // unwrapped before the test settles.
                    let then = self.visit(*then, env, bound)?;
                    let otherwise = self.visit(*otherwise, env, bound)?;
                    Ok(Expr::Predefined(Builtin::Cond(CondArgs::Three(
                        Box::new(test),
                        Box::new(then),
                        Box::new(otherwise),
                    ))))
                }
            },
            Builtin::Arith(op, Operands::Two(lhs, rhs)) => match (*lhs, *rhs) {
                (Expr::Integer(a), Expr::Integer(b)) => {
                    self.changes += 1;
                    Ok(Expr::Integer(arithmetic(op, a, b)?))
                }
                (lhs, rhs) => {
                    let lhs = self.visit(lhs, env, bound)?;
                    let rhs = self.visit(rhs, env, bound)?;
                    Ok(Expr::Predefined(Builtin::Arith(
                        op,
                        Operands::Two(Box::new(lhs), Box::new(rhs)),
                    )))
                }
            },
            pending => pending
                .try_map_args(|arg| self.visit(arg, env, bound))
                .map(Expr::Predefined),
        }
    }
}

fn arithmetic(op: ArithOp, a: i64, b: i64) -> Result<i64, LambError> {
    let result = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Minus => a.checked_sub(b),
        ArithOp::Mult => a.checked_mul(b),
        ArithOp::Div => {
            if b == 0 {
                return Err(LambError::runtime_error(
                    RuntimeErrorKind::DivisionByZero,
                    None,
                    format!("Division by zero in 'div {} {}'", a, b),
                ));
            }
            a.checked_div(b)
        }
    };

    result.ok_or_else(|| {
        LambError::runtime_error(
            RuntimeErrorKind::IntegerOverflow,
            None,
            format!("Integer overflow in '{} {} {}'", op.name(), a, b),
        )
    })
}
