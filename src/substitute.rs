use crate::ast::Expr;

/// Replaces every free occurrence of `name` in `expr` with a fresh copy of
/// `replacement`. A nested function whose parameter is `name` rebinds it,
/// so substitution stops at that function.
pub fn substitute(expr: Expr, name: &str, replacement: &Expr) -> Expr {
    match expr {
        Expr::Name { name: found, span } => {
            if found == name {
                replacement.clone()
            } else {
                Expr::Name { name: found, span }
            }
        }
        Expr::Integer(_) => expr,
        Expr::Assign { target, value } => Expr::Assign {
            target,
            value: Box::new(substitute(*value, name, replacement)),
        },
        Expr::Function { param, body } => {
            let body = if param == name {
                *body
            } else {
                substitute(*body, name, replacement)
            };
            Expr::Function {
                param,
                body: Box::new(body),
            }
        }
        Expr::Env(record) => {
            Expr::Env(record.map_values(|value| substitute(value, name, replacement)))
        }
        Expr::Apply { left, right } => Expr::Apply {
            left: Box::new(substitute(*left, name, replacement)),
            right: Box::new(substitute(*right, name, replacement)),
        },
        Expr::Predefined(builtin) => {
            Expr::Predefined(builtin.map_args(|arg| substitute(arg, name, replacement)))
        }
    }
}
