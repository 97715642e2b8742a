use crate::error::Span;
use std::convert::Infallible;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A top-level `;`-terminated unit. `expr` is either an `Expr::Assign` or a
/// bare expression.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub expr: Expr,
    pub span: Span,
}

/// Expression tree. `Clone` is a full structural copy: every child is owned,
/// so a cloned subtree never aliases the original.
#[derive(Debug, Clone)]
pub enum Expr {
    Name {
        name: String,
        span: Span,
    },
    Integer(i64),
    /// Statement-level binding `target = value`.
    Assign {
        target: String,
        value: Box<Expr>,
    },
    /// Single-parameter function; `λ(a, b): e` is parsed as `λ(a): λ(b): e`.
    Function {
        param: String,
        body: Box<Expr>,
    },
    /// Record literal `[a = 1, b = 2]`, an environment as a value.
    Env(Record),
    Apply {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Predefined(Builtin),
}

impl Expr {
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name {
            name: name.into(),
            span: Span::default(),
        }
    }

    pub fn function(param: impl Into<String>, body: Expr) -> Self {
        Expr::Function {
            param: param.into(),
            body: Box::new(body),
        }
    }

    pub fn apply(left: Expr, right: Expr) -> Self {
        Expr::Apply {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Name { .. } => "name",
            Expr::Integer(_) => "integer",
            Expr::Assign { .. } => "assignment",
            Expr::Function { .. } => "function",
            Expr::Env(_) => "record",
            Expr::Apply { .. } => "application",
            Expr::Predefined(_) => "builtin",
        }
    }
}

/// Ordered name-to-expression mapping. Inserting an existing name
/// overwrites it in place.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, Expr)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, value: Expr) {
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn map_values(self, mut f: impl FnMut(Expr) -> Expr) -> Self {
        Self {
            fields: self
                .fields
                .into_iter()
                .map(|(name, value)| (name, f(value)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Minus,
    Mult,
    Div,
}

impl ArithOp {
    pub fn name(&self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Minus => "minus",
            ArithOp::Mult => "mult",
            ArithOp::Div => "div",
        }
    }
}

/// Operands accumulated by an arithmetic builtin.
#[derive(Debug, Clone)]
pub enum Operands {
    Empty,
    One(Box<Expr>),
    Two(Box<Expr>, Box<Expr>),
}

/// Arguments accumulated by `cond`: condition, then-branch, else-branch.
#[derive(Debug, Clone)]
pub enum CondArgs {
    Empty,
    One(Box<Expr>),
    Two(Box<Expr>, Box<Expr>),
    Three(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// A predefined operator together with the arguments applied to it so far.
/// The argument slots are sized by the operator, so a builtin can never
/// hold more arguments than its capacity.
#[derive(Debug, Clone)]
pub enum Builtin {
    Arith(ArithOp, Operands),
    Cond(CondArgs),
}

pub const BUILTIN_NAMES: [&str; 5] = ["add", "minus", "mult", "div", "cond"];

impl Builtin {
    /// A fresh, argument-less builtin for one of [`BUILTIN_NAMES`].
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "add" => ArithOp::Add,
            "minus" => ArithOp::Minus,
            "mult" => ArithOp::Mult,
            "div" => ArithOp::Div,
            "cond" => return Some(Builtin::Cond(CondArgs::Empty)),
            _ => return None,
        };
        Some(Builtin::Arith(op, Operands::Empty))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Arith(op, _) => op.name(),
            Builtin::Cond(_) => "cond",
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            Builtin::Arith(..) => 2,
            Builtin::Cond(_) => 3,
        }
    }

    pub fn args(&self) -> Vec<&Expr> {
        match self {
            Builtin::Arith(_, Operands::Empty) | Builtin::Cond(CondArgs::Empty) => vec![],
            Builtin::Arith(_, Operands::One(a)) | Builtin::Cond(CondArgs::One(a)) => vec![&**a],
            Builtin::Arith(_, Operands::Two(a, b)) | Builtin::Cond(CondArgs::Two(a, b)) => {
                vec![&**a, &**b]
            }
            Builtin::Cond(CondArgs::Three(a, b, c)) => vec![&**a, &**b, &**c],
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.args().len() == self.capacity()
    }

    /// Appends `arg` as the next argument. A saturated builtin hands both
    /// itself and the argument back unchanged.
    pub fn accept(self, arg: Expr) -> Result<Builtin, (Builtin, Expr)> {
        let arg = Box::new(arg);
        match self {
            Builtin::Arith(op, Operands::Empty) => Ok(Builtin::Arith(op, Operands::One(arg))),
            Builtin::Arith(op, Operands::One(a)) => Ok(Builtin::Arith(op, Operands::Two(a, arg))),
            Builtin::Cond(CondArgs::Empty) => Ok(Builtin::Cond(CondArgs::One(arg))),
            Builtin::Cond(CondArgs::One(a)) => Ok(Builtin::Cond(CondArgs::Two(a, arg))),
            Builtin::Cond(CondArgs::Two(a, b)) => Ok(Builtin::Cond(CondArgs::Three(a, b, arg))),
            saturated => Err((saturated, *arg)),
        }
    }

    /// Rebuilds the builtin with every argument passed through `f`, in
    /// argument order, stopping at the first error.
    pub fn try_map_args<E>(
        self,
        mut f: impl FnMut(Expr) -> Result<Expr, E>,
    ) -> Result<Builtin, E> {
        let mut g = |arg: Box<Expr>| f(*arg).map(Box::new);
        Ok(match self {
            Builtin::Arith(op, Operands::Empty) => Builtin::Arith(op, Operands::Empty),
            Builtin::Arith(op, Operands::One(a)) => Builtin::Arith(op, Operands::One(g(a)?)),
            Builtin::Arith(op, Operands::Two(a, b)) => {
                let a = g(a)?;
                Builtin::Arith(op, Operands::Two(a, g(b)?))
            }
            Builtin::Cond(CondArgs::Empty) => Builtin::Cond(CondArgs::Empty),
            Builtin::Cond(CondArgs::One(a)) => Builtin::Cond(CondArgs::One(g(a)?)),
            Builtin::Cond(CondArgs::Two(a, b)) => {
                let a = g(a)?;
                Builtin::Cond(CondArgs::Two(a, g(b)?))
            }
            Builtin::Cond(CondArgs::Three(a, b, c)) => {
                let a = g(a)?;
                let b = g(b)?;
                Builtin::Cond(CondArgs::Three(a, b, g(c)?))
            }
        })
    }

    pub fn map_args(self, mut f: impl FnMut(Expr) -> Expr) -> Builtin {
        match self.try_map_args(|arg| Ok::<_, Infallible>(f(arg))) {
            Ok(builtin) => builtin,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Name { name, .. } => write!(f, "{}", name),
            Expr::Integer(value) => write!(f, "{}", value),
            Expr::Assign { target, value } => write!(f, "{} = {}", target, value),
            Expr::Function { param, body } => write!(f, "λ({}): {}", param, body),
            Expr::Env(record) => write!(f, "{}", record),
            Expr::Apply { left, right } => write!(f, "({} {})", left, right),
            Expr::Predefined(builtin) => write!(f, "{}", builtin),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let args = self.args();
        if args.is_empty() {
            return write!(f, "{}", self.name());
        }
        write!(f, "({} ", self.name())?;
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}
