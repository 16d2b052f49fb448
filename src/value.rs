use rustc_hash::FxHashMap;

/// Identifier for a primitive operation. The full dispatch lives in
/// `builtins`; the identifier itself is part of the value model so that
/// function values stay `Copy`-cheap and compare by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    List,
    Head,
    Tail,
    Join,
    Eval,
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
    Def,
    Put,
    Lambda,
    If,
    Load,
    Print,
    Error,
}

impl Builtin {
    /// Every primitive, in registration order.
    pub const ALL: &'static [Builtin] = &[
        Builtin::List,
        Builtin::Head,
        Builtin::Tail,
        Builtin::Join,
        Builtin::Eval,
        Builtin::Add,
        Builtin::Sub,
        Builtin::Mul,
        Builtin::Div,
        Builtin::Gt,
        Builtin::Lt,
        Builtin::Ge,
        Builtin::Le,
        Builtin::Eq,
        Builtin::Ne,
        Builtin::Def,
        Builtin::Put,
        Builtin::Lambda,
        Builtin::If,
        Builtin::Load,
        Builtin::Print,
        Builtin::Error,
    ];

    /// The symbol this primitive is bound to in the global environment.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::List => "list",
            Builtin::Head => "head",
            Builtin::Tail => "tail",
            Builtin::Join => "join",
            Builtin::Eval => "eval",
            Builtin::Add => "+",
            Builtin::Sub => "-",
            Builtin::Mul => "*",
            Builtin::Div => "/",
            Builtin::Gt => ">",
            Builtin::Lt => "<",
            Builtin::Ge => ">=",
            Builtin::Le => "<=",
            Builtin::Eq => "==",
            Builtin::Ne => "!=",
            Builtin::Def => "def",
            Builtin::Put => "=",
            Builtin::Lambda => "\\",
            Builtin::If => "if",
            Builtin::Load => "load",
            Builtin::Print => "print",
            Builtin::Error => "error",
        }
    }
}

/// A user-defined function: the formals still waiting to be bound, the
/// body, and the bindings captured so far (from partial application).
///
/// Cloning a lambda deep-copies `locals` — two copies of a lambda never
/// share an environment.
#[derive(Debug, Clone)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Vec<Value>,
    pub locals: FxHashMap<String, Value>,
}

impl PartialEq for Lambda {
    /// Lambdas compare by formals and body, never by captured state.
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.body == other.body
    }
}

/// The fundamental lix value. Expressions and runtime results share this
/// one representation; S/Q-Expressions own their children exclusively.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(i64),
    Err(String),
    Sym(String),
    Str(String),
    Sexpr(Vec<Value>),
    Qexpr(Vec<Value>),
    Builtin(Builtin),
    Lambda(Box<Lambda>),
}

impl Value {
    /// Construct an error value.
    pub fn err(msg: impl Into<String>) -> Value {
        Value::Err(msg.into())
    }

    /// Construct a symbol value.
    pub fn sym(name: impl Into<String>) -> Value {
        Value::Sym(name.into())
    }

    /// Construct a string value.
    pub fn string(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    /// Construct a lambda with no captured bindings yet.
    pub fn lambda(params: Vec<String>, body: Vec<Value>) -> Value {
        Value::Lambda(Box::new(Lambda {
            params,
            body,
            locals: FxHashMap::default(),
        }))
    }

    /// The empty S-Expression — what side-effecting builtins return.
    pub fn unit() -> Value {
        Value::Sexpr(Vec::new())
    }

    pub fn is_err(&self) -> bool {
        matches!(self, Value::Err(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Builtin(_) | Value::Lambda(_))
    }

    /// User-facing type name, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "Number",
            Value::Err(_) => "Error",
            Value::Sym(_) => "Symbol",
            Value::Str(_) => "String",
            Value::Sexpr(_) => "S-Expression",
            Value::Qexpr(_) => "Q-Expression",
            Value::Builtin(_) | Value::Lambda(_) => "Function",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn structural_equality() {
        let a = Value::Qexpr(vec![Value::Num(1), Value::sym("x")]);
        let b = Value::Qexpr(vec![Value::Num(1), Value::sym("x")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::Sexpr(vec![Value::Num(1), Value::sym("x")]));
    }

    #[test]
    fn builtins_compare_by_identity() {
        assert_eq!(Value::Builtin(Builtin::Add), Value::Builtin(Builtin::Add));
        assert_ne!(Value::Builtin(Builtin::Add), Value::Builtin(Builtin::Mul));
    }

    #[test]
    fn lambdas_compare_by_formals_and_body_only() {
        let a = Value::lambda(vec!["x".into()], vec![Value::sym("x")]);
        let mut b = Value::lambda(vec!["x".into()], vec![Value::sym("x")]);
        if let Value::Lambda(l) = &mut b {
            l.locals.insert("y".into(), Value::Num(7));
        }
        assert_eq!(a, b);
        assert_ne!(a, Value::lambda(vec!["z".into()], vec![Value::sym("x")]));
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let original = Value::lambda(vec!["x".into()], vec![Value::sym("x")]);
        let mut copy = original.clone();
        if let Value::Lambda(l) = &mut copy {
            l.locals.insert("x".into(), Value::Num(1));
            l.params.clear();
        }
        if let Value::Lambda(l) = &original {
            assert!(l.locals.is_empty());
            assert_eq!(l.params, vec!["x".to_string()]);
        } else {
            panic!("expected a lambda");
        }
    }

    #[test]
    fn every_builtin_has_a_distinct_name() {
        let mut names: Vec<&str> = Builtin::ALL.iter().map(|b| b.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Builtin::ALL.len());
    }
}
