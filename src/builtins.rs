use std::fs;

use crate::env::Env;
use crate::eval;
use crate::printer;
use crate::reader::Reader;
use crate::value::{Builtin, Value};

/// Bind every primitive in the root scope of `env`.
pub fn install(env: &mut Env) {
    for &b in Builtin::ALL {
        env.define(b.name(), Value::Builtin(b));
    }
}

/// Invoke a primitive with the already-reduced argument list.
/// Every primitive validates argument count and type before acting and
/// reports violations as error values.
pub fn dispatch(env: &mut Env, b: Builtin, args: Vec<Value>) -> Value {
    match b {
        Builtin::List => builtin_list(args),
        Builtin::Head => builtin_head(args),
        Builtin::Tail => builtin_tail(args),
        Builtin::Join => builtin_join(args),
        Builtin::Eval => builtin_eval(env, args),
        Builtin::Add | Builtin::Sub | Builtin::Mul | Builtin::Div => builtin_op(args, b),
        Builtin::Gt | Builtin::Lt | Builtin::Ge | Builtin::Le => builtin_ord(args, b),
        Builtin::Eq | Builtin::Ne => builtin_cmp(args, b),
        Builtin::Def | Builtin::Put => builtin_var(env, args, b),
        Builtin::Lambda => builtin_lambda(args),
        Builtin::If => builtin_if(env, args),
        Builtin::Load => builtin_load(env, args),
        Builtin::Print => builtin_print(args),
        Builtin::Error => builtin_error(args),
    }
}

fn arity_err(name: &str, got: usize, want: usize) -> Value {
    Value::err(format!(
        "Function '{}' passed incorrect number of arguments. Got {}, Expected {}.",
        name, got, want
    ))
}

fn type_err(name: &str, idx: usize, got: &Value, want: &str) -> Value {
    Value::err(format!(
        "Function '{}' passed incorrect type for argument {}. Got {}, Expected {}.",
        name, idx, got.type_name(), want
    ))
}

/// Extraction doubles as the type check: `Err` carries the offending value
/// back so the caller can name it in the diagnostic.
fn take_qexpr(v: Value) -> Result<Vec<Value>, Value> {
    match v {
        Value::Qexpr(items) => Ok(items),
        other => Err(other),
    }
}

/// (list a b c ...) — retype the argument list as a Q-Expression.
fn builtin_list(args: Vec<Value>) -> Value {
    Value::Qexpr(args)
}

/// (head q) — Q-Expression containing only the first element of q.
fn builtin_head(args: Vec<Value>) -> Value {
    let [list]: [Value; 1] = match args.try_into() {
        Ok(a) => a,
        Err(args) => return arity_err("head", args.len(), 1),
    };
    let mut items = match take_qexpr(list) {
        Ok(items) => items,
        Err(other) => return type_err("head", 0, &other, "Q-Expression"),
    };
    if items.is_empty() {
        return Value::err("Function 'head' passed {} for argument 0.");
    }
    items.truncate(1);
    Value::Qexpr(items)
}

/// (tail q) — q without its first element.
fn builtin_tail(args: Vec<Value>) -> Value {
    let [list]: [Value; 1] = match args.try_into() {
        Ok(a) => a,
        Err(args) => return arity_err("tail", args.len(), 1),
    };
    let mut items = match take_qexpr(list) {
        Ok(items) => items,
        Err(other) => return type_err("tail", 0, &other, "Q-Expression"),
    };
    if items.is_empty() {
        return Value::err("Function 'tail' passed {} for argument 0.");
    }
    items.remove(0);
    Value::Qexpr(items)
}

/// (join q1 q2 ...) — concatenate Q-Expressions, preserving order.
fn builtin_join(args: Vec<Value>) -> Value {
    let mut out = Vec::new();
    for (i, a) in args.into_iter().enumerate() {
        match take_qexpr(a) {
            Ok(mut items) => out.append(&mut items),
            Err(other) => return type_err("join", i, &other, "Q-Expression"),
        }
    }
    Value::Qexpr(out)
}

/// (eval q) — retype a Q-Expression as an S-Expression and reduce it.
fn builtin_eval(env: &mut Env, args: Vec<Value>) -> Value {
    let [arg]: [Value; 1] = match args.try_into() {
        Ok(a) => a,
        Err(args) => return arity_err("eval", args.len(), 1),
    };
    match take_qexpr(arg) {
        Ok(items) => eval::eval(env, Value::Sexpr(items)),
        Err(other) => type_err("eval", 0, &other, "Q-Expression"),
    }
}

/// Arithmetic: fold the arguments left to right starting from the first.
/// One argument to `-` negates it. Division by zero aborts the fold.
fn builtin_op(args: Vec<Value>, op: Builtin) -> Value {
    let name = op.name();
    let mut nums = Vec::with_capacity(args.len());
    for (i, a) in args.iter().enumerate() {
        match a {
            Value::Num(n) => nums.push(*n),
            other => return type_err(name, i, other, "Number"),
        }
    }
    let Some((&first, rest)) = nums.split_first() else {
        return Value::err(format!(
            "Function '{}' passed incorrect number of arguments. Got 0, Expected at least 1.",
            name
        ));
    };
    if op == Builtin::Sub && rest.is_empty() {
        return Value::Num(first.wrapping_neg());
    }
    let mut x = first;
    for &y in rest {
        x = match op {
            Builtin::Add => x.wrapping_add(y),
            Builtin::Sub => x.wrapping_sub(y),
            Builtin::Mul => x.wrapping_mul(y),
            // dispatch routes only the four arithmetic ops here
            _ => {
                if y == 0 {
                    return Value::err("Division by zero!");
                }
                x.wrapping_div(y)
            }
        };
    }
    Value::Num(x)
}

/// Ordering on two numbers; true is 1, false is 0.
fn builtin_ord(args: Vec<Value>, op: Builtin) -> Value {
    let name = op.name();
    if args.len() != 2 {
        return arity_err(name, args.len(), 2);
    }
    let mut nums = [0i64; 2];
    for i in 0..2 {
        match &args[i] {
            Value::Num(n) => nums[i] = *n,
            other => return type_err(name, i, other, "Number"),
        }
    }
    let r = match op {
        Builtin::Gt => nums[0] > nums[1],
        Builtin::Lt => nums[0] < nums[1],
        Builtin::Ge => nums[0] >= nums[1],
        // dispatch routes only the four ordering ops here
        _ => nums[0] <= nums[1],
    };
    Value::Num(r as i64)
}

/// (== a b) / (!= a b) — structural equality over any two values.
fn builtin_cmp(args: Vec<Value>, op: Builtin) -> Value {
    if args.len() != 2 {
        return arity_err(op.name(), args.len(), 2);
    }
    let eq = args[0] == args[1];
    let r = if op == Builtin::Eq { eq } else { !eq };
    Value::Num(r as i64)
}

/// (def {names} v1 v2 ...) binds in the root scope;
/// (= {names} v1 v2 ...) binds in the innermost scope.
fn builtin_var(env: &mut Env, mut args: Vec<Value>, op: Builtin) -> Value {
    let name = op.name();
    if args.is_empty() {
        return Value::err(format!(
            "Function '{}' passed incorrect number of arguments. Got 0, Expected at least 1.",
            name
        ));
    }
    let syms = match take_qexpr(args.remove(0)) {
        Ok(items) => items,
        Err(other) => return type_err(name, 0, &other, "Q-Expression"),
    };
    let mut names = Vec::with_capacity(syms.len());
    for s in &syms {
        match s {
            Value::Sym(n) => names.push(n.clone()),
            other => {
                return Value::err(format!(
                    "Function '{}' cannot define non-symbol. Got {}, Expected Symbol.",
                    name,
                    other.type_name()
                ))
            }
        }
    }
    if names.len() != args.len() {
        return Value::err(format!(
            "Function {} passed too many arguments for symbols. Got {}, Expected {}.",
            name,
            names.len(),
            args.len()
        ));
    }
    for (n, v) in names.into_iter().zip(args) {
        if op == Builtin::Def {
            env.define(n, v);
        } else {
            env.put(n, v);
        }
    }
    Value::unit()
}

/// (\ {formals} {body}) — construct a lambda. Formals must all be symbols.
fn builtin_lambda(args: Vec<Value>) -> Value {
    let [formals, body]: [Value; 2] = match args.try_into() {
        Ok(a) => a,
        Err(args) => return arity_err("\\", args.len(), 2),
    };
    let formals = match take_qexpr(formals) {
        Ok(items) => items,
        Err(other) => return type_err("\\", 0, &other, "Q-Expression"),
    };
    let body = match take_qexpr(body) {
        Ok(items) => items,
        Err(other) => return type_err("\\", 1, &other, "Q-Expression"),
    };
    let mut params = Vec::with_capacity(formals.len());
    for f in formals {
        match f {
            Value::Sym(n) => params.push(n),
            other => {
                return Value::err(format!(
                    "Cannot define non-symbol. Got {}, Expected Symbol.",
                    other.type_name()
                ))
            }
        }
    }
    Value::lambda(params, body)
}

/// (if c {then} {else}) — evaluate exactly one branch, chosen by the
/// number c. Both branches are type-checked before either runs.
fn builtin_if(env: &mut Env, args: Vec<Value>) -> Value {
    let [cond, conseq, alt]: [Value; 3] = match args.try_into() {
        Ok(a) => a,
        Err(args) => return arity_err("if", args.len(), 3),
    };
    let cond = match cond {
        Value::Num(n) => n,
        other => return type_err("if", 0, &other, "Number"),
    };
    let conseq = match take_qexpr(conseq) {
        Ok(items) => items,
        Err(other) => return type_err("if", 1, &other, "Q-Expression"),
    };
    let alt = match take_qexpr(alt) {
        Ok(items) => items,
        Err(other) => return type_err("if", 2, &other, "Q-Expression"),
    };
    let branch = if cond != 0 { conseq } else { alt };
    eval::eval(env, Value::Sexpr(branch))
}

/// (load "path") — read a source file and evaluate each top-level form in
/// the caller's environment. Per-form errors are printed, not returned, so
/// one bad form does not stop the rest of the file.
fn builtin_load(env: &mut Env, args: Vec<Value>) -> Value {
    let [arg]: [Value; 1] = match args.try_into() {
        Ok(a) => a,
        Err(args) => return arity_err("load", args.len(), 1),
    };
    let path = match arg {
        Value::Str(s) => s,
        other => return type_err("load", 0, &other, "String"),
    };
    let source = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(_) => return Value::err(format!("Could not load library {}", path)),
    };

    let mut reader = Reader::new(&source);
    loop {
        match reader.read() {
            Ok(Some(form)) => {
                let result = eval::eval(env, form);
                if result.is_err() {
                    printer::println(&result);
                }
            }
            Ok(None) => break,
            Err(e) => {
                // A parse failure is printed, never evaluated.
                println!("{}", e);
                break;
            }
        }
    }
    Value::unit()
}

/// (print a b ...) — render each argument, space-separated, then newline.
fn builtin_print(args: Vec<Value>) -> Value {
    let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    println!("{}", rendered.join(" "));
    Value::unit()
}

/// (error "msg") — raise a user error carrying the given message.
fn builtin_error(args: Vec<Value>) -> Value {
    let [arg]: [Value; 1] = match args.try_into() {
        Ok(a) => a,
        Err(args) => return arity_err("error", args.len(), 1),
    };
    match arg {
        Value::Str(msg) => Value::Err(msg),
        other => type_err("error", 0, &other, "String"),
    }
}
