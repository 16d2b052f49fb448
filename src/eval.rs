use tracing::trace;

use crate::builtins;
use crate::env::Env;
use crate::value::{Lambda, Value};

/// Reduce an expression to a value.
///
/// Symbols resolve through the environment; S-Expressions reduce by
/// application; everything else is a constant and reduces to itself.
pub fn eval(env: &mut Env, v: Value) -> Value {
    match v {
        Value::Sym(name) => env
            .get(&name)
            .unwrap_or_else(|| Value::err(format!("Unbound Symbol '{}'!", name))),
        Value::Sexpr(children) => eval_sexpr(env, children),
        other => other,
    }
}

fn eval_sexpr(env: &mut Env, children: Vec<Value>) -> Value {
    // Children reduce left to right, unconditionally, before the error
    // scan: this fixes the argument evaluation order for builtins and
    // lambdas alike.
    let mut reduced: Vec<Value> = Vec::with_capacity(children.len());
    for child in children {
        reduced.push(eval(env, child));
    }

    // First error among the reduced children wins.
    if let Some(i) = reduced.iter().position(Value::is_err) {
        return reduced.swap_remove(i);
    }

    if reduced.is_empty() {
        return Value::Sexpr(reduced);
    }
    if reduced.len() == 1 {
        return reduced.remove(0);
    }

    let f = reduced.remove(0);
    if !f.is_callable() {
        return Value::err(format!(
            "S-Expression starts with incorrect type. Got {}, Expected Function.",
            f.type_name()
        ));
    }
    call(env, f, reduced)
}

/// Apply a function value to already-reduced arguments.
pub fn call(env: &mut Env, func: Value, args: Vec<Value>) -> Value {
    match func {
        Value::Builtin(b) => {
            trace!(builtin = b.name(), argc = args.len(), "calling builtin");
            builtins::dispatch(env, b, args)
        }
        Value::Lambda(l) => call_lambda(env, *l, args),
        other => Value::err(format!(
            "S-Expression starts with incorrect type. Got {}, Expected Function.",
            other.type_name()
        )),
    }
}

fn call_lambda(env: &mut Env, mut l: Lambda, mut args: Vec<Value>) -> Value {
    let given = args.len();
    let total = l.params.len();

    // Consume arguments left to right, binding them into the lambda's
    // own environment.
    while !args.is_empty() {
        if l.params.is_empty() {
            return Value::err(format!(
                "Function passed too many arguments. Got {}, Expected {}.",
                given, total
            ));
        }
        let sym = l.params.remove(0);
        if sym == "&" {
            // The formal after the marker collects all remaining
            // arguments, possibly zero of them.
            if l.params.len() != 1 {
                return Value::err(
                    "Function format invalid. Symbol '&' not followed by single symbol.",
                );
            }
            let rest = l.params.remove(0);
            l.locals.insert(rest, Value::Qexpr(std::mem::take(&mut args)));
            break;
        }
        l.locals.insert(sym, args.remove(0));
    }

    // Too few arguments to reach the marker: the trailing formal is
    // still bound, to the empty list.
    if l.params.first().map(String::as_str) == Some("&") {
        if l.params.len() != 2 {
            return Value::err(
                "Function format invalid. Symbol '&' not followed by single symbol.",
            );
        }
        l.params.remove(0);
        let rest = l.params.remove(0);
        l.locals.insert(rest, Value::Qexpr(Vec::new()));
    }

    if l.params.is_empty() {
        // Full application: the lambda's bindings become the innermost
        // scope, enclosed by the scopes live at the call site, and the
        // body runs as an S-Expression.
        trace!(depth = env.depth(), "applying lambda");
        env.push_frame(l.locals);
        let result = eval(env, Value::Sexpr(l.body));
        env.pop_frame();
        result
    } else {
        // Partial application: hand back the function carrying the
        // bindings made so far.
        trace!(remaining = l.params.len(), "partial application");
        Value::Lambda(Box::new(l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;
    use pretty_assertions::assert_eq;

    /// Evaluate every form in `src` in a fresh environment and return the
    /// last result.
    fn run(src: &str) -> Value {
        let mut env = Env::root();
        builtins::install(&mut env);
        let forms = Reader::new(src).read_all().expect("test source parses");
        let mut last = Value::unit();
        for form in forms {
            last = eval(&mut env, form);
        }
        last
    }

    #[test]
    fn constants_reduce_to_themselves() {
        assert_eq!(run("5"), Value::Num(5));
        assert_eq!(run("\"hi\""), Value::string("hi"));
        assert_eq!(run("{1 2 3}"), Value::Qexpr(vec![
            Value::Num(1),
            Value::Num(2),
            Value::Num(3),
        ]));
    }

    #[test]
    fn empty_sexpr_reduces_to_itself() {
        assert_eq!(run("()"), Value::unit());
    }

    #[test]
    fn singleton_sexpr_reduces_to_its_child() {
        assert_eq!(run("(5)"), Value::Num(5));
    }

    #[test]
    fn unbound_symbol_is_an_error() {
        assert_eq!(run("missing"), Value::err("Unbound Symbol 'missing'!"));
    }

    #[test]
    fn non_function_head_is_an_error() {
        assert_eq!(
            run("(1 2 3)"),
            Value::err("S-Expression starts with incorrect type. Got Number, Expected Function.")
        );
    }

    #[test]
    fn first_error_among_children_wins() {
        assert_eq!(run("(+ (error \"a\") (error \"b\"))"), Value::err("a"));
    }

    #[test]
    fn nested_arithmetic() {
        assert_eq!(run("(+ 1 (* 2 3) (- 10 4))"), Value::Num(13));
    }

    #[test]
    fn define_then_resolve() {
        assert_eq!(run("(def {x} 10) x"), Value::Num(10));
    }

    #[test]
    fn local_rebind_does_not_leak_out_of_the_call() {
        let src = "
            (def {x} 1)
            (def {poke} (\\ {ignored} {= {x} 99}))
            (poke 0)
            x";
        assert_eq!(run(src), Value::Num(1));
    }

    #[test]
    fn def_inside_a_lambda_reaches_the_root() {
        let src = "
            (def {install} (\\ {v} {def {g} v}))
            (install 42)
            g";
        assert_eq!(run(src), Value::Num(42));
    }

    #[test]
    fn currying_is_equivalent_to_full_application() {
        let src = "(def {add} (\\ {a b} {+ a b}))";
        assert_eq!(run(&format!("{src} ((add 1) 2)")), Value::Num(3));
        assert_eq!(run(&format!("{src} (add 1 2)")), Value::Num(3));
    }

    #[test]
    fn partial_application_returns_a_function() {
        let got = run("((\\ {a b} {+ a b}) 1)");
        assert!(got.is_callable(), "expected a function, got {:?}", got);
    }

    #[test]
    fn partial_application_does_not_mutate_the_binding() {
        let src = "
            (def {add} (\\ {a b} {+ a b}))
            (add 1)
            (add 10 20)";
        assert_eq!(run(src), Value::Num(30));
    }

    #[test]
    fn variadic_collection() {
        let src = "(def {f} (\\ {x & xs} {xs}))";
        assert_eq!(
            run(&format!("{src} (f 1 2 3)")),
            Value::Qexpr(vec![Value::Num(2), Value::Num(3)])
        );
        assert_eq!(run(&format!("{src} (f 1)")), Value::Qexpr(vec![]));
    }

    #[test]
    fn variadic_head_binding_still_positional() {
        assert_eq!(run("((\\ {x & xs} {x}) 1 2 3)"), Value::Num(1));
    }

    #[test]
    fn malformed_variadic_marker_is_a_format_error() {
        assert_eq!(
            run("((\\ {x &} {x}) 1 2)"),
            Value::err("Function format invalid. Symbol '&' not followed by single symbol.")
        );
    }

    #[test]
    fn too_many_arguments_is_an_arity_error() {
        assert_eq!(
            run("((\\ {a} {a}) 1 2)"),
            Value::err("Function passed too many arguments. Got 2, Expected 1.")
        );
    }

    #[test]
    fn lambda_body_sees_call_site_bindings() {
        // Deliberate language semantics: the body's enclosing scope is
        // the scope chain live at the call site.
        let src = "
            (def {show} (\\ {ignored} {y}))
            (def {outer} (\\ {y} {show 0}))
            (outer 7)";
        assert_eq!(run(src), Value::Num(7));
    }

    #[test]
    fn if_short_circuits_the_untaken_branch() {
        assert_eq!(run("(if 0 {error \"no\"} {+ 1 1})"), Value::Num(2));
        assert_eq!(run("(if 1 {+ 1 1} {error \"no\"})"), Value::Num(2));
    }

    #[test]
    fn structural_function_equality() {
        assert_eq!(run("(== (\\ {x} {x}) (\\ {x} {x}))"), Value::Num(1));
    }

    #[test]
    fn list_eval_round_trip() {
        assert_eq!(
            run("(eval (head {(+ 1 2)}))"),
            Value::Num(3)
        );
        assert_eq!(
            run("(eval (list + 1 2 3))"),
            Value::Num(6)
        );
    }
}
