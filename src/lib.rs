//! lix — a tiny dynamically-typed Lisp with Q-Expressions.
//!
//! The language has one runtime datum, [`value::Value`]: numbers, errors,
//! symbols, strings, S-Expressions (evaluable lists), Q-Expressions
//! (quoted lists), and functions (builtin or lambda). Errors are ordinary
//! values that propagate "first error wins" through each reduction; they
//! never unwind the host.
//!
//! Evaluation ([`eval::eval`]) is plain recursion over the expression
//! tree, so nesting depth and user-level recursion are bounded by the
//! native call stack — there is no tail-call optimization. Deeply
//! recursive lix programs exhaust the stack; treat that as the
//! interpreter's resource limit.

pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod printer;
pub mod reader;
pub mod value;
