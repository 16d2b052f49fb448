use rustc_hash::FxHashMap;

use crate::value::Value;

/// One scope's worth of bindings.
pub type Frame = FxHashMap<String, Value>;

/// The environment: a stack of binding frames, outermost first.
///
/// Frame 0 is the root/global scope and lives for the whole process. A new
/// frame is pushed for each lambda application and popped when the call
/// returns; at any moment the live stack is exactly the parent chain the
/// language sees, with the call site's scopes enclosing the callee's
/// locals. Bindings outlive a call only inside a lambda value returned by
/// partial application.
#[derive(Debug)]
pub struct Env {
    frames: Vec<Frame>,
}

impl Env {
    /// Create an environment containing only an empty root scope.
    pub fn root() -> Env {
        Env {
            frames: vec![Frame::default()],
        }
    }

    /// Look up `name`, innermost scope first. Returns a copy of the bound
    /// value; the caller surfaces a miss as an unbound-symbol error.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .cloned()
    }

    /// Bind `name` in the root scope, regardless of current depth.
    /// This is what the `def` builtin does: always a global binding.
    pub fn define(&mut self, name: impl Into<String>, val: Value) {
        self.frames[0].insert(name.into(), val);
    }

    /// Bind `name` in the innermost scope, shadowing any outer binding.
    /// This is what the `=` builtin and parameter binding do.
    pub fn put(&mut self, name: impl Into<String>, val: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), val);
        }
    }

    /// Enter a lambda call: its locals become the innermost scope.
    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Leave a lambda call, discarding its locals.
    pub fn pop_frame(&mut self) {
        // The root frame is never popped.
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Current nesting depth, root scope included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn get_walks_outward() {
        let mut env = Env::root();
        env.put("x", Value::Num(1));
        env.push_frame(Frame::default());
        assert_eq!(env.get("x"), Some(Value::Num(1)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn put_shadows_without_clobbering() {
        let mut env = Env::root();
        env.put("x", Value::Num(1));
        env.push_frame(Frame::default());
        env.put("x", Value::Num(2));
        assert_eq!(env.get("x"), Some(Value::Num(2)));
        env.pop_frame();
        assert_eq!(env.get("x"), Some(Value::Num(1)));
    }

    #[test]
    fn define_reaches_the_root_from_any_depth() {
        let mut env = Env::root();
        env.push_frame(Frame::default());
        env.push_frame(Frame::default());
        env.define("g", Value::Num(10));
        env.pop_frame();
        env.pop_frame();
        assert_eq!(env.get("g"), Some(Value::Num(10)));
    }

    #[test]
    fn root_frame_is_never_popped() {
        let mut env = Env::root();
        env.put("x", Value::Num(1));
        env.pop_frame();
        env.pop_frame();
        assert_eq!(env.depth(), 1);
        assert_eq!(env.get("x"), Some(Value::Num(1)));
    }
}
