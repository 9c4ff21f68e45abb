//! Scoped name-to-operand bindings.

use std::collections::HashMap;

use glaze_ir::{Handle, Value};

/// A stack of lexical scopes mapping names to IR values.
///
/// Insertions land in the top frame and may shadow enclosing frames;
/// lookups walk from the top frame outward. A miss is reported as
/// `None`, never as an error; the caller decides what it means.
#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    frames: Vec<HashMap<String, Handle<Value>>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new innermost scope.
    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Closes the innermost scope. Every push must be matched by
    /// exactly one pop on every exit path.
    pub fn pop(&mut self) {
        self.frames.pop().expect("scope stack underflow");
    }

    /// Binds `name` in the innermost scope.
    pub fn insert(&mut self, name: &str, value: Handle<Value>) {
        self.frames
            .last_mut()
            .expect("no open scope to bind into")
            .insert(name.to_string(), value);
    }

    /// Resolves `name` against the scope chain, innermost first.
    pub fn lookup(&self, name: &str) -> Option<Handle<Value>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glaze_ir::{Arena, ConstValue, ScalarKind, Type, TypeInner, ValueKind};

    fn value(values: &mut Arena<Value>, types: &mut Arena<Type>, n: i32) -> Handle<Value> {
        let ty = types.append(Type {
            name: None,
            inner: TypeInner::Scalar(ScalarKind::Int),
        });
        values.append(Value::new(ty, ValueKind::Constant(ConstValue::Int(n))))
    }

    #[test]
    fn lookup_walks_outward() {
        let mut types = Arena::new();
        let mut values = Arena::new();
        let outer = value(&mut values, &mut types, 1);
        let inner = value(&mut values, &mut types, 2);

        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.insert("x", outer);
        scopes.push();
        assert_eq!(scopes.lookup("x"), Some(outer));
        scopes.insert("x", inner);
        assert_eq!(scopes.lookup("x"), Some(inner));
        scopes.pop();
        assert_eq!(scopes.lookup("x"), Some(outer));
        scopes.pop();
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn miss_is_none() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        assert_eq!(scopes.lookup("missing"), None);
        scopes.pop();
    }

    #[test]
    #[should_panic(expected = "scope stack underflow")]
    fn unbalanced_pop_panics() {
        let mut scopes = ScopeStack::new();
        scopes.pop();
    }
}
