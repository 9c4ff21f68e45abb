//! IR functions.

use crate::arena::Handle;
use crate::types::Type;
use crate::value::{Block, Value};

/// A lowered function.
///
/// Parameters pair the source-level name with the fetched-argument
/// value bound to it; the body is a single code node.
#[derive(Clone, Debug)]
pub struct Function {
    /// The overload-distinguishing internal name, e.g. `C@m@int`.
    pub name: String,
    /// Return type (`void` scalar for none).
    pub result: Handle<Type>,
    /// Ordered `(source name, fetched argument)` pairs.
    pub parameters: Vec<(String, Handle<Value>)>,
    /// The function body.
    pub body: Block,
}

impl Function {
    /// Creates an empty function with the given internal name and
    /// return type.
    pub fn new(name: impl Into<String>, result: Handle<Type>) -> Self {
        Self {
            name: name.into(),
            result,
            parameters: Vec::new(),
            body: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::types::{ScalarKind, TypeInner};

    #[test]
    fn new_function_is_empty() {
        let mut types = Arena::new();
        let void_ty = types.append(Type {
            name: None,
            inner: TypeInner::Scalar(ScalarKind::Void),
        });
        let f = Function::new("f@int", void_ty);
        assert_eq!(f.name, "f@int");
        assert!(f.parameters.is_empty());
        assert!(f.body.is_empty());
    }
}
