//! Constant pool: canonicalizes literals to unique value handles.

use std::collections::HashMap;

use crate::arena::{Arena, Handle};
use crate::types::Type;
use crate::value::{ConstValue, Value, ValueKind};

/// Hashable canonicalization key: tag plus bit pattern. Floats compare
/// by representation, so `0.0` and `-0.0` are distinct pool entries.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
enum ConstKey {
    Bool(bool),
    Int(i32),
    Uint(u32),
    Float(u32),
}

impl ConstKey {
    fn of(value: ConstValue) -> Self {
        match value {
            ConstValue::Bool(v) => Self::Bool(v),
            ConstValue::Int(v) => Self::Int(v),
            ConstValue::Uint(v) => Self::Uint(v),
            ConstValue::Float(v) => Self::Float(v.to_bits()),
        }
    }
}

/// Canonicalizes literal constants so that repeated uses of the same
/// literal share one operand identity.
#[derive(Clone, Debug, Default)]
pub struct ConstantPool {
    interned: HashMap<ConstKey, Handle<Value>>,
}

impl ConstantPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pooled handle for `value`, creating it in `values`
    /// on first use. `ty` is only consulted when the constant is new.
    pub fn intern(
        &mut self,
        values: &mut Arena<Value>,
        value: ConstValue,
        ty: Handle<Type>,
    ) -> Handle<Value> {
        *self
            .interned
            .entry(ConstKey::of(value))
            .or_insert_with(|| values.append(Value::new(ty, ValueKind::Constant(value))))
    }

    /// Number of distinct constants interned so far.
    pub fn len(&self) -> usize {
        self.interned.len()
    }

    /// Returns `true` if no constant has been interned.
    pub fn is_empty(&self) -> bool {
        self.interned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScalarKind, TypeInner};

    fn setup() -> (Arena<Value>, Arena<Type>, Handle<Type>, Handle<Type>) {
        let mut types = Arena::new();
        let int_ty = types.append(Type {
            name: None,
            inner: TypeInner::Scalar(ScalarKind::Int),
        });
        let float_ty = types.append(Type {
            name: None,
            inner: TypeInner::Scalar(ScalarKind::Float),
        });
        (Arena::new(), types, int_ty, float_ty)
    }

    #[test]
    fn same_literal_same_identity() {
        let (mut values, _types, int_ty, _) = setup();
        let mut pool = ConstantPool::new();
        let a = pool.intern(&mut values, ConstValue::Int(42), int_ty);
        let b = pool.intern(&mut values, ConstValue::Int(42), int_ty);
        assert_eq!(a, b);
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn tags_do_not_collide() {
        let (mut values, _types, int_ty, _) = setup();
        let mut pool = ConstantPool::new();
        let signed = pool.intern(&mut values, ConstValue::Int(1), int_ty);
        let unsigned = pool.intern(&mut values, ConstValue::Uint(1), int_ty);
        let truthy = pool.intern(&mut values, ConstValue::Bool(true), int_ty);
        assert_ne!(signed, unsigned);
        assert_ne!(signed, truthy);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn floats_compare_by_bits() {
        let (mut values, _types, _, float_ty) = setup();
        let mut pool = ConstantPool::new();
        let pos = pool.intern(&mut values, ConstValue::Float(0.0), float_ty);
        let neg = pool.intern(&mut values, ConstValue::Float(-0.0), float_ty);
        let pos2 = pool.intern(&mut values, ConstValue::Float(0.0), float_ty);
        assert_ne!(pos, neg);
        assert_eq!(pos, pos2);
    }
}
