//! Type system for the Glaze IR.

use crate::arena::Handle;

/// The tag of a basic scalar type.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ScalarKind {
    /// No value.
    Void,
    /// Boolean.
    Bool,
    /// Signed 32-bit integer.
    Int,
    /// Unsigned 32-bit integer.
    Uint,
    /// Half-precision floating point.
    Half,
    /// Single-precision floating point.
    Float,
    /// Double-precision floating point.
    Double,
}

/// The base dimensionality of a texture type.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum TextureShape {
    Dim1,
    Dim2,
    Dim3,
    Cube,
}

/// What a pointer-like type points through.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum PointerKind {
    /// A uniform constant buffer.
    ConstantBuffer,
    /// A read-only structured buffer.
    StructuredBuffer,
    /// A read-write structured buffer.
    RwStructuredBuffer,
}

/// Size of an array type.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ArraySize {
    /// Fixed element count.
    Constant(u32),
    /// Unsized (runtime-determined) array.
    Dynamic,
}

/// A member of a struct type.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct StructMember {
    pub name: String,
    pub ty: Handle<Type>,
}

/// A type descriptor.
///
/// Struct types are named; identity is nominal: two structs with the
/// same field list but different declarations get distinct handles, and
/// the lowerer's declaration cache guarantees one handle per declaration.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Type {
    pub name: Option<String>,
    pub inner: TypeInner,
}

/// The concrete shape of a type.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum TypeInner {
    /// A single scalar value.
    Scalar(ScalarKind),
    /// A vector of scalars.
    Vector { scalar: ScalarKind, size: u32 },
    /// A matrix of scalars.
    Matrix {
        scalar: ScalarKind,
        rows: u32,
        cols: u32,
    },
    /// A texture over an element type.
    Texture {
        base: Handle<Type>,
        shape: TextureShape,
        multisampled: bool,
        arrayed: bool,
        shadow: bool,
    },
    /// A texture sampler.
    Sampler { comparison: bool },
    /// A buffer viewed through a pointer-like binding.
    Pointer {
        kind: PointerKind,
        base: Handle<Type>,
    },
    /// A fixed-size or unsized array.
    Array { base: Handle<Type>, size: ArraySize },
    /// An aggregate with ordered named fields.
    Struct { members: Vec<StructMember> },
}

/// Classification of a type as a pipeline-bindable resource.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BindableResource {
    Texture,
    Sampler,
    Buffer,
    StorageBuffer,
}

impl TypeInner {
    /// Returns the binding class of this type, or `None` for plain data
    /// types that live in registers or buffers rather than binding slots.
    pub fn bindable_resource(&self) -> Option<BindableResource> {
        match *self {
            Self::Texture { .. } => Some(BindableResource::Texture),
            Self::Sampler { .. } => Some(BindableResource::Sampler),
            Self::Pointer { kind, .. } => Some(match kind {
                PointerKind::ConstantBuffer => BindableResource::Buffer,
                PointerKind::StructuredBuffer | PointerKind::RwStructuredBuffer => {
                    BindableResource::StorageBuffer
                }
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn bindable_classification() {
        let mut types = Arena::new();
        let f32_ty = types.append(Type {
            name: None,
            inner: TypeInner::Scalar(ScalarKind::Float),
        });

        let texture = TypeInner::Texture {
            base: f32_ty,
            shape: TextureShape::Dim2,
            multisampled: false,
            arrayed: false,
            shadow: false,
        };
        assert_eq!(texture.bindable_resource(), Some(BindableResource::Texture));

        let sampler = TypeInner::Sampler { comparison: true };
        assert_eq!(sampler.bindable_resource(), Some(BindableResource::Sampler));

        let cbuffer = TypeInner::Pointer {
            kind: PointerKind::ConstantBuffer,
            base: f32_ty,
        };
        assert_eq!(cbuffer.bindable_resource(), Some(BindableResource::Buffer));

        let sbuffer = TypeInner::Pointer {
            kind: PointerKind::RwStructuredBuffer,
            base: f32_ty,
        };
        assert_eq!(
            sbuffer.bindable_resource(),
            Some(BindableResource::StorageBuffer)
        );
    }

    #[test]
    fn plain_data_is_not_bindable() {
        assert_eq!(TypeInner::Scalar(ScalarKind::Int).bindable_resource(), None);
        assert_eq!(
            TypeInner::Vector {
                scalar: ScalarKind::Float,
                size: 4
            }
            .bindable_resource(),
            None
        );

        let mut types = Arena::new();
        let float_ty = types.append(Type {
            name: None,
            inner: TypeInner::Scalar(ScalarKind::Float),
        });
        assert_eq!(
            TypeInner::Struct {
                members: vec![StructMember {
                    name: "x".into(),
                    ty: float_ty
                }]
            }
            .bindable_resource(),
            None
        );
    }

    #[test]
    fn unsized_array() {
        let mut types = Arena::new();
        let float_ty = types.append(Type {
            name: None,
            inner: TypeInner::Scalar(ScalarKind::Float),
        });
        let arr = TypeInner::Array {
            base: float_ty,
            size: ArraySize::Dynamic,
        };
        if let TypeInner::Array { size, .. } = arr {
            assert_eq!(size, ArraySize::Dynamic);
        } else {
            panic!("expected Array");
        }
    }
}
