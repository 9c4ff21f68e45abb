//! Semantic type descriptors attached to checked AST nodes.

use std::fmt;

use crate::decl::DeclId;

/// A basic scalar type.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum BaseType {
    Void,
    Bool,
    Int,
    Uint,
    Half,
    Float,
    Double,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Half => "half",
            Self::Float => "float",
            Self::Double => "double",
        })
    }
}

/// An integer-valued size expression as resolved by the checker.
///
/// Vector, matrix, and array shapes must be [`IntVal::Const`] by the
/// time lowering runs; [`IntVal::Dynamic`] survives only for unsized
/// arrays.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum IntVal {
    /// A compile-time constant.
    Const(i32),
    /// Not resolvable to a constant.
    Dynamic,
}

/// The base dimensionality of a texture type.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum TextureShape {
    Dim1,
    Dim2,
    Dim3,
    Cube,
}

/// How a call expression's callee declaration is classified.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum CalleeKind {
    /// An ordinary free or member function.
    Function,
    /// An aggregate constructor.
    Constructor,
}

/// The type of an expression in callee position.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct FuncType {
    /// The resolved callee declaration.
    pub decl: DeclId,
    /// Constructor or ordinary function.
    pub callee: CalleeKind,
    /// The declared result type.
    pub result: AstType,
}

/// A resolved semantic type.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum AstType {
    /// A scalar.
    Basic(BaseType),
    /// A vector of scalars.
    Vector { elem: BaseType, count: IntVal },
    /// A matrix of scalars.
    Matrix {
        elem: BaseType,
        rows: IntVal,
        cols: IntVal,
    },
    /// A texture over an element type.
    Texture {
        elem: Box<AstType>,
        shape: TextureShape,
        multisampled: bool,
        arrayed: bool,
        shadow: bool,
    },
    /// A texture sampler.
    Sampler { comparison: bool },
    /// A uniform constant buffer over an element type.
    ConstantBuffer(Box<AstType>),
    /// A sized or unsized array.
    Array {
        elem: Box<AstType>,
        length: Option<IntVal>,
    },
    /// A reference to a struct or class declaration.
    Named { decl: DeclId, name: String },
    /// The type of an expression in callee position.
    Func(Box<FuncType>),
}

impl AstType {
    /// Shorthand for a scalar type.
    pub fn basic(base: BaseType) -> Self {
        Self::Basic(base)
    }

    /// Shorthand for a vector with a constant component count.
    pub fn vector(elem: BaseType, count: i32) -> Self {
        Self::Vector {
            elem,
            count: IntVal::Const(count),
        }
    }
}

impl fmt::Display for AstType {
    /// Surface syntax, as used for internal-name mangling: `int`,
    /// `float3`, `float3x3`, `Texture2D<float4>`, `MyStruct`, ...
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn int_val(f: &mut fmt::Formatter<'_>, v: IntVal) -> fmt::Result {
            match v {
                IntVal::Const(n) => write!(f, "{n}"),
                IntVal::Dynamic => f.write_str("?"),
            }
        }
        match self {
            Self::Basic(base) => write!(f, "{base}"),
            Self::Vector { elem, count } => {
                write!(f, "{elem}")?;
                int_val(f, *count)
            }
            Self::Matrix { elem, rows, cols } => {
                write!(f, "{elem}")?;
                int_val(f, *rows)?;
                f.write_str("x")?;
                int_val(f, *cols)
            }
            Self::Texture {
                elem,
                shape,
                multisampled,
                arrayed,
                shadow,
            } => {
                let dim = match shape {
                    TextureShape::Dim1 => "1D",
                    TextureShape::Dim2 => "2D",
                    TextureShape::Dim3 => "3D",
                    TextureShape::Cube => "Cube",
                };
                write!(f, "Texture{dim}")?;
                if *multisampled {
                    f.write_str("MS")?;
                }
                if *arrayed {
                    f.write_str("Array")?;
                }
                if *shadow {
                    f.write_str("Shadow")?;
                }
                write!(f, "<{elem}>")
            }
            Self::Sampler { comparison } => f.write_str(if *comparison {
                "SamplerComparisonState"
            } else {
                "SamplerState"
            }),
            Self::ConstantBuffer(elem) => write!(f, "ConstantBuffer<{elem}>"),
            Self::Array { elem, length } => {
                write!(f, "{elem}[")?;
                if let Some(length) = length {
                    int_val(f, *length)?;
                }
                f.write_str("]")
            }
            Self::Named { name, .. } => f.write_str(name),
            Self::Func(func) => write!(f, "func -> {}", func.result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_scalars_and_shapes() {
        assert_eq!(AstType::basic(BaseType::Int).to_string(), "int");
        assert_eq!(AstType::vector(BaseType::Float, 3).to_string(), "float3");
        assert_eq!(
            AstType::Matrix {
                elem: BaseType::Float,
                rows: IntVal::Const(3),
                cols: IntVal::Const(4),
            }
            .to_string(),
            "float3x4"
        );
    }

    #[test]
    fn display_resources() {
        let tex = AstType::Texture {
            elem: Box::new(AstType::vector(BaseType::Float, 4)),
            shape: TextureShape::Dim2,
            multisampled: false,
            arrayed: true,
            shadow: false,
        };
        assert_eq!(tex.to_string(), "Texture2DArray<float4>");
        assert_eq!(
            AstType::Sampler { comparison: false }.to_string(),
            "SamplerState"
        );
        assert_eq!(
            AstType::ConstantBuffer(Box::new(AstType::basic(BaseType::Float))).to_string(),
            "ConstantBuffer<float>"
        );
    }

    #[test]
    fn display_arrays() {
        let sized = AstType::Array {
            elem: Box::new(AstType::basic(BaseType::Int)),
            length: Some(IntVal::Const(8)),
        };
        assert_eq!(sized.to_string(), "int[8]");
        let unsized_arr = AstType::Array {
            elem: Box::new(AstType::basic(BaseType::Int)),
            length: None,
        };
        assert_eq!(unsized_arr.to_string(), "int[]");
    }

    #[test]
    fn display_named() {
        let named = AstType::Named {
            decl: DeclId::new(3),
            name: "Material".into(),
        };
        assert_eq!(named.to_string(), "Material");
    }
}
