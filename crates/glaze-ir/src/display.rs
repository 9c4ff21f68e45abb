//! Display implementations and text dump for debugging.

use std::fmt;
use std::fmt::Write;

use crate::arena::Handle;
use crate::types::{ArraySize, PointerKind, ScalarKind, TextureShape, Type, TypeInner};
use crate::value::{BinaryOp, Block, ConstValue, ParamQualifier, UnaryOp, Value, ValueKind};
use crate::Program;

impl fmt::Display for ScalarKind {
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

impl fmt::Display for TextureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dim1 => "1D",
            Self::Dim2 => "2D",
            Self::Dim3 => "3D",
            Self::Cube => "Cube",
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::And => "and",
            Self::Or => "or",
            Self::BitAnd => "bitand",
            Self::BitOr => "bitor",
            Self::BitXor => "bitxor",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::CmpEq => "cmpeq",
            Self::CmpNeq => "cmpneq",
            Self::CmpGt => "cmpgt",
            Self::CmpGe => "cmpge",
            Self::CmpLt => "cmplt",
            Self::CmpLe => "cmple",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Not => "not",
            Self::Neg => "neg",
            Self::BitNot => "bitnot",
        })
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}i"),
            Self::Uint(v) => write!(f, "{v}u"),
            Self::Float(v) => write!(f, "{v}f"),
        }
    }
}

impl fmt::Display for ParamQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "inout",
        })
    }
}

/// Renders a type as surface syntax, e.g. `float3` or `Texture2D<float4>`.
pub fn format_type(program: &Program, handle: Handle<Type>) -> String {
    let ty = &program.types[handle];
    match &ty.inner {
        TypeInner::Scalar(kind) => kind.to_string(),
        TypeInner::Vector { scalar, size } => format!("{scalar}{size}"),
        TypeInner::Matrix { scalar, rows, cols } => format!("{scalar}{rows}x{cols}"),
        TypeInner::Texture {
            base,
            shape,
            multisampled,
            arrayed,
            shadow,
        } => {
            let mut name = format!("Texture{shape}");
            if *multisampled {
                name.push_str("MS");
            }
            if *arrayed {
                name.push_str("Array");
            }
            if *shadow {
                name.push_str("Shadow");
            }
            format!("{name}<{}>", format_type(program, *base))
        }
        TypeInner::Sampler { comparison } => if *comparison {
            "SamplerComparisonState"
        } else {
            "SamplerState"
        }
        .to_string(),
        TypeInner::Pointer { kind, base } => {
            let wrapper = match kind {
                PointerKind::ConstantBuffer => "ConstantBuffer",
                PointerKind::StructuredBuffer => "StructuredBuffer",
                PointerKind::RwStructuredBuffer => "RWStructuredBuffer",
            };
            format!("{wrapper}<{}>", format_type(program, *base))
        }
        TypeInner::Array { base, size } => match size {
            ArraySize::Constant(n) => format!("{}[{n}]", format_type(program, *base)),
            ArraySize::Dynamic => format!("{}[]", format_type(program, *base)),
        },
        TypeInner::Struct { .. } => ty.name.clone().unwrap_or_else(|| "struct".into()),
    }
}

struct Dumper<'a> {
    program: &'a Program,
    out: String,
}

impl Dumper<'_> {
    /// Short operand form: constants inline, named values by name,
    /// everything else by arena index.
    fn operand(&self, handle: Handle<Value>) -> String {
        let value = &self.program.values[handle];
        match &value.kind {
            ValueKind::Constant(c) => c.to_string(),
            _ => match &value.name {
                Some(name) => name.clone(),
                None => format!("%{}", handle.index()),
            },
        }
    }

    fn result(&self, handle: Handle<Value>) -> String {
        match &self.program.values[handle].name {
            Some(name) => name.clone(),
            None => format!("%{}", handle.index()),
        }
    }

    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn block(&mut self, block: &Block, indent: usize) {
        for &instr in block {
            self.instruction(instr, indent);
        }
    }

    fn instruction(&mut self, handle: Handle<Value>, indent: usize) {
        let value = self.program.values[handle].clone();
        match value.kind {
            ValueKind::Constant(_) | ValueKind::FetchArg { .. } | ValueKind::GlobalVar { .. } => {}
            ValueKind::AllocVar => {
                let text = format!(
                    "var {}: {}",
                    self.result(handle),
                    format_type(self.program, value.ty)
                );
                self.line(indent, &text);
            }
            ValueKind::Unary { op, operand } => {
                let text = format!("{} = {op} {}", self.result(handle), self.operand(operand));
                self.line(indent, &text);
            }
            ValueKind::Binary { op, left, right } => {
                let text = format!(
                    "{} = {op} {}, {}",
                    self.result(handle),
                    self.operand(left),
                    self.operand(right)
                );
                self.line(indent, &text);
            }
            ValueKind::Select {
                condition,
                accept,
                reject,
            } => {
                let text = format!(
                    "{} = select {}, {}, {}",
                    self.result(handle),
                    self.operand(condition),
                    self.operand(accept),
                    self.operand(reject)
                );
                self.line(indent, &text);
            }
            ValueKind::Call {
                ref function,
                ref arguments,
                ..
            } => {
                let args: Vec<_> = arguments.iter().map(|&a| self.operand(a)).collect();
                let text = format!(
                    "{} = call {function}({})",
                    self.result(handle),
                    args.join(", ")
                );
                self.line(indent, &text);
            }
            ValueKind::MemberAccess { base, index } => {
                let text = format!(
                    "{} = {}[{}]",
                    self.result(handle),
                    self.operand(base),
                    self.operand(index)
                );
                self.line(indent, &text);
            }
            ValueKind::Swizzle { base, ref pattern } => {
                let text = format!("{} = {}.{pattern}", self.result(handle), self.operand(base));
                self.line(indent, &text);
            }
            ValueKind::Store { dest, value } => {
                let text = format!("store {}, {}", self.operand(dest), self.operand(value));
                self.line(indent, &text);
            }
            ValueKind::Return { value } => match value {
                Some(v) => {
                    let text = format!("return {}", self.operand(v));
                    self.line(indent, &text);
                }
                None => self.line(indent, "return"),
            },
            ValueKind::Yield { value } => {
                let text = format!("yield {}", self.operand(value));
                self.line(indent, &text);
            }
            ValueKind::Break => self.line(indent, "break"),
            ValueKind::Continue => self.line(indent, "continue"),
            ValueKind::Discard => self.line(indent, "discard"),
            ValueKind::If {
                condition,
                ref accept,
                ref reject,
            } => {
                let text = format!("if {}:", self.operand(condition));
                self.line(indent, &text);
                self.block(accept, indent + 1);
                if !reject.is_empty() {
                    self.line(indent, "else:");
                    self.block(reject, indent + 1);
                }
            }
            ValueKind::While {
                ref condition,
                ref body,
            } => {
                self.line(indent, "while:");
                self.line(indent + 1, "cond:");
                self.block(condition, indent + 2);
                self.line(indent + 1, "body:");
                self.block(body, indent + 2);
            }
            ValueKind::DoWhile {
                ref condition,
                ref body,
            } => {
                self.line(indent, "do:");
                self.line(indent + 1, "body:");
                self.block(body, indent + 2);
                self.line(indent + 1, "cond:");
                self.block(condition, indent + 2);
            }
            ValueKind::For {
                ref condition,
                ref step,
                ref body,
            } => {
                self.line(indent, "for:");
                self.line(indent + 1, "cond:");
                self.block(condition, indent + 2);
                self.line(indent + 1, "step:");
                self.block(step, indent + 2);
                self.line(indent + 1, "body:");
                self.block(body, indent + 2);
            }
        }
    }
}

/// Dumps a program as text, for debugging and test assertions.
pub fn dump_program(program: &Program) -> String {
    let mut d = Dumper {
        program,
        out: String::new(),
    };

    d.out.push_str("Structs:\n");
    for &handle in &program.struct_types {
        let ty = &program.types[handle];
        let name = ty.name.as_deref().unwrap_or("<anon>");
        let _ = writeln!(d.out, "  struct {name}:");
        if let TypeInner::Struct { members } = &ty.inner {
            for member in members {
                let _ = writeln!(
                    d.out,
                    "    {}: {}",
                    member.name,
                    format_type(program, member.ty)
                );
            }
        }
    }

    d.out.push_str("\nGlobals:\n");
    let mut globals: Vec<_> = program.globals.iter().collect();
    globals.sort_by(|a, b| a.0.cmp(b.0));
    for (name, &handle) in globals {
        let value = &program.values[handle];
        let mut line = format!("  {name}: {}", format_type(program, value.ty));
        if let ValueKind::GlobalVar {
            binding: Some(binding),
        } = &value.kind
        {
            let _ = write!(line, " @binding({}, {})", binding.group, binding.index);
        }
        d.out.push_str(&line);
        d.out.push('\n');
    }

    d.out.push_str("\nFunctions:\n");
    let mut names: Vec<_> = program.functions.keys().collect();
    names.sort();
    for name in names {
        let func = &program.functions[name];
        let params: Vec<_> = func
            .parameters
            .iter()
            .map(|(pname, arg)| {
                let value = &program.values[*arg];
                let qualifier = match value.kind {
                    ValueKind::FetchArg { qualifier, .. } => qualifier,
                    _ => ParamQualifier::In,
                };
                format!("{qualifier} {pname}: {}", format_type(program, value.ty))
            })
            .collect();
        let _ = writeln!(
            d.out,
            "  fn {name}({}) -> {}:",
            params.join(", "),
            format_type(program, func.result)
        );
        let body = func.body.clone();
        d.block(&body, 2);
    }

    d.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::Function;

    #[test]
    fn format_basic_types() {
        let mut program = Program::new();
        let float_ty = program.types.append(Type {
            name: None,
            inner: TypeInner::Scalar(ScalarKind::Float),
        });
        let vec3 = program.types.append(Type {
            name: None,
            inner: TypeInner::Vector {
                scalar: ScalarKind::Float,
                size: 3,
            },
        });
        let mat = program.types.append(Type {
            name: None,
            inner: TypeInner::Matrix {
                scalar: ScalarKind::Float,
                rows: 3,
                cols: 4,
            },
        });
        let tex = program.types.append(Type {
            name: None,
            inner: TypeInner::Texture {
                base: vec3,
                shape: TextureShape::Dim2,
                multisampled: false,
                arrayed: false,
                shadow: false,
            },
        });
        assert_eq!(format_type(&program, float_ty), "float");
        assert_eq!(format_type(&program, vec3), "float3");
        assert_eq!(format_type(&program, mat), "float3x4");
        assert_eq!(format_type(&program, tex), "Texture2D<float3>");
    }

    #[test]
    fn dump_simple_function() {
        let mut program = Program::new();
        let int_ty = program.types.append(Type {
            name: None,
            inner: TypeInner::Scalar(ScalarKind::Int),
        });
        let one = program.intern_const(ConstValue::Int(1), int_ty);
        let two = program.intern_const(ConstValue::Int(2), int_ty);
        let sum = program.values.append(Value::new(
            int_ty,
            ValueKind::Binary {
                op: BinaryOp::Add,
                left: one,
                right: two,
            },
        ));
        let ret = program
            .values
            .append(Value::new(int_ty, ValueKind::Return { value: Some(sum) }));
        let mut func = Function::new("three", int_ty);
        func.body = vec![sum, ret];
        program.functions.insert("three".into(), func);

        let dump = dump_program(&program);
        assert!(dump.contains("fn three() -> int:"));
        assert!(dump.contains("add 1i, 2i"));
        assert!(dump.contains("return %"));
    }
}
