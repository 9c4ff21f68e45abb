//! The lowering driver: phase orchestration, type translation, and
//! function emission.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use glaze_ast as ast;
use glaze_ir as ir;
use glaze_ir::{
    ArraySize, Block, Handle, ParamQualifier, ResourceBinding, StructMember, Type, TypeInner,
    Value, ValueKind,
};

use crate::scope::ScopeStack;
use crate::writer::CodeWriter;
use crate::{BindingPolicy, Diagnostic, DiagnosticSink, LowerError, LowerOptions, INIT_FUNCTION};

/// Function-table entry recorded during the header phases.
pub(crate) struct FuncEntry {
    pub internal_name: String,
    pub owner: Option<ast::DeclId>,
}

/// The implicit receiver active while a member body is lowered.
pub(crate) struct Receiver {
    pub decl: ast::DeclId,
    pub this_arg: Handle<Value>,
}

pub(crate) struct Lowerer<'a> {
    ast: &'a ast::Program,
    options: &'a LowerOptions,
    sink: &'a mut DiagnosticSink,
    pub(crate) program: ir::Program,
    entry_points: HashSet<&'a str>,
    /// Declaration id -> aggregate declaration, for field and receiver
    /// lookups.
    aggregates: HashMap<ast::DeclId, ast::Aggregate<'a>>,
    /// One IR struct type per aggregate declaration.
    struct_cache: HashMap<ast::DeclId, Handle<Type>>,
    /// Memoized non-nominal type translations.
    type_memo: HashMap<ast::AstType, Handle<Type>>,
    /// AST function declaration -> IR function, filled by the header
    /// phases so any call site resolves regardless of textual order.
    functions: HashMap<ast::DeclId, FuncEntry>,
    pub(crate) scopes: ScopeStack,
    pub(crate) writer: CodeWriter,
    pub(crate) receiver: Option<Receiver>,
    next_binding: u32,
    pub(crate) void_ty: Handle<Type>,
    pub(crate) bool_ty: Handle<Type>,
    pub(crate) int_ty: Handle<Type>,
    pub(crate) uint_ty: Handle<Type>,
    pub(crate) float_ty: Handle<Type>,
}

fn scalar_kind(base: ast::BaseType) -> ir::ScalarKind {
    match base {
        ast::BaseType::Void => ir::ScalarKind::Void,
        ast::BaseType::Bool => ir::ScalarKind::Bool,
        ast::BaseType::Int => ir::ScalarKind::Int,
        ast::BaseType::Uint => ir::ScalarKind::Uint,
        ast::BaseType::Half => ir::ScalarKind::Half,
        ast::BaseType::Float => ir::ScalarKind::Float,
        ast::BaseType::Double => ir::ScalarKind::Double,
    }
}

fn texture_shape(shape: ast::TextureShape) -> ir::TextureShape {
    match shape {
        ast::TextureShape::Dim1 => ir::TextureShape::Dim1,
        ast::TextureShape::Dim2 => ir::TextureShape::Dim2,
        ast::TextureShape::Dim3 => ir::TextureShape::Dim3,
        ast::TextureShape::Cube => ir::TextureShape::Cube,
    }
}

/// Sanitizes a source identifier for use as an IR display name.
pub(crate) fn escape_code_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

impl<'a> Lowerer<'a> {
    pub fn new(
        ast: &'a ast::Program,
        options: &'a LowerOptions,
        sink: &'a mut DiagnosticSink,
    ) -> Self {
        let mut program = ir::Program::new();
        let mut type_memo = HashMap::new();
        let mut scalar = |base: ast::BaseType, memo: &mut HashMap<ast::AstType, Handle<Type>>| {
            let handle = program.types.append(Type {
                name: None,
                inner: TypeInner::Scalar(scalar_kind(base)),
            });
            memo.insert(ast::AstType::Basic(base), handle);
            handle
        };
        let void_ty = scalar(ast::BaseType::Void, &mut type_memo);
        let bool_ty = scalar(ast::BaseType::Bool, &mut type_memo);
        let int_ty = scalar(ast::BaseType::Int, &mut type_memo);
        let uint_ty = scalar(ast::BaseType::Uint, &mut type_memo);
        let float_ty = scalar(ast::BaseType::Float, &mut type_memo);

        let aggregates = ast.aggregates().map(|a| (a.id(), a)).collect();
        let entry_points = options
            .entry_points
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        let next_binding = match options.binding_policy {
            BindingPolicy::Sequential { first, .. } => first,
            BindingPolicy::None => 0,
        };

        Self {
            ast,
            options,
            sink,
            program,
            entry_points,
            aggregates,
            struct_cache: HashMap::new(),
            type_memo,
            functions: HashMap::new(),
            scopes: ScopeStack::new(),
            writer: CodeWriter::new(),
            receiver: None,
            next_binding,
            void_ty,
            bool_ty,
            int_ty,
            uint_ty,
            float_ty,
        }
    }

    pub fn into_program(self) -> ir::Program {
        self.program
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.push(diagnostic);
    }

    /// Runs the phased traversal over the top-level program node.
    pub fn run(&mut self) -> Result<(), LowerError> {
        let ast = self.ast;
        log::debug!("lowering program with {} declarations", ast.decls.len());

        // Struct registration. Classes are represented as structs.
        for s in ast.structs() {
            if s.modifiers.is_implicit() {
                continue;
            }
            self.translate_aggregate(s.id)?;
        }
        for c in ast.classes() {
            self.translate_aggregate(c.id)?;
        }

        // Member-function headers.
        for c in ast.classes() {
            for m in &c.methods {
                self.emit_header(m, Some(ast::Aggregate::Class(c)))?;
            }
        }

        // Global initializer. The scope opened here holds every global
        // and stays open through all body lowering.
        self.scopes.push();
        self.writer.push_node();
        let vars_result = self.lower_top_level_vars();
        let init_body = self.writer.pop_node();
        let result = vars_result.and_then(|()| {
            let mut init = ir::Function::new(INIT_FUNCTION, self.void_ty);
            init.body = init_body;
            self.program.functions.insert(INIT_FUNCTION.into(), init);
            self.lower_functions()
        });
        self.scopes.pop();
        debug_assert_eq!(self.scopes.depth(), 0, "scope push/pop imbalance");
        debug_assert_eq!(self.writer.depth(), 0, "code node push/pop imbalance");
        result
    }

    /// Free-function headers, then member bodies, then free bodies
    /// with the entry-point init call injected.
    fn lower_functions(&mut self) -> Result<(), LowerError> {
        let ast = self.ast;
        for f in ast.functions() {
            if f.modifiers.is_implicit() {
                continue;
            }
            self.emit_header(f, None)?;
        }
        for c in ast.classes() {
            for m in &c.methods {
                self.emit_body(m, Some(ast::Aggregate::Class(c)))?;
            }
        }
        for f in ast.functions() {
            if f.modifiers.is_implicit() {
                continue;
            }
            self.emit_body(f, None)?;
            if self.entry_points.contains(f.name.as_str()) {
                self.inject_init_call(f.id);
            }
        }
        Ok(())
    }

    fn lower_top_level_vars(&mut self) -> Result<(), LowerError> {
        let ast = self.ast;
        for v in ast.variables() {
            if v.modifiers.is_implicit() {
                continue;
            }
            let class = match &v.ty {
                ast::AstType::Named { decl, .. } => {
                    self.aggregates.get(decl).copied().filter(|a| a.is_class())
                }
                _ => None,
            };
            match class {
                Some(agg) => {
                    // Class-typed globals become a struct-typed global
                    // plus one synthesized global per bindable field.
                    let ty = self.translate_aggregate(agg.id())?;
                    let gvar = self.program.values.append(
                        Value::new(ty, ValueKind::GlobalVar { binding: None })
                            .named(escape_code_name(&v.name))
                            .at(v.span),
                    );
                    self.scopes.insert(&v.name, gvar);
                    self.program.globals.insert(v.name.clone(), gvar);
                    self.define_bindable_resources(gvar, &v.name)?;
                }
                None => self.lower_var_decl(v)?,
            }
        }
        Ok(())
    }

    /// Prepends a call to `__main_init` to an entry point's body.
    fn inject_init_call(&mut self, decl: ast::DeclId) {
        let call = self.program.values.append(Value::new(
            self.void_ty,
            ValueKind::Call {
                function: INIT_FUNCTION.into(),
                kind: ir::CallKind::User,
                arguments: Vec::new(),
            },
        ));
        let internal = &self.functions[&decl].internal_name;
        let func = self
            .program
            .functions
            .get_mut(internal)
            .expect("entry point emitted before init-call injection");
        func.body.insert(0, call);
        log::debug!("entry point `{internal}` calls {INIT_FUNCTION}");
    }

    // ---- Type translation -------------------------------------------------

    /// Extracts a constant size, failing loudly on anything else.
    fn const_size(&self, val: ast::IntVal) -> Result<u32, LowerError> {
        match val {
            ast::IntVal::Const(n) if n >= 0 => Ok(n as u32),
            _ => Err(LowerError::NonConstantSize),
        }
    }

    /// Maps a semantic type descriptor to an IR type.
    pub(crate) fn translate(&mut self, ty: &ast::AstType) -> Result<Handle<Type>, LowerError> {
        if let Some(&handle) = self.type_memo.get(ty) {
            return Ok(handle);
        }
        let inner = match ty {
            ast::AstType::Basic(base) => TypeInner::Scalar(scalar_kind(*base)),
            ast::AstType::Vector { elem, count } => TypeInner::Vector {
                scalar: scalar_kind(*elem),
                size: self.const_size(*count)?,
            },
            ast::AstType::Matrix { elem, rows, cols } => TypeInner::Matrix {
                scalar: scalar_kind(*elem),
                rows: self.const_size(*rows)?,
                cols: self.const_size(*cols)?,
            },
            ast::AstType::Texture {
                elem,
                shape,
                multisampled,
                arrayed,
                shadow,
            } => TypeInner::Texture {
                base: self.translate(elem)?,
                shape: texture_shape(*shape),
                multisampled: *multisampled,
                arrayed: *arrayed,
                shadow: *shadow,
            },
            ast::AstType::Sampler { comparison } => TypeInner::Sampler {
                comparison: *comparison,
            },
            ast::AstType::ConstantBuffer(elem) => TypeInner::Pointer {
                kind: ir::PointerKind::ConstantBuffer,
                base: self.translate(elem)?,
            },
            ast::AstType::Array { elem, length } => TypeInner::Array {
                base: self.translate(elem)?,
                size: match length {
                    Some(length) => ArraySize::Constant(self.const_size(*length)?),
                    None => ArraySize::Dynamic,
                },
            },
            ast::AstType::Named { decl, name } => {
                if self.aggregates.contains_key(decl) {
                    let handle = self.translate_aggregate(*decl)?;
                    self.type_memo.insert(ty.clone(), handle);
                    return Ok(handle);
                }
                return Err(LowerError::NotImplemented(format!(
                    "declaration `{name}` used as a type"
                )));
            }
            ast::AstType::Func(_) => {
                return Err(LowerError::NotImplemented(
                    "function types have no IR translation".into(),
                ));
            }
        };
        let handle = self.program.types.append(Type { name: None, inner });
        self.type_memo.insert(ty.clone(), handle);
        Ok(handle)
    }

    /// Translates a struct or class declaration, memoized per
    /// declaration identity so struct types are nominal.
    fn translate_aggregate(&mut self, decl: ast::DeclId) -> Result<Handle<Type>, LowerError> {
        if let Some(&handle) = self.struct_cache.get(&decl) {
            return Ok(handle);
        }
        let agg = self
            .aggregates
            .get(&decl)
            .copied()
            .ok_or_else(|| LowerError::NotImplemented("unregistered aggregate type".into()))?;
        log::debug!("registering struct type `{}`", agg.name());

        // Install the named shell before translating fields so
        // self-references resolve to this handle instead of recursing.
        let handle = self.program.types.append(Type {
            name: Some(agg.name().to_string()),
            inner: TypeInner::Struct {
                members: Vec::new(),
            },
        });
        self.struct_cache.insert(decl, handle);
        self.program.struct_types.push(handle);

        let mut members = Vec::with_capacity(agg.fields().len());
        for field in agg.fields() {
            members.push(StructMember {
                name: field.name.clone(),
                ty: self.translate(&field.ty)?,
            });
        }
        self.program.types[handle].inner = TypeInner::Struct { members };
        Ok(handle)
    }

    // ---- Function emission ------------------------------------------------

    /// Builds the internal name and registers the function in both the
    /// program and the declaration-keyed function table.
    fn emit_header(
        &mut self,
        f: &ast::FunctionDecl,
        owner: Option<ast::Aggregate<'a>>,
    ) -> Result<(), LowerError> {
        let mut internal = String::new();
        if let Some(owner) = owner {
            internal.push_str(owner.name());
            internal.push('@');
        }
        internal.push_str(&f.name);
        for p in &f.params {
            let _ = write!(internal, "@{}", p.ty);
        }
        log::trace!("function header `{internal}`");

        let result = self.translate(&f.result)?;
        self.program
            .functions
            .insert(internal.clone(), ir::Function::new(internal.clone(), result));
        self.functions.insert(
            f.id,
            FuncEntry {
                internal_name: internal,
                owner: owner.map(|o| o.id()),
            },
        );
        Ok(())
    }

    /// Lowers a function body into the header registered for it.
    fn emit_body(
        &mut self,
        f: &ast::FunctionDecl,
        owner: Option<ast::Aggregate<'a>>,
    ) -> Result<(), LowerError> {
        let internal = self
            .functions
            .get(&f.id)
            .map(|e| e.internal_name.clone())
            .expect("function header must be emitted before its body");
        log::trace!("lowering body of `{internal}`");

        self.scopes.push();
        self.writer.push_node();
        let fetched = self.fetch_parameters(f, owner);
        let body_result = match &fetched {
            Ok(_) => self.lower_stmt(&f.body),
            Err(_) => Ok(()),
        };
        let body = self.writer.pop_node();
        self.scopes.pop();
        self.receiver = None;

        let parameters = fetched?;
        body_result?;
        let func = self
            .program
            .functions
            .get_mut(&internal)
            .expect("header registered for this body");
        func.parameters = parameters;
        func.body = body;
        Ok(())
    }

    /// Fetches the receiver (argument 1, `inout`) and the declared
    /// parameters (monotonically increasing indices), binding each
    /// under its source name.
    #[allow(clippy::type_complexity)]
    fn fetch_parameters(
        &mut self,
        f: &ast::FunctionDecl,
        owner: Option<ast::Aggregate<'a>>,
    ) -> Result<Vec<(String, Handle<Value>)>, LowerError> {
        let mut parameters = Vec::with_capacity(f.params.len() + usize::from(owner.is_some()));
        let mut index = 0u32;
        if let Some(owner) = owner {
            index += 1;
            let ty = self.translate_aggregate(owner.id())?;
            let this_arg = self.program.values.append(
                Value::new(
                    ty,
                    ValueKind::FetchArg {
                        index,
                        qualifier: ParamQualifier::InOut,
                    },
                )
                .named("sv_this"),
            );
            parameters.push(("this".to_string(), this_arg));
            self.scopes.insert("this", this_arg);
            self.receiver = Some(Receiver {
                decl: owner.id(),
                this_arg,
            });
        }
        for p in &f.params {
            index += 1;
            let ty = self.translate(&p.ty)?;
            let qualifier = match p.direction {
                ast::ParamDirection::In => ParamQualifier::In,
                ast::ParamDirection::Out => ParamQualifier::Out,
                ast::ParamDirection::InOut => ParamQualifier::InOut,
            };
            let arg = self.program.values.append(
                Value::new(ty, ValueKind::FetchArg { index, qualifier })
                    .named(escape_code_name(&format!("p_{}", p.name))),
            );
            parameters.push((p.name.clone(), arg));
            self.scopes.insert(&p.name, arg);
        }
        Ok(parameters)
    }

    // ---- Bindable-resource synthesis --------------------------------------

    fn next_resource_binding(&mut self) -> Option<ResourceBinding> {
        match self.options.binding_policy {
            BindingPolicy::None => None,
            BindingPolicy::Sequential { group, .. } => {
                let index = self.next_binding;
                self.next_binding += 1;
                Some(ResourceBinding { group, index })
            }
        }
    }

    /// Flattens the bindable fields of `obj` into one global per leaf,
    /// named by the `_`-joined path, and connects each back to its
    /// field with a store in the current (initializer) node.
    fn define_bindable_resources(
        &mut self,
        obj: Handle<Value>,
        prefix: &str,
    ) -> Result<(), LowerError> {
        let struct_ty = self.program.values[obj].ty;
        let members = match &self.program.types[struct_ty].inner {
            TypeInner::Struct { members } => members.clone(),
            _ => {
                return Err(LowerError::InvalidProgram(
                    "bindable-resource synthesis over a non-struct value".into(),
                ))
            }
        };
        for (i, member) in members.iter().enumerate() {
            let inner = &self.program.types[member.ty].inner;
            if inner.bindable_resource().is_some() {
                let name = format!("{prefix}_{}", member.name);
                let binding = self.next_resource_binding();
                let gvar = self.program.values.append(
                    Value::new(member.ty, ValueKind::GlobalVar { binding })
                        .named(escape_code_name(&name)),
                );
                self.program.globals.insert(name.clone(), gvar);
                self.scopes.insert(&name, gvar);

                let index = self.const_int(i as i32);
                let access = self.member_access(obj, index, member.ty);
                self.emit(Value::new(
                    self.void_ty,
                    ValueKind::Store {
                        dest: access,
                        value: gvar,
                    },
                ));
                log::debug!("synthesized bindable global `{name}`");
            } else if matches!(inner, TypeInner::Struct { .. }) {
                let index = self.const_int(i as i32);
                let access = self.member_access(obj, index, member.ty);
                self.define_bindable_resources(access, &format!("{prefix}_{}", member.name))?;
            }
        }
        Ok(())
    }

    // ---- Emission helpers -------------------------------------------------

    /// Appends a value and inserts it into the current code node.
    pub(crate) fn emit(&mut self, value: Value) -> Handle<Value> {
        let handle = self.program.values.append(value);
        self.writer.insert(handle);
        handle
    }

    /// Emits a member access, propagating the base's attribute.
    pub(crate) fn member_access(
        &mut self,
        base: Handle<Value>,
        index: Handle<Value>,
        ty: Handle<Type>,
    ) -> Handle<Value> {
        let attribute = self.program.values[base].attribute.clone();
        let mut value = Value::new(ty, ValueKind::MemberAccess { base, index });
        value.attribute = attribute;
        self.emit(value)
    }

    pub(crate) fn const_int(&mut self, v: i32) -> Handle<Value> {
        let ty = self.int_ty;
        self.program.intern_const(ir::ConstValue::Int(v), ty)
    }

    pub(crate) fn const_float(&mut self, v: f32) -> Handle<Value> {
        let ty = self.float_ty;
        self.program.intern_const(ir::ConstValue::Float(v), ty)
    }

    /// Field lookup on the active receiver, used as the fallback for
    /// unresolved names in member bodies.
    pub(crate) fn receiver_field(&self, name: &str) -> Option<(Handle<Value>, usize, ast::AstType)> {
        let receiver = self.receiver.as_ref()?;
        let agg = self.aggregates.get(&receiver.decl).copied()?;
        let index = agg.field_index(name)?;
        Some((
            receiver.this_arg,
            index,
            agg.fields()[index].ty.clone(),
        ))
    }

    /// The aggregate declaration behind a semantic type, if any.
    pub(crate) fn aggregate_of(&self, ty: &ast::AstType) -> Option<ast::Aggregate<'a>> {
        match ty {
            ast::AstType::Named { decl, .. } => self.aggregates.get(decl).copied(),
            _ => None,
        }
    }

    /// The function-table entry for a resolved callee, if the callee
    /// is a user-defined function.
    pub(crate) fn function_entry(&self, decl: ast::DeclId) -> Option<(String, bool)> {
        self.functions
            .get(&decl)
            .map(|e| (e.internal_name.clone(), e.owner.is_some()))
    }

    /// Runs `f` inside a fresh lexical scope; the pop happens on every
    /// exit path.
    pub(crate) fn in_scope<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, LowerError>,
    ) -> Result<R, LowerError> {
        self.scopes.push();
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Runs `f` with a fresh open code node and returns the node; the
    /// pop happens on every exit path.
    pub(crate) fn in_node(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<(), LowerError>,
    ) -> Result<Block, LowerError> {
        self.writer.push_node();
        let result = f(self);
        let block = self.writer.pop_node();
        result.map(|()| block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_code_name_replaces_punctuation() {
        assert_eq!(escape_code_name("plain_name0"), "plain_name0");
        assert_eq!(escape_code_name("a.b-c"), "a_b_c");
        assert_eq!(escape_code_name("p_x"), "p_x");
    }

    #[test]
    fn scalar_kind_mapping_is_total() {
        use ast::BaseType::*;
        for base in [Void, Bool, Int, Uint, Half, Float, Double] {
            let _ = scalar_kind(base);
        }
        assert_eq!(scalar_kind(Int), ir::ScalarKind::Int);
        assert_eq!(scalar_kind(Uint), ir::ScalarKind::Uint);
    }
}
