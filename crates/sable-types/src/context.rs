//! Type context: interning arena and class registry
//!
//! All types are immutable values interned in a [`TypeContext`] and referred
//! to by copyable [`TypeId`]s, so structural equality coincides with id
//! equality. The context also owns the nominal class hierarchy metadata that
//! instance types point into.

use crate::error::TypeError;
use crate::ty::{
    ArgKind, ClassId, FunctionType, InstanceType, TupleType, Type, TypeId, TypeVarType,
};
use rustc_hash::FxHashMap;

/// Class hierarchy metadata for one nominal class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Class name
    pub name: String,
    /// Generic type parameters of the class
    pub type_params: Vec<TypeVarType>,
    /// Declared base instantiations, in declaration order
    ///
    /// Each entry is an `Instance` type whose arguments may mention the
    /// class's own type parameters. Index 0 is the primary parent followed
    /// by ancestor walks; later bases are metadata only.
    pub bases: Vec<TypeId>,
    /// Optional duck type alias: a type this class is structurally
    /// interchangeable with, preferred over nominal ancestry during joins
    pub ducktype: Option<TypeId>,
}

/// Bundle of the built-in types every type operation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicTypes {
    /// The top type (`object`): universal supertype of all nominal classes
    pub object: TypeId,
    /// The meta-type (`type`): the type of class objects / constructors
    pub type_type: TypeId,
}

/// Arena of interned types plus the registered class hierarchy
#[derive(Debug, Clone)]
pub struct TypeContext {
    types: Vec<Type>,
    intern: FxHashMap<Type, TypeId>,
    classes: Vec<ClassDef>,
    class_names: FxHashMap<String, ClassId>,
    object_class: ClassId,
    type_class: ClassId,
    basics: BasicTypes,
}

impl TypeContext {
    /// Create a new type context with the `object` and `type` builtin classes
    pub fn new() -> Self {
        let mut ctx = TypeContext {
            types: Vec::new(),
            intern: FxHashMap::default(),
            classes: Vec::new(),
            class_names: FxHashMap::default(),
            object_class: ClassId(0),
            type_class: ClassId(0),
            basics: BasicTypes {
                object: TypeId(0),
                type_type: TypeId(0),
            },
        };

        let object_class = ctx.add_class(ClassDef {
            name: "object".to_string(),
            type_params: vec![],
            bases: vec![],
            ducktype: None,
        });
        let object = ctx.instance_type(object_class, vec![]);

        let type_class = ctx.add_class(ClassDef {
            name: "type".to_string(),
            type_params: vec![],
            bases: vec![object],
            ducktype: None,
        });
        let type_type = ctx.instance_type(type_class, vec![]);

        ctx.object_class = object_class;
        ctx.type_class = type_class;
        ctx.basics = BasicTypes { object, type_type };
        ctx
    }

    fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.intern.get(&ty) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.intern.insert(ty, id);
        id
    }

    /// Look up a type by id
    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.0 as usize)
    }

    /// Look up a type by id, panicking on a foreign id
    ///
    /// Ids are only handed out by this context, so a miss indicates a caller
    /// bug (an id from a different context).
    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    /// The builtin type bundle
    pub fn basics(&self) -> BasicTypes {
        self.basics
    }

    /// Class id of the top type (`object`)
    pub fn object_class(&self) -> ClassId {
        self.object_class
    }

    /// Class id of the meta-type (`type`)
    pub fn type_class(&self) -> ClassId {
        self.type_class
    }

    /// The dynamic type
    pub fn dynamic_type(&mut self) -> TypeId {
        self.intern(Type::Dynamic)
    }

    /// The "no value yet" placeholder type
    pub fn none_type(&mut self) -> TypeId {
        self.intern(Type::NoneType)
    }

    /// The void type
    pub fn void_type(&mut self) -> TypeId {
        self.intern(Type::Void)
    }

    /// The unresolved-name type
    pub fn unresolved_type(&mut self) -> TypeId {
        self.intern(Type::Unresolved)
    }

    /// The join-failure sentinel type
    pub fn failure_type(&mut self) -> TypeId {
        self.intern(Type::Failure)
    }

    /// The erased inference placeholder type
    pub fn erased_type(&mut self) -> TypeId {
        self.intern(Type::Erased)
    }

    /// An instance of `class` with the given generic arguments
    ///
    /// The argument count must match the class's generic arity; a
    /// mismatch is a caller bug, checked in debug builds.
    pub fn instance_type(&mut self, class: ClassId, args: Vec<TypeId>) -> TypeId {
        debug_assert_eq!(
            args.len(),
            self.class_def(class).type_params.len(),
            "wrong number of type arguments for {}",
            self.class_def(class).name
        );
        self.intern(Type::Instance(InstanceType { class, args }))
    }

    /// A type variable
    pub fn var_type(&mut self, name: &str, id: u32) -> TypeId {
        self.intern(Type::Var(TypeVarType {
            name: name.to_string(),
            id,
        }))
    }

    /// A function type from a full descriptor
    pub fn function_type(&mut self, func: FunctionType) -> TypeId {
        self.intern(Type::Function(func))
    }

    /// A plain function type: all arguments required, positional and anonymous
    pub fn simple_function_type(&mut self, arg_types: Vec<TypeId>, ret_type: TypeId) -> TypeId {
        let n = arg_types.len();
        self.function_type(FunctionType {
            arg_types,
            arg_kinds: vec![ArgKind::Required; n],
            arg_names: vec![None; n],
            min_args: n,
            is_var_arg: false,
            ret_type,
            is_constructor: false,
            variables: vec![],
        })
    }

    /// A fixed-length tuple type
    pub fn tuple_type(&mut self, elements: Vec<TypeId>) -> TypeId {
        self.intern(Type::Tuple(TupleType { elements }))
    }

    /// A syntax-only type list
    pub fn type_list(&mut self, items: Vec<TypeId>) -> TypeId {
        self.intern(Type::TypeList(items))
    }

    fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.class_names.insert(def.name.clone(), id);
        self.classes.push(def);
        id
    }

    /// Register a nominal class
    ///
    /// Validates that the name is unused, that every base (and the duck type
    /// alias, if any) is an instance type, and that each base instantiation
    /// supplies the right number of generic arguments for its class. Bases
    /// can only refer to previously registered classes, so the hierarchy is
    /// acyclic by construction.
    pub fn register_class(
        &mut self,
        name: &str,
        type_params: Vec<TypeVarType>,
        bases: Vec<TypeId>,
        ducktype: Option<TypeId>,
    ) -> Result<ClassId, TypeError> {
        if self.class_names.contains_key(name) {
            return Err(TypeError::DuplicateClass {
                name: name.to_string(),
            });
        }
        for &base in &bases {
            let base_inst = match self.ty(base).as_instance() {
                Some(inst) => inst,
                None => {
                    return Err(TypeError::InvalidBase {
                        class: name.to_string(),
                        reason: format!("{} is not a class instance", self.format_type(base)),
                    })
                }
            };
            let base_def = self.class_def(base_inst.class);
            if base_inst.args.len() != base_def.type_params.len() {
                return Err(TypeError::InvalidTypeArgCount {
                    class: base_def.name.clone(),
                    expected: base_def.type_params.len(),
                    actual: base_inst.args.len(),
                });
            }
        }
        if let Some(duck) = ducktype {
            if self.ty(duck).as_instance().is_none() {
                return Err(TypeError::InvalidDucktype {
                    class: name.to_string(),
                    reason: format!("{} is not a class instance", self.format_type(duck)),
                });
            }
        }
        Ok(self.add_class(ClassDef {
            name: name.to_string(),
            type_params,
            bases,
            ducktype,
        }))
    }

    /// Look up class metadata by id
    pub fn class_def(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.0 as usize]
    }

    /// Look up a class id by name
    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.class_names.get(name).copied()
    }

    /// Render a type as source-like text, for diagnostics and tests
    pub fn format_type(&self, id: TypeId) -> String {
        match self.ty(id) {
            Type::Dynamic => "dynamic".to_string(),
            Type::NoneType => "None".to_string(),
            Type::Void => "void".to_string(),
            Type::Unresolved => "<unresolved>".to_string(),
            Type::Failure => "<join failure>".to_string(),
            Type::Erased => "<erased>".to_string(),
            Type::Instance(inst) => {
                let name = &self.class_def(inst.class).name;
                if inst.args.is_empty() {
                    name.clone()
                } else {
                    format!("{}[{}]", name, self.format_list(&inst.args))
                }
            }
            Type::Var(v) => v.name.clone(),
            Type::Function(f) => {
                format!(
                    "({}) -> {}",
                    self.format_list(&f.arg_types),
                    self.format_type(f.ret_type)
                )
            }
            Type::Tuple(t) => format!("tuple[{}]", self.format_list(&t.elements)),
            Type::TypeList(items) => format!("<type list: {}>", self.format_list(items)),
        }
    }

    fn format_list(&self, ids: &[TypeId]) -> String {
        ids.iter()
            .map(|&id| self.format_type(id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}
