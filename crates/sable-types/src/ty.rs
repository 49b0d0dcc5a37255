//! Core type definitions for the Sable type system

use std::fmt;

/// Unique identifier for a type in the type context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Unique identifier for a class registered in the type context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// Kind of a function argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Positional argument that must be supplied
    Required,
    /// Positional argument with a default value
    Optional,
    /// Variadic argument collecting the remaining positionals
    Star,
}

/// Type variable with a stable numeric id
///
/// Two occurrences denote the same variable exactly when their ids match;
/// the name is carried for display only but participates in equality so
/// that interning stays purely structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVarType {
    /// Display name (e.g. `T`)
    pub name: String,
    /// Stable identity of the variable
    pub id: u32,
}

/// Nominal class type together with concrete generic type arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceType {
    /// The class this is an instance of
    pub class: ClassId,
    /// Generic type arguments, positionally matching the class's params
    pub args: Vec<TypeId>,
}

/// Function (callable) type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    /// Argument types, in declaration order
    pub arg_types: Vec<TypeId>,
    /// Kind of each argument, positionally matching `arg_types`
    pub arg_kinds: Vec<ArgKind>,
    /// Declared argument names; `None` for anonymous arguments
    pub arg_names: Vec<Option<String>>,
    /// Minimum number of arguments a call must supply
    pub min_args: usize,
    /// Whether the last argument collects remaining positionals
    pub is_var_arg: bool,
    /// Return type
    pub ret_type: TypeId,
    /// Whether this callable is a class constructor (a "type object")
    pub is_constructor: bool,
    /// Generic type parameters of the function itself
    pub variables: Vec<TypeVarType>,
}

/// Fixed-length tuple type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleType {
    /// Element types
    pub elements: Vec<TypeId>,
}

/// The core type representation in Sable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Fully permissive inference top: compatible with everything
    Dynamic,

    /// Placeholder for "no value yet" (e.g. an unannotated `None` initializer);
    /// distinct from a nominal bottom type
    NoneType,

    /// Statement position: no value at all
    Void,

    /// A name that has not been resolved yet
    Unresolved,

    /// Sentinel meaning "no join exists"; never a valid program type
    Failure,

    /// Inference-time stand-in that unifies with anything
    Erased,

    /// Nominal class instance: class + generic type arguments
    Instance(InstanceType),

    /// Type variable
    Var(TypeVarType),

    /// Function type
    Function(FunctionType),

    /// Fixed-length tuple type
    Tuple(TupleType),

    /// A bare list of types; only valid as syntax, never as a value type
    TypeList(Vec<TypeId>),
}

impl Type {
    /// Check if this type is the dynamic type
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Dynamic)
    }

    /// Check if this type is the void type
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Check if this type is the join-failure sentinel
    pub fn is_failure(&self) -> bool {
        matches!(self, Type::Failure)
    }

    /// Get the instance type if this is an instance
    pub fn as_instance(&self) -> Option<&InstanceType> {
        match self {
            Type::Instance(i) => Some(i),
            _ => None,
        }
    }

    /// Get the function type if this is a function
    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Get the tuple type if this is a tuple
    pub fn as_tuple(&self) -> Option<&TupleType> {
        match self {
            Type::Tuple(t) => Some(t),
            _ => None,
        }
    }
}
