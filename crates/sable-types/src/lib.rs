//! Sable Type System
//!
//! Type representation and least-upper-bound engine for Sable.
//!
//! This crate provides:
//! - The interned type representation and class hierarchy metadata
//! - Subtyping with generic-argument rebasing onto ancestor classes
//! - The join engine: least upper bound of two types, used to merge
//!   inferred types at control-flow join points

#![warn(missing_docs)]

pub mod ty;
pub mod context;
pub mod error;
pub mod subtyping;
pub mod join;

pub use ty::{ArgKind, ClassId, FunctionType, InstanceType, TupleType, Type, TypeId, TypeVarType};
pub use context::{BasicTypes, ClassDef, TypeContext};
pub use error::TypeError;
pub use subtyping::SubtypingContext;
pub use join::join_types;
