//! Least upper bound ("join") of two static types
//!
//! The join of `s` and `t` is the most specific type both are compatible
//! with; for example the join of `int` and `object` is `object`. The type
//! checker calls this whenever control-flow paths converging on a value
//! carry differing inferred types (branch merges, loop widening).
//!
//! "No join exists" is a value, not an error: the engine returns the
//! [`Type::Failure`](crate::ty::Type::Failure) sentinel and never fails
//! otherwise.

use crate::context::{BasicTypes, TypeContext};
use crate::subtyping::SubtypingContext;
use crate::ty::{FunctionType, Type, TypeId};
use rustc_hash::FxHashSet;

/// Return the least upper bound of `s` and `t`
///
/// Commutative and idempotent. If the join does not exist (void joined
/// with a value-bearing type), returns the failure sentinel.
///
/// # Panics
///
/// Panics if either operand is a syntax-only type list; passing one is a
/// caller bug, not a recoverable condition.
pub fn join_types(ctx: &mut TypeContext, basics: &BasicTypes, s: TypeId, t: TypeId) -> TypeId {
    Join::new(ctx, *basics).join(s, t)
}

/// One join computation: carries the in-progress pair set that bounds
/// recursion through nested generic arguments and tuple elements.
struct Join<'a> {
    ctx: &'a mut TypeContext,
    basics: BasicTypes,
    in_progress: FxHashSet<(TypeId, TypeId)>,
}

impl<'a> Join<'a> {
    fn new(ctx: &'a mut TypeContext, basics: BasicTypes) -> Self {
        Join {
            ctx,
            basics,
            in_progress: FxHashSet::default(),
        }
    }

    fn join(&mut self, s: TypeId, t: TypeId) -> TypeId {
        let s_ty = self.ctx.ty(s).clone();
        let t_ty = self.ctx.ty(t).clone();

        // Degenerate kinds are handled symmetrically before the variant
        // match, so the result cannot depend on operand order. The order
        // of these checks is load-bearing; see DESIGN.md.
        if matches!(s_ty, Type::TypeList(_)) || matches!(t_ty, Type::TypeList(_)) {
            panic!("type lists are syntax only and cannot be join operands");
        }
        if s_ty.is_dynamic() {
            return s;
        }
        if t_ty.is_dynamic() {
            return t;
        }
        if s_ty.is_failure() || t_ty.is_failure() {
            return self.ctx.failure_type();
        }
        if matches!(s_ty, Type::Erased) {
            return t;
        }
        if matches!(t_ty, Type::Erased) {
            return s;
        }
        if s_ty.is_void() || t_ty.is_void() {
            // Void joins only with itself.
            return if s_ty.is_void() && t_ty.is_void() {
                s
            } else {
                self.ctx.failure_type()
            };
        }
        if matches!(s_ty, Type::NoneType) {
            return t;
        }
        if matches!(t_ty, Type::NoneType) {
            return s;
        }
        if matches!(s_ty, Type::Unresolved) || matches!(t_ty, Type::Unresolved) {
            // An unresolved name degrades the join to full dynamism.
            return self.ctx.dynamic_type();
        }

        // Guard against self-referential generic graphs: a repeat of an
        // in-progress pair short-circuits to the top type.
        let key = if s <= t { (s, t) } else { (t, s) };
        if !self.in_progress.insert(key) {
            return self.basics.object;
        }
        let result = self.join_concrete(s, s_ty, t, t_ty);
        self.in_progress.remove(&key);
        result
    }

    /// Join two value-bearing types; every degenerate kind has already
    /// been dealt with.
    fn join_concrete(&mut self, s: TypeId, s_ty: Type, t: TypeId, t_ty: Type) -> TypeId {
        match (s_ty, t_ty) {
            // Equal ids denote the same variable even when the display
            // names drift; the first-interned operand is the canonical
            // one, keeping the result order-independent.
            (Type::Var(a), Type::Var(b)) if a.id == b.id => s.min(t),

            (Type::Instance(_), Type::Instance(_)) => self.join_instances(s, t),

            (Type::Function(sf), Type::Function(tf)) => {
                if self.is_similar_callables(&sf, &tf) {
                    self.combine_similar_callables(&tf, &sf)
                } else if (tf.is_constructor && self.is_subtype(s, self.basics.type_type))
                    || (sf.is_constructor && self.is_subtype(t, self.basics.type_type))
                {
                    self.basics.type_type
                } else {
                    self.basics.object
                }
            }

            (Type::Instance(_), Type::Function(f)) => self.join_instance_function(s, &f),
            (Type::Function(f), Type::Instance(_)) => self.join_instance_function(t, &f),

            (Type::Tuple(st), Type::Tuple(tt)) if st.elements.len() == tt.elements.len() => {
                let mut elements = Vec::with_capacity(st.elements.len());
                for (&a, &b) in st.elements.iter().zip(&tt.elements) {
                    elements.push(self.join(a, b));
                }
                self.ctx.tuple_type(elements)
            }

            // No structural join applies (this includes tuples of
            // differing arity): fall back to the top type.
            _ => self.basics.object,
        }
    }

    /// Join a class instance with a function type: a constructor meets the
    /// meta-type, anything else falls back to the top type.
    fn join_instance_function(&mut self, inst: TypeId, func: &FunctionType) -> TypeId {
        let is_meta = self
            .ctx
            .ty(inst)
            .as_instance()
            .is_some_and(|i| i.class == self.ctx.type_class());
        if func.is_constructor && (is_meta || self.is_subtype(inst, self.basics.type_type)) {
            self.basics.type_type
        } else {
            self.basics.object
        }
    }

    /// Calculate the join of two instance types
    ///
    /// Never produces the failure sentinel unless the subtype oracle is
    /// inconsistent with the class hierarchy.
    fn join_instances(&mut self, s: TypeId, t: TypeId) -> TypeId {
        let (Some(si), Some(ti)) = (
            self.ctx.ty(s).as_instance().cloned(),
            self.ctx.ty(t).as_instance().cloned(),
        ) else {
            return self.basics.object;
        };

        if si.class == ti.class {
            // Same class: combine type arguments if the instantiations are
            // compatible in either direction, since each argument pair is
            // joined to the wider side anyway.
            if self.is_subtype(s, t) || self.is_subtype(t, s) {
                let mut args = Vec::with_capacity(si.args.len());
                for (&a, &b) in si.args.iter().zip(&ti.args) {
                    args.push(self.join(a, b));
                }
                self.ctx.instance_type(si.class, args)
            } else {
                // Incompatible instantiations of the same class.
                self.basics.object
            }
        } else if !self.ctx.class_def(si.class).bases.is_empty() && self.is_subtype(s, t) {
            self.join_instances_via_supertype(s, t)
        } else {
            // Either t is the potential subtype, or the two are unrelated;
            // climbing t's hierarchy covers both (it ends at the top type).
            self.join_instances_via_supertype(t, s)
        }
    }

    /// Search for a common ancestor by climbing the first operand's
    /// hierarchy toward the second.
    fn join_instances_via_supertype(&mut self, s: TypeId, t: TypeId) -> TypeId {
        let (Some(si), Some(ti)) = (
            self.ctx.ty(s).as_instance().cloned(),
            self.ctx.ty(t).as_instance().cloned(),
        ) else {
            return self.basics.object;
        };

        // Give preference to joins via the duck typing relationship, so
        // that join(int, float) == float, for example.
        if let Some(duck) = self.ctx.class_def(si.class).ducktype {
            if self.is_subtype(duck, t) {
                return self.join(duck, t);
            }
        }
        if let Some(duck) = self.ctx.class_def(ti.class).ducktype {
            if self.is_subtype(duck, s) {
                return self.join(s, duck);
            }
        }

        // Only the primary (first declared) base is walked; later bases
        // are metadata and never participate in the ancestor search.
        let Some(&primary) = self.ctx.class_def(si.class).bases.first() else {
            return self.basics.object;
        };
        let Some(primary_class) = self.ctx.ty(primary).as_instance().map(|i| i.class) else {
            return self.basics.object;
        };

        let mapped = {
            let mut sub_ctx = SubtypingContext::new(&mut *self.ctx);
            sub_ctx.map_instance_to_supertype(s, primary_class)
        };
        let Some(mapped) = mapped else {
            return self.basics.object;
        };

        // If the recursive join failed, propagate the failure rather than
        // asserting the result is an instance. Unreachable for a
        // consistent hierarchy and oracle.
        let joined = self.join_instances(mapped, t);
        debug_assert!(matches!(
            self.ctx.ty(joined),
            Type::Instance(_) | Type::Failure
        ));
        joined
    }

    /// Check whether two function types are combinable: identical argument
    /// shape (count, kinds, minimum count, variadic flag) and every
    /// argument and return pair compatible in at least one direction, so
    /// each pairwise join lands on one of its operands
    fn is_similar_callables(&mut self, sf: &FunctionType, tf: &FunctionType) -> bool {
        if tf.arg_types.len() != sf.arg_types.len()
            || tf.min_args != sf.min_args
            || tf.is_var_arg != sf.is_var_arg
            || tf.arg_kinds != sf.arg_kinds
        {
            return false;
        }
        for (&a, &b) in tf.arg_types.iter().zip(&sf.arg_types) {
            if !self.is_compatible_either_way(a, b) {
                return false;
            }
        }
        self.is_compatible_either_way(tf.ret_type, sf.ret_type)
    }

    /// Combine two similar function types into one whose arguments and
    /// return type are pairwise joins
    ///
    /// Argument names are kept only where both sides agree (otherwise
    /// anonymized), and the generic parameter list is kept only when
    /// identical, so the combination is order-independent.
    fn combine_similar_callables(&mut self, t: &FunctionType, s: &FunctionType) -> TypeId {
        let mut arg_types = Vec::with_capacity(t.arg_types.len());
        for (&a, &b) in t.arg_types.iter().zip(&s.arg_types) {
            arg_types.push(self.join(a, b));
        }
        let ret_type = self.join(t.ret_type, s.ret_type);

        let mut arg_names = Vec::with_capacity(t.arg_names.len());
        for (a, b) in t.arg_names.iter().zip(&s.arg_names) {
            arg_names.push(if a == b { a.clone() } else { None });
        }
        let variables = if t.variables == s.variables {
            t.variables.clone()
        } else {
            Vec::new()
        };

        self.ctx.function_type(FunctionType {
            arg_types,
            arg_kinds: t.arg_kinds.clone(),
            arg_names,
            min_args: t.min_args,
            is_var_arg: t.is_var_arg,
            ret_type,
            is_constructor: t.is_constructor && s.is_constructor,
            variables,
        })
    }

    fn is_subtype(&mut self, sub: TypeId, sup: TypeId) -> bool {
        SubtypingContext::new(&mut *self.ctx).is_subtype(sub, sup)
    }

    fn is_compatible_either_way(&mut self, a: TypeId, b: TypeId) -> bool {
        let mut sub_ctx = SubtypingContext::new(&mut *self.ctx);
        sub_ctx.is_subtype(a, b) || sub_ctx.is_subtype(b, a)
    }
}
