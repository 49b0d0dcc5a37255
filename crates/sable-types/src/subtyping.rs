//! Subtyping rules for the Sable type system
//!
//! Implements the subtyping relation T <: U (T is a subtype of U) over
//! interned types, plus the generic-argument rebasing operation used to
//! view an instance through one of its ancestor classes.

use crate::context::TypeContext;
use crate::ty::{ClassId, InstanceType, Type, TypeId};
use rustc_hash::FxHashMap;

/// Context for checking subtyping relationships
///
/// Holds the type context mutably because rebasing generic arguments onto
/// an ancestor class interns freshly substituted types.
#[derive(Debug)]
pub struct SubtypingContext<'a> {
    ctx: &'a mut TypeContext,
}

impl<'a> SubtypingContext<'a> {
    /// Create a new subtyping context
    pub fn new(ctx: &'a mut TypeContext) -> Self {
        SubtypingContext { ctx }
    }

    /// Check if `sub` is a subtype of `sup` (sub <: sup)
    ///
    /// Returns true if a value of type `sub` can be used where `sup` is
    /// expected.
    pub fn is_subtype(&mut self, sub: TypeId, sup: TypeId) -> bool {
        // Reflexivity: T <: T
        if sub == sup {
            return true;
        }

        let sub_ty = self.ctx.ty(sub).clone();
        let sup_ty = self.ctx.ty(sup).clone();

        match (sub_ty, sup_ty) {
            // Dynamic is compatible in both directions
            (Type::Dynamic, _) | (_, Type::Dynamic) => true,

            // Erased placeholders unify with anything
            (Type::Erased, _) | (_, Type::Erased) => true,

            // The failure sentinel is not a program type
            (Type::Failure, _) | (_, Type::Failure) => false,

            // Void only relates to itself (handled by reflexivity above)
            (Type::Void, _) | (_, Type::Void) => false,

            // The none placeholder is below every value-bearing type
            (Type::NoneType, _) => true,
            (_, Type::NoneType) => false,

            // An unresolved name is compatible with anything
            (Type::Unresolved, _) | (_, Type::Unresolved) => true,

            // Type lists are syntax, not value types
            (Type::TypeList(_), _) | (_, Type::TypeList(_)) => false,

            // Every remaining type is below the top type
            (_, Type::Instance(sup_inst)) if sup_inst.class == self.ctx.object_class() => true,

            (Type::Instance(sub_inst), Type::Instance(sup_inst)) => {
                self.instance_subtype(&sub_inst, sup, &sup_inst)
            }

            // A constructor is a value of the meta-type
            (Type::Function(f), Type::Instance(sup_inst)) => {
                f.is_constructor && sup_inst.class == self.ctx.type_class()
            }

            // Function subtyping (contravariant in arguments, covariant in
            // return type)
            (Type::Function(f1), Type::Function(f2)) => {
                if f1.arg_types.len() != f2.arg_types.len()
                    || f1.is_var_arg != f2.is_var_arg
                    || f1.min_args > f2.min_args
                {
                    return false;
                }

                for (&a1, &a2) in f1.arg_types.iter().zip(&f2.arg_types) {
                    // Note: reversed!
                    if !self.is_subtype(a2, a1) {
                        return false;
                    }
                }

                self.is_subtype(f1.ret_type, f2.ret_type)
            }

            // Tuple subtyping: same length, elementwise covariant
            (Type::Tuple(t1), Type::Tuple(t2)) => {
                if t1.elements.len() != t2.elements.len() {
                    return false;
                }

                for (&e1, &e2) in t1.elements.iter().zip(&t2.elements) {
                    if !self.is_subtype(e1, e2) {
                        return false;
                    }
                }

                true
            }

            // Type variables relate only by identity
            (Type::Var(v1), Type::Var(v2)) => v1.id == v2.id,

            // No other subtyping relationships
            _ => false,
        }
    }

    /// Check if `a` and `b` are subtypes of each other
    pub fn is_equivalent(&mut self, a: TypeId, b: TypeId) -> bool {
        self.is_subtype(a, b) && self.is_subtype(b, a)
    }

    fn instance_subtype(&mut self, sub: &InstanceType, sup: TypeId, sup_inst: &InstanceType) -> bool {
        // A declared duck type alias grants structural compatibility.
        if let Some(duck) = self.ctx.class_def(sub.class).ducktype {
            if self.is_subtype(duck, sup) {
                return true;
            }
        }

        // Rebase onto the supertype's class, then compare generic
        // arguments covariantly.
        let mapped = match self.map_instance_parts(sub, sup_inst.class) {
            Some(mapped) => mapped,
            None => return false,
        };

        for (&a, &b) in mapped.args.iter().zip(&sup_inst.args) {
            if !self.is_subtype(a, b) {
                return false;
            }
        }

        true
    }

    /// Rebase a generic instance's type arguments onto an ancestor class
    ///
    /// Returns the instance of `target` that `instance` is seen as through
    /// its declared base instantiations, or `None` when `target` is not an
    /// ancestor (or `instance` is not an instance type).
    pub fn map_instance_to_supertype(
        &mut self,
        instance: TypeId,
        target: ClassId,
    ) -> Option<TypeId> {
        let inst = self.ctx.ty(instance).as_instance()?.clone();
        if inst.class == target {
            return Some(instance);
        }
        let mapped = self.map_instance_parts(&inst, target)?;
        Some(self.ctx.instance_type(mapped.class, mapped.args))
    }

    fn map_instance_parts(&mut self, inst: &InstanceType, target: ClassId) -> Option<InstanceType> {
        if inst.class == target {
            return Some(inst.clone());
        }

        let def = self.ctx.class_def(inst.class).clone();
        let mut subst = FxHashMap::default();
        for (param, &arg) in def.type_params.iter().zip(&inst.args) {
            subst.insert(param.id, arg);
        }

        for &base in &def.bases {
            let expanded = self.expand_type(base, &subst);
            if let Some(base_inst) = self.ctx.ty(expanded).as_instance().cloned() {
                if let Some(found) = self.map_instance_parts(&base_inst, target) {
                    return Some(found);
                }
            }
        }

        None
    }

    /// Substitute type variables by id, interning any rebuilt composites
    fn expand_type(&mut self, ty: TypeId, subst: &FxHashMap<u32, TypeId>) -> TypeId {
        match self.ctx.ty(ty).clone() {
            Type::Var(v) => subst.get(&v.id).copied().unwrap_or(ty),
            Type::Instance(inst) => {
                let mut args = Vec::with_capacity(inst.args.len());
                for &arg in &inst.args {
                    args.push(self.expand_type(arg, subst));
                }
                self.ctx.instance_type(inst.class, args)
            }
            Type::Tuple(t) => {
                let mut elements = Vec::with_capacity(t.elements.len());
                for &e in &t.elements {
                    elements.push(self.expand_type(e, subst));
                }
                self.ctx.tuple_type(elements)
            }
            Type::Function(mut f) => {
                let mut arg_types = Vec::with_capacity(f.arg_types.len());
                for &a in &f.arg_types {
                    arg_types.push(self.expand_type(a, subst));
                }
                f.arg_types = arg_types;
                f.ret_type = self.expand_type(f.ret_type, subst);
                self.ctx.function_type(f)
            }
            _ => ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TypeContext;
    use crate::ty::TypeVarType;

    fn var(name: &str, id: u32) -> TypeVarType {
        TypeVarType {
            name: name.to_string(),
            id,
        }
    }

    #[test]
    fn test_reflexivity() {
        let mut ctx = TypeContext::new();
        let obj = ctx.basics().object;
        let mut sub_ctx = SubtypingContext::new(&mut ctx);

        assert!(sub_ctx.is_subtype(obj, obj));
    }

    #[test]
    fn test_object_is_top() {
        let mut ctx = TypeContext::new();
        let obj = ctx.basics().object;
        let a = ctx.register_class("A", vec![], vec![obj], None).unwrap();
        let a_inst = ctx.instance_type(a, vec![]);
        let func = ctx.simple_function_type(vec![], obj);
        let tup = ctx.tuple_type(vec![a_inst]);
        let tv = ctx.var_type("T", 1);
        let mut sub_ctx = SubtypingContext::new(&mut ctx);

        assert!(sub_ctx.is_subtype(a_inst, obj));
        assert!(sub_ctx.is_subtype(func, obj));
        assert!(sub_ctx.is_subtype(tup, obj));
        assert!(sub_ctx.is_subtype(tv, obj));
        assert!(!sub_ctx.is_subtype(obj, a_inst));
    }

    #[test]
    fn test_void_relates_only_to_itself() {
        let mut ctx = TypeContext::new();
        let obj = ctx.basics().object;
        let void = ctx.void_type();
        let none = ctx.none_type();
        let mut sub_ctx = SubtypingContext::new(&mut ctx);

        assert!(sub_ctx.is_subtype(void, void));
        assert!(!sub_ctx.is_subtype(void, obj));
        assert!(!sub_ctx.is_subtype(obj, void));
        assert!(!sub_ctx.is_subtype(none, void));
        assert!(sub_ctx.is_subtype(none, obj));
    }

    #[test]
    fn test_nominal_chain() {
        let mut ctx = TypeContext::new();
        let obj = ctx.basics().object;
        let a = ctx.register_class("A", vec![], vec![obj], None).unwrap();
        let a_inst = ctx.instance_type(a, vec![]);
        let b = ctx.register_class("B", vec![], vec![a_inst], None).unwrap();
        let b_inst = ctx.instance_type(b, vec![]);
        let c = ctx.register_class("C", vec![], vec![obj], None).unwrap();
        let c_inst = ctx.instance_type(c, vec![]);
        let mut sub_ctx = SubtypingContext::new(&mut ctx);

        assert!(sub_ctx.is_subtype(b_inst, a_inst));
        assert!(!sub_ctx.is_subtype(a_inst, b_inst));
        assert!(!sub_ctx.is_subtype(b_inst, c_inst));
        assert!(!sub_ctx.is_subtype(c_inst, a_inst));
    }

    #[test]
    fn test_generic_covariant_args() {
        let mut ctx = TypeContext::new();
        let obj = ctx.basics().object;
        let float = ctx.register_class("float", vec![], vec![obj], None).unwrap();
        let float_inst = ctx.instance_type(float, vec![]);
        let int = ctx
            .register_class("int", vec![], vec![obj], Some(float_inst))
            .unwrap();
        let int_inst = ctx.instance_type(int, vec![]);
        let list = ctx
            .register_class("List", vec![var("T", 1)], vec![obj], None)
            .unwrap();
        let list_int = ctx.instance_type(list, vec![int_inst]);
        let list_float = ctx.instance_type(list, vec![float_inst]);
        let mut sub_ctx = SubtypingContext::new(&mut ctx);

        assert!(sub_ctx.is_subtype(list_int, list_float));
        assert!(!sub_ctx.is_subtype(list_float, list_int));
    }

    #[test]
    fn test_ducktype_grants_subtyping() {
        let mut ctx = TypeContext::new();
        let obj = ctx.basics().object;
        let float = ctx.register_class("float", vec![], vec![obj], None).unwrap();
        let float_inst = ctx.instance_type(float, vec![]);
        let int = ctx
            .register_class("int", vec![], vec![obj], Some(float_inst))
            .unwrap();
        let int_inst = ctx.instance_type(int, vec![]);
        let mut sub_ctx = SubtypingContext::new(&mut ctx);

        assert!(sub_ctx.is_subtype(int_inst, float_inst));
        assert!(!sub_ctx.is_subtype(float_inst, int_inst));
    }

    #[test]
    fn test_map_instance_through_generic_base() {
        let mut ctx = TypeContext::new();
        let obj = ctx.basics().object;
        let t = var("T", 1);
        let t_ty = ctx.var_type("T", 1);
        let iterable = ctx
            .register_class("Iterable", vec![t.clone()], vec![obj], None)
            .unwrap();
        let iterable_t = ctx.instance_type(iterable, vec![t_ty]);
        let list = ctx
            .register_class("List", vec![t], vec![iterable_t], None)
            .unwrap();
        let int = ctx.register_class("int", vec![], vec![obj], None).unwrap();
        let int_inst = ctx.instance_type(int, vec![]);
        let list_int = ctx.instance_type(list, vec![int_inst]);

        let expected = ctx.instance_type(iterable, vec![int_inst]);
        let mut sub_ctx = SubtypingContext::new(&mut ctx);
        let mapped = sub_ctx.map_instance_to_supertype(list_int, iterable);
        assert_eq!(mapped, Some(expected));
    }

    #[test]
    fn test_is_equivalent() {
        let mut ctx = TypeContext::new();
        let obj = ctx.basics().object;
        let a = ctx.register_class("A", vec![], vec![obj], None).unwrap();
        let a_inst = ctx.instance_type(a, vec![]);
        let dynamic = ctx.dynamic_type();
        let mut sub_ctx = SubtypingContext::new(&mut ctx);

        assert!(sub_ctx.is_equivalent(a_inst, a_inst));
        assert!(sub_ctx.is_equivalent(a_inst, dynamic));
        assert!(!sub_ctx.is_equivalent(a_inst, obj));
    }

    #[test]
    fn test_map_instance_not_an_ancestor() {
        let mut ctx = TypeContext::new();
        let obj = ctx.basics().object;
        let a = ctx.register_class("A", vec![], vec![obj], None).unwrap();
        let a_inst = ctx.instance_type(a, vec![]);
        let b = ctx.register_class("B", vec![], vec![obj], None).unwrap();
        let mut sub_ctx = SubtypingContext::new(&mut ctx);

        assert_eq!(sub_ctx.map_instance_to_supertype(a_inst, b), None);
    }

    #[test]
    fn test_function_subtyping_contravariance() {
        let mut ctx = TypeContext::new();
        let obj = ctx.basics().object;
        let float = ctx.register_class("float", vec![], vec![obj], None).unwrap();
        let float_inst = ctx.instance_type(float, vec![]);
        let int = ctx
            .register_class("int", vec![], vec![obj], Some(float_inst))
            .unwrap();
        let int_inst = ctx.instance_type(int, vec![]);

        // (float) -> int  <:  (int) -> float
        let f1 = ctx.simple_function_type(vec![float_inst], int_inst);
        let f2 = ctx.simple_function_type(vec![int_inst], float_inst);
        let mut sub_ctx = SubtypingContext::new(&mut ctx);

        assert!(sub_ctx.is_subtype(f1, f2));
        assert!(!sub_ctx.is_subtype(f2, f1));
    }

    #[test]
    fn test_constructor_below_meta_type() {
        let mut ctx = TypeContext::new();
        let basics = ctx.basics();
        let obj = basics.object;
        let plain = ctx.simple_function_type(vec![], obj);
        let ctor = {
            let mut f = ctx.ty(plain).as_function().cloned().unwrap();
            f.is_constructor = true;
            ctx.function_type(f)
        };
        let mut sub_ctx = SubtypingContext::new(&mut ctx);

        assert!(sub_ctx.is_subtype(ctor, basics.type_type));
        assert!(!sub_ctx.is_subtype(plain, basics.type_type));
    }
}
