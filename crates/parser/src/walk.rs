use crate::ast::*;

// Core traits
pub trait Walk<'ast> {
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V);
}

pub trait WalkMut {
    fn walk_mut<V: VisitorMut + ?Sized>(&mut self, v: &mut V);
}

pub trait Visitor<'ast> {
    #[inline(always)]
    fn visit_type(&mut self, t: &'ast TypeExpr) {
        walk_type(self, t);
    }

    /// Called for every named type reference, qualified or not.
    #[inline(always)]
    fn visit_named(&mut self, _pkg: Option<&'ast str>, _name: &'ast str) {}
}

pub trait VisitorMut {
    #[inline(always)]
    fn visit_type_mut(&mut self, t: &mut TypeExpr) {
        walk_type_mut(self, t);
    }
}

pub fn walk_type<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, t: &'ast TypeExpr) {
    match t {
        TypeExpr::Named { pkg, name, args } => {
            v.visit_named(pkg.as_deref(), name);
            args.walk(v);
        }
        TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) | TypeExpr::Paren(inner) => {
            v.visit_type(inner)
        }
        TypeExpr::Array { elem, .. } | TypeExpr::Chan { elem, .. } => v.visit_type(elem),
        TypeExpr::Map { key, value } => {
            v.visit_type(key);
            v.visit_type(value);
        }
        TypeExpr::Func(sig) => sig.walk(v),
        TypeExpr::Struct(fields) => fields.walk(v),
        TypeExpr::Interface(elems) => elems.walk(v),
        TypeExpr::Union(terms) => terms.walk(v),
    }
}

pub fn walk_type_mut<V: VisitorMut + ?Sized>(v: &mut V, t: &mut TypeExpr) {
    match t {
        TypeExpr::Named { args, .. } => args.walk_mut(v),
        TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) | TypeExpr::Paren(inner) => {
            v.visit_type_mut(inner)
        }
        TypeExpr::Array { elem, .. } | TypeExpr::Chan { elem, .. } => v.visit_type_mut(elem),
        TypeExpr::Map { key, value } => {
            v.visit_type_mut(key);
            v.visit_type_mut(value);
        }
        TypeExpr::Func(sig) => sig.walk_mut(v),
        TypeExpr::Struct(fields) => fields.walk_mut(v),
        TypeExpr::Interface(elems) => elems.walk_mut(v),
        TypeExpr::Union(terms) => terms.walk_mut(v),
    }
}

impl<'ast> Walk<'ast> for TypeExpr {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        v.visit_type(self);
    }
}

impl WalkMut for TypeExpr {
    #[inline(always)]
    fn walk_mut<V: VisitorMut + ?Sized>(&mut self, v: &mut V) {
        v.visit_type_mut(self);
    }
}

// Containers
impl<'ast, T: Walk<'ast>> Walk<'ast> for Vec<T> {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        for item in self {
            item.walk(v);
        }
    }
}

impl<T: WalkMut> WalkMut for Vec<T> {
    #[inline(always)]
    fn walk_mut<V: VisitorMut + ?Sized>(&mut self, v: &mut V) {
        for item in self {
            item.walk_mut(v);
        }
    }
}

// Nodes that only carry types in one field
macro_rules! impl_walk_via {
    ($($ty:ty => |$x:ident| $field:expr),* $(,)?) => {
        $(
            impl<'ast> Walk<'ast> for $ty {
                #[inline(always)]
                fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
                    let $x = self;
                    v.visit_type(&$field);
                }
            }

            impl WalkMut for $ty {
                #[inline(always)]
                fn walk_mut<V: VisitorMut + ?Sized>(&mut self, v: &mut V) {
                    let $x = self;
                    v.visit_type_mut(&mut $field);
                }
            }
        )*
    };
}

impl_walk_via! {
    Param => |p| p.ty,
    FieldDecl => |f| f.ty,
    Term => |t| t.ty,
}

impl<'ast> Walk<'ast> for Signature {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        self.params.walk(v);
        self.results.walk(v);
    }
}

impl WalkMut for Signature {
    #[inline(always)]
    fn walk_mut<V: VisitorMut + ?Sized>(&mut self, v: &mut V) {
        self.params.walk_mut(v);
        self.results.walk_mut(v);
    }
}

impl<'ast> Walk<'ast> for InterfaceElem {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        match self {
            InterfaceElem::Method { sig, .. } => sig.walk(v),
            InterfaceElem::Embed(t) => v.visit_type(t),
        }
    }
}

impl WalkMut for InterfaceElem {
    #[inline(always)]
    fn walk_mut<V: VisitorMut + ?Sized>(&mut self, v: &mut V) {
        match self {
            InterfaceElem::Method { sig, .. } => sig.walk_mut(v),
            InterfaceElem::Embed(t) => v.visit_type_mut(t),
        }
    }
}

/// Qualifiers (`pkg` in `pkg.Name`) referenced by a node, in first-seen order.
pub fn qualifiers<'ast, T: Walk<'ast> + ?Sized>(node: &'ast T) -> Vec<&'ast str> {
    struct Collect<'ast>(Vec<&'ast str>);

    impl<'ast> Visitor<'ast> for Collect<'ast> {
        fn visit_named(&mut self, pkg: Option<&'ast str>, _name: &'ast str) {
            if let Some(pkg) = pkg {
                if !self.0.contains(&pkg) {
                    self.0.push(pkg);
                }
            }
        }
    }

    let mut c = Collect(Vec::new());
    node.walk(&mut c);
    c.0
}
