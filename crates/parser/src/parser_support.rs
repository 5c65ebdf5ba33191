use crate::ast::{Param, TypeExpr};
use crate::error::{Diag, Span};
use smallvec::SmallVec;

/// One comma-separated entry of a parameter list before grouping.
///
/// `a` alone is ambiguous: it is either a parameter name waiting for the type
/// of a later entry (`a, b int`) or a type on its own (`int, string`).
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub names: SmallVec<[String; 2]>,
    pub variadic: bool,
    pub typ: Option<TypeExpr>,
    pub span: Span,
}

/// Groups raw entries following Go's rule that a list is either fully named
/// or fully unnamed.
pub fn resolve_param_list(params: Vec<ParamDecl>) -> Result<Vec<Param>, Diag> {
    let any_named = params.iter().any(|p| !p.names.is_empty() && p.typ.is_some());

    if !any_named {
        // Every bare identifier is a type.
        return params
            .into_iter()
            .map(|param| {
                let ty = match param.typ {
                    Some(ty) => ty,
                    None => named_type_from_ident(param.names),
                };
                Ok(Param {
                    names: SmallVec::new(),
                    variadic: param.variadic,
                    ty,
                })
            })
            .collect();
    }

    let mut out = Vec::new();
    let mut pending_names: SmallVec<[String; 2]> = SmallVec::new();

    for param in params {
        match param.typ {
            Some(_) if param.names.is_empty() => {
                return Err(Diag::parse(param.span, "mixed named and unnamed parameters"));
            }
            Some(ty) => {
                let mut names = std::mem::take(&mut pending_names);
                names.extend(param.names);
                out.push(Param {
                    names,
                    variadic: param.variadic,
                    ty,
                });
            }
            None => pending_names.extend(param.names),
        }
    }

    if !pending_names.is_empty() {
        return Err(Diag::parse(
            Span::default(),
            format!("missing type for parameter `{}`", pending_names.join(", ")),
        ));
    }

    Ok(out)
}

fn named_type_from_ident(mut names: SmallVec<[String; 2]>) -> TypeExpr {
    TypeExpr::named(names.pop().unwrap_or_default())
}
