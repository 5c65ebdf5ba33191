//! Canonical rendering of type expressions and signatures, laid out the way
//! `gofmt` prints them on a single line.

use crate::ast::*;
use std::fmt::Write;

pub fn print_type(ty: &TypeExpr) -> String {
    let mut out = String::new();
    write_type(&mut out, ty);
    out
}

/// `(a, b int, opts ...Option) (T, error)`
pub fn print_signature(sig: &Signature) -> String {
    let mut out = String::new();
    write_signature(&mut out, sig);
    out
}

/// `a, b int, opts ...Option`
pub fn print_params(params: &[Param]) -> String {
    let mut out = String::new();
    write_params(&mut out, params);
    out
}

/// `[K comparable, V any]`; empty when there are no type parameters.
pub fn print_type_params(params: &[Param]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let mut out = String::from("[");
    write_params(&mut out, params);
    out.push(']');
    out
}

fn write_type(out: &mut String, ty: &TypeExpr) {
    match ty {
        TypeExpr::Named { pkg, name, args } => {
            if let Some(pkg) = pkg {
                out.push_str(pkg);
                out.push('.');
            }
            out.push_str(name);
            if !args.is_empty() {
                out.push('[');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_type(out, arg);
                }
                out.push(']');
            }
        }
        TypeExpr::Pointer(inner) => {
            out.push('*');
            write_type(out, inner);
        }
        TypeExpr::Slice(elem) => {
            out.push_str("[]");
            write_type(out, elem);
        }
        TypeExpr::Array { len, elem } => {
            let _ = write!(out, "[{len}]");
            write_type(out, elem);
        }
        TypeExpr::Map { key, value } => {
            out.push_str("map[");
            write_type(out, key);
            out.push(']');
            write_type(out, value);
        }
        TypeExpr::Chan { dir, elem } => {
            out.push_str(match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            });
            write_type(out, elem);
        }
        TypeExpr::Func(sig) => {
            out.push_str("func");
            write_signature(out, sig);
        }
        TypeExpr::Struct(fields) => {
            if fields.is_empty() {
                out.push_str("struct{}");
                return;
            }
            out.push_str("struct{ ");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                if !field.names.is_empty() {
                    out.push_str(&field.names.join(", "));
                    out.push(' ');
                }
                write_type(out, &field.ty);
                if let Some(tag) = &field.tag {
                    out.push(' ');
                    out.push_str(tag);
                }
            }
            out.push_str(" }");
        }
        TypeExpr::Interface(elems) => {
            if elems.is_empty() {
                out.push_str("interface{}");
                return;
            }
            out.push_str("interface{ ");
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                match elem {
                    InterfaceElem::Method { name, sig } => {
                        out.push_str(name);
                        write_signature(out, sig);
                    }
                    InterfaceElem::Embed(ty) => write_type(out, ty),
                }
            }
            out.push_str(" }");
        }
        TypeExpr::Union(terms) => {
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                if term.tilde {
                    out.push('~');
                }
                write_type(out, &term.ty);
            }
        }
        TypeExpr::Paren(inner) => {
            out.push('(');
            write_type(out, inner);
            out.push(')');
        }
    }
}

fn write_signature(out: &mut String, sig: &Signature) {
    out.push('(');
    write_params(out, &sig.params);
    out.push(')');

    match sig.results.as_slice() {
        [] => {}
        [single] if single.names.is_empty() => {
            out.push(' ');
            write_type(out, &single.ty);
        }
        results => {
            out.push_str(" (");
            write_params(out, results);
            out.push(')');
        }
    }
}

fn write_params(out: &mut String, params: &[Param]) {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if !param.names.is_empty() {
            out.push_str(&param.names.join(", "));
            out.push(' ');
        }
        if param.variadic {
            out.push_str("...");
        }
        write_type(out, &param.ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_unnamed_result_is_bare() {
        let sig = Signature {
            params: vec![Param::named(["name"], TypeExpr::named("string"))],
            results: vec![Param::unnamed(TypeExpr::named("error"))],
        };
        assert_eq!(print_signature(&sig), "(name string) error");
    }

    #[test]
    fn multiple_results_are_parenthesized() {
        let sig = Signature {
            params: Vec::new(),
            results: vec![
                Param::unnamed(TypeExpr::qualified("foo", "Str")),
                Param::unnamed(TypeExpr::pointer(TypeExpr::qualified("r8", "BoolCmd"))),
            ],
        };
        assert_eq!(print_signature(&sig), "() (foo.Str, *r8.BoolCmd)");
    }

    #[test]
    fn composite_types() {
        let ch = TypeExpr::Chan {
            dir: ChanDir::Recv,
            elem: Box::new(TypeExpr::Map {
                key: Box::new(TypeExpr::named("string")),
                value: Box::new(TypeExpr::Slice(Box::new(TypeExpr::named("byte")))),
            }),
        };
        assert_eq!(print_type(&ch), "<-chan map[string][]byte");

        let iface = TypeExpr::Interface(vec![
            InterfaceElem::Method {
                name: "Close".into(),
                sig: Signature {
                    params: Vec::new(),
                    results: vec![Param::unnamed(TypeExpr::named("error"))],
                },
            },
            InterfaceElem::Embed(TypeExpr::qualified("io", "Reader")),
        ]);
        assert_eq!(print_type(&iface), "interface{ Close() error; io.Reader }");
        assert_eq!(print_type(&TypeExpr::Struct(Vec::new())), "struct{}");
    }

    #[test]
    fn type_params_and_unions() {
        let params = vec![
            Param::named(["K"], TypeExpr::named("comparable")),
            Param::named(
                ["V"],
                TypeExpr::Union(vec![
                    Term {
                        tilde: true,
                        ty: TypeExpr::named("int"),
                    },
                    Term {
                        tilde: false,
                        ty: TypeExpr::named("string"),
                    },
                ]),
            ),
        ];
        assert_eq!(print_type_params(&params), "[K comparable, V ~int | string]");
        assert_eq!(print_type_params(&[]), "");
    }

    #[test]
    fn variadic_params() {
        let mut opts = Param::named(["opts"], TypeExpr::named("Option"));
        opts.variadic = true;
        let params = vec![Param::named(["a", "b"], TypeExpr::named("int")), opts];
        assert_eq!(print_params(&params), "a, b int, opts ...Option");
    }
}
