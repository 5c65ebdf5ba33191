//! Interface Synthesizer.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::*;
use interfacegen_parser::ast::{is_exported, Signature, TypeExpr};
use interfacegen_parser::walk::{walk_type_mut, VisitorMut, WalkMut};
use std::collections::HashMap;
use tracing::debug;

/// Derives one interface per retained type, in declaration order.
pub fn synthesize(scan: &ScanResult, config: &Config) -> Result<Vec<InterfaceSpec>> {
    let mut out = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (pkg_idx, pkg) in scan.packages.iter().enumerate() {
        let mut groups: Vec<Vec<&MethodDecl>> = vec![Vec::new(); pkg.types.len()];
        for method in &pkg.methods {
            match method.owner.and_then(|owner| groups.get_mut(owner)) {
                Some(group) => group.push(method),
                None => debug!(
                    package = %pkg.import_path,
                    receiver = %method.receiver,
                    method = %method.name,
                    "dropping method with unresolved receiver"
                ),
            }
        }

        for (decl, mut methods) in pkg.types.iter().zip(groups) {
            if decl.skip {
                debug!(type_name = %decl.name, "type skipped by directive");
                continue;
            }
            if config.exported_only && !decl.exported {
                debug!(type_name = %decl.name, "type not exported");
                continue;
            }

            methods.retain(|m| {
                if m.skip {
                    debug!(type_name = %decl.name, method = %m.name, "method skipped by directive");
                    return false;
                }
                !config.exported_only || is_exported(&m.name)
            });
            if methods.is_empty() {
                debug!(type_name = %decl.name, "no methods retained");
                continue;
            }
            methods.sort_by_key(|m| m.order);

            if let Some(&first) = seen.get(&decl.name) {
                return Err(Error::DuplicateInterface {
                    name: decl.name.clone(),
                    first: scan.packages[first].import_path.clone(),
                    second: pkg.import_path.clone(),
                });
            }
            seen.insert(decl.name.clone(), pkg_idx);

            let methods = methods
                .into_iter()
                .map(|m| {
                    debug!(
                        type_name = %decl.name,
                        method = %m.name,
                        qualifiers = ?m.qualifiers,
                        "retained {}{} {}",
                        m.name,
                        m.raw_params,
                        m.raw_results
                    );
                    InterfaceMethod {
                        name: m.name.clone(),
                        doc: if config.include_docs { m.doc.clone() } else { Vec::new() },
                        sig: rename_receiver_args(decl, m),
                        file: m.file,
                        order: m.order,
                    }
                })
                .collect();

            out.push(InterfaceSpec {
                name: decl.name.clone(),
                doc: if config.include_docs { decl.doc.clone() } else { Vec::new() },
                type_params: decl.type_params.clone(),
                methods,
                package: pkg_idx,
                order: decl.order,
            });
        }
    }

    out.sort_by_key(|spec| spec.order);
    Ok(out)
}

/// Signature of `method` with receiver type arguments spelled the way the
/// owning declaration names its type parameters.
fn rename_receiver_args(decl: &TypeDecl, method: &MethodDecl) -> Signature {
    let mut sig = method.sig.clone();

    let params = decl.type_params.iter().flat_map(|p| p.names.iter());
    let renames: HashMap<&str, &str> = method
        .receiver_type_args
        .iter()
        .zip(params)
        .filter(|(arg, param)| arg.as_str() != "_" && arg != param)
        .map(|(arg, param)| (arg.as_str(), param.as_str()))
        .collect();
    if renames.is_empty() {
        return sig;
    }

    struct Rename<'a>(&'a HashMap<&'a str, &'a str>);

    impl VisitorMut for Rename<'_> {
        fn visit_type_mut(&mut self, t: &mut TypeExpr) {
            if let TypeExpr::Named {
                pkg: None, name, ..
            } = t
            {
                if let Some(to) = self.0.get(name.as_str()) {
                    *name = (*to).to_string();
                }
            }
            walk_type_mut(self, t);
        }
    }

    sig.walk_mut(&mut Rename(&renames));
    sig
}

#[cfg(test)]
mod tests {
    use super::*;
    use interfacegen_parser::ast::{Param, ReceiverKind};
    use std::path::PathBuf;

    fn type_decl(name: &str, order: usize) -> TypeDecl {
        TypeDecl {
            name: name.into(),
            doc: vec![format!("// {name} doc")],
            skip: false,
            order,
            exported: is_exported(name),
            type_params: Vec::new(),
            pos: Pos::default(),
        }
    }

    fn method(owner: usize, name: &str, order: usize) -> MethodDecl {
        MethodDecl {
            receiver: String::new(),
            receiver_kind: ReceiverKind::Pointer,
            receiver_type_args: Vec::new(),
            owner: Some(owner),
            name: name.into(),
            doc: vec![format!("// {name} doc")],
            skip: false,
            sig: Signature::default(),
            raw_params: "()".into(),
            raw_results: String::new(),
            qualifiers: Vec::new(),
            order,
            file: 0,
            pos: Pos::default(),
        }
    }

    fn package(path: &str, types: Vec<TypeDecl>, methods: Vec<MethodDecl>) -> PackageScan {
        PackageScan {
            dir: PathBuf::from(path),
            import_path: path.into(),
            name: "foo".into(),
            files: Vec::new(),
            types,
            methods,
        }
    }

    fn names(specs: &[InterfaceSpec]) -> Vec<(String, Vec<String>)> {
        specs
            .iter()
            .map(|s| (s.name.clone(), s.methods.iter().map(|m| m.name.clone()).collect()))
            .collect()
    }

    #[test]
    fn type_skip_dominates_method_flags() {
        let mut foo = type_decl("Foo", 0);
        foo.skip = true;
        let scan = ScanResult {
            packages: vec![package(
                "foo",
                vec![foo, type_decl("Bar", 2)],
                vec![method(0, "Name", 1), method(1, "Age", 3)],
            )],
        };
        let specs = synthesize(&scan, &Config::new("out.go")).unwrap();
        assert_eq!(names(&specs), [("Bar".to_string(), vec!["Age".to_string()])]);
    }

    #[test]
    fn method_skip_is_local_and_empty_groups_vanish() {
        let mut incr = method(0, "Incr", 2);
        incr.skip = true;
        let mut only = method(1, "Only", 4);
        only.skip = true;
        let scan = ScanResult {
            packages: vec![package(
                "foo",
                vec![type_decl("Foo", 0), type_decl("Empty", 3), type_decl("NoMethods", 5)],
                vec![method(0, "Val", 1), incr, only],
            )],
        };
        let specs = synthesize(&scan, &Config::new("out.go")).unwrap();
        assert_eq!(names(&specs), [("Foo".to_string(), vec!["Val".to_string()])]);
    }

    #[test]
    fn declaration_order_wins_and_unexported_methods_stay_by_default() {
        let scan = ScanResult {
            packages: vec![package(
                "foo",
                vec![type_decl("B", 0), type_decl("A", 1)],
                vec![method(1, "zeta", 5), method(0, "Second", 4), method(1, "Alpha", 6), method(0, "First", 2)],
            )],
        };
        let specs = synthesize(&scan, &Config::new("out.go")).unwrap();
        assert_eq!(
            names(&specs),
            [
                ("B".to_string(), vec!["First".to_string(), "Second".to_string()]),
                ("A".to_string(), vec!["zeta".to_string(), "Alpha".to_string()]),
            ]
        );
    }

    #[test]
    fn exported_only_filters_types_and_methods() {
        let scan = ScanResult {
            packages: vec![package(
                "foo",
                vec![type_decl("client", 0), type_decl("Server", 1)],
                vec![method(0, "Do", 2), method(1, "serve", 3), method(1, "Close", 4)],
            )],
        };
        let mut config = Config::new("out.go");
        config.exported_only = true;
        let specs = synthesize(&scan, &config).unwrap();
        assert_eq!(names(&specs), [("Server".to_string(), vec!["Close".to_string()])]);
    }

    #[test]
    fn docs_are_dropped_when_disabled() {
        let scan = ScanResult {
            packages: vec![package("foo", vec![type_decl("Foo", 0)], vec![method(0, "Name", 1)])],
        };
        let mut config = Config::new("out.go");
        let with_docs = synthesize(&scan, &config).unwrap();
        assert_eq!(with_docs[0].doc, ["// Foo doc"]);
        assert_eq!(with_docs[0].methods[0].doc, ["// Name doc"]);

        config.include_docs = false;
        let specs = synthesize(&scan, &config).unwrap();
        assert!(specs[0].doc.is_empty());
        assert!(specs[0].methods[0].doc.is_empty());
        assert_eq!(specs[0].methods[0].sig, with_docs[0].methods[0].sig);
    }

    #[test]
    fn receiver_type_args_take_declared_names() {
        let mut list = type_decl("List", 0);
        list.type_params = vec![Param::named(["T"], TypeExpr::named("any"))];
        let mut push = method(0, "Push", 1);
        push.receiver_type_args = vec!["E".into()];
        push.sig = Signature {
            params: vec![Param::named(["v"], TypeExpr::named("E"))],
            results: vec![Param::unnamed(TypeExpr::Slice(Box::new(TypeExpr::named("E"))))],
        };

        let scan = ScanResult {
            packages: vec![package("foo", vec![list], vec![push])],
        };
        let specs = synthesize(&scan, &Config::new("out.go")).unwrap();
        assert_eq!(
            specs[0].methods[0].sig,
            Signature {
                params: vec![Param::named(["v"], TypeExpr::named("T"))],
                results: vec![Param::unnamed(TypeExpr::Slice(Box::new(TypeExpr::named("T"))))],
            }
        );
        assert_eq!(specs[0].type_params.len(), 1);
    }

    #[test]
    fn duplicate_names_across_packages_fail() {
        let scan = ScanResult {
            packages: vec![
                package("foo", vec![type_decl("Store", 0)], vec![method(0, "Get", 1)]),
                package("foo/sub", vec![type_decl("Store", 2)], vec![method(0, "Put", 3)]),
            ],
        };
        let err = synthesize(&scan, &Config::new("out.go")).unwrap_err();
        assert!(matches!(err, Error::DuplicateInterface { ref name, .. } if name == "Store"));
    }
}
