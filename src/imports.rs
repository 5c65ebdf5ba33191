//! Import Resolver.
//!
//! Classifies every identifier referenced by the retained signatures, copies
//! the source bindings they need, synthesizes self-imports for local types
//! when the output lives in another package, and rejects alias collisions.

use crate::error::{Error, Result};
use crate::model::*;
use interfacegen_parser::ast::{assumed_package_name, is_exported, is_predeclared_type, TypeExpr};
use interfacegen_parser::walk::{walk_type_mut, Visitor, VisitorMut, Walk, WalkMut};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Identifier referenced by a signature, qualified or not.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reference {
    pkg: Option<String>,
    name: String,
}

fn references<'ast, T: Walk<'ast> + ?Sized>(node: &'ast T) -> Vec<Reference> {
    struct Collect(Vec<Reference>);

    impl<'ast> Visitor<'ast> for Collect {
        fn visit_named(&mut self, pkg: Option<&'ast str>, name: &'ast str) {
            let r = Reference {
                pkg: pkg.map(str::to_string),
                name: name.to_string(),
            };
            if !self.0.contains(&r) {
                self.0.push(r);
            }
        }
    }

    let mut c = Collect(Vec::new());
    node.walk(&mut c);
    c.0
}

/// Import list for `specs`, rewriting local type references in place.
///
/// `dst_identity` is the import path of the destination package when it
/// lives inside the module.
pub fn resolve(
    specs: &mut [InterfaceSpec],
    scan: &ScanResult,
    dst_identity: Option<&str>,
) -> Result<Vec<ResolvedImport>> {
    let mut needs_self = vec![false; scan.packages.len()];
    let mut externals: Vec<ResolvedImport> = Vec::new();

    // Scan order decides first-seen order.
    let mut visits: Vec<(usize, usize)> = specs
        .iter()
        .enumerate()
        .flat_map(|(s, spec)| (0..spec.methods.len()).map(move |m| (s, m)))
        .collect();
    visits.sort_by_key(|&(s, m)| specs[s].methods[m].order);

    for (s, m) in visits {
        let spec = &specs[s];
        let method = &spec.methods[m];
        let Some(pkg) = scan.packages.get(spec.package) else {
            continue;
        };
        let bindings = pkg
            .files
            .get(method.file)
            .map_or(&[][..], |f| f.imports.as_slice());
        let same_package = dst_identity == Some(pkg.import_path.as_str());
        let is_type_param = |name: &str| {
            spec.type_params
                .iter()
                .any(|p| p.names.iter().any(|n| n == name))
        };

        for r in references(&method.sig) {
            match &r.pkg {
                Some(qualifier) => {
                    let binding = bindings.iter().find(|b| {
                        !b.is_dot() && !b.is_blank() && b.effective_name() == *qualifier
                    });
                    match binding {
                        Some(binding) => add_external(&mut externals, binding),
                        None => warn!(
                            interface = %spec.name,
                            method = %method.name,
                            qualifier = %qualifier,
                            "no import binding for qualifier"
                        ),
                    }
                }
                None if is_type_param(&r.name) => {}
                None if pkg.type_named(&r.name).is_some() => {
                    if same_package {
                        continue;
                    }
                    needs_self[spec.package] = true;
                    if !is_exported(&r.name) {
                        warn!(
                            interface = %spec.name,
                            method = %method.name,
                            type_name = %r.name,
                            "unexported type referenced from another package"
                        );
                    }
                }
                None if is_predeclared_type(&r.name) => {}
                None => {
                    let dots: Vec<_> = bindings.iter().filter(|b| b.is_dot()).collect();
                    if dots.is_empty() {
                        warn!(
                            interface = %spec.name,
                            method = %method.name,
                            ident = %r.name,
                            "unresolved identifier"
                        );
                    }
                    for binding in dots {
                        add_external(&mut externals, binding);
                    }
                }
            }
        }
    }

    let mut imports = Vec::new();
    for (idx, pkg) in scan.packages.iter().enumerate() {
        if !needs_self[idx] {
            continue;
        }
        qualify_locals(specs, idx, pkg);
        let alias = (pkg.name != assumed_package_name(&pkg.import_path)).then(|| pkg.name.clone());
        debug!(path = %pkg.import_path, alias = ?alias, "self-import");
        imports.push(ResolvedImport {
            path: pkg.import_path.clone(),
            alias,
            is_self: true,
        });
    }

    externals.retain(|ext| {
        !imports
            .iter()
            .any(|own: &ResolvedImport| own.path == ext.path && own.effective_name() == ext.effective_name())
    });
    imports.extend(externals);

    check_collisions(&imports)?;
    Ok(imports)
}

fn add_external(externals: &mut Vec<ResolvedImport>, binding: &ImportBinding) {
    let name = binding.effective_name();
    let dup = externals
        .iter()
        .any(|e| e.path == binding.path && e.effective_name() == name);
    if !dup {
        debug!(path = %binding.path, alias = ?binding.alias, "import");
        externals.push(binding.into());
    }
}

/// Two different paths may never share a name in the generated file.
fn check_collisions(imports: &[ResolvedImport]) -> Result<()> {
    let mut names: HashMap<String, &str> = HashMap::new();
    for import in imports {
        if import.alias.as_deref() == Some(".") {
            continue;
        }
        let name = import.effective_name();
        match names.get(&name) {
            Some(&first) if first != import.path => {
                return Err(Error::ImportAmbiguity {
                    alias: name,
                    first: first.to_string(),
                    second: import.path.clone(),
                });
            }
            Some(_) => {}
            None => {
                names.insert(name, &import.path);
            }
        }
    }
    Ok(())
}

/// Qualifies unqualified references to `pkg`'s types with its package name.
fn qualify_locals(specs: &mut [InterfaceSpec], pkg_idx: usize, pkg: &PackageScan) {
    struct Qualify<'a> {
        locals: &'a HashSet<&'a str>,
        shadowed: HashSet<String>,
        qualifier: &'a str,
    }

    impl VisitorMut for Qualify<'_> {
        fn visit_type_mut(&mut self, t: &mut TypeExpr) {
            if let TypeExpr::Named { pkg: pkg @ None, name, .. } = t {
                if self.locals.contains(name.as_str()) && !self.shadowed.contains(name.as_str()) {
                    *pkg = Some(self.qualifier.to_string());
                }
            }
            walk_type_mut(self, t);
        }
    }

    let locals: HashSet<&str> = pkg.types.iter().map(|t| t.name.as_str()).collect();
    for spec in specs.iter_mut().filter(|s| s.package == pkg_idx) {
        let mut visitor = Qualify {
            locals: &locals,
            shadowed: spec
                .type_params
                .iter()
                .flat_map(|p| p.names.iter().cloned())
                .collect(),
            qualifier: &pkg.name,
        };
        for method in &mut spec.methods {
            method.sig.walk_mut(&mut visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interfacegen_parser::ast::{Param, Signature};
    use interfacegen_parser::printer::print_signature;
    use std::path::PathBuf;

    fn ty_decl(name: &str) -> TypeDecl {
        TypeDecl {
            name: name.into(),
            doc: Vec::new(),
            skip: false,
            order: 0,
            exported: is_exported(name),
            type_params: Vec::new(),
            pos: Pos::default(),
        }
    }

    fn package(import_path: &str, name: &str, types: &[&str], imports: Vec<ImportBinding>) -> PackageScan {
        PackageScan {
            dir: PathBuf::from(import_path),
            import_path: import_path.into(),
            name: name.into(),
            files: vec![FileScan {
                path: PathBuf::from("main.go"),
                imports,
            }],
            types: types.iter().map(|t| ty_decl(t)).collect(),
            methods: Vec::new(),
        }
    }

    fn results(types: Vec<TypeExpr>) -> Signature {
        Signature {
            params: Vec::new(),
            results: types.into_iter().map(Param::unnamed).collect(),
        }
    }

    fn spec(name: &str, package: usize, methods: Vec<(&str, Signature)>) -> InterfaceSpec {
        InterfaceSpec {
            name: name.into(),
            doc: Vec::new(),
            type_params: Vec::new(),
            methods: methods
                .into_iter()
                .enumerate()
                .map(|(order, (name, sig))| InterfaceMethod {
                    name: name.into(),
                    doc: Vec::new(),
                    sig,
                    file: 0,
                    order,
                })
                .collect(),
            package,
            order: 0,
        }
    }

    fn redis_scan() -> ScanResult {
        ScanResult {
            packages: vec![package(
                "foo",
                "foo",
                &["FooClient", "Str"],
                vec![
                    ImportBinding::new("github.com/go-redis/redis/v8", Some("r8")),
                    ImportBinding::new("github.com/redis/go-redis/v9", Some("r9")),
                    ImportBinding::new("golang.org/x/tools/imports", None),
                ],
            )],
        }
    }

    fn redis_specs() -> Vec<InterfaceSpec> {
        vec![spec(
            "FooClient",
            0,
            vec![
                (
                    "ThingA",
                    results(vec![
                        TypeExpr::named("Str"),
                        TypeExpr::pointer(TypeExpr::qualified("r8", "BoolCmd")),
                    ]),
                ),
                (
                    "ThingB",
                    results(vec![
                        TypeExpr::pointer(TypeExpr::qualified("r9", "BoolCmd")),
                        TypeExpr::qualified("imports", "Options"),
                    ]),
                ),
            ],
        )]
    }

    #[test]
    fn conflicting_major_versions_keep_their_aliases() {
        let scan = redis_scan();
        let mut specs = redis_specs();
        let imports = resolve(&mut specs, &scan, None).unwrap();

        assert_eq!(
            imports,
            [
                ResolvedImport {
                    path: "foo".into(),
                    alias: None,
                    is_self: true
                },
                ResolvedImport {
                    path: "github.com/go-redis/redis/v8".into(),
                    alias: Some("r8".into()),
                    is_self: false
                },
                ResolvedImport {
                    path: "github.com/redis/go-redis/v9".into(),
                    alias: Some("r9".into()),
                    is_self: false
                },
                ResolvedImport {
                    path: "golang.org/x/tools/imports".into(),
                    alias: None,
                    is_self: false
                },
            ]
        );
        assert_eq!(print_signature(&specs[0].methods[0].sig), "() (foo.Str, *r8.BoolCmd)");
    }

    #[test]
    fn same_package_destination_needs_no_self_import() {
        let scan = redis_scan();
        let mut specs = redis_specs();
        let imports = resolve(&mut specs, &scan, Some("foo")).unwrap();
        assert!(imports.iter().all(|i| !i.is_self));
        assert_eq!(print_signature(&specs[0].methods[0].sig), "() (Str, *r8.BoolCmd)");
    }

    #[test]
    fn unused_bindings_are_not_copied() {
        let scan = redis_scan();
        let mut specs = vec![spec(
            "FooClient",
            0,
            vec![("ThingB", results(vec![TypeExpr::qualified("imports", "Options")]))],
        )];
        let imports = resolve(&mut specs, &scan, None).unwrap();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].path, "golang.org/x/tools/imports");
    }

    #[test]
    fn first_seen_order_follows_the_scan() {
        let scan = ScanResult {
            packages: vec![package(
                "foo",
                "foo",
                &["A", "B"],
                vec![
                    ImportBinding::new("context", None),
                    ImportBinding::new("io", None),
                ],
            )],
        };
        let mut a = spec("A", 0, vec![("Read", results(vec![TypeExpr::qualified("io", "Reader")]))]);
        a.methods[0].order = 7;
        let mut b = spec("B", 0, vec![("Ctx", results(vec![TypeExpr::qualified("context", "Context")]))]);
        b.methods[0].order = 3;

        let mut specs = vec![a, b];
        let imports = resolve(&mut specs, &scan, None).unwrap();
        let paths: Vec<_> = imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, ["context", "io"]);
    }

    #[test]
    fn two_paths_under_one_name_are_ambiguous() {
        let scan = ScanResult {
            packages: vec![package(
                "example.com/app",
                "app",
                &["Svc"],
                vec![ImportBinding::new("example.com/other/app", None)],
            )],
        };
        let mut specs = vec![spec(
            "Svc",
            0,
            vec![(
                "Run",
                results(vec![TypeExpr::named("Svc"), TypeExpr::qualified("app", "Config")]),
            )],
        )];
        let err = resolve(&mut specs, &scan, None).unwrap_err();
        match err {
            Error::ImportAmbiguity { alias, first, second } => {
                assert_eq!(alias, "app");
                assert_eq!(first, "example.com/app");
                assert_eq!(second, "example.com/other/app");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn self_import_aliases_a_package_named_differently_from_its_path() {
        let scan = ScanResult {
            packages: vec![package("example.com/go-store", "kv", &["Item"], Vec::new())],
        };
        let mut specs = vec![spec("Item", 0, vec![("Clone", results(vec![TypeExpr::pointer(TypeExpr::named("Item"))]))])];
        let imports = resolve(&mut specs, &scan, None).unwrap();
        assert_eq!(imports[0].alias.as_deref(), Some("kv"));
        assert_eq!(print_signature(&specs[0].methods[0].sig), "() *kv.Item");
    }

    #[test]
    fn type_params_and_builtins_are_not_qualified() {
        let scan = ScanResult {
            packages: vec![package("foo", "foo", &["T", "List"], Vec::new())],
        };
        let mut list = spec(
            "List",
            0,
            vec![("Get", results(vec![TypeExpr::named("T"), TypeExpr::named("error")]))],
        );
        list.type_params = vec![Param::named(["T"], TypeExpr::named("any"))];
        let mut specs = vec![list];
        let imports = resolve(&mut specs, &scan, None).unwrap();
        assert!(imports.is_empty());
        assert_eq!(print_signature(&specs[0].methods[0].sig), "() (T, error)");
    }

    #[test]
    fn unknown_identifiers_pull_in_dot_imports() {
        let scan = ScanResult {
            packages: vec![package(
                "foo",
                "foo",
                &["Svc"],
                vec![
                    ImportBinding::new("example.com/types", Some(".")),
                    ImportBinding::new("embed", Some("_")),
                ],
            )],
        };
        let mut specs = vec![spec("Svc", 0, vec![("Kind", results(vec![TypeExpr::named("Kind")]))])];
        let imports = resolve(&mut specs, &scan, None).unwrap();
        assert_eq!(
            imports,
            [ResolvedImport {
                path: "example.com/types".into(),
                alias: Some(".".into()),
                is_self: false
            }]
        );
    }
}
