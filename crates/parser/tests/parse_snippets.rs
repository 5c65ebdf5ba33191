use interfacegen_parser::ast::*;
use interfacegen_parser::parse_source;
use interfacegen_parser::printer::{print_signature, print_type, print_type_params};

fn assert_parses(src: &str) -> SourceFile {
    match parse_source(src) {
        Ok(file) => file,
        Err(f) => panic!("expected parse ok, got diagnostics: {:#?}", f.diags),
    }
}

fn types(file: &SourceFile) -> Vec<&TypeSpec> {
    file.decls
        .iter()
        .filter_map(|d| match d {
            Decl::Type(t) => Some(t),
            Decl::Func(_) => None,
        })
        .collect()
}

fn funcs(file: &SourceFile) -> Vec<&FuncDecl> {
    file.decls
        .iter()
        .filter_map(|d| match d {
            Decl::Func(f) => Some(f),
            Decl::Type(_) => None,
        })
        .collect()
}

fn doc_text(doc: &Doc) -> Vec<&str> {
    doc.comments.iter().map(|c| c.text.as_str()).collect()
}

#[test]
fn parses_imports_and_decls() {
    let file = assert_parses(
        r#"
package main

import (
    "fmt"
    . "math"
    _ "net/http"
)

const (
    A = 1
    B int = 2
)

var (
    x = 1
    y, z int
)

type (
    T = int
    U[T any] struct { F T }
    V interface {
        M(x int) int
        ~int | ~string
    }
)

func main() {
    fmt.Println(Sqrt(4))
}
"#,
    );

    let names: Vec<_> = file.imports.iter().map(|i| (i.name.as_deref(), i.path.as_str())).collect();
    assert_eq!(names, [(None, "fmt"), (Some("."), "math"), (Some("_"), "net/http")]);

    let specs = types(&file);
    assert_eq!(specs.len(), 3);
    assert!(specs[0].is_alias);
    assert_eq!(print_type_params(&specs[1].type_params), "[T any]");
    assert_eq!(print_type(&specs[1].ty), "struct{ F T }");
    assert_eq!(print_type(&specs[2].ty), "interface{ M(x int) int; ~int | ~string }");
    assert_eq!(funcs(&file).len(), 1);
}

#[test]
fn parses_statements() {
    assert_parses(
        r#"
package p

func f(x int) int {
    if x < 0 { return -x }
    for i := 0; i < 10; i++ {
        if i == 5 { break }
        continue
    }
    for range []int{1,2,3} {
    }
    switch x {
    case 0, 1:
        x++
    default:
        x = 3
    }
    select {
    case ch <- x:
        return x
    default:
        return 0
    }
}
"#,
    );
}

#[test]
fn parses_expressions() {
    assert_parses(
        r#"
package p

func f(a, b, c int, ch chan<- int) {
    _ = a + b*c - (a<<2)
    _ = a == b || a < c && b <= c
    _ = &a
    _ = <-ch
    _ = []int{1,2,3}[0]
    _ = []int{1,2,3}[1:]
    _ = []int{1,2,3}[:2]
    _ = []int{1,2,3}[0:2:3]
    _ = map[string]int{"a":1, "b":2}["a"]
    _ = f(a, b, c)
    _ = f(a, b, c...)
}
"#,
    );
}

#[test]
fn receivers_and_raw_signature_text() {
    let file = assert_parses(
        r#"
package list

type List[T any] struct{ items []T }

func (l *List[E]) Push(v E, more ...E) { l.items = append(l.items, v) }

func (List[_]) Len() int { return 0 }

func (l List[T]) Each(fn func(int, T) bool) (n int, err error) { return }

func New[T any]() *List[T] { return &List[T]{} }
"#,
    );
    let fs = funcs(&file);

    let push = fs[0].recv.as_ref().unwrap();
    assert_eq!(push.kind, ReceiverKind::Pointer);
    assert_eq!(push.base, "List");
    assert_eq!(push.type_args, ["E"]);
    assert_eq!(fs[0].raw_params, "(v E, more ...E)");
    assert_eq!(print_signature(&fs[0].sig), "(v E, more ...E)");

    let len = fs[1].recv.as_ref().unwrap();
    assert_eq!(len.name, None);
    assert_eq!(len.kind, ReceiverKind::Value);
    assert_eq!(fs[1].raw_results, "int");

    assert_eq!(fs[2].raw_results, "(n int, err error)");
    assert_eq!(print_signature(&fs[2].sig), "(fn func(int, T) bool) (n int, err error)");

    assert!(fs[3].recv.is_none());
    assert_eq!(print_type_params(&fs[3].type_params), "[T any]");
}

#[test]
fn doc_comments_attach_only_without_gaps() {
    let file = assert_parses(
        r#"package p

// Detached.

// Foo is documented.
// Second line.
type Foo struct{}

type Bar int // trailing, not a doc
func (b Bar) Get() int { return 0 }

/* block doc */
func (f *Foo) Name() string { return "" }
"#,
    );
    let ts = types(&file);
    assert_eq!(doc_text(&ts[0].doc), ["// Foo is documented.", "// Second line."]);
    assert!(ts[1].doc.is_empty());

    let fs = funcs(&file);
    assert!(fs[0].doc.is_empty());
    assert_eq!(doc_text(&fs[1].doc), ["/* block doc */"]);
}

#[test]
fn grouped_type_docs() {
    let file = assert_parses(
        r#"package p

// interfacegen:skip
type (
    // A doc.
    A struct{}
    B struct{}
)

// Only documents C.
type (
    C int
)
"#,
    );
    let ts = types(&file);
    assert_eq!(doc_text(&ts[0].doc), ["// A doc."]);
    assert!(ts[1].doc.is_empty());
    assert!(ts[0].group_doc.has_directive("interfacegen:skip"));
    assert!(ts[1].group_doc.has_directive("interfacegen:skip"));
    assert_eq!(doc_text(&ts[2].doc), ["// Only documents C."]);
}

#[test]
fn composite_types_round_trip_through_the_printer() {
    let file = assert_parses(
        r#"package p

import (
    "context"
    r9 "github.com/redis/go-redis/v9"
)

type Store interface {
    Get(ctx context.Context, keys ...string) (map[string][]byte, error)
    Watch(ctx context.Context) (<-chan r9.Message, chan<- struct{})
    Do(fn func(*r9.Client) error, n [4]int, m [N + 1]byte)
}
"#,
    );
    let TypeExpr::Interface(elems) = &types(&file)[0].ty else {
        panic!("expected interface");
    };
    let sigs: Vec<_> = elems
        .iter()
        .map(|e| match e {
            InterfaceElem::Method { name, sig } => format!("{name}{}", print_signature(sig)),
            InterfaceElem::Embed(t) => print_type(t),
        })
        .collect();
    assert_eq!(
        sigs,
        [
            "Get(ctx context.Context, keys ...string) (map[string][]byte, error)",
            "Watch(ctx context.Context) (<-chan r9.Message, chan<- struct{})",
            "Do(fn func(*r9.Client) error, n [4]int, m [N + 1]byte)",
        ]
    );
}

#[test]
fn star_in_brackets_is_an_array_length_unless_a_constraint_list_follows() {
    let file = assert_parses(
        r#"package p

const N = 2

type A [N * 2]int

type B [N * M]T

type C[P *int, Q any] struct{}

func (a A) Len() int { return len(a) }
"#,
    );
    let ts = types(&file);
    assert!(ts[0].type_params.is_empty());
    assert_eq!(print_type(&ts[0].ty), "[N * 2]int");
    assert!(ts[1].type_params.is_empty());
    assert_eq!(print_type(&ts[1].ty), "[N * M]T");
    assert_eq!(print_type_params(&ts[2].type_params), "[P *int, Q any]");
    assert_eq!(print_type(&ts[2].ty), "struct{}");
    assert_eq!(funcs(&file)[0].name, "Len");
}

#[test]
fn comments_inside_parameter_lists_stay_in_the_raw_text_only() {
    let file = assert_parses("package p\n\nfunc (s *S) M(a int /* the a */) error { return nil }\n");
    let f = funcs(&file)[0];
    assert_eq!(f.raw_params, "(a int /* the a */)");
    assert_eq!(print_signature(&f.sig), "(a int) error");
}

#[test]
fn syntax_errors_fail_the_file() {
    for src in [
        "package p\n\nfunc (f *Foo Name() {}\n",
        "package p\n\ntype T struct {\n",
        "package p\n\nfunc F() {\n    if x { ]\n}\n",
        "package p\n\nfunc F(a int, string) {}\n",
        "package p\n\nvar x = 1\nimport \"fmt\"\n",
        "func F() {}\n",
    ] {
        assert!(parse_source(src).is_err(), "expected failure for {src:?}");
    }
}
