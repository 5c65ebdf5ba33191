//! # Go declaration model
//!
//! A declaration-level view of one Go source file: package clause, imports,
//! type specs and func/method declarations, each with its doc comment.
//! Function bodies and `var`/`const` declarations are checked for balance and
//! then dropped; nothing below the signature level is modelled.
//!
//! Type expressions are kept structurally (not as text) so that later stages
//! can classify and rewrite the identifiers they reference, and so the
//! printer can render them in canonical form.

use crate::error::Span;
use smallvec::SmallVec;

// =============================================================================
// Comments / Docs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Source text including the `//` or `/* */` delimiters.
    pub text: String,
    pub span: Span,
}

impl Comment {
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            kind: CommentKind::Line,
            text: text.into(),
            span: Span::default(),
        }
    }

    /// Text between the delimiters.
    pub fn body(&self) -> &str {
        match self.kind {
            CommentKind::Line => self.text.strip_prefix("//").unwrap_or(&self.text),
            CommentKind::Block => self
                .text
                .strip_prefix("/*")
                .and_then(|s| s.strip_suffix("*/"))
                .unwrap_or(&self.text),
        }
    }

    /// Whether this is a line comment consisting of exactly `directive`.
    ///
    /// Case-sensitive; whitespace anywhere inside the comment is ignored, so
    /// `//interfacegen:skip` and `// interfacegen : skip` both match.
    pub fn is_directive(&self, directive: &str) -> bool {
        if self.kind != CommentKind::Line {
            return false;
        }
        let mut want = directive.chars().filter(|c| !c.is_whitespace());
        let mut got = self.body().chars().filter(|c| !c.is_whitespace());
        loop {
            match (want.next(), got.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a == b => continue,
                _ => return false,
            }
        }
    }
}

/// Comment group attached directly above a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doc {
    pub comments: Vec<Comment>,
}

impl Doc {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            comments: lines.into_iter().map(Comment::line).collect(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn has_directive(&self, directive: &str) -> bool {
        self.comments.iter().any(|c| c.is_directive(directive))
    }

    /// Copy of this doc without the lines that consist of `directive`.
    pub fn without_directive(&self, directive: &str) -> Doc {
        Doc {
            comments: self
                .comments
                .iter()
                .filter(|c| !c.is_directive(directive))
                .cloned()
                .collect(),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// Grammar: `Type = TypeName [ TypeArgs ] | TypeLit | "(" Type ")"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `name`, `pkg.name`, optionally instantiated: `List[int]`.
    Named {
        pkg: Option<String>,
        name: String,
        args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// Length is kept as canonical text (`4`, `N`, `...`).
    Array {
        len: String,
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Func(Box<Signature>),
    Struct(Vec<FieldDecl>),
    Interface(Vec<InterfaceElem>),
    /// Constraint union: `~int | string`.
    Union(Vec<Term>),
    Paren(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            pkg: None,
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn qualified(pkg: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Named {
            pkg: Some(pkg.into()),
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub tilde: bool,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Empty for embedded fields.
    pub names: SmallVec<[String; 2]>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElem {
    Method { name: String, sig: Signature },
    /// Embedded interface, type term or union.
    Embed(TypeExpr),
}

/// One parameter group: `a, b int`, `opts ...Option` or an unnamed `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub names: SmallVec<[String; 2]>,
    pub variadic: bool,
    pub ty: TypeExpr,
}

impl Param {
    pub fn unnamed(ty: TypeExpr) -> Self {
        Self {
            names: SmallVec::new(),
            variadic: false,
            ty,
        }
    }

    pub fn named<I, S>(names: I, ty: TypeExpr) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            variadic: false,
            ty,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

// =============================================================================
// Declarations
// =============================================================================

/// Grammar: `ImportSpec = [ "." | PackageName ] ImportPath`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub doc: Doc,
    /// Alias as written: an identifier, `.` or `_`.
    pub name: Option<String>,
    /// Unquoted import path.
    pub path: String,
    pub span: Span,
}

/// Grammar: `TypeSpec = identifier [ TypeParameters ] [ "=" ] Type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub doc: Doc,
    /// Doc of the enclosing `type ( … )` group; empty for ungrouped specs.
    pub group_doc: Doc,
    pub name: String,
    pub type_params: Vec<Param>,
    pub is_alias: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    Value,
    Pointer,
}

/// Grammar: `Receiver = "(" [ identifier ] [ "*" ] BaseTypeName [ TypeArgs ] ")"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    pub name: Option<String>,
    pub kind: ReceiverKind,
    pub base: String,
    /// Type parameter names as spelled on this receiver.
    pub type_args: Vec<String>,
}

/// ```text
/// FunctionDecl = "func" FunctionName [ TypeParameters ] Signature [ FunctionBody ]
/// MethodDecl   = "func" Receiver MethodName Signature [ FunctionBody ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub doc: Doc,
    pub recv: Option<Receiver>,
    pub name: String,
    pub type_params: Vec<Param>,
    pub sig: Signature,
    /// Parameter list exactly as written, parentheses included.
    pub raw_params: String,
    /// Result list exactly as written; empty when there is none.
    pub raw_results: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Type(TypeSpec),
    Func(FuncDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub package: String,
    pub package_span: Span,
    pub imports: Vec<ImportSpec>,
    /// Type and func declarations in source order.
    pub decls: Vec<Decl>,
}

// =============================================================================
// Identifier conventions
// =============================================================================

/// Predeclared type identifiers of the universe scope.
pub const PREDECLARED_TYPES: &[&str] = &[
    "any",
    "bool",
    "byte",
    "comparable",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

#[inline]
pub fn is_predeclared_type(name: &str) -> bool {
    PREDECLARED_TYPES.contains(&name)
}

/// Export convention: an identifier is exported when it starts with an
/// upper-case letter.
#[inline]
pub fn is_exported(ident: &str) -> bool {
    ident.chars().next().is_some_and(char::is_uppercase)
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || unicode_ident::is_xid_start(c) => {
            chars.all(|c| c == '_' || unicode_ident::is_xid_continue(c))
        }
        _ => false,
    }
}

/// Package name a tool assumes for an import path written without an alias.
///
/// Takes the last path element, steps over a trailing `vN` major-version
/// element, drops a `go-` prefix and a `-go`/`.go` suffix, and cuts at the
/// first character that cannot appear in an identifier:
/// `github.com/redis/go-redis/v9` → `redis`, `gopkg.in/yaml.v2` → `yaml`.
pub fn assumed_package_name(import_path: &str) -> String {
    let mut elems = import_path.rsplit('/');
    let mut last = elems.next().unwrap_or(import_path);
    if is_major_version(last) {
        if let Some(prev) = elems.next() {
            last = prev;
        }
    }

    let mut name = last.strip_prefix("go-").unwrap_or(last);
    for suffix in ["-go", ".go"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped;
        }
    }

    let end = name
        .char_indices()
        .find(|&(_, c)| !(c == '_' || unicode_ident::is_xid_continue(c)))
        .map_or(name.len(), |(i, _)| i);
    name[..end].to_string()
}

fn is_major_version(elem: &str) -> bool {
    elem.strip_prefix('v').is_some_and(|digits| {
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assumed_names_follow_go_tooling_conventions() {
        assert_eq!(assumed_package_name("fmt"), "fmt");
        assert_eq!(assumed_package_name("golang.org/x/tools/imports"), "imports");
        assert_eq!(assumed_package_name("github.com/go-redis/redis/v8"), "redis");
        assert_eq!(assumed_package_name("github.com/redis/go-redis/v9"), "redis");
        assert_eq!(assumed_package_name("gopkg.in/yaml.v2"), "yaml");
        assert_eq!(assumed_package_name("github.com/mattn/go-sqlite3"), "sqlite3");
        assert_eq!(assumed_package_name("example.com/v2"), "example");
    }

    #[test]
    fn directive_matching_is_whitespace_tolerant_but_case_sensitive() {
        let skip = "interfacegen:skip";
        assert!(Comment::line("//interfacegen:skip").is_directive(skip));
        assert!(Comment::line("// interfacegen:skip  ").is_directive(skip));
        assert!(Comment::line("//\tinterfacegen : skip").is_directive(skip));
        assert!(!Comment::line("// Interfacegen:skip").is_directive(skip));
        assert!(!Comment::line("// interfacegen:skip.").is_directive(skip));
        assert!(!Comment::line("// do not interfacegen:skip").is_directive(skip));
    }

    #[test]
    fn doc_without_directive_keeps_other_lines() {
        let doc = Doc::from_lines(["// Foo does things.", "// interfacegen:skip"]);
        assert!(doc.has_directive("interfacegen:skip"));
        let cleaned = doc.without_directive("interfacegen:skip");
        assert_eq!(cleaned, Doc::from_lines(["// Foo does things."]));
    }

    #[test]
    fn export_convention() {
        assert!(is_exported("Foo"));
        assert!(is_exported("Ñandu"));
        assert!(!is_exported("foo"));
        assert!(!is_exported("_Foo"));
        assert!(is_identifier("r8"));
        assert!(!is_identifier("8r"));
    }
}
