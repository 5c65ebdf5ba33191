//! Declaration model shared by the pipeline stages.
//!
//! The parse port produces [`ParsedFile`]s; the scanner turns them into a
//! [`ScanResult`]; the synthesizer derives [`InterfaceSpec`]s; the import
//! resolver adds [`ResolvedImport`]s; the print port renders an
//! [`OutputFile`].

use interfacegen_parser::ast::{assumed_package_name, Param, ReceiverKind, Signature};
use std::path::PathBuf;

/// Directive that excludes a type or method from generation.
pub const SKIP_DIRECTIVE: &str = "interfacegen:skip";

/// 1-based source position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

/// Doc comment lines as written, delimiters included.
pub type Doc = Vec<String>;

/// An import as written in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub path: String,
    /// Explicit alias, `.` or `_`; `None` uses the package's own name.
    pub alias: Option<String>,
}

impl ImportBinding {
    pub fn new(path: impl Into<String>, alias: Option<&str>) -> Self {
        Self {
            path: path.into(),
            alias: alias.map(str::to_string),
        }
    }

    /// Name this binding introduces into the file scope.
    pub fn effective_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => assumed_package_name(&self.path),
        }
    }

    pub fn is_dot(&self) -> bool {
        self.alias.as_deref() == Some(".")
    }

    pub fn is_blank(&self) -> bool {
        self.alias.as_deref() == Some("_")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    /// Doc without the skip directive.
    pub doc: Doc,
    pub skip: bool,
    /// Position in the whole scan (files outer, declarations inner).
    pub order: usize,
    pub exported: bool,
    pub type_params: Vec<Param>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Receiver base type name as written.
    pub receiver: String,
    pub receiver_kind: ReceiverKind,
    /// Type parameter names spelled on a generic receiver.
    pub receiver_type_args: Vec<String>,
    /// Index of the owning [`TypeDecl`] in its package, once resolved.
    pub owner: Option<usize>,
    pub name: String,
    pub doc: Doc,
    pub skip: bool,
    pub sig: Signature,
    pub raw_params: String,
    pub raw_results: String,
    /// Qualifiers referenced by the signature, first-seen order.
    pub qualifiers: Vec<String>,
    pub order: usize,
    /// Index of the declaring file in its package.
    pub file: usize,
    pub pos: Pos,
}

/// Declarations of one source file, as produced by the parse port.
///
/// `order` fields are file-local here; the scanner renumbers them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    pub package: String,
    pub package_pos: Pos,
    pub imports: Vec<ImportBinding>,
    pub types: Vec<TypeDecl>,
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileScan {
    pub path: PathBuf,
    pub imports: Vec<ImportBinding>,
}

/// One scanned package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageScan {
    pub dir: PathBuf,
    pub import_path: String,
    pub name: String,
    pub files: Vec<FileScan>,
    pub types: Vec<TypeDecl>,
    pub methods: Vec<MethodDecl>,
}

impl PackageScan {
    pub fn type_named(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Packages in scan order; the target directory comes first.
    pub packages: Vec<PackageScan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceMethod {
    pub name: String,
    pub doc: Doc,
    pub sig: Signature,
    pub file: usize,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSpec {
    pub name: String,
    pub doc: Doc,
    pub type_params: Vec<Param>,
    pub methods: Vec<InterfaceMethod>,
    /// Index of the source package in [`ScanResult::packages`].
    pub package: usize,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub path: String,
    pub alias: Option<String>,
    pub is_self: bool,
}

impl ResolvedImport {
    pub fn effective_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => assumed_package_name(&self.path),
        }
    }
}

impl From<&ImportBinding> for ResolvedImport {
    fn from(binding: &ImportBinding) -> Self {
        Self {
            path: binding.path.clone(),
            alias: binding.alias.clone(),
            is_self: false,
        }
    }
}

/// Everything the print port needs for the generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub package: String,
    /// Self-imports first, then the rest in first-seen order.
    pub imports: Vec<ResolvedImport>,
    pub interfaces: Vec<InterfaceSpec>,
}
