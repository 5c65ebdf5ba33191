//! Parse and print ports, with the Go implementations backed by
//! `interfacegen-parser`.
//!
//! The engine only sees the declaration model, so scanner, synthesizer and
//! resolver can be driven by hand-built fixtures.

use crate::error::{Error, Result};
use crate::model::*;
use interfacegen_parser::ast::{self, is_exported, Decl, SourceFile};
use interfacegen_parser::{parse_source, printer, walk, LineIndex};
use std::fmt::Write;
use std::path::Path;

pub trait SourceParser {
    /// Parses one file into the declaration model.
    fn parse_file(&self, path: &Path, src: &str) -> Result<ParsedFile>;
}

pub trait SourcePrinter {
    /// Renders the generated file in canonical form.
    fn render(&self, file: &OutputFile) -> String;
}

// =============================================================================
// Go parser
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct GoParser;

impl SourceParser for GoParser {
    fn parse_file(&self, path: &Path, src: &str) -> Result<ParsedFile> {
        let lines = LineIndex::new(src);
        let pos = |offset: u32| {
            let (line, col) = lines.line_col(offset as usize);
            Pos { line, col }
        };

        let file = parse_source(src).map_err(|failure| {
            let first = failure.diags.first();
            let (line, col) = first.map_or((1, 1), |d| lines.line_col(d.span.start as usize));
            let mut message = first.map_or_else(|| "invalid source".to_string(), |d| d.message.clone());
            if failure.diags.len() > 1 {
                let _ = write!(message, " (and {} more)", failure.diags.len() - 1);
            }
            Error::Parse {
                path: path.to_path_buf(),
                line,
                col,
                message,
            }
        })?;

        Ok(declarations(file, pos))
    }
}

fn declarations(file: SourceFile, pos: impl Fn(u32) -> Pos) -> ParsedFile {
    let mut out = ParsedFile {
        package: file.package,
        package_pos: pos(file.package_span.start),
        imports: file
            .imports
            .iter()
            .map(|spec| ImportBinding::new(&spec.path, spec.name.as_deref()))
            .collect(),
        ..ParsedFile::default()
    };

    for (order, decl) in file.decls.into_iter().enumerate() {
        match decl {
            Decl::Type(spec) => {
                let skip = spec.doc.has_directive(SKIP_DIRECTIVE)
                    || spec.group_doc.has_directive(SKIP_DIRECTIVE);
                out.types.push(TypeDecl {
                    exported: is_exported(&spec.name),
                    doc: doc_lines(&spec.doc),
                    skip,
                    order,
                    type_params: spec.type_params,
                    pos: pos(spec.span.start),
                    name: spec.name,
                });
            }
            Decl::Func(func) => {
                let Some(recv) = func.recv else { continue };
                out.methods.push(MethodDecl {
                    receiver: recv.base,
                    receiver_kind: recv.kind,
                    receiver_type_args: recv.type_args,
                    owner: None,
                    doc: doc_lines(&func.doc),
                    skip: func.doc.has_directive(SKIP_DIRECTIVE),
                    qualifiers: walk::qualifiers(&func.sig)
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    sig: func.sig,
                    raw_params: func.raw_params,
                    raw_results: func.raw_results,
                    order,
                    file: 0,
                    pos: pos(func.span.start),
                    name: func.name,
                });
            }
        }
    }

    out
}

fn doc_lines(doc: &ast::Doc) -> Doc {
    doc.without_directive(SKIP_DIRECTIVE)
        .comments
        .into_iter()
        .map(|c| c.text)
        .collect()
}

// =============================================================================
// Go printer
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct GoPrinter;

impl SourcePrinter for GoPrinter {
    fn render(&self, file: &OutputFile) -> String {
        let mut out = format!("package {}\n", file.package);

        match file.imports.as_slice() {
            [] => {}
            [single] => {
                out.push_str("\nimport ");
                write_import(&mut out, single);
                out.push('\n');
            }
            imports => {
                out.push_str("\nimport (\n");
                for (i, import) in imports.iter().enumerate() {
                    if i > 0 && imports[i - 1].is_self && !import.is_self {
                        out.push('\n');
                    }
                    out.push('\t');
                    write_import(&mut out, import);
                    out.push('\n');
                }
                out.push_str(")\n");
            }
        }

        for iface in &file.interfaces {
            out.push('\n');
            write_doc(&mut out, &iface.doc, "");
            let _ = writeln!(
                out,
                "type {}{} interface {{",
                iface.name,
                printer::print_type_params(&iface.type_params)
            );
            for method in &iface.methods {
                write_doc(&mut out, &method.doc, "\t");
                let _ = writeln!(out, "\t{}{}", method.name, printer::print_signature(&method.sig));
            }
            out.push_str("}\n");
        }

        out
    }
}

fn write_import(out: &mut String, import: &ResolvedImport) {
    if let Some(alias) = &import.alias {
        out.push_str(alias);
        out.push(' ');
    }
    let _ = write!(out, "{:?}", import.path);
}

fn write_doc(out: &mut String, doc: &Doc, indent: &str) {
    for comment in doc {
        for line in comment.lines().map(str::trim_end) {
            if !line.is_empty() {
                out.push_str(indent);
                out.push_str(line);
            }
            out.push('\n');
        }
    }
}
