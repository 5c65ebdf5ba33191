//! Declaration-level recursive-descent parser.
//!
//! Consumes the lexer's token stream (comments split off into a side list)
//! and builds a [`SourceFile`]. Function bodies and `var`/`const`
//! declarations are skipped by bracket balancing; everything the interface
//! generator needs (imports, type specs, receivers, signatures, docs) is
//! parsed structurally.

use crate::ast::*;
use crate::error::{Diag, LineIndex, Span};
use crate::lexer::{Spanned, Tok};
use crate::parser_support::{resolve_param_list, ParamDecl};
use smallvec::{smallvec, SmallVec};

type PResult<T> = Result<T, Diag>;

pub struct Parser<'src> {
    src: &'src str,
    toks: Vec<Spanned<'src>>,
    comments: Vec<Comment>,
    lines: LineIndex,
    pos: usize,
}

impl<'src> Parser<'src> {
    /// Splits a complete token stream into significant tokens and comments.
    pub fn new(src: &'src str, stream: impl IntoIterator<Item = Spanned<'src>>) -> Self {
        let mut toks = Vec::new();
        let mut comments = Vec::new();
        for (start, tok, end) in stream {
            match tok {
                Tok::Comment(text) => comments.push(Comment {
                    kind: if text.starts_with("//") {
                        CommentKind::Line
                    } else {
                        CommentKind::Block
                    },
                    text: text.trim_end().to_string(),
                    span: Span::new(start, end),
                }),
                _ => toks.push((start, tok, end)),
            }
        }

        Self {
            src,
            toks,
            comments,
            lines: LineIndex::new(src),
            pos: 0,
        }
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    #[inline]
    fn nth(&self, n: usize) -> Option<Tok<'src>> {
        self.toks.get(self.pos + n).map(|t| t.1)
    }

    #[inline]
    fn peek(&self) -> Option<Tok<'src>> {
        self.nth(0)
    }

    #[inline]
    fn at(&self, tok: Tok<'src>) -> bool {
        self.peek() == Some(tok)
    }

    #[inline]
    fn bump(&mut self) {
        if self.pos < self.toks.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, tok: Tok<'src>) -> bool {
        if self.at(tok) {
            self.bump();
            return true;
        }
        false
    }

    fn cur_span(&self) -> Span {
        match self.toks.get(self.pos) {
            Some(&(s, _, e)) => Span::new(s, e),
            None => Span::empty_at(self.src.len()),
        }
    }

    fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.toks.get(i)) {
            Some(&(s, _, e)) => Span::new(s, e),
            None => Span::empty_at(0),
        }
    }

    fn text(&self, span: Span) -> String {
        self.src[span.range()].to_string()
    }

    fn unexpected(&self, expected: &str) -> Diag {
        let found = match self.peek() {
            Some(tok) => tok.to_string(),
            None => "end of file".to_string(),
        };
        Diag::parse(self.cur_span(), format!("expected {expected}, found {found}"))
    }

    fn expect(&mut self, tok: Tok<'src>) -> PResult<Span> {
        let span = self.cur_span();
        if self.eat(tok) {
            return Ok(span);
        }
        Err(self.unexpected(&tok.to_string()))
    }

    fn expect_ident(&mut self) -> PResult<(String, Span)> {
        match self.peek() {
            Some(Tok::Ident(name)) => {
                let span = self.cur_span();
                self.bump();
                Ok((name.to_string(), span))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn skip_semis(&mut self) {
        while self.eat(Tok::Semi) {}
    }

    /// End of a top-level declaration: `;`, a newline, or end of file.
    fn expect_decl_end(&mut self) -> PResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(Tok::Semi) => {
                self.bump();
                Ok(())
            }
            Some(_) => Err(self.unexpected("`;` or newline")),
        }
    }

    /// End of an element inside a `( … )` or `{ … }` list. The `;` may be
    /// omitted before the closing token, which is left for the caller.
    fn expect_elem_end(&mut self, close: Tok<'src>) -> PResult<()> {
        if self.eat(Tok::Semi) || self.at(close) {
            return Ok(());
        }
        Err(self.unexpected(&format!("`;` or {close}")))
    }

    fn at_type_start(&self) -> bool {
        starts_type(self.peek())
    }

    /// Index of the token closing the bracket at `open`.
    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, (_, tok, _)) in self.toks.iter().enumerate().skip(open) {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Skips a bracketed region starting at the current token, checking that
    /// brackets nest properly.
    fn skip_balanced(&mut self) -> PResult<()> {
        let open_span = self.cur_span();
        let mut stack: SmallVec<[Tok<'src>; 16]> = SmallVec::new();

        while let Some(tok) = self.peek() {
            let span = self.cur_span();
            self.bump();
            match tok {
                Tok::LParen => stack.push(Tok::RParen),
                Tok::LBrack => stack.push(Tok::RBrack),
                Tok::LBrace => stack.push(Tok::RBrace),
                Tok::RParen | Tok::RBrack | Tok::RBrace => match stack.pop() {
                    Some(want) if want == tok => {
                        if stack.is_empty() {
                            return Ok(());
                        }
                    }
                    Some(want) => {
                        return Err(Diag::parse(span, format!("expected {want}, found {tok}")));
                    }
                    None => return Err(Diag::parse(span, format!("unexpected {tok}"))),
                },
                _ if stack.is_empty() => {
                    return Err(Diag::parse(span, "expected bracketed block"));
                }
                _ => {}
            }
        }

        Err(Diag::parse(open_span, "unclosed bracket"))
    }

    // =========================================================================
    // Doc comments
    // =========================================================================

    /// The comment group ending on the line directly above token `idx`.
    ///
    /// A group never starts on the line of the preceding real token; such a
    /// comment trails that token instead.
    fn doc_before(&self, idx: usize) -> Doc {
        let Some(&(decl_start, _, _)) = self.toks.get(idx) else {
            return Doc::default();
        };

        let prev = self.toks[..idx]
            .iter()
            .rev()
            .find(|(s, t, e)| !(matches!(t, Tok::Semi) && s == e));
        let (prev_end, prev_line) = match prev {
            Some(&(_, _, end)) => (end, Some(self.lines.line(end.saturating_sub(1)))),
            None => (0, None),
        };

        let hi = self
            .comments
            .partition_point(|c| (c.span.start as usize) < decl_start);
        let mut expect_line = self.lines.line(decl_start);
        let mut group = Vec::new();

        for c in self.comments[..hi].iter().rev() {
            let start = c.span.start as usize;
            if start < prev_end {
                break;
            }
            let end_line = self.lines.line((c.span.end as usize).saturating_sub(1));
            let adjacent =
                end_line + 1 == expect_line || (!group.is_empty() && end_line == expect_line);
            let start_line = self.lines.line(start);
            if !adjacent || Some(start_line) == prev_line {
                break;
            }
            group.push(c.clone());
            expect_line = start_line;
        }

        group.reverse();
        Doc { comments: group }
    }

    // =========================================================================
    // File
    // =========================================================================

    pub fn parse_file(mut self) -> PResult<SourceFile> {
        self.skip_semis();
        let package_start = self.expect(Tok::KwPackage)?;
        let (package, _) = self.expect_ident()?;
        if package == "_" {
            return Err(Diag::parse(self.prev_span(), "invalid package name `_`"));
        }
        let package_span = package_start.to(self.prev_span());
        self.expect_decl_end()?;

        let mut imports = Vec::new();
        loop {
            self.skip_semis();
            if !self.at(Tok::KwImport) {
                break;
            }
            self.import_decl(&mut imports)?;
        }

        let mut decls = Vec::new();
        loop {
            self.skip_semis();
            match self.peek() {
                None => break,
                Some(Tok::KwType) => self.type_decl(&mut decls)?,
                Some(Tok::KwFunc) => decls.push(Decl::Func(self.func_decl()?)),
                Some(Tok::KwVar | Tok::KwConst) => self.skip_value_decl()?,
                Some(Tok::KwImport) => {
                    return Err(Diag::parse(
                        self.cur_span(),
                        "imports must appear before other declarations",
                    ));
                }
                Some(_) => return Err(self.unexpected("declaration")),
            }
        }

        Ok(SourceFile {
            package,
            package_span,
            imports,
            decls,
        })
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn import_decl(&mut self, out: &mut Vec<ImportSpec>) -> PResult<()> {
        let decl_doc = self.doc_before(self.pos);
        self.bump(); // import

        if self.eat(Tok::LParen) {
            loop {
                self.skip_semis();
                if self.eat(Tok::RParen) {
                    break;
                }
                let doc = self.doc_before(self.pos);
                out.push(self.import_spec(doc)?);
                self.expect_elem_end(Tok::RParen)?;
            }
        } else {
            out.push(self.import_spec(decl_doc)?);
        }

        self.expect_decl_end()
    }

    fn import_spec(&mut self, doc: Doc) -> PResult<ImportSpec> {
        let start = self.cur_span();
        let name = match self.peek() {
            Some(Tok::Ident(name)) => {
                self.bump();
                Some(name.to_string())
            }
            Some(Tok::Dot) => {
                self.bump();
                Some(".".to_string())
            }
            _ => None,
        };

        let path = match self.peek() {
            Some(Tok::StringLit(lit)) => {
                self.bump();
                unquote(lit)
            }
            _ => return Err(self.unexpected("import path")),
        };
        if path.is_empty() {
            return Err(Diag::parse(self.prev_span(), "empty import path"));
        }

        Ok(ImportSpec {
            doc,
            name,
            path,
            span: start.to(self.prev_span()),
        })
    }

    // =========================================================================
    // Type declarations
    // =========================================================================

    fn type_decl(&mut self, out: &mut Vec<Decl>) -> PResult<()> {
        let decl_doc = self.doc_before(self.pos);
        self.bump(); // type

        if !self.eat(Tok::LParen) {
            let spec = self.type_spec(decl_doc, Doc::default())?;
            out.push(Decl::Type(spec));
            return self.expect_decl_end();
        }

        let mut specs = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(Tok::RParen) {
                break;
            }
            let doc = self.doc_before(self.pos);
            specs.push(self.type_spec(doc, decl_doc.clone())?);
            self.expect_elem_end(Tok::RParen)?;
        }

        // A lone spec in a group is documented by the group.
        if let [spec] = specs.as_mut_slice() {
            if spec.doc.is_empty() {
                spec.doc = decl_doc;
            }
        }

        out.extend(specs.into_iter().map(Decl::Type));
        self.expect_decl_end()
    }

    fn type_spec(&mut self, doc: Doc, group_doc: Doc) -> PResult<TypeSpec> {
        let start = self.cur_span();
        let (name, _) = self.expect_ident()?;
        let type_params = if self.looks_like_type_params() {
            self.type_params()?
        } else {
            Vec::new()
        };
        let is_alias = self.eat(Tok::Assign);
        let ty = self.parse_type()?;

        Ok(TypeSpec {
            doc,
            group_doc,
            name,
            type_params,
            is_alias,
            ty,
            span: start.to(self.prev_span()),
        })
    }

    /// `type A[T any] …` versus `type A [N]int` / `type A []int`.
    fn looks_like_type_params(&self) -> bool {
        if !self.at(Tok::LBrack) || !matches!(self.nth(1), Some(Tok::Ident(_))) {
            return false;
        }
        if self.nth(2) == Some(Tok::Star) {
            return self.star_is_constraint();
        }
        matches!(
            self.nth(2),
            Some(
                Tok::Ident(_)
                    | Tok::Comma
                    | Tok::Tilde
                    | Tok::LBrack
                    | Tok::LParen
                    | Tok::KwInterface
                    | Tok::KwFunc
                    | Tok::KwMap
                    | Tok::KwChan
            )
        )
    }

    /// `[P *C]` is an array length unless a comma follows the first entry
    /// or no element type follows the `]`.
    fn star_is_constraint(&self) -> bool {
        let Some(close) = self.matching_close(self.pos) else {
            return false;
        };
        let mut depth = 0usize;
        for (_, tok, _) in &self.toks[self.pos + 1..close] {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => depth = depth.saturating_sub(1),
                Tok::Comma if depth == 0 => return true,
                _ => {}
            }
        }
        !starts_type(self.toks.get(close + 1).map(|t| t.1))
    }

    fn type_params(&mut self) -> PResult<Vec<Param>> {
        let start = self.expect(Tok::LBrack)?;
        let entries = self.param_entries(Tok::RBrack, true)?;
        let params = resolve_param_list(entries)?;
        if params.is_empty() || params.iter().any(|p| p.names.is_empty()) {
            return Err(Diag::parse(
                start.to(self.prev_span()),
                "type parameters must be named",
            ));
        }
        Ok(params)
    }

    // =========================================================================
    // Functions and methods
    // =========================================================================

    fn func_decl(&mut self) -> PResult<FuncDecl> {
        let doc = self.doc_before(self.pos);
        let start = self.cur_span();
        self.bump(); // func

        let recv = if self.at(Tok::LParen) {
            Some(self.receiver()?)
        } else {
            None
        };
        let (name, _) = self.expect_ident()?;
        let type_params = if recv.is_none() && self.at(Tok::LBrack) {
            self.type_params()?
        } else {
            Vec::new()
        };

        let params_start = self.cur_span();
        self.expect(Tok::LParen)?;
        let params = resolve_param_list(self.param_entries(Tok::RParen, false)?)?;
        let raw_params = self.text(params_start.to(self.prev_span()));

        let results_start = self.cur_span();
        let results = self.results()?;
        let raw_results = if results.is_empty() {
            String::new()
        } else {
            self.text(results_start.to(self.prev_span()))
        };

        if self.at(Tok::LBrace) {
            self.skip_balanced()?;
        }
        let span = start.to(self.prev_span());
        self.expect_decl_end()?;

        Ok(FuncDecl {
            doc,
            recv,
            name,
            type_params,
            sig: Signature { params, results },
            raw_params,
            raw_results,
            span,
        })
    }

    fn receiver(&mut self) -> PResult<Receiver> {
        self.expect(Tok::LParen)?;

        let name = match (self.nth(0), self.nth(1)) {
            (Some(Tok::Ident(name)), Some(Tok::Ident(_) | Tok::Star | Tok::LParen)) => {
                self.bump();
                Some(name.to_string())
            }
            _ => None,
        };

        let parenthesized = self.eat(Tok::LParen);
        let kind = if self.eat(Tok::Star) {
            ReceiverKind::Pointer
        } else {
            ReceiverKind::Value
        };
        let (base, _) = self.expect_ident()?;

        let mut type_args = Vec::new();
        if self.eat(Tok::LBrack) {
            loop {
                type_args.push(self.expect_ident()?.0);
                if !self.eat(Tok::Comma) || self.at(Tok::RBrack) {
                    break;
                }
            }
            self.expect(Tok::RBrack)?;
        }

        if parenthesized {
            self.expect(Tok::RParen)?;
        }
        self.eat(Tok::Comma);
        self.expect(Tok::RParen)?;

        Ok(Receiver {
            name,
            kind,
            base,
            type_args,
        })
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    fn signature(&mut self) -> PResult<Signature> {
        self.expect(Tok::LParen)?;
        let params = resolve_param_list(self.param_entries(Tok::RParen, false)?)?;
        let results = self.results()?;
        Ok(Signature { params, results })
    }

    fn results(&mut self) -> PResult<Vec<Param>> {
        if self.eat(Tok::LParen) {
            return resolve_param_list(self.param_entries(Tok::RParen, false)?);
        }
        if self.at_type_start() {
            return Ok(vec![Param::unnamed(self.parse_type()?)]);
        }
        Ok(Vec::new())
    }

    /// Comma-separated entries up to and including `close`.
    fn param_entries(&mut self, close: Tok<'src>, constraint: bool) -> PResult<Vec<ParamDecl>> {
        let mut out = Vec::new();
        loop {
            if self.eat(close) {
                break;
            }
            out.push(self.param_entry(close, constraint)?);
            if !self.eat(Tok::Comma) {
                self.expect(close)?;
                break;
            }
        }
        Ok(out)
    }

    fn param_entry(&mut self, close: Tok<'src>, constraint: bool) -> PResult<ParamDecl> {
        let start = self.cur_span();

        if let Some(Tok::Ident(name)) = self.peek() {
            let next = self.nth(1);
            let bare = next == Some(Tok::Comma) || next == Some(close);
            let named = match next {
                Some(Tok::Dot) => false,
                // `buf [N]byte` names a parameter; `List[T]` is a type.
                Some(Tok::LBrack) => self.matching_close(self.pos + 1).is_some_and(|end| {
                    let after = self.toks.get(end + 1).map(|t| t.1);
                    !matches!(after, None | Some(Tok::Comma)) && after != Some(close)
                }),
                Some(_) => !bare,
                None => false,
            };

            if bare || named {
                self.bump();
                let variadic = named && self.eat(Tok::Ellipsis);
                let typ = if named {
                    Some(self.param_type(constraint)?)
                } else {
                    None
                };
                return Ok(ParamDecl {
                    names: smallvec![name.to_string()],
                    variadic,
                    typ,
                    span: start.to(self.prev_span()),
                });
            }
        }

        let variadic = self.eat(Tok::Ellipsis);
        let typ = self.param_type(constraint)?;
        Ok(ParamDecl {
            names: SmallVec::new(),
            variadic,
            typ: Some(typ),
            span: start.to(self.prev_span()),
        })
    }

    fn param_type(&mut self, constraint: bool) -> PResult<TypeExpr> {
        if constraint {
            self.parse_constraint()
        } else {
            self.parse_type()
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn parse_type(&mut self) -> PResult<TypeExpr> {
        match self.peek() {
            Some(Tok::Ident(_)) => self.type_name(),
            Some(Tok::Star) => {
                self.bump();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            Some(Tok::LBrack) => {
                self.bump();
                if self.eat(Tok::RBrack) {
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let len = self.array_len()?;
                let elem = self.parse_type()?;
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(elem),
                })
            }
            Some(Tok::KwMap) => {
                self.bump();
                self.expect(Tok::LBrack)?;
                let key = self.parse_type()?;
                self.expect(Tok::RBrack)?;
                let value = self.parse_type()?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            Some(Tok::KwChan) => {
                self.bump();
                let dir = if self.eat(Tok::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.parse_type()?),
                })
            }
            Some(Tok::Arrow) => {
                self.bump();
                self.expect(Tok::KwChan)?;
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.parse_type()?),
                })
            }
            Some(Tok::KwFunc) => {
                self.bump();
                Ok(TypeExpr::Func(Box::new(self.signature()?)))
            }
            Some(Tok::KwStruct) => self.struct_type(),
            Some(Tok::KwInterface) => self.interface_type(),
            Some(Tok::LParen) => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(Tok::RParen)?;
                Ok(TypeExpr::Paren(Box::new(inner)))
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn type_name(&mut self) -> PResult<TypeExpr> {
        let (first, _) = self.expect_ident()?;
        let (pkg, name) = if self.eat(Tok::Dot) {
            let (name, _) = self.expect_ident()?;
            (Some(first), name)
        } else {
            (None, first)
        };

        let mut args = Vec::new();
        if self.eat(Tok::LBrack) {
            loop {
                args.push(self.parse_type()?);
                if !self.eat(Tok::Comma) || self.at(Tok::RBrack) {
                    break;
                }
            }
            self.expect(Tok::RBrack)?;
        }

        Ok(TypeExpr::Named { pkg, name, args })
    }

    /// Array length after `[`, rendered canonically; consumes the `]`.
    fn array_len(&mut self) -> PResult<String> {
        let start = self.cur_span();
        let mut out = String::new();
        let mut depth = 0usize;

        loop {
            let Some(tok) = self.peek() else {
                return Err(Diag::parse(start, "unclosed array length"));
            };
            match tok {
                Tok::RBrack if depth == 0 => {
                    self.bump();
                    break;
                }
                Tok::LParen | Tok::LBrack => depth += 1,
                Tok::RParen | Tok::RBrack => depth = depth.saturating_sub(1),
                Tok::Semi | Tok::LBrace | Tok::RBrace => {
                    return Err(self.unexpected("array length"));
                }
                _ => {}
            }
            match tok {
                Tok::Op(op) => {
                    out.push(' ');
                    out.push_str(op);
                    out.push(' ');
                }
                Tok::Star | Tok::Pipe => {
                    out.push(' ');
                    out.push_str(tok.text());
                    out.push(' ');
                }
                _ => out.push_str(tok.text()),
            }
            self.bump();
        }

        if out.is_empty() {
            return Err(Diag::parse(start, "missing array length"));
        }
        Ok(out)
    }

    fn struct_type(&mut self) -> PResult<TypeExpr> {
        self.bump(); // struct
        self.expect(Tok::LBrace)?;

        let mut fields = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(Tok::RBrace) {
                break;
            }
            fields.push(self.field_decl()?);
            self.expect_elem_end(Tok::RBrace)?;
        }

        Ok(TypeExpr::Struct(fields))
    }

    fn field_decl(&mut self) -> PResult<FieldDecl> {
        let embedded = match (self.nth(0), self.nth(1)) {
            (Some(Tok::Star), _) => true,
            (Some(Tok::Ident(_)), None) => true,
            (
                Some(Tok::Ident(_)),
                Some(Tok::Dot | Tok::Semi | Tok::RBrace | Tok::StringLit(_)),
            ) => true,
            // `List[T]` embeds an instance; `buf [4]byte` declares a field.
            (Some(Tok::Ident(_)), Some(Tok::LBrack)) => self
                .matching_close(self.pos + 1)
                .map(|close| {
                    matches!(
                        self.toks.get(close + 1).map(|t| t.1),
                        None | Some(Tok::Semi | Tok::RBrace | Tok::StringLit(_))
                    )
                })
                .unwrap_or(false),
            _ => false,
        };

        let names = if embedded {
            SmallVec::new()
        } else {
            let mut names: SmallVec<[String; 2]> = smallvec![self.expect_ident()?.0];
            while self.eat(Tok::Comma) {
                names.push(self.expect_ident()?.0);
            }
            names
        };

        let ty = self.parse_type()?;
        let tag = match self.peek() {
            Some(Tok::StringLit(lit)) => {
                self.bump();
                Some(lit.to_string())
            }
            _ => None,
        };

        Ok(FieldDecl { names, ty, tag })
    }

    fn interface_type(&mut self) -> PResult<TypeExpr> {
        self.bump(); // interface
        self.expect(Tok::LBrace)?;

        let mut elems = Vec::new();
        loop {
            self.skip_semis();
            if self.eat(Tok::RBrace) {
                break;
            }
            match (self.nth(0), self.nth(1)) {
                (Some(Tok::Ident(name)), Some(Tok::LParen)) => {
                    self.bump();
                    let sig = self.signature()?;
                    elems.push(InterfaceElem::Method {
                        name: name.to_string(),
                        sig,
                    });
                }
                _ => elems.push(InterfaceElem::Embed(self.parse_constraint()?)),
            }
            self.expect_elem_end(Tok::RBrace)?;
        }

        Ok(TypeExpr::Interface(elems))
    }

    /// `~int | string` or a plain type.
    fn parse_constraint(&mut self) -> PResult<TypeExpr> {
        let first = self.term()?;
        if !self.at(Tok::Pipe) && !first.tilde {
            return Ok(first.ty);
        }

        let mut terms = vec![first];
        while self.eat(Tok::Pipe) {
            terms.push(self.term()?);
        }
        Ok(TypeExpr::Union(terms))
    }

    fn term(&mut self) -> PResult<Term> {
        let tilde = self.eat(Tok::Tilde);
        Ok(Term {
            tilde,
            ty: self.parse_type()?,
        })
    }

    // =========================================================================
    // Skipped declarations
    // =========================================================================

    fn skip_value_decl(&mut self) -> PResult<()> {
        self.bump(); // var / const

        if self.at(Tok::LParen) {
            self.skip_balanced()?;
            return self.expect_decl_end();
        }

        loop {
            match self.peek() {
                None => return Ok(()),
                Some(Tok::Semi) => {
                    self.bump();
                    return Ok(());
                }
                Some(Tok::LParen | Tok::LBrack | Tok::LBrace) => self.skip_balanced()?,
                Some(Tok::RParen | Tok::RBrack | Tok::RBrace) => {
                    return Err(self.unexpected("declaration"));
                }
                Some(_) => self.bump(),
            }
        }
    }
}

fn starts_type(tok: Option<Tok<'_>>) -> bool {
    matches!(
        tok,
        Some(
            Tok::Ident(_)
                | Tok::Star
                | Tok::LBrack
                | Tok::LParen
                | Tok::KwMap
                | Tok::KwChan
                | Tok::KwFunc
                | Tok::KwStruct
                | Tok::KwInterface
                | Tok::Arrow
        )
    )
}

/// Strips the quotes of an interpreted or raw string literal.
fn unquote(lit: &str) -> String {
    let inner = lit
        .get(1..lit.len().saturating_sub(1))
        .unwrap_or_default();
    if lit.starts_with('`') {
        return inner.to_string();
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            c => out.push(c),
        }
    }
    out
}
