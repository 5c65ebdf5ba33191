use crate::error::{Diag, LexError, LexErrorKind, Span};
use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

// =============================================================================
// 0. Helpers
// =============================================================================

#[inline(always)]
const fn has_newline(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if matches!(bytes[i], b'\n' | b'\r') {
            return true;
        }
        i += 1;
    }

    false
}

#[inline]
fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    use memchr::memchr;

    let rem = lex.remainder().as_bytes();
    let mut search_start = 0;

    while let Some(star_pos) = memchr(b'*', &rem[search_start..]) {
        let abs_pos = search_start + star_pos;
        if rem.get(abs_pos + 1) == Some(&b'/') {
            lex.bump(abs_pos + 2);
            return Ok(());
        }
        search_start = abs_pos + 1;
    }

    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedComment)
}

// =============================================================================
// 1. Raw tokens (logos DFA)
// =============================================================================

#[repr(u8)]
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t]+")]
#[rustfmt::skip]
enum RawTok {
    #[token("\u{FEFF}")] Bom,

    // Trivia
    #[regex(r"\r\n|\n|\r")] Newline,
    #[regex(r"//[^\n\r]*", allow_greedy = true)] LineComment,
    #[token("/*", lex_block_comment)] BlockComment,

    // Keywords (before Ident)
    #[token("break")] KwBreak,
    #[token("case")] KwCase,
    #[token("chan")] KwChan,
    #[token("const")] KwConst,
    #[token("continue")] KwContinue,
    #[token("default")] KwDefault,
    #[token("defer")] KwDefer,
    #[token("else")] KwElse,
    #[token("fallthrough")] KwFallthrough,
    #[token("for")] KwFor,
    #[token("func")] KwFunc,
    #[token("go")] KwGo,
    #[token("goto")] KwGoto,
    #[token("if")] KwIf,
    #[token("import")] KwImport,
    #[token("interface")] KwInterface,
    #[token("map")] KwMap,
    #[token("package")] KwPackage,
    #[token("range")] KwRange,
    #[token("return")] KwReturn,
    #[token("select")] KwSelect,
    #[token("struct")] KwStruct,
    #[token("switch")] KwSwitch,
    #[token("type")] KwType,
    #[token("var")] KwVar,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,

    // Numbers are not validated here; declarations only need their text.
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?i?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?i?")]
    #[regex(r"0[xX][0-9a-fA-F_]*(\.[0-9a-fA-F_]*)?([pP][+-]?[0-9_]+)?i?")]
    #[regex(r"0[bBoO][0-9_]+i?")]
    Number,

    #[regex(r"`[^`]*`")] RawString,
    #[regex(r#""([^"\\\n\r]|\\.)*""#)] String,
    #[regex(r"'([^'\\\n\r]|\\.)+'")] Rune,

    // Operators the declaration grammar cares about
    #[token("...")] Ellipsis,
    #[token("<-")] Arrow,
    #[token("++")] Inc,
    #[token("--")] Dec,
    #[token("=")] Assign,
    #[token("*")] Star,
    #[token("~")] Tilde,
    #[token("|")] Pipe,

    // Everything else is opaque to the declaration scanner
    #[token("<<=")] #[token(">>=")] #[token("&^=")]
    #[token("+=")] #[token("-=")] #[token("*=")] #[token("/=")] #[token("%=")]
    #[token("&=")] #[token("|=")] #[token("^=")]
    #[token("<<")] #[token(">>")] #[token("&^")] #[token("&&")] #[token("||")]
    #[token("==")] #[token("!=")] #[token("<=")] #[token(">=")] #[token(":=")]
    #[token("+")] #[token("-")] #[token("/")] #[token("%")] #[token("&")]
    #[token("^")] #[token("!")] #[token("<")] #[token(">")]
    Op,

    // Delimiters
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,
    #[token(":")] Colon,
    #[token(".")] Dot,

    // Catch-all (lowest priority)
    #[regex(r".", priority = 0)] Error,
}

macro_rules! gen_lookup_table {
    ($size:expr, $($variant:ident),* $(,)?) => {{
        let mut table = [false; $size];
        $(table[RawTok::$variant as usize] = true;)*
        table
    }};
}

const SEMI_INSERT_TABLE: [bool; 128] = gen_lookup_table!(
    128,
    Ident,
    Number,
    Rune,
    String,
    RawString,
    KwBreak,
    KwContinue,
    KwFallthrough,
    KwReturn,
    Inc,
    Dec,
    RParen,
    RBrack,
    RBrace,
);

impl RawTok {
    #[inline(always)]
    const fn can_insert_semicolon(self) -> bool {
        SEMI_INSERT_TABLE[self as usize]
    }

    #[rustfmt::skip]
    fn to_token(self, slice: &str) -> Tok<'_> {
        match self {
            Self::Ident => Tok::Ident(slice),
            Self::Number => Tok::Number(slice),
            Self::Rune => Tok::RuneLit(slice),
            Self::String | Self::RawString => Tok::StringLit(slice),
            Self::LineComment | Self::BlockComment => Tok::Comment(slice),
            Self::Op => Tok::Op(slice),

            Self::KwBreak => Tok::KwBreak, Self::KwCase => Tok::KwCase, Self::KwChan => Tok::KwChan,
            Self::KwConst => Tok::KwConst, Self::KwContinue => Tok::KwContinue,
            Self::KwDefault => Tok::KwDefault, Self::KwDefer => Tok::KwDefer, Self::KwElse => Tok::KwElse,
            Self::KwFallthrough => Tok::KwFallthrough, Self::KwFor => Tok::KwFor, Self::KwFunc => Tok::KwFunc,
            Self::KwGo => Tok::KwGo, Self::KwGoto => Tok::KwGoto, Self::KwIf => Tok::KwIf,
            Self::KwImport => Tok::KwImport, Self::KwInterface => Tok::KwInterface, Self::KwMap => Tok::KwMap,
            Self::KwPackage => Tok::KwPackage, Self::KwRange => Tok::KwRange, Self::KwReturn => Tok::KwReturn,
            Self::KwSelect => Tok::KwSelect, Self::KwStruct => Tok::KwStruct, Self::KwSwitch => Tok::KwSwitch,
            Self::KwType => Tok::KwType, Self::KwVar => Tok::KwVar,

            Self::Ellipsis => Tok::Ellipsis, Self::Arrow => Tok::Arrow, Self::Inc => Tok::Inc,
            Self::Dec => Tok::Dec, Self::Assign => Tok::Assign, Self::Star => Tok::Star,
            Self::Tilde => Tok::Tilde, Self::Pipe => Tok::Pipe,

            Self::LParen => Tok::LParen, Self::RParen => Tok::RParen, Self::LBrack => Tok::LBrack,
            Self::RBrack => Tok::RBrack, Self::LBrace => Tok::LBrace, Self::RBrace => Tok::RBrace,
            Self::Comma => Tok::Comma, Self::Semi => Tok::Semi, Self::Colon => Tok::Colon, Self::Dot => Tok::Dot,

            // Trivia and BOM never reach here; the wrapper handles them.
            Self::Bom | Self::Newline | Self::Error => Tok::Error,
        }
    }
}

// =============================================================================
// 2. Public tokens (zero-copy)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'input> {
    Ident(&'input str),
    Number(&'input str),
    RuneLit(&'input str),
    /// Interpreted or raw string, quotes included.
    StringLit(&'input str),
    /// Line or block comment, delimiters included.
    Comment(&'input str),
    /// Operator without meaning at declaration level.
    Op(&'input str),

    // Keywords
    KwBreak,
    KwCase,
    KwChan,
    KwConst,
    KwContinue,
    KwDefault,
    KwDefer,
    KwElse,
    KwFallthrough,
    KwFor,
    KwFunc,
    KwGo,
    KwGoto,
    KwIf,
    KwImport,
    KwInterface,
    KwMap,
    KwPackage,
    KwRange,
    KwReturn,
    KwSelect,
    KwStruct,
    KwSwitch,
    KwType,
    KwVar,

    Ellipsis,
    Arrow,
    Inc,
    Dec,
    Assign,
    Star,
    Tilde,
    Pipe,

    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,

    Error,
}

impl<'input> Tok<'input> {
    /// Canonical source text of the token (keywords and punctuation included).
    pub const fn text(&self) -> &'input str {
        match self {
            Tok::Ident(s)
            | Tok::Number(s)
            | Tok::RuneLit(s)
            | Tok::StringLit(s)
            | Tok::Comment(s)
            | Tok::Op(s) => s,
            Tok::KwBreak => "break",
            Tok::KwCase => "case",
            Tok::KwChan => "chan",
            Tok::KwConst => "const",
            Tok::KwContinue => "continue",
            Tok::KwDefault => "default",
            Tok::KwDefer => "defer",
            Tok::KwElse => "else",
            Tok::KwFallthrough => "fallthrough",
            Tok::KwFor => "for",
            Tok::KwFunc => "func",
            Tok::KwGo => "go",
            Tok::KwGoto => "goto",
            Tok::KwIf => "if",
            Tok::KwImport => "import",
            Tok::KwInterface => "interface",
            Tok::KwMap => "map",
            Tok::KwPackage => "package",
            Tok::KwRange => "range",
            Tok::KwReturn => "return",
            Tok::KwSelect => "select",
            Tok::KwStruct => "struct",
            Tok::KwSwitch => "switch",
            Tok::KwType => "type",
            Tok::KwVar => "var",
            Tok::Ellipsis => "...",
            Tok::Arrow => "<-",
            Tok::Inc => "++",
            Tok::Dec => "--",
            Tok::Assign => "=",
            Tok::Star => "*",
            Tok::Tilde => "~",
            Tok::Pipe => "|",
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::LBrack => "[",
            Tok::RBrack => "]",
            Tok::LBrace => "{",
            Tok::RBrace => "}",
            Tok::Comma => ",",
            Tok::Semi => ";",
            Tok::Colon => ":",
            Tok::Dot => ".",
            Tok::Error => "<error>",
        }
    }
}

impl std::fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Ident(s) => write!(f, "identifier `{s}`"),
            Tok::Comment(_) => f.write_str("comment"),
            Tok::Semi => f.write_str("`;` or newline"),
            other => write!(f, "`{}`", other.text()),
        }
    }
}

// =============================================================================
// 3. Lexer wrapper: semicolon insertion + comments + diags
// =============================================================================

pub type Spanned<'src> = (usize, Tok<'src>, usize);

pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    pending: Option<Spanned<'src>>,
    diags: Vec<Diag>,
    last_can_insert_semi: bool,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            pending: None,
            diags: Vec::new(),
            last_can_insert_semi: false,
            src_len: input.len(),
            eof_done: false,
        }
    }

    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    #[inline]
    fn push_lex_diag(&mut self, kind: LexErrorKind, span: Range<usize>) {
        let span = Span::from_range(span);
        self.diags.push(LexError { kind, span }.diag());
    }

    #[inline]
    fn error_token(&mut self, kind: LexErrorKind, span: Range<usize>) -> Spanned<'src> {
        self.push_lex_diag(kind, span.clone());
        self.last_can_insert_semi = false;
        (span.start, Tok::Error, span.end)
    }

    /// Emits `;` now when one is owed, deferring `deferred` to the next call.
    #[inline]
    fn semi_then(&mut self, pos: usize, deferred: Spanned<'src>) -> Spanned<'src> {
        self.last_can_insert_semi = false;
        self.pending = Some(deferred);
        (pos, Tok::Semi, pos)
    }

    fn handle_raw_token(&mut self, raw: RawTok) -> Option<Spanned<'src>> {
        let span = self.logos.span();
        let slice = self.logos.slice();

        match raw {
            RawTok::Bom if span.start == 0 => None,
            RawTok::Bom => Some(self.error_token(LexErrorKind::MisplacedBom, span)),
            RawTok::Error => Some(self.error_token(LexErrorKind::InvalidToken, span)),
            RawTok::Newline => {
                if self.last_can_insert_semi {
                    self.last_can_insert_semi = false;
                    return Some((span.start, Tok::Semi, span.start));
                }
                None
            }
            RawTok::BlockComment if self.last_can_insert_semi && has_newline(slice) => {
                let comment = (span.start, Tok::Comment(slice), span.end);
                Some(self.semi_then(span.start, comment))
            }
            // Comments keep the semicolon state: the newline that follows decides.
            RawTok::LineComment | RawTok::BlockComment => {
                Some((span.start, Tok::Comment(slice), span.end))
            }
            _ => {
                self.last_can_insert_semi = raw.can_insert_semicolon();
                Some((span.start, raw.to_token(slice), span.end))
            }
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Spanned<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.take() {
                return Some(tok);
            }

            if self.eof_done {
                return None;
            }

            match self.logos.next() {
                None => {
                    self.eof_done = true;
                    if self.last_can_insert_semi {
                        self.last_can_insert_semi = false;
                        return Some((self.src_len, Tok::Semi, self.src_len));
                    }
                }
                Some(Err(kind)) => {
                    let span = self.logos.span();
                    return Some(self.error_token(kind, span));
                }
                Some(Ok(raw)) => {
                    if let Some(item) = self.handle_raw_token(raw) {
                        return Some(item);
                    }
                }
            }
        }
    }
}
