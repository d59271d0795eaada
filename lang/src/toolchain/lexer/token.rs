use std::fmt::Display;
use std::sync::Arc;

use bstr::BString;
use num_bigint::BigInt;

/// A single lexical token of Starlark source.
///
/// `start` and `end` are byte offsets into the source buffer, `0 <= start <= end <= len`.
/// Synthesized tokens (`Newline` at end of input, `Indent`, `Outdent`, `Eof`) may use zero-width
/// or end-of-buffer spans; every other token covers exactly the input text it was scanned from.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The kind of Token.
    pub kind: TokenKind,

    /// Byte offset of the first byte of the token.
    pub start: u32,

    /// Byte offset one past the last byte of the token.
    pub end: u32,

    /// The decoded payload, for the token kinds that carry one.
    pub value: TokenValue,
}

// Tokens are created in bulk and copied into the parser; keep them compact.
const_assert!(std::mem::size_of::<Token>() <= 64);

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Token {
        Token { kind, start, end, value: TokenValue::None }
    }

    pub fn with_value(kind: TokenKind, start: u32, end: u32, value: TokenValue) -> Token {
        Token { kind, start, end, value }
    }
}

/// An enumeration of all possible Token types in Starlark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// A `#` comment. The scanner collects comments off to the side rather than emitting them in
    /// the token stream; this kind exists for consumers that re-present comment records as
    /// tokens.
    Comment,

    /// Bracketing and statement punctuation.
    Delimiter { kind: DelimiterKind },

    /// End of input. Reported after the final `Newline` and any closing `Outdent` tokens.
    Eof,

    /// A name: `[A-Za-z_][A-Za-z0-9_]*`. Identifiers are ASCII only.
    Identifier,

    /// A character with no meaning in the language, carried so the parser can point at it.
    Illegal,

    /// The start of an indented block. Synthesized; covers no input text.
    Indent,

    /// A literal value in the code.
    Literal { kind: LiteralKind },

    /// A statement-terminating line break. Inside brackets, line breaks are plain whitespace and
    /// produce no token.
    Newline,

    /// An arithmetic, comparison, bitwise, or augmented-assignment operator.
    Operator { kind: OperatorKind },

    /// The end of an indented block. Synthesized; covers no input text.
    Outdent,

    /// A reserved word, such as `def` or `lambda`.
    Reserved { kind: ReservedKind },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelimiterKind {
    /// `}` single-character delimiter.
    BraceClose,

    /// `{` single-character delimiter.
    BraceOpen,

    /// `]` single-character delimiter.
    BracketClose,

    /// `[` single-character delimiter.
    BracketOpen,

    /// `:` single-character delimiter.
    Colon,

    /// `,` single-character delimiter.
    Comma,

    /// `.` single-character delimiter.
    Dot,

    /// `)` single-character delimiter.
    ParenClose,

    /// `(` single-character delimiter.
    ParenOpen,

    /// `;` single-character delimiter.
    Semicolon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorKind {
    Ampersand,
    AmpersandEquals,
    Caret,
    CaretEquals,
    Equals,
    EqualsEquals,
    Greater,
    GreaterEquals,
    GreaterGreater,
    GreaterGreaterEquals,
    Less,
    LessEquals,
    LessLess,
    LessLessEquals,
    Minus,
    MinusEquals,
    NotEquals,
    Percent,
    PercentEquals,
    Pipe,
    PipeEquals,
    Plus,
    PlusEquals,
    Slash,
    SlashEquals,
    SlashSlash,
    SlashSlashEquals,
    Star,
    StarEquals,
    StarStar,
    Tilde,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    /// A byte string literal, introduced by a `b` prefix. Decodes to a byte sequence.
    Bytes,

    /// A floating point literal. Decodes to an IEEE double.
    Float,

    /// An integer literal in decimal, hex (`0x`), octal (`0o`), or binary (`0b`) notation.
    Int,

    /// A text string literal. Decodes to UTF-8 text.
    Str,
}

/// The reserved words of the language. Note that some of these (`class`, `nonlocal`, ...) are
/// reserved without being implemented, so the parser can give good errors on Python input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReservedKind {
    And,
    As,
    Assert,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Load,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,
}

/// Looks up the reserved word for an identifier, if there is one.
pub fn keyword(text: &str) -> Option<ReservedKind> {
    let kind = match text {
        "and" => ReservedKind::And,
        "as" => ReservedKind::As,
        "assert" => ReservedKind::Assert,
        "break" => ReservedKind::Break,
        "class" => ReservedKind::Class,
        "continue" => ReservedKind::Continue,
        "def" => ReservedKind::Def,
        "del" => ReservedKind::Del,
        "elif" => ReservedKind::Elif,
        "else" => ReservedKind::Else,
        "except" => ReservedKind::Except,
        "finally" => ReservedKind::Finally,
        "for" => ReservedKind::For,
        "from" => ReservedKind::From,
        "global" => ReservedKind::Global,
        "if" => ReservedKind::If,
        "import" => ReservedKind::Import,
        "in" => ReservedKind::In,
        "is" => ReservedKind::Is,
        "lambda" => ReservedKind::Lambda,
        "load" => ReservedKind::Load,
        "nonlocal" => ReservedKind::Nonlocal,
        "not" => ReservedKind::Not,
        "or" => ReservedKind::Or,
        "pass" => ReservedKind::Pass,
        "raise" => ReservedKind::Raise,
        "return" => ReservedKind::Return,
        "try" => ReservedKind::Try,
        "while" => ReservedKind::While,
        "with" => ReservedKind::With,
        "yield" => ReservedKind::Yield,
        _ => return None,
    };
    Some(kind)
}

/// The decoded payload of a token.
///
/// Present exactly for string, byte, integer, float, and identifier tokens; `Illegal` tokens
/// reuse [TokenValue::Str] to carry the offending character. Everything else is
/// [TokenValue::None].
#[derive(Clone, Debug, PartialEq)]
pub enum TokenValue {
    None,

    /// Decoded text of a string literal (or the character of an `Illegal` token).
    Str(String),

    /// Decoded contents of a byte literal. Not necessarily valid UTF-8.
    Bytes(BString),

    Int(IntValue),

    Float(f64),

    /// The interned name of an identifier. Equality is by text.
    Ident(Arc<str>),
}

/// An integer value in its narrowest exact representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntValue {
    /// Values representable in a machine word.
    Int(i64),

    /// Everything larger.
    BigInt(BigInt),
}

impl Display for IntValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            IntValue::Int(n) => write!(f, "{}", n),
            IntValue::BigInt(n) => write!(f, "{}", n),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            TokenKind::Comment => "comment",

            TokenKind::Delimiter { kind: DelimiterKind::BraceClose } => "closing brace '}'",
            TokenKind::Delimiter { kind: DelimiterKind::BraceOpen } => "opening brace '{'",
            TokenKind::Delimiter { kind: DelimiterKind::BracketClose } => "closing bracket ']'",
            TokenKind::Delimiter { kind: DelimiterKind::BracketOpen } => "opening bracket '['",
            TokenKind::Delimiter { kind: DelimiterKind::Colon } => "colon ':'",
            TokenKind::Delimiter { kind: DelimiterKind::Comma } => "comma ','",
            TokenKind::Delimiter { kind: DelimiterKind::Dot } => "dot '.'",
            TokenKind::Delimiter { kind: DelimiterKind::ParenClose } => "closing parenthesis ')'",
            TokenKind::Delimiter { kind: DelimiterKind::ParenOpen } => "opening parenthesis '('",
            TokenKind::Delimiter { kind: DelimiterKind::Semicolon } => "semicolon ';'",

            TokenKind::Eof => "end of input",
            TokenKind::Identifier => "identifier",
            TokenKind::Illegal => "illegal character",
            TokenKind::Indent => "indent",

            TokenKind::Literal { kind: LiteralKind::Bytes } => "byte literal",
            TokenKind::Literal { kind: LiteralKind::Float } => "floating point literal",
            TokenKind::Literal { kind: LiteralKind::Int } => "integer literal",
            TokenKind::Literal { kind: LiteralKind::Str } => "string literal",

            TokenKind::Newline => "newline",

            TokenKind::Operator { kind: OperatorKind::Ampersand } => "ampersand '&'",
            TokenKind::Operator { kind: OperatorKind::AmpersandEquals } => "ampersand equals '&='",
            TokenKind::Operator { kind: OperatorKind::Caret } => "caret '^'",
            TokenKind::Operator { kind: OperatorKind::CaretEquals } => "caret equals '^='",
            TokenKind::Operator { kind: OperatorKind::Equals } => "equals '='",
            TokenKind::Operator { kind: OperatorKind::EqualsEquals } => "equals equals '=='",
            TokenKind::Operator { kind: OperatorKind::Greater } => "greater than '>'",
            TokenKind::Operator { kind: OperatorKind::GreaterEquals } => "greater equals '>='",
            TokenKind::Operator { kind: OperatorKind::GreaterGreater } => "right shift '>>'",
            TokenKind::Operator { kind: OperatorKind::GreaterGreaterEquals } => {
                "right shift equals '>>='"
            }
            TokenKind::Operator { kind: OperatorKind::Less } => "less than '<'",
            TokenKind::Operator { kind: OperatorKind::LessEquals } => "less equals '<='",
            TokenKind::Operator { kind: OperatorKind::LessLess } => "left shift '<<'",
            TokenKind::Operator { kind: OperatorKind::LessLessEquals } => "left shift equals '<<='",
            TokenKind::Operator { kind: OperatorKind::Minus } => "minus '-'",
            TokenKind::Operator { kind: OperatorKind::MinusEquals } => "minus equals '-='",
            TokenKind::Operator { kind: OperatorKind::NotEquals } => "not equals '!='",
            TokenKind::Operator { kind: OperatorKind::Percent } => "percent '%'",
            TokenKind::Operator { kind: OperatorKind::PercentEquals } => "percent equals '%='",
            TokenKind::Operator { kind: OperatorKind::Pipe } => "pipe '|'",
            TokenKind::Operator { kind: OperatorKind::PipeEquals } => "pipe equals '|='",
            TokenKind::Operator { kind: OperatorKind::Plus } => "plus '+'",
            TokenKind::Operator { kind: OperatorKind::PlusEquals } => "plus equals '+='",
            TokenKind::Operator { kind: OperatorKind::Slash } => "slash '/'",
            TokenKind::Operator { kind: OperatorKind::SlashEquals } => "slash equals '/='",
            TokenKind::Operator { kind: OperatorKind::SlashSlash } => "floor division '//'",
            TokenKind::Operator { kind: OperatorKind::SlashSlashEquals } => {
                "floor division equals '//='"
            }
            TokenKind::Operator { kind: OperatorKind::Star } => "star '*'",
            TokenKind::Operator { kind: OperatorKind::StarEquals } => "star equals '*='",
            TokenKind::Operator { kind: OperatorKind::StarStar } => "star star '**'",
            TokenKind::Operator { kind: OperatorKind::Tilde } => "tilde '~'",

            TokenKind::Outdent => "outdent",

            TokenKind::Reserved { kind: ReservedKind::And } => "keyword 'and'",
            TokenKind::Reserved { kind: ReservedKind::As } => "keyword 'as'",
            TokenKind::Reserved { kind: ReservedKind::Assert } => "keyword 'assert'",
            TokenKind::Reserved { kind: ReservedKind::Break } => "keyword 'break'",
            TokenKind::Reserved { kind: ReservedKind::Class } => "keyword 'class'",
            TokenKind::Reserved { kind: ReservedKind::Continue } => "keyword 'continue'",
            TokenKind::Reserved { kind: ReservedKind::Def } => "keyword 'def'",
            TokenKind::Reserved { kind: ReservedKind::Del } => "keyword 'del'",
            TokenKind::Reserved { kind: ReservedKind::Elif } => "keyword 'elif'",
            TokenKind::Reserved { kind: ReservedKind::Else } => "keyword 'else'",
            TokenKind::Reserved { kind: ReservedKind::Except } => "keyword 'except'",
            TokenKind::Reserved { kind: ReservedKind::Finally } => "keyword 'finally'",
            TokenKind::Reserved { kind: ReservedKind::For } => "keyword 'for'",
            TokenKind::Reserved { kind: ReservedKind::From } => "keyword 'from'",
            TokenKind::Reserved { kind: ReservedKind::Global } => "keyword 'global'",
            TokenKind::Reserved { kind: ReservedKind::If } => "keyword 'if'",
            TokenKind::Reserved { kind: ReservedKind::Import } => "keyword 'import'",
            TokenKind::Reserved { kind: ReservedKind::In } => "keyword 'in'",
            TokenKind::Reserved { kind: ReservedKind::Is } => "keyword 'is'",
            TokenKind::Reserved { kind: ReservedKind::Lambda } => "keyword 'lambda'",
            TokenKind::Reserved { kind: ReservedKind::Load } => "keyword 'load'",
            TokenKind::Reserved { kind: ReservedKind::Nonlocal } => "keyword 'nonlocal'",
            TokenKind::Reserved { kind: ReservedKind::Not } => "keyword 'not'",
            TokenKind::Reserved { kind: ReservedKind::Or } => "keyword 'or'",
            TokenKind::Reserved { kind: ReservedKind::Pass } => "keyword 'pass'",
            TokenKind::Reserved { kind: ReservedKind::Raise } => "keyword 'raise'",
            TokenKind::Reserved { kind: ReservedKind::Return } => "keyword 'return'",
            TokenKind::Reserved { kind: ReservedKind::Try } => "keyword 'try'",
            TokenKind::Reserved { kind: ReservedKind::While } => "keyword 'while'",
            TokenKind::Reserved { kind: ReservedKind::With } => "keyword 'with'",
            TokenKind::Reserved { kind: ReservedKind::Yield } => "keyword 'yield'",
        };
        f.write_str(s)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}..{} {}", self.start, self.end, self.kind)?;
        match &self.value {
            TokenValue::None => Ok(()),
            TokenValue::Str(s) => write!(f, " {:?}", s),
            TokenValue::Bytes(b) => write!(f, " {:?}", b),
            TokenValue::Int(n) => write!(f, " {}", n),
            TokenValue::Float(x) => write!(f, " {}", x),
            TokenValue::Ident(name) => write!(f, " '{}'", name),
        }
    }
}
