use bstr::BStr;

use crate::toolchain::diagnostics::diagnostic_emitter::Diagnostic;
use crate::toolchain::diagnostics::diagnostic_emitter::DiagnosticConsumer;
use crate::toolchain::diagnostics::diagnostic_emitter::DiagnosticLevel;
use crate::toolchain::diagnostics::diagnostic_emitter::DiagnosticMessage;
use crate::toolchain::diagnostics::diagnostic_kind::DiagnosticKind;
use crate::toolchain::diagnostics::diagnostic_kind::LexerDiagnosticKind;
use crate::toolchain::source::SourceBuffer;

use super::file_locations::FileLocations;
use super::interner;
use super::token::keyword;
use super::token::DelimiterKind;
use super::token::IntValue;
use super::token::LiteralKind;
use super::token::OperatorKind;
use super::token::Token;
use super::token::TokenKind;
use super::token::TokenValue;
use super::LexOptions;

/// A single `#` comment: its byte offset and raw text, including the leading `#` but not the
/// line terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Comment<'s> {
    pub start: u32,
    pub text: &'s BStr,
}

/// Token scanner over a SourceBuffer.
///
/// One Cursor is built per source file and walked once: [Cursor::next_token] produces exactly
/// one token per call, ending with [TokenKind::Eof], after which it answers `Eof` forever. The
/// `Iterator` implementation yields every token through `Eof` inclusive.
///
/// Design roughly inspired by the rustc lexer Cursor.
pub struct Cursor<'s, 'l, 'd> {
    buf: &'s [u8],
    locs: &'l FileLocations,
    options: LexOptions,

    /// Next unread byte offset.
    pos: usize,

    /// Column widths of the currently open indentation levels. The bottom element is always 0.
    indent_stack: Vec<usize>,

    /// Count of unclosed `(`, `[`, `{`. Line breaks are plain whitespace while nonzero.
    open_paren_depth: usize,

    /// Set when the previous token was a `Newline`, meaning the next call must measure the
    /// indentation of the new line before scanning.
    check_indentation: bool,

    /// Number of `Indent` (> 0) or `Outdent` (< 0) tokens decided but not yet returned.
    dents: i32,

    /// Whether the last non-dent token returned was a `Newline`. Used to synthesize the final
    /// newline before end of input.
    after_newline: bool,

    done: bool,

    comments: Vec<Comment<'s>>,

    diags: &'d mut dyn DiagnosticConsumer,
}

impl<'s, 'l, 'd> Cursor<'s, 'l, 'd> {
    pub fn new(
        source: &'s SourceBuffer,
        locs: &'l FileLocations,
        options: LexOptions,
        diags: &'d mut dyn DiagnosticConsumer,
    ) -> Cursor<'s, 'l, 'd> {
        Cursor {
            buf: source.code().as_ref(),
            locs,
            options,
            pos: 0,
            indent_stack: vec![0],
            open_paren_depth: 0,
            // Leading whitespace on the first line is indentation too.
            check_indentation: true,
            dents: 0,
            after_newline: false,
            done: false,
            comments: Vec::new(),
            diags,
        }
    }

    /// The comments collected so far, in source order.
    pub fn comments(&self) -> &[Comment<'s>] {
        &self.comments
    }

    /// Scans and returns the next token.
    ///
    /// Problems in the input are reported to the diagnostic consumer and scanning continues
    /// with the most plausible token, so this never fails. As in Python, the token stream
    /// always ends with a `Newline` before `Eof`, even when the input does not end with one.
    pub fn next_token(&mut self) -> Token {
        if self.done {
            let end = self.buf.len() as u32;
            return Token::new(TokenKind::Eof, end, end);
        }
        let mut token = self.tokenize();
        match token.kind {
            TokenKind::Eof => {
                if !self.after_newline {
                    token.kind = TokenKind::Newline;
                    self.after_newline = true;
                    return token;
                }
                self.done = true;
            }
            TokenKind::Newline => self.after_newline = true,
            // Indent and outdent runs sit between a newline and the next statement; they do not
            // change whether the line was terminated.
            TokenKind::Indent | TokenKind::Outdent => {}
            _ => self.after_newline = false,
        }
        token
    }

    // Returns the ith unread byte, if there is one.
    fn peek(&self, i: usize) -> Option<u8> {
        self.buf.get(self.pos + i).copied()
    }

    // Consumes one byte and returns the next unread byte.
    fn next(&mut self) -> Option<u8> {
        self.pos += 1;
        self.peek(0)
    }

    fn error(&mut self, kind: LexerDiagnosticKind, body: String, offset: usize) {
        let location = self.locs.diagnostic_location(BStr::new(self.buf), offset as u32);
        let message = DiagnosticMessage {
            kind: DiagnosticKind::LexerError { kind },
            location,
            body,
        };
        self.diags.handle_diagnostic(Diagnostic::new(DiagnosticLevel::Error, message, Vec::new()));
    }

    fn add_comment(&mut self, start: usize, end: usize) {
        self.comments.push(Comment {
            start: start as u32,
            text: BStr::new(&self.buf[start..end]),
        });
    }

    /// Produces one token. The driver behind [Cursor::next_token], without the final-newline
    /// synthesis.
    fn tokenize(&mut self) -> Token {
        if self.check_indentation {
            self.check_indentation = false;
            self.compute_indentation();
        }

        // Return saved indentation tokens.
        if self.dents != 0 {
            let start = self.pos.saturating_sub(1) as u32;
            if self.dents < 0 {
                self.dents += 1;
                return Token::new(TokenKind::Outdent, start, self.pos as u32);
            } else {
                self.dents -= 1;
                return Token::new(TokenKind::Indent, start, self.pos as u32);
            }
        }

        while let Some(c) = self.peek(0) {
            // Operators with an `=` suffix, and `**`, match ahead of single characters.
            if let Some(token) = self.tokenize_two_chars() {
                self.pos += 2;
                return token;
            }
            self.pos += 1;
            let start = (self.pos - 1) as u32;
            match c {
                b'{' => {
                    self.open_paren_depth += 1;
                    return self.delimiter(DelimiterKind::BraceOpen, start);
                }
                b'}' => {
                    self.pop_paren();
                    return self.delimiter(DelimiterKind::BraceClose, start);
                }
                b'(' => {
                    self.open_paren_depth += 1;
                    return self.delimiter(DelimiterKind::ParenOpen, start);
                }
                b')' => {
                    self.pop_paren();
                    return self.delimiter(DelimiterKind::ParenClose, start);
                }
                b'[' => {
                    self.open_paren_depth += 1;
                    return self.delimiter(DelimiterKind::BracketOpen, start);
                }
                b']' => {
                    self.pop_paren();
                    return self.delimiter(DelimiterKind::BracketClose, start);
                }
                b'>' => {
                    let kind = if self.peek(0) == Some(b'>') && self.peek(1) == Some(b'=') {
                        self.pos += 2;
                        OperatorKind::GreaterGreaterEquals
                    } else if self.peek(0) == Some(b'>') {
                        self.pos += 1;
                        OperatorKind::GreaterGreater
                    } else {
                        OperatorKind::Greater
                    };
                    return self.operator(kind, start);
                }
                b'<' => {
                    let kind = if self.peek(0) == Some(b'<') && self.peek(1) == Some(b'=') {
                        self.pos += 2;
                        OperatorKind::LessLessEquals
                    } else if self.peek(0) == Some(b'<') {
                        self.pos += 1;
                        OperatorKind::LessLess
                    } else {
                        OperatorKind::Less
                    };
                    return self.operator(kind, start);
                }
                b'/' => {
                    // `/=` is caught by the two-character match above.
                    let kind = if self.peek(0) == Some(b'/') && self.peek(1) == Some(b'=') {
                        self.pos += 2;
                        OperatorKind::SlashSlashEquals
                    } else if self.peek(0) == Some(b'/') {
                        self.pos += 1;
                        OperatorKind::SlashSlash
                    } else {
                        OperatorKind::Slash
                    };
                    return self.operator(kind, start);
                }
                b':' => return self.delimiter(DelimiterKind::Colon, start),
                b',' => return self.delimiter(DelimiterKind::Comma, start),
                b';' => return self.delimiter(DelimiterKind::Semicolon, start),
                b'+' => return self.operator(OperatorKind::Plus, start),
                b'-' => return self.operator(OperatorKind::Minus, start),
                b'|' => return self.operator(OperatorKind::Pipe, start),
                b'=' => return self.operator(OperatorKind::Equals, start),
                b'%' => return self.operator(OperatorKind::Percent, start),
                b'~' => return self.operator(OperatorKind::Tilde, start),
                b'&' => return self.operator(OperatorKind::Ampersand, start),
                b'^' => return self.operator(OperatorKind::Caret, start),
                b'*' => return self.operator(OperatorKind::Star, start),

                // Space between tokens.
                b' ' | b'\t' | b'\r' => {}

                b'\\' => {
                    // A backslash is valid only at the end of a line (or in a string), where it
                    // joins the next physical line to this one.
                    if self.peek(0) == Some(b'\n') {
                        self.pos += 1;
                    } else if self.peek(0) == Some(b'\r') && self.peek(1) == Some(b'\n') {
                        self.pos += 2;
                    } else {
                        self.error(
                            LexerDiagnosticKind::InvalidCharacter,
                            "invalid character: '\\'".to_string(),
                            start as usize,
                        );
                        return Token::with_value(
                            TokenKind::Illegal,
                            start,
                            self.pos as u32,
                            TokenValue::Str(String::from("\\")),
                        );
                    }
                }

                b'\n' => {
                    if let Some(token) = self.newline() {
                        return token;
                    }
                }

                b'#' => {
                    let old_pos = self.pos - 1;
                    while let Some(c) = self.peek(0) {
                        if c == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                    self.add_comment(old_pos, self.pos);
                }

                b'\'' | b'"' => return self.string_literal(c, false, LiteralKind::Str, start as usize),

                _ => {
                    // Raw and byte string prefixes: r"..", b"..", rb"..".
                    if c == b'r' || c == b'b' {
                        if let Some(quote @ (b'\'' | b'"')) = self.peek(0) {
                            self.pos += 1;
                            let kind =
                                if c == b'r' { LiteralKind::Str } else { LiteralKind::Bytes };
                            return self.string_literal(quote, c == b'r', kind, start as usize);
                        }
                        if c == b'r' && self.peek(0) == Some(b'b') {
                            if let Some(quote @ (b'\'' | b'"')) = self.peek(1) {
                                self.pos += 2;
                                return self.string_literal(
                                    quote,
                                    true,
                                    LiteralKind::Bytes,
                                    start as usize,
                                );
                            }
                        }
                    }

                    // Int or float literal, or dot.
                    if c == b'.' || c.is_ascii_digit() {
                        self.pos -= 1;
                        return self.scan_number_or_dot(c);
                    }

                    if c.is_ascii_alphabetic() || c == b'_' {
                        return self.identifier_or_keyword();
                    }

                    // Nothing matches. Take one whole character so a multi-byte sequence
                    // produces a single token rather than one per byte.
                    let (decoded, width) = bstr::decode_utf8(&self.buf[start as usize..]);
                    self.pos = start as usize + width.max(1);
                    let display = match decoded {
                        Some(ch) => ch.to_string(),
                        None => String::from("\u{FFFD}"),
                    };
                    self.error(
                        LexerDiagnosticKind::InvalidCharacter,
                        format!("invalid character: '{}'", display),
                        start as usize,
                    );
                    return Token::with_value(
                        TokenKind::Illegal,
                        start,
                        self.pos as u32,
                        TokenValue::Str(display),
                    );
                }
            }
        }

        // End of input. Unwind any open indentation, terminating the last statement first.
        if self.indent_stack.len() > 1 {
            let start = self.pos.saturating_sub(1) as u32;
            let token = Token::new(TokenKind::Newline, start, self.pos as u32);
            while self.indent_stack.len() > 1 {
                self.indent_stack.pop();
                self.dents -= 1;
            }
            return token;
        }

        Token::new(TokenKind::Eof, self.pos as u32, self.pos as u32)
    }

    fn delimiter(&self, kind: DelimiterKind, start: u32) -> Token {
        Token::new(TokenKind::Delimiter { kind }, start, self.pos as u32)
    }

    fn operator(&self, kind: OperatorKind, start: u32) -> Token {
        Token::new(TokenKind::Operator { kind }, start, self.pos as u32)
    }

    fn tokenize_two_chars(&self) -> Option<Token> {
        let c1 = self.peek(0)?;
        let c2 = self.peek(1)?;
        let kind = if c2 == b'=' {
            match c1 {
                b'=' => OperatorKind::EqualsEquals,
                b'!' => OperatorKind::NotEquals,
                b'>' => OperatorKind::GreaterEquals,
                b'<' => OperatorKind::LessEquals,
                b'+' => OperatorKind::PlusEquals,
                b'-' => OperatorKind::MinusEquals,
                b'*' => OperatorKind::StarEquals,
                b'/' => OperatorKind::SlashEquals,
                b'%' => OperatorKind::PercentEquals,
                b'^' => OperatorKind::CaretEquals,
                b'&' => OperatorKind::AmpersandEquals,
                b'|' => OperatorKind::PipeEquals,
                _ => return None,
            }
        } else if c1 == b'*' && c2 == b'*' {
            OperatorKind::StarStar
        } else {
            return None;
        };
        Some(Token::new(
            TokenKind::Operator { kind },
            self.pos as u32,
            (self.pos + 2) as u32,
        ))
    }

    fn pop_paren(&mut self) {
        if self.open_paren_depth == 0 {
            self.error(
                LexerDiagnosticKind::IndentationMismatch,
                "indentation error".to_string(),
                self.pos.saturating_sub(1),
            );
        } else {
            self.open_paren_depth -= 1;
        }
    }

    /// Handles an end-of-line sequence. Outside brackets the line break terminates a statement
    /// and arms indentation measurement; inside brackets it is whitespace.
    ///
    /// UNIX newlines are assumed (LF). Carriage returns are always ignored.
    fn newline(&mut self) -> Option<Token> {
        if self.open_paren_depth > 0 {
            self.newline_inside_expression();
            return None;
        }
        self.check_indentation = true;
        Some(Token::new(TokenKind::Newline, (self.pos - 1) as u32, self.pos as u32))
    }

    fn newline_inside_expression(&mut self) {
        while let Some(b' ' | b'\t' | b'\r') = self.peek(0) {
            self.pos += 1;
        }
    }

    /// Measures the indentation of the next non-blank line, pushing or popping indentation
    /// levels and crediting `dents` accordingly.
    fn compute_indentation(&mut self) {
        let mut indent_len: usize = 0;
        while let Some(c) = self.peek(0) {
            match c {
                b' ' => {
                    indent_len += 1;
                    self.pos += 1;
                }
                b'\r' => {
                    self.pos += 1;
                }
                b'\t' => {
                    // Tabs are rejected but still counted, so the rest of the file parses
                    // against a stable indentation.
                    indent_len += 1;
                    self.pos += 1;
                    self.error(
                        LexerDiagnosticKind::TabIndentation,
                        "Tab characters are not allowed for indentation. Use spaces instead."
                            .to_string(),
                        self.pos,
                    );
                }
                b'\n' => {
                    // Entirely blank line: discard.
                    indent_len = 0;
                    self.pos += 1;
                }
                b'#' => {
                    // Line containing only an indented comment.
                    let old_pos = self.pos;
                    while let Some(c) = self.peek(0) {
                        if c == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                    self.add_comment(old_pos, self.pos);
                    indent_len = 0;
                }
                _ => break,
            }
        }

        if self.pos == self.buf.len() {
            // Trailing space on the last line is not an indent.
            indent_len = 0;
        }

        let mut top = self.indent_stack.last().copied().unwrap_or(0);
        if top < indent_len {
            self.indent_stack.push(indent_len);
            self.dents += 1;
        } else if top > indent_len {
            while top > indent_len {
                self.indent_stack.pop();
                self.dents -= 1;
                top = self.indent_stack.last().copied().unwrap_or(0);
            }
            if top < indent_len {
                self.error(
                    LexerDiagnosticKind::IndentationMismatch,
                    "indentation error".to_string(),
                    self.pos.saturating_sub(1),
                );
            }
        }
    }

    // Consumes the two remaining bytes of a triple quote delimiter, if present.
    fn skip_triple_quote(&mut self, quote: u8) -> bool {
        if self.peek(0) == Some(quote) && self.peek(1) == Some(quote) {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    fn literal_value(kind: LiteralKind, bytes: &[u8]) -> TokenValue {
        match kind {
            LiteralKind::Bytes => TokenValue::Bytes(bytes.into()),
            _ => TokenValue::Str(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Scans a string or byte literal delimited by `quote`.
    ///
    /// On entry `pos` is 1 past the opening delimiter and `literal_start` is the offset of the
    /// token, including any `r`/`b` prefix. On exit `pos` is 1 past the closing delimiter.
    ///
    /// This is the optimistic scan for a literal that needs no decoding: the value is the raw
    /// slice between the delimiters. Hitting an escape restarts the literal through
    /// [Cursor::escaped_literal] instead. Triple-quoted literals go there directly.
    fn string_literal(
        &mut self,
        quote: u8,
        is_raw: bool,
        kind: LiteralKind,
        literal_start: usize,
    ) -> Token {
        let content_start = self.pos;

        if self.skip_triple_quote(quote) {
            self.pos -= 2;
            return self.escaped_literal(quote, is_raw, kind, literal_start);
        }

        while self.pos < self.buf.len() {
            let c = self.buf[self.pos];
            self.pos += 1;
            match c {
                b'\n' => {
                    self.error(
                        LexerDiagnosticKind::UnclosedLiteral,
                        format!("unclosed {}", TokenKind::Literal { kind }),
                        literal_start,
                    );
                    let value = Self::literal_value(kind, &self.buf[content_start..self.pos - 1]);
                    return Token::with_value(
                        TokenKind::Literal { kind },
                        literal_start as u32,
                        self.pos as u32,
                        value,
                    );
                }
                b'\\' => {
                    if is_raw {
                        if self.peek(0) == Some(b'\r') && self.peek(1) == Some(b'\n') {
                            // CRLF after the backslash must collapse to a single LF, so the raw
                            // slice cannot be used as-is.
                            self.pos = content_start;
                            return self.escaped_literal(quote, true, kind, literal_start);
                        }
                        // The backslash and the following byte are both content.
                        self.pos += 1;
                    } else {
                        // Hit an escape: start over and decode into a buffer.
                        self.pos = content_start;
                        return self.escaped_literal(quote, false, kind, literal_start);
                    }
                }
                b'\'' | b'"' => {
                    if c == quote {
                        let value =
                            Self::literal_value(kind, &self.buf[content_start..self.pos - 1]);
                        return Token::with_value(
                            TokenKind::Literal { kind },
                            literal_start as u32,
                            self.pos as u32,
                            value,
                        );
                    }
                }
                _ => {}
            }
        }

        // Ran off the end of the input. The raw path above can step one past the end when the
        // buffer ends with a lone backslash.
        if self.pos > self.buf.len() {
            self.pos = self.buf.len();
        }
        self.error(
            LexerDiagnosticKind::UnclosedLiteral,
            format!("unclosed {}", TokenKind::Literal { kind }),
            literal_start,
        );
        let value = Self::literal_value(kind, &self.buf[content_start..self.pos]);
        Token::with_value(
            TokenKind::Literal { kind },
            literal_start as u32,
            self.pos as u32,
            value,
        )
    }

    /// Scans a string or byte literal containing escape sequences (or triple quotes), building
    /// the decoded value byte by byte.
    ///
    /// On entry `pos` is 1 past the opening delimiter; on exit it is 1 past the closing one.
    fn escaped_literal(
        &mut self,
        quote: u8,
        is_raw: bool,
        kind: LiteralKind,
        literal_start: usize,
    ) -> Token {
        let in_triple_quote = self.skip_triple_quote(quote);
        let mut literal: Vec<u8> = Vec::new();
        while self.pos < self.buf.len() {
            let c = self.buf[self.pos];
            self.pos += 1;
            match c {
                b'\n' => {
                    if in_triple_quote {
                        literal.push(c);
                    } else {
                        return self.unclosed_literal(kind, literal_start, literal);
                    }
                }
                b'\\' => {
                    if self.pos == self.buf.len() {
                        return self.unclosed_literal(kind, literal_start, literal);
                    }
                    if is_raw {
                        // Insert the backslash and the following character. As in Python, this
                        // means a raw string can never end with a single backslash. Line
                        // terminators after it normalize to LF.
                        literal.push(b'\\');
                        if self.peek(0) == Some(b'\r') && self.peek(1) == Some(b'\n') {
                            literal.push(b'\n');
                            self.pos += 2;
                        } else if matches!(self.buf[self.pos], b'\r' | b'\n') {
                            literal.push(b'\n');
                            self.pos += 1;
                        } else {
                            literal.push(self.buf[self.pos]);
                            self.pos += 1;
                        }
                    } else {
                        self.escape_sequence(kind, &mut literal);
                    }
                }
                b'\'' | b'"' => {
                    if c != quote || (in_triple_quote && !self.skip_triple_quote(quote)) {
                        // Non-matching quote: regular content.
                        literal.push(c);
                    } else {
                        // Matching close delimiter, all done.
                        return Token::with_value(
                            TokenKind::Literal { kind },
                            literal_start as u32,
                            self.pos as u32,
                            Self::finish_literal(kind, literal),
                        );
                    }
                }
                _ => literal.push(c),
            }
        }
        self.unclosed_literal(kind, literal_start, literal)
    }

    /// Decodes one escape sequence. On entry `pos` is at the byte after the backslash, which is
    /// known to exist. Appends the decoded bytes to `literal`; malformed sequences report an
    /// error and append nothing.
    fn escape_sequence(&mut self, kind: LiteralKind, literal: &mut Vec<u8>) {
        let c = self.buf[self.pos];
        self.pos += 1;
        match c {
            b'\r' => {
                // An escaped line terminator vanishes from the value.
                if self.peek(0) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            b'n' => literal.push(b'\n'),
            b'r' => literal.push(b'\r'),
            b't' => literal.push(b'\t'),
            b'\\' => literal.push(b'\\'),
            b'\'' => literal.push(b'\''),
            b'"' => literal.push(b'"'),
            b'a' => literal.push(0x07),
            b'b' => literal.push(0x08),
            b'f' => literal.push(0x0C),
            b'v' => literal.push(0x0B),
            b'0'..=b'7' => {
                let mut octal = (c - b'0') as u32;
                if let Some(d @ b'0'..=b'7') = self.peek(0) {
                    self.pos += 1;
                    octal = (octal << 3) | (d - b'0') as u32;
                    if let Some(d @ b'0'..=b'7') = self.peek(0) {
                        self.pos += 1;
                        octal = (octal << 3) | (d - b'0') as u32;
                    }
                }
                if octal > 0xff {
                    self.error(
                        LexerDiagnosticKind::EscapeOutOfRange,
                        "octal escape sequence out of range (maximum is \\377)".to_string(),
                        self.pos - 1,
                    );
                } else if kind == LiteralKind::Str && octal > 127 {
                    self.error(
                        LexerDiagnosticKind::EscapeOutOfRange,
                        format!(
                            "non-ASCII octal escape \\{:o} (use \\u{:04X} for the UTF-8 encoding of U+{:04X})",
                            octal, octal, octal
                        ),
                        self.pos - 1,
                    );
                } else {
                    literal.push(octal as u8);
                }
            }
            b'x' => {
                if self.pos + 2 >= self.buf.len() {
                    self.error(
                        LexerDiagnosticKind::InvalidEscape,
                        format!("truncated escape sequence \\x{}", self.remaining_text()),
                        self.pos - 1,
                    );
                    return;
                }
                let digits = &self.buf[self.pos..self.pos + 2];
                match hex_bytes_value(digits) {
                    None => {
                        self.error(
                            LexerDiagnosticKind::InvalidEscape,
                            format!("invalid escape sequence \\x{}", self.remaining_text()),
                            self.pos - 1,
                        );
                    }
                    Some(n) if kind == LiteralKind::Str && n > 127 => {
                        self.error(
                            LexerDiagnosticKind::EscapeOutOfRange,
                            format!(
                                "non-ASCII hex escape \\x{} (use \\u{:04X} for the UTF-8 encoding of U+{:04X})",
                                String::from_utf8_lossy(digits),
                                n,
                                n
                            ),
                            self.pos - 1,
                        );
                    }
                    Some(n) => {
                        literal.push(n as u8);
                        self.pos += 2;
                    }
                }
            }
            b'u' | b'U' => {
                let size = if c == b'u' { 4 } else { 8 };
                if self.pos + size >= self.buf.len() {
                    self.error(
                        LexerDiagnosticKind::InvalidEscape,
                        format!(
                            "truncated escape sequence \\{}{}",
                            c as char,
                            self.remaining_text()
                        ),
                        self.pos - 1,
                    );
                    return;
                }
                match hex_bytes_value(&self.buf[self.pos..self.pos + size]) {
                    None => {
                        self.error(
                            LexerDiagnosticKind::InvalidEscape,
                            format!(
                                "invalid escape sequence \\{}{}",
                                c as char,
                                self.remaining_text()
                            ),
                            self.pos - 1,
                        );
                    }
                    Some(n) if n > 0x10FFFF => {
                        self.error(
                            LexerDiagnosticKind::EscapeOutOfRange,
                            format!("code point out of range: \\U{:08X} (max \\U0010FFFF)", n),
                            self.pos - 1,
                        );
                    }
                    Some(n) if (0xD800..=0xDFFF).contains(&n) => {
                        // Surrogates are disallowed.
                        self.error(
                            LexerDiagnosticKind::EscapeOutOfRange,
                            format!("invalid Unicode code point U+{:04X}", n),
                            self.pos - 1,
                        );
                    }
                    Some(n) => {
                        if let Some(decoded) = char::from_u32(n) {
                            let mut utf8 = [0u8; 4];
                            literal.extend_from_slice(decoded.encode_utf8(&mut utf8).as_bytes());
                            self.pos += size;
                        }
                    }
                }
            }
            b'N' => {
                // Exists in Python but is not implemented here.
                self.error(
                    LexerDiagnosticKind::InvalidEscape,
                    "invalid escape sequence: \\N".to_string(),
                    self.pos - 1,
                );
            }
            _ => {
                // Unknown escape decodes to "\" and the character itself.
                if self.options.restrict_string_escapes {
                    self.error(
                        LexerDiagnosticKind::InvalidEscape,
                        format!(
                            "invalid escape sequence: \\{}. You can enable unknown escape sequences by passing the flag --incompatible_restrict_string_escapes=false",
                            c as char
                        ),
                        self.pos - 1,
                    );
                }
                literal.push(b'\\');
                literal.push(c);
            }
        }
    }

    // The unscanned remainder of the buffer, for escape error messages.
    fn remaining_text(&self) -> String {
        String::from_utf8_lossy(&self.buf[self.pos..]).into_owned()
    }

    fn finish_literal(kind: LiteralKind, literal: Vec<u8>) -> TokenValue {
        match kind {
            LiteralKind::Bytes => TokenValue::Bytes(literal.into()),
            _ => match String::from_utf8(literal) {
                Ok(text) => TokenValue::Str(text),
                Err(raw) => {
                    TokenValue::Str(String::from_utf8_lossy(raw.as_bytes()).into_owned())
                }
            },
        }
    }

    fn unclosed_literal(
        &mut self,
        kind: LiteralKind,
        literal_start: usize,
        literal: Vec<u8>,
    ) -> Token {
        self.error(
            LexerDiagnosticKind::UnclosedLiteral,
            format!("unclosed {}", TokenKind::Literal { kind }),
            literal_start,
        );
        Token::with_value(
            TokenKind::Literal { kind },
            literal_start as u32,
            self.pos as u32,
            Self::finish_literal(kind, literal),
        )
    }

    /// Scans a number (int or float) or a lone dot.
    ///
    /// Precondition: `first` is the byte at `pos`, a digit or `.`, not yet consumed.
    fn scan_number_or_dot(&mut self, first: u8) -> Token {
        let start = self.pos;
        let mut fraction = false;
        let mut exponent = false;

        if first == b'.' {
            // Dot, or the start of a fraction.
            if !matches!(self.peek(1), Some(d) if d.is_ascii_digit()) {
                self.pos += 1;
                return self.delimiter(DelimiterKind::Dot, start as u32);
            }
            fraction = true;
        } else if first == b'0' {
            // Hex, octal, binary, or float.
            let mut c = self.next();
            match c {
                Some(b'.') => fraction = true,
                Some(b'x') | Some(b'X') => {
                    c = self.next();
                    if !matches!(c, Some(d) if d.is_ascii_hexdigit()) {
                        self.error(
                            LexerDiagnosticKind::InvalidIntLiteral,
                            "invalid hex literal".to_string(),
                            start,
                        );
                    }
                    while matches!(c, Some(d) if d.is_ascii_hexdigit()) {
                        c = self.next();
                    }
                }
                Some(b'o') | Some(b'O') => {
                    c = self.next();
                    while matches!(c, Some(d) if d.is_ascii_digit()) {
                        c = self.next();
                    }
                }
                Some(b'b') | Some(b'B') => {
                    c = self.next();
                    if !matches!(c, Some(b'0' | b'1')) {
                        self.error(
                            LexerDiagnosticKind::InvalidIntLiteral,
                            "invalid binary literal".to_string(),
                            start,
                        );
                    }
                    while matches!(c, Some(b'0' | b'1')) {
                        c = self.next();
                    }
                }
                _ => {
                    // "0", a float, or a legacy octal like 0755.
                    while matches!(c, Some(d) if d.is_ascii_digit()) {
                        c = self.next();
                    }
                    match c {
                        Some(b'.') => fraction = true,
                        Some(b'e') | Some(b'E') => exponent = true,
                        _ => {}
                    }
                }
            }
        } else {
            // Decimal.
            let mut c = self.peek(0);
            while matches!(c, Some(d) if d.is_ascii_digit()) {
                c = self.next();
            }
            match c {
                Some(b'.') => fraction = true,
                Some(b'e') | Some(b'E') => exponent = true,
                _ => {}
            }
        }

        if fraction {
            let mut c = self.next(); // consume '.'
            while matches!(c, Some(d) if d.is_ascii_digit()) {
                c = self.next();
            }
            if matches!(c, Some(b'e') | Some(b'E')) {
                exponent = true;
            }
        }

        if exponent {
            let mut c = self.next(); // consume 'e' or 'E'
            if matches!(c, Some(b'+') | Some(b'-')) {
                c = self.next();
            }
            while matches!(c, Some(d) if d.is_ascii_digit()) {
                c = self.next();
            }
        }

        let raw = &self.buf[start..self.pos];
        // Everything consumed above is ASCII.
        let text = std::str::from_utf8(raw).unwrap_or("");

        if fraction || exponent {
            let mut value = 0.0f64;
            match text.parse::<f64>() {
                Ok(parsed) => {
                    value = parsed;
                    if !value.is_finite() {
                        self.error(
                            LexerDiagnosticKind::FloatOverflow,
                            "floating-point literal too large".to_string(),
                            start,
                        );
                    }
                }
                Err(_) => {
                    self.error(
                        LexerDiagnosticKind::InvalidFloatLiteral,
                        "invalid float literal".to_string(),
                        start,
                    );
                }
            }
            return Token::with_value(
                TokenKind::Literal { kind: LiteralKind::Float },
                start as u32,
                self.pos as u32,
                TokenValue::Float(value),
            );
        }

        let value = self.int_literal_value(text, start);
        Token::with_value(
            TokenKind::Literal { kind: LiteralKind::Int },
            start as u32,
            self.pos as u32,
            TokenValue::Int(value),
        )
    }

    /// Parses the scanned text of an integer literal to its exact value, preferring a machine
    /// word and widening to a big integer as needed.
    fn int_literal_value(&mut self, text: &str, start: usize) -> IntValue {
        let bytes = text.as_bytes();
        if bytes.len() >= 2 && bytes[0] == b'0' {
            match bytes[1] {
                b'x' | b'X' => {
                    let digits = &text[2..];
                    if digits.is_empty() {
                        // Missing digits were already reported during the scan.
                        return IntValue::Int(0);
                    }
                    return self.radix_value(digits, 16, "invalid hex literal", start);
                }
                b'o' | b'O' => {
                    let digits = &text[2..];
                    if digits.is_empty() {
                        self.error(
                            LexerDiagnosticKind::InvalidIntLiteral,
                            "invalid octal literal".to_string(),
                            start,
                        );
                        return IntValue::Int(0);
                    }
                    return self.radix_value(digits, 8, "invalid octal literal", start);
                }
                b'b' | b'B' => {
                    let digits = &text[2..];
                    if digits.is_empty() {
                        return IntValue::Int(0);
                    }
                    return self.radix_value(digits, 2, "invalid binary literal", start);
                }
                _ => {
                    if bytes.iter().all(|b| *b == b'0') {
                        return IntValue::Int(0);
                    }
                    if bytes[1..].iter().all(|b| (b'0'..=b'7').contains(b)) {
                        // A pre-0o octal literal. Rejected, like Python 3.
                        self.error(
                            LexerDiagnosticKind::InvalidIntLiteral,
                            "invalid octal literal".to_string(),
                            start,
                        );
                        return IntValue::Int(0);
                    }
                    // Leading zeros on a literal with 8s or 9s in it read as decimal.
                }
            }
        }
        self.radix_value(text, 10, "invalid integer literal", start)
    }

    fn radix_value(&mut self, digits: &str, radix: u32, message: &str, start: usize) -> IntValue {
        match i64::from_str_radix(digits, radix) {
            Ok(value) => IntValue::Int(value),
            Err(_) => match num_bigint::BigInt::parse_bytes(digits.as_bytes(), radix) {
                Some(value) => IntValue::BigInt(value),
                None => {
                    self.error(
                        LexerDiagnosticKind::InvalidIntLiteral,
                        message.to_string(),
                        start,
                    );
                    IntValue::Int(0)
                }
            },
        }
    }

    /// Scans an identifier or keyword. On entry `pos` is 1 past the first character.
    fn identifier_or_keyword(&mut self) -> Token {
        let old_pos = self.pos - 1;
        while matches!(self.peek(0), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }
        // The character set above is ASCII, so this cannot fail.
        let text = std::str::from_utf8(&self.buf[old_pos..self.pos]).unwrap_or("");
        match keyword(text) {
            Some(kind) => {
                Token::new(TokenKind::Reserved { kind }, old_pos as u32, self.pos as u32)
            }
            None => Token::with_value(
                TokenKind::Identifier,
                old_pos as u32,
                self.pos as u32,
                TokenValue::Ident(interner::intern(text)),
            ),
        }
    }
}

// Value of exactly the given ASCII hex digits, or None if any byte is not a hex digit.
fn hex_bytes_value(digits: &[u8]) -> Option<u32> {
    let mut value: u32 = 0;
    for digit in digits {
        value = (value << 4) | (*digit as char).to_digit(16)?;
    }
    Some(value)
}

impl<'s, 'l, 'd> Iterator for Cursor<'s, 'l, 'd> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        Some(self.next_token())
    }
}
