use bstr::BStr;

use super::cursor::{Comment, Cursor};
use super::file_locations::FileLocations;
use super::token::TokenKind;
use super::{LexOptions, Token, TokenIndex};
use crate::toolchain::diagnostics::diagnostic_emitter::{DiagnosticConsumer, DiagnosticLocation};
use crate::toolchain::diagnostics::DiagnosticLocationTranslator;
use crate::toolchain::source;

/// The result of lexing one source buffer: every token through `Eof`, plus the comments and the
/// offset-to-location table for the file.
pub struct TokenizedBuffer<'s> {
    tokens: Vec<Token>,
    comments: Vec<Comment<'s>>,
    locs: FileLocations,
    source: &'s source::SourceBuffer<'s>,
}

impl<'s> TokenizedBuffer<'s> {
    pub fn tokenize(
        source: &'s source::SourceBuffer,
        options: LexOptions,
        diags: &mut impl DiagnosticConsumer,
    ) -> TokenizedBuffer<'s> {
        let locs = FileLocations::create(source.code(), source.file_name());
        let mut tokens = Vec::new();
        let comments;
        {
            let mut cursor = Cursor::new(source, &locs, options, diags);
            loop {
                let token = cursor.next_token();
                let at_end = token.kind == TokenKind::Eof;
                tokens.push(token);
                if at_end {
                    break;
                }
            }
            comments = cursor.comments().to_vec();
        }
        TokenizedBuffer { tokens, comments, locs, source }
    }

    pub fn token_at(&self, i: TokenIndex) -> Option<&Token> {
        self.tokens.get(i)
    }

    pub fn tokens(&self) -> &Vec<Token> {
        &self.tokens
    }

    pub fn comments(&self) -> &[Comment<'s>] {
        &self.comments
    }

    pub fn locations(&self) -> &FileLocations {
        &self.locs
    }

    /// The input text a token was scanned from: `buffer[token.start..token.end]`.
    pub fn token_raw(&self, i: TokenIndex) -> Option<&'s BStr> {
        let token = self.tokens.get(i)?;
        let code: &'s [u8] = self.source.code().as_ref();
        Some(BStr::new(&code[token.start as usize..token.end as usize]))
    }

    pub fn print_tokens(&self) {
        for token in self.tokens.iter() {
            println!("{}", &token);
        }
    }
}

impl<'s> DiagnosticLocationTranslator<TokenIndex> for TokenizedBuffer<'s> {
    fn get_location(&self, token_index: TokenIndex) -> DiagnosticLocation {
        // TokenizedBuffer is only useful as a location translator after lexing is complete.
        let token = &self.tokens[token_index];
        self.locs.diagnostic_location(self.source.code(), token.start)
    }
}
