#[cfg(test)]
mod tests {
    use crate::starlark;
    use crate::toolchain::diagnostics::diagnostic_emitter;
    use crate::toolchain::diagnostics::DiagnosticLocationTranslator;
    use crate::toolchain::source;

    use crate::toolchain::lexer::token::DelimiterKind::*;
    use crate::toolchain::lexer::token::IntValue;
    use crate::toolchain::lexer::token::LiteralKind;
    use crate::toolchain::lexer::token::OperatorKind;
    use crate::toolchain::lexer::token::ReservedKind;
    use crate::toolchain::lexer::token::Token;
    use crate::toolchain::lexer::token::TokenKind::*;
    use crate::toolchain::lexer::token::TokenValue;

    use crate::toolchain::lexer::LexOptions;
    use crate::toolchain::lexer::TokenizedBuffer;

    // Lexing helper function to compare expected lexing against the tokenized buffer.
    fn check_lexing(source: &source::SourceBuffer, expect: Vec<Token>) {
        let mut diags = diagnostic_emitter::NullDiagnosticConsumer {};
        let buffer = TokenizedBuffer::tokenize(source, LexOptions::default(), &mut diags);
        assert_eq!(buffer.tokens(), &expect);
    }

    fn ident(name: &str, start: u32, end: u32) -> Token {
        Token::with_value(Identifier, start, end, TokenValue::Ident(name.into()))
    }

    fn int(value: i64, start: u32, end: u32) -> Token {
        Token::with_value(
            Literal { kind: LiteralKind::Int },
            start,
            end,
            TokenValue::Int(IntValue::Int(value)),
        )
    }

    #[test]
    fn smoke_test() {
        check_lexing(
            starlark!("x = [1, 2]\n"),
            vec![
                ident("x", 0, 1),
                Token::new(Operator { kind: OperatorKind::Equals }, 2, 3),
                Token::new(Delimiter { kind: BracketOpen }, 4, 5),
                int(1, 5, 6),
                Token::new(Delimiter { kind: Comma }, 6, 7),
                int(2, 8, 9),
                Token::new(Delimiter { kind: BracketClose }, 9, 10),
                Token::new(Newline, 10, 11),
                Token::new(Eof, 11, 11),
            ],
        );
    }

    #[test]
    fn load_statement() {
        check_lexing(
            starlark!("load(\"//tools:defs.bzl\", \"flag\")\n"),
            vec![
                Token::new(Reserved { kind: ReservedKind::Load }, 0, 4),
                Token::new(Delimiter { kind: ParenOpen }, 4, 5),
                Token::with_value(
                    Literal { kind: LiteralKind::Str },
                    5,
                    23,
                    TokenValue::Str(String::from("//tools:defs.bzl")),
                ),
                Token::new(Delimiter { kind: Comma }, 23, 24),
                Token::with_value(
                    Literal { kind: LiteralKind::Str },
                    25,
                    31,
                    TokenValue::Str(String::from("flag")),
                ),
                Token::new(Delimiter { kind: ParenClose }, 31, 32),
                Token::new(Newline, 32, 33),
                Token::new(Eof, 33, 33),
            ],
        );
    }

    #[test]
    fn token_raw_matches_source() {
        let source = starlark!("total += 0x1f # tally\n");
        let mut diags = diagnostic_emitter::NullDiagnosticConsumer {};
        let buffer = TokenizedBuffer::tokenize(source, LexOptions::default(), &mut diags);
        assert_eq!(buffer.token_raw(0).expect("in range"), "total");
        assert_eq!(buffer.token_raw(1).expect("in range"), "+=");
        assert_eq!(buffer.token_raw(2).expect("in range"), "0x1f");
        assert!(buffer.token_raw(100).is_none());
        assert_eq!(buffer.token_at(2).expect("in range").value, TokenValue::Int(IntValue::Int(31)));
        assert!(buffer.token_at(100).is_none());
    }

    #[test]
    fn prefixed_literals_keep_their_prefix_in_the_span() {
        let source = starlark!("b'ab' rb'cd' r'ef'\n");
        let mut diags = diagnostic_emitter::NullDiagnosticConsumer {};
        let buffer = TokenizedBuffer::tokenize(source, LexOptions::default(), &mut diags);
        assert_eq!(buffer.token_raw(0).expect("in range"), "b'ab'");
        assert_eq!(buffer.token_raw(1).expect("in range"), "rb'cd'");
        assert_eq!(buffer.token_raw(2).expect("in range"), "r'ef'");
    }

    #[test]
    fn comments_carry_offsets() {
        let source = starlark!("# header\nx = 1 # trailing\n");
        let mut diags = diagnostic_emitter::NullDiagnosticConsumer {};
        let buffer = TokenizedBuffer::tokenize(source, LexOptions::default(), &mut diags);
        let comments = buffer.comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].start, 0);
        assert_eq!(comments[0].text, "# header");
        assert_eq!(comments[1].start, 15);
        assert_eq!(comments[1].text, "# trailing");
        // Comment offsets resolve through the location table.
        assert_eq!(buffer.locations().location_of(comments[1].start), (2, 7));
    }

    #[test]
    fn tokens_translate_to_locations() {
        let source = starlark!("def f():\n    pass\n");
        let mut diags = diagnostic_emitter::NullDiagnosticConsumer {};
        let buffer = TokenizedBuffer::tokenize(source, LexOptions::default(), &mut diags);
        // Token 0 is `def` on line 1; token 5 is `pass` on line 2 column 5.
        let location = buffer.get_location(0);
        assert_eq!(location.line_number, 1);
        assert_eq!(location.column_number, 1);
        assert_eq!(location.line, "def f():");
        let pass_index = buffer
            .tokens()
            .iter()
            .position(|t| t.kind == Reserved { kind: ReservedKind::Pass })
            .expect("pass token exists");
        let location = buffer.get_location(pass_index);
        assert_eq!(location.line_number, 2);
        assert_eq!(location.column_number, 5);
    }

    #[test]
    fn every_buffer_ends_with_newline_and_eof() {
        for input in ["", "x", "x\n", "x;", "(", "'s"] {
            let source = &source::SourceBuffer::new_from_string(input, "test.star").unwrap();
            let mut diags = diagnostic_emitter::NullDiagnosticConsumer {};
            let buffer = TokenizedBuffer::tokenize(source, LexOptions::default(), &mut diags);
            let tokens = buffer.tokens();
            assert!(tokens.len() >= 2, "input {:?}", input);
            assert_eq!(tokens[tokens.len() - 1].kind, Eof, "input {:?}", input);
            assert_eq!(tokens[tokens.len() - 2].kind, Newline, "input {:?}", input);
        }
    }
}
