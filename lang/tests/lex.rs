use rigel_starlark::toolchain;
use rigel_starlark::toolchain::lexer::token::{LiteralKind, ReservedKind, TokenKind, TokenValue};

// Lexes a buffer through the public API, collecting diagnostics.
fn lex(
    input: &str,
) -> (
    Vec<TokenKind>,
    Vec<toolchain::diagnostics::diagnostic_emitter::Diagnostic>,
) {
    let source = toolchain::source::SourceBuffer::new_from_string(input, "test.star")
        .expect("in-memory buffers are infallible");
    let mut diags = toolchain::diagnostics::VecDiagnosticConsumer::new();
    let buffer = toolchain::lexer::TokenizedBuffer::tokenize(
        &source,
        toolchain::lexer::LexOptions::default(),
        &mut diags,
    );
    (
        buffer.tokens().iter().map(|t| t.kind).collect(),
        diags.diagnostics,
    )
}

#[test]
fn lexes_a_realistic_build_file() {
    let input = r#"load("@rules_cc//cc:defs.bzl", "cc_library")

_COPTS = ["-Wall", "-Werror"]

def _impl(ctx):
    out = ctx.actions.declare_file(ctx.label.name + ".txt")
    if len(ctx.files.srcs) >= 2:
        fail("too many srcs")
    return [DefaultInfo(files = depset([out]))]

cc_library(
    name = "lib",
    srcs = ["lib.cc"],
    copts = _COPTS,
)
"#;
    let (kinds, diags) = lex(input);
    assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
    assert_eq!(kinds.first(), Some(&TokenKind::Reserved { kind: ReservedKind::Load }));
    assert_eq!(kinds.last(), Some(&TokenKind::Eof));
    // The def block opens and closes exactly one indentation level deeper per nested suite.
    let indents = kinds.iter().filter(|k| **k == TokenKind::Indent).count();
    let outdents = kinds.iter().filter(|k| **k == TokenKind::Outdent).count();
    assert_eq!(indents, outdents);
    assert_eq!(indents, 2);
    assert!(!kinds.contains(&TokenKind::Illegal));
}

#[test]
fn values_survive_the_batch_api() {
    let source = toolchain::source::SourceBuffer::new_from_string(
        "greeting = 'hello ' + b'\\x00world'\n",
        "test.star",
    )
    .expect("in-memory buffers are infallible");
    let mut diags = toolchain::diagnostics::VecDiagnosticConsumer::new();
    let buffer = toolchain::lexer::TokenizedBuffer::tokenize(
        &source,
        toolchain::lexer::LexOptions::default(),
        &mut diags,
    );
    assert!(diags.diagnostics.is_empty());
    let tokens = buffer.tokens();
    assert_eq!(tokens[2].kind, TokenKind::Literal { kind: LiteralKind::Str });
    assert_eq!(tokens[2].value, TokenValue::Str(String::from("hello ")));
    assert_eq!(tokens[4].kind, TokenKind::Literal { kind: LiteralKind::Bytes });
    assert_eq!(
        tokens[4].value,
        TokenValue::Bytes(bstr::BString::from(b"\x00world".to_vec()))
    );
}

#[test]
fn malformed_input_reports_and_recovers() {
    let input = "def f(:\n\t$ = '\n0x zz\n";
    let (kinds, diags) = lex(input);
    // Every problem is reported and scanning reaches the end of the buffer anyway.
    assert!(!diags.is_empty());
    assert_eq!(kinds.last(), Some(&TokenKind::Eof));
}

#[test]
fn arbitrary_bytes_do_not_panic() {
    let junk: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
    let source = toolchain::source::SourceBuffer::new_from_bytes(&junk, "junk.bin")
        .expect("in-memory buffers are infallible");
    let mut diags = toolchain::diagnostics::diagnostic_emitter::NullDiagnosticConsumer {};
    let buffer = toolchain::lexer::TokenizedBuffer::tokenize(
        &source,
        toolchain::lexer::LexOptions::default(),
        &mut diags,
    );
    assert_eq!(buffer.tokens().last().map(|t| t.kind), Some(TokenKind::Eof));
}
