#![no_main]

use libfuzzer_sys::fuzz_target;

use rigel_starlark::toolchain::diagnostics::diagnostic_emitter::NullDiagnosticConsumer;
use rigel_starlark::toolchain::lexer::{Cursor, FileLocations, LexOptions, TokenKind};
use rigel_starlark::toolchain::source::SourceBuffer;

fuzz_target!(|data: &[u8]| {
    let source = SourceBuffer::new_from_bytes(data, "fuzz_targets/lex.rs").unwrap();
    let locs = FileLocations::create(source.code(), source.file_name());
    let mut diags = NullDiagnosticConsumer {};
    let mut cursor = Cursor::new(&source, &locs, LexOptions::default(), &mut diags);
    while cursor.next_token().kind != TokenKind::Eof {}
});
