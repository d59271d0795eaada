#![no_main]

use libfuzzer_sys::fuzz_target;

use rigel_starlark::toolchain::diagnostics::diagnostic_emitter::NullDiagnosticConsumer;
use rigel_starlark::toolchain::lexer::{LexOptions, TokenizedBuffer};
use rigel_starlark::toolchain::source::SourceBuffer;

fuzz_target!(|data: &[u8]| {
    let source = SourceBuffer::new_from_bytes(data, "fuzz_targets/tokenized_buffer.rs").unwrap();
    let mut diags = NullDiagnosticConsumer {};
    let _ = TokenizedBuffer::tokenize(&source, LexOptions::default(), &mut diags);
});
