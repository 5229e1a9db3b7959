#![no_main]

use libfuzzer_sys::fuzz_target;

use falco_lint::{lint_source, Context};

const MAX_SOURCE_BYTES: usize = 4096;

fn decode_source(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_SOURCE_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let source = decode_source(data);

    // Lexing and parsing must never panic on arbitrary input.
    let _ = falco_syntax::lexer::lex(&source);
    let _ = falco_syntax::parse_file(&source);
    let _ = falco_syntax::parse_statements(&source);

    // Neither may a full lint pass; a parse failure surfaces as a fatal,
    // not a crash.
    let mut context = Context::new();
    let result = lint_source(&mut context, "fuzz.vcl", &source);
    for diagnostic in &result.diagnostics {
        let _ = diagnostic.render(&source);
    }
});
