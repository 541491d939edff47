#![no_main]

use libfuzzer_sys::fuzz_target;
use st_syntax::lexer::{lex, Cursor, Scanner, ScannerState, SERIALIZATION_BUFFER_SIZE};
use st_syntax::parse;

const MAX_SOURCE_BYTES: usize = 8192;

fn decode_source(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_SOURCE_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

/// Scans `source` with a fresh scanner per token, restoring the serialized
/// state each time.
fn scan_resuming(source: &str) -> Vec<st_syntax::Token> {
    let mut tokens = Vec::new();
    let mut cursor = Cursor::new(source);
    let mut buffer = [0u8; SERIALIZATION_BUFFER_SIZE];
    let mut state = ScannerState::Default;
    loop {
        let mut scanner = Scanner::with_state(state);
        let Some(token) = scanner.scan(&mut cursor) else {
            break;
        };
        tokens.push(token);
        let len = scanner.state().serialize(&mut buffer).expect("state fits");
        state = ScannerState::deserialize(&buffer[..len]).expect("state round-trips");
    }
    tokens
}

fuzz_target!(|data: &[u8]| {
    let source = decode_source(data);

    let tokens = lex(&source);
    let mut offset = 0u32;
    for token in &tokens {
        assert_eq!(u32::from(token.range.start()), offset);
        assert!(!token.is_empty());
        offset = token.range.end().into();
    }
    assert_eq!(offset as usize, source.len());
    assert_eq!(scan_resuming(&source), tokens);

    let parsed = parse(&source);
    assert_eq!(parsed.syntax().text().to_string(), source);
    let starts: Vec<_> = parsed.errors().iter().map(|e| e.range.start()).collect();
    assert!(starts.windows(2).all(|pair| pair[0] <= pair[1]));
});
