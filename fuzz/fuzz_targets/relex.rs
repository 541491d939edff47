#![no_main]

use libfuzzer_sys::fuzz_target;
use st_syntax::lexer::incremental::{TextEdit, TokenBuffer};
use st_syntax::lexer::lex;
use st_syntax::parse;
use text_size::{TextRange, TextSize};

const MAX_SOURCE_BYTES: usize = 4096;
const MAX_EDITS: usize = 8;

fn decode_source(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_SOURCE_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

const SNIPPETS: &[&str] = &[
    "(*", "*)", "/*", "*/", "{", "}", "'", "\"", "\n", "END_IF", "IF x THEN ", ";", "16#",
    "T#1s", "//", " ",
];

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let split = usize::from(data[0]) % data.len();
    let (script, text) = data[1..].split_at(split.min(data.len() - 1));
    let source = decode_source(text);
    let mut buffer = TokenBuffer::new(source);

    for step in script.chunks(3).take(MAX_EDITS) {
        let [at, len, snippet] = step else {
            break;
        };
        let current = buffer.text();
        let start = floor_char_boundary(current, usize::from(*at) * current.len() / 256);
        let end = floor_char_boundary(current, start + usize::from(*len % 16));
        let range = TextRange::new(
            TextSize::from(start as u32),
            TextSize::from(end as u32),
        );
        let insert = SNIPPETS[usize::from(*snippet) % SNIPPETS.len()];
        buffer
            .edit(TextEdit::replace(range, insert))
            .expect("edit on char boundaries");

        assert_eq!(buffer.tokens(), lex(buffer.text()).as_slice());
        let fresh = parse(buffer.text());
        let incremental = buffer.parse();
        assert_eq!(incremental.green(), fresh.green());
        assert_eq!(incremental.errors(), fresh.errors());
    }
});
