use st_syntax::lexer::{
    lex, CommentStyle, Cursor, Scanner, ScannerState, Token, TokenKind,
    SERIALIZATION_BUFFER_SIZE,
};

const SOURCE: &str = r#"{attribute 'hide'}
PROGRAM Main (* outer (* nested
   still nested *) back in outer
*)
VAR
    /* c style
       comment */ x : INT := 16#FF;
    s : STRING := 'a$Nb'; // trailing
END_VAR
{ split
  pragma }
x := x + 1;
END_PROGRAM
"#;

/// Scans to the end of input starting from `cursor` in `state`.
fn scan_from(mut cursor: Cursor<'_>, state: ScannerState) -> (Vec<Token>, ScannerState) {
    let mut scanner = Scanner::with_state(state);
    let mut tokens = Vec::new();
    while let Some(token) = scanner.scan(&mut cursor) {
        tokens.push(token);
    }
    (tokens, scanner.state())
}

#[test]
fn test_resume_at_every_boundary_reproduces_full_lex() {
    let full = lex(SOURCE);

    let mut scanner = Scanner::new();
    let mut cursor = Cursor::new(SOURCE);
    let mut index = 0;
    loop {
        // Persist the state the way an engine does between tokens.
        let mut buffer = [0u8; SERIALIZATION_BUFFER_SIZE];
        let len = scanner.state().serialize(&mut buffer).expect("serialize");
        let restored = ScannerState::deserialize(&buffer[..len]).expect("deserialize");
        assert_eq!(restored, scanner.state());

        let resumed = Cursor::at(SOURCE, cursor.offset(), cursor.point());
        let (rest, _) = scan_from(resumed, restored);
        assert_eq!(rest, full[index..], "resuming before token {index}");

        match scanner.scan(&mut cursor) {
            Some(token) => assert_eq!(token, full[index]),
            None => break,
        }
        index += 1;
    }
    assert_eq!(index, full.len());
}

#[test]
fn test_states_seen_inside_multiline_constructs() {
    let mut scanner = Scanner::new();
    let mut cursor = Cursor::new(SOURCE);
    let mut states = Vec::new();
    while scanner.scan(&mut cursor).is_some() {
        states.push(scanner.state());
    }
    assert!(states.contains(&ScannerState::Comment {
        style: CommentStyle::Pascal,
        depth: 2,
    }));
    assert!(states.contains(&ScannerState::Comment {
        style: CommentStyle::Pascal,
        depth: 1,
    }));
    assert!(states.contains(&ScannerState::Comment {
        style: CommentStyle::C,
        depth: 1,
    }));
    assert!(states.contains(&ScannerState::Pragma));
    assert_eq!(scanner.state(), ScannerState::Default);
}

#[test]
fn test_tokens_tile_the_source() {
    let tokens = lex(SOURCE);
    let mut offset = 0u32;
    for token in &tokens {
        assert_eq!(u32::from(token.range.start()), offset);
        assert!(!token.is_empty());
        offset = u32::from(token.range.end());
    }
    assert_eq!(offset as usize, SOURCE.len());
    assert!(tokens.iter().all(|t| t.kind != TokenKind::Error));
}

#[test]
fn test_comment_segments_end_at_newlines() {
    let tokens = lex("(* a\nb\nc *)");
    let texts: Vec<_> = tokens
        .iter()
        .map(|t| (t.kind, &"(* a\nb\nc *)"[t.range]))
        .collect();
    assert_eq!(
        texts,
        vec![
            (TokenKind::BlockComment, "(* a\n"),
            (TokenKind::BlockComment, "b\n"),
            (TokenKind::BlockComment, "c *)"),
        ]
    );
    assert_eq!(tokens[2].start.row, 2);
}
