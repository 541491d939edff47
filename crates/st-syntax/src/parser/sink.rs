//! Folds parser events into a `rowan` green tree.
//!
//! Trivia is attached lazily: before each token and before each node is
//! closed, so leading comments belong to the construct that follows them.

use rowan::{GreenNode, GreenNodeBuilder};

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::parser::ParseError;
use crate::syntax::SyntaxKind;

/// Builds the tree for `tokens` from `events`.
///
/// Every token ends up in the tree; if the events stop short, the rest is
/// still attached to the root and reported.
pub(crate) fn build(
    tokens: &[Token],
    source: &str,
    mut events: Vec<Event>,
) -> (GreenNode, Vec<ParseError>) {
    let mut sink = Sink {
        tokens,
        source,
        next: 0,
        builder: GreenNodeBuilder::new(),
    };
    let mut errors = Vec::new();
    let mut depth = 0usize;

    for index in 0..events.len() {
        match std::mem::replace(&mut events[index], Event::Placeholder) {
            Event::Start { kind, forward_parent } => {
                let opened = open_chain(&mut events, index, kind, forward_parent);
                for kind in opened.iter().rev() {
                    sink.builder.start_node((*kind).into());
                }
                depth += opened.len();
            }
            Event::Token { kind } => {
                sink.attach_trivia();
                sink.attach(kind);
            }
            Event::Finish => {
                sink.attach_trivia();
                depth -= 1;
                if depth == 0 {
                    sink.attach_rest(&mut errors);
                }
                sink.builder.finish_node();
            }
            Event::Placeholder => {}
        }
    }

    (sink.builder.finish(), errors)
}

/// Collects `kind` and every forward parent after it, innermost first,
/// consuming the parents' events.
fn open_chain(
    events: &mut [Event],
    mut index: usize,
    kind: SyntaxKind,
    mut forward_parent: Option<u32>,
) -> Vec<SyntaxKind> {
    let mut chain = vec![kind];
    while let Some(distance) = forward_parent {
        index += distance as usize;
        let Event::Start {
            kind,
            forward_parent: next,
        } = std::mem::replace(&mut events[index], Event::Placeholder)
        else {
            break;
        };
        chain.push(kind);
        forward_parent = next;
    }
    chain
}

struct Sink<'t, 'src> {
    tokens: &'t [Token],
    source: &'src str,
    /// Index of the first token not yet in the tree.
    next: usize,
    builder: GreenNodeBuilder<'static>,
}

impl Sink<'_, '_> {
    fn attach_trivia(&mut self) {
        while self
            .tokens
            .get(self.next)
            .is_some_and(|token| token.kind.is_trivia())
        {
            let kind = SyntaxKind::from(self.tokens[self.next].kind);
            self.attach(kind);
        }
    }

    fn attach(&mut self, kind: SyntaxKind) {
        if let Some(token) = self.tokens.get(self.next) {
            self.builder.token(kind.into(), token.text(self.source));
            self.next += 1;
        }
    }

    fn attach_rest(&mut self, errors: &mut Vec<ParseError>) {
        if let Some(token) = self.tokens.get(self.next) {
            errors.push(ParseError::syntactic(
                "parser stopped before end of input",
                token.range,
            ));
        }
        while let Some(token) = self.tokens.get(self.next) {
            let kind = SyntaxKind::from(token.kind);
            self.attach(kind);
        }
    }
}
