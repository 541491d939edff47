//! Parser events.
//!
//! The parser emits a flat event stream that the sink later folds into a
//! green tree. Trivia never appears here; the sink attaches it.

use crate::syntax::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    /// Open a node. `forward_parent` is the distance to a `Start` event that
    /// must be opened first, which is how `precede` wraps a finished node.
    Start {
        kind: SyntaxKind,
        forward_parent: Option<u32>,
    },
    /// Attach the next non-trivia token.
    Token { kind: SyntaxKind },
    /// Close the innermost open node.
    Finish,
    /// A reserved slot, either an unfinished marker or an event already
    /// consumed through a forward parent chain.
    Placeholder,
}

impl Event {
    pub(crate) fn start(kind: SyntaxKind) -> Self {
        Self::Start {
            kind,
            forward_parent: None,
        }
    }
}
