//! Export of the grammar table in the `grammar.json` layout consumed by
//! tree-sitter style parser generators.

use serde_json::{json, Map, Value};

use super::{Assoc, Grammar, Symbol};
use crate::lexer::TokenKind;

impl Grammar {
    /// Renders the grammar as a `grammar.json` document.
    ///
    /// Keywords become case-insensitive patterns aliased to their canonical
    /// spelling. Tokens without fixed text are referenced by name and listed
    /// under `externals`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut rules = Map::new();
        for rule in &self.rules {
            let alternatives: Vec<Value> = rule
                .alternatives
                .iter()
                .map(|production| {
                    let body = sequence(&production.symbols);
                    match production.precedence.or(rule.precedence) {
                        Some(precedence) => {
                            let kind = match precedence.assoc {
                                Assoc::Left => "PREC_LEFT",
                                Assoc::Right => "PREC_RIGHT",
                                Assoc::None => "PREC",
                            };
                            json!({ "type": kind, "value": precedence.level, "content": body })
                        }
                        None => body,
                    }
                })
                .collect();
            rules.insert(rule.name.to_string(), choice(alternatives));
        }

        let named = |kinds: &[TokenKind]| -> Vec<Value> { kinds.iter().map(|&k| token(k)).collect() };
        let conflicts: Vec<Value> = self.conflicts.iter().map(|c| json!(c.rules)).collect();

        json!({
            "name": self.name,
            "word": self.word.name(),
            "rules": rules,
            "extras": named(&self.extras),
            "externals": named(&self.externals),
            "conflicts": conflicts,
            "precedences": [],
            "inline": [],
            "supertypes": [],
        })
    }

    /// Renders the grammar as pretty-printed `grammar.json` text.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_json())
    }
}

fn choice(mut members: Vec<Value>) -> Value {
    if members.len() == 1 {
        members.remove(0)
    } else {
        json!({ "type": "CHOICE", "members": members })
    }
}

fn sequence(symbols: &[Symbol]) -> Value {
    let mut members: Vec<Value> = symbols.iter().map(symbol).collect();
    match members.len() {
        0 => json!({ "type": "BLANK" }),
        1 => members.remove(0),
        _ => json!({ "type": "SEQ", "members": members }),
    }
}

fn symbol(symbol: &Symbol) -> Value {
    match symbol {
        Symbol::Token(kind) => token(*kind),
        Symbol::Rule(name) => json!({ "type": "SYMBOL", "name": name }),
        Symbol::Optional(inner) => choice(vec![sequence(inner), json!({ "type": "BLANK" })]),
        Symbol::Repeat(inner) => json!({ "type": "REPEAT", "content": sequence(inner) }),
        Symbol::Repeat1(inner) => json!({ "type": "REPEAT1", "content": sequence(inner) }),
    }
}

fn token(kind: TokenKind) -> Value {
    match kind.text() {
        Some(text) if kind.is_keyword() => json!({
            "type": "ALIAS",
            "content": { "type": "PATTERN", "value": case_insensitive(text) },
            "named": false,
            "value": text,
        }),
        Some(text) => json!({ "type": "STRING", "value": text }),
        None => json!({ "type": "SYMBOL", "name": kind.name() }),
    }
}

/// `END_IF` becomes `[eE][nN][dD]_[iI][fF]`.
fn case_insensitive(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                format!("[{}{}]", c.to_ascii_lowercase(), c.to_ascii_uppercase())
            } else {
                c.to_string()
            }
        })
        .collect()
}
