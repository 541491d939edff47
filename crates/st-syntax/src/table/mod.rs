//! Declarative grammar table for Structured Text.
//!
//! The table is the contract handed to an external incremental parsing
//! engine: named rules built from token and rule references, operator
//! precedence, block delimiters, declared conflicts, extras and the set of
//! tokens the external scanner produces. The in-crate parser reads its
//! operator binding powers and block structure from the same table.
//!
//! The table is built once per process on first use and never mutated.

mod export;
mod structured_text;

use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::debug;

use crate::lexer::TokenKind;
use crate::syntax::{SyntaxKind, SYNTAX_KINDS};

static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
    let grammar = structured_text::build();
    debug!(
        rules = grammar.rules.len(),
        blocks = grammar.blocks.len(),
        "built structured text grammar table"
    );
    grammar
});

/// Returns the process-wide Structured Text grammar.
pub fn grammar() -> &'static Grammar {
    &GRAMMAR
}

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assoc {
    /// `a - b - c` groups as `(a - b) - c`.
    Left,
    /// `a ** b ** c` groups as `a ** (b ** c)`.
    Right,
    /// Precedence without associativity.
    None,
}

/// Precedence level and associativity. Higher levels bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precedence {
    /// Binding strength.
    pub level: u8,
    /// How equal levels group.
    pub assoc: Assoc,
}

impl Precedence {
    /// Left-associative precedence.
    #[must_use]
    pub const fn left(level: u8) -> Self {
        Self {
            level,
            assoc: Assoc::Left,
        }
    }

    /// Right-associative precedence.
    #[must_use]
    pub const fn right(level: u8) -> Self {
        Self {
            level,
            assoc: Assoc::Right,
        }
    }

    /// Non-associative precedence.
    #[must_use]
    pub const fn none(level: u8) -> Self {
        Self {
            level,
            assoc: Assoc::None,
        }
    }

    /// Left and right binding power for an infix operator.
    #[must_use]
    pub fn infix_binding_power(self) -> (u8, u8) {
        let base = self.level * 2;
        match self.assoc {
            Assoc::Right => (base + 2, base + 1),
            Assoc::Left | Assoc::None => (base + 1, base + 2),
        }
    }

    /// Binding power of the operand of a prefix operator.
    #[must_use]
    pub fn prefix_binding_power(self) -> u8 {
        self.level * 2 + 1
    }
}

/// One element of a production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// A terminal.
    Token(TokenKind),
    /// A reference to another rule by name.
    Rule(&'static str),
    /// Zero or one occurrence of the sequence.
    Optional(Vec<Symbol>),
    /// Zero or more occurrences of the sequence.
    Repeat(Vec<Symbol>),
    /// One or more occurrences of the sequence.
    Repeat1(Vec<Symbol>),
}

/// A sequence of symbols, one alternative of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    /// The symbols in order.
    pub symbols: Vec<Symbol>,
    /// Precedence of this alternative, overriding the rule's.
    pub precedence: Option<Precedence>,
}

impl Production {
    /// Creates a production without precedence.
    #[must_use]
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols,
            precedence: None,
        }
    }

    /// Attaches a precedence to the production.
    #[must_use]
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = Some(precedence);
        self
    }

    fn first_rule(&self) -> Option<&'static str> {
        match self.symbols.first() {
            Some(Symbol::Rule(name)) => Some(name),
            _ => None,
        }
    }

    fn last_rule(&self) -> Option<&'static str> {
        match self.symbols.last() {
            Some(Symbol::Rule(name)) => Some(name),
            _ => None,
        }
    }
}

/// A named grammar rule.
///
/// Rules whose name starts with `_` are hidden: they group alternatives but
/// produce no node of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Rule name, unique within the grammar.
    pub name: &'static str,
    /// Node kind produced by the reference parser, if any.
    pub node: Option<SyntaxKind>,
    /// Alternatives, at least one.
    pub alternatives: Vec<Production>,
    /// Default precedence for all alternatives.
    pub precedence: Option<Precedence>,
}

impl Rule {
    /// Creates a rule.
    #[must_use]
    pub fn new(
        name: &'static str,
        node: Option<SyntaxKind>,
        alternatives: Vec<Production>,
    ) -> Self {
        Self {
            name,
            node,
            alternatives,
            precedence: None,
        }
    }

    /// Attaches a default precedence to the rule.
    #[must_use]
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = Some(precedence);
        self
    }

    /// Returns `true` for hidden rules.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// Bracketing keywords of a block construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDelimiter {
    /// Rule the block belongs to.
    pub rule: &'static str,
    /// Keywords that open the block.
    pub open: Vec<TokenKind>,
    /// Keyword that closes the block.
    pub close: TokenKind,
    /// Keywords that start an intermediate branch, such as `ELSE`.
    pub branches: Vec<TokenKind>,
}

/// How a declared conflict is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A branch keyword binds to the innermost open block accepting it.
    NearestBlock,
}

/// A known ambiguity between rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Conflict name.
    pub name: &'static str,
    /// Rules involved.
    pub rules: Vec<&'static str>,
    /// Resolution strategy.
    pub resolution: Resolution,
}

/// Binding powers derived from the expression rules.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    infix: FxHashMap<TokenKind, Precedence>,
    prefix: FxHashMap<TokenKind, Precedence>,
    postfix: FxHashMap<TokenKind, Precedence>,
}

impl OperatorTable {
    fn from_rules(rules: &[Rule]) -> Self {
        let mut table = Self::default();
        for rule in rules {
            for production in &rule.alternatives {
                let Some(precedence) = production.precedence.or(rule.precedence) else {
                    continue;
                };
                match production.symbols.as_slice() {
                    [Symbol::Rule(lhs), Symbol::Token(op), Symbol::Rule(rhs)] if lhs == rhs => {
                        table.infix.insert(*op, precedence);
                    }
                    [Symbol::Token(op), Symbol::Rule(_)] => {
                        table.prefix.insert(*op, precedence);
                    }
                    [Symbol::Rule(_), Symbol::Token(op), ..] => {
                        table.postfix.entry(*op).or_insert(precedence);
                    }
                    [Symbol::Rule(_), Symbol::Rule(next)] => {
                        if let Some(open) = rules
                            .iter()
                            .find(|r| r.name == *next)
                            .and_then(|r| r.alternatives.first())
                            .and_then(|p| match p.symbols.first() {
                                Some(Symbol::Token(open)) => Some(*open),
                                _ => None,
                            })
                        {
                            table.postfix.entry(open).or_insert(precedence);
                        }
                    }
                    _ => {}
                }
            }
        }
        table
    }

    /// Precedence of an infix operator.
    #[must_use]
    pub fn infix(&self, kind: TokenKind) -> Option<Precedence> {
        self.infix.get(&kind).copied()
    }

    /// Precedence of a prefix operator.
    #[must_use]
    pub fn prefix(&self, kind: TokenKind) -> Option<Precedence> {
        self.prefix.get(&kind).copied()
    }

    /// Precedence of a postfix operator (call, index, field, dereference).
    #[must_use]
    pub fn postfix(&self, kind: TokenKind) -> Option<Precedence> {
        self.postfix.get(&kind).copied()
    }

    /// Left and right binding power of an infix operator.
    #[must_use]
    pub fn infix_binding_power(&self, kind: TokenKind) -> Option<(u8, u8)> {
        self.infix(kind).map(Precedence::infix_binding_power)
    }

    /// Operand binding power of a prefix operator.
    #[must_use]
    pub fn prefix_binding_power(&self, kind: TokenKind) -> Option<u8> {
        self.prefix(kind).map(Precedence::prefix_binding_power)
    }
}

/// Errors found by [`Grammar::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum GrammarError {
    #[error("rule `{rule}` is defined more than once")]
    DuplicateRule { rule: &'static str },
    #[error("rule `{rule}` refers to undefined rule `{reference}`")]
    UndefinedRule {
        rule: &'static str,
        reference: &'static str,
    },
    #[error("rule `{rule}` is unreachable from the start rule")]
    UnreachableRule { rule: &'static str },
    #[error("grammar has no rules")]
    Empty,
    #[error("conflict `{conflict}` names unknown rule `{rule}`")]
    UnknownConflictRule {
        conflict: &'static str,
        rule: &'static str,
    },
    #[error("alternative {alternative} of rule `{rule}` is recursive at both ends but has no precedence")]
    MissingPrecedence {
        rule: &'static str,
        alternative: usize,
    },
    #[error("block delimiter names unknown rule `{rule}`")]
    UnknownBlockRule { rule: &'static str },
    #[error("block rule `{rule}` does not start with its open keyword")]
    BlockOpen { rule: &'static str },
    #[error("block rule `{rule}` does not end with {close}")]
    BlockClose {
        rule: &'static str,
        close: TokenKind,
    },
    #[error("close keyword {token} of a block also appears in rule `{rule}`")]
    CloseTokenLeak {
        token: TokenKind,
        rule: &'static str,
    },
    #[error("branch keyword {token} does not occur in block rule `{rule}`")]
    BlockBranch {
        rule: &'static str,
        token: TokenKind,
    },
}

/// A complete grammar table.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: &'static str,
    rules: Vec<Rule>,
    index: FxHashMap<&'static str, usize>,
    extras: Vec<TokenKind>,
    word: TokenKind,
    externals: Vec<TokenKind>,
    conflicts: Vec<Conflict>,
    blocks: Vec<BlockDelimiter>,
    operators: OperatorTable,
}

impl Grammar {
    /// Creates a grammar whose start rule is the first of `rules`.
    ///
    /// Externals default to every named token the scanner produces, and the
    /// word token to identifiers.
    #[must_use]
    pub fn new(name: &'static str, rules: Vec<Rule>) -> Self {
        let mut index = FxHashMap::default();
        for (position, rule) in rules.iter().enumerate() {
            index.entry(rule.name).or_insert(position);
        }
        let externals = SYNTAX_KINDS
            .iter()
            .filter_map(|kind| kind.to_token())
            .filter(|kind| kind.text().is_none() && *kind != TokenKind::Eof)
            .collect();
        let operators = OperatorTable::from_rules(&rules);
        Self {
            name,
            rules,
            index,
            extras: Vec::new(),
            word: TokenKind::Ident,
            externals,
            conflicts: Vec::new(),
            blocks: Vec::new(),
            operators,
        }
    }

    /// Sets the tokens that may appear between any two symbols.
    #[must_use]
    pub fn with_extras(mut self, extras: Vec<TokenKind>) -> Self {
        self.extras = extras;
        self
    }

    /// Sets the declared conflicts.
    #[must_use]
    pub fn with_conflicts(mut self, conflicts: Vec<Conflict>) -> Self {
        self.conflicts = conflicts;
        self
    }

    /// Sets the block delimiters.
    #[must_use]
    pub fn with_blocks(mut self, blocks: Vec<BlockDelimiter>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Grammar name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All rules, start rule first.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks up a rule by name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    /// Tokens allowed anywhere (trivia).
    #[must_use]
    pub fn extras(&self) -> &[TokenKind] {
        &self.extras
    }

    /// Token used for keyword extraction.
    #[must_use]
    pub fn word(&self) -> TokenKind {
        self.word
    }

    /// Tokens produced by the external scanner.
    #[must_use]
    pub fn externals(&self) -> &[TokenKind] {
        &self.externals
    }

    /// Declared conflicts.
    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Block delimiters.
    #[must_use]
    pub fn blocks(&self) -> &[BlockDelimiter] {
        &self.blocks
    }

    /// Operator binding powers.
    #[must_use]
    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// Block delimiter of the named rule.
    #[must_use]
    pub fn block(&self, rule: &str) -> Option<&BlockDelimiter> {
        self.blocks.iter().find(|block| block.rule == rule)
    }

    /// Block opened by `kind`, if `kind` is an open keyword.
    #[must_use]
    pub fn block_opened_by(&self, kind: TokenKind) -> Option<&BlockDelimiter> {
        self.blocks.iter().find(|block| block.open.contains(&kind))
    }

    /// Block closed by `kind`, if `kind` is a close keyword.
    #[must_use]
    pub fn block_closed_by(&self, kind: TokenKind) -> Option<&BlockDelimiter> {
        self.blocks.iter().find(|block| block.close == kind)
    }

    /// Returns `true` if `kind` is a branch keyword of any block.
    #[must_use]
    pub fn is_branch(&self, kind: TokenKind) -> bool {
        self.blocks.iter().any(|block| block.branches.contains(&kind))
    }

    /// Node kinds declared by rules.
    pub fn node_kinds(&self) -> impl Iterator<Item = SyntaxKind> + '_ {
        self.rules.iter().filter_map(|rule| rule.node)
    }

    /// Checks the table for structural mistakes.
    pub fn validate(&self) -> Result<(), GrammarError> {
        self.check_rules()?;
        self.check_reachable()?;
        self.check_conflicts()?;
        self.check_precedence()?;
        self.check_blocks()?;
        debug!(grammar = self.name, "grammar table validated");
        Ok(())
    }

    fn check_rules(&self) -> Result<(), GrammarError> {
        let mut seen = FxHashSet::default();
        for rule in &self.rules {
            if !seen.insert(rule.name) {
                return Err(GrammarError::DuplicateRule { rule: rule.name });
            }
        }
        for rule in &self.rules {
            let mut undefined = None;
            for production in &rule.alternatives {
                visit_symbols(&production.symbols, &mut |symbol| {
                    if let Symbol::Rule(reference) = symbol {
                        if undefined.is_none() && !self.index.contains_key(reference) {
                            undefined = Some(*reference);
                        }
                    }
                });
            }
            if let Some(reference) = undefined {
                return Err(GrammarError::UndefinedRule {
                    rule: rule.name,
                    reference,
                });
            }
        }
        Ok(())
    }

    fn check_reachable(&self) -> Result<(), GrammarError> {
        let start = self.rules.first().ok_or(GrammarError::Empty)?;
        let mut reached = FxHashSet::default();
        let mut stack = vec![start.name];
        while let Some(name) = stack.pop() {
            if !reached.insert(name) {
                continue;
            }
            let Some(rule) = self.rule(name) else {
                continue;
            };
            for production in &rule.alternatives {
                visit_symbols(&production.symbols, &mut |symbol| {
                    if let Symbol::Rule(reference) = symbol {
                        stack.push(*reference);
                    }
                });
            }
        }
        match self.rules.iter().find(|rule| !reached.contains(rule.name)) {
            Some(rule) => Err(GrammarError::UnreachableRule { rule: rule.name }),
            None => Ok(()),
        }
    }

    fn check_conflicts(&self) -> Result<(), GrammarError> {
        for conflict in &self.conflicts {
            if let Some(rule) = conflict.rules.iter().find(|r| self.rule(r).is_none()) {
                return Err(GrammarError::UnknownConflictRule {
                    conflict: conflict.name,
                    rule: *rule,
                });
            }
        }
        Ok(())
    }

    /// An alternative needs precedence when its rule can start a
    /// left-recursive production and the alternative ends in a rule that can
    /// derive the same rule at its right edge, as with `- a + b`.
    fn check_precedence(&self) -> Result<(), GrammarError> {
        let mut left_edge = FxHashSet::default();
        for rule in &self.rules {
            for production in &rule.alternatives {
                let Some(first) = production.first_rule() else {
                    continue;
                };
                let closure = self.edge_closure(first, Production::first_rule);
                if closure.contains(rule.name) {
                    left_edge.extend(closure);
                }
            }
        }

        for rule in self.rules.iter().filter(|r| left_edge.contains(r.name)) {
            for (alternative, production) in rule.alternatives.iter().enumerate() {
                if production.symbols.len() < 2 {
                    continue;
                }
                let Some(last) = production.last_rule() else {
                    continue;
                };
                let recursive = self
                    .edge_closure(last, Production::last_rule)
                    .contains(rule.name);
                if recursive && production.precedence.or(rule.precedence).is_none() {
                    return Err(GrammarError::MissingPrecedence {
                        rule: rule.name,
                        alternative,
                    });
                }
            }
        }
        Ok(())
    }

    /// Rules derivable at one edge of `start`, including `start`.
    fn edge_closure(
        &self,
        start: &'static str,
        edge: fn(&Production) -> Option<&'static str>,
    ) -> FxHashSet<&'static str> {
        let mut closure = FxHashSet::default();
        let mut stack = vec![start];
        while let Some(name) = stack.pop() {
            if !closure.insert(name) {
                continue;
            }
            if let Some(rule) = self.rule(name) {
                stack.extend(rule.alternatives.iter().filter_map(edge));
            }
        }
        closure
    }

    fn check_blocks(&self) -> Result<(), GrammarError> {
        for block in &self.blocks {
            let rule = self
                .rule(block.rule)
                .ok_or(GrammarError::UnknownBlockRule { rule: block.rule })?;

            let mut opened = FxHashSet::default();
            for production in &rule.alternatives {
                let first = production
                    .symbols
                    .first()
                    .map(|symbol| self.first_tokens(symbol))
                    .unwrap_or_default();
                if first.is_empty() || !first.iter().all(|t| block.open.contains(t)) {
                    return Err(GrammarError::BlockOpen { rule: rule.name });
                }
                opened.extend(first);
                if production.symbols.last() != Some(&Symbol::Token(block.close)) {
                    return Err(GrammarError::BlockClose {
                        rule: rule.name,
                        close: block.close,
                    });
                }
            }
            if block.open.iter().any(|t| !opened.contains(t)) {
                return Err(GrammarError::BlockOpen { rule: rule.name });
            }

            for other in self.rules.iter().filter(|r| r.name != rule.name) {
                let mut leaked = false;
                for production in &other.alternatives {
                    visit_symbols(&production.symbols, &mut |symbol| {
                        leaked |= *symbol == Symbol::Token(block.close);
                    });
                }
                if leaked {
                    return Err(GrammarError::CloseTokenLeak {
                        token: block.close,
                        rule: other.name,
                    });
                }
            }

            let local = self.block_tokens(rule.name);
            if let Some(&token) = block.branches.iter().find(|t| !local.contains(*t)) {
                return Err(GrammarError::BlockBranch {
                    rule: rule.name,
                    token,
                });
            }
        }
        Ok(())
    }

    /// Tokens that can begin `symbol`.
    fn first_tokens(&self, symbol: &Symbol) -> FxHashSet<TokenKind> {
        let mut tokens = FxHashSet::default();
        let mut visited = FxHashSet::default();
        let mut stack = vec![symbol.clone()];
        while let Some(symbol) = stack.pop() {
            match symbol {
                Symbol::Token(kind) => {
                    tokens.insert(kind);
                }
                Symbol::Rule(name) => {
                    if !visited.insert(name) {
                        continue;
                    }
                    if let Some(rule) = self.rule(name) {
                        stack.extend(
                            rule.alternatives
                                .iter()
                                .filter_map(|p| p.symbols.first().cloned()),
                        );
                    }
                }
                Symbol::Optional(inner) | Symbol::Repeat(inner) | Symbol::Repeat1(inner) => {
                    stack.extend(inner.first().cloned());
                }
            }
        }
        tokens
    }

    /// Tokens reachable from `block_rule` without entering another block.
    fn block_tokens(&self, block_rule: &'static str) -> FxHashSet<TokenKind> {
        let mut tokens = FxHashSet::default();
        let mut visited = FxHashSet::default();
        let mut stack = vec![block_rule];
        while let Some(name) = stack.pop() {
            if !visited.insert(name) || (name != block_rule && self.block(name).is_some()) {
                continue;
            }
            let Some(rule) = self.rule(name) else {
                continue;
            };
            for production in &rule.alternatives {
                visit_symbols(&production.symbols, &mut |symbol| match symbol {
                    Symbol::Token(kind) => {
                        tokens.insert(*kind);
                    }
                    Symbol::Rule(reference) => stack.push(*reference),
                    _ => {}
                });
            }
        }
        tokens
    }
}

/// Calls `f` on every symbol, descending into nested sequences.
fn visit_symbols<'a>(symbols: &'a [Symbol], f: &mut impl FnMut(&'a Symbol)) {
    for symbol in symbols {
        f(symbol);
        if let Symbol::Optional(inner) | Symbol::Repeat(inner) | Symbol::Repeat1(inner) = symbol {
            visit_symbols(inner, f);
        }
    }
}
