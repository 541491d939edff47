//! `rowan` tree types.
//!
//! [`SyntaxKind`] numbers scanner tokens first, in [`TokenKind`] order, and
//! node kinds after them, so a token's discriminant is the same in both enums.
//! The grammar table names one rule per node kind; the rule name is given
//! in brackets below.

use crate::lexer::TokenKind;
use crate::token_kinds::for_each_token_kind;

macro_rules! define_syntax_kind {
    (@nodes [$($token:ident),*] $($(#[$meta:meta])* $node:ident,)*) => {
        /// Kind of every token and node in a Structured Text tree.
        ///
        /// `Error` is both a token (input the scanner rejected) and a node
        /// (input the parser skipped).
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum SyntaxKind {
            $($token,)*
            $($(#[$meta])* $node,)*
        }

        /// Every kind, indexed by discriminant.
        pub const SYNTAX_KINDS: &[SyntaxKind] = &[
            $(SyntaxKind::$token,)*
            $(SyntaxKind::$node,)*
        ];
    };
    ($($token:ident),* $(,)?) => {
        define_syntax_kind! {
            @nodes [$($token),*]

            /// Whole input [source_file].
            SourceFile,
            /// [program]
            Program,
            /// [function], with an optional `: type` result.
            Function,
            /// [function_block]
            FunctionBlock,

            /// `TYPE ... END_TYPE` holding any number of named types [type_declaration].
            TypeDecl,
            /// [struct_type]
            StructDef,
            /// Parenthesized value list [enum_type].
            EnumDef,
            /// One enumerator, possibly `:= value` [enum_value].
            EnumValue,
            /// `ARRAY [ranges] OF element` [array_type].
            ArrayType,
            /// `POINTER TO` [pointer_type].
            PointerType,
            /// `REF_TO` [reference_type].
            ReferenceType,
            /// `STRING` or `WSTRING`, length in brackets [string_type].
            StringType,
            /// `lo..hi`; either bound may be `*` in array types [subrange].
            Subrange,

            /// One `VAR*` section up to `END_VAR` [var_block].
            VarBlock,
            /// `a, b AT %IX0.0 : T := init;` [var_declaration].
            VarDecl,
            /// Declared identifier [name].
            Name,
            /// [type_ref]
            TypeRef,

            /// Parenthesized call arguments [argument_list].
            ArgList,
            /// Positional or `name := value` / `name => target` [argument].
            Arg,

            /// Non-empty run of statements [statement_list].
            StmtList,
            /// `:=` or `?=` [assignment_statement].
            AssignStmt,
            /// [if_statement]
            IfStmt,
            /// [elsif_clause]
            ElsifBranch,
            /// [else_clause]
            ElseBranch,
            /// [case_statement]
            CaseStmt,
            /// Labels, colon, body [case_branch].
            CaseBranch,
            /// Value or range selecting a branch [case_label].
            CaseLabel,
            /// [for_statement]
            ForStmt,
            /// [while_statement]
            WhileStmt,
            /// [repeat_statement]
            RepeatStmt,
            /// [return_statement]
            ReturnStmt,
            /// [exit_statement]
            ExitStmt,
            /// [continue_statement]
            ContinueStmt,
            /// [jmp_statement]
            JmpStmt,
            /// `label:` and the statement it marks [label_statement].
            LabelStmt,
            /// Lone `;` [empty_statement].
            EmptyStmt,
            /// Call used as a statement [expression_statement].
            ExprStmt,

            /// [binary_expression]
            BinaryExpr,
            /// `-`, `+` or `NOT` applied to an operand [unary_expression].
            UnaryExpr,
            /// [parenthesized_expression]
            ParenExpr,
            /// [call_expression]
            CallExpr,
            /// `base[i, j]` [index_expression].
            IndexExpr,
            /// `base.member`, or bit `base.3` [field_expression].
            FieldExpr,
            /// Postfix `^` [deref_expression].
            DerefExpr,
            /// Identifier used as a value [name_ref].
            NameRef,
            /// [literal]
            Literal,
            /// `(field := value, ...)` [initializer_list].
            InitializerList,
            /// `[v, n(v), ...]` [array_initializer].
            ArrayInitializer,
        }
    };
}

for_each_token_kind!(define_syntax_kind);

impl SyntaxKind {
    /// Whitespace, comments and pragmas.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        self.to_token().is_some_and(TokenKind::is_trivia)
    }

    #[must_use]
    pub fn is_token(self) -> bool {
        self <= Self::Eof
    }

    #[must_use]
    pub fn is_node(self) -> bool {
        self > Self::Eof
    }
}

macro_rules! map_token_kinds {
    ($($name:ident),* $(,)?) => {
        impl From<TokenKind> for SyntaxKind {
            fn from(kind: TokenKind) -> Self {
                match kind {
                    $(TokenKind::$name => SyntaxKind::$name,)*
                }
            }
        }

        impl SyntaxKind {
            /// The scanner kind of a token variant; `None` for nodes.
            #[must_use]
            pub fn to_token(self) -> Option<TokenKind> {
                match self {
                    $(SyntaxKind::$name => Some(TokenKind::$name),)*
                    _ => None,
                }
            }
        }
    };
}

for_each_token_kind!(map_token_kinds);

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// `rowan` language tag for Structured Text trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StLanguage {}

impl rowan::Language for StLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SYNTAX_KINDS
            .get(usize::from(raw.0))
            .copied()
            .unwrap_or(SyntaxKind::Error)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

#[allow(missing_docs)]
pub type SyntaxNode = rowan::SyntaxNode<StLanguage>;
#[allow(missing_docs)]
pub type SyntaxToken = rowan::SyntaxToken<StLanguage>;
#[allow(missing_docs)]
pub type SyntaxElement = rowan::SyntaxElement<StLanguage>;
