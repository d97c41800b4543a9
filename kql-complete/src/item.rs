#[cfg(not(feature = "std"))]
use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The broad group a completion candidate belongs to, used to build its
/// `sortText` prefix. Order matches the six ranking groups: tables
/// first, then commands/aggregates, columns, operators, functions, and
/// finally bare keywords.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CompletionItemKind {
    /// A table name.
    Table,
    /// A post-pipe command keyword or a `summarize` aggregation function.
    Command,
    /// A column of the current table.
    Column,
    /// A binary operator.
    Operator,
    /// A scalar or table function.
    Function,
    /// A bare keyword (`by`, `asc`, `desc`, join kinds, ...).
    Keyword,
    /// A literal value suggestion (e.g. a timespan example), offered
    /// inside a function call argument.
    Literal,
}

impl CompletionItemKind {
    /// The numeric group prefix used to build `sortText`, per the
    /// closed `0_`..`5_` ranking scheme. Literal suggestions share the
    /// function group, since they only ever appear where a function
    /// argument is expected.
    pub fn group_prefix(self) -> u8 {
        match self {
            CompletionItemKind::Table => 0,
            CompletionItemKind::Command => 1,
            CompletionItemKind::Column => 2,
            CompletionItemKind::Operator => 3,
            CompletionItemKind::Function | CompletionItemKind::Literal => 4,
            CompletionItemKind::Keyword => 5,
        }
    }
}

/// One ranked completion suggestion.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompletionItem {
    /// The text shown to the user.
    pub label: String,
    /// The candidate's broad kind, driving its ranking group.
    pub kind: CompletionItemKind,
    /// A short inline detail string (e.g. a function's signature).
    pub detail: Option<String>,
    /// Longer-form documentation, shown on demand.
    pub doc: Option<String>,
    /// The text actually inserted, if it differs from `label` (e.g. a
    /// function call template with placeholder parens).
    pub insert_text: Option<String>,
    /// The key this item sorts by among candidates sharing a group.
    pub sort_text: String,
}
