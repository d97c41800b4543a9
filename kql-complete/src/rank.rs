#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec::Vec};

use crate::item::{CompletionItem, CompletionItemKind};

/// A candidate before ranking: everything but the computed `sortText`.
pub struct Candidate {
    /// The text shown to the user.
    pub label: String,
    /// The candidate's broad kind.
    pub kind: CompletionItemKind,
    /// A short inline detail string.
    pub detail: Option<String>,
    /// Longer-form documentation.
    pub doc: Option<String>,
    /// The text actually inserted, if it differs from `label`.
    pub insert_text: Option<String>,
}

/// Filters `candidates` by case-insensitive prefix match against
/// `partial`, then ranks them: exact matches before prefix matches,
/// grouped by the six `0_`..`5_` buckets, alphabetical within a bucket.
pub fn rank(candidates: Vec<Candidate>, partial: &str) -> Vec<CompletionItem> {
    let partial_lower = partial.to_lowercase();
    let mut matched: Vec<(u8, u8, Candidate)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let label_lower = candidate.label.to_lowercase();
            if !label_lower.starts_with(&partial_lower) {
                return None;
            }
            let exact_rank: u8 = if label_lower == partial_lower { 0 } else { 1 };
            Some((candidate.kind.group_prefix(), exact_rank, candidate))
        })
        .collect();

    matched.sort_by(|a, b| {
        (a.0, a.1, a.2.label.as_str()).cmp(&(b.0, b.1, b.2.label.as_str()))
    });

    matched
        .into_iter()
        .map(|(group, _, candidate)| {
            let sort_text = format!("{}_{}", group, candidate.label);
            CompletionItem {
                label: candidate.label,
                kind: candidate.kind,
                detail: candidate.detail,
                doc: candidate.doc,
                insert_text: candidate.insert_text,
                sort_text,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(label: &str, kind: CompletionItemKind) -> Candidate {
        Candidate { label: label.into(), kind, detail: None, doc: None, insert_text: None }
    }

    #[test]
    fn only_prefix_matches_survive_filtering() {
        let items = rank(vec![candidate("severity", CompletionItemKind::Column), candidate("state", CompletionItemKind::Column)], "sev");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "severity");
    }

    #[test]
    fn an_exact_match_ranks_above_a_longer_prefix_match_in_the_same_group() {
        let items = rank(
            vec![candidate("state", CompletionItemKind::Column), candidate("statecode", CompletionItemKind::Column)],
            "state",
        );
        assert_eq!(items[0].label, "state");
        assert_eq!(items[1].label, "statecode");
    }

    #[test]
    fn earlier_groups_sort_before_later_groups_regardless_of_label() {
        let items = rank(
            vec![candidate("zzz_table", CompletionItemKind::Table), candidate("aaa_column", CompletionItemKind::Column)],
            "",
        );
        assert_eq!(items[0].label, "zzz_table");
        assert_eq!(items[1].label, "aaa_column");
    }
}
