//! Organization label policy.
//!
//! Mandatory labels narrow every issue listing; added labels are stamped
//! onto every issue written through the gateway. Both are additive: a caller
//! can never remove a label the policy requires.

use crate::domain::models::{join_labels, LABEL_DELIMITER};

/// Label filter for an issue listing.
///
/// The requested labels come first, then the mandatory ones, with repeats
/// dropped. `None` means the listing is unfiltered.
pub fn effective_filter(mandatory: &[String], requested: &[String]) -> Option<String> {
    if mandatory.is_empty() && requested.is_empty() {
        return None;
    }

    let mut merged: Vec<String> = Vec::with_capacity(mandatory.len() + requested.len());
    for label in requested.iter().chain(mandatory) {
        if !merged.contains(label) {
            merged.push(label.clone());
        }
    }
    Some(join_labels(&merged))
}

/// Labels to send when creating or updating an issue.
///
/// Caller labels are kept as given (repeats included) and followed by the
/// organization's added labels. Without caller labels the added labels are
/// sent alone, which may be an empty list.
pub fn effective_payload_labels(requested: Option<&[String]>, added: &[String]) -> Vec<String> {
    match requested {
        Some(labels) => labels.iter().chain(added).cloned().collect(),
        None => added.to_vec(),
    }
}

/// Split a `labels=a,b` query parameter into its labels.
pub fn parse_label_query(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(LABEL_DELIMITER)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_filter_merges_requested_and_mandatory() {
        let filter = effective_filter(&labels(&["a", "b"]), &labels(&["c"]));
        assert_eq!(filter.as_deref(), Some("c,a,b"));
    }

    #[test]
    fn test_filter_drops_repeats() {
        let filter = effective_filter(&labels(&["bug", "team"]), &labels(&["bug", "bug"]));
        assert_eq!(filter.as_deref(), Some("bug,team"));
    }

    #[test]
    fn test_filter_omitted_when_nothing_to_filter() {
        assert_eq!(effective_filter(&[], &[]), None);
        assert_eq!(effective_filter(&labels(&["a"]), &[]).as_deref(), Some("a"));
        assert_eq!(effective_filter(&[], &labels(&["z"])).as_deref(), Some("z"));
    }

    #[test]
    fn test_payload_keeps_caller_labels_and_appends_added() {
        let merged = effective_payload_labels(Some(&labels(&["y", "y"])), &labels(&["x"]));
        assert_eq!(merged, labels(&["y", "y", "x"]));
    }

    #[test]
    fn test_payload_without_caller_labels_is_added_labels() {
        assert_eq!(effective_payload_labels(None, &labels(&["x"])), labels(&["x"]));
        assert!(effective_payload_labels(None, &[]).is_empty());
        assert!(effective_payload_labels(Some(&[]), &[]).is_empty());
    }

    #[test]
    fn test_parse_label_query() {
        assert_eq!(parse_label_query(Some("bug, help wanted,,")), labels(&["bug", "help wanted"]));
        assert!(parse_label_query(Some("")).is_empty());
        assert!(parse_label_query(None).is_empty());
    }

    fn label() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9 -]{0,8}"
    }

    proptest! {
        #[test]
        fn prop_filter_is_a_duplicate_free_superset(
            mandatory in prop::collection::vec(label(), 0..6),
            requested in prop::collection::vec(label(), 0..6),
        ) {
            match effective_filter(&mandatory, &requested) {
                None => prop_assert!(mandatory.is_empty() && requested.is_empty()),
                Some(filter) => {
                    let parts: Vec<&str> = filter.split(',').collect();
                    for label in mandatory.iter().chain(&requested) {
                        prop_assert!(parts.contains(&label.as_str()));
                    }
                    let mut deduped = parts.clone();
                    deduped.sort_unstable();
                    deduped.dedup();
                    prop_assert_eq!(deduped.len(), parts.len());
                }
            }
        }

        #[test]
        fn prop_payload_never_loses_added_labels(
            requested in prop::option::of(prop::collection::vec(label(), 0..6)),
            added in prop::collection::vec(label(), 0..6),
        ) {
            let merged = effective_payload_labels(requested.as_deref(), &added);
            let expected_len = requested.as_ref().map_or(0, Vec::len) + added.len();
            prop_assert_eq!(merged.len(), expected_len);
            prop_assert!(merged.ends_with(&added));
        }
    }
}
