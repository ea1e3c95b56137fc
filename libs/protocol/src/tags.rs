//! Tags are stored as one comma-separated column. These helpers give the
//! set-of-strings view used for aggregation.

use std::collections::BTreeSet;

/// Splits a raw tags value into trimmed, non-empty tags
pub fn split(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|tag| !tag.is_empty())
}

/// Collects the distinct tags of many raw values, sorted
pub fn collect<'a, I>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .flat_map(split)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_trims_and_drops_empty_pieces() {
        let tags: Vec<_> = split(" docker , ,net,, ").collect();
        assert_eq!(tags, vec!["docker", "net"]);
    }

    #[test]
    fn collect_deduplicates_across_rows() {
        let rows = ["a, b", "b,c", ""];
        let tags = collect(rows);
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn tags_are_case_sensitive() {
        let tags = collect(["Git", "git"]);
        assert_eq!(tags.len(), 2);
    }
}
