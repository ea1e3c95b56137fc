use std::collections::BTreeSet;

use protocol::CommandRecord;
use protocol::text::trimmed_or_none;

use crate::config::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// Columns the listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Command,
    Description,
    Tags,
    CreatedAt,
}

impl SortField {
    /// Unknown names yield `None`, meaning the default order
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "command" => Some(Self::Command),
            "description" => Some(Self::Description),
            "tags" => Some(Self::Tags),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Description => "description",
            Self::Tags => "tags",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Anything other than `asc` sorts descending
    pub fn parse(value: &str) -> Self {
        if value == "asc" { Self::Asc } else { Self::Desc }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Normalized listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort: Option<SortField>,
    pub direction: SortDirection,
    pub page: i64,
    pub per_page: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(None, None, None, None, None)
    }
}

impl ListParams {
    pub fn new(
        search: Option<&str>,
        sort_by: Option<&str>,
        sort_dir: Option<&str>,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Self {
        Self {
            search: trimmed_or_none(search),
            sort: sort_by.and_then(SortField::parse),
            direction: sort_dir.map(SortDirection::parse).unwrap_or_default(),
            page: page.unwrap_or(1).max(1),
            per_page: clamp_per_page(per_page),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

fn clamp_per_page(per_page: Option<i64>) -> i64 {
    match per_page {
        Some(n) if n > MAX_PER_PAGE => MAX_PER_PAGE,
        Some(n) if n > 0 => n,
        _ => DEFAULT_PER_PAGE,
    }
}

/// One page of the listing plus the figures the index page shows
#[derive(Debug, Clone)]
pub struct CommandPage {
    pub commands: Vec<CommandRecord>,
    /// Rows matching the search, ignoring pagination
    pub total: i64,
    /// Distinct tags across the whole table
    pub tags: BTreeSet<String>,
    pub page: i64,
    pub per_page: i64,
}

impl CommandPage {
    pub fn total_pages(&self) -> i64 {
        (self.total + self.per_page - 1) / self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_page_defaults_and_clamps() {
        assert_eq!(ListParams::new(None, None, None, None, None).per_page, 5);
        assert_eq!(ListParams::new(None, None, None, None, Some(0)).per_page, 5);
        assert_eq!(ListParams::new(None, None, None, None, Some(-3)).per_page, 5);
        assert_eq!(ListParams::new(None, None, None, None, Some(42)).per_page, 42);
        assert_eq!(ListParams::new(None, None, None, None, Some(500)).per_page, 500);
        assert_eq!(ListParams::new(None, None, None, None, Some(1000)).per_page, 500);
    }

    #[test]
    fn page_is_one_based() {
        let params = ListParams::new(None, None, None, Some(3), Some(5));
        assert_eq!(params.offset(), 10);

        let params = ListParams::new(None, None, None, Some(0), Some(5));
        assert_eq!(params.page, 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn unknown_sort_falls_back_to_default() {
        let params = ListParams::new(None, Some("id; DROP TABLE"), Some("up"), None, None);
        assert_eq!(params.sort, None);
        assert_eq!(params.direction, SortDirection::Desc);

        let params = ListParams::new(None, Some("tags"), Some("asc"), None, None);
        assert_eq!(params.sort, Some(SortField::Tags));
        assert_eq!(params.direction, SortDirection::Asc);
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(ListParams::new(Some("   "), None, None, None, None).search, None);
        assert_eq!(
            ListParams::new(Some(" docker "), None, None, None, None).search.as_deref(),
            Some("docker")
        );
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = CommandPage {
            commands: vec![],
            total: 12,
            tags: BTreeSet::new(),
            page: 1,
            per_page: 5,
        };
        assert_eq!(page.total_pages(), 3);

        let empty = CommandPage { total: 0, ..page };
        assert_eq!(empty.total_pages(), 0);
    }
}
