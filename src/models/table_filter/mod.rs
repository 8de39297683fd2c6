use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir { #[default] Asc, Desc }

/// Columns of the course table that can drive the sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    CourseName,
    Number,
    Run,
    Status,
    Role,
}

impl SortColumn {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "course_name" => Some(SortColumn::CourseName),
            "number"      => Some(SortColumn::Number),
            "run"         => Some(SortColumn::Run),
            "status"      => Some(SortColumn::Status),
            "role"        => Some(SortColumn::Role),
            _             => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SortColumn::CourseName => "course_name",
            SortColumn::Number     => "number",
            SortColumn::Run        => "run",
            SortColumn::Status     => "status",
            SortColumn::Role       => "role",
        }
    }
}

/// Single-column sort. Selecting a new column replaces the whole spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub dir: SortDir,
}

impl Default for SortSpec {
    /// Course tables open sorted by name, descending.
    fn default() -> Self {
        SortSpec { column: SortColumn::CourseName, dir: SortDir::Desc }
    }
}

impl SortSpec {
    /// Unknown or missing column keys fall back to the default column.
    pub fn from_params(sort: Option<&str>, dir: Option<&str>) -> Self {
        let default = SortSpec::default();
        SortSpec {
            column: sort.and_then(SortColumn::from_key).unwrap_or(default.column),
            dir: match dir {
                Some("desc") => SortDir::Desc,
                Some("asc") => SortDir::Asc,
                _ => default.dir,
            },
        }
    }
    pub fn dir_str(&self) -> &'static str {
        match self.dir { SortDir::Asc => "asc", SortDir::Desc => "desc" }
    }
    pub fn toggle_dir(&self) -> &'static str {
        match self.dir { SortDir::Asc => "desc", SortDir::Desc => "asc" }
    }
}

/// Number of pages needed for `total` rows. Zero rows means zero pages.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Pull the page index back to the last page that holds a row, or 0 when
/// nothing matches. Same result as stepping back one page at a time.
pub fn settle_page_index(page_index: usize, total: usize, page_size: usize) -> usize {
    page_index.min(page_count(total, page_size).saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_spec_from_params() {
        let s = SortSpec::from_params(Some("run"), Some("asc"));
        assert_eq!(s.column, SortColumn::Run);
        assert_eq!(s.dir, SortDir::Asc);
        assert_eq!(s.toggle_dir(), "desc");
    }

    #[test]
    fn sort_spec_defaults_when_none() {
        let s = SortSpec::from_params(None, None);
        assert_eq!(s.column, SortColumn::CourseName);
        assert_eq!(s.dir, SortDir::Desc);
        assert_eq!(s.dir_str(), "desc");
        assert_eq!(s.toggle_dir(), "asc");
    }

    #[test]
    fn sort_spec_unknown_column_falls_back() {
        let s = SortSpec::from_params(Some("course_url"), Some("asc"));
        assert_eq!(s.column, SortColumn::CourseName);
        assert_eq!(s.dir, SortDir::Asc);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(25, 10), 3);
        assert_eq!(page_count(20, 10), 2);
        assert_eq!(page_count(0, 10), 0);
    }

    #[test]
    fn settle_steps_back_to_last_non_empty_page() {
        assert_eq!(settle_page_index(2, 25, 10), 2);
        assert_eq!(settle_page_index(2, 3, 10), 0);
        assert_eq!(settle_page_index(4, 15, 5), 2);
        assert_eq!(settle_page_index(3, 0, 10), 0);
    }

    #[test]
    fn settle_handles_huge_indices() {
        assert_eq!(settle_page_index(usize::MAX, 25, 10), 2);
        assert_eq!(settle_page_index(1_000_000_000, 101, 100), 1);
        assert_eq!(settle_page_index(usize::MAX, 0, 100), 0);
    }
}
