use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::models::table_filter::{SortColumn, SortDir, SortSpec, page_count, settle_page_index};
use super::store::EditState;
use super::types::{CourseRow, RoleValue};

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Filter, sort and page parameters of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    pub search: String,
    pub status: String,
    pub org: String,
    pub sort: SortSpec,
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for ViewQuery {
    fn default() -> Self {
        ViewQuery {
            search: String::new(),
            status: String::new(),
            org: String::new(),
            sort: SortSpec::default(),
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One visible row with its current edit state.
#[derive(Debug, Clone, Serialize)]
pub struct PageRow {
    #[serde(flatten)]
    pub course: CourseRow,
    pub checked: bool,
    pub role: RoleValue,
    pub display_role: RoleValue,
    /// Role control is only interactive for checked rows.
    pub role_editable: bool,
}

/// State of the "select all on this page" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderCheckbox {
    All,
    Some,
    None,
}

/// The visible slice plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CoursePage {
    pub rows: Vec<PageRow>,
    pub page_index: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub page_count: usize,
    /// 1-based index of the first visible row, 0 when nothing matches.
    pub start_item: usize,
    pub end_item: usize,
    pub header: HeaderCheckbox,
}

impl CoursePage {
    pub fn course_ids(&self) -> HashSet<String> {
        self.rows.iter().map(|r| r.course.course_id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn matches_query(row: &CourseRow, query: &ViewQuery) -> bool {
    let needle = query.search.to_lowercase();
    let text_hit = needle.is_empty()
        || row.course_name.to_lowercase().contains(&needle)
        || row.number.to_lowercase().contains(&needle)
        || row.run.to_lowercase().contains(&needle);
    text_hit
        && (query.status.is_empty() || row.status == query.status)
        && (query.org.is_empty() || row.org == query.org)
}

fn sort_value<'a>(row: &'a CourseRow, role: RoleValue, column: SortColumn) -> &'a str {
    match column {
        SortColumn::CourseName => &row.course_name,
        SortColumn::Number => &row.number,
        SortColumn::Run => &row.run,
        SortColumn::Status => &row.status,
        SortColumn::Role => role.as_str(),
    }
}

/// Case-insensitive comparison where runs of ASCII digits compare by value,
/// so "run 5" sorts before "run 15".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_digits(&mut a);
                let right = take_digits(&mut b);
                let ord = compare_digit_runs(&left, &right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Rows passing the filters, in sort order. The sort is stable.
pub fn filter_and_sort<'a>(
    rows: &'a [CourseRow],
    edits: &EditState,
    query: &ViewQuery,
) -> Vec<&'a CourseRow> {
    let mut matched: Vec<&CourseRow> = rows.iter().filter(|r| matches_query(r, query)).collect();
    let column = query.sort.column;
    matched.sort_by(|a, b| {
        let ord = natural_cmp(
            sort_value(a, edits.role(&a.course_id), column),
            sort_value(b, edits.role(&b.course_id), column),
        );
        match query.sort.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
    matched
}

/// Filter, sort and paginate. If the requested page lies past the end of
/// the filtered rows the returned page index steps back to the last page
/// that has rows; callers store `page.page_index` back into their query.
pub fn current_page(rows: &[CourseRow], edits: &EditState, query: &ViewQuery) -> CoursePage {
    let page_size = query.page_size.max(1);
    let matched = filter_and_sort(rows, edits, query);
    let total_count = matched.len();
    let page_index = settle_page_index(query.page_index, total_count, page_size);
    let start = page_index * page_size;

    let visible: Vec<PageRow> = matched
        .into_iter()
        .skip(start)
        .take(page_size)
        .map(|course| {
            let checked = edits.is_checked(&course.course_id);
            let role = edits.role(&course.course_id);
            PageRow {
                course: course.clone(),
                checked,
                role,
                display_role: role.display(),
                role_editable: checked,
            }
        })
        .collect();

    let checked_count = visible.iter().filter(|r| r.checked).count();
    let header = if !visible.is_empty() && checked_count == visible.len() {
        HeaderCheckbox::All
    } else if checked_count > 0 {
        HeaderCheckbox::Some
    } else {
        HeaderCheckbox::None
    };

    let start_item = if total_count == 0 { 0 } else { start + 1 };
    let end_item = if total_count == 0 { 0 } else { (start + page_size).min(total_count) };

    CoursePage {
        rows: visible,
        page_index,
        page_size,
        total_count,
        page_count: page_count(total_count, page_size),
        start_item,
        end_item,
        header,
    }
}

/// Distinct non-empty orgs in first-seen order, for the org filter.
pub fn org_choices(rows: &[CourseRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| !r.org.is_empty() && seen.insert(r.org.as_str()))
        .map(|r| r.org.clone())
        .collect()
}
