use chrono::{Datelike, NaiveDate};
use sea_orm::sea_query::{Alias, Condition, Expr, Func, Order, Query, SelectStatement};
use serde::{Deserialize, Serialize};

use crate::schema::RecordType;

pub const PAGE_SIZE: u64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Descending id, for interactive listings.
    Newest,
    /// Ascending id, for print and export.
    Oldest,
}

impl SortOrder {
    fn order(&self) -> Order {
        match self {
            SortOrder::Newest => Order::Desc,
            SortOrder::Oldest => Order::Asc,
        }
    }
}

/// Search and month/year filter as submitted by the list and print pages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

impl RecordFilter {
    pub fn search_term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|term| !term.is_empty())
    }

    /// Both parts must be present and well-formed, otherwise no date filter
    /// applies.
    pub fn month_year(&self) -> Option<(u32, i32)> {
        let month = self.month.as_deref()?.trim().parse::<u32>().ok()?;
        let year = self.year.as_deref()?.trim().parse::<i32>().ok()?;
        (1..=12).contains(&month).then_some((month, year))
    }
}

/// Case-insensitive substring match OR-ed across every text column.
pub fn search_condition(rtype: RecordType, term: &str) -> Option<Condition> {
    let pattern = format!("%{}%", term.to_lowercase());
    let mut condition = Condition::any();
    let mut has_columns = false;

    for column in rtype.text_columns() {
        has_columns = true;
        condition = condition
            .add(Expr::expr(Func::lower(Expr::col(Alias::new(column.name)))).like(pattern.as_str()));
    }

    has_columns.then_some(condition)
}

/// Issue dates within the given calendar month. `None` when the type has no
/// `date_issued` column. A month outside the representable date range
/// matches nothing.
pub fn issued_in_month(rtype: RecordType, month: u32, year: i32) -> Option<Condition> {
    if !rtype.has_column("date_issued") {
        return None;
    }
    let Some((start, end)) = month_bounds(month, year) else {
        return Some(Condition::all().add(Expr::val(1).eq(0)));
    };

    let column = || Expr::col(Alias::new("date_issued"));
    Some(
        Condition::all()
            .add(column().gte(start))
            .add(column().lt(end)),
    )
}

fn month_bounds(month: u32, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if start.month() == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, end))
}

pub fn filter_condition(rtype: RecordType, filter: &RecordFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(search) = filter.search_term().and_then(|term| search_condition(rtype, term)) {
        condition = condition.add(search);
    }
    if let Some(dates) = filter
        .month_year()
        .and_then(|(month, year)| issued_in_month(rtype, month, year))
    {
        condition = condition.add(dates);
    }
    condition
}

pub fn select_records(
    rtype: RecordType,
    filter: &RecordFilter,
    order: SortOrder,
    page: Option<PageRequest>,
) -> SelectStatement {
    let mut select = Query::select();
    select
        .columns(rtype.columns().iter().map(|column| Alias::new(column.name)))
        .from(Alias::new(rtype.table_name()))
        .cond_where(filter_condition(rtype, filter))
        .order_by(Alias::new("id"), order.order());

    if let Some(page) = page {
        select.limit(page.limit).offset(page.offset);
    }
    select
}

pub fn select_record(rtype: RecordType, id: i32) -> SelectStatement {
    Query::select()
        .columns(rtype.columns().iter().map(|column| Alias::new(column.name)))
        .from(Alias::new(rtype.table_name()))
        .and_where(Expr::col(Alias::new("id")).eq(id))
        .to_owned()
}

pub fn count_records(rtype: RecordType, filter: &RecordFilter) -> SelectStatement {
    Query::select()
        .expr_as(Expr::cust("COUNT(*)"), Alias::new("total"))
        .from(Alias::new(rtype.table_name()))
        .cond_where(filter_condition(rtype, filter))
        .to_owned()
}

/// Offset pagination over 1-based page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl PageRequest {
    /// Offsets are capped so they still bind as a signed 64-bit integer.
    pub fn for_page(page_size: u64, page_number: u64) -> Self {
        let page_number = page_number.max(1);
        Self {
            limit: page_size,
            offset: (page_number - 1)
                .saturating_mul(page_size)
                .min(i64::MAX as u64),
        }
    }

    pub fn page(page_number: Option<u64>) -> Self {
        Self::for_page(PAGE_SIZE, page_number.unwrap_or(1))
    }

    pub fn page_number(&self) -> u64 {
        if self.limit == 0 {
            1
        } else {
            (self.offset / self.limit) + 1
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let page = request.page_number();
        let total_pages = if request.limit == 0 {
            1
        } else {
            total_items.div_ceil(request.limit).max(1)
        };

        Self {
            items,
            page,
            total_pages,
            total_items,
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{QueryStatementWriter, SqliteQueryBuilder};

    fn filter(q: Option<&str>, month: Option<&str>, year: Option<&str>) -> RecordFilter {
        RecordFilter {
            q: q.map(str::to_string),
            month: month.map(str::to_string),
            year: year.map(str::to_string),
        }
    }

    #[test]
    fn search_covers_text_columns_only() {
        let sql = select_records(
            RecordType::FirstJobSeeker,
            &filter(Some("Dela"), None, None),
            SortOrder::Newest,
            None,
        )
        .to_string(SqliteQueryBuilder);

        assert!(sql.contains(r#"LOWER("name") LIKE '%dela%'"#), "{}", sql);
        assert!(sql.contains(r#"LOWER("address") LIKE '%dela%'"#), "{}", sql);
        assert!(!sql.contains(r#"LOWER("date_issued")"#), "{}", sql);
        assert!(!sql.contains(r#"LOWER("yrs_of_residency")"#), "{}", sql);
        assert!(sql.contains(r#"ORDER BY "id" DESC"#), "{}", sql);
    }

    #[test]
    fn month_filter_needs_both_parts() {
        assert_eq!(filter(None, Some("3"), None).month_year(), None);
        assert_eq!(filter(None, Some("13"), Some("2024")).month_year(), None);
        assert_eq!(filter(None, Some("03"), Some("2024")).month_year(), Some((3, 2024)));
    }

    #[test]
    fn month_filter_spans_the_calendar_month() {
        let sql = select_records(
            RecordType::Clearance,
            &filter(None, Some("12"), Some("2024")),
            SortOrder::Oldest,
            None,
        )
        .to_string(SqliteQueryBuilder);

        assert!(sql.contains(r#""date_issued" >= '2024-12-01'"#), "{}", sql);
        assert!(sql.contains(r#""date_issued" < '2025-01-01'"#), "{}", sql);
        assert!(sql.contains(r#"ORDER BY "id" ASC"#), "{}", sql);
    }

    #[test]
    fn pagination_is_one_based() {
        assert_eq!(PageRequest::page(None).offset, 0);
        assert_eq!(PageRequest::page(Some(0)).offset, 0);
        assert_eq!(PageRequest::page(Some(3)).offset, 20);
        assert_eq!(PageRequest::page(Some(3)).page_number(), 3);

        let page: Page<u8> = Page::new(vec![], PageRequest::page(Some(2)), 21);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous);
        assert!(page.has_next);

        let empty: Page<u8> = Page::new(vec![], PageRequest::page(None), 0);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_next);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let request = PageRequest::page(Some(u64::MAX));
        assert_eq!(request.offset, i64::MAX as u64);
        assert_eq!(request.limit, PAGE_SIZE);

        let page: Page<u8> = Page::new(vec![], request, 3);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn out_of_range_year_matches_nothing() {
        let sql = select_records(
            RecordType::Indigency,
            &filter(None, Some("5"), Some("999999")),
            SortOrder::Oldest,
            None,
        )
        .to_string(SqliteQueryBuilder);

        assert!(sql.contains("1 = 0"), "{}", sql);
        assert!(!sql.contains(r#""date_issued" >="#), "{}", sql);
    }
}
