//! Report period labels.
//!
//! Explicit selections render as `"Q2 2025"` or `"2025-07"`. Without one the
//! nearest earnings season is used: Q1 results are reported around Apr–May,
//! Q2 around Jul–Aug, Q3 around Oct–Nov, and the prior year's Q4 around
//! Jan–Feb.

use chrono::{Datelike, Local, NaiveDate};

/// (quarter, first month, last month, reported for the prior year)
const SEASONS: [(&str, u32, u32, bool); 4] = [
    ("Q1", 4, 5, false),
    ("Q2", 7, 8, false),
    ("Q3", 10, 11, false),
    ("Q4", 1, 2, true),
];

/// `"q2"`, `"2"`, `"Q-2"` → `"Q2"`.
pub fn normalize_quarter(quarter: &str) -> String {
    let q: String = quarter
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if q.starts_with('Q') {
        q
    } else {
        format!("Q{q}")
    }
}

/// Quarter whose reporting season is closest to `today`'s month. Ties go to
/// the earlier entry of the season table.
pub fn nearest_quarter_season(today: NaiveDate) -> (&'static str, i32) {
    let month2 = today.month() * 2;
    let mut best = SEASONS[0];
    let mut best_dist = u32::MAX;
    for season in SEASONS {
        let (_, first, last, _) = season;
        let dist = month2.abs_diff(first + last);
        if dist < best_dist {
            best_dist = dist;
            best = season;
        }
    }
    let (quarter, _, _, prior_year) = best;
    let year = if prior_year { today.year() - 1 } else { today.year() };
    (quarter, year)
}

pub fn compose_period(
    quarter: Option<&str>,
    month: Option<u32>,
    year: Option<i32>,
    today: NaiveDate,
) -> String {
    let quarter = quarter.map(str::trim).filter(|q| !q.is_empty());
    let month = month.filter(|m| (1..=12).contains(m));
    match (quarter, month, year) {
        (Some(q), _, Some(y)) => format!("{} {y}", normalize_quarter(q)),
        (None, Some(m), Some(y)) => format!("{y}-{m:02}"),
        _ => {
            let (q, y) = nearest_quarter_season(today);
            format!("{q} {y}")
        }
    }
}

/// Free-form period text wins; otherwise compose one from the parts.
pub fn resolve_period(
    text: Option<&str>,
    quarter: Option<&str>,
    month: Option<u32>,
    year: Option<i32>,
    today: NaiveDate,
) -> String {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.to_string(),
        None => compose_period(quarter, month, year, today),
    }
}

/// [`resolve_period`] against the local calendar date.
pub fn resolve_period_now(
    text: Option<&str>,
    quarter: Option<&str>,
    month: Option<u32>,
    year: Option<i32>,
) -> String {
    resolve_period(text, quarter, month, year, Local::now().date_naive())
}
