//! Display utilities for formatting dashboard output.
//!
//! This module provides the terminal rendering for each view: sales and lead
//! tables, aggregate summaries, the attribution report and the picker's month
//! grid.
//!
//! # Functions
//!
//! - [`truncate`] - Truncate strings to a maximum length with ellipsis
//! - [`sort_sales`] / [`sort_leads`] - Apply the query's sort order
//! - [`render_month`] - Draw a picker month as text
//! - [`print_section`] / [`print_section_simple`] - Print section headers
//! - [`display_summary`] / [`display_sales`] / etc. - Display formatted views

use std::cmp::Ordering;
use std::fmt::Write as _;

use chrono::NaiveDateTime;

use crate::aggregate::Summary;
use crate::attribution::VideoStats;
use crate::filter::parse_record_timestamp;
use crate::picker::RangePicker;
use crate::query::SortOrder;
use crate::records::{Lead, Record, Sale};

const WEEKDAY_HEADER: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Truncate a string to a maximum length, adding "..." if truncated.
///
/// Handles Unicode characters correctly by counting chars rather than bytes.
/// For `max_len < 3`, truncates without ellipsis since there's no room for "...".
///
/// # Examples
///
/// ```
/// use valhalla::display::truncate;
///
/// assert_eq!(truncate("hello", 10), "hello");
/// assert_eq!(truncate("hello world", 8), "hello...");
/// assert_eq!(truncate("hello", 2), "he");
/// ```
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len < 3 {
        // No room for ellipsis, just truncate
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}

/// Compare parsed record timestamps; unparsable dates sort after real ones.
fn cmp_timestamps(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>, newest_first: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if newest_first => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn record_timestamp<R: Record>(record: &R) -> Option<NaiveDateTime> {
    record.date().and_then(parse_record_timestamp)
}

/// Order sales for display.
pub fn sort_sales(sales: &mut [&Sale], order: SortOrder) {
    match order {
        SortOrder::Newest | SortOrder::Oldest => sales.sort_by(|a, b| {
            cmp_timestamps(
                record_timestamp(*a),
                record_timestamp(*b),
                order == SortOrder::Newest,
            )
        }),
        SortOrder::Cash => sales.sort_by(|a, b| b.cash().get().total_cmp(&a.cash().get())),
        SortOrder::Name => sales.sort_by_key(|s| s.name.to_lowercase()),
    }
}

/// Order leads for display; `cash` has no meaning for leads and keeps newest first.
pub fn sort_leads(leads: &mut [&Lead], order: SortOrder) {
    match order {
        SortOrder::Name => leads.sort_by_key(|l| l.name.to_lowercase()),
        _ => leads.sort_by(|a, b| {
            cmp_timestamps(
                record_timestamp(*a),
                record_timestamp(*b),
                order != SortOrder::Oldest,
            )
        }),
    }
}

/// Render the picker's visible month as a text grid.
///
/// Endpoints are bracketed `[ 5]`, other selected days parenthesised `( 6)`
/// and today is starred ` 7*`.
#[must_use]
pub fn render_month(picker: &RangePicker) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:^28}", picker.cursor().label());
    for name in WEEKDAY_HEADER {
        let _ = write!(out, " {name} ");
    }
    out.push('\n');

    for week in picker.month_grid().chunks(7) {
        for cell in week {
            let text = match cell {
                None => "    ".to_string(),
                Some(c) if c.endpoint => format!("[{:>2}]", c.date.day()),
                Some(c) if c.in_range => format!("({:>2})", c.date.day()),
                Some(c) if c.today => format!(" {:>2}*", c.date.day()),
                Some(c) => format!(" {:>2} ", c.date.day()),
            };
            out.push_str(&text);
        }
        out.push('\n');
    }
    out
}

/// Print a section header with equals signs.
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(50));
    println!("  {title}");
    println!("{}", "=".repeat(50));
}

/// Print a simple section header with dashes.
pub fn print_section_simple(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(30));
}

/// Display summary counts, sums and groups.
pub fn display_summary(summary: &Summary, group_label: &str) {
    println!("  Records:          {:>12}", summary.total_count);
    for (field, amount) in &summary.sums {
        println!("  {:<18}{:>12}", format!("{} total:", capitalize(field)), amount.to_string());
    }
    if !summary.groups.is_empty() {
        println!("  By {group_label}:");
        let mut groups: Vec<(&String, &usize)> = summary.groups.iter().collect();
        groups.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (key, count) in groups {
            println!("    {:<24} {:>6}", truncate(key, 24), count);
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Display sales rows.
pub fn display_sales(sales: &[&Sale], limit: usize) {
    for (i, sale) in sales.iter().take(limit).enumerate() {
        println!(
            "  {:3}. {:<19} {:<22} {:<10} {:<12} {:<12} {:>12}",
            i + 1,
            truncate(sale.date.as_deref().unwrap_or("-"), 19),
            truncate(&sale.name, 22),
            truncate(sale.platform.as_deref().unwrap_or("-"), 10),
            truncate(sale.closer.as_deref().unwrap_or("-"), 12),
            truncate(sale.outcome.as_deref().unwrap_or("-"), 12),
            sale.cash().to_string()
        );
    }
    if sales.len() > limit {
        println!("  ... {} more", sales.len() - limit);
    }
}

/// Display lead rows.
pub fn display_leads(leads: &[&Lead], limit: usize) {
    for (i, lead) in leads.iter().take(limit).enumerate() {
        println!(
            "  {:3}. {:<19} {:<22} {:<10} {}",
            i + 1,
            truncate(lead.date.as_deref().unwrap_or("-"), 19),
            truncate(&lead.name, 22),
            truncate(lead.platform.as_deref().unwrap_or("-"), 10),
            lead.video_id().unwrap_or_else(|| "-".to_string())
        );
    }
    if leads.len() > limit {
        println!("  ... {} more", leads.len() - limit);
    }
}

/// Display the attribution report.
pub fn display_video_stats(stats: &[VideoStats], limit: usize) {
    if stats.is_empty() {
        println!("  No attributed leads for this period.");
        return;
    }
    println!(
        "  {:<13} {:<30} {:>6} {:>6} {:>12}",
        "Video", "Title", "Leads", "Calls", "Cash"
    );
    for entry in stats.iter().take(limit) {
        println!(
            "  {:<13} {:<30} {:>6} {:>6} {:>12}",
            truncate(&entry.video_id, 13),
            truncate(entry.title.as_deref().unwrap_or("-"), 30),
            entry.leads,
            entry.calls,
            entry.cash.to_string()
        );
    }
}
