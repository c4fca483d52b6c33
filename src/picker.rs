//! Two-click date range picker.
//!
//! One state machine serves every surface that lets a user pick a range; the
//! surfaces differ only in how they draw [`RangePicker::month_grid`].

use crate::calendar::{CalendarDate, YearMonth};
use crate::date_range::{DateRange, Preset};

/// Progress of an in-flight range selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing picked yet
    #[default]
    Empty,
    /// One endpoint picked, waiting for the second click
    AnchoredAt(CalendarDate),
    /// Both endpoints picked; the next click starts over
    Committed {
        start: CalendarDate,
        end: CalendarDate,
    },
}

impl SelectionState {
    /// Apply a click on `date`.
    ///
    /// The committed bounds are ordered chronologically, not by click order.
    /// Clicking the anchor again commits a single-day range.
    #[must_use]
    pub fn click(self, date: CalendarDate) -> Self {
        match self {
            Self::Empty | Self::Committed { .. } => Self::AnchoredAt(date),
            Self::AnchoredAt(anchor) => Self::Committed {
                start: anchor.min(date),
                end: anchor.max(date),
            },
        }
    }

    /// Whether `date` should be highlighted as selected.
    ///
    /// A lone anchor highlights itself.
    #[must_use]
    pub fn is_in_range(&self, date: CalendarDate) -> bool {
        match *self {
            Self::Empty => false,
            Self::AnchoredAt(anchor) => date == anchor,
            Self::Committed { start, end } => start <= date && date <= end,
        }
    }

    /// Whether `date` is a boundary of the selection.
    #[must_use]
    pub fn is_endpoint(&self, date: CalendarDate) -> bool {
        match *self {
            Self::Empty => false,
            Self::AnchoredAt(anchor) => date == anchor,
            Self::Committed { start, end } => date == start || date == end,
        }
    }

    /// The committed range, if both endpoints have been picked.
    #[must_use]
    pub fn committed(&self) -> Option<DateRange> {
        match *self {
            Self::Committed { start, end } => Some(DateRange::between(start, end)),
            _ => None,
        }
    }
}

/// One day cell of a rendered month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: CalendarDate,
    pub in_range: bool,
    pub endpoint: bool,
    pub today: bool,
}

/// A picker surface: open flag, in-progress selection and the visible month.
#[derive(Debug, Clone)]
pub struct RangePicker {
    open: bool,
    selection: SelectionState,
    cursor: YearMonth,
    today: CalendarDate,
}

impl RangePicker {
    /// Create a closed picker showing the month that contains `today`.
    #[must_use]
    pub fn new(today: CalendarDate) -> Self {
        Self {
            open: false,
            selection: SelectionState::Empty,
            cursor: YearMonth::of(today),
            today,
        }
    }

    /// Open the picker on the month of `current`'s start (or today's month).
    ///
    /// Always begins from an empty selection, whatever was committed before.
    pub fn open(&mut self, current: &DateRange) {
        self.open = true;
        self.selection = SelectionState::Empty;
        self.cursor = YearMonth::of(current.start.unwrap_or(self.today));
    }

    /// Close without applying; the in-progress selection is discarded.
    pub fn close(&mut self) {
        self.open = false;
        self.selection = SelectionState::Empty;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub const fn selection(&self) -> SelectionState {
        self.selection
    }

    #[must_use]
    pub const fn cursor(&self) -> YearMonth {
        self.cursor
    }

    pub fn click(&mut self, date: CalendarDate) {
        self.selection = self.selection.click(date);
        tracing::debug!(%date, selection = ?self.selection, "picker click");
    }

    pub fn next_month(&mut self) {
        self.cursor = self.cursor.next();
    }

    pub fn prev_month(&mut self) {
        self.cursor = self.cursor.prev();
    }

    /// Jump the visible month without touching the selection.
    pub fn show_month(&mut self, month: YearMonth) {
        self.cursor = month;
    }

    /// Commit the selection and close.
    ///
    /// A lone anchor applies as a single-day range; an empty selection applies
    /// nothing and returns `None`.
    pub fn apply(&mut self) -> Option<DateRange> {
        let range = match self.selection {
            SelectionState::Empty => None,
            SelectionState::AnchoredAt(anchor) => Some(DateRange::single_day(anchor)),
            SelectionState::Committed { start, end } => Some(DateRange::between(start, end)),
        };
        self.close();
        range
    }

    /// Resolve `preset` against the picker's today and close.
    pub fn apply_preset(&mut self, preset: &Preset) -> DateRange {
        self.close();
        preset.resolve(self.today)
    }

    /// Cells of the visible month in row-major order, Sunday first.
    ///
    /// Leading `None`s pad the first week to the month's first weekday.
    #[must_use]
    pub fn month_grid(&self) -> Vec<Option<DayCell>> {
        let lead = self.cursor.first_weekday() as usize;
        let mut cells = vec![None; lead];
        cells.extend((1..=self.cursor.days()).filter_map(|day| {
            self.cursor.day(day).map(|date| {
                Some(DayCell {
                    date,
                    in_range: self.selection.is_in_range(date),
                    endpoint: self.selection.is_endpoint(date),
                    today: date == self.today,
                })
            })
        }));
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::PresetRule;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::new(y, m, d).unwrap()
    }

    #[test]
    fn test_click_sequence() {
        let s = SelectionState::Empty.click(date(2024, 3, 5));
        assert_eq!(s, SelectionState::AnchoredAt(date(2024, 3, 5)));

        let s = s.click(date(2024, 3, 9));
        assert_eq!(
            s,
            SelectionState::Committed {
                start: date(2024, 3, 5),
                end: date(2024, 3, 9)
            }
        );

        // third click starts over
        let s = s.click(date(2024, 4, 1));
        assert_eq!(s, SelectionState::AnchoredAt(date(2024, 4, 1)));
    }

    #[test]
    fn test_commit_orders_by_date_not_click() {
        let pairs = [
            (date(2024, 3, 9), date(2024, 3, 5)),
            (date(2024, 3, 5), date(2024, 3, 9)),
            (date(2025, 1, 1), date(2023, 6, 30)),
        ];
        for (first, second) in pairs {
            let range = SelectionState::Empty
                .click(first)
                .click(second)
                .committed()
                .unwrap();
            assert!(range.start <= range.end);
            assert_eq!(range.start, Some(first.min(second)));
            assert_eq!(range.end, Some(first.max(second)));
        }
    }

    #[test]
    fn test_double_click_commits_single_day() {
        let d = date(2024, 3, 5);
        let s = SelectionState::Empty.click(d).click(d);
        assert_eq!(s.committed(), Some(DateRange::single_day(d)));
    }

    #[test]
    fn test_is_in_range() {
        let empty = SelectionState::Empty;
        assert!(!empty.is_in_range(date(2024, 3, 5)));

        let anchored = SelectionState::AnchoredAt(date(2024, 3, 5));
        assert!(anchored.is_in_range(date(2024, 3, 5)));
        assert!(!anchored.is_in_range(date(2024, 3, 6)));

        let committed = anchored.click(date(2024, 3, 8));
        assert!(committed.is_in_range(date(2024, 3, 5)));
        assert!(committed.is_in_range(date(2024, 3, 7)));
        assert!(committed.is_in_range(date(2024, 3, 8)));
        assert!(!committed.is_in_range(date(2024, 3, 4)));
        assert!(!committed.is_in_range(date(2024, 3, 9)));
    }

    #[test]
    fn test_is_endpoint() {
        let committed = SelectionState::Empty
            .click(date(2024, 3, 8))
            .click(date(2024, 3, 5));
        assert!(committed.is_endpoint(date(2024, 3, 5)));
        assert!(committed.is_endpoint(date(2024, 3, 8)));
        assert!(!committed.is_endpoint(date(2024, 3, 6)));
    }

    #[test]
    fn test_open_always_starts_empty() {
        let mut picker = RangePicker::new(date(2024, 3, 10));
        picker.open(&DateRange::all_time());
        picker.click(date(2024, 3, 1));
        picker.click(date(2024, 3, 3));
        let applied = picker.apply().unwrap();
        assert!(!picker.is_open());

        picker.open(&applied);
        assert!(picker.is_open());
        assert_eq!(picker.selection(), SelectionState::Empty);
    }

    #[test]
    fn test_open_shows_month_of_current_start() {
        let mut picker = RangePicker::new(date(2024, 3, 10));
        picker.open(&DateRange::between(date(2023, 11, 2), date(2023, 12, 1)));
        assert_eq!(picker.cursor(), YearMonth::new(2023, 11).unwrap());

        picker.open(&DateRange::all_time());
        assert_eq!(picker.cursor(), YearMonth::new(2024, 3).unwrap());
    }

    #[test]
    fn test_close_discards_selection() {
        let mut picker = RangePicker::new(date(2024, 3, 10));
        picker.open(&DateRange::all_time());
        picker.click(date(2024, 3, 1));
        picker.close();
        assert_eq!(picker.selection(), SelectionState::Empty);
        assert_eq!(picker.apply(), None);
    }

    #[test]
    fn test_apply_anchor_as_single_day() {
        let mut picker = RangePicker::new(date(2024, 3, 10));
        picker.open(&DateRange::all_time());
        picker.click(date(2024, 3, 2));
        assert_eq!(picker.apply(), Some(DateRange::single_day(date(2024, 3, 2))));
    }

    #[test]
    fn test_apply_preset_uses_picker_today() {
        let mut picker = RangePicker::new(date(2024, 3, 10));
        picker.open(&DateRange::all_time());
        let range = picker.apply_preset(&PresetRule::LastDays(7).into());
        assert_eq!(range.start, Some(date(2024, 3, 4)));
        assert!(!picker.is_open());
    }

    #[test]
    fn test_month_navigation() {
        let mut picker = RangePicker::new(date(2024, 1, 10));
        picker.prev_month();
        assert_eq!(picker.cursor(), YearMonth::new(2023, 12).unwrap());
        picker.next_month();
        picker.next_month();
        assert_eq!(picker.cursor(), YearMonth::new(2024, 2).unwrap());
    }

    #[test]
    fn test_month_grid_layout() {
        // March 2024 starts on a Friday
        let mut picker = RangePicker::new(date(2024, 3, 10));
        picker.open(&DateRange::all_time());
        picker.click(date(2024, 3, 4));
        picker.click(date(2024, 3, 6));

        let grid = picker.month_grid();
        assert_eq!(grid.len(), 5 + 31);
        assert!(grid[..5].iter().all(Option::is_none));

        let first = grid[5].unwrap();
        assert_eq!(first.date, date(2024, 3, 1));
        assert!(!first.in_range);

        let fifth = grid[5 + 4].unwrap();
        assert!(fifth.in_range);
        assert!(!fifth.endpoint);

        let tenth = grid[5 + 9].unwrap();
        assert!(tenth.today);
    }
}
