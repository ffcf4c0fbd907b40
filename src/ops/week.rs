use chrono::{Datelike, Days, Local, NaiveDate};

use crate::model::Day;

/// The week shown on the board, anchored on its Monday
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCursor {
    monday: NaiveDate,
}

impl WeekCursor {
    /// The week containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        let back = u64::from(date.weekday().num_days_from_monday());
        WeekCursor {
            monday: date.checked_sub_days(Days::new(back)).unwrap_or(date),
        }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }

    pub fn prev(self) -> Self {
        self.shift(-1)
    }

    /// Move by whole weeks, negative for the past. Out-of-range moves stay put.
    pub fn shift(self, weeks: i64) -> Self {
        let moved = weeks.unsigned_abs().checked_mul(7).and_then(|n| {
            if weeks >= 0 {
                self.monday.checked_add_days(Days::new(n))
            } else {
                self.monday.checked_sub_days(Days::new(n))
            }
        });
        WeekCursor {
            monday: moved.unwrap_or(self.monday),
        }
    }

    /// Whole weeks between `base` and this week
    pub fn offset_from(&self, base: WeekCursor) -> i64 {
        (self.monday - base.monday).num_days() / 7
    }

    pub fn date(&self, day: Day) -> NaiveDate {
        self.monday
            .checked_add_days(Days::new(day.offset() as u64))
            .unwrap_or(self.monday)
    }

    /// Column header, e.g. "Wed 14"
    pub fn column_label(&self, day: Day) -> String {
        format!("{} {}", day.label(), self.date(day).format("%-d"))
    }

    /// Date shown in the assignment modal, e.g. "Wed 14 Oct"
    pub fn date_label(&self, day: Day) -> String {
        format!("{} {}", day.label(), self.date(day).format("%-d %b"))
    }

    /// Range label, e.g. "12 Oct - 16 Oct 2026"
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.monday.format("%-d %b"),
            self.date(Day::Fri).format("%-d %b %Y")
        )
    }
}
