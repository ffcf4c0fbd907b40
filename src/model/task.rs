use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A working day on the board. The week is fixed to Monday through Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Day {
    pub const ALL: [Day; 5] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri];

    /// Short label used on the wire and in column headers
    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
        }
    }

    /// Days since Monday
    pub fn offset(self) -> usize {
        self as usize
    }

    pub fn from_offset(offset: usize) -> Option<Day> {
        Day::ALL.get(offset).copied()
    }

    /// Next day, saturating at Friday
    pub fn next(self) -> Day {
        Day::from_offset(self.offset() + 1).unwrap_or(Day::Fri)
    }

    /// Previous day, saturating at Monday
    pub fn prev(self) -> Day {
        self.offset()
            .checked_sub(1)
            .and_then(Day::from_offset)
            .unwrap_or(Day::Mon)
    }

    /// Map a calendar weekday onto the board, `None` for weekends
    pub fn from_weekday(weekday: chrono::Weekday) -> Option<Day> {
        match weekday {
            chrono::Weekday::Mon => Some(Day::Mon),
            chrono::Weekday::Tue => Some(Day::Tue),
            chrono::Weekday::Wed => Some(Day::Wed),
            chrono::Weekday::Thu => Some(Day::Thu),
            chrono::Weekday::Fri => Some(Day::Fri),
            _ => None,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mon" | "monday" => Ok(Day::Mon),
            "tue" | "tuesday" => Ok(Day::Tue),
            "wed" | "wednesday" => Ok(Day::Wed),
            "thu" | "thursday" => Ok(Day::Thu),
            "fri" | "friday" => Ok(Day::Fri),
            _ => Err(format!("invalid day: {} (expected Mon..Fri)", s)),
        }
    }
}

/// Which part of the day a task occupies, ordered whole-day, morning, afternoon
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeBlock {
    #[default]
    WholeDay,
    Morning,
    Afternoon,
}

impl TimeBlock {
    pub const ALL: [TimeBlock; 3] = [TimeBlock::WholeDay, TimeBlock::Morning, TimeBlock::Afternoon];

    /// Wire value (`whole-day`, `morning`, `afternoon`)
    pub fn as_str(self) -> &'static str {
        match self {
            TimeBlock::WholeDay => "whole-day",
            TimeBlock::Morning => "morning",
            TimeBlock::Afternoon => "afternoon",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeBlock::WholeDay => "Whole day",
            TimeBlock::Morning => "Morning",
            TimeBlock::Afternoon => "Afternoon",
        }
    }

    /// Compact marker shown on task cards
    pub fn marker(self) -> &'static str {
        match self {
            TimeBlock::WholeDay => "",
            TimeBlock::Morning => "am",
            TimeBlock::Afternoon => "pm",
        }
    }

    pub fn next(self) -> TimeBlock {
        match self {
            TimeBlock::WholeDay => TimeBlock::Morning,
            TimeBlock::Morning => TimeBlock::Afternoon,
            TimeBlock::Afternoon => TimeBlock::WholeDay,
        }
    }

    pub fn prev(self) -> TimeBlock {
        match self {
            TimeBlock::WholeDay => TimeBlock::Afternoon,
            TimeBlock::Morning => TimeBlock::WholeDay,
            TimeBlock::Afternoon => TimeBlock::Morning,
        }
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeBlock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "whole-day" | "whole" | "day" => Ok(TimeBlock::WholeDay),
            "morning" | "am" => Ok(TimeBlock::Morning),
            "afternoon" | "pm" => Ok(TimeBlock::Afternoon),
            _ => Err(format!(
                "invalid time block: {} (expected whole-day, morning or afternoon)",
                s
            )),
        }
    }
}

/// A task assignment on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Project name the task is booked against
    pub title: String,
    /// Free text shown as the card subtitle
    pub description: Option<String>,
    pub assignee_id: Option<String>,
    /// Assignee display name
    pub assignee: String,
    pub day: Day,
    pub time_block: TimeBlock,
    /// Owning team name; together with `day` this selects the grid cell
    pub team: String,
    /// Hex color derived from the project
    pub color: String,
}

impl Task {
    pub fn subtitle(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// Whether the task renders in the given cell
    pub fn is_in_cell(&self, team: &str, day: Day) -> bool {
        self.team == team && self.day == day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_parse_accepts_short_and_long_names() {
        assert_eq!("mon".parse::<Day>().unwrap(), Day::Mon);
        assert_eq!("Friday".parse::<Day>().unwrap(), Day::Fri);
        assert!("sat".parse::<Day>().is_err());
    }

    #[test]
    fn day_next_prev_saturate() {
        assert_eq!(Day::Fri.next(), Day::Fri);
        assert_eq!(Day::Mon.prev(), Day::Mon);
        assert_eq!(Day::Tue.next(), Day::Wed);
        assert_eq!(Day::Thu.prev(), Day::Wed);
    }

    #[test]
    fn day_serializes_as_short_label() {
        assert_eq!(serde_json::to_string(&Day::Wed).unwrap(), "\"Wed\"");
    }

    #[test]
    fn time_block_wire_values() {
        assert_eq!(
            serde_json::to_string(&TimeBlock::WholeDay).unwrap(),
            "\"whole-day\""
        );
        let tb: TimeBlock = serde_json::from_str("\"afternoon\"").unwrap();
        assert_eq!(tb, TimeBlock::Afternoon);
        assert_eq!(TimeBlock::default(), TimeBlock::WholeDay);
    }

    #[test]
    fn time_block_cycles() {
        let mut tb = TimeBlock::WholeDay;
        for _ in 0..3 {
            tb = tb.next();
        }
        assert_eq!(tb, TimeBlock::WholeDay);
        assert_eq!(TimeBlock::WholeDay.prev(), TimeBlock::Afternoon);
    }
}
