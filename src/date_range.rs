//! Inclusive calendar date ranges and the named presets reports offer

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::constants::{API_DATE_FORMAT, DEFAULT_RANGE_DAYS, MAX_RANGE_DAYS};
use crate::models::ApiParams;
use crate::resource::DependencyKey;

/// Named shortcut replacing both bounds at once
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    Last7Days,
    Last30Days,
    Last90Days,
}

impl Preset {
    pub const ALL: [Preset; 9] = [
        Preset::Today,
        Preset::Yesterday,
        Preset::ThisWeek,
        Preset::LastWeek,
        Preset::ThisMonth,
        Preset::LastMonth,
        Preset::Last7Days,
        Preset::Last30Days,
        Preset::Last90Days,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Preset::Today => "Today",
            Preset::Yesterday => "Yesterday",
            Preset::ThisWeek => "This Week",
            Preset::LastWeek => "Last Week",
            Preset::ThisMonth => "This Month",
            Preset::LastMonth => "Last Month",
            Preset::Last7Days => "Last 7 Days",
            Preset::Last30Days => "Last 30 Days",
            Preset::Last90Days => "Last 90 Days",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Today => "today",
            Preset::Yesterday => "yesterday",
            Preset::ThisWeek => "this-week",
            Preset::LastWeek => "last-week",
            Preset::ThisMonth => "this-month",
            Preset::LastMonth => "last-month",
            Preset::Last7Days => "last-7-days",
            Preset::Last30Days => "last-30-days",
            Preset::Last90Days => "last-90-days",
        }
    }

    /// `(start, end)` of this preset relative to `today`.
    ///
    /// Weeks start on Monday. "This" periods end today; "last" periods are
    /// the whole previous week or month. "Last N days" includes today.
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let month_start = today - Duration::days(today.day0() as i64);

        match self {
            Preset::Today => (today, today),
            Preset::Yesterday => {
                let yesterday = today - Duration::days(1);
                (yesterday, yesterday)
            }
            Preset::ThisWeek => (week_start, today),
            Preset::LastWeek => (
                week_start - Duration::days(7),
                week_start - Duration::days(1),
            ),
            Preset::ThisMonth => (month_start, today),
            Preset::LastMonth => {
                let end = month_start - Duration::days(1);
                (end - Duration::days(end.day0() as i64), end)
            }
            Preset::Last7Days => (today - Duration::days(6), today),
            Preset::Last30Days => (today - Duration::days(29), today),
            Preset::Last90Days => (today - Duration::days(89), today),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    /// Accepts `last-7-days`, `last_7_days` and `last7days` alike
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |v: &str| {
            v.chars()
                .filter(|c| *c != '-' && *c != '_')
                .collect::<String>()
                .to_ascii_lowercase()
        };
        let wanted = normalize(s);
        Preset::ALL
            .iter()
            .copied()
            .find(|p| normalize(p.name()) == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Today's date in the local timezone
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Inclusive `(start, end)` selection.
///
/// `start <= end` is the caller's responsibility: `set_range` stores what
/// it is given.
#[derive(Clone, Copy, Debug)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    default_days: i64,
    clock: fn() -> NaiveDate,
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::new(DEFAULT_RANGE_DAYS)
    }
}

impl DateRange {
    /// "Last `default_days` days" anchored on the local date
    pub fn new(default_days: i64) -> Self {
        Self::with_clock(default_days, local_today)
    }

    /// Same as `new` with an explicit source for "today"
    pub fn with_clock(default_days: i64, clock: fn() -> NaiveDate) -> Self {
        let mut range = DateRange {
            start: None,
            end: None,
            default_days,
            clock,
        };
        range.reset_to_default();
        range
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn set_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.start = start;
        self.end = end;
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        let (start, end) = preset.bounds(self.today());
        self.set_range(Some(start), Some(end));
    }

    /// Back to "today minus default_days .. today", re-read from the clock.
    /// `default_days` is clamped to `0..=MAX_RANGE_DAYS`, so start never
    /// passes end.
    pub fn reset_to_default(&mut self) {
        let today = self.today();
        let days = self.default_days.clamp(0, MAX_RANGE_DAYS);
        let start = today
            .checked_sub_signed(Duration::days(days))
            .unwrap_or(NaiveDate::MIN);
        self.set_range(Some(start), Some(today));
    }

    /// `start_date` / `end_date` as `YYYY-MM-DD`, or nothing at all when
    /// either bound is unset
    pub fn to_api_params(&self) -> ApiParams {
        let mut params = ApiParams::new();
        if let (Some(start), Some(end)) = (self.start, self.end) {
            params.insert(
                "start_date".to_string(),
                start.format(API_DATE_FORMAT).to_string(),
            );
            params.insert(
                "end_date".to_string(),
                end.format(API_DATE_FORMAT).to_string(),
            );
        }
        params
    }

    /// Both bounds formatted, for keying a request on this range
    pub fn dependency_key(&self) -> DependencyKey {
        [self.start, self.end]
            .iter()
            .map(|d| {
                d.map(|d| d.format(API_DATE_FORMAT).to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn is_ordered(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }
}
