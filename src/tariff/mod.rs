//! Tariff engine for the seasonal day/night price schedule
//!
//! Resolves which season applies to a calendar date, whether the day or
//! night tariff is active at a time of day, and the boundary-crossing time
//! math: minutes until the next change, peak/off-peak hours remaining
//! before midnight, and the time-weighted daily average rate.

use crate::core::{Season, Tariff, TariffSettings, TariffState};
use chrono::{NaiveDateTime, Timelike};

/// Minutes in a full day
const DAY_MINUTES: u32 = 1440;

/// Tariff schedule resolver built from the current settings
pub struct TariffSchedule {
    settings: TariffSettings,
}

impl TariffSchedule {
    /// Create a new schedule with the given settings
    pub fn new(settings: &TariffSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Replace the settings (rate, season, or currency edits)
    pub fn update_settings(&mut self, settings: &TariffSettings) {
        self.settings = settings.clone();
    }

    /// Current settings backing this schedule
    pub fn settings(&self) -> &TariffSettings {
        &self.settings
    }

    /// Resolve which season applies to the given date.
    ///
    /// Iterates the ordered season list and returns the first match. A
    /// season whose `start_month` exceeds its `end_month` wraps across the
    /// year boundary: membership is then "from start to year-end" OR
    /// "from year-start to end". If nothing matches, the first configured
    /// season is used; with no seasons configured this returns `None` and
    /// downstream logic defaults to the day tariff.
    pub fn resolve_season(&self, month: u32, day: u32) -> Option<&Season> {
        self.settings
            .seasons
            .iter()
            .find(|s| season_matches(s, month, day))
            .or_else(|| self.settings.seasons.first())
    }

    /// Resolve the active tariff for a season at a time of day.
    ///
    /// The day window is `[day_start, day_end)`: inclusive start, exclusive
    /// end. Everything outside the window is night.
    pub fn resolve_tariff(&self, season: &Season, minute_of_day: u32) -> Tariff {
        let day_start = parse_time(&season.day_start);
        let day_end = parse_time(&season.day_end);

        if minute_of_day >= day_start && minute_of_day < day_end {
            Tariff::Day
        } else {
            Tariff::Night
        }
    }

    /// Minutes remaining until the tariff next changes.
    ///
    /// During the day window this is the distance to `day_end`. At night
    /// after `day_end` the distance wraps past midnight to the next
    /// `day_start`; at night before `day_start` it is the distance to
    /// `day_start`.
    pub fn minutes_until_change(&self, season: &Season, minute_of_day: u32) -> u32 {
        let day_start = parse_time(&season.day_start);
        let day_end = parse_time(&season.day_end);

        match self.resolve_tariff(season, minute_of_day) {
            Tariff::Day => day_end - minute_of_day,
            Tariff::Night => {
                if minute_of_day >= day_end {
                    (DAY_MINUTES - minute_of_day) + day_start
                } else {
                    day_start - minute_of_day
                }
            }
        }
    }

    /// Day-tariff hours left before midnight.
    ///
    /// Before the window the full window remains; inside it only the
    /// remainder to `day_end`; past it zero, since the window does not
    /// recur before the next calendar day.
    pub fn peak_hours_remaining(&self, season: &Season, minute_of_day: u32) -> f64 {
        let day_start = parse_time(&season.day_start);
        let day_end = parse_time(&season.day_end);

        let minutes = if minute_of_day < day_start {
            day_end.saturating_sub(day_start)
        } else if minute_of_day < day_end {
            day_end - minute_of_day
        } else {
            0
        };

        f64::from(minutes) / 60.0
    }

    /// Night-tariff hours left before midnight.
    ///
    /// Before `day_start` both the remaining morning block and the full
    /// evening block count; inside the day window only the evening block;
    /// after `day_end` only the remainder of the evening block.
    pub fn offpeak_hours_remaining(&self, season: &Season, minute_of_day: u32) -> f64 {
        let day_start = parse_time(&season.day_start);
        let day_end = parse_time(&season.day_end);
        let evening_block = DAY_MINUTES.saturating_sub(day_end);

        let minutes = if minute_of_day < day_start {
            (day_start - minute_of_day) + evening_block
        } else if minute_of_day < day_end {
            evening_block
        } else {
            DAY_MINUTES - minute_of_day
        };

        f64::from(minutes) / 60.0
    }

    /// Time-weighted mean rate over a full day.
    ///
    /// Peak minutes are `day_end - day_start`; a season configured with
    /// `day_end` before `day_start` yields a negative peak share and is
    /// deliberately not corrected.
    pub fn daily_average_rate(&self, season: &Season) -> f64 {
        let day_start = f64::from(parse_time(&season.day_start));
        let day_end = f64::from(parse_time(&season.day_end));

        let peak_minutes = day_end - day_start;
        let offpeak_minutes = f64::from(DAY_MINUTES) - peak_minutes;

        (peak_minutes * self.settings.day_rate + offpeak_minutes * self.settings.night_rate)
            / f64::from(DAY_MINUTES)
    }

    /// Rate for the given tariff in currency/kWh
    pub fn rate_for(&self, tariff: Tariff) -> f64 {
        match tariff {
            Tariff::Day => self.settings.day_rate,
            Tariff::Night => self.settings.night_rate,
        }
    }

    /// Resolve the full tariff state for a local timestamp.
    ///
    /// Pure function of the timestamp and the settings; calling it twice
    /// with the same inputs yields the same state.
    pub fn state_at(&self, now: NaiveDateTime) -> TariffState {
        use chrono::Datelike;

        let minute = minute_of_day(now);
        match self.resolve_season(now.month(), now.day()) {
            Some(season) => {
                let tariff = self.resolve_tariff(season, minute);
                TariffState {
                    season: Some(season.name.clone()),
                    tariff,
                    rate: self.rate_for(tariff),
                }
            }
            None => TariffState {
                season: None,
                tariff: Tariff::Day,
                rate: self.settings.day_rate,
            },
        }
    }
}

/// Whether a date (month, day) falls inside a season's range.
///
/// Lexicographic comparison on the (month, day) pair; wrapping seasons use
/// a logical OR of the two year halves.
fn season_matches(season: &Season, month: u32, day: u32) -> bool {
    let date = (month, day);
    let start = (season.start_month, season.start_day);
    let end = (season.end_month, season.end_day);

    if season.start_month > season.end_month {
        date >= start || date <= end
    } else {
        date >= start && date <= end
    }
}

/// Parse a zero-padded "HH:MM" string into minutes since midnight.
///
/// Malformed components parse as 0.
pub(crate) fn parse_time(time_str: &str) -> u32 {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() == 2 {
        let hours: u32 = parts[0].parse().unwrap_or(0);
        let minutes: u32 = parts[1].parse().unwrap_or(0);
        hours * 60 + minutes
    } else {
        0
    }
}

/// Minutes since local midnight for a timestamp
pub(crate) fn minute_of_day(now: NaiveDateTime) -> u32 {
    now.hour() * 60 + now.minute()
}
