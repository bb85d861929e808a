//! Date-range presets for the balancing report.

use chrono::{Datelike, Days, NaiveDate};
use service_core::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl RangePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "custom" => Self::Custom,
            _ => Self::Monthly,
        }
    }
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Preset plus explicit dates, with the interplay the report screen uses:
/// picking a named preset overwrites the explicit dates, editing either date
/// switches the preset to `Custom`.
#[derive(Debug, Clone)]
pub struct RangeSelection {
    preset: RangePreset,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl RangeSelection {
    pub fn new(preset: RangePreset) -> Self {
        Self {
            preset,
            from: None,
            to: None,
        }
    }

    pub fn custom(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            preset: RangePreset::Custom,
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn preset(&self) -> RangePreset {
        self.preset
    }

    pub fn set_preset(&mut self, preset: RangePreset) {
        self.preset = preset;
        if preset != RangePreset::Custom {
            self.from = None;
            self.to = None;
        }
    }

    pub fn set_from(&mut self, date: NaiveDate) {
        self.preset = RangePreset::Custom;
        self.from = Some(date);
    }

    pub fn set_to(&mut self, date: NaiveDate) {
        self.preset = RangePreset::Custom;
        self.to = Some(date);
    }

    /// Resolve to a concrete inclusive range, relative to `today`.
    ///
    /// Weekly starts on the most recent Monday (a Sunday `today` reaches six
    /// days back). An inverted or incomplete custom range is a Validation
    /// error; no fetch is attempted for it.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, AppError> {
        match self.preset {
            RangePreset::Daily => Ok(DateRange {
                from: today,
                to: today,
            }),
            RangePreset::Weekly => {
                let back = today.weekday().num_days_from_monday() as u64;
                let from = today.checked_sub_days(Days::new(back)).unwrap_or(today);
                Ok(DateRange { from, to: today })
            }
            RangePreset::Monthly => {
                let from = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
                    .unwrap_or(today);
                Ok(DateRange { from, to: today })
            }
            RangePreset::Custom => {
                let (from, to) = match (self.from, self.to) {
                    (Some(from), Some(to)) => (from, to),
                    _ => {
                        return Err(AppError::Validation(
                            "custom range requires both a from and a to date".to_string(),
                        ))
                    }
                };
                if from > to {
                    return Err(AppError::Validation(format!(
                        "invalid range: from date {from} is after to date {to}"
                    )));
                }
                Ok(DateRange { from, to })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service_core::error::ErrorKind;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn daily_is_today_only() {
        let today = date("2024-03-14");
        let range = RangeSelection::new(RangePreset::Daily).resolve(today).unwrap();
        assert_eq!(range, DateRange { from: today, to: today });
    }

    #[test]
    fn weekly_starts_most_recent_monday() {
        // 2024-03-14 is a Thursday
        let range = RangeSelection::new(RangePreset::Weekly)
            .resolve(date("2024-03-14"))
            .unwrap();
        assert_eq!(range.from, date("2024-03-11"));
        assert_eq!(range.to, date("2024-03-14"));
    }

    #[test]
    fn weekly_on_sunday_reaches_six_days_back() {
        // 2024-03-17 is a Sunday
        let range = RangeSelection::new(RangePreset::Weekly)
            .resolve(date("2024-03-17"))
            .unwrap();
        assert_eq!(range.from, date("2024-03-11"));
    }

    #[test]
    fn weekly_on_monday_is_single_day_start() {
        let range = RangeSelection::new(RangePreset::Weekly)
            .resolve(date("2024-03-11"))
            .unwrap();
        assert_eq!(range.from, date("2024-03-11"));
    }

    #[test]
    fn monthly_starts_first_of_month() {
        let range = RangeSelection::new(RangePreset::Monthly)
            .resolve(date("2024-03-14"))
            .unwrap();
        assert_eq!(range.from, date("2024-03-01"));
        assert_eq!(range.to, date("2024-03-14"));
    }

    #[test]
    fn custom_uses_dates_verbatim() {
        let range = RangeSelection::custom(date("2024-02-01"), date("2024-02-20"))
            .resolve(date("2024-03-14"))
            .unwrap();
        assert_eq!(range.from, date("2024-02-01"));
        assert_eq!(range.to, date("2024-02-20"));
    }

    #[test]
    fn inverted_custom_range_is_a_validation_error() {
        let err = RangeSelection::custom(date("2024-03-10"), date("2024-03-01"))
            .resolve(date("2024-03-14"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn incomplete_custom_range_is_a_validation_error() {
        let mut selection = RangeSelection::new(RangePreset::Monthly);
        selection.set_from(date("2024-03-01"));
        let err = selection.resolve(date("2024-03-14")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn editing_a_date_switches_to_custom() {
        let mut selection = RangeSelection::new(RangePreset::Weekly);
        selection.set_to(date("2024-03-10"));
        assert_eq!(selection.preset(), RangePreset::Custom);
    }

    #[test]
    fn picking_a_named_preset_clears_explicit_dates() {
        let mut selection = RangeSelection::custom(date("2024-02-01"), date("2024-02-20"));
        selection.set_preset(RangePreset::Daily);
        let today = date("2024-03-14");
        let range = selection.resolve(today).unwrap();
        assert_eq!(range, DateRange { from: today, to: today });
    }
}
