use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{Error, Result};
use crate::model::IncidentCategory;

/// A user-authored incident report before validation. Mirrors the report
/// form: free text, a category, and either "use current time" or a custom
/// date and time.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    /// Free-text description of what was observed.
    pub description: String,
    /// Selected incident category.
    pub category: IncidentCategory,
    /// When true, the incident time is the submission instant and the
    /// custom fields are ignored.
    pub use_current_time: bool,
    /// Custom incident date, `YYYY-MM-DD`.
    pub custom_date: String,
    /// Custom incident time, 24-hour `HH:MM`.
    pub custom_time: String,
}

impl Default for ReportDraft {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: IncidentCategory::default(),
            use_current_time: true,
            custom_date: String::new(),
            custom_time: String::new(),
        }
    }
}

impl ReportDraft {
    /// The trimmed description, or a validation error when it is empty.
    pub fn validated_description(&self) -> Result<String> {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            return Err(Error::validation(
                "description",
                "Please provide a description of the incident.",
            ));
        }
        Ok(trimmed.to_string())
    }

    /// Resolve the effective incident timestamp: `now` in current-time mode,
    /// otherwise the custom date and time combined into a single UTC instant.
    /// The custom date must be a real calendar date no later than today.
    pub fn effective_timestamp(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        if self.use_current_time {
            return Ok(now);
        }

        let date = parse_strict_date(&self.custom_date)?;
        if date > now.date_naive() {
            return Err(Error::validation(
                "date",
                "The incident date cannot be in the future.",
            ));
        }
        let time = parse_strict_time(&self.custom_time)?;

        Ok(date.and_time(time).and_utc())
    }

    /// Clear the volatile fields after a successful submission: description
    /// and custom date/time empty, mode back to "use current time". The
    /// category deliberately survives, matching the form.
    pub fn reset_after_submit(&mut self) {
        self.description.clear();
        self.custom_date.clear();
        self.custom_time.clear();
        self.use_current_time = true;
    }
}

/// Parse a strict `YYYY-MM-DD` date. chrono alone is lenient about zero
/// padding, so the byte pattern is checked first.
fn parse_strict_date(input: &str) -> Result<NaiveDate> {
    let invalid = || Error::validation("date", "Please enter a valid date (YYYY-MM-DD).");

    let bytes = input.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(invalid());
    }
    for (i, b) in bytes.iter().enumerate() {
        if i != 4 && i != 7 && !b.is_ascii_digit() {
            return Err(invalid());
        }
    }

    let year: i32 = input[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = input[5..7].parse().map_err(|_| invalid())?;
    let day: u32 = input[8..10].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parse a 24-hour `HH:MM` time. A single-digit hour is accepted, matching
/// the form's input handling.
fn parse_strict_time(input: &str) -> Result<NaiveTime> {
    let invalid = || Error::validation("time", "Please enter a valid time (HH:MM).");

    let (hour_part, minute_part) = input.split_once(':').ok_or_else(invalid)?;
    if hour_part.is_empty()
        || hour_part.len() > 2
        || minute_part.len() != 2
        || !hour_part.bytes().all(|b| b.is_ascii_digit())
        || !minute_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hour: u32 = hour_part.parse().map_err(|_| invalid())?;
    let minute: u32 = minute_part.parse().map_err(|_| invalid())?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}
