use crate::domain::event::{EventError, PropertyValue};
use std::collections::BTreeMap;
use time::{Duration, OffsetDateTime, UtcOffset};

/// Historical activity counts keyed by UTC hour of day (0-23).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HourlyActivity(BTreeMap<u8, u64>);

impl HourlyActivity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds activity counts from the raw `hourly` property.
    ///
    /// Keys may be any integer string in `0..=23`. Fractional counts are truncated.
    ///
    /// # Errors
    /// Returns `EventError::InvalidHour` for keys outside a day and
    /// `EventError::InvalidCount` for negative or non-numeric counts.
    pub fn from_properties(raw: &BTreeMap<String, PropertyValue>) -> Result<Self, EventError> {
        let mut activity = Self::new();
        for (key, value) in raw {
            let hour = key
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|h| *h < 24)
                .ok_or_else(|| EventError::InvalidHour(key.clone()))?;
            let count = match value {
                PropertyValue::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(truncate_count)),
                _ => None,
            }
            .ok_or(EventError::InvalidCount(hour))?;
            activity.0.insert(hour, count);
        }
        Ok(activity)
    }

    #[must_use]
    pub fn count(&self, hour: u8) -> Option<u64> {
        self.0.get(&hour).copied()
    }

    /// Hour with the strictly greatest count. Ties go to the lowest hour.
    /// Returns `None` when there is no recorded activity at all.
    #[must_use]
    pub fn peak_hour(&self) -> Option<u8> {
        let mut best: Option<(u8, u64)> = None;
        for (&hour, &count) in &self.0 {
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((hour, count));
            }
        }
        best.map(|(hour, _)| hour)
    }
}

impl FromIterator<(u8, u64)> for HourlyActivity {
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|(hour, _)| *hour < 24).collect())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate_count(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as u64)
}

/// Next occurrence of the user's peak hour, at minute zero UTC.
///
/// `None` means "send immediately": either the peak hour is the current hour or there is no
/// activity to go on.
#[must_use]
pub fn estimate(hourly: &HourlyActivity, now: OffsetDateTime) -> Option<OffsetDateTime> {
    let now = now.to_offset(UtcOffset::UTC);
    let hour = hourly.peak_hour()?;
    if hour == now.hour() {
        return None;
    }

    let today = now.date().with_hms(hour, 0, 0).ok()?.assume_utc();
    if today < now { Some(today + Duration::days(1)) } else { Some(today) }
}
