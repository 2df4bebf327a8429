use crate::config::FilterConfig;
use crate::domain::event::{EventError, InboundEvent};

/// Which events the enricher acts on. Unset or empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub event_name: Option<String>,
    pub segment_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    RejectedEventName,
    RejectedSegmentName,
}

impl FilterCriteria {
    #[must_use]
    pub fn new(event_name: Option<String>, segment_name: Option<String>) -> Self {
        Self { event_name, segment_name }
    }

    /// Checks the event name first, then the segment name.
    ///
    /// An event without a friendly segment name passes the segment check; only an explicit
    /// mismatch rejects it.
    ///
    /// # Errors
    /// Returns `EventError::TypeMismatch` if the friendly segment name is not a string.
    pub fn matches(&self, event: &InboundEvent) -> Result<MatchOutcome, EventError> {
        if let Some(expected) = non_empty(self.event_name.as_deref())
            && event.name != expected
        {
            return Ok(MatchOutcome::RejectedEventName);
        }

        if let Some(expected) = non_empty(self.segment_name.as_deref())
            && let Some(segment) = event.friendly_segment()?
            && segment != expected
        {
            return Ok(MatchOutcome::RejectedSegmentName);
        }

        Ok(MatchOutcome::Matched)
    }
}

impl From<&FilterConfig> for FilterCriteria {
    fn from(config: &FilterConfig) -> Self {
        Self::new(config.event_name.clone(), config.segment_name.clone())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
