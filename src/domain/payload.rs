use crate::domain::recommendation::Recommendation;
use serde::{Serialize, Serializer};
use time::{OffsetDateTime, UtcOffset};

/// A transmission request for the messaging provider.
///
/// Serializes to the provider's wire shape:
/// `{"recipients": [{"address", "substitution_data": {"data"}}], "content": {"template_id"}, "options": {"start_time"}}`.
/// `options` is left out entirely when no start time was estimated.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundPayload {
    recipient_address: String,
    substitution_data: SubstitutionData,
    template_id: String,
    start_time: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstitutionData {
    pub data: Recommendation,
}

impl OutboundPayload {
    #[must_use]
    pub fn recipient_address(&self) -> &str {
        &self.recipient_address
    }

    #[must_use]
    pub const fn substitution_data(&self) -> &SubstitutionData {
        &self.substitution_data
    }

    #[must_use]
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    #[must_use]
    pub const fn start_time(&self) -> Option<OffsetDateTime> {
        self.start_time
    }
}

/// Assembles the payload for a validated recipient address.
#[must_use]
pub fn build(
    recipient_address: &str,
    recommendation: &Recommendation,
    template_id: &str,
    estimated_time: Option<OffsetDateTime>,
) -> OutboundPayload {
    OutboundPayload {
        recipient_address: recipient_address.to_string(),
        substitution_data: SubstitutionData { data: recommendation.clone() },
        template_id: template_id.to_string(),
        start_time: estimated_time.map(|t| t.to_offset(UtcOffset::UTC)),
    }
}

#[derive(Serialize)]
struct Transmission<'a> {
    recipients: [WireRecipient<'a>; 1],
    content: WireContent<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<WireOptions>,
}

#[derive(Serialize)]
struct WireRecipient<'a> {
    address: &'a str,
    substitution_data: &'a SubstitutionData,
}

#[derive(Serialize)]
struct WireContent<'a> {
    template_id: &'a str,
}

#[derive(Serialize)]
struct WireOptions {
    #[serde(with = "time::serde::rfc3339")]
    start_time: OffsetDateTime,
}

impl Serialize for OutboundPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Transmission {
            recipients: [WireRecipient { address: &self.recipient_address, substitution_data: &self.substitution_data }],
            content: WireContent { template_id: &self.template_id },
            options: self.start_time.map(|start_time| WireOptions { start_time }),
        }
        .serialize(serializer)
    }
}
