use serde::Deserialize;
use serde_json::Value;

/// Raw Slack Events API request body. Slack delivers three shapes through
/// the same endpoint; the optional fields cover all of them.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct EventEnvelope {
    #[serde(default)]
    pub api_app_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub minute_rate_limited: Option<u64>,
    #[serde(default)]
    pub event: Option<Value>,
}

impl EventEnvelope {
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Envelope `type`, treating an empty string as absent.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref().filter(|kind| !kind.is_empty())
    }

    /// `type` of the nested event object, when present.
    pub fn event_type(&self) -> Option<&str> {
        self.event.as_ref().and_then(|event| event.get("type")).and_then(Value::as_str)
    }
}

/// Callback event types the adapter knows how to route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackEventType {
    Message,
    AppMention,
    ReactionAdded,
    ReactionRemoved,
    MemberJoinedChannel,
    MemberLeftChannel,
    ChannelCreated,
    ChannelArchived,
    AppHomeOpened,
    TeamJoin,
    FileShared,
    PinAdded,
}

impl CallbackEventType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "message" => Some(Self::Message),
            "app_mention" => Some(Self::AppMention),
            "reaction_added" => Some(Self::ReactionAdded),
            "reaction_removed" => Some(Self::ReactionRemoved),
            "member_joined_channel" => Some(Self::MemberJoinedChannel),
            "member_left_channel" => Some(Self::MemberLeftChannel),
            "channel_created" => Some(Self::ChannelCreated),
            "channel_archived" => Some(Self::ChannelArchived),
            "app_home_opened" => Some(Self::AppHomeOpened),
            "team_join" => Some(Self::TeamJoin),
            "file_shared" => Some(Self::FileShared),
            "pin_added" => Some(Self::PinAdded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::AppMention => "app_mention",
            Self::ReactionAdded => "reaction_added",
            Self::ReactionRemoved => "reaction_removed",
            Self::MemberJoinedChannel => "member_joined_channel",
            Self::MemberLeftChannel => "member_left_channel",
            Self::ChannelCreated => "channel_created",
            Self::ChannelArchived => "channel_archived",
            Self::AppHomeOpened => "app_home_opened",
            Self::TeamJoin => "team_join",
            Self::FileShared => "file_shared",
            Self::PinAdded => "pin_added",
        }
    }
}

impl std::fmt::Display for CallbackEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{CallbackEventType, EventEnvelope};

    #[test]
    fn parses_an_event_callback_envelope() {
        let envelope = EventEnvelope::parse(
            r#"{
                "api_app_id": "A0123ABCDE",
                "type": "event_callback",
                "event": {"type": "message", "text": "hello", "channel": "C1"}
            }"#,
        )
        .expect("parse");

        assert_eq!(envelope.api_app_id.as_deref(), Some("A0123ABCDE"));
        assert_eq!(envelope.kind(), Some("event_callback"));
        assert_eq!(envelope.event_type(), Some("message"));
        assert_eq!(envelope.challenge, None);
    }

    #[test]
    fn parses_a_url_verification_envelope() {
        let envelope =
            EventEnvelope::parse(r#"{"type":"url_verification","challenge":"abc"}"#).expect("parse");

        assert_eq!(envelope.kind(), Some("url_verification"));
        assert_eq!(envelope.challenge.as_deref(), Some("abc"));
        assert_eq!(envelope.event_type(), None);
    }

    #[test]
    fn parses_a_rate_limit_notice() {
        let envelope = EventEnvelope::parse(
            r#"{"type":"app_rate_limited","api_app_id":"A1","minute_rate_limited":5}"#,
        )
        .expect("parse");

        assert_eq!(envelope.kind(), Some("app_rate_limited"));
        assert_eq!(envelope.minute_rate_limited, Some(5));
    }

    #[test]
    fn empty_type_counts_as_absent() {
        let envelope = EventEnvelope::parse(r#"{"type":""}"#).expect("parse");
        assert_eq!(envelope.kind(), None);
    }

    #[test]
    fn callback_types_round_trip_through_wire_names() {
        let all = [
            CallbackEventType::Message,
            CallbackEventType::AppMention,
            CallbackEventType::ReactionAdded,
            CallbackEventType::ReactionRemoved,
            CallbackEventType::MemberJoinedChannel,
            CallbackEventType::MemberLeftChannel,
            CallbackEventType::ChannelCreated,
            CallbackEventType::ChannelArchived,
            CallbackEventType::AppHomeOpened,
            CallbackEventType::TeamJoin,
            CallbackEventType::FileShared,
            CallbackEventType::PinAdded,
        ];

        for event_type in all {
            assert_eq!(CallbackEventType::parse(event_type.as_str()), Some(event_type));
        }
    }

    #[test]
    fn unknown_wire_names_do_not_parse() {
        assert_eq!(CallbackEventType::parse("messages.channel"), None);
        assert_eq!(CallbackEventType::parse(""), None);
    }
}
