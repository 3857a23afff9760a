use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::entities::Entities;
use crate::error::TwitterError;
use crate::parse::{
    as_object, get_array, get_i64, get_id, get_object, get_raw_string, get_str, is_null,
    parse_object, JsonObject,
};

/// One event of the direct message API, as returned by
/// `direct_messages/events/show` and `direct_messages/events/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectMessageEvent {
    /// `message_create` for every event the api currently returns.
    pub event_type: String,
    pub id: u64,
    /// RFC 3339
    pub created_at: String,
    /// Milliseconds since the unix epoch.
    pub created_timestamp: i64,
    pub recipient_id: u64,
    pub sender_id: u64,
    pub text: String,
    pub entities: Entities,
}

impl DirectMessageEvent {
    /// Accepts the `{"event": {...}}` envelope of `events/show` as well as a
    /// bare event.
    pub fn from_json_str(json: &str) -> Result<Self, TwitterError> {
        let obj = parse_object(json)?;
        if is_null(&obj, "event") {
            Self::from_json(&obj)
        } else {
            Self::from_json(get_object(&obj, "event")?)
        }
    }

    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let created_timestamp = get_i64(json, "created_timestamp")?
            .ok_or_else(|| TwitterError::Json("\"created_timestamp\" not found".to_owned()))?;
        let created_at = OffsetDateTime::from_unix_timestamp_nanos(i128::from(created_timestamp) * 1_000_000)
            .ok()
            .and_then(|t| t.format(&Rfc3339).ok())
            .ok_or_else(|| {
                TwitterError::MalformedResponse(format!("\"created_timestamp\" out of range: {}", created_timestamp))
            })?;

        let message_create = get_object(json, "message_create")?;
        let recipient_id = get_id(get_object(message_create, "target")?, "recipient_id")?;
        let sender_id = get_id(message_create, "sender_id")?;

        let message_data = get_object(message_create, "message_data")?;
        let mut entities = if is_null(message_data, "entities") {
            Entities::default()
        } else {
            Entities::parse(get_object(message_data, "entities")?)?
        };
        let text = entities.unescape_text(get_str(message_data, "text")?);

        Ok(Self {
            event_type: get_str(json, "type")?.to_owned(),
            id: get_id(json, "id")?,
            created_at,
            created_timestamp,
            recipient_id,
            sender_id,
            text,
            entities,
        })
    }
}

/// A page of `direct_messages/events/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectMessageEventList {
    pub events: Vec<DirectMessageEvent>,
    /// Cursor of the following page; absent on the last one.
    pub next_cursor: Option<String>,
}

impl DirectMessageEventList {
    pub fn from_json_str(json: &str) -> Result<Self, TwitterError> {
        Self::from_json(&parse_object(json)?)
    }

    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let events = get_array(json, "events")?
            .iter()
            .map(|v| DirectMessageEvent::from_json(as_object(v, "events")?))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            events,
            next_cursor: get_raw_string(json, "next_cursor"),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn event_json(id: &str, text: &str, entities: Value) -> Value {
        json!({
            "type": "message_create",
            "id": id,
            "created_timestamp": "1219842525000",
            "message_create": {
                "target": {"recipient_id": "1"},
                "sender_id": "2",
                "source_app_id": "268278",
                "message_data": {"text": text, "entities": entities}
            }
        })
    }

    #[test]
    fn message_create_event() {
        let event = DirectMessageEvent::from_json_str(
            &json!({
                "event": event_json(
                    "110",
                    "&lt;3 #rust @jack",
                    json!({
                        "hashtags": [{"text": "rust", "indices": [6, 11]}],
                        "symbols": [],
                        "urls": [],
                        "user_mentions": [{"screen_name": "jack", "id_str": "12", "indices": [12, 17]}]
                    })
                )
            })
            .to_string(),
        )
        .unwrap();

        assert_eq!(event.event_type, "message_create");
        assert_eq!(event.id, 110);
        assert_eq!(event.created_timestamp, 1_219_842_525_000);
        assert_eq!(event.created_at, "2008-08-27T13:08:45Z");
        assert_eq!((event.recipient_id, event.sender_id), (1, 2));
        assert_eq!(event.text, "<3 #rust @jack");

        let hashtags = event.entities.hashtags.unwrap();
        assert_eq!((hashtags[0].start, hashtags[0].end), (3, 8));
        let mentions = event.entities.user_mentions.unwrap();
        assert_eq!((mentions[0].start, mentions[0].end), (9, 14));
        assert_eq!(event.entities.symbols, Some(vec![]));
        assert_eq!(event.entities.media, None);
    }

    #[test]
    fn bare_event_without_entities() {
        let mut json = event_json("7", "hi", Value::Null);
        json["message_create"]["message_data"]
            .as_object_mut()
            .unwrap()
            .remove("entities");
        let event = DirectMessageEvent::from_json_str(&json.to_string()).unwrap();
        assert_eq!(event.text, "hi");
        assert_eq!(event.entities, Entities::default());
    }

    #[test]
    fn list_with_cursor() {
        let list = DirectMessageEventList::from_json_str(
            &json!({
                "events": [event_json("2", "b", json!({})), event_json("1", "a", json!({}))],
                "next_cursor": "AB345dkfC"
            })
            .to_string(),
        )
        .unwrap();
        let ids: Vec<_> = list.events.iter().map(|e| e.id).collect();
        assert_eq!(ids, [2, 1]);
        assert_eq!(list.next_cursor.as_deref(), Some("AB345dkfC"));

        let last = DirectMessageEventList::from_json_str(r#"{"events": []}"#).unwrap();
        assert!(last.events.is_empty());
        assert_eq!(last.next_cursor, None);
    }

    #[test]
    fn missing_sender_is_a_shape_error() {
        let mut json = event_json("7", "hi", json!({}));
        json["message_create"].as_object_mut().unwrap().remove("sender_id");
        assert!(matches!(
            DirectMessageEvent::from_json_str(&json.to_string()),
            Err(TwitterError::Json(_))
        ));
    }
}
