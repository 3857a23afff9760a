use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::Card;
use crate::entities::{self, Entities};
use crate::entity::{HashtagEntity, MediaEntity, SymbolEntity, UrlEntity, UserMentionEntity};
use crate::error::TwitterError;
use crate::parse::{
    as_object, deserialize, get_array, get_bool, get_count, get_date, get_i64, get_id,
    get_index_pair, get_object, get_raw_string, get_str, get_string_array, get_u64,
    get_unescaped_string, is_null, parse_array, parse_object, JsonObject,
};
use crate::text::unescape;
use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// GeoJSON `coordinates` (`[longitude, latitude]`), falling back to the
    /// deprecated `geo` (`[latitude, longitude]`).
    fn from_status_json(json: &JsonObject) -> Result<Option<Self>, TwitterError> {
        let pair = |obj: &JsonObject, key: &str| -> Result<Option<(f64, f64)>, TwitterError> {
            let outer = get_object(obj, key)?;
            if is_null(outer, "coordinates") {
                return Ok(None);
            }
            let coords = get_array(outer, "coordinates")?;
            match (coords.first().and_then(Value::as_f64), coords.get(1).and_then(Value::as_f64)) {
                (Some(a), Some(b)) => Ok(Some((a, b))),
                _ => Err(TwitterError::Json(format!("\"{}.coordinates\" is not a number pair", key))),
            }
        };

        if !is_null(json, "coordinates") {
            if let Some((lon, lat)) = pair(json, "coordinates")? {
                return Ok(Some(Self::new(lat, lon)));
            }
        }
        if !is_null(json, "geo") {
            if let Some((lat, lon)) = pair(json, "geo")? {
                return Ok(Some(Self::new(lat, lon)));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub place_type: Option<String>,
    pub url: Option<String>,
}

impl Place {
    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let mut place: Self = deserialize(&Value::Object(json.clone()))?;
        for name in [&mut place.name, &mut place.full_name, &mut place.country]
            .into_iter()
            .flatten()
        {
            *name = unescape(name);
        }
        Ok(place)
    }
}

/// Promoted-tweet delivery scopes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Scopes {
    pub place_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EditControl {
    pub edit_tweet_ids: Vec<u64>,
    pub editable_until_msecs: i64,
    pub edits_remaining: i64,
    pub edit_eligible: bool,
}

impl EditControl {
    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let edit_tweet_ids = get_array(json, "edit_tweet_ids")?
            .iter()
            .map(|v| {
                let id = match v {
                    Value::String(s) => s.parse().ok(),
                    Value::Number(n) => n.as_u64(),
                    _ => None,
                };
                id.ok_or_else(|| TwitterError::MalformedResponse(format!("edit_tweet_ids contains {}", v)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let required = |key: &str| -> Result<i64, TwitterError> {
            get_i64(json, key)?.ok_or_else(|| TwitterError::Json(format!("\"{}\" not found", key)))
        };
        let edit_eligible = match json.get("is_edit_eligible") {
            Some(Value::Bool(b)) => *b,
            _ => return Err(TwitterError::Json("\"is_edit_eligible\" is not a boolean".to_owned())),
        };

        Ok(Self {
            edit_tweet_ids,
            editable_until_msecs: required("editable_until_msecs")?,
            edits_remaining: required("edits_remaining")?,
            edit_eligible,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub id: u64,
    pub text: String,
    pub created_at: String,
    pub created_at_ts: i64,
    /// HTML anchor of the posting client, or `web`.
    pub source: Option<String>,
    pub truncated: bool,
    /// Code point range of `text` meant for display, without leading
    /// mentions and trailing media links.
    pub display_text_range: Option<(usize, usize)>,
    pub in_reply_to_status_id: Option<u64>,
    pub in_reply_to_user_id: Option<u64>,
    pub in_reply_to_screen_name: Option<String>,
    pub geo_location: Option<GeoLocation>,
    pub place: Option<Place>,
    pub favorited: bool,
    pub retweeted: bool,
    pub favorite_count: u64,
    pub retweet_count: u64,
    pub user: Option<User>,
    pub retweeted_status: Option<Box<Status>>,
    pub contributors: Vec<u64>,
    pub current_user_retweet_id: Option<u64>,
    pub possibly_sensitive: bool,
    pub lang: Option<String>,
    pub scopes: Option<Scopes>,
    pub withheld_in_countries: Option<Vec<String>>,
    pub quoted_status_id: Option<u64>,
    pub quoted_status: Option<Box<Status>>,
    pub quoted_status_permalink: Option<UrlEntity>,
    pub edit_control: Option<EditControl>,
    pub initial_tweet_id: Option<u64>,
    pub card: Option<Card>,
    pub user_mention_entities: Vec<UserMentionEntity>,
    pub url_entities: Vec<UrlEntity>,
    pub hashtag_entities: Vec<HashtagEntity>,
    pub symbol_entities: Vec<SymbolEntity>,
    pub media_entities: Vec<MediaEntity>,
}

/// Reads the `entities` object of `json` when present, replacing every list.
fn collect_entities(collected: &mut Entities, json: &JsonObject) -> Result<(), TwitterError> {
    if !is_null(json, "entities") {
        *collected = Entities::parse(get_object(json, "entities")?)?;
    }
    Ok(())
}

/// `extended_entities.media` lists every attachment, where `entities.media`
/// only has the first.
fn merge_extended_media(collected: &mut Entities, json: &JsonObject) -> Result<(), TwitterError> {
    if !is_null(json, "extended_entities") {
        let extended = get_object(json, "extended_entities")?;
        if let Some(media) = entities::media(extended)? {
            collected.media = Some(media);
        }
    }
    Ok(())
}

impl Status {
    pub fn from_json_str(json: &str) -> Result<Self, TwitterError> {
        Self::from_json(&parse_object(json)?)
    }

    /// Parses a JSON array of statuses, as returned by the timeline endpoints.
    pub fn list_from_json_str(json: &str) -> Result<Vec<Self>, TwitterError> {
        parse_array(json)?
            .iter()
            .map(|v| Self::from_json(as_object(v, "statuses")?))
            .collect()
    }

    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let id = get_id(json, "id")?;
        let (created_at, created_at_ts) = get_date(json, "created_at")?
            .ok_or_else(|| TwitterError::Json("\"created_at\" not found".to_owned()))?;

        let user = if is_null(json, "user") {
            None
        } else {
            Some(User::from_json(get_object(json, "user")?)?)
        };
        let place = if is_null(json, "place") {
            None
        } else {
            Some(Place::from_json(get_object(json, "place")?)?)
        };
        let retweeted_status = nested_status(json, "retweeted_status")?;
        let quoted_status = nested_status(json, "quoted_status")?;
        let contributors: Vec<u64> = match get_string_array(json, "contributors")? {
            None => vec![],
            Some(ids) => ids
                .iter()
                .map(|id| {
                    id.parse()
                        .map_err(|_| TwitterError::MalformedResponse(format!("contributor id {}", id)))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        let mut collected = Entities::default();
        collect_entities(&mut collected, json)?;
        merge_extended_media(&mut collected, json)?;

        let quoted_status_permalink = if is_null(json, "quoted_status_permalink") {
            None
        } else {
            Some(UrlEntity::from_permalink_json(get_object(json, "quoted_status_permalink")?)?)
        };

        let (edit_control, initial_tweet_id) = parse_edit_control(json)?;

        let mut display_text_range = if is_null(json, "display_text_range") {
            None
        } else {
            Some(get_index_pair(json, "display_text_range")?)
        };

        // full_text wins over text
        let mut raw_text = get_raw_string(json, "full_text").or_else(|| get_raw_string(json, "text"));

        if !is_null(json, "extended_tweet") {
            let extended = get_object(json, "extended_tweet")?;
            display_text_range = Some(get_index_pair(extended, "display_text_range")?);
            collect_entities(&mut collected, extended)?;
            raw_text = Some(get_str(extended, "full_text")?.to_owned());
        }

        // Indices are slid exactly once, against the text that is kept
        let text = raw_text.map(|t| collected.unescape_text(&t)).unwrap_or_default();

        let current_user_retweet_id = if is_null(json, "current_user_retweet") {
            None
        } else {
            get_u64(get_object(json, "current_user_retweet")?, "id")?
        };

        let scopes = if is_null(json, "scopes") {
            None
        } else {
            get_string_array(get_object(json, "scopes")?, "place_ids")?.map(|place_ids| Scopes { place_ids })
        };

        let card = if is_null(json, "card") {
            None
        } else {
            Some(Card::from_json(get_object(json, "card")?)?)
        };

        Ok(Self {
            id,
            text,
            created_at,
            created_at_ts,
            source: get_unescaped_string(json, "source"),
            truncated: get_bool(json, "truncated"),
            display_text_range,
            in_reply_to_status_id: get_u64(json, "in_reply_to_status_id")?,
            in_reply_to_user_id: get_u64(json, "in_reply_to_user_id")?,
            in_reply_to_screen_name: get_unescaped_string(json, "in_reply_to_screen_name"),
            geo_location: GeoLocation::from_status_json(json)?,
            place,
            favorited: get_bool(json, "favorited"),
            retweeted: get_bool(json, "retweeted"),
            favorite_count: get_count(json, "favorite_count")?,
            retweet_count: get_count(json, "retweet_count")?,
            user,
            retweeted_status,
            contributors,
            current_user_retweet_id,
            possibly_sensitive: get_bool(json, "possibly_sensitive"),
            lang: get_unescaped_string(json, "lang"),
            scopes,
            withheld_in_countries: get_string_array(json, "withheld_in_countries")?,
            quoted_status_id: get_u64(json, "quoted_status_id")?,
            quoted_status,
            quoted_status_permalink,
            edit_control,
            initial_tweet_id,
            card,
            user_mention_entities: collected.user_mentions.unwrap_or_default(),
            url_entities: collected.urls.unwrap_or_default(),
            hashtag_entities: collected.hashtags.unwrap_or_default(),
            symbol_entities: collected.symbols.unwrap_or_default(),
            media_entities: collected.media.unwrap_or_default(),
        })
    }

    pub fn is_retweet(&self) -> bool {
        self.retweeted_status.is_some()
    }

    pub fn is_retweeted_by_me(&self) -> bool {
        self.current_user_retweet_id.is_some()
    }

    /// Name of the posting client, taken out of the `source` anchor.
    pub fn source_name(&self) -> Option<&str> {
        static SOURCE_ANCHOR_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^<a [^>]*>(?P<name>.*)</a>$").unwrap());

        let source = self.source.as_deref()?;
        match SOURCE_ANCHOR_RE.captures(source) {
            Some(caps) => caps.name("name").map(|m| m.as_str()),
            None => Some(source),
        }
    }

    /// The part of `text` inside `display_text_range`, or all of it.
    pub fn display_text(&self) -> String {
        match self.display_text_range {
            Some((start, end)) if start <= end => {
                self.text.chars().skip(start).take(end - start).collect()
            }
            _ => self.text.clone(),
        }
    }
}

fn nested_status(json: &JsonObject, key: &str) -> Result<Option<Box<Status>>, TwitterError> {
    if is_null(json, key) {
        return Ok(None);
    }
    Ok(Some(Box::new(Status::from_json(get_object(json, key)?)?)))
}

/// `ext_edit_control.initial` describes an unedited tweet; an edited one has
/// `ext_edit_control.edit` with the initial tweet's control and id.
fn parse_edit_control(json: &JsonObject) -> Result<(Option<EditControl>, Option<u64>), TwitterError> {
    if is_null(json, "ext_edit_control") {
        return Ok((None, None));
    }
    let ext = get_object(json, "ext_edit_control")?;
    if !is_null(ext, "initial") {
        return Ok((Some(EditControl::from_json(get_object(ext, "initial")?)?), None));
    }
    if !is_null(ext, "edit") {
        let edit = get_object(ext, "edit")?;
        let control = if is_null(edit, "edit_control_initial") {
            None
        } else {
            Some(EditControl::from_json(get_object(edit, "edit_control_initial")?)?)
        };
        let initial_tweet_id = get_id(edit, "initial_tweet_id")?;
        return Ok((control, Some(initial_tweet_id)));
    }
    Ok((None, None))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn status(value: Value) -> Status {
        Status::from_json(value.as_object().unwrap()).unwrap()
    }

    #[test]
    fn source_name_from_anchor() {
        let s = status(json!({
            "id": 1,
            "created_at": "Wed Aug 27 13:08:45 +0000 2008",
            "text": "hi",
            "source": "<a href=\"http://twitter.com\" rel=\"nofollow\">Twitter Web App</a>"
        }));
        assert_eq!(s.source_name(), Some("Twitter Web App"));

        let web = status(json!({"id": 1, "created_at": "Wed Aug 27 13:08:45 +0000 2008", "source": "web"}));
        assert_eq!(web.source_name(), Some("web"));
    }

    #[test]
    fn geo_location_prefers_coordinates() {
        let s = status(json!({
            "id": 1,
            "created_at": "Wed Aug 27 13:08:45 +0000 2008",
            "coordinates": {"type": "Point", "coordinates": [-122.4, 37.7]},
            "geo": {"type": "Point", "coordinates": [0.0, 0.0]}
        }));
        assert_eq!(s.geo_location, Some(GeoLocation::new(37.7, -122.4)));

        let legacy = status(json!({
            "id": 1,
            "created_at": "Wed Aug 27 13:08:45 +0000 2008",
            "geo": {"type": "Point", "coordinates": [35.6, 139.7]}
        }));
        assert_eq!(legacy.geo_location, Some(GeoLocation::new(35.6, 139.7)));
    }

    #[test]
    fn edit_control_initial() {
        let s = status(json!({
            "id": 1,
            "created_at": "Wed Aug 27 13:08:45 +0000 2008",
            "ext_edit_control": {"initial": {
                "edit_tweet_ids": ["1", "2"],
                "editable_until_msecs": "1667000000000",
                "edits_remaining": 4,
                "is_edit_eligible": true
            }}
        }));
        let control = s.edit_control.unwrap();
        assert_eq!(control.edit_tweet_ids, [1, 2]);
        assert_eq!(control.editable_until_msecs, 1_667_000_000_000);
        assert_eq!(control.edits_remaining, 4);
        assert!(control.edit_eligible);
        assert_eq!(s.initial_tweet_id, None);
    }

    #[test]
    fn edit_control_of_edited_tweet() {
        let s = status(json!({
            "id": 2,
            "created_at": "Wed Aug 27 13:08:45 +0000 2008",
            "ext_edit_control": {"edit": {
                "initial_tweet_id": "1",
                "edit_control_initial": {
                    "edit_tweet_ids": ["1", "2"],
                    "editable_until_msecs": 5,
                    "edits_remaining": 3,
                    "is_edit_eligible": false
                }
            }}
        }));
        assert_eq!(s.initial_tweet_id, Some(1));
        assert_eq!(s.edit_control.unwrap().edits_remaining, 3);
    }

    #[test]
    fn malformed_edit_ids() {
        let err = Status::from_json(
            json!({
                "id": 2,
                "created_at": "Wed Aug 27 13:08:45 +0000 2008",
                "ext_edit_control": {"initial": {
                    "edit_tweet_ids": ["abc"],
                    "editable_until_msecs": 5,
                    "edits_remaining": 3,
                    "is_edit_eligible": false
                }}
            })
            .as_object()
            .unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, TwitterError::MalformedResponse(_)));
    }

    #[test]
    fn place_names_are_unescaped() {
        let place = Place::from_json(
            json!({
                "id": "07d9cd6afd884001",
                "name": "Ben &amp; Jerry&#39;s",
                "full_name": "Ben &amp; Jerry&#39;s, Burlington",
                "country_code": "US",
                "bounding_box": {"type": "Polygon"}
            })
            .as_object()
            .unwrap(),
        )
        .unwrap();
        assert_eq!(place.name.as_deref(), Some("Ben & Jerry's"));
        assert_eq!(place.full_name.as_deref(), Some("Ben & Jerry's, Burlington"));
        assert_eq!(place.country, None);
        assert_eq!(place.country_code.as_deref(), Some("US"));

        let err = Place::from_json(json!({"name": "x"}).as_object().unwrap()).unwrap_err();
        assert!(matches!(err, TwitterError::Json(_)));
    }

    #[test]
    fn negative_id_is_malformed() {
        let err = Status::from_json(
            json!({"id": -5, "created_at": "Wed Aug 27 13:08:45 +0000 2008"})
                .as_object()
                .unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, TwitterError::MalformedResponse(_)));
    }

    #[test]
    fn display_text() {
        let s = status(json!({
            "id": 1,
            "created_at": "Wed Aug 27 13:08:45 +0000 2008",
            "full_text": "@jack hello",
            "display_text_range": [6, 11]
        }));
        assert_eq!(s.display_text(), "hello");
    }
}
