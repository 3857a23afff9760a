//! Entities parsed out of tweet text.
//!
//! Every entity carries `start`/`end` code point offsets into the text it was
//! found in, taken from the two-element `indices` array.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TwitterError;
use crate::parse::{
    deserialize, get_array, get_bool, get_id, get_index_pair, get_object, get_raw_string, get_str,
    get_u64, is_null, JsonObject,
};
use crate::user::User;

/// Offsets of an entity within its text.
pub trait EntityIndex {
    fn start(&self) -> usize;
    fn end(&self) -> usize;
    fn set_indices(&mut self, start: usize, end: usize);
}

macro_rules! impl_entity_index {
    ($($t:ty),*) => {$(
        impl EntityIndex for $t {
            fn start(&self) -> usize {
                self.start
            }

            fn end(&self) -> usize {
                self.end
            }

            fn set_indices(&mut self, start: usize, end: usize) {
                self.start = start;
                self.end = end;
            }
        }
    )*};
}

impl_entity_index!(UserMentionEntity, UrlEntity, HashtagEntity, MediaEntity);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UserMentionEntity {
    pub start: usize,
    pub end: usize,
    pub id: Option<u64>,
    pub name: Option<String>,
    pub screen_name: String,
}

impl UserMentionEntity {
    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let (start, end) = get_index_pair(json, "indices")?;
        Ok(Self {
            start,
            end,
            id: get_u64(json, "id")?,
            name: get_raw_string(json, "name"),
            screen_name: get_str(json, "screen_name")?.to_owned(),
        })
    }

    pub fn text(&self) -> &str {
        &self.screen_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UrlEntity {
    pub start: usize,
    pub end: usize,
    /// The t.co link as it appears in the text.
    pub url: String,
    pub expanded_url: String,
    pub display_url: String,
}

impl UrlEntity {
    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let (start, end) = get_index_pair(json, "indices")?;
        let url = get_str(json, "url")?.to_owned();
        let expanded_url = get_raw_string(json, "expanded_url").unwrap_or_else(|| url.clone());
        let display_url = get_raw_string(json, "display_url").unwrap_or_else(|| url.clone());
        Ok(Self {
            start,
            end,
            url,
            expanded_url,
            display_url,
        })
    }

    /// The `quoted_status_permalink` object has no indices and uses shorter
    /// key names.
    pub fn from_permalink_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let url = get_str(json, "url")?.to_owned();
        let expanded_url = get_raw_string(json, "expanded").unwrap_or_else(|| url.clone());
        let display_url = get_raw_string(json, "display").unwrap_or_else(|| url.clone());
        Ok(Self {
            start: 0,
            end: 0,
            url,
            expanded_url,
            display_url,
        })
    }

    pub fn text(&self) -> &str {
        &self.url
    }
}

/// Hashtags and cashtags share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HashtagEntity {
    pub start: usize,
    pub end: usize,
    /// Text without the leading `#` or `$`.
    pub text: String,
}

/// A `$cashtag`. Structurally a hashtag.
pub type SymbolEntity = HashtagEntity;

impl HashtagEntity {
    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let (start, end) = get_index_pair(json, "indices")?;
        Ok(Self {
            start,
            end,
            text: get_str(json, "text")?.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaEntity {
    pub start: usize,
    pub end: usize,
    pub id: u64,
    pub url: String,
    /// `media_url` is not always reachable, so only the https variant is kept.
    pub media_url_https: String,
    pub expanded_url: String,
    pub display_url: String,
    pub sizes: MediaSizes,
    /// `photo`, `video` or `animated_gif`.
    pub media_type: Option<String>,
    pub video_aspect_ratio: Option<(u32, u32)>,
    pub video_duration_millis: Option<u64>,
    pub video_variants: Vec<Variant>,
    pub ext_alt_text: Option<String>,
    pub additional_media_info: Option<AdditionalMediaInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MediaSizes {
    pub thumb: Option<MediaSize>,
    pub small: Option<MediaSize>,
    pub medium: Option<MediaSize>,
    pub large: Option<MediaSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaSize {
    #[serde(rename(deserialize = "w"))]
    pub width: u32,
    #[serde(rename(deserialize = "h"))]
    pub height: u32,
    pub resize: Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resize {
    Fit,
    Crop,
}

/// One encoding of a video. Streaming playlists carry no bitrate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default)]
    pub bitrate: u32,
    pub content_type: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalMediaInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub embeddable: bool,
    pub monetizable: bool,
    pub source_user: Option<Box<User>>,
}

impl MediaEntity {
    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let (start, end) = get_index_pair(json, "indices")?;

        // Some payloads only carry id_str
        let id = match get_u64(json, "id_str")? {
            Some(id) => id,
            None => get_id(json, "id")?,
        };

        let media_type = get_raw_string(json, "type");
        let sizes = parse_media_sizes(get_object(json, "sizes")?)?;

        let (video_aspect_ratio, video_duration_millis, video_variants) = if is_null(json, "video_info") {
            (None, None, vec![])
        } else {
            let video_info = get_object(json, "video_info")?;
            let (w, h) = get_index_pair(video_info, "aspect_ratio")?;
            let variants = get_array(video_info, "variants")?
                .iter()
                .map(deserialize::<Variant>)
                .collect::<Result<Vec<_>, _>>()?;
            (
                Some((to_u32("aspect_ratio", w as u64)?, to_u32("aspect_ratio", h as u64)?)),
                get_u64(video_info, "duration_millis")?,
                variants,
            )
        };

        let additional_media_info = if is_null(json, "additional_media_info") {
            None
        } else {
            Some(AdditionalMediaInfo::from_json(get_object(
                json,
                "additional_media_info",
            )?)?)
        };

        Ok(Self {
            start,
            end,
            id,
            url: get_str(json, "url")?.to_owned(),
            media_url_https: get_str(json, "media_url_https")?.to_owned(),
            expanded_url: get_str(json, "expanded_url")?.to_owned(),
            display_url: get_str(json, "display_url")?.to_owned(),
            sizes,
            media_type,
            video_aspect_ratio,
            video_duration_millis,
            video_variants,
            ext_alt_text: get_raw_string(json, "ext_alt_text"),
            additional_media_info,
        })
    }

    pub fn text(&self) -> &str {
        &self.url
    }
}

fn parse_media_sizes(sizes: &JsonObject) -> Result<MediaSizes, TwitterError> {
    let size = |key: &str| -> Result<Option<MediaSize>, TwitterError> {
        match sizes.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => deserialize(v).map(Some),
        }
    };

    Ok(MediaSizes {
        thumb: size("thumb")?,
        small: size("small")?,
        medium: size("medium")?,
        large: size("large")?,
    })
}

impl AdditionalMediaInfo {
    fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let source_user = if is_null(json, "source_user") {
            None
        } else {
            Some(Box::new(User::from_json(get_object(json, "source_user")?)?))
        };
        Ok(Self {
            title: get_raw_string(json, "title"),
            description: get_raw_string(json, "description"),
            embeddable: get_bool(json, "embeddable"),
            monetizable: get_bool(json, "monetizable"),
            source_user,
        })
    }
}

fn to_u32(key: &str, v: u64) -> Result<u32, TwitterError> {
    u32::try_from(v).map_err(|_| TwitterError::MalformedResponse(format!("\"{}\" out of range: {}", key, v)))
}
