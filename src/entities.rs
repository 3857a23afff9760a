//! Extraction of typed entity lists from an `entities` object.
//!
//! Each list is `None` when its key is absent or null. Otherwise every element
//! is parsed on its own, in order, and one bad element fails the whole list.
//! Arrays never hold null elements; a null element is a shape error.

use serde::Serialize;
use serde_json::Value;

use crate::entity::{
    EntityIndex, HashtagEntity, MediaEntity, SymbolEntity, UrlEntity, UserMentionEntity,
};
use crate::error::TwitterError;
use crate::parse::{as_object, get_array, is_null, JsonObject};
use crate::text::unescape_and_slide_entity_indices;

pub fn user_mentions(entities: &JsonObject) -> Result<Option<Vec<UserMentionEntity>>, TwitterError> {
    extract(entities, "user_mentions", UserMentionEntity::from_json)
}

pub fn urls(entities: &JsonObject) -> Result<Option<Vec<UrlEntity>>, TwitterError> {
    extract(entities, "urls", UrlEntity::from_json)
}

pub fn hashtags(entities: &JsonObject) -> Result<Option<Vec<HashtagEntity>>, TwitterError> {
    extract(entities, "hashtags", HashtagEntity::from_json)
}

pub fn symbols(entities: &JsonObject) -> Result<Option<Vec<SymbolEntity>>, TwitterError> {
    extract(entities, "symbols", HashtagEntity::from_json)
}

pub fn media(entities: &JsonObject) -> Result<Option<Vec<MediaEntity>>, TwitterError> {
    extract(entities, "media", MediaEntity::from_json)
}

fn extract<T>(
    entities: &JsonObject,
    key: &str,
    parse: fn(&JsonObject) -> Result<T, TwitterError>,
) -> Result<Option<Vec<T>>, TwitterError> {
    if is_null(entities, key) {
        return Ok(None);
    }
    get_array(entities, key)?
        .iter()
        .map(|element: &Value| parse(as_object(element, key)?))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// All entity lists of one `entities` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entities {
    pub user_mentions: Option<Vec<UserMentionEntity>>,
    pub urls: Option<Vec<UrlEntity>>,
    pub hashtags: Option<Vec<HashtagEntity>>,
    pub symbols: Option<Vec<SymbolEntity>>,
    pub media: Option<Vec<MediaEntity>>,
}

impl Entities {
    pub fn parse(entities: &JsonObject) -> Result<Self, TwitterError> {
        Ok(Self {
            user_mentions: user_mentions(entities)?,
            urls: urls(entities)?,
            hashtags: hashtags(entities)?,
            symbols: symbols(entities)?,
            media: media(entities)?,
        })
    }

    /// Unescapes `text`, the text these entities were found in, and slides
    /// the indices of every list but symbols to match it.
    pub(crate) fn unescape_text(&mut self, text: &str) -> String {
        let mut indexed: Vec<&mut dyn EntityIndex> = vec![];
        if let Some(list) = &mut self.user_mentions {
            indexed.extend(list.iter_mut().map(|e| e as &mut dyn EntityIndex));
        }
        if let Some(list) = &mut self.urls {
            indexed.extend(list.iter_mut().map(|e| e as &mut dyn EntityIndex));
        }
        if let Some(list) = &mut self.hashtags {
            indexed.extend(list.iter_mut().map(|e| e as &mut dyn EntityIndex));
        }
        if let Some(list) = &mut self.media {
            indexed.extend(list.iter_mut().map(|e| e as &mut dyn EntityIndex));
        }
        unescape_and_slide_entity_indices(text, &mut indexed)
    }
}
