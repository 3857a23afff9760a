use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::entities;
use crate::entity::UrlEntity;
use crate::error::TwitterError;
use crate::parse::{
    as_object, get_bool, get_count, get_date, get_i64, get_id, get_object, get_raw_string,
    get_string_array, get_u64, get_unescaped_string, is_null, parse_array, parse_object,
    JsonObject,
};
use crate::tweet::Status;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
    pub screen_name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub contributors_enabled: bool,
    pub profile_image_url_https: Option<String>,
    pub default_profile_image: bool,
    pub url: Option<String>,
    pub protected: bool,
    pub followers_count: u64,
    /// Most recent status, when the api embeds it.
    pub status: Option<Box<Status>>,
    pub default_profile: bool,
    pub show_all_inline_media: bool,
    pub friends_count: u64,
    pub created_at: Option<String>,
    pub created_at_ts: Option<i64>,
    pub favourites_count: u64,
    pub utc_offset: Option<i64>,
    pub time_zone: Option<String>,
    pub profile_banner_url: Option<String>,
    pub lang: Option<String>,
    pub statuses_count: u64,
    pub geo_enabled: bool,
    pub verified: bool,
    pub translator: bool,
    pub listed_count: u64,
    pub follow_request_sent: bool,
    pub description_url_entities: Vec<UrlEntity>,
    /// Expanded form of `url`.
    pub url_entity: Option<UrlEntity>,
    pub withheld_in_countries: Option<Vec<String>>,
}

impl User {
    pub fn from_json_str(json: &str) -> Result<Self, TwitterError> {
        Self::from_json(&parse_object(json)?)
    }

    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let id = get_id(json, "id")?;
        let url = get_raw_string(json, "url");
        let (description_url_entities, url_entity) = parse_user_entities(json, url.as_deref())?;
        let created_at = get_date(json, "created_at")?;
        let status = if is_null(json, "status") {
            None
        } else {
            Some(Box::new(Status::from_json(get_object(json, "status")?)?))
        };

        Ok(Self {
            id,
            name: get_unescaped_string(json, "name").unwrap_or_default(),
            email: get_raw_string(json, "email"),
            screen_name: get_unescaped_string(json, "screen_name"),
            location: get_unescaped_string(json, "location"),
            description: get_unescaped_string(json, "description"),
            contributors_enabled: get_bool(json, "contributors_enabled"),
            profile_image_url_https: get_raw_string(json, "profile_image_url_https"),
            default_profile_image: get_bool(json, "default_profile_image"),
            url,
            protected: get_bool(json, "protected"),
            followers_count: get_count(json, "followers_count")?,
            status,
            default_profile: get_bool(json, "default_profile"),
            show_all_inline_media: get_bool(json, "show_all_inline_media"),
            friends_count: get_count(json, "friends_count")?,
            created_at_ts: created_at.as_ref().map(|(_, ts)| *ts),
            created_at: created_at.map(|(s, _)| s),
            favourites_count: get_count(json, "favourites_count")?,
            utc_offset: get_i64(json, "utc_offset")?,
            time_zone: get_raw_string(json, "time_zone"),
            profile_banner_url: get_raw_string(json, "profile_banner_url"),
            lang: get_raw_string(json, "lang"),
            statuses_count: get_count(json, "statuses_count")?,
            geo_enabled: get_bool(json, "geo_enabled"),
            verified: get_bool(json, "verified"),
            translator: get_bool(json, "is_translator"),
            listed_count: get_count(json, "listed_count")?,
            follow_request_sent: get_bool(json, "follow_request_sent"),
            description_url_entities,
            url_entity,
            withheld_in_countries: get_string_array(json, "withheld_in_countries")?,
        })
    }

    pub fn list_from_json_str(json: &str) -> Result<Vec<Self>, TwitterError> {
        parse_array(json)?
            .iter()
            .map(|v| Self::from_json(as_object(v, "users")?))
            .collect()
    }

    /// 73x73
    pub fn bigger_profile_image_url_https(&self) -> Option<String> {
        self.resized_profile_image("_bigger")
    }

    /// 24x24
    pub fn mini_profile_image_url_https(&self) -> Option<String> {
        self.resized_profile_image("_mini")
    }

    pub fn original_profile_image_url_https(&self) -> Option<String> {
        self.resized_profile_image("")
    }

    pub fn profile_image_400x400_url_https(&self) -> Option<String> {
        self.resized_profile_image("_400x400")
    }

    fn resized_profile_image(&self, suffix: &str) -> Option<String> {
        static NORMAL_SIZE_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"_normal(?P<ext>\.\w+)?$").unwrap());

        let url = self.profile_image_url_https.as_deref()?;
        if !NORMAL_SIZE_RE.is_match(url) {
            return Some(url.to_owned());
        }
        Some(
            NORMAL_SIZE_RE
                .replace(url, |caps: &regex::Captures| {
                    format!("{}{}", suffix, caps.name("ext").map_or("", |m| m.as_str()))
                })
                .into_owned(),
        )
    }

    pub fn profile_banner_web_url(&self) -> Option<String> {
        self.banner("/web")
    }

    pub fn profile_banner_retina_url(&self) -> Option<String> {
        self.banner("/web_retina")
    }

    pub fn profile_banner_ipad_url(&self) -> Option<String> {
        self.banner("/ipad")
    }

    pub fn profile_banner_ipad_retina_url(&self) -> Option<String> {
        self.banner("/ipad_retina")
    }

    pub fn profile_banner_mobile_url(&self) -> Option<String> {
        self.banner("/mobile")
    }

    pub fn profile_banner_mobile_retina_url(&self) -> Option<String> {
        self.banner("/mobile_retina")
    }

    pub fn profile_banner_300x100_url(&self) -> Option<String> {
        self.banner("/300x100")
    }

    pub fn profile_banner_600x200_url(&self) -> Option<String> {
        self.banner("/600x200")
    }

    pub fn profile_banner_1500x500_url(&self) -> Option<String> {
        self.banner("/1500x500")
    }

    fn banner(&self, size: &str) -> Option<String> {
        self.profile_banner_url.as_ref().map(|u| format!("{}{}", u, size))
    }
}

/// `entities.description.urls` and `entities.url.urls[0]`. Without a url
/// entity, one spanning the whole `url` value is synthesized.
fn parse_user_entities(
    json: &JsonObject,
    url: Option<&str>,
) -> Result<(Vec<UrlEntity>, Option<UrlEntity>), TwitterError> {
    let mut description_urls = vec![];
    let mut url_entity = None;

    if !is_null(json, "entities") {
        let user_entities = get_object(json, "entities")?;
        if !is_null(user_entities, "description") {
            description_urls = entities::urls(get_object(user_entities, "description")?)?.unwrap_or_default();
        }
        if !is_null(user_entities, "url") {
            url_entity = entities::urls(get_object(user_entities, "url")?)?
                .and_then(|urls| urls.into_iter().next());
        }
    }

    if url_entity.is_none() {
        url_entity = url.map(|u| UrlEntity {
            start: 0,
            end: u.chars().count(),
            url: u.to_owned(),
            expanded_url: u.to_owned(),
            display_url: u.to_owned(),
        });
    }

    Ok((description_urls, url_entity))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user(value: serde_json::Value) -> User {
        User::from_json(value.as_object().unwrap()).unwrap()
    }

    #[test]
    fn profile_image_variants() {
        let u = user(json!({
            "id": 1,
            "name": "n",
            "profile_image_url_https": "https://pbs.twimg.com/profile_images/1/abc_normal.jpg"
        }));
        assert_eq!(
            u.bigger_profile_image_url_https().unwrap(),
            "https://pbs.twimg.com/profile_images/1/abc_bigger.jpg"
        );
        assert_eq!(
            u.mini_profile_image_url_https().unwrap(),
            "https://pbs.twimg.com/profile_images/1/abc_mini.jpg"
        );
        assert_eq!(
            u.original_profile_image_url_https().unwrap(),
            "https://pbs.twimg.com/profile_images/1/abc.jpg"
        );
        assert_eq!(
            u.profile_image_400x400_url_https().unwrap(),
            "https://pbs.twimg.com/profile_images/1/abc_400x400.jpg"
        );
    }

    #[test]
    fn banner_variants() {
        let u = user(json!({"id": 1, "profile_banner_url": "https://pbs.twimg.com/profile_banners/1/2"}));
        assert_eq!(u.profile_banner_web_url().unwrap(), "https://pbs.twimg.com/profile_banners/1/2/web");
        assert_eq!(u.profile_banner_1500x500_url().unwrap(), "https://pbs.twimg.com/profile_banners/1/2/1500x500");

        let no_banner = user(json!({"id": 2}));
        assert_eq!(no_banner.profile_banner_mobile_url(), None);
    }

    #[test]
    fn url_entity_synthesized_from_url() {
        let u = user(json!({"id": 1, "url": "https://example.com"}));
        let entity = u.url_entity.unwrap();
        assert_eq!((entity.start, entity.end), (0, 19));
        assert_eq!(entity.expanded_url, "https://example.com");
        assert!(u.description_url_entities.is_empty());
    }

    #[test]
    fn url_entity_from_entities() {
        let u = user(json!({
            "id": 1,
            "url": "https://t.co/x",
            "description": "see https://t.co/y &amp; more",
            "entities": {
                "url": {"urls": [{"url": "https://t.co/x", "expanded_url": "https://example.com", "display_url": "example.com", "indices": [0, 14]}]},
                "description": {"urls": [{"url": "https://t.co/y", "indices": [4, 18]}]}
            }
        }));
        assert_eq!(u.url_entity.unwrap().expanded_url, "https://example.com");
        assert_eq!(u.description_url_entities.len(), 1);
        assert_eq!(u.description.as_deref(), Some("see https://t.co/y & more"));
    }

    #[test]
    fn requires_id() {
        let err = User::from_json(json!({"name": "x"}).as_object().unwrap()).unwrap_err();
        assert!(matches!(err, TwitterError::Json(_)));
    }
}
