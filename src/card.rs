use serde::Serialize;
use tracing::warn;

use crate::error::TwitterError;
use crate::parse::{get_object, get_str, get_u64, is_null, JsonObject};

/// Link preview attached to a status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Card {
    pub url: String,
    /// Largest of the card's header images.
    pub image_url: Option<String>,
    pub image_width: u32,
    pub image_height: u32,
    pub title: String,
}

impl Card {
    /// Reads a card in the `binding_values` form, where each value is tagged
    /// with a `type` and carries a `string_value` or `image_value`.
    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let url = get_str(json, "url")?.to_owned();
        let bindings = get_object(json, "binding_values")?;

        let title = get_object(bindings, "title")
            .and_then(|title| get_str(title, "string_value"))?
            .to_owned();

        let mut largest: Option<(String, u32, u32)> = None;
        for value in bindings.values().filter_map(|v| v.as_object()) {
            if is_null(value, "image_value") {
                continue;
            }
            let image = get_object(value, "image_value")?;
            let width = dimension(image, "width")?;
            let height = dimension(image, "height")?;
            let area = u64::from(width) * u64::from(height);
            if largest
                .as_ref()
                .map_or(true, |(_, w, h)| area > u64::from(*w) * u64::from(*h))
            {
                largest = Some((get_str(image, "url")?.to_owned(), width, height));
            }
        }

        let (image_url, image_width, image_height) = match largest {
            Some((url, w, h)) => (Some(url), w, h),
            None => {
                warn!(%url, "card has no images");
                (None, 0, 0)
            }
        };

        Ok(Self {
            url,
            image_url,
            image_width,
            image_height,
            title,
        })
    }
}

fn dimension(image: &JsonObject, key: &str) -> Result<u32, TwitterError> {
    let v = get_u64(image, key)?.unwrap_or(0);
    u32::try_from(v).map_err(|_| TwitterError::MalformedResponse(format!("\"{}\" out of range: {}", key, v)))
}
