//! Typed resources and request parameters for the Twitter v1.1 REST API.
//!
//! Resources (`Status`, `User`, `DirectMessageEvent` and the entities found in
//! tweet text) are built from JSON responses. Requests are described by
//! [`Paging`] and [`Query`], which serialize to ordered [`HttpParameter`] lists
//! for whatever HTTP client the caller uses.

mod card;
mod direct_message;
pub mod entities;
mod entity;
mod error;
mod http_parameter;
mod paging;
mod parse;
mod query;
mod search;
mod text;
mod tweet;
mod user;

pub use card::Card;
pub use direct_message::{DirectMessageEvent, DirectMessageEventList};
pub use entities::Entities;
pub use entity::{
    AdditionalMediaInfo, EntityIndex, HashtagEntity, MediaEntity, MediaSize, MediaSizes, Resize,
    SymbolEntity, UrlEntity, UserMentionEntity, Variant,
};
pub use error::TwitterError;
pub use http_parameter::{decode_parameters, encode_parameters, HttpParameter};
pub use paging::Paging;
pub use query::{Query, ResultType, Unit};
pub use search::{QueryResult, SearchPager};
pub use text::unescape;
pub use tweet::{EditControl, GeoLocation, Place, Scopes, Status};
pub use user::User;

/// A parsed JSON object, the input of every `from_json` constructor.
pub type JsonObject = parse::JsonObject;
