use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::TwitterError;
use crate::http_parameter::{decode_parameters, HttpParameter};
use crate::tweet::GeoLocation;

/// Radius unit of a geocode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Miles,
    Kilometers,
}

impl Unit {
    pub const ALL: [Unit; 2] = [Unit::Miles, Unit::Kilometers];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Miles => "mi",
            Self::Kilometers => "km",
        }
    }
}

impl FromStr for Unit {
    type Err = TwitterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| TwitterError::InvalidArgument(format!("unknown unit: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    /// Only the most popular results.
    Popular,
    /// Popular and real time results.
    Mixed,
    /// Only the most recent results.
    Recent,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::Mixed => "mixed",
            Self::Recent => "recent",
        }
    }
}

impl FromStr for ResultType {
    type Err = TwitterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(Self::Popular),
            "mixed" => Ok(Self::Mixed),
            "recent" => Ok(Self::Recent),
            _ => Err(TwitterError::InvalidArgument(format!("unknown result type: {}", s))),
        }
    }
}

/// Parameters of a `search/tweets` request.
///
/// Builder methods consume and return the query, so a finished query can be
/// shared freely. Dates (`since`, `until`) are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Query {
    pub cursor: Option<String>,
    pub query: Option<String>,
    /// ISO 639-1 language of the tweets.
    pub lang: Option<String>,
    /// Language of the query itself; only `ja` has an effect.
    pub locale: Option<String>,
    pub max_id: Option<u64>,
    pub count: Option<u32>,
    pub since: Option<String>,
    pub since_id: Option<u64>,
    geocode: Option<String>,
    pub until: Option<String>,
    pub result_type: Option<ResultType>,
    next_page: Option<String>,
}

const WITH_TWITTER_USER_ID: (&str, &str) = ("with_twitter_user_id", "true");

impl Query {
    pub fn new(query: impl Into<String>) -> Self {
        Self::default().query(query)
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn max_id(mut self, max_id: u64) -> Self {
        self.max_id = Some(max_id);
        self
    }

    /// Tweets per page, up to 100.
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn since(mut self, since: impl Into<String>) -> Self {
        self.since = Some(since.into());
        self
    }

    pub fn since_id(mut self, since_id: u64) -> Self {
        self.since_id = Some(since_id);
        self
    }

    pub fn until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }

    pub fn result_type(mut self, result_type: ResultType) -> Self {
        self.result_type = Some(result_type);
        self
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn geo_code(
        mut self,
        location: GeoLocation,
        radius: f64,
        unit: Unit,
    ) -> Result<Self, TwitterError> {
        self.set_geo_code(location, radius, unit)?;
        Ok(self)
    }

    /// Restricts results to users within `radius` of `location`, replacing any
    /// previous geocode. Non-finite numbers are rejected and leave the query
    /// unchanged.
    pub fn set_geo_code(
        &mut self,
        location: GeoLocation,
        radius: f64,
        unit: Unit,
    ) -> Result<(), TwitterError> {
        self.geocode = Some(format!(
            "{},{},{}{}",
            format_number("latitude", location.latitude)?,
            format_number("longitude", location.longitude)?,
            format_number("radius", radius)?,
            unit.as_str()
        ));
        Ok(())
    }

    /// `lat,lon,radiusUNIT`, e.g. `37.7,-122.4,5.0km`.
    pub fn geocode(&self) -> Option<&str> {
        self.geocode.as_deref()
    }

    /// The continuation token this query was rebuilt from.
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn set_next_page(&mut self, next_page: Option<String>) {
        self.next_page = next_page;
    }

    /// Request parameters in the order the search endpoint documents them,
    /// always followed by `with_twitter_user_id=true`.
    pub fn to_parameters(&self) -> Vec<HttpParameter> {
        let numbers = |v: Option<u64>| v.map(|n| n.to_string());
        let fields = [
            ("q", self.query.clone()),
            ("lang", self.lang.clone()),
            ("locale", self.locale.clone()),
            ("max_id", numbers(self.max_id)),
            ("count", numbers(self.count.map(u64::from))),
            ("since", self.since.clone()),
            ("since_id", numbers(self.since_id)),
            ("geocode", self.geocode.clone()),
            ("until", self.until.clone()),
            ("result_type", self.result_type.map(|r| r.as_str().to_owned())),
        ];

        let mut params: Vec<_> = fields
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| HttpParameter::new(name, v)))
            .collect();
        params.push(HttpParameter::new(WITH_TWITTER_USER_ID.0, WITH_TWITTER_USER_ID.1));
        params
    }

    /// Rebuilds a query from a `next_results` token such as
    /// `?max_id=123&q=rust&count=20`. The leading character is dropped and the
    /// rest is decoded as URL parameters; when a name repeats, the last value
    /// wins. `since` and `until` are not restored, the api folds them into
    /// `q`.
    pub fn from_continuation_token(token: &str) -> Result<Self, TwitterError> {
        let encoded = match token.chars().next() {
            Some(first) => &token[first.len_utf8()..],
            None => "",
        };
        let params: HashMap<String, String> = decode_parameters(encoded)?
            .into_iter()
            .map(|p| (p.name, p.value))
            .collect();
        debug!(token, params = params.len(), "decoded continuation token");

        let mut query = Query {
            next_page: Some(token.to_owned()),
            ..Default::default()
        };
        query.query = params.get("q").cloned();
        query.lang = params.get("lang").cloned();
        query.locale = params.get("locale").cloned();
        if let Some(max_id) = params.get("max_id") {
            query.max_id = Some(parse_number("max_id", max_id)?);
        }
        if let Some(count) = params.get("count") {
            query.count = Some(parse_number("count", count)?);
        }
        if let Some(geocode) = params.get("geocode") {
            let (location, radius, unit) = parse_geocode(geocode)?;
            query.set_geo_code(location, radius, unit)?;
        }
        if let Some(result_type) = params.get("result_type") {
            query.result_type = Some(result_type.parse()?);
        }
        Ok(query)
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, TwitterError> {
    value
        .parse()
        .map_err(|_| TwitterError::InvalidArgument(format!("{} is not a number: {}", name, value)))
}

/// Splits `lat,lon,radiusUNIT`, matching the unit by suffix.
fn parse_geocode(geocode: &str) -> Result<(GeoLocation, f64, Unit), TwitterError> {
    let parts: Vec<&str> = geocode.split(',').collect();
    if parts.len() < 3 {
        return Err(TwitterError::InvalidArgument(format!("malformed geocode: {}", geocode)));
    }
    let latitude: f64 = parse_number("latitude", parts[0])?;
    let longitude: f64 = parse_number("longitude", parts[1])?;

    let radius_str = parts[2];
    let (radius, unit) = Unit::ALL
        .into_iter()
        .find_map(|unit| radius_str.strip_suffix(unit.as_str()).map(|r| (r, unit)))
        .ok_or_else(|| TwitterError::InvalidArgument(format!("unrecognized geocode radius: {}", radius_str)))?;
    let radius: f64 = parse_number("radius", radius)?;

    Ok((GeoLocation::new(latitude, longitude), radius, unit))
}

/// Plain decimal notation, never an exponent. Whole numbers get a trailing
/// `.0` so a geocode reads the same after a round trip.
fn format_number(name: &str, v: f64) -> Result<String, TwitterError> {
    if !v.is_finite() {
        return Err(TwitterError::InvalidArgument(format!("{} is not a finite number: {}", name, v)));
    }
    let s = v.to_string();
    Ok(if s.contains('.') { s } else { s + ".0" })
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn field<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map_or_else(|| "null".to_owned(), |v| v.to_string())
        }
        write!(
            f,
            "Query(cursor={}, query={}, lang={}, locale={}, maxId={}, count={}, since={}, sinceId={}, geocode={}, until={}, resultType={}, nextPageQuery={})",
            field(&self.cursor),
            field(&self.query),
            field(&self.lang),
            field(&self.locale),
            field(&self.max_id),
            field(&self.count),
            field(&self.since),
            field(&self.since_id),
            field(&self.geocode),
            field(&self.until),
            field(&self.result_type.map(|r| r.as_str())),
            field(&self.next_page),
        )
    }
}
