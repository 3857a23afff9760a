use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::TwitterError;

/// RFC 3986 unreserved characters stay as they are.
const PARAMETER_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// One request parameter, ready for the transport to encode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HttpParameter {
    pub name: String,
    pub value: String,
}

impl HttpParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for HttpParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}={}",
            utf8_percent_encode(&self.name, PARAMETER_ENCODE_SET),
            utf8_percent_encode(&self.value, PARAMETER_ENCODE_SET)
        )
    }
}

/// `name=value` pairs joined with `&`, percent-encoded.
pub fn encode_parameters(params: &[HttpParameter]) -> String {
    params
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("&")
}

/// Inverse of [`encode_parameters`]. `+` decodes to a space and a pair without
/// `=` gets an empty value.
pub fn decode_parameters(query: &str) -> Result<Vec<HttpParameter>, TwitterError> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok(HttpParameter::new(decode(name)?, decode(value)?))
        })
        .collect()
}

fn decode(s: &str) -> Result<String, TwitterError> {
    let s = s.replace('+', " ");
    urlencoding::decode(&s)
        .map(|d| d.into_owned())
        .map_err(|e| TwitterError::InvalidArgument(format!("cannot decode {}: {}", s, e)))
}
