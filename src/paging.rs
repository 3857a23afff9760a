use std::fmt;

use crate::error::TwitterError;
use crate::http_parameter::HttpParameter;

/// Pagination parameters for timeline-style endpoints.
///
/// Every field starts unset and only accepts values of at least 1. Unset
/// fields are left out of the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Paging {
    page: Option<u32>,
    count: Option<u32>,
    since_id: Option<u64>,
    max_id: Option<u64>,
}

impl Paging {
    /// Only `since_id`.
    pub const S: &'static [char] = &['s'];
    /// `since_id`, `max_id`, `count` and `page`.
    pub const SMCP: &'static [char] = &['s', 'm', 'c', 'p'];
    pub const COUNT: &'static str = "count";
    /// Some list endpoints call the page size `per_page`.
    pub const PER_PAGE: &'static str = "per_page";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn count(&self) -> Option<u32> {
        self.count
    }

    pub fn since_id(&self) -> Option<u64> {
        self.since_id
    }

    pub fn max_id(&self) -> Option<u64> {
        self.max_id
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), TwitterError> {
        self.page = Some(positive("page", page)?);
        Ok(())
    }

    pub fn set_count(&mut self, count: u32) -> Result<(), TwitterError> {
        self.count = Some(positive("count", count)?);
        Ok(())
    }

    pub fn set_since_id(&mut self, since_id: u64) -> Result<(), TwitterError> {
        self.since_id = Some(positive("since_id", since_id)?);
        Ok(())
    }

    pub fn set_max_id(&mut self, max_id: u64) -> Result<(), TwitterError> {
        self.max_id = Some(positive("max_id", max_id)?);
        Ok(())
    }

    pub fn with_page(mut self, page: u32) -> Result<Self, TwitterError> {
        self.set_page(page)?;
        Ok(self)
    }

    pub fn with_count(mut self, count: u32) -> Result<Self, TwitterError> {
        self.set_count(count)?;
        Ok(self)
    }

    pub fn with_since_id(mut self, since_id: u64) -> Result<Self, TwitterError> {
        self.set_since_id(since_id)?;
        Ok(self)
    }

    pub fn with_max_id(mut self, max_id: u64) -> Result<Self, TwitterError> {
        self.set_max_id(max_id)?;
        Ok(self)
    }

    /// All four parameters supported, page size named `count`.
    pub fn to_parameters(&self) -> Result<Vec<HttpParameter>, TwitterError> {
        self.to_parameters_with(Self::SMCP, Self::COUNT)
    }

    /// Emits since_id, max_id, page size and page, in that order, for the
    /// fields that are set. Fails if a set field's code (`s`, `m`, `c`, `p`)
    /// is not in `supported`.
    pub fn to_parameters_with(
        &self,
        supported: &[char],
        per_page_param_name: &str,
    ) -> Result<Vec<HttpParameter>, TwitterError> {
        let fields = [
            ('s', "since_id", self.since_id),
            ('m', "max_id", self.max_id),
            ('c', per_page_param_name, self.count.map(u64::from)),
            ('p', "page", self.page.map(u64::from)),
        ];

        let mut params = Vec::with_capacity(supported.len());
        for (code, name, value) in fields {
            let value = match value {
                Some(v) => v,
                None => continue,
            };
            if !supported.contains(&code) {
                return Err(TwitterError::UnsupportedParameter(name.to_owned()));
            }
            params.push(HttpParameter::new(name, value.to_string()));
        }
        Ok(params)
    }
}

fn positive<T: Copy + Into<u64> + fmt::Display>(name: &str, value: T) -> Result<T, TwitterError> {
    let v: u64 = value.into();
    if v < 1 {
        return Err(TwitterError::InvalidArgument(format!(
            "{} should be positive integer. passed:{}",
            name, value
        )));
    }
    Ok(value)
}

impl fmt::Display for Paging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn field<T: fmt::Display>(v: Option<T>) -> String {
            v.map_or_else(|| "unset".to_owned(), |v| v.to_string())
        }
        write!(
            f,
            "Paging{{page={}, count={}, sinceId={}, maxId={}}}",
            field(self.page),
            field(self.count),
            field(self.since_id),
            field(self.max_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_validate() {
        let mut paging = Paging::new();
        paging.set_page(3).unwrap();
        assert_eq!(paging.page(), Some(3));

        assert!(matches!(paging.set_page(0), Err(TwitterError::InvalidArgument(_))));
        assert_eq!(paging.page(), Some(3));

        assert!(paging.set_since_id(0).is_err());
        assert_eq!(paging.since_id(), None);
        assert!(paging.set_max_id(0).is_err());
        assert!(paging.set_count(0).is_err());
        assert_eq!(paging.count(), None);
    }

    #[test]
    fn serializes_in_fixed_order() {
        let paging = Paging::new()
            .with_page(2)
            .and_then(|p| p.with_count(20))
            .and_then(|p| p.with_max_id(10))
            .and_then(|p| p.with_since_id(5))
            .unwrap();
        assert_eq!(
            paging.to_parameters().unwrap(),
            [
                HttpParameter::new("since_id", "5"),
                HttpParameter::new("max_id", "10"),
                HttpParameter::new("count", "20"),
                HttpParameter::new("page", "2"),
            ]
        );
    }

    #[test]
    fn unset_fields_are_omitted() {
        assert!(Paging::new().to_parameters().unwrap().is_empty());
        let paging = Paging::new().with_count(50).unwrap();
        assert_eq!(paging.to_parameters().unwrap(), [HttpParameter::new("count", "50")]);
    }

    #[test]
    fn per_page_name() {
        let paging = Paging::new().with_count(50).unwrap();
        assert_eq!(
            paging.to_parameters_with(Paging::SMCP, Paging::PER_PAGE).unwrap(),
            [HttpParameter::new("per_page", "50")]
        );
    }

    #[test]
    fn unsupported_parameter() {
        let paging = Paging::new().with_max_id(10).unwrap();
        assert_eq!(
            paging.to_parameters_with(Paging::S, Paging::COUNT),
            Err(TwitterError::UnsupportedParameter("max_id".to_owned()))
        );

        let since_only = Paging::new().with_since_id(10).unwrap();
        assert_eq!(
            since_only.to_parameters_with(Paging::S, Paging::COUNT).unwrap(),
            [HttpParameter::new("since_id", "10")]
        );
    }

    #[test]
    fn structural_equality_and_display() {
        let a = Paging::new().with_page(1).unwrap();
        let b = Paging::new().with_page(1).unwrap();
        assert_eq!(a, b);
        let set: std::collections::HashSet<Paging> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_ne!(a, Paging::new());
        assert_eq!(a.to_string(), "Paging{page=1, count=unset, sinceId=unset, maxId=unset}");
    }
}
