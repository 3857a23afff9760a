use std::collections::VecDeque;
use std::future::Future;

use futures_util::Stream;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

use crate::error::TwitterError;
use crate::http_parameter::HttpParameter;
use crate::parse::{
    as_object, get_array, get_object, get_raw_string, get_u64, is_null, parse_object, JsonObject,
};
use crate::query::Query;
use crate::tweet::Status;

/// Body of a `search/tweets` response.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub statuses: Vec<Status>,
    pub max_id: Option<u64>,
    pub since_id: Option<u64>,
    pub refresh_url: Option<String>,
    /// Continuation token for the following page.
    pub next_results: Option<String>,
    pub count: Option<u64>,
    /// Seconds the search took on the server.
    pub completed_in: Option<f64>,
    pub query: Option<String>,
}

impl QueryResult {
    pub fn from_json_str(json: &str) -> Result<Self, TwitterError> {
        Self::from_json(&parse_object(json)?)
    }

    pub fn from_json(json: &JsonObject) -> Result<Self, TwitterError> {
        let statuses = get_array(json, "statuses")?
            .iter()
            .map(|v| Status::from_json(as_object(v, "statuses")?))
            .collect::<Result<Vec<_>, _>>()?;

        let mut result = Self {
            statuses,
            max_id: None,
            since_id: None,
            refresh_url: None,
            next_results: None,
            count: None,
            completed_in: None,
            query: None,
        };
        if !is_null(json, "search_metadata") {
            let metadata = get_object(json, "search_metadata")?;
            result.max_id = get_u64(metadata, "max_id")?;
            result.since_id = get_u64(metadata, "since_id")?;
            result.refresh_url = get_raw_string(metadata, "refresh_url");
            result.next_results = get_raw_string(metadata, "next_results");
            result.count = get_u64(metadata, "count")?;
            result.completed_in = metadata.get("completed_in").and_then(|v| v.as_f64());
            result.query = get_raw_string(metadata, "query")
                .map(|q| urlencoding::decode(&q).map(|d| d.into_owned()).unwrap_or_else(|_| q.clone()));
        }
        Ok(result)
    }

    pub fn has_next(&self) -> bool {
        self.next_results.is_some()
    }

    /// The query for the following page, if there is one.
    pub fn next_query(&self) -> Result<Option<Query>, TwitterError> {
        self.next_results
            .as_deref()
            .map(Query::from_continuation_token)
            .transpose()
    }
}

/// Walks the pages of a search.
///
/// The pager never talks to the network: the caller passes a fetch function
/// that sends the parameters to `search/tweets` and returns the response body.
#[derive(TypedBuilder)]
pub struct SearchPager {
    query: Query,

    #[builder(setter(strip_option), default)]
    limit: Option<usize>,

    #[builder(setter(strip_option), default)]
    min_id: Option<u64>,

    #[builder(setter(skip), default)]
    state: SearchState,
}

#[derive(Default, Debug)]
struct SearchState {
    statuses: VecDeque<Status>,
    next: Option<Query>,
    /// Raised by the last page after its statuses, not instead of them.
    pending_error: Option<TwitterError>,
    count: usize,
    errored: bool,
}

impl SearchPager {
    pub fn search<'a, F, Fut>(&'a mut self, fetch: F) -> impl Stream<Item = Result<Status, TwitterError>> + 'a
    where
        F: FnMut(Vec<HttpParameter>) -> Fut + 'a,
        Fut: Future<Output = Result<String, TwitterError>> + 'a,
    {
        // Reset internal state
        self.state = SearchState {
            next: Some(self.query.clone()),
            ..Default::default()
        };

        futures_util::stream::unfold((self, fetch), |(pager, mut fetch)| async move {
            loop {
                // Stop if previously errored
                if pager.state.errored {
                    return None;
                }

                // Stop if limit reached
                if let Some(limit) = pager.limit {
                    if pager.state.count >= limit {
                        debug!(limit, "search limit reached");
                        return None;
                    }
                }

                // Return next status if available
                if let Some(status) = pager.state.statuses.pop_front() {
                    if let Some(min_id) = pager.min_id {
                        if status.id < min_id {
                            debug!(min_id, "minimum status id reached");
                            pager.state.statuses.clear();
                            pager.state.next = None;
                            return None;
                        }
                    }
                    pager.state.count += 1;
                    return Some((Ok(status), (pager, fetch)));
                }

                if let Some(e) = pager.state.pending_error.take() {
                    pager.state.errored = true;
                    return Some((Err(e), (pager, fetch)));
                }

                // Fetch the next page
                let query = pager.state.next.take()?;
                if let Err(e) = pager.fetch_page(&query, &mut fetch).await {
                    pager.state.errored = true;
                    return Some((Err(e), (pager, fetch)));
                }
            }
        })
    }

    async fn fetch_page<F, Fut>(&mut self, query: &Query, fetch: &mut F) -> Result<(), TwitterError>
    where
        F: FnMut(Vec<HttpParameter>) -> Fut,
        Fut: Future<Output = Result<String, TwitterError>>,
    {
        let body = fetch(query.to_parameters()).await?;
        let result = QueryResult::from_json_str(&body)?;
        trace!(statuses = result.statuses.len(), has_next = result.has_next(), "fetched search page");

        // An empty page ends the search even if the api offers a next one
        let next = if result.statuses.is_empty() {
            Ok(None)
        } else {
            result.next_query()
        };
        self.state.statuses.extend(result.statuses);
        match next {
            Ok(next) => self.state.next = next,
            Err(e) => {
                warn!(error = %e, "undecodable continuation token");
                self.state.next = None;
                self.state.pending_error = Some(e);
            }
        }
        Ok(())
    }
}
