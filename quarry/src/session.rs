//! Query accumulator and executor
//!
//! A [`Session`] collects bool clauses, paging, sorting and aggregations
//! across calls, sends them to a [`SearchBackend`] on [`Session::execute`],
//! and keeps the raw result for [`Session::fetch`] /
//! [`Session::fetch_aggregations`].
//!
//! After a successful execute the pending request is cleared and the result
//! is stored. The next accumulating call starts a new request and drops the
//! stored result, so a stale result is never served for a query that has
//! since changed.
//!
//! ```ignore
//! let mut session = Session::new(&backend, "flats");
//! session
//!     .must(term("status", "active"))
//!     .filter(range("age").gte(18))
//!     .page(2, Some(10));
//! let page = session.execute().await?.fetch()?;
//! ```

use crate::aggregation::{Aggregation, SubAggregations};
use crate::backend::SearchBackend;
use crate::config::SessionConfig;
use crate::cursor;
use crate::error::Error;
use crate::query::{BoolQuery, Query, RangeOp, RangeQuery};
use crate::request::{CountRequest, ScrollRequest, SearchRequest};
use crate::response::{AggregationPage, Fetched, Paginator, SearchPage, SearchResponse};
use crate::sort::Sort;
use crate::source::{SearchBody, SourceFilter};
use crate::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Where a session is between calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing pending, no stored result
    Idle,
    /// Something has been attached since the last execute
    Accumulating,
    /// A result is stored and nothing new is pending
    Executed,
}

/// The request a session last sent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExecutedRequest {
    Search(SearchRequest),
    Scroll(ScrollRequest),
    Count(CountRequest),
}

#[derive(Debug, Clone)]
enum StoredResult {
    Search {
        response: SearchResponse,
        count: Option<u64>,
    },
    Count(u64),
}

pub struct Session<'a> {
    backend: &'a dyn SearchBackend,
    index: String,
    config: SessionConfig,

    root: Option<Query>,
    bool_query: BoolQuery,
    aggregations: SubAggregations,
    sort: Vec<Sort>,
    from: Option<u64>,
    size: Option<u64>,
    search_after: Vec<Value>,
    source: SourceFilter,
    min_score: Option<f64>,
    count_only: bool,
    keep_scroll_alive: bool,
    scroll_token: Option<String>,
    pending: bool,
    debug: bool,
    with_count: bool,

    result: Option<StoredResult>,
    last_request: Option<ExecutedRequest>,
    scroll_id: Option<String>,
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("index", &self.index)
            .field("config", &self.config)
            .field("root", &self.root)
            .field("bool_query", &self.bool_query)
            .field("aggregations", &self.aggregations)
            .field("sort", &self.sort)
            .field("from", &self.from)
            .field("size", &self.size)
            .field("search_after", &self.search_after)
            .field("source", &self.source)
            .field("min_score", &self.min_score)
            .field("count_only", &self.count_only)
            .field("keep_scroll_alive", &self.keep_scroll_alive)
            .field("scroll_token", &self.scroll_token)
            .field("pending", &self.pending)
            .field("debug", &self.debug)
            .field("with_count", &self.with_count)
            .field("result", &self.result)
            .field("last_request", &self.last_request)
            .field("scroll_id", &self.scroll_id)
            .finish_non_exhaustive()
    }
}

impl<'a> Session<'a> {
    pub fn new(backend: &'a dyn SearchBackend, index: impl Into<String>) -> Self {
        Self::with_config(backend, index, SessionConfig::default())
    }

    pub fn with_config(
        backend: &'a dyn SearchBackend,
        index: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        Self {
            backend,
            index: index.into(),
            config,
            root: None,
            bool_query: BoolQuery::new(),
            aggregations: SubAggregations::new(),
            sort: Vec::new(),
            from: None,
            size: None,
            search_after: Vec::new(),
            source: SourceFilter::default(),
            min_score: None,
            count_only: false,
            keep_scroll_alive: false,
            scroll_token: None,
            pending: false,
            debug: false,
            with_count: false,
            result: None,
            last_request: None,
            scroll_id: None,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        if self.pending {
            SessionState::Accumulating
        } else if self.result.is_some() {
            SessionState::Executed
        } else {
            SessionState::Idle
        }
    }

    /// Mark a new request as started; the previous result no longer applies
    fn touch(&mut self) -> &mut Self {
        self.pending = true;
        self.result = None;
        self
    }

    pub fn must(&mut self, query: impl Into<Query>) -> &mut Self {
        self.bool_query.push_must(query);
        self.touch()
    }

    pub fn must_not(&mut self, query: impl Into<Query>) -> &mut Self {
        self.bool_query.push_must_not(query);
        self.touch()
    }

    pub fn filter(&mut self, query: impl Into<Query>) -> &mut Self {
        self.bool_query.push_filter(query);
        self.touch()
    }

    pub fn should(&mut self, query: impl Into<Query>) -> &mut Self {
        self.bool_query.push_should(query);
        self.touch()
    }

    pub fn min_should_match(&mut self, minimum: i32) -> &mut Self {
        self.bool_query.minimum_should_match = Some(minimum);
        self.touch()
    }

    /// Replace the root query and any clauses accumulated so far.
    ///
    /// A bool query becomes the clause set later calls append to. Any other
    /// query is sent as is, or folded in as the first `must` clause once
    /// more clauses are added.
    pub fn query(&mut self, query: impl Into<Query>) -> &mut Self {
        match query.into() {
            Query::Bool(bool_query) => {
                self.bool_query = bool_query;
                self.root = None;
            }
            other => {
                self.bool_query = BoolQuery::new();
                self.root = Some(other);
            }
        }
        self.touch()
    }

    pub fn min_score(&mut self, score: f64) -> &mut Self {
        self.min_score = Some(score);
        self.touch()
    }

    /// Attach an aggregation; one with the same name replaces the earlier
    pub fn aggregation(&mut self, aggregation: impl Into<Aggregation>) -> &mut Self {
        self.aggregations.insert(aggregation);
        self.touch()
    }

    pub fn sort(&mut self, sort: impl Into<Sort>) -> &mut Self {
        self.sort.push(sort.into());
        self.touch()
    }

    /// `from = (page - 1) * limit`, `size = limit`. Replaces earlier paging.
    /// Page 0 is treated as page 1.
    pub fn page(&mut self, page: u64, limit: Option<u64>) -> &mut Self {
        let limit = limit.unwrap_or(self.config.default_page_size);
        self.from = Some(page.saturating_sub(1).saturating_mul(limit));
        self.size = Some(limit);
        self.touch()
    }

    pub fn from_size(&mut self, from: u64, size: u64) -> &mut Self {
        self.from = Some(from);
        self.size = Some(size);
        self.touch()
    }

    pub fn offset(&mut self, from: u64) -> &mut Self {
        self.from = Some(from);
        self.touch()
    }

    pub fn limit(&mut self, size: u64) -> &mut Self {
        self.size = Some(size);
        self.touch()
    }

    /// Keyset marker; an empty tuple leaves the session untouched
    pub fn search_after(&mut self, values: impl IntoIterator<Item = Value>) -> &mut Self {
        let values: Vec<Value> = values.into_iter().collect();
        if values.is_empty() {
            return self;
        }
        self.search_after = values;
        self.touch()
    }

    /// Keyset paging on the id field: adds `must(range(id_field).<op>(id))`,
    /// `lt` by default
    pub fn paging(&mut self, id: impl Into<Value>, op: Option<RangeOp>) -> &mut Self {
        let range = RangeQuery::new(self.config.id_field.clone()).apply(op.unwrap_or(RangeOp::Lt), id);
        self.must(range)
    }

    /// Only return these source fields
    pub fn source<I, S>(&mut self, includes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source.includes = includes.into_iter().map(Into::into).collect();
        self.touch()
    }

    /// Leave these source fields out
    pub fn exclude<I, S>(&mut self, excludes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source.excludes = excludes.into_iter().map(Into::into).collect();
        self.touch()
    }

    /// Also ask the count endpoint for an exact total after every search
    pub fn with_count(&mut self) -> &mut Self {
        self.with_count = true;
        self
    }

    /// Send the next execute to the count endpoint with paging stripped
    pub fn count_only(&mut self) -> &mut Self {
        self.count_only = true;
        self.touch()
    }

    /// Continue a scroll context on the next execute, ignoring everything
    /// accumulated. An empty token is ignored.
    pub fn scroll(&mut self, token: impl AsRef<str>) -> &mut Self {
        let token = token.as_ref().trim();
        if token.is_empty() {
            return self;
        }
        self.scroll_token = Some(token.to_string());
        self.touch()
    }

    /// Open a scroll context with the first page of the next search
    pub fn keep_scroll_alive(&mut self) -> &mut Self {
        self.keep_scroll_alive = true;
        self.touch()
    }

    /// Log the composed request on the next execute
    pub fn debug(&mut self, enabled: bool) -> &mut Self {
        self.debug = enabled;
        self
    }

    /// Scroll id returned with the last result, if the backend opened one
    pub fn scroll_id(&self) -> Option<&str> {
        self.scroll_id.as_deref()
    }

    pub fn last_request(&self) -> Option<&ExecutedRequest> {
        self.last_request.as_ref()
    }

    /// Pending query: the bool clauses, with any non-bool root folded in
    fn pending_query(&self) -> Option<Query> {
        if self.bool_query.is_empty() {
            return self.root.clone();
        }
        let mut bool_query = self.bool_query.clone();
        if let Some(root) = &self.root {
            bool_query.must.insert(0, root.clone());
        }
        Some(Query::Bool(bool_query))
    }

    /// The body the next execute would send (scroll continuation aside)
    pub fn body(&self) -> SearchBody {
        SearchBody {
            query: self.pending_query(),
            aggregations: self.aggregations.clone(),
            size: self.size,
            from: self.from,
            source: self.source.clone(),
            sort: self.sort.clone(),
            search_after: self.search_after.clone(),
            min_score: self.min_score,
        }
    }

    fn reset_pending(&mut self) {
        self.root = None;
        self.bool_query = BoolQuery::new();
        self.aggregations = SubAggregations::new();
        self.sort.clear();
        self.from = None;
        self.size = None;
        self.search_after.clear();
        self.source = SourceFilter::default();
        self.min_score = None;
        self.count_only = false;
        self.keep_scroll_alive = false;
        self.scroll_token = None;
        self.pending = false;
        self.debug = false;
    }

    /// Send the pending request and store the result.
    ///
    /// Fails with [`Error::EmptyQuery`] when nothing is pending. On a backend
    /// error the pending request is kept so the call can be retried.
    pub async fn execute(&mut self) -> Result<&mut Self> {
        let (request, result) = match self.scroll_token.clone() {
            Some(token) => self.execute_scroll(token).await?,
            None if self.count_only => self.execute_count().await?,
            None => self.execute_search().await?,
        };

        if let StoredResult::Search { response, .. } = &result {
            self.scroll_id = response.scroll_id.clone();
        }
        self.result = Some(result);
        self.last_request = Some(request);
        self.reset_pending();
        Ok(self)
    }

    async fn execute_scroll(&self, token: String) -> Result<(ExecutedRequest, StoredResult)> {
        let request = ScrollRequest::new(token, self.config.scroll_keep_alive.clone());
        debug!(index = %self.index, "continuing scroll");
        let response = self.backend.scroll(&request).await?;
        debug!(index = %self.index, hits = response.hits.hits.len(), "scroll page received");
        Ok((
            ExecutedRequest::Scroll(request),
            StoredResult::Search {
                response,
                count: None,
            },
        ))
    }

    async fn execute_count(&self) -> Result<(ExecutedRequest, StoredResult)> {
        let body = self.body().without_pagination();
        if body.is_empty() {
            return Err(Error::EmptyQuery);
        }
        body.validate()?;
        let request = CountRequest::from_search(&self.index, &body);
        self.log_request(&request);
        let response = self.backend.count(&request).await?;
        debug!(index = %self.index, count = response.count, "count completed");
        Ok((ExecutedRequest::Count(request), StoredResult::Count(response.count)))
    }

    async fn execute_search(&self) -> Result<(ExecutedRequest, StoredResult)> {
        let body = self.body();
        if body.is_empty() {
            return Err(Error::EmptyQuery);
        }
        body.validate()?;

        let mut request = SearchRequest::new(&self.index, body);
        if self.keep_scroll_alive {
            if request.body.from.unwrap_or(0) == 0 {
                request = request.scroll(self.config.scroll_keep_alive.clone());
            } else {
                debug!(index = %self.index, "scroll context only opened on the first page");
            }
        }
        self.log_request(&request);

        let response = self.backend.search(&request).await?;
        debug!(
            index = %self.index,
            took_ms = response.took,
            hits = response.hits.hits.len(),
            total = response.total(),
            "search completed"
        );

        let count = if self.with_count {
            let count_request = CountRequest::from_search(&self.index, &request.body);
            let count = self.backend.count(&count_request).await?.count;
            debug!(index = %self.index, count, "secondary count completed");
            Some(count)
        } else {
            None
        };

        Ok((ExecutedRequest::Search(request), StoredResult::Search { response, count }))
    }

    fn log_request<T: Serialize>(&self, request: &T) {
        if self.debug {
            match serde_json::to_string(request) {
                Ok(json) => info!(index = %self.index, request = %json, "composed request"),
                Err(e) => debug!(error = %e, "could not render request"),
            }
        }
    }

    /// Reshape the stored result.
    ///
    /// Count results come back as [`Fetched::Count`]. Searches come back as a
    /// page of source documents; `paginator.next` carries a cursor only when
    /// the last row has an id, the engine total exceeds the page limit and
    /// the row has sort values.
    pub fn fetch(&self) -> Result<Fetched> {
        let (response, count) = match &self.result {
            None => return Err(Error::EmptyResult),
            Some(StoredResult::Count(count)) => return Ok(Fetched::Count(*count)),
            Some(StoredResult::Search { response, count }) => (response, *count),
        };

        let engine_total = response.total();
        let total = count.unwrap_or(engine_total);
        let list: Vec<Value> = response.hits.hits.iter().map(|hit| hit.source.clone()).collect();

        let next = match response.hits.hits.last() {
            Some(last)
                if has_value(last.source.get(&self.config.id_field))
                    && engine_total > self.config.page_limit
                    && !last.sort.is_empty() =>
            {
                cursor::encode(&last.sort)
            }
            _ => String::new(),
        };

        Ok(Fetched::Page(SearchPage {
            list,
            total,
            paginator: Paginator { next, total },
        }))
    }

    /// Aggregations of the stored result, `{aggregations: {}, total: 0}` when it has none
    pub fn fetch_aggregations(&self) -> Result<AggregationPage> {
        match &self.result {
            None => Err(Error::EmptyResult),
            Some(StoredResult::Search { response, .. }) => Ok(response
                .aggregations
                .as_ref()
                .map(|aggregations| AggregationPage {
                    aggregations: aggregations.clone(),
                    total: response.total(),
                })
                .unwrap_or_default()),
            Some(StoredResult::Count(_)) => Ok(AggregationPage::default()),
        }
    }
}

/// A row id counts only when it is set to something other than null, false, 0 or empty
fn has_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}
