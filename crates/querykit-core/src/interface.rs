//! Request-level entry point.
//!
//! [`QueryInterface`] applies a [`QueryConfig`] to incoming request
//! parameters and produces filters, sort clauses, pagination and field
//! projection.
//!
//! ## Usage
//!
//! ```
//! use querykit_core::config::QueryConfig;
//! use querykit_core::interface::QueryInterface;
//! use querykit_core::params::RawParams;
//!
//! let interface = QueryInterface::new(QueryConfig::default());
//! let params = RawParams::from_query_string("title=Some%20Title&page=2&order_by=hits.desc");
//!
//! let filters = interface.filtering_options(&params).unwrap();
//! assert_eq!(filters["title"].as_str(), Some("Some Title"));
//! assert_eq!(interface.pagination_options(&params).page, 2);
//! assert_eq!(interface.sorting_options(&params)[0].attribute, "hits");
//! ```

use tracing::debug;

use crate::config::QueryConfig;
use crate::filter::{FilterCollection, FilterError, ParseContext};
use crate::options::{FieldProjection, PaginationOptions, DISABLE_DEFAULT_FILTERS};
use crate::output::QueryOptions;
use crate::params::RawParams;
use crate::sort::{SortClause, SortSpecParser};
use crate::types::FilterMap;

/// Parses request parameters against a fixed configuration.
///
/// Holds no per-request state, so one instance can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct QueryInterface {
    config: QueryConfig,
}

impl QueryInterface {
    /// Create an interface for `config`.
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Request parameters without reserved keys.
    pub fn only_filtering(&self, params: &RawParams) -> RawParams {
        self.config.reserved.strip(params)
    }

    /// Merged filters for the request.
    ///
    /// Default filters apply unless the request carries
    /// `disable_default_filters` (with any value).
    pub fn filtering_options(&self, params: &RawParams) -> Result<FilterMap, FilterError> {
        let filtering = self.only_filtering(params);
        let empty = FilterMap::new();
        let defaults = if params.contains_key(DISABLE_DEFAULT_FILTERS) {
            debug!("default filters disabled by request");
            &empty
        } else {
            &self.config.default_filters
        };

        let ctx = ParseContext::new(&self.config.filter_renames, &filtering, self.config.decode);
        FilterCollection::new(&filtering, defaults, &ctx)?.parse()
    }

    /// Sort clauses for the request.
    pub fn sorting_options(&self, params: &RawParams) -> Vec<SortClause> {
        SortSpecParser::new(&self.config.default_sort, &self.config.sort_renames).parse(params)
    }

    /// Pagination for the request.
    pub fn pagination_options(&self, params: &RawParams) -> PaginationOptions {
        self.config.pagination.resolve(params)
    }

    /// Field projection for the request, if any.
    pub fn field_filtering_options(&self, params: &RawParams) -> Option<FieldProjection> {
        FieldProjection::from_params(params)
    }

    /// All options for the request, with sort clauses rendered.
    pub fn parse_request(&self, params: &RawParams) -> Result<QueryOptions, FilterError> {
        Ok(QueryOptions {
            filters: self.filtering_options(params)?,
            sort: self
                .sorting_options(params)
                .iter()
                .map(|clause| clause.render(self.config.sort_representation))
                .collect(),
            pagination: self.pagination_options(params),
            fields: self.field_filtering_options(params),
        })
    }
}
