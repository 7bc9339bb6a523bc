//! End-to-end tests for the request-level interface.
//!
//! These tests drive `QueryInterface` the way an application would: a
//! configuration with default filters, default sort and rename tables, and
//! raw request parameters as they arrive from the query string.

use chrono::{FixedOffset, TimeZone};
use serde_json::json;

use querykit::filter::{AttributeRenames, FilterError};
use querykit::options::PaginationOptions;
use querykit::sort::{SortClause, SortItem};
use querykit::types::{Direction, FilterMap, FilterValue, RegexLiteral};
use querykit::{QueryConfig, QueryInterface, RawParams};

// ============================================================================
// Fixtures
// ============================================================================

/// A document model with defaults and renames.
fn document() -> QueryInterface {
    let mut config = QueryConfig::default();
    config
        .default_filters
        .insert("status".to_string(), FilterValue::from("published"));
    config.default_sort = vec![
        SortItem::from("created_at.desc"),
        SortItem::from("updated_at.asc"),
    ];
    config.filter_renames = AttributeRenames::new().rename("names", "tags");
    config.sort_renames = AttributeRenames::new()
        .rename("fullnames", "tags")
        .rename("updated_at", "updated_at_sortable");
    QueryInterface::new(config)
}

/// A document model with no configuration at all.
fn simple_document() -> QueryInterface {
    QueryInterface::new(QueryConfig::default())
}

fn filters(params: RawParams) -> serde_json::Value {
    let filters = document().filtering_options(&params).unwrap();
    serde_json::to_value(&filters).unwrap()
}

fn utc_midnight(year: i32, month: u32, day: u32) -> FilterValue {
    FilterValue::DateTime(
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(year, month, day, 0, 0, 0)
            .unwrap(),
    )
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_simple_document_defaults() {
    let interface = simple_document();
    let params = RawParams::new();
    assert!(interface.filtering_options(&params).unwrap().is_empty());
    assert!(interface.sorting_options(&params).is_empty());
    assert_eq!(
        interface.pagination_options(&params),
        PaginationOptions { per_page: 12, page: 1 }
    );
    assert_eq!(interface.field_filtering_options(&params), None);
}

#[test]
fn test_default_filters_always_apply() {
    assert_eq!(filters(RawParams::new()), json!({"status": "published"}));
    assert_eq!(
        filters(RawParams::new().with("title", "Some Title")),
        json!({"title": "Some Title", "status": "published"})
    );
}

#[test]
fn test_explicit_filter_overrides_default() {
    assert_eq!(
        filters(RawParams::new().with("title", "Some Title").with("status", "unpublished")),
        json!({"title": "Some Title", "status": "unpublished"})
    );
}

#[test]
fn test_disable_default_filters() {
    let params = RawParams::new()
        .with("tags.all", "flamengo")
        .with("disable_default_filters", FilterValue::Null);
    assert_eq!(filters(params), json!({"tags": {"$all": ["flamengo"]}}));
}

// ============================================================================
// Plain Filters
// ============================================================================

#[test]
fn test_nested_attribute_path() {
    assert_eq!(
        filters(RawParams::new().with("embedded_document.name", "My Name")),
        json!({"embedded_document.name": "My Name", "status": "published"})
    );
}

#[test]
fn test_reserved_parameters_are_ignored() {
    let params = RawParams::new()
        .with("title", "Some Title")
        .with("page", FilterValue::Integer(1))
        .with("per_page", FilterValue::Integer(20))
        .with("order_by", "created_at")
        .with("controller", "documents")
        .with("action", "index")
        .with("format", "json");
    assert_eq!(
        filters(params),
        json!({"title": "Some Title", "status": "published"})
    );
}

#[test]
fn test_values_are_unescaped() {
    assert_eq!(
        filters(RawParams::new().with("title", "Some%20Title")),
        json!({"title": "Some Title", "status": "published"})
    );
}

#[test]
fn test_empty_value_is_accepted() {
    assert_eq!(
        filters(RawParams::new().with("title", "")),
        json!({"title": "", "status": "published"})
    );
}

#[test]
fn test_regex_values() {
    let params = RawParams::new().with("title", "/some title/i");
    let result = document().filtering_options(&params).unwrap();
    assert_eq!(
        result["title"],
        FilterValue::Regex(RegexLiteral::new("some title", "i"))
    );

    let params = RawParams::new().with("title.in", "/ome Tit/");
    assert_eq!(
        filters(params),
        json!({
            "title": {"$in": [{"$regex": "ome Tit", "$options": ""}]},
            "status": "published"
        })
    );
}

#[test]
fn test_booleans_and_nil() {
    let params = RawParams::new()
        .with("some_boolean", "true")
        .with("other_boolean", "false")
        .with("nil_value", "nil");
    assert_eq!(
        filters(params),
        json!({
            "some_boolean": true,
            "other_boolean": false,
            "nil_value": null,
            "status": "published"
        })
    );
}

#[test]
fn test_values_that_are_not_numbers() {
    for value in ["H4", "4H", "4H4", "H4.1", "4.1H", "4.1H4.1"] {
        assert_eq!(
            filters(RawParams::new().with("embedded_document.tags", value)),
            json!({"embedded_document.tags": value, "status": "published"}),
            "{value}"
        );
    }
}

// ============================================================================
// Conditional Operators
// ============================================================================

#[test]
fn test_comparison_operators() {
    assert_eq!(
        filters(RawParams::new().with("title.ne", "Some Other Title")),
        json!({"title": {"$ne": "Some Other Title"}, "status": "published"})
    );
    assert_eq!(
        filters(RawParams::new().with("some_integer.lt", "2")),
        json!({"some_integer": {"$lt": 2}, "status": "published"})
    );
    assert_eq!(
        filters(RawParams::new().with("some_float.lt", "2.1")),
        json!({"some_float": {"$lt": 2.1}, "status": "published"})
    );
}

#[test]
fn test_date_ranges_on_same_attribute() {
    let params = RawParams::new()
        .with("created_at.gt", "2010-01-01")
        .with("created_at.lt", "2010-02-15");
    let result = document().filtering_options(&params).unwrap();
    let created_at = result["created_at"].as_map().unwrap();
    assert_eq!(created_at["$gt"], utc_midnight(2010, 1, 1));
    assert_eq!(created_at["$lt"], utc_midnight(2010, 2, 15));
}

#[test]
fn test_array_operators() {
    assert_eq!(
        filters(RawParams::new().with("tags.all", "basquete|futebol")),
        json!({"tags": {"$all": ["basquete", "futebol"]}, "status": "published"})
    );
    assert_eq!(
        filters(RawParams::new().with("tags.nin", "jabulani")),
        json!({"tags": {"$nin": ["jabulani"]}, "status": "published"})
    );
    assert_eq!(
        filters(RawParams::new().with("some_integer.in", "1")),
        json!({"some_integer": {"$in": [1]}, "status": "published"})
    );
    assert_eq!(
        filters(RawParams::new().with("some_float.in", "1.1")),
        json!({"some_float": {"$in": [1.1]}, "status": "published"})
    );
}

#[test]
fn test_array_operator_with_date() {
    let params = RawParams::new().with("created_at.in", "2010-01-01T00:00:00Z");
    let result = document().filtering_options(&params).unwrap();
    assert_eq!(
        result["created_at"].as_map().unwrap()["$in"],
        FilterValue::List(vec![utc_midnight(2010, 1, 1)])
    );
}

#[test]
fn test_different_operators_on_same_attribute() {
    let params = RawParams::new()
        .with("tags.all", "esportes|basquete")
        .with("tags.nin", "rede globo|esporte espetacular");
    assert_eq!(
        filters(params),
        json!({
            "tags": {
                "$all": ["esportes", "basquete"],
                "$nin": ["rede globo", "esporte espetacular"]
            },
            "status": "published"
        })
    );
}

#[test]
fn test_structured_values_are_verbatim() {
    let params = RawParams::new().with(
        "tags.nin",
        FilterValue::List(vec!["A tag".into(), "Another tag".into()]),
    );
    assert_eq!(
        filters(params),
        json!({"tags": {"$nin": ["A tag", "Another tag"]}, "status": "published"})
    );
}

#[test]
fn test_mixed_arguments_are_rejected() {
    let params = RawParams::new().with("tags.all", "a").with("tags", "b");
    match document().filtering_options(&params) {
        Err(err @ FilterError::MixedArgument { .. }) => assert_eq!(
            err.to_string(),
            "arguments `tags.all` and `tags` could not be mixed"
        ),
        other => panic!("Expected MixedArgument, got {other:?}"),
    }
}

#[test]
fn test_invalid_date_is_rejected() {
    let params = RawParams::new().with("created_at", "2010-02-30");
    assert!(matches!(
        document().filtering_options(&params),
        Err(FilterError::DateTimeParse { .. })
    ));
}

// ============================================================================
// $or Groups
// ============================================================================

#[test]
fn test_or_from_json() {
    let params = RawParams::new().with(
        "or",
        r#"[{"tags.all": "flamengo|basquete"}, {"tags.all": "flamengo|jabulani"}]"#,
    );
    assert_eq!(
        filters(params),
        json!({
            "$or": [
                {"tags": {"$all": ["flamengo", "basquete"]}},
                {"tags": {"$all": ["flamengo", "jabulani"]}}
            ],
            "status": "published"
        })
    );
}

#[test]
fn test_or_json_is_unescaped() {
    let params = RawParams::new().with(
        "or",
        r#"[{"tags.all":%20"flamengo%7Cbasquete"},%20{"tags.all":%20"flamengo%7Cjabulani"}]"#,
    );
    assert_eq!(
        filters(params),
        json!({
            "$or": [
                {"tags": {"$all": ["flamengo", "basquete"]}},
                {"tags": {"$all": ["flamengo", "jabulani"]}}
            ],
            "status": "published"
        })
    );
}

#[test]
fn test_or_accepts_operator_maps() {
    let params = RawParams::new().with(
        "or",
        r#"[{"tags.all": ["flamengo", "basquete"]}, {"tags": {"$all" : ["flamengo", "jabulani"]}}]"#,
    );
    assert_eq!(
        filters(params),
        json!({
            "$or": [
                {"tags": {"$all": ["flamengo", "basquete"]}},
                {"tags": {"$all": ["flamengo", "jabulani"]}}
            ],
            "status": "published"
        })
    );
}

#[test]
fn test_or_with_parse_json_times() {
    let mut config = QueryConfig::default();
    config.decode.parse_json_times = true;
    let params = RawParams::new().with(
        "or",
        r#"[{"created_at.gte": "2010-01-01"}, {"created_at.lt": "2010-02-15"}]"#,
    );
    let result = QueryInterface::new(config).filtering_options(&params).unwrap();
    let branches = result["$or"].as_list().unwrap();
    assert_eq!(
        branches[0].as_map().unwrap()["created_at"].as_map().unwrap()["$gte"],
        utc_midnight(2010, 1, 1)
    );
    assert_eq!(
        branches[1].as_map().unwrap()["created_at"].as_map().unwrap()["$lt"],
        utc_midnight(2010, 2, 15)
    );
}

#[test]
fn test_outside_array_filter_is_merged_into_or() {
    let params = RawParams::new()
        .with("tags.all", "flamengo")
        .with("or", r#"[{"tags.all": ["basquete"]}, {"tags.all" : ["jabulani"]}]"#);
    assert_eq!(
        filters(params),
        json!({
            "$or": [
                {"tags": {"$all": ["basquete", "flamengo"]}},
                {"tags": {"$all": ["jabulani", "flamengo"]}}
            ],
            "status": "published"
        })
    );
}

#[test]
fn test_renames_apply_inside_or() {
    let params = RawParams::new()
        .with("tags.all", "flamengo")
        .with("or", r#"[{"names.all": ["basquete"]}, {"names.all" : ["jabulani"]}]"#);
    assert_eq!(
        filters(params),
        json!({
            "$or": [
                {"tags": {"$all": ["basquete", "flamengo"]}},
                {"tags": {"$all": ["jabulani", "flamengo"]}}
            ],
            "status": "published"
        })
    );
}

#[test]
fn test_invalid_or_payload() {
    for payload in ["not json", r#"{"title": "x"}"#, r#"["title"]"#] {
        let params = RawParams::new().with("or", payload);
        assert!(
            matches!(
                document().filtering_options(&params),
                Err(FilterError::InvalidGroupExpression { .. })
            ),
            "{payload}"
        );
    }
}

// ============================================================================
// Renames and Transforms
// ============================================================================

#[test]
fn test_filter_renames() {
    assert_eq!(
        filters(RawParams::new().with("names", "flamengo")),
        json!({"tags": "flamengo", "status": "published"})
    );
    assert_eq!(
        filters(RawParams::new().with("names.all", "flamengo")),
        json!({"tags": {"$all": ["flamengo"]}, "status": "published"})
    );
}

#[test]
fn test_transform_uses_request_parameters() {
    let mut config = QueryConfig::default();
    config.filter_renames = AttributeRenames::new()
        .transform("names", "tags_downcase", |value, _| match value {
            FilterValue::List(items) => FilterValue::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        FilterValue::String(s) => FilterValue::String(s.to_lowercase()),
                        other => other,
                    })
                    .collect(),
            ),
            other => other,
        })
        .transform("status", "status_for_product", |value, params| {
            let mut by_product = FilterMap::new();
            if let Some(FilterValue::Integer(id)) = params.get("product_id") {
                by_product.insert(id.to_string(), value);
            }
            FilterValue::Map(by_product)
        });
    let interface = QueryInterface::new(config);

    let params = RawParams::new()
        .with("names.all", "Flamengo|Basquete")
        .with("status", "published")
        .with("product_id", FilterValue::Integer(7));
    let result = serde_json::to_value(interface.filtering_options(&params).unwrap()).unwrap();
    assert_eq!(
        result,
        json!({
            "tags_downcase": {"$all": ["flamengo", "basquete"]},
            "status_for_product": {"7": "published"},
            "product_id": 7
        })
    );
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn test_default_sort() {
    assert_eq!(
        document().sorting_options(&RawParams::new()),
        vec![
            SortClause::new("created_at", Direction::Desc),
            SortClause::new("updated_at_sortable", Direction::Asc),
        ]
    );
}

#[test]
fn test_order_by_replaces_default_sort() {
    let params = RawParams::new()
        .with("order_by", "tags.desc|exhibited_at|hits.desc")
        .with("tags.all", "flamengo");
    assert_eq!(
        document().sorting_options(&params),
        vec![
            SortClause::new("tags", Direction::Desc),
            SortClause::new("exhibited_at", Direction::Asc),
            SortClause::new("hits", Direction::Desc),
        ]
    );
}

#[test]
fn test_order_by_list_of_maps() {
    let mut pair = FilterMap::new();
    pair.insert("created_at".to_string(), FilterValue::from("asc"));
    let params = RawParams::new().with("order_by", FilterValue::List(vec![FilterValue::Map(pair)]));
    assert_eq!(
        document().sorting_options(&params),
        vec![SortClause::new("created_at", Direction::Asc)]
    );
}

#[test]
fn test_sort_renames() {
    assert_eq!(
        document().sorting_options(&RawParams::new().with("order_by", "fullnames")),
        vec![SortClause::new("tags", Direction::Asc)]
    );
    assert_eq!(
        document().sorting_options(&RawParams::new().with("order_by", "fullnames.desc")),
        vec![SortClause::new("tags", Direction::Desc)]
    );
}

// ============================================================================
// Pagination and Projection
// ============================================================================

#[test]
fn test_pagination_merges_with_defaults() {
    let params = RawParams::new().with("page", FilterValue::Integer(3));
    assert_eq!(
        document().pagination_options(&params),
        PaginationOptions { per_page: 12, page: 3 }
    );
}

#[test]
fn test_query_string_end_to_end() {
    let params = RawParams::from_query_string(
        "?names.in=a%7Cb&count.gte=1&count.lt=10&order_by=hits.desc&page=2&only=title%7Ctags",
    );
    let options = document().parse_request(&params).unwrap();
    assert_eq!(
        serde_json::to_value(&options).unwrap(),
        json!({
            "filters": {
                "status": "published",
                "tags": {"$in": ["a", "b"]},
                "count": {"$gte": 1, "$lt": 10}
            },
            "sort": [{"hits": "desc"}],
            "pagination": {"per_page": 12, "page": 2},
            "fields": {"only": ["title", "tags"]}
        })
    );
}
