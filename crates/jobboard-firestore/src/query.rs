//! Structured-query building for job search.

use jobboard_models::SearchFilter;

use crate::types::{CollectionSelector, FieldOperator, Filter, StructuredQuery, Value};

/// Translate a search filter into a Firestore structured query.
///
/// The keyword becomes a `title` range `[keyword, keyword + U+F8FF)`,
/// location and type become equality filters. A single filter is sent on
/// its own; two or more are wrapped in an AND composite. An empty filter
/// yields an unfiltered query over the collection.
pub fn build_search_query(collection_id: &str, filter: &SearchFilter) -> StructuredQuery {
    let mut filters = Vec::new();

    if let Some((lower, upper)) = filter.title_range() {
        filters.push(Filter::field(
            "title",
            FieldOperator::GreaterThanOrEqual,
            Value::StringValue(lower),
        ));
        filters.push(Filter::field(
            "title",
            FieldOperator::LessThan,
            Value::StringValue(upper),
        ));
    }

    if let Some(location) = &filter.location {
        filters.push(Filter::field(
            "location",
            FieldOperator::Equal,
            Value::StringValue(location.clone()),
        ));
    }

    if let Some(job_type) = &filter.job_type {
        filters.push(Filter::field(
            "type",
            FieldOperator::Equal,
            Value::StringValue(job_type.clone()),
        ));
    }

    let r#where = match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(Filter::and(filters)),
    };

    StructuredQuery {
        from: vec![CollectionSelector {
            collection_id: collection_id.to_string(),
        }],
        r#where,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter(keyword: Option<&str>, location: Option<&str>, job_type: Option<&str>) -> SearchFilter {
        SearchFilter::new(
            keyword.map(str::to_string),
            location.map(str::to_string),
            job_type.map(str::to_string),
        )
    }

    #[test]
    fn test_empty_filter_has_no_where() {
        let query = build_search_query("jobs", &filter(None, Some(""), None));
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, json!({ "from": [{ "collectionId": "jobs" }] }));
    }

    #[test]
    fn test_single_filter_is_not_wrapped() {
        let query = build_search_query("jobs", &filter(None, Some("Remote"), None));
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json["where"],
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": "location" },
                    "op": "EQUAL",
                    "value": { "stringValue": "Remote" }
                }
            })
        );
    }

    #[test]
    fn test_keyword_becomes_title_range() {
        let query = build_search_query("jobs", &filter(Some("Eng"), None, None));
        let json = serde_json::to_value(&query).unwrap();
        let composite = &json["where"]["compositeFilter"];
        assert_eq!(composite["op"], "AND");
        assert_eq!(composite["filters"][0]["fieldFilter"]["op"], "GREATER_THAN_OR_EQUAL");
        assert_eq!(
            composite["filters"][0]["fieldFilter"]["value"]["stringValue"],
            "Eng"
        );
        assert_eq!(composite["filters"][1]["fieldFilter"]["op"], "LESS_THAN");
        assert_eq!(
            composite["filters"][1]["fieldFilter"]["value"]["stringValue"],
            "Eng\u{f8ff}"
        );
    }

    #[test]
    fn test_all_criteria_are_anded() {
        let query = build_search_query(
            "jobs",
            &filter(Some("Back"), Some("Remote"), Some("CONTRACT")),
        );
        let json = serde_json::to_value(&query).unwrap();
        let filters = json["where"]["compositeFilter"]["filters"].as_array().unwrap();
        assert_eq!(filters.len(), 4);
        assert_eq!(filters[3]["fieldFilter"]["field"]["fieldPath"], "type");
    }
}
