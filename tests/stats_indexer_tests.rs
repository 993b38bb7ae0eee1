use dorling_rs::DorlingError;
use dorling_rs::core::stats::{
    IndexedIndicator, IndicatorMap, IndicatorRequest, StatResponse, StatisticalIndexer,
    country_totals, percentage_of,
};

fn response(entries: &[(&str, Option<f64>)]) -> StatResponse {
    StatResponse::from_entries(entries.iter().map(|(id, value)| (*id, *value)))
}

#[test]
fn country_totals_group_by_two_letter_prefix() {
    let sizes: IndicatorMap = [("FR1", Some(10.0)), ("FR2", Some(20.0)), ("DE1", Some(5.0))]
        .into_iter()
        .collect();

    let totals = country_totals(&sizes);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals.get("FR"), Some(30.0));
    assert_eq!(totals.get("DE"), Some(5.0));
    assert_eq!(totals.get("IT"), None);
}

#[test]
fn country_totals_count_missing_values_as_zero() {
    let sizes: IndicatorMap = [("FR1", Some(10.0)), ("FR2", None), ("PL9", None)]
        .into_iter()
        .collect();

    let totals = country_totals(&sizes);
    assert_eq!(totals.get("FR"), Some(10.0));
    assert_eq!(totals.get("PL"), Some(0.0));
}

#[test]
fn percentage_join_divides_by_matching_total() {
    let values: IndicatorMap = [("A1", Some(50.0))].into_iter().collect();
    let totals: IndicatorMap = [("A1", Some(200.0))].into_iter().collect();

    let joined = percentage_of(&values, &totals);
    let share = joined.get("A1").expect("percentage");
    assert!((share - 25.0).abs() <= 1e-12);
}

#[test]
fn percentage_join_with_zero_total_is_missing() {
    let values: IndicatorMap = [("A1", Some(50.0))].into_iter().collect();
    let totals: IndicatorMap = [("A1", Some(0.0))].into_iter().collect();

    let joined = percentage_of(&values, &totals);
    assert!(joined.contains("A1"));
    assert_eq!(joined.get("A1"), None);
}

#[test]
fn percentage_join_tolerates_different_membership_and_order() {
    let values: IndicatorMap = [("B2", Some(3.0)), ("A1", Some(50.0)), ("C3", None)]
        .into_iter()
        .collect();
    let totals: IndicatorMap = [("Z9", Some(10.0)), ("A1", Some(100.0)), ("C3", Some(4.0))]
        .into_iter()
        .collect();

    let joined = percentage_of(&values, &totals);
    let ids: Vec<&str> = joined.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["B2", "A1", "C3"]);
    assert_eq!(joined.get("A1"), Some(50.0));
    assert_eq!(joined.get("B2"), None);
    assert_eq!(joined.get("C3"), None);
    assert!(!joined.contains("Z9"));
}

#[test]
fn size_index_computes_totals_before_exclusions() {
    let indexer = StatisticalIndexer::default().with_excluded_countries(vec!["CH".to_owned()]);
    let size = response(&[
        ("FR10", Some(12.0)),
        ("FR20", Some(8.0)),
        ("CH01", Some(7.0)),
        ("EU27_2020", Some(400.0)),
        ("DE30", None),
    ]);

    let IndexedIndicator::Size {
        values,
        country_totals,
    } = indexer.index(IndicatorRequest::Size(&size))
    else {
        panic!("size request yields size indicator");
    };

    assert_eq!(values.len(), 3);
    assert_eq!(values.get("FR10"), Some(12.0));
    assert!(values.contains("DE30"));
    assert!(!values.contains("CH01"));
    assert!(!values.contains("EU27_2020"));

    assert_eq!(country_totals.get("FR"), Some(20.0));
    assert_eq!(country_totals.get("CH"), Some(7.0));
    assert_eq!(country_totals.get("EU"), Some(400.0));
}

#[test]
fn color_index_is_not_filtered_by_exclusions() {
    let indexer = StatisticalIndexer::default().with_excluded_countries(vec!["CH".to_owned()]);
    let color = response(&[("CH01", Some(1.5)), ("EU28", Some(2.0))]);

    let indexed = indexer.index(IndicatorRequest::Color {
        values: &color,
        percentage_of: None,
    });
    assert_eq!(indexed.values().get("CH01"), Some(1.5));
    assert_eq!(indexed.values().get("EU28"), Some(2.0));
}

#[test]
fn color_index_applies_percentage_join() {
    let indexer = StatisticalIndexer::default();
    let values = response(&[("A1", Some(50.0)), ("A2", Some(10.0))]);
    let totals = response(&[("A2", Some(0.0)), ("A1", Some(200.0))]);

    let indexed = indexer.index(IndicatorRequest::Color {
        values: &values,
        percentage_of: Some(&totals),
    });
    assert_eq!(indexed.values().get("A1"), Some(25.0));
    assert_eq!(indexed.values().get("A2"), None);
}

#[test]
fn parses_sparse_json_stat_with_string_numbers_and_zero() {
    let json = r#"{
        "version": "2.0",
        "dimension": {
            "time": { "category": { "index": { "2018": 0 } } },
            "geo": {
                "category": {
                    "index": { "AT11": 0, "BE10": 1, "CZ01": 2 },
                    "label": { "AT11": "Burgenland" }
                }
            }
        },
        "value": { "0": 12.5, "2": "0" }
    }"#;

    let response = StatResponse::from_json_str(json).expect("valid response");
    let indicator = StatisticalIndexer::index_response(&response);

    assert_eq!(indicator.get("AT11"), Some(12.5));
    assert!(indicator.contains("BE10"));
    assert!(!indicator.has_value("BE10"));
    assert_eq!(indicator.get("CZ01"), Some(0.0));
    assert_eq!(
        response.region_labels().get("AT11").map(String::as_str),
        Some("Burgenland")
    );
    assert_eq!(indicator.extent(), Some((0.0, 12.5)));
}

#[test]
fn non_numeric_values_become_missing() {
    let json = r#"{
        "dimension": { "geo": { "category": { "index": { "A1": 0, "A2": 1, "A3": 2 } } } },
        "value": { "0": ":", "1": null, "2": true }
    }"#;

    let response = StatResponse::from_json_str(json).expect("valid response");
    let indicator = StatisticalIndexer::index_response(&response);
    assert_eq!(indicator.len(), 3);
    assert!(indicator.iter().all(|(_, value)| value.is_none()));
    assert_eq!(indicator.extent(), None);
}

#[test]
fn missing_geo_dimension_is_a_data_format_error() {
    let json = r#"{ "dimension": { "time": {} }, "value": {} }"#;
    let err = StatResponse::from_json_str(json).expect_err("malformed response");
    assert!(matches!(err, DorlingError::DataFormat(_)));

    let err = StatResponse::from_json_str("not json").expect_err("not json");
    assert!(matches!(err, DorlingError::DataFormat(_)));
}

#[test]
fn aggregate_markers_are_configurable() {
    let indexer = StatisticalIndexer::new(Vec::new(), vec!["EA".to_owned()]);
    let size = response(&[("EA19", Some(1.0)), ("EU28", Some(2.0)), ("FR1", Some(3.0))]);

    let indexed = indexer.index(IndicatorRequest::Size(&size));
    let values = indexed.values();
    assert!(!values.contains("EA19"));
    assert!(values.contains("EU28"));
    assert!(values.contains("FR1"));
}
