use std::time::Duration;

use approx::assert_relative_eq;
use dorling_rs::api::{AnimationBehavior, DatasetSelection, DorlingConfig};
use dorling_rs::core::{ColorScaleConfig, ColorScheme};
use dorling_rs::simulation::ForceConfig;
use dorling_rs::DorlingError;

#[test]
fn defaults_follow_the_reference_setup() {
    let config = DorlingConfig::new();
    config.validate().expect("defaults are valid");

    assert_eq!(config.nuts_level, 2);
    assert_relative_eq!(config.circle_exaggeration_factor, 1.2);
    assert_relative_eq!(config.force.position_strength, 0.1);
    assert_relative_eq!(config.force.collision_strength, 0.7);
    assert_relative_eq!(config.force.collision_padding, 0.1);
    assert_eq!(config.animation.dwell(), Duration::from_secs(2));
    assert_eq!(config.animation.fade_in(), Duration::from_millis(1_000));
    assert_eq!(config.animation.fade_out(), Duration::from_millis(500));
    assert!(config.animation.autoplay);
    assert!(config.animation.loop_animation);
    assert_eq!(config.color_scale.scheme, ColorScheme::RdYlBu);
    assert_eq!(config.aggregate_markers, vec!["EU".to_owned()]);
    assert!(!config.is_color_percentage());
}

#[test]
fn default_alpha_decay_cools_to_alpha_min_in_three_hundred_ticks() {
    let force = ForceConfig::default();
    let alpha = (1.0 - force.alpha_decay).powi(300);
    assert_relative_eq!(alpha, force.alpha_min, max_relative = 1e-9);
}

#[test]
fn query_urls_follow_the_statistics_api_layout() {
    let config = DorlingConfig::new();
    assert_eq!(
        config.size_query_url(),
        "https://ec.europa.eu/eurostat/wdds/rest/data/v2.1/json/en/demo_r_pjangrp3?geoLevel=nuts2&sex=T&age=TOTAL&unit=NR&time=2018"
    );

    let country_level = config
        .with_nuts_level(0)
        .with_statistics_base_url("http://localhost/")
        .with_color_dataset(DatasetSelection::new("tgs00026", ""));
    assert_eq!(
        country_level.color_query_url(),
        "http://localhost/tgs00026?geoLevel=country"
    );
    assert_eq!(country_level.color_percentage_query_url(), None);
}

#[test]
fn empty_json_object_yields_defaults() {
    let config = DorlingConfig::from_json_str("{}").expect("defaults");
    assert_eq!(config.nuts_level, 2);
    assert_eq!(config.size_dataset.code, "demo_r_pjangrp3");
    assert_eq!(config.color_dataset.code, "demo_r_gind3");
    assert_eq!(config.animation, AnimationBehavior::default());
    assert_eq!(config.force.max_ticks, ForceConfig::default().max_ticks);
}

#[test]
fn json_round_trip_preserves_settings() {
    let config = DorlingConfig::new()
        .with_nuts_level(3)
        .with_exclude(vec!["TR".to_owned(), "IS".to_owned()])
        .with_color_percentage_dataset(Some(DatasetSelection::new("demo_r_pjanaggr3", "time=2018")))
        .with_loop(false)
        .with_dwell(Duration::from_millis(3_500))
        .with_color_scale(ColorScaleConfig::default().with_scheme(ColorScheme::PiYG));

    let json = config.to_json_pretty().expect("serialize");
    let restored = DorlingConfig::from_json_str(&json).expect("parse");

    assert_eq!(restored.nuts_level, 3);
    assert_eq!(restored.exclude, config.exclude);
    assert_eq!(restored.color_percentage_dataset, config.color_percentage_dataset);
    assert!(!restored.animation.loop_animation);
    assert_eq!(restored.animation.dwell_ms, 3_500);
    assert_eq!(restored.color_scale.scheme, ColorScheme::PiYG);
    assert_relative_eq!(restored.force.alpha_decay, config.force.alpha_decay, max_relative = 1e-12);
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let config = DorlingConfig::from_json_str(
        r##"{
            "nuts_level": 1,
            "force": { "collision_strength": 0.9 },
            "color_scale": { "scheme": "interpolateBrBG", "colors": ["#000", "#fff"], "thresholds": [0] },
            "animation": { "autoplay": false }
        }"##,
    )
    .expect("partial config");

    assert_eq!(config.nuts_level, 1);
    assert_relative_eq!(config.force.collision_strength, 0.9);
    assert_relative_eq!(config.force.position_strength, 0.1);
    assert_eq!(config.color_scale.scheme, ColorScheme::BrBG);
    assert!(!config.animation.autoplay);
    assert!(config.animation.loop_animation);
}

#[test]
fn invalid_settings_are_rejected() {
    let cases = [
        DorlingConfig::new().with_nuts_level(4),
        DorlingConfig::new().with_circle_exaggeration_factor(0.0),
        DorlingConfig::new().with_position_strength(1.5),
        DorlingConfig::new().with_collision_strength(f64::NAN),
        DorlingConfig::new().with_collision_padding(-1.0),
        DorlingConfig::new().with_size_dataset(DatasetSelection::new(" ", "")),
        DorlingConfig::new().with_exclude(vec![String::new()]),
        DorlingConfig::new().with_color_scale(ColorScaleConfig::default().with_colors(Some(Vec::new()))),
    ];

    for config in cases {
        let err = config.validate().expect_err("invalid config");
        assert!(matches!(err, DorlingError::InvalidConfig(_)), "{err}");
    }
}

#[test]
fn invalid_json_is_a_config_error() {
    let err = DorlingConfig::from_json_str("{ \"nuts_level\": \"two\" }").expect_err("bad json");
    assert!(matches!(err, DorlingError::InvalidConfig(_)));

    let err = DorlingConfig::from_json_str("{ \"nuts_level\": 9 }").expect_err("bad level");
    assert!(matches!(err, DorlingError::InvalidConfig(_)));
}
