//! Property tests for the plugin-output codec and threshold ranges.

use ck_core::result::{build_plugin_output, parse_plugin_output};
use ck_core::threshold::Range;
use ck_core::CheckMetric;
use proptest::prelude::*;

fn range_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..1000).prop_map(|n| n.to_string()),
        (0i64..1000).prop_map(|n| format!("{n}:")),
        (-100i64..100, 0i64..100).prop_map(|(a, len)| format!("{}:{}", a, a + len)),
        (0i64..100).prop_map(|n| format!("~:{n}")),
        (0i64..100).prop_map(|n| format!("@{n}")),
    ]
}

fn metric_strategy() -> impl Strategy<Value = CheckMetric> {
    (
        "[a-zA-Z0-9_' ]{0,11}[a-zA-Z0-9_]",
        -100_000i64..100_000,
        prop_oneof![
            Just(""),
            Just("s"),
            Just("ms"),
            Just("B"),
            Just("KB"),
            Just("%"),
            Just("c")
        ],
        proptest::option::of(range_text_strategy()),
        proptest::option::of(range_text_strategy()),
        proptest::option::of(-1000i64..0),
        proptest::option::of(0i64..1_000_000),
    )
        .prop_map(|(name, value, unit, warn, crit, min, max)| {
            let mut metric = CheckMetric::new(name, value).with_unit(unit);
            metric.warning = warn;
            metric.critical = crit;
            metric.min = min.map(|v| v as f64);
            metric.max = max.map(|v| v as f64);
            metric
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn build_then_parse_recovers_output_and_metrics(
        output in "[A-Za-z0-9 .,:=-]{0,40}",
        metrics in proptest::collection::vec(metric_strategy(), 0..6),
    ) {
        let text = build_plugin_output(&output, &metrics);
        let (parsed_output, parsed_metrics) = parse_plugin_output(&text);

        prop_assert_eq!(parsed_output.as_str(), output.trim());
        prop_assert_eq!(&parsed_metrics, &metrics, "text was {:?}", text);
        prop_assert_eq!(build_plugin_output(&parsed_output, &parsed_metrics), text);
    }

    #[test]
    fn parse_never_panics(raw in "\\PC{0,80}") {
        let (output, metrics) = parse_plugin_output(&raw);
        prop_assert!(output.len() <= raw.len());
        for metric in metrics {
            prop_assert!(!metric.fragment().is_empty());
        }
    }

    #[test]
    fn range_alerts_inside_and_negated_range_outside(
        start in -1000i64..1000,
        len in 0i64..1000,
        value in -3000i64..3000,
    ) {
        let end = start + len;
        let range = Range::parse(&format!("{start}:{end}")).unwrap().unwrap();
        let inside = start <= value && value <= end;
        prop_assert_eq!(range.breached(value as f64), inside);

        let negated = Range::parse(&format!("@{start}:{end}")).unwrap().unwrap();
        prop_assert_eq!(negated.breached(value as f64), !inside);
    }

    #[test]
    fn open_ended_ranges(bound in -1000i64..1000, value in -3000i64..3000) {
        let from = Range::parse(&format!("{bound}:")).unwrap().unwrap();
        prop_assert_eq!(from.breached(value as f64), value >= bound);

        let up_to = Range::parse(&format!("~:{bound}")).unwrap().unwrap();
        prop_assert_eq!(up_to.breached(value as f64), value <= bound);
    }

    #[test]
    fn bare_number_is_zero_based(end in 0i64..10_000, value in -100i64..20_000) {
        let bare = Range::parse(&end.to_string()).unwrap().unwrap();
        let explicit = Range::parse(&format!("0:{end}")).unwrap().unwrap();
        prop_assert_eq!(bare.breached(value as f64), explicit.breached(value as f64));
    }

    #[test]
    fn reversed_bounds_are_rejected(start in 1i64..1000, gap in 1i64..1000) {
        let text = format!("{}:{}", start, start - gap);
        prop_assert!(Range::parse(&text).is_err());
    }
}
