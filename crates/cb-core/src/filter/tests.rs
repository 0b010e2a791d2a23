use super::*;
use approx::assert_abs_diff_eq;

// ==================== Test Fixtures ====================

fn listings() -> DataFrame {
    DataFrame::from_columns(vec![
        (
            "make",
            Series::string(&["ford", "ford", "toyota", "honda", "toyota", "ford"]),
        ),
        (
            "model",
            Series::string(&["f-150", "focus", "camry", "civic", "tacoma", "f-150"]),
        ),
        (
            "year",
            Series::float(vec![2015.0, 2012.0, 2018.0, 2010.0, 2015.0, 2019.0]),
        ),
        (
            "price",
            Series::float(vec![21000.0, 6000.0, 18000.0, 5000.0, 26000.0, 250000.0]),
        ),
        (
            "odometer",
            Series::float(vec![90000.0, 120000.0, 40000.0, 150000.0, 70000.0, 20000.0]),
        ),
        (
            "condition",
            Series::optional_string(vec![
                Some("good".to_string()),
                None,
                Some("excellent".to_string()),
                Some("fair".to_string()),
                Some("good".to_string()),
                Some("new".to_string()),
            ]),
        ),
    ])
    .unwrap()
}

fn brute_force(df: &DataFrame, spec: &FilterSpec) -> Vec<usize> {
    (0..df.nrows())
        .filter(|&i| {
            spec.iter().all(|(column, constraint)| {
                let series = df.column(column).unwrap();
                match constraint {
                    Constraint::OneOf(values) => {
                        values.is_empty()
                            || series.label(i).map_or(false, |l| values.contains(&l))
                    }
                    Constraint::Range { min, max } => match series.get_f64(i) {
                        Some(v) => min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m),
                        None => min.is_none() && max.is_none(),
                    },
                }
            })
        })
        .collect()
}

// ==================== Filter Spec Tests ====================

#[test]
fn test_empty_spec_is_identity() {
    let df = listings();
    let filtered = FilterEngine::apply(&df, &FilterSpec::new(), &OutlierPolicy::None).unwrap();
    assert_eq!(filtered, df);
}

#[test]
fn test_empty_selection_is_unconstrained() {
    let df = listings();
    let spec = FilterSpec::new().one_of("make", Vec::<String>::new());
    let filtered = FilterEngine::apply(&df, &spec, &OutlierPolicy::None).unwrap();
    assert_eq!(filtered.nrows(), df.nrows());
}

#[test]
fn test_unset_selector_on_absent_column_is_skipped() {
    // the frame has no state column; an empty selection for it must not fail
    let df = listings();
    let spec = FilterSpec::new()
        .one_of("make", ["ford"])
        .one_of("state", Vec::<String>::new())
        .range("latitude", None, None);
    let filtered = FilterEngine::apply(&df, &spec, &OutlierPolicy::None).unwrap();
    assert_eq!(filtered.nrows(), 3);
}

#[test]
fn test_filters_are_sound_and_complete() {
    let df = listings();
    let specs = vec![
        FilterSpec::new().one_of("make", ["ford"]),
        FilterSpec::new()
            .one_of("make", ["ford", "toyota"])
            .range("year", Some(2015.0), None),
        FilterSpec::new().range("odometer", Some(50000.0), Some(120000.0)),
        FilterSpec::new().one_of("year", ["2015"]),
        FilterSpec::new()
            .one_of("condition", ["good", "fair"])
            .range("price", None, Some(20000.0)),
    ];

    for spec in &specs {
        let expected = brute_force(&df, spec);
        let filtered = FilterEngine::apply(&df, spec, &OutlierPolicy::None).unwrap();
        assert_eq!(filtered, df.take(&expected).unwrap(), "spec {:?}", spec);
    }
}

#[test]
fn test_numeric_membership_uses_text_form() {
    let df = listings();
    let spec = FilterSpec::new().one_of("year", ["2015", "2018"]);
    let filtered = FilterEngine::apply(&df, &spec, &OutlierPolicy::None).unwrap();
    assert_eq!(
        filtered.column("model").unwrap(),
        &Series::string(&["f-150", "camry", "tacoma"])
    );
}

#[test]
fn test_missing_values_never_match() {
    let df = listings();
    let spec = FilterSpec::new().one_of("condition", ["good", "excellent", "fair", "new"]);
    let filtered = FilterEngine::apply(&df, &spec, &OutlierPolicy::None).unwrap();
    assert_eq!(filtered.nrows(), 5);
}

#[test]
fn test_unknown_column() {
    let spec = FilterSpec::new().one_of("trim", ["xlt"]);
    let err = FilterEngine::apply(&listings(), &spec, &OutlierPolicy::None).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Data(DataError::ColumnNotFound(ref c)) if c == "trim"
    ));
}

#[test]
fn test_range_on_text_column() {
    let spec = FilterSpec::new().range("make", Some(1.0), None);
    let err = FilterEngine::apply(&listings(), &spec, &OutlierPolicy::None).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Data(DataError::TypeMismatch { .. })
    ));
    assert!(!err.is_fatal());
}

#[test]
fn test_no_surviving_rows() {
    let spec = FilterSpec::new().one_of("make", ["lada"]);
    let err = FilterEngine::apply(&listings(), &spec, &OutlierPolicy::None).unwrap_err();
    assert!(matches!(err, CoreError::EmptyFilterResult));
}

#[test]
fn test_input_is_not_mutated() {
    let df = listings();
    let before = df.clone();
    let spec = FilterSpec::new().one_of("make", ["honda"]);
    let _ = FilterEngine::apply(&df, &spec, &OutlierPolicy::price_iqr()).unwrap();
    assert_eq!(df, before);
}

// ==================== Outlier Policy Tests ====================

#[test]
fn test_iqr_excludes_extreme_value() {
    let df = DataFrame::from_columns(vec![(
        "price",
        Series::float(vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]),
    )])
    .unwrap();

    let policy = OutlierPolicy::iqr("price", 1.5);
    let (lo, hi) = policy.bounds(df.column("price").unwrap()).unwrap().unwrap();
    assert_abs_diff_eq!(lo, -1.5, epsilon = 1e-12);
    assert_abs_diff_eq!(hi, 8.5, epsilon = 1e-12);

    let filtered = FilterEngine::apply(&df, &FilterSpec::new(), &policy).unwrap();
    assert_eq!(
        filtered.float_column("price").unwrap().to_vec(),
        vec![1.0, 2.0, 3.0, 4.0, 5.0]
    );
}

#[test]
fn test_threshold_policy() {
    let df = listings();
    let filtered =
        FilterEngine::apply(&df, &FilterSpec::new(), &OutlierPolicy::price_threshold(100_000.0))
            .unwrap();
    assert_eq!(filtered.nrows(), 5);
    assert!(filtered
        .float_column("price")
        .unwrap()
        .iter()
        .all(|&p| p <= 100_000.0));
}

#[test]
fn test_std_dev_policy() {
    let df = DataFrame::from_columns(vec![(
        "price",
        Series::float(vec![10.0, 12.0, 11.0, 9.0, 10.0, 11.0, 12.0, 9.0, 10.0, 60.0]),
    )])
    .unwrap();

    let policy = OutlierPolicy::std_dev("price", 2.0);
    let filtered = FilterEngine::apply(&df, &FilterSpec::new(), &policy).unwrap();
    assert_eq!(filtered.nrows(), 9);
    assert!(filtered.float_column("price").unwrap().iter().all(|&p| p < 60.0));
}

#[test]
fn test_outliers_applied_before_filters() {
    // The IQR band is computed over all rows, not just the selected make
    let df = listings();
    let spec = FilterSpec::new().one_of("make", ["ford"]);
    let filtered = FilterEngine::apply(&df, &spec, &OutlierPolicy::price_iqr()).unwrap();
    assert_eq!(
        filtered.float_column("price").unwrap().to_vec(),
        vec![21000.0, 6000.0]
    );
}

#[test]
fn test_none_policy_has_no_bounds() {
    let df = listings();
    assert_eq!(
        OutlierPolicy::None.bounds(df.column("price").unwrap()).unwrap(),
        None
    );
}

#[test]
fn test_policy_on_text_column() {
    let df = listings();
    let err = OutlierPolicy::iqr("make", 1.5)
        .bounds(df.column("make").unwrap())
        .unwrap_err();
    assert!(matches!(err, CoreError::Data(DataError::TypeMismatch { .. })));
}

#[test]
fn test_invalid_policy_parameters() {
    let df = listings();
    for policy in [
        OutlierPolicy::iqr("price", -1.5),
        OutlierPolicy::iqr("price", f64::NAN),
        OutlierPolicy::std_dev("price", f64::INFINITY),
        OutlierPolicy::price_threshold(f64::NAN),
    ] {
        let err = FilterEngine::apply(&df, &FilterSpec::new(), &policy).unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidOutlierPolicy(_)),
            "{:?} gave {:?}",
            policy,
            err
        );
        assert!(!err.is_fatal());
    }

    // a zero multiplier is a valid, if narrow, band
    assert!(OutlierPolicy::std_dev("price", 0.0).validate().is_ok());
}

#[test]
fn test_policy_deserializes_from_json() {
    let policy: OutlierPolicy =
        serde_json::from_str(r#"{ "kind": "threshold", "column": "price", "max": 1000000 }"#)
            .unwrap();
    assert_eq!(policy, OutlierPolicy::price_threshold(1_000_000.0));
}

// ==================== Facet Tests ====================

#[test]
fn test_facet_options_cascade() {
    let df = listings();
    let spec = FilterSpec::new().one_of("make", ["ford"]);
    let options = FilterEngine::facet_options(&df, &spec, &["make", "model", "year"]).unwrap();

    // the make dropdown still offers every make
    assert_eq!(options["make"], vec!["ford", "honda", "toyota"]);
    assert_eq!(options["model"], vec!["f-150", "focus"]);
    assert_eq!(options["year"], vec!["2012", "2015", "2019"]);
}

#[test]
fn test_facet_options_absent_column_has_no_options() {
    let options =
        FilterEngine::facet_options(&listings(), &FilterSpec::new(), &["make", "state"]).unwrap();
    assert_eq!(options["make"], vec!["ford", "honda", "toyota"]);
    assert!(options["state"].is_empty());
}

#[test]
fn test_facet_options_constraint_on_unknown_column() {
    let spec = FilterSpec::new().one_of("trim", ["xlt"]);
    let err = FilterEngine::facet_options(&listings(), &spec, &["make"]).unwrap_err();
    assert!(matches!(err, CoreError::Data(DataError::ColumnNotFound(_))));
}
