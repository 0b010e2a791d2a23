use std::io::Write;

use super::*;
use crate::data::SeriesValue;

const LISTINGS_CSV: &str = "\
make,model,year,odometer,price,type,cylinders,latitude,longitude
ford,f-150,2014,\"120,000\",$18500,truck,8,46.87,-110.36
toyota,camry,2018,45000,21000,sedan,4,,
honda,civic,2011,,7000,sedan,4,45.68,-111.04
subaru,outback,2016,88000,n/a,wagon,4,47.50,-111.30
jeep,wrangler,2009,150000,0,SUV,6,46.59,-112.03
chevrolet,silverado,2017,60000,30500,pickup,other,48.20,-114.31
";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_load_csv_cleans_rows() {
    init_logging();
    let df = load_csv_reader(LISTINGS_CSV.as_bytes(), &LoaderConfig::default()).unwrap();

    // Missing odometer, unparseable price and zero price are dropped
    assert_eq!(df.nrows(), 3);
    assert_eq!(
        df.column("make").unwrap(),
        &Series::string(&["ford", "toyota", "chevrolet"])
    );
    assert_eq!(
        df.float_column("odometer").unwrap().to_vec(),
        vec![120000.0, 45000.0, 60000.0]
    );
    assert_eq!(
        df.float_column("price").unwrap().to_vec(),
        vec![18500.0, 21000.0, 30500.0]
    );
}

#[test]
fn test_load_csv_renames_reserved_columns() {
    let df = load_csv_reader(LISTINGS_CSV.as_bytes(), &LoaderConfig::default()).unwrap();

    assert!(!df.has_column("type"));
    assert_eq!(
        df.column("vehicle_type").unwrap().get(0),
        Some(SeriesValue::String("truck".to_string()))
    );
}

#[test]
fn test_load_csv_column_types() {
    let df = load_csv_reader(LISTINGS_CSV.as_bytes(), &LoaderConfig::default()).unwrap();

    // Cylinders stay text, coordinates are numeric with blanks as missing
    assert_eq!(df.column("cylinders").unwrap().dtype(), "string");
    let latitude = df.column("latitude").unwrap();
    assert_eq!(latitude.dtype(), "float64");
    assert!(latitude.is_missing(1));
    assert_eq!(latitude.get_f64(0), Some(46.87));
}

#[test]
fn test_missing_required_column() {
    let csv = "make,model,odometer,price\nford,f-150,1000,2000\n";
    let err = load_csv_reader(csv.as_bytes(), &LoaderConfig::default()).unwrap_err();

    match &err {
        CoreError::DataUnavailable { reason, .. } => assert!(reason.contains("'year'")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_fatal());
}

#[test]
fn test_optional_columns_may_be_absent() {
    let csv = "make,model,year,odometer,price\nford,focus,2012,90000,5500\n";
    let df = load_csv_reader(csv.as_bytes(), &LoaderConfig::default()).unwrap();
    assert_eq!(df.shape(), (1, 5));
}

#[test]
fn test_load_missing_file() {
    let err = load("/definitely/not/here/listings.csv", &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, CoreError::DataUnavailable { .. }));
}

#[test]
fn test_load_unsupported_extension() {
    let err = load("listings.xlsx", &LoaderConfig::default()).unwrap_err();
    match err {
        CoreError::DataUnavailable { reason, .. } => assert!(reason.contains(".xlsx")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_load_csv_file_is_idempotent() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(LISTINGS_CSV.as_bytes()).unwrap();

    let first = load(file.path(), &LoaderConfig::default()).unwrap();
    let second = load(file.path(), &LoaderConfig::default()).unwrap();
    // the reload carries the same gaps, which must not break equality
    assert!(first.column("latitude").unwrap().missing_count() > 0);
    assert_eq!(first, second);
    assert_eq!(first.nrows(), 3);
}

#[test]
fn test_load_json_records() {
    let json = r#"[
        {"make": "ford", "model": "ranger", "year": 2019, "odometer": 30000, "price": 26000, "cylinders": 4},
        {"make": "ram", "model": "1500", "year": 2015, "odometer": null, "price": 19000},
        {"make": "gmc", "model": "sierra", "year": 2013, "odometer": "98,500", "price": "$15,250", "type": "pickup"}
    ]"#;

    let df = load_json_str(json, &LoaderConfig::default()).unwrap();
    assert_eq!(df.nrows(), 2);
    assert_eq!(df.float_column("price").unwrap().to_vec(), vec![26000.0, 15250.0]);
    assert_eq!(df.column("cylinders").unwrap().label(0).as_deref(), Some("4"));
    assert!(df.column("cylinders").unwrap().is_missing(1));
    assert_eq!(df.column("vehicle_type").unwrap().label(1).as_deref(), Some("pickup"));
}

#[test]
fn test_load_json_rejects_non_array() {
    let err = load_json_str(r#"{"make": "ford"}"#, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, CoreError::DataUnavailable { .. }));
}

#[test]
fn test_parse_number() {
    assert_eq!(parse_number("12,500"), 12500.0);
    assert_eq!(parse_number(" $9,999.50 "), 9999.5);
    assert!(parse_number("call for price").is_nan());
    assert!(parse_number("inf").is_nan());
    assert!(parse_number("").is_nan());
}
