#![allow(dead_code)]

use carscope::Dataset;
use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;
use tempfile::TempDir;

pub const STATES: [&str; 12] = [
    "ca", "tx", "fl", "ny", "wa", "oh", "mi", "pa", "il", "nc", "or", "co",
];
pub const MANUFACTURERS: [&str; 5] = ["ford", "toyota", "chevrolet", "honda", "nissan"];
pub const FUELS: [&str; 4] = ["gas", "diesel", "hybrid", "electric"];

/// Rows in the synthetic listing frame.
pub const ROWS: usize = 240;

/// A small cleaned used-car listing frame. Every state's price level is distinct,
/// so ranking by mean price is deterministic.
pub fn used_cars_frame() -> DataFrame {
    let ids: Vec<i64> = (0..ROWS as i64).map(|i| 7_300_000_000 + i).collect();
    let states: Vec<&str> = (0..ROWS).map(|i| STATES[i % STATES.len()]).collect();
    let manufacturers: Vec<&str> = (0..ROWS)
        .map(|i| MANUFACTURERS[(i / 3) % MANUFACTURERS.len()])
        .collect();
    // gas dominates, then diesel, hybrid, electric
    let fuels: Vec<Option<&str>> = (0..ROWS)
        .map(|i| match i % 10 {
            0..=5 => Some(FUELS[0]),
            6 | 7 => Some(FUELS[1]),
            8 => Some(FUELS[2]),
            _ if i % 20 == 9 => None,
            _ => Some(FUELS[3]),
        })
        .collect();
    let prices: Vec<i64> = (0..ROWS)
        .map(|i| 5_000 + (i % STATES.len()) as i64 * 1_500 + (i % 7) as i64 * 100)
        .collect();
    let years: Vec<i32> = (0..ROWS).map(|i| 2005 + (i % 17) as i32).collect();
    let odometer: Vec<f64> = (0..ROWS).map(|i| 10_000.0 + i as f64 * 750.0).collect();
    let lat: Vec<f64> = (0..ROWS).map(|i| 30.0 + (i % 15) as f64).collect();
    let long: Vec<f64> = (0..ROWS).map(|i| -120.0 + (i % 40) as f64).collect();
    let posting_year: Vec<i32> = vec![2021; ROWS];
    let posting_month: Vec<i32> = (0..ROWS).map(|i| 4 + (i % 2) as i32).collect();
    let price_per_mile: Vec<f64> = prices
        .iter()
        .zip(odometer.iter())
        .map(|(p, o)| *p as f64 / o)
        .collect();

    df!(
        "id" => ids,
        "price" => prices,
        "year" => years,
        "manufacturer" => manufacturers,
        "fuel" => fuels,
        "odometer" => odometer,
        "state" => states,
        "lat" => lat,
        "long" => long,
        "posting_year" => posting_year,
        "posting_month" => posting_month,
        "price_per_mile" => price_per_mile
    )
    .unwrap()
}

pub fn used_cars_dataset() -> Dataset {
    Dataset::from_frame(used_cars_frame())
}

/// Write the synthetic frame as parquet in a fresh temp dir.
pub fn write_parquet_fixture() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vehicles_cleaned.parquet");
    let mut df = used_cars_frame();
    let mut file = File::create(&path).unwrap();
    ParquetWriter::new(&mut file).finish(&mut df).unwrap();
    (dir, path)
}

/// Write the synthetic frame as CSV in a fresh temp dir.
pub fn write_csv_fixture() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vehicles_cleaned.csv");
    let mut df = used_cars_frame();
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    (dir, path)
}

/// Mean price per state computed by hand from the frame.
pub fn expected_state_means() -> Vec<(String, f64)> {
    let df = used_cars_frame();
    let states = df.column("state").unwrap().str().unwrap().clone();
    let prices = df.column("price").unwrap().i64().unwrap().clone();
    let mut out: Vec<(String, f64)> = STATES
        .iter()
        .map(|s| {
            let values: Vec<f64> = states
                .iter()
                .zip(prices.iter())
                .filter(|(st, _)| *st == Some(*s))
                .filter_map(|(_, p)| p.map(|p| p as f64))
                .collect();
            (s.to_string(), values.iter().sum::<f64>() / values.len() as f64)
        })
        .collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1));
    out
}
