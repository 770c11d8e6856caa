//! The cleaned used-car listings table.
//!
//! Loaded once at startup and never mutated; every page reads from the same
//! [`Dataset`].

use crate::error_display::user_message_from_polars;
use carscope_cli::FileFormat;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Numeric columns that are derived or positional and not useful as a distribution.
pub const EXCLUDED_NUMERIC_COLUMNS: [&str; 9] = [
    "posting_year",
    "lat",
    "long",
    "posting_month",
    "posting_day",
    "posting_weekday",
    "posting_hour",
    "price_per_mile",
    "condition_score",
];

/// Column glossary shown on the Home page, in display order.
pub const COLUMN_DESCRIPTIONS: [(&str, &str); 26] = [
    ("id", "Unique identifier for each listing."),
    ("url", "Full URL of the Craigslist vehicle listing."),
    ("region", "Name of the Craigslist region (city/area) of the listing."),
    ("region_url", "Base URL for the Craigslist region."),
    ("price", "Listing price of the vehicle (USD)."),
    ("year", "Model year of the vehicle."),
    ("manufacturer", "Car manufacturer (e.g., Toyota, Ford, BMW)."),
    ("model", "Vehicle model name given by the seller."),
    (
        "condition",
        "Reported condition of the vehicle (e.g., good, fair, excellent).",
    ),
    (
        "cylinders",
        "Number of engine cylinders, listed as text (e.g., '4 cylinders').",
    ),
    ("fuel", "Fuel type (gas, diesel, electric, hybrid, etc.)."),
    ("odometer", "Mileage of the vehicle in miles."),
    (
        "title_status",
        "Title condition (clean, salvage, rebuilt, lien, etc.).",
    ),
    ("transmission", "Transmission type (automatic, manual, other)."),
    ("VIN", "Vehicle Identification Number, if included."),
    ("drive", "Drivetrain (4wd, fwd, rwd)."),
    ("size", "Vehicle body size (compact, full-size, etc.)."),
    ("type", "Vehicle type (sedan, SUV, pickup, truck, coupe, etc.)."),
    ("paint_color", "Exterior color of the vehicle."),
    ("image_url", "URL of the primary listing image."),
    ("description", "Full text description written by the seller."),
    ("county", "Mostly empty field; county name if available."),
    ("state", "U.S. state where the vehicle is listed."),
    ("lat", "Latitude coordinate of the listing location."),
    ("long", "Longitude coordinate of the listing location."),
    ("posting_date", "Date and time when the listing was posted."),
];

#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Read the dataset from `path`. `format` overrides extension detection.
    pub fn load(path: &Path, format: Option<FileFormat>) -> Result<Self> {
        let format = format
            .or_else(|| FileFormat::from_path(path))
            .ok_or_else(|| {
                eyre!(
                    "Cannot detect the format of {}. Use --format to choose a reader.",
                    path.display()
                )
            })?;

        let df = read_frame(path, format).map_err(|e| {
            eyre!(
                "Failed to load {}: {}",
                path.display(),
                user_message_from_polars(&e)
            )
        })?;
        info!(
            path = %path.display(),
            ?format,
            rows = df.height(),
            columns = df.width(),
            "dataset loaded"
        );

        let dataset = Self {
            df,
            source: Some(path.to_path_buf()),
        };
        dataset.warn_missing_exclusions();
        Ok(dataset)
    }

    /// Wrap an in-memory frame (used by tests and embedding callers).
    pub fn from_frame(df: DataFrame) -> Self {
        Self { df, source: None }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_index(name).is_some()
    }

    /// Numeric columns offered for histograms, in dataset order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|c| c.dtype().is_numeric())
            .map(|c| c.name().to_string())
            .filter(|name| !EXCLUDED_NUMERIC_COLUMNS.contains(&name.as_str()))
            .collect()
    }

    /// Text columns offered for Top-N category charts, in dataset order.
    pub fn categorical_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|c| matches!(c.dtype(), DataType::String | DataType::Categorical(..)))
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Draw `min(n, height)` distinct rows. Without a seed every call draws a new sample.
    pub fn sample(&self, n: usize, seed: Option<u64>) -> Result<DataFrame> {
        let height = self.df.height();
        let amount = n.min(height);
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let indices: Vec<u32> = rand::seq::index::sample(&mut rng, height, amount)
            .into_iter()
            .map(|i| i as u32)
            .collect();
        let indices = UInt32Chunked::new("indices".into(), indices);
        self.df
            .take(&indices)
            .map_err(|e| eyre!("Sampling error: {}", user_message_from_polars(&e)))
    }

    // Exclusion names that no longer exist in the data are a sign the cleaning step changed.
    fn warn_missing_exclusions(&self) {
        for name in EXCLUDED_NUMERIC_COLUMNS {
            if !self.has_column(name) {
                warn!(column = name, "excluded numeric column is not in the dataset");
            }
        }
    }
}

fn read_frame(path: &Path, format: FileFormat) -> PolarsResult<DataFrame> {
    match format {
        FileFormat::Parquet => {
            LazyFrame::scan_parquet(PlPath::Local(Arc::from(path)), Default::default())?.collect()
        }
        FileFormat::Arrow => LazyFrame::scan_ipc(
            PlPath::Local(Arc::from(path)),
            Default::default(),
            Default::default(),
        )?
        .collect(),
        FileFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .map_parse_options(|opts| opts.with_try_parse_dates(true))
            .try_into_reader_with_file_path(Some(path.into()))?
            .finish(),
        FileFormat::Json => JsonReader::new(File::open(path)?)
            .with_json_format(JsonFormat::Json)
            .finish(),
        FileFormat::Jsonl => JsonReader::new(File::open(path)?)
            .with_json_format(JsonFormat::JsonLines)
            .finish(),
    }
}
