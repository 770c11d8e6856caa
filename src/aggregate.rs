//! Aggregations behind every chart: counts, group means, subset filters and box statistics.
//!
//! Each function takes the frame by reference and returns fresh owned rows;
//! nothing here is cached between reruns.

use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

const COUNT: &str = "listing_count";
const MEAN: &str = "mean_value";

/// Tukey fence multiplier for box plot whiskers.
const WHISKER_IQR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub group: String,
    pub mean: f64,
    /// Rows with a non-null value that contributed to the mean.
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairMean {
    pub outer: String,
    pub inner: String,
    pub mean: f64,
    pub count: u64,
}

/// Five-number summary of one group plus Tukey whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub group: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outlier_count: usize,
}

fn descending_then_ascending() -> SortMultipleOptions {
    SortMultipleOptions {
        descending: vec![true, false],
        ..Default::default()
    }
}

/// Count rows per distinct value of `column` and keep the `n` most frequent.
///
/// Nulls are not a category. Ties on count are ordered by value so the result is stable.
/// Fewer than `n` distinct values returns all of them.
pub fn top_n_value_counts(df: &DataFrame, column: &str, n: usize) -> Result<Vec<CategoryCount>> {
    let counts = df
        .clone()
        .lazy()
        .select([col(column).cast(DataType::String)])
        .drop_nulls(None)
        .group_by([col(column)])
        .agg([len().cast(DataType::UInt64).alias(COUNT)])
        .sort_by_exprs([col(COUNT), col(column)], descending_then_ascending())
        .slice(0, n as u32)
        .collect()?;

    let values = counts.column(column)?.str()?;
    let totals = counts.column(COUNT)?.u64()?;
    Ok(values
        .iter()
        .zip(totals.iter())
        .filter_map(|(value, count)| {
            Some(CategoryCount {
                value: value?.to_string(),
                count: count?,
            })
        })
        .collect())
}

/// Mean of `value` per `group`, highest first, limited to `n` groups.
///
/// Rows with a null group or value are ignored, so a group with no usable value never appears.
pub fn top_groups_by_mean(
    df: &DataFrame,
    group: &str,
    value: &str,
    n: usize,
) -> Result<Vec<GroupMean>> {
    let means = df
        .clone()
        .lazy()
        .select([
            col(group).cast(DataType::String),
            col(value).cast(DataType::Float64),
        ])
        .drop_nulls(None)
        .group_by([col(group)])
        .agg([
            col(value).mean().alias(MEAN),
            len().cast(DataType::UInt64).alias(COUNT),
        ])
        .sort_by_exprs([col(MEAN), col(group)], descending_then_ascending())
        .slice(0, n as u32)
        .collect()?;

    let groups = means.column(group)?.str()?;
    let values = means.column(MEAN)?.f64()?;
    let counts = means.column(COUNT)?.u64()?;
    let mut out = Vec::with_capacity(means.height());
    for i in 0..means.height() {
        if let (Some(group), Some(mean), Some(count)) =
            (groups.get(i), values.get(i), counts.get(i))
        {
            out.push(GroupMean {
                group: group.to_string(),
                mean,
                count,
            });
        }
    }
    Ok(out)
}

/// Rows whose `group` is one of `selected`. An empty selection yields an empty frame.
pub fn filter_by_groups(df: &DataFrame, group: &str, selected: &[String]) -> Result<DataFrame> {
    let predicate = selected.iter().fold(lit(false), |acc, g| {
        acc.or(col(group).cast(DataType::String).eq(lit(g.as_str())))
    });
    Ok(df.clone().lazy().filter(predicate).collect()?)
}

/// Mean of `value` per (`outer`, `inner`) pair, ordered by outer then inner key.
///
/// Only pairs with at least one non-null value are produced.
pub fn mean_by_two_groups(
    df: &DataFrame,
    outer: &str,
    inner: &str,
    value: &str,
) -> Result<Vec<PairMean>> {
    let means = df
        .clone()
        .lazy()
        .select([
            col(outer).cast(DataType::String),
            col(inner).cast(DataType::String),
            col(value).cast(DataType::Float64),
        ])
        .drop_nulls(None)
        .group_by([col(outer), col(inner)])
        .agg([
            col(value).mean().alias(MEAN),
            len().cast(DataType::UInt64).alias(COUNT),
        ])
        .sort_by_exprs([col(outer), col(inner)], SortMultipleOptions::default())
        .collect()?;

    let outers = means.column(outer)?.str()?;
    let inners = means.column(inner)?.str()?;
    let values = means.column(MEAN)?.f64()?;
    let counts = means.column(COUNT)?.u64()?;
    let mut out = Vec::with_capacity(means.height());
    for i in 0..means.height() {
        let row = (outers.get(i), inners.get(i), values.get(i), counts.get(i));
        if let (Some(outer), Some(inner), Some(mean), Some(count)) = row {
            if count > 0 {
                out.push(PairMean {
                    outer: outer.to_string(),
                    inner: inner.to_string(),
                    mean,
                    count,
                });
            }
        }
    }
    Ok(out)
}

/// Box statistics of `value` for each group in `order`. Groups without values are skipped.
pub fn box_stats_by_group(
    df: &DataFrame,
    group: &str,
    value: &str,
    order: &[String],
) -> Result<Vec<BoxStats>> {
    let rows = df
        .clone()
        .lazy()
        .select([
            col(group).cast(DataType::String),
            col(value).cast(DataType::Float64),
        ])
        .drop_nulls(None)
        .collect()?;

    let groups = rows.column(group)?.str()?;
    let values = rows.column(value)?.f64()?;
    let mut buckets: HashMap<&str, Vec<f64>> = HashMap::new();
    for (g, v) in groups.iter().zip(values.iter()) {
        if let (Some(g), Some(v)) = (g, v) {
            if v.is_finite() {
                buckets.entry(g).or_default().push(v);
            }
        }
    }

    Ok(order
        .iter()
        .filter_map(|g| {
            let values = buckets.remove(g.as_str())?;
            box_stats(g, values)
        })
        .collect())
}

fn box_stats(group: &str, mut values: Vec<f64>) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let q1 = quantile_linear(&values, 0.25);
    let median = quantile_linear(&values, 0.5);
    let q3 = quantile_linear(&values, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_IQR * iqr;
    let high_fence = q3 + WHISKER_IQR * iqr;

    let inside = values.iter().filter(|v| **v >= low_fence && **v <= high_fence);
    let lower_whisker = inside.clone().copied().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside.copied().fold(f64::NEG_INFINITY, f64::max);
    let outlier_count = values
        .iter()
        .filter(|v| **v < low_fence || **v > high_fence)
        .count();

    Some(BoxStats {
        group: group.to_string(),
        count: values.len(),
        min: values[0],
        q1,
        median,
        q3,
        max: values[values.len() - 1],
        lower_whisker,
        upper_whisker,
        outlier_count,
    })
}

/// Quantile with linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile_linear(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fuel_frame() -> DataFrame {
        let mut fuel = Vec::new();
        for (value, count) in [("gas", 120), ("diesel", 45), ("hybrid", 10), ("electric", 2)] {
            fuel.extend(std::iter::repeat(value).take(count));
        }
        df!("fuel" => fuel).unwrap()
    }

    #[test]
    fn test_top_n_value_counts_example() {
        let rows = top_n_value_counts(&fuel_frame(), "fuel", 3).unwrap();
        let got: Vec<(&str, u64)> = rows.iter().map(|r| (r.value.as_str(), r.count)).collect();
        assert_eq!(got, vec![("gas", 120), ("diesel", 45), ("hybrid", 10)]);
    }

    #[test]
    fn test_top_n_value_counts_fewer_distinct_than_n() {
        let rows = top_n_value_counts(&fuel_frame(), "fuel", 30).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.last().unwrap().value, "electric");
    }

    #[test]
    fn test_top_n_value_counts_skips_nulls_and_breaks_ties_by_value() {
        let colors = [
            Some("red"),
            None,
            Some("blue"),
            None,
            None,
            Some("red"),
            Some("blue"),
        ];
        let df = df!("color" => &colors).unwrap();
        let rows = top_n_value_counts(&df, "color", 5).unwrap();
        assert_eq!(
            rows,
            vec![
                CategoryCount {
                    value: "blue".into(),
                    count: 2
                },
                CategoryCount {
                    value: "red".into(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_top_groups_by_mean_sorted_and_limited() {
        let df = df!(
            "state" => &["ca", "ca", "tx", "ny", "ny", "wa"],
            "price" => &[Some(10.0), Some(30.0), Some(50.0), Some(5.0), Some(7.0), None],
        )
        .unwrap();
        let rows = top_groups_by_mean(&df, "state", "price", 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].group, "tx");
        assert_eq!(rows[0].mean, 50.0);
        assert_eq!(rows[1].group, "ca");
        assert_eq!(rows[1].mean, 20.0);
        assert_eq!(rows[1].count, 2);

        let all = top_groups_by_mean(&df, "state", "price", 10).unwrap();
        assert!(all.iter().all(|r| r.group != "wa"));
    }

    #[test]
    fn test_filter_by_groups() {
        let df = df!(
            "state" => &["ca", "tx", "ny", "ca"],
            "price" => &[1i64, 2, 3, 4],
        )
        .unwrap();
        let out = filter_by_groups(&df, "state", &["ca".to_string(), "ny".to_string()]).unwrap();
        assert_eq!(out.height(), 3);
        let states = out.column("state").unwrap().str().unwrap();
        assert!(states.iter().all(|s| matches!(s, Some("ca") | Some("ny"))));

        let none = filter_by_groups(&df, "state", &[]).unwrap();
        assert_eq!(none.height(), 0);
        assert_eq!(none.width(), 2);
    }

    #[test]
    fn test_mean_by_two_groups() {
        let df = df!(
            "state" => &["ca", "ca", "ca", "tx", "tx"],
            "manufacturer" => &[Some("ford"), Some("ford"), Some("bmw"), Some("ford"), None],
            "price" => &[Some(10.0), Some(20.0), None, Some(8.0), Some(9.0)],
        )
        .unwrap();
        let rows = mean_by_two_groups(&df, "state", "manufacturer", "price").unwrap();
        assert_eq!(
            rows,
            vec![
                PairMean {
                    outer: "ca".into(),
                    inner: "ford".into(),
                    mean: 15.0,
                    count: 2
                },
                PairMean {
                    outer: "tx".into(),
                    inner: "ford".into(),
                    mean: 8.0,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_box_stats_quartiles_and_whiskers() {
        let df = df!(
            "state" => &["ca", "ca", "ca", "ca", "ca", "tx"],
            "price" => &[1.0, 2.0, 3.0, 4.0, 100.0, 7.0],
        )
        .unwrap();
        let order = vec!["tx".to_string(), "ca".to_string(), "zz".to_string()];
        let stats = box_stats_by_group(&df, "state", "price", &order).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].group, "tx");
        assert_eq!(stats[0].median, 7.0);

        let ca = &stats[1];
        assert_eq!(ca.count, 5);
        assert_eq!(ca.q1, 2.0);
        assert_eq!(ca.median, 3.0);
        assert_eq!(ca.q3, 4.0);
        assert_eq!(ca.lower_whisker, 1.0);
        assert_eq!(ca.upper_whisker, 4.0);
        assert_eq!(ca.max, 100.0);
        assert_eq!(ca.outlier_count, 1);
    }

    #[test]
    fn test_quantile_linear_interpolates() {
        assert_eq!(quantile_linear(&[1.0, 2.0, 3.0, 4.0], 0.5), 2.5);
        assert_eq!(quantile_linear(&[5.0], 0.75), 5.0);
    }
}
