// Distribution report
// Per-field summaries of a manifest: numeric statistics with a fixed quantile
// set, top category frequencies, and trajectory bucket proportions.

use std::collections::HashMap;
use std::fmt::Write as _;
use serde::Serialize;

use crate::constants::*;
use crate::manifest::record::column_aliases;
use crate::manifest::Table;
use crate::sampling::{Candidates, WeightedClip};
use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericSummary {
    pub field: String,
    pub count: usize,
    pub missing: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,
    /// (quantile, value) pairs
    pub quantiles: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub field: String,
    pub count: usize,
    pub distinct: usize,
    pub top: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    pub rows: usize,
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategorySummary>,
}

fn find_field(table: &Table, field: &'static str) -> Option<usize> {
    table
        .find_column(column_aliases(field))
        .or_else(|| table.column_index(field))
}

/// Summarize numeric values; None when nothing parsed
pub fn summarize_numeric(field: &str, raw: &[&str]) -> Option<NumericSummary> {
    let values: Vec<f64> = raw
        .iter()
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return None;
    }

    let sorted = stats::sorted(&values);
    let quantiles = REPORT_QUANTILES
        .iter()
        .filter_map(|&q| stats::linear_quantile(&sorted, q).map(|v| (q, v)))
        .collect();

    Some(NumericSummary {
        field: field.to_string(),
        count: values.len(),
        missing: raw.len() - values.len(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean: stats::mean(&values)?,
        median: stats::linear_quantile(&sorted, 0.5)?,
        std: stats::sample_std(&values),
        quantiles,
    })
}

/// Top-N label frequencies; ties break by label
pub fn summarize_categories(field: &str, raw: &[&str], top_n: usize) -> CategorySummary {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in raw.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        *counts.entry(v).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    let distinct = ranked.len();

    let top = ranked
        .into_iter()
        .take(top_n)
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
            share: count as f64 / total.max(1) as f64,
        })
        .collect();

    CategorySummary { field: field.to_string(), count: total, distinct, top }
}

impl DistributionReport {
    /// Build a report over whichever known fields the table carries
    pub fn from_table(table: &Table) -> Self {
        let numeric = REPORT_NUMERIC_FIELDS
            .iter()
            .filter_map(|&field| {
                let idx = find_field(table, field)?;
                let raw: Vec<&str> = table.column_values(idx).collect();
                summarize_numeric(field, &raw)
            })
            .collect();

        let categorical = REPORT_CATEGORICAL_FIELDS
            .iter()
            .filter_map(|&field| {
                let idx = find_field(table, field)?;
                let raw: Vec<&str> = table.column_values(idx).collect();
                Some(summarize_categories(field, &raw, REPORT_TOP_CATEGORIES))
            })
            .collect();

        Self { rows: table.len(), numeric, categorical }
    }

    /// Plain-text rendering
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Rows: {}", self.rows);

        for s in &self.numeric {
            let _ = writeln!(out);
            let _ = writeln!(out, "{} (n={}, missing={})", s.field, s.count, s.missing);
            let _ = writeln!(
                out,
                "  min={:.4}  max={:.4}  mean={:.4}  median={:.4}  std={}",
                s.min, s.max, s.mean, s.median,
                s.std.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
            );
            let qs: Vec<String> = s
                .quantiles
                .iter()
                .map(|(q, v)| format!("p{}={:.4}", (q * 100.0).round() as u32, v))
                .collect();
            let _ = writeln!(out, "  {}", qs.join("  "));
        }

        for c in &self.categorical {
            let _ = writeln!(out);
            let _ = writeln!(out, "{} (n={}, distinct={})", c.field, c.count, c.distinct);
            for entry in &c.top {
                let _ = writeln!(out, "  {:<30} {:>8}  {:>6.2}%", entry.label, entry.count, entry.share * 100.0);
            }
        }

        out
    }
}

fn proportions(clips: &[WeightedClip], label: impl Fn(&WeightedClip) -> String) -> Vec<(String, f64)> {
    let n = clips.len().max(1) as f64;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for c in clips {
        *counts.entry(label(c)).or_insert(0) += 1;
    }
    let mut props: Vec<(String, f64)> = counts.into_iter().map(|(k, v)| (k, v as f64 / n)).collect();
    props.sort_by(|a, b| a.0.cmp(&b.0));
    props
}

/// Proportion of candidates per trajectory bucket, for the three dynamics axes
pub fn bucket_proportions(candidates: &Candidates) -> Vec<(&'static str, Vec<(String, f64)>)> {
    let clips = &candidates.clips;
    vec![
        (COL_MOVE_BIN, proportions(clips, |c| c.bins.move_bin.to_string())),
        (COL_ROT_BIN, proportions(clips, |c| c.bins.rot_bin.to_string())),
        (COL_TURN_BIN, proportions(clips, |c| c.bins.turn_bin.to_string())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_summary() {
        let raw: Vec<String> = (1..=100).map(|i| i.to_string()).collect();
        let mut raw: Vec<&str> = raw.iter().map(String::as_str).collect();
        raw.push("");
        raw.push("n/a");

        let s = summarize_numeric("aesthetic_score", &raw).unwrap();
        assert_eq!(s.count, 100);
        assert_eq!(s.missing, 2);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 100.0);
        assert_eq!(s.mean, 50.5);
        assert_eq!(s.median, 50.5);
        assert_eq!(s.quantiles.len(), 9);
        assert!((s.quantiles[0].1 - 1.99).abs() < 1e-9);
        assert!((s.quantiles[8].1 - 99.01).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_summary_of_nothing() {
        assert_eq!(summarize_numeric("x", &["", "abc"]), None);
    }

    #[test]
    fn test_category_ranking() {
        let mut raw = vec!["Sunny"; 5];
        raw.extend(vec!["Rain"; 3]);
        raw.extend(vec!["Fog"; 3]);
        raw.push("");
        let s = summarize_categories("weather", &raw, 2);
        assert_eq!(s.count, 11);
        assert_eq!(s.distinct, 3);
        assert_eq!(s.top.len(), 2);
        assert_eq!(s.top[0].label, "Sunny");
        assert_eq!(s.top[1].label, "Fog");
        assert!((s.top[0].share - 5.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_report_uses_aliases_and_skips_absent_fields() {
        let csv = "id,aesthetic score,brightness\na,4.0,Bright\nb,6.0,Dim\nc,5.0,Bright\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        let report = DistributionReport::from_table(&table);

        assert_eq!(report.rows, 3);
        assert_eq!(report.numeric.len(), 1);
        assert_eq!(report.numeric[0].field, COL_AESTHETIC);
        assert_eq!(report.numeric[0].median, 5.0);
        assert_eq!(report.categorical.len(), 1);
        assert_eq!(report.categorical[0].top[0].label, "Bright");

        let text = report.render();
        assert!(text.contains("aesthetic_score (n=3, missing=0)"));
        assert!(text.contains("p50=5.0000"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["numeric"][0]["count"], 3);
    }
}
