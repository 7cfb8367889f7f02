use std::io::Write;

use crate::data::record::{Field, WineRecord};
use crate::processing::extract::Extractor;
use crate::processing::grouping::group_key;
use crate::processing::statistics::{aggregate, GroupStats, GroupedStats};

/// Shown in place of a statistic that could not be computed.
pub const UNAVAILABLE: &str = "N/A";

pub fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => UNAVAILABLE.to_string(),
    }
}

/// Both measured quantities, grouped by alcohol class.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WineReport {
    pub flavanoids: GroupedStats,
    pub gamma: GroupedStats,
}

impl WineReport {
    pub const CLASS_FIELD: Field = Field::Alcohol;

    pub fn compute(records: &[WineRecord]) -> Self {
        Self {
            flavanoids: measure(records, Extractor::FLAVANOIDS),
            gamma: measure(records, Extractor::GAMMA),
        }
    }

    pub fn tables(&self) -> [StatsTable; 2] {
        [
            StatsTable::from_grouped("Flavanoids", &self.flavanoids),
            StatsTable::from_grouped("Gamma", &self.gamma),
        ]
    }

    /// Plain-text rendering of both tables, separated by a blank line.
    pub fn to_text(&self, with_counts: bool) -> String {
        self.tables()
            .iter()
            .map(|t| t.to_text(with_counts))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write_csv<W: Write>(&self, writer: W, with_counts: bool) -> Result<(), csv::Error> {
        let mut out = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        for table in self.tables().iter() {
            table.write_rows(&mut out, with_counts)?;
        }
        out.flush()?;
        Ok(())
    }
}

fn measure(records: &[WineRecord], extractor: Extractor) -> GroupedStats {
    tracing::debug!("Computing {:?} ({:?})", extractor, extractor.policy());
    aggregate(
        records,
        |r| group_key(r, WineReport::CLASS_FIELD),
        |r| extractor.extract(r),
    )
}

/// A rendered summary table: one column per group, one row per statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTable {
    pub title: String,
    /// `Class <key>` per group, in group order.
    pub headers: Vec<String>,
    /// `(row label, formatted cells)` for mean, median and mode.
    pub rows: Vec<(String, Vec<String>)>,
    pub counts: Vec<usize>,
}

impl StatsTable {
    pub fn from_grouped(measure: &str, stats: &GroupedStats) -> Self {
        let headers = stats.keys().map(|k| format!("Class {k}")).collect();
        let row = |name: &str, pick: fn(&GroupStats) -> Option<f64>| {
            (
                format!("{measure} {name}"),
                stats.iter().map(|(_, s)| format_stat(pick(s))).collect::<Vec<_>>(),
            )
        };
        Self {
            title: format!("{measure} Statistics"),
            headers,
            rows: vec![
                row("Mean", |s| s.mean),
                row("Median", |s| s.median),
                row("Mode", |s| s.mode),
            ],
            counts: stats.iter().map(|(_, s)| s.count).collect(),
        }
    }

    fn label_cells(&self, with_counts: bool) -> Vec<Vec<String>> {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        let mut header = vec!["Measure".to_string()];
        header.extend(self.headers.iter().cloned());
        lines.push(header);
        for (label, cells) in &self.rows {
            let mut line = vec![label.clone()];
            line.extend(cells.iter().cloned());
            lines.push(line);
        }
        if with_counts {
            let mut line = vec!["Values".to_string()];
            line.extend(self.counts.iter().map(|c| c.to_string()));
            lines.push(line);
        }
        lines
    }

    /// Title line followed by left-aligned columns.
    pub fn to_text(&self, with_counts: bool) -> String {
        let lines = self.label_cells(with_counts);
        let cols = lines.iter().map(|l| l.len()).max().unwrap_or(0);
        let widths: Vec<usize> = (0..cols)
            .map(|c| {
                lines
                    .iter()
                    .filter_map(|l| l.get(c))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut text = format!("{}\n", self.title);
        for line in &lines {
            let row: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{cell:<w$}"))
                .collect();
            text.push_str(row.join("  ").trim_end());
            text.push('\n');
        }
        text
    }

    fn write_rows<W: Write>(
        &self,
        out: &mut csv::Writer<W>,
        with_counts: bool,
    ) -> Result<(), csv::Error> {
        out.write_record([self.title.as_str()])?;
        for line in self.label_cells(with_counts) {
            out.write_record(&line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::Datum;
    use crate::processing::grouping::UNKNOWN_GROUP;

    fn sample() -> Vec<WineRecord> {
        vec![
            WineRecord::from_pairs([
                (Field::Alcohol, Datum::Number(1.0)),
                (Field::Flavanoids, Datum::Number(3.0)),
                (Field::Ash, Datum::Number(2.0)),
                (Field::Hue, Datum::Number(1.0)),
                (Field::Magnesium, Datum::Number(100.0)),
            ]),
            WineRecord::from_pairs([
                (Field::Alcohol, Datum::Number(1.0)),
                (Field::Flavanoids, Datum::Number(2.0)),
            ]),
            WineRecord::from_pairs([(Field::Flavanoids, Datum::Text("bad".into()))]),
        ]
    }

    #[test]
    fn format_stat_uses_three_decimals_or_placeholder() {
        assert_eq!(format_stat(Some(2.0 / 3.0)), "0.667");
        assert_eq!(format_stat(Some(0.0)), "0.000");
        assert_eq!(format_stat(None), UNAVAILABLE);
    }

    #[test]
    fn table_has_one_column_per_group() {
        let report = WineReport::compute(&sample());
        let [flavanoids, gamma] = report.tables();

        assert_eq!(flavanoids.title, "Flavanoids Statistics");
        assert_eq!(flavanoids.headers, vec!["Class 1".to_string(), format!("Class {UNKNOWN_GROUP}")]);
        assert_eq!(flavanoids.rows[0].0, "Flavanoids Mean");
        assert_eq!(flavanoids.rows[0].1, vec!["2.500", "N/A"]);
        assert_eq!(flavanoids.rows[2].1, vec!["N/A", "N/A"]);
        assert_eq!(flavanoids.counts, vec![2, 0]);

        // 0.02 and 1.0 for class 1, 1.0 for the unclassified row.
        assert_eq!(gamma.rows[0].1, vec!["0.510", "1.000"]);
        assert_eq!(gamma.rows[2].1, vec!["N/A", "1.000"]);
        assert_eq!(gamma.counts, vec![2, 1]);
    }

    #[test]
    fn text_rendering_aligns_columns() {
        let report = WineReport::compute(&sample());
        let text = report.tables()[0].to_text(false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Flavanoids Statistics");
        assert_eq!(lines[1], "Measure            Class 1  Class Unknown");
        assert_eq!(lines[2], "Flavanoids Mean    2.500    N/A");
        assert_eq!(lines.len(), 5);

        let with_counts = report.tables()[0].to_text(true);
        assert!(with_counts.lines().any(|l| l.starts_with("Values")));
    }

    #[test]
    fn csv_export_contains_both_tables() {
        let report = WineReport::compute(&sample());
        let mut buf = Vec::new();
        report.write_csv(&mut buf, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Flavanoids Statistics\nMeasure,Class 1,Class Unknown\n"));
        assert!(text.contains("Gamma Statistics\n"));
        assert!(text.contains("Gamma Mode,N/A,1.000\n"));
        assert!(text.contains("Values,2,0\n"));
    }

    #[test]
    fn json_maps_each_group_to_its_stats() {
        let report = WineReport::compute(&sample());
        let json = serde_json::to_value(&report).unwrap();
        let keys: Vec<&String> = json["flavanoids"].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(json["flavanoids"]["1"]["median"], 2.5);
        assert!(json["flavanoids"][UNKNOWN_GROUP]["mean"].is_null());
        assert_eq!(json["gamma"][UNKNOWN_GROUP]["count"], 1);
    }
}
