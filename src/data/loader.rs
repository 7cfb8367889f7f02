use std::path::{Path, PathBuf};

use crate::data::record::{Datum, Field, WineRecord};

/// Sample dataset compiled into the binary, used when no file is given.
const BUNDLED_SAMPLE: &str = include_str!("../../assets/wine-sample.json");

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("Malformed JSON dataset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed CSV dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot read Excel workbook: {0}")]
    Excel(String),

    #[error("No data found in {0}")]
    Empty(PathBuf),
}

/// A dataset as handed to the statistics pipeline: the rows plus where
/// they came from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: String,
    pub records: Vec<WineRecord>,
}

impl Dataset {
    pub fn bundled() -> Self {
        Self {
            source: "bundled sample".to_string(),
            records: bundled_sample(),
        }
    }
}

/// Load a JSON, CSV or Excel dataset.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let records = match ext.as_str() {
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        "xls" | "xlsx" => load_excel(path)?,
        _ => return Err(LoadError::UnsupportedFormat(ext)),
    };

    tracing::info!("Loaded {} records from {:?}", records.len(), path);
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Dataset { source, records })
}

/// Records of the bundled sample dataset.
pub fn bundled_sample() -> Vec<WineRecord> {
    match parse_json(BUNDLED_SAMPLE) {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Bundled sample dataset is malformed: {e}");
            Vec::new()
        }
    }
}

pub fn parse_json(text: &str) -> Result<Vec<WineRecord>, LoadError> {
    Ok(serde_json::from_str(text)?)
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    let content = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Fall back to latin1 when the file is not UTF-8.
    Ok(String::from_utf8(content.clone())
        .unwrap_or_else(|_| content.iter().map(|&b| b as char).collect()))
}

fn load_json(path: &Path) -> Result<Vec<WineRecord>, LoadError> {
    parse_json(&read_text(path)?)
}

fn load_csv(path: &Path) -> Result<Vec<WineRecord>, LoadError> {
    let text = read_text(path)?;
    let records = parse_csv(&text)?;
    if records.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    Ok(records)
}

/// Parse CSV text whose first row names the columns.
pub fn parse_csv(text: &str) -> Result<Vec<WineRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let columns = map_columns(&headers);

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        match result {
            Ok(row) => {
                let cells: Vec<&str> = row.iter().collect();
                records.push(build_record(&columns, &cells));
            }
            Err(e) => tracing::warn!("Skipping unreadable CSV row {}: {e}", row_idx + 1),
        }
    }
    Ok(records)
}

fn load_excel(path: &Path) -> Result<Vec<WineRecord>, LoadError> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::Excel(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::Empty(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Excel(e.to_string()))?;

    let all_rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    Data::Bool(b) => b.to_string(),
                    Data::DateTime(dt) => dt.to_string(),
                    Data::DateTimeIso(s) => s.clone(),
                    Data::DurationIso(s) => s.clone(),
                    Data::Error(e) => format!("{e:?}"),
                })
                .collect()
        })
        .collect();

    let Some((header, data_rows)) = all_rows.split_first() else {
        return Err(LoadError::Empty(path.to_path_buf()));
    };

    let columns = map_columns(header);
    Ok(data_rows
        .iter()
        .map(|row| {
            let cells: Vec<&str> = row.iter().map(|s| s.as_str()).collect();
            build_record(&columns, &cells)
        })
        .collect())
}

/// Resolve each header cell to a known column; unknown columns map to `None`.
fn map_columns(headers: &[String]) -> Vec<Option<Field>> {
    headers
        .iter()
        .map(|h| {
            let field = Field::from_column_name(h);
            if field.is_none() {
                tracing::debug!("Ignoring unknown column {h:?}");
            }
            field
        })
        .collect()
}

fn build_record(columns: &[Option<Field>], cells: &[&str]) -> WineRecord {
    WineRecord::from_pairs(
        columns
            .iter()
            .zip(cells.iter())
            .filter_map(|(field, cell)| field.map(|f| (f, Datum::parse_cell(cell)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_sample_parses() {
        let records = bundled_sample();
        assert_eq!(records.len(), 13);
        let unclassified = records
            .iter()
            .filter(|r| r.get(Field::Alcohol) == &Datum::Null)
            .count();
        assert_eq!(unclassified, 1);
    }

    #[test]
    fn csv_short_rows_leave_trailing_fields_null() {
        let text = "Alcohol,Flavanoids,Hue\n1,3.06,1.04\n2,2.5\n";
        let records = parse_csv(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get(Field::Flavanoids), &Datum::Number(2.5));
        assert_eq!(records[1].get(Field::Hue), &Datum::Null);
    }

    #[test]
    fn csv_keeps_non_numeric_cells_as_text() {
        let text = "Alcohol,Flavanoids\n1,bad\n,2\n";
        let records = parse_csv(text).unwrap();
        assert_eq!(records[0].get(Field::Flavanoids), &Datum::Text("bad".to_string()));
        assert_eq!(records[1].get(Field::Alcohol), &Datum::Null);
    }

    #[test]
    fn load_dataset_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("wine.json");
        std::fs::write(&json_path, r#"[{"Alcohol": 1, "Flavanoids": 3.0}]"#).unwrap();
        let dataset = load_dataset(&json_path).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.source, "wine.json");

        let csv_path = dir.path().join("wine.CSV");
        let mut file = std::fs::File::create(&csv_path).unwrap();
        writeln!(file, "Alcohol,Ash").unwrap();
        writeln!(file, "3,2.1").unwrap();
        drop(file);
        assert_eq!(load_dataset(&csv_path).unwrap().records.len(), 1);

        let txt_path = dir.path().join("wine.txt");
        std::fs::write(&txt_path, "").unwrap();
        assert!(matches!(
            load_dataset(&txt_path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn missing_file_and_bad_json_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(load_dataset(&missing), Err(LoadError::Io { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(matches!(load_dataset(&bad), Err(LoadError::Json(_))));

        let empty = dir.path().join("empty.csv");
        std::fs::write(&empty, "Alcohol,Ash\n").unwrap();
        assert!(matches!(load_dataset(&empty), Err(LoadError::Empty(_))));
    }
}
