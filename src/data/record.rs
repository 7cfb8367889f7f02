use serde::{Deserialize, Deserializer};

/// A single cell of the dataset.
///
/// `Null` covers both an explicit null and a column missing from the row,
/// so absence never collapses into zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Datum {
    Number(f64),
    Text(String),
    #[default]
    Null,
}

impl Datum {
    /// Interpret a raw CSV/Excel cell.
    pub fn parse_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Datum::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Datum::number(v),
            Err(_) => Datum::Text(cell.to_string()),
        }
    }

    /// Non-finite numbers have no place in the aggregation and become `Null`.
    pub fn number(v: f64) -> Self {
        if v.is_finite() {
            Datum::Number(v)
        } else {
            Datum::Null
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Textual form used for labels. Numbers print in shortest form, so
    /// `12.5` and `"12.5"` render identically and `13.0` renders as `13`.
    pub fn display_text(&self) -> Option<String> {
        match self {
            Datum::Number(v) => Some(format!("{v}")),
            Datum::Text(s) => Some(s.clone()),
            Datum::Null => None,
        }
    }
}

impl<'de> Deserialize<'de> for Datum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Number(n) => n.as_f64().map(Datum::number).unwrap_or_default(),
            serde_json::Value::String(s) => Datum::Text(s),
            // Booleans, arrays and objects are not measurements.
            _ => Datum::Null,
        })
    }
}

/// Columns of the wine dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Alcohol,
    MalicAcid,
    Ash,
    AlcalinityOfAsh,
    Magnesium,
    TotalPhenols,
    Flavanoids,
    NonflavanoidPhenols,
    Proanthocyanins,
    ColorIntensity,
    Hue,
    Od280Od315,
    Unknown,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Alcohol,
        Field::MalicAcid,
        Field::Ash,
        Field::AlcalinityOfAsh,
        Field::Magnesium,
        Field::TotalPhenols,
        Field::Flavanoids,
        Field::NonflavanoidPhenols,
        Field::Proanthocyanins,
        Field::ColorIntensity,
        Field::Hue,
        Field::Od280Od315,
        Field::Unknown,
    ];

    /// Column name as it appears in the source data.
    pub fn column_name(&self) -> &'static str {
        match self {
            Field::Alcohol => "Alcohol",
            Field::MalicAcid => "Malic Acid",
            Field::Ash => "Ash",
            Field::AlcalinityOfAsh => "Alcalinity of ash",
            Field::Magnesium => "Magnesium",
            Field::TotalPhenols => "Total phenols",
            Field::Flavanoids => "Flavanoids",
            Field::NonflavanoidPhenols => "Nonflavanoid phenols",
            Field::Proanthocyanins => "Proanthocyanins",
            Field::ColorIntensity => "Color intensity",
            Field::Hue => "Hue",
            Field::Od280Od315 => "OD280/OD315 of diluted wines",
            Field::Unknown => "Unknown",
        }
    }

    /// Match a header to a column: exact first, then ignoring case and
    /// surrounding whitespace.
    pub fn from_column_name(name: &str) -> Option<Field> {
        if let Some(f) = Field::ALL.iter().find(|f| f.column_name() == name) {
            return Some(*f);
        }
        let wanted = name.trim().to_lowercase();
        Field::ALL
            .iter()
            .find(|f| f.column_name().to_lowercase() == wanted)
            .copied()
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One row of the dataset. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WineRecord {
    values: [Datum; 13],
}

impl WineRecord {
    /// Build a record from `(field, value)` pairs; unspecified fields are `Null`.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Field, Datum)>,
    {
        let mut record = WineRecord::default();
        for (field, value) in pairs {
            record.values[field.index()] = value;
        }
        record
    }

    pub fn get(&self, field: Field) -> &Datum {
        &self.values[field.index()]
    }
}

impl<'de> Deserialize<'de> for WineRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut pairs = Vec::with_capacity(map.len());
        for (key, value) in map {
            match Field::from_column_name(&key) {
                Some(field) => {
                    let datum =
                        Datum::deserialize(value).map_err(<D::Error as serde::de::Error>::custom)?;
                    pairs.push((field, datum));
                }
                None => tracing::debug!("Ignoring unknown column {key:?}"),
            }
        }
        Ok(WineRecord::from_pairs(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cell_distinguishes_blank_number_and_text() {
        assert_eq!(Datum::parse_cell("  "), Datum::Null);
        assert_eq!(Datum::parse_cell(" 2.5 "), Datum::Number(2.5));
        assert_eq!(Datum::parse_cell("bad"), Datum::Text("bad".to_string()));
        assert_eq!(Datum::parse_cell("NaN"), Datum::Null);
    }

    #[test]
    fn display_text_drops_trailing_zero_fraction() {
        assert_eq!(Datum::Number(13.0).display_text().as_deref(), Some("13"));
        assert_eq!(Datum::Number(12.5).display_text().as_deref(), Some("12.5"));
        assert_eq!(Datum::Null.display_text(), None);
    }

    #[test]
    fn record_deserializes_from_json_object() {
        let json = r#"{"Alcohol": 1, "Ash": "2.43", "Hue": null, "Flavanoids": 3.06, "Extra": true}"#;
        let record: WineRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.get(Field::Alcohol), &Datum::Number(1.0));
        assert_eq!(record.get(Field::Ash), &Datum::Text("2.43".to_string()));
        assert_eq!(record.get(Field::Hue), &Datum::Null);
        assert_eq!(record.get(Field::Magnesium), &Datum::Null);
        assert_eq!(record.get(Field::Flavanoids).as_number(), Some(3.06));
    }

    #[test]
    fn column_names_match_case_insensitively() {
        assert_eq!(Field::from_column_name("Malic Acid"), Some(Field::MalicAcid));
        assert_eq!(Field::from_column_name(" malic acid "), Some(Field::MalicAcid));
        assert_eq!(Field::from_column_name("Proline"), None);
        for field in Field::ALL {
            assert_eq!(Field::from_column_name(field.column_name()), Some(field));
        }
    }
}
