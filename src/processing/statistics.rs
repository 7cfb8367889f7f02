use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Summary statistics for one group. `None` marks a statistic that could
/// not be computed.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct GroupStats {
    /// Number of values that entered the reduction.
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Constant-or-unavailable: the shared value when every collected value
    /// is identical, otherwise `None`. This is not a most-frequent-value mode.
    pub mode: Option<f64>,
}

impl GroupStats {
    /// Reduce one group's values. An empty slice yields all-`None`.
    pub fn compute(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                count,
                mean: None,
                median: None,
                mode: None,
            };
        }

        let mean = values.iter().sum::<f64>() / count as f64;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Self {
            count,
            mean: Some(mean).filter(|m| m.is_finite()),
            median: Some(median).filter(|m| m.is_finite()),
            mode: constant_value(values),
        }
    }
}

/// The common value of `values`, or `None` as soon as two values differ.
fn constant_value(values: &[f64]) -> Option<f64> {
    let (&first, rest) = values.split_first()?;
    rest.iter().all(|&v| v == first).then_some(first)
}

/// Group key to statistics, iterated in the order groups were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedStats {
    groups: Vec<(String, GroupStats)>,
}

impl GroupedStats {
    pub fn get(&self, key: &str) -> Option<&GroupStats> {
        self.groups.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupStats)> {
        self.groups.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(k, _)| k.as_str())
    }
}

/// Serializes as a JSON object whose keys keep group order.
impl Serialize for GroupedStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (key, stats) in &self.groups {
            map.serialize_entry(key, stats)?;
        }
        map.end()
    }
}

/// Partition `records` by `group_key`, collect `value` per record (dropping
/// `None`), and reduce each group once.
///
/// A group appears in the output as soon as one record maps to it, even if
/// none of its records produced a value.
pub fn aggregate<R, K, V>(records: &[R], group_key: K, value: V) -> GroupedStats
where
    K: Fn(&R) -> String,
    V: Fn(&R) -> Option<f64>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut keys: Vec<String> = Vec::new();
    let mut values: Vec<Vec<f64>> = Vec::new();

    for record in records {
        let key = group_key(record);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = keys.len();
                index.insert(key.clone(), slot);
                keys.push(key);
                values.push(Vec::new());
                slot
            }
        };
        if let Some(v) = value(record) {
            values[slot].push(v);
        }
    }

    tracing::debug!(
        "Aggregated {} records into {} groups",
        records.len(),
        keys.len()
    );

    GroupedStats {
        groups: keys
            .into_iter()
            .zip(values.iter())
            .map(|(key, vals)| (key, GroupStats::compute(vals)))
            .collect(),
    }
}
