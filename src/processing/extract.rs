use crate::data::record::{Field, WineRecord};

/// How an extractor treats a missing or non-numeric operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// The record contributes nothing to the aggregation.
    ExcludeOnMissing,
    /// The operand is replaced by 1, so the record always contributes.
    SubstituteIdentity,
}

/// Per-record value function feeding the aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// A single numeric field, read as-is.
    Direct(Field),
    /// `(numerator.0 * numerator.1) / denominator`.
    Ratio {
        numerator: (Field, Field),
        denominator: Field,
    },
}

impl Extractor {
    /// `Ash * Hue / Magnesium`.
    pub const GAMMA: Extractor = Extractor::Ratio {
        numerator: (Field::Ash, Field::Hue),
        denominator: Field::Magnesium,
    };

    pub const FLAVANOIDS: Extractor = Extractor::Direct(Field::Flavanoids);

    pub fn policy(&self) -> MissingPolicy {
        match self {
            Extractor::Direct(_) => MissingPolicy::ExcludeOnMissing,
            Extractor::Ratio { .. } => MissingPolicy::SubstituteIdentity,
        }
    }

    pub fn extract(&self, record: &WineRecord) -> Option<f64> {
        match *self {
            Extractor::Direct(field) => record.get(field).as_number(),
            Extractor::Ratio {
                numerator: (a, b),
                denominator: c,
            } => {
                let value = identity_or(record, a) * identity_or(record, b) / identity_or(record, c);
                value.is_finite().then_some(value)
            }
        }
    }
}

/// Operand value, or 1 when it is missing, non-numeric or zero.
fn identity_or(record: &WineRecord, field: Field) -> f64 {
    match record.get(field).as_number() {
        Some(v) if v != 0.0 => v,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::Datum;

    #[test]
    fn direct_extractor_excludes_non_numeric() {
        let bad = WineRecord::from_pairs([(Field::Flavanoids, Datum::Text("bad".into()))]);
        let good = WineRecord::from_pairs([(Field::Flavanoids, Datum::Number(2.0))]);
        let zero = WineRecord::from_pairs([(Field::Flavanoids, Datum::Number(0.0))]);
        assert_eq!(Extractor::FLAVANOIDS.extract(&bad), None);
        assert_eq!(Extractor::FLAVANOIDS.extract(&WineRecord::default()), None);
        assert_eq!(Extractor::FLAVANOIDS.extract(&good), Some(2.0));
        assert_eq!(Extractor::FLAVANOIDS.extract(&zero), Some(0.0));
    }

    #[test]
    fn ratio_of_fully_missing_record_is_one() {
        assert_eq!(Extractor::GAMMA.extract(&WineRecord::default()), Some(1.0));
    }

    #[test]
    fn ratio_substitutes_each_missing_operand() {
        let record = WineRecord::from_pairs([
            (Field::Ash, Datum::Number(2.0)),
            (Field::Hue, Datum::Text("n/a".into())),
            (Field::Magnesium, Datum::Number(4.0)),
        ]);
        assert_eq!(Extractor::GAMMA.extract(&record), Some(0.5));

        let zero_divisor = WineRecord::from_pairs([
            (Field::Ash, Datum::Number(2.0)),
            (Field::Hue, Datum::Number(3.0)),
            (Field::Magnesium, Datum::Number(0.0)),
        ]);
        assert_eq!(Extractor::GAMMA.extract(&zero_divisor), Some(6.0));
    }

    #[test]
    fn policies_differ_per_extractor() {
        assert_eq!(Extractor::FLAVANOIDS.policy(), MissingPolicy::ExcludeOnMissing);
        assert_eq!(Extractor::GAMMA.policy(), MissingPolicy::SubstituteIdentity);
    }
}
