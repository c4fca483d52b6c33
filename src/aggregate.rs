//! Aggregation over filtered records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::Record;
use crate::types::Money;

/// Group key used when a record lacks the grouped field.
pub const MISSING_GROUP: &str = "(none)";

/// Counts and sums for a view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_count: usize,
    /// Money sums keyed by field name
    pub sums: BTreeMap<String, Money>,
    /// Record counts keyed by the grouped field's value
    pub groups: BTreeMap<String, usize>,
}

impl Summary {
    /// Sum for `field`, zero if it was not requested.
    #[must_use]
    pub fn sum(&self, field: &str) -> Money {
        self.sums.get(field).copied().unwrap_or_default()
    }
}

/// Aggregator for computing view statistics
pub struct Aggregator;

impl Aggregator {
    #[must_use]
    pub fn total_count<R: Record>(records: &[R]) -> usize {
        records.len()
    }

    /// Sum a money field; blank and malformed cells count as zero.
    #[must_use]
    pub fn sum_by_field<R: Record>(records: &[R], field: &str) -> Money {
        records
            .iter()
            .filter_map(|r| r.field(field))
            .map(Money::parse_lenient)
            .sum()
    }

    /// Count records per key.
    pub fn grouped_count_by<R, F, K>(records: &[R], key_fn: F) -> BTreeMap<String, usize>
    where
        F: Fn(&R) -> K,
        K: Into<String>,
    {
        let mut groups: BTreeMap<String, usize> = BTreeMap::new();
        for record in records {
            *groups.entry(key_fn(record).into()).or_default() += 1;
        }
        groups
    }

    /// Count records per value of `field`, with missing values under [`MISSING_GROUP`].
    #[must_use]
    pub fn grouped_count_by_field<R: Record>(records: &[R], field: &str) -> BTreeMap<String, usize> {
        Self::grouped_count_by(records, |r| {
            r.field(field).unwrap_or(MISSING_GROUP).to_string()
        })
    }

    /// Sum a money field per key.
    pub fn grouped_sum_by<R, F, K>(records: &[R], field: &str, key_fn: F) -> BTreeMap<String, Money>
    where
        R: Record,
        F: Fn(&R) -> K,
        K: Into<String>,
    {
        let mut groups: BTreeMap<String, Money> = BTreeMap::new();
        for record in records {
            let amount = record.field(field).map_or(Money::ZERO, Money::parse_lenient);
            *groups.entry(key_fn(record).into()).or_default() += amount;
        }
        groups
    }

    /// Build a [`Summary`] with the given money fields and grouping field.
    #[must_use]
    pub fn summarize<R: Record>(records: &[R], sum_fields: &[&str], group_field: &str) -> Summary {
        Summary {
            total_count: Self::total_count(records),
            sums: sum_fields
                .iter()
                .map(|f| ((*f).to_string(), Self::sum_by_field(records, f)))
                .collect(),
            groups: Self::grouped_count_by_field(records, group_field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Sale;

    fn sale(cash: &str, closer: Option<&str>) -> Sale {
        Sale {
            name: "x".into(),
            cash: Some(cash.to_string()),
            closer: closer.map(String::from),
            ..Sale::default()
        }
    }

    #[test]
    fn test_sum_skips_malformed_cash() {
        let records = vec![
            sale("$1,200.50", None),
            sale("bad", None),
            sale("$50", None),
        ];
        let total = Aggregator::sum_by_field(&records, "cash");
        assert!((total.get() - 1250.50).abs() < 1e-9);
    }

    #[test]
    fn test_sum_over_filtered_references() {
        let records = vec![sale("$10", None), sale("$5", None)];
        let refs: Vec<&Sale> = records.iter().collect();
        assert!((Aggregator::sum_by_field(&refs, "cash").get() - 15.0).abs() < 1e-9);
        assert_eq!(Aggregator::total_count(&refs), 2);
    }

    #[test]
    fn test_grouped_count_by() {
        let records = vec![
            sale("$1", Some("Dana")),
            sale("$1", Some("Eli")),
            sale("$1", Some("Dana")),
            sale("$1", None),
        ];
        let groups = Aggregator::grouped_count_by_field(&records, "closer");
        assert_eq!(groups.get("Dana"), Some(&2));
        assert_eq!(groups.get("Eli"), Some(&1));
        assert_eq!(groups.get(MISSING_GROUP), Some(&1));

        let by_len = Aggregator::grouped_count_by(&records, |s| {
            s.closer.as_deref().map_or(0, str::len).to_string()
        });
        assert_eq!(by_len.get("4"), Some(&2));
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let mut records = vec![
            sale("$3", Some("Dana")),
            sale("$4", Some("Eli")),
            sale("oops", Some("Dana")),
        ];
        let forward = Aggregator::summarize(&records, &["cash"], "closer");
        records.reverse();
        let backward = Aggregator::summarize(&records, &["cash"], "closer");
        assert_eq!(forward, backward);
        assert_eq!(forward.total_count, 3);
        assert!((forward.sum("cash").get() - 7.0).abs() < 1e-9);
        assert!(forward.sum("revenue").is_zero());
    }

    #[test]
    fn test_grouped_sum_by() {
        let records = vec![
            sale("$100", Some("Dana")),
            sale("$50", Some("Dana")),
            sale("$25", Some("Eli")),
        ];
        let sums = Aggregator::grouped_sum_by(&records, "cash", |s| {
            s.closer.clone().unwrap_or_default()
        });
        assert!((sums["Dana"].get() - 150.0).abs() < 1e-9);
        assert!((sums["Eli"].get() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<Sale> = Vec::new();
        let summary = Aggregator::summarize(&records, &["cash"], "closer");
        assert_eq!(summary.total_count, 0);
        assert!(summary.sum("cash").is_zero());
        assert!(summary.groups.is_empty());
    }
}
