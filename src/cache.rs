use crate::api::VariableKind;
use crate::chart::{Bins, FrequencyTable, numeric_values};
use crate::parallel_view::{AxisGeometry, axis_geometry};
use crate::store::Store;
use crate::versioned::Memoized;

/// Per-frame derived chart data, recomputed only when the fetched
/// artifact feeding it changes.
pub struct Cache {
    pub frequency: Memoized<Store, u64, Option<FrequencyTable>>,
    pub bins: Memoized<Store, u64, Option<Bins>>,
    pub matrix_domains: Memoized<Store, u64, Vec<(f64, f64)>>,
    pub parallel_axes: Memoized<Store, u64, Vec<AxisGeometry>>,
}

impl Cache {
    pub fn new() -> Self {
        let frequency = Memoized::new(
            |s: &Store| s.distribution.version(),
            |s: &Store| {
                let payload = s.distribution.get().as_ref()?;
                if payload.kind != VariableKind::Categorical {
                    return None;
                }
                Some(FrequencyTable::from_values(
                    &payload.values,
                    payload.mapping.as_ref(),
                ))
            },
        );

        let bins = Memoized::new(
            |s: &Store| s.distribution.version(),
            |s: &Store| {
                let payload = s.distribution.get().as_ref()?;
                if payload.kind != VariableKind::Numerical {
                    return None;
                }
                Bins::from_values(&numeric_values(&payload.values))
            },
        );

        let matrix_domains = Memoized::new(
            |s: &Store| s.attribute_table.version(),
            |s: &Store| {
                let Some(table) = s.attribute_table.get() else {
                    return Vec::new();
                };
                (0..table.names.len())
                    .map(|column| {
                        let mut min = f64::INFINITY;
                        let mut max = f64::NEG_INFINITY;
                        for row in &table.rows {
                            min = min.min(row[column]);
                            max = max.max(row[column]);
                        }
                        (min, max)
                    })
                    .collect()
            },
        );

        let parallel_axes = Memoized::new(
            |s: &Store| s.parallel.version(),
            |s: &Store| {
                let Some(payload) = s.parallel.get() else {
                    return Vec::new();
                };
                payload.columns.iter().map(axis_geometry).collect()
            },
        );

        Self {
            frequency,
            bins,
            matrix_domains,
            parallel_axes,
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RawValue;
    use crate::fetch::{Backend, DistributionPayload};

    #[test]
    fn frequency_cache_tracks_distribution_versions() {
        let mut store = Store::new(Backend::new("http://127.0.0.1:0"));
        let mut cache = Cache::new();

        assert!(cache.frequency.get(&store).is_none());

        store.distribution.set(Some(DistributionPayload {
            variable: "segment".to_owned(),
            kind: VariableKind::Categorical,
            values: vec![
                RawValue::Text("A".to_owned()),
                RawValue::Text("A".to_owned()),
                RawValue::Text("B".to_owned()),
            ],
            mapping: None,
        }));

        let table = cache.frequency.get(&store).as_ref().unwrap();
        assert_eq!(table.bars[0].count, 2);

        // Numeric payloads produce bins, not frequencies.
        store.distribution.set(Some(DistributionPayload {
            variable: "age".to_owned(),
            kind: VariableKind::Numerical,
            values: vec![
                RawValue::Number(1.0),
                RawValue::Number(9.0),
            ],
            mapping: None,
        }));
        assert!(cache.frequency.get(&store).is_none());
        assert!(cache.bins.get(&store).is_some());
    }

    #[test]
    fn matrix_domains_follow_the_attribute_table() {
        use crate::fetch::AttributeTablePayload;

        let mut store = Store::new(Backend::new("http://127.0.0.1:0"));
        let mut cache = Cache::new();

        store.attribute_table.set(Some(AttributeTablePayload {
            names: vec!["a".to_owned(), "b".to_owned()],
            weights: vec![0.9, 0.5],
            rows: vec![vec![1.0, 10.0], vec![3.0, -2.0]],
        }));

        let domains = cache.matrix_domains.get(&store);
        assert_eq!(domains, &vec![(1.0, 3.0), (-2.0, 10.0)]);
    }
}
