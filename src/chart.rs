use crate::api::{Mapping, RawValue};
use eframe::egui;
use std::collections::HashMap;

/// Bars kept before the remainder is folded into `Others`.
pub const MAX_CATEGORY_BARS: usize = 10;
pub const OTHERS_LABEL: &str = "Others";

/// Fixed bin count for numerical histograms.
pub const HISTOGRAM_BINS: usize = 10;

/// Magnification applied to loading vectors in the biplot.
pub const LOADING_SCALE: f64 = 10.0;

/// Presentation-only chart settings. Mutating these never triggers a
/// fetch; renderers read them on every pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub show_grid: bool,
    pub show_axis_labels: bool,
    pub show_titles: bool,
    pub stroke_width: f32,
    pub line_color: egui::Color32,
    pub point_color: egui::Color32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axis_labels: true,
            show_titles: true,
            stroke_width: 2.0,
            line_color: egui::Color32::from_rgb(0x00, 0x6d, 0xe1),
            point_color: egui::Color32::from_rgb(0x99, 0x99, 0x99),
        }
    }
}

/// Fixed qualitative palette keyed by cluster id.
pub fn cluster_color(cluster_id: u32) -> egui::Color32 {
    let c = colorous::CATEGORY10
        [cluster_id as usize % colorous::CATEGORY10.len()];
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

/// Draw the chart heading when titles are enabled.
pub fn title(ui: &mut egui::Ui, style: &ChartStyle, text: &str) {
    if style.show_titles {
        ui.heading(text);
    }
}

// ------------------------------------------------------------------
// Frequency tables (categorical bar charts)
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyBar {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrequencyTable {
    pub bars: Vec<FrequencyBar>,
}

impl FrequencyTable {
    /// Group values, translate codes through the mapping (unmapped
    /// codes pass through unchanged), sort descending by count, keep
    /// the top groups and fold the remainder into `Others` when it
    /// is non-empty. Nulls are not counted.
    pub fn from_values(
        values: &[RawValue],
        mapping: Option<&Mapping>,
    ) -> Self {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for value in values {
            let Some(code) = value.key() else { continue };
            let label = mapping
                .and_then(|m| m.get(&code).cloned())
                .unwrap_or(code);
            *counts.entry(label).or_insert(0) += 1;
        }

        let mut grouped: Vec<FrequencyBar> = counts
            .into_iter()
            .map(|(label, count)| FrequencyBar { label, count })
            .collect();
        // Ties break on the label so renders are reproducible.
        grouped.sort_by(|a, b| {
            b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label))
        });

        let others: u64 = grouped
            .iter()
            .skip(MAX_CATEGORY_BARS)
            .map(|bar| bar.count)
            .sum();
        grouped.truncate(MAX_CATEGORY_BARS);
        if others > 0 {
            grouped.push(FrequencyBar {
                label: OTHERS_LABEL.to_owned(),
                count: others,
            });
        }

        Self { bars: grouped }
    }

    pub fn max_count(&self) -> u64 {
        self.bars.iter().map(|bar| bar.count).max().unwrap_or(0)
    }
}

// ------------------------------------------------------------------
// Histogram bins (numerical columns)
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    pub min: f64,
    pub max: f64,
    pub width: f64,
    pub counts: Vec<u64>,
}

impl Bins {
    /// Bucket a numeric sequence into `HISTOGRAM_BINS` equal-width
    /// bins spanning `[min, max]`. The maximum lands in the last bin
    /// so the bins partition the range without gaps or overlaps.
    /// Returns `None` for an empty sequence.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max =
            values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min) / HISTOGRAM_BINS as f64;

        let mut counts = vec![0u64; HISTOGRAM_BINS];
        for &value in values {
            let index = if width > 0.0 {
                (((value - min) / width) as usize)
                    .min(HISTOGRAM_BINS - 1)
            } else {
                // Degenerate range: everything falls in one bin.
                0
            };
            counts[index] += 1;
        }

        Some(Self {
            min,
            max,
            width,
            counts,
        })
    }

    /// Center of bin `index`, for bar placement.
    pub fn center(&self, index: usize) -> f64 {
        self.min + (index as f64 + 0.5) * self.width
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Numeric view of a raw column, dropping nulls and text.
pub fn numeric_values(values: &[RawValue]) -> Vec<f64> {
    values.iter().filter_map(RawValue::as_number).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categorical(values: &[&str]) -> Vec<RawValue> {
        values
            .iter()
            .map(|v| RawValue::Text((*v).to_owned()))
            .collect()
    }

    #[test]
    fn frequency_table_sorts_descending_and_maps_labels() {
        let mut values = Vec::new();
        values.extend(categorical(&["A"; 40]));
        values.extend(categorical(&["B"; 35]));
        values.extend(categorical(&["C"; 20]));
        values.extend(categorical(&["D"; 5]));

        let mapping = Mapping::from([
            ("A".to_owned(), "Alpha".to_owned()),
            ("B".to_owned(), "Beta".to_owned()),
            ("C".to_owned(), "Gamma".to_owned()),
            ("D".to_owned(), "Delta".to_owned()),
        ]);

        let table =
            FrequencyTable::from_values(&values, Some(&mapping));
        let labels: Vec<&str> =
            table.bars.iter().map(|b| b.label.as_str()).collect();
        let counts: Vec<u64> =
            table.bars.iter().map(|b| b.count).collect();

        // Four categories, so no Others bar.
        assert_eq!(labels, vec!["Alpha", "Beta", "Gamma", "Delta"]);
        assert_eq!(counts, vec![40, 35, 20, 5]);
    }

    #[test]
    fn frequency_table_folds_tail_into_others() {
        let mut values = Vec::new();
        for i in 0..12 {
            let repeat = 12 - i;
            for _ in 0..repeat {
                values.push(RawValue::Text(format!("cat{i}")));
            }
        }

        let table = FrequencyTable::from_values(&values, None);
        assert_eq!(table.bars.len(), MAX_CATEGORY_BARS + 1);
        let others = table.bars.last().unwrap();
        assert_eq!(others.label, OTHERS_LABEL);
        // cat10 (2) + cat11 (1)
        assert_eq!(others.count, 3);
    }

    #[test]
    fn frequency_table_skips_others_when_empty() {
        let values = categorical(&["A", "A", "B"]);
        let table = FrequencyTable::from_values(&values, None);
        assert!(
            table.bars.iter().all(|b| b.label != OTHERS_LABEL)
        );
    }

    #[test]
    fn unmapped_codes_pass_through() {
        let values = vec![
            RawValue::Number(1.0),
            RawValue::Number(1.0),
            RawValue::Number(2.0),
        ];
        let mapping =
            Mapping::from([("1".to_owned(), "One".to_owned())]);

        let table =
            FrequencyTable::from_values(&values, Some(&mapping));
        assert_eq!(table.bars[0].label, "One");
        assert_eq!(table.bars[1].label, "2");
    }

    #[test]
    fn bins_partition_range_without_gaps() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let bins = Bins::from_values(&values).unwrap();

        assert_eq!(bins.counts.len(), HISTOGRAM_BINS);
        assert_eq!(bins.min, 0.0);
        assert_eq!(bins.max, 100.0);
        assert_eq!(
            bins.counts.iter().sum::<u64>(),
            values.len() as u64
        );
        // The maximum value belongs to the final bin.
        assert!(bins.counts[HISTOGRAM_BINS - 1] > 0);
    }

    #[test]
    fn bins_handle_constant_column() {
        let bins = Bins::from_values(&[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(bins.counts[0], 3);
        assert_eq!(bins.counts.iter().sum::<u64>(), 3);
    }

    #[test]
    fn bins_reject_empty_input() {
        assert!(Bins::from_values(&[]).is_none());
    }

    #[test]
    fn cluster_palette_cycles() {
        assert_eq!(cluster_color(0), cluster_color(10));
        assert_ne!(cluster_color(0), cluster_color(1));
    }
}
