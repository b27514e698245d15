use crate::actions::Action;
use crate::api::VariableKind;
use crate::cache::Cache;
use crate::chart;
use crate::fetch::ParallelColumn;
use crate::store::Store;
use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints, VLine};

/// Per-axis drawing data: every observation normalized into [0, 1]
/// along that axis. Numeric axes normalize linearly over the column
/// range; categorical axes use the rank of the sorted distinct
/// levels.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisGeometry {
    pub name: String,
    pub kind: VariableKind,
    pub normalized: Vec<Option<f64>>,
    /// Distinct levels, bottom to top; empty for numeric axes.
    pub levels: Vec<String>,
}

pub fn axis_geometry(column: &ParallelColumn) -> AxisGeometry {
    match column.kind {
        VariableKind::Numerical => {
            let numbers: Vec<Option<f64>> = column
                .values
                .iter()
                .map(|value| value.as_number())
                .collect();
            let present: Vec<f64> =
                numbers.iter().filter_map(|n| *n).collect();
            let min = present
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);
            let max = present
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            let span = max - min;

            let normalized = numbers
                .into_iter()
                .map(|number| {
                    number.map(|n| {
                        if span > 0.0 {
                            (n - min) / span
                        } else {
                            0.5
                        }
                    })
                })
                .collect();

            AxisGeometry {
                name: column.name.clone(),
                kind: column.kind,
                normalized,
                levels: Vec::new(),
            }
        }
        VariableKind::Categorical => {
            let mut levels: Vec<String> = column
                .values
                .iter()
                .filter_map(|value| value.key())
                .collect();
            levels.sort();
            levels.dedup();

            let position = |key: &str| -> f64 {
                let rank = levels
                    .iter()
                    .position(|level| level == key)
                    .unwrap_or(0);
                if levels.len() > 1 {
                    rank as f64 / (levels.len() - 1) as f64
                } else {
                    0.5
                }
            };

            let normalized = column
                .values
                .iter()
                .map(|value| {
                    value.key().map(|key| position(&key))
                })
                .collect();

            AxisGeometry {
                name: column.name.clone(),
                kind: column.kind,
                normalized,
                levels,
            }
        }
    }
}

/// Parallel-coordinates plot: one vertical axis per dimension, one
/// polyline per observation. Clicking an axis label toggles it into
/// the explicit reordering list.
pub fn show(
    ui: &mut egui::Ui,
    store: &Store,
    cache: &mut Cache,
) -> Vec<Action> {
    let mut actions = Vec::new();

    if store.parallel.get().is_none() {
        ui.label("Fetching columns...");
        return actions;
    }

    let ordered = store.ordered_axes();

    ui.horizontal_wrapped(|ui| {
        ui.label("Axes (click to reorder):");
        for name in &ordered {
            let label = match store.axis_pin_position(name) {
                Some(position) => format!("{name} ({position})"),
                None => name.clone(),
            };
            if ui
                .selectable_label(
                    store.axis_pin_position(name).is_some(),
                    label,
                )
                .clicked()
            {
                actions.push(Action::ToggleAxisPin {
                    variable: name.clone(),
                });
            }
        }
    });

    let style = &store.style;
    chart::title(ui, style, "Parallel Coordinates");

    let axes = cache.parallel_axes.get(store);
    let by_name = |name: &str| {
        axes.iter().find(|axis| axis.name == name)
    };
    let ordered_axes: Vec<&AxisGeometry> =
        ordered.iter().filter_map(|name| by_name(name)).collect();

    if ordered_axes.len() < 2 {
        ui.label("Need at least two columns to draw polylines.");
        return actions;
    }

    let observation_count = ordered_axes
        .iter()
        .map(|axis| axis.normalized.len())
        .min()
        .unwrap_or(0);

    let line_color = style.line_color.gamma_multiply(0.25);
    let stroke_width = style.stroke_width * 0.5;

    let plot = Plot::new("parallel_coordinates")
        .show_grid(false)
        .show_axes(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .include_y(-0.05)
        .include_y(1.05);

    plot.show(ui, |plot_ui| {
        for (position, axis) in ordered_axes.iter().enumerate() {
            plot_ui.vline(
                VLine::new(
                    axis.name.clone(),
                    position as f64,
                )
                .color(egui::Color32::GRAY)
                .width(1.0),
            );
        }

        for observation in 0..observation_count {
            let polyline: Option<Vec<[f64; 2]>> = ordered_axes
                .iter()
                .enumerate()
                .map(|(position, axis)| {
                    axis.normalized[observation]
                        .map(|y| [position as f64, y])
                })
                .collect();
            // Observations missing a value on any axis are skipped
            // rather than partially drawn.
            let Some(polyline) = polyline else { continue };

            plot_ui.line(
                Line::new(
                    "Observations",
                    PlotPoints::from(polyline),
                )
                .color(line_color)
                .width(stroke_width),
            );
        }
    });

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RawValue;

    fn numeric_column(values: &[f64]) -> ParallelColumn {
        ParallelColumn {
            name: "age".to_owned(),
            kind: VariableKind::Numerical,
            values: values
                .iter()
                .map(|&v| RawValue::Number(v))
                .collect(),
        }
    }

    #[test]
    fn numeric_axis_normalizes_linearly() {
        let axis =
            axis_geometry(&numeric_column(&[0.0, 5.0, 10.0]));
        assert_eq!(
            axis.normalized,
            vec![Some(0.0), Some(0.5), Some(1.0)]
        );
    }

    #[test]
    fn constant_numeric_axis_centers_values() {
        let axis = axis_geometry(&numeric_column(&[7.0, 7.0]));
        assert_eq!(axis.normalized, vec![Some(0.5), Some(0.5)]);
    }

    #[test]
    fn categorical_axis_ranks_sorted_levels() {
        let column = ParallelColumn {
            name: "segment".to_owned(),
            kind: VariableKind::Categorical,
            values: vec![
                RawValue::Text("B".to_owned()),
                RawValue::Text("A".to_owned()),
                RawValue::Text("C".to_owned()),
                RawValue::Null,
            ],
        };
        let axis = axis_geometry(&column);
        assert_eq!(axis.levels, vec!["A", "B", "C"]);
        assert_eq!(
            axis.normalized,
            vec![Some(0.5), Some(0.0), Some(1.0), None]
        );
    }
}
