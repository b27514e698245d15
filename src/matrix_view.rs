use crate::actions::Action;
use crate::cache::Cache;
use crate::chart;
use crate::fetch::AttributeTablePayload;
use crate::store::{Brush, Store};
use eframe::egui;
use egui_plot::{Plot, PlotPoints, Points, Polygon};

const MIN_CELL_SIZE: f32 = 130.0;
const DIMMED_OPACITY: f32 = 0.15;

/// Dim mask for the whole matrix: `true` marks observations falling
/// outside the brushed rectangle, tested in the brushed cell's own
/// (x-variable, y-variable) value space.
pub fn dimming_mask(
    table: &AttributeTablePayload,
    brush: &Brush,
) -> Vec<bool> {
    table
        .rows
        .iter()
        .map(|row| {
            let x = row[brush.col];
            let y = row[brush.row];
            !brush.contains(x, y)
        })
        .collect()
}

/// N x N grid of scatterplots over the top PCA attributes, diagonal
/// included. A rectangular drag in any cell dims observations
/// outside it across every cell.
pub fn show(
    ui: &mut egui::Ui,
    store: &Store,
    cache: &mut Cache,
) -> Vec<Action> {
    let mut actions = Vec::new();

    let Some(table) = store.attribute_table.get() else {
        ui.label("Fetching attribute data...");
        return actions;
    };
    let n = table.names.len();
    if n == 0 || table.rows.is_empty() {
        ui.label("No attribute data to plot.");
        return actions;
    }

    ui.horizontal(|ui| {
        ui.label("Drag inside a cell to brush; linked across cells.");
        if store.brush.is_some() && ui.button("Clear brush").clicked()
        {
            actions.push(Action::ClearBrush);
        }
    });
    chart::title(ui, &store.style, "Scatterplot Matrix");

    let domains = cache.matrix_domains.get(store).clone();
    let mask = store
        .brush
        .map(|brush| dimming_mask(table, &brush));

    let cell = ((ui.available_width() - 80.0) / n as f32)
        .max(MIN_CELL_SIZE)
        .min(ui.available_height() / n as f32 - 4.0)
        .max(MIN_CELL_SIZE);

    egui::ScrollArea::both().show(ui, |ui| {
        egui::Grid::new("scatter_matrix").show(ui, |ui| {
            ui.label("");
            for name in &table.names {
                ui.label(egui::RichText::new(name).strong());
            }
            ui.end_row();

            for row in 0..n {
                ui.label(
                    egui::RichText::new(&table.names[row]).strong(),
                );
                for col in 0..n {
                    actions.extend(show_cell(
                        ui,
                        store,
                        table,
                        &domains,
                        mask.as_deref(),
                        row,
                        col,
                        cell,
                    ));
                }
                ui.end_row();
            }
        });
    });

    actions
}

#[allow(clippy::too_many_arguments)]
fn show_cell(
    ui: &mut egui::Ui,
    store: &Store,
    table: &AttributeTablePayload,
    domains: &[(f64, f64)],
    mask: Option<&[bool]>,
    row: usize,
    col: usize,
    cell_size: f32,
) -> Vec<Action> {
    let mut actions = Vec::new();
    let style = &store.style;

    let mut active: Vec<[f64; 2]> = Vec::new();
    let mut dimmed: Vec<[f64; 2]> = Vec::new();
    for (index, data_row) in table.rows.iter().enumerate() {
        let point = [data_row[col], data_row[row]];
        if mask.is_some_and(|mask| mask[index]) {
            dimmed.push(point);
        } else {
            active.push(point);
        }
    }

    let (x_min, x_max) = domains[col];
    let (y_min, y_max) = domains[row];

    let plot = Plot::new(("matrix_cell", row, col))
        .width(cell_size)
        .height(cell_size)
        .show_grid(style.show_grid)
        .show_axes(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .include_x(x_min)
        .include_x(x_max)
        .include_y(y_min)
        .include_y(y_max);

    let response = plot.show(ui, |plot_ui| {
        if !dimmed.is_empty() {
            plot_ui.points(
                Points::new(
                    "Dimmed",
                    PlotPoints::from(dimmed.clone()),
                )
                .radius(1.5)
                .color(
                    style
                        .point_color
                        .gamma_multiply(DIMMED_OPACITY),
                ),
            );
        }
        plot_ui.points(
            Points::new(
                "Observations",
                PlotPoints::from(active.clone()),
            )
            .radius(1.5)
            .color(style.point_color),
        );

        // Outline the brush rectangle in its own cell.
        if let Some(brush) = &store.brush
            && brush.row == row
            && brush.col == col
            && !brush.is_degenerate()
        {
            let min = brush.min();
            let max = brush.max();
            plot_ui.polygon(
                Polygon::new(
                    "Brush",
                    PlotPoints::from(vec![
                        [min[0], min[1]],
                        [max[0], min[1]],
                        [max[0], max[1]],
                        [min[0], max[1]],
                    ]),
                )
                .fill_color(
                    style.line_color.gamma_multiply(0.08),
                )
                .stroke(egui::Stroke::new(
                    1.0,
                    style.line_color,
                )),
            );
        }

        let response = plot_ui.response().clone();
        (
            response.drag_started(),
            response.dragged(),
            response.drag_stopped(),
            plot_ui.pointer_coordinate(),
        )
    });

    let (drag_started, dragged, drag_stopped, pointer) =
        response.inner;
    let brushing_here = store
        .brush
        .is_some_and(|brush| brush.row == row && brush.col == col);

    if drag_started && let Some(at) = pointer {
        actions.push(Action::BrushStarted {
            row,
            col,
            at: [at.x, at.y],
        });
    } else if dragged
        && brushing_here
        && let Some(at) = pointer
    {
        actions.push(Action::BrushMoved { at: [at.x, at.y] });
    }
    if drag_stopped && brushing_here {
        actions.push(Action::BrushFinished);
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AttributeTablePayload {
        AttributeTablePayload {
            names: vec!["a".to_owned(), "b".to_owned()],
            weights: vec![0.9, 0.4],
            rows: vec![
                vec![1.0, 10.0],
                vec![2.0, 20.0],
                vec![3.0, 30.0],
            ],
        }
    }

    #[test]
    fn mask_dims_points_outside_the_rectangle() {
        // Brush drawn in cell (row=1, col=0): x is attribute "a",
        // y is attribute "b".
        let brush = Brush {
            row: 1,
            col: 0,
            start: [0.5, 5.0],
            end: [2.5, 25.0],
        };
        let mask = dimming_mask(&table(), &brush);
        assert_eq!(mask, vec![false, false, true]);
    }

    #[test]
    fn mask_respects_the_brushed_cells_axes() {
        // Same rectangle anchored to the transposed cell selects
        // differently because the axes swap.
        let brush = Brush {
            row: 0,
            col: 1,
            start: [5.0, 0.5],
            end: [25.0, 2.5],
        };
        let mask = dimming_mask(&table(), &brush);
        assert_eq!(mask, vec![false, false, true]);
    }
}
