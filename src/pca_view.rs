use crate::actions::Action;
use crate::chart::{self, LOADING_SCALE};
use crate::store::{MAX_DIMENSIONALITY_INDEX, Store};
use eframe::egui;
use egui_plot::{
    Arrows, Line, LineStyle, Plot, PlotPoint, PlotPoints, Points,
    Text, VLine,
};

const LOADING_COLOR: egui::Color32 =
    egui::Color32::from_rgb(0xe4, 0x1a, 0x1c);
const SELECTED_COLOR: egui::Color32 =
    egui::Color32::from_rgb(0xa1, 0x25, 0x00);

/// How close (in screen pixels) a click must land to toggle an
/// eigenvalue point.
const CLICK_RADIUS: f32 = 12.0;

/// Scree plot of eigenvalues with clickable component selection,
/// plus the biplot for the active pair and the top-attributes table.
pub fn show(ui: &mut egui::Ui, store: &Store) -> Vec<Action> {
    let mut actions = Vec::new();

    let Some(overview) = &store.pca_overview else {
        ui.label("Fetching eigenvalues...");
        return actions;
    };

    let picked: Vec<String> = store
        .components
        .picked()
        .iter()
        .map(|i| format!("PC{}", i + 1))
        .collect();
    ui.horizontal(|ui| {
        ui.label("Click eigenvalues to pick up to two components.");
        if !picked.is_empty() {
            ui.label(format!("Selected: {}", picked.join(", ")));
        }
    });

    ui.columns(2, |columns| {
        if let Some(index) =
            show_scree(&mut columns[0], store, overview)
        {
            actions.push(Action::ToggleComponent { index });
        }
        show_biplot(&mut columns[1], store, overview);
    });

    ui.separator();
    actions.extend(show_attributes(ui, store));
    actions
}

fn show_scree(
    ui: &mut egui::Ui,
    store: &Store,
    overview: &crate::fetch::PcaOverviewPayload,
) -> Option<usize> {
    let style = &store.style;
    chart::title(ui, style, "Eigenvalues of the Sampled Dataset");

    let eigenvalues = &overview.eigenvalues;
    let curve: Vec<[f64; 2]> = eigenvalues
        .iter()
        .enumerate()
        .map(|(i, &value)| [i as f64, value])
        .collect();

    let mut plot = Plot::new("scree")
        .show_grid(style.show_grid)
        .allow_drag(false)
        .allow_scroll(false);
    if style.show_axis_labels {
        plot = plot
            .x_axis_label("Intrinsic Dimensionality Index")
            .y_axis_label("Eigenvalue");
    }

    let selected: Vec<[f64; 2]> = curve
        .iter()
        .copied()
        .filter(|p| store.components.contains(p[0] as usize))
        .collect();
    let elbow = overview.elbow_index;

    let response = plot.show(ui, |plot_ui| {
        plot_ui.vline(
            VLine::new("Elbow", elbow as f64)
                .style(LineStyle::dashed_loose())
                .color(egui::Color32::GRAY),
        );
        plot_ui.line(
            Line::new(
                "Eigenvalues",
                PlotPoints::from(curve.clone()),
            )
            .color(style.line_color)
            .width(style.stroke_width),
        );
        plot_ui.points(
            Points::new(
                "Eigenvalues",
                PlotPoints::from(curve.clone()),
            )
            .radius(5.0)
            .color(style.line_color),
        );
        if !selected.is_empty() {
            plot_ui.points(
                Points::new(
                    "Selected",
                    PlotPoints::from(selected.clone()),
                )
                .radius(8.0)
                .color(SELECTED_COLOR),
            );
        }

        // Click-to-toggle: nearest eigenvalue point within reach.
        if plot_ui.response().clicked()
            && let Some(pointer) =
                plot_ui.response().interact_pointer_pos()
        {
            let mut nearest: Option<(usize, f32)> = None;
            for point in &curve {
                let screen = plot_ui.screen_from_plot(
                    PlotPoint::new(point[0], point[1]),
                );
                let distance = screen.distance(pointer);
                if distance <= CLICK_RADIUS
                    && nearest
                        .is_none_or(|(_, best)| distance < best)
                {
                    nearest =
                        Some((point[0] as usize, distance));
                }
            }
            return nearest.map(|(index, _)| index);
        }
        None
    });

    response.inner
}

fn show_biplot(
    ui: &mut egui::Ui,
    store: &Store,
    overview: &crate::fetch::PcaOverviewPayload,
) {
    let style = &store.style;
    let pair = store.components.active_pair();

    chart::title(
        ui,
        style,
        &format!("Biplot PC{} / PC{}", pair.0 + 1, pair.1 + 1),
    );

    let Some(biplot) = &store.biplot else {
        ui.label("Fetching projection...");
        return;
    };

    let total: f64 = overview.eigenvalues.iter().sum();
    let share = |index: usize| -> f64 {
        if total > 0.0 {
            overview
                .eigenvalues
                .get(index)
                .map(|v| v / total * 100.0)
                .unwrap_or(0.0)
        } else {
            0.0
        }
    };

    let mut plot = Plot::new("biplot")
        .show_grid(style.show_grid)
        .data_aspect(1.0);
    if style.show_axis_labels {
        plot = plot
            .x_axis_label(format!(
                "PC{} ({:.1}%)",
                biplot.pair.0 + 1,
                share(biplot.pair.0)
            ))
            .y_axis_label(format!(
                "PC{} ({:.1}%)",
                biplot.pair.1 + 1,
                share(biplot.pair.1)
            ));
    }

    plot.show(ui, |plot_ui| {
        plot_ui.points(
            Points::new(
                "Observations",
                PlotPoints::from(biplot.points.clone()),
            )
            .radius(2.0)
            .color(style.point_color),
        );

        // One directed segment per feature, scaled from the origin,
        // labeled at the tip.
        let origins: Vec<[f64; 2]> =
            vec![[0.0, 0.0]; biplot.loadings.len()];
        let tips: Vec<[f64; 2]> = biplot
            .loadings
            .iter()
            .map(|row| {
                [row.x() * LOADING_SCALE, row.y() * LOADING_SCALE]
            })
            .collect();
        plot_ui.arrows(
            Arrows::new(
                "Loadings",
                PlotPoints::from(origins),
                PlotPoints::from(tips.clone()),
            )
            .color(LOADING_COLOR),
        );
        for (row, tip) in biplot.loadings.iter().zip(&tips) {
            plot_ui.text(
                Text::new(
                    "Loading labels",
                    PlotPoint::new(tip[0] * 1.1, tip[1] * 1.1),
                    row.feature().to_owned(),
                )
                .color(LOADING_COLOR),
            );
        }
    });
}

fn show_attributes(
    ui: &mut egui::Ui,
    store: &Store,
) -> Vec<Action> {
    use egui_extras::{Column, TableBuilder};

    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.label("Top attributes by squared loading sum:");
        let mut index = store.dimensionality_index;
        if ui
            .add(
                egui::DragValue::new(&mut index)
                    .range(2..=MAX_DIMENSIONALITY_INDEX),
            )
            .changed()
        {
            actions.push(Action::SetDimensionalityIndex { index });
        }
    });

    let Some(table) = store.attribute_table.get() else {
        ui.label("Fetching attributes...");
        return actions;
    };

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Feature");
            });
            header.col(|ui| {
                ui.strong("Squared loading sum");
            });
        })
        .body(|mut body| {
            for (name, weight) in
                table.names.iter().zip(&table.weights)
            {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(name);
                    });
                    row.col(|ui| {
                        ui.label(format!("{weight:.4}"));
                    });
                });
            }
        });

    actions
}
