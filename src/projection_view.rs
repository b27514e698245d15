use crate::actions::Action;
use crate::chart::{self, cluster_color};
use crate::store::Store;
use eframe::egui;
use egui_plot::{
    Legend, Plot, PlotPoint, PlotPoints, Points, Text,
};
use std::collections::BTreeMap;

/// MDS projections: observations colored by cluster on the left,
/// one labeled point per variable on the right.
pub fn show(ui: &mut egui::Ui, store: &Store) -> Vec<Action> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        if ui.button("Recompute MDS").clicked() {
            actions.push(Action::RecomputeMds);
        }
    });
    ui.separator();

    let Some(payload) = &store.mds else {
        ui.label("Fetching MDS projections...");
        return actions;
    };

    ui.columns(2, |columns| {
        show_data(&mut columns[0], store, payload);
        show_variables(&mut columns[1], store, payload);
    });

    actions
}

fn show_data(
    ui: &mut egui::Ui,
    store: &Store,
    payload: &crate::fetch::MdsPayload,
) {
    let style = &store.style;
    chart::title(ui, style, "MDS of the Sampled Data");

    let mut members: BTreeMap<u32, Vec<[f64; 2]>> = BTreeMap::new();
    for point in &payload.data {
        members
            .entry(point.cluster)
            .or_default()
            .push([point.x, point.y]);
    }

    let mut plot = Plot::new("mds_data")
        .show_grid(style.show_grid)
        .legend(Legend::default())
        .data_aspect(1.0);
    if style.show_axis_labels {
        plot = plot.x_axis_label("MDS1").y_axis_label("MDS2");
    }

    plot.show(ui, |plot_ui| {
        for (cluster, points) in &members {
            plot_ui.points(
                Points::new(
                    format!("Cluster {cluster}"),
                    PlotPoints::from(points.clone()),
                )
                .radius(2.5)
                .color(cluster_color(*cluster)),
            );
        }
    });
}

fn show_variables(
    ui: &mut egui::Ui,
    store: &Store,
    payload: &crate::fetch::MdsPayload,
) {
    let style = &store.style;
    chart::title(ui, style, "MDS of the Variables");

    let points: Vec<[f64; 2]> = payload
        .variables
        .iter()
        .map(|row| [row.x, row.y])
        .collect();

    let text_color = ui.visuals().text_color();
    let mut plot = Plot::new("mds_variables")
        .show_grid(style.show_grid)
        .data_aspect(1.0);
    if style.show_axis_labels {
        plot = plot.x_axis_label("MDS1").y_axis_label("MDS2");
    }

    plot.show(ui, |plot_ui| {
        plot_ui.points(
            Points::new(
                "Variables",
                PlotPoints::from(points),
            )
            .radius(4.0)
            .color(style.line_color),
        );
        for row in &payload.variables {
            plot_ui.text(
                Text::new(
                    "Variable labels",
                    PlotPoint::new(row.x, row.y + 0.03),
                    row.variable.clone(),
                )
                .color(text_color),
            );
        }
    });
}
