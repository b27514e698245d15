use crate::actions::Action;
use crate::chart::{self, cluster_color};
use crate::store::{
    MAX_CLUSTER_COUNT, MIN_CLUSTER_COUNT, Store,
};
use eframe::egui;
use egui_plot::{
    Legend, Line, LineStyle, Plot, PlotPoints, Points, Polygon,
    VLine,
};
use std::collections::BTreeMap;

/// Segments used to approximate a cluster boundary circle. Drawn in
/// plot coordinates so pan/zoom rescales centers and points
/// together.
const CIRCLE_SEGMENTS: usize = 48;

pub fn show(ui: &mut egui::Ui, store: &Store) -> Vec<Action> {
    let mut actions = Vec::new();

    let Some(overview) = &store.cluster_overview else {
        ui.label("Fetching clustering summary...");
        return actions;
    };

    ui.horizontal(|ui| {
        ui.label("k:");
        let mut k = store
            .selected_k
            .unwrap_or(overview.best_k)
            .clamp(MIN_CLUSTER_COUNT, MAX_CLUSTER_COUNT);
        if ui
            .add(egui::Slider::new(
                &mut k,
                MIN_CLUSTER_COUNT..=MAX_CLUSTER_COUNT,
            ))
            .changed()
        {
            actions.push(Action::SetClusterCount { k });
        }
        ui.label(format!("(best k: {})", overview.best_k));
    });

    ui.columns(2, |columns| {
        show_elbow(&mut columns[0], store, overview);
        show_clusters(&mut columns[1], store);
    });

    actions
}

fn show_elbow(
    ui: &mut egui::Ui,
    store: &Store,
    overview: &crate::fetch::ClusterOverviewPayload,
) {
    let style = &store.style;
    chart::title(ui, style, "MSE per k");

    let curve: Vec<[f64; 2]> =
        overview.mse.iter().map(|&(k, mse)| [k, mse]).collect();

    let mut plot = Plot::new("kmeans_mse")
        .show_grid(style.show_grid)
        .allow_drag(false)
        .allow_scroll(false);
    if style.show_axis_labels {
        plot = plot.x_axis_label("k").y_axis_label("MSE");
    }

    plot.show(ui, |plot_ui| {
        plot_ui.vline(
            VLine::new("Best k", overview.best_k as f64)
                .style(LineStyle::dashed_loose())
                .color(egui::Color32::GRAY),
        );
        plot_ui.line(
            Line::new("MSE", PlotPoints::from(curve.clone()))
                .color(style.line_color)
                .width(style.stroke_width),
        );
        plot_ui.points(
            Points::new("MSE", PlotPoints::from(curve))
                .radius(4.0)
                .color(style.line_color),
        );
    });
}

fn show_clusters(ui: &mut egui::Ui, store: &Store) {
    let style = &store.style;

    let Some(slice) = &store.cluster_slice else {
        ui.label("Fetching cluster assignments...");
        return;
    };

    chart::title(
        ui,
        style,
        &format!("K-means clusters (k = {})", slice.k),
    );

    // Group member points per cluster so each cluster is one
    // legend entry in its palette color.
    let mut members: BTreeMap<u32, Vec<[f64; 2]>> = BTreeMap::new();
    for point in &slice.points {
        if point.coordinates.len() >= 2 {
            members.entry(point.cluster_id).or_default().push([
                point.coordinates[0],
                point.coordinates[1],
            ]);
        }
    }

    let plot = Plot::new("kmeans_clusters")
        .show_grid(style.show_grid)
        .legend(Legend::default())
        .data_aspect(1.0);

    plot.show(ui, |plot_ui| {
        for (cluster_id, points) in &members {
            plot_ui.points(
                Points::new(
                    format!("Cluster {cluster_id}"),
                    PlotPoints::from(points.clone()),
                )
                .radius(2.5)
                .color(cluster_color(*cluster_id)),
            );
        }

        for center in &slice.centers {
            if center.coordinates.len() < 2 {
                continue;
            }
            let color = cluster_color(center.cluster_id);
            plot_ui.polygon(
                Polygon::new(
                    format!("Cluster {}", center.cluster_id),
                    PlotPoints::from(circle(
                        center.coordinates[0],
                        center.coordinates[1],
                        center.radius,
                    )),
                )
                .fill_color(color.gamma_multiply(0.1))
                .stroke(egui::Stroke::new(
                    style.stroke_width,
                    color,
                )),
            );
            plot_ui.points(
                Points::new(
                    format!("Cluster {}", center.cluster_id),
                    PlotPoints::from(vec![[
                        center.coordinates[0],
                        center.coordinates[1],
                    ]]),
                )
                .radius(5.0)
                .color(color),
            );
        }
    });
}

fn circle(cx: f64, cy: f64, radius: f64) -> Vec<[f64; 2]> {
    (0..CIRCLE_SEGMENTS)
        .map(|segment| {
            let angle = std::f64::consts::TAU * segment as f64
                / CIRCLE_SEGMENTS as f64;
            [
                cx + radius * angle.cos(),
                cy + radius * angle.sin(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_points_sit_on_the_radius() {
        let points = circle(1.0, -2.0, 3.0);
        assert_eq!(points.len(), CIRCLE_SEGMENTS);
        for [x, y] in points {
            let distance =
                ((x - 1.0).powi(2) + (y + 2.0).powi(2)).sqrt();
            assert!((distance - 3.0).abs() < 1e-9);
        }
    }
}
