use crate::actions::Action;
use crate::api::VariableKind;
use crate::cache::Cache;
use crate::chart::{self, Bins, ChartStyle, FrequencyTable};
use crate::store::Store;
use eframe::egui;
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

/// Variable pickers plus one chart: bar chart or histogram for a
/// single variable, scatterplot when a Y variable is set.
pub fn show(
    ui: &mut egui::Ui,
    store: &Store,
    cache: &mut Cache,
) -> Vec<Action> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.label("Variable:");
        let selected = store
            .x_variable
            .clone()
            .unwrap_or_else(|| "<none>".to_owned());
        egui::ComboBox::from_id_salt("x_variable")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for variable in &store.variables {
                    let picked =
                        store.x_variable.as_deref()
                            == Some(variable.as_str());
                    if ui
                        .selectable_label(picked, variable)
                        .clicked()
                        && !picked
                    {
                        actions.push(Action::SelectXVariable {
                            variable: variable.clone(),
                        });
                    }
                }
            });

        ui.label("against:");
        let selected_y = store
            .y_variable
            .clone()
            .unwrap_or_else(|| "None".to_owned());
        egui::ComboBox::from_id_salt("y_variable")
            .selected_text(selected_y)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(
                        store.y_variable.is_none(),
                        "None",
                    )
                    .clicked()
                    && store.y_variable.is_some()
                {
                    actions.push(Action::SelectYVariable {
                        variable: None,
                    });
                }
                for variable in &store.variables {
                    let picked =
                        store.y_variable.as_deref()
                            == Some(variable.as_str());
                    if ui
                        .selectable_label(picked, variable)
                        .clicked()
                        && !picked
                    {
                        actions.push(Action::SelectYVariable {
                            variable: Some(variable.clone()),
                        });
                    }
                }
            });

        // Orientation only applies to the single-variable charts.
        if store.y_variable.is_none() {
            let mut sideways = store.sideways;
            if ui.checkbox(&mut sideways, "Sideways").changed() {
                actions.push(Action::ToggleSideways);
            }
        }
    });
    ui.separator();

    if store.y_variable.is_some() {
        show_scatter(ui, store);
        return actions;
    }

    let Some(payload) = store.distribution.get() else {
        ui.label("Pick a variable to plot its distribution.");
        return actions;
    };

    match payload.kind {
        VariableKind::Categorical => {
            if let Some(table) = cache.frequency.get(store) {
                show_bar_chart(
                    ui,
                    &payload.variable,
                    table,
                    &store.style,
                    store.sideways,
                );
            }
        }
        VariableKind::Numerical => {
            if let Some(bins) = cache.bins.get(store) {
                show_histogram(
                    ui,
                    &payload.variable,
                    bins,
                    &store.style,
                    store.sideways,
                );
            } else {
                ui.label("No numeric values to bin.");
            }
        }
    }

    actions
}

fn show_bar_chart(
    ui: &mut egui::Ui,
    variable: &str,
    table: &FrequencyTable,
    style: &ChartStyle,
    sideways: bool,
) {
    chart::title(ui, style, &format!("Barchart of {variable}"));

    let labels: Vec<String> =
        table.bars.iter().map(|bar| bar.label.clone()).collect();
    let bars: Vec<Bar> = table
        .bars
        .iter()
        .enumerate()
        .map(|(index, bar)| {
            Bar::new(index as f64, bar.count as f64)
                .width(0.7)
                .fill(style.line_color)
        })
        .collect();

    let mut bar_chart = BarChart::new(variable.to_owned(), bars);
    if sideways {
        bar_chart = bar_chart.horizontal();
    }

    let formatter = move |mark: egui_plot::GridMark,
                          _range: &std::ops::RangeInclusive<f64>|
          -> String {
        let index = mark.value.round();
        if (mark.value - index).abs() < 1e-3
            && index >= 0.0
            && (index as usize) < labels.len()
        {
            labels[index as usize].clone()
        } else {
            String::new()
        }
    };

    let mut plot = Plot::new("distribution_bar")
        .show_grid(style.show_grid)
        .allow_drag(false)
        .allow_scroll(false);
    if sideways {
        plot = plot.y_axis_formatter(formatter);
        if style.show_axis_labels {
            plot = plot
                .x_axis_label("Count")
                .y_axis_label(variable.to_owned());
        }
    } else {
        plot = plot.x_axis_formatter(formatter);
        if style.show_axis_labels {
            plot = plot
                .x_axis_label(variable.to_owned())
                .y_axis_label("Count");
        }
    }

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(bar_chart);
    });
}

fn show_histogram(
    ui: &mut egui::Ui,
    variable: &str,
    bins: &Bins,
    style: &ChartStyle,
    sideways: bool,
) {
    chart::title(ui, style, &format!("Histogram of {variable}"));

    let bar_width = if bins.width > 0.0 { bins.width } else { 1.0 };
    let bars: Vec<Bar> = bins
        .counts
        .iter()
        .enumerate()
        .map(|(index, &count)| {
            Bar::new(bins.center(index), count as f64)
                .width(bar_width)
                .fill(style.line_color)
        })
        .collect();

    let mut bar_chart = BarChart::new(variable.to_owned(), bars);
    if sideways {
        bar_chart = bar_chart.horizontal();
    }

    let mut plot = Plot::new("distribution_histogram")
        .show_grid(style.show_grid)
        .allow_drag(false)
        .allow_scroll(false);
    if style.show_axis_labels {
        plot = if sideways {
            plot.x_axis_label("Count")
                .y_axis_label(variable.to_owned())
        } else {
            plot.x_axis_label(variable.to_owned())
                .y_axis_label("Count")
        };
    }

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(bar_chart);
    });
}

fn show_scatter(ui: &mut egui::Ui, store: &Store) {
    let style = &store.style;
    let Some(payload) = &store.scatter else {
        ui.label("Fetching both variables...");
        return;
    };

    chart::title(
        ui,
        style,
        &format!(
            "Scatterplot of {} vs {}",
            payload.x_variable, payload.y_variable
        ),
    );

    if payload.points.is_empty() {
        ui.label("No paired numeric observations to plot.");
        return;
    }

    let mut plot = Plot::new("distribution_scatter")
        .show_grid(style.show_grid)
        .legend(Legend::default());
    if style.show_axis_labels {
        plot = plot
            .x_axis_label(payload.x_variable.clone())
            .y_axis_label(payload.y_variable.clone());
    }

    let points = Points::new(
        format!("{} / {}", payload.x_variable, payload.y_variable),
        PlotPoints::from(payload.points.clone()),
    )
    .radius(3.0)
    .color(style.point_color);

    plot.show(ui, |plot_ui| {
        plot_ui.points(points);
    });
}
