use crate::actions::Action;
use crate::alerts;
use crate::cluster_view;
use crate::distribution_view;
use crate::effects::{self, Effect};
use crate::fetch::{Backend, FetchResult};
use crate::matrix_view;
use crate::parallel_view;
use crate::pca_view;
use crate::projection_view;
use crate::state::State;
use crate::store::{ActiveView, InFlight, Store};
use eframe::egui;

/// Root application: owns the state, polls in-flight fetches, draws
/// the toolbar, the tab strip, and the active view.
pub struct DashboardApp {
    state: State,
}

impl DashboardApp {
    pub fn new(backend: Backend) -> Self {
        let mut state = State::new(Store::new(backend));
        // The variable list drives every picker; start loading it
        // immediately.
        effects::run(&mut state.store, Effect::FetchHeaders);
        Self { state }
    }
}

fn poll<T, F>(
    slot: &mut Option<InFlight<T>>,
    actions: &mut Vec<Action>,
    to_action: F,
) where
    T: Send + 'static,
    F: FnOnce(u64, FetchResult<T>) -> Action,
{
    if let Some(inflight) = slot.take() {
        match inflight.promise.try_take() {
            Ok(result) => {
                actions.push(to_action(inflight.seq, result))
            }
            Err(promise) => {
                *slot = Some(InFlight {
                    seq: inflight.seq,
                    promise,
                });
            }
        }
    }
}

/// Turn completed fetches into actions. Stale completions are
/// filtered by the reducer, not here.
fn poll_pending(store: &mut Store, actions: &mut Vec<Action>) {
    poll(&mut store.pending.headers, actions, |seq, result| {
        Action::HeadersLoaded { seq, result }
    });
    poll(&mut store.pending.sample, actions, |seq, result| {
        Action::SamplePipelineFinished { seq, result }
    });
    poll(
        &mut store.pending.distribution,
        actions,
        |seq, result| Action::DistributionLoaded { seq, result },
    );
    poll(&mut store.pending.scatter, actions, |seq, result| {
        Action::ScatterLoaded { seq, result }
    });
    poll(
        &mut store.pending.pca_overview,
        actions,
        |seq, result| Action::PcaOverviewLoaded { seq, result },
    );
    poll(&mut store.pending.biplot, actions, |seq, result| {
        Action::BiplotLoaded { seq, result }
    });
    poll(&mut store.pending.attributes, actions, |seq, result| {
        Action::AttributesLoaded { seq, result }
    });
    poll(
        &mut store.pending.cluster_overview,
        actions,
        |seq, result| Action::ClusterOverviewLoaded { seq, result },
    );
    poll(
        &mut store.pending.cluster_slice,
        actions,
        |seq, result| Action::ClusterSliceLoaded { seq, result },
    );
    poll(&mut store.pending.mds, actions, |seq, result| {
        Action::MdsLoaded { seq, result }
    });
    poll(&mut store.pending.parallel, actions, |seq, result| {
        Action::ParallelLoaded { seq, result }
    });
}

impl DashboardApp {
    fn show_toolbar(&mut self, ctx: &egui::Context) {
        let mut actions: Vec<Action> = Vec::new();
        let store = &self.state.store;

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Datascope").strong());
                ui.separator();

                ui.label("Samples:");
                let mut count = store.sample_size;
                if ui
                    .add(
                        egui::DragValue::new(&mut count)
                            .range(10..=10_000),
                    )
                    .changed()
                {
                    actions
                        .push(Action::SetSampleSize { count });
                }

                let mut drop_none = store.drop_none;
                if ui
                    .checkbox(&mut drop_none, "Drop missing")
                    .changed()
                {
                    actions.push(Action::SetDropNone {
                        drop: drop_none,
                    });
                }
                let mut drop_categorical = store.drop_categorical;
                if ui
                    .checkbox(
                        &mut drop_categorical,
                        "Drop categorical",
                    )
                    .changed()
                {
                    actions.push(Action::SetDropCategorical {
                        drop: drop_categorical,
                    });
                }

                if store.pending.sample.is_some() {
                    ui.spinner();
                    ui.label("Resampling...");
                } else if ui.button("Update data").clicked() {
                    actions.push(Action::UpdateData);
                }
                if ui.button("Reset").clicked() {
                    actions.push(Action::ResetSampling);
                }

                ui.separator();
                ui.menu_button("Display", |ui| {
                    let style = &store.style;

                    let mut show_grid = style.show_grid;
                    if ui
                        .checkbox(&mut show_grid, "Grid lines")
                        .changed()
                    {
                        actions.push(Action::SetShowGrid {
                            show: show_grid,
                        });
                    }
                    let mut show_labels = style.show_axis_labels;
                    if ui
                        .checkbox(&mut show_labels, "Axis labels")
                        .changed()
                    {
                        actions.push(Action::SetShowAxisLabels {
                            show: show_labels,
                        });
                    }
                    let mut show_titles = style.show_titles;
                    if ui
                        .checkbox(&mut show_titles, "Titles")
                        .changed()
                    {
                        actions.push(Action::SetShowTitles {
                            show: show_titles,
                        });
                    }

                    let mut width = style.stroke_width;
                    if ui
                        .add(
                            egui::Slider::new(&mut width, 0.5..=8.0)
                                .text("Stroke width"),
                        )
                        .changed()
                    {
                        actions
                            .push(Action::SetStrokeWidth { width });
                    }

                    let mut line_color = style.line_color;
                    ui.horizontal(|ui| {
                        ui.label("Line color:");
                        if ui
                            .color_edit_button_srgba(&mut line_color)
                            .changed()
                        {
                            actions.push(Action::SetLineColor {
                                color: line_color,
                            });
                        }
                    });
                    let mut point_color = style.point_color;
                    ui.horizontal(|ui| {
                        ui.label("Point color:");
                        if ui
                            .color_edit_button_srgba(
                                &mut point_color,
                            )
                            .changed()
                        {
                            actions.push(Action::SetPointColor {
                                color: point_color,
                            });
                        }
                    });
                });
            });
        });

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for view in ActiveView::ALL {
                    if ui
                        .selectable_label(
                            store.active_view == view,
                            view.label(),
                        )
                        .clicked()
                        && store.active_view != view
                    {
                        actions
                            .push(Action::SetActiveView { view });
                    }
                }
            });
        });

        for action in actions {
            self.state.dispatch(action);
        }
    }

    fn show_central(&mut self, ctx: &egui::Context) {
        let view = self.state.store.active_view;
        let mut actions: Vec<Action> = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &mut self.state;
            actions = match view {
                ActiveView::Distribution => distribution_view::show(
                    ui,
                    &state.store,
                    &mut state.cache,
                ),
                ActiveView::Pca => pca_view::show(ui, &state.store),
                ActiveView::Clustering => {
                    cluster_view::show(ui, &state.store)
                }
                ActiveView::Projection => {
                    projection_view::show(ui, &state.store)
                }
                ActiveView::ParallelCoords => parallel_view::show(
                    ui,
                    &state.store,
                    &mut state.cache,
                ),
                ActiveView::Matrix => matrix_view::show(
                    ui,
                    &state.store,
                    &mut state.cache,
                ),
            };
        });

        for action in actions {
            self.state.dispatch(action);
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(
        &mut self,
        ctx: &egui::Context,
        _frame: &mut eframe::Frame,
    ) {
        let now = ctx.input(|i| i.time);
        let mut actions = vec![Action::TickAlerts { now }];
        poll_pending(&mut self.state.store, &mut actions);
        for action in actions {
            self.state.dispatch(action);
        }
        // Apply completed fetches before drawing so fresh payloads
        // render in the same frame.
        self.state.flush_actions();
        self.state.flush_effects();

        self.show_toolbar(ctx);
        self.show_central(ctx);
        alerts::draw(ctx, &self.state.store.alerts);

        // Apply everything the views dispatched this frame.
        self.state.flush_actions();
        self.state.flush_effects();

        if self.state.store.pending.any()
            || !self.state.store.alerts.is_empty()
        {
            ctx.request_repaint_after(
                std::time::Duration::from_millis(100),
            );
        }
    }
}
