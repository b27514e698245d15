use crate::effects::Effect;
use crate::fetch::{
    AttributeTablePayload, BiplotPayload, ClusterOverviewPayload,
    ClusterSlicePayload, DistributionPayload, FetchResult,
    MdsPayload, ParallelPayload, PcaOverviewPayload, ScatterPayload,
};
use crate::store::{
    ActiveView, Brush, MAX_CLUSTER_COUNT, MAX_DIMENSIONALITY_INDEX,
    MIN_CLUSTER_COUNT, DEFAULT_SAMPLE_SIZE, Store,
};
use eframe::egui;

/// Actions dispatched by the views to modify the dashboard state.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    /// Switch the central view
    SetActiveView { view: ActiveView },

    // Sampling toolbar
    SetSampleSize { count: u32 },
    SetDropNone { drop: bool },
    SetDropCategorical { drop: bool },
    /// Restore the sampling defaults
    ResetSampling,
    /// Resample the dataset and re-run the backend analyses
    UpdateData,
    SamplePipelineFinished {
        seq: u64,
        result: FetchResult<String>,
    },
    HeadersLoaded {
        seq: u64,
        result: FetchResult<Vec<String>>,
    },

    // Distribution view
    SelectXVariable { variable: String },
    SelectYVariable { variable: Option<String> },
    /// Swap which scale is bound to which screen axis
    ToggleSideways,
    DistributionLoaded {
        seq: u64,
        result: FetchResult<DistributionPayload>,
    },
    ScatterLoaded {
        seq: u64,
        result: FetchResult<ScatterPayload>,
    },

    // Style-only controls; none of these touch the network
    SetShowGrid { show: bool },
    SetShowAxisLabels { show: bool },
    SetShowTitles { show: bool },
    SetStrokeWidth { width: f32 },
    SetLineColor { color: egui::Color32 },
    SetPointColor { color: egui::Color32 },

    // PCA view
    /// Toggle an eigenvalue index in the component selection
    ToggleComponent { index: usize },
    SetDimensionalityIndex { index: u32 },
    PcaOverviewLoaded {
        seq: u64,
        result: FetchResult<PcaOverviewPayload>,
    },
    BiplotLoaded {
        seq: u64,
        result: FetchResult<BiplotPayload>,
    },
    AttributesLoaded {
        seq: u64,
        result: FetchResult<AttributeTablePayload>,
    },

    // Clustering view
    SetClusterCount { k: u32 },
    ClusterOverviewLoaded {
        seq: u64,
        result: FetchResult<ClusterOverviewPayload>,
    },
    ClusterSliceLoaded {
        seq: u64,
        result: FetchResult<ClusterSlicePayload>,
    },

    // MDS view
    RecomputeMds,
    MdsLoaded {
        seq: u64,
        result: FetchResult<MdsPayload>,
    },

    // Parallel coordinates view
    /// Toggle an axis in the explicit reordering list
    ToggleAxisPin { variable: String },
    ParallelLoaded {
        seq: u64,
        result: FetchResult<ParallelPayload>,
    },

    // Scatter matrix view
    BrushStarted {
        row: usize,
        col: usize,
        at: [f64; 2],
    },
    BrushMoved { at: [f64; 2] },
    BrushFinished,
    ClearBrush,

    // Housekeeping
    TickAlerts { now: f64 },
}

/// True when a completion still matches the latest issued fetch for
/// its view. Stale completions are logged and dropped so a slow
/// response cannot overwrite a newer render.
fn is_fresh(view: &str, seq: u64, latest: u64) -> bool {
    if seq == latest {
        true
    } else {
        log::debug!(
            "discarding stale {view} response (seq {seq}, latest {latest})"
        );
        false
    }
}

fn report_error(store: &mut Store, err: &crate::fetch::FetchError) {
    log::error!("{err}");
    store.alerts.error(err.to_string());
}

/// Effects that (re)load whatever the given view is missing. Views
/// load lazily: on first display and after invalidation.
fn ensure_view_data(store: &Store, view: ActiveView) -> Vec<Effect> {
    let mut effects = Vec::new();
    match view {
        ActiveView::Distribution => {
            if let Some(x) = &store.x_variable {
                match &store.y_variable {
                    Some(y) => {
                        if store.scatter.is_none()
                            && store.pending.scatter.is_none()
                        {
                            effects.push(Effect::FetchScatter {
                                x: x.clone(),
                                y: y.clone(),
                            });
                        }
                    }
                    None => {
                        if store.distribution.get().is_none()
                            && store.pending.distribution.is_none()
                        {
                            effects.push(Effect::FetchDistribution {
                                variable: x.clone(),
                            });
                        }
                    }
                }
            }
        }
        ActiveView::Pca => {
            if store.pca_overview.is_none()
                && store.pending.pca_overview.is_none()
            {
                effects.push(Effect::FetchPcaOverview);
            }
            if store.biplot.is_none()
                && store.pending.biplot.is_none()
            {
                effects.push(Effect::FetchBiplot {
                    pair: store.components.active_pair(),
                });
            }
            if store.attribute_table.get().is_none()
                && store.pending.attributes.is_none()
            {
                effects.push(Effect::FetchAttributeTable {
                    dimensionality_index: store.dimensionality_index,
                });
            }
        }
        ActiveView::Clustering => {
            if store.cluster_overview.is_none()
                && store.pending.cluster_overview.is_none()
            {
                effects.push(Effect::FetchClusterOverview);
            }
        }
        ActiveView::Projection => {
            if store.mds.is_none() && store.pending.mds.is_none() {
                effects.push(Effect::FetchMds { recompute: false });
            }
        }
        ActiveView::ParallelCoords => {
            if store.parallel.get().is_none()
                && store.pending.parallel.is_none()
                && !store.variables.is_empty()
            {
                effects.push(Effect::FetchParallel {
                    variables: store.variables.clone(),
                });
            }
        }
        ActiveView::Matrix => {
            if store.attribute_table.get().is_none()
                && store.pending.attributes.is_none()
            {
                effects.push(Effect::FetchAttributeTable {
                    dimensionality_index: store.dimensionality_index,
                });
            }
        }
    }
    effects
}

/// Apply a single action to the store, returning the deferred
/// effects it produces. This is the only place state is mutated.
pub fn update(store: &mut Store, action: Action) -> Vec<Effect> {
    match action {
        // Navigation
        Action::SetActiveView { view } => {
            store.active_view = view;
            ensure_view_data(store, view)
        }

        // Sampling toolbar
        Action::SetSampleSize { count } => {
            store.sample_size = count;
            vec![]
        }
        Action::SetDropNone { drop } => {
            store.drop_none = drop;
            vec![]
        }
        Action::SetDropCategorical { drop } => {
            store.drop_categorical = drop;
            vec![]
        }
        Action::ResetSampling => {
            store.sample_size = DEFAULT_SAMPLE_SIZE;
            store.drop_none = true;
            store.drop_categorical = true;
            vec![]
        }
        Action::UpdateData => {
            vec![Effect::RunSamplePipeline {
                count: store.sample_size,
                drop_none: store.drop_none,
                drop_categorical: store.drop_categorical,
            }]
        }
        Action::SamplePipelineFinished { seq, result } => {
            if !is_fresh("sample", seq, store.seq.sample) {
                return vec![];
            }
            match result {
                Ok(message) => {
                    store.alerts.success(message);
                    store.invalidate_artifacts();
                    let mut effects = vec![Effect::FetchHeaders];
                    effects.extend(ensure_view_data(
                        store,
                        store.active_view,
                    ));
                    effects
                }
                Err(err) => {
                    report_error(store, &err);
                    vec![]
                }
            }
        }
        Action::HeadersLoaded { seq, result } => {
            if !is_fresh("headers", seq, store.seq.headers) {
                return vec![];
            }
            match result {
                Ok(variables) => {
                    if let Some(x) = &store.x_variable
                        && !variables.contains(x)
                    {
                        store.x_variable = None;
                    }
                    if let Some(y) = &store.y_variable
                        && !variables.contains(y)
                    {
                        store.y_variable = None;
                    }
                    if store.x_variable.is_none() {
                        store.x_variable = variables.first().cloned();
                        store.distribution.set(None);
                    }
                    store.variables = variables;
                    ensure_view_data(store, store.active_view)
                }
                Err(err) => {
                    report_error(store, &err);
                    vec![]
                }
            }
        }

        // Distribution view
        Action::SelectXVariable { variable } => {
            store.x_variable = Some(variable.clone());
            match &store.y_variable {
                Some(y) => vec![Effect::FetchScatter {
                    x: variable,
                    y: y.clone(),
                }],
                None => {
                    vec![Effect::FetchDistribution { variable }]
                }
            }
        }
        Action::SelectYVariable { variable } => {
            store.y_variable = variable.clone();
            let Some(x) = store.x_variable.clone() else {
                return vec![];
            };
            match variable {
                Some(y) => vec![Effect::FetchScatter { x, y }],
                None => {
                    store.scatter = None;
                    if store.distribution.get().is_none() {
                        vec![Effect::FetchDistribution {
                            variable: x,
                        }]
                    } else {
                        vec![]
                    }
                }
            }
        }
        Action::ToggleSideways => {
            store.sideways = !store.sideways;
            vec![]
        }
        Action::DistributionLoaded { seq, result } => {
            if !is_fresh(
                "distribution",
                seq,
                store.seq.distribution,
            ) {
                return vec![];
            }
            match result {
                Ok(payload) => {
                    store.distribution.set(Some(payload));
                }
                Err(err) => report_error(store, &err),
            }
            vec![]
        }
        Action::ScatterLoaded { seq, result } => {
            if !is_fresh("scatter", seq, store.seq.scatter) {
                return vec![];
            }
            match result {
                Ok(payload) => store.scatter = Some(payload),
                Err(err) => report_error(store, &err),
            }
            vec![]
        }

        // Style-only controls
        Action::SetShowGrid { show } => {
            store.style.show_grid = show;
            vec![]
        }
        Action::SetShowAxisLabels { show } => {
            store.style.show_axis_labels = show;
            vec![]
        }
        Action::SetShowTitles { show } => {
            store.style.show_titles = show;
            vec![]
        }
        Action::SetStrokeWidth { width } => {
            store.style.stroke_width = width;
            vec![]
        }
        Action::SetLineColor { color } => {
            store.style.line_color = color;
            vec![]
        }
        Action::SetPointColor { color } => {
            store.style.point_color = color;
            vec![]
        }

        // PCA view
        Action::ToggleComponent { index } => {
            if !store.components.toggle(index) {
                return vec![];
            }
            let pair = store.components.active_pair();
            if store.fetched_pair == Some(pair) {
                return vec![];
            }
            // Selection mutation, then fetch, then redraw on
            // arrival; never overlapped for the same view.
            vec![Effect::FetchBiplot { pair }]
        }
        Action::SetDimensionalityIndex { index } => {
            let index =
                index.clamp(2, MAX_DIMENSIONALITY_INDEX);
            if index == store.dimensionality_index {
                return vec![];
            }
            store.dimensionality_index = index;
            store.attribute_table.set(None);
            store.brush = None;
            vec![Effect::FetchAttributeTable {
                dimensionality_index: index,
            }]
        }
        Action::PcaOverviewLoaded { seq, result } => {
            if !is_fresh(
                "pca overview",
                seq,
                store.seq.pca_overview,
            ) {
                return vec![];
            }
            match result {
                Ok(payload) => store.pca_overview = Some(payload),
                Err(err) => report_error(store, &err),
            }
            vec![]
        }
        Action::BiplotLoaded { seq, result } => {
            if !is_fresh("biplot", seq, store.seq.biplot) {
                return vec![];
            }
            match result {
                Ok(payload) => store.biplot = Some(payload),
                Err(err) => report_error(store, &err),
            }
            vec![]
        }
        Action::AttributesLoaded { seq, result } => {
            if !is_fresh("attributes", seq, store.seq.attributes) {
                return vec![];
            }
            match result {
                Ok(payload) => {
                    store.attribute_table.set(Some(payload))
                }
                Err(err) => report_error(store, &err),
            }
            vec![]
        }

        // Clustering view
        Action::SetClusterCount { k } => {
            let k = k.clamp(MIN_CLUSTER_COUNT, MAX_CLUSTER_COUNT);
            if store.selected_k == Some(k) {
                return vec![];
            }
            store.selected_k = Some(k);
            vec![Effect::FetchClusterSlice { k }]
        }
        Action::ClusterOverviewLoaded { seq, result } => {
            if !is_fresh(
                "cluster overview",
                seq,
                store.seq.cluster_overview,
            ) {
                return vec![];
            }
            match result {
                Ok(payload) => {
                    let best_k = payload.best_k.clamp(
                        MIN_CLUSTER_COUNT,
                        MAX_CLUSTER_COUNT,
                    );
                    store.cluster_overview = Some(payload);
                    if store.selected_k.is_none() {
                        store.selected_k = Some(best_k);
                        return vec![Effect::FetchClusterSlice {
                            k: best_k,
                        }];
                    }
                    vec![]
                }
                Err(err) => {
                    report_error(store, &err);
                    vec![]
                }
            }
        }
        Action::ClusterSliceLoaded { seq, result } => {
            if !is_fresh(
                "cluster slice",
                seq,
                store.seq.cluster_slice,
            ) {
                return vec![];
            }
            match result {
                Ok(payload) => store.cluster_slice = Some(payload),
                Err(err) => report_error(store, &err),
            }
            vec![]
        }

        // MDS view
        Action::RecomputeMds => {
            store.mds = None;
            vec![Effect::FetchMds { recompute: true }]
        }
        Action::MdsLoaded { seq, result } => {
            if !is_fresh("mds", seq, store.seq.mds) {
                return vec![];
            }
            match result {
                Ok(payload) => store.mds = Some(payload),
                Err(err) => report_error(store, &err),
            }
            vec![]
        }

        // Parallel coordinates view
        Action::ToggleAxisPin { variable } => {
            if let Some(position) =
                store.axis_order.iter().position(|n| *n == variable)
            {
                store.axis_order.remove(position);
            } else {
                store.axis_order.push(variable);
            }
            vec![]
        }
        Action::ParallelLoaded { seq, result } => {
            if !is_fresh("parallel", seq, store.seq.parallel) {
                return vec![];
            }
            match result {
                Ok(payload) => {
                    store.axis_order.retain(|name| {
                        payload
                            .columns
                            .iter()
                            .any(|c| &c.name == name)
                    });
                    store.parallel.set(Some(payload));
                }
                Err(err) => report_error(store, &err),
            }
            vec![]
        }

        // Scatter matrix view
        Action::BrushStarted { row, col, at } => {
            store.brush = Some(Brush {
                row,
                col,
                start: at,
                end: at,
            });
            vec![]
        }
        Action::BrushMoved { at } => {
            if let Some(brush) = &mut store.brush {
                brush.end = at;
            }
            vec![]
        }
        Action::BrushFinished => {
            if store
                .brush
                .is_some_and(|brush| brush.is_degenerate())
            {
                store.brush = None;
            }
            vec![]
        }
        Action::ClearBrush => {
            store.brush = None;
            vec![]
        }

        // Housekeeping
        Action::TickAlerts { now } => {
            store.alerts.tick(now);
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::VariableKind;
    use crate::fetch::{Backend, FetchError};

    fn test_store() -> Store {
        Store::new(Backend::new("http://127.0.0.1:0"))
    }

    fn distribution_payload(variable: &str) -> DistributionPayload {
        DistributionPayload {
            variable: variable.to_owned(),
            kind: VariableKind::Numerical,
            values: Vec::new(),
            mapping: None,
        }
    }

    #[test]
    fn toggling_zero_then_two_fetches_once() {
        let mut store = test_store();
        store.fetched_pair = Some((0, 1));

        // First click keeps the default pair: no fetch.
        let effects = update(
            &mut store,
            Action::ToggleComponent { index: 0 },
        );
        assert!(effects.is_empty());

        // Second click completes the pair PC1/PC3: one fetch.
        let effects = update(
            &mut store,
            Action::ToggleComponent { index: 2 },
        );
        assert_eq!(
            effects,
            vec![Effect::FetchBiplot { pair: (0, 2) }]
        );
    }

    #[test]
    fn third_component_click_is_a_no_op() {
        let mut store = test_store();
        store.fetched_pair = Some((0, 1));
        update(&mut store, Action::ToggleComponent { index: 3 });
        update(&mut store, Action::ToggleComponent { index: 4 });

        let effects = update(
            &mut store,
            Action::ToggleComponent { index: 5 },
        );
        assert!(effects.is_empty());
        assert_eq!(store.components.picked(), &[3, 4]);
    }

    #[test]
    fn stale_distribution_response_is_discarded() {
        let mut store = test_store();
        store.seq.distribution = 2;

        let effects = update(
            &mut store,
            Action::DistributionLoaded {
                seq: 1,
                result: Ok(distribution_payload("age")),
            },
        );
        assert!(effects.is_empty());
        assert!(store.distribution.get().is_none());

        update(
            &mut store,
            Action::DistributionLoaded {
                seq: 2,
                result: Ok(distribution_payload("age")),
            },
        );
        assert!(store.distribution.get().is_some());
    }

    #[test]
    fn fetch_failure_raises_one_alert_and_skips_render() {
        let mut store = test_store();
        update(
            &mut store,
            Action::BiplotLoaded {
                seq: 0,
                result: Err(FetchError::Status {
                    endpoint: "/api/pca".to_owned(),
                    status: 500,
                }),
            },
        );
        assert!(store.biplot.is_none());
        assert_eq!(store.alerts.entries().len(), 1);
    }

    #[test]
    fn style_controls_produce_no_effects() {
        let mut store = test_store();
        assert!(
            update(&mut store, Action::SetShowGrid { show: false })
                .is_empty()
        );
        assert!(
            update(&mut store, Action::SetStrokeWidth { width: 4.0 })
                .is_empty()
        );
        assert!(
            update(&mut store, Action::ToggleSideways).is_empty()
        );
        assert!(!store.style.show_grid);
        assert_eq!(store.style.stroke_width, 4.0);
        assert!(store.sideways);
    }

    #[test]
    fn selecting_x_refetches_the_distribution() {
        let mut store = test_store();
        let effects = update(
            &mut store,
            Action::SelectXVariable {
                variable: "age".to_owned(),
            },
        );
        assert_eq!(
            effects,
            vec![Effect::FetchDistribution {
                variable: "age".to_owned()
            }]
        );
    }

    #[test]
    fn selecting_y_switches_to_scatter() {
        let mut store = test_store();
        store.x_variable = Some("age".to_owned());
        let effects = update(
            &mut store,
            Action::SelectYVariable {
                variable: Some("income".to_owned()),
            },
        );
        assert_eq!(
            effects,
            vec![Effect::FetchScatter {
                x: "age".to_owned(),
                y: "income".to_owned()
            }]
        );
    }

    #[test]
    fn sample_success_invalidates_and_refetches() {
        let mut store = test_store();
        store.x_variable = Some("age".to_owned());
        store
            .distribution
            .set(Some(distribution_payload("age")));
        store.biplot = Some(crate::fetch::BiplotPayload {
            pair: (0, 1),
            points: Vec::new(),
            loadings: Vec::new(),
        });

        let effects = update(
            &mut store,
            Action::SamplePipelineFinished {
                seq: 0,
                result: Ok("Sampled 500 rows".to_owned()),
            },
        );

        assert!(store.distribution.get().is_none());
        assert!(store.biplot.is_none());
        assert_eq!(store.alerts.entries().len(), 1);
        assert!(effects.contains(&Effect::FetchHeaders));
        assert!(effects.contains(&Effect::FetchDistribution {
            variable: "age".to_owned()
        }));
    }

    #[test]
    fn best_k_seeds_the_cluster_slice_fetch() {
        let mut store = test_store();
        let effects = update(
            &mut store,
            Action::ClusterOverviewLoaded {
                seq: 0,
                result: Ok(ClusterOverviewPayload {
                    mse: vec![(1.0, 9.0), (2.0, 4.0)],
                    best_k: 3,
                }),
            },
        );
        assert_eq!(store.selected_k, Some(3));
        assert_eq!(
            effects,
            vec![Effect::FetchClusterSlice { k: 3 }]
        );
    }

    #[test]
    fn degenerate_brush_clears_on_release() {
        let mut store = test_store();
        update(
            &mut store,
            Action::BrushStarted {
                row: 0,
                col: 1,
                at: [1.0, 1.0],
            },
        );
        update(&mut store, Action::BrushMoved { at: [1.0, 4.0] });
        update(&mut store, Action::BrushFinished);
        assert!(store.brush.is_none());

        update(
            &mut store,
            Action::BrushStarted {
                row: 0,
                col: 1,
                at: [1.0, 1.0],
            },
        );
        update(&mut store, Action::BrushMoved { at: [3.0, 4.0] });
        update(&mut store, Action::BrushFinished);
        assert!(store.brush.is_some());
    }

    #[test]
    fn axis_pins_toggle_in_order() {
        let mut store = test_store();
        update(
            &mut store,
            Action::ToggleAxisPin {
                variable: "age".to_owned(),
            },
        );
        update(
            &mut store,
            Action::ToggleAxisPin {
                variable: "income".to_owned(),
            },
        );
        assert_eq!(store.axis_order, vec!["age", "income"]);

        update(
            &mut store,
            Action::ToggleAxisPin {
                variable: "age".to_owned(),
            },
        );
        assert_eq!(store.axis_order, vec!["income"]);
    }
}
