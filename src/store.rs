use crate::alerts::Alerts;
use crate::chart::ChartStyle;
use crate::fetch::{
    AttributeTablePayload, Backend, BiplotPayload,
    ClusterOverviewPayload, ClusterSlicePayload, DistributionPayload,
    FetchResult, MdsPayload, ParallelPayload, PcaOverviewPayload,
    ScatterPayload,
};
use crate::versioned::Versioned;
use poll_promise::Promise;

pub const DEFAULT_SAMPLE_SIZE: u32 = 500;
pub const MIN_CLUSTER_COUNT: u32 = 1;
pub const MAX_CLUSTER_COUNT: u32 = 10;
pub const MAX_DIMENSIONALITY_INDEX: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Distribution,
    Pca,
    Clustering,
    Projection,
    ParallelCoords,
    Matrix,
}

impl ActiveView {
    pub const ALL: [ActiveView; 6] = [
        ActiveView::Distribution,
        ActiveView::Pca,
        ActiveView::Clustering,
        ActiveView::Projection,
        ActiveView::ParallelCoords,
        ActiveView::Matrix,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ActiveView::Distribution => "Distribution",
            ActiveView::Pca => "PCA",
            ActiveView::Clustering => "Clustering",
            ActiveView::Projection => "MDS",
            ActiveView::ParallelCoords => "Parallel Coordinates",
            ActiveView::Matrix => "Scatter Matrix",
        }
    }
}

// ------------------------------------------------------------------
// Component selection
// ------------------------------------------------------------------

/// Ordered set of clicked eigenvalue indices, capacity two. The
/// displayed component pair is the selection when it is full and the
/// first two components otherwise, so the dashboard always has a
/// pair to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSelection {
    picked: Vec<usize>,
}

impl ComponentSelection {
    pub const CAPACITY: usize = 2;

    /// Toggle an index: remove it if present, append it if there is
    /// room. A third index while two are selected is ignored.
    /// Returns whether the selection changed.
    pub fn toggle(&mut self, index: usize) -> bool {
        if let Some(position) =
            self.picked.iter().position(|&i| i == index)
        {
            self.picked.remove(position);
            true
        } else if self.picked.len() < Self::CAPACITY {
            self.picked.push(index);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.picked.contains(&index)
    }

    pub fn picked(&self) -> &[usize] {
        &self.picked
    }

    /// Insertion order fixes the axis assignment: first pick is X,
    /// second is Y.
    pub fn active_pair(&self) -> (usize, usize) {
        if self.picked.len() == Self::CAPACITY {
            (self.picked[0], self.picked[1])
        } else {
            (0, 1)
        }
    }
}

// ------------------------------------------------------------------
// Scatter-matrix brush
// ------------------------------------------------------------------

/// Rectangular brush anchored to one matrix cell. Membership is
/// evaluated in that cell's own (x-variable, y-variable) value
/// space and applied as dimming across every cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub row: usize,
    pub col: usize,
    pub start: [f64; 2],
    pub end: [f64; 2],
}

impl Brush {
    pub fn min(&self) -> [f64; 2] {
        [
            self.start[0].min(self.end[0]),
            self.start[1].min(self.end[1]),
        ]
    }

    pub fn max(&self) -> [f64; 2] {
        [
            self.start[0].max(self.end[0]),
            self.start[1].max(self.end[1]),
        ]
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let min = self.min();
        let max = self.max();
        x >= min[0] && x <= max[0] && y >= min[1] && y <= max[1]
    }

    /// A click without a drag selects nothing and clears the brush.
    pub fn is_degenerate(&self) -> bool {
        self.start[0] == self.end[0] || self.start[1] == self.end[1]
    }
}

// ------------------------------------------------------------------
// In-flight fetches
// ------------------------------------------------------------------

/// A pending fetch tagged with the sequence it was issued under.
/// Completions whose sequence no longer matches the store are stale
/// and get discarded instead of overwriting a newer render.
pub struct InFlight<T: Send + 'static> {
    pub seq: u64,
    pub promise: Promise<FetchResult<T>>,
}

/// Per-view fetch sequence counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequences {
    pub headers: u64,
    pub sample: u64,
    pub distribution: u64,
    pub scatter: u64,
    pub pca_overview: u64,
    pub biplot: u64,
    pub attributes: u64,
    pub cluster_overview: u64,
    pub cluster_slice: u64,
    pub mds: u64,
    pub parallel: u64,
}

pub fn bump(slot: &mut u64) -> u64 {
    *slot = slot.wrapping_add(1);
    *slot
}

#[derive(Default)]
pub struct Pending {
    pub headers: Option<InFlight<Vec<String>>>,
    pub sample: Option<InFlight<String>>,
    pub distribution: Option<InFlight<DistributionPayload>>,
    pub scatter: Option<InFlight<ScatterPayload>>,
    pub pca_overview: Option<InFlight<PcaOverviewPayload>>,
    pub biplot: Option<InFlight<BiplotPayload>>,
    pub attributes: Option<InFlight<AttributeTablePayload>>,
    pub cluster_overview: Option<InFlight<ClusterOverviewPayload>>,
    pub cluster_slice: Option<InFlight<ClusterSlicePayload>>,
    pub mds: Option<InFlight<MdsPayload>>,
    pub parallel: Option<InFlight<ParallelPayload>>,
}

impl Pending {
    pub fn any(&self) -> bool {
        self.headers.is_some()
            || self.sample.is_some()
            || self.distribution.is_some()
            || self.scatter.is_some()
            || self.pca_overview.is_some()
            || self.biplot.is_some()
            || self.attributes.is_some()
            || self.cluster_overview.is_some()
            || self.cluster_slice.is_some()
            || self.mds.is_some()
            || self.parallel.is_some()
    }
}

// ------------------------------------------------------------------
// Store
// ------------------------------------------------------------------

/// All dashboard state. Mutated exclusively through the action
/// reducer; views only read it.
pub struct Store {
    pub backend: Backend,
    pub active_view: ActiveView,
    pub style: ChartStyle,
    pub alerts: Alerts,

    // Sampling toolbar
    pub variables: Vec<String>,
    pub sample_size: u32,
    pub drop_none: bool,
    pub drop_categorical: bool,

    // Distribution view
    pub x_variable: Option<String>,
    pub y_variable: Option<String>,
    pub sideways: bool,
    pub distribution: Versioned<Option<DistributionPayload>>,
    pub scatter: Option<ScatterPayload>,

    // PCA view
    pub components: ComponentSelection,
    pub pca_overview: Option<PcaOverviewPayload>,
    pub biplot: Option<BiplotPayload>,
    /// Pair of the last issued biplot fetch; re-fetch only when the
    /// active pair moves away from it.
    pub fetched_pair: Option<(usize, usize)>,
    pub dimensionality_index: u32,
    pub attribute_table: Versioned<Option<AttributeTablePayload>>,

    // Clustering view
    pub cluster_overview: Option<ClusterOverviewPayload>,
    pub selected_k: Option<u32>,
    pub cluster_slice: Option<ClusterSlicePayload>,

    // MDS view
    pub mds: Option<MdsPayload>,

    // Parallel coordinates view
    pub parallel: Versioned<Option<ParallelPayload>>,
    /// Explicit axis reordering list; listed axes draw first.
    pub axis_order: Vec<String>,

    // Scatter matrix view
    pub brush: Option<Brush>,

    pub seq: Sequences,
    pub pending: Pending,
}

impl Store {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            active_view: ActiveView::Distribution,
            style: ChartStyle::default(),
            alerts: Alerts::default(),
            variables: Vec::new(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            drop_none: true,
            drop_categorical: true,
            x_variable: None,
            y_variable: None,
            sideways: false,
            distribution: Versioned::default(),
            scatter: None,
            components: ComponentSelection::default(),
            pca_overview: None,
            biplot: None,
            fetched_pair: None,
            dimensionality_index: MAX_DIMENSIONALITY_INDEX,
            attribute_table: Versioned::default(),
            cluster_overview: None,
            selected_k: None,
            cluster_slice: None,
            mds: None,
            parallel: Versioned::default(),
            axis_order: Vec::new(),
            brush: None,
            seq: Sequences::default(),
            pending: Pending::default(),
        }
    }

    /// Drop every fetched artifact so views refetch lazily. Used
    /// after the backend resamples the dataset.
    pub fn invalidate_artifacts(&mut self) {
        self.distribution.set(None);
        self.scatter = None;
        self.pca_overview = None;
        self.biplot = None;
        self.fetched_pair = None;
        self.attribute_table.set(None);
        self.cluster_overview = None;
        self.selected_k = None;
        self.cluster_slice = None;
        self.mds = None;
        self.parallel.set(None);
        self.axis_order.clear();
        self.brush = None;
    }

    /// Axis order for the parallel-coordinates view: pinned axes in
    /// list order, then the remaining columns in natural order.
    pub fn ordered_axes(&self) -> Vec<String> {
        let Some(payload) = self.parallel.get() else {
            return Vec::new();
        };

        let mut ordered: Vec<String> = self
            .axis_order
            .iter()
            .filter(|name| {
                payload.columns.iter().any(|c| &c.name == *name)
            })
            .cloned()
            .collect();
        for column in &payload.columns {
            if !ordered.contains(&column.name) {
                ordered.push(column.name.clone());
            }
        }
        ordered
    }

    /// 1-based position of a pinned axis, for label annotation.
    pub fn axis_pin_position(&self, name: &str) -> Option<usize> {
        self.axis_order
            .iter()
            .position(|n| n == name)
            .map(|i| i + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_starts_on_first_two_components() {
        let selection = ComponentSelection::default();
        assert_eq!(selection.active_pair(), (0, 1));
        assert!(selection.picked().is_empty());
    }

    #[test]
    fn selection_caps_at_two() {
        let mut selection = ComponentSelection::default();
        assert!(selection.toggle(0));
        assert!(selection.toggle(3));
        // Third pick while full is a no-op.
        assert!(!selection.toggle(5));
        assert_eq!(selection.picked(), &[0, 3]);
    }

    #[test]
    fn selection_toggles_off() {
        let mut selection = ComponentSelection::default();
        selection.toggle(0);
        selection.toggle(3);
        assert!(selection.toggle(0));
        assert_eq!(selection.picked(), &[3]);
        // Room again, so a new pick lands.
        assert!(selection.toggle(5));
        assert_eq!(selection.active_pair(), (3, 5));
    }

    #[test]
    fn clicking_zero_then_two_selects_pc1_pc3() {
        let mut selection = ComponentSelection::default();
        selection.toggle(0);
        // One pick keeps the default pair on screen.
        assert_eq!(selection.active_pair(), (0, 1));
        selection.toggle(2);
        assert_eq!(selection.active_pair(), (0, 2));
    }

    #[test]
    fn brush_contains_uses_normalized_corners() {
        let brush = Brush {
            row: 0,
            col: 1,
            start: [5.0, 8.0],
            end: [1.0, 2.0],
        };
        assert!(brush.contains(3.0, 4.0));
        assert!(brush.contains(1.0, 2.0));
        assert!(brush.contains(5.0, 8.0));
        assert!(!brush.contains(0.5, 4.0));
        assert!(!brush.contains(3.0, 9.0));
    }

    #[test]
    fn degenerate_brush_is_detected() {
        let brush = Brush {
            row: 0,
            col: 0,
            start: [1.0, 1.0],
            end: [1.0, 5.0],
        };
        assert!(brush.is_degenerate());
    }

    #[test]
    fn ordered_axes_puts_pins_first() {
        use crate::api::VariableKind;
        use crate::fetch::{ParallelColumn, ParallelPayload};

        let backend = Backend::new("http://127.0.0.1:0");
        let mut store = Store::new(backend);
        let columns = ["age", "income", "segment"]
            .into_iter()
            .map(|name| ParallelColumn {
                name: name.to_owned(),
                kind: VariableKind::Numerical,
                values: Vec::new(),
            })
            .collect();
        store.parallel.set(Some(ParallelPayload { columns }));

        store.axis_order.push("segment".to_owned());
        store.axis_order.push("age".to_owned());

        assert_eq!(
            store.ordered_axes(),
            vec!["segment", "age", "income"]
        );
        assert_eq!(store.axis_pin_position("segment"), Some(1));
        assert_eq!(store.axis_pin_position("age"), Some(2));
        assert_eq!(store.axis_pin_position("income"), None);
    }
}
