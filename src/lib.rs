pub mod actions;
pub mod alerts;
pub mod api;
pub mod app;
pub mod cache;
pub mod chart;
pub mod cluster_view;
pub mod distribution_view;
pub mod effects;
pub mod fetch;
pub mod matrix_view;
pub mod native;
pub mod parallel_view;
pub mod pca_view;
pub mod projection_view;
pub mod state;
pub mod store;
pub mod versioned;

use crate::app::DashboardApp;
use crate::fetch::Backend;

/// Build the dashboard app against the backend configured in the
/// environment. Shared by the native entry point.
pub fn create_app(_cc: &eframe::CreationContext<'_>) -> DashboardApp {
    DashboardApp::new(Backend::from_env())
}
