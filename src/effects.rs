use crate::fetch;
use crate::store::{InFlight, Store, bump};

/// Deferred effects that must run outside the reducer: every one of
/// them spawns a network fetch on a worker thread. The reducer stays
/// a pure state transition over (store, action).
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchHeaders,
    RunSamplePipeline {
        count: u32,
        drop_none: bool,
        drop_categorical: bool,
    },
    FetchDistribution {
        variable: String,
    },
    FetchScatter {
        x: String,
        y: String,
    },
    FetchPcaOverview,
    FetchBiplot {
        pair: (usize, usize),
    },
    FetchAttributeTable {
        dimensionality_index: u32,
    },
    FetchClusterOverview,
    FetchClusterSlice {
        k: u32,
    },
    FetchMds {
        recompute: bool,
    },
    FetchParallel {
        variables: Vec<String>,
    },
}

/// Execute a single effect against the store. Each fetch is tagged
/// with a fresh sequence number; issuing a new fetch for the same
/// view supersedes whatever was still in flight.
pub fn run(store: &mut Store, effect: Effect) {
    let backend = store.backend.clone();
    match effect {
        Effect::FetchHeaders => {
            let seq = bump(&mut store.seq.headers);
            store.pending.headers = Some(InFlight {
                seq,
                promise: fetch::headers(backend),
            });
        }
        Effect::RunSamplePipeline {
            count,
            drop_none,
            drop_categorical,
        } => {
            let seq = bump(&mut store.seq.sample);
            store.pending.sample = Some(InFlight {
                seq,
                promise: fetch::sample_pipeline(
                    backend,
                    count,
                    drop_none,
                    drop_categorical,
                ),
            });
        }
        Effect::FetchDistribution { variable } => {
            let seq = bump(&mut store.seq.distribution);
            store.pending.distribution = Some(InFlight {
                seq,
                promise: fetch::distribution(backend, variable),
            });
        }
        Effect::FetchScatter { x, y } => {
            let seq = bump(&mut store.seq.scatter);
            store.pending.scatter = Some(InFlight {
                seq,
                promise: fetch::scatter(backend, x, y),
            });
        }
        Effect::FetchPcaOverview => {
            let seq = bump(&mut store.seq.pca_overview);
            store.pending.pca_overview = Some(InFlight {
                seq,
                promise: fetch::pca_overview(backend),
            });
        }
        Effect::FetchBiplot { pair } => {
            let seq = bump(&mut store.seq.biplot);
            store.fetched_pair = Some(pair);
            store.pending.biplot = Some(InFlight {
                seq,
                promise: fetch::biplot(backend, pair),
            });
        }
        Effect::FetchAttributeTable {
            dimensionality_index,
        } => {
            let seq = bump(&mut store.seq.attributes);
            store.pending.attributes = Some(InFlight {
                seq,
                promise: fetch::attribute_table(
                    backend,
                    dimensionality_index,
                ),
            });
        }
        Effect::FetchClusterOverview => {
            let seq = bump(&mut store.seq.cluster_overview);
            store.pending.cluster_overview = Some(InFlight {
                seq,
                promise: fetch::cluster_overview(backend),
            });
        }
        Effect::FetchClusterSlice { k } => {
            let seq = bump(&mut store.seq.cluster_slice);
            store.pending.cluster_slice = Some(InFlight {
                seq,
                promise: fetch::cluster_slice(backend, k),
            });
        }
        Effect::FetchMds { recompute } => {
            let seq = bump(&mut store.seq.mds);
            store.pending.mds = Some(InFlight {
                seq,
                promise: fetch::mds(backend, recompute),
            });
        }
        Effect::FetchParallel { variables } => {
            let seq = bump(&mut store.seq.parallel);
            store.pending.parallel = Some(InFlight {
                seq,
                promise: fetch::parallel(backend, variables),
            });
        }
    }
}
