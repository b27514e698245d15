use crate::api::{
    self, ClusterCenter, ClusterPoint, LoadingRow, Mapping, MdsPoint,
    MdsVariable, RawValue, VariableKind,
};
use once_cell::sync::Lazy;
use poll_promise::Promise;
use serde::de::DeserializeOwned;
use std::thread::JoinHandle;

static BASE_URL: Lazy<String> = Lazy::new(|| {
    std::env::var("DATASCOPE_BACKEND")
        .unwrap_or_else(|_| "http://127.0.0.1:5000".to_owned())
});

pub type FetchResult<T> = Result<T, FetchError>;

/// Failures of the data-access boundary. Never panics past this
/// layer; callers receive a value and decide whether to render or to
/// raise an alert.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("{endpoint}: backend answered with status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("{endpoint}: request failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("{endpoint}: could not decode payload: {message}")]
    Decode { endpoint: String, message: String },
}

/// Handle to the statistics backend: base URL plus a shared blocking
/// client. Cloned into every worker thread.
#[derive(Debug, Clone)]
pub struct Backend {
    base: String,
    client: reqwest::blocking::Client,
}

impl Backend {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(BASE_URL.clone())
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// One GET, decoded as JSON. No retries; each call is fire-once.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> FetchResult<T> {
        let url = format!("{}{}", self.base, endpoint);
        let response =
            self.client.get(&url).send().map_err(|e| {
                FetchError::Transport {
                    endpoint: endpoint.to_owned(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.to_owned(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().map_err(|e| FetchError::Decode {
            endpoint: endpoint.to_owned(),
            message: e.to_string(),
        })
    }

    /// GET whose body is only a status message; used for the
    /// sample/recompute endpoints.
    pub fn trigger(&self, endpoint: &str) -> FetchResult<String> {
        self.get_json::<api::BackendMessage>(endpoint)
            .map(|m| m.message)
    }
}

fn join_worker<T: Send + 'static>(
    handle: JoinHandle<FetchResult<T>>,
    endpoint: &str,
) -> FetchResult<T> {
    handle.join().map_err(|_| FetchError::Transport {
        endpoint: endpoint.to_owned(),
        message: "worker thread panicked".to_owned(),
    })?
}

// ------------------------------------------------------------------
// Joined payloads, one per view update
// ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionPayload {
    pub variable: String,
    pub kind: VariableKind,
    pub values: Vec<RawValue>,
    pub mapping: Option<Mapping>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPayload {
    pub x_variable: String,
    pub y_variable: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PcaOverviewPayload {
    pub eigenvalues: Vec<f64>,
    pub elbow_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiplotPayload {
    pub pair: (usize, usize),
    pub points: Vec<[f64; 2]>,
    pub loadings: Vec<LoadingRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeTablePayload {
    pub names: Vec<String>,
    pub weights: Vec<f64>,
    pub rows: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOverviewPayload {
    pub mse: Vec<(f64, f64)>,
    pub best_k: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSlicePayload {
    pub k: u32,
    pub points: Vec<ClusterPoint>,
    pub centers: Vec<ClusterCenter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MdsPayload {
    pub data: Vec<MdsPoint>,
    pub variables: Vec<MdsVariable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParallelColumn {
    pub name: String,
    pub kind: VariableKind,
    pub values: Vec<RawValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParallelPayload {
    pub columns: Vec<ParallelColumn>,
}

/// Pair two columns into scatter points, skipping rows where either
/// side is missing or non-numeric.
pub fn pair_columns(
    xs: &[RawValue],
    ys: &[RawValue],
) -> Vec<[f64; 2]> {
    xs.iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| Some([x.as_number()?, y.as_number()?]))
        .collect()
}

/// Assemble the scatter-matrix table from the ordered attribute list
/// and the per-observation records. Records missing any attribute
/// are dropped rather than partially plotted.
pub fn assemble_attribute_table(
    attributes: &[(String, f64)],
    records: &api::AttributeRecords,
) -> AttributeTablePayload {
    let names: Vec<String> =
        attributes.iter().map(|(name, _)| name.clone()).collect();
    let weights: Vec<f64> =
        attributes.iter().map(|(_, weight)| *weight).collect();

    let rows = records
        .iter()
        .filter_map(|record| {
            names
                .iter()
                .map(|name| record.get(name).copied())
                .collect::<Option<Vec<f64>>>()
        })
        .collect();

    AttributeTablePayload {
        names,
        weights,
        rows,
    }
}

// ------------------------------------------------------------------
// Promise spawners. Parts of one logical update run on their own
// threads and are joined before the payload is returned, so a render
// either sees every part or none of them.
// ------------------------------------------------------------------

pub fn headers(backend: Backend) -> Promise<FetchResult<Vec<String>>> {
    Promise::spawn_thread("headers", move || {
        backend.get_json(api::HEADERS)
    })
}

pub fn distribution(
    backend: Backend,
    variable: String,
) -> Promise<FetchResult<DistributionPayload>> {
    Promise::spawn_thread("distribution", move || {
        let b = backend.clone();
        let var = variable.clone();
        let column = std::thread::spawn(move || {
            b.get_json::<Vec<RawValue>>(&api::column(&var))
        });

        let kind = backend
            .get_json::<api::ColumnType>(&api::column_type(&variable))?
            .kind;
        let values = join_worker(column, &api::column(&variable))?;

        let mapping = match kind {
            VariableKind::Categorical => Some(
                backend
                    .get_json::<Mapping>(&api::column_mapping(&variable))?,
            ),
            VariableKind::Numerical => None,
        };

        Ok(DistributionPayload {
            variable,
            kind,
            values,
            mapping,
        })
    })
}

pub fn scatter(
    backend: Backend,
    x_variable: String,
    y_variable: String,
) -> Promise<FetchResult<ScatterPayload>> {
    Promise::spawn_thread("scatter", move || {
        let b = backend.clone();
        let y_var = y_variable.clone();
        let y_column = std::thread::spawn(move || {
            b.get_json::<Vec<RawValue>>(&api::column(&y_var))
        });

        let xs = backend
            .get_json::<Vec<RawValue>>(&api::column(&x_variable))?;
        let ys = join_worker(y_column, &api::column(&y_variable))?;

        Ok(ScatterPayload {
            x_variable,
            y_variable,
            points: pair_columns(&xs, &ys),
        })
    })
}

pub fn pca_overview(
    backend: Backend,
) -> Promise<FetchResult<PcaOverviewPayload>> {
    Promise::spawn_thread("pca_overview", move || {
        let b = backend.clone();
        let elbow = std::thread::spawn(move || {
            b.get_json::<api::ElbowIndex>(api::PCA_ELBOW)
        });

        let eigen = backend
            .get_json::<api::EigenDecomposition>(api::PCA_EIGENVECTORS)?;
        let elbow = join_worker(elbow, api::PCA_ELBOW)?;

        Ok(PcaOverviewPayload {
            eigenvalues: eigen.eigenvalues,
            elbow_index: elbow.elbow_index,
        })
    })
}

pub fn biplot(
    backend: Backend,
    pair: (usize, usize),
) -> Promise<FetchResult<BiplotPayload>> {
    Promise::spawn_thread("biplot", move || {
        let b = backend.clone();
        let loadings_endpoint = api::loadings(pair);
        let loadings_handle = {
            let endpoint = loadings_endpoint.clone();
            std::thread::spawn(move || {
                b.get_json::<api::Loadings>(&endpoint)
            })
        };

        let projection = backend
            .get_json::<api::PrincipalComponents>(&api::projection(pair))?;
        let loadings =
            join_worker(loadings_handle, &loadings_endpoint)?;

        let points = projection
            .principal_components
            .iter()
            .map(|(_, x, y)| [*x, *y])
            .collect();

        Ok(BiplotPayload {
            pair,
            points,
            loadings: loadings.loadings,
        })
    })
}

pub fn attribute_table(
    backend: Backend,
    dimensionality_index: u32,
) -> Promise<FetchResult<AttributeTablePayload>> {
    Promise::spawn_thread("attribute_table", move || {
        let b = backend.clone();
        let data_endpoint = api::attributes_data(dimensionality_index);
        let records_handle = {
            let endpoint = data_endpoint.clone();
            std::thread::spawn(move || {
                b.get_json::<api::AttributeRecords>(&endpoint)
            })
        };

        let attributes = backend.get_json::<api::PcaAttributes>(
            &api::attributes(dimensionality_index),
        )?;
        let records = join_worker(records_handle, &data_endpoint)?;

        Ok(assemble_attribute_table(&attributes.attributes, &records))
    })
}

pub fn cluster_overview(
    backend: Backend,
) -> Promise<FetchResult<ClusterOverviewPayload>> {
    Promise::spawn_thread("cluster_overview", move || {
        let b = backend.clone();
        let bestk = std::thread::spawn(move || {
            b.get_json::<api::BestK>(api::KMEANS_BESTK)
        });

        let mse =
            backend.get_json::<api::KmeansMse>(api::KMEANS_MSE)?;
        let bestk = join_worker(bestk, api::KMEANS_BESTK)?;

        Ok(ClusterOverviewPayload {
            mse: mse.mse,
            best_k: bestk.best_k,
        })
    })
}

pub fn cluster_slice(
    backend: Backend,
    k: u32,
) -> Promise<FetchResult<ClusterSlicePayload>> {
    Promise::spawn_thread("cluster_slice", move || {
        let b = backend.clone();
        let centers_endpoint = api::kmeans_centers(k);
        let centers_handle = {
            let endpoint = centers_endpoint.clone();
            std::thread::spawn(move || {
                b.get_json::<api::ClusterCenters>(&endpoint)
            })
        };

        let points = backend
            .get_json::<Vec<ClusterPoint>>(&api::kmeans_results(k))?;
        let centers =
            join_worker(centers_handle, &centers_endpoint)?;

        Ok(ClusterSlicePayload {
            k,
            points,
            centers: centers.centers,
        })
    })
}

pub fn mds(
    backend: Backend,
    recompute: bool,
) -> Promise<FetchResult<MdsPayload>> {
    Promise::spawn_thread("mds", move || {
        if recompute {
            backend.trigger(api::MDS_DATA_CREATE)?;
            backend.trigger(api::MDS_VARIABLES_CREATE)?;
        }

        let b = backend.clone();
        let variables = std::thread::spawn(move || {
            b.get_json::<Vec<MdsVariable>>(api::MDS_VARIABLES)
        });

        let data =
            backend.get_json::<Vec<MdsPoint>>(api::MDS_DATA)?;
        let variables = join_worker(variables, api::MDS_VARIABLES)?;

        Ok(MdsPayload { data, variables })
    })
}

pub fn parallel(
    backend: Backend,
    variables: Vec<String>,
) -> Promise<FetchResult<ParallelPayload>> {
    Promise::spawn_thread("parallel", move || {
        let handles: Vec<(String, JoinHandle<FetchResult<ParallelColumn>>)> =
            variables
                .into_iter()
                .map(|name| {
                    let b = backend.clone();
                    let worker_name = name.clone();
                    let handle = std::thread::spawn(move || {
                        let kind = b
                            .get_json::<api::ColumnType>(
                                &api::column_type(&worker_name),
                            )?
                            .kind;
                        let values = b.get_json::<Vec<RawValue>>(
                            &api::column(&worker_name),
                        )?;
                        Ok(ParallelColumn {
                            name: worker_name,
                            kind,
                            values,
                        })
                    });
                    (name, handle)
                })
                .collect();

        let mut columns = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            columns.push(join_worker(handle, &api::column(&name))?);
        }

        Ok(ParallelPayload { columns })
    })
}

/// Resample the dataset, then re-run the backend analyses that
/// depend on the sample. Strictly sequential: each stage only runs
/// if the previous one succeeded.
pub fn sample_pipeline(
    backend: Backend,
    count: u32,
    drop_none: bool,
    drop_categorical: bool,
) -> Promise<FetchResult<String>> {
    Promise::spawn_thread("sample_pipeline", move || {
        let message = backend.trigger(&api::sample(
            count,
            drop_none,
            drop_categorical,
        ))?;
        backend.trigger(api::PCA_CREATE)?;
        backend.trigger(api::KMEANS_CREATE)?;
        Ok(message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn pair_columns_skips_incomplete_rows() {
        let xs = vec![
            RawValue::Number(1.0),
            RawValue::Null,
            RawValue::Number(3.0),
            RawValue::Text("x".into()),
        ];
        let ys = vec![
            RawValue::Number(10.0),
            RawValue::Number(20.0),
            RawValue::Number(30.0),
            RawValue::Number(40.0),
        ];
        assert_eq!(
            pair_columns(&xs, &ys),
            vec![[1.0, 10.0], [3.0, 30.0]]
        );
    }

    #[test]
    fn attribute_table_preserves_attribute_order() {
        let attributes = vec![
            ("income".to_owned(), 0.9),
            ("age".to_owned(), 0.7),
        ];
        let records = vec![
            HashMap::from([
                ("age".to_owned(), 30.0),
                ("income".to_owned(), 55.0),
            ]),
            HashMap::from([
                ("age".to_owned(), 41.0),
                ("income".to_owned(), 72.0),
            ]),
        ];

        let table = assemble_attribute_table(&attributes, &records);
        assert_eq!(table.names, vec!["income", "age"]);
        assert_eq!(table.rows, vec![vec![55.0, 30.0], vec![72.0, 41.0]]);
    }

    #[test]
    fn attribute_table_drops_incomplete_records() {
        let attributes = vec![("age".to_owned(), 0.7)];
        let records = vec![
            HashMap::from([("age".to_owned(), 30.0)]),
            HashMap::new(),
        ];

        let table = assemble_attribute_table(&attributes, &records);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn fetch_error_messages_name_the_endpoint() {
        let err = FetchError::Status {
            endpoint: "/api/headers".to_owned(),
            status: 500,
        };
        assert_eq!(
            err.to_string(),
            "/api/headers: backend answered with status 500"
        );
    }
}
