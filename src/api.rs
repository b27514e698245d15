use serde::Deserialize;
use std::collections::HashMap;

// Endpoint catalog. Paths mirror the backend's Flask routes; every
// response is JSON and every request is a parameterless GET.

pub const HEADERS: &str = "/api/headers";
pub const PCA_CREATE: &str = "/api/pca/create";
pub const PCA_EIGENVECTORS: &str = "/api/pca/eigenvectors";
pub const PCA_ELBOW: &str = "/api/pca/elbow";
pub const PCA_PROJECTION: &str = "/api/pca";
pub const PCA_LOADINGS: &str = "/api/pca/loadings";
pub const PCA_ATTRIBUTES: &str = "/api/pca/attributes";
pub const PCA_ATTRIBUTES_DATA: &str = "/api/pca/attributes/data";
pub const KMEANS_CREATE: &str = "/api/kmeans/create";
pub const KMEANS_MSE: &str = "/api/kmeans/mse";
pub const KMEANS_BESTK: &str = "/api/kmeans/bestk";
pub const KMEANS_RESULTS: &str = "/api/kmeans/results";
pub const KMEANS_CENTERS: &str = "/api/kmeans/centers";
pub const MDS_DATA: &str = "/api/data/mds";
pub const MDS_DATA_CREATE: &str = "/api/data/mds/create";
pub const MDS_VARIABLES: &str = "/api/data/mds/variables";
pub const MDS_VARIABLES_CREATE: &str = "/api/data/mds/variables/create";

pub fn column(variable: &str) -> String {
    format!("/api/data/{variable}")
}

pub fn column_type(variable: &str) -> String {
    format!("/api/data/type/{variable}")
}

pub fn column_mapping(variable: &str) -> String {
    format!("/api/data/mapping/{variable}")
}

pub fn sample(count: u32, drop_none: bool, drop_categorical: bool) -> String {
    format!(
        "/api/data/sample/{count}?drop_none={drop_none}&drop_categorical={drop_categorical}"
    )
}

/// Query string selecting a pair of principal components. Component
/// indices are zero-based in the UI but one-based on the wire
/// (`PC1`, `PC2`, ...).
pub fn components_query(pair: (usize, usize)) -> String {
    format!("components=PC{},PC{}", pair.0 + 1, pair.1 + 1)
}

pub fn projection(pair: (usize, usize)) -> String {
    format!("{}?{}", PCA_PROJECTION, components_query(pair))
}

pub fn loadings(pair: (usize, usize)) -> String {
    format!("{}?{}", PCA_LOADINGS, components_query(pair))
}

pub fn attributes(dimensionality_index: u32) -> String {
    format!("{PCA_ATTRIBUTES}?dimensionality_index={dimensionality_index}")
}

pub fn attributes_data(dimensionality_index: u32) -> String {
    format!("{PCA_ATTRIBUTES_DATA}?dimensionality_index={dimensionality_index}")
}

pub fn kmeans_results(k: u32) -> String {
    format!("{KMEANS_RESULTS}?k={k}")
}

pub fn kmeans_centers(k: u32) -> String {
    format!("{KMEANS_CENTERS}?k={k}")
}

// ------------------------------------------------------------------
// Response payloads
// ------------------------------------------------------------------

/// A raw cell of a sampled column. The backend serves numeric codes,
/// free text, or nulls depending on the column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Null,
}

impl RawValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Key used for grouping and mapping lookups. Integral numbers
    /// print without a fractional part so they match mapping keys.
    pub fn key(&self) -> Option<String> {
        match self {
            RawValue::Number(n) if n.fract() == 0.0 => {
                Some(format!("{}", *n as i64))
            }
            RawValue::Number(n) => Some(format!("{n}")),
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Null => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Categorical,
    Numerical,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnType {
    #[serde(rename = "type")]
    pub kind: VariableKind,
}

/// Category code -> display label, per variable.
pub type Mapping = HashMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
pub struct BackendMessage {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EigenDecomposition {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElbowIndex {
    pub elbow_index: usize,
}

/// One loading row: feature name plus its coefficient on each of the
/// two requested components.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoadingRow(pub String, pub f64, pub f64);

impl LoadingRow {
    pub fn feature(&self) -> &str {
        &self.0
    }

    pub fn x(&self) -> f64 {
        self.1
    }

    pub fn y(&self) -> f64 {
        self.2
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Loadings {
    pub loadings: Vec<LoadingRow>,
}

/// Projected observations: `(id, x, y)` rows for the requested pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrincipalComponents {
    pub principal_components: Vec<(f64, f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PcaAttributes {
    pub attributes: Vec<(String, f64)>,
}

/// Rows of the sampled dataset restricted to the top attributes,
/// served as one record per observation.
pub type AttributeRecords = Vec<HashMap<String, f64>>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KmeansMse {
    pub mse: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BestK {
    pub best_k: u32,
}

/// One observation of a k-means slice. Extra bookkeeping columns the
/// backend includes (`k`, `mse`, `center`) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClusterPoint {
    pub coordinates: Vec<f64>,
    pub cluster_id: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClusterCenter {
    pub cluster_id: u32,
    pub coordinates: Vec<f64>,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClusterCenters {
    pub centers: Vec<ClusterCenter>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MdsPoint {
    pub x: f64,
    pub y: f64,
    pub cluster: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MdsVariable {
    #[serde(rename = "MDS1")]
    pub x: f64,
    #[serde(rename = "MDS2")]
    pub y: f64,
    pub variable: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_query_is_one_based() {
        assert_eq!(components_query((0, 1)), "components=PC1,PC2");
        assert_eq!(components_query((0, 2)), "components=PC1,PC3");
        assert_eq!(
            projection((1, 3)),
            "/api/pca?components=PC2,PC4"
        );
    }

    #[test]
    fn sample_url_carries_flags() {
        assert_eq!(
            sample(500, true, false),
            "/api/data/sample/500?drop_none=true&drop_categorical=false"
        );
    }

    #[test]
    fn raw_value_decodes_mixed_column() {
        let values: Vec<RawValue> =
            serde_json::from_str(r#"[1, 2.5, "A", null]"#).unwrap();
        assert_eq!(values[0], RawValue::Number(1.0));
        assert_eq!(values[1], RawValue::Number(2.5));
        assert_eq!(values[2], RawValue::Text("A".into()));
        assert_eq!(values[3], RawValue::Null);
    }

    #[test]
    fn raw_value_keys_match_mapping_codes() {
        assert_eq!(RawValue::Number(3.0).key().as_deref(), Some("3"));
        assert_eq!(RawValue::Number(2.5).key().as_deref(), Some("2.5"));
        assert_eq!(
            RawValue::Text("B".into()).key().as_deref(),
            Some("B")
        );
        assert_eq!(RawValue::Null.key(), None);
    }

    #[test]
    fn eigen_payload_decodes() {
        let json = r#"{
            "eigenvalues": [4.2, 1.1, 0.3],
            "eigenvectors": [[0.5, 0.5], [0.7, -0.7], [0.1, 0.2]]
        }"#;
        let eigen: EigenDecomposition =
            serde_json::from_str(json).unwrap();
        assert_eq!(eigen.eigenvalues.len(), 3);
        assert_eq!(eigen.eigenvectors[1][1], -0.7);
    }

    #[test]
    fn loading_rows_decode_from_heterogeneous_arrays() {
        let json = r#"{"loadings": [["age", 0.4, -0.2], ["income", 0.1, 0.9]]}"#;
        let loadings: Loadings = serde_json::from_str(json).unwrap();
        assert_eq!(loadings.loadings[0].feature(), "age");
        assert_eq!(loadings.loadings[1].y(), 0.9);
    }

    #[test]
    fn cluster_point_ignores_bookkeeping_columns() {
        let json = r#"[{
            "k": 3,
            "coordinates": [1.0, 2.0],
            "cluster_id": 1,
            "mse": 0.5,
            "center": [0.9, 1.8],
            "radius": 0.2
        }]"#;
        let points: Vec<ClusterPoint> =
            serde_json::from_str(json).unwrap();
        assert_eq!(points[0].cluster_id, 1);
        assert_eq!(points[0].coordinates, vec![1.0, 2.0]);
    }

    #[test]
    fn mds_variable_renames_axes() {
        let json = r#"[{"MDS1": 0.1, "MDS2": -0.4, "variable": "age"}]"#;
        let rows: Vec<MdsVariable> =
            serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].variable, "age");
        assert_eq!(rows[0].y, -0.4);
    }
}
