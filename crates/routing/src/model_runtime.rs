use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use log::{info, warn};
use ndarray::Array3;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use serde::Deserialize;

use crate::error::ScoringError;

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl FeatureScaler {
    pub fn transform(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| {
                if *scale != 0.0 {
                    (x - mean) / scale
                } else {
                    x - mean
                }
            })
            .collect()
    }
}

/// The candidate scorer's LSTM model, feature scaler, and feature-column
/// ordering. Loaded once per process at startup and cached here; a sidecar
/// weights file next to the model artifact, if present, is loaded and swapped
/// in lazily on first use, mirroring how the collaborator that trains the
/// model loads its own checkpoints.
pub struct ModelRuntime {
    session: RwLock<Session>,
    scaler: FeatureScaler,
    feature_columns: Vec<String>,
    artifact_dir: PathBuf,
    sidecar_checked: AtomicBool,
}

impl ModelRuntime {
    pub fn load(artifact_dir: impl Into<PathBuf>) -> Result<Self, ScoringError> {
        let artifact_dir = artifact_dir.into();
        let model_path = artifact_dir.join("lstm_model.onnx");
        let scaler_path = artifact_dir.join("feature_scaler.json");
        let columns_path = artifact_dir.join("feature_columns.json");

        let session = build_session(&model_path)?;
        let scaler: FeatureScaler = read_json(&scaler_path)?;
        let feature_columns: Vec<String> = read_json(&columns_path)?;

        info!(
            "loaded lstm model from {model_path:?} with {} feature columns",
            feature_columns.len()
        );

        Ok(Self {
            session: RwLock::new(session),
            scaler,
            feature_columns,
            artifact_dir,
            sidecar_checked: AtomicBool::new(false),
        })
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    /// Swaps in the sidecar weights file next to the model artifact the
    /// first time inference runs, if one is present. Checked once per
    /// process via `sidecar_checked`; a missing or unreadable sidecar just
    /// leaves the startup session in place.
    fn ensure_sidecar_checked(&self) {
        if self.sidecar_checked.swap(true, Ordering::SeqCst) {
            return;
        }

        let sidecar_path = self.artifact_dir.join("lstm_model.sidecar.onnx");
        if !sidecar_path.exists() {
            return;
        }

        match build_session(&sidecar_path) {
            Ok(session) => {
                *self.session.write().expect("model session lock poisoned") = session;
                info!("merged sidecar weights from {sidecar_path:?}");
            }
            Err(why) => warn!("failed to load sidecar weights from {sidecar_path:?}: {why}"),
        }
    }

    /// Runs inference over the two stacked feature vectors and returns a
    /// length-2 score pair `(astar_score, mapf_score)`.
    pub fn infer(&self, astar_features: &[f64], mapf_features: &[f64]) -> Result<(f64, f64), ScoringError> {
        self.ensure_sidecar_checked();

        let columns = self.feature_columns.len();
        if astar_features.len() != columns || mapf_features.len() != columns {
            return Err(ScoringError::ShapeMismatch);
        }

        let astar_scaled = self.scaler.transform(astar_features);
        let mapf_scaled = self.scaler.transform(mapf_features);

        let batch: Vec<f32> = astar_scaled
            .into_iter()
            .chain(mapf_scaled)
            .map(|v| v as f32)
            .collect();

        let array = Array3::from_shape_vec((1, 2, columns), batch)
            .map_err(|_| ScoringError::ShapeMismatch)?;

        let input = Value::from_array(array).map_err(|why| ScoringError::Inference(why.to_string()))?;
        let inputs = ort::inputs!["input" => input].map_err(|why| ScoringError::Inference(why.to_string()))?;

        let session = self.session.read().expect("model session lock poisoned");
        let outputs = session.run(inputs).map_err(|why| ScoringError::Inference(why.to_string()))?;

        let (_, data) = outputs[0]
            .try_extract_raw_tensor::<f32>()
            .map_err(|why| ScoringError::Inference(why.to_string()))?;

        match data.len() {
            2 => Ok((data[0] as f64, data[1] as f64)),
            1 => {
                let s = data[0] as f64;
                Ok((1.0 - s, s))
            }
            _ => Err(ScoringError::ShapeMismatch),
        }
    }
}

fn build_session(model_path: &Path) -> Result<Session, ScoringError> {
    Session::builder()
        .map_err(|why| ScoringError::ModelLoad(why.to_string()))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|why| ScoringError::ModelLoad(why.to_string()))?
        .commit_from_file(model_path)
        .map_err(|why| ScoringError::ModelLoad(why.to_string()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ScoringError> {
    let bytes = std::fs::read(path).map_err(|why| ScoringError::ModelLoad(why.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|why| ScoringError::ModelLoad(why.to_string()))
}
