//! Regressor backends
//!
//! The trained scikit-learn models ship as JSON: a linear model as its
//! coefficients, a random forest as the node arrays of every fitted tree.
//! ONNX graphs built from standard operators run through tract; the
//! `ai.onnx.ml` regressor operators are not covered by tract.

use super::Regressor;
use crate::error::ArtifactError;
use crate::models::FEATURE_COUNT;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::debug;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Build a regressor from artifact bytes, picking the backend by file extension
pub fn load_regressor(
    key: &'static str,
    path: &Path,
    bytes: &[u8],
) -> Result<Box<dyn Regressor>, ArtifactError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("onnx") => {
            let regressor = OnnxRegressor::from_bytes(key, bytes).map_err(|e| {
                ArtifactError::Model {
                    key,
                    message: format!("{:#}", e),
                }
            })?;
            Ok(Box::new(regressor))
        }
        Some("json") => json_regressor(bytes).map_err(|e| ArtifactError::Parse {
            key,
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        }),
        _ => Err(ArtifactError::UnsupportedFormat {
            key,
            path: path.to_path_buf(),
        }),
    }
}

/// A JSON export holding `estimators_` is a forest; anything else is linear
fn json_regressor(bytes: &[u8]) -> Result<Box<dyn Regressor>> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).context("Model file is not valid JSON")?;

    if value.get("estimators_").or_else(|| value.get("estimators")).is_some() {
        Ok(Box::new(ForestRegressor::from_value(value)?))
    } else {
        Ok(Box::new(LinearRegressor::from_value(value)?))
    }
}

/// ONNX regressor with a fixed `[1, 7]` f32 input
pub struct OnnxRegressor {
    model: TractModel,
    description: String,
}

impl OnnxRegressor {
    /// Load and optimize an ONNX model from bytes
    pub fn from_bytes(key: &str, model_bytes: &[u8]) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;

        debug!(key = %key, size = model_bytes.len(), "ONNX model loaded");
        Ok(Self {
            model,
            description: format!("onnx:{}", key),
        })
    }

    fn features_to_tensor(features: &[f64]) -> Result<Tensor> {
        let data: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let array = tract_ndarray::Array2::from_shape_vec((1, FEATURE_COUNT), data)
            .context("Failed to build input tensor")?;
        Ok(array.into())
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != FEATURE_COUNT {
            anyhow::bail!(
                "Feature vector has {} values, model expects {}",
                features.len(),
                FEATURE_COUNT
            );
        }

        let input = Self::features_to_tensor(features)?;
        let result = self.model.run(tvec!(input.into()))?;
        let output = result.first().context("No output from model")?;
        let view = output
            .to_array_view::<f32>()
            .context("Model output is not f32")?;
        let value = view.iter().next().copied().context("Model output is empty")?;

        Ok(value as f64)
    }

    fn describe(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(f64),
    Many(Vec<f64>),
    Nested(Vec<Vec<f64>>),
}

impl OneOrMany {
    fn into_flat(self) -> Vec<f64> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
            OneOrMany::Nested(rows) => rows.into_iter().flatten().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LinearFile {
    #[serde(alias = "coef_")]
    coef: OneOrMany,
    #[serde(alias = "intercept_")]
    intercept: OneOrMany,
}

/// `intercept + coef · features`, stored as JSON coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressor {
    coef: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self { coef, intercept }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Self::from_value(serde_json::from_slice(bytes).context("Model file is not valid JSON")?)
    }

    fn from_value(value: serde_json::Value) -> Result<Self> {
        let file: LinearFile =
            serde_json::from_value(value).context("Malformed linear model coefficients")?;

        let coef = file.coef.into_flat();
        let intercept = match file.intercept.into_flat().as_slice() {
            [v] => *v,
            other => anyhow::bail!("Expected a single intercept, found {}", other.len()),
        };

        if coef.is_empty() {
            anyhow::bail!("Linear model has no coefficients");
        }
        if !intercept.is_finite() || coef.iter().any(|c| !c.is_finite()) {
            anyhow::bail!("Linear model coefficients must be finite");
        }

        Ok(Self::new(coef, intercept))
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coef
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coef.len() {
            anyhow::bail!(
                "Feature vector has {} values, model expects {}",
                features.len(),
                self.coef.len()
            );
        }
        let dot: f64 = self.coef.iter().zip(features).map(|(c, x)| c * x).sum();
        Ok(self.intercept + dot)
    }

    fn describe(&self) -> &str {
        "linear-json"
    }
}

/// scikit-learn's child index for "no child"
const TREE_LEAF: i64 = -1;

/// One fitted tree, in the layout of scikit-learn's `tree_` attribute
#[derive(Debug, Deserialize)]
struct TreeFile {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<OneOrMany>,
}

#[derive(Debug, Deserialize)]
struct ForestFile {
    #[serde(alias = "estimators_")]
    estimators: Vec<TreeFile>,
    #[serde(default, alias = "n_features_in_")]
    n_features: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// A regression tree validated so that every walk ends on a leaf
#[derive(Debug, Clone, PartialEq)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_file(index: usize, tree: TreeFile) -> Result<Self> {
        let count = tree.children_left.len();
        if count == 0 {
            anyhow::bail!("Tree {} has no nodes", index);
        }
        if [
            tree.children_right.len(),
            tree.feature.len(),
            tree.threshold.len(),
            tree.value.len(),
        ]
        .iter()
        .any(|len| *len != count)
        {
            anyhow::bail!("Tree {} has node arrays of different lengths", index);
        }

        let mut nodes = Vec::with_capacity(count);
        for (node, value) in tree.value.into_iter().enumerate() {
            if tree.children_left[node] == TREE_LEAF {
                let leaf = match value.into_flat().as_slice() {
                    [v] if v.is_finite() => *v,
                    other => anyhow::bail!(
                        "Tree {} leaf {} must hold one finite value, found {:?}",
                        index,
                        node,
                        other
                    ),
                };
                nodes.push(Node::Leaf(leaf));
                continue;
            }

            // Children always follow their parent, so walks cannot cycle
            let child = |raw: i64| {
                usize::try_from(raw)
                    .ok()
                    .filter(|c| *c > node && *c < count)
                    .with_context(|| {
                        format!("Tree {} node {} has invalid child {}", index, node, raw)
                    })
            };
            let feature = usize::try_from(tree.feature[node])
                .with_context(|| format!("Tree {} node {} has no split feature", index, node))?;
            let threshold = tree.threshold[node];
            if !threshold.is_finite() {
                anyhow::bail!("Tree {} node {} has a non-finite threshold", index, node);
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left: child(tree.children_left[node])?,
                right: child(tree.children_right[node])?,
            });
        }

        Ok(Self { nodes })
    }

    fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf(_) => None,
            })
            .max()
    }

    fn evaluate(&self, features: &[f64]) -> Result<f64> {
        let mut index = 0;
        loop {
            match self.nodes.get(index).context("Tree walk left the node table")? {
                Node::Leaf(value) => return Ok(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features
                        .get(*feature)
                        .with_context(|| format!("Split on missing feature {}", feature))?;
                    // Fitted trees compare float32 inputs against their thresholds
                    index = if (*x as f32 as f64) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Random forest regressor: the mean of its trees' predictions
#[derive(Debug, Clone, PartialEq)]
pub struct ForestRegressor {
    trees: Vec<DecisionTree>,
    n_features: Option<usize>,
}

impl ForestRegressor {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Self::from_value(serde_json::from_slice(bytes).context("Model file is not valid JSON")?)
    }

    fn from_value(value: serde_json::Value) -> Result<Self> {
        let file: ForestFile =
            serde_json::from_value(value).context("Malformed random forest export")?;
        if file.estimators.is_empty() {
            anyhow::bail!("Random forest has no trees");
        }

        let trees = file
            .estimators
            .into_iter()
            .enumerate()
            .map(|(i, tree)| DecisionTree::from_file(i, tree))
            .collect::<Result<Vec<_>>>()?;

        if let Some(n_features) = file.n_features {
            let widest = trees.iter().filter_map(DecisionTree::max_feature).max();
            if widest.is_some_and(|f| f >= n_features) {
                anyhow::bail!("Random forest splits on a feature beyond its {} inputs", n_features);
            }
        }

        debug!(trees = trees.len(), "Random forest loaded");
        Ok(Self {
            trees,
            n_features: file.n_features,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for ForestRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if let Some(expected) = self.n_features {
            if features.len() != expected {
                anyhow::bail!(
                    "Feature vector has {} values, model expects {}",
                    features.len(),
                    expected
                );
            }
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    fn describe(&self) -> &str {
        "forest-json"
    }
}
