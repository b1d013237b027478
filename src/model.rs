use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::types::{CLASS_NAMES, FEATURE_NAMES};

/// Sidecar metadata shipped next to the serialized ensemble.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelMeta {
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    #[serde(default)]
    pub train_accuracy: Option<f64>,
    #[serde(default)]
    pub hyperparameters: Option<Hyperparameters>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hyperparameters {
    #[serde(default)]
    pub n_estimators: Option<usize>,
    #[serde(default)]
    pub learning_rate: Option<f64>,
    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// One node of a flattened decision tree. Split nodes carry child indices
/// into the tree's node array; leaves carry the raw score contribution.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root; `x <= threshold` goes left.
    fn eval(&self, x: &[f64; 6]) -> f64 {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            bail!("tree has no nodes");
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    bail!("node {} splits on feature {} of {}", i, feature, n_features);
                }
                // Children must point forward so eval cannot cycle.
                if *left <= i || *right <= i || *left >= self.nodes.len() || *right >= self.nodes.len()
                {
                    bail!("node {} has out-of-order child indices", i);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct EnsembleJson {
    learning_rate: f64,
    init_scores: [f64; 3],
    /// One tree sequence per class, indexed like `CLASS_NAMES`.
    trees: Vec<Vec<Tree>>,
}

/// The trained gradient-boosted classifier plus its metadata. Loaded once at
/// process start and read-only afterwards; absence at startup is handled by
/// the caller, which runs the engine in heuristic mode instead.
#[derive(Debug)]
pub struct ModelArtifact {
    meta: ModelMeta,
    ensemble: EnsembleJson,
}

impl ModelArtifact {
    pub fn load(model_path: &str, meta_path: &str) -> Result<Self> {
        let model_txt = fs::read_to_string(Path::new(model_path))
            .with_context(|| format!("failed to read model at {}", model_path))?;
        let meta_txt = fs::read_to_string(Path::new(meta_path))
            .with_context(|| format!("failed to read meta at {}", meta_path))?;
        Self::from_parts(&model_txt, &meta_txt)
    }

    /// Parse and validate the two artifact documents.
    pub fn from_parts(model_json: &str, meta_json: &str) -> Result<Self> {
        let meta: ModelMeta =
            serde_json::from_str(meta_json).with_context(|| "failed to parse meta.json")?;
        if meta.feature_names != FEATURE_NAMES {
            bail!(
                "meta feature_names {:?} do not match expected {:?}",
                meta.feature_names,
                FEATURE_NAMES
            );
        }
        if meta.class_names != CLASS_NAMES {
            bail!(
                "meta class_names {:?} do not match expected {:?}",
                meta.class_names,
                CLASS_NAMES
            );
        }

        let ensemble: EnsembleJson =
            serde_json::from_str(model_json).with_context(|| "failed to parse model.json")?;
        if ensemble.trees.len() != CLASS_NAMES.len() {
            bail!(
                "expected {} tree sequences, got {}",
                CLASS_NAMES.len(),
                ensemble.trees.len()
            );
        }
        if !ensemble.learning_rate.is_finite() || ensemble.learning_rate <= 0.0 {
            bail!("learning_rate {} is not positive", ensemble.learning_rate);
        }
        for (class, trees) in ensemble.trees.iter().enumerate() {
            for tree in trees {
                tree.validate(FEATURE_NAMES.len())
                    .with_context(|| format!("invalid tree for class {}", CLASS_NAMES[class]))?;
            }
        }

        let artifact = Self { meta, ensemble };

        // Probe forward on a zero vector so a structurally broken artifact
        // fails at load rather than on the first request.
        let probe = artifact.predict_proba(&[0.0; 6]);
        let sum: f64 = probe.iter().sum();
        if !probe.iter().all(|p| p.is_finite()) || (sum - 1.0).abs() > 1e-6 {
            bail!("probe forward produced a malformed simplex: {:?}", probe);
        }

        Ok(artifact)
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// Class probabilities over [top10, bottom10, dnf].
    ///
    /// Raw score per class = init score + learning_rate * sum of leaf values;
    /// softmax (max-subtracted) maps the scores onto the simplex.
    pub fn predict_proba(&self, x: &[f64; 6]) -> [f64; 3] {
        let mut raw = [0.0f64; 3];
        for class in 0..raw.len() {
            let boosted: f64 = self.ensemble.trees[class].iter().map(|t| t.eval(x)).sum();
            raw[class] = self.ensemble.init_scores[class] + self.ensemble.learning_rate * boosted;
        }

        let max = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mut probs = [0.0f64; 3];
        let mut denom = 0.0;
        for (p, r) in probs.iter_mut().zip(raw.iter()) {
            *p = (r - max).exp();
            denom += *p;
        }
        for p in &mut probs {
            *p /= denom;
        }
        probs
    }
}

// One depth-1 tree per class: top10 keys off grid slot, bottom10 off the
// same split inverted, dnf off the weather flag. Shared with engine tests.
#[cfg(test)]
pub(crate) mod fixtures {
    pub(crate) const MODEL_FIXTURE: &str = r#"{
        "learning_rate": 1.0,
        "init_scores": [0.0, 0.0, 0.0],
        "trees": [
            [{"nodes": [
                {"feature": 0, "threshold": 10.5, "left": 1, "right": 2},
                {"value": 2.0},
                {"value": -2.0}
            ]}],
            [{"nodes": [
                {"feature": 0, "threshold": 10.5, "left": 1, "right": 2},
                {"value": -1.0},
                {"value": 1.5}
            ]}],
            [{"nodes": [
                {"feature": 3, "threshold": 0.5, "left": 1, "right": 2},
                {"value": 0.5},
                {"value": -1.5}
            ]}]
        ]
    }"#;

    pub(crate) const META_FIXTURE: &str = r#"{
        "feature_names": ["qualifying_position", "driver_rating", "team_performance",
                          "weather_dry", "track_temperature", "tire_strategy"],
        "class_names": ["top10", "bottom10", "dnf"],
        "train_accuracy": 0.87,
        "hyperparameters": {"n_estimators": 1, "learning_rate": 1.0, "max_depth": 1}
    }"#;
}
