//! Classifier wrapper: trained-model inference when an artifact is loaded,
//! a fixed weighted-score heuristic when it is not.

use crate::error::PredictError;
use crate::model::ModelArtifact;
use crate::types::{FeatureVector, Outcome, Prediction};

// Heuristic weights; qualifying position dominates, weather and driver
// rating are secondary. Terms are each scaled into [0, 1] so the score is too.
const W_QUALIFYING: f64 = 0.45;
const W_DRIVER: f64 = 0.20;
const W_TEAM: f64 = 0.15;
const W_WEATHER: f64 = 0.10;
const W_TEMPERATURE: f64 = 0.05;
const W_TIRE: f64 = 0.05;

// Score cut-offs between the three buckets.
const TOP10_CUTOFF: f64 = 0.55;
const DNF_CUTOFF: f64 = 0.30;

/// Heuristic confidence never claims model-grade certainty.
const MAX_HEURISTIC_CONFIDENCE: f64 = 0.85;

const IDEAL_TRACK_TEMP_C: f64 = 25.0;

/// Prediction engine. The artifact is injected at construction; `None` runs
/// the engine in heuristic mode for the life of the process.
pub struct Engine {
    artifact: Option<ModelArtifact>,
}

impl Engine {
    pub fn new(artifact: Option<ModelArtifact>) -> Self {
        Self { artifact }
    }

    pub fn model_loaded(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn mode(&self) -> &'static str {
        if self.model_loaded() {
            "model"
        } else {
            "heuristic"
        }
    }

    /// Classify one feature vector. Never fails on well-formed input; DNF is
    /// an ordinary class, not an error.
    pub fn predict(&self, vector: &FeatureVector) -> Result<Prediction, PredictError> {
        if !vector.is_finite() {
            return Err(PredictError::InvalidFeature(format!("{:?}", vector)));
        }
        match &self.artifact {
            Some(artifact) => Ok(Self::from_probabilities(
                artifact.predict_proba(&vector.to_array()),
            )),
            None => Ok(Self::heuristic(vector)),
        }
    }

    /// Arg-max over the simplex; ties resolve to the lowest class index.
    fn from_probabilities(probabilities: [f64; 3]) -> Prediction {
        let mut best = 0usize;
        for (idx, p) in probabilities.iter().enumerate().skip(1) {
            if *p > probabilities[best] {
                best = idx;
            }
        }
        Prediction {
            label: Outcome::from_index(best).unwrap_or(Outcome::Dnf),
            confidence: probabilities[best],
            probabilities,
            heuristic: false,
        }
    }

    /// Fallback classification: weighted linear score mapped to a bucket via
    /// fixed thresholds, confidence synthesized from distance-to-threshold.
    fn heuristic(vector: &FeatureVector) -> Prediction {
        let score = Self::heuristic_score(vector);

        let (label, margin) = if score >= TOP10_CUTOFF {
            (Outcome::Top10, score - TOP10_CUTOFF)
        } else if score >= DNF_CUTOFF {
            let margin = (score - DNF_CUTOFF).min(TOP10_CUTOFF - score);
            (Outcome::Bottom10, margin)
        } else {
            (Outcome::Dnf, DNF_CUTOFF - score)
        };

        let confidence = (0.5 + margin).min(MAX_HEURISTIC_CONFIDENCE);

        // Spread the remaining mass so the adjacent bucket stays more likely
        // than the far one and the three values sum to exactly 1.
        let rest = 1.0 - confidence;
        let (near, far) = (rest * 2.0 / 3.0, rest / 3.0);
        let probabilities = match label {
            Outcome::Top10 => [confidence, near, far],
            Outcome::Dnf => [far, near, confidence],
            Outcome::Bottom10 => {
                if TOP10_CUTOFF - score <= score - DNF_CUTOFF {
                    [near, confidence, far]
                } else {
                    [far, confidence, near]
                }
            }
        };

        Prediction {
            label,
            confidence,
            probabilities,
            heuristic: true,
        }
    }

    fn heuristic_score(vector: &FeatureVector) -> f64 {
        let qualifying_term = (21.0 - vector.qualifying_position) / 20.0;
        let temperature_term =
            (1.0 - (vector.track_temperature - IDEAL_TRACK_TEMP_C).abs() / 40.0).clamp(0.0, 1.0);
        let tire_term = (vector.tire_strategy.clamp(0.5, 1.5) - 0.5).clamp(0.0, 1.0);

        W_QUALIFYING * qualifying_term
            + W_DRIVER * vector.driver_rating
            + W_TEAM * vector.team_performance
            + W_WEATHER * vector.weather_dry
            + W_TEMPERATURE * temperature_term
            + W_TIRE * tire_term
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{META_FIXTURE, MODEL_FIXTURE};

    fn pole_vector() -> FeatureVector {
        FeatureVector {
            qualifying_position: 1.0,
            driver_rating: 0.95,
            team_performance: 0.90,
            weather_dry: 1.0,
            track_temperature: 25.0,
            tire_strategy: 1.0,
        }
    }

    fn backmarker_wet_vector() -> FeatureVector {
        FeatureVector {
            qualifying_position: 15.0,
            driver_rating: 0.5,
            team_performance: 0.5,
            weather_dry: 0.0,
            track_temperature: 10.0,
            tire_strategy: 1.0,
        }
    }

    fn model_engine() -> Engine {
        Engine::new(Some(
            ModelArtifact::from_parts(MODEL_FIXTURE, META_FIXTURE).unwrap(),
        ))
    }

    #[test]
    fn pole_is_top10_in_both_modes() {
        for engine in [Engine::new(None), model_engine()] {
            let p = engine.predict(&pole_vector()).unwrap();
            assert_eq!(p.label, Outcome::Top10, "mode {}", engine.mode());
            assert!(p.confidence > 0.5, "confidence {} too low", p.confidence);
        }
    }

    #[test]
    fn probabilities_sum_to_one_in_both_modes() {
        for engine in [Engine::new(None), model_engine()] {
            for v in [pole_vector(), backmarker_wet_vector()] {
                let p = engine.predict(&v).unwrap();
                let sum: f64 = p.probabilities.iter().sum();
                assert!((sum - 1.0).abs() < 1e-6, "sum {} in mode {}", sum, engine.mode());
            }
        }
    }

    #[test]
    fn heuristic_results_are_flagged() {
        let p = Engine::new(None).predict(&pole_vector()).unwrap();
        assert!(p.heuristic);
        let p = model_engine().predict(&pole_vector()).unwrap();
        assert!(!p.heuristic);
    }

    #[test]
    fn backmarker_in_wet_is_not_top10() {
        for engine in [Engine::new(None), model_engine()] {
            let p = engine.predict(&backmarker_wet_vector()).unwrap();
            assert_ne!(p.label, Outcome::Top10, "mode {}", engine.mode());
        }
    }

    #[test]
    fn heuristic_confidence_is_capped() {
        let p = Engine::new(None).predict(&pole_vector()).unwrap();
        assert!(p.confidence <= MAX_HEURISTIC_CONFIDENCE + 1e-12);
    }

    #[test]
    fn label_matches_argmax_probability() {
        let engine = Engine::new(None);
        for pos in 1..=20u8 {
            let mut v = backmarker_wet_vector();
            v.qualifying_position = f64::from(pos);
            let p = engine.predict(&v).unwrap();
            let max = p
                .probabilities
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(p.probabilities[p.label.index()], max);
        }
    }

    #[test]
    fn argmax_tie_breaks_to_lowest_class_index() {
        let p = Engine::from_probabilities([0.4, 0.4, 0.2]);
        assert_eq!(p.label, Outcome::Top10);
        let p = Engine::from_probabilities([0.2, 0.4, 0.4]);
        assert_eq!(p.label, Outcome::Bottom10);
    }

    #[test]
    fn non_finite_vector_rejected() {
        let mut v = pole_vector();
        v.track_temperature = f64::NAN;
        let err = Engine::new(None).predict(&v).unwrap_err();
        assert!(matches!(err, PredictError::InvalidFeature(_)));
    }

    #[test]
    fn every_grid_slot_gets_a_classification() {
        let engine = Engine::new(None);
        for pos in 1..=20u8 {
            let mut v = pole_vector();
            v.qualifying_position = f64::from(pos);
            assert!(engine.predict(&v).is_ok());
        }
    }
}
