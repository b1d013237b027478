use serde::{Deserialize, Serialize};

/// Canonical feature ordering. Model metadata must list exactly these names
/// in this order; the normalizer emits vectors in the same order.
pub const FEATURE_NAMES: [&str; 6] = [
    "qualifying_position",
    "driver_rating",
    "team_performance",
    "weather_dry",
    "track_temperature",
    "tire_strategy",
];

/// Class names in fixed index order: 0=top10, 1=bottom10, 2=dnf.
pub const CLASS_NAMES: [&str; 3] = ["top10", "bottom10", "dnf"];

/// Race outcome bucket. Variant order is severity order (Top10 < Bottom10 < Dnf)
/// and matches the class indices the model artifact is trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Top10,
    Bottom10,
    Dnf,
}

impl Outcome {
    pub fn index(self) -> usize {
        match self {
            Outcome::Top10 => 0,
            Outcome::Bottom10 => 1,
            Outcome::Dnf => 2,
        }
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Outcome::Top10),
            1 => Some(Outcome::Bottom10),
            2 => Some(Outcome::Dnf),
            _ => None,
        }
    }
}

/// The fixed six-feature input to the classifier. Built once per driver per
/// request by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Grid slot after qualifying, 1..=20.
    pub qualifying_position: f64,
    /// Driver skill rating in [0, 1].
    pub driver_rating: f64,
    /// Car/team performance in [0, 1].
    pub team_performance: f64,
    /// 1.0 for a dry race, 0.0 for wet.
    pub weather_dry: f64,
    /// Track surface temperature in Celsius, clamped to a plausible range.
    pub track_temperature: f64,
    /// Tire strategy aggressiveness multiplier, clamped to [0.5, 1.5].
    pub tire_strategy: f64,
}

impl FeatureVector {
    /// Values in the canonical `FEATURE_NAMES` order.
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.qualifying_position,
            self.driver_rating,
            self.team_performance,
            self.weather_dry,
            self.track_temperature,
            self.tire_strategy,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Classifier output for a single driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Outcome,
    /// Max class probability (model mode) or distance-to-threshold score
    /// (heuristic mode), always in [0, 1].
    pub confidence: f64,
    /// Full simplex over [top10, bottom10, dnf]; sums to 1.
    pub probabilities: [f64; 3],
    /// True when produced by the rule-based fallback rather than the trained model.
    pub heuristic: bool,
}

impl Prediction {
    pub fn p_top10(&self) -> f64 {
        self.probabilities[Outcome::Top10.index()]
    }
}

// ---------- Request types ----------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherInput {
    pub dry: bool,
    /// Track temperature in Celsius; defaults per track when omitted.
    #[serde(default)]
    pub track_temp_c: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriverInput {
    pub driver: String,
    pub team: String,
    pub qualifying_position: u8,
    #[serde(default = "default_tire_strategy")]
    pub tire_strategy: f64,
}

fn default_tire_strategy() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecastRequest {
    pub track: String,
    pub weather: WeatherInput,
    pub drivers: Vec<DriverInput>,
}

// ---------- Response types ----------

/// One grid slot of an assembled forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridEntry {
    pub driver: String,
    pub team: String,
    pub qualifying_position: u8,
    pub features: FeatureVector,
    pub prediction: Prediction,
    /// qualifying_position minus predicted rank within the non-DNF group;
    /// absent for entries classified DNF.
    pub predicted_delta: Option<i32>,
}

/// A full-grid forecast; the unit appended to history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceForecast {
    pub track: String,
    pub weather: WeatherInput,
    pub ts_ms: i64,
    pub entries: Vec<GridEntry>,
    /// Driver names, best podium candidate first.
    pub podium: Vec<String>,
}
