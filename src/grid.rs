//! Builds a full ranked grid forecast: one feature vector and classification
//! per driver, plus the podium and predicted position deltas.

use crate::engine::Engine;
use crate::error::PredictError;
use crate::features::{self, MAX_GRID_SLOT};
use crate::ratings;
use crate::types::{DriverInput, GridEntry, Outcome, RaceForecast, WeatherInput};

const PODIUM_SIZE: usize = 3;

/// Assemble a forecast for a whole grid. Drivers are processed in the order
/// given (qualifying order); the forecast is either fully assembled or the
/// whole request is rejected. Persisting to history is the caller's decision.
pub fn assemble(
    engine: &Engine,
    track: &str,
    weather: &WeatherInput,
    drivers: &[DriverInput],
    ts_ms: i64,
) -> Result<RaceForecast, PredictError> {
    if track.trim().is_empty() {
        return Err(PredictError::validation("track", "must not be empty"));
    }
    if drivers.is_empty() {
        return Err(PredictError::validation("drivers", "grid is empty"));
    }
    if drivers.len() > usize::from(MAX_GRID_SLOT) {
        return Err(PredictError::validation(
            "drivers",
            format!("{} entries exceed the {}-slot grid", drivers.len(), MAX_GRID_SLOT),
        ));
    }
    let mut seen_slots = [false; MAX_GRID_SLOT as usize + 1];
    for d in drivers {
        let slot = usize::from(d.qualifying_position);
        if slot < seen_slots.len() && seen_slots[slot] {
            return Err(PredictError::validation(
                "qualifying_position",
                format!("duplicate grid slot {}", d.qualifying_position),
            ));
        }
        if slot < seen_slots.len() {
            seen_slots[slot] = true;
        }
    }

    let track_temp_c = weather
        .track_temp_c
        .unwrap_or_else(|| ratings::track_temp_default(track));

    let mut entries = Vec::with_capacity(drivers.len());
    for driver in drivers {
        let vector = features::normalize(driver, weather.dry, track_temp_c)?;
        let prediction = engine.predict(&vector)?;
        entries.push(GridEntry {
            driver: driver.driver.clone(),
            team: driver.team.clone(),
            qualifying_position: driver.qualifying_position,
            features: vector,
            prediction,
            predicted_delta: None,
        });
    }

    apply_predicted_deltas(&mut entries);
    let podium = derive_podium(&entries);

    Ok(RaceForecast {
        track: track.to_string(),
        weather: weather.clone(),
        ts_ms,
        entries,
        podium,
    })
}

/// Rank the non-DNF group by class severity, then P(top10), then grid slot,
/// and record `qualifying_position - rank` on each ranked entry. Buckets are
/// coarse, so deltas are informational and need not be unique.
fn apply_predicted_deltas(entries: &mut [GridEntry]) {
    let mut ranked: Vec<usize> = (0..entries.len())
        .filter(|&i| entries[i].prediction.label != Outcome::Dnf)
        .collect();
    ranked.sort_by(|&a, &b| {
        let (ea, eb) = (&entries[a], &entries[b]);
        ea.prediction
            .label
            .cmp(&eb.prediction.label)
            .then(
                eb.prediction
                    .p_top10()
                    .partial_cmp(&ea.prediction.p_top10())
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(ea.qualifying_position.cmp(&eb.qualifying_position))
    });

    for (rank0, &idx) in ranked.iter().enumerate() {
        let rank = rank0 as i32 + 1;
        entries[idx].predicted_delta = Some(i32::from(entries[idx].qualifying_position) - rank);
    }
}

/// The three strongest top-10 candidates among entries not predicted DNF,
/// presented in descending-confidence order with a qualifying tie-break.
fn derive_podium(entries: &[GridEntry]) -> Vec<String> {
    let mut candidates: Vec<&GridEntry> = entries
        .iter()
        .filter(|e| e.prediction.label != Outcome::Dnf)
        .collect();
    candidates.sort_by(|a, b| {
        b.prediction
            .p_top10()
            .partial_cmp(&a.prediction.p_top10())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.qualifying_position.cmp(&b.qualifying_position))
    });
    candidates.truncate(PODIUM_SIZE);

    candidates.sort_by(|a, b| {
        b.prediction
            .confidence
            .partial_cmp(&a.prediction.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.qualifying_position.cmp(&b.qualifying_position))
    });
    candidates.iter().map(|e| e.driver.clone()).collect()
}
