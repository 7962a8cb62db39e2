use chrono::{DateTime, Utc};

use crate::{ClientId, Coordinate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionType {
    Daily,
    Weekly,
}

/// A place detected from a dwell or low-speed segment, aggregated by
/// coordinate equality upstream. `poi_rank` and `visit_count` come from that
/// aggregation; this crate only ever reads them.
#[derive(Debug, Clone)]
pub struct Poi {
    pub client_id: ClientId,
    pub location: Coordinate,
    pub time_spent: f64,
    pub poi_rank: i32,
    pub visit_start: DateTime<Utc>,
    pub visit_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A future visit predicted by the weekly clustering collaborator.
#[derive(Debug, Clone)]
pub struct PredictedPoi {
    pub client_id: ClientId,
    pub location: Coordinate,
    pub predicted_visit_time: DateTime<Utc>,
    pub prediction_type: PredictionType,
}

/// One row of `view_combined_pois`: the union of detected and predicted POIs
/// for a client, already carrying whichever fields apply to its origin and
/// leaving the rest `None`. Selection never needs to know which side of the
/// union a row came from beyond the `is_predicted` flag used for ordering.
#[derive(Debug, Clone)]
pub struct CombinedPoi {
    pub client_id: ClientId,
    pub location: Coordinate,
    pub is_predicted: bool,
    pub poi_rank: Option<i32>,
    pub predicted_visit_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CombinedPoi {
    pub fn from_detected(poi: Poi) -> Self {
        Self {
            client_id: poi.client_id,
            location: poi.location,
            is_predicted: false,
            poi_rank: Some(poi.poi_rank),
            predicted_visit_time: None,
            created_at: poi.created_at,
        }
    }

    pub fn from_predicted(poi: PredictedPoi, created_at: DateTime<Utc>) -> Self {
        Self {
            client_id: poi.client_id,
            location: poi.location,
            is_predicted: true,
            poi_rank: None,
            predicted_visit_time: Some(poi.predicted_visit_time),
            created_at,
        }
    }

    /// Sort key for picking the single best combined POI: predicted rows
    /// first, then higher rank, then more recent predicted visit, then more
    /// recent creation. Comparing two keys with `>` reproduces the ordering
    /// described for the combined-POI view exactly.
    fn selection_key(&self) -> (bool, i32, i64, i64) {
        (
            self.is_predicted,
            self.poi_rank.unwrap_or(i32::MIN),
            self.predicted_visit_time
                .map(|t| t.timestamp())
                .unwrap_or(i64::MIN),
            self.created_at.timestamp(),
        )
    }

    pub fn best(candidates: impl IntoIterator<Item = Self>) -> Option<Self> {
        candidates
            .into_iter()
            .max_by_key(|candidate| candidate.selection_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn predicted_outranks_detected_regardless_of_recency() {
        let predicted = CombinedPoi {
            client_id: "c1".into(),
            location: Coordinate::new(1.0, 1.0),
            is_predicted: true,
            poi_rank: None,
            predicted_visit_time: Some(at(10)),
            created_at: at(10),
        };
        let detected = CombinedPoi {
            client_id: "c1".into(),
            location: Coordinate::new(2.0, 2.0),
            is_predicted: false,
            poi_rank: Some(100),
            predicted_visit_time: None,
            created_at: at(9999),
        };
        let best = CombinedPoi::best(vec![detected, predicted.clone()]).unwrap();
        assert_eq!(best.location, predicted.location);
    }

    #[test]
    fn higher_rank_wins_among_detected() {
        let low_rank = CombinedPoi {
            client_id: "c1".into(),
            location: Coordinate::new(1.0, 1.0),
            is_predicted: false,
            poi_rank: Some(1),
            predicted_visit_time: None,
            created_at: at(100),
        };
        let high_rank = CombinedPoi {
            client_id: "c1".into(),
            location: Coordinate::new(2.0, 2.0),
            is_predicted: false,
            poi_rank: Some(5),
            predicted_visit_time: None,
            created_at: at(1),
        };
        let best = CombinedPoi::best(vec![low_rank, high_rank.clone()]).unwrap();
        assert_eq!(best.location, high_rank.location);
    }
}
