//! Multi-signal risk evaluator
//!
//! Decides whether a user's activity inside a sliding time window looks
//! fraudulent by combining four independent signals, OR'd together with a
//! short-circuit return on the first one that fires:
//!
//! 1. Volume - number of transactions at or above the count limit
//! 2. Amount - total transaction amount at or above the amount limit
//! 3. Diversity - more than one distinct device or payment card used
//! 4. Geospatial velocity - two transactions close in time but far apart
//!
//! The evaluation order is a performance optimization (cheap counts before
//! the O(n²) pairwise distance scan), not a severity ranking.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::models::TransactionRecord;

use super::geo::haversine_km;

/// Per-request risk thresholds.
///
/// All values must be non-negative and the window positive; the HTTP
/// boundary validates this before the evaluator runs.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationThresholds {
    /// Transaction count at or above which the volume signal fires.
    pub transaction_count_limit: usize,
    /// Window, in whole minutes, bounding which transaction pairs the
    /// geospatial signal compares. A window of 0 degenerates to
    /// same-instant pairs only.
    pub time_window_minutes: i64,
    /// Total amount at or above which the amount signal fires.
    pub amount_limit: f64,
    /// Pairwise device distance at or above which the geospatial signal
    /// fires, in kilometers.
    pub distance_limit_km: f64,
}

/// The fraud indicator that triggered a positive verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Volume,
    Amount,
    Diversity,
    Geospatial,
}

/// Evaluates a user's recent transactions against the given thresholds.
///
/// Returns the first signal that fires, or `None` when the activity looks
/// clean. Pure and total: an empty slice, transactions without device or
/// card references, and devices without coordinates are all handled by
/// treating the affected signal as unable to fire, never as an error.
pub fn evaluate(
    transactions: &[TransactionRecord],
    thresholds: &EvaluationThresholds,
) -> Option<Signal> {
    if transactions.len() >= thresholds.transaction_count_limit {
        return Some(Signal::Volume);
    }

    let total_amount: f64 = transactions.iter().map(|t| t.amount).sum();
    if total_amount >= thresholds.amount_limit {
        return Some(Signal::Amount);
    }

    if uses_multiple_instruments(transactions) {
        return Some(Signal::Diversity);
    }

    if exceeds_geospatial_velocity(
        transactions,
        thresholds.time_window_minutes,
        thresholds.distance_limit_km,
    ) {
        return Some(Signal::Geospatial);
    }

    None
}

/// More than one distinct device, or more than one distinct payment card,
/// among the transactions. Records lacking the respective reference are
/// excluded from that count.
fn uses_multiple_instruments(transactions: &[TransactionRecord]) -> bool {
    let distinct_devices: HashSet<Uuid> =
        transactions.iter().filter_map(|t| t.device_id).collect();
    let distinct_cards: HashSet<Uuid> = transactions.iter().filter_map(|t| t.card_id).collect();

    distinct_devices.len() > 1 || distinct_cards.len() > 1
}

/// Scans every unordered pair of transactions. A pair fires when the two
/// timestamps are at most `time_window_minutes` apart (truncated whole
/// minutes, symmetric in either direction) and the two device locations are
/// at least `distance_limit_km` apart. Pairs where either device reports no
/// coordinates are skipped.
fn exceeds_geospatial_velocity(
    transactions: &[TransactionRecord],
    time_window_minutes: i64,
    distance_limit_km: f64,
) -> bool {
    for (i, first) in transactions.iter().enumerate() {
        let Some((lat1, lon1)) = first.device_location() else {
            continue;
        };

        for second in &transactions[i + 1..] {
            let Some((lat2, lon2)) = second.device_location() else {
                continue;
            };

            let elapsed_minutes = (second.occurred_at - first.occurred_at).num_minutes().abs();
            if elapsed_minutes > time_window_minutes {
                continue;
            }

            if haversine_km(lat1, lon1, lat2, lon2) >= distance_limit_km {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionStatus;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const WARSAW: (f64, f64) = (52.2297, 21.0122);
    const PRAGUE: (f64, f64) = (50.0755, 14.4378);

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn tx(
        amount: f64,
        minutes_offset: i64,
        card: Option<Uuid>,
        device: Option<Uuid>,
        location: Option<(f64, f64)>,
    ) -> TransactionRecord {
        TransactionRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            amount,
            currency: "EUR".to_string(),
            status: TransactionStatus::Approved,
            occurred_at: base_time() + Duration::minutes(minutes_offset),
            card_id: card,
            device_id: device,
            device_latitude: location.map(|(lat, _)| lat),
            device_longitude: location.map(|(_, lon)| lon),
        }
    }

    /// Thresholds high enough that no signal fires on a couple of small
    /// same-device, same-card transactions.
    fn quiet_thresholds() -> EvaluationThresholds {
        EvaluationThresholds {
            transaction_count_limit: 100,
            time_window_minutes: 60,
            amount_limit: 1_000_000.0,
            distance_limit_km: 10_000.0,
        }
    }

    #[test]
    fn empty_window_is_not_fraudulent() {
        let verdict = evaluate(&[], &quiet_thresholds());
        assert_eq!(verdict, None);
    }

    #[test]
    fn volume_fires_regardless_of_other_fields() {
        let card = Some(Uuid::new_v4());
        let device = Some(Uuid::new_v4());
        let transactions = vec![
            tx(1.0, 0, card, device, None),
            tx(1.0, 1, card, device, None),
            tx(1.0, 2, card, device, None),
        ];

        let thresholds = EvaluationThresholds {
            transaction_count_limit: 3,
            ..quiet_thresholds()
        };

        assert_eq!(evaluate(&transactions, &thresholds), Some(Signal::Volume));
    }

    #[test]
    fn volume_is_inclusive_at_the_limit() {
        let transactions = vec![tx(1.0, 0, None, None, None)];
        let thresholds = EvaluationThresholds {
            transaction_count_limit: 1,
            ..quiet_thresholds()
        };
        assert_eq!(evaluate(&transactions, &thresholds), Some(Signal::Volume));
    }

    #[test]
    fn amount_fires_when_count_and_diversity_are_quiet() {
        let card = Some(Uuid::new_v4());
        let device = Some(Uuid::new_v4());
        let transactions = vec![
            tx(600.0, 0, card, device, None),
            tx(500.0, 5, card, device, None),
        ];

        let thresholds = EvaluationThresholds {
            amount_limit: 1_000.0,
            ..quiet_thresholds()
        };

        assert_eq!(evaluate(&transactions, &thresholds), Some(Signal::Amount));
    }

    #[test]
    fn two_distinct_devices_fire_diversity() {
        let card = Some(Uuid::new_v4());
        let transactions = vec![
            tx(5.0, 0, card, Some(Uuid::new_v4()), None),
            tx(5.0, 5, card, Some(Uuid::new_v4()), None),
        ];

        assert_eq!(
            evaluate(&transactions, &quiet_thresholds()),
            Some(Signal::Diversity)
        );
    }

    #[test]
    fn two_distinct_cards_fire_diversity() {
        let device = Some(Uuid::new_v4());
        let transactions = vec![
            tx(5.0, 0, Some(Uuid::new_v4()), device, None),
            tx(5.0, 5, Some(Uuid::new_v4()), device, None),
        ];

        assert_eq!(
            evaluate(&transactions, &quiet_thresholds()),
            Some(Signal::Diversity)
        );
    }

    #[test]
    fn missing_references_do_not_count_toward_diversity() {
        // One device reference plus two records without any; the distinct
        // device count is 1 and the signal stays quiet.
        let transactions = vec![
            tx(5.0, 0, None, Some(Uuid::new_v4()), None),
            tx(5.0, 1, None, None, None),
            tx(5.0, 2, None, None, None),
        ];

        assert_eq!(evaluate(&transactions, &quiet_thresholds()), None);
    }

    #[test]
    fn warsaw_to_prague_in_ten_minutes_fires_geospatial() {
        let card = Some(Uuid::new_v4());
        let device = Some(Uuid::new_v4());
        let transactions = vec![
            tx(5.0, 0, card, device, Some(WARSAW)),
            tx(5.0, 10, card, device, Some(PRAGUE)),
        ];

        let thresholds = EvaluationThresholds {
            time_window_minutes: 60,
            distance_limit_km: 300.0,
            ..quiet_thresholds()
        };

        assert_eq!(
            evaluate(&transactions, &thresholds),
            Some(Signal::Geospatial)
        );
    }

    #[test]
    fn pair_outside_the_window_does_not_fire() {
        // Same Warsaw/Prague pair, but a 5 minute window excludes the
        // 10-minutes-apart pair from comparison.
        let card = Some(Uuid::new_v4());
        let device = Some(Uuid::new_v4());
        let transactions = vec![
            tx(5.0, 0, card, device, Some(WARSAW)),
            tx(5.0, 10, card, device, Some(PRAGUE)),
        ];

        let thresholds = EvaluationThresholds {
            time_window_minutes: 5,
            distance_limit_km: 300.0,
            ..quiet_thresholds()
        };

        assert_eq!(evaluate(&transactions, &thresholds), None);
    }

    #[test]
    fn window_bound_is_symmetric_in_input_order() {
        // Later transaction listed first; the absolute-value bound must
        // still pick the pair up.
        let card = Some(Uuid::new_v4());
        let device = Some(Uuid::new_v4());
        let transactions = vec![
            tx(5.0, 10, card, device, Some(PRAGUE)),
            tx(5.0, 0, card, device, Some(WARSAW)),
        ];

        let thresholds = EvaluationThresholds {
            time_window_minutes: 60,
            distance_limit_km: 300.0,
            ..quiet_thresholds()
        };

        assert_eq!(
            evaluate(&transactions, &thresholds),
            Some(Signal::Geospatial)
        );
    }

    #[test]
    fn zero_window_compares_same_instant_pairs_only() {
        let card = Some(Uuid::new_v4());
        let device = Some(Uuid::new_v4());

        let apart = vec![
            tx(5.0, 0, card, device, Some(WARSAW)),
            tx(5.0, 1, card, device, Some(PRAGUE)),
        ];
        let thresholds = EvaluationThresholds {
            time_window_minutes: 0,
            distance_limit_km: 300.0,
            ..quiet_thresholds()
        };
        assert_eq!(evaluate(&apart, &thresholds), None);

        let simultaneous = vec![
            tx(5.0, 0, card, device, Some(WARSAW)),
            tx(5.0, 0, card, device, Some(PRAGUE)),
        ];
        assert_eq!(
            evaluate(&simultaneous, &thresholds),
            Some(Signal::Geospatial)
        );
    }

    #[test]
    fn pairs_with_missing_coordinates_are_skipped() {
        let card = Some(Uuid::new_v4());
        let device = Some(Uuid::new_v4());
        let transactions = vec![
            tx(5.0, 0, card, device, Some(WARSAW)),
            tx(5.0, 1, card, device, None),
            tx(5.0, 2, card, device, None),
        ];

        let thresholds = EvaluationThresholds {
            time_window_minutes: 60,
            distance_limit_km: 0.1,
            ..quiet_thresholds()
        };

        assert_eq!(evaluate(&transactions, &thresholds), None);
    }

    #[test]
    fn volume_is_reported_before_amount_when_both_fire() {
        let transactions = vec![tx(1_000_000.0, 0, None, None, None)];
        let thresholds = EvaluationThresholds {
            transaction_count_limit: 1,
            amount_limit: 10.0,
            ..quiet_thresholds()
        };
        assert_eq!(evaluate(&transactions, &thresholds), Some(Signal::Volume));
    }
}
