//! Cost/credit envelope reported with every GraphQL response
//!
//! The store meters queries with a leaky bucket. Each response carries the
//! bucket state in `extensions.cost`:
//!
//! ```json
//! {
//!   "requestedQueryCost": 12,
//!   "actualQueryCost": 10,
//!   "throttleStatus": {
//!     "maximumAvailable": 1000.0,
//!     "currentlyAvailable": 990,
//!     "restoreRate": 50.0
//!   }
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Bucket state derived from one response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleStatus {
    pub requested_cost: f64,
    pub actual_cost: f64,
    pub max_credits: f64,
    pub available_credits: f64,
    pub restore_rate_per_second: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CostEnvelope {
    #[serde(default)]
    requested_query_cost: Option<f64>,
    #[serde(default)]
    actual_query_cost: Option<f64>,
    throttle_status: BucketEnvelope,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BucketEnvelope {
    maximum_available: f64,
    currently_available: f64,
    restore_rate: f64,
}

impl ThrottleStatus {
    /// Read the status from a response's `extensions` block
    ///
    /// Returns `None` when the block is absent or malformed.
    pub fn from_extensions(extensions: &Value) -> Option<Self> {
        let cost = extensions.get("cost")?;
        let envelope: CostEnvelope = serde_json::from_value(cost.clone()).ok()?;

        Some(Self {
            requested_cost: envelope.requested_query_cost.unwrap_or_default(),
            actual_cost: envelope.actual_query_cost.unwrap_or_default(),
            max_credits: envelope.throttle_status.maximum_available,
            available_credits: envelope.throttle_status.currently_available,
            restore_rate_per_second: envelope.throttle_status.restore_rate,
        })
    }

    /// Time to wait before the next call, if credits are running low
    ///
    /// Below `threshold`, waits until the bucket is refilled to twice the
    /// threshold: `(2 * threshold - available) / restore_rate` seconds,
    /// rounded up to the millisecond. A non-positive restore rate disables
    /// pacing.
    pub fn pacing_delay(&self, threshold: f64) -> Option<Duration> {
        let available = self.available_credits;
        if available.is_nan() || available >= threshold {
            return None;
        }
        let rate = self.restore_rate_per_second;
        if !rate.is_finite() || rate <= 0.0 {
            return None;
        }

        let deficit = 2.0 * threshold - available;
        let wait_ms = (deficit / rate * 1000.0).ceil();
        if !wait_ms.is_finite() || wait_ms <= 0.0 {
            return None;
        }

        Some(Duration::from_millis(wait_ms as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(available: f64, restore_rate: f64) -> ThrottleStatus {
        ThrottleStatus {
            requested_cost: 10.0,
            actual_cost: 10.0,
            max_credits: 1000.0,
            available_credits: available,
            restore_rate_per_second: restore_rate,
        }
    }

    #[test]
    fn test_parse_complete_envelope() {
        let extensions = json!({
            "cost": {
                "requestedQueryCost": 12,
                "actualQueryCost": 10,
                "throttleStatus": {
                    "maximumAvailable": 1000.0,
                    "currentlyAvailable": 990,
                    "restoreRate": 50.0
                }
            }
        });

        let parsed = ThrottleStatus::from_extensions(&extensions).unwrap();
        assert_eq!(
            parsed,
            ThrottleStatus {
                requested_cost: 12.0,
                actual_cost: 10.0,
                max_credits: 1000.0,
                available_credits: 990.0,
                restore_rate_per_second: 50.0,
            }
        );
    }

    #[test]
    fn test_null_actual_cost_defaults_to_zero() {
        let extensions = json!({
            "cost": {
                "requestedQueryCost": 200,
                "actualQueryCost": null,
                "throttleStatus": {
                    "maximumAvailable": 1000.0,
                    "currentlyAvailable": 12,
                    "restoreRate": 50.0
                }
            }
        });

        let parsed = ThrottleStatus::from_extensions(&extensions).unwrap();
        assert_eq!(parsed.actual_cost, 0.0);
        assert_eq!(parsed.available_credits, 12.0);
    }

    #[test]
    fn test_missing_or_malformed_envelope() {
        assert_eq!(ThrottleStatus::from_extensions(&json!({})), None);
        assert_eq!(
            ThrottleStatus::from_extensions(&json!({ "cost": { "requestedQueryCost": 1 } })),
            None
        );
        assert_eq!(
            ThrottleStatus::from_extensions(&json!({
                "cost": {
                    "throttleStatus": {
                        "maximumAvailable": "lots",
                        "currentlyAvailable": 10,
                        "restoreRate": 50
                    }
                }
            })),
            None
        );
    }

    #[test]
    fn test_pacing_delay_example() {
        // (100 - 30) / 10 * 1000 = 7000 ms
        assert_eq!(
            status(30.0, 10.0).pacing_delay(50.0),
            Some(Duration::from_millis(7000))
        );
    }

    #[test]
    fn test_pacing_delay_rounds_up() {
        // (100 - 40) / 8 * 1000 = 7500 ms
        assert_eq!(
            status(40.0, 8.0).pacing_delay(50.0),
            Some(Duration::from_millis(7500))
        );
        // (100 - 0) / 30 * 1000 = 3333.33.. -> 3334 ms
        assert_eq!(
            status(0.0, 30.0).pacing_delay(50.0),
            Some(Duration::from_millis(3334))
        );
    }

    #[test]
    fn test_no_pacing_at_or_above_threshold() {
        assert_eq!(status(50.0, 10.0).pacing_delay(50.0), None);
        assert_eq!(status(990.0, 50.0).pacing_delay(50.0), None);
    }

    #[test]
    fn test_no_pacing_without_restore_rate() {
        assert_eq!(status(10.0, 0.0).pacing_delay(50.0), None);
        assert_eq!(status(10.0, -5.0).pacing_delay(50.0), None);
        assert_eq!(status(10.0, f64::NAN).pacing_delay(50.0), None);
    }
}
