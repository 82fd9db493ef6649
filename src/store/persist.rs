//! Persisted form of `CyclesState`
//!
//! On disk every timestamp is RFC 3339 text with full sub-second precision.
//! The wire structs keep those fields as plain strings; [`revive_state`] is
//! the pass that turns them back into `DateTime<Utc>` values and checks the
//! aggregate invariants before anything reaches the controller.
//!
//! RFC 3339 only covers years 0000 through 9999. Instants outside that range
//! are clamped to its bounds on write, so a badly skewed clock cannot produce
//! a payload that fails to load.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cycle::model::{Cycle, CycleId, CyclesState};

/// Version of the stored layout. Part of the storage key, so a bump makes
/// older data invisible instead of misread.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Build the storage key for a namespace, e.g. `@timebox:cycles-state-1.0.0`
#[must_use]
pub fn storage_key(namespace: &str) -> String {
    format!("{namespace}:cycles-state-{SCHEMA_VERSION}")
}

/// Why a stored payload could not be turned back into a `CyclesState`
#[derive(Error, Debug)]
pub enum StorageCorruption {
    /// The payload is not the expected JSON shape
    #[error("stored state is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A timestamp field could not be parsed
    #[error("cycle '{cycle_id}' has an unreadable {field}: '{value}'")]
    BadTimestamp {
        /// Cycle carrying the bad value
        cycle_id: String,
        /// Field name as stored
        field: &'static str,
        /// Raw stored text
        value: String,
    },

    /// The decoded state breaks an aggregate invariant
    #[error("stored state is inconsistent: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCycle {
    id: String,
    task: String,
    minutes_amount: u32,
    start_time: String,
    #[serde(default)]
    interrupted_at: Option<String>,
    #[serde(default)]
    finished_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    cycles: Vec<StoredCycle>,
    #[serde(default)]
    active_cycle_id: Option<String>,
}

/// Earliest and latest instants RFC 3339 can express
fn storable_range() -> (DateTime<Utc>, DateTime<Utc>) {
    let earliest = Utc
        .with_ymd_and_hms(0, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let latest = Utc
        .with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
        .single()
        .map_or(DateTime::<Utc>::MAX_UTC, |at| {
            at + Duration::nanoseconds(999_999_999)
        });
    (earliest, latest)
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    let (earliest, latest) = storable_range();
    at.clamp(earliest, latest)
        .to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(
    cycle_id: &str,
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, StorageCorruption> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StorageCorruption::BadTimestamp {
            cycle_id: cycle_id.to_string(),
            field,
            value: value.to_string(),
        })
}

/// Serialize a state into its stored JSON form
pub fn serialize_state(state: &CyclesState) -> Result<String, serde_json::Error> {
    let stored = StoredState {
        cycles: state
            .cycles
            .iter()
            .map(|c| StoredCycle {
                id: c.id.to_string(),
                task: c.task.clone(),
                minutes_amount: c.minutes_amount,
                start_time: format_timestamp(c.start_time),
                interrupted_at: c.interrupted_at.map(format_timestamp),
                finished_at: c.finished_at.map(format_timestamp),
            })
            .collect(),
        active_cycle_id: state.active_cycle_id.as_ref().map(ToString::to_string),
    };

    serde_json::to_string(&stored)
}

/// Parse a stored payload and revive every timestamp field.
pub fn revive_state(payload: &str) -> Result<CyclesState, StorageCorruption> {
    let stored: StoredState = serde_json::from_str(payload)?;

    let mut cycles = Vec::with_capacity(stored.cycles.len());
    for c in stored.cycles {
        let start_time = parse_timestamp(&c.id, "startTime", &c.start_time)?;
        let interrupted_at = c
            .interrupted_at
            .as_deref()
            .map(|v| parse_timestamp(&c.id, "interruptedAt", v))
            .transpose()?;
        let finished_at = c
            .finished_at
            .as_deref()
            .map(|v| parse_timestamp(&c.id, "finishedAt", v))
            .transpose()?;

        cycles.push(Cycle {
            id: CycleId::from(c.id),
            task: c.task,
            minutes_amount: c.minutes_amount,
            start_time,
            interrupted_at,
            finished_at,
        });
    }

    let state = CyclesState {
        cycles,
        active_cycle_id: stored.active_cycle_id.map(CycleId::from),
    };
    state
        .check_invariants()
        .map_err(StorageCorruption::Inconsistent)?;

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_test_cycle, t0};

    #[test]
    fn test_storage_key_embeds_namespace_and_version() {
        assert_eq!(storage_key("@timebox"), "@timebox:cycles-state-1.0.0");
    }

    #[test]
    fn test_serialized_layout_uses_camel_case_text_timestamps() {
        let state = CyclesState {
            cycles: vec![make_test_cycle("a", "Write report", 25)],
            active_cycle_id: Some(CycleId::from("a")),
        };

        let json: serde_json::Value = serde_json::from_str(&serialize_state(&state).unwrap()).unwrap();

        assert_eq!(json["activeCycleId"], "a");
        assert_eq!(json["cycles"][0]["task"], "Write report");
        assert_eq!(json["cycles"][0]["minutesAmount"], 25);
        assert_eq!(json["cycles"][0]["startTime"], "2026-03-02T09:00:00Z");
        assert!(json["cycles"][0]["finishedAt"].is_null());
    }

    #[test]
    fn test_round_trip_keeps_all_timestamps_exact() {
        // Sub-second precision down to the nanosecond
        let start = t0() + Duration::nanoseconds(123_456_789);
        let mut cycle = make_test_cycle("a", "Write report", 25);
        cycle.start_time = start;
        cycle.interrupted_at = Some(start + Duration::milliseconds(1_500));
        let mut finished = make_test_cycle("b", "Review", 5);
        finished.start_time = start + Duration::minutes(2);
        finished.finished_at = Some(start + Duration::minutes(7) + Duration::microseconds(42));

        let state = CyclesState {
            cycles: vec![cycle, finished],
            active_cycle_id: None,
        };

        let revived = revive_state(&serialize_state(&state).unwrap()).unwrap();
        assert_eq!(revived, state);
    }

    #[test]
    fn test_revive_accepts_offsets_and_normalizes_to_utc() {
        let payload = r#"{"cycles":[{"id":"a","task":"Read","minutesAmount":5,
            "startTime":"2026-03-02T10:00:00+01:00"}],"activeCycleId":"a"}"#;

        let state = revive_state(payload).unwrap();
        assert_eq!(state.cycles[0].start_time, t0());
        assert!(state.cycles[0].interrupted_at.is_none());
        assert_eq!(state.active_cycle().unwrap().task, "Read");
    }

    #[test]
    fn test_revive_rejects_garbage() {
        assert!(matches!(
            revive_state("not json at all"),
            Err(StorageCorruption::Malformed(_))
        ));
        assert!(matches!(
            revive_state(r#"{"cycles": 12}"#),
            Err(StorageCorruption::Malformed(_))
        ));
    }

    #[test]
    fn test_revive_rejects_unreadable_timestamp() {
        let payload = r#"{"cycles":[{"id":"a","task":"Read","minutesAmount":5,
            "startTime":"yesterday"}],"activeCycleId":null}"#;

        let err = revive_state(payload).unwrap_err();
        assert!(matches!(
            err,
            StorageCorruption::BadTimestamp {
                field: "startTime",
                ..
            }
        ));
    }

    #[test]
    fn test_revive_rejects_inconsistent_state() {
        let payload = r#"{"cycles":[{"id":"a","task":"Read","minutesAmount":5,
            "startTime":"2026-03-02T09:00:00Z","finishedAt":"2026-03-02T09:05:00Z"}],
            "activeCycleId":"a"}"#;

        assert!(matches!(
            revive_state(payload),
            Err(StorageCorruption::Inconsistent(_))
        ));
    }

    #[test]
    fn test_revive_empty_state() {
        let state = revive_state(r#"{"cycles":[],"activeCycleId":null}"#).unwrap();
        assert_eq!(state, CyclesState::default());
    }

    #[test]
    fn test_far_future_timestamps_are_clamped_and_still_load() {
        let mut cycle = make_test_cycle("a", "Read", 5);
        cycle.start_time = Utc.with_ymd_and_hms(12_000, 1, 1, 0, 0, 0).unwrap();
        cycle.finished_at = Some(Utc.with_ymd_and_hms(12_000, 1, 1, 0, 5, 0).unwrap());
        let state = CyclesState {
            cycles: vec![cycle],
            active_cycle_id: None,
        };

        let payload = serialize_state(&state).unwrap();
        let revived = revive_state(&payload).unwrap();

        let (_, latest) = storable_range();
        assert_eq!(revived.cycles[0].start_time, latest);
        assert_eq!(revived.cycles[0].finished_at, Some(latest));
        assert!(payload.contains("9999-12-31T23:59:59.999999999Z"));
    }

    #[test]
    fn test_negative_years_are_clamped_and_still_load() {
        let mut cycle = make_test_cycle("a", "Read", 5);
        cycle.start_time = Utc.with_ymd_and_hms(-50, 6, 1, 0, 0, 0).unwrap();
        let state = CyclesState {
            cycles: vec![cycle],
            active_cycle_id: Some(CycleId::from("a")),
        };

        let revived = revive_state(&serialize_state(&state).unwrap()).unwrap();

        let (earliest, _) = storable_range();
        assert_eq!(revived.cycles[0].start_time, earliest);
        assert_eq!(revived.active_cycle().unwrap().task, "Read");
    }

    #[test]
    fn test_timestamps_in_range_are_not_clamped() {
        let (earliest, latest) = storable_range();
        assert_eq!(format_timestamp(t0()), "2026-03-02T09:00:00Z");
        assert_eq!(format_timestamp(earliest), "0000-01-01T00:00:00Z");
        assert_eq!(format_timestamp(latest), "9999-12-31T23:59:59.999999999Z");
    }
}
