//! Sleep records — validation, duration derivation, and the cross-user
//! previous-week aggregate.
//!
//! A record is an immutable bedtime/wake_time pair with a derived duration.
//! Validation takes the reference instant as a parameter so the whole
//! pipeline is deterministic: the same raw input always yields the same
//! parsed pair, whatever the wall clock says.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, store::SleepStore, week};

// ─── Entities ────────────────────────────────────────────────────────────────

/// One night's sleep. Immutable once written; destroyed only as a cascade of
/// owning-user deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepRecord {
  pub record_id:        Uuid,
  pub user_id:          Uuid,
  pub bedtime:          DateTime<Utc>,
  pub wake_time:        DateTime<Utc>,
  /// Derived: floor of the elapsed seconds / 60. Never caller-supplied.
  pub duration_minutes: i64,
  /// Server-assigned; never changes after creation.
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::SleepStore::insert_sleep_record`].
/// `record_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewSleepRecord {
  pub user_id:          Uuid,
  pub bedtime:          DateTime<Utc>,
  pub wake_time:        DateTime<Utc>,
  pub duration_minutes: i64,
}

// ─── Raw input ───────────────────────────────────────────────────────────────

/// A time field as it arrives from a caller: either already typed, or a
/// string to be parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeInput {
  Timestamp(DateTime<Utc>),
  Text(String),
}

/// Raw create parameters. Both fields are required; `Option` here exists so
/// absence surfaces as a missing-field error rather than a deserialise
/// failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SleepRecordParams {
  pub bedtime:   Option<TimeInput>,
  pub wake_time: Option<TimeInput>,
}

fn parse_time(field: &'static str, input: Option<&TimeInput>) -> Result<DateTime<Utc>> {
  let input = input.ok_or(Error::MissingField(field))?;
  let text = match input {
    TimeInput::Timestamp(t) => return Ok(*t),
    TimeInput::Text(s) => s.trim(),
  };
  if text.is_empty() {
    return Err(Error::MissingField(field));
  }

  if let Ok(t) = DateTime::parse_from_rfc3339(text) {
    return Ok(t.with_timezone(&Utc));
  }
  // Naive timestamps are read as UTC.
  for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
      return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
  }

  Err(Error::InvalidTimestamp {
    field,
    value: text.to_owned(),
  })
}

/// Run the ordered validation pipeline over raw create parameters:
/// missing field, unparseable format, future timestamp (against `now`),
/// then `wake_time <= bedtime`. Returns the parsed pair on success.
pub fn validate_times(
  params: &SleepRecordParams,
  now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
  let bedtime = parse_time("bedtime", params.bedtime.as_ref())?;
  let wake_time = parse_time("wake_time", params.wake_time.as_ref())?;

  if bedtime > now {
    return Err(Error::TimestampInFuture("bedtime"));
  }
  if wake_time > now {
    return Err(Error::TimestampInFuture("wake_time"));
  }
  if wake_time <= bedtime {
    return Err(Error::WakeNotAfterBedtime);
  }

  Ok((bedtime, wake_time))
}

/// Floor of the elapsed minutes between the two instants. Callers guarantee
/// `wake_time > bedtime`, so the delta is positive and truncation is floor.
pub fn duration_minutes(bedtime: DateTime<Utc>, wake_time: DateTime<Utc>) -> i64 {
  (wake_time - bedtime).num_minutes()
}

// ─── Create service ──────────────────────────────────────────────────────────

/// Validate raw parameters, derive the duration, and persist a new record
/// owned by `user_id`.
///
/// The caller resolves `user_id` to an existing user first. A derived
/// duration of zero minutes (a sleep shorter than one minute) fails the
/// persistence-level `duration_minutes > 0` rule and is rejected with the
/// offending field messages before anything is written.
pub async fn create<S: SleepStore>(
  store: &S,
  user_id: Uuid,
  params: &SleepRecordParams,
  now: DateTime<Utc>,
) -> Result<SleepRecord> {
  let (bedtime, wake_time) = validate_times(params, now)?;
  let duration = duration_minutes(bedtime, wake_time);
  if duration <= 0 {
    return Err(Error::RecordInvalid {
      errors: vec!["duration_minutes must be greater than 0".to_owned()],
    });
  }

  store
    .insert_sleep_record(NewSleepRecord {
      user_id,
      bedtime,
      wake_time,
      duration_minutes: duration,
    })
    .await
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// Total order for aggregate results: longest sleep first, ties broken by
/// `created_at` then `record_id` so pagination is deterministic across pages
/// however the store returned the rows.
fn by_duration_desc(a: &SleepRecord, b: &SleepRecord) -> Ordering {
  b.duration_minutes
    .cmp(&a.duration_minutes)
    .then_with(|| a.created_at.cmp(&b.created_at))
    .then_with(|| a.record_id.cmp(&b.record_id))
}

/// Sleep records of everyone `user_id` follows, with bedtimes in the
/// previous calendar week, longest first.
///
/// A user following nobody yields an empty sequence without touching the
/// record store — the degenerate "match everything" query is never issued.
pub async fn followed_previous_week<S: SleepStore>(
  store: &S,
  user_id: Uuid,
  now: DateTime<Utc>,
) -> Result<Vec<SleepRecord>> {
  let following = store.following(user_id).await?;
  if following.is_empty() {
    return Ok(Vec::new());
  }

  let owner_ids: Vec<Uuid> = following.iter().map(|u| u.user_id).collect();
  let window = week::previous_week(now);
  let mut records = store.sleep_records_in_window(owner_ids, window).await?;
  records.sort_by(by_duration_desc);
  Ok(records)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 17, 12, 0, 0).unwrap()
  }

  fn text_params(bedtime: &str, wake_time: &str) -> SleepRecordParams {
    SleepRecordParams {
      bedtime:   Some(TimeInput::Text(bedtime.to_owned())),
      wake_time: Some(TimeInput::Text(wake_time.to_owned())),
    }
  }

  #[test]
  fn parses_rfc3339_and_naive_formats() {
    let expected = Utc.with_ymd_and_hms(2024, 1, 1, 22, 0, 0).unwrap();
    for raw in [
      "2024-01-01T22:00:00Z",
      "2024-01-01T22:00:00+00:00",
      "2024-01-01T22:00:00",
      "2024-01-01 22:00:00",
    ] {
      let params = text_params(raw, "2024-01-02T06:00:00Z");
      let (bedtime, _) = validate_times(&params, reference_now()).unwrap();
      assert_eq!(bedtime, expected, "input {raw:?}");
    }
  }

  #[test]
  fn missing_fields_fail_first() {
    let err = validate_times(&SleepRecordParams::default(), reference_now()).unwrap_err();
    assert!(matches!(err, Error::MissingField("bedtime")));

    let params = SleepRecordParams {
      bedtime:   Some(TimeInput::Text("2024-01-01T22:00:00Z".to_owned())),
      wake_time: Some(TimeInput::Text("  ".to_owned())),
    };
    let err = validate_times(&params, reference_now()).unwrap_err();
    assert!(matches!(err, Error::MissingField("wake_time")));
  }

  #[test]
  fn unparseable_input_is_invalid_format() {
    let params = text_params("not a time", "2024-01-02T06:00:00Z");
    let err = validate_times(&params, reference_now()).unwrap_err();
    assert!(matches!(err, Error::InvalidTimestamp { field: "bedtime", .. }));
  }

  #[test]
  fn future_timestamps_are_rejected() {
    let params = text_params("2024-01-18T22:00:00Z", "2024-01-19T06:00:00Z");
    let err = validate_times(&params, reference_now()).unwrap_err();
    assert!(matches!(err, Error::TimestampInFuture("bedtime")));
  }

  #[test]
  fn wake_time_must_strictly_follow_bedtime() {
    let equal = text_params("2024-01-01T22:00:00Z", "2024-01-01T22:00:00Z");
    assert!(matches!(
      validate_times(&equal, reference_now()),
      Err(Error::WakeNotAfterBedtime)
    ));

    let reversed = text_params("2024-01-02T06:00:00Z", "2024-01-01T22:00:00Z");
    assert!(matches!(
      validate_times(&reversed, reference_now()),
      Err(Error::WakeNotAfterBedtime)
    ));
  }

  #[test]
  fn validation_is_idempotent() {
    let params = text_params("2024-01-01T22:00:00Z", "2024-01-02T06:00:00Z");
    let first = validate_times(&params, reference_now()).unwrap();
    let second = validate_times(&params, reference_now()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
      duration_minutes(first.0, first.1),
      duration_minutes(second.0, second.1)
    );
  }

  #[test]
  fn duration_is_floored_whole_minutes() {
    let bedtime = Utc.with_ymd_and_hms(2024, 1, 1, 22, 0, 0).unwrap();

    let wake = Utc.with_ymd_and_hms(2024, 1, 2, 6, 0, 0).unwrap();
    assert_eq!(duration_minutes(bedtime, wake), 480);

    // 90 seconds floors to a single minute.
    let wake = Utc.with_ymd_and_hms(2024, 1, 1, 22, 1, 30).unwrap();
    assert_eq!(duration_minutes(bedtime, wake), 1);

    // Sub-minute sleeps floor to zero; the create service rejects these.
    let wake = Utc.with_ymd_and_hms(2024, 1, 1, 22, 0, 59).unwrap();
    assert_eq!(duration_minutes(bedtime, wake), 0);
  }

  #[test]
  fn aggregate_order_is_duration_then_age_then_id() {
    let base = Utc.with_ymd_and_hms(2024, 1, 8, 22, 0, 0).unwrap();
    let record = |duration, created_offset, id: u128| SleepRecord {
      record_id:        Uuid::from_u128(id),
      user_id:          Uuid::from_u128(1),
      bedtime:          base,
      wake_time:        base + chrono::Duration::minutes(duration),
      duration_minutes: duration,
      created_at:       base + chrono::Duration::seconds(created_offset),
    };

    let mut records = vec![
      record(300, 0, 1),
      record(600, 5, 2),
      record(450, 3, 3),
      record(450, 1, 4),
      record(450, 1, 5),
    ];
    records.sort_by(by_duration_desc);

    let order: Vec<i64> = records.iter().map(|r| r.duration_minutes).collect();
    assert_eq!(order, [600, 450, 450, 450, 300]);
    // Equal durations: earlier created_at first, then the smaller id.
    assert_eq!(records[1].record_id, Uuid::from_u128(4));
    assert_eq!(records[2].record_id, Uuid::from_u128(5));
    assert_eq!(records[3].record_id, Uuid::from_u128(3));
  }
}
