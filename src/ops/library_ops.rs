//! Append-only operations over the [`LibraryExtra`] payload.
//!
//! The payload rides inside `PTask.Note` as JSON. All mutation here appends
//! log entries; existing history is never rewritten, except the single
//! timeline-cutoff marker which is moved rather than accumulated.

use chrono::{DateTime, Duration, Utc};

use crate::model::library::{
    LIBRARY_EXTRA_VERSION, LibraryExtra, LibraryStatus, LogEntry, LogKind, Round, TimelineEntry,
};
use crate::model::protocol::PTask;

/// Wait items with no stated reason go stale after this long.
pub const WAIT_EXPIRY_DAYS: i64 = 30;

// --- parse / serialize ---

/// Decode a note blob, falling back to a fresh default payload when the note
/// is empty or unparsable. Absent fields inside a parsable blob deserialize
/// to defaults; only a structurally broken blob reaches the fallback.
pub fn parse(note: &str, now: DateTime<Utc>) -> LibraryExtra {
    if note.trim().is_empty() {
        return default_extra(now);
    }
    match serde_json::from_str(note) {
        Ok(extra) => clamp_current_round(extra),
        Err(err) => {
            tracing::debug!(%err, "unparsable library payload, using defaults");
            default_extra(now)
        }
    }
}

/// Encode for storage: stamps the current payload version and touch time.
pub fn serialize(extra: &mut LibraryExtra, now: DateTime<Utc>) -> serde_json::Result<String> {
    extra.version = LIBRARY_EXTRA_VERSION;
    extra.updated_at = now;
    serde_json::to_string(extra)
}

/// The payload a task gets on first save: one open round holding a single
/// added-to-library entry.
pub fn default_extra(now: DateTime<Utc>) -> LibraryExtra {
    LibraryExtra {
        version: LIBRARY_EXTRA_VERSION,
        picture_address: String::new(),
        author: String::new(),
        year: None,
        remark: String::new(),
        category: String::new(),
        is_favorite: false,
        current_round: 0,
        rounds: vec![Round {
            name: String::new(),
            logs: vec![LogEntry::new(LogKind::AddedToLibrary, now)],
            start_time: now,
            end_time: None,
        }],
        main_score_round: None,
        main_score_log: None,
        created_at: now,
        updated_at: now,
    }
}

fn clamp_current_round(mut extra: LibraryExtra) -> LibraryExtra {
    if extra.rounds.is_empty() {
        extra.current_round = 0;
    } else if extra.current_round >= extra.rounds.len() {
        extra.current_round = extra.rounds.len() - 1;
    }
    extra
}

fn current_round_mut(extra: &mut LibraryExtra, now: DateTime<Utc>) -> &mut Round {
    if extra.rounds.is_empty() {
        extra.rounds.push(Round {
            name: String::new(),
            logs: Vec::new(),
            start_time: now,
            end_time: None,
        });
        extra.current_round = 0;
    }
    let idx = extra.current_round.min(extra.rounds.len() - 1);
    &mut extra.rounds[idx]
}

// --- log operations ---

/// Append a status change to the current round. Returns false when the entry
/// was suppressed as a duplicate. Setting the same status twice is a no-op,
/// except Todo/Wait where a new comment re-states the reason. `Done` also
/// closes the current round.
pub fn add_status_log(
    extra: &mut LibraryExtra,
    status: LibraryStatus,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> bool {
    if current_status(extra) == Some(status) {
        let reason_update = matches!(status, LibraryStatus::Todo | LibraryStatus::Wait)
            && comment.as_deref().is_some_and(|c| !c.is_empty());
        if !reason_update {
            return false;
        }
    }
    let round = current_round_mut(extra, now);
    round.logs.push(LogEntry {
        status: Some(status),
        comment,
        ..LogEntry::new(LogKind::StatusChange, now)
    });
    if status == LibraryStatus::Done && round.end_time.is_none() {
        round.end_time = Some(now);
    }
    true
}

pub fn add_score_log(
    extra: &mut LibraryExtra,
    score: u8,
    plus: bool,
    sub: bool,
    comment: Option<String>,
    now: DateTime<Utc>,
) {
    let round = current_round_mut(extra, now);
    round.logs.push(LogEntry {
        score: Some(score),
        score_plus: plus,
        score_sub: sub,
        comment,
        ..LogEntry::new(LogKind::Score, now)
    });
}

pub fn add_note_log(extra: &mut LibraryExtra, text: String, now: DateTime<Utc>) {
    let round = current_round_mut(extra, now);
    round.logs.push(LogEntry {
        comment: Some(text),
        ..LogEntry::new(LogKind::Note, now)
    });
}

/// Close the current round and open a new one, marked in-progress.
pub fn start_new_round(extra: &mut LibraryExtra, name: String, now: DateTime<Utc>) {
    if let Some(round) = extra.rounds.get_mut(extra.current_round)
        && round.end_time.is_none()
    {
        round.end_time = Some(now);
    }
    extra.rounds.push(Round {
        name,
        logs: vec![LogEntry {
            status: Some(LibraryStatus::Doing),
            ..LogEntry::new(LogKind::StatusChange, now)
        }],
        start_time: now,
        end_time: None,
    });
    extra.current_round = extra.rounds.len() - 1;
}

/// Move the timeline cutoff to now: everything logged before it stays out of
/// the cross-item timeline. Only one cutoff marker is kept.
pub fn set_timeline_cutoff(extra: &mut LibraryExtra, now: DateTime<Utc>) {
    for round in &mut extra.rounds {
        round.logs.retain(|log| log.kind != LogKind::TimelineCutoff);
    }
    let round = current_round_mut(extra, now);
    round
        .logs
        .push(LogEntry::new(LogKind::TimelineCutoff, now));
}

// --- derived views ---

/// Status according to the most recent status-change entry, across rounds in
/// order. No status log means the item was only ever added.
pub fn current_status(extra: &LibraryExtra) -> Option<LibraryStatus> {
    extra
        .rounds
        .iter()
        .flat_map(|round| round.logs.iter())
        .filter(|log| log.kind == LogKind::StatusChange)
        .next_back()
        .and_then(|log| log.status)
}

/// Designate an existing score entry as the authoritative one.
pub fn set_main_score(extra: &mut LibraryExtra, round: usize, log: usize) -> bool {
    let is_score = extra
        .rounds
        .get(round)
        .and_then(|r| r.logs.get(log))
        .is_some_and(|entry| entry.kind == LogKind::Score);
    if !is_score {
        return false;
    }
    extra.main_score_round = Some(round);
    extra.main_score_log = Some(log);
    true
}

/// The authoritative score entry: the designated one if set and still valid,
/// otherwise the latest score log.
pub fn main_score(extra: &LibraryExtra) -> Option<&LogEntry> {
    if let (Some(round), Some(log)) = (extra.main_score_round, extra.main_score_log)
        && let Some(entry) = extra.rounds.get(round).and_then(|r| r.logs.get(log))
        && entry.kind == LogKind::Score
    {
        return Some(entry);
    }
    extra
        .rounds
        .iter()
        .flat_map(|round| round.logs.iter())
        .filter(|log| log.kind == LogKind::Score)
        .next_back()
}

/// A Wait item with no stated reason expires after [`WAIT_EXPIRY_DAYS`].
pub fn is_wait_expired(extra: &LibraryExtra, now: DateTime<Utc>) -> bool {
    if current_status(extra) != Some(LibraryStatus::Wait) {
        return false;
    }
    let latest_wait = extra
        .rounds
        .iter()
        .flat_map(|round| round.logs.iter())
        .filter(|log| log.kind == LogKind::StatusChange && log.status == Some(LibraryStatus::Wait))
        .next_back();
    latest_wait.is_some_and(|log| {
        log.comment.as_deref().is_none_or(str::is_empty)
            && now - log.time > Duration::days(WAIT_EXPIRY_DAYS)
    })
}

/// Flatten log history across items into one newest-first timeline.
/// Entries at or before an item's cutoff marker are dropped, as are the
/// markers themselves.
pub fn extract_timeline(items: &[(PTask, LibraryExtra)]) -> Vec<TimelineEntry> {
    let mut timeline = Vec::new();
    for (task, extra) in items {
        let cutoff = extra
            .rounds
            .iter()
            .flat_map(|round| round.logs.iter())
            .filter(|log| log.kind == LogKind::TimelineCutoff)
            .map(|log| log.time)
            .max();
        for round in &extra.rounds {
            for log in &round.logs {
                if log.kind == LogKind::TimelineCutoff {
                    continue;
                }
                if cutoff.is_some_and(|t| log.time <= t) {
                    continue;
                }
                timeline.push(TimelineEntry {
                    time: log.time,
                    item_id: task.id,
                    item_title: task.title.clone(),
                    round_name: round.name.clone(),
                    kind: log.kind,
                    status: log.status,
                    score: log.score,
                    comment: log.comment.clone(),
                });
            }
        }
    }
    timeline.sort_by(|a, b| b.time.cmp(&a.time));
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_garbage_falls_back_to_default() {
        let extra = parse("just a plain note", at(1));
        assert_eq!(extra.version, LIBRARY_EXTRA_VERSION);
        assert_eq!(extra.rounds.len(), 1);
        assert_eq!(extra.rounds[0].logs[0].kind, LogKind::AddedToLibrary);
        assert_eq!(extra.created_at, at(1));
    }

    #[test]
    fn test_parse_clamps_current_round() {
        let extra = parse(r#"{"rounds":[{"name":"a"}],"currentRound":5}"#, at(1));
        assert_eq!(extra.current_round, 0);
    }

    #[test]
    fn test_serialize_stamps_version_and_touch_time() {
        let mut extra = parse("{}", at(1));
        assert_eq!(extra.version, 0);
        let text = serialize(&mut extra, at(2)).unwrap();
        assert_eq!(extra.version, LIBRARY_EXTRA_VERSION);
        assert_eq!(extra.updated_at, at(2));
        let back = parse(&text, at(3));
        assert_eq!(back.updated_at, at(2));
    }

    #[test]
    fn test_duplicate_status_suppressed() {
        let mut extra = default_extra(at(1));
        assert!(add_status_log(&mut extra, LibraryStatus::Doing, None, at(2)));
        assert!(!add_status_log(&mut extra, LibraryStatus::Doing, None, at(3)));
        assert_eq!(extra.rounds[0].logs.len(), 2);
    }

    #[test]
    fn test_wait_reason_update_not_suppressed() {
        let mut extra = default_extra(at(1));
        assert!(add_status_log(&mut extra, LibraryStatus::Wait, None, at(2)));
        assert!(add_status_log(
            &mut extra,
            LibraryStatus::Wait,
            Some("waiting for season 2".into()),
            at(3),
        ));
        assert_eq!(extra.rounds[0].logs.len(), 3);
    }

    #[test]
    fn test_done_closes_current_round() {
        let mut extra = default_extra(at(1));
        add_status_log(&mut extra, LibraryStatus::Done, None, at(5));
        assert_eq!(extra.rounds[0].end_time, Some(at(5)));
        assert_eq!(current_status(&extra), Some(LibraryStatus::Done));
    }

    #[test]
    fn test_start_new_round() {
        let mut extra = default_extra(at(1));
        start_new_round(&mut extra, "rewatch".into(), at(10));
        assert_eq!(extra.rounds.len(), 2);
        assert_eq!(extra.current_round, 1);
        assert_eq!(extra.rounds[0].end_time, Some(at(10)));
        assert_eq!(current_status(&extra), Some(LibraryStatus::Doing));
    }

    #[test]
    fn test_main_score_falls_back_to_latest() {
        let mut extra = default_extra(at(1));
        add_score_log(&mut extra, 3, false, false, None, at(2));
        add_score_log(&mut extra, 4, true, false, None, at(3));
        assert_eq!(main_score(&extra).and_then(|log| log.score), Some(4));

        assert!(set_main_score(&mut extra, 0, 1));
        assert_eq!(main_score(&extra).and_then(|log| log.score), Some(3));
        // Pointing at a non-score entry is refused.
        assert!(!set_main_score(&mut extra, 0, 0));
    }

    #[test]
    fn test_wait_expiry_needs_age_and_no_reason() {
        let mut extra = default_extra(at(1));
        add_status_log(&mut extra, LibraryStatus::Wait, None, at(2));
        assert!(!is_wait_expired(&extra, at(20)));
        assert!(is_wait_expired(
            &extra,
            at(2) + Duration::days(WAIT_EXPIRY_DAYS + 1)
        ));

        let mut with_reason = default_extra(at(1));
        add_status_log(
            &mut with_reason,
            LibraryStatus::Wait,
            Some("preordered".into()),
            at(2),
        );
        assert!(!is_wait_expired(
            &with_reason,
            at(2) + Duration::days(WAIT_EXPIRY_DAYS + 1)
        ));
    }

    #[test]
    fn test_timeline_respects_cutoff_and_order() {
        let mut extra = default_extra(at(1));
        add_status_log(&mut extra, LibraryStatus::Doing, None, at(2));
        set_timeline_cutoff(&mut extra, at(3));
        add_score_log(&mut extra, 5, false, false, None, at(4));

        let task = PTask {
            id: 9,
            title: "dune".into(),
            ..PTask::default()
        };
        let timeline = extract_timeline(&[(task, extra)]);
        // Everything at or before the cutoff is gone, marker included.
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].item_id, 9);
        assert_eq!(timeline[0].kind, LogKind::Score);
        assert_eq!(timeline[0].score, Some(5));
    }

    #[test]
    fn test_timeline_newest_first_across_items() {
        let mut a = default_extra(at(1));
        add_status_log(&mut a, LibraryStatus::Doing, None, at(5));
        let mut b = default_extra(at(2));
        add_status_log(&mut b, LibraryStatus::Doing, None, at(7));

        let ta = PTask {
            id: 1,
            title: "a".into(),
            ..PTask::default()
        };
        let tb = PTask {
            id: 2,
            title: "b".into(),
            ..PTask::default()
        };
        let timeline = extract_timeline(&[(ta, a), (tb, b)]);
        assert_eq!(timeline.len(), 4);
        assert_eq!(timeline[0].item_id, 2);
        assert_eq!(timeline[0].time, at(7));
        assert_eq!(timeline.last().unwrap().time, at(1));
    }
}
