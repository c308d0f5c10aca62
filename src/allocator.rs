use crate::catalog::Catalog;
use crate::data::{
    AllocationReport, AllocationResult, AllocationStatus, ClassSession, Room, RoomId,
};
use chrono::{NaiveDateTime, NaiveTime};
use itertools::Itertools;
use log::{info, trace};
use std::cmp::{max, min};
use std::collections::HashMap;
use thiserror::Error;

/// Neither accepted time format matched the session's start or end field.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unparseable time value: {0}")]
pub struct TimeParseError(pub String);

/// One committed (day, window) occupation of a room, scoped to a single run.
#[derive(Debug, Clone)]
struct OccupancyEntry {
    day: String,
    start: NaiveTime,
    end: NaiveTime,
}

/// Splits a raw day field into trimmed day tokens.
///
/// Separators: `,`, `/`, and the standalone connective word "e"/"E" (single
/// spaces on both sides). Empty tokens are dropped; repeated tokens are kept,
/// each producing its own demand. An empty or all-separator field yields an
/// empty sequence.
pub fn expand_days(raw: &str) -> Vec<String> {
    raw.split([',', '/'])
        .flat_map(split_connective)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

// " e " and " E " are 3-byte ASCII-framed patterns, so byte offsets are safe
// to slice on even around accented day names.
fn split_connective(chunk: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = chunk;
    loop {
        let pos = match (rest.find(" e "), rest.find(" E ")) {
            (Some(a), Some(b)) => Some(min(a, b)),
            (a, b) => a.or(b),
        };
        match pos {
            Some(i) => {
                parts.push(&rest[..i]);
                rest = &rest[i + 3..];
            }
            None => {
                parts.push(rest);
                return parts;
            }
        }
    }
}

/// Parses a time-of-day field. `%H:%M` is the primary format; the fallbacks
/// tolerate spreadsheet tools that serialize times with seconds or as full
/// timestamps, in which case only the time component is kept.
pub fn parse_time(text: &str) -> Result<NaiveTime, TimeParseError> {
    let text = text.trim();
    if let Ok(time) = NaiveTime::parse_from_str(text, "%H:%M") {
        return Ok(time);
    }
    if let Ok(time) = NaiveTime::parse_from_str(text, "%H:%M:%S") {
        return Ok(time);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(timestamp.time());
        }
    }
    Err(TimeParseError(text.to_string()))
}

/// Whether two same-day windows overlap. Half-open semantics: windows that
/// touch at an endpoint do not conflict.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    max(a_start, b_start) < min(a_end, b_end)
}

/// Assigns each (session, day) demand to the smallest sufficient room, or
/// records why none could be found.
///
/// Sessions are processed in input order and each commitment is visible to
/// every later demand in the same run, so the whole report is reproducible
/// from the inputs alone. A session whose times cannot be parsed contributes
/// a single `invalid-time` row; the rest of the batch is unaffected.
pub fn allocate(catalog: &Catalog, sessions: &[ClassSession]) -> AllocationReport {
    info!(
        "Allocating {} sessions across {} rooms",
        sessions.len(),
        catalog.len()
    );

    let mut timeline: HashMap<RoomId, Vec<OccupancyEntry>> = HashMap::new();
    let mut results = Vec::new();

    for session in sessions {
        let days = expand_days(&session.days);
        if days.is_empty() {
            trace!("Session {} has no day tokens, skipping", session.code);
            continue;
        }

        let time_window = format!("{} - {}", session.start, session.end);
        let (start, end) = match (parse_time(&session.start), parse_time(&session.end)) {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                trace!(
                    "Session {} has an unparseable time window '{}'",
                    session.code, time_window
                );
                results.push(unplaced(
                    session,
                    session.days.trim().to_string(),
                    time_window,
                    AllocationStatus::InvalidTime,
                ));
                continue;
            }
        };

        let candidates = catalog.candidates_for(session.size);
        let needle = session
            .required_feature
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase);

        for day in days {
            let committed = candidates.iter().copied().find(|room| {
                feature_matches(room, needle.as_deref())
                    && is_free(&timeline, room, &day, start, end)
            });

            match committed {
                Some(room) => {
                    timeline.entry(room.id.clone()).or_default().push(OccupancyEntry {
                        day: day.clone(),
                        start,
                        end,
                    });
                    trace!(
                        "Session {} on {} placed in room {} ({} seats)",
                        session.code, day, room.id, room.capacity
                    );
                    results.push(AllocationResult {
                        code: session.code.clone(),
                        name: session.name.clone(),
                        instructor: session.instructor.clone(),
                        size: session.size,
                        assigned_room_id: Some(room.id.clone()),
                        capacity: Some(room.capacity),
                        occupancy: Some(occupancy_percent(session.size, room.capacity)),
                        day,
                        time_window: time_window.clone(),
                        status: AllocationStatus::Success,
                    });
                }
                None => {
                    trace!("Session {} on {} has no compatible room", session.code, day);
                    results.push(unplaced(
                        session,
                        day,
                        time_window.clone(),
                        AllocationStatus::NoCompatibleRoom,
                    ));
                }
            }
        }
    }

    let counts = results.iter().counts_by(|result| result.status);
    let assigned = counts.get(&AllocationStatus::Success).copied().unwrap_or(0);
    let unassigned = counts
        .get(&AllocationStatus::NoCompatibleRoom)
        .copied()
        .unwrap_or(0);
    let invalid = counts
        .get(&AllocationStatus::InvalidTime)
        .copied()
        .unwrap_or(0);
    info!(
        "Allocation finished: {} placed, {} without a room, {} invalid",
        assigned, unassigned, invalid
    );

    AllocationReport {
        results,
        assigned,
        unassigned,
        invalid,
    }
}

fn feature_matches(room: &Room, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => room.feature_text().to_lowercase().contains(needle),
        None => true,
    }
}

fn is_free(
    timeline: &HashMap<RoomId, Vec<OccupancyEntry>>,
    room: &Room,
    day: &str,
    start: NaiveTime,
    end: NaiveTime,
) -> bool {
    timeline.get(&room.id).is_none_or(|entries| {
        entries
            .iter()
            .filter(|entry| entry.day == day)
            .all(|entry| !overlaps(start, end, entry.start, entry.end))
    })
}

fn occupancy_percent(size: u32, capacity: u32) -> String {
    format!("{:.0}%", (size as f64 / capacity as f64) * 100.0)
}

fn unplaced(
    session: &ClassSession,
    day: String,
    time_window: String,
    status: AllocationStatus,
) -> AllocationResult {
    AllocationResult {
        code: session.code.clone(),
        name: session.name.clone(),
        instructor: session.instructor.clone(),
        size: session.size,
        assigned_room_id: None,
        capacity: None,
        occupancy: None,
        day,
        time_window,
        status,
    }
}
