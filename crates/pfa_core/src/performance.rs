//! Actual-vs-planned performance ratings and progress metrics.
//!
//! # Invariants
//! - ratio = actual / target; `> 1.0` exceeded, `== 1.0` met, `>= 0.8`
//!   close, `< 0.8` under.
//! - Skipped sets rate as `Skipped` regardless of reps.
//! - All functions are pure; callers load the records.

use crate::model::assignment::{AssignmentStatus, WorkoutAssignment};
use crate::model::session::{ExerciseLog, SessionStatus, SetLog, WorkoutSession};
use crate::model::workout::WorkoutExercise;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// At or above this ratio the target is reached.
pub const MET_THRESHOLD: f64 = 1.0;
/// At or above this ratio (and below `MET_THRESHOLD`) the result is close.
pub const CLOSE_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceRating {
    Exceeded,
    Met,
    Close,
    Under,
    Skipped,
}

impl PerformanceRating {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exceeded => "exceeded",
            Self::Met => "met",
            Self::Close => "close",
            Self::Under => "under",
            Self::Skipped => "skipped",
        }
    }

    /// Exceeded or met.
    pub fn reached_target(self) -> bool {
        matches!(self, Self::Exceeded | Self::Met)
    }
}

/// Buckets `actual / target`.
///
/// A target of zero or less cannot be missed: any non-negative actual counts
/// as met.
pub fn classify(actual: f64, target: f64) -> PerformanceRating {
    if target <= 0.0 {
        return if actual >= 0.0 {
            PerformanceRating::Met
        } else {
            PerformanceRating::Under
        };
    }
    let ratio = actual / target;
    if ratio > MET_THRESHOLD {
        PerformanceRating::Exceeded
    } else if ratio >= MET_THRESHOLD {
        PerformanceRating::Met
    } else if ratio >= CLOSE_THRESHOLD {
        PerformanceRating::Close
    } else {
        PerformanceRating::Under
    }
}

/// Rates one set against the planned reps per set.
pub fn classify_set(set: &SetLog, target_reps: u32) -> PerformanceRating {
    if !set.completed {
        return PerformanceRating::Skipped;
    }
    classify(f64::from(set.reps_completed), f64::from(target_reps))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSummary {
    pub sets: u32,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualSummary {
    /// Completed (non-skipped) sets.
    pub sets: u32,
    pub avg_reps: Option<f64>,
    pub avg_weight: Option<f64>,
    pub total_duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceComparison {
    pub exercise_id: String,
    pub planned: PlannedSummary,
    pub actual: ActualSummary,
    pub performance_rating: PerformanceRating,
}

/// Compares a logged exercise with its plan.
///
/// Average reps are rated against target reps; without a rep target the
/// completed set count is rated against target sets. A log with no
/// completed set is `Skipped`.
pub fn compare_exercise(planned: &WorkoutExercise, log: &ExerciseLog) -> PerformanceComparison {
    let completed: Vec<&SetLog> = log.completed_sets().collect();
    let count = completed.len() as u32;

    let avg_reps = average(completed.iter().map(|set| f64::from(set.reps_completed)));
    let avg_weight = average(completed.iter().filter_map(|set| set.weight_used));
    let total_duration = completed
        .iter()
        .filter_map(|set| set.duration)
        .reduce(|total, value| total + value);

    let performance_rating = if count == 0 {
        PerformanceRating::Skipped
    } else {
        match (planned.target_reps, avg_reps) {
            (Some(target), Some(actual)) => classify(actual, f64::from(target)),
            _ => classify(f64::from(count), f64::from(planned.target_sets)),
        }
    };

    PerformanceComparison {
        exercise_id: planned.exercise_id.clone(),
        planned: PlannedSummary {
            sets: planned.target_sets,
            reps: planned.target_reps,
            weight: planned.target_weight,
            duration: planned.target_duration,
        },
        actual: ActualSummary {
            sets: count,
            avg_reps,
            avg_weight,
            total_duration,
        },
        performance_rating,
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    MaxWeight,
    MaxReps,
    /// Reps x weight of a single set.
    MaxVolume,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    pub record_type: RecordType,
    pub value: f64,
    pub achieved_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMetrics {
    pub total_workouts: usize,
    pub completed_workouts: usize,
    /// Percentage, 0-100.
    pub adherence_rate: f64,
    /// Minutes, averaged over completed sessions that recorded a duration.
    pub avg_workout_duration: f64,
    pub personal_records: Vec<PersonalRecord>,
}

/// Aggregates one athlete's assignments and sessions.
///
/// `exercise_name` resolves display names; unknown ids fall back to the id.
pub fn progress_metrics(
    assignments: &[WorkoutAssignment],
    sessions: &[WorkoutSession],
    exercise_name: impl Fn(&str) -> Option<String>,
) -> ProgressMetrics {
    let total_workouts = assignments.len();
    let completed_workouts = assignments
        .iter()
        .filter(|assignment| assignment.status == AssignmentStatus::Completed)
        .count();
    let adherence_rate = if total_workouts == 0 {
        0.0
    } else {
        completed_workouts as f64 * 100.0 / total_workouts as f64
    };

    let completed_sessions: Vec<&WorkoutSession> = sessions
        .iter()
        .filter(|session| session.status == SessionStatus::Completed)
        .collect();
    let avg_workout_duration = average(
        completed_sessions
            .iter()
            .filter_map(|session| session.total_duration)
            .map(f64::from),
    )
    .unwrap_or(0.0);

    ProgressMetrics {
        total_workouts,
        completed_workouts,
        adherence_rate,
        avg_workout_duration,
        personal_records: personal_records(&completed_sessions, exercise_name),
    }
}

fn personal_records(
    sessions: &[&WorkoutSession],
    exercise_name: impl Fn(&str) -> Option<String>,
) -> Vec<PersonalRecord> {
    // (exercise id, record type) -> (value, achieved at)
    let mut best: BTreeMap<(String, RecordType), (f64, String)> = BTreeMap::new();
    let mut offer = |exercise_id: &str, record_type: RecordType, value: f64, at: &str| {
        let slot = best
            .entry((exercise_id.to_string(), record_type))
            .or_insert_with(|| (value, at.to_string()));
        if value > slot.0 {
            *slot = (value, at.to_string());
        }
    };

    for session in sessions {
        let at = session
            .completed_at
            .as_deref()
            .unwrap_or(session.started_at.as_str());
        for log in &session.exercise_logs {
            for set in log.completed_sets() {
                offer(
                    &log.exercise_id,
                    RecordType::MaxReps,
                    f64::from(set.reps_completed),
                    at,
                );
                if let Some(weight) = set.weight_used {
                    offer(&log.exercise_id, RecordType::MaxWeight, weight, at);
                    offer(
                        &log.exercise_id,
                        RecordType::MaxVolume,
                        weight * f64::from(set.reps_completed),
                        at,
                    );
                }
            }
        }
    }

    best.into_iter()
        .map(|((exercise_id, record_type), (value, achieved_at))| PersonalRecord {
            exercise_name: exercise_name(&exercise_id).unwrap_or_else(|| exercise_id.clone()),
            exercise_id,
            record_type,
            value,
            achieved_at,
        })
        .collect()
}
