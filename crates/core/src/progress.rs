//! Course progress engine.
//!
//! Marking a lesson complete, recomputing a student's percent-complete and
//! moving the enrollment through its lifecycle are written once here against
//! the [`ProgressStore`] trait. A store instance is one unit of work: the
//! PostgreSQL implementation wraps a transaction whose first step locks the
//! enrollment row, so everything an operation reads and writes commits or
//! rolls back together.

use std::fmt;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::enrollment::{is_enrolled, EnrollmentState, UnenrollPolicy};
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/* --------------------------------------------------------------------------
Percentage
-------------------------------------------------------------------------- */

/// A progress percentage with two-decimal precision, held as hundredths of a
/// percent (`0..=10_000`) so rounding is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Percentage(u32);

impl Percentage {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(10_000);

    /// `round(100 * completed / total, 2)` with half-up rounding, `0` when the
    /// course has no lessons.
    pub fn from_counts(completed: u64, total: u64) -> Self {
        if total == 0 {
            return Self::ZERO;
        }
        let completed = completed.min(total);
        // hundredths = completed * 10_000 / total, rounded half-up.
        let hundredths = (completed * 20_000 + total) / (2 * total);
        Self(hundredths as u32)
    }

    /// Build from raw hundredths, saturating at 100 %.
    pub fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths.min(Self::FULL.0))
    }

    /// Rebuild from a stored `NUMERIC(5,2)` value read as a float.
    pub fn from_stored(value: f64) -> Self {
        let hundredths = (value * 100.0).round().clamp(0.0, f64::from(Self::FULL.0));
        Self(hundredths as u32)
    }

    pub fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    pub fn is_full(self) -> bool {
        self.0 >= Self::FULL.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/* --------------------------------------------------------------------------
Store seam
-------------------------------------------------------------------------- */

/// Lesson catalog entry resolved up to its course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonRef {
    pub lesson_id: DbId,
    pub section_id: DbId,
    pub course_id: DbId,
    pub is_free: bool,
}

/// The course facts enrollment needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseRef {
    pub course_id: DbId,
    pub is_published: bool,
}

/// One unit of work over enrollments, the lesson catalog and the completion
/// ledger.
#[async_trait]
pub trait ProgressStore: Send {
    /// Infrastructure failure type. Business rules never produce it.
    type Error: std::error::Error + Send + Sync + 'static;

    async fn find_lesson(&mut self, lesson_id: DbId) -> Result<Option<LessonRef>, Self::Error>;

    async fn find_course(&mut self, course_id: DbId) -> Result<Option<CourseRef>, Self::Error>;

    /// Load the (student, course) enrollment and hold it exclusively until the
    /// unit of work ends.
    async fn lock_enrollment(
        &mut self,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<EnrollmentState>, Self::Error>;

    async fn insert_enrollment(
        &mut self,
        student_id: DbId,
        course_id: DbId,
        now: Timestamp,
    ) -> Result<EnrollmentState, Self::Error>;

    async fn save_enrollment(&mut self, enrollment: &EnrollmentState) -> Result<(), Self::Error>;

    async fn delete_enrollment(&mut self, enrollment_id: DbId) -> Result<(), Self::Error>;

    /// Insert or update the (student, lesson) record as completed.
    /// `completed_at` keeps its first value; `last_accessed_at` becomes `now`.
    async fn upsert_completion(
        &mut self,
        student_id: DbId,
        lesson_id: DbId,
        now: Timestamp,
    ) -> Result<(), Self::Error>;

    async fn count_course_lessons(&mut self, course_id: DbId) -> Result<u64, Self::Error>;

    async fn count_completed_lessons(
        &mut self,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<u64, Self::Error>;

    /// Lesson with the greatest `last_accessed_at` among the course's lessons.
    async fn last_accessed_lesson(
        &mut self,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<DbId>, Self::Error>;
}

/// Failure of a progress operation: a broken business rule or a store fault.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error("Storage error: {0}")]
    Store(#[source] E),
}

pub type ProgressResult<T, S> = Result<T, ProgressError<<S as ProgressStore>::Error>>;

/// What a successful `mark_lesson_complete` did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub lesson_id: DbId,
    pub course_id: DbId,
    pub progress: Percentage,
    pub status: crate::enrollment::EnrollmentStatus,
    /// `true` only on the call that moved the enrollment to Completed.
    pub course_completed: bool,
}

/* --------------------------------------------------------------------------
Operations
-------------------------------------------------------------------------- */

/// Mark `lesson_id` complete for `student_id` and refresh the enrollment.
///
/// Fails with `NotFound` for an unknown lesson and `Forbidden` when the student
/// holds no Active enrollment in the lesson's course, regardless of the
/// lesson's free flag. Nothing is written on either failure.
pub async fn mark_lesson_complete<S>(
    store: &mut S,
    student_id: DbId,
    lesson_id: DbId,
    now: Timestamp,
) -> ProgressResult<CompletionOutcome, S>
where
    S: ProgressStore + ?Sized,
{
    let lesson = store
        .find_lesson(lesson_id)
        .await
        .map_err(ProgressError::Store)?
        .ok_or(CoreError::NotFound {
            entity: "Lesson",
            id: lesson_id,
        })?;

    let mut enrollment = store
        .lock_enrollment(student_id, lesson.course_id)
        .await
        .map_err(ProgressError::Store)?
        .filter(|e| e.status.can_record_progress())
        .ok_or_else(|| {
            CoreError::Forbidden("No active enrollment in this course".to_string())
        })?;

    store
        .upsert_completion(student_id, lesson_id, now)
        .await
        .map_err(ProgressError::Store)?;

    let course_completed = refresh(store, &mut enrollment, now).await?;

    Ok(CompletionOutcome {
        lesson_id,
        course_id: lesson.course_id,
        progress: enrollment.progress,
        status: enrollment.status,
        course_completed,
    })
}

/// Recompute and persist the enrollment's percentage.
///
/// Returns `None` without writing anything when the student has no
/// enrollment in the course.
pub async fn recompute_progress<S>(
    store: &mut S,
    student_id: DbId,
    course_id: DbId,
    now: Timestamp,
) -> ProgressResult<Option<EnrollmentState>, S>
where
    S: ProgressStore + ?Sized,
{
    let Some(mut enrollment) = store
        .lock_enrollment(student_id, course_id)
        .await
        .map_err(ProgressError::Store)?
    else {
        return Ok(None);
    };

    refresh(store, &mut enrollment, now).await?;
    Ok(Some(enrollment))
}

/// Read-only percent-complete for a student in a course.
pub async fn course_progress<S>(
    store: &mut S,
    student_id: DbId,
    course_id: DbId,
) -> ProgressResult<Percentage, S>
where
    S: ProgressStore + ?Sized,
{
    compute(store, student_id, course_id).await
}

/// The most recently accessed lesson of the course, if any.
pub async fn last_accessed_lesson<S>(
    store: &mut S,
    student_id: DbId,
    course_id: DbId,
) -> ProgressResult<Option<DbId>, S>
where
    S: ProgressStore + ?Sized,
{
    store
        .last_accessed_lesson(student_id, course_id)
        .await
        .map_err(ProgressError::Store)
}

/// Enroll a student in a published course.
///
/// A cancelled enrollment is reactivated and its progress recomputed from the
/// retained completion records; an existing live enrollment is a conflict.
pub async fn enroll<S>(
    store: &mut S,
    student_id: DbId,
    course_id: DbId,
    now: Timestamp,
) -> ProgressResult<EnrollmentState, S>
where
    S: ProgressStore + ?Sized,
{
    let course = store
        .find_course(course_id)
        .await
        .map_err(ProgressError::Store)?
        .ok_or(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        })?;

    if !course.is_published {
        return Err(CoreError::Validation("Course is not published".to_string()).into());
    }

    match store
        .lock_enrollment(student_id, course_id)
        .await
        .map_err(ProgressError::Store)?
    {
        Some(mut existing) => {
            existing.reactivate()?;
            refresh(store, &mut existing, now).await?;
            Ok(existing)
        }
        None => store
            .insert_enrollment(student_id, course_id, now)
            .await
            .map_err(ProgressError::Store),
    }
}

/// Unenroll according to `policy`. Completion records are never touched.
pub async fn unenroll<S>(
    store: &mut S,
    student_id: DbId,
    course_id: DbId,
    policy: UnenrollPolicy,
) -> ProgressResult<(), S>
where
    S: ProgressStore + ?Sized,
{
    let mut enrollment = store
        .lock_enrollment(student_id, course_id)
        .await
        .map_err(ProgressError::Store)?
        .filter(|e| is_enrolled(Some(e.status)))
        .ok_or(CoreError::NotFound {
            entity: "Enrollment",
            id: course_id,
        })?;

    match policy {
        UnenrollPolicy::HardDelete => store
            .delete_enrollment(enrollment.id)
            .await
            .map_err(ProgressError::Store),
        UnenrollPolicy::SoftCancel => {
            enrollment.cancel()?;
            store
                .save_enrollment(&enrollment)
                .await
                .map_err(ProgressError::Store)
        }
    }
}

async fn compute<S>(store: &mut S, student_id: DbId, course_id: DbId) -> ProgressResult<Percentage, S>
where
    S: ProgressStore + ?Sized,
{
    let total = store
        .count_course_lessons(course_id)
        .await
        .map_err(ProgressError::Store)?;
    if total == 0 {
        return Ok(Percentage::ZERO);
    }
    let completed = store
        .count_completed_lessons(student_id, course_id)
        .await
        .map_err(ProgressError::Store)?;
    Ok(Percentage::from_counts(completed, total))
}

async fn refresh<S>(
    store: &mut S,
    enrollment: &mut EnrollmentState,
    now: Timestamp,
) -> ProgressResult<bool, S>
where
    S: ProgressStore + ?Sized,
{
    let progress = compute(store, enrollment.student_id, enrollment.course_id).await?;
    let course_completed = enrollment.apply_progress(progress, now);
    store
        .save_enrollment(enrollment)
        .await
        .map_err(ProgressError::Store)?;
    Ok(course_completed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::enrollment::EnrollmentStatus;

    #[derive(Debug, thiserror::Error)]
    #[error("memory store offline")]
    struct Offline;

    #[derive(Debug, Clone, PartialEq)]
    struct Completion {
        completed_at: Timestamp,
        last_accessed_at: Timestamp,
    }

    /// In-memory catalog, enrollments and completion ledger.
    #[derive(Debug, Clone, Default, PartialEq)]
    struct MemoryStore {
        courses: HashMap<DbId, CourseRef>,
        lessons: HashMap<DbId, LessonRef>,
        enrollments: HashMap<(DbId, DbId), EnrollmentState>,
        completions: HashMap<(DbId, DbId), Completion>,
        next_enrollment_id: DbId,
        offline_saves: bool,
    }

    impl MemoryStore {
        fn with_course(course_id: DbId, lessons: &[(DbId, bool)]) -> Self {
            let mut store = Self::default();
            store.courses.insert(
                course_id,
                CourseRef {
                    course_id,
                    is_published: true,
                },
            );
            for &(lesson_id, is_free) in lessons {
                store.lessons.insert(
                    lesson_id,
                    LessonRef {
                        lesson_id,
                        section_id: course_id * 100,
                        course_id,
                        is_free,
                    },
                );
            }
            store
        }

        fn enrollment(&self, student_id: DbId, course_id: DbId) -> &EnrollmentState {
            &self.enrollments[&(student_id, course_id)]
        }
    }

    #[async_trait]
    impl ProgressStore for MemoryStore {
        type Error = Offline;

        async fn find_lesson(&mut self, lesson_id: DbId) -> Result<Option<LessonRef>, Offline> {
            Ok(self.lessons.get(&lesson_id).copied())
        }

        async fn find_course(&mut self, course_id: DbId) -> Result<Option<CourseRef>, Offline> {
            Ok(self.courses.get(&course_id).copied())
        }

        async fn lock_enrollment(
            &mut self,
            student_id: DbId,
            course_id: DbId,
        ) -> Result<Option<EnrollmentState>, Offline> {
            Ok(self.enrollments.get(&(student_id, course_id)).cloned())
        }

        async fn insert_enrollment(
            &mut self,
            student_id: DbId,
            course_id: DbId,
            now: Timestamp,
        ) -> Result<EnrollmentState, Offline> {
            self.next_enrollment_id += 1;
            let state = EnrollmentState {
                id: self.next_enrollment_id,
                student_id,
                course_id,
                status: EnrollmentStatus::Active,
                progress: Percentage::ZERO,
                enrolled_at: now,
                completed_at: None,
            };
            self.enrollments
                .insert((student_id, course_id), state.clone());
            Ok(state)
        }

        async fn save_enrollment(&mut self, enrollment: &EnrollmentState) -> Result<(), Offline> {
            if self.offline_saves {
                return Err(Offline);
            }
            self.enrollments.insert(
                (enrollment.student_id, enrollment.course_id),
                enrollment.clone(),
            );
            Ok(())
        }

        async fn delete_enrollment(&mut self, enrollment_id: DbId) -> Result<(), Offline> {
            self.enrollments.retain(|_, e| e.id != enrollment_id);
            Ok(())
        }

        async fn upsert_completion(
            &mut self,
            student_id: DbId,
            lesson_id: DbId,
            now: Timestamp,
        ) -> Result<(), Offline> {
            self.completions
                .entry((student_id, lesson_id))
                .and_modify(|c| c.last_accessed_at = now)
                .or_insert(Completion {
                    completed_at: now,
                    last_accessed_at: now,
                });
            Ok(())
        }

        async fn count_course_lessons(&mut self, course_id: DbId) -> Result<u64, Offline> {
            Ok(self
                .lessons
                .values()
                .filter(|l| l.course_id == course_id)
                .count() as u64)
        }

        async fn count_completed_lessons(
            &mut self,
            student_id: DbId,
            course_id: DbId,
        ) -> Result<u64, Offline> {
            Ok(self
                .completions
                .keys()
                .filter(|(s, l)| {
                    *s == student_id
                        && self.lessons.get(l).is_some_and(|l| l.course_id == course_id)
                })
                .count() as u64)
        }

        async fn last_accessed_lesson(
            &mut self,
            student_id: DbId,
            course_id: DbId,
        ) -> Result<Option<DbId>, Offline> {
            Ok(self
                .completions
                .iter()
                .filter(|((s, l), _)| {
                    *s == student_id
                        && self.lessons.get(l).is_some_and(|l| l.course_id == course_id)
                })
                .max_by_key(|(_, c)| c.last_accessed_at)
                .map(|((_, l), _)| *l))
        }
    }

    const STUDENT: DbId = 7;
    const COURSE: DbId = 3;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    async fn enrolled_store(lessons: &[(DbId, bool)]) -> MemoryStore {
        let mut store = MemoryStore::with_course(COURSE, lessons);
        enroll(&mut store, STUDENT, COURSE, at(0)).await.unwrap();
        store
    }

    // -- Percentage --------------------------------------------------------

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(Percentage::from_counts(1, 3).to_string(), "33.33");
        assert_eq!(Percentage::from_counts(2, 3).to_string(), "66.67");
        assert_eq!(Percentage::from_counts(1, 32).to_string(), "3.13");
        assert_eq!(Percentage::from_counts(1, 2).to_string(), "50.00");
        assert_eq!(Percentage::from_counts(4, 4), Percentage::FULL);
    }

    #[test]
    fn percentage_is_zero_for_empty_course() {
        assert_eq!(Percentage::from_counts(0, 0), Percentage::ZERO);
        assert_eq!(Percentage::from_counts(5, 0), Percentage::ZERO);
    }

    #[test]
    fn percentage_matches_formula_for_small_courses() {
        for total in 1..=40u64 {
            for completed in 0..=total {
                let expected = (100.0 * completed as f64 / total as f64 * 100.0).round() / 100.0;
                let actual = Percentage::from_counts(completed, total).as_f64();
                assert!(
                    (expected - actual).abs() < 1e-9,
                    "{completed}/{total}: expected {expected}, got {actual}"
                );
            }
        }
    }

    #[test]
    fn percentage_round_trips_stored_numeric() {
        assert_eq!(Percentage::from_stored(66.67).hundredths(), 6_667);
        assert_eq!(Percentage::from_stored(250.0), Percentage::FULL);
        assert_eq!(Percentage::from_stored(-1.0), Percentage::ZERO);
    }

    #[test]
    fn percentage_serializes_as_number() {
        let json = serde_json::to_value(Percentage::from_counts(1, 3)).unwrap();
        assert_eq!(json, serde_json::json!(33.33));
    }

    // -- Mark complete -----------------------------------------------------

    #[tokio::test]
    async fn two_lesson_course_progresses_then_completes() {
        let mut store = enrolled_store(&[(1, false), (2, false)]).await;
        assert_eq!(store.enrollment(STUDENT, COURSE).progress, Percentage::ZERO);

        let first = mark_lesson_complete(&mut store, STUDENT, 1, at(10)).await.unwrap();
        assert_eq!(first.progress.to_string(), "50.00");
        assert_eq!(first.status, EnrollmentStatus::Active);
        assert!(!first.course_completed);
        assert_eq!(store.enrollment(STUDENT, COURSE).completed_at, None);

        let second = mark_lesson_complete(&mut store, STUDENT, 2, at(20)).await.unwrap();
        assert_eq!(second.progress.to_string(), "100.00");
        assert_eq!(second.status, EnrollmentStatus::Completed);
        assert!(second.course_completed);
        assert_eq!(store.enrollment(STUDENT, COURSE).completed_at, Some(at(20)));
    }

    #[tokio::test]
    async fn marking_twice_matches_marking_once() {
        let mut once = enrolled_store(&[(1, false), (2, false), (3, true)]).await;
        mark_lesson_complete(&mut once, STUDENT, 2, at(10)).await.unwrap();

        let mut twice = once.clone();
        mark_lesson_complete(&mut twice, STUDENT, 2, at(10)).await.unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn recompleting_keeps_first_completion_time() {
        let mut store = enrolled_store(&[(1, false), (2, false)]).await;
        mark_lesson_complete(&mut store, STUDENT, 1, at(10)).await.unwrap();
        mark_lesson_complete(&mut store, STUDENT, 1, at(30)).await.unwrap();

        let record = &store.completions[&(STUDENT, 1)];
        assert_eq!(record.completed_at, at(10));
        assert_eq!(record.last_accessed_at, at(30));
    }

    #[tokio::test]
    async fn completed_enrollment_cannot_mark_lessons() {
        let mut store = enrolled_store(&[(1, false), (2, false)]).await;
        mark_lesson_complete(&mut store, STUDENT, 1, at(10)).await.unwrap();
        mark_lesson_complete(&mut store, STUDENT, 2, at(20)).await.unwrap();
        assert_eq!(
            store.enrollment(STUDENT, COURSE).status,
            EnrollmentStatus::Completed
        );
        let before = store.clone();

        let err = mark_lesson_complete(&mut store, STUDENT, 2, at(50))
            .await
            .unwrap_err();
        assert_matches!(err, ProgressError::Rule(CoreError::Forbidden(_)));
        assert_eq!(store, before);
        assert_eq!(store.completions[&(STUDENT, 2)].last_accessed_at, at(20));
    }

    #[tokio::test]
    async fn unknown_lesson_is_not_found() {
        let mut store = enrolled_store(&[(1, false)]).await;
        let err = mark_lesson_complete(&mut store, STUDENT, 99, at(10))
            .await
            .unwrap_err();
        assert_matches!(
            err,
            ProgressError::Rule(CoreError::NotFound { entity: "Lesson", id: 99 })
        );
    }

    #[tokio::test]
    async fn not_enrolled_fails_without_mutation_for_free_and_paid_lessons() {
        let mut store = MemoryStore::with_course(COURSE, &[(1, true), (2, false)]);
        let before = store.clone();

        for lesson_id in [1, 2] {
            let err = mark_lesson_complete(&mut store, STUDENT, lesson_id, at(10))
                .await
                .unwrap_err();
            assert_matches!(err, ProgressError::Rule(CoreError::Forbidden(_)));
        }
        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn cancelled_enrollment_cannot_mark_lessons() {
        let mut store = enrolled_store(&[(1, true)]).await;
        unenroll(&mut store, STUDENT, COURSE, UnenrollPolicy::SoftCancel)
            .await
            .unwrap();
        let before = store.clone();

        let err = mark_lesson_complete(&mut store, STUDENT, 1, at(10))
            .await
            .unwrap_err();
        assert_matches!(err, ProgressError::Rule(CoreError::Forbidden(_)));
        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn store_fault_is_not_a_rule_error() {
        let mut store = enrolled_store(&[(1, false)]).await;
        store.offline_saves = true;

        let err = mark_lesson_complete(&mut store, STUDENT, 1, at(10))
            .await
            .unwrap_err();
        assert_matches!(err, ProgressError::Store(Offline));
    }

    // -- Recompute / read paths -------------------------------------------

    #[tokio::test]
    async fn recompute_without_enrollment_is_noop() {
        let mut store = MemoryStore::with_course(COURSE, &[(1, false)]);
        let before = store.clone();

        let result = recompute_progress(&mut store, STUDENT, COURSE, at(5)).await.unwrap();
        assert_eq!(result, None);
        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn recompute_counts_only_this_course() {
        let mut store = enrolled_store(&[(1, false), (2, false), (3, false)]).await;
        store.lessons.insert(
            50,
            LessonRef {
                lesson_id: 50,
                section_id: 900,
                course_id: 9,
                is_free: false,
            },
        );
        store.completions.insert(
            (STUDENT, 50),
            Completion {
                completed_at: at(1),
                last_accessed_at: at(1),
            },
        );
        mark_lesson_complete(&mut store, STUDENT, 1, at(10)).await.unwrap();

        let state = recompute_progress(&mut store, STUDENT, COURSE, at(11))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.progress.to_string(), "33.33");
    }

    #[tokio::test]
    async fn empty_course_progress_is_zero() {
        let mut store = MemoryStore::with_course(COURSE, &[]);
        enroll(&mut store, STUDENT, COURSE, at(0)).await.unwrap();

        let pct = course_progress(&mut store, STUDENT, COURSE).await.unwrap();
        assert_eq!(pct, Percentage::ZERO);
        let state = recompute_progress(&mut store, STUDENT, COURSE, at(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.status, EnrollmentStatus::Active);
    }

    #[tokio::test]
    async fn read_path_does_not_mutate() {
        let mut store = enrolled_store(&[(1, false), (2, false)]).await;
        mark_lesson_complete(&mut store, STUDENT, 1, at(10)).await.unwrap();
        let before = store.clone();

        let pct = course_progress(&mut store, STUDENT, COURSE).await.unwrap();
        assert_eq!(pct.to_string(), "50.00");
        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn last_accessed_lesson_is_most_recent() {
        let mut store = enrolled_store(&[(1, false), (2, false), (3, false)]).await;
        assert_eq!(
            last_accessed_lesson(&mut store, STUDENT, COURSE).await.unwrap(),
            None
        );

        mark_lesson_complete(&mut store, STUDENT, 1, at(1)).await.unwrap();
        mark_lesson_complete(&mut store, STUDENT, 2, at(2)).await.unwrap();

        assert_eq!(
            last_accessed_lesson(&mut store, STUDENT, COURSE).await.unwrap(),
            Some(2)
        );
    }

    // -- Enroll / unenroll -------------------------------------------------

    #[tokio::test]
    async fn enroll_starts_active_at_zero() {
        let mut store = MemoryStore::with_course(COURSE, &[(1, false)]);
        let state = enroll(&mut store, STUDENT, COURSE, at(4)).await.unwrap();
        assert_eq!(state.status, EnrollmentStatus::Active);
        assert_eq!(state.progress, Percentage::ZERO);
        assert_eq!(state.enrolled_at, at(4));
    }

    #[tokio::test]
    async fn enroll_twice_conflicts() {
        let mut store = enrolled_store(&[(1, false)]).await;
        let err = enroll(&mut store, STUDENT, COURSE, at(5)).await.unwrap_err();
        assert_matches!(err, ProgressError::Rule(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn enroll_requires_published_course() {
        let mut store = MemoryStore::with_course(COURSE, &[(1, false)]);
        store.courses.get_mut(&COURSE).unwrap().is_published = false;

        let err = enroll(&mut store, STUDENT, COURSE, at(5)).await.unwrap_err();
        assert_matches!(err, ProgressError::Rule(CoreError::Validation(_)));

        let err = enroll(&mut store, STUDENT, 404, at(5)).await.unwrap_err();
        assert_matches!(
            err,
            ProgressError::Rule(CoreError::NotFound { entity: "Course", .. })
        );
    }

    #[tokio::test]
    async fn hard_delete_removes_row_but_keeps_ledger() {
        let mut store = enrolled_store(&[(1, false), (2, false)]).await;
        mark_lesson_complete(&mut store, STUDENT, 1, at(10)).await.unwrap();

        unenroll(&mut store, STUDENT, COURSE, UnenrollPolicy::HardDelete)
            .await
            .unwrap();
        assert!(store.enrollments.is_empty());
        assert!(store.completions.contains_key(&(STUDENT, 1)));

        let err = unenroll(&mut store, STUDENT, COURSE, UnenrollPolicy::HardDelete)
            .await
            .unwrap_err();
        assert_matches!(err, ProgressError::Rule(CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn soft_cancel_then_reenroll_restores_progress() {
        let mut store = enrolled_store(&[(1, false), (2, false)]).await;
        mark_lesson_complete(&mut store, STUDENT, 1, at(10)).await.unwrap();

        unenroll(&mut store, STUDENT, COURSE, UnenrollPolicy::SoftCancel)
            .await
            .unwrap();
        assert_eq!(
            store.enrollment(STUDENT, COURSE).status,
            EnrollmentStatus::Cancelled
        );

        let state = enroll(&mut store, STUDENT, COURSE, at(20)).await.unwrap();
        assert_eq!(state.status, EnrollmentStatus::Active);
        assert_eq!(state.progress.to_string(), "50.00");
        assert_eq!(state.enrolled_at, at(0));
    }
}
