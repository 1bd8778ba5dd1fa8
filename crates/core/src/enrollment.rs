//! Enrollment lifecycle: status lookup ids, the access predicate every gate
//! shares, and the state transitions driven by enroll / unenroll / progress.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;
use crate::progress::Percentage;
use crate::types::{DbId, Timestamp};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant in seed order.
            pub const ALL: &'static [Self] = &[$( Self::$variant ),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database status ID, `None` when it is not seeded.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Lowercase name matching the lookup table's `name` column.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Enrollment lifecycle status (`enrollment_statuses` seed order).
    EnrollmentStatus {
        Active = 1 => "active",
        Completed = 2 => "completed",
        /// Only reachable under [`UnenrollPolicy::SoftCancel`].
        Cancelled = 3 => "cancelled",
    }
}

impl EnrollmentStatus {
    /// The one definition of "is enrolled" used by every gated operation
    /// (lesson completion, reviews, the enrollment check endpoint).
    pub fn grants_access(self) -> bool {
        matches!(self, Self::Active | Self::Completed)
    }

    /// Whether new lesson completions may be recorded. Only Active
    /// enrollments accept them; a Completed course is closed for progress.
    pub fn can_record_progress(self) -> bool {
        self == Self::Active
    }
}

/// Status ids that grant access, for SQL filters (`status_id = ANY($n)`).
pub fn access_status_ids() -> Vec<StatusId> {
    EnrollmentStatus::ALL
        .iter()
        .filter(|s| s.grants_access())
        .map(|s| s.id())
        .collect()
}

/// Whether an optional enrollment status lets the student into the course.
pub fn is_enrolled(status: Option<EnrollmentStatus>) -> bool {
    status.is_some_and(EnrollmentStatus::grants_access)
}

/// What unenrolling does to the enrollment row.
///
/// Completion records and reviews are kept under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnenrollPolicy {
    /// Delete the enrollment row.
    HardDelete,
    /// Keep the row with status `cancelled`; re-enrolling reactivates it.
    #[default]
    SoftCancel,
}

impl FromStr for UnenrollPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard-delete" | "hard_delete" => Ok(Self::HardDelete),
            "soft-cancel" | "soft_cancel" => Ok(Self::SoftCancel),
            other => Err(CoreError::Validation(format!(
                "Unknown unenroll policy '{other}'. Must be one of: hard-delete, soft-cancel"
            ))),
        }
    }
}

impl fmt::Display for UnenrollPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardDelete => f.write_str("hard-delete"),
            Self::SoftCancel => f.write_str("soft-cancel"),
        }
    }
}

/// The mutable part of an enrollment row as the progress engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentState {
    pub id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    pub status: EnrollmentStatus,
    pub progress: Percentage,
    pub enrolled_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl EnrollmentState {
    /// Store a freshly computed percentage.
    ///
    /// Active enrollments reaching 100 % become Completed. `completed_at` is
    /// written once and never moved. Returns `true` when this call performed
    /// the Active -> Completed transition.
    pub fn apply_progress(&mut self, progress: Percentage, now: Timestamp) -> bool {
        self.progress = progress;

        if progress.is_full() && self.status == EnrollmentStatus::Active {
            self.status = EnrollmentStatus::Completed;
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
            return true;
        }
        false
    }

    /// Cancelled -> Active. Any other state is already enrolled.
    pub fn reactivate(&mut self) -> Result<(), CoreError> {
        if self.status.grants_access() {
            return Err(CoreError::Conflict(
                "Already enrolled in this course".to_string(),
            ));
        }
        self.status = EnrollmentStatus::Active;
        Ok(())
    }

    /// Active | Completed -> Cancelled (soft unenroll).
    pub fn cancel(&mut self) -> Result<(), CoreError> {
        if !self.status.grants_access() {
            return Err(CoreError::NotFound {
                entity: "Enrollment",
                id: self.course_id,
            });
        }
        self.status = EnrollmentStatus::Cancelled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn active() -> EnrollmentState {
        EnrollmentState {
            id: 1,
            student_id: 10,
            course_id: 20,
            status: EnrollmentStatus::Active,
            progress: Percentage::ZERO,
            enrolled_at: at(0),
            completed_at: None,
        }
    }

    #[test]
    fn status_ids_match_seed_data() {
        assert_eq!(EnrollmentStatus::Active.id(), 1);
        assert_eq!(EnrollmentStatus::Completed.id(), 2);
        assert_eq!(EnrollmentStatus::Cancelled.id(), 3);
        assert_eq!(EnrollmentStatus::from_id(2), Some(EnrollmentStatus::Completed));
        assert_eq!(EnrollmentStatus::from_id(9), None);
    }

    #[test]
    fn cancelled_never_grants_access() {
        assert!(EnrollmentStatus::Active.grants_access());
        assert!(EnrollmentStatus::Completed.grants_access());
        assert!(!EnrollmentStatus::Cancelled.grants_access());
        assert!(!is_enrolled(None));
        assert!(!is_enrolled(Some(EnrollmentStatus::Cancelled)));
        assert_eq!(access_status_ids(), vec![1, 2]);
    }

    #[test]
    fn only_active_records_progress() {
        assert!(EnrollmentStatus::Active.can_record_progress());
        assert!(!EnrollmentStatus::Completed.can_record_progress());
        assert!(!EnrollmentStatus::Cancelled.can_record_progress());
    }

    #[test]
    fn partial_progress_stays_active() {
        let mut e = active();
        assert!(!e.apply_progress(Percentage::from_hundredths(5_000), at(5)));
        assert_eq!(e.status, EnrollmentStatus::Active);
        assert_eq!(e.completed_at, None);
    }

    #[test]
    fn full_progress_completes_once() {
        let mut e = active();
        assert!(e.apply_progress(Percentage::FULL, at(5)));
        assert_eq!(e.status, EnrollmentStatus::Completed);
        assert_eq!(e.completed_at, Some(at(5)));

        // Recomputing later neither re-transitions nor moves the timestamp.
        assert!(!e.apply_progress(Percentage::FULL, at(9)));
        assert_eq!(e.completed_at, Some(at(5)));
    }

    #[test]
    fn cancelled_enrollment_does_not_complete() {
        let mut e = active();
        e.status = EnrollmentStatus::Cancelled;
        assert!(!e.apply_progress(Percentage::FULL, at(5)));
        assert_eq!(e.status, EnrollmentStatus::Cancelled);
        assert_eq!(e.progress, Percentage::FULL);
    }

    #[test]
    fn reactivate_only_from_cancelled() {
        let mut e = active();
        assert!(matches!(e.reactivate(), Err(CoreError::Conflict(_))));

        e.cancel().unwrap();
        assert_eq!(e.status, EnrollmentStatus::Cancelled);
        assert!(matches!(e.cancel(), Err(CoreError::NotFound { .. })));

        e.reactivate().unwrap();
        assert_eq!(e.status, EnrollmentStatus::Active);
    }

    #[test]
    fn unenroll_policy_parses() {
        assert_eq!("hard-delete".parse::<UnenrollPolicy>().unwrap(), UnenrollPolicy::HardDelete);
        assert_eq!(" Soft_Cancel ".parse::<UnenrollPolicy>().unwrap(), UnenrollPolicy::SoftCancel);
        assert!("archive".parse::<UnenrollPolicy>().is_err());
        assert_eq!(UnenrollPolicy::default(), UnenrollPolicy::SoftCancel);
        assert_eq!(UnenrollPolicy::HardDelete.to_string(), "hard-delete");
    }
}
