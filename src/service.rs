use crate::{
    config::{CallProfile, SimulationConfig},
    data::{
        course::Course,
        student::{SavedStudent, StudentDraft, StudentId, UpdatedStudent},
    },
    error::{NetworkSnafu, RosterResult, ServerSnafu, ValidationSnafu},
};
use jiff::Timestamp;
use rand::{Rng, rng};
use snafu::ensure;
use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
    time::Duration,
};
use tokio::time::sleep;

pub const NAME_AND_EMAIL_REQUIRED: &str = "Name and email are required";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ServiceCall {
    FetchCourses,
    SaveStudent,
    UpdateStudent,
}

/// Decides how long each simulated call takes and whether it fails.
pub trait NetworkConditions: Debug + Send + Sync {
    fn delay(&self, call: ServiceCall) -> Duration;
    fn should_fail(&self, call: ServiceCall) -> bool;
}

/// Random latency and failures, drawn from the configured bounds and rates.
#[derive(Debug, Clone)]
pub struct SimulatedConditions {
    config: Arc<SimulationConfig>,
}

impl SimulatedConditions {
    pub fn new(config: Arc<SimulationConfig>) -> Self {
        Self { config }
    }

    fn profile(&self, call: ServiceCall) -> &CallProfile {
        match call {
            ServiceCall::FetchCourses => &self.config.fetch_courses,
            ServiceCall::SaveStudent => &self.config.save_student,
            ServiceCall::UpdateStudent => &self.config.update_student,
        }
    }
}

impl NetworkConditions for SimulatedConditions {
    fn delay(&self, call: ServiceCall) -> Duration {
        let range = self.profile(call).delay;
        rng().random_range(range.min..=range.max)
    }

    fn should_fail(&self, call: ServiceCall) -> bool {
        rng().random_bool(self.profile(call).failure_rate)
    }
}

/// Same delay for every call, and a fixed set of calls that always fail.
#[derive(Debug, Clone, Default)]
pub struct FixedConditions {
    delay: Duration,
    failing: Vec<ServiceCall>,
}

impl FixedConditions {
    pub fn instant() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn failing(mut self, call: ServiceCall) -> Self {
        self.failing.push(call);
        self
    }
}

impl NetworkConditions for FixedConditions {
    fn delay(&self, _call: ServiceCall) -> Duration {
        self.delay
    }

    fn should_fail(&self, call: ServiceCall) -> bool {
        self.failing.contains(&call)
    }
}

/// Stand-in for the course/student backend. Every call sleeps for a while before settling.
#[derive(Debug, Clone)]
pub struct MockDataService {
    conditions: Arc<dyn NetworkConditions>,
    last_id: Arc<AtomicI64>,
}

impl MockDataService {
    pub fn new(conditions: impl NetworkConditions + 'static) -> Self {
        Self {
            conditions: Arc::new(conditions),
            last_id: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn simulated(config: Arc<SimulationConfig>) -> Self {
        Self::new(SimulatedConditions::new(config))
    }

    async fn wait(&self, call: ServiceCall) {
        let delay = self.conditions.delay(call);
        debug!(?call, ?delay, "Simulating network latency");
        sleep(delay).await;
    }

    pub async fn fetch_courses(&self) -> RosterResult<Vec<Course>> {
        info!("Starting course fetch");
        self.wait(ServiceCall::FetchCourses).await;

        if self.conditions.should_fail(ServiceCall::FetchCourses) {
            warn!("Simulated network failure fetching courses");
            return NetworkSnafu.fail();
        }

        let courses = Course::catalogue();
        info!(count = courses.len(), "Courses fetched");
        Ok(courses)
    }

    pub async fn save_student(&self, draft: StudentDraft) -> RosterResult<SavedStudent> {
        info!(name = %draft.name, email = %draft.email, "Saving student");
        self.wait(ServiceCall::SaveStudent).await;

        let outcome = check_required(&draft).and_then(|()| {
            ensure!(
                !self.conditions.should_fail(ServiceCall::SaveStudent),
                ServerSnafu
            );
            Ok(())
        });
        if let Err(e) = outcome {
            error!(?e, "Error saving student");
            return Err(e);
        }

        let now = Timestamp::now();
        let id = self.next_id(now);
        info!(%id, "Student saved");

        Ok(SavedStudent {
            draft,
            id,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn update_student(
        &self,
        id: StudentId,
        draft: StudentDraft,
    ) -> RosterResult<UpdatedStudent> {
        info!(%id, name = %draft.name, "Updating student");
        self.wait(ServiceCall::UpdateStudent).await;

        if let Err(e) = check_required(&draft) {
            error!(?e, %id, "Error updating student");
            return Err(e);
        }

        info!(%id, "Student updated");
        Ok(UpdatedStudent {
            draft,
            id,
            updated_at: Timestamp::now(),
        })
    }

    /// Makes sure every id handed out from now on is greater than `id`.
    pub fn reserve_ids_through(&self, id: StudentId) {
        self.last_id.fetch_max(id.0, Ordering::SeqCst);
    }

    /// Millisecond creation time, bumped past the previous id when two saves share a millisecond.
    fn next_id(&self, now: Timestamp) -> StudentId {
        let now_ms = now.as_millisecond();
        let (Ok(previous) | Err(previous)) =
            self.last_id
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                    Some(now_ms.max(last + 1))
                });
        StudentId(now_ms.max(previous + 1))
    }
}

fn check_required(draft: &StudentDraft) -> RosterResult<()> {
    ensure!(
        !draft.name.trim().is_empty() && !draft.email.trim().is_empty(),
        ValidationSnafu {
            message: NAME_AND_EMAIL_REQUIRED
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DelayRange,
        data::course::CourseId,
        error::RosterError,
    };
    use std::collections::HashSet;

    fn ana() -> StudentDraft {
        StudentDraft {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            ..StudentDraft::default()
        }
    }

    #[tokio::test]
    async fn save_assigns_id_and_matching_timestamps() {
        let service = MockDataService::new(FixedConditions::instant());
        let saved = service.save_student(ana()).await.unwrap();

        assert!(saved.id.0 > 0);
        assert_eq!(saved.created_at, saved.updated_at);
        assert_eq!(saved.draft, ana());

        let json = serde_json::to_value(&saved).unwrap();
        let created = json["createdAt"].as_str().unwrap();
        assert!(created.parse::<Timestamp>().is_ok(), "{created}");
        assert_eq!(json["createdAt"], json["updatedAt"]);
        assert_eq!(json["name"], "Ana");
    }

    #[tokio::test]
    async fn save_rejects_missing_fields_before_rolling_for_failure() {
        let service = MockDataService::new(
            FixedConditions::instant().failing(ServiceCall::SaveStudent),
        );
        let draft = StudentDraft {
            email: String::new(),
            ..ana()
        };

        let err = service.save_student(draft).await.unwrap_err();
        assert!(matches!(
            err,
            RosterError::Validation {
                message: NAME_AND_EMAIL_REQUIRED
            }
        ));

        let err = service.save_student(ana()).await.unwrap_err();
        assert!(matches!(err, RosterError::Server));
    }

    #[tokio::test]
    async fn fetch_fails_only_when_told_to() {
        let healthy = MockDataService::new(FixedConditions::instant());
        let courses = healthy.fetch_courses().await.unwrap();
        assert_eq!(courses.len(), 7);
        assert_eq!(courses[0].id, CourseId(1));

        let flaky = MockDataService::new(
            FixedConditions::instant().failing(ServiceCall::FetchCourses),
        );
        assert!(matches!(
            flaky.fetch_courses().await,
            Err(RosterError::Network)
        ));
    }

    #[tokio::test]
    async fn update_ignores_failure_roll_but_still_validates() {
        let service = MockDataService::new(
            FixedConditions::instant().failing(ServiceCall::UpdateStudent),
        );
        let updated = service
            .update_student(StudentId(7), ana())
            .await
            .unwrap();
        assert_eq!(updated.id, StudentId(7));
        assert_eq!(updated.draft.name, "Ana");

        let blank = StudentDraft {
            name: "  ".into(),
            ..ana()
        };
        assert!(matches!(
            service.update_student(StudentId(7), blank).await,
            Err(RosterError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn ids_are_unique_even_within_one_millisecond() {
        let service = MockDataService::new(FixedConditions::instant());
        let now = Timestamp::now();

        let ids: Vec<_> = (0..50).map(|_| service.next_id(now)).collect();
        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids[0].0, now.as_millisecond());
    }

    #[tokio::test]
    async fn reserved_ids_are_never_reissued() {
        let service = MockDataService::new(FixedConditions::instant());
        let reserved = StudentId(Timestamp::now().as_millisecond() + 60_000);
        service.reserve_ids_through(reserved);

        let saved = service.save_student(ana()).await.unwrap();
        assert_eq!(saved.id, StudentId(reserved.0 + 1));

        service.reserve_ids_through(StudentId(1));
        let next = service.save_student(ana()).await.unwrap();
        assert_eq!(next.id, StudentId(reserved.0 + 2));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_fetch_waits_for_configured_delay() {
        let config = SimulationConfig {
            fetch_courses: CallProfile {
                delay: DelayRange::fixed(Duration::from_millis(1_500)),
                failure_rate: 0.0,
            },
            ..SimulationConfig::default()
        };
        let service = MockDataService::simulated(Arc::new(config));

        let started = tokio::time::Instant::now();
        let courses = service.fetch_courses().await.unwrap();

        assert_eq!(courses.len(), 7);
        assert!(started.elapsed() >= Duration::from_millis(1_500));
    }

    #[test]
    fn simulated_delay_stays_within_bounds() {
        let conditions = SimulatedConditions::new(Arc::new(SimulationConfig::default()));
        for _ in 0..200 {
            let delay = conditions.delay(ServiceCall::SaveStudent);
            assert!(delay >= Duration::from_millis(300) && delay <= Duration::from_millis(500));
            assert!(!conditions.should_fail(ServiceCall::UpdateStudent));
        }
    }
}
