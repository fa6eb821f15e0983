use crate::{
    avatar::{generate_avatar, profile_image_or_avatar},
    data::{
        course::Course,
        form::{FormErrors, FormMode, FormState, FormValues},
        student::{
            SavedStudent, Student, StudentDraft, StudentId, UpdatedStudent, enrolment_date_today,
        },
    },
    error::{
        CoursesNotLoadedSnafu, MissingStudentSnafu, NoFormOpenSnafu, RosterResult,
        SubmitInFlightSnafu,
    },
    persistence::LocalStore,
    service::MockDataService,
    validation::validate_against,
};
use snafu::{OptionExt, ensure};
use std::collections::HashSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingCourses,
    Ready,
    FormOpen(FormMode),
    Submitting(FormMode),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_students: usize,
    pub courses_in_use: usize,
    pub total_courses: usize,
}

impl DashboardStats {
    pub fn compute(students: &[Student], courses: &[Course]) -> Self {
        let courses_in_use = students
            .iter()
            .map(|student| student.course_id)
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_students: students.len(),
            courses_in_use,
            total_courses: courses.len(),
        }
    }
}

/// A validated create/update that has been handed off to the service but not yet settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingSubmission {
    Create(StudentDraft),
    Update(StudentId, StudentDraft),
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    Created(RosterResult<SavedStudent>),
    Updated(RosterResult<UpdatedStudent>),
}

impl PendingSubmission {
    pub async fn send(self, service: &MockDataService) -> SubmissionOutcome {
        match self {
            Self::Create(draft) => SubmissionOutcome::Created(service.save_student(draft).await),
            Self::Update(id, draft) => {
                SubmissionOutcome::Updated(service.update_student(id, draft).await)
            }
        }
    }
}

/// Owns the roster and the course list, and moves the dashboard between its phases.
///
/// The async steps are split into `begin_*`/`finish_*` pairs so a caller sharing the controller
/// behind a lock can release it while the service call is pending. [`Self::mount`] and
/// [`Self::submit`] do both halves for callers that own the controller outright.
#[derive(Debug)]
pub struct DashboardController {
    phase: Phase,
    courses: Vec<Course>,
    students: Vec<Student>,
    form: Option<FormState>,
    stats: DashboardStats,
    store: Option<LocalStore>,
}

impl Default for DashboardController {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardController {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            courses: Vec::new(),
            students: Vec::new(),
            form: None,
            stats: DashboardStats {
                total_students: 0,
                courses_in_use: 0,
                total_courses: 0,
            },
            store: None,
        }
    }

    #[must_use]
    pub fn with_store(mut self, store: LocalStore) -> Self {
        self.store = Some(store);
        self
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|student| student.id == id)
    }

    pub const fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub const fn stats(&self) -> DashboardStats {
        self.stats
    }

    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting(_))
    }

    pub const fn has_store(&self) -> bool {
        self.store.is_some()
    }

    fn recompute_stats(&mut self) {
        self.stats = DashboardStats::compute(&self.students, &self.courses);
    }

    fn persist(&self) {
        if let Some(store) = &self.store {
            store.save(&self.students);
        }
    }

    /// Enters `LoadingCourses`, restoring any saved roster first. New ids from `service` will sort
    /// after every restored one.
    pub fn begin_course_load(&mut self, service: &MockDataService) {
        if let Some(store) = &self.store {
            self.students = store.load();
            info!(count = self.students.len(), "Restored students from local storage");
            if let Some(latest) = self.students.iter().map(|student| student.id).max() {
                service.reserve_ids_through(latest);
            }
        }
        self.phase = Phase::LoadingCourses;
        self.recompute_stats();
    }

    /// Settles a course fetch. A failed fetch still leaves the dashboard usable with the fallback
    /// catalogue.
    pub fn finish_course_load(&mut self, fetched: RosterResult<Vec<Course>>) {
        self.courses = match fetched {
            Ok(courses) => {
                info!(count = courses.len(), "Courses loaded successfully");
                courses
            }
            Err(e) => {
                warn!(?e, "Failed to load courses, using fallback list");
                Course::fallback()
            }
        };
        if self.phase == Phase::LoadingCourses {
            self.phase = Phase::Ready;
        }
        self.recompute_stats();
    }

    pub async fn mount(&mut self, service: &MockDataService) {
        self.begin_course_load(service);
        let fetched = service.fetch_courses().await;
        self.finish_course_load(fetched);
    }

    fn ensure_can_open_form(&self) -> RosterResult<()> {
        match self.phase {
            Phase::Idle | Phase::LoadingCourses => CoursesNotLoadedSnafu.fail(),
            Phase::Submitting(_) => SubmitInFlightSnafu.fail(),
            Phase::Ready | Phase::FormOpen(_) => Ok(()),
        }
    }

    pub fn open_create_form(&mut self) -> RosterResult<()> {
        self.ensure_can_open_form()?;

        self.form = Some(FormState::create());
        self.phase = Phase::FormOpen(FormMode::Create);
        Ok(())
    }

    pub fn open_edit_form(&mut self, id: StudentId) -> RosterResult<()> {
        self.ensure_can_open_form()?;
        let student = self.student(id).context(MissingStudentSnafu { id })?;

        self.form = Some(FormState::edit(student));
        self.phase = Phase::FormOpen(FormMode::Edit(id));
        Ok(())
    }

    fn open_form_mut(&mut self) -> RosterResult<&mut FormState> {
        ensure!(!self.is_submitting(), SubmitInFlightSnafu);
        self.form.as_mut().context(NoFormOpenSnafu)
    }

    pub fn set_values(&mut self, values: FormValues) -> RosterResult<()> {
        self.open_form_mut()?.values = values;
        Ok(())
    }

    /// Closes the open form without touching the roster.
    pub fn cancel_form(&mut self) -> RosterResult<()> {
        ensure!(!self.is_submitting(), SubmitInFlightSnafu);
        if self.form.take().is_some() {
            self.phase = Phase::Ready;
        }
        Ok(())
    }

    /// Validates the open form and, if it passes, enters `Submitting` and returns the call to make.
    ///
    /// `Ok(None)` means validation failed; the form stays open with its errors filled in.
    pub fn begin_submit(&mut self) -> RosterResult<Option<PendingSubmission>> {
        ensure!(!self.is_submitting(), SubmitInFlightSnafu);
        let form = self.form.as_mut().context(NoFormOpenSnafu)?;
        let mode = form.mode;

        let enrolled_date = match mode {
            FormMode::Create => enrolment_date_today(),
            FormMode::Edit(id) => self
                .students
                .iter()
                .find(|student| student.id == id)
                .context(MissingStudentSnafu { id })?
                .enrolled_date
                .clone(),
        };

        form.submit_error = None;
        let course = match validate_against(&form.values, &self.courses) {
            Ok(course) => {
                form.errors = FormErrors::default();
                course
            }
            Err(errors) => {
                debug!(?errors, "Form failed validation");
                form.errors = errors;
                return Ok(None);
            }
        };

        let name = form.values.name.trim().to_string();
        let draft = StudentDraft {
            // validated emails can't contain whitespace
            email: form.values.email.clone(),
            course_id: Some(course.id),
            course: course.name.clone(),
            profile_image: Some(profile_image_or_avatar(&form.values.profile_image, &name)),
            enrolled_date,
            name,
        };

        self.phase = Phase::Submitting(mode);
        Ok(Some(match mode {
            FormMode::Create => PendingSubmission::Create(draft),
            FormMode::Edit(id) => PendingSubmission::Update(id, draft),
        }))
    }

    /// Commits a settled submission, or reopens the form with the failure attached.
    pub fn finish_submit(&mut self, outcome: SubmissionOutcome) -> RosterResult<StudentId> {
        let Phase::Submitting(mode) = self.phase else {
            return NoFormOpenSnafu.fail();
        };

        match self.commit(outcome) {
            Ok(id) => {
                self.form = None;
                self.phase = Phase::Ready;
                self.recompute_stats();
                self.persist();
                Ok(id)
            }
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.submit_error = Some(e.to_string());
                }
                self.phase = Phase::FormOpen(mode);
                Err(e)
            }
        }
    }

    fn commit(&mut self, outcome: SubmissionOutcome) -> RosterResult<StudentId> {
        match outcome {
            SubmissionOutcome::Created(saved) => {
                let student = Student::from_saved(saved?)?;
                let id = student.id;
                info!(%id, name = %student.name, "Student added to roster");
                self.students.push(student);
                Ok(id)
            }
            SubmissionOutcome::Updated(updated) => {
                let updated = updated?;
                let id = updated.id;
                let student = self
                    .students
                    .iter_mut()
                    .find(|student| student.id == id)
                    .context(MissingStudentSnafu { id })?;
                student.apply_update(updated)?;
                info!(%id, "Student updated in roster");
                Ok(id)
            }
        }
    }

    /// Runs a whole submission. `Ok(None)` means the form didn't validate.
    pub async fn submit(&mut self, service: &MockDataService) -> RosterResult<Option<StudentId>> {
        let Some(pending) = self.begin_submit()? else {
            return Ok(None);
        };
        let outcome = pending.send(service).await;
        self.finish_submit(outcome).map(Some)
    }

    /// Image to swap in when a student's profile image fails to load.
    pub fn fallback_image(&self, id: StudentId) -> RosterResult<String> {
        let student = self.student(id).context(MissingStudentSnafu { id })?;
        Ok(generate_avatar(&student.name))
    }

    /// Drops the whole roster, in memory and in storage.
    pub fn clear_roster(&mut self) -> RosterResult<()> {
        ensure!(!self.is_submitting(), SubmitInFlightSnafu);

        if let Some(store) = &self.store {
            store.clear();
        }
        self.students.clear();
        if self.form.take().is_some() {
            self.phase = Phase::Ready;
        }
        self.recompute_stats();
        Ok(())
    }
}
