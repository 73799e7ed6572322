//! Recording doubles and fixtures for provisioning integration tests.
//!
//! Compiled for unit tests and behind the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use mockable::Clock;
use sample_roster::User;

use crate::domain::ports::{
    AccountProvisioner, AccountProvisionerError, CourseMaterializer, DaemonControlError,
    DaemonController, DefinitionDocument, DefinitionSource, DefinitionSourceError,
    MaterializeRequest, MaterializerError, PersistenceError, PersistenceSink, RegradeRequest,
    RegradeTrigger, RegradeTriggerError,
};
use crate::domain::{CourseRecord, ProvisioningPorts, TermRow, UserRow};

/// One collaborator call observed by [`RecordingCollaborators`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortCall {
    /// Daemons were paused.
    PauseDaemons,
    /// An account was created for the user id.
    CreateAccount(String),
    /// User rows were inserted.
    InsertUsers(Vec<UserRow>),
    /// The term row was inserted.
    InsertTerm(TermRow),
    /// A course record was inserted.
    InsertCourse(CourseRecord),
    /// A course was materialized.
    Materialize(MaterializeRequest),
    /// Daemons were resumed.
    ResumeDaemons,
    /// A regrade was queued.
    EnqueueRegrade(RegradeRequest),
}

/// Collaborator call that should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// `DaemonController::pause`.
    Pause,
    /// `AccountProvisioner::create_account`.
    CreateAccount,
    /// `PersistenceSink::insert_users`.
    InsertUsers,
    /// `PersistenceSink::insert_course`.
    InsertCourse,
    /// `CourseMaterializer::materialize`.
    Materialize,
    /// `DaemonController::resume`.
    Resume,
    /// `RegradeTrigger::enqueue`.
    Regrade,
}

/// Implements every mutating port and records calls in one shared log.
///
/// A single log keeps cross-port ordering observable, so tests can assert
/// that daemons are paused before any row is written.
#[derive(Debug, Default)]
pub struct RecordingCollaborators {
    calls: Mutex<Vec<PortCall>>,
    failure: Mutex<Option<FailurePoint>>,
}

impl RecordingCollaborators {
    /// Creates collaborators that succeed on every call.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the given call fail from now on.
    pub fn fail_at(&self, point: FailurePoint) {
        *lock(&self.failure) = Some(point);
    }

    /// Returns a snapshot of recorded calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<PortCall> {
        lock(&self.calls).clone()
    }

    /// Builds orchestrator ports around `definitions` and these doubles.
    #[must_use]
    pub fn ports(self: &Arc<Self>, definitions: Arc<dyn DefinitionSource>) -> ProvisioningPorts {
        ProvisioningPorts {
            definitions,
            accounts: Arc::clone(self) as Arc<dyn AccountProvisioner>,
            persistence: Arc::clone(self) as Arc<dyn PersistenceSink>,
            materializer: Arc::clone(self) as Arc<dyn CourseMaterializer>,
            daemons: Arc::clone(self) as Arc<dyn DaemonController>,
            regrade: Arc::clone(self) as Arc<dyn RegradeTrigger>,
        }
    }

    fn record(&self, call: PortCall) {
        lock(&self.calls).push(call);
    }

    fn fails(&self, point: FailurePoint) -> bool {
        *lock(&self.failure) == Some(point)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AccountProvisioner for RecordingCollaborators {
    fn create_account(&self, user: &User) -> Result<(), AccountProvisionerError> {
        if self.fails(FailurePoint::CreateAccount) {
            return Err(AccountProvisionerError::creation(
                user.user_id.as_str(),
                "injected failure",
            ));
        }
        self.record(PortCall::CreateAccount(user.user_id.clone()));
        Ok(())
    }
}

impl PersistenceSink for RecordingCollaborators {
    fn insert_users(&self, rows: &[UserRow]) -> Result<(), PersistenceError> {
        if self.fails(FailurePoint::InsertUsers) {
            return Err(PersistenceError::write("users", "injected failure"));
        }
        self.record(PortCall::InsertUsers(rows.to_vec()));
        Ok(())
    }

    fn insert_term(&self, row: &TermRow) -> Result<(), PersistenceError> {
        self.record(PortCall::InsertTerm(row.clone()));
        Ok(())
    }

    fn insert_course(&self, record: &CourseRecord) -> Result<(), PersistenceError> {
        if self.fails(FailurePoint::InsertCourse) {
            return Err(PersistenceError::write("courses", "injected failure"));
        }
        self.record(PortCall::InsertCourse(record.clone()));
        Ok(())
    }
}

impl CourseMaterializer for RecordingCollaborators {
    fn materialize(&self, request: &MaterializeRequest) -> Result<(), MaterializerError> {
        if self.fails(FailurePoint::Materialize) {
            return Err(MaterializerError::filesystem(
                request.course.code.as_str(),
                "courses",
                "injected failure",
            ));
        }
        self.record(PortCall::Materialize(request.clone()));
        Ok(())
    }
}

impl DaemonController for RecordingCollaborators {
    fn pause(&self) -> Result<(), DaemonControlError> {
        if self.fails(FailurePoint::Pause) {
            return Err(DaemonControlError::command("grading", "injected failure"));
        }
        self.record(PortCall::PauseDaemons);
        Ok(())
    }

    fn resume(&self) -> Result<(), DaemonControlError> {
        if self.fails(FailurePoint::Resume) {
            return Err(DaemonControlError::command("grading", "injected failure"));
        }
        self.record(PortCall::ResumeDaemons);
        Ok(())
    }
}

impl RegradeTrigger for RecordingCollaborators {
    fn enqueue(&self, request: &RegradeRequest) -> Result<(), RegradeTriggerError> {
        if self.fails(FailurePoint::Regrade) {
            return Err(RegradeTriggerError::enqueue("injected failure"));
        }
        self.record(PortCall::EnqueueRegrade(request.clone()));
        Ok(())
    }
}

/// Definition source serving documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDefinitionSource {
    courses: Vec<DefinitionDocument>,
    users: Vec<DefinitionDocument>,
}

impl InMemoryDefinitionSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course document.
    #[must_use]
    pub fn with_course(mut self, name: &str, yaml: &str) -> Self {
        self.courses.push(DefinitionDocument::new(name, yaml));
        self
    }

    /// Adds a user document.
    #[must_use]
    pub fn with_user(mut self, name: &str, yaml: &str) -> Self {
        self.users.push(DefinitionDocument::new(name, yaml));
        self
    }
}

impl DefinitionSource for InMemoryDefinitionSource {
    fn course_documents(&self) -> Result<Vec<DefinitionDocument>, DefinitionSourceError> {
        Ok(self.courses.clone())
    }

    fn user_documents(&self) -> Result<Vec<DefinitionDocument>, DefinitionSourceError> {
        Ok(self.users.clone())
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Local>,
}

impl FixedClock {
    /// Pins the clock to local noon on `date`.
    #[must_use]
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_time(NaiveTime::MIN + chrono::TimeDelta::hours(12));
        let now = Local
            .from_local_datetime(&noon)
            .earliest()
            .unwrap_or_else(|| Utc.from_utc_datetime(&noon).with_timezone(&Local));
        Self { now }
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.now
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now.with_timezone(&Utc)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use sample_roster::RosterContext;

    use super::*;
    use crate::domain::{ProvisionOptions, Provisioner};

    const COURSE: &str = "
code: tutorial
instructor: instructor
registration_sections: 1
rotating_sections: 1
registered_students: 1
";

    const INSTRUCTOR: &str = "
user_id: instructor
numeric_id: 801516157
given_name: Quinn
family_name: Instructor
access_level: faculty
";

    fn run(collaborators: &Arc<RecordingCollaborators>) {
        let definitions = InMemoryDefinitionSource::new()
            .with_course("tutorial.yml", COURSE)
            .with_user("instructor.yml", INSTRUCTOR);
        let date = NaiveDate::from_ymd_opt(2024, 10, 1).expect("valid date");
        let outcome = Provisioner::new(
            collaborators.ports(Arc::new(definitions)),
            Arc::new(FixedClock::on(date)),
            RosterContext::default(),
            ProvisionOptions::default(),
        )
        .run();
        drop(outcome);
    }

    #[rstest]
    fn doubles_record_a_full_run_in_order() {
        let collaborators = RecordingCollaborators::new();
        run(&collaborators);

        let calls = collaborators.calls();
        assert_eq!(calls.first(), Some(&PortCall::PauseDaemons));
        assert_eq!(
            calls.get(1),
            Some(&PortCall::CreateAccount("instructor".to_owned()))
        );
        assert!(matches!(
            calls.get(3),
            Some(PortCall::InsertTerm(row)) if row.term_id == "f24"
        ));
        assert!(matches!(calls.last(), Some(PortCall::EnqueueRegrade(_))));
    }

    #[rstest]
    fn injected_failure_stops_recording() {
        let collaborators = RecordingCollaborators::new();
        collaborators.fail_at(FailurePoint::CreateAccount);
        run(&collaborators);

        assert_eq!(collaborators.calls(), [PortCall::PauseDaemons]);
    }

    #[test]
    fn fixed_clock_reports_the_pinned_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date");
        let clock = FixedClock::on(date);
        assert_eq!(clock.local().date_naive(), date);
        assert_eq!(clock.utc(), clock.local().with_timezone(&Utc));
    }
}
