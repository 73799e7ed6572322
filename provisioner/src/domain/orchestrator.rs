//! Provisioning orchestration.
//!
//! Drives one strictly sequential run: pause daemons, load definitions,
//! create real accounts, generate the synthetic pool, derive the term,
//! persist users, allocate courses, persist courses, resume daemons and
//! optionally queue a regrade. Every stage is fatal on error and nothing is
//! rolled back; a failed run reports the last completed stage and leaves the
//! daemons paused.

use std::collections::BTreeSet;
use std::sync::Arc;

use mockable::Clock;
use sample_roster::{
    Course, CourseAllocation, CourseDefinition, Definitions, RosterAllocator, RosterContext, Term,
    UserDefinition, UserDirectory, UserPoolGenerator,
};
use tracing::{debug, error, info};

use super::ports::{
    AccountProvisioner, CourseMaterializer, DaemonController, DefinitionDocument,
    DefinitionSource, MaterializeRequest, PersistenceSink, RegradeRequest, RegradeTrigger,
};
use super::records::{CourseRecord, TermRow, UserRow, format_last_updated};
use super::stage::{DaemonState, ProvisioningError, ProvisioningFailure, ProvisioningStage};

/// Run-time switches for a provisioning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionOptions {
    /// Course codes to provision; empty means every defined course.
    pub course_filter: BTreeSet<String>,
    /// Persist rows only and skip course materialization.
    pub db_only: bool,
    /// Skip per-student submission directories.
    pub no_submissions: bool,
    /// Skip the final regrade.
    pub no_grading: bool,
}

impl ProvisionOptions {
    /// Returns `true` when `code` passes the course filter.
    #[must_use]
    pub fn includes(&self, code: &str) -> bool {
        self.course_filter.is_empty() || self.course_filter.contains(code)
    }
}

/// Collaborators driven by the orchestrator.
#[derive(Clone)]
pub struct ProvisioningPorts {
    /// Source of course and user definition documents.
    pub definitions: Arc<dyn DefinitionSource>,
    /// Creates accounts for real users.
    pub accounts: Arc<dyn AccountProvisioner>,
    /// Stores users, the term and courses.
    pub persistence: Arc<dyn PersistenceSink>,
    /// Builds course structures.
    pub materializer: Arc<dyn CourseMaterializer>,
    /// Pauses and resumes grading daemons.
    pub daemons: Arc<dyn DaemonController>,
    /// Queues the final regrade.
    pub regrade: Arc<dyn RegradeTrigger>,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningReport {
    /// Term the courses were provisioned into.
    pub term: Term,
    /// Number of real users that received accounts.
    pub real_users: usize,
    /// Number of synthetic users in the shared pool.
    pub synthetic_users: usize,
    /// Defined users skipped because their ids are reserved.
    pub skipped_user_ids: Vec<String>,
    /// Per-course allocation summaries in code order.
    pub courses: Vec<CourseAllocation>,
    /// Whether a regrade job was queued.
    pub regrade_enqueued: bool,
}

/// Drives one provisioning run against the configured collaborators.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use roster_provisioner::domain::{ProvisionOptions, Provisioner, ProvisioningPorts};
/// use sample_roster::RosterContext;
///
/// # fn example(ports: ProvisioningPorts) -> Result<(), Box<dyn std::error::Error>> {
/// let provisioner = Provisioner::new(
///     ports,
///     Arc::new(DefaultClock),
///     RosterContext::default(),
///     ProvisionOptions::default(),
/// );
/// let report = provisioner.run()?;
/// assert!(!report.courses.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Provisioner {
    ports: ProvisioningPorts,
    clock: Arc<dyn Clock>,
    context: RosterContext,
    options: ProvisionOptions,
}

/// Definitions after filtering, ready for allocation.
struct LoadedRoster {
    courses: Vec<Course>,
    directory: UserDirectory,
    skipped_user_ids: Vec<String>,
}

/// Progress of the current run.
struct RunState {
    completed: ProvisioningStage,
    daemons: DaemonState,
}

impl RunState {
    const fn new() -> Self {
        Self {
            completed: ProvisioningStage::NotStarted,
            daemons: DaemonState::Running,
        }
    }

    fn advance(&mut self, stage: ProvisioningStage) {
        self.completed = stage;
        info!(stage = %stage, "provisioning stage completed");
    }

    fn fail(&self, failure: impl Into<ProvisioningFailure>) -> ProvisioningError {
        let err = ProvisioningError {
            completed: self.completed,
            daemons: self.daemons,
            failure: failure.into(),
        };
        error!(
            stage = %err.completed,
            daemons_paused = err.daemons_paused(),
            error = %err.failure,
            "provisioning failed; grading daemons must be restarted manually"
        );
        err
    }
}

impl Provisioner {
    /// Creates an orchestrator for one run.
    #[must_use]
    pub fn new(
        ports: ProvisioningPorts,
        clock: Arc<dyn Clock>,
        context: RosterContext,
        options: ProvisionOptions,
    ) -> Self {
        Self {
            ports,
            clock,
            context,
            options,
        }
    }

    /// Executes every stage in order.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningError`] naming the last completed stage when any
    /// stage fails. Daemons are not resumed after a failure.
    pub fn run(&self) -> Result<ProvisioningReport, ProvisioningError> {
        let mut run = RunState::new();

        run.daemons = DaemonState::Paused;
        self.ports.daemons.pause().map_err(|err| run.fail(err))?;
        run.advance(ProvisioningStage::DaemonsPaused);

        let LoadedRoster {
            mut courses,
            mut directory,
            skipped_user_ids,
        } = self.load_definitions().map_err(|err| run.fail(err))?;
        run.advance(ProvisioningStage::DefinitionsLoaded);

        self.create_accounts(&directory, &skipped_user_ids)
            .map_err(|err| run.fail(err))?;
        let real_users = directory.len();
        run.advance(ProvisioningStage::RealUsersCreated);

        let mut generator = UserPoolGenerator::new(&self.context);
        let allocator = RosterAllocator::generate(&mut generator, &courses, &mut directory)
            .map_err(|err| run.fail(err))?;
        run.advance(ProvisioningStage::PoolGenerated);

        let term =
            Term::for_date(self.clock.local().date_naive()).map_err(|err| run.fail(err))?;
        info!(term = term.id(), name = term.name(), "term computed");
        run.advance(ProvisioningStage::TermComputed);

        self.persist_users(&directory, &term)
            .map_err(|err| run.fail(err))?;
        run.advance(ProvisioningStage::UsersPersisted);

        let allocations = allocator
            .allocate(&mut courses, &mut directory)
            .map_err(|err| run.fail(err))?;
        run.advance(ProvisioningStage::CoursesAllocated);

        self.persist_courses(&courses, &directory, &term)
            .map_err(|err| run.fail(err))?;
        run.advance(ProvisioningStage::CoursesPersisted);

        self.ports.daemons.resume().map_err(|err| run.fail(err))?;
        run.daemons = DaemonState::Running;
        run.advance(ProvisioningStage::DaemonsResumed);

        let regrade_enqueued = if self.options.no_grading {
            info!("regrade skipped");
            false
        } else {
            let request = RegradeRequest {
                term_id: term.id().to_owned(),
                course_codes: courses.iter().map(|c| c.code().to_owned()).collect(),
            };
            self.ports
                .regrade
                .enqueue(&request)
                .map_err(|err| run.fail(err))?;
            run.advance(ProvisioningStage::RegradeEnqueued);
            true
        };

        Ok(ProvisioningReport {
            term,
            real_users,
            synthetic_users: allocator.pool().len(),
            skipped_user_ids,
            courses: allocations,
            regrade_enqueued,
        })
    }

    fn load_definitions(&self) -> Result<LoadedRoster, ProvisioningFailure> {
        let course_definitions = parse_all(
            &self.ports.definitions.course_documents()?,
            CourseDefinition::from_yaml,
        )?;
        let user_definitions = parse_all(
            &self.ports.definitions.user_documents()?,
            UserDefinition::from_yaml,
        )?;
        let definitions = Definitions::new(course_definitions, user_definitions)?;

        if let Some(code) = self
            .options
            .course_filter
            .iter()
            .find(|code| definitions.course(code).is_none())
        {
            return Err(ProvisioningFailure::UnknownFilteredCourse { code: code.clone() });
        }

        let courses: Vec<Course> = definitions
            .courses()
            .filter(|definition| self.options.includes(definition.code()))
            .map(CourseDefinition::to_course)
            .collect();
        let (skipped, kept): (Vec<&UserDefinition>, Vec<&UserDefinition>) = definitions
            .users()
            .partition(|definition| self.context.is_excluded(definition.user_id()));
        let directory: UserDirectory = kept
            .into_iter()
            .map(|definition| definition.enrolled_user(courses.iter().map(Course::code)))
            .collect();

        info!(
            courses = courses.len(),
            users = directory.len(),
            skipped = skipped.len(),
            "definitions loaded"
        );
        Ok(LoadedRoster {
            courses,
            directory,
            skipped_user_ids: skipped
                .into_iter()
                .map(|definition| definition.user_id().to_owned())
                .collect(),
        })
    }

    fn create_accounts(
        &self,
        directory: &UserDirectory,
        skipped_user_ids: &[String],
    ) -> Result<(), ProvisioningFailure> {
        for user_id in skipped_user_ids {
            info!(user_id = %user_id, "skipping reserved account id");
        }
        for user in directory.iter() {
            self.ports.accounts.create_account(user)?;
            debug!(user_id = %user.user_id, "account created");
        }
        Ok(())
    }

    fn persist_users(
        &self,
        directory: &UserDirectory,
        term: &Term,
    ) -> Result<(), ProvisioningFailure> {
        let last_updated = format_last_updated(self.clock.local());
        let rows: Vec<UserRow> = directory
            .iter()
            .map(|user| UserRow::from_user(user, &last_updated))
            .collect();
        self.ports.persistence.insert_users(&rows)?;
        self.ports.persistence.insert_term(&TermRow::from(term))?;
        info!(users = rows.len(), term = term.id(), "users persisted");
        Ok(())
    }

    fn persist_courses(
        &self,
        courses: &[Course],
        directory: &UserDirectory,
        term: &Term,
    ) -> Result<(), ProvisioningFailure> {
        for course in courses {
            let record = CourseRecord::build(term, course, directory)?;
            self.ports.persistence.insert_course(&record)?;
            if self.options.db_only {
                debug!(course = course.code(), "materialization skipped (database only)");
                continue;
            }
            self.ports.materializer.materialize(&MaterializeRequest {
                course: record,
                regenerate_config: course.regenerate_config(),
                include_submissions: !self.options.no_submissions,
            })?;
        }
        Ok(())
    }
}

fn parse_all<T, E>(
    documents: &[DefinitionDocument],
    parse: impl Fn(&str, &str) -> Result<T, E>,
) -> Result<Vec<T>, E> {
    documents
        .iter()
        .map(|document| parse(&document.name, &document.contents))
        .collect()
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
