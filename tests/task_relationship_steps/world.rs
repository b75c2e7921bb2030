//! Shared world state for task relationship BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use trellis::task::{
    adapters::memory::{
        InMemoryAssignmentNotifier, InMemoryEventPublisher, InMemoryTaskRepository,
        InMemoryUserDirectory,
    },
    domain::{ProjectAccess, ProjectId, Task, TaskId, UserId, WorkspaceId},
    ports::TaskRepository,
    services::{
        AssignmentCollaborators, AssignmentSetService, ChecklistSequencerService,
        DependencyGraphService, MembershipAccessGate, TaskRelationError,
    },
};

type Gate = MembershipAccessGate<InMemoryTaskRepository>;

/// Dependency service used by the BDD world.
pub type TestGraph =
    DependencyGraphService<InMemoryTaskRepository, Gate, InMemoryEventPublisher, DefaultClock>;

/// Assignment service used by the BDD world.
pub type TestAssignments = AssignmentSetService<
    InMemoryTaskRepository,
    Gate,
    InMemoryUserDirectory,
    InMemoryEventPublisher,
    InMemoryAssignmentNotifier,
    DefaultClock,
>;

/// Checklist service used by the BDD world.
pub type TestChecklist =
    ChecklistSequencerService<InMemoryTaskRepository, Gate, InMemoryEventPublisher, DefaultClock>;

/// Scenario world for task relationship behaviour tests.
pub struct TaskRelationshipWorld {
    pub repository: Arc<InMemoryTaskRepository>,
    pub users: Arc<InMemoryUserDirectory>,
    pub graph: TestGraph,
    pub assignments: TestAssignments,
    pub checklist: TestChecklist,
    pub project_id: ProjectId,
    pub owner: UserId,
    pub outsider: UserId,
    pub tasks: HashMap<String, Task>,
    pub people: HashMap<String, UserId>,
    pub last_result: Option<Result<(), TaskRelationError>>,
}

impl TaskRelationshipWorld {
    /// Creates a world with one project owned by a fresh workspace owner.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory adapters can not be seeded.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let publisher = Arc::new(InMemoryEventPublisher::new());
        let gate = Arc::new(MembershipAccessGate::new(Arc::clone(&repository)));
        let clock = Arc::new(DefaultClock);
        let project_id = ProjectId::new();
        let owner = UserId::new();
        let outsider = UserId::new();

        repository
            .register_project(ProjectAccess::new(project_id, WorkspaceId::new(), owner))
            .expect("project registration should succeed");
        users
            .register(owner)
            .expect("user registration should succeed");

        Self {
            graph: DependencyGraphService::new(
                Arc::clone(&repository),
                Arc::clone(&gate),
                Arc::clone(&publisher),
                Arc::clone(&clock),
            ),
            assignments: AssignmentSetService::new(
                Arc::clone(&repository),
                AssignmentCollaborators {
                    gate: Arc::clone(&gate),
                    users: Arc::clone(&users),
                    publisher: Arc::clone(&publisher),
                    notifier: Arc::new(InMemoryAssignmentNotifier::new()),
                },
                Arc::clone(&clock),
            ),
            checklist: ChecklistSequencerService::new(
                Arc::clone(&repository),
                gate,
                publisher,
                clock,
            ),
            repository,
            users,
            project_id,
            owner,
            outsider,
            tasks: HashMap::new(),
            people: HashMap::new(),
            last_result: None,
        }
    }

    /// Returns the task called `title`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error when the task can not be created or stored.
    pub fn task(&mut self, title: &str) -> Result<TaskId, eyre::Report> {
        if let Some(existing) = self.tasks.get(title) {
            return Ok(existing.id());
        }
        let task = Task::new(self.project_id, title, self.owner, &DefaultClock)?;
        run_async(self.repository.store_task(&task))?;
        let id = task.id();
        self.tasks.insert(title.to_owned(), task);
        Ok(id)
    }

    /// Returns the registered user called `name`, registering them on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns an error when the user directory rejects the registration.
    pub fn person(&mut self, name: &str) -> Result<UserId, eyre::Report> {
        if let Some(existing) = self.people.get(name) {
            return Ok(*existing);
        }
        let user_id = UserId::new();
        self.users.register(user_id)?;
        self.people.insert(name.to_owned(), user_id);
        Ok(user_id)
    }

    /// Records the outcome of the step under test.
    pub fn record<T>(&mut self, result: Result<T, TaskRelationError>) {
        self.last_result = Some(result.map(|_| ()));
    }
}

impl Default for TaskRelationshipWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskRelationshipWorld {
    TaskRelationshipWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Splits a comma-separated step argument into trimmed entries.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}
