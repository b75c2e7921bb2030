//! Dependency graph operations.
//!
//! Edges point from a task to the task it depends on. The graph is kept
//! acyclic, free of self-loops, and confined to a single project.

use super::{
    TaskRelationConfig,
    broadcast::ChangeBroadcaster,
    error::{ForbiddenReason, MissingEntity, TaskRelationError, TaskRelationResult},
};
use crate::task::{
    domain::{
        DependencyId, DependencyType, DependencyView, Page, PageRequest, TaskChange,
        TaskDependency, TaskId, UserId,
    },
    ports::{AccessGate, TaskEventPublisher, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Request payload for creating a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddDependencyRequest {
    /// Dependent task.
    pub task_id: TaskId,
    /// Task depended upon.
    pub depends_on_task_id: TaskId,
    /// Relationship label.
    pub dependency_type: DependencyType,
}

impl AddDependencyRequest {
    /// Creates a request for the edge `task_id -> depends_on_task_id`.
    #[must_use]
    pub const fn new(
        task_id: TaskId,
        depends_on_task_id: TaskId,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            task_id,
            depends_on_task_id,
            dependency_type,
        }
    }
}

/// Maintains the per-project task dependency DAG.
#[derive(Clone)]
pub struct DependencyGraphService<R, G, P, C>
where
    R: TaskRepository,
    G: AccessGate,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    gate: Arc<G>,
    broadcaster: ChangeBroadcaster<R, P, C>,
    clock: Arc<C>,
    config: TaskRelationConfig,
}

impl<R, G, P, C> DependencyGraphService<R, G, P, C>
where
    R: TaskRepository,
    G: AccessGate,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a dependency service with default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, gate: Arc<G>, publisher: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            broadcaster: ChangeBroadcaster::new(
                Arc::clone(&repository),
                publisher,
                Arc::clone(&clock),
            ),
            repository,
            gate,
            clock,
            config: TaskRelationConfig::default(),
        }
    }

    /// Replaces the listing configuration.
    #[must_use]
    pub const fn with_config(mut self, config: TaskRelationConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds the edge `task_id -> depends_on_task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] when either task is missing and
    /// [`TaskRelationError::Forbidden`] when the actor may not access the task,
    /// the edge is a self-loop, crosses projects, already exists, or would
    /// close a cycle.
    pub async fn add_dependency(
        &self,
        request: AddDependencyRequest,
        actor_id: UserId,
    ) -> TaskRelationResult<DependencyView> {
        let AddDependencyRequest {
            task_id,
            depends_on_task_id,
            dependency_type,
        } = request;
        let authorized = self.gate.authorize(task_id, actor_id).await?;

        if task_id == depends_on_task_id {
            return Err(TaskRelationError::Forbidden(
                ForbiddenReason::SelfDependency(task_id),
            ));
        }

        let target = self
            .repository
            .find_task(depends_on_task_id)
            .await?
            .ok_or(TaskRelationError::NotFound(MissingEntity::Task(
                depends_on_task_id,
            )))?;
        if target.project_id() != authorized.task.project_id() {
            return Err(TaskRelationError::Forbidden(
                ForbiddenReason::CrossProjectDependency {
                    task_project: authorized.task.project_id(),
                    target_project: target.project_id(),
                },
            ));
        }

        if self
            .repository
            .dependency_exists(task_id, depends_on_task_id)
            .await?
        {
            return Err(duplicate_dependency(task_id, depends_on_task_id));
        }

        if self.would_create_cycle(task_id, depends_on_task_id).await? {
            return Err(TaskRelationError::Forbidden(
                ForbiddenReason::DependencyCycle {
                    task_id,
                    depends_on_task_id,
                },
            ));
        }

        let dependency =
            TaskDependency::new(task_id, depends_on_task_id, dependency_type, &*self.clock);
        self.repository
            .insert_dependency(&dependency)
            .await
            .map_err(|err| match err {
                TaskRepositoryError::DuplicateDependency {
                    task_id: source,
                    depends_on_task_id: target_id,
                } => duplicate_dependency(source, target_id),
                other => TaskRelationError::Repository(other),
            })?;
        tracing::info!(
            %task_id,
            %depends_on_task_id,
            dependency_id = %dependency.id(),
            %actor_id,
            "dependency added"
        );

        self.broadcaster
            .task_changed(
                &authorized,
                actor_id,
                TaskChange::DependencyAdded {
                    dependency_id: dependency.id(),
                },
            )
            .await;

        Ok(DependencyView {
            dependency,
            related_task: target.summary(),
        })
    }

    /// Removes a dependency edge owned by `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] when the task or edge is
    /// missing, or the edge starts at a different task, and
    /// [`TaskRelationError::Forbidden`] when the actor may not access the task.
    pub async fn remove_dependency(
        &self,
        task_id: TaskId,
        dependency_id: DependencyId,
        actor_id: UserId,
    ) -> TaskRelationResult<()> {
        let authorized = self.gate.authorize(task_id, actor_id).await?;

        let belongs_to_task = self
            .repository
            .find_dependency(dependency_id)
            .await?
            .is_some_and(|dependency| dependency.task_id() == task_id);
        if !belongs_to_task {
            return Err(TaskRelationError::NotFound(MissingEntity::Dependency(
                dependency_id,
            )));
        }

        self.repository
            .delete_dependency(dependency_id)
            .await
            .map_err(|err| match err {
                TaskRepositoryError::DependencyNotFound(id) => {
                    TaskRelationError::NotFound(MissingEntity::Dependency(id))
                }
                other => TaskRelationError::Repository(other),
            })?;
        tracing::info!(%task_id, %dependency_id, %actor_id, "dependency removed");

        self.broadcaster
            .task_changed(
                &authorized,
                actor_id,
                TaskChange::DependencyRemoved { dependency_id },
            )
            .await;
        Ok(())
    }

    /// Lists the tasks `task_id` depends on, newest edge first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] or
    /// [`TaskRelationError::Forbidden`] from authorization, and repository
    /// errors.
    pub async fn list_dependencies(
        &self,
        task_id: TaskId,
        actor_id: UserId,
        page: Option<PageRequest>,
    ) -> TaskRelationResult<Page<DependencyView>> {
        self.gate.authorize(task_id, actor_id).await?;
        let edges = self
            .repository
            .list_dependencies(task_id, self.config.resolve_page(page))
            .await?;
        self.enrich(edges, TaskDependency::depends_on_task_id).await
    }

    /// Lists the tasks that depend on `task_id`, newest edge first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] or
    /// [`TaskRelationError::Forbidden`] from authorization, and repository
    /// errors.
    pub async fn list_dependents(
        &self,
        task_id: TaskId,
        actor_id: UserId,
        page: Option<PageRequest>,
    ) -> TaskRelationResult<Page<DependencyView>> {
        self.gate.authorize(task_id, actor_id).await?;
        let edges = self
            .repository
            .list_dependents(task_id, self.config.resolve_page(page))
            .await?;
        self.enrich(edges, TaskDependency::task_id).await
    }

    /// Breadth-first search from `depends_on_task_id` along outgoing edges.
    ///
    /// Reaching `task_id` means the new edge would close a cycle. The visited
    /// set keeps diamond-shaped graphs from being walked more than once.
    async fn would_create_cycle(
        &self,
        task_id: TaskId,
        depends_on_task_id: TaskId,
    ) -> TaskRelationResult<bool> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([depends_on_task_id]);

        while let Some(current) = queue.pop_front() {
            if current == task_id {
                tracing::debug!(%task_id, %depends_on_task_id, visited = visited.len(), "cycle found");
                return Ok(true);
            }
            if !visited.insert(current) {
                continue;
            }
            let targets = self.repository.dependency_targets(current).await?;
            queue.extend(targets.into_iter().filter(|next| !visited.contains(next)));
        }

        tracing::debug!(%task_id, %depends_on_task_id, visited = visited.len(), "no cycle");
        Ok(false)
    }

    async fn enrich(
        &self,
        edges: Page<TaskDependency>,
        related: fn(&TaskDependency) -> TaskId,
    ) -> TaskRelationResult<Page<DependencyView>> {
        let mut views = Vec::with_capacity(edges.items.len());
        for dependency in &edges.items {
            let related_id = related(dependency);
            let task = self
                .repository
                .find_task(related_id)
                .await?
                .ok_or(TaskRepositoryError::TaskNotFound(related_id))?;
            views.push(DependencyView {
                dependency: dependency.clone(),
                related_task: task.summary(),
            });
        }
        Ok(Page {
            items: views,
            page: edges.page,
            limit: edges.limit,
            total: edges.total,
        })
    }
}

const fn duplicate_dependency(task_id: TaskId, depends_on_task_id: TaskId) -> TaskRelationError {
    TaskRelationError::Forbidden(ForbiddenReason::DuplicateDependency {
        task_id,
        depends_on_task_id,
    })
}
