//! Diesel schema for task relationship persistence.

diesel::table! {
    /// Workspaces; only ownership is read here.
    workspaces (id) {
        /// Workspace identifier.
        id -> Uuid,
        /// Owning user.
        owner_id -> Uuid,
    }
}

diesel::table! {
    /// Projects; only workspace ownership is read here.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Owning workspace.
        workspace_id -> Uuid,
    }
}

diesel::table! {
    /// Project membership.
    project_members (project_id, user_id) {
        /// Project identifier.
        project_id -> Uuid,
        /// Member user.
        user_id -> Uuid,
    }
}

diesel::table! {
    /// Registered users.
    users (id) {
        /// User identifier.
        id -> Uuid,
    }
}

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Workflow status.
        #[max_length = 50]
        status -> Varchar,
        /// Urgency.
        #[max_length = 50]
        priority -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Optional effort estimate in hours.
        estimated_hours -> Nullable<Float8>,
        /// Optional parent task.
        parent_task_id -> Nullable<Uuid>,
        /// Creating user.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed dependency edges.
    task_dependencies (id) {
        /// Edge identifier.
        id -> Uuid,
        /// Dependent task.
        task_id -> Uuid,
        /// Task depended upon.
        depends_on_task_id -> Uuid,
        /// Relationship label.
        #[max_length = 50]
        dependency_type -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User assignments on tasks.
    task_assignments (id) {
        /// Assignment identifier.
        id -> Uuid,
        /// Task.
        task_id -> Uuid,
        /// Assigned user.
        user_id -> Uuid,
        /// Assignment timestamp.
        assigned_at -> Timestamptz,
        /// Primary assignee flag.
        is_primary -> Bool,
    }
}

diesel::table! {
    /// Ordered checklist items.
    checklist_items (id) {
        /// Item identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Item text.
        item_text -> Text,
        /// Completion flag.
        is_completed -> Bool,
        /// Dense zero-based position.
        order_index -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    workspaces,
    projects,
    project_members,
    users,
    tasks,
    task_dependencies,
    task_assignments,
    checklist_items,
);
