//! Explicit task registration table.
//!
//! The embedding application constructs the registry once at startup,
//! registering each task instance under its stable name. Registration
//! commits the task's default configuration; invalid defaults or duplicate
//! names are construction-time errors, surfaced before the engine runs.
//! After construction the table never changes.

use std::collections::HashMap;

use crate::error::SchedulerError;
use crate::settings::TaskConfig;
use crate::tasks::task::TaskRef;

/// A registered task with its committed default layer.
pub(crate) struct Registered {
    pub(crate) task: TaskRef,
    pub(crate) defaults: TaskConfig,
}

/// Name → task table, fixed for the process lifetime.
#[derive(Default)]
pub struct SyncRegistry {
    tasks: HashMap<String, Registered>,
}

impl SyncRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a task, committing its defaults.
    ///
    /// # Errors
    /// - [`SchedulerError::InvalidDefaults`] when the task's default edit
    ///   fails validation;
    /// - [`SchedulerError::DuplicateTask`] when the name is already taken.
    pub fn register(&mut self, task: TaskRef) -> Result<(), SchedulerError> {
        let name = task.name().to_string();
        let defaults = task
            .defaults()
            .apply_to(TaskConfig::default())
            .map_err(|source| SchedulerError::InvalidDefaults {
                name: name.clone(),
                source,
            })?;
        if self.tasks.contains_key(&name) {
            return Err(SchedulerError::DuplicateTask { name });
        }
        self.tasks.insert(name, Registered { task, defaults });
        Ok(())
    }

    /// True when the name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Sorted list of registered names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Registered> {
        self.tasks.get(name)
    }
}
