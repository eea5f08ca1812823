use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;

use crate::{State, StateError};

/// Cloned copies of every registered state, taken when a command is spawned.
///
/// Commands read their inputs from the snapshot instead of the live context, so
/// later edits by the user never race with an in-flight request.
#[derive(Default)]
pub struct CommandSnapshot {
    states: BTreeMap<TypeId, Box<dyn Any + Send>>,
}

impl CommandSnapshot {
    pub fn new() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }

    pub(crate) fn insert_cloned(&mut self, id: TypeId, value: Box<dyn Any + Send>) {
        self.states.insert(id, value);
    }

    pub fn try_state<T: State>(&self) -> Result<&T, StateError> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .ok_or_else(|| StateError::state_not_registered(type_name::<T>()))
    }

    /// # Panics
    /// Panics if `T` was not registered in the context the snapshot came from.
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>()
            .unwrap_or_else(|e| panic!("Snapshot is missing state: {e}"))
    }
}
