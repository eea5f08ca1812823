//! Identity and cancellation for spawned command tasks.
//!
//! Each spawn of a command gets a fresh [`TaskId`]: the command's `TypeId` plus a
//! monotonically increasing generation. The context keeps the [`TaskHandle`] of the
//! newest task per command type; updates coming from any other task are stale.

use std::any::TypeId;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    type_id: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(type_id: TypeId, generation: u64) -> Self {
        Self {
            type_id,
            generation,
        }
    }

    /// `TypeId` of the command that spawned the task.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The newest task of a command type together with its cancellation token.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Request cancellation. The wrapper future stops polling the command at its
    /// next await point.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// `true` while `id` is this handle's task and it has not been cancelled.
    pub fn accepts(&self, id: TaskId) -> bool {
        self.id == id && !self.is_cancelled()
    }
}
