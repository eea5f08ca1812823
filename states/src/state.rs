use std::any::{Any, TypeId, type_name};
use std::fmt::Debug;

use flume::Sender;

use crate::TaskId;

/// A value stored once per type inside a [`StateCtx`](crate::StateCtx).
///
/// States are cloned into a [`CommandSnapshot`](crate::CommandSnapshot) whenever a
/// command is spawned, so they must be `Clone + Send`.
pub trait State: Any + Send + Clone + Debug {}

pub(crate) type ApplyFn = Box<dyn FnOnce(&mut dyn Any) + Send>;

pub(crate) enum UpdateKind {
    Replace(Box<dyn Any + Send>),
    Apply(ApplyFn),
}

/// An update waiting in the context channel until the next `sync_updates`.
pub(crate) struct PendingUpdate {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) kind: UpdateKind,
    pub(crate) origin: Option<TaskId>,
}

/// Cloneable handle for queueing state updates from outside the owning thread.
///
/// Updates are not visible until the context calls
/// [`StateCtx::sync_updates`](crate::StateCtx::sync_updates).
#[derive(Clone)]
pub struct Updater {
    send: Sender<PendingUpdate>,
}

impl Debug for Updater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater").finish_non_exhaustive()
    }
}

impl Updater {
    pub(crate) fn new(send: Sender<PendingUpdate>) -> Self {
        Self { send }
    }

    /// Replace the whole value of `T`.
    pub fn set<T: State>(&self, value: T) {
        self.push(PendingUpdate {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind: UpdateKind::Replace(Box::new(value)),
            origin: None,
        });
    }

    /// Mutate `T` in place once the update is applied.
    pub fn update<T: State>(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        self.push(PendingUpdate {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind: UpdateKind::Apply(apply_fn(f)),
            origin: None,
        });
    }

    fn push(&self, update: PendingUpdate) {
        if self.send.send(update).is_err() {
            log::debug!("state context dropped, update discarded");
        }
    }
}

/// Updater handed to a running command.
///
/// Every update is stamped with the task that produced it. The context drops the
/// update if that task has been superseded by a newer spawn of the same command or
/// was cancelled, so late responses never land on state that moved on.
#[derive(Clone, Debug)]
pub struct LatestOnlyUpdater {
    inner: Updater,
    task: TaskId,
}

impl LatestOnlyUpdater {
    pub(crate) fn new(inner: Updater, task: TaskId) -> Self {
        Self { inner, task }
    }

    pub fn task_id(&self) -> TaskId {
        self.task
    }

    pub fn set<T: State>(&self, value: T) {
        self.inner.push(PendingUpdate {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind: UpdateKind::Replace(Box::new(value)),
            origin: Some(self.task),
        });
    }

    pub fn update<T: State>(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        self.inner.push(PendingUpdate {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind: UpdateKind::Apply(apply_fn(f)),
            origin: Some(self.task),
        });
    }
}

fn apply_fn<T: State>(f: impl FnOnce(&mut T) + Send + 'static) -> ApplyFn {
    Box::new(move |any: &mut dyn Any| {
        if let Some(state) = any.downcast_mut::<T>() {
            f(state);
        }
    })
}
