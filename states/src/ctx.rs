use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;
use std::sync::Arc;

use flume::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::state::{PendingUpdate, UpdateKind};
use crate::{
    Command, CommandSnapshot, LatestOnlyUpdater, State, StateError, TaskHandle, TaskId, Updater,
};

type CloneFn = fn(&dyn Any) -> Option<Box<dyn Any + Send>>;
type Subscriber = Box<dyn FnMut(&dyn Any) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

struct Slot {
    value: Box<dyn Any + Send>,
    clone_fn: CloneFn,
    type_name: &'static str,
}

struct RegisteredCommand {
    command: Arc<dyn Command>,
    type_name: &'static str,
}

/// Owner of every state in one workflow session.
///
/// The context is created when the workflow starts and dropped when it ends; there
/// is no global instance. Synchronous callers mutate state through [`update`] and
/// [`set`]. Async work runs as [`Command`]s whose results come back through the
/// update channel and are applied, in arrival order, by [`sync_updates`].
///
/// [`update`]: StateCtx::update
/// [`set`]: StateCtx::set
/// [`sync_updates`]: StateCtx::sync_updates
pub struct StateCtx {
    states: BTreeMap<TypeId, Slot>,
    commands: BTreeMap<TypeId, RegisteredCommand>,
    queue: Vec<TypeId>,
    tasks: JoinSet<()>,
    latest: BTreeMap<TypeId, TaskHandle>,
    generation: u64,
    subscribers: BTreeMap<TypeId, Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: u64,
    send: Sender<PendingUpdate>,
    recv: Receiver<PendingUpdate>,
}

impl std::fmt::Debug for StateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCtx")
            .field(
                "states",
                &self.states.values().map(|s| s.type_name).collect::<Vec<_>>(),
            )
            .field(
                "commands",
                &self.commands.values().map(|c| c.type_name).collect::<Vec<_>>(),
            )
            .field("queued", &self.queue.len())
            .field("tasks", &self.tasks.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            states: BTreeMap::new(),
            commands: BTreeMap::new(),
            queue: Vec::new(),
            tasks: JoinSet::new(),
            latest: BTreeMap::new(),
            generation: 0,
            subscribers: BTreeMap::new(),
            next_subscription: 0,
            send,
            recv,
        }
    }

    /// Register `state`, replacing any previous value of the same type.
    pub fn add_state<T: State>(&mut self, state: T) {
        let clone_fn: CloneFn = |any| {
            any.downcast_ref::<T>()
                .map(|s| Box::new(s.clone()) as Box<dyn Any + Send>)
        };
        self.states.insert(
            TypeId::of::<T>(),
            Slot {
                value: Box::new(state),
                clone_fn,
                type_name: type_name::<T>(),
            },
        );
    }

    pub fn try_state<T: State>(&self) -> Result<&T, StateError> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.downcast_ref::<T>())
            .ok_or_else(|| StateError::state_not_registered(type_name::<T>()))
    }

    /// # Panics
    /// Panics if `T` was never registered with [`add_state`](Self::add_state).
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Direct mutable access. Subscribers are not notified; prefer [`update`](Self::update).
    ///
    /// # Panics
    /// Panics if `T` was never registered.
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        self.states
            .get_mut(&TypeId::of::<T>())
            .and_then(|slot| slot.value.downcast_mut::<T>())
            .unwrap_or_else(|| panic!("{}", StateError::state_not_registered(type_name::<T>())))
    }

    /// Mutate `T` in one step, then notify its subscribers.
    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T)) {
        let id = TypeId::of::<T>();
        let Some(state) = self
            .states
            .get_mut(&id)
            .and_then(|slot| slot.value.downcast_mut::<T>())
        else {
            log::error!("{}", StateError::state_not_registered(type_name::<T>()));
            return;
        };
        f(state);
        self.notify(id);
    }

    pub fn set<T: State>(&mut self, value: T) {
        self.update::<T>(|state| *state = value);
    }

    /// Call `callback` with the new value every time `T` changes.
    pub fn subscribe<T: State>(
        &mut self,
        mut callback: impl FnMut(&T) + Send + 'static,
    ) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        let subscriber: Subscriber = Box::new(move |any: &dyn Any| {
            if let Some(value) = any.downcast_ref::<T>() {
                callback(value);
            }
        });
        self.subscribers
            .entry(TypeId::of::<T>())
            .or_default()
            .push((id, subscriber));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut removed = false;
        for subscribers in self.subscribers.values_mut() {
            let before = subscribers.len();
            subscribers.retain(|(sid, _)| *sid != id);
            removed |= subscribers.len() != before;
        }
        removed
    }

    fn notify(&mut self, id: TypeId) {
        let (Some(slot), Some(subscribers)) = (self.states.get(&id), self.subscribers.get_mut(&id))
        else {
            return;
        };
        let value: &dyn Any = &*slot.value;
        for (_, callback) in subscribers.iter_mut() {
            callback(value);
        }
    }

    /// Plain updater for synchronous callers and tests. Its updates are never
    /// considered stale.
    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    pub fn snapshot(&self) -> CommandSnapshot {
        let mut snap = CommandSnapshot::new();
        for (id, slot) in &self.states {
            if let Some(cloned) = (slot.clone_fn)(&*slot.value) {
                snap.insert_cloned(*id, cloned);
            }
        }
        snap
    }

    pub fn record_command<C: Command>(&mut self, command: C) {
        self.commands.insert(
            TypeId::of::<C>(),
            RegisteredCommand {
                command: Arc::new(command),
                type_name: type_name::<C>(),
            },
        );
    }

    /// Queue `C` to be spawned on the next [`flush_commands`](Self::flush_commands).
    pub fn enqueue_command<C: Command>(&mut self) {
        let id = TypeId::of::<C>();
        if !self.commands.contains_key(&id) {
            log::error!("{}", StateError::command_not_registered(type_name::<C>()));
            return;
        }
        self.queue.push(id);
    }

    /// Spawn every queued command onto the task set.
    ///
    /// Spawning a command cancels the previous task of the same type, so only the
    /// newest task may write state. Must be called from within a Tokio runtime.
    pub fn flush_commands(&mut self) {
        let queued = std::mem::take(&mut self.queue);
        for id in queued {
            self.spawn_command(id);
        }
    }

    fn spawn_command(&mut self, id: TypeId) {
        let Some((command, name)) = self
            .commands
            .get(&id)
            .map(|r| (Arc::clone(&r.command), r.type_name))
        else {
            return;
        };

        if let Some(previous) = self.latest.get(&id) {
            previous.cancel();
        }

        self.generation += 1;
        let task_id = TaskId::new(id, self.generation);
        let token = CancellationToken::new();
        let updater = LatestOnlyUpdater::new(self.updater(), task_id);
        let future = command.run(self.snapshot(), updater, token.clone());

        log::debug!("spawning {name} (generation {})", self.generation);
        let cancelled = token.clone();
        self.tasks.spawn(async move {
            tokio::select! {
                () = cancelled.cancelled() => {}
                () = future => {}
            }
        });
        self.latest.insert(id, TaskHandle::new(task_id, token));
    }

    /// Drain the update channel and apply every update whose task is still current.
    pub fn sync_updates(&mut self) {
        while let Ok(update) = self.recv.try_recv() {
            self.apply(update);
        }
    }

    fn apply(&mut self, update: PendingUpdate) {
        if let Some(origin) = update.origin {
            let fresh = self
                .latest
                .get(&origin.type_id())
                .is_some_and(|handle| handle.accepts(origin));
            if !fresh {
                log::debug!(
                    "discarding stale update to {} from generation {}",
                    update.type_name,
                    origin.generation()
                );
                return;
            }
        }

        let Some(slot) = self.states.get_mut(&update.type_id) else {
            log::warn!("{}", StateError::state_not_registered(update.type_name));
            return;
        };
        match update.kind {
            UpdateKind::Replace(value) => slot.value = value,
            UpdateKind::Apply(f) => f(&mut *slot.value),
        }
        self.notify(update.type_id);
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn task_set_mut(&mut self) -> &mut JoinSet<()> {
        &mut self.tasks
    }

    /// Await every spawned task, syncing after each one finishes.
    pub async fn await_tasks(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined
                && e.is_panic()
            {
                log::error!("command task panicked: {e}");
            }
            self.sync_updates();
        }
        self.sync_updates();
    }

    /// Cancel the newest task of `C`. Returns `false` if none was running.
    pub fn cancel_command<C: Command>(&mut self) -> bool {
        match self.latest.get(&TypeId::of::<C>()) {
            Some(handle) if !handle.is_cancelled() => {
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for handle in self.latest.values() {
            handle.cancel();
        }
    }

    /// Cancel and await every task. Updates they still deliver are discarded.
    pub async fn shutdown(&mut self) {
        self.cancel_all();
        while self.tasks.join_next().await.is_some() {}
        self.sync_updates();
    }
}
