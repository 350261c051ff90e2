use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tracing::warn;

use crate::utils::TaskGuard;

const BROADCAST_CAPACITY: usize = 128;

/// Receives every value published by a [`Property`] after the subscription was made.
pub struct PropertySubscriber<T: Clone> {
    receiver: broadcast::Receiver<T>,
    name: String,
}

// PropertySubscriber intentionally does not implement Clone.
// To get multiple subscribers, call Property::subscribe() multiple times.

impl<T: Clone> PropertySubscriber<T> {
    /// Next published value, or `None` once every handle to the property is gone.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            match self.receiver.recv().await {
                Ok(value) => return Some(value),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(property = %self.name, skipped, "Subscriber lagged behind");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn try_next(&mut self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(value) => return Some(value),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

/// Observable value cell.
///
/// Reads are synchronous snapshots. Every write is delivered to subscribers in
/// the order it was applied.
pub struct Property<T: Clone + Send + Sync> {
    watch_sender: Arc<watch::Sender<T>>,
    broadcast_sender: broadcast::Sender<T>,
    name: String,
}

impl<T: Clone + Send + Sync> Property<T> {
    pub fn new(initial_value: T, name: impl Into<String>) -> Self {
        let (watch_sender, _) = watch::channel(initial_value);
        let (broadcast_sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            watch_sender: Arc::new(watch_sender),
            broadcast_sender,
            name: name.into(),
        }
    }

    pub fn get(&self) -> T {
        self.watch_sender.borrow().clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.watch_sender.borrow())
    }

    pub fn set(&self, new_value: T) {
        self.update(|value| *value = new_value);
    }

    /// Mutate in place and publish the result.
    ///
    /// The broadcast happens while the value is still locked, so concurrent
    /// writers are observed by subscribers in the same order they were applied.
    pub fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut T),
    {
        let broadcast_sender = &self.broadcast_sender;
        self.watch_sender.send_modify(|value| {
            updater(value);
            let _ = broadcast_sender.send(value.clone());
        });
    }

    /// Like [`Property::update`], but nothing is published when `updater` returns false.
    ///
    /// The decision is made under the same lock as the write.
    pub fn update_if<F>(&self, updater: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let broadcast_sender = &self.broadcast_sender;
        self.watch_sender.send_if_modified(|value| {
            if !updater(value) {
                return false;
            }
            let _ = broadcast_sender.send(value.clone());
            true
        })
    }

    pub fn subscribe(&self) -> PropertySubscriber<T> {
        PropertySubscriber {
            receiver: self.broadcast_sender.subscribe(),
            name: self.name.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Debug method to show the number of active subscribers
    pub fn debug_subscribers(&self) -> usize {
        self.broadcast_sender.receiver_count()
    }
}

impl<T: Clone + Send + Sync + PartialEq> Property<T> {
    /// Publish only when the value differs from the current one. Returns whether it did.
    pub fn set_if_changed(&self, new_value: T) -> bool {
        self.update_if(|value| {
            if *value == new_value {
                return false;
            }
            *value = new_value;
            true
        })
    }
}

impl<T: Clone + Send + Sync> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            watch_sender: self.watch_sender.clone(),
            broadcast_sender: self.broadcast_sender.clone(),
            name: self.name.clone(),
        }
    }
}

impl<T: Clone + Send + Sync> Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Property({})", self.name)
    }
}

/// A property fed by background tasks. Dropping it stops the tasks,
/// including those of any upstream operators it was chained from.
pub struct ComputedProperty<T: Clone + Send + Sync> {
    property: Property<T>,
    tasks: Vec<TaskGuard>,
}

impl<T: Clone + Send + Sync + 'static> ComputedProperty<T> {
    pub fn get(&self) -> T {
        self.property.get()
    }

    pub fn subscribe(&self) -> PropertySubscriber<T> {
        self.property.subscribe()
    }

    pub fn name(&self) -> &str {
        self.property.name()
    }

    /// Debug method to check if the background tasks are still running
    pub fn debug_task_running(&self) -> bool {
        self.tasks.iter().all(TaskGuard::is_running)
    }

    fn chain<U: Clone + Send + Sync>(self, next: ComputedProperty<U>) -> ComputedProperty<U> {
        let mut tasks = self.tasks;
        tasks.extend(next.tasks);
        ComputedProperty {
            property: next.property,
            tasks,
        }
    }

    pub fn map<U, F>(self, f: F) -> ComputedProperty<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let next = self.property.map(f);
        self.chain(next)
    }

    pub fn throttle(self, interval: Duration) -> ComputedProperty<T> {
        let next = self.property.throttle(interval);
        self.chain(next)
    }
}

impl<T: Clone + Send + Sync + PartialEq + 'static> ComputedProperty<T> {
    pub fn distinct(self) -> ComputedProperty<T> {
        let next = self.property.distinct();
        self.chain(next)
    }
}

impl<T: Clone + Send + Sync> Debug for ComputedProperty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComputedProperty({})", self.property.name)
    }
}

// Property Operators
impl<T: Clone + Send + Sync + 'static> Property<T> {
    /// Apply `f` to the current value and to every later one.
    pub fn map<U, F>(&self, f: F) -> ComputedProperty<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        // Subscribe before reading so no write falls between the two
        let mut subscriber = self.subscribe();
        let mapped = Property::new(f(self.get()), format!("{}.map", self.name));
        let output = mapped.clone();

        let task = TaskGuard::spawn(async move {
            while let Some(value) = subscriber.next().await {
                output.set(f(value));
            }
        });

        ComputedProperty {
            property: mapped,
            tasks: vec![task],
        }
    }

    /// Rate-limit changes to at most one per `interval`, always delivering the latest value.
    ///
    /// A change arriving while idle goes out immediately and opens a window.
    /// Changes inside the window collapse into one trailing emission at its end.
    pub fn throttle(&self, interval: Duration) -> ComputedProperty<T> {
        let mut subscriber = self.subscribe();
        let throttled = Property::new(self.get(), format!("{}.throttled", self.name));
        let output = throttled.clone();

        let task = TaskGuard::spawn(async move {
            loop {
                let Some(leading) = subscriber.next().await else {
                    return;
                };
                output.set(leading);

                let mut deadline = Instant::now() + interval;
                let mut pending: Option<T> = None;
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline) => {
                            match pending.take() {
                                Some(value) => {
                                    output.set(value);
                                    deadline = Instant::now() + interval;
                                }
                                None => break,
                            }
                        }
                        next = subscriber.next() => match next {
                            Some(value) => pending = Some(value),
                            None => {
                                if let Some(value) = pending.take() {
                                    output.set(value);
                                }
                                return;
                            }
                        }
                    }
                }
            }
        });

        ComputedProperty {
            property: throttled,
            tasks: vec![task],
        }
    }
}

impl<T: Clone + Send + Sync + PartialEq + 'static> Property<T> {
    /// Suppress consecutive duplicates.
    pub fn distinct(&self) -> ComputedProperty<T> {
        let mut subscriber = self.subscribe();
        let distinct = Property::new(self.get(), format!("{}.distinct", self.name));
        let output = distinct.clone();

        let task = TaskGuard::spawn(async move {
            while let Some(value) = subscriber.next().await {
                output.set_if_changed(value);
            }
        });

        ComputedProperty {
            property: distinct,
            tasks: vec![task],
        }
    }
}
