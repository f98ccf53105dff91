use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use deptask::{TaskContext, Work};

/// Something a recorded unit of work did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Finished(String),
}

/// Fixed error returned by [`Recorder::fail`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boom(pub &'static str);

impl fmt::Display for Boom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boom: {}", self.0)
    }
}

impl std::error::Error for Boom {}

/// Factory for units of work that record when they start and finish.
///
/// Every work created by the same recorder appends to one shared event log,
/// so tests can assert on ordering across tasks.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Task names in the order they started.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Started(name) => Some(name),
                Event::Finished(_) => None,
            })
            .collect()
    }

    /// Started task names, sorted.
    pub fn started_sorted(&self) -> Vec<String> {
        let mut names = self.started();
        names.sort();
        names
    }

    /// How many times `name` was invoked.
    pub fn count(&self, name: &str) -> usize {
        self.started().iter().filter(|n| n.as_str() == name).count()
    }

    /// Whether `dep` finished before `task` started. False if either event is
    /// missing.
    pub fn finished_before_started(&self, dep: &str, task: &str) -> bool {
        let events = self.events();
        let finished = events
            .iter()
            .position(|e| *e == Event::Finished(dep.to_string()));
        let started = events
            .iter()
            .position(|e| *e == Event::Started(task.to_string()));
        matches!((finished, started), (Some(f), Some(s)) if f < s)
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Work that succeeds immediately.
    pub fn ok(&self, name: &str) -> impl Work + use<> {
        self.sleep(name, Duration::ZERO)
    }

    /// Work that sleeps for `delay`, then succeeds.
    pub fn sleep(&self, name: &str, delay: Duration) -> impl Work + use<> {
        let recorder = self.clone();
        let name = name.to_string();
        move |_ctx: TaskContext| {
            let recorder = recorder.clone();
            let name = name.clone();
            async move {
                recorder.push(Event::Started(name.clone()));
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                recorder.push(Event::Finished(name));
                anyhow::Ok(())
            }
        }
    }

    /// Work that fails with `Boom(tag)`.
    pub fn fail(&self, name: &str, tag: &'static str) -> impl Work + use<> {
        let recorder = self.clone();
        let name = name.to_string();
        move |_ctx: TaskContext| {
            let recorder = recorder.clone();
            let name = name.clone();
            async move {
                recorder.push(Event::Started(name.clone()));
                recorder.push(Event::Finished(name));
                Err::<(), anyhow::Error>(anyhow::Error::new(Boom(tag)))
            }
        }
    }

    /// Work that sleeps for `delay`, then fails with `Boom(tag)`.
    pub fn fail_after(&self, name: &str, delay: Duration, tag: &'static str) -> impl Work + use<> {
        let recorder = self.clone();
        let name = name.to_string();
        move |_ctx: TaskContext| {
            let recorder = recorder.clone();
            let name = name.clone();
            async move {
                recorder.push(Event::Started(name.clone()));
                tokio::time::sleep(delay).await;
                recorder.push(Event::Finished(name));
                Err::<(), anyhow::Error>(anyhow::Error::new(Boom(tag)))
            }
        }
    }

    /// Work that blocks until its context is cancelled, then fails.
    pub fn until_cancelled(&self, name: &str) -> impl Work + use<> {
        let recorder = self.clone();
        let name = name.to_string();
        move |ctx: TaskContext| {
            let recorder = recorder.clone();
            let name = name.clone();
            async move {
                recorder.push(Event::Started(name.clone()));
                ctx.cancelled().await;
                recorder.push(Event::Finished(name.clone()));
                Err::<(), anyhow::Error>(anyhow::anyhow!("{name} observed cancellation"))
            }
        }
    }
}
