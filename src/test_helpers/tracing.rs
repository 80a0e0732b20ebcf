//! Log capture for assertions on session, registry and reaper events.
//!
//! Events are collected by a [`tracing_subscriber`] layer installed for the
//! duration of one closure, so parallel tests never see each other's output.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{
    Event,
    Level,
    Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Registry, layer::Context, prelude::*};

/// One captured log event.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    level: Level,
    message: Option<String>,
    fields: HashMap<&'static str, String>,
}

impl RecordedEvent {
    /// Event level.
    #[must_use]
    pub const fn level(&self) -> Level { self.level }

    /// Formatted value of field `name`; `%` and `?` fields appear unquoted.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> { self.fields.get(name).map(String::as_str) }

    /// Log message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> { self.message.as_deref() }
}

impl Visit for RecordedEvent {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.fields.insert(field.name(), text);
        }
    }
}

#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorded = RecordedEvent {
            level: *event.metadata().level(),
            message: None,
            fields: HashMap::new(),
        };
        event.record(&mut recorded);
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded);
    }
}

/// Run `f` and return every event it logged, in order.
pub fn capture_events<T>(f: impl FnOnce() -> T) -> (T, Vec<RecordedEvent>) {
    let layer = CaptureLayer::default();
    let subscriber = Registry::default().with(layer.clone());
    let output = tracing::subscriber::with_default(subscriber, f);
    let events = std::mem::take(&mut *layer.events.lock().unwrap_or_else(PoisonError::into_inner));
    (output, events)
}

/// First event at `level` whose message contains `needle`.
#[must_use]
pub fn find_event<'a>(
    events: &'a [RecordedEvent],
    level: Level,
    needle: &str,
) -> Option<&'a RecordedEvent> {
    events
        .iter()
        .find(|event| event.level == level && event.message().is_some_and(|m| m.contains(needle)))
}
