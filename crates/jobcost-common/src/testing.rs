//! Test helpers: capture tracing events emitted while a closure runs
//!
//! ```ignore
//! let (price, logs) = capture_logs(|| catalog.worker_price("eu-central-1", "G.1X"));
//! assert!(logs.contains(Level::WARN, "default price"));
//! ```

use parking_lot::Mutex;
use std::fmt::{self, Write};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One recorded event
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    /// Remaining fields rendered as `name=value ` pairs
    pub fields: String,
}

impl CapturedEvent {
    fn mentions(&self, needle: &str) -> bool {
        self.message.contains(needle) || self.fields.contains(needle)
    }
}

/// Events recorded by [`capture_logs`]
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedLogs {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().clone()
    }

    /// Events at exactly `level`
    pub fn at(&self, level: Level) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .iter()
            .filter(|event| event.level == level)
            .cloned()
            .collect()
    }

    /// Whether an event at `level` mentions `needle` in its message or fields
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.0
            .lock()
            .iter()
            .any(|event| event.level == level && event.mentions(needle))
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        self.0.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: String,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, "{}={:?} ", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, "{}={} ", field.name(), value);
        }
    }
}

/// Run `f` under a thread-local subscriber and return what it logged
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(logs.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_level_message_and_fields() {
        let ((), logs) = capture_logs(|| {
            tracing::warn!(region = "eu-central-1", price = 0.44, "Using default price");
            tracing::info!("Not a warning");
        });

        assert_eq!(logs.events().len(), 2);
        let warnings = logs.at(Level::WARN);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "Using default price");
        assert!(logs.contains(Level::WARN, "region=eu-central-1"));
        assert!(logs.contains(Level::WARN, "price=0.44"));
        assert!(!logs.contains(Level::WARN, "Not a warning"));
    }
}
