//! Registry events are recorded under the registry's span.

use std::fmt;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{info_span, Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;
use uidvault_registry::{Registry, StoreConfig};

/// An event message together with the names of its enclosing spans,
/// innermost first.
#[derive(Debug, Clone)]
struct Captured {
    message: String,
    spans: Vec<&'static str>,
}

#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureLayer {
    fn events(&self) -> Vec<Captured> {
        self.events.lock().unwrap().clone()
    }

    fn spans_of(&self, message: &str) -> Vec<&'static str> {
        self.events()
            .into_iter()
            .find(|e| e.message == message)
            .map(|e| e.spans)
            .unwrap_or_else(|| panic!("no '{message}' event in {:?}", self.events()))
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let spans = ctx
            .event_scope(event)
            .map(|scope| scope.map(|span| span.name()).collect())
            .unwrap_or_default();

        self.events.lock().unwrap().push(Captured {
            message: visitor.0,
            spans,
        });
    }
}

fn with_capture<T>(f: impl FnOnce() -> T) -> (CaptureLayer, T) {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    (layer, out)
}

#[test]
fn test_events_recorded_under_default_span() {
    let dir = TempDir::new().unwrap();
    let (capture, id) = with_capture(|| {
        let registry = Registry::open(StoreConfig::new(dir.path().join("uids.db"))).unwrap();
        registry.generate_random(Some("batch")).unwrap()
    });

    assert!(!id.is_empty());
    assert_eq!(capture.spans_of("Generated identifier"), vec!["registry"]);
}

#[test]
fn test_events_recorded_under_supplied_span() {
    let dir = TempDir::new().unwrap();
    let (capture, _) = with_capture(|| {
        let registry = Registry::open(StoreConfig::new(dir.path().join("uids.db")))
            .unwrap()
            .with_span(info_span!("issuer", tenant = "acme"));
        registry.generate_timestamp_based(Some("AB1"), None).unwrap();
        let _ = registry.generate_random(Some(&"c".repeat(51)));
    });

    assert_eq!(capture.spans_of("Generated identifier"), vec!["issuer"]);
    assert_eq!(capture.spans_of("Input validation failed"), vec!["issuer"]);
}
