/// The adapter registry under concurrent readers and writers
use lendmetrics::config::MetricsConfig;
use lendmetrics::errors::MetricsResult;
use lendmetrics::metrics::{ AdapterRegistry, NormalizedFields, ProtocolAdapter, RawFields };
use std::sync::Arc;
use std::thread;

struct Tagged(String);

impl ProtocolAdapter for Tagged {
    fn protocol_id(&self) -> &str {
        &self.0
    }

    fn field_map(&self, _raw_fields: &RawFields) -> MetricsResult<NormalizedFields> {
        Ok(NormalizedFields::new())
    }
}

#[test]
fn test_resolve_while_registering() {
    let registry = Arc::new(AdapterRegistry::with_builtin_adapters(&MetricsConfig::default()));

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..500 {
                    let adapter = registry.resolve("aave_v3").expect("builtin stays registered");
                    assert_eq!(adapter.protocol_id(), "aave_v3");
                }
            })
        })
        .collect();

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..50 {
                    let id = format!("fork_{}_{}", w, i);
                    registry.register(&id, Arc::new(Tagged(id.clone())));
                }
            })
        })
        .collect();

    for handle in readers.into_iter().chain(writers) {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 3 + 4 * 50);
    assert_eq!(registry.resolve("FORK_3_49").unwrap().protocol_id(), "fork_3_49");
}

#[test]
fn test_concurrent_overrides_leave_one_winner() {
    let registry = Arc::new(AdapterRegistry::new());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry.register("contested", Arc::new(Tagged(format!("writer_{}", i))))
            })
        })
        .collect();

    let replaced = handles
        .into_iter()
        .filter_map(|h| h.join().unwrap())
        .count();

    // Every registration but the first replaced someone
    assert_eq!(replaced, 15);
    assert_eq!(registry.len(), 1);
    assert!(registry.resolve("contested").unwrap().protocol_id().starts_with("writer_"));
}
