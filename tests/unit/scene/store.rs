use super::*;

fn recording_store() -> ConfigStore<impl FnMut(&WatermarkSnapshot)> {
    ConfigStore::new(|_: &WatermarkSnapshot| {})
}

#[test]
fn construction_does_not_notify() {
    let mut seen = 0usize;
    let store = ConfigStore::new(|_: &WatermarkSnapshot| seen += 1);
    assert_eq!(store.revision(), 0);
    drop(store);
    assert_eq!(seen, 0);
}

#[test]
fn every_setter_notifies_with_the_full_current_snapshot() {
    let mut seen: Vec<WatermarkSnapshot> = Vec::new();
    {
        let mut store = ConfigStore::new(|s: &WatermarkSnapshot| seen.push(s.clone()));
        store.set_text("draft");
        store.set_top(40.0);
        store.set_left(60.0);
        store.set_opacity(0.8);
        store.set_font_size(72.0);
        store.set_rotated(false);
        store.set_source_image(SourceImageRef::from_bytes(vec![1u8, 2, 3]));
        store.clear_source_image();
    }

    assert_eq!(seen.len(), 8);
    let revisions: Vec<u64> = seen.iter().map(|s| s.revision).collect();
    assert_eq!(revisions, vec![1, 2, 3, 4, 5, 6, 7, 8]);

    // The top change still carries the text set before it.
    assert_eq!(seen[1].config.text, "draft");
    assert_eq!(seen[1].config.top, 40.0);

    let after_rotation = &seen[5].config;
    assert_eq!(
        after_rotation,
        &WatermarkConfig {
            text: "draft".to_string(),
            top: 40.0,
            left: 60.0,
            opacity: 0.8,
            font_size: 72.0,
            rotated: false,
        }
    );

    assert!(seen[5].source.is_none());
    assert_eq!(seen[6].source.as_ref().unwrap().bytes(), &[1, 2, 3]);
    assert!(seen[7].source.is_none());
}

#[test]
fn setters_do_not_validate() {
    let mut store = recording_store();
    store.set_opacity(4.0);
    store.set_font_size(-1.0);
    store.set_top(f64::NAN);
    assert_eq!(store.config().opacity, 4.0);
    assert_eq!(store.config().font_size, -1.0);
    assert!(store.config().top.is_nan());
    assert_eq!(store.revision(), 3);
}

#[test]
fn replace_config_notifies_once() {
    let mut count = 0usize;
    let mut store = ConfigStore::new(|_: &WatermarkSnapshot| count += 1);
    store.replace_config(WatermarkConfig::with_text("all at once"));
    assert_eq!(store.snapshot().config.text, "all at once");
    drop(store);
    assert_eq!(count, 1);
}

#[derive(Default)]
struct Counter {
    last_revision: u64,
}

impl SnapshotObserver for Counter {
    fn on_change(&mut self, snapshot: &WatermarkSnapshot) {
        self.last_revision = snapshot.revision;
    }
}

#[test]
fn owned_observer_is_reachable_through_the_store() {
    let mut store = ConfigStore::new(Counter::default());
    store.set_text("a");
    store.set_text("b");
    assert_eq!(store.observer().last_revision, 2);
    store.observer_mut().last_revision = 0;
    assert_eq!(store.into_observer().last_revision, 0);
}
