use crate::assets::source::SourceImageRef;
use crate::scene::config::WatermarkConfig;

/// Everything needed to render, captured at one revision of the store.
#[derive(Clone, Debug, PartialEq)]
pub struct WatermarkSnapshot {
    /// Watermark parameters.
    pub config: WatermarkConfig,
    /// The uploaded image, if any.
    pub source: Option<SourceImageRef>,
    /// Store revision that produced this snapshot. Strictly increases with every mutation.
    pub revision: u64,
}

/// Subscriber notified after every store mutation.
pub trait SnapshotObserver {
    /// Called with the full current snapshot right after a field changed.
    fn on_change(&mut self, snapshot: &WatermarkSnapshot);
}

impl<F> SnapshotObserver for F
where
    F: FnMut(&WatermarkSnapshot),
{
    fn on_change(&mut self, snapshot: &WatermarkSnapshot) {
        self(snapshot)
    }
}

/// Observable holder of the current watermark parameters and source image.
///
/// Each setter replaces exactly one field, bumps the revision and then notifies the observer with
/// a fresh snapshot of *all* fields. Setters never fail and never validate; range handling is the
/// compositor's job.
#[derive(Debug)]
pub struct ConfigStore<O> {
    config: WatermarkConfig,
    source: Option<SourceImageRef>,
    revision: u64,
    observer: O,
}

impl<O: SnapshotObserver> ConfigStore<O> {
    /// Store with default parameters and no image. The observer is not notified.
    pub fn new(observer: O) -> Self {
        Self::with_config(WatermarkConfig::default(), observer)
    }

    /// Store seeded with `config`. The observer is not notified.
    pub fn with_config(config: WatermarkConfig, observer: O) -> Self {
        Self {
            config,
            source: None,
            revision: 0,
            observer,
        }
    }

    /// Current snapshot of every field.
    pub fn snapshot(&self) -> WatermarkSnapshot {
        WatermarkSnapshot {
            config: self.config.clone(),
            source: self.source.clone(),
            revision: self.revision,
        }
    }

    /// Current parameters.
    pub fn config(&self) -> &WatermarkConfig {
        &self.config
    }

    /// Current source image handle.
    pub fn source(&self) -> Option<&SourceImageRef> {
        self.source.as_ref()
    }

    /// Revision of the latest mutation (0 before any).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the watermark text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.config.text = text.into();
        self.commit();
    }

    /// Replace the vertical anchor (percent of height).
    pub fn set_top(&mut self, top: f64) {
        self.config.top = top;
        self.commit();
    }

    /// Replace the horizontal anchor (percent of width).
    pub fn set_left(&mut self, left: f64) {
        self.config.left = left;
        self.commit();
    }

    /// Replace the fill opacity.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.config.opacity = opacity;
        self.commit();
    }

    /// Replace the font size (pixels).
    pub fn set_font_size(&mut self, font_size: f32) {
        self.config.font_size = font_size;
        self.commit();
    }

    /// Toggle rotation about the anchor.
    pub fn set_rotated(&mut self, rotated: bool) {
        self.config.rotated = rotated;
        self.commit();
    }

    /// Replace the uploaded image.
    pub fn set_source_image(&mut self, source: SourceImageRef) {
        self.source = Some(source);
        self.commit();
    }

    /// Forget the uploaded image.
    pub fn clear_source_image(&mut self) {
        self.source = None;
        self.commit();
    }

    /// Replace every parameter at once with a single notification.
    pub fn replace_config(&mut self, config: WatermarkConfig) {
        self.config = config;
        self.commit();
    }

    /// Borrow the observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutably borrow the observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consume the store, returning its observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    fn commit(&mut self) {
        self.revision += 1;
        let snapshot = self.snapshot();
        tracing::trace!(revision = snapshot.revision, "watermark config changed");
        self.observer.on_change(&snapshot);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/store.rs"]
mod tests;
