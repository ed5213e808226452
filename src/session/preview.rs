use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;

use crate::assets::decode::SourceImage;
use crate::assets::source::SourceImageRef;
use crate::encode::png::ExportArtifact;
use crate::foundation::error::{WatermarkError, WatermarkResult};
use crate::render::compositor::{Compositor, CompositorOpts};
use crate::render::surface::CompositeSurface;
use crate::scene::config::WatermarkConfig;
use crate::scene::store::{ConfigStore, SnapshotObserver, WatermarkSnapshot};

/// Options for [`PreviewSession`].
#[derive(Clone, Debug, Default)]
pub struct PreviewSessionOpts {
    /// Number of decode worker threads. `None` uses rayon defaults.
    pub decode_threads: Option<usize>,
    /// Options for the compositor owned by the session.
    pub compositor: CompositorOpts,
}

impl PreviewSessionOpts {
    /// Return options with a fixed decode worker count.
    pub fn with_decode_threads(mut self, threads: Option<usize>) -> Self {
        self.decode_threads = threads;
        self
    }

    /// Return options with different compositor options.
    pub fn with_compositor(mut self, compositor: CompositorOpts) -> Self {
        self.compositor = compositor;
        self
    }
}

/// What happened to one render request.
#[derive(Debug)]
pub enum RenderOutcome {
    /// The composite for `revision` is now the presented surface.
    Presented {
        /// Store revision that was rendered.
        revision: u64,
    },
    /// Work for `revision` finished after a newer request superseded it and was dropped.
    Stale {
        /// Superseded revision.
        revision: u64,
    },
    /// `revision` had no source image; the presented surface was left as is.
    NoImage {
        /// Revision without an image.
        revision: u64,
    },
    /// Decoding or rendering failed; the presented surface was left as is.
    Failed {
        /// Revision that failed.
        revision: u64,
        /// Cause.
        error: WatermarkError,
    },
}

impl RenderOutcome {
    /// Store revision this outcome belongs to.
    pub fn revision(&self) -> u64 {
        match self {
            Self::Presented { revision }
            | Self::Stale { revision }
            | Self::NoImage { revision }
            | Self::Failed { revision, .. } => *revision,
        }
    }
}

/// Result of [`PreviewSession::request`].
#[derive(Debug)]
pub enum RequestStatus {
    /// Handled synchronously.
    Settled(RenderOutcome),
    /// Waiting on an image decode; collect it with [`PreviewSession::poll`] or
    /// [`PreviewSession::wait_idle`].
    Pending,
}

struct DecodeDone {
    revision: u64,
    fingerprint: u64,
    result: WatermarkResult<SourceImage>,
}

/// Live-preview pipeline: the render subscriber of a [`ConfigStore`].
///
/// Decoding an upload runs on a worker pool; compositing runs on the caller's thread once the
/// decoded image is available. Only the newest requested snapshot is ever rendered after a decode
/// completes, and a render never replaces a surface presented for a newer revision.
pub struct PreviewSession {
    compositor: Compositor,
    pool: rayon::ThreadPool,
    tx: mpsc::Sender<DecodeDone>,
    rx: mpsc::Receiver<DecodeDone>,
    in_flight: Vec<u64>,
    decoded: Option<(u64, SourceImage)>,
    latest: Option<WatermarkSnapshot>,
    presented: Option<CompositeSurface>,
    presented_revision: Option<u64>,
    settled_revision: u64,
}

impl PreviewSession {
    /// Create a session with its own decode pool.
    pub fn new(opts: PreviewSessionOpts) -> WatermarkResult<Self> {
        let pool = build_thread_pool(opts.decode_threads)?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            compositor: Compositor::new(opts.compositor),
            pool,
            tx,
            rx,
            in_flight: Vec::new(),
            decoded: None,
            latest: None,
            presented: None,
            presented_revision: None,
            settled_revision: 0,
        })
    }

    /// Ask for `snapshot` to be rendered.
    ///
    /// With no source this is a no-op. With an already decoded source the composite is rendered
    /// before returning. Otherwise a decode is queued (unless one for the same bytes is already
    /// running) and the render happens when it completes.
    #[tracing::instrument(level = "debug", skip_all, fields(revision = snapshot.revision))]
    pub fn request(&mut self, snapshot: &WatermarkSnapshot) -> RequestStatus {
        if let Some(latest) = &self.latest
            && snapshot.revision < latest.revision
        {
            tracing::debug!(latest = latest.revision, "ignoring out-of-order request");
            return RequestStatus::Settled(RenderOutcome::Stale {
                revision: snapshot.revision,
            });
        }
        self.latest = Some(snapshot.clone());

        let Some(source) = &snapshot.source else {
            return RequestStatus::Settled(self.settle_no_image(snapshot.revision));
        };
        if let Some(image) = self.cached(source.fingerprint()) {
            return RequestStatus::Settled(self.present(
                snapshot.revision,
                &snapshot.config,
                &image,
            ));
        }
        if !self.in_flight.contains(&source.fingerprint()) {
            self.spawn_decode(snapshot.revision, source.clone());
        }
        RequestStatus::Pending
    }

    /// Apply every decode that has finished, without blocking.
    pub fn poll(&mut self) -> Vec<RenderOutcome> {
        let mut out = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            out.push(self.apply(done));
        }
        out
    }

    /// Block until no decode is in flight, applying each one as it finishes.
    pub fn wait_idle(&mut self) -> WatermarkResult<Vec<RenderOutcome>> {
        let mut out = self.poll();
        while !self.in_flight.is_empty() {
            let done = self
                .rx
                .recv()
                .map_err(|_| WatermarkError::render("decode workers disconnected"))?;
            out.push(self.apply(done));
        }
        Ok(out)
    }

    /// `true` when no decode is pending.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Surface currently on display, if any render has succeeded.
    pub fn presented(&self) -> Option<&CompositeSurface> {
        self.presented.as_ref()
    }

    /// Revision of the presented surface.
    pub fn presented_revision(&self) -> Option<u64> {
        self.presented_revision
    }

    /// Revision of the newest request seen.
    pub fn latest_revision(&self) -> Option<u64> {
        self.latest.as_ref().map(|s| s.revision)
    }

    /// Mutable access to the compositor, e.g. to swap fonts.
    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    /// Re-render the newest snapshot and encode it for download.
    ///
    /// Waits for pending decodes first, so the export always reflects the latest parameters.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn export(&mut self) -> WatermarkResult<ExportArtifact> {
        self.wait_idle()?;
        let snapshot = self.latest.clone().ok_or(WatermarkError::NoImage)?;
        let source = snapshot.source.as_ref().ok_or(WatermarkError::NoImage)?;

        let image = match self.cached(source.fingerprint()) {
            Some(image) => image,
            None => {
                let image = source.decode()?;
                self.decoded = Some((source.fingerprint(), image.clone()));
                image
            }
        };
        let surface = self
            .compositor
            .render(Some(&image), &snapshot.config)?
            .ok_or(WatermarkError::NoImage)?;
        let artifact = ExportArtifact::from_surface(&surface)?;

        self.mark_presented(snapshot.revision, surface);
        tracing::info!(
            file = %artifact.file_name,
            width = artifact.width,
            height = artifact.height,
            bytes = artifact.bytes.len(),
            "exported watermarked image"
        );
        Ok(artifact)
    }

    /// Encode the presented surface as is, without re-rendering.
    pub fn encode_presented(&self) -> WatermarkResult<ExportArtifact> {
        let surface = self.presented.as_ref().ok_or(WatermarkError::EmptySurface)?;
        ExportArtifact::from_surface(surface)
    }

    fn cached(&self, fingerprint: u64) -> Option<SourceImage> {
        self.decoded
            .as_ref()
            .filter(|(fp, _)| *fp == fingerprint)
            .map(|(_, image)| image.clone())
    }

    fn spawn_decode(&mut self, revision: u64, source: SourceImageRef) {
        let fingerprint = source.fingerprint();
        self.in_flight.push(fingerprint);
        let tx = self.tx.clone();
        tracing::debug!(revision, fingerprint, "queued source decode");
        self.pool.spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(|| source.decode()))
                .unwrap_or_else(|_| Err(WatermarkError::decode("image decoder panicked")));
            // The session may be gone; nothing to report to in that case.
            let _ = tx.send(DecodeDone {
                revision,
                fingerprint,
                result,
            });
        });
    }

    fn apply(&mut self, done: DecodeDone) -> RenderOutcome {
        if let Some(pos) = self.in_flight.iter().position(|fp| *fp == done.fingerprint) {
            self.in_flight.swap_remove(pos);
        }

        let wanted = self.latest.clone().filter(|s| {
            s.source.as_ref().map(SourceImageRef::fingerprint) == Some(done.fingerprint)
        });
        let Some(snapshot) = wanted else {
            tracing::debug!(revision = done.revision, "dropping superseded decode");
            return RenderOutcome::Stale {
                revision: done.revision,
            };
        };

        match done.result {
            Ok(image) => {
                self.decoded = Some((done.fingerprint, image.clone()));
                self.present(snapshot.revision, &snapshot.config, &image)
            }
            Err(error) => self.settle_failed(snapshot.revision, error),
        }
    }

    fn present(
        &mut self,
        revision: u64,
        config: &WatermarkConfig,
        image: &SourceImage,
    ) -> RenderOutcome {
        if revision < self.settled_revision {
            return RenderOutcome::Stale { revision };
        }
        match self.compositor.render(Some(image), config) {
            Ok(Some(surface)) => {
                self.mark_presented(revision, surface);
                RenderOutcome::Presented { revision }
            }
            Ok(None) => self.settle_no_image(revision),
            Err(error) => self.settle_failed(revision, error),
        }
    }

    fn mark_presented(&mut self, revision: u64, surface: CompositeSurface) {
        self.presented = Some(surface);
        self.presented_revision = Some(revision);
        self.settled_revision = self.settled_revision.max(revision);
    }

    fn settle_no_image(&mut self, revision: u64) -> RenderOutcome {
        tracing::debug!(revision, "no source image, preview unchanged");
        self.settled_revision = self.settled_revision.max(revision);
        RenderOutcome::NoImage { revision }
    }

    fn settle_failed(&mut self, revision: u64, error: WatermarkError) -> RenderOutcome {
        tracing::warn!(revision, %error, "watermark render failed, keeping previous composite");
        self.settled_revision = self.settled_revision.max(revision);
        RenderOutcome::Failed { revision, error }
    }
}

impl SnapshotObserver for PreviewSession {
    fn on_change(&mut self, snapshot: &WatermarkSnapshot) {
        // Outcomes are logged where they settle.
        let _ = self.request(snapshot);
    }
}

/// Configuration store wired to a live preview session.
pub type Watermarker = ConfigStore<PreviewSession>;

impl ConfigStore<PreviewSession> {
    /// Store with default parameters driving a fresh [`PreviewSession`].
    pub fn with_preview(opts: PreviewSessionOpts) -> WatermarkResult<Self> {
        Ok(Self::new(PreviewSession::new(opts)?))
    }

    /// The preview session.
    pub fn session(&self) -> &PreviewSession {
        self.observer()
    }

    /// Mutable access to the preview session.
    pub fn session_mut(&mut self) -> &mut PreviewSession {
        self.observer_mut()
    }

    /// Re-render the current parameters and encode them for download.
    pub fn export(&mut self) -> WatermarkResult<ExportArtifact> {
        self.session_mut().export()
    }
}

fn build_thread_pool(threads: Option<usize>) -> WatermarkResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(WatermarkError::validation(
            "decode_threads must be >= 1 when set",
        ));
    }

    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("watermark-decode-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        WatermarkError::validation(format!("failed to build decode thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
