use crate::assets::decode::SourceImage;
use crate::assets::font::FontSource;
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, Canvas, Point, Vec2};
use crate::foundation::error::{WatermarkError, WatermarkResult};
use crate::render::blend::premul_layer_over_straight_in_place;
use crate::render::surface::CompositeSurface;
use crate::scene::config::{DrawParams, WATERMARK_ANGLE, WatermarkConfig};

/// Options for [`Compositor`].
#[derive(Clone, Debug, Default)]
pub struct CompositorOpts {
    pub(crate) font: FontSource,
}

impl CompositorOpts {
    /// Options whose font honours the `WATERMARK_FONT` environment override.
    pub fn from_env() -> Self {
        Self {
            font: FontSource::from_env(),
        }
    }

    /// Return options with a different font source.
    pub fn with_font(mut self, font: FontSource) -> Self {
        self.font = font;
        self
    }
}

#[derive(Clone)]
struct CachedFont {
    data: vello_cpu::peniko::FontData,
    description: String,
}

/// CPU compositor turning `(source image, watermark config)` into a [`CompositeSurface`].
///
/// Every call to [`Compositor::render`] starts from the untouched source, so the output is a pure
/// function of its inputs. The only state kept between calls is caches (resolved font, shaping
/// contexts, the rasterizer context).
pub struct Compositor {
    opts: CompositorOpts,
    text_engine: TextLayoutEngine,
    font: Option<Result<CachedFont, String>>,
    ctx: Option<((u16, u16), vello_cpu::RenderContext)>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(CompositorOpts::default())
    }
}

impl Compositor {
    /// Create a compositor. Fonts are resolved on the first render with visible text.
    pub fn new(opts: CompositorOpts) -> Self {
        Self {
            opts,
            text_engine: TextLayoutEngine::new(),
            font: None,
            ctx: None,
        }
    }

    /// Swap the font source; the next visible render resolves it again.
    pub fn set_font(&mut self, font: FontSource) {
        self.opts.font = font;
        self.text_engine = TextLayoutEngine::new();
        self.font = None;
    }

    /// Composite `config`'s watermark over `source`.
    ///
    /// Returns `Ok(None)` when no source image exists yet. The output always has the source's
    /// native dimensions.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(text_len = config.text.len(), rotated = config.rotated)
    )]
    pub fn render(
        &mut self,
        source: Option<&SourceImage>,
        config: &WatermarkConfig,
    ) -> WatermarkResult<Option<CompositeSurface>> {
        let Some(source) = source else {
            tracing::debug!("no source image yet, nothing to render");
            return Ok(None);
        };

        let canvas = source.canvas();
        let mut surface = CompositeSurface::blank(canvas);
        surface
            .rgba8_mut()
            .copy_from_slice(source.rgba8());

        let params = config.draw_params();
        if params.is_invisible() {
            return Ok(Some(surface));
        }

        let anchor = anchor_point(canvas, &params);
        let transform = watermark_transform(anchor, params.rotated);
        let layer = self.rasterize_text(canvas, &params, transform)?;
        premul_layer_over_straight_in_place(surface.rgba8_mut(), &layer, params.opacity)?;

        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            anchor_x = anchor.x,
            anchor_y = anchor.y,
            "rendered watermark"
        );
        Ok(Some(surface))
    }

    /// Rasterize opaque white text centered on the local origin of `transform` into a transparent
    /// premultiplied layer the size of `canvas`.
    fn rasterize_text(
        &mut self,
        canvas: Canvas,
        params: &DrawParams<'_>,
        transform: Affine,
    ) -> WatermarkResult<Vec<u8>> {
        let (width, height) = canvas_to_u16(canvas)?;
        let font = self.resolve_font()?;
        let layout = self
            .text_engine
            .layout_line(params.text, params.font_size, TextBrushRgba8::WHITE)?;

        let center = Vec2::new(
            -f64::from(layout.width()) / 2.0,
            -f64::from(layout.height()) / 2.0,
        );

        let mut ctx = match self.ctx.take() {
            Some((size, ctx)) if size == (width, height) => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();

        // Scoped transform: set for the glyph runs only, restored before flushing.
        ctx.set_transform(affine_to_cpu(transform * Affine::translate(center)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let mut x = run.offset();
                let baseline = run.baseline();
                let glyphs = run.glyphs().map(|g| {
                    let glyph = vello_cpu::Glyph {
                        id: g.id,
                        x: x + g.x,
                        y: baseline - g.y,
                    };
                    x += g.advance;
                    glyph
                });
                ctx.glyph_run(&font.data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(((width, height), ctx));

        Ok(pixmap.data_as_u8_slice().to_vec())
    }

    fn resolve_font(&mut self) -> WatermarkResult<CachedFont> {
        if let Some(cached) = &self.font {
            return cached.clone().map_err(WatermarkError::font);
        }

        let resolved = self.load_font();
        if let Err(e) = &resolved {
            tracing::warn!(error = %e, "watermark font unavailable");
        }
        self.font = Some(match &resolved {
            Ok(font) => Ok(font.clone()),
            Err(WatermarkError::Font(msg)) => Err(msg.clone()),
            Err(e) => Err(e.to_string()),
        });
        resolved
    }

    fn load_font(&mut self) -> WatermarkResult<CachedFont> {
        let loaded = self.opts.font.load()?;
        let family = self.text_engine.register_font(&loaded.bytes, loaded.index)?;
        tracing::debug!(source = %loaded.description, %family, "registered watermark font");

        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(loaded.bytes.as_ref().clone()),
            loaded.index,
        );
        Ok(CachedFont {
            data,
            description: loaded.description,
        })
    }

    /// Human-readable name of the resolved font, once one has been resolved.
    pub fn font_description(&self) -> Option<&str> {
        match &self.font {
            Some(Ok(f)) => Some(f.description.as_str()),
            _ => None,
        }
    }
}

/// Pixel-space anchor of the watermark: `left`/`top` percent of the canvas width/height.
pub fn anchor_point(canvas: Canvas, params: &DrawParams<'_>) -> Point {
    canvas.point_at_percent(params.left_pct, params.top_pct)
}

/// Local drawing transform for the watermark: origin moved to `anchor`, then optionally rotated
/// by [`WATERMARK_ANGLE`] about that same origin.
pub fn watermark_transform(anchor: Point, rotated: bool) -> Affine {
    let translate = Affine::translate(anchor.to_vec2());
    if rotated {
        translate * Affine::rotate(WATERMARK_ANGLE)
    } else {
        translate
    }
}

fn canvas_to_u16(canvas: Canvas) -> WatermarkResult<(u16, u16)> {
    let width: u16 = canvas
        .width
        .try_into()
        .map_err(|_| WatermarkError::render("image width exceeds 65535 px"))?;
    let height: u16 = canvas
        .height
        .try_into()
        .map_err(|_| WatermarkError::render("image height exceeds 65535 px"))?;
    Ok((width, height))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
