//! Drawing surfaces for the overlay renderer

use crate::{OverlayError, OverlayResult};
use capture::{Capture, Point, Rect};
use cosmic_text::{
    Attrs, Buffer, Color as TextColor, Family, FontSystem, Metrics, Shaping, SwashCache,
};
use image::{Rgba, RgbaImage};
use tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, IntSize, LineCap, Paint, PathBuilder, Pattern,
    Pixmap, PixmapPaint, Rect as SkRect, SpreadMode, Stroke, StrokeDash, Transform,
};

/// Primitive operations the renderer needs from a host surface
pub trait Canvas {
    /// Frozen snapshot at the local origin
    fn draw_snapshot(&mut self, capture: &Capture);
    fn draw_image(&mut self, image: &RgbaImage, at: Point);
    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>);
    fn stroke_rect(&mut self, rect: Rect, color: Rgba<u8>);
    fn line(&mut self, from: Point, to: Point, color: Rgba<u8>, dotted: bool);
    fn text(&mut self, at: Point, text: &str, size: f32, color: Rgba<u8>);
    /// Nearest-neighbour enlargement of `source` into a circle inscribed in `dest`
    fn magnify(&mut self, capture: &Capture, source: Rect, dest: Rect, opacity: f32);
}

/// Recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Snapshot,
    Image { at: Point, width: u32, height: u32 },
    FillRect { rect: Rect, color: Rgba<u8> },
    StrokeRect { rect: Rect, color: Rgba<u8> },
    Line { from: Point, to: Point, color: Rgba<u8>, dotted: bool },
    Text { at: Point, text: String, size: f32, color: Rgba<u8> },
    Magnify { source: Rect, dest: Rect, opacity: f32 },
}

/// Canvas that only records what was drawn
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn draw_snapshot(&mut self, _capture: &Capture) {
        self.commands.push(DrawCommand::Snapshot);
    }

    fn draw_image(&mut self, image: &RgbaImage, at: Point) {
        self.commands.push(DrawCommand::Image {
            at,
            width: image.width(),
            height: image.height(),
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        self.commands.push(DrawCommand::StrokeRect { rect, color });
    }

    fn line(&mut self, from: Point, to: Point, color: Rgba<u8>, dotted: bool) {
        self.commands.push(DrawCommand::Line { from, to, color, dotted });
    }

    fn text(&mut self, at: Point, text: &str, size: f32, color: Rgba<u8>) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.to_string(),
            size,
            color,
        });
    }

    fn magnify(&mut self, _capture: &Capture, source: Rect, dest: Rect, opacity: f32) {
        self.commands.push(DrawCommand::Magnify { source, dest, opacity });
    }
}

/// Font embedded for labels so output doesn't depend on installed fonts
static LABEL_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
const LABEL_FAMILY: &str = "DejaVu Sans";
/// Left padding inside a label, half the slack `TextMetrics` adds
const TEXT_PADDING: i32 = 3;

/// Shaping and glyph rasterization state
struct GlyphRasterizer {
    fonts: FontSystem,
    cache: SwashCache,
}

impl GlyphRasterizer {
    fn new() -> Self {
        let mut fonts = FontSystem::new();
        fonts.db_mut().load_font_data(LABEL_FONT.to_vec());
        Self {
            fonts,
            cache: SwashCache::new(),
        }
    }
}

/// Software canvas backed by a tiny-skia pixmap
///
/// Pixels are premultiplied while drawing and converted back to straight
/// alpha by [`ImageCanvas::into_image`].
pub struct ImageCanvas {
    pixmap: Pixmap,
    glyphs: Option<GlyphRasterizer>,
}

impl ImageCanvas {
    pub fn new(width: u32, height: u32) -> OverlayResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            OverlayError::Canvas(format!("cannot allocate {}x{} canvas", width, height))
        })?;
        Ok(Self { pixmap, glyphs: None })
    }

    pub fn into_image(self) -> RgbaImage {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut image = RgbaImage::new(width, height);
        for (out, pixel) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = pixel.demultiply();
            *out = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }

    fn fill(&mut self, rect: Rect, color: Rgba<u8>) {
        if let Some(rect) = sk_rect(rect) {
            self.pixmap
                .fill_rect(rect, &solid(color), Transform::identity(), None);
        }
    }
}

/// `None` for empty rectangles
fn sk_rect(rect: Rect) -> Option<SkRect> {
    SkRect::from_xywh(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

fn solid(color: Rgba<u8>) -> Paint<'static> {
    let [r, g, b, a] = color.0;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = false;
    paint
}

fn premultiplied(color: Rgba<u8>) -> [u8; 4] {
    let [r, g, b, a] = color.0;
    let c = ColorU8::from_rgba(r, g, b, a).premultiply();
    [c.red(), c.green(), c.blue(), c.alpha()]
}

fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let data = image.pixels().flat_map(|p| premultiplied(*p)).collect();
    Pixmap::from_vec(data, size)
}

fn pixel_centre(p: Point) -> (f32, f32) {
    (p.x as f32 + 0.5, p.y as f32 + 0.5)
}

impl Canvas for ImageCanvas {
    fn draw_snapshot(&mut self, capture: &Capture) {
        let Some(snapshot) = to_pixmap(capture.image()) else {
            return;
        };
        let paint = PixmapPaint {
            blend_mode: BlendMode::Source,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, snapshot.as_ref(), &paint, Transform::identity(), None);
    }

    fn draw_image(&mut self, image: &RgbaImage, at: Point) {
        if let Some(source) = to_pixmap(image) {
            self.pixmap.draw_pixmap(
                at.x,
                at.y,
                source.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        self.fill(rect, color);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        let Some(outer) = sk_rect(rect) else {
            return;
        };
        // One pixel ring: the even-odd rule punches the inner rect out
        let mut pb = PathBuilder::new();
        pb.push_rect(outer);
        let inner = Rect::new(
            rect.x + 1,
            rect.y + 1,
            rect.width.saturating_sub(2),
            rect.height.saturating_sub(2),
        );
        if let Some(inner) = sk_rect(inner) {
            pb.push_rect(inner);
        }
        if let Some(path) = pb.finish() {
            let paint = solid(color);
            self.pixmap
                .fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), None);
        }
    }

    fn line(&mut self, from: Point, to: Point, color: Rgba<u8>, dotted: bool) {
        if from == to {
            self.fill(Rect::new(from.x, from.y, 1, 1), color);
            return;
        }
        let mut pb = PathBuilder::new();
        let (x0, y0) = pixel_centre(from);
        let (x1, y1) = pixel_centre(to);
        pb.move_to(x0, y0);
        pb.line_to(x1, y1);
        let Some(path) = pb.finish() else {
            return;
        };
        // Square caps reach the end pixel; dots keep butt caps so they stay apart
        let stroke = if dotted {
            Stroke {
                dash: StrokeDash::new(vec![1.0, 1.0], 0.0),
                ..Stroke::default()
            }
        } else {
            Stroke {
                line_cap: LineCap::Square,
                ..Stroke::default()
            }
        };
        self.pixmap
            .stroke_path(&path, &solid(color), &stroke, Transform::identity(), None);
    }

    fn text(&mut self, at: Point, text: &str, size: f32, color: Rgba<u8>) {
        if text.is_empty() || !size.is_finite() || size <= 0.0 {
            return;
        }
        let Self { pixmap, glyphs } = self;
        let GlyphRasterizer { fonts, cache } = glyphs.get_or_insert_with(GlyphRasterizer::new);

        let mut buffer = Buffer::new(fonts, Metrics::new(size, size * 1.6));
        buffer.set_size(fonts, None, None);
        let attrs = Attrs::new().family(Family::Name(LABEL_FAMILY));
        buffer.set_text(fonts, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(fonts, false);

        let [r, g, b, a] = color.0;
        buffer.draw(fonts, cache, TextColor::rgba(r, g, b, a), |x, y, w, h, c| {
            if c.a() == 0 {
                return;
            }
            if let Some(rect) = sk_rect(Rect::new(at.x + TEXT_PADDING + x, at.y + y, w, h)) {
                let paint = solid(Rgba([c.r(), c.g(), c.b(), c.a()]));
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        });
    }

    fn magnify(&mut self, capture: &Capture, source: Rect, dest: Rect, opacity: f32) {
        if source.is_empty() || dest.is_empty() {
            return;
        }
        // Off-screen source pixels show as black
        let data: Vec<u8> = (0..source.height as i32)
            .flat_map(|dy| (0..source.width as i32).map(move |dx| source.location().offset(dx, dy)))
            .flat_map(|p| premultiplied(capture.pixel(p).unwrap_or(Rgba([0, 0, 0, 255]))))
            .collect();
        let patch = IntSize::from_wh(source.width, source.height)
            .and_then(|size| Pixmap::from_vec(data, size));
        let Some(patch) = patch else {
            return;
        };

        let (sx, sy) = (
            dest.width as f32 / source.width as f32,
            dest.height as f32 / source.height as f32,
        );
        let (half_w, half_h) = (dest.width as f32 / 2.0, dest.height as f32 / 2.0);
        let circle = PathBuilder::from_circle(
            dest.x as f32 + half_w,
            dest.y as f32 + half_h,
            half_w.min(half_h),
        );
        let Some(circle) = circle else {
            return;
        };
        let paint = Paint {
            shader: Pattern::new(
                patch.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Nearest,
                opacity.clamp(0.0, 1.0),
                Transform::from_row(sx, 0.0, 0.0, sy, dest.x as f32, dest.y as f32),
            ),
            ..Paint::default()
        };
        self.pixmap
            .fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_capture() -> Capture {
        let image = RgbaImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        Capture::new(image, Rect::new(0, 0, 10, 10)).unwrap()
    }

    fn painted(image: &RgbaImage) -> usize {
        image.pixels().filter(|p| p.0[3] > 0).count()
    }

    #[test]
    fn fill_rect_blends_and_clips() {
        let mut canvas = ImageCanvas::new(4, 4).unwrap();
        canvas.fill_rect(Rect::new(-2, -2, 4, 4), Rgba([0, 255, 0, 255]));
        let image = canvas.into_image();
        assert_eq!(*image.get_pixel(1, 1), Rgba([0, 255, 0, 255]));
        assert_eq!(*image.get_pixel(2, 2), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn stroke_rect_leaves_interior() {
        let mut canvas = ImageCanvas::new(10, 10).unwrap();
        canvas.stroke_rect(Rect::new(1, 1, 5, 5), Rgba([255, 255, 255, 255]));
        let image = canvas.into_image();
        assert_eq!(image.get_pixel(1, 1).0[3], 255);
        assert_eq!(image.get_pixel(5, 5).0[3], 255);
        assert_eq!(image.get_pixel(3, 3).0[3], 0);
        assert_eq!(image.get_pixel(6, 6).0[3], 0);
    }

    #[test]
    fn snapshot_replaces_and_image_composites() {
        let capture = checker_capture();
        let mut canvas = ImageCanvas::new(10, 10).unwrap();
        canvas.fill_rect(Rect::new(0, 0, 10, 10), Rgba([0, 255, 0, 255]));
        canvas.draw_snapshot(&capture);
        let cursor = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        canvas.draw_image(&cursor, Point::new(8, 8));
        let image = canvas.into_image();
        assert_eq!(*image.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*image.get_pixel(7, 7), Rgba([0, 0, 255, 255]));
        assert_eq!(*image.get_pixel(9, 9), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn dotted_line_paints_fewer_pixels_than_solid() {
        let mut solid = ImageCanvas::new(40, 3).unwrap();
        solid.line(Point::new(0, 1), Point::new(39, 1), Rgba([255, 255, 255, 255]), false);
        let mut dotted = ImageCanvas::new(40, 3).unwrap();
        dotted.line(Point::new(0, 1), Point::new(39, 1), Rgba([255, 255, 255, 255]), true);

        let (solid, dotted) = (painted(&solid.into_image()), painted(&dotted.into_image()));
        assert!(solid >= 39);
        assert!(dotted > 0 && dotted < solid);
    }

    #[test]
    fn text_paints_glyphs() {
        let mut canvas = ImageCanvas::new(100, 40).unwrap();
        canvas.text(Point::new(5, 5), "201 x 101", 20.0, Rgba([255, 255, 255, 255]));
        let image = canvas.into_image();
        assert!(painted(&image) > 20);
        // nothing lands left of the label origin
        assert!((0..40).all(|y| image.get_pixel(0, y).0[3] == 0));
    }

    #[test]
    fn empty_or_zero_sized_text_paints_nothing() {
        let mut canvas = ImageCanvas::new(20, 20).unwrap();
        canvas.text(Point::new(0, 0), "", 12.0, Rgba([255, 255, 255, 255]));
        canvas.text(Point::new(0, 0), "x", 0.0, Rgba([255, 255, 255, 255]));
        assert_eq!(painted(&canvas.into_image()), 0);
    }

    #[test]
    fn magnify_samples_source_pixels() {
        let capture = checker_capture();
        let mut canvas = ImageCanvas::new(40, 40).unwrap();
        canvas.magnify(&capture, Rect::new(3, 3, 4, 4), Rect::new(0, 0, 40, 40), 1.0);
        let image = canvas.into_image();
        let (left, right) = (image.get_pixel(15, 20).0, image.get_pixel(25, 20).0);
        assert!(left[0] > 250 && left[2] < 5 && left[3] == 255, "{left:?}");
        assert!(right[2] > 250 && right[0] < 5 && right[3] == 255, "{right:?}");
        // corners fall outside the circle
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn magnify_shows_black_beyond_the_snapshot() {
        let capture = checker_capture();
        let mut canvas = ImageCanvas::new(40, 40).unwrap();
        canvas.magnify(&capture, Rect::new(-4, 3, 4, 4), Rect::new(0, 0, 40, 40), 1.0);
        let centre = image_pixel(canvas, 20, 20);
        assert!(centre[0] < 5 && centre[1] < 5 && centre[2] < 5 && centre[3] == 255, "{centre:?}");
    }

    fn image_pixel(canvas: ImageCanvas, x: u32, y: u32) -> [u8; 4] {
        canvas.into_image().get_pixel(x, y).0
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(matches!(ImageCanvas::new(0, 10), Err(OverlayError::Canvas(_))));
    }

    #[test]
    fn recording_canvas_collects_text() {
        let mut canvas = RecordingCanvas::new();
        canvas.text(Point::new(0, 0), "101 x 31", 12.0, Rgba([0, 0, 0, 255]));
        canvas.fill_rect(Rect::new(0, 0, 1, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.texts(), vec!["101 x 31"]);
        assert_eq!(canvas.commands.len(), 2);
    }
}
