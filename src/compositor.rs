use egui::{Rect, Vec2, pos2, vec2};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// How a background image is laid out in the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundFit {
    /// Scale to fill the canvas, keeping the aspect ratio and cropping the overflow.
    #[default]
    Cover,
    /// Scale to fit inside the canvas, keeping the aspect ratio.
    Contain,
    /// Scale each axis independently to the canvas size.
    Stretch,
}

impl BackgroundFit {
    /// Where an image of `image_size` lands in a canvas of `canvas_size`.
    /// Works in any unit; the result may extend past the canvas for `Cover`.
    pub fn place(self, image_size: Vec2, canvas_size: Vec2) -> Rect {
        if image_size.x <= 0.0 || image_size.y <= 0.0 {
            return Rect::NOTHING;
        }
        let size = match self {
            Self::Stretch => canvas_size,
            Self::Cover | Self::Contain => {
                let sx = canvas_size.x / image_size.x;
                let sy = canvas_size.y / image_size.y;
                let scale = if self == Self::Cover { sx.max(sy) } else { sx.min(sy) };
                image_size * scale
            }
        };
        Rect::from_center_size(pos2(canvas_size.x / 2.0, canvas_size.y / 2.0), size)
    }
}

/// A decoded background image and how it is laid out.
#[derive(Debug, Clone)]
pub struct Background {
    image: RgbaImage,
    fit: BackgroundFit,
}

impl Background {
    pub fn new(image: RgbaImage, fit: BackgroundFit) -> Self {
        Self { image, fit }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn fit(&self) -> BackgroundFit {
        self.fit
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.image.width() as f32, self.image.height() as f32)
    }

    /// Placement inside a canvas of `canvas_size`, in the canvas' units.
    pub fn placement(&self, canvas_size: Vec2) -> Rect {
        self.fit.place(self.size(), canvas_size)
    }
}

/// Flatten the stroke layer over the background into a new opaque raster
/// the size of `strokes`.
///
/// The base is opaque white. The background, if any, is scaled into place
/// over it, then the strokes are alpha-composited on top.
pub fn compose(background: Option<&Background>, strokes: &RgbaImage) -> RgbaImage {
    let (width, height) = strokes.dimensions();
    let mut out = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    if let Some(background) = background {
        let rect = background.placement(vec2(width as f32, height as f32));
        if let Some(part) = VisiblePart::of(rect, background.image().dimensions(), (width, height)) {
            let src = part.src;
            let cropped = imageops::crop_imm(background.image(), src.x, src.y, src.width, src.height).to_image();
            let scaled = imageops::resize(&cropped, part.dst.width, part.dst.height, FilterType::Triangle);
            imageops::overlay(&mut out, &scaled, i64::from(part.dst.x), i64::from(part.dst.y));
        }
    }

    imageops::overlay(&mut out, strokes, 0, 0);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// The piece of a placed background that lands inside the canvas, both in
/// source pixels and in canvas pixels. Only this piece gets resampled, so a
/// `Cover` placement far larger than the canvas costs no more than the
/// canvas itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VisiblePart {
    src: PixelRect,
    dst: PixelRect,
}

impl VisiblePart {
    fn of(placed: Rect, image_size: (u32, u32), canvas_size: (u32, u32)) -> Option<Self> {
        let (image_w, image_h) = image_size;
        let canvas = Rect::from_min_size(pos2(0.0, 0.0), vec2(canvas_size.0 as f32, canvas_size.1 as f32));
        let visible = placed.intersect(canvas);
        if image_w == 0 || image_h == 0 || !(visible.width() >= 1.0 && visible.height() >= 1.0) {
            return None;
        }

        let dst_x = visible.min.x.round() as u32;
        let dst_y = visible.min.y.round() as u32;
        let dst = PixelRect {
            x: dst_x,
            y: dst_y,
            width: (visible.max.x.round() as u32).saturating_sub(dst_x).max(1),
            height: (visible.max.y.round() as u32).saturating_sub(dst_y).max(1),
        };

        // Canvas units per source pixel on each axis
        let scale_x = image_w as f32 / placed.width();
        let scale_y = image_h as f32 / placed.height();
        let span = |from: f32, to: f32, scale: f32, len: u32| {
            let start = (from * scale).floor().clamp(0.0, (len - 1) as f32) as u32;
            let end = ((to * scale).ceil() as u32).clamp(start + 1, len);
            (start, end - start)
        };
        let (src_x, src_w) = span(visible.min.x - placed.min.x, visible.max.x - placed.min.x, scale_x, image_w);
        let (src_y, src_h) = span(visible.min.y - placed.min.y, visible.max.y - placed.min.y, scale_y, image_h);

        Some(Self {
            src: PixelRect {
                x: src_x,
                y: src_y,
                width: src_w,
                height: src_h,
            },
            dst,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    #[test]
    fn test_place_cover_crops() {
        let rect = BackgroundFit::Cover.place(vec2(200.0, 100.0), vec2(100.0, 100.0));
        assert_eq!(rect, Rect::from_min_max(pos2(-50.0, 0.0), pos2(150.0, 100.0)));
    }

    #[test]
    fn test_place_contain_letterboxes() {
        let rect = BackgroundFit::Contain.place(vec2(200.0, 100.0), vec2(100.0, 100.0));
        assert_eq!(rect, Rect::from_min_max(pos2(0.0, 25.0), pos2(100.0, 75.0)));
    }

    #[test]
    fn test_place_stretch_fills() {
        let rect = BackgroundFit::Stretch.place(vec2(7.0, 3.0), vec2(100.0, 50.0));
        assert_eq!(rect, Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 50.0)));
    }

    #[test]
    fn test_no_background_is_white() {
        let strokes = RgbaImage::new(4, 3);
        let out = compose(None, &strokes);
        assert_eq!(out.dimensions(), (4, 3));
        assert!(out.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_strokes_over_background() {
        let background = Background::new(RgbaImage::from_pixel(2, 2, GREEN), BackgroundFit::Stretch);
        let mut strokes = RgbaImage::new(8, 8);
        strokes.put_pixel(3, 3, RED);

        let out = compose(Some(&background), &strokes);
        assert_eq!(out.dimensions(), (8, 8));
        assert_eq!(*out.get_pixel(3, 3), RED);
        assert_eq!(*out.get_pixel(0, 0), GREEN);
        assert_eq!(*out.get_pixel(7, 7), GREEN);
    }

    #[test]
    fn test_translucent_strokes_blend() {
        let mut strokes = RgbaImage::new(1, 1);
        strokes.put_pixel(0, 0, Rgba([0, 0, 0, 128]));
        let out = compose(None, &strokes);
        let p = out.get_pixel(0, 0);
        assert_eq!(p[3], 255);
        assert!((126..=128).contains(&p[0]), "got {p:?}");
    }

    #[test]
    fn test_contain_leaves_white_bars() {
        let background = Background::new(RgbaImage::from_pixel(4, 2, GREEN), BackgroundFit::Contain);
        let out = compose(Some(&background), &RgbaImage::new(8, 8));
        assert_eq!(*out.get_pixel(4, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*out.get_pixel(4, 4), GREEN);
    }

    #[test]
    fn test_visible_part_of_cover_overflow() {
        // 1x4000 covering 1000x1000 is placed 1000 wide and 4,000,000 tall
        let placed = BackgroundFit::Cover.place(vec2(1.0, 4000.0), vec2(1000.0, 1000.0));
        let part = VisiblePart::of(placed, (1, 4000), (1000, 1000)).unwrap();
        assert_eq!(
            part.dst,
            PixelRect {
                x: 0,
                y: 0,
                width: 1000,
                height: 1000
            }
        );
        assert_eq!((part.src.x, part.src.width), (0, 1));
        assert!((1998..=2000).contains(&part.src.y), "{part:?}");
        assert!(part.src.height <= 3, "{part:?}");
    }

    #[test]
    fn test_visible_part_outside_canvas() {
        let placed = Rect::from_min_size(pos2(50.0, 0.0), vec2(10.0, 10.0));
        assert!(VisiblePart::of(placed, (4, 4), (20, 20)).is_none());
    }

    #[test]
    fn test_extreme_aspect_cover_background() {
        let background = Background::new(RgbaImage::from_pixel(1, 4000, GREEN), BackgroundFit::Cover);
        let mut strokes = RgbaImage::new(1000, 1000);
        strokes.put_pixel(500, 500, RED);

        let out = compose(Some(&background), &strokes);
        assert_eq!(out.dimensions(), (1000, 1000));
        assert_eq!(*out.get_pixel(0, 0), GREEN);
        assert_eq!(*out.get_pixel(999, 999), GREEN);
        assert_eq!(*out.get_pixel(500, 500), RED);
    }

    #[test]
    fn test_cover_crops_to_center() {
        // Left half red, right half green; cover into a square keeps the middle
        let mut image = RgbaImage::from_pixel(40, 10, GREEN);
        for x in 0..20 {
            for y in 0..10 {
                image.put_pixel(x, y, RED);
            }
        }
        let background = Background::new(image, BackgroundFit::Cover);
        let out = compose(Some(&background), &RgbaImage::new(10, 10));
        assert_eq!(*out.get_pixel(1, 5), RED);
        assert_eq!(*out.get_pixel(8, 5), GREEN);
    }

    #[test]
    fn test_compose_does_not_touch_inputs() {
        let background = Background::new(RgbaImage::from_pixel(2, 2, GREEN), BackgroundFit::Cover);
        let strokes = RgbaImage::new(3, 3);
        let _ = compose(Some(&background), &strokes);
        assert!(strokes.pixels().all(|p| p[3] == 0));
        assert_eq!(background.image().dimensions(), (2, 2));
    }
}
