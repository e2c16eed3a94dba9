use egui::{Pos2, Vec2};
use image::{Pixel, Rgba, RgbaImage};

use super::PaintTarget;
use crate::stroke::StrokeStyle;

/// CPU rasterizer painting strokes into an unmultiplied RGBA image.
///
/// `scale` is pixels per canvas unit: a canvas of `w × h` units on a display
/// with `scale` pixels per point becomes an image of `w·scale × h·scale`.
#[derive(Debug, Clone)]
pub struct RasterTarget {
    image: RgbaImage,
    scale: f32,
}

impl RasterTarget {
    /// A fully transparent target.
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        Self::from_image(RgbaImage::new(width, height), scale)
    }

    pub fn from_image(image: RgbaImage, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self { image, scale }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Coverage of a stroke over the pixels of `bounds`, one value per pixel,
    /// row-major. Overlapping segments take the maximum so the stroke is
    /// blended exactly once per pixel.
    fn coverage(&self, points: &[Pos2], radius: f32, bounds: PixelBounds) -> Vec<f32> {
        let mut mask = vec![0.0f32; bounds.width() * bounds.height()];
        let mut paint_segment = |a: Pos2, b: Pos2| {
            let Some(seg) = PixelBounds::around(&[a, b], radius + 1.0, self.dimensions()) else {
                return;
            };
            for y in seg.min_y..seg.max_y {
                for x in seg.min_x..seg.max_x {
                    let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let distance = distance_to_segment(center, a, b);
                    let cov = (radius + 0.5 - distance).clamp(0.0, 1.0);
                    if cov > 0.0 {
                        let idx = (y - bounds.min_y) as usize * bounds.width()
                            + (x - bounds.min_x) as usize;
                        mask[idx] = mask[idx].max(cov);
                    }
                }
            }
        };

        if let [point] = points {
            paint_segment(*point, *point);
        } else {
            for pair in points.windows(2) {
                paint_segment(pair[0], pair[1]);
            }
        }
        mask
    }
}

impl PaintTarget for RasterTarget {
    fn draw_stroke(&mut self, points: &[Pos2], style: StrokeStyle) {
        if points.is_empty() {
            return;
        }
        let points: Vec<Pos2> = points.iter().map(|p| (p.to_vec2() * self.scale).to_pos2()).collect();
        // Never thinner than a pixel, or hairlines vanish entirely
        let radius = (style.thickness * self.scale / 2.0).max(0.5);
        let Some(bounds) = PixelBounds::around(&points, radius + 1.0, self.dimensions()) else {
            return;
        };

        let mask = self.coverage(&points, radius, bounds);
        let color = style.color;
        for y in bounds.min_y..bounds.max_y {
            for x in bounds.min_x..bounds.max_x {
                let idx = (y - bounds.min_y) as usize * bounds.width() + (x - bounds.min_x) as usize;
                let alpha = (f32::from(color.a()) * mask[idx]).round() as u8;
                if alpha == 0 {
                    continue;
                }
                self.image
                    .get_pixel_mut(x, y)
                    .blend(&Rgba([color.r(), color.g(), color.b(), alpha]));
            }
        }
    }
}

/// Half-open pixel rectangle clipped to the image.
#[derive(Debug, Clone, Copy)]
struct PixelBounds {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl PixelBounds {
    fn around(points: &[Pos2], padding: f32, (width, height): (u32, u32)) -> Option<Self> {
        let (mut min, mut max) = (Pos2::new(f32::INFINITY, f32::INFINITY), Pos2::new(f32::NEG_INFINITY, f32::NEG_INFINITY));
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        let clip = |v: f32, limit: u32| v.clamp(0.0, limit as f32) as u32;
        let bounds = Self {
            min_x: clip((min.x - padding).floor(), width),
            min_y: clip((min.y - padding).floor(), height),
            max_x: clip((max.x + padding).ceil(), width),
            max_y: clip((max.y + padding).ceil(), height),
        };
        (bounds.min_x < bounds.max_x && bounds.min_y < bounds.max_y).then_some(bounds)
    }

    fn width(&self) -> usize {
        (self.max_x - self.min_x) as usize
    }

    fn height(&self) -> usize {
        (self.max_y - self.min_y) as usize
    }
}

fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let line: Vec2 = end - start;
    let len_sq = line.length_sq();
    if len_sq == 0.0 {
        return (point - start).length();
    }
    let t = ((point - start).dot(line) / len_sq).clamp(0.0, 1.0);
    (point - (start + line * t)).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use egui::pos2;

    const RED: Color = Color::from_rgb(255, 0, 0);
    const BLUE: Color = Color::from_rgb(0, 0, 255);

    #[test]
    fn test_horizontal_line_coverage() {
        let mut target = RasterTarget::new(20, 20, 1.0);
        target.draw_stroke(&[pos2(2.0, 10.0), pos2(18.0, 10.0)], StrokeStyle::new(RED, 4.0));

        let image = target.image();
        assert_eq!(*image.get_pixel(10, 9), Rgba([255, 0, 0, 255]));
        assert_eq!(*image.get_pixel(10, 10), Rgba([255, 0, 0, 255]));
        assert_eq!(image.get_pixel(10, 2)[3], 0);
        assert_eq!(image.get_pixel(10, 17)[3], 0);
    }

    #[test]
    fn test_single_point_is_a_dot() {
        let mut target = RasterTarget::new(20, 20, 1.0);
        target.draw_stroke(&[pos2(10.0, 10.0)], StrokeStyle::new(RED, 6.0));

        let image = target.image();
        assert_eq!(image.get_pixel(10, 10)[3], 255);
        assert_eq!(image.get_pixel(9, 9)[3], 255);
        assert_eq!(image.get_pixel(17, 10)[3], 0);
        assert_eq!(image.get_pixel(10, 3)[3], 0);
    }

    #[test]
    fn test_later_stroke_paints_on_top() {
        let mut target = RasterTarget::new(20, 20, 1.0);
        target.draw_stroke(&[pos2(0.0, 10.0), pos2(20.0, 10.0)], StrokeStyle::new(RED, 4.0));
        target.draw_stroke(&[pos2(10.0, 0.0), pos2(10.0, 20.0)], StrokeStyle::new(BLUE, 4.0));

        assert_eq!(*target.image().get_pixel(10, 10), Rgba([0, 0, 255, 255]));
        assert_eq!(*target.image().get_pixel(3, 10), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_translucent_stroke_blends_once_at_joints() {
        let half_red = Color::from_rgba(255, 0, 0, 128);
        let mut target = RasterTarget::new(30, 30, 1.0);
        // Sharp turn: both segments cover the corner pixel
        target.draw_stroke(
            &[pos2(5.0, 15.0), pos2(15.0, 15.0), pos2(15.0, 5.0)],
            StrokeStyle::new(half_red, 4.0),
        );

        let corner = target.image().get_pixel(15, 15)[3];
        let middle = target.image().get_pixel(10, 15)[3];
        assert!((127..=128).contains(&corner), "corner alpha {corner}");
        assert_eq!(corner, middle);
    }

    #[test]
    fn test_scale_maps_points_and_thickness() {
        let mut target = RasterTarget::new(40, 40, 2.0);
        target.draw_stroke(&[pos2(2.0, 10.0), pos2(18.0, 10.0)], StrokeStyle::new(RED, 4.0));

        let image = target.image();
        // y = 10 units -> 20 px, half-thickness 2 units -> 4 px
        assert_eq!(image.get_pixel(20, 17)[3], 255);
        assert_eq!(image.get_pixel(20, 22)[3], 255);
        assert_eq!(image.get_pixel(20, 26)[3], 0);
    }

    #[test]
    fn test_strokes_outside_are_clipped() {
        let mut target = RasterTarget::new(10, 10, 1.0);
        target.draw_stroke(&[pos2(-50.0, -50.0), pos2(-40.0, -40.0)], StrokeStyle::new(RED, 4.0));
        target.draw_stroke(&[pos2(-5.0, 5.0), pos2(15.0, 5.0)], StrokeStyle::new(RED, 2.0));

        assert!(target.image().pixels().any(|p| p[3] == 255));
        assert_eq!(target.image().get_pixel(5, 0)[3], 0);
    }

    #[test]
    fn test_distance_to_segment() {
        let (a, b) = (pos2(0.0, 0.0), pos2(10.0, 0.0));
        assert_eq!(distance_to_segment(pos2(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(pos2(-4.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_segment(pos2(3.0, 4.0), a, a), 5.0);
    }
}
