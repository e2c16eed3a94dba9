use egui::{Painter, Pos2, Shape};

use super::PaintTarget;
use crate::stroke::StrokeStyle;

/// Paints strokes with an egui painter, offset to where the canvas sits on
/// screen.
pub struct PainterTarget<'a> {
    painter: &'a Painter,
    origin: Pos2,
}

impl<'a> PainterTarget<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2) -> Self {
        Self { painter, origin }
    }

    fn to_screen(&self, point: Pos2) -> Pos2 {
        self.origin + point.to_vec2()
    }
}

impl PaintTarget for PainterTarget<'_> {
    fn draw_stroke(&mut self, points: &[Pos2], style: StrokeStyle) {
        let screen_points: Vec<Pos2> = points.iter().map(|p| self.to_screen(*p)).collect();
        self.painter.extend(stroke_shapes(screen_points, style));
    }
}

/// Shapes for one stroke in screen space.
///
/// Opaque polylines get round end caps to match the exported raster.
/// Translucent ones are drawn with butt ends on screen: a cap circle would
/// overlap the line and double the alpha there, while the raster target
/// blends each stroke once through a coverage mask.
fn stroke_shapes(points: Vec<Pos2>, style: StrokeStyle) -> Vec<Shape> {
    let color = style.color.to_color32();
    let radius = style.thickness / 2.0;
    match points.as_slice() {
        [] => Vec::new(),
        [point] => vec![Shape::circle_filled(*point, radius, color)],
        [first, .., last] => {
            let caps = if style.color.is_opaque() {
                vec![
                    Shape::circle_filled(*first, radius, color),
                    Shape::circle_filled(*last, radius, color),
                ]
            } else {
                Vec::new()
            };
            let line = Shape::line(points, egui::Stroke::new(style.thickness, color));
            caps.into_iter().chain(std::iter::once(line)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use egui::{LayerId, Rect, pos2, vec2};

    #[test]
    fn test_paint_into_egui_painter() {
        let ctx = egui::Context::default();
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        let painter = Painter::new(ctx, LayerId::background(), rect);
        let mut target = PainterTarget::new(&painter, pos2(10.0, 20.0));

        assert_eq!(target.to_screen(pos2(1.0, 1.0)), pos2(11.0, 21.0));
        target.draw_stroke(&[], StrokeStyle::new(Color::BLACK, 5.0));
        target.draw_stroke(&[pos2(5.0, 5.0)], StrokeStyle::new(Color::BLACK, 5.0));
        target.draw_stroke(
            &[pos2(5.0, 5.0), pos2(50.0, 50.0)],
            StrokeStyle::new(Color::from_rgb(255, 0, 0), 12.0),
        );
    }

    #[test]
    fn test_opaque_polyline_has_round_caps() {
        let shapes = stroke_shapes(vec![pos2(0.0, 0.0), pos2(10.0, 0.0)], StrokeStyle::new(Color::BLACK, 6.0));
        assert_eq!(shapes.len(), 3);
        assert!(matches!(&shapes[0], Shape::Circle(c) if c.center == pos2(0.0, 0.0) && c.radius == 3.0));
        assert!(matches!(&shapes[1], Shape::Circle(c) if c.center == pos2(10.0, 0.0)));
        assert!(matches!(&shapes[2], Shape::Path(_)));
    }

    #[test]
    fn test_translucent_polyline_is_drawn_once() {
        let style = StrokeStyle::new(Color::from_rgba(255, 0, 0, 128), 6.0);
        let shapes = stroke_shapes(vec![pos2(0.0, 0.0), pos2(10.0, 0.0)], style);
        assert_eq!(shapes.len(), 1);
        assert!(matches!(&shapes[0], Shape::Path(_)));
    }

    #[test]
    fn test_single_point_is_a_dot() {
        let style = StrokeStyle::new(Color::from_rgba(0, 0, 255, 100), 8.0);
        let shapes = stroke_shapes(vec![pos2(4.0, 4.0)], style);
        assert!(matches!(&shapes[..], [Shape::Circle(c)] if c.radius == 4.0));
        assert!(stroke_shapes(Vec::new(), style).is_empty());
    }
}
