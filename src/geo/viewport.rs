use crate::foundation::core::{Canvas, Point, Rect};

/// Fractional padding added around the data bounds on each side.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 0.15,
            right: 0.05,
            bottom: 0.05,
            left: 0.05,
        }
    }
}

/// Equal-aspect mapping from projected meters to canvas pixels (y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    view: Rect,
}

impl Viewport {
    /// Pad `bounds` by `margins`, then center it in `canvas` at the largest uniform scale.
    pub fn fit(bounds: Rect, margins: Margins, canvas: Canvas) -> Self {
        let w = bounds.width().max(1.0);
        let h = bounds.height().max(1.0);
        let view = Rect::new(
            bounds.x0 - w * margins.left,
            bounds.y0 - h * margins.bottom,
            bounds.x0 + w * (1.0 + margins.right),
            bounds.y0 + h * (1.0 + margins.top),
        );

        let cw = f64::from(canvas.width);
        let ch = f64::from(canvas.height);
        let scale = (cw / view.width()).min(ch / view.height());
        let offset_x = (cw - view.width() * scale) / 2.0;
        let offset_y = (ch - view.height() * scale) / 2.0;

        Self {
            scale,
            offset_x,
            offset_y,
            view,
        }
    }

    pub fn to_pixel(&self, p: Point) -> Point {
        Point::new(
            self.offset_x + (p.x - self.view.x0) * self.scale,
            self.offset_y + (self.view.y1 - p.y) * self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_map_inside_canvas_with_y_flipped() {
        let canvas = Canvas {
            width: 200,
            height: 100,
        };
        let vp = Viewport::fit(Rect::new(0.0, 0.0, 10.0, 10.0), Margins::default(), canvas);
        let lo = vp.to_pixel(Point::new(0.0, 0.0));
        let hi = vp.to_pixel(Point::new(10.0, 10.0));
        assert!(lo.y > hi.y);
        assert!(lo.x < hi.x);
        for p in [lo, hi] {
            assert!(p.x >= 0.0 && p.x <= 200.0);
            assert!(p.y >= 0.0 && p.y <= 100.0);
        }
    }

    #[test]
    fn zero_margins_fill_the_limiting_axis() {
        let canvas = Canvas {
            width: 100,
            height: 100,
        };
        let m = Margins {
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            left: 0.0,
        };
        let vp = Viewport::fit(Rect::new(0.0, 0.0, 50.0, 25.0), m, canvas);
        let a = vp.to_pixel(Point::new(0.0, 25.0));
        let b = vp.to_pixel(Point::new(50.0, 0.0));
        assert!((a.x - 0.0).abs() < 1e-9 && (b.x - 100.0).abs() < 1e-9);
        assert!((a.y - 25.0).abs() < 1e-9 && (b.y - 75.0).abs() < 1e-9);
    }
}
