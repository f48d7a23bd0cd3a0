use std::fmt::Write as _;

use resvg::tiny_skia;

use crate::{
    engine::color::{ColorScale, Gradient},
    foundation::{
        core::{Canvas, Rgb8},
        error::{GeoFadeError, GeoFadeResult},
    },
    render::{
        raster::FrameRGBA,
        svg::{draw_svg, escape_xml, svg_options},
    },
};

const SAMPLES: usize = 256;
const TICKS: usize = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct GradientBarStyle {
    pub canvas: Canvas,
    pub font_family: String,
    pub background: Rgb8,
    pub text: Rgb8,
}

impl Default for GradientBarStyle {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 3000,
                height: 240,
            },
            font_family: "Nunito Sans".to_string(),
            background: Rgb8::BLACK,
            text: Rgb8::WHITE,
        }
    }
}

/// Five evenly spaced year labels across the scale, truncated toward zero.
pub fn tick_labels(min_year: i32, max_year: i32) -> Vec<i32> {
    let span = f64::from(max_year - min_year);
    (0..TICKS)
        .map(|i| (f64::from(min_year) + span * i as f64 / (TICKS - 1) as f64) as i32)
        .collect()
}

/// Horizontal legend bar for the year color scale, with year ticks underneath.
pub fn render_gradient_bar(scale: &ColorScale, style: &GradientBarStyle) -> GeoFadeResult<FrameRGBA> {
    let Canvas { width, height } = style.canvas;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| GeoFadeError::validation("gradient bar size must be non-zero"))?;
    let bg = style.background;
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));

    let svg = gradient_svg(scale.gradient, scale.min_year, scale.max_year, style);
    draw_svg(&mut pixmap, &svg, &svg_options())?;

    Ok(FrameRGBA {
        width,
        height,
        data: pixmap.take(),
        premultiplied: true,
    })
}

fn gradient_svg(gradient: Gradient, min_year: i32, max_year: i32, style: &GradientBarStyle) -> String {
    let w = f64::from(style.canvas.width);
    let h = f64::from(style.canvas.height);
    let bar_x = w * 0.05;
    let bar_w = w * 0.9;
    let bar_y = h * 0.1;
    let bar_h = h * 0.35;
    let font_size = h * 0.25;
    let cell = bar_w / SAMPLES as f64;

    let mut svg = format!(r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">"#);
    for i in 0..SAMPLES {
        let c = gradient.sample(i as f64 / (SAMPLES - 1) as f64);
        // Overlap cells by a pixel fraction so anti-aliasing leaves no seams.
        let _ = write!(
            svg,
            r#"<rect x="{:.3}" y="{bar_y:.3}" width="{:.3}" height="{bar_h:.3}" fill="{}"/>"#,
            bar_x + cell * i as f64,
            cell + 0.5,
            c.to_hex()
        );
    }

    let labels = tick_labels(min_year, max_year);
    for (i, year) in labels.iter().enumerate() {
        let x = bar_x + cell * 0.5 + (bar_w - cell) * i as f64 / (TICKS - 1) as f64;
        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{:.2}" font-family="{}, sans-serif" font-size="{font_size:.1}" fill="{}" text-anchor="middle">{year}</text>"#,
            bar_y + bar_h + font_size * 1.1,
            escape_xml(&style.font_family),
            style.text.to_hex(),
        );
    }
    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_match_integer_linspace() {
        assert_eq!(tick_labels(2008, 2024), vec![2008, 2012, 2016, 2020, 2024]);
        assert_eq!(tick_labels(2010, 2013), vec![2010, 2010, 2011, 2012, 2013]);
        assert_eq!(tick_labels(2020, 2020), vec![2020; 5]);
    }

    #[test]
    fn bar_is_painted_with_the_gradient() {
        let scale = ColorScale::new(2010, 2020).unwrap();
        let style = GradientBarStyle {
            canvas: Canvas {
                width: 200,
                height: 40,
            },
            ..GradientBarStyle::default()
        };
        let bar = render_gradient_bar(&scale, &style).unwrap();
        assert_eq!(bar.data.len(), 200 * 40 * 4);

        // Row through the middle of the bar: left end purple-ish, right end red.
        let row = (40.0 * 0.275) as usize;
        let px = |x: usize| &bar.data[(row * 200 + x) * 4..(row * 200 + x) * 4 + 4];
        let left = px(12);
        let right = px(188);
        assert!(left[2] > 200, "{left:?}");
        assert!(right[0] > 200 && right[2] < 40, "{right:?}");
    }
}
