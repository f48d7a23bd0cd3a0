use resvg::tiny_skia;

use crate::{
    engine::frame::{FramePayload, LayerPayload},
    foundation::{
        core::{Canvas, Rgb8},
        error::{GeoFadeError, GeoFadeResult},
    },
    geo::{region::RegionGeometry, viewport::Viewport},
    render::svg::{draw_svg, escape_xml, svg_options},
};

/// Rendered pixels, RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Date label placement. `x`/`y` are canvas fractions from the bottom-left; `y` is the label's top.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub font_family: String,
    pub font_size: f32,
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
    pub color: Rgb8,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_family: "Nunito Sans".to_string(),
            font_size: 40.0,
            x: 0.2,
            y: 1.0,
            anchor: TextAnchor::Middle,
            color: Rgb8::WHITE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RasterStyle {
    pub background: Rgb8,
    pub foreground_radius: f32,
    pub background_radius: f32,
    pub outline_color: Rgb8,
    /// Stroke width of the first region (country outline).
    pub outline_width: f32,
    /// Stroke width of every further region (subdivisions).
    pub subdivision_width: f32,
    pub label: LabelStyle,
}

impl Default for RasterStyle {
    fn default() -> Self {
        Self {
            background: Rgb8::BLACK,
            foreground_radius: 1.2,
            background_radius: 1.7,
            outline_color: Rgb8::WHITE,
            outline_width: 0.5,
            subdivision_width: 0.1,
            label: LabelStyle::default(),
        }
    }
}

/// Turns frame payloads into pixels over a pre-drawn basemap.
pub struct Rasterizer {
    canvas: Canvas,
    viewport: Viewport,
    style: RasterStyle,
    base: tiny_skia::Pixmap,
    svg_opts: usvg::Options<'static>,
}

impl Rasterizer {
    pub fn new(
        canvas: Canvas,
        viewport: Viewport,
        regions: &[RegionGeometry],
        style: RasterStyle,
    ) -> GeoFadeResult<Self> {
        let mut base = tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| GeoFadeError::validation("canvas width/height must be non-zero"))?;
        let bg = style.background;
        base.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));

        for (i, region) in regions.iter().enumerate() {
            let width = if i == 0 {
                style.outline_width
            } else {
                style.subdivision_width
            };
            stroke_region(&mut base, region, &viewport, style.outline_color, width);
        }

        Ok(Self {
            canvas,
            viewport,
            style,
            base,
            svg_opts: svg_options(),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Basemap, then background dots, then foreground dots, then the date label.
    pub fn rasterize(&self, payload: &FramePayload) -> GeoFadeResult<FrameRGBA> {
        let mut pixmap = self.base.clone();
        self.draw_layer(&mut pixmap, &payload.background, self.style.background_radius);
        self.draw_layer(&mut pixmap, &payload.foreground, self.style.foreground_radius);
        draw_svg(&mut pixmap, &self.label_svg(&payload.label), &self.svg_opts)?;

        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.take(),
            premultiplied: true,
        })
    }

    fn draw_layer(&self, pixmap: &mut tiny_skia::Pixmap, layer: &LayerPayload, radius: f32) {
        let mut paint = tiny_skia::Paint {
            anti_alias: true,
            ..Default::default()
        };
        for ((pos, color), opacity) in layer
            .positions
            .iter()
            .zip(&layer.colors)
            .zip(&layer.opacities)
        {
            let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
            if alpha == 0 {
                continue;
            }
            let px = self.viewport.to_pixel(*pos);
            let Some(circle) = tiny_skia::PathBuilder::from_circle(px.x as f32, px.y as f32, radius)
            else {
                continue;
            };
            paint.set_color_rgba8(color.r, color.g, color.b, alpha);
            pixmap.fill_path(
                &circle,
                &paint,
                tiny_skia::FillRule::Winding,
                tiny_skia::Transform::identity(),
                None,
            );
        }
    }

    fn label_svg(&self, text: &str) -> String {
        let label = &self.style.label;
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let x = label.x * w;
        // Top-aligned: put the baseline roughly one ascent below the requested top edge.
        let y = (1.0 - label.y) * h + f64::from(label.font_size) * 0.8;
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}"><text x="{x:.2}" y="{y:.2}" font-family="{family}, sans-serif" font-size="{size}" fill="{fill}" text-anchor="{anchor}">{text}</text></svg>"#,
            family = escape_xml(&label.font_family),
            size = label.font_size,
            fill = label.color.to_hex(),
            anchor = label.anchor.as_svg(),
            text = escape_xml(text),
        )
    }
}

fn stroke_region(
    pixmap: &mut tiny_skia::Pixmap,
    region: &RegionGeometry,
    viewport: &Viewport,
    color: Rgb8,
    width: f32,
) {
    let mut paint = tiny_skia::Paint {
        anti_alias: true,
        ..Default::default()
    };
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    let stroke = tiny_skia::Stroke {
        width,
        ..Default::default()
    };

    for line in &region.lines {
        let mut pb = tiny_skia::PathBuilder::new();
        for (i, p) in line.iter().enumerate() {
            let px = viewport.to_pixel(*p);
            if i == 0 {
                pb.move_to(px.x as f32, px.y as f32);
            } else {
                pb.line_to(px.x as f32, px.y as f32);
            }
        }
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, tiny_skia::Transform::identity(), None);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        engine::timeline::Frame,
        foundation::core::{FrameIndex, Point, Rect},
        geo::viewport::Margins,
    };

    fn rasterizer(regions: &[RegionGeometry]) -> Rasterizer {
        let canvas = Canvas {
            width: 64,
            height: 32,
        };
        let vp = Viewport::fit(Rect::new(0.0, 0.0, 100.0, 100.0), Margins::default(), canvas);
        Rasterizer::new(canvas, vp, regions, RasterStyle::default()).unwrap()
    }

    fn payload(foreground: LayerPayload) -> FramePayload {
        FramePayload {
            frame: Frame {
                index: FrameIndex(0),
                date: NaiveDate::from_ymd_opt(2019, 7, 15).unwrap(),
            },
            foreground,
            background: LayerPayload::default(),
            label: "2019-07-15".to_string(),
        }
    }

    fn lit_pixels(frame: &FrameRGBA) -> usize {
        frame
            .data
            .chunks_exact(4)
            .filter(|px| px[0] > 0 || px[1] > 0 || px[2] > 0)
            .count()
    }

    #[test]
    fn empty_frame_is_opaque_background() {
        let r = rasterizer(&[]);
        let f = r.rasterize(&payload(LayerPayload::default())).unwrap();
        assert_eq!((f.width, f.height), (64, 32));
        assert_eq!(f.data.len(), 64 * 32 * 4);
        assert!(f.data.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn points_light_up_pixels_and_zero_opacity_does_not() {
        let r = rasterizer(&[]);
        let dark = r
            .rasterize(&payload(LayerPayload {
                positions: vec![Point::new(50.0, 10.0)],
                color_values: vec![2019],
                colors: vec![Rgb8 { r: 255, g: 0, b: 0 }],
                opacities: vec![0.0],
            }))
            .unwrap();
        let lit = r
            .rasterize(&payload(LayerPayload {
                positions: vec![Point::new(50.0, 10.0)],
                color_values: vec![2019],
                colors: vec![Rgb8 { r: 255, g: 0, b: 0 }],
                opacities: vec![1.0],
            }))
            .unwrap();
        assert!(lit_pixels(&lit) > lit_pixels(&dark));
    }

    #[test]
    fn region_outline_is_drawn_into_basemap() {
        let ring = RegionGeometry {
            lines: vec![vec![
                Point::new(10.0, 10.0),
                Point::new(90.0, 10.0),
                Point::new(90.0, 50.0),
                Point::new(10.0, 10.0),
            ]],
        };
        let plain = rasterizer(&[]).rasterize(&payload(LayerPayload::default())).unwrap();
        let outlined = rasterizer(&[ring])
            .rasterize(&payload(LayerPayload::default()))
            .unwrap();
        assert!(lit_pixels(&outlined) > lit_pixels(&plain));
    }
}
