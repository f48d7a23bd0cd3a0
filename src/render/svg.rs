use std::sync::Arc;

use anyhow::Context as _;
use resvg::tiny_skia;

use crate::foundation::error::GeoFadeResult;

/// SVG parse options backed by the system font database.
///
/// Loading system fonts is slow; build this once per run and reuse it for every frame.
pub fn svg_options() -> usvg::Options<'static> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "loaded system fonts");
    usvg::Options {
        fontdb: Arc::new(db),
        ..Default::default()
    }
}

/// Parse `svg` and draw it over `pixmap` in pixel space.
pub fn draw_svg(
    pixmap: &mut tiny_skia::Pixmap,
    svg: &str,
    opts: &usvg::Options<'_>,
) -> GeoFadeResult<()> {
    let tree = usvg::Tree::from_str(svg, opts).context("parse overlay svg")?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(())
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(escape_xml("2019-07-15"), "2019-07-15");
    }

    #[test]
    fn draws_shapes_into_pixmap() {
        let mut pixmap = tiny_skia::Pixmap::new(4, 4).unwrap();
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4" fill="#ff0000"/></svg>"##;
        draw_svg(&mut pixmap, svg, &usvg::Options::default()).unwrap();
        assert_eq!(&pixmap.data()[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn malformed_svg_is_an_error() {
        let mut pixmap = tiny_skia::Pixmap::new(1, 1).unwrap();
        assert!(draw_svg(&mut pixmap, "<svg", &usvg::Options::default()).is_err());
    }
}
