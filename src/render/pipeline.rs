use std::{
    io::Write as _,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context as _;

use crate::{
    config::RenderConfig,
    data::{
        load::Dataset,
        summary::{write_year_ranges, year_ranges},
    },
    encode::ffmpeg::{EncodeConfig, FfmpegEncoder, ensure_parent_dir, flatten_to_opaque_rgba8},
    engine::sequence::{FrameSequence, RenderMode},
    foundation::{
        core::{Rect, Rgb8},
        error::{GeoFadeError, GeoFadeResult},
    },
    geo::{
        projection::AlbersProjection,
        region::{RegionGeometry, bounds_of},
        viewport::Viewport,
    },
    render::raster::{FrameRGBA, Rasterizer},
};

/// One end-to-end run: load, summarize, then render a preview PNG or an MP4.
#[derive(Clone, Debug)]
pub struct RenderJob {
    pub input: PathBuf,
    pub backgrounds: Vec<PathBuf>,
    pub regions: Vec<PathBuf>,
    pub out: PathBuf,
    pub ranges_out: PathBuf,
    pub mode: RenderMode,
    pub config: RenderConfig,
    pub progress: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    pub dates: usize,
    pub frames_written: u64,
    pub points: usize,
    pub background: usize,
    pub video_seconds: f64,
}

impl RenderJob {
    #[tracing::instrument(skip(self), fields(input = %self.input.display(), out = %self.out.display()))]
    pub fn run(&self) -> GeoFadeResult<RenderStats> {
        self.config.validate()?;
        let started = Instant::now();

        let dataset = Dataset::load(&self.input, &self.backgrounds)?;
        write_year_ranges(&self.ranges_out, &year_ranges(&dataset.points))?;

        let projection = AlbersProjection::alaska();
        let regions = self
            .regions
            .iter()
            .map(|p| RegionGeometry::load(p, &projection))
            .collect::<GeoFadeResult<Vec<_>>>()?;
        let bounds = view_bounds(&regions, &dataset, &projection)?;
        let viewport = Viewport::fit(bounds, self.config.margins, self.config.canvas);
        let rasterizer = Rasterizer::new(
            self.config.canvas,
            viewport,
            &regions,
            self.config.style.clone(),
        )?;

        let sequence = FrameSequence::new(&dataset, &projection, &self.config.engine_settings())?;
        let mut stats = RenderStats {
            dates: sequence.len(),
            points: dataset.points.len(),
            background: dataset.background.len(),
            ..RenderStats::default()
        };

        match self.mode {
            RenderMode::FinalFrame => {
                let payload = sequence.terminal()?;
                let frame = rasterizer.rasterize(&payload)?;
                write_png(&self.out, &frame, self.config.style.background)?;
                stats.frames_written = 1;
            }
            RenderMode::Animation => {
                stats.frames_written = self.encode(sequence, &rasterizer)?;
                stats.video_seconds = stats.frames_written as f64 / f64::from(self.config.fps);
                tracing::info!(
                    length = %format_video_length(stats.video_seconds),
                    "total video length"
                );
            }
        }

        tracing::info!(
            out = %self.out.display(),
            frames = stats.frames_written,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "render finished"
        );
        Ok(stats)
    }

    fn encode(&self, sequence: FrameSequence, rasterizer: &Rasterizer) -> GeoFadeResult<u64> {
        let canvas = rasterizer.canvas();
        let mut encoder = FfmpegEncoder::new(
            EncodeConfig {
                width: canvas.width,
                height: canvas.height,
                fps: self.config.fps,
                out_path: self.out.clone(),
                overwrite: true,
            },
            self.config.style.background,
        )?;

        let hold = self.config.frame_hold();
        let total = sequence.len();
        for (i, payload) in sequence.enumerate() {
            let frame = rasterizer.rasterize(&payload?)?;
            encoder.encode_frame(&frame, hold)?;
            if self.progress {
                eprint!("{}/{}\r", i + 1, total);
                let _ = std::io::stderr().flush();
            }
        }
        if self.progress {
            eprintln!();
        }

        let written = encoder.frames_written();
        encoder.finish()?;
        Ok(written)
    }
}

/// Viewport bounds: the first region when one is given, else every projected record.
fn view_bounds(
    regions: &[RegionGeometry],
    dataset: &Dataset,
    projection: &AlbersProjection,
) -> GeoFadeResult<Rect> {
    if let Some(b) = regions.first().and_then(RegionGeometry::bounds) {
        return Ok(b);
    }
    let projected = dataset
        .points
        .iter()
        .map(|p| p.position)
        .chain(dataset.background.iter().map(|b| b.position))
        .map(|ll| projection.project(ll));
    bounds_of(projected).ok_or_else(|| {
        GeoFadeError::empty_dataset("no region or record positions to frame the map")
    })
}

/// Flatten over `background` and save as PNG, creating the parent directory.
pub fn write_png(path: &Path, frame: &FrameRGBA, background: Rgb8) -> GeoFadeResult<()> {
    ensure_parent_dir(path)?;
    let mut opaque = vec![0u8; frame.data.len()];
    flatten_to_opaque_rgba8(
        &mut opaque,
        &frame.data,
        frame.premultiplied,
        background,
    )?;
    image::save_buffer_with_format(
        path,
        &opaque,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// `m:ss.ss`, as printed for the total video length.
pub fn format_video_length(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor();
    let rest = seconds - minutes * 60.0;
    format!("{}:{rest:.2}", minutes as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_length_is_minutes_and_hundredths() {
        assert_eq!(format_video_length(0.0), "0:0.00");
        assert_eq!(format_video_length(75.5), "1:15.50");
        assert_eq!(format_video_length(3.0 / 15.0), "0:0.20");
    }
}
