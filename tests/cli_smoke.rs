use std::path::{Path, PathBuf};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_geofade")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "geofade.exe"
            } else {
                "geofade"
            });
            p
        })
}

fn fixture(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    std::fs::create_dir_all(dir).unwrap();
    let points = dir.join("points.csv");
    std::fs::write(
        &points,
        "timestamp,lat,lng\n2015-06-01,61.2181,-149.9003\n2015-06-03,64.8378,-147.7164\n2015-06-04,58.3019,-134.4197\n",
    )
    .unwrap();

    let background = dir.join("background.json");
    std::fs::write(
        &background,
        r#"{"customCoordinates": [{"lat": 60.55, "lng": -151.26, "imageDate": "2015-05"}]}"#,
    )
    .unwrap();

    let region = dir.join("region.geojson");
    std::fs::write(
        &region,
        r#"{"type": "Polygon", "coordinates": [[[-168, 54], [-130, 54], [-141, 70], [-168, 70], [-168, 54]]]}"#,
    )
    .unwrap();
    (points, background, region)
}

fn arg(p: &Path) -> String {
    p.to_string_lossy().to_string()
}

#[test]
fn cli_final_frame_writes_png_and_year_ranges() {
    let dir = PathBuf::from("target").join("cli_smoke").join("final_frame");
    let (points, background, region) = fixture(&dir);
    let out = dir.join("final.png");
    let ranges = dir.join("DATE_RANGES.json");
    let _ = std::fs::remove_file(&out);
    let _ = std::fs::remove_file(&ranges);

    let status = std::process::Command::new(exe())
        .args(["render", "--final-frame", "--in"])
        .arg(arg(&points))
        .args(["--background", arg(&background).as_str()])
        .args(["--region", arg(&region).as_str()])
        .args(["--out", arg(&out).as_str()])
        .args(["--ranges-out", arg(&ranges).as_str()])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out.exists());
    let img = image::open(&out).unwrap();
    assert_eq!((img.width(), img.height()), (1000, 600));

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&ranges).unwrap()).unwrap();
    assert_eq!(summary["2015"]["earliest"], "2015-06-01");
    assert_eq!(summary["2015"]["latest"], "2015-06-04");
}

#[test]
fn cli_render_rejects_unknown_document_shape() {
    let dir = PathBuf::from("target").join("cli_smoke").join("bad_shape");
    std::fs::create_dir_all(&dir).unwrap();
    let input = dir.join("points.json");
    std::fs::write(&input, r#"{"panoramas": []}"#).unwrap();

    let output = std::process::Command::new(exe())
        .args(["render", "--final-frame", "--in"])
        .arg(arg(&input))
        .args(["--ranges-out", arg(&dir.join("DATE_RANGES.json")).as_str()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized document shape"), "{stderr}");
}

#[test]
fn cli_gradient_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke").join("gradient");
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("bar.png");
    let _ = std::fs::remove_file(&out);

    let status = std::process::Command::new(exe())
        .args(["gradient", "--min-year", "2008", "--max-year", "2024"])
        .args(["--width", "600", "--height", "60", "--out"])
        .arg(arg(&out))
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out).unwrap();
    assert_eq!((img.width(), img.height()), (600, 60));
}

#[test]
fn cli_animation_writes_mp4_when_ffmpeg_is_available() {
    if !geofade::encode::ffmpeg::is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = PathBuf::from("target").join("cli_smoke").join("animation");
    let (points, background, _) = fixture(&dir);
    let out = dir.join("anim.mp4");
    let _ = std::fs::remove_file(&out);

    let status = std::process::Command::new(exe())
        .args(["render", "--progress", "--fps", "10", "--interval-ms", "200", "--in"])
        .arg(arg(&points))
        .args(["--background", arg(&background).as_str()])
        .args(["--out", arg(&out).as_str()])
        .args(["--ranges-out", arg(&dir.join("DATE_RANGES.json")).as_str()])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}
