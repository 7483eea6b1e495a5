use std::io::Write;

use tcx_hr_merge::config::Config;
use tcx_hr_merge::error::{AppError, ParseError, ReadError};
use tcx_hr_merge::pipeline::read;
use tempfile::{NamedTempFile, TempDir};

const SMALL_TCX: &str = r#"<TrainingCenterDatabase><Activities><Activity Sport="Running"><Id>run</Id><Lap StartTime="2024-05-01T10:00:00Z"><Track><Trackpoint><Time>2024-05-01T10:00:00Z</Time></Trackpoint></Track></Lap></Activity></Activities></TrainingCenterDatabase>"#;

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

#[test]
fn reads_file_within_limit() {
    let file = temp_file(SMALL_TCX);
    let bytes = read::read_input(file.path(), &Config::with_max_file_size_mb(1)).expect("read");
    assert_eq!(bytes, SMALL_TCX.as_bytes());
}

#[test]
fn missing_file_reports_path() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("missing.tcx");

    let err = read::read_input(&path, &Config::with_max_file_size_mb(1)).expect_err("must fail");
    match &err {
        ReadError::Io { path: reported, source } => {
            assert_eq!(reported, &path);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("missing.tcx"));
}

#[test]
fn file_over_limit_is_rejected() {
    let file = temp_file(SMALL_TCX);
    let config = Config { max_file_size: 16 };

    let err = read::read_input(file.path(), &config).expect_err("must fail");
    match err {
        ReadError::TooLarge { size, limit, .. } => {
            assert_eq!(size, SMALL_TCX.len() as u64);
            assert_eq!(limit, 16);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn load_parses_readable_file() {
    let file = temp_file(SMALL_TCX);
    let document = read::load(file.path(), &Config::with_max_file_size_mb(1)).expect("load");
    assert_eq!(document.activity.id, "run");
    assert_eq!(document.activity.trackpoint_count(), 1);
}

#[test]
fn parse_failure_names_the_file() {
    let file = temp_file("<gpx></gpx>");
    let err = read::load(file.path(), &Config::with_max_file_size_mb(1)).expect_err("must fail");

    match &err {
        AppError::Parse { file: reported, source } => {
            assert_eq!(reported, file.path());
            assert!(matches!(source, ParseError::UnexpectedRoot(name) if name == "gpx"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let file_name = file.path().file_name().and_then(|n| n.to_str()).expect("file name");
    assert!(err.to_string().contains(file_name));
}
