use std::path::Path;

use tracereplay::{
    CsvSource, DatasetBuilder, DatasetSource, LoadError, LoadPolicy, ReplayConfig,
    TelemetryDataset, TelemetrySample, TimelineSession,
};

fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn reads_table_with_unit_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "trace.csv",
        "time,throttle,rpm\n\
         ms,%,1/min\n\
         0,0.0,1000\n\
         500,25.5,\n\
         1000,50.0,3000\n",
    );
    let dataset = CsvSource::default().load(&path).unwrap();

    let names: Vec<&str> = dataset.channels().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["throttle", "rpm"]);
    assert_eq!(dataset.channel("throttle").unwrap().unit, "%");
    assert_eq!(dataset.channel("rpm").unwrap().unit, "1/min");

    // timestamps are converted from milliseconds to seconds
    assert_eq!(dataset.duration(), 1.0);
    assert_eq!(dataset.samples().len(), 3);

    // blank cells leave the channel undefined for that sample
    let sparse = &dataset.samples()[1];
    assert_eq!(sparse.values.get("throttle"), Some(&25.5));
    assert_eq!(sparse.values.get("rpm"), None);
}

#[test]
fn reads_table_without_unit_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "trace.csv", "time,a,b\n0,1,2\n1000,3,4\n");
    let dataset = CsvSource::default().load(&path).unwrap();
    assert_eq!(dataset.channel("a").unwrap().unit, "");
    assert_eq!(dataset.samples().len(), 2);
    assert_eq!(dataset.duration(), 1.0);
}

#[test]
fn rows_with_non_numeric_timestamps_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "trace.csv", "time,a\n0,1\njunk,2\n1000,3\n");
    let dataset = CsvSource::default().load(&path).unwrap();
    assert_eq!(dataset.samples().len(), 2);
}

#[test]
fn blank_channel_names_get_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "trace.csv", "time,,b\n0,1,2\n1000,3,4\n");
    let dataset = CsvSource::default().load(&path).unwrap();
    assert_eq!(dataset.channels()[0].name, "Channel 1");
    assert_eq!(dataset.channels()[1].name, "b");
}

#[test]
fn column_support_is_capped() {
    let dir = tempfile::tempdir().unwrap();
    let header: Vec<String> = std::iter::once("time".to_string())
        .chain((0..12).map(|i| format!("c{i}")))
        .collect();
    let row: Vec<String> = std::iter::once("0".to_string())
        .chain((0..12).map(|i| i.to_string()))
        .collect();
    let body = format!("{}\n{}\n{}\n", header.join(","), row.join(","), row.join(","));
    let path = write_csv(&dir, "wide.csv", &body);
    let dataset = CsvSource::default().load(&path).unwrap();
    assert_eq!(dataset.channels().len(), 8);
}

#[test]
fn too_small_tables_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "one_row.csv", "time,a\n");
    let err = CsvSource::default().load(&path).unwrap_err();
    assert!(matches!(err, LoadError::FormatInvalid(_)));

    let path = write_csv(&dir, "one_col.csv", "time\n0\n1\n");
    let err = CsvSource::default().load(&path).unwrap_err();
    assert!(matches!(err, LoadError::FormatInvalid(_)));
}

#[test]
fn missing_file_is_unreadable() {
    let err = CsvSource::default()
        .load(Path::new("/nonexistent/trace.csv"))
        .unwrap_err();
    assert!(matches!(err, LoadError::Unreadable { .. }));
}

// ── Load policy ──────────────────────────────────────────────────────────

struct FailingSource;

impl DatasetSource for FailingSource {
    fn load(&self, _path: &Path) -> Result<TelemetryDataset, LoadError> {
        Err(LoadError::FormatInvalid("synthetic".to_string()))
    }
}

fn seeded_session(policy: LoadPolicy) -> TimelineSession {
    let config = ReplayConfig {
        load_policy: policy,
        ..ReplayConfig::default()
    };
    let mut session = TimelineSession::new(config);
    session.set_dataset(
        DatasetBuilder::new()
            .channel("A", "")
            .sample(TelemetrySample::new(0.0).with_value("A", 1.0))
            .sample(TelemetrySample::new(2.0).with_value("A", 2.0))
            .build(),
    );
    session
}

#[test]
fn preserve_on_failure_keeps_the_previous_dataset() {
    let mut session = seeded_session(LoadPolicy::PreserveOnFailure);
    let err = session.load_dataset(&FailingSource, Path::new("whatever"));
    assert!(err.is_err());
    assert!(session.dataset().is_some());
    assert_eq!(session.duration(), 2.0);
}

#[test]
fn clear_first_leaves_an_empty_session_on_failure() {
    let mut session = seeded_session(LoadPolicy::ClearFirst);
    let err = session.load_dataset(&FailingSource, Path::new("whatever"));
    assert!(err.is_err());
    assert!(session.dataset().is_none());
    assert_eq!(session.duration(), 0.0);
    assert_eq!(session.cursor(), 0.0);
}

#[test]
fn successful_load_installs_view_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "trace.csv",
        "time,a,b,c\n0,1,2,3\n10000,4,5,6\n",
    );
    let mut session = TimelineSession::default();
    session.load_dataset(&CsvSource::default(), &path).unwrap();

    assert_eq!(session.duration(), 10.0);
    assert_eq!(session.cursor(), 0.0);
    // first two channels visible, initial window length from config
    let visible: Vec<&str> = session.visible_channels().iter().map(String::as_str).collect();
    assert_eq!(visible, vec!["a", "b"]);
    assert_eq!(session.window_length(), 5.0);
}
