use tracereplay::{alloc_color, DatasetBuilder, Rgb, TelemetrySample};

fn sample(t: f64, values: &[(&str, f64)]) -> TelemetrySample {
    let mut s = TelemetrySample::new(t);
    for (name, v) in values {
        s = s.with_value(name, *v);
    }
    s
}

#[test]
fn builder_sorts_samples_by_timestamp() {
    let dataset = DatasetBuilder::new()
        .channel("a", "")
        .sample(sample(2.0, &[("a", 2.0)]))
        .sample(sample(0.0, &[("a", 0.0)]))
        .sample(sample(1.0, &[("a", 1.0)]))
        .build();
    let timestamps: Vec<f64> = dataset.samples().iter().map(|s| s.timestamp).collect();
    assert_eq!(timestamps, vec![0.0, 1.0, 2.0]);
    assert_eq!(dataset.duration(), 2.0);
}

#[test]
fn empty_dataset_has_zero_duration() {
    let dataset = DatasetBuilder::new().channel("a", "").build();
    assert!(dataset.is_empty());
    assert_eq!(dataset.duration(), 0.0);
}

#[test]
fn value_ranges_cover_the_whole_session() {
    let dataset = DatasetBuilder::new()
        .channel("a", "V")
        .channel("b", "V")
        .sample(sample(0.0, &[("a", -3.0), ("b", 1.0)]))
        .sample(sample(1.0, &[("a", 7.5)]))
        .sample(sample(2.0, &[("a", 0.0), ("b", 4.0)]))
        .build();
    let a = dataset.channel("a").unwrap();
    assert_eq!(a.min_value, -3.0);
    assert_eq!(a.max_value, 7.5);
    let b = dataset.channel("b").unwrap();
    assert_eq!(b.min_value, 1.0);
    assert_eq!(b.max_value, 4.0);
}

#[test]
fn channel_defined_by_no_sample_gets_empty_range() {
    let dataset = DatasetBuilder::new()
        .channel("a", "")
        .channel("ghost", "")
        .sample(sample(0.0, &[("a", 5.0)]))
        .build();
    let ghost = dataset.channel("ghost").unwrap();
    assert_eq!((ghost.min_value, ghost.max_value), (0.0, 0.0));
}

#[test]
fn first_two_channels_default_visible() {
    let dataset = DatasetBuilder::new()
        .channel("a", "")
        .channel("b", "")
        .channel("c", "")
        .build();
    let visible: Vec<bool> = dataset.channels().iter().map(|c| c.visible).collect();
    assert_eq!(visible, vec![true, true, false]);
}

#[test]
fn explicit_visibility_and_color_win_over_defaults() {
    let dataset = DatasetBuilder::new()
        .channel_with("a", "", Some(Rgb(1, 2, 3)), Some(false))
        .channel("b", "")
        .build();
    let a = dataset.channel("a").unwrap();
    assert_eq!(a.color, Rgb(1, 2, 3));
    assert!(!a.visible);
    assert_eq!(dataset.channels()[1].color, alloc_color(1));
}

#[test]
fn palette_colors_are_distinct_over_one_cycle() {
    let mut seen = std::collections::HashSet::new();
    for i in 0..10 {
        let Rgb(r, g, b) = alloc_color(i);
        assert!(seen.insert((r, g, b)), "palette color {i} repeated");
    }
    assert_eq!(alloc_color(10), alloc_color(0));
}

#[test]
fn sample_range_is_inclusive_on_both_ends() {
    let dataset = DatasetBuilder::new()
        .channel("a", "")
        .samples((0..5).map(|t| sample(t as f64, &[("a", 0.0)])))
        .build();
    assert_eq!(dataset.sample_range(1.0, 3.0), 1..4);
    assert_eq!(dataset.sample_range(0.5, 3.5), 1..4);
    assert_eq!(dataset.sample_range(0.0, 4.0), 0..5);
    assert_eq!(dataset.sample_range(10.0, 20.0), 5..5);
    assert_eq!(dataset.sample_range(3.0, 1.0), 0..0);
}
