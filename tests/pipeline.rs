//! Tests for the smoothing + splitting pipeline

use chrono::{TimeZone, Utc};
use track_processor::{process_track, process_tracks, GeoPoint, Track, TrackConfig, TrackError};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn timed(lat: f64, secs: i64) -> GeoPoint {
    GeoPoint::new(lat, -105.1)
        .unwrap()
        .with_timestamp(Utc.timestamp_opt(1_688_500_800 + secs, 0).unwrap())
}

/// Two 10-minute rides separated by a 2h stop; the first ride ends in a
/// 6-sample jitter cloud before the stop.
fn commute() -> Track {
    let mut points = Vec::new();
    let mut t = 0;
    for i in 0..60 {
        points.push(timed(39.8 + i as f64 * 0.0003, t));
        t += 10;
    }
    for k in 0..6 {
        let jitter = if k % 2 == 0 { 0.0 } else { 0.000002 };
        points.push(timed(39.8 + 60.0 * 0.0003 + jitter, t));
        t += 10;
    }
    t += 7200;
    for i in 0..60 {
        points.push(timed(39.9 + i as f64 * 0.0003, t));
        t += 10;
    }
    Track::from_points(points)
}

#[test]
fn test_smooth_then_split() {
    init_logging();
    let track = commute();
    assert_eq!(track.len(), 126);

    let result = process_track(track, &TrackConfig::default()).unwrap();
    let smoothing = result.smoothing.unwrap();
    assert_eq!(smoothing.clouds, 1);
    assert_eq!(smoothing.nodes, 6);

    assert_eq!(result.split.segments.len(), 1);
    assert_eq!(result.tracks.len(), 2);
    // First ride keeps its 60 samples plus the pause/resume pair
    assert_eq!(result.tracks[0].len(), 62);
    assert_eq!(result.tracks[1].len(), 60);
    assert_eq!(result.tracks, result.split.tracks);
}

#[test]
fn test_smoothing_disabled() {
    init_logging();
    let config = TrackConfig {
        smooth: false,
        ..TrackConfig::default()
    };
    let result = process_track(commute(), &config).unwrap();
    assert!(result.smoothing.is_none());
    assert_eq!(result.tracks[0].len(), 66);
}

#[test]
fn test_config_from_json_drives_pipeline() {
    init_logging();
    // Stop threshold above the 2h gap keeps one track
    let config = TrackConfig::from_json_str(r#"{"maxStopDurationS": 10000}"#).unwrap();
    let result = process_track(commute(), &config).unwrap();
    assert_eq!(result.tracks.len(), 1);
    assert_eq!(result.tracks[0].len(), 122);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = TrackConfig {
        max_stop_duration_s: -5.0,
        ..TrackConfig::default()
    };
    assert!(matches!(
        process_track(commute(), &config),
        Err(TrackError::InvalidParameter { name: "max_stop_duration_s", .. })
    ));
}

#[test]
fn test_batch_processing() {
    init_logging();
    let tracks = vec![commute(), Track::new(), commute()];
    let results = process_tracks(tracks, &TrackConfig::default());
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().tracks.len(), 2);
    assert!(results[1].as_ref().unwrap().tracks.is_empty());
    assert_eq!(results[0], results[2]);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_sequential() {
    use track_processor::process_tracks_parallel;

    let tracks: Vec<Track> = (0..8).map(|_| commute()).collect();
    let sequential = process_tracks(tracks.clone(), &TrackConfig::default());
    let parallel = process_tracks_parallel(tracks, &TrackConfig::default());
    assert_eq!(sequential, parallel);
}
