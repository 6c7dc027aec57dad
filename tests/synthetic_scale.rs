//! Scale tests against synthetic recordings with known ground truth.
//!
//! Run with: `cargo test --features synthetic --test synthetic_scale`

use track_processor::synthetic::SyntheticScenario;
use track_processor::{process_track, TrackConfig};

#[test]
fn test_default_scenario_ground_truth() {
    let generated = SyntheticScenario::default().generate().unwrap();
    let input_len = generated.track.len();

    let result = process_track(generated.track, &TrackConfig::default()).unwrap();
    let smoothing = result.smoothing.unwrap();
    assert_eq!(smoothing.clouds, generated.expected_clouds);
    assert_eq!(smoothing.nodes, generated.expected_cloud_points);
    assert_eq!(result.split.segments.len(), generated.expected_stops);
    assert_eq!(result.tracks.len(), generated.expected_tracks);

    let output_len: usize = result.tracks.iter().map(|t| t.len()).sum();
    assert_eq!(
        output_len,
        input_len - generated.expected_cloud_points + 2 * generated.expected_clouds
    );
}

#[test]
fn test_many_legs() {
    let generated = SyntheticScenario::with_size(20, 200).generate().unwrap();
    let config = TrackConfig {
        iterate_overlapping: true,
        ..TrackConfig::default()
    };
    let result = process_track(generated.track, &config).unwrap();
    assert_eq!(result.tracks.len(), 20);
    assert_eq!(result.smoothing.unwrap().clouds, generated.expected_clouds);
}

#[test]
#[ignore] // slow in debug builds
fn test_large_recording() {
    let generated = SyntheticScenario::with_size(50, 2000).generate().unwrap();
    let result = process_track(generated.track, &TrackConfig::default()).unwrap();
    assert_eq!(result.tracks.len(), 50);
}
