//! Replays the bundled scenario scripts and checks the reports.

use std::path::PathBuf;

use glide_harness::cli::{Cli, Commands, RunArgs, load_config, render_summary, run};
use glide_core::ConfigError;
use glide_harness::{HarnessError, Script, run_script};
use pretty_assertions::assert_eq;

fn bundled(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scripts")
        .join(name)
}

#[test]
fn drag_commit_script() {
    let script = Script::from_file(bundled("drag_commit.json")).expect("bundled script");
    let report = run_script(&script, None).expect("runs");
    let state = report.final_state.as_ref().expect("rendered");
    assert_eq!(state.active_slide, 1);
    assert_eq!(report.commits, 2);
    assert!(report.leaks.is_empty());
    assert_eq!(state.displayed_px, -800.0);
}

#[test]
fn auto_advance_bounce_script() {
    let script = Script::from_file(bundled("auto_advance_bounce.json")).expect("bundled script");
    let report = run_script(&script, None).expect("runs");
    let state = report.final_state.as_ref().expect("rendered");
    assert_eq!(report.ticks, 4);
    assert_eq!(state.active_slide, 0);
    assert_eq!(state.direction, "Backward");
    let slides: Vec<usize> = report.paints.iter().map(|p| p.active_slide).collect();
    assert_eq!(slides, vec![0, 1, 2, 1, 0]);
    assert!(
        report
            .paints
            .iter()
            .all(|p| p.transition.as_deref() == Some("all 300ms ease-in-out"))
    );
}

#[test]
fn multi_touch_script_follows_first_finger() {
    let script = Script::from_file(bundled("multi_touch.json")).expect("bundled script");
    let report = run_script(&script, None).expect("runs");
    let state = report.final_state.as_ref().expect("rendered");
    assert_eq!(state.active_slide, 1);
    assert_eq!(report.commits, 1);
    assert_eq!(report.ticks, 0, "interval is paused for the whole drag");
    let reasons: Vec<&str> = report.ignored.iter().map(|i| i.reason.as_str()).collect();
    assert_eq!(
        reasons,
        vec![
            "Gesture(PointerMismatch)",
            "Gesture(PointerMismatch)"
        ]
    );
    assert!(report.leaks.is_empty());
}

#[test]
fn toml_config_overrides_script_config() {
    let config = load_config(&bundled("carousel.toml")).expect("bundled config");
    assert_eq!(config.transition_speed_ms, 350);
    let script = Script::from_file(bundled("drag_commit.json")).expect("bundled script");
    let report = run_script(&script, Some(config)).expect("runs");
    let settled = report
        .paints
        .iter()
        .rev()
        .find(|p| !p.dragging)
        .expect("a settled paint");
    assert_eq!(settled.transition.as_deref(), Some("all 350ms ease-out"));
}

#[test]
fn json_config_loaded_by_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("carousel.json");
    std::fs::write(&path, r#"{"nextSlideDragSnapTouchTolerance": 40}"#).expect("write");
    let config = load_config(&path).expect("json config");
    assert_eq!(config.next_slide_drag_snap_touch_tolerance, 40.0);
}

#[test]
fn invalid_config_file_exits_with_two() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "transitionTimingFunction = \"wobble\"\n").expect("write");
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, HarnessError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn cli_run_accepts_temp_script() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scenario.json");
    std::fs::write(
        &path,
        r#"{"slides":2,"steps":[{"advance":2000},"dispose"]}"#,
    )
    .expect("write");
    let result = run(Cli {
        command: Commands::Run(RunArgs {
            script: path,
            config: None,
            json: true,
        }),
    });
    assert!(result.is_ok(), "{result:?}");
}

#[test]
fn inline_config_out_of_range_exits_with_two() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad_config.json");
    std::fs::write(
        &path,
        r#"{"slides":3,"config":{"nextSlideDragSnapMouseTolerance":180,"transitionTimingFunction":"wobble"},"steps":["dispose"]}"#,
    )
    .expect("write");
    let script = Script::from_file(&path).expect("well-formed script");
    let err = run_script(&script, None).unwrap_err();
    match &err {
        HarnessError::Config(ConfigError::Validation(problems)) => {
            assert_eq!(problems.len(), 2, "{problems:?}");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert_eq!(err.exit_code(), 2);

    let result = run(Cli {
        command: Commands::Run(RunArgs {
            script: path,
            config: None,
            json: false,
        }),
    });
    assert!(matches!(result, Err(HarnessError::Config(_))));
}

#[test]
fn cli_run_reports_malformed_script() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").expect("write");
    let result = run(Cli {
        command: Commands::Run(RunArgs {
            script: path,
            config: None,
            json: false,
        }),
    });
    assert!(matches!(result, Err(HarnessError::Json(_))));
}

#[test]
fn summary_mentions_state_and_ignored_steps() {
    let script = Script::from_file(bundled("multi_touch.json")).expect("bundled script");
    let report = run_script(&script, None).expect("runs");
    let summary = render_summary(&report);
    assert!(summary.starts_with("slides=4 active=1 direction=Forward"));
    assert!(summary.contains("ignored step 2: Gesture(PointerMismatch)"));
    assert!(!summary.contains("LEAK"));
}

#[test]
fn report_serializes_to_json() {
    let script = Script::from_file(bundled("drag_commit.json")).expect("bundled script");
    let report = run_script(&script, None).expect("runs");
    let value = serde_json::to_value(&report).expect("serializable");
    assert_eq!(value["final_state"]["active_slide"], 1);
    assert_eq!(value["leaks"], serde_json::json!([]));
}
