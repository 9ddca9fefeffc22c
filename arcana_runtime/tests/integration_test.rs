//! Integration tests for arcana_runtime.
//!
//! File-based tests use per-test temporary directories.

use std::fs;
use std::path::PathBuf;

use arcana_engine::actions::CasterAction;
use arcana_engine::dice::FixedRoller;
use arcana_engine::domain::{Ability, CasterRecord, RestKind};
use arcana_engine::engine::ActionOutcome;
use arcana_engine::state::new_arcanist;
use arcana_runtime::config::RuntimeConfig;
use arcana_runtime::drift::{compare_records, verify_determinism};
use arcana_runtime::replay;
use arcana_runtime::scenario::Scenario;
use arcana_runtime::session::{CasterSession, LogEntry};
use arcana_runtime::snapshot_codec::{
    export_snapshot_to_file, import_snapshot_from_file, snapshot_hash,
};

fn load_scenario() -> Scenario {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join("templar_day.json");
    Scenario::load(&path).expect("failed to load templar_day.json")
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("arcana_runtime_tests").join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn run(scenario: &Scenario, rolls: Vec<i32>) -> (CasterSession, Vec<ActionOutcome>) {
    let mut session =
        CasterSession::new(scenario.record.clone(), Box::new(FixedRoller::new(rolls)), true)
            .expect("scenario record is valid");
    let outcomes = scenario
        .actions()
        .expect("catalog resolves")
        .into_iter()
        .map(|a| session.apply(a).expect("action applies"))
        .collect();
    (session, outcomes)
}

// ─────────────────────────────────────────────────────────────
// Scenario walk-through
// ─────────────────────────────────────────────────────────────

#[test]
fn scenario_produces_expected_reports() {
    let scenario = load_scenario();
    let (session, outcomes) = run(&scenario, vec![6]);
    assert_eq!(outcomes.len(), 10);

    let ActionOutcome::Cast(first) = &outcomes[0] else {
        panic!("step 1 should be a cast");
    };
    assert!(first.success);
    assert_eq!((first.cost, first.generated), (2, 3));
    assert_eq!(first.harmony_bonus, Some(1));

    assert_eq!(outcomes[1], ActionOutcome::HarmonyUpdated { from: 0, to: 2 });

    let ActionOutcome::Cast(overchannel) = &outcomes[3] else {
        panic!("step 4 should be a cast");
    };
    assert!(overchannel.success && overchannel.overclocked);
    assert_eq!((overchannel.cost, overchannel.generated), (3, 8));

    let ActionOutcome::Cast(broke) = &outcomes[4] else {
        panic!("step 5 should be a cast");
    };
    assert!(!broke.success);
    assert_eq!(broke.errors[0].code, "insufficient_resource");

    let ActionOutcome::Save(save) = &outcomes[5] else {
        panic!("step 6 should be a save");
    };
    assert_eq!((save.dc, save.roll, save.total), (10, 6, 11));
    assert!(save.success);

    // Long rest returns everything except harmony to the starting values.
    let CasterRecord::Templar(end) = session.record() else {
        panic!("templar scenario");
    };
    let CasterRecord::Templar(start) = &scenario.record else {
        panic!("templar scenario");
    };
    assert_eq!(end.charges, start.charges);
    assert_eq!(end.faith_feedback, start.faith_feedback);
    assert_eq!(end.resonance_harmony, 2);
}

// ─────────────────────────────────────────────────────────────
// Replay
// ─────────────────────────────────────────────────────────────

#[test]
fn replay_matches_live_session() {
    let scenario = load_scenario();
    let mut session = CasterSession::from_config(scenario.record.clone(), &RuntimeConfig::default())
        .expect("valid record");
    for action in scenario.actions().unwrap() {
        session.apply(action).unwrap();
    }
    let (replayed, hash) = replay::rebuild_record(&scenario.record, session.log()).unwrap();
    assert_eq!(&replayed, session.record());
    assert_eq!(hash, session.current_hash().unwrap());
    assert!(compare_records(session.record(), &replayed).is_clean());
    assert!(verify_determinism(&scenario.record, session.log()).unwrap());
}

#[test]
fn log_survives_serialization() {
    let scenario = load_scenario();
    let (session, _) = run(&scenario, vec![15]);
    let json = serde_json::to_string(session.log()).unwrap();
    let entries: Vec<LogEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(entries, session.log());
    assert_eq!(
        replay::rebuild_hash(&scenario.record, &entries).unwrap(),
        session.current_hash().unwrap()
    );
}

#[test]
fn replay_reports_failing_step() {
    let scenario = load_scenario();
    let entries = vec![
        LogEntry {
            action: CasterAction::Rest {
                kind: RestKind::Short,
            },
            roll: None,
        },
        LogEntry {
            action: CasterAction::UpdateHarmony {
                cast_type: "radiant".into(),
                recent: Vec::new(),
                succeeded: false,
            },
            roll: None,
        },
    ];
    assert!(replay::rebuild_record(&scenario.record, &entries).is_ok());

    let arcanist = CasterRecord::Arcanist(new_arcanist(3, Ability::Intelligence, 1, 4));
    let err = replay::rebuild_record(&arcanist, &entries).unwrap_err();
    assert_eq!(
        err.to_string(),
        "step 2: update_harmony does not apply to Arcanist casters"
    );
}

// ─────────────────────────────────────────────────────────────
// Snapshots
// ─────────────────────────────────────────────────────────────

#[test]
fn snapshot_replay_parity() {
    let dir = temp_dir("snapshot_parity");
    let scenario = load_scenario();
    let (session, _) = run(&scenario, vec![3]);

    let path = dir.join("final.json");
    export_snapshot_to_file(session.record(), &path).unwrap();
    let restored = import_snapshot_from_file(&path).unwrap();
    assert_eq!(&restored, session.record());
    assert_eq!(
        snapshot_hash(&restored).unwrap(),
        snapshot_hash(session.record()).unwrap()
    );
}

#[test]
fn mid_session_snapshot_resumes_identically() {
    let dir = temp_dir("resume");
    let scenario = load_scenario();
    let actions = scenario.actions().unwrap();
    let (split_at, rolls) = (4, vec![12]);

    let (full, _) = run(&scenario, rolls.clone());

    let mut first = CasterSession::new(
        scenario.record.clone(),
        Box::new(FixedRoller::new(Vec::new())),
        true,
    )
    .unwrap();
    for action in actions[..split_at].iter().cloned() {
        first.apply(action).unwrap();
    }
    let path = dir.join("mid.json");
    export_snapshot_to_file(first.record(), &path).unwrap();

    let resumed = import_snapshot_from_file(&path).unwrap();
    let mut second = CasterSession::new(resumed, Box::new(FixedRoller::new(rolls)), true).unwrap();
    for action in actions[split_at..].iter().cloned() {
        second.apply(action).unwrap();
    }
    assert_eq!(second.current_hash().unwrap(), full.current_hash().unwrap());
}
