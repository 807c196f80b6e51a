//! Engine state survives a save/load cycle through an on-disk database.

use studymeow_core::storage::state::{CARD_KEY, TASK_KEY};
use studymeow_core::{
    Config, Database, Difficulty, FixedSequence, NewTask, PersistedState, SessionKind,
    StudyEngine, TaskStatus,
};

fn open(dir: &tempfile::TempDir) -> Database {
    Database::open_at(&dir.path().join("studymeow.db")).unwrap()
}

#[test]
fn progress_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();

    let task_id = {
        let db = open(&dir);
        let mut engine = StudyEngine::new(
            PersistedState::load(&db, &config),
            &config,
            Box::new(FixedSequence::new(vec![0.1, 0.0])),
        );
        let task = engine
            .add_task(NewTask::new("Vocabulary", 25).difficulty(Difficulty::Easy))
            .unwrap();
        engine.start_session(Some(&task.id)).unwrap();
        let report = loop {
            if let Some(r) = engine.tick() {
                break r;
            }
        };
        db.record_session(
            report.completion.kind,
            report.completion.task_id.as_deref(),
            report.completion.elapsed_secs,
            chrono::Utc::now(),
        )
        .unwrap();
        engine.state().save(&db).unwrap();
        task.id
    };

    let db = open(&dir);
    let state = PersistedState::load(&db, &config);
    assert_eq!(state.tasks.get(&task_id).unwrap().status, TaskStatus::Completed);
    assert_eq!(state.progression.total_study_minutes, 25);
    assert_eq!(state.progression.card_count, 1);
    assert_eq!(state.cards.cards.len(), 1);
    assert_eq!(state.timer.kind(), SessionKind::Break);

    let sessions = db.sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration_secs, 1500);
    assert_eq!(db.today_focus_minutes().unwrap(), 25);
}

#[test]
fn corrupted_blob_only_resets_its_own_slice() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();
    let db = open(&dir);

    let mut engine = StudyEngine::new(
        PersistedState::fresh(&config),
        &config,
        Box::new(FixedSequence::new(vec![0.1, 0.0])),
    );
    engine.add_task(NewTask::new("Maps", 10)).unwrap();
    engine.apply_study_minutes(90).unwrap();
    engine.roll_for_card(Difficulty::Easy, 1.0).unwrap();
    engine.state().save(&db).unwrap();

    db.kv_set(TASK_KEY, "[{\"broken\":").unwrap();
    let state = PersistedState::load(&db, &config);
    assert!(state.tasks.is_empty());
    assert_eq!(state.progression.total_study_minutes, 90);
    assert_eq!(state.cards.cards.len(), 1);

    db.kv_delete(CARD_KEY).unwrap();
    let state = PersistedState::load(&db, &config);
    assert!(state.cards.cards.is_empty());
    assert_eq!(state.cards.library.len(), 8);
}
