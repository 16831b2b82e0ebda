//! Preset history on disk and session restore.

use tempfile::TempDir;

use fractune::context::GenerationContext;
use fractune::melody::Voice;
use fractune::preset::persistence::{export_preset, load_history, load_preset, save_history};
use fractune::preset::{PresetError, PresetHistory};
use fractune::spec::FractalType;

fn session() -> GenerationContext {
    let mut ctx = GenerationContext::seeded(7).unwrap();
    ctx.select_type(Voice::Melody, FractalType::Koch).unwrap();
    ctx.set_depth(Voice::Melody, 2).unwrap();
    ctx.use_lsystem(Voice::Bass).unwrap();
    ctx.apply_rules_json(Voice::Drums, r#"{"points": 3000}"#).unwrap();
    ctx
}

#[test]
fn saved_session_reloads_with_identical_notes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("presets.json");

    let original = session();
    let mut history = PresetHistory::new();
    let id = history.push(original.snapshot());
    save_history(&path, &history).unwrap();

    let loaded = load_history(&path).unwrap();
    let preset = loaded.find(id).unwrap();

    let mut restored = GenerationContext::seeded(7).unwrap();
    restored.load_preset(preset);
    let mut replay = session();
    for voice in Voice::ALL {
        assert_eq!(restored.spec(voice), replay.spec(voice));
        assert_eq!(restored.notes(voice), replay.notes(voice), "{voice}");
    }
}

#[test]
fn history_keeps_newest_first() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("presets.json");

    let ctx = session();
    let mut history = load_history(&path).unwrap();
    let first = history.push(ctx.snapshot());
    let second = history.push(ctx.snapshot());
    assert_ne!(first, second);
    save_history(&path, &history).unwrap();

    let loaded = load_history(&path).unwrap();
    let ids: Vec<u64> = loaded.iter().map(|p| p.id).collect();
    assert_eq!(ids, [second, first]);
}

#[test]
fn exported_preset_renders_a_composition() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fractal_music_preset.json");
    export_preset(&path, &session().snapshot()).unwrap();

    let preset = load_preset(&path).unwrap();
    let mut ctx = GenerationContext::seeded(1).unwrap();
    ctx.load_preset(&preset);
    let composition = ctx.compose("from file");

    assert_eq!(composition.title, "from file");
    assert_eq!(composition.drums.len(), 3);
    assert!(!composition.melody.is_empty());
    assert!(composition.end() > composition.melody[0].start);
}

#[test]
fn exporting_a_missing_id_fails() {
    let history = PresetHistory::new();
    assert!(matches!(history.export(99), Err(PresetError::NotFound(99))));
}

#[test]
fn hand_edited_preset_with_bad_rules_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(
        &path,
        r#"{"id": 1, "timestamp": 1,
            "melody": {"type": "tree", "depth": 3, "rules": {"branches": 0}},
            "bass": {"type": "dragon", "depth": 3},
            "drums": {"type": "barnsley", "depth": 3}}"#,
    )
    .unwrap();
    assert!(matches!(load_preset(&path), Err(PresetError::Json(_))));
}
