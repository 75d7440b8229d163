use std::collections::BTreeSet;
use std::fs;
use std::io::Cursor;

use tape_menu::{
    InputEvent, ItemStore, MenuEngine, MenuError, MenuOptions, OutcomeStatus, PrioritySet,
    Separator, Step,
};

fn lines(input: &str) -> Cursor<Vec<u8>> {
    Cursor::new(input.as_bytes().to_vec())
}

fn displays(engine: &MenuEngine) -> Vec<String> {
    engine
        .matches()
        .ids()
        .map(|id| engine.store().get(id).unwrap().display().to_string())
        .collect()
}

#[test]
fn prefix_tier_scenario_preserves_load_order() {
    let options = MenuOptions::new().fuzzy(false);
    let mut engine = MenuEngine::from_reader(lines("apple\nbanana\napricot\n"), options).unwrap();
    engine.type_text("ap");
    assert_eq!(displays(&engine), vec!["apple", "apricot"]);
}

#[test]
fn instant_accept_commits_single_match_without_enter() {
    for query in ["o", "on", "only", "ly"] {
        let options = MenuOptions::new().instant(true);
        let mut engine = MenuEngine::from_reader(lines("only\n"), options).unwrap();
        let mut last = Step::Unchanged;
        for ch in query.chars() {
            last = engine.handle_event(&InputEvent::text(ch.to_string()));
            if matches!(last, Step::Finished(_)) {
                break;
            }
        }
        let Step::Finished(outcome) = last else {
            panic!("query {query:?} did not instant-accept");
        };
        assert_eq!(outcome.status, OutcomeStatus::InstantAccepted);
        assert_eq!(outcome.output, vec!["only"]);
    }
}

#[test]
fn paging_forward_visits_every_match_once() {
    let input: String = (0..47).map(|i| format!("entry {i}\n")).collect();
    for lines_option in [0usize, 1, 4, 10] {
        let options = MenuOptions::new().fuzzy(false).lines(lines_option);
        let mut engine = MenuEngine::from_reader(lines(&input), options)
            .unwrap()
            .with_strip_width(70);
        let mut seen = Vec::new();
        loop {
            let view = engine.view();
            seen.extend(view.items.iter().map(|item| item.position));
            if !view.has_next {
                break;
            }
            assert_eq!(engine.press("pagedown"), Step::Redraw);
        }
        let unique: BTreeSet<usize> = seen.iter().copied().collect();
        assert_eq!(seen.len(), 47, "lines = {lines_option}");
        assert_eq!(unique.len(), 47, "lines = {lines_option}");
    }
}

#[test]
fn paging_back_returns_to_head() {
    let input: String = (0..20).map(|i| format!("row{i}\n")).collect();
    let options = MenuOptions::new().fuzzy(false).lines(6);
    let mut engine = MenuEngine::from_reader(lines(&input), options).unwrap();
    engine.press("pagedown");
    engine.press("pagedown");
    engine.press("pagedown");
    assert_eq!(engine.page().start, 18);
    while engine.press("pageup") == Step::Redraw {}
    assert_eq!(engine.page().start, 0);
    assert_eq!(engine.selection().current(), Some(0));
}

#[test]
fn separator_controls_display_and_output() {
    let options = MenuOptions::new()
        .fuzzy(false)
        .separator(Separator::new('\t').reverse(true));
    let mut engine =
        MenuEngine::from_reader(lines("/usr/bin/firefox\tFirefox\n/usr/bin/gimp\tGIMP\n"), options)
            .unwrap();
    engine.type_text("gi");
    assert_eq!(displays(&engine), vec!["GIMP"]);
    let Step::Finished(outcome) = engine.press("enter") else {
        panic!("expected accept");
    };
    assert_eq!(outcome.output, vec!["/usr/bin/gimp"]);
}

#[test]
fn priority_items_rank_before_plain_prefixes() {
    let options = MenuOptions::new()
        .fuzzy(false)
        .priority_items(["terminator"]);
    let mut engine =
        MenuEngine::from_reader(lines("term-a\nterminator\nterm-b\n"), options).unwrap();
    engine.type_text("term");
    assert_eq!(displays(&engine), vec!["term-a", "terminator", "term-b"]);
    engine.type_text(" x");
    assert!(displays(&engine).is_empty());
    engine.press("backspace");
    assert_eq!(displays(&engine), vec!["terminator", "term-a", "term-b"]);
    engine.type_text("a");
    assert_eq!(displays(&engine), vec!["terminator", "term-a"]);
}

#[test]
fn fuzzy_mode_ranks_tighter_matches_first() {
    let options = MenuOptions::new();
    let mut engine = MenuEngine::from_reader(
        lines("xfirefoxx\nfile-explorer\nfirefox\nchromium\n"),
        options,
    )
    .unwrap();
    engine.type_text("ffx");
    let ranked = displays(&engine);
    assert_eq!(ranked.first().map(String::as_str), Some("firefox"));
    assert!(!ranked.contains(&"chromium".to_string()));
}

#[test]
fn history_is_loaded_recorded_and_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu").join("history");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "alpha\nbeta\n").unwrap();

    let options = MenuOptions::new().fuzzy(false).history_path(&path);
    let mut engine =
        MenuEngine::from_reader(lines("alpha\nbeta\ngamma\n"), options.clone()).unwrap();
    engine.press("alt+p");
    assert_eq!(engine.query(), "beta");
    engine.press("alt+p");
    assert_eq!(engine.query(), "alpha");
    engine.press("enter");
    assert_eq!(fs::read_to_string(&path).unwrap(), "beta\nalpha\n");

    let mut engine = MenuEngine::from_reader(lines("alpha\nbeta\ngamma\n"), options).unwrap();
    engine.type_text("alpha");
    engine.press("enter");
    assert_eq!(fs::read_to_string(&path).unwrap(), "beta\nalpha\n");
}

#[test]
fn history_cap_applies_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history");
    fs::write(&path, "one\ntwo\nthree\n").unwrap();

    let options = MenuOptions::new().max_history(2).history_path(&path);
    let mut engine = MenuEngine::from_reader(lines("four\n"), options).unwrap();
    assert_eq!(engine.history().len(), 3);
    engine.press("enter");
    assert_eq!(fs::read_to_string(&path).unwrap(), "three\nfour\n");
}

#[test]
fn history_save_failure_does_not_block_commit() {
    let dir = tempfile::tempdir().unwrap();
    let parent = dir.path().join("state");
    let options = MenuOptions::new().history_path(parent.join("history"));
    let mut engine = MenuEngine::from_reader(lines("item\n"), options).unwrap();
    // A file where the history directory should be makes the save fail.
    fs::write(&parent, "").unwrap();
    let Step::Finished(outcome) = engine.press("enter") else {
        panic!("expected accept");
    };
    assert_eq!(outcome.output, vec!["item"]);
}

#[test]
fn unreadable_history_path_is_a_fatal_init_error() {
    let dir = tempfile::tempdir().unwrap();
    let options = MenuOptions::new().history_path(dir.path());
    let err = match MenuEngine::from_reader(lines("item\n"), options) {
        Ok(_) => panic!("directory history path must fail"),
        Err(err) => err,
    };
    assert!(matches!(err, MenuError::History(_)));
}

#[test]
fn multi_select_survives_refiltering() {
    let store = ItemStore::from_lines(
        ["red", "green", "blue", "grey"],
        None,
        &PrioritySet::default(),
    );
    let mut engine = MenuEngine::new(MenuOptions::new().fuzzy(false), store);
    engine.type_text("gr");
    engine.press("ctrl+enter");
    engine.press("down");
    engine.press("ctrl+enter");
    engine.press("ctrl+enter");
    engine.press("ctrl+u");
    engine.type_text("b");
    engine.press("ctrl+enter");
    assert_eq!(engine.selection().chosen().collect::<Vec<_>>(), vec![1, 2]);
    let Step::Finished(outcome) = engine.press("enter") else {
        panic!("expected accept");
    };
    assert_eq!(outcome.text(), "green\nblue");
}

#[test]
fn word_motion_reaches_line_start() {
    let store = ItemStore::default();
    let mut engine = MenuEngine::new(MenuOptions::new(), store);
    engine.type_text("hello world");
    engine.press("ctrl+left");
    assert_eq!(engine.buffer().cursor(), 6);
    engine.press("ctrl+left");
    assert_eq!(engine.buffer().cursor(), 0);
    engine.press("ctrl+right");
    assert_eq!(engine.buffer().cursor(), 5);
}

#[test]
fn password_sessions_never_read_items() {
    let options = MenuOptions::new().password(true);
    let engine = MenuEngine::from_reader(lines("visible\n"), options).unwrap();
    assert!(engine.store().is_empty());
    assert_eq!(engine.view().counter, "0/0");
}
