//! Property tests for the file index and the state synchronizer

use klcd_core::files::{FileBrowser, FileTree, NameStyle};
use klcd_core::state::{PrintState, PrinterSnapshot, StateSynchronizer};
use klcd_protocol::{CommandFrame, Handle, PAGE_SIZE};
use proptest::prelude::*;

fn path_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9_]{1,8}(/[a-zA-Z0-9_]{1,8}){0,2}\\.gcode", 0..24)
}

fn print_state() -> impl Strategy<Value = PrintState> {
    prop_oneof![
        Just(PrintState::Standby),
        Just(PrintState::Printing),
        Just(PrintState::Paused),
        Just(PrintState::Pausing),
        Just(PrintState::Cancelled),
        Just(PrintState::Complete),
        Just(PrintState::Error),
    ]
}

fn browser(paths: Vec<String>) -> FileBrowser {
    let mut browser = FileBrowser::new(NameStyle::default());
    browser.update(paths);
    browser
}

proptest! {
    #[test]
    fn test_tree_build_is_deterministic(paths in path_list()) {
        let style = NameStyle::default();
        prop_assert_eq!(
            FileTree::build(paths.clone(), &style),
            FileTree::build(paths, &style)
        );
    }

    #[test]
    fn test_root_first_page_starts_with_menu(paths in path_list()) {
        let rows = browser(paths).render_page(0);
        prop_assert_eq!(rows[0].handle, Handle::Menu);
        prop_assert!(rows.len() <= PAGE_SIZE);
    }

    #[test]
    fn test_pages_never_exceed_page_size(paths in path_list(), offset in 0usize..40) {
        let mut browser = browser(paths);
        prop_assert!(browser.render_page(offset).len() <= PAGE_SIZE);

        let first_dir = browser
            .render_page(0)
            .into_iter()
            .find(|row| matches!(row.handle, Handle::Node(node) if node.is_directory()));
        if let Some(row) = first_dir {
            browser.select(row.handle).unwrap();
            let rows = browser.render_page(offset);
            prop_assert!(rows.len() <= PAGE_SIZE);
            if rows.len() < PAGE_SIZE {
                prop_assert_eq!(rows.last().map(|r| r.handle), Some(Handle::Back));
            }
        }
    }

    #[test]
    fn test_back_returns_to_parent(paths in path_list()) {
        let mut browser = browser(paths);
        let parent = browser.cursor().to_vec();
        let first_dir = browser
            .render_page(0)
            .into_iter()
            .find(|row| matches!(row.handle, Handle::Node(node) if node.is_directory()));
        if let Some(row) = first_dir {
            browser.select(row.handle).unwrap();
            browser.select(Handle::Back).unwrap();
            prop_assert_eq!(browser.cursor(), parent.as_slice());
        }
    }

    #[test]
    fn test_transition_fires_once(states in prop::collection::vec(print_state(), 1..20), repeats in 1usize..5) {
        let mut sync = StateSynchronizer::default();
        let mut previous = None;
        for state in states {
            for i in 0..repeats {
                let out = sync.update(PrinterSnapshot {
                    state,
                    hotend: Some(25.0),
                    ..Default::default()
                });
                let expected = if i == 0 && previous != Some(state) {
                    state.entry_notifications()
                } else {
                    &[]
                };
                prop_assert_eq!(out.as_slice(), expected);
            }
            previous = Some(state);
        }
    }

    #[test]
    fn test_parser_never_panics(line in "\\PC{0,64}") {
        let _ = CommandFrame::parse(&line);
    }
}
