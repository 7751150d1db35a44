//! Unit tests for the bookmarks panel flag, its search box, and row
//! classification.

use rstest::rstest;

use rxportal::managers::bookmarks_panel::{BookmarksPanel, PanelSearch};
use rxportal::types::bookmark::ResourceKind;

#[test]
fn test_panel_starts_closed() {
    assert!(!BookmarksPanel::new().is_open());
}

#[test]
fn test_open_and_close_are_idempotent() {
    let panel = BookmarksPanel::new();
    panel.open();
    panel.open();
    assert!(panel.is_open());
    panel.close();
    panel.close();
    assert!(!panel.is_open());
}

#[test]
fn test_toggle_flips() {
    let panel = BookmarksPanel::new();
    panel.toggle();
    assert!(panel.is_open());
    panel.toggle();
    assert!(!panel.is_open());
}

#[test]
fn test_search_reset() {
    let search = PanelSearch::new();
    search.set_term("insulin");
    assert_eq!(search.term(), "insulin");
    search.reset();
    assert_eq!(search.term(), "");
}

#[test]
fn test_panel_shared_across_threads() {
    let panel = std::sync::Arc::new(BookmarksPanel::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let panel = panel.clone();
            std::thread::spawn(move || panel.open())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert!(panel.is_open());
}

#[rstest]
#[case(Some("Inhaler Technique.mp4"), ResourceKind::Video)]
#[case(Some("COUNSELING.MOV"), ResourceKind::Video)]
#[case(Some("clip.WebM"), ResourceKind::Video)]
#[case(Some("notes.mp4.pdf"), ResourceKind::Video)]
#[case(Some("Hypertension Protocol.pdf"), ResourceKind::Document)]
#[case(Some("movement.docx"), ResourceKind::Document)]
#[case(None, ResourceKind::Document)]
fn test_classify(#[case] file_name: Option<&str>, #[case] expected: ResourceKind) {
    assert_eq!(ResourceKind::classify(file_name), expected);
}

#[test]
fn test_action_labels() {
    assert_eq!(ResourceKind::Video.action_label(), "Play video");
    assert_eq!(ResourceKind::Document.action_label(), "Download file");
}
