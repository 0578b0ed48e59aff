use reflex_viz::cursor::{CursorState, Window, WindowCursor};
use reflex_viz::data::FailurePhase;

fn phase(start: i64, end: i64, action: &str) -> FailurePhase {
    FailurePhase {
        start_frame: start,
        end_frame: end,
        round: "1".to_string(),
        action: action.to_string(),
        state: "Failure".to_string(),
    }
}

#[test]
fn test_active_exactly_within_bounds() {
    let phases = vec![phase(3, 5, "Handover"), phase(6, 6, "Pour"), phase(20, 24, "Wipe")];
    let mut cursor = WindowCursor::new(phases.clone());

    for frame in 0..=30 {
        let expected = phases.iter().find(|p| p.contains(frame));
        let state = cursor.advance(frame);
        assert_eq!(state.active(), expected, "frame {}", frame);
        if frame > 24 {
            assert_eq!(state, CursorState::Exhausted);
        }
    }
}

#[test]
fn test_sparse_positions_skip_passed_windows() {
    let mut cursor = WindowCursor::new(vec![phase(1, 2, "A"), phase(4, 5, "B"), phase(8, 9, "C")]);

    assert_eq!(cursor.advance(4).active().map(|p| p.action.as_str()), Some("B"));
    assert_eq!(cursor.remaining().len(), 2);
    assert_eq!(cursor.advance(6), CursorState::Inactive);
    assert_eq!(cursor.advance(9).active().map(|p| p.action.as_str()), Some("C"));
    assert_eq!(cursor.advance(10), CursorState::Exhausted);
    assert!(cursor.is_exhausted());
}

#[test]
fn test_passed_window_is_never_reactivated() {
    let mut cursor = WindowCursor::new(vec![phase(1, 2, "A"), phase(4, 5, "B")]);
    assert!(cursor.advance(3).active().is_none());
    for frame in [1, 2, 3] {
        assert_eq!(cursor.advance(frame), CursorState::Inactive);
    }
    assert!(cursor.advance(4).active().is_some());
}
