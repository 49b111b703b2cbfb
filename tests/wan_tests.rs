// WAN stabilization window semantics

use lcdmon::metrics::wan::StatusWindow;
use lcdmon::models::WanStatus;

#[test]
fn down_anywhere_in_window_wins() {
    let mut w = StatusWindow::new(3);
    w.push(WanStatus::Ok);
    w.push(WanStatus::Degraded);
    assert_eq!(w.push(WanStatus::Down), WanStatus::Down);
}

#[test]
fn down_wins_regardless_of_plurality() {
    for position in 0..3 {
        let mut w = StatusWindow::new(3);
        let mut last = WanStatus::Checking;
        for i in 0..3 {
            let raw = if i == position {
                WanStatus::Down
            } else {
                WanStatus::Ok
            };
            last = w.push(raw);
        }
        assert_eq!(last, WanStatus::Down, "down at position {position}");
    }
}

#[test]
fn plurality_wins_without_down() {
    let mut w = StatusWindow::new(3);
    w.push(WanStatus::Ok);
    w.push(WanStatus::Ok);
    assert_eq!(w.push(WanStatus::Degraded), WanStatus::Ok);
}

#[test]
fn singleton_passes_through() {
    let mut w = StatusWindow::new(3);
    assert_eq!(w.push(WanStatus::Degraded), WanStatus::Degraded);
}

#[test]
fn window_slides_and_forgets_old_down() {
    let mut w = StatusWindow::new(3);
    w.push(WanStatus::Down);
    w.push(WanStatus::Ok);
    w.push(WanStatus::Ok);
    // Down still in the window of the last three.
    assert_eq!(w.stabilized(), WanStatus::Down);
    // Fourth push evicts it.
    assert_eq!(w.push(WanStatus::Ok), WanStatus::Ok);
}

#[test]
fn window_length_is_bounded() {
    let mut w = StatusWindow::new(3);
    for _ in 0..10 {
        w.push(WanStatus::Ok);
        assert!(w.len() <= 3);
    }
    assert_eq!(w.len(), 3);
}

#[test]
fn empty_window_reports_checking() {
    let w = StatusWindow::new(3);
    assert!(w.is_empty());
    assert_eq!(w.stabilized(), WanStatus::Checking);
}

#[test]
fn recovery_needs_plurality() {
    let mut w = StatusWindow::new(3);
    w.push(WanStatus::Degraded);
    w.push(WanStatus::Degraded);
    // One good ping does not flip the reported state yet.
    assert_eq!(w.push(WanStatus::Ok), WanStatus::Degraded);
    // Two do.
    assert_eq!(w.push(WanStatus::Ok), WanStatus::Ok);
}
