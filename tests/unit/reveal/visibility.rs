use super::*;

fn mounted(threshold: f64) -> VisibilityTracker {
    let mut t = VisibilityTracker::new(threshold, ObserverSupport::Available);
    t.mount();
    t
}

#[test]
fn reports_only_transitions() {
    let mut t = mounted(0.5);
    assert_eq!(t.observe(IntersectionSample::with_ratio(0.2)), None);
    assert_eq!(t.observe(IntersectionSample::with_ratio(0.5)), Some(true));
    assert_eq!(t.observe(IntersectionSample::with_ratio(0.9)), None);
    assert!(t.in_view());
    assert_eq!(t.observe(IntersectionSample::with_ratio(0.49)), Some(false));
    assert_eq!(t.observe(IntersectionSample::hidden()), None);
}

#[test]
fn requires_intersecting_flag() {
    let mut t = mounted(0.0);
    let sample = IntersectionSample {
        is_intersecting: false,
        ratio: 1.0,
    };
    assert_eq!(t.observe(sample), None);
    assert_eq!(t.observe(IntersectionSample::with_ratio(0.01)), Some(true));
}

#[test]
fn nan_ratio_is_not_visible() {
    let mut t = mounted(0.5);
    let sample = IntersectionSample {
        is_intersecting: true,
        ratio: f64::NAN,
    };
    assert_eq!(t.observe(sample), None);
    assert!(!t.in_view());
}

#[test]
fn unsupported_observer_fails_soft() {
    let mut t = VisibilityTracker::new(0.5, ObserverSupport::Unsupported);
    t.mount();
    assert!(!t.is_registered());
    assert_eq!(t.observe(IntersectionSample::with_ratio(1.0)), None);
    assert!(!t.in_view());
}

#[test]
fn unmount_reports_leave_and_ignores_later_samples() {
    let mut t = mounted(0.5);
    t.observe(IntersectionSample::with_ratio(1.0));
    assert_eq!(t.unmount(), Some(false));
    assert_eq!(t.unmount(), None);
    assert_eq!(t.observe(IntersectionSample::with_ratio(1.0)), None);
}
