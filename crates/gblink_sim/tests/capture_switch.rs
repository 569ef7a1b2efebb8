//! The capture switch is process-wide, so this file holds a single test to
//! observe it in its initial off state.

use gblink_sim::{
    capture_enabled, enable_capture, LinkModel, MemoryTrace, SimError, TraceSink,
};

#[test]
fn attach_requires_capture_and_switch_is_one_way() {
    let model = LinkModel::default();
    assert!(!capture_enabled());

    let mut trace = MemoryTrace::new();
    assert!(matches!(
        trace.attach(&model, 1),
        Err(SimError::CaptureDisabled)
    ));

    assert!(enable_capture());
    assert!(capture_enabled());
    assert!(!enable_capture());
    assert!(capture_enabled());

    trace.attach(&model, 1).unwrap();
}
