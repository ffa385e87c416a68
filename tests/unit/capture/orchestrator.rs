use super::*;

#[test]
fn decision_table_presence_patterns() {
    use CaptureMode::*;
    let cases = [
        (VideoOnly, true, (true, false)),
        (VideoOnly, false, (true, false)),
        (CompositingCaption, true, (false, true)),
        (CompositingCaption, false, (true, false)),
        (Both, true, (true, true)),
        (Both, false, (true, false)),
    ];
    for (mode, subtitle, expected) in cases {
        for overlay in [false, true] {
            for comments in [false, true] {
                let plan = ProductionPlan::decide(mode, subtitle, overlay, comments);
                assert_eq!(
                    plan.produced(),
                    expected,
                    "{mode:?} subtitle={subtitle} overlay={overlay} comments={comments}"
                );
            }
        }
    }
}

#[test]
fn direct_path_only_for_a_lone_bare_normal_output() {
    assert_eq!(
        ProductionPlan::decide(CaptureMode::VideoOnly, false, false, false).normal(),
        Some(NormalPath::Direct)
    );
    assert_eq!(
        ProductionPlan::decide(CaptureMode::VideoOnly, true, false, false).normal(),
        Some(NormalPath::Direct)
    );
    assert_eq!(
        ProductionPlan::decide(CaptureMode::CompositingCaption, false, false, false).normal(),
        Some(NormalPath::Direct)
    );
    assert_eq!(
        ProductionPlan::decide(CaptureMode::VideoOnly, false, true, false).normal(),
        Some(NormalPath::Composite)
    );
    assert_eq!(
        ProductionPlan::decide(CaptureMode::VideoOnly, false, false, true).normal(),
        Some(NormalPath::Composite)
    );
    assert_eq!(
        ProductionPlan::decide(CaptureMode::Both, true, false, false).normal(),
        Some(NormalPath::Composite)
    );
}

#[test]
fn captioned_plan_never_uses_direct_transfer() {
    for overlay in [false, true] {
        for comments in [false, true] {
            let plan = ProductionPlan::decide(CaptureMode::Both, true, overlay, comments);
            assert!(plan.captioned());
            assert_ne!(plan.normal(), Some(NormalPath::Direct));
        }
    }
}
