#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use framex::{
    force, point, AnalysisError, AnalysisOptions, Frame, FrameAnalysis, Load, MemberKind, Point,
    SolveMode, Stiffness, Support,
};
use petgraph::graph::{EdgeIndex, NodeIndex};

const SECTION: Stiffness = Stiffness::new(200.0e9, 8.0e-5);

#[derive(Debug, Clone, Copy)]
struct PortalGeometry {
    top_left: NodeIndex,
    top_right: NodeIndex,
    beam: EdgeIndex,
}

/// Portal `A`-`B`-`C`-`D`: columns `AB` and `DC` drawn upward, beam `BC`.
fn fixed_base_portal() -> (Frame, PortalGeometry) {
    let mut frame = Frame::new();
    let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
    let b = frame.add_node("B", point(0.0, 4.0)).expect("node added");
    let c = frame.add_node("C", point(6.0, 4.0)).expect("node added");
    let d = frame.add_node("D", point(6.0, 0.0)).expect("node added");
    frame.set_support(a, Support::fixed()).expect("support set");
    frame.set_support(d, Support::fixed()).expect("support set");
    frame.add_column(a, b, SECTION).expect("column added");
    let beam = frame.add_beam(b, c, SECTION).expect("beam added");
    frame.add_column(d, c, SECTION).expect("column added");
    (
        frame,
        PortalGeometry {
            top_left: b,
            top_right: c,
            beam,
        },
    )
}

/// Anticlockwise moment about the origin of a force acting at `position`.
fn moment_about_origin(position: Point, x: f64, y: f64) -> f64 {
    position.x * y - position.y * x
}

/// Sum of reactions plus applied loads, with moments taken about the origin.
fn out_of_balance(frame: &Frame, analysis: &FrameAnalysis) -> (f64, f64, f64) {
    let applied = frame.total_applied_load().expect("valid loads");
    let (mut x, mut y, mut moment) = (applied.x, applied.y, 0.0);
    for (label, reaction) in analysis.reactions() {
        let node = frame.node_by_label(label).expect("labelled node");
        let position = frame.node_position(node).expect("node exists");
        x += reaction.x;
        y += reaction.y;
        moment += reaction.moment.unwrap_or(0.0)
            + moment_about_origin(position, reaction.x, reaction.y);
    }
    (x, y, moment)
}

#[test]
fn symmetric_portal_is_susceptible_but_does_not_sway() {
    let (mut frame, portal) = fixed_base_portal();
    frame
        .add_member_load(portal.beam, Load::uniform(0.0, 6.0, 10.0).expect("valid load"))
        .expect("load applied");

    assert!(frame.sway_susceptibility().is_susceptible());
    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    assert!(!analysis.is_swaying());
    assert_relative_eq!(analysis.sway(1).expect("sway unknown"), 0.0, epsilon = 1.0e-12);
    assert_relative_eq!(
        analysis.moment("B", "C").expect("end"),
        -analysis.moment("C", "B").expect("end"),
        epsilon = 1.0e-9
    );
    assert_relative_eq!(
        analysis.reaction("A").expect("supported").y,
        30.0,
        epsilon = 1.0e-9
    );
    assert_eq!(frame.effective_sway(&AnalysisOptions::default()), Ok(false));
}

#[test]
fn lateral_load_sways_the_portal_and_balances() {
    let (mut frame, portal) = fixed_base_portal();
    frame
        .set_load(portal.top_left, force(10.0, 0.0, 0.0))
        .expect("load set");

    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    assert!(analysis.is_swaying());
    assert!(analysis.sway(1).expect("sway unknown") > 0.0);
    assert_eq!(analysis.solve_mode(), SolveMode::Square);

    // A rightward sway bends both columns the same way.
    assert!(analysis.moment("A", "B").expect("end") > 0.0);
    assert!(analysis.moment("D", "C").expect("end") > 0.0);

    let (x, y, moment) = out_of_balance(&frame, &analysis);
    let applied_moment = moment_about_origin(point(0.0, 4.0), 10.0, 0.0);
    assert_relative_eq!(x, 0.0, epsilon = 1.0e-6);
    assert_relative_eq!(y, 0.0, epsilon = 1.0e-6);
    assert_relative_eq!(moment + applied_moment, 0.0, epsilon = 1.0e-6);
}

#[test]
fn portal_missing_a_base_support_sways() {
    let mut frame = Frame::new();
    let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
    let b = frame.add_node("B", point(0.0, 4.0)).expect("node added");
    let c = frame.add_node("C", point(6.0, 4.0)).expect("node added");
    let d = frame.add_node("D", point(6.0, 0.0)).expect("node added");
    frame.set_support(a, Support::fixed()).expect("support set");
    frame.add_column(a, b, SECTION).expect("column added");
    frame.add_beam(b, c, SECTION).expect("beam added");
    frame.add_column(d, c, SECTION).expect("column added");
    frame.set_load(b, force(10.0, 0.0, 0.0)).expect("load set");

    assert!(frame.sway_susceptibility().is_susceptible());
    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    assert_eq!(analysis.sways().len(), 1);
    assert!(analysis.sway(1).expect("sway unknown") > 0.0);
    assert!(analysis.reaction("D").is_none());
    assert_relative_eq!(analysis.moment("C", "D").expect("end"), 0.0, epsilon = 1.0e-9);

    // The only column with a support carries the whole storey shear.
    let column_moments = analysis.moment("A", "B").expect("end") + analysis.moment("B", "A").expect("end");
    assert_relative_eq!(column_moments, 40.0, epsilon = 1.0e-6);
    assert_relative_eq!(analysis.reaction("A").expect("supported").x, -10.0, epsilon = 1.0e-6);
}

#[test]
fn joints_balance_applied_moments() {
    let (mut frame, portal) = fixed_base_portal();
    frame
        .set_load(portal.top_left, force(10.0, 0.0, 20.0))
        .expect("load set");
    frame
        .add_member_load(portal.beam, Load::point(2.0, 15.0).expect("valid load"))
        .expect("load applied");

    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    let at_b = analysis.moment("B", "A").expect("end") + analysis.moment("B", "C").expect("end");
    let at_c = analysis.moment("C", "B").expect("end") + analysis.moment("C", "D").expect("end");
    assert_relative_eq!(at_b, 20.0, epsilon = 1.0e-9);
    assert_relative_eq!(at_c, 0.0, epsilon = 1.0e-9);
    assert!(analysis.rotation("B").is_some());
    assert!(analysis.rotation("A").is_none());
}

#[test]
fn beam_level_pin_anchors_the_frame() {
    let mut frame = Frame::new();
    let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
    let b = frame.add_node("B", point(0.0, 4.0)).expect("node added");
    let c = frame.add_node("C", point(6.0, 4.0)).expect("node added");
    frame.set_support(a, Support::fixed()).expect("support set");
    frame.set_support(c, Support::pinned()).expect("support set");
    frame.add_column(a, b, SECTION).expect("column added");
    let beam = frame.add_beam(b, c, SECTION).expect("beam added");
    frame
        .add_member_load(beam, Load::uniform(0.0, 6.0, 10.0).expect("valid load"))
        .expect("load applied");
    frame.set_load(b, force(10.0, 0.0, 0.0)).expect("load set");

    assert!(!frame.sway_susceptibility().is_susceptible());
    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    assert!(analysis.sways().is_empty());
    assert!(!analysis.is_swaying());
    assert!(analysis.expressions()["MOMENTAB"].contains("THETA_B"));
    assert!(!analysis.expressions()["MOMENTAB"].contains("DELTA"));

    let (x, y, _) = out_of_balance(&frame, &analysis);
    assert_relative_eq!(x, 0.0, epsilon = 1.0e-6);
    assert_relative_eq!(y, 0.0, epsilon = 1.0e-6);
}

#[test]
fn cantilevered_beam_sways_its_column() {
    let mut frame = Frame::new();
    let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
    let b = frame.add_node("B", point(0.0, 4.0)).expect("node added");
    let c = frame.add_node("C", point(3.0, 4.0)).expect("node added");
    frame.set_support(a, Support::fixed()).expect("support set");
    frame.add_column(a, b, SECTION).expect("column added");
    let arm = frame.add_beam(b, c, SECTION).expect("beam added");
    frame
        .add_member_load(arm, Load::uniform(0.0, 3.0, 10.0).expect("valid load"))
        .expect("load applied");

    assert!(frame.sway_susceptibility().is_susceptible());
    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    assert!(analysis.sway(1).expect("sway unknown") > 0.0);
    assert!(analysis.rotation("B").expect("rotation unknown") < 0.0);
    assert!(analysis.rotation("C").is_none());

    assert_relative_eq!(analysis.moment("B", "C").expect("end"), 45.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.moment("B", "A").expect("end"), -45.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.moment("A", "B").expect("end"), 45.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.moment("C", "B").expect("end"), 0.0, epsilon = 1.0e-9);

    let reaction = analysis.reaction("A").expect("supported");
    assert_relative_eq!(reaction.x, 0.0, epsilon = 1.0e-9);
    assert_relative_eq!(reaction.y, 30.0, epsilon = 1.0e-9);
    assert_relative_eq!(reaction.moment.expect("fixed"), 45.0, epsilon = 1.0e-9);
    assert_eq!(frame.effective_sway(&AnalysisOptions::default()), Ok(true));
}

#[test]
fn member_direction_does_not_change_results() {
    let build = |reversed: bool| {
        let mut frame = Frame::new();
        let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
        let b = frame.add_node("B", point(6.0, 0.0)).expect("node added");
        frame.set_support(a, Support::fixed()).expect("support set");
        frame.set_support(b, Support::roller()).expect("support set");
        if reversed {
            let beam = frame.add_beam(b, a, SECTION).expect("beam added");
            frame
                .add_member_load(beam, Load::point(4.0, -12.0).expect("valid load"))
                .expect("load applied");
        } else {
            let beam = frame.add_beam(a, b, SECTION).expect("beam added");
            frame
                .add_member_load(beam, Load::point(2.0, 12.0).expect("valid load"))
                .expect("load applied");
        }
        frame.analyze(&AnalysisOptions::default()).expect("solvable")
    };

    let forward = build(false);
    let backward = build(true);
    for (from, to) in [("A", "B"), ("B", "A")] {
        assert_relative_eq!(
            forward.moment(from, to).expect("end"),
            backward.moment(from, to).expect("end"),
            epsilon = 1.0e-9
        );
    }
    for label in ["A", "B"] {
        let lhs = forward.reaction(label).expect("supported");
        let rhs = backward.reaction(label).expect("supported");
        assert_relative_eq!(lhs.x, rhs.x, epsilon = 1.0e-9);
        assert_relative_eq!(lhs.y, rhs.y, epsilon = 1.0e-9);
    }
    assert_relative_eq!(forward.moment("A", "B").expect("end"), 40.0 / 3.0, epsilon = 1.0e-9);
    assert_relative_eq!(forward.reaction("B").expect("supported").y, 16.0 / 9.0, epsilon = 1.0e-9);
}

#[test]
#[allow(clippy::float_cmp)]
fn roller_reaction_is_zero_in_its_free_direction() {
    let mut frame = Frame::new();
    let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
    let b = frame.add_node("B", point(5.0, 0.0)).expect("node added");
    frame.set_support(a, Support::pinned()).expect("support set");
    frame.set_support(b, Support::roller()).expect("support set");
    let beam = frame.add_beam(a, b, SECTION).expect("beam added");
    frame
        .add_member_load(beam, Load::trapezoidal(8.0, 5.0, 2.0, 0.0).expect("valid load"))
        .expect("load applied");

    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    let roller = analysis.reaction("B").expect("supported");
    assert_eq!(roller.x, 0.0);
    assert!(roller.moment.is_none());
    let total = frame.total_applied_load().expect("valid loads");
    assert_relative_eq!(total.y, -25.0, epsilon = 1.0e-9);
    let pin = analysis.reaction("A").expect("supported");
    assert_relative_eq!(pin.y + roller.y, 25.0, epsilon = 1.0e-9);
}

#[test]
fn inclined_member_is_rejected() {
    let mut frame = Frame::new();
    let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
    let b = frame.add_node("B", point(3.0, 4.0)).expect("node added");
    frame.set_support(a, Support::pinned()).expect("support set");
    frame.set_support(b, Support::pinned()).expect("support set");
    let member = frame.add_member(a, b, SECTION).expect("member added");
    assert_eq!(frame.member_kind(member), Some(MemberKind::Inclined));
    assert_eq!(
        frame.analyze(&AnalysisOptions::default()),
        Err(AnalysisError::InclinedMember(member))
    );
}

#[test]
fn stretching_an_axially_rigid_member_is_rejected() {
    let mut frame = Frame::new();
    let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
    let b = frame.add_node("B", point(6.0, 0.0)).expect("node added");
    frame.set_support(a, Support::pinned()).expect("support set");
    frame.set_support(b, Support::pinned()).expect("support set");
    let beam = frame.add_beam(a, b, SECTION).expect("beam added");
    frame
        .set_imposed_displacement(b, Some(0.01), None)
        .expect("displacement set");

    match frame.analyze(&AnalysisOptions::default()) {
        Err(AnalysisError::InconsistentDisplacement { member, residual }) => {
            assert_eq!(member, beam);
            assert_relative_eq!(residual, 0.01, epsilon = 1.0e-12);
        }
        other => panic!("expected inconsistent displacement, got {other:?}"),
    }
}

#[test]
fn cantilever_hanging_off_a_pin_cannot_balance() {
    let mut frame = Frame::new();
    let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
    let b = frame.add_node("B", point(4.0, 0.0)).expect("node added");
    frame.set_support(a, Support::pinned()).expect("support set");
    let beam = frame.add_beam(a, b, SECTION).expect("beam added");
    frame
        .add_member_load(beam, Load::point(4.0, 5.0).expect("valid load"))
        .expect("load applied");

    assert!(matches!(
        frame.analyze(&AnalysisOptions::default()),
        Err(AnalysisError::InconsistentEquilibrium { .. })
    ));
}

#[test]
fn strict_options_solve_square_systems_directly() {
    let (mut frame, portal) = fixed_base_portal();
    frame
        .set_load(portal.top_right, force(-6.0, 0.0, 0.0))
        .expect("load set");

    let strict = frame.analyze(&AnalysisOptions::strict()).expect("solvable");
    let relaxed = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    assert_eq!(strict.solve_mode(), SolveMode::Square);
    assert_relative_eq!(
        strict.sway(1).expect("sway unknown"),
        relaxed.sway(1).expect("sway unknown"),
        max_relative = 1.0e-12
    );
    assert!(strict.sway(1).expect("sway unknown") < 0.0);
}

#[test]
fn heavy_gravity_load_is_carried_to_the_bases_exactly() {
    let (mut frame, portal) = fixed_base_portal();
    frame
        .add_member_load(portal.beam, Load::uniform(0.0, 6.0, 12_000.0).expect("valid load"))
        .expect("load applied");

    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    let total = frame.total_applied_load().expect("valid loads");
    let carried: f64 = analysis.reactions().values().map(|reaction| reaction.y).sum();
    assert_relative_eq!(carried, -total.y, max_relative = 1.0e-9);
    assert_relative_eq!(carried, 72_000.0, max_relative = 1.0e-9);
    assert!(analysis.residual() <= 1.0e-9 * 72_000.0);
}

#[test]
fn column_direction_does_not_change_portal_results() {
    let build = |reversed: bool| {
        let mut frame = Frame::new();
        let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
        let b = frame.add_node("B", point(0.0, 4.0)).expect("node added");
        let c = frame.add_node("C", point(6.0, 4.0)).expect("node added");
        let d = frame.add_node("D", point(6.0, 0.0)).expect("node added");
        frame.set_support(a, Support::fixed()).expect("support set");
        frame.set_support(d, Support::fixed()).expect("support set");
        // Wind of 5 on the left column, 1.5 above its base.
        if reversed {
            let column = frame.add_column(b, a, SECTION).expect("column added");
            frame
                .add_member_load(column, Load::point(2.5, -5.0).expect("valid load"))
                .expect("load applied");
        } else {
            let column = frame.add_column(a, b, SECTION).expect("column added");
            frame
                .add_member_load(column, Load::point(1.5, 5.0).expect("valid load"))
                .expect("load applied");
        }
        let beam = frame.add_beam(b, c, SECTION).expect("beam added");
        frame
            .add_member_load(beam, Load::uniform(0.0, 6.0, 10.0).expect("valid load"))
            .expect("load applied");
        frame.add_column(d, c, SECTION).expect("column added");
        frame.set_load(c, force(3.0, 0.0, 0.0)).expect("load set");
        frame.analyze(&AnalysisOptions::default()).expect("solvable")
    };

    let upward = build(false);
    let downward = build(true);
    assert!(upward.is_swaying());
    assert_relative_eq!(
        upward.sway(1).expect("sway unknown"),
        downward.sway(1).expect("sway unknown"),
        max_relative = 1.0e-9
    );
    for (from, to) in [("A", "B"), ("B", "A"), ("B", "C"), ("C", "B"), ("C", "D"), ("D", "C")] {
        assert_relative_eq!(
            upward.moment(from, to).expect("end"),
            downward.moment(from, to).expect("end"),
            epsilon = 1.0e-8
        );
    }
    for label in ["A", "D"] {
        let lhs = upward.reaction(label).expect("supported");
        let rhs = downward.reaction(label).expect("supported");
        assert_relative_eq!(lhs.x, rhs.x, epsilon = 1.0e-8);
        assert_relative_eq!(lhs.y, rhs.y, epsilon = 1.0e-8);
        assert_relative_eq!(
            lhs.moment.expect("fixed"),
            rhs.moment.expect("fixed"),
            epsilon = 1.0e-8
        );
    }
    let horizontal: f64 = upward.reactions().values().map(|reaction| reaction.x).sum();
    assert_relative_eq!(horizontal, -8.0, epsilon = 1.0e-8);
}

#[test]
fn two_storey_frame_sways_per_storey_and_balances() {
    let mut frame = Frame::new();
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (level, height) in [0.0, 3.0, 6.0].into_iter().enumerate() {
        let names = [["A", "D"], ["B", "E"], ["C", "F"]][level];
        left.push(frame.add_node(names[0], point(0.0, height)).expect("node added"));
        right.push(frame.add_node(names[1], point(5.0, height)).expect("node added"));
    }
    frame.set_support(left[0], Support::fixed()).expect("support set");
    frame.set_support(right[0], Support::fixed()).expect("support set");
    for storey in 0..2 {
        frame
            .add_column(left[storey], left[storey + 1], SECTION)
            .expect("column added");
        frame
            .add_column(right[storey], right[storey + 1], SECTION)
            .expect("column added");
        let beam = frame
            .add_beam(left[storey + 1], right[storey + 1], SECTION)
            .expect("beam added");
        frame
            .add_member_load(beam, Load::uniform(0.0, 5.0, 8.0).expect("valid load"))
            .expect("load applied");
    }
    frame.set_load(left[1], force(6.0, 0.0, 0.0)).expect("load set");
    frame.set_load(left[2], force(4.0, 0.0, 0.0)).expect("load set");

    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    assert_eq!(analysis.sways().len(), 2);
    assert!(analysis.sway(1).expect("lower storey") > 0.0);
    assert!(analysis.sway(2).expect("upper storey") > 0.0);

    // Lateral loads at the floors plus 40 down at mid-span of each beam.
    let applied_moment = moment_about_origin(point(0.0, 3.0), 6.0, 0.0)
        + moment_about_origin(point(0.0, 6.0), 4.0, 0.0)
        + moment_about_origin(point(2.5, 3.0), 0.0, -40.0)
        + moment_about_origin(point(2.5, 6.0), 0.0, -40.0);
    let (x, y, moment) = out_of_balance(&frame, &analysis);
    assert_relative_eq!(x, 0.0, epsilon = 1.0e-8);
    assert_relative_eq!(y, 0.0, epsilon = 1.0e-8);
    assert_relative_eq!(moment + applied_moment, 0.0, epsilon = 1.0e-6);
}
