#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use framex::{
    fixed_end_moments, point, AnalysisOptions, ContinuousBeam, Frame, Load, SolveMode, Stiffness,
    Support,
};
use petgraph::graph::EdgeIndex;

const SECTION: Stiffness = Stiffness::new(200.0e9, 5.0e-5);

/// Horizontal beam `A`-`B` of the given length with the given supports.
fn single_span(
    length: f64,
    left: Option<Support>,
    right: Option<Support>,
) -> (Frame, EdgeIndex) {
    let mut frame = Frame::new();
    let a = frame.add_node("A", point(0.0, 0.0)).expect("node added");
    let b = frame.add_node("B", point(length, 0.0)).expect("node added");
    if let Some(support) = left {
        frame.set_support(a, support).expect("support set");
    }
    if let Some(support) = right {
        frame.set_support(b, support).expect("support set");
    }
    let beam = frame.add_beam(a, b, SECTION).expect("beam added");
    (frame, beam)
}

#[test]
fn simply_supported_span_has_no_end_moments() {
    let (mut frame, beam) = single_span(6.0, Some(Support::pinned()), Some(Support::roller()));
    frame
        .add_member_load(beam, Load::uniform(0.0, 6.0, 10.0).expect("valid load"))
        .expect("load applied");

    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    assert_relative_eq!(analysis.moment("A", "B").expect("end"), 0.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.moment("B", "A").expect("end"), 0.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.reaction("A").expect("supported").y, 30.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.reaction("B").expect("supported").y, 30.0, epsilon = 1.0e-9);
    assert_eq!(analysis.solve_mode(), SolveMode::Square);

    let extremes = analysis
        .member(beam)
        .expect("member exists")
        .extremes(0.5)
        .expect("valid loads");
    assert_relative_eq!(extremes.max_sagging, 45.0, epsilon = 1.0e-9);
    assert_relative_eq!(extremes.max_shear, 30.0, epsilon = 1.0e-9);
}

#[test]
fn cantilever_reactions_follow_statics() {
    let (mut frame, beam) = single_span(5.0, Some(Support::fixed()), None);
    frame
        .add_member_load(beam, Load::point(3.0, 12.0).expect("valid load"))
        .expect("load applied");

    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    let reaction = analysis.reaction("A").expect("supported");
    assert_relative_eq!(reaction.x, 0.0, epsilon = 1.0e-9);
    assert_relative_eq!(reaction.y, 12.0, epsilon = 1.0e-9);
    assert_relative_eq!(reaction.moment.expect("fixed"), 36.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.moment("A", "B").expect("end"), 36.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.moment("B", "A").expect("end"), 0.0, epsilon = 1.0e-9);
    assert!(analysis.rotation("A").is_none());
    assert!(analysis.rotation("B").is_none());
}

#[test]
fn propped_cantilever_under_uniform_load() {
    let (mut frame, beam) = single_span(6.0, Some(Support::fixed()), Some(Support::roller()));
    frame
        .add_member_load(beam, Load::uniform(0.0, 6.0, 10.0).expect("valid load"))
        .expect("load applied");

    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    assert_relative_eq!(analysis.moment("A", "B").expect("end"), 45.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.moment("B", "A").expect("end"), 0.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.reaction("A").expect("supported").y, 37.5, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.reaction("B").expect("supported").y, 22.5, epsilon = 1.0e-9);
}

#[test]
fn settlement_of_a_propped_cantilever() {
    let settlement = 0.01;
    let (frame, _) = single_span(
        5.0,
        Some(Support::fixed()),
        Some(Support::pinned().with_settlement(settlement)),
    );

    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    let expected = 3.0 * SECTION.flexural_rigidity() * settlement / 25.0;
    assert_relative_eq!(analysis.moment("A", "B").expect("end"), expected, max_relative = 1.0e-9);
    assert_relative_eq!(analysis.moment("B", "A").expect("end"), 0.0, epsilon = 1.0e-6);
    assert_relative_eq!(
        analysis.reaction("B").expect("supported").y,
        -expected / 5.0,
        max_relative = 1.0e-9
    );
}

#[test]
fn settlement_of_a_fixed_fixed_beam_needs_no_solve() {
    let settlement = 0.01;
    let (frame, _) = single_span(
        5.0,
        Some(Support::fixed()),
        Some(Support::fixed().with_settlement(settlement)),
    );

    let analysis = frame.analyze(&AnalysisOptions::default()).expect("solvable");
    let expected = 6.0 * SECTION.flexural_rigidity() * settlement / 25.0;
    assert_eq!(analysis.solve_mode(), SolveMode::Trivial);
    assert_relative_eq!(analysis.moment("A", "B").expect("end"), expected, max_relative = 1.0e-12);
    assert_relative_eq!(analysis.moment("B", "A").expect("end"), expected, max_relative = 1.0e-12);
}

#[test]
fn three_equal_spans_under_uniform_load() {
    let mut beam = ContinuousBeam::new();
    for _ in 0..3 {
        let span = beam.add_span(6.0, SECTION).expect("span added");
        beam.add_span_load(span, Load::uniform(0.0, 6.0, 10.0).expect("valid load"))
            .expect("load applied");
    }
    beam.set_support(0, Support::pinned()).expect("support set");
    for position in 1..4 {
        beam.set_support(position, Support::roller()).expect("support set");
    }

    let analysis = beam.analyze(&AnalysisOptions::default()).expect("solvable");
    let frame = &analysis.frame;
    assert_relative_eq!(frame.moment("N2", "N1").expect("end"), -36.0, epsilon = 1.0e-9);
    assert_relative_eq!(frame.moment("N2", "N3").expect("end"), 36.0, epsilon = 1.0e-9);
    assert_relative_eq!(frame.moment("N3", "N2").expect("end"), -36.0, epsilon = 1.0e-9);
    assert_relative_eq!(frame.moment("N3", "N4").expect("end"), 36.0, epsilon = 1.0e-9);

    let reactions: Vec<f64> = analysis
        .supports
        .iter()
        .map(|support| support.reaction.expect("supported").y)
        .collect();
    assert_relative_eq!(reactions[0], 24.0, epsilon = 1.0e-9);
    assert_relative_eq!(reactions[1], 66.0, epsilon = 1.0e-9);
    assert_relative_eq!(reactions[2], 66.0, epsilon = 1.0e-9);
    assert_relative_eq!(reactions[3], 24.0, epsilon = 1.0e-9);
    assert_relative_eq!(analysis.supports[3].position, 18.0);
}

#[test]
fn fixed_end_moments_match_tables() {
    let uniform = fixed_end_moments(6.0, &[Load::uniform(0.0, 6.0, 10.0).expect("valid load")])
        .expect("valid loads");
    assert_relative_eq!(uniform.start, 30.0, epsilon = 1.0e-12);
    assert_relative_eq!(uniform.end, -30.0, epsilon = 1.0e-12);

    let point_load = fixed_end_moments(6.0, &[Load::point(2.0, 9.0).expect("valid load")])
        .expect("valid loads");
    assert_relative_eq!(point_load.start, 9.0 * 2.0 * 16.0 / 36.0, epsilon = 1.0e-12);
    assert_relative_eq!(point_load.end, -9.0 * 4.0 * 4.0 / 36.0, epsilon = 1.0e-12);

    let ramp = Load::trapezoidal(12.0, 6.0, 0.0, 0.0).expect("valid load");
    let triangle = fixed_end_moments(6.0, &[ramp]).expect("valid loads");
    assert_relative_eq!(triangle.start, 12.0 * 36.0 / 30.0, epsilon = 1.0e-9);
    assert_relative_eq!(triangle.end, -12.0 * 36.0 / 20.0, epsilon = 1.0e-9);
}
