//! Solved quantities returned by an analysis.
//!
//! Results are plain values detached from the [`Frame`](crate::Frame) they
//! came from; repeated analyses never share or mutate state.

use std::collections::BTreeMap;

use petgraph::graph::EdgeIndex;
use serde::Serialize;

use crate::errors::LoadError;
use crate::fem::FixedEndMoments;
use crate::frame::MemberKind;
use crate::linear::SolveMode;
use crate::loads::{Load, LoadShape};

/// Upper bound on regularly spaced stations per member.
const MAX_STATIONS: u32 = 10_000;

/// Support reaction in global axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Reaction {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
    /// Moment reaction, present only for fixed supports.
    pub moment: Option<f64>,
}

/// Internal forces at one station of a member, in local axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct InternalForceSample {
    /// Distance from the member start.
    pub x: f64,
    /// Transverse shear, positive when the left part is pushed along the local transverse axis.
    pub shear: f64,
    /// Bending moment, sagging positive.
    pub moment: f64,
    /// Axial force, tension positive.
    pub axial: f64,
}

/// Extreme internal forces of one member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SpanExtremes {
    /// Largest sagging moment, zero when the member only hogs.
    pub max_sagging: f64,
    /// Largest hogging moment (non-positive), zero when the member only sags.
    pub max_hogging: f64,
    /// Largest absolute shear.
    pub max_shear: f64,
}

/// End actions of one solved member.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemberResult {
    /// Label of the start node.
    pub start_label: String,
    /// Label of the end node.
    pub end_label: String,
    /// Orientation class.
    pub kind: MemberKind,
    /// Member length.
    pub length: f64,
    /// Moment acting on the member at its start, anticlockwise positive.
    pub start_moment: f64,
    /// Moment acting on the member at its end, anticlockwise positive.
    pub end_moment: f64,
    /// Transverse force on the member at its start, along the local transverse axis.
    pub start_shear: f64,
    /// Transverse force on the member at its end, along the local transverse axis.
    pub end_shear: f64,
    /// Axial force, tension positive.
    pub axial: f64,
    /// Fixed-end moments of the member's own loads.
    pub fixed_end: FixedEndMoments,
    /// Loads carried by the member.
    pub loads: Vec<Load>,
}

impl MemberResult {
    /// Sample shear, moment and axial force along the member.
    ///
    /// Stations are taken every `step` from the start and at the end; a
    /// point load position gets two samples, just before and just after the
    /// load. A non-positive `step` samples the ends and load positions only.
    /// Steps finer than `length / 10000` are coarsened to that spacing.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when a carried load is malformed.
    pub fn internal_forces(&self, step: f64) -> Result<Vec<InternalForceSample>, LoadError> {
        let shapes = self
            .loads
            .iter()
            .map(Load::shape)
            .collect::<Result<Vec<_>, _>>()?;

        let mut stations: Vec<(f64, bool)> = Vec::new();
        if step > 0.0 && step.is_finite() {
            let step = step.max(self.length / f64::from(MAX_STATIONS));
            for index in 0..MAX_STATIONS {
                let x = f64::from(index) * step;
                if x >= self.length {
                    break;
                }
                stations.push((x, true));
            }
        } else {
            stations.push((0.0, true));
        }
        stations.push((self.length, true));
        for shape in &shapes {
            if let LoadShape::Concentrated(load) = shape {
                stations.retain(|(x, _)| *x != load.position);
                stations.push((load.position, false));
                stations.push((load.position, true));
            }
        }
        stations.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        stations.dedup();

        Ok(stations
            .into_iter()
            .map(|(x, inclusive)| self.sample(&shapes, x, inclusive))
            .collect())
    }

    fn sample(&self, shapes: &[LoadShape], x: f64, inclusive: bool) -> InternalForceSample {
        let (force, arm) = shapes
            .iter()
            .map(|shape| shape.left_of(x, inclusive))
            .fold((0.0, 0.0), |(f, m), (df, dm)| (f + df, m + dm));
        InternalForceSample {
            x,
            shear: self.start_shear - force,
            moment: -self.start_moment + x * self.start_shear - arm,
            axial: self.axial,
        }
    }

    /// Extreme values found by [`MemberResult::internal_forces`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when a carried load is malformed.
    pub fn extremes(&self, step: f64) -> Result<SpanExtremes, LoadError> {
        Ok(extremes_of(&self.internal_forces(step)?))
    }
}

/// Extremes of a sampled diagram.
pub(crate) fn extremes_of(samples: &[InternalForceSample]) -> SpanExtremes {
    samples.iter().fold(SpanExtremes::default(), |acc, sample| SpanExtremes {
        max_sagging: acc.max_sagging.max(sample.moment),
        max_hogging: acc.max_hogging.min(sample.moment),
        max_shear: acc.max_shear.max(sample.shear.abs()),
    })
}

/// Complete result of one frame analysis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameAnalysis {
    pub(crate) members: Vec<MemberResult>,
    pub(crate) reactions: BTreeMap<String, Reaction>,
    pub(crate) rotations: BTreeMap<String, f64>,
    pub(crate) sways: BTreeMap<usize, f64>,
    pub(crate) expressions: BTreeMap<String, String>,
    pub(crate) solve_mode: SolveMode,
    pub(crate) residual: f64,
    pub(crate) tolerance: f64,
}

impl FrameAnalysis {
    /// Result of a member.
    #[must_use]
    pub fn member(&self, member: EdgeIndex) -> Option<&MemberResult> {
        self.members.get(member.index())
    }

    /// Results of every member, in member index order.
    #[must_use]
    pub fn members(&self) -> &[MemberResult] {
        &self.members
    }

    /// Reaction at a supported node.
    #[must_use]
    pub fn reaction(&self, label: &str) -> Option<Reaction> {
        self.reactions.get(label).copied()
    }

    /// Reactions keyed by node label.
    #[must_use]
    pub fn reactions(&self) -> &BTreeMap<String, Reaction> {
        &self.reactions
    }

    /// Solved rotation of a joint; fixed joints and free tips have none.
    #[must_use]
    pub fn rotation(&self, label: &str) -> Option<f64> {
        self.rotations.get(label).copied()
    }

    /// Solved translation of sway group `number` (`DELTA_number`).
    #[must_use]
    pub fn sway(&self, number: usize) -> Option<f64> {
        self.sways.get(&number).copied()
    }

    /// Solved sway translations keyed by group number.
    #[must_use]
    pub fn sways(&self) -> &BTreeMap<usize, f64> {
        &self.sways
    }

    /// Moment acting on the member running from `from` to `to`, at `from`.
    #[must_use]
    pub fn moment(&self, from: &str, to: &str) -> Option<f64> {
        self.members.iter().find_map(|member| {
            if member.start_label == from && member.end_label == to {
                Some(member.start_moment)
            } else if member.end_label == from && member.start_label == to {
                Some(member.end_moment)
            } else {
                None
            }
        })
    }

    /// Every end moment keyed as `MOMENT<from><to>`.
    #[must_use]
    pub fn moment_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        for member in &self.members {
            map.entry(moment_key(&member.start_label, &member.end_label))
                .or_insert(member.start_moment);
            map.entry(moment_key(&member.end_label, &member.start_label))
                .or_insert(member.end_moment);
        }
        map
    }

    /// Symbolic end-moment expressions keyed as `MOMENT<from><to>`.
    #[must_use]
    pub fn expressions(&self) -> &BTreeMap<String, String> {
        &self.expressions
    }

    /// How the equation system was solved.
    #[must_use]
    pub fn solve_mode(&self) -> SolveMode {
        self.solve_mode
    }

    /// Largest absolute residual of the equilibrium equations at the solution.
    ///
    /// Zero up to rounding for square systems; a least-squares fit of an
    /// inconsistent system leaves a visible residual.
    #[must_use]
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Whether any solved sway translation is non-zero.
    ///
    /// Unlike [`Frame::sway_susceptibility`](crate::Frame::sway_susceptibility)
    /// this reflects the actual loading.
    #[must_use]
    pub fn is_swaying(&self) -> bool {
        self.sways.values().any(|value| value.abs() > self.tolerance)
    }
}

/// Key of the moment at `from` on the member towards `to`.
pub(crate) fn moment_key(from: &str, to: &str) -> String {
    format!("MOMENT{from}{to}")
}
