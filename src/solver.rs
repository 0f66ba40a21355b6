//! Frame analysis driver.

use std::collections::BTreeMap;

use nalgebra::Vector2;
use petgraph::graph::EdgeIndex;

use crate::equations::{end_slot, Assembly, EquationBuilder};
use crate::errors::AnalysisError;
use crate::expression::{Equation, Unknown, UnknownId};
use crate::fem::MemberEnd;
use crate::frame::{Axis, Frame, SupportKind};
use crate::linear::{solve_equations, solve_secondary};
use crate::numeric::compensated_sum;
use crate::options::AnalysisOptions;
use crate::results::{moment_key, FrameAnalysis, MemberResult, Reaction};

/// Numeric end actions of a member before results are packaged.
#[derive(Clone, Copy, Debug, Default)]
struct EndActions {
    moments: [f64; 2],
    shears: [f64; 2],
    axial: f64,
}

impl Frame {
    /// Solve the frame by the slope-deflection method.
    ///
    /// The frame is not modified; every call assembles and solves afresh.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] when the frame holds an inclined member, a
    /// detached member, inconsistent imposed displacements, or leads to an
    /// equation system that cannot be solved under `options`.
    ///
    /// # Examples
    /// ```
    /// use framex::{point, AnalysisOptions, Frame, Load, Stiffness, Support};
    ///
    /// let mut frame = Frame::new();
    /// let a = frame.add_node("A", point(0.0, 0.0)).unwrap();
    /// let b = frame.add_node("B", point(6.0, 0.0)).unwrap();
    /// frame.set_support(a, Support::fixed()).unwrap();
    /// frame.set_support(b, Support::fixed()).unwrap();
    /// let beam = frame.add_beam(a, b, Stiffness::new(200.0e9, 8.0e-5)).unwrap();
    /// frame.add_member_load(beam, Load::uniform(0.0, 6.0, 10.0).unwrap()).unwrap();
    ///
    /// let analysis = frame.analyze(&AnalysisOptions::default()).unwrap();
    /// assert!((analysis.moment("A", "B").unwrap() - 30.0).abs() < 1.0e-9);
    /// ```
    pub fn analyze(&self, options: &AnalysisOptions) -> Result<FrameAnalysis, AnalysisError> {
        for member in self.member_indices() {
            if !self.member(member).kind.behaviour().solvable {
                return Err(AnalysisError::InclinedMember(member));
            }
        }

        let assembly = EquationBuilder::new(self, options)?.build()?;
        let equations: Vec<Equation> = assembly
            .equations
            .iter()
            .map(|labelled| labelled.equation.clone())
            .collect();
        let solution = solve_equations(&equations, assembly.registry.len(), options)?;
        let residual = equations
            .iter()
            .map(|equation| equation.residual(&solution.values).abs())
            .fold(0.0, f64::max);
        log::debug!(
            "slope-deflection system solved ({:?}), residual {residual:e}",
            solution.mode
        );
        let scale = equations
            .iter()
            .map(|equation| equation.constant.abs())
            .fold(1.0, f64::max);
        if residual > options.tolerance * scale {
            log::warn!("equilibrium is only met in the least-squares sense (residual {residual:e})");
        }

        let mut actions = vec![EndActions::default(); self.member_count()];
        for member in self.member_indices() {
            let (start, end) = assembly.member_moments(member);
            let moments = [start.evaluate(&solution.values), end.evaluate(&solution.values)];
            actions[member.index()] = EndActions {
                moments,
                shears: self.end_shears(member, moments)?,
                axial: 0.0,
            };
        }
        self.balance_axial_forces(&mut actions, options)?;

        let reactions = self.reactions(&actions);
        let mut rotations = BTreeMap::new();
        let mut sways = BTreeMap::new();
        for (id, unknown, _) in assembly.registry.iter() {
            let value = solution.values.get(id.0).copied().unwrap_or(0.0);
            match unknown {
                Unknown::Rotation(node) => {
                    rotations.insert(self.node(node).label.clone(), value);
                }
                Unknown::Sway(number) => {
                    sways.insert(number, value);
                }
            }
        }

        Ok(FrameAnalysis {
            members: self.member_results(&assembly, &actions),
            reactions,
            rotations,
            sways,
            expressions: self.rendered_expressions(&assembly),
            solve_mode: solution.mode,
            residual,
            tolerance: options.tolerance,
        })
    }

    /// Whether the frame actually translates sideways under its loads.
    ///
    /// Runs [`Frame::analyze`] and reads the solved sway translations.
    ///
    /// # Errors
    ///
    /// See [`Frame::analyze`].
    pub fn effective_sway(&self, options: &AnalysisOptions) -> Result<bool, AnalysisError> {
        Ok(self.analyze(options)?.is_swaying())
    }

    /// Transverse end forces from end moments and member loads.
    fn end_shears(&self, member: EdgeIndex, moments: [f64; 2]) -> Result<[f64; 2], AnalysisError> {
        let length = self.local_axes(member).map_or(1.0, |axes| axes.length);
        let loads = &self.member(member).loads;
        let mut about_start = Vec::with_capacity(loads.len());
        let mut about_end = Vec::with_capacity(loads.len());
        for load in loads {
            about_start.push(load.moment_about(0.0)?);
            about_end.push(load.moment_about(length)?);
        }
        let sum = moments[0] + moments[1];
        Ok([
            (sum - compensated_sum(about_end)) / length,
            (compensated_sum(about_start) - sum) / length,
        ])
    }

    /// Solve for member tensions so every unrestrained direction balances.
    fn balance_axial_forces(
        &self,
        actions: &mut [EndActions],
        options: &AnalysisOptions,
    ) -> Result<(), AnalysisError> {
        let mut equations = Vec::new();
        for node in self.node_indices() {
            let data = self.node(node);
            for axis in [Axis::X, Axis::Y] {
                if data.restrains(axis) {
                    continue;
                }
                let mut equation = Equation {
                    constant: -axis.component(data.load.to_vector()),
                    coefficients: BTreeMap::new(),
                };
                for (member, end) in self.incident_ends(node) {
                    let Some(axes) = self.local_axes(member) else {
                        continue;
                    };
                    let sign = match end {
                        MemberEnd::Start => -1.0,
                        MemberEnd::End => 1.0,
                    };
                    let shear = actions[member.index()].shears[end_slot(end)];
                    equation.constant += shear * axis.component(axes.transverse);
                    let coefficient = sign * axis.component(axes.axis);
                    if coefficient != 0.0 {
                        *equation
                            .coefficients
                            .entry(UnknownId(member.index()))
                            .or_insert(0.0) += coefficient;
                    }
                }
                if equation.has_unknowns() {
                    equations.push(equation);
                }
            }
        }

        let solution = solve_secondary(&equations, self.member_count(), options.ridge)?;
        for (index, action) in actions.iter_mut().enumerate() {
            action.axial = solution.values.get(index).copied().unwrap_or(0.0);
        }
        Ok(())
    }

    /// Force exerted on a member by the node at one of its ends.
    fn end_force(&self, member: EdgeIndex, end: MemberEnd, action: &EndActions) -> Vector2<f64> {
        let Some(axes) = self.local_axes(member) else {
            return Vector2::zeros();
        };
        let slot = end_slot(end);
        let axial = match end {
            MemberEnd::Start => -action.axial,
            MemberEnd::End => action.axial,
        };
        action.shears[slot] * axes.transverse + axial * axes.axis
    }

    /// `R = Σ end forces − applied load` at every supported node.
    fn reactions(&self, actions: &[EndActions]) -> BTreeMap<String, Reaction> {
        let mut reactions = BTreeMap::new();
        for node in self.node_indices() {
            let data = self.node(node);
            let Some(support) = data.support else {
                continue;
            };
            let mut force = -data.load.to_vector();
            let mut moment = -data.load.moment;
            for (member, end) in self.incident_ends(node) {
                let action = &actions[member.index()];
                force += self.end_force(member, end, action);
                moment += action.moments[end_slot(end)];
            }
            let mut reaction = Reaction {
                x: force.x,
                y: force.y,
                moment: None,
            };
            match support.kind {
                SupportKind::Fixed => reaction.moment = Some(moment),
                SupportKind::Pinned => {}
                SupportKind::Roller { restrains: Axis::X } => reaction.y = 0.0,
                SupportKind::Roller { restrains: Axis::Y } => reaction.x = 0.0,
            }
            reactions.insert(data.label.clone(), reaction);
        }
        reactions
    }

    fn member_results(&self, assembly: &Assembly, actions: &[EndActions]) -> Vec<MemberResult> {
        self.member_indices()
            .map(|member| {
                let action = &actions[member.index()];
                let data = self.member(member);
                let label = |end| self.node(self.end_node(member, end)).label.clone();
                MemberResult {
                    start_label: label(MemberEnd::Start),
                    end_label: label(MemberEnd::End),
                    kind: data.kind,
                    length: self.local_axes(member).map_or(0.0, |axes| axes.length),
                    start_moment: action.moments[0],
                    end_moment: action.moments[1],
                    start_shear: action.shears[0],
                    end_shear: action.shears[1],
                    axial: action.axial,
                    fixed_end: assembly.fixed_end[member.index()],
                    loads: data.loads.clone(),
                }
            })
            .collect()
    }

    fn rendered_expressions(&self, assembly: &Assembly) -> BTreeMap<String, String> {
        let mut expressions = BTreeMap::new();
        for end_moment in &assembly.end_moments {
            let key = moment_key(&self.node(end_moment.near).label, &self.node(end_moment.far).label);
            expressions
                .entry(key)
                .or_insert_with(|| end_moment.expr.render(&assembly.registry));
        }
        expressions
    }
}
