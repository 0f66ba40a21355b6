//! Slope-deflection assembly.
//!
//! Every member end gets a symbolic moment expression in the joint rotations
//! and sway translations. Joint equilibrium and the horizontal equilibrium of
//! each swaying group then give one equation per unknown.

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::compatibility::ResolvedDisplacements;
use crate::errors::AnalysisError;
use crate::expression::{Equation, LinearExpr, Symbol, Unknown, UnknownRegistry};
use crate::fem::{fixed_end_moments, FixedEndMoments, MemberEnd};
use crate::frame::Frame;
use crate::geometry::cross;
use crate::numeric::is_negligible;
use crate::options::AnalysisOptions;
use crate::sway::SwayGroups;

/// Symbolic moment acting on one member end.
#[derive(Clone, Debug)]
pub(crate) struct EndMoment {
    pub(crate) near: NodeIndex,
    pub(crate) far: NodeIndex,
    pub(crate) expr: LinearExpr,
}

/// Named equilibrium equation.
#[derive(Clone, Debug)]
pub(crate) struct LabelledEquation {
    pub(crate) location: String,
    pub(crate) equation: Equation,
}

/// Everything produced before the linear solve.
#[derive(Clone, Debug)]
pub(crate) struct Assembly {
    pub(crate) registry: UnknownRegistry,
    pub(crate) end_moments: Vec<EndMoment>,
    pub(crate) fixed_end: Vec<FixedEndMoments>,
    pub(crate) equations: Vec<LabelledEquation>,
}

impl Assembly {
    /// Moment expressions of a member as `(start, end)`.
    pub(crate) fn member_moments(&self, member: EdgeIndex) -> (&LinearExpr, &LinearExpr) {
        let base = 2 * member.index();
        (&self.end_moments[base].expr, &self.end_moments[base + 1].expr)
    }
}

/// Builds the slope-deflection system of one frame.
pub(crate) struct EquationBuilder<'a> {
    frame: &'a Frame,
    options: &'a AnalysisOptions,
    sway: SwayGroups,
    displacements: ResolvedDisplacements,
    registry: UnknownRegistry,
    fixed_end: Vec<FixedEndMoments>,
}

impl<'a> EquationBuilder<'a> {
    /// Classify sway groups, resolve displacements and register unknowns.
    pub(crate) fn new(frame: &'a Frame, options: &'a AnalysisOptions) -> Result<Self, AnalysisError> {
        let sway = SwayGroups::classify(frame);
        let displacements = ResolvedDisplacements::resolve(frame, options)?;

        let mut registry = UnknownRegistry::new();
        for node in frame.node_indices() {
            if !frame.node(node).is_fixed() && !frame.is_free_tip(node) {
                registry.register(
                    Unknown::Rotation(node),
                    format!("THETA_{}", frame.node(node).label),
                );
            }
        }
        for group in sway.groups() {
            if let Some(number) = group.sway {
                registry.register(Unknown::Sway(number), format!("DELTA_{number}"));
            }
        }

        let fixed_end = frame
            .member_indices()
            .map(|member| {
                let length = frame.local_axes(member).map_or(0.0, |axes| axes.length);
                fixed_end_moments(length, &frame.member(member).loads)
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "registered {} unknowns for {} nodes and {} members",
            registry.len(),
            frame.node_count(),
            frame.member_count()
        );
        Ok(Self {
            frame,
            options,
            sway,
            displacements,
            registry,
            fixed_end,
        })
    }

    /// Build every end moment and equilibrium equation.
    pub(crate) fn build(self) -> Result<Assembly, AnalysisError> {
        let mut end_moments = Vec::with_capacity(2 * self.frame.member_count());
        for member in self.frame.member_indices() {
            for end in [MemberEnd::Start, MemberEnd::End] {
                end_moments.push(self.end_moment(member, end)?);
            }
        }

        let mut equations = Vec::new();
        for node in self.frame.node_indices() {
            if let Some(equation) = self.joint_equation(node, &end_moments)? {
                equations.push(equation);
            }
        }
        for group in self.sway.groups() {
            let Some(number) = group.sway else {
                continue;
            };
            if let Some(equation) = self.sway_equation(number, &group.nodes, &end_moments)? {
                equations.push(equation);
            }
        }

        for labelled in &equations {
            log::trace!(
                "{}: {:?} = {}",
                labelled.location,
                labelled.equation.coefficients,
                -labelled.equation.constant
            );
        }
        log::debug!(
            "assembled {} equations for {} unknowns",
            equations.len(),
            self.registry.len()
        );
        Ok(Assembly {
            registry: self.registry,
            end_moments,
            fixed_end: self.fixed_end,
            equations,
        })
    }

    fn end_moment(&self, member: EdgeIndex, end: MemberEnd) -> Result<EndMoment, AnalysisError> {
        let frame = self.frame;
        let near = frame.end_node(member, end);
        let far = frame.end_node(member, end.opposite());
        let near_tip = frame.is_free_tip(near);
        let far_tip = frame.is_free_tip(far);

        let expr = match (near_tip, far_tip) {
            (true, true) => return Err(AnalysisError::DetachedMember(member)),
            // The tip joint carries only what is applied to it.
            (true, false) => LinearExpr::constant(frame.node(near).load.moment),
            (false, true) => LinearExpr::constant(self.cantilever_moment(member, end)?),
            (false, false) => self.slope_deflection(member, end, near, far),
        };
        Ok(EndMoment {
            near,
            far,
            expr,
        })
    }

    /// Statically determined moment at the supported end of a cantilever arm.
    fn cantilever_moment(&self, member: EdgeIndex, end: MemberEnd) -> Result<f64, AnalysisError> {
        let frame = self.frame;
        let near = frame.node(frame.end_node(member, end));
        let tip = frame.node(frame.end_node(member, end.opposite()));
        let length = frame.local_axes(member).map_or(0.0, |axes| axes.length);
        let station = end.station(length);

        let mut load_moment = 0.0;
        for load in &frame.member(member).loads {
            load_moment -= load.moment_about(station)?;
        }
        let arm = tip.position.to_vector() - near.position.to_vector();
        Ok(-(tip.load.moment + cross(arm, tip.load.to_vector()) + load_moment))
    }

    fn slope_deflection(
        &self,
        member: EdgeIndex,
        end: MemberEnd,
        near: NodeIndex,
        far: NodeIndex,
    ) -> LinearExpr {
        let frame = self.frame;
        let data = frame.member(member);
        let axes = frame.local_axes(member);
        let length = axes.map_or(1.0, |axes| axes.length);
        let rigidity = data.stiffness.flexural_rigidity();
        let k = 2.0 * rigidity / length;
        let chord = 6.0 * rigidity / (length * length);

        let mut expr = LinearExpr::constant(self.fixed_end[member.index()].at(end));
        if let Some(id) = self.registry.id(Unknown::Rotation(near)) {
            expr.push_unknown(2.0 * k, id);
        }
        if let Some(id) = self.registry.id(Unknown::Rotation(far)) {
            expr.push_unknown(k, id);
        }

        let settlement = self.displacements.transverse(frame, member);
        if settlement != 0.0 {
            expr.push_constant(-chord * settlement);
        }

        if data.kind.behaviour().carries_sway {
            let transverse_x = axes.map_or(0.0, |axes| axes.transverse.x);
            for (node_end, sign) in [(MemberEnd::Start, -1.0), (MemberEnd::End, 1.0)] {
                let node = frame.end_node(member, node_end);
                let Some(number) = self.sway.sway_of(node) else {
                    continue;
                };
                if let Some(id) = self.registry.id(Unknown::Sway(number)) {
                    expr.push_unknown(-chord * sign * transverse_x, id);
                }
            }
        }
        expr
    }

    /// `Σ incident end moments − applied moment = 0`.
    fn joint_equation(
        &self,
        node: NodeIndex,
        end_moments: &[EndMoment],
    ) -> Result<Option<LabelledEquation>, AnalysisError> {
        let frame = self.frame;
        if frame.node(node).is_fixed() || frame.is_free_tip(node) {
            return Ok(None);
        }
        let mut expr = LinearExpr::new();
        for (member, end) in frame.incident_ends(node) {
            expr.extend_from(&end_moments[2 * member.index() + end_slot(end)].expr);
        }
        expr.push_constant(-frame.node(node).load.moment);
        self.finish(format!("joint {}", frame.node(node).label), &expr)
    }

    /// `Σ horizontal nodal loads − Σ column end shears = 0` over one group.
    fn sway_equation(
        &self,
        number: usize,
        nodes: &[NodeIndex],
        end_moments: &[EndMoment],
    ) -> Result<Option<LabelledEquation>, AnalysisError> {
        let frame = self.frame;
        let mut expr = LinearExpr::new();
        for node in nodes {
            expr.push_constant(frame.node(*node).load.x);
            for (member, end) in frame.incident_ends(*node) {
                if !frame.member(member).kind.behaviour().carries_sway {
                    continue;
                }
                let Some(axes) = frame.local_axes(member) else {
                    continue;
                };
                let shear = self.end_shear(member, end, end_moments)?;
                expr.extend_scaled(&shear, -axes.transverse.x);
            }
        }
        self.finish(format!("sway group DELTA_{number}"), &expr)
    }

    /// Transverse force on `end` of a member as an expression.
    fn end_shear(
        &self,
        member: EdgeIndex,
        end: MemberEnd,
        end_moments: &[EndMoment],
    ) -> Result<LinearExpr, AnalysisError> {
        let loads = &self.frame.member(member).loads;
        let length = self.frame.local_axes(member).map_or(1.0, |axes| axes.length);
        let base = 2 * member.index();
        let (sign, load_term) = match end {
            MemberEnd::Start => {
                let mut arm = 0.0;
                for load in loads {
                    arm -= load.moment_about(length)?;
                }
                (1.0, arm)
            }
            MemberEnd::End => {
                let mut arm = 0.0;
                for load in loads {
                    arm += load.moment_about(0.0)?;
                }
                (-1.0, arm)
            }
        };
        let mut shear = LinearExpr::constant(load_term / length);
        shear.extend_scaled(&end_moments[base].expr, sign / length);
        shear.extend_scaled(&end_moments[base + 1].expr, sign / length);
        Ok(shear)
    }

    /// Collect terms, dropping or rejecting equations without unknowns.
    fn finish(
        &self,
        location: String,
        expr: &LinearExpr,
    ) -> Result<Option<LabelledEquation>, AnalysisError> {
        let equation = expr.collect();
        if equation.has_unknowns() {
            return Ok(Some(LabelledEquation { location, equation }));
        }
        let scale = expr
            .terms()
            .iter()
            .filter(|term| term.symbol == Symbol::Constant)
            .fold(0.0_f64, |acc, term| acc.max(term.coefficient.abs()));
        if is_negligible(equation.constant, self.options.tolerance, scale) {
            log::trace!("{location} is satisfied identically");
            Ok(None)
        } else {
            Err(AnalysisError::InconsistentEquilibrium {
                location,
                residual: equation.constant,
            })
        }
    }
}

/// Position of an end within a member's pair of expressions.
pub(crate) fn end_slot(end: MemberEnd) -> usize {
    match end {
        MemberEnd::Start => 0,
        MemberEnd::End => 1,
    }
}
