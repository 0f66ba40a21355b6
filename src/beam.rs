//! Continuous beams.
//!
//! A chain of horizontal spans numbered left to right. `n` spans give `n + 1`
//! support positions, numbered from zero and labelled `N1`, `N2`, ... in the
//! underlying [`Frame`]. A position without a support is a free end, which
//! turns the adjacent span into an overhang.

use petgraph::graph::EdgeIndex;
use serde::Serialize;

use crate::errors::{AnalysisError, BeamError, ModelEditError};
use crate::frame::{Frame, Stiffness, Support};
use crate::geometry::{point, Force};
use crate::loads::Load;
use crate::options::AnalysisOptions;
use crate::results::{extremes_of, FrameAnalysis, InternalForceSample, MemberResult, Reaction, SpanExtremes};

/// One span of a continuous beam.
#[derive(Clone, Debug, PartialEq)]
struct BeamSpan {
    length: f64,
    stiffness: Stiffness,
    loads: Vec<Load>,
}

/// Multi-span beam description.
///
/// # Examples
/// ```
/// use framex::{AnalysisOptions, ContinuousBeam, Load, Stiffness, Support};
///
/// let mut beam = ContinuousBeam::new();
/// let section = Stiffness::new(200.0e9, 8.0e-5);
/// let first = beam.add_span(6.0, section).unwrap();
/// let second = beam.add_span(6.0, section).unwrap();
/// beam.set_support(0, Support::pinned()).unwrap();
/// beam.set_support(1, Support::roller()).unwrap();
/// beam.set_support(2, Support::roller()).unwrap();
/// beam.add_span_load(first, Load::uniform(0.0, 6.0, 10.0).unwrap()).unwrap();
/// beam.add_span_load(second, Load::uniform(0.0, 6.0, 10.0).unwrap()).unwrap();
///
/// let analysis = beam.analyze(&AnalysisOptions::default()).unwrap();
/// let interior = &analysis.supports[1];
/// assert!((interior.left_moment.unwrap() + 45.0).abs() < 1.0e-6);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContinuousBeam {
    spans: Vec<BeamSpan>,
    supports: Vec<Option<Support>>,
    nodal_loads: Vec<Force>,
}

impl ContinuousBeam {
    /// Create a beam without spans.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a span to the right end, returning its index.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::NonPositiveLength`] for a zero, negative or
    /// non-finite length.
    pub fn add_span(&mut self, length: f64, stiffness: Stiffness) -> Result<usize, BeamError> {
        if !(length > 0.0 && length.is_finite()) {
            return Err(BeamError::NonPositiveLength { length });
        }
        if self.supports.is_empty() {
            self.supports.push(None);
            self.nodal_loads.push(Force::default());
        }
        self.spans.push(BeamSpan {
            length,
            stiffness,
            loads: Vec::new(),
        });
        self.supports.push(None);
        self.nodal_loads.push(Force::default());
        Ok(self.spans.len() - 1)
    }

    /// Number of spans.
    #[must_use]
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Number of support positions.
    #[must_use]
    pub fn position_count(&self) -> usize {
        self.supports.len()
    }

    /// Attach a support at a position.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::UnknownSupport`] for a position past the last span.
    pub fn set_support(&mut self, position: usize, support: Support) -> Result<(), BeamError> {
        *self
            .supports
            .get_mut(position)
            .ok_or(BeamError::UnknownSupport(position))? = Some(support);
        Ok(())
    }

    /// Leave a position unsupported.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::UnknownSupport`] for a position past the last span.
    pub fn clear_support(&mut self, position: usize) -> Result<(), BeamError> {
        *self
            .supports
            .get_mut(position)
            .ok_or(BeamError::UnknownSupport(position))? = None;
        Ok(())
    }

    /// Apply a load to a span, positioned from the span's left end.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::UnknownSpan`] for a missing span and
    /// [`BeamError::Model`] when the load does not fit on the span.
    pub fn add_span_load(&mut self, span: usize, load: impl Into<Load>) -> Result<(), BeamError> {
        let load = load.into();
        let data = self.spans.get_mut(span).ok_or(BeamError::UnknownSpan(span))?;
        load.validate_on(data.length)
            .map_err(ModelEditError::from)?;
        data.loads.push(load);
        Ok(())
    }

    /// Add an action applied directly at a position.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::UnknownSupport`] for a position past the last span.
    pub fn add_nodal_load(&mut self, position: usize, load: Force) -> Result<(), BeamError> {
        *self
            .nodal_loads
            .get_mut(position)
            .ok_or(BeamError::UnknownSupport(position))? += load;
        Ok(())
    }

    /// Node label used for a position.
    #[must_use]
    pub fn label(position: usize) -> String {
        format!("N{}", position + 1)
    }

    /// Build the equivalent frame, returning it with the member of each span.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::Model`] when a span has invalid stiffness.
    pub fn to_frame(&self) -> Result<(Frame, Vec<EdgeIndex>), BeamError> {
        let mut frame = Frame::new();
        let mut x = 0.0;
        let mut nodes = Vec::with_capacity(self.supports.len());
        for position in 0..self.supports.len() {
            if position > 0 {
                x += self.spans[position - 1].length;
            }
            let node = frame.add_node(Self::label(position), point(x, 0.0))?;
            if let Some(support) = self.supports[position] {
                frame.set_support(node, support)?;
            }
            frame.set_load(node, self.nodal_loads[position])?;
            nodes.push(node);
        }

        let mut members = Vec::with_capacity(self.spans.len());
        for (index, span) in self.spans.iter().enumerate() {
            let member = frame.add_beam(nodes[index], nodes[index + 1], span.stiffness)?;
            for load in &span.loads {
                frame.add_member_load(member, *load)?;
            }
            members.push(member);
        }
        Ok((frame, members))
    }

    /// Analyse the beam, sampling every span at the step given in `options`.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError`] when the beam cannot be turned into a frame or
    /// when the frame analysis fails.
    pub fn analyze(&self, options: &AnalysisOptions) -> Result<BeamAnalysis, BeamError> {
        let (frame, members) = self.to_frame()?;
        let analysis = frame.analyze(options)?;

        let mut spans = Vec::with_capacity(members.len());
        for member in &members {
            let Some(result) = analysis.member(*member) else {
                continue;
            };
            let samples = result
                .internal_forces(options.sample_step)
                .map_err(AnalysisError::from)?;
            spans.push(SpanResult {
                extremes: extremes_of(&samples),
                member: result.clone(),
                samples,
            });
        }

        let mut x = 0.0;
        let supports = (0..self.supports.len())
            .map(|position| {
                if position > 0 {
                    x += self.spans[position - 1].length;
                }
                let label = Self::label(position);
                BeamSupportResult {
                    reaction: analysis.reaction(&label),
                    left_moment: position
                        .checked_sub(1)
                        .and_then(|span| spans.get(span))
                        .map(|span| span.member.end_moment),
                    right_moment: spans.get(position).map(|span| span.member.start_moment),
                    position: x,
                    label,
                }
            })
            .collect();

        Ok(BeamAnalysis {
            spans,
            supports,
            frame: analysis,
        })
    }
}

/// Solved span of a continuous beam.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpanResult {
    /// End actions of the span.
    pub member: MemberResult,
    /// Sampled shear and moment diagram.
    pub samples: Vec<InternalForceSample>,
    /// Extremes of the sampled diagram.
    pub extremes: SpanExtremes,
}

/// Solved support position of a continuous beam.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeamSupportResult {
    /// Node label.
    pub label: String,
    /// Distance from the left end of the beam.
    pub position: f64,
    /// Reaction, absent for free positions.
    pub reaction: Option<Reaction>,
    /// Moment on the span to the left, at this position.
    pub left_moment: Option<f64>,
    /// Moment on the span to the right, at this position.
    pub right_moment: Option<f64>,
}

/// Result of a continuous-beam analysis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeamAnalysis {
    /// Spans in order.
    pub spans: Vec<SpanResult>,
    /// Support positions in order.
    pub supports: Vec<BeamSupportResult>,
    /// Underlying frame analysis.
    pub frame: FrameAnalysis,
}
