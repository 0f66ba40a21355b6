//! Error types produced while editing or analysing frames.

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

/// Error returned when a member load is geometrically meaningless.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum LoadError {
    /// Returned when a magnitude or position is NaN or infinite.
    #[error("load values must be finite")]
    NonFinite,
    /// Returned when a uniform load covers zero or negative length.
    #[error("uniform load span must be positive (received {span})")]
    NonPositiveSpan {
        /// Rejected loaded length.
        span: f64,
    },
    /// Returned when the high and low ordinates of a trapezoidal load coincide.
    #[error("trapezoidal load has coincident high and low positions at {position}")]
    DegenerateTrapezoid {
        /// Shared position of both ordinates.
        position: f64,
    },
    /// Returned when part of the load lies beyond the member it is applied to.
    #[error("load extent [{from}, {to}] lies outside member of length {length}")]
    OutsideMember {
        /// Nearest loaded position measured from the member start.
        from: f64,
        /// Farthest loaded position measured from the member start.
        to: f64,
        /// Length of the loaded member.
        length: f64,
    },
}

/// Error returned when member stiffness properties are not physically meaningful.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum StiffnessError {
    /// Returned when the elastic modulus is zero or negative.
    #[error("elastic modulus must be positive (received {elastic_modulus})")]
    NonPositiveElasticModulus {
        /// Rejected elastic modulus.
        elastic_modulus: f64,
    },
    /// Returned when the second moment of area is zero or negative.
    #[error("second moment of area must be positive (received {second_moment})")]
    NonPositiveSecondMoment {
        /// Rejected second moment of area.
        second_moment: f64,
    },
}

/// Error returned when editing a [`Frame`](crate::Frame) with invalid data.
///
/// # Examples
///
/// ```
/// use petgraph::graph::NodeIndex;
/// use framex::{Frame, ModelEditError, Support};
///
/// let mut frame = Frame::new();
/// let missing = NodeIndex::new(7);
/// let error = frame
///     .set_support(missing, Support::fixed())
///     .expect_err("unknown node is rejected");
/// assert_eq!(error, ModelEditError::UnknownNode(missing));
/// ```
#[derive(Debug, Error, PartialEq)]
pub enum ModelEditError {
    /// Returned when a node cannot be found in the frame.
    #[error("node {0:?} does not exist in this frame")]
    UnknownNode(NodeIndex),
    /// Returned when a member cannot be found in the frame.
    #[error("member {0:?} does not exist in this frame")]
    UnknownMember(EdgeIndex),
    /// Returned when a node label is already taken.
    #[error("a node labelled '{0}' already exists")]
    DuplicateLabel(String),
    /// Returned when both ends of a member coincide.
    #[error("member between {start:?} and {end:?} has zero length")]
    ZeroLength {
        /// Start node of the rejected member.
        start: NodeIndex,
        /// End node of the rejected member.
        end: NodeIndex,
    },
    /// Returned when a beam is requested between nodes at different heights.
    #[error("beam between {start:?} and {end:?} is not horizontal")]
    NotHorizontal {
        /// Start node of the rejected beam.
        start: NodeIndex,
        /// End node of the rejected beam.
        end: NodeIndex,
    },
    /// Returned when a column is requested between nodes at different abscissae.
    #[error("column between {start:?} and {end:?} is not vertical")]
    NotVertical {
        /// Start node of the rejected column.
        start: NodeIndex,
        /// End node of the rejected column.
        end: NodeIndex,
    },
    /// Returned when the supplied stiffness is invalid.
    #[error("{0}")]
    InvalidStiffness(#[from] StiffnessError),
    /// Returned when the supplied member load is invalid.
    #[error("{0}")]
    InvalidLoad(#[from] LoadError),
}

/// Error returned when a frame analysis fails.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when an inclined member is handed to the orthogonal frame solver.
    #[error("member {0:?} is inclined; only horizontal beams and vertical columns are supported")]
    InclinedMember(EdgeIndex),
    /// Returned when neither end of a member is connected to anything else.
    #[error("member {0:?} is detached: both ends are free")]
    DetachedMember(EdgeIndex),
    /// Returned when supports and imposed displacements stretch an axially rigid member.
    #[error("displacements imposed on member {member:?} change its length by {residual:e}")]
    InconsistentDisplacement {
        /// Member whose axial compatibility is violated.
        member: EdgeIndex,
        /// Elongation implied by the known displacements.
        residual: f64,
    },
    /// Returned when an equilibrium equation has no unknowns but does not balance.
    #[error("equilibrium of {location} cannot be satisfied (out of balance by {residual:e})")]
    InconsistentEquilibrium {
        /// Human readable description of the joint or sway group.
        location: String,
        /// Constant left over once every unknown has dropped out.
        residual: f64,
    },
    /// Returned when the system is not square and least squares is disallowed.
    #[error("{equations} equations for {unknowns} unknowns; enable least squares to solve")]
    DimensionMismatch {
        /// Number of assembled equations.
        equations: usize,
        /// Number of distinct unknowns.
        unknowns: usize,
    },
    /// Returned when the equation system cannot be solved.
    #[error("equation system is singular; check supports and connectivity")]
    SingularSystem,
    /// Returned when a member load turns out to be invalid during analysis.
    #[error("{0}")]
    InvalidLoad(#[from] LoadError),
}

/// Error returned by the continuous-beam driver.
#[derive(Debug, Error, PartialEq)]
pub enum BeamError {
    /// Returned when a span index does not exist.
    #[error("span {0} does not exist")]
    UnknownSpan(usize),
    /// Returned when a support position index does not exist.
    #[error("support position {0} does not exist")]
    UnknownSupport(usize),
    /// Returned when a span is given a zero, negative or non-finite length.
    #[error("span length must be positive (received {length})")]
    NonPositiveLength {
        /// Rejected span length.
        length: f64,
    },
    /// Returned when the underlying frame rejects the beam description.
    #[error("{0}")]
    Model(#[from] ModelEditError),
    /// Returned when the analysis of the beam fails.
    #[error("{0}")]
    Analysis(#[from] AnalysisError),
}
