#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod beam;
mod compatibility;
mod equations;
pub mod errors;
pub mod expression;
pub mod fem;
pub mod frame;
pub mod geometry;
mod linear;
pub mod loads;
pub mod numeric;
mod options;
pub mod results;
mod solver;
pub mod sway;

pub use beam::{BeamAnalysis, BeamSupportResult, ContinuousBeam, SpanResult};
pub use errors::{AnalysisError, BeamError, LoadError, ModelEditError, StiffnessError};
pub use expression::{Equation, LinearExpr, Symbol, Term, Unknown, UnknownId, UnknownRegistry};
pub use fem::{fixed_end_moment, fixed_end_moments, FixedEndMoments, MemberEnd};
pub use frame::{Axis, Frame, MemberKind, Stiffness, Support, SupportKind};
pub use geometry::{displacement, force, point, Displacement, Force, Point};
pub use linear::SolveMode;
pub use loads::{Load, PointLoad, TrapezoidalLoad, UniformLoad};
pub use numeric::{compensated_sum, CompensatedSum};
pub use options::AnalysisOptions;
pub use results::{FrameAnalysis, InternalForceSample, MemberResult, Reaction, SpanExtremes};
pub use sway::SwaySusceptibility;
