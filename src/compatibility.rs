//! Displacement compatibility of axially rigid members.
//!
//! Supports and imposed inputs fix some displacement components; requiring
//! every member to keep its length determines as many of the others as
//! possible. Components left undetermined are taken as zero.

use nalgebra::{DMatrix, DVector, Vector2};
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::errors::AnalysisError;
use crate::frame::Frame;
use crate::geometry::Displacement;
use crate::linear::least_squares_solve;
use crate::options::AnalysisOptions;

/// Resolved translation of every node.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ResolvedDisplacements {
    values: Vec<Displacement>,
}

impl ResolvedDisplacements {
    /// Resolve displacements for `frame`.
    pub(crate) fn resolve(
        frame: &Frame,
        options: &AnalysisOptions,
    ) -> Result<Self, AnalysisError> {
        let count = frame.node_count();
        let mut known = vec![[None, None]; count];
        let mut scale: f64 = 0.0;
        for node in frame.node_indices() {
            let components = frame.known_displacement(node);
            for value in components.iter().flatten() {
                scale = scale.max(value.abs());
            }
            known[node.index()] = components;
        }

        // Column of every free component that some member constrains.
        let mut column_of = vec![[None, None]; count];
        let mut columns = 0;
        let mut rows = Vec::new();
        for member in frame.member_indices() {
            let (Some((start, end)), Some(axes)) =
                (frame.member_nodes(member), frame.local_axes(member))
            else {
                continue;
            };
            let axis = [axes.axis.x, axes.axis.y];
            let mut row = Vec::new();
            let mut constant = 0.0;
            for (node, sign) in [(start, -1.0), (end, 1.0)] {
                for component in 0..2 {
                    let coefficient = sign * axis[component];
                    if coefficient == 0.0 {
                        continue;
                    }
                    match known[node.index()][component] {
                        Some(value) => constant += coefficient * value,
                        None => {
                            let column = *column_of[node.index()][component].get_or_insert_with(|| {
                                columns += 1;
                                columns - 1
                            });
                            row.push((column, coefficient));
                        }
                    }
                }
            }
            rows.push((member, row, constant));
        }

        let mut free = vec![0.0; columns];
        if columns > 0 {
            let mut matrix = DMatrix::zeros(rows.len(), columns);
            let mut rhs = DVector::zeros(rows.len());
            for (index, (_, row, constant)) in rows.iter().enumerate() {
                rhs[index] = -constant;
                for (column, coefficient) in row {
                    matrix[(index, *column)] = *coefficient;
                }
            }
            let solution = least_squares_solve(&matrix, &rhs, options.ridge)?;
            free = solution.iter().copied().collect();
        }

        let values: Vec<Displacement> = (0..count)
            .map(|index| {
                let component = |axis: usize| {
                    known[index][axis]
                        .or_else(|| column_of[index][axis].map(|column| free[column]))
                        .unwrap_or(0.0)
                };
                Displacement::new(component(0), component(1))
            })
            .collect();

        let resolved = Self { values };
        let tolerance = options.tolerance * (1.0 + scale);
        for (member, _, _) in &rows {
            let residual = resolved.elongation(frame, *member);
            if residual.abs() > tolerance {
                return Err(AnalysisError::InconsistentDisplacement {
                    member: *member,
                    residual,
                });
            }
        }
        log::debug!(
            "resolved displacements: {} known components, {} found from {} members",
            known.iter().flatten().flatten().count(),
            columns,
            rows.len()
        );
        Ok(resolved)
    }

    /// Resolved translation of a node.
    pub(crate) fn at(&self, node: NodeIndex) -> Displacement {
        self.values.get(node.index()).copied().unwrap_or_default()
    }

    fn relative(&self, frame: &Frame, member: EdgeIndex) -> Option<Vector2<f64>> {
        let (start, end) = frame.member_nodes(member)?;
        Some(self.at(end).to_vector() - self.at(start).to_vector())
    }

    /// Change of member length implied by the resolved displacements.
    fn elongation(&self, frame: &Frame, member: EdgeIndex) -> f64 {
        match (self.relative(frame, member), frame.local_axes(member)) {
            (Some(relative), Some(axes)) => relative.dot(&axes.axis),
            _ => 0.0,
        }
    }

    /// Relative translation of the end over the start, across the member.
    pub(crate) fn transverse(&self, frame: &Frame, member: EdgeIndex) -> f64 {
        match (self.relative(frame, member), frame.local_axes(member)) {
            (Some(relative), Some(axes)) => relative.dot(&axes.transverse),
            _ => 0.0,
        }
    }
}
