//! Core data structures for rigid-jointed plane frames.

use std::collections::HashMap;

use nalgebra::Vector2;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::errors::{LoadError, ModelEditError, StiffnessError};
use crate::fem::{fixed_end_moments, FixedEndMoments, MemberEnd};
use crate::geometry::{Force, Point};
use crate::loads::Load;

/// Relative slack used when classifying members as horizontal or vertical.
const ALIGNMENT_TOLERANCE: f64 = 1.0e-9;

/// Global axis of the plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl Axis {
    /// Component of `vector` along this axis.
    pub(crate) fn component(self, vector: Vector2<f64>) -> f64 {
        match self {
            Self::X => vector.x,
            Self::Y => vector.y,
        }
    }
}

/// How a support restrains its node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SupportKind {
    /// Restrains both translations and the rotation.
    Fixed,
    /// Restrains both translations.
    Pinned,
    /// Restrains translation along a single axis.
    Roller {
        /// The restrained axis; the node rolls freely along the other one.
        restrains: Axis,
    },
}

/// Support attached to a node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Restraint type.
    pub kind: SupportKind,
    /// Prescribed movement of the support along its restrained transverse axis,
    /// positive when the support sinks (moves towards negative coordinates).
    /// Fixed and pinned supports settle vertically.
    pub settlement: f64,
}

impl Support {
    /// Fully fixed support.
    #[must_use]
    pub const fn fixed() -> Self {
        Self {
            kind: SupportKind::Fixed,
            settlement: 0.0,
        }
    }

    /// Pinned support.
    #[must_use]
    pub const fn pinned() -> Self {
        Self {
            kind: SupportKind::Pinned,
            settlement: 0.0,
        }
    }

    /// Roller on a horizontal surface, restraining vertical movement.
    #[must_use]
    pub const fn roller() -> Self {
        Self::roller_restraining(Axis::Y)
    }

    /// Roller restraining movement along `axis` only.
    #[must_use]
    pub const fn roller_restraining(axis: Axis) -> Self {
        Self {
            kind: SupportKind::Roller { restrains: axis },
            settlement: 0.0,
        }
    }

    /// Same support with a prescribed settlement.
    #[must_use]
    pub const fn with_settlement(mut self, settlement: f64) -> Self {
        self.settlement = settlement;
        self
    }

    /// Whether translation along `axis` is prevented.
    #[must_use]
    pub fn restrains(&self, axis: Axis) -> bool {
        match self.kind {
            SupportKind::Fixed | SupportKind::Pinned => true,
            SupportKind::Roller { restrains } => restrains == axis,
        }
    }

    /// Whether rotation is prevented.
    #[must_use]
    pub fn restrains_rotation(&self) -> bool {
        matches!(self.kind, SupportKind::Fixed)
    }

    /// Known displacement component along `axis`, if the support dictates one.
    pub(crate) fn known_displacement(&self, axis: Axis) -> Option<f64> {
        let settles_along = match self.kind {
            SupportKind::Fixed | SupportKind::Pinned => Axis::Y,
            SupportKind::Roller { restrains } => restrains,
        };
        if !self.restrains(axis) {
            None
        } else if axis == settles_along {
            Some(-self.settlement)
        } else {
            Some(0.0)
        }
    }
}

/// Section stiffness of a member.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stiffness {
    /// Elastic modulus.
    pub elastic_modulus: f64,
    /// Second moment of area about the bending axis.
    pub second_moment: f64,
}

impl Stiffness {
    /// Create a stiffness pair.
    #[must_use]
    pub const fn new(elastic_modulus: f64, second_moment: f64) -> Self {
        Self {
            elastic_modulus,
            second_moment,
        }
    }

    /// Flexural rigidity `E·I`.
    #[must_use]
    pub fn flexural_rigidity(&self) -> f64 {
        self.elastic_modulus * self.second_moment
    }

    fn validate(&self) -> Result<(), StiffnessError> {
        if !(self.elastic_modulus > 0.0) {
            return Err(StiffnessError::NonPositiveElasticModulus {
                elastic_modulus: self.elastic_modulus,
            });
        }
        if !(self.second_moment > 0.0) {
            return Err(StiffnessError::NonPositiveSecondMoment {
                second_moment: self.second_moment,
            });
        }
        Ok(())
    }
}

/// Orientation class of a member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    /// Horizontal member.
    Beam,
    /// Vertical member.
    Column,
    /// Any other orientation; not accepted by the frame solver.
    Inclined,
}

/// Per-kind behaviour used by the solver instead of branching on geometry.
#[derive(Debug)]
pub(crate) struct KindBehaviour {
    /// Whether the member ties its end nodes into one translation group.
    pub(crate) links_translation: bool,
    /// Whether chord rotation from group translation enters its end moments.
    pub(crate) carries_sway: bool,
    /// Whether the orthogonal frame solver can handle the member.
    pub(crate) solvable: bool,
}

const BEAM_BEHAVIOUR: KindBehaviour = KindBehaviour {
    links_translation: true,
    carries_sway: false,
    solvable: true,
};

const COLUMN_BEHAVIOUR: KindBehaviour = KindBehaviour {
    links_translation: false,
    carries_sway: true,
    solvable: true,
};

const INCLINED_BEHAVIOUR: KindBehaviour = KindBehaviour {
    links_translation: false,
    carries_sway: false,
    solvable: false,
};

impl MemberKind {
    /// Classify the segment from `start` to `end`.
    #[must_use]
    pub fn classify(start: Point, end: Point) -> Self {
        let delta = end.to_vector() - start.to_vector();
        let slack = ALIGNMENT_TOLERANCE * delta.norm().max(1.0);
        if delta.y.abs() <= slack {
            Self::Beam
        } else if delta.x.abs() <= slack {
            Self::Column
        } else {
            Self::Inclined
        }
    }

    pub(crate) fn behaviour(self) -> &'static KindBehaviour {
        match self {
            Self::Beam => &BEAM_BEHAVIOUR,
            Self::Column => &COLUMN_BEHAVIOUR,
            Self::Inclined => &INCLINED_BEHAVIOUR,
        }
    }
}

/// Internal representation of a frame node.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    /// Stable label used in unknown names and result keys.
    pub(crate) label: String,
    /// Position of the node.
    pub(crate) position: Point,
    /// Optional support.
    pub(crate) support: Option<Support>,
    /// Accumulated external action.
    pub(crate) load: Force,
    /// Imposed displacement components, overriding support values.
    pub(crate) imposed: [Option<f64>; 2],
}

impl Node {
    fn new(label: String, position: Point) -> Self {
        Self {
            label,
            position,
            support: None,
            load: Force::default(),
            imposed: [None, None],
        }
    }

    /// Whether the node's rotation is held by a fixed support.
    pub(crate) fn is_fixed(&self) -> bool {
        self.support.is_some_and(|support| support.restrains_rotation())
    }

    /// Whether translation along `axis` is held by the support.
    pub(crate) fn restrains(&self, axis: Axis) -> bool {
        self.support.is_some_and(|support| support.restrains(axis))
    }
}

/// Internal representation of a frame member.
#[derive(Clone, Debug)]
pub(crate) struct Member {
    /// Orientation class.
    pub(crate) kind: MemberKind,
    /// Section stiffness.
    pub(crate) stiffness: Stiffness,
    /// Loads in the order they were applied.
    pub(crate) loads: Vec<Load>,
}

/// Local axes of a member: unit axis from start to end and the transverse axis
/// obtained by rotating it a quarter turn anticlockwise.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LocalAxes {
    pub(crate) length: f64,
    pub(crate) axis: Vector2<f64>,
    pub(crate) transverse: Vector2<f64>,
}

/// Container for a rigid-jointed plane frame.
///
/// Nodes and members live in a `petgraph` arena; members refer to their end
/// nodes by index and supports belong to their node, so there are no
/// back-references to keep in sync.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    /// Underlying graph storage for nodes and members.
    graph: Graph<Node, Member>,
    /// Lookup from label to node.
    labels: HashMap<String, NodeIndex>,
}

impl Frame {
    /// Create an empty frame.
    ///
    /// # Examples
    /// ```
    /// use framex::Frame;
    ///
    /// let frame = Frame::new();
    /// assert_eq!(frame.node_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            labels: HashMap::new(),
        }
    }

    /// Return the number of nodes in the frame.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of members in the frame.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Add a labelled node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::DuplicateLabel`] when `label` is already used.
    ///
    /// # Examples
    /// ```
    /// use framex::{point, Frame};
    ///
    /// let mut frame = Frame::new();
    /// let node = frame.add_node("A", point(0.0, 0.0)).unwrap();
    /// assert_eq!(frame.node_by_label("A"), Some(node));
    /// assert!(frame.add_node("A", point(1.0, 0.0)).is_err());
    /// ```
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        position: Point,
    ) -> Result<NodeIndex, ModelEditError> {
        let label = label.into();
        if self.labels.contains_key(&label) {
            return Err(ModelEditError::DuplicateLabel(label));
        }
        let index = self.graph.add_node(Node::new(label.clone(), position));
        self.labels.insert(label, index);
        Ok(index)
    }

    /// Find a node by label.
    #[must_use]
    pub fn node_by_label(&self, label: &str) -> Option<NodeIndex> {
        self.labels.get(label).copied()
    }

    /// Label of a node.
    #[must_use]
    pub fn node_label(&self, node: NodeIndex) -> Option<&str> {
        self.graph.node_weight(node).map(|node| node.label.as_str())
    }

    /// Position of a node.
    #[must_use]
    pub fn node_position(&self, node: NodeIndex) -> Option<Point> {
        self.graph.node_weight(node).map(|node| node.position)
    }

    /// Connect two nodes with a horizontal beam.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::NotHorizontal`] when the nodes are at different
    /// heights, plus the errors of [`Frame::add_member`].
    pub fn add_beam(
        &mut self,
        start: NodeIndex,
        end: NodeIndex,
        stiffness: Stiffness,
    ) -> Result<EdgeIndex, ModelEditError> {
        match self.classify(start, end)? {
            MemberKind::Beam => self.insert_member(start, end, MemberKind::Beam, stiffness),
            _ => Err(ModelEditError::NotHorizontal { start, end }),
        }
    }

    /// Connect two nodes with a vertical column.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::NotVertical`] when the nodes are at different
    /// abscissae, plus the errors of [`Frame::add_member`].
    pub fn add_column(
        &mut self,
        start: NodeIndex,
        end: NodeIndex,
        stiffness: Stiffness,
    ) -> Result<EdgeIndex, ModelEditError> {
        match self.classify(start, end)? {
            MemberKind::Column => self.insert_member(start, end, MemberKind::Column, stiffness),
            _ => Err(ModelEditError::NotVertical { start, end }),
        }
    }

    /// Connect two nodes, classifying the member from its geometry.
    ///
    /// Inclined members are stored but rejected by [`Frame::analyze`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::UnknownNode`] for foreign indices,
    /// [`ModelEditError::ZeroLength`] for coincident nodes and
    /// [`ModelEditError::InvalidStiffness`] for non-positive `E` or `I`.
    pub fn add_member(
        &mut self,
        start: NodeIndex,
        end: NodeIndex,
        stiffness: Stiffness,
    ) -> Result<EdgeIndex, ModelEditError> {
        let kind = self.classify(start, end)?;
        self.insert_member(start, end, kind, stiffness)
    }

    fn classify(&self, start: NodeIndex, end: NodeIndex) -> Result<MemberKind, ModelEditError> {
        let start_position = self.require_node(start)?.position;
        let end_position = self.require_node(end)?.position;
        if start == end || start_position == end_position {
            return Err(ModelEditError::ZeroLength { start, end });
        }
        Ok(MemberKind::classify(start_position, end_position))
    }

    fn insert_member(
        &mut self,
        start: NodeIndex,
        end: NodeIndex,
        kind: MemberKind,
        stiffness: Stiffness,
    ) -> Result<EdgeIndex, ModelEditError> {
        stiffness.validate()?;
        Ok(self.graph.add_edge(
            start,
            end,
            Member {
                kind,
                stiffness,
                loads: Vec::new(),
            },
        ))
    }

    /// Remove a member from the frame.
    ///
    /// Following `petgraph` semantics, the most recently added member takes over
    /// the index of the removed one.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::UnknownMember`] when `member` is not part of this frame.
    pub fn remove_member(&mut self, member: EdgeIndex) -> Result<(), ModelEditError> {
        self.graph
            .remove_edge(member)
            .map(|_| ())
            .ok_or(ModelEditError::UnknownMember(member))
    }

    /// Replace the stiffness of a member.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::UnknownMember`] when `member` is not part of this
    /// frame and [`ModelEditError::InvalidStiffness`] for non-positive values.
    pub fn set_member_stiffness(
        &mut self,
        member: EdgeIndex,
        stiffness: Stiffness,
    ) -> Result<(), ModelEditError> {
        stiffness.validate()?;
        self.require_member_mut(member)?.stiffness = stiffness;
        Ok(())
    }

    /// Attach a support to a node, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::UnknownNode`] when `node` is not part of this frame.
    pub fn set_support(&mut self, node: NodeIndex, support: Support) -> Result<(), ModelEditError> {
        self.require_node_mut(node)?.support = Some(support);
        Ok(())
    }

    /// Remove the support from a node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::UnknownNode`] when `node` is not part of this frame.
    pub fn clear_support(&mut self, node: NodeIndex) -> Result<(), ModelEditError> {
        self.require_node_mut(node)?.support = None;
        Ok(())
    }

    /// Replace the external action applied to a node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::UnknownNode`] when `node` is not part of this frame.
    pub fn set_load(&mut self, node: NodeIndex, load: Force) -> Result<(), ModelEditError> {
        self.require_node_mut(node)?.load = load;
        Ok(())
    }

    /// Add to the external action applied to a node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::UnknownNode`] when `node` is not part of this frame.
    pub fn add_load(&mut self, node: NodeIndex, load: Force) -> Result<(), ModelEditError> {
        self.require_node_mut(node)?.load += load;
        Ok(())
    }

    /// Prescribe displacement components of a node.
    ///
    /// `None` leaves a component to be found from supports and member
    /// compatibility. A prescribed component overrides the value a support
    /// would give.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::UnknownNode`] when `node` is not part of this frame.
    pub fn set_imposed_displacement(
        &mut self,
        node: NodeIndex,
        x: Option<f64>,
        y: Option<f64>,
    ) -> Result<(), ModelEditError> {
        self.require_node_mut(node)?.imposed = [x, y];
        Ok(())
    }

    /// Apply a load to a member.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::UnknownMember`] when `member` is not part of this
    /// frame and [`ModelEditError::InvalidLoad`] when the load is malformed or
    /// extends past the member ends.
    pub fn add_member_load(
        &mut self,
        member: EdgeIndex,
        load: impl Into<Load>,
    ) -> Result<(), ModelEditError> {
        let load = load.into();
        let length = self
            .local_axes(member)
            .ok_or(ModelEditError::UnknownMember(member))?
            .length;
        load.validate_on(length)?;
        self.require_member_mut(member)?.loads.push(load);
        Ok(())
    }

    /// Start and end node of a member.
    #[must_use]
    pub fn member_nodes(&self, member: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(member)
    }

    /// Orientation class of a member.
    #[must_use]
    pub fn member_kind(&self, member: EdgeIndex) -> Option<MemberKind> {
        self.graph.edge_weight(member).map(|member| member.kind)
    }

    /// Length of a member.
    #[must_use]
    pub fn member_length(&self, member: EdgeIndex) -> Option<f64> {
        self.local_axes(member).map(|axes| axes.length)
    }

    /// Angle of a member's axis from the global X axis, in radians.
    #[must_use]
    pub fn member_angle(&self, member: EdgeIndex) -> Option<f64> {
        self.local_axes(member)
            .map(|axes| axes.axis.y.atan2(axes.axis.x))
    }

    /// Loads applied to a member.
    #[must_use]
    pub fn member_loads(&self, member: EdgeIndex) -> Option<&[Load]> {
        self.graph
            .edge_weight(member)
            .map(|member| member.loads.as_slice())
    }

    /// Fixed-end moments produced by a member's own loads.
    ///
    /// # Errors
    ///
    /// Returns [`ModelEditError::UnknownMember`] when `member` is not part of this
    /// frame and [`ModelEditError::InvalidLoad`] when a load is malformed.
    pub fn fixed_end_moments(&self, member: EdgeIndex) -> Result<FixedEndMoments, ModelEditError> {
        let length = self
            .member_length(member)
            .ok_or(ModelEditError::UnknownMember(member))?;
        let loads = &self.graph[member].loads;
        Ok(fixed_end_moments(length, loads)?)
    }

    /// Fixed-end moment at one end of a member.
    ///
    /// # Errors
    ///
    /// See [`Frame::fixed_end_moments`].
    pub fn fixed_end_moment(
        &self,
        member: EdgeIndex,
        end: MemberEnd,
    ) -> Result<f64, ModelEditError> {
        Ok(self.fixed_end_moments(member)?.at(end))
    }

    /// Sum of every applied action resolved to global axes: nodal forces plus
    /// member loads. Moments are not included.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when a member load is malformed.
    pub fn total_applied_load(&self) -> Result<Force, LoadError> {
        let mut total = Force::default();
        for node in self.graph.node_weights() {
            total += Force::new(node.load.x, node.load.y, 0.0);
        }
        for member in self.graph.edge_indices() {
            let Some(axes) = self.local_axes(member) else {
                continue;
            };
            for load in &self.graph[member].loads {
                let resultant = -load.total()? * axes.transverse;
                total += Force::new(resultant.x, resultant.y, 0.0);
            }
        }
        Ok(total)
    }

    pub(crate) fn node(&self, node: NodeIndex) -> &Node {
        &self.graph[node]
    }

    pub(crate) fn member(&self, member: EdgeIndex) -> &Member {
        &self.graph[member]
    }

    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub(crate) fn member_indices(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    /// Node at the selected end of a member.
    pub(crate) fn end_node(&self, member: EdgeIndex, end: MemberEnd) -> NodeIndex {
        let (start, finish) = self
            .graph
            .edge_endpoints(member)
            .unwrap_or((NodeIndex::end(), NodeIndex::end()));
        match end {
            MemberEnd::Start => start,
            MemberEnd::End => finish,
        }
    }

    /// Member ends meeting at a node, ordered by member index.
    pub(crate) fn incident_ends(&self, node: NodeIndex) -> Vec<(EdgeIndex, MemberEnd)> {
        let mut ends: Vec<(EdgeIndex, MemberEnd)> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (edge.id(), MemberEnd::Start))
            .chain(
                self.graph
                    .edges_directed(node, Direction::Incoming)
                    .map(|edge| (edge.id(), MemberEnd::End)),
            )
            .collect();
        ends.sort();
        ends
    }

    /// Number of members meeting at a node.
    pub(crate) fn degree(&self, node: NodeIndex) -> usize {
        self.graph.neighbors_undirected(node).count()
    }

    /// An unsupported node with a single member: the tip of a cantilever arm.
    pub(crate) fn is_free_tip(&self, node: NodeIndex) -> bool {
        self.graph[node].support.is_none() && self.degree(node) == 1
    }

    pub(crate) fn local_axes(&self, member: EdgeIndex) -> Option<LocalAxes> {
        let (start, end) = self.graph.edge_endpoints(member)?;
        let delta = self.graph[end].position.to_vector() - self.graph[start].position.to_vector();
        let length = delta.norm();
        let axis = delta / length;
        Some(LocalAxes {
            length,
            axis,
            transverse: Vector2::new(-axis.y, axis.x),
        })
    }

    /// Displacement components prescribed by supports and imposed input.
    pub(crate) fn known_displacement(&self, node: NodeIndex) -> [Option<f64>; 2] {
        let node = &self.graph[node];
        let from_support =
            |axis| node.support.and_then(|support| support.known_displacement(axis));
        [
            node.imposed[0].or_else(|| from_support(Axis::X)),
            node.imposed[1].or_else(|| from_support(Axis::Y)),
        ]
    }

    fn require_node(&self, node: NodeIndex) -> Result<&Node, ModelEditError> {
        self.graph
            .node_weight(node)
            .ok_or(ModelEditError::UnknownNode(node))
    }

    fn require_node_mut(&mut self, node: NodeIndex) -> Result<&mut Node, ModelEditError> {
        self.graph
            .node_weight_mut(node)
            .ok_or(ModelEditError::UnknownNode(node))
    }

    fn require_member_mut(&mut self, member: EdgeIndex) -> Result<&mut Member, ModelEditError> {
        self.graph
            .edge_weight_mut(member)
            .ok_or(ModelEditError::UnknownMember(member))
    }
}
