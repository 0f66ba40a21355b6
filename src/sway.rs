//! Sway-group classification.
//!
//! Beams are axially rigid, so every node reachable through beams translates
//! horizontally by the same amount. Each such group either touches a support
//! that holds it horizontally or owns one sway unknown.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};

use crate::frame::{Axis, Frame, SupportKind};

/// Set of nodes that translate horizontally together.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SwayGroup {
    /// Member nodes in index order.
    pub(crate) nodes: Vec<NodeIndex>,
    /// Sway unknown number (`DELTA_k`), absent for restrained groups.
    pub(crate) sway: Option<usize>,
}

/// Partition of every node of a frame into sway groups.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SwayGroups {
    groups: Vec<SwayGroup>,
    group_of: Vec<usize>,
}

impl SwayGroups {
    /// Classify the nodes of `frame`.
    ///
    /// Groups are discovered by breadth-first search from the lowest unvisited
    /// node index, so numbering is deterministic.
    pub(crate) fn classify(frame: &Frame) -> Self {
        let mut links: UnGraph<(), ()> = UnGraph::with_capacity(frame.node_count(), 0);
        for _ in 0..frame.node_count() {
            links.add_node(());
        }
        for member in frame.member_indices() {
            if frame.member(member).kind.behaviour().links_translation {
                if let Some((start, end)) = frame.member_nodes(member) {
                    links.add_edge(start, end, ());
                }
            }
        }

        let unassigned = usize::MAX;
        let mut group_of = vec![unassigned; frame.node_count()];
        let mut groups = Vec::new();
        let mut next_sway = 1;
        for seed in links.node_indices() {
            if group_of[seed.index()] != unassigned {
                continue;
            }
            let mut nodes = Vec::new();
            let mut bfs = Bfs::new(&links, seed);
            while let Some(node) = bfs.next(&links) {
                group_of[node.index()] = groups.len();
                nodes.push(node);
            }
            nodes.sort();

            let anchored = nodes
                .iter()
                .any(|node| frame.node(*node).restrains(Axis::X));
            let only_tips = nodes.iter().all(|node| frame.is_free_tip(*node));
            let sway = (!anchored && !only_tips).then(|| {
                let number = next_sway;
                next_sway += 1;
                number
            });
            groups.push(SwayGroup { nodes, sway });
        }

        log::debug!(
            "found {} sway groups, {} free to translate",
            groups.len(),
            groups.iter().filter(|group| group.sway.is_some()).count()
        );
        Self { groups, group_of }
    }

    /// Groups in discovery order.
    pub(crate) fn groups(&self) -> &[SwayGroup] {
        &self.groups
    }

    /// Sway unknown number of the group containing `node`.
    pub(crate) fn sway_of(&self, node: NodeIndex) -> Option<usize> {
        self.group_of
            .get(node.index())
            .and_then(|group| self.groups.get(*group))
            .and_then(|group| group.sway)
    }
}

/// Kinematic classification computed from counts alone, without solving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwaySusceptibility {
    /// `2·joints − (2·(fixed + pinned) + rollers + members)`.
    pub degree: i64,
    /// Whether any support restrains horizontal translation.
    pub horizontally_restrained: bool,
}

impl SwaySusceptibility {
    /// Whether the frame may sway under some loading.
    #[must_use]
    pub fn is_susceptible(&self) -> bool {
        self.degree > 0 || !self.horizontally_restrained
    }
}

impl Frame {
    /// Kinematic sway check.
    ///
    /// A frame can be susceptible yet solve to zero sway under symmetric
    /// loading; see [`FrameAnalysis::is_swaying`](crate::FrameAnalysis::is_swaying)
    /// for the check based on solved translations.
    ///
    /// A fixed-base portal whose beam touches no support is susceptible and
    /// carries a `DELTA_1` unknown. Under symmetric loading that unknown
    /// solves to zero, so the portal is reported as not swaying.
    ///
    /// # Examples
    /// ```
    /// use framex::{point, Frame, Stiffness, Support};
    ///
    /// let mut frame = Frame::new();
    /// let a = frame.add_node("A", point(0.0, 0.0)).unwrap();
    /// let b = frame.add_node("B", point(0.0, 3.0)).unwrap();
    /// frame.set_support(a, Support::fixed()).unwrap();
    /// frame.add_column(a, b, Stiffness::new(1.0, 1.0)).unwrap();
    /// assert!(frame.sway_susceptibility().is_susceptible());
    /// ```
    #[must_use]
    pub fn sway_susceptibility(&self) -> SwaySusceptibility {
        let mut restraints: i64 = 0;
        let mut horizontally_restrained = false;
        for node in self.node_indices() {
            let Some(support) = self.node(node).support else {
                continue;
            };
            restraints += match support.kind {
                SupportKind::Fixed | SupportKind::Pinned => 2,
                SupportKind::Roller { .. } => 1,
            };
            horizontally_restrained |= support.restrains(Axis::X);
        }
        let joints = i64::try_from(self.node_count()).unwrap_or(i64::MAX);
        let members = i64::try_from(self.member_count()).unwrap_or(i64::MAX);
        SwaySusceptibility {
            degree: 2 * joints - (restraints + members),
            horizontally_restrained,
        }
    }
}
