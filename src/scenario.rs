use framex::{force, point, Frame, Load, ModelEditError, Stiffness, Support};
use petgraph::graph::EdgeIndex;

/// Dimensions and actions of the demonstration portal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalProperties {
    /// Width of each bay in metres.
    pub bay_width: f64,
    /// Column height in metres.
    pub storey_height: f64,
    /// Gravity load on the beams in newtons per metre.
    pub beam_load: f64,
    /// Horizontal load at the left eaves in newtons.
    pub wind_load: f64,
    /// Section stiffness of every member.
    pub stiffness: Stiffness,
}

impl Default for PortalProperties {
    fn default() -> Self {
        Self {
            bay_width: 6.0,
            storey_height: 4.0,
            beam_load: 12_000.0,
            wind_load: 8_000.0,
            stiffness: Stiffness::new(200.0e9, 8.0e-5),
        }
    }
}

/// Frame built for the demonstration together with its inputs.
#[derive(Debug, Clone)]
pub struct Portal {
    /// The analysed frame.
    pub frame: Frame,
    /// Inputs used to build the frame.
    pub properties: PortalProperties,
    /// Beams from left to right.
    pub beams: Vec<EdgeIndex>,
}

/// Build a two-bay portal frame with fixed column bases.
///
/// Nodes `A`, `B`, `C` are the bases from left to right, `D`, `E`, `F` the
/// column heads.
pub fn build_two_bay_portal() -> Result<Portal, ModelEditError> {
    let properties = PortalProperties::default();
    let PortalProperties {
        bay_width: width,
        storey_height: height,
        stiffness,
        ..
    } = properties;

    let mut frame = Frame::new();
    let mut beams = Vec::new();
    let mut heads = Vec::new();
    for (base, head, bay) in [("A", "D", 0.0), ("B", "E", 1.0), ("C", "F", 2.0)] {
        let x = width * bay;
        let base = frame.add_node(base, point(x, 0.0))?;
        let head = frame.add_node(head, point(x, height))?;
        frame.set_support(base, Support::fixed())?;
        frame.add_column(base, head, stiffness)?;
        heads.push(head);
    }
    for pair in heads.windows(2) {
        let beam = frame.add_beam(pair[0], pair[1], stiffness)?;
        frame.add_member_load(beam, Load::uniform(0.0, width, properties.beam_load)?)?;
        beams.push(beam);
    }
    frame.set_load(heads[0], force(properties.wind_load, 0.0, 0.0))?;

    Ok(Portal {
        frame,
        properties,
        beams,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_has_expected_topology() {
        let portal = build_two_bay_portal().expect("valid portal");
        assert_eq!(portal.frame.node_count(), 6);
        assert_eq!(portal.frame.member_count(), 5);
        assert_eq!(portal.beams.len(), 2);
        assert!(portal.frame.sway_susceptibility().is_susceptible());
    }
}
