use std::fmt::{self, Write};

use framex::{AnalysisOptions, FrameAnalysis, LoadError, SwaySusceptibility};

use crate::scenario::Portal;

/// Render a textual summary of the portal analysis.
///
/// Moments are printed anticlockwise positive on the member end, the same
/// convention the slope-deflection equations use, so they can be checked
/// against a hand calculation.
///
/// # Errors
///
/// Returns [`fmt::Error`] when writing fails or a member load cannot be
/// sampled.
pub fn render_summary(
    portal: &Portal,
    analysis: &FrameAnalysis,
    susceptibility: &SwaySusceptibility,
    options: &AnalysisOptions,
) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let properties = &portal.properties;

    writeln!(
        &mut output,
        "Two-bay portal ({:.1} m bays, {:.1} m storey, w = {:.1} N/m, H = {:.1} N)",
        properties.bay_width, properties.storey_height, properties.beam_load, properties.wind_load
    )?;
    writeln!(
        &mut output,
        "Sway: degree {}, {}; solved with {:?}",
        susceptibility.degree,
        if analysis.is_swaying() {
            "swaying under this load"
        } else {
            "no sway under this load"
        },
        analysis.solve_mode()
    )?;

    for (number, delta) in analysis.sways() {
        writeln!(&mut output, "DELTA_{number} = {delta:+.4e}")?;
    }

    output.push_str("End moments:\n");
    for (key, moment) in analysis.moment_map() {
        let expression = analysis
            .expressions()
            .get(&key)
            .map_or("", String::as_str);
        writeln!(&mut output, "  {key} = {moment:+.1} N·m  [{expression}]")?;
    }

    output.push_str("Reactions:\n");
    for (label, reaction) in analysis.reactions() {
        write!(
            &mut output,
            "  {label}: Rx = {:+.1} N, Ry = {:+.1} N",
            reaction.x, reaction.y
        )?;
        match reaction.moment {
            Some(moment) => writeln!(&mut output, ", M = {moment:+.1} N·m")?,
            None => output.push('\n'),
        }
    }

    output.push_str("Beam extremes:\n");
    for (index, beam) in portal.beams.iter().enumerate() {
        let Some(member) = analysis.member(*beam) else {
            continue;
        };
        let extremes = member
            .extremes(options.sample_step)
            .map_err(|_: LoadError| fmt::Error)?;
        writeln!(
            &mut output,
            "  bay {}: sagging {:+.1} N·m, hogging {:+.1} N·m, |V| {:.1} N",
            index + 1,
            extremes.max_sagging,
            extremes.max_hogging,
            extremes.max_shear
        )?;
    }

    Ok(output)
}
