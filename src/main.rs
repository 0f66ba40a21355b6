mod report;
mod scenario;

use std::error::Error;

use framex::AnalysisOptions;
use report::render_summary;
use scenario::build_two_bay_portal;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Two bays of beams on three fixed-base columns, loaded by gravity on the
    // beams and a wind load at the left eaves.
    let portal = build_two_bay_portal()?;

    let options = AnalysisOptions::default();
    let analysis = portal.frame.analyze(&options)?;
    let susceptibility = portal.frame.sway_susceptibility();

    println!("{}", render_summary(&portal, &analysis, &susceptibility, &options)?);
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
