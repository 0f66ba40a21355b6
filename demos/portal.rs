use framex::{force, point, AnalysisOptions, Frame, Load, Stiffness, Support};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let section = Stiffness::new(200.0e9, 8.0e-5);
    let mut frame = Frame::new();
    let a = frame.add_node("A", point(0.0, 0.0))?;
    let b = frame.add_node("B", point(0.0, 4.0))?;
    let c = frame.add_node("C", point(6.0, 4.0))?;
    let d = frame.add_node("D", point(6.0, 0.0))?;
    frame.set_support(a, Support::fixed())?;
    frame.set_support(d, Support::pinned())?;
    frame.add_column(a, b, section)?;
    let beam = frame.add_beam(b, c, section)?;
    frame.add_column(d, c, section)?;
    frame.add_member_load(beam, Load::uniform(0.0, 6.0, 10_000.0)?)?;
    frame.set_load(b, force(5_000.0, 0.0, 0.0))?;

    let analysis = frame.analyze(&AnalysisOptions::default())?;

    for (key, moment) in analysis.moment_map() {
        println!("{key} = {moment:.1} N·m");
    }
    if let Some(delta) = analysis.sway(1) {
        println!("DELTA_1 = {delta:.3e} m");
    }

    Ok(())
}
