use ledgehop_core::{Params, Simulation, Viewport, DT_MS};

fn main() -> ledgehop_core::Result<()> {
    let mut sim = Simulation::new(Params::default(), Viewport::new(800.0, 600.0)?)?;

    let mut jumped: u32 = 0;
    let mut landed: u32 = 0;
    let mut grounded_ticks: u32 = 0;

    for frame in 0..180u32 {
        match frame {
            0 => sim.key_down("ArrowRight"),
            10 | 100 => sim.key_down("Space"),
            11 | 101 => sim.key_up("Space"),
            120 => sim.key_up("ArrowRight"),
            _ => {}
        }

        let r = sim.tick(frame as f64 * DT_MS);
        jumped += r.control.jumped as u32;
        landed += r.control.landed as u32;
        grounded_ticks += r.grounded as u32;
    }

    let p = sim.player_aabb().center;
    let v = sim.player_velocity();
    let summary = serde_json::json!({
        "x": p.x,
        "y": p.y,
        "vx": v.x,
        "vy": v.y,
        "grounded": sim.is_grounded(),
        "jumped": jumped,
        "landed": landed,
        "grounded_ticks": grounded_ticks,
    });
    println!("{summary}");
    Ok(())
}
