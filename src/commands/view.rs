use anyhow::{Context, Result};
use dronefleet::{DroneStatus, load_action_stats, load_snapshot};

pub fn run_view(json: bool) -> Result<()> {
    let Some(snapshot) = load_snapshot().context("reading fleet snapshot")? else {
        println!("No snapshot found. Run `dronefleet run --map <file>` first.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "Tick {} (captured {}) | {}x{} | drones active {}/{} | missiles {} | targets remaining {}",
        snapshot.tick,
        snapshot.captured_at,
        snapshot.width,
        snapshot.height,
        snapshot.active_drones(),
        snapshot.drones.len(),
        snapshot.missiles_left,
        snapshot.targets_remaining
    );
    for line in &snapshot.map {
        println!("{}", line);
    }

    println!("Drones:");
    for drone in &snapshot.drones {
        let marker = if drone.status == DroneStatus::Destroyed {
            "x"
        } else {
            "D"
        };
        println!(
            " {} {} | {} | at {} | battery={:.2} | mode={} | cmd={} | path={} | known={}",
            marker,
            drone.id,
            drone.status,
            drone.position,
            drone.battery,
            drone.scan_mode,
            drone.command,
            drone.path_len,
            drone.known_tiles
        );
    }

    if !snapshot.known_targets.is_empty() {
        println!("Known targets:");
        for (id, at) in &snapshot.known_targets {
            println!(" - {} at {}", id, at);
        }
    }
    if !snapshot.threat_zones.is_empty() {
        println!("Threat zones:");
        for zone in &snapshot.threat_zones {
            let kind = if zone.is_precise() { "confirmed" } else { "estimated" };
            println!(" - {} r={} ({})", zone.center(), zone.radius(), kind);
        }
    }
    Ok(())
}

pub fn run_stats() -> Result<()> {
    let store = load_action_stats().context("reading action stats")?;
    if store.per_drone.is_empty() {
        println!("No action stats recorded.");
        return Ok(());
    }

    println!("Action summary per drone:");
    for (drone, stats) in store.per_drone.iter() {
        println!(
            " - {} | move={} scan={} (en route {}) replan={} collide={} no_path={} recharge={} arrive={}{}",
            drone,
            stats.move_count,
            stats.scan_count,
            stats.opportunistic_scan_count,
            stats.replan_count,
            stats.collision_count,
            stats.no_path_count,
            stats.recharge_count,
            stats.arrival_count,
            if stats.destroyed { " | DESTROYED" } else { "" }
        );
    }
    Ok(())
}
