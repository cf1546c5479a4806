use chrono::{DateTime, Utc};
use log::info;

use orbitops::config::EngineConfig;
use orbitops::docking::{DockingInitialConditions, DockingSimulator};
use orbitops::orbital::{
    hohmann, LaunchWindowConfig, LaunchWindowOptimizer, OrbitalElements, Propagator,
    RendezvousPlanner,
};
use orbitops::sim::{run_to_completion, AbortSignal};
use orbitops::{Error, Result};

const CAPE_LATITUDE: f64 = 28.5; // deg
const CAPE_LONGITUDE: f64 = -80.6; // deg
const RULE: &str = "  ──────────────────────────────────────────────────────────────────";

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn load_config() -> Result<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| Error::ConfigParse(format!("{}: {}", path, e)))?;
            info!("configuration loaded from {}", path);
            EngineConfig::from_json(&json)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn run() -> Result<()> {
    let config = load_config()?;
    let epoch: DateTime<Utc> = config.launch.search_start.unwrap_or_else(Utc::now);

    println!();
    println!("====================================================================");
    println!("  ORBITAL OPERATIONS — mission scenario");
    println!("====================================================================");
    println!();

    // -----------------------------------------------------------------------
    // LEO -> GEO transfer
    // -----------------------------------------------------------------------
    let transfer = hohmann(6_778_000.0, 42_164_000.0)?;
    println!("  Hohmann Transfer LEO (6778 km) -> GEO (42164 km)");
    println!("{}", RULE);
    println!(
        "  Burn 1:        {:>8.1} m/s    Burn 2:       {:>8.1} m/s",
        transfer.dv1, transfer.dv2
    );
    println!(
        "  Total:         {:>8.1} m/s    Transfer:     {:>8.2} h",
        transfer.total_dv, transfer.transfer_time_hours
    );
    println!("  Phase angle:   {:>8.2} deg", transfer.phase_angle.to_degrees());
    println!();

    // -----------------------------------------------------------------------
    // Station orbit propagation and ground track
    // -----------------------------------------------------------------------
    let station = OrbitalElements::circular(420_000.0, 51.6f64.to_radians(), epoch);
    let station_state = station.to_state()?;
    let propagator = Propagator::new(config.propagator.clone())?;
    let track = propagator.propagate(&station_state, station.period())?;

    println!("  Station Orbit (420 km, 51.6 deg, one period)");
    println!("{}", RULE);
    println!(
        "  Period:        {:>8.1} min    Points:       {:>8}",
        station.period() / 60.0,
        track.len()
    );
    println!("  {:>9}  {:>9}  {:>9}  {:>9}", "t (min)", "lat (deg)", "lon (deg)", "alt (km)");
    println!("  {}", "─".repeat(44));
    let sample_interval = (track.len() / 12).max(1);
    for (i, p) in track.iter().enumerate() {
        if i % sample_interval != 0 && i != track.len() - 1 {
            continue;
        }
        let minutes = (p.epoch - epoch).num_seconds() as f64 / 60.0;
        println!(
            "  {:>9.1}  {:>9.2}  {:>9.2}  {:>9.1}",
            minutes,
            p.latitude_deg,
            p.longitude_deg,
            p.altitude_m / 1000.0
        );
    }
    println!();

    // -----------------------------------------------------------------------
    // Rendezvous with the station
    // -----------------------------------------------------------------------
    let chaser = OrbitalElements::circular(380_000.0, 51.0f64.to_radians(), epoch)
        .with_true_anomaly(-0.3)
        .to_state()?;
    let planner = RendezvousPlanner::new(config.rendezvous.clone(), config.spacecraft.clone())?;
    let plan = planner.plan(&chaser, &station_state)?;

    println!("  Rendezvous Plan ({} from 380 km / 51.0 deg)", planner.spacecraft().name);
    println!("{}", RULE);
    for m in &plan.maneuvers {
        println!(
            "  #{} T+{:>6.2} h  {:>8.1} m/s  {:>6.1} kg  {:>6.1} s  {}",
            m.id,
            (m.execution_time - epoch).num_seconds() as f64 / 3600.0,
            m.delta_v_magnitude(),
            m.propellant_kg,
            m.burn_duration_s,
            m.description
        );
    }
    println!(
        "  Total:         {:>8.1} m/s    Propellant:   {:>8.1} kg ({})",
        plan.total_delta_v,
        plan.propellant_kg,
        if plan.is_feasible() { "feasible" } else { "SHORT" }
    );
    println!();

    // -----------------------------------------------------------------------
    // Launch windows
    // -----------------------------------------------------------------------
    let optimizer = LaunchWindowOptimizer::new(LaunchWindowConfig {
        search_start: Some(epoch),
        site_longitude_deg: CAPE_LONGITUDE,
        ..config.launch.clone()
    })?;
    let windows = optimizer.optimize(&station, CAPE_LATITUDE, 3)?;

    println!("  Launch Windows from Cape Canaveral ({:.1} N)", CAPE_LATITUDE);
    println!("{}", RULE);
    for w in windows.iter().take(5) {
        println!(
            "  {}  az {:>6.2} deg  dv {:>7.0} m/s  score {:>5.1}",
            w.launch_time.format("%Y-%m-%d %H:%M UTC"),
            w.azimuth_deg,
            w.delta_v_required,
            w.score
        );
    }
    let equatorial = OrbitalElements::circular(500_000.0, 0.0, epoch);
    let unreachable = optimizer.optimize(&equatorial, CAPE_LATITUDE, 1)?;
    println!("  Equatorial target from the Cape: {} windows", unreachable.len());
    println!();

    // -----------------------------------------------------------------------
    // Docking
    // -----------------------------------------------------------------------
    let initial = DockingInitialConditions::default();
    let mut sim = DockingSimulator::new(
        config.docking.clone(),
        config.docking_parameters.clone(),
        initial.clone(),
    )?;
    let report = run_to_completion(&mut sim, &AbortSignal::new(), 3_600.0);

    println!("  Docking to {}", initial.port.name());
    println!("{}", RULE);
    for e in sim.phase_events() {
        println!(
            "  {:<14} t={:>6.1}s   range={:>8.3}m   speed={:>6.3}m/s",
            e.to.to_string(),
            e.time_s,
            e.distance_m,
            e.speed_mps
        );
    }
    println!(
        "  Result:        {:>8}       Score:        {:>8.0}",
        if report.success { "DOCKED" } else { "FAILED" },
        report.performance_score
    );
    println!(
        "  Delta-v:       {:>8.2} m/s    Propellant:   {:>8.2} kg",
        report.delta_v_used, report.propellant_kg
    );
    if let Some(reason) = &report.abort_reason {
        println!("  Abort:         {}", reason);
    }
    println!();
    println!(
        "  Simulation: {} ticks, dt={} s",
        report.telemetry_samples, sim.config().tick_seconds
    );
    println!("====================================================================");
    println!();
    Ok(())
}
