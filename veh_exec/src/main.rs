//! Main vehicle-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Driver command acquisition and processing
//!         - Mode arbitration
//!         - Lateral control processing
//!         - Vehicle model integration
//!         - Telemetry output
//!
//! One cycle executes per fixed tick (the `cycle_period_s` parameter). The
//! simulation clock advances by exactly one period per cycle: a cycle that
//! overruns its deadline is not dropped and does not enlarge `dt`, it is
//! counted and surfaced in telemetry.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use veh_lib::{
    cmd_processor,
    cycle::exec_cycle,
    data_store::DataStore,
    drv_cmd::DrvCmd,
    lat_ctrl::{self, LatCtrl},
    mode_mgr::{self, ModeMgr},
    params::VehExecParams,
    path::Path,
    tm::TmSink,
    veh_model::{self, VehModel},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingCmds, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("veh_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Shuttle Vehicle Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: VehExecParams =
        util::params::load("veh_exec.toml").wrap_err("Could not load veh_exec params")?;

    if exec_params.cycle_period_s <= 0.0 {
        return Err(eyre!(
            "cycle_period_s must be positive, got {}",
            exec_params.cycle_period_s
        ));
    }
    if exec_params.sim_duration_s <= 0.0 {
        return Err(eyre!(
            "sim_duration_s must be positive, got {}",
            exec_params.sim_duration_s
        ));
    }

    let lat_ctrl_params: lat_ctrl::Params =
        util::params::load("lat_ctrl.toml").wrap_err("Could not load LatCtrl params")?;

    let mode_mgr_params: mode_mgr::Params =
        util::params::load("mode_mgr.toml").wrap_err("Could not load ModeMgr params")?;

    let veh_model_params: veh_model::Params =
        util::params::load("veh_model.toml").wrap_err("Could not load VehModel params")?;

    info!("Exec parameters loaded");

    // ---- LOAD NOMINAL PATH ----

    let sw_root = host::get_sw_root().wrap_err("The software root is not set")?;

    let nominal_path = Path::from_file(sw_root.join(&exec_params.path_file))
        .wrap_err("Could not load the nominal path")?;

    info!(
        "Nominal path loaded from {:?}: {} points, end mode {:?}",
        exec_params.path_file,
        nominal_path.get_num_points(),
        nominal_path.end_mode
    );

    // Snapshot the path into the session so the display layer can plot it
    session.save_json("nominal_path.json", &nominal_path);

    // ---- INITIALISE DRIVER COMMAND SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the script path
    let mut script: Option<ScriptInterpreter<DrvCmd>> = if args.len() == 2 {
        info!("Loading driver command script from \"{}\"", &args[1]);

        let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

        info!(
            "Loaded script lasts {:.02} s and contains {} commands\n",
            si.get_duration(),
            si.get_num_cmds()
        );

        Some(si)
    } else if args.len() == 1 {
        info!("No script provided, the vehicle will track the nominal path undisturbed\n");
        None
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let lat_ctrl = LatCtrl::init(lat_ctrl_params).wrap_err("Failed to initialise LatCtrl")?;
    info!(
        "LatCtrl init complete, using the {} steering law",
        lat_ctrl.law_name()
    );

    let mode_mgr =
        ModeMgr::init(mode_mgr_params, lat_ctrl).wrap_err("Failed to initialise ModeMgr")?;
    info!("ModeMgr init complete");

    let mut veh_model = VehModel::default();
    veh_model
        .init(veh_model_params)
        .wrap_err("Failed to initialise VehModel")?;
    info!("VehModel init complete");

    let mut tm_sink = TmSink::init(&session).wrap_err("Failed to initialise the telemetry sinks")?;

    let mut ds = DataStore::new(nominal_path, veh_model, mode_mgr);

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Advance the simulation clock and clear items that need wiping at
        // the start of the cycle
        ds.cycle_start(exec_params.cycle_period_s);

        if ds.sim_time_s >= exec_params.sim_duration_s {
            info!(
                "Simulation duration ({} s) reached, stopping",
                exec_params.sim_duration_s
            );
            break;
        }

        // ---- DRIVER COMMAND PROCESSING ----

        if let Some(ref mut si) = script {
            match si.get_pending_cmds(ds.sim_time_s) {
                PendingCmds::None => (),
                PendingCmds::Some(cmd_vec) => {
                    for cmd in cmd_vec.iter() {
                        cmd_processor::exec(&mut ds, cmd);
                    }
                }
                // The simulation continues after the script runs out, faults
                // and mode changes simply stop arriving
                PendingCmds::EndOfScript => (),
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        match exec_cycle(&mut ds, exec_params.cycle_period_s) {
            Ok(packet) => {
                // ---- TELEMETRY ----

                // The sinks only ever read the snapshot, after the cycle's
                // state mutation is complete
                for event in ds.fault_events.iter() {
                    tm_sink.write_fault_event(event);
                }

                tm_sink.write(&packet);
            }
            // A cycle error is an internal invariant breach. It is reported
            // and the loop carries on - the exec never terminates on a
            // runtime condition
            Err(e) => warn!("Error during cycle processing: {}", e),
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(exec_params.cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - exec_params.cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;
                ds.num_missed_deadlines += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}
