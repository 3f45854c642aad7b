use crate::cli::MonitorArgs;
use crate::display;
use crate::exit_codes;
use crate::output;
use quakewatch_rs::{list_ports, open_serial, Frame, SerialConfig, Session};
use std::io::Read;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub async fn execute(args: MonitorArgs) -> i32 {
    let port_name = match resolve_port(args.port.as_deref()) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let session = match Session::new(args.session_config()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let serial = SerialConfig {
        port: port_name,
        baud_rate: args.baud,
        timeout: Duration::from_millis(args.timeout_ms),
    };
    let port = match open_serial(&serial) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::SOURCE_ERROR;
        }
    };

    if !args.quiet {
        eprintln!("Connected: {} @ {} baud", serial.port, serial.baud_rate);
        eprintln!("Receiving data... (Ctrl-C to stop)");
    }

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(watch_interrupt(cancel.clone()));

    let refresh = Duration::from_millis(args.refresh_ms);
    let quiet = args.quiet;
    let loop_cancel = cancel.clone();
    let outcome =
        tokio::task::spawn_blocking(move || drive(session, port, &loop_cancel, refresh, quiet))
            .await;

    cancel.cancel();
    let _ = watcher.await;

    let session = match outcome {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: monitor loop failed: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };
    if !quiet {
        eprintln!("Serial port closed");
    }

    if let Some(path) = args.window_out.as_deref() {
        if let Err(e) = output::write_window(&session.window(), path) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    }

    let stats = session.statistics();
    let text = if args.json {
        match output::to_json(&stats, false) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    } else {
        display::render_statistics(&stats)
    };
    if let Err(e) = output::write_output(&text, None) {
        eprintln!("Error: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    if session.link_lost() {
        exit_codes::EXECUTION_ERROR
    } else {
        exit_codes::SUCCESS
    }
}

/// Pick the port to open: the explicit one, or the only one present.
fn resolve_port(requested: Option<&str>) -> Result<String, String> {
    if let Some(port) = requested {
        return Ok(port.to_string());
    }

    let ports = list_ports().map_err(|e| e.to_string())?;
    match ports.as_slice() {
        [] => Err("No serial ports found; pass --port".to_string()),
        [only] => {
            eprintln!("Auto-selected: {}", only.name);
            Ok(only.name.clone())
        }
        many => Err(format!(
            "{} serial ports found ({}); pass --port to choose one",
            many.len(),
            many.iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

async fn watch_interrupt(cancel: CancellationToken) {
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            match res {
                Ok(()) => log::info!("Interrupt received, stopping"),
                Err(e) => log::warn!("Failed to listen for Ctrl-C: {}", e),
            }
            cancel.cancel();
        }
        _ = cancel.cancelled() => {}
    }
}

/// The driving loop. Returns the session for the final report once cancelled
/// or once the link is lost; the port is closed on return.
fn drive<R: Read>(
    mut session: Session,
    mut port: R,
    cancel: &CancellationToken,
    refresh: Duration,
    quiet: bool,
) -> Session {
    while !cancel.is_cancelled() && !session.link_lost() {
        let tick = Instant::now();

        let frames = session.poll_until(&mut port, || cancel.is_cancelled());
        if !quiet {
            let new_records = frames
                .iter()
                .filter(|f| matches!(f, Frame::Intensity(_)))
                .count();
            for point in session.aggregator().recent_intensity(new_records) {
                println!("{}", display::intensity_line(point));
            }
        }

        if let Some(rest) = refresh.checked_sub(tick.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    log::info!("Closing serial port");
    drop(port);
    session
}
