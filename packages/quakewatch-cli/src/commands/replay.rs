use crate::cli::ReplayArgs;
use crate::display;
use crate::exit_codes;
use crate::output;
use quakewatch_rs::{Session, SessionConfig};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn execute(args: ReplayArgs) -> i32 {
    let path = Path::new(&args.file);
    if !path.is_file() {
        eprintln!("Error: Capture file not found: {}", args.file);
        return exit_codes::INPUT_ERROR;
    }

    let mut reader = match File::open(path) {
        Ok(f) => BufReader::new(f),
        Err(e) => {
            eprintln!("Error: Failed to open '{}': {}", args.file, e);
            return exit_codes::SOURCE_ERROR;
        }
    };

    let mut session = match Session::new(SessionConfig::default()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    // A file never times out, so the first empty read is end of capture.
    while !session.link_lost() {
        let Some(frame) = session.step(&mut reader) else {
            break;
        };
        if args.frames {
            match output::to_json(&frame, true) {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return exit_codes::EXECUTION_ERROR;
                }
            }
        }
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
    if let Err(e) = output::write_output(&text, args.output.as_deref()) {
        eprintln!("Error: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    if session.link_lost() {
        exit_codes::EXECUTION_ERROR
    } else {
        exit_codes::SUCCESS
    }
}
