use crate::cli::PortsArgs;
use crate::exit_codes;
use crate::output;
use quakewatch_rs::list_ports;

pub fn execute(args: PortsArgs) -> i32 {
    let ports = match list_ports() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    if args.json {
        match output::to_json(&ports, false) {
            Ok(json) => {
                if let Err(e) = output::write_output(&json, None) {
                    eprintln!("Error: {}", e);
                    return exit_codes::EXECUTION_ERROR;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
        return exit_codes::SUCCESS;
    }

    if ports.is_empty() {
        println!("No serial ports found");
        return exit_codes::SUCCESS;
    }

    println!("Available serial ports:");
    for (i, port) in ports.iter().enumerate() {
        println!("[{}] {}", i, port.name);
        println!("    Description: {}", port.description);
        if let Some(ref manufacturer) = port.manufacturer {
            println!("    Manufacturer: {}", manufacturer);
        }
    }

    exit_codes::SUCCESS
}
