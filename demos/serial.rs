use std::env;

use fugit::MillisDurationU32;
use inquire::Select;
use keithley_2231a::{config::DriverConfig, psu::Keithley2231A};

// The PSU answers `*OPC?` only once a command has finished, a reset can take a while.
const READ_TIMEOUT_MS: u32 = 5000;
const CH1_VOLTAGE_V: f64 = 3.3;
const CH1_CURRENT_A: f64 = 1.0;
const CH3_VOLTAGE_V: f64 = 5.0;
const CH3_CURRENT_A: f64 = 0.2;
const OUTPUT_ON_DELAY_MS: u64 = 5000;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    let config = DriverConfig::default()
        .with_read_timeout(MillisDurationU32::millis(READ_TIMEOUT_MS))
        .with_span(tracing::info_span!("psu", port = port_name.as_str()));
    let mut psu: Keithley2231A<_, 128> =
        Keithley2231A::open(&port_name, config).expect("Failed to connect to the 2231A");

    println!("Connected to: {}", psu.identify().unwrap());

    psu.set_all_channels_output_state(false).unwrap();

    psu.set_channel_source(1, CH1_VOLTAGE_V, CH1_CURRENT_A).unwrap();
    psu.set_channel_output_state(true).unwrap();
    println!("CH1 on at {}V / {}A", CH1_VOLTAGE_V, CH1_CURRENT_A);

    psu.set_channel_source(3, CH3_VOLTAGE_V, CH3_CURRENT_A).unwrap();
    psu.set_channel_output_state(true).unwrap();
    println!("CH3 on at {}V / {}A", CH3_VOLTAGE_V, CH3_CURRENT_A);

    psu.display_text("OK").unwrap();
    psu.send_beep().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(OUTPUT_ON_DELAY_MS));

    psu.set_all_channels_output_state(false).unwrap();
    psu.clear_text().unwrap();
    psu.close().unwrap();
    println!("Outputs off, instrument back in local mode.");
}
