use bluetherm_lib::{Command, Connection, Field, Packet};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

/// Read the static device fields (serial, firmware, battery) once.
#[derive(Parser)]
#[command(name = "device_info")]
struct Args {
    /// Serial device path, e.g. /dev/rfcomm0
    device: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args = Args::parse();

    let mut request = Packet::from_command(Command::Get);
    request.set_data_flags(&[
        Field::SerialNumber,
        Field::FirmwareVersion,
        Field::BatteryLevel,
        Field::CalibrationValue1,
    ])?;

    println!("Connecting to {}...", args.device.display());
    let connection = Connection::open(&args.device, Duration::from_secs(2))?;
    let response = connection.poll_once(request).await;
    connection.close();

    let Some(response) = response? else {
        println!("No response from the device.");
        return Ok(());
    };

    println!("============================================================");
    println!("DEVICE INFORMATION");
    println!("============================================================");
    println!("Serial Number:    {}", response.get(Field::SerialNumber));
    println!("Firmware Version: {}", response.get(Field::FirmwareVersion));
    println!();
    println!("Battery Level:    {}", response.get(Field::BatteryLevel));
    println!("Battery Temp:     {}", response.get(Field::BatteryTemperature));
    println!();
    println!("Calibrated:       {}", response.get(Field::ProbeCalibrationDate));

    Ok(())
}
