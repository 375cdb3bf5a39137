use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

/// Watch both probe temperatures on a BlueTherm Duo.
#[derive(Parser)]
#[command(name = "bluetherm")]
struct Args {
    /// Serial device path, e.g. /dev/rfcomm0
    device: PathBuf,

    /// Seconds between polls
    #[arg(short, long, default_value_t = 10.0)]
    interval: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    println!(
        "Polling {} every {} s (Ctrl-C to stop)...",
        args.device.display(),
        args.interval
    );

    bluetherm_lib::poll(
        &args.device,
        Duration::from_secs_f64(args.interval),
        |t1, t2| {
            println!("probe 1: {t1:8.2} °C    probe 2: {t2:8.2} °C");
        },
    )
    .await?;

    Ok(())
}
