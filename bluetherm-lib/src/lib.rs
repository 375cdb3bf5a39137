//! Read temperatures from an ETI / Thermoworks BlueTherm Duo over its
//! serial-over-Bluetooth character device.
//!
//! The easy way in is [`poll`]:
//!
//! ```no_run
//! # async fn demo() -> Result<(), bluetherm_lib::BtError> {
//! use std::time::Duration;
//!
//! bluetherm_lib::poll("/dev/rfcomm0", Duration::from_secs(10), |t1, t2| {
//!     println!("probe 1: {t1:.2} °C, probe 2: {t2:.2} °C");
//! })
//! .await
//! # }
//! ```
//!
//! For anything beyond the two probe temperatures, open a [`Connection`] and
//! use [`Connection::poll`] or [`Connection::poll_once`] with the [`Field`]
//! registry directly. Nothing here touches Bluetooth pairing: the device is
//! assumed to already show up under `/dev`.

pub mod codec;
pub mod constants;
pub mod crc;
pub mod device;
pub mod error;
pub mod field;
pub mod packet;

pub use codec::{CodecKind, Value};
pub use device::{CharDevice, Connection, DevicePort};
pub use error::BtError;
pub use field::{Command, Field};
pub use packet::{Packet, extract_frames};

use std::path::Path;
use std::time::Duration;

/// Connect and poll both probe temperatures, in celsius, yielding each pair
/// to `handler`.
///
/// An unplugged probe reads as the −300.0 sentinel. The connection is
/// released on every exit path, including error exits. Runs until the
/// session fails; there is no timeout for a device that never replies.
pub async fn poll<P, F>(device_path: P, poll_interval: Duration, mut handler: F) -> Result<(), BtError>
where
    P: AsRef<Path>,
    F: FnMut(f64, f64),
{
    let connection = Connection::open(device_path, poll_interval)?;
    let fields = [Field::Sensor1Temperature, Field::Sensor2Temperature];
    let result = connection
        .poll(&fields, |values| {
            let t1 = values[0]
                .as_temperature()
                .unwrap_or(codec::TEMPERATURE_SENTINEL);
            let t2 = values[1]
                .as_temperature()
                .unwrap_or(codec::TEMPERATURE_SENTINEL);
            handler(t1, t2);
        })
        .await;
    connection.close();
    result
}
