mod command;
mod device;
mod device_state;
mod sensor_data;

pub use command::{Command, CommandTable};
pub use device::{Device, DeviceTable};
pub use device_state::{DeviceState, DeviceStateTable};
pub use sensor_data::{SensorData, SensorDataTable};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statements to create the table and its indexes
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;
}
