//! Control-plane constants for the headband.
//!
//! Commands are opaque 3-byte codes written to the control characteristic.
//! Preset 12 enables all four data streams.

/// GATT characteristic UUIDs exposed by the headband.
pub const CONTROL_UUID: &str = "273e0001-4c4d-454d-96be-f03bac821358";
pub const EEG_UUID: &str = "273e0003-4c4d-454d-96be-f03bac821358";
pub const ACCELEROMETER_UUID: &str = "273e000a-4c4d-454d-96be-f03bac821358";
pub const GYROSCOPE_UUID: &str = "273e0009-4c4d-454d-96be-f03bac821358";
pub const PPG_UUID: &str = "273e000f-4c4d-454d-96be-f03bac821358";

/// A command written to the control characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Halt any running streams.
    Stop,
    /// Select preset 12, which enables EEG, motion and PPG streams.
    SetPreset,
    /// Begin streaming.
    Start,
}

impl ControlCommand {
    /// Wire encoding of the command.
    pub fn bytes(self) -> [u8; 3] {
        match self {
            ControlCommand::Stop => [0x02, 0x68, 0x0a],
            ControlCommand::SetPreset => [0x02, 0x73, 0x0a],
            ControlCommand::Start => [0x02, 0x64, 0x0a],
        }
    }
}
