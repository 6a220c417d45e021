//! Sensor modalities and their fixed wire layouts.
//!
//! Each modality carries an ordered channel list and a decode layout: every
//! channel value is a little-endian signed 16-bit integer at a fixed offset,
//! scaled into physical units. The layouts match the headband's notification
//! format and never change at runtime.

use serde::{Deserialize, Serialize};

/// One sensor category streamed by the headband.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Eeg,
    Accelerometer,
    Gyroscope,
    Ppg,
}

const EEG_CHANNELS: &[&str] = &["TP9", "AF7", "AF8", "TP10"];
const ACC_CHANNELS: &[&str] = &["X", "Y", "Z"];
const GYRO_CHANNELS: &[&str] = &["X", "Y", "Z"];
const PPG_CHANNELS: &[&str] = &["PPG1", "PPG2", "PPG3"];

impl Modality {
    /// All modalities, in the order the store and exporters iterate them.
    pub const ALL: [Modality; 4] = [
        Modality::Eeg,
        Modality::Accelerometer,
        Modality::Gyroscope,
        Modality::Ppg,
    ];

    /// Ordered channel names for this modality.
    pub fn channel_names(self) -> &'static [&'static str] {
        match self {
            Modality::Eeg => EEG_CHANNELS,
            Modality::Accelerometer => ACC_CHANNELS,
            Modality::Gyroscope => GYRO_CHANNELS,
            Modality::Ppg => PPG_CHANNELS,
        }
    }

    pub fn channel_count(self) -> usize {
        self.channel_names().len()
    }

    /// Minimum notification payload length for a full frame.
    ///
    /// EEG packs 4 channels into 5-byte slots (only the first 2 bytes of
    /// each slot carry the sample); the motion and PPG streams are plain
    /// 3 x 2-byte frames.
    pub fn min_frame_len(self) -> usize {
        match self {
            Modality::Eeg => 20,
            Modality::Accelerometer | Modality::Gyroscope | Modality::Ppg => 6,
        }
    }

    /// Distance in bytes between consecutive channel slots.
    pub fn sample_stride(self) -> usize {
        match self {
            Modality::Eeg => 5,
            Modality::Accelerometer | Modality::Gyroscope | Modality::Ppg => 2,
        }
    }

    /// Multiplier turning the raw i16 into physical units.
    pub fn scale(self) -> f32 {
        match self {
            // 0.1 uV per count
            Modality::Eeg => 0.1,
            // +/-2 g full scale
            Modality::Accelerometer => 1.0 / 16384.0,
            // +/-500 deg/s full scale
            Modality::Gyroscope => 0.007_476_8,
            // arbitrary units, unscaled
            Modality::Ppg => 1.0,
        }
    }

    /// Physical unit of the decoded values.
    pub fn unit(self) -> &'static str {
        match self {
            Modality::Eeg => "uV",
            Modality::Accelerometer => "g",
            Modality::Gyroscope => "deg/s",
            Modality::Ppg => "au",
        }
    }

    /// Short lowercase tag used in log lines and export file names.
    pub fn tag(self) -> &'static str {
        match self {
            Modality::Eeg => "eeg",
            Modality::Accelerometer => "acc",
            Modality::Gyroscope => "gyro",
            Modality::Ppg => "ppg",
        }
    }

    /// Index of a channel by name, if the modality declares it.
    pub fn channel_index(self, name: &str) -> Option<usize> {
        self.channel_names().iter().position(|&n| n == name)
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_channel_counts() {
        for modality in Modality::ALL {
            let last_slot = (modality.channel_count() - 1) * modality.sample_stride();
            // The last channel's two sample bytes must fit in the minimum frame.
            assert!(last_slot + 2 <= modality.min_frame_len(), "{modality}");
        }
    }

    #[test]
    fn channel_index_lookup() {
        assert_eq!(Modality::Eeg.channel_index("TP9"), Some(0));
        assert_eq!(Modality::Eeg.channel_index("TP10"), Some(3));
        assert_eq!(Modality::Gyroscope.channel_index("Z"), Some(2));
        assert_eq!(Modality::Ppg.channel_index("TP9"), None);
    }
}
