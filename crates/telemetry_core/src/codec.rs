//! Pure per-modality frame decoding.
//!
//! Every channel value is the little-endian signed 16-bit integer at its
//! fixed slot offset, scaled into physical units by the modality's factor.
//! Decoding is all-or-nothing: a frame below the minimum length fails with
//! [`DecodeError::TruncatedFrame`] and produces no values at all.

use telemetry_types::{DecodeError, Modality};

/// Decode one notification payload into per-channel values, in the
/// modality's declared channel order.
pub fn decode(modality: Modality, raw: &[u8]) -> Result<Vec<f32>, DecodeError> {
    let required = modality.min_frame_len();
    if raw.len() < required {
        return Err(DecodeError::TruncatedFrame {
            modality,
            len: raw.len(),
            required,
        });
    }

    let stride = modality.sample_stride();
    let scale = modality.scale();
    let values = (0..modality.channel_count())
        .map(|slot| {
            let at = slot * stride;
            // Length was checked against the full layout above.
            let raw_value = i16::from_le_bytes([raw[at], raw[at + 1]]);
            f32::from(raw_value) * scale
        })
        .collect();

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eeg_frame(slots: [i16; 4]) -> Vec<u8> {
        let mut frame = vec![0u8; 20];
        for (i, v) in slots.iter().enumerate() {
            frame[i * 5..i * 5 + 2].copy_from_slice(&v.to_le_bytes());
        }
        frame
    }

    #[test]
    fn eeg_scales_to_microvolts() {
        let frame = eeg_frame([100, 0, 0, 0]);
        let values = decode(Modality::Eeg, &frame).unwrap();
        assert_eq!(values.len(), 4);
        assert!((values[0] - 10.0).abs() < 1e-6); // TP9: 100 * 0.1
        assert_eq!(&values[1..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn eeg_reads_only_first_two_bytes_of_each_slot() {
        let mut frame = eeg_frame([0, 0, 0, 0]);
        // Garbage in the trailing three bytes of each slot must be ignored.
        for slot in 0..4 {
            frame[slot * 5 + 2] = 0xff;
            frame[slot * 5 + 3] = 0xff;
            frame[slot * 5 + 4] = 0xff;
        }
        let values = decode(Modality::Eeg, &frame).unwrap();
        assert_eq!(values, vec![0.0; 4]);
    }

    #[test]
    fn accelerometer_full_scale() {
        // 16384 = 0x4000 little-endian -> exactly 1.0 g.
        let frame = [0x00, 0x40, 0x00, 0x00, 0x00, 0x00];
        let values = decode(Modality::Accelerometer, &frame).unwrap();
        assert_eq!(values, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn gyroscope_scale_per_count() {
        let frame = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
        let values = decode(Modality::Gyroscope, &frame).unwrap();
        assert!((values[0] - 0.007_476_8).abs() < 1e-9);
    }

    #[test]
    fn ppg_is_unscaled_and_signed() {
        let mut frame = vec![0u8; 6];
        frame[0..2].copy_from_slice(&(-1234i16).to_le_bytes());
        frame[2..4].copy_from_slice(&2000i16.to_le_bytes());
        let values = decode(Modality::Ppg, &frame).unwrap();
        assert_eq!(values, vec![-1234.0, 2000.0, 0.0]);
    }

    #[test]
    fn truncated_eeg_frame_is_rejected() {
        let err = decode(Modality::Eeg, &[0x64, 0x00, 0x00, 0x00]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedFrame {
                modality: Modality::Eeg,
                len: 4,
                required: 20,
            }
        );
    }

    #[test]
    fn oversized_frames_decode_the_declared_channels_only() {
        let mut frame = eeg_frame([1, 2, 3, 4]);
        frame.extend_from_slice(&[0xaa; 8]);
        let values = decode(Modality::Eeg, &frame).unwrap();
        assert_eq!(values.len(), 4);
    }
}
