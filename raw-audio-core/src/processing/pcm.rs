//! Codec for the flat recording file: interleaved little-endian signed
//! 16-bit samples, no header, no length prefix, no metadata. Readers must
//! already know the sample rate, channel layout and encoding out of band.

/// Encode samples as little-endian bytes, low byte first.
///
/// Output length = `samples.len() * 2`.
pub fn encode_samples(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Decode little-endian byte pairs back into samples.
///
/// A trailing odd byte is ignored.
pub fn decode_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_byte_first() {
        assert_eq!(encode_samples(&[0x0102]), vec![0x02, 0x01]);
    }

    #[test]
    fn negative_samples_are_twos_complement() {
        assert_eq!(encode_samples(&[-2]), vec![0xFE, 0xFF]);
        assert_eq!(decode_samples(&[0xFE, 0xFF]), vec![-2]);
    }

    #[test]
    fn decode_ignores_trailing_odd_byte() {
        assert_eq!(decode_samples(&[0x10, 0x00, 0x7F]), vec![16]);
    }

    #[test]
    fn round_trip() {
        let samples = [0, 1, -1, i16::MAX, i16::MIN, 12345, -12345];
        assert_eq!(decode_samples(&encode_samples(&samples)), samples);
    }
}
