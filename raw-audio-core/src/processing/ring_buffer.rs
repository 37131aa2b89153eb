/// Fixed-capacity circular buffer for 16-bit samples.
///
/// Sits between a device capture callback and a blocking reader; wrap in
/// `Arc<parking_lot::Mutex<RingBuffer>>` for cross-thread access.
///
/// Overflow behavior: drops the oldest samples. The capture side must never
/// stall the device, so a slow reader loses history rather than blocking the
/// callback.
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Vec<i16>,
    write_index: usize,
    read_index: usize,
    available: usize,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            write_index: 0,
            read_index: 0,
            available: 0,
            capacity,
        }
    }

    /// Append samples, dropping the oldest on overflow.
    ///
    /// If `samples` is larger than the whole capacity, only the tail is kept.
    pub fn write(&mut self, samples: &[i16]) {
        if samples.is_empty() {
            return;
        }

        let samples = if samples.len() > self.capacity {
            &samples[samples.len() - self.capacity..]
        } else {
            samples
        };

        let overflow = (self.available + samples.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.read_index = (self.read_index + overflow) % self.capacity;
            self.available -= overflow;
        }

        for &sample in samples {
            self.buffer[self.write_index] = sample;
            self.write_index = (self.write_index + 1) % self.capacity;
        }
        self.available += samples.len();
    }

    /// Remove up to `out.len()` samples into `out`, front first.
    ///
    /// Returns the number of samples copied; fewer than requested when the
    /// buffer holds less.
    pub fn read_into(&mut self, out: &mut [i16]) -> usize {
        let to_read = out.len().min(self.available);
        for slot in out.iter_mut().take(to_read) {
            *slot = self.buffer[self.read_index];
            self.read_index = (self.read_index + 1) % self.capacity;
        }
        self.available -= to_read;
        to_read
    }

    /// Samples currently available for reading.
    pub fn len(&self) -> usize {
        self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    /// Discard all buffered samples.
    pub fn clear(&mut self) {
        self.write_index = 0;
        self.read_index = 0;
        self.available = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_write_read() {
        let mut buf = RingBuffer::new(10);
        buf.write(&[1, 2, 3]);

        let mut out = [0; 3];
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.read_into(&mut out), 3);
        assert_eq!(out, [1, 2, 3]);
        assert!(buf.is_empty());
    }

    #[test]
    fn read_partial() {
        let mut buf = RingBuffer::new(10);
        buf.write(&[1, 2, 3, 4, 5]);

        let mut first = [0; 3];
        assert_eq!(buf.read_into(&mut first), 3);
        assert_eq!(first, [1, 2, 3]);
        assert_eq!(buf.len(), 2);

        // request more than available
        let mut rest = [0; 10];
        assert_eq!(buf.read_into(&mut rest), 2);
        assert_eq!(&rest[..2], &[4, 5]);
        assert!(buf.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut buf = RingBuffer::new(4);
        buf.write(&[1, 2, 3, 4]);
        buf.write(&[5, 6]); // overflow: drops 1, 2

        let mut out = [0; 4];
        assert_eq!(buf.read_into(&mut out), 4);
        assert_eq!(out, [3, 4, 5, 6]);
    }

    #[test]
    fn write_larger_than_capacity() {
        let mut buf = RingBuffer::new(3);
        buf.write(&[1, 2, 3, 4, 5]); // only last 3 kept

        let mut out = [0; 3];
        assert_eq!(buf.read_into(&mut out), 3);
        assert_eq!(out, [3, 4, 5]);
    }

    #[test]
    fn wraparound() {
        let mut buf = RingBuffer::new(4);

        buf.write(&[1, 2, 3]);
        let mut skip = [0; 2];
        buf.read_into(&mut skip); // discard 1, 2; read_index = 2

        buf.write(&[4, 5, 6]); // wraps around

        let mut out = [0; 4];
        assert_eq!(buf.read_into(&mut out), 4);
        assert_eq!(out, [3, 4, 5, 6]);
    }

    #[test]
    fn clear_empties_buffer() {
        let mut buf = RingBuffer::new(10);
        buf.write(&[1, 2, 3]);
        buf.clear();

        let mut out = [0; 10];
        assert!(buf.is_empty());
        assert_eq!(buf.read_into(&mut out), 0);
    }

    #[test]
    fn empty_operations() {
        let mut buf = RingBuffer::new(10);

        let mut out = [0; 5];
        assert!(buf.is_empty());
        assert_eq!(buf.read_into(&mut out), 0);

        buf.write(&[]);
        assert!(buf.is_empty());
    }
}
