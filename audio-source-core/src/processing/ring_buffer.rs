/// Circular buffer of interleaved f32 samples.
///
/// Not synchronized; share as `Arc<parking_lot::Mutex<RingBuffer>>` between
/// a receiving thread and the production thread.
///
/// Overflow behavior: drops oldest samples.
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Vec<f32>,
    write_index: usize,
    read_index: usize,
    available: usize,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: vec![0.0; capacity],
            write_index: 0,
            read_index: 0,
            available: 0,
            capacity,
        }
    }

    /// Write samples into the ring buffer.
    ///
    /// If the buffer overflows, the oldest samples are dropped.
    /// Returns how many samples (old or new) were lost.
    pub fn write(&mut self, samples: &[f32]) -> usize {
        if samples.is_empty() {
            return 0;
        }

        let mut lost = 0;

        // Only the tail fits
        let samples = if samples.len() > self.capacity {
            lost += samples.len() - self.capacity;
            &samples[samples.len() - self.capacity..]
        } else {
            samples
        };

        let overflow = (self.available + samples.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.read_index = (self.read_index + overflow) % self.capacity;
            self.available -= overflow;
            lost += overflow;
        }

        for &sample in samples {
            self.buffer[self.write_index] = sample;
            self.write_index = (self.write_index + 1) % self.capacity;
        }
        self.available += samples.len();
        lost
    }

    /// Read and remove up to `count` samples from the buffer.
    #[cfg(test)]
    pub fn read(&mut self, count: usize) -> Vec<f32> {
        let mut result = vec![0.0; count.min(self.available)];
        self.read_into(&mut result);
        result
    }

    /// Move up to `out.len()` samples into `out` without allocating.
    ///
    /// Returns the number of samples written to the start of `out`.
    pub fn read_into(&mut self, out: &mut [f32]) -> usize {
        let to_read = out.len().min(self.available);
        if to_read == 0 {
            return 0;
        }

        // At most two contiguous runs: up to the end of storage, then from the start.
        let first = to_read.min(self.capacity - self.read_index);
        out[..first].copy_from_slice(&self.buffer[self.read_index..self.read_index + first]);
        let second = to_read - first;
        if second > 0 {
            out[first..to_read].copy_from_slice(&self.buffer[..second]);
        }

        self.read_index = (self.read_index + to_read) % self.capacity;
        self.available -= to_read;
        to_read
    }

    /// Number of samples currently available for reading.
    pub fn count(&self) -> usize {
        self.available
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    /// Discard everything buffered.
    pub fn reset(&mut self) {
        self.write_index = 0;
        self.read_index = 0;
        self.available = 0;
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
