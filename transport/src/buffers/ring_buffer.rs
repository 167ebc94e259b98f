use std::cmp::min;

/// A fixed-capacity circular byte buffer, the backing store of the in-process channel. One
///  reader and one writer advance independent cursors; the writer never overtakes the reader.
///
/// Capacity checks are the caller's responsibility ([`free`](RingBuffer::free) /
///  [`distance`](RingBuffer::distance)) - violating them is a programming error and panics.
pub struct RingBuffer {
    buf: Vec<u8>,
    read_pos: usize,
    len: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> RingBuffer {
        assert!(capacity > 0);
        RingBuffer {
            buf: vec![0; capacity],
            read_pos: 0,
            len: 0,
        }
    }

    /// number of buffered bytes between the read and write cursors
    pub fn distance(&self) -> usize {
        self.len
    }

    pub fn free(&self) -> usize {
        self.buf.len() - self.len
    }

    pub fn write(&mut self, data: &[u8]) {
        assert!(data.len() <= self.free());

        let write_pos = (self.read_pos + self.len) % self.buf.len();
        let first = min(data.len(), self.buf.len() - write_pos);
        self.buf[write_pos..write_pos + first].copy_from_slice(&data[..first]);
        self.buf[..data.len() - first].copy_from_slice(&data[first..]);
        self.len += data.len();
    }

    pub fn read(&mut self, out: &mut [u8]) {
        assert!(out.len() <= self.len);

        let first = min(out.len(), self.buf.len() - self.read_pos);
        let second = out.len() - first;
        out[..first].copy_from_slice(&self.buf[self.read_pos..self.read_pos + first]);
        out[first..].copy_from_slice(&self.buf[..second]);
        self.advance(out.len());
    }

    /// advance the read cursor without copying, discarding buffered bytes
    pub fn skip(&mut self, amount: usize) {
        assert!(amount <= self.len);
        self.advance(amount);
    }

    fn advance(&mut self, amount: usize) {
        self.read_pos = (self.read_pos + amount) % self.buf.len();
        self.len -= amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_write_then_read() {
        let mut ring = RingBuffer::new(8);
        assert_eq!(ring.distance(), 0);
        assert_eq!(ring.free(), 8);

        ring.write(&[1, 2, 3]);
        assert_eq!(ring.distance(), 3);
        assert_eq!(ring.free(), 5);

        let mut out = [0u8; 3];
        ring.read(&mut out);
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(ring.distance(), 0);
    }

    #[rstest]
    #[case::exact_boundary(5, vec![4, 5, 6])]
    #[case::straddling(6, vec![7, 8, 9])]
    #[case::full_lap(3, vec![1, 2, 3, 4, 5, 6, 7])]
    fn test_wraparound(#[case] initial_fill: usize, #[case] data: Vec<u8>) {
        let mut ring = RingBuffer::new(8);

        // move the cursors towards the end of the backing buffer first
        let filler = vec![0xee; initial_fill];
        ring.write(&filler);
        let mut sink = vec![0u8; initial_fill];
        ring.read(&mut sink);

        ring.write(&data);
        assert_eq!(ring.distance(), data.len());

        let mut out = vec![0u8; data.len()];
        ring.read(&mut out);
        assert_eq!(out, data);
    }

    #[test]
    fn test_skip() {
        let mut ring = RingBuffer::new(8);
        ring.write(&[1, 2, 3, 4, 5]);

        ring.skip(3);
        assert_eq!(ring.distance(), 2);

        let mut out = [0u8; 2];
        ring.read(&mut out);
        assert_eq!(out, [4, 5]);
    }

    #[test]
    #[should_panic]
    fn test_overfull_write_panics() {
        let mut ring = RingBuffer::new(4);
        ring.write(&[1, 2, 3, 4, 5]);
    }

    #[test]
    #[should_panic]
    fn test_overlong_read_panics() {
        let mut ring = RingBuffer::new(4);
        ring.write(&[1, 2]);
        let mut out = [0u8; 3];
        ring.read(&mut out);
    }
}
