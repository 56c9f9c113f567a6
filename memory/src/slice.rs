use crate::range::Range;

/// Contiguous block of 16-bit cells covering a fixed address range
#[derive(Debug, Clone)]
pub struct Slice {
    range: Range,
    buffer: Vec<u16>,
}

impl Slice {
    pub fn zeroed(range: Range) -> Self {
        Self {
            buffer: vec![0; range.length()],
            range,
        }
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    pub fn read(&self, range: &Range) -> Option<Vec<u16>> {
        if !self.range.contains(range) {
            return None;
        }
        let offset = range.start - self.range.start;
        Some(self.buffer[offset..offset + range.length()].to_vec())
    }

    /// Copy `values` into the given range. Nothing is written unless the whole range fits.
    pub fn write(&mut self, range: &Range, values: &[u16]) -> bool {
        if range.length() != values.len() || !self.range.contains(range) {
            return false;
        }
        let offset = range.start - self.range.start;
        self.buffer[offset..offset + values.len()].copy_from_slice(values);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Slice;
    use crate::Range;

    #[test]
    fn ut_slice_zeroed() {
        let slice = Slice::zeroed(Range::new(0, 100));
        assert_eq!(slice.read(&Range::new(0, 100)), Some(vec![0; 100]));
    }

    #[test]
    fn ut_slice_write_read() {
        let mut slice = Slice::zeroed(Range::new(0, 40));
        let values: Vec<u16> = (17..34).collect();
        assert!(slice.write(&Range::new(17, 17), &values));

        let read = slice.read(&Range::new(16, 19)).unwrap();
        assert_eq!(read.first(), Some(&0));
        assert_eq!(&read[1..18], values.as_slice());
        assert_eq!(read.last(), Some(&0));
    }

    #[test]
    fn ut_slice_out_of_bounds() {
        let mut slice = Slice::zeroed(Range::new(10, 10));
        assert!(slice.read(&Range::new(5, 10)).is_none());
        assert!(slice.read(&Range::new(15, 10)).is_none());
        assert!(!slice.write(&Range::new(19, 2), &[1, 2]));
        assert_eq!(slice.read(&Range::new(19, 1)), Some(vec![0]));
    }

    #[test]
    fn ut_slice_length_mismatch() {
        let mut slice = Slice::zeroed(Range::new(0, 10));
        assert!(!slice.write(&Range::new(0, 3), &[1, 2]));
        assert_eq!(slice.read(&Range::new(0, 3)), Some(vec![0, 0, 0]));
    }
}
