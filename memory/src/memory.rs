use crate::range::Range;
use crate::slice::Slice;

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("No memory area registered for {0}")]
    UnknownArea(String),
    #[error("Range {range} not available in memory area {area} {bounds}")]
    OutOfRange {
        area: String,
        range: Range,
        bounds: Range,
    },
    #[error("Range {range} too large/small for {count} values")]
    LengthMismatch { range: Range, count: usize },
}

/// Set of independent memory areas, each backed by a single fixed-size slice
#[derive(Debug)]
pub struct Memory<K>
where
    K: Hash + Eq + Clone + Debug,
{
    slices: HashMap<K, Slice>,
}

impl<K> Default for Memory<K>
where
    K: Hash + Eq + Clone + Debug,
{
    fn default() -> Self {
        Self {
            slices: HashMap::new(),
        }
    }
}

impl<K> Memory<K>
where
    K: Hash + Eq + Clone + Debug,
{
    /// Register a zeroed area for `id`. Returns false if the area already exists.
    pub fn add_area(&mut self, id: K, range: Range) -> bool {
        match self.slices.entry(id) {
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(Slice::zeroed(range));
                true
            }
            std::collections::hash_map::Entry::Occupied(_) => false,
        }
    }

    pub fn read(&self, id: &K, range: &Range) -> Result<Vec<u16>, Error> {
        let slice = self
            .slices
            .get(id)
            .ok_or_else(|| Error::UnknownArea(format!("{id:?}")))?;
        slice.read(range).ok_or_else(|| Error::OutOfRange {
            area: format!("{id:?}"),
            range: *range,
            bounds: *slice.range(),
        })
    }

    pub fn write(&mut self, id: &K, range: &Range, values: &[u16]) -> Result<(), Error> {
        if range.length() != values.len() {
            return Err(Error::LengthMismatch {
                range: *range,
                count: values.len(),
            });
        }
        let slice = self
            .slices
            .get_mut(id)
            .ok_or_else(|| Error::UnknownArea(format!("{id:?}")))?;
        let bounds = *slice.range();
        if slice.write(range, values) {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                area: format!("{id:?}"),
                range: *range,
                bounds,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, Memory, Range};

    #[test]
    fn ut_memory_add_area() {
        let mut memory = Memory::<u8>::default();
        assert!(memory.add_area(1, Range::new(0, 100)));
        assert!(!memory.add_area(1, Range::new(0, 10)));
        assert_eq!(memory.read(&1, &Range::new(90, 10)).unwrap(), vec![0; 10]);
        assert!(matches!(
            memory.read(&2, &Range::new(0, 1)),
            Err(Error::UnknownArea(_))
        ));
    }

    #[test]
    fn ut_memory_areas_are_independent() {
        let mut memory = Memory::<u8>::default();
        memory.add_area(1, Range::new(0, 10));
        memory.add_area(2, Range::new(0, 10));

        memory.write(&1, &Range::new(0, 3), &[7, 8, 9]).unwrap();
        assert_eq!(memory.read(&1, &Range::new(0, 3)).unwrap(), vec![7, 8, 9]);
        assert_eq!(memory.read(&2, &Range::new(0, 3)).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn ut_memory_default_without_default_key() {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        enum Area {
            Inputs,
        }

        let mut memory = Memory::<Area>::default();
        assert!(memory.add_area(Area::Inputs, Range::new(0, 4)));
        memory.write(&Area::Inputs, &Range::new(1, 2), &[3, 4]).unwrap();
        assert_eq!(
            memory.read(&Area::Inputs, &Range::new(0, 4)).unwrap(),
            vec![0, 3, 4, 0]
        );
    }

    #[test]
    fn ut_memory_errors() {
        let mut memory = Memory::<u8>::default();
        memory.add_area(1, Range::new(0, 10));

        assert!(matches!(
            memory.read(&3, &Range::new(0, 1)),
            Err(Error::UnknownArea(_))
        ));
        assert!(matches!(
            memory.read(&1, &Range::new(5, 10)),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            memory.write(&1, &Range::new(0, 2), &[1]),
            Err(Error::LengthMismatch { count: 1, .. })
        ));
        assert!(matches!(
            memory.write(&1, &Range::new(9, 2), &[1, 2]),
            Err(Error::OutOfRange { .. })
        ));
        assert_eq!(memory.read(&1, &Range::new(9, 1)).unwrap(), vec![0]);
    }
}
