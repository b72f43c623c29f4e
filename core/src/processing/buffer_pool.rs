use crate::prelude::{ChirpError, ChirpResult};

/// Simple scoped buffer pool that prevents unbounded allocations.
pub struct BufferPool<T> {
    buffers: Vec<Vec<T>>,
    max_capacity: usize,
    outstanding: usize,
}

impl<T: Clone + Default> BufferPool<T> {
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            buffers: Vec::with_capacity(max_capacity),
            max_capacity,
            outstanding: 0,
        }
    }

    /// Hands out a zeroed buffer of `length`, reusing a released one when
    /// available.
    pub fn checkout(&mut self, length: usize) -> ChirpResult<Vec<T>> {
        let buffer = if let Some(mut buffer) = self.buffers.pop() {
            buffer.resize(length, T::default());
            buffer
        } else if self.outstanding < self.max_capacity {
            vec![T::default(); length]
        } else {
            return Err(ChirpError::BufferExhaustion("pool depleted".to_string()));
        };
        self.outstanding += 1;
        Ok(buffer)
    }

    /// Returns a buffer back to the pool for reuse.
    pub fn release(&mut self, mut buffer: Vec<T>) {
        buffer.clear();
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.buffers.len() < self.max_capacity {
            self.buffers.push(buffer);
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}
