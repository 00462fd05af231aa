/// Nesting counter that gates render passes.
///
/// Only the `end` that brings the depth back to zero reports a flush.
#[derive(Debug, Default)]
pub(crate) struct BatchCounter {
    depth: usize,
}

impl BatchCounter {
    pub fn begin(&mut self) {
        self.depth += 1;
    }

    /// Returns true when this call closed the outermost batch.
    pub fn end(&mut self) -> bool {
        if self.depth == 0 {
            log::warn!("batch end without a matching begin");
            return false;
        }
        self.depth -= 1;
        self.depth == 0
    }

    pub fn is_batching(&self) -> bool {
        self.depth > 0
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}
