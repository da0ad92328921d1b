/// Hands out sequence numbers for a single account.
///
/// Seeded once from the node's confirmed transaction count and advanced purely
/// locally afterwards. The allocator is owned by the dispatch loop and only
/// mutated through `&mut self`, so it needs no lock.
#[derive(Debug)]
pub struct NonceAllocator {
    next: u64,
}

impl NonceAllocator {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    /// The nonce the next allocation will return.
    pub fn current(&self) -> u64 {
        self.next
    }

    /// Returns the current nonce and advances the counter by one.
    pub fn next(&mut self) -> u64 {
        let nonce = self.next;
        self.next = self.next.saturating_add(1);
        nonce
    }

    /// Passes the current nonce to `build` and only advances the counter if
    /// `build` succeeds. A failed construction leaves no gap.
    pub fn allocate_with<T, E>(
        &mut self,
        build: impl FnOnce(u64) -> Result<T, E>,
    ) -> Result<T, E> {
        let value = build(self.next)?;
        self.next();
        Ok(value)
    }
}
