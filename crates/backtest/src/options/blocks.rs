//! Stepping helpers shared by the option strategies.

/// Index of the bar whose close settles an option written at `index`.
///
/// Falls back to `index` itself when the holding period runs past the end
/// of the series.
#[must_use]
pub const fn expiry_index(index: usize, holding_period: usize, len: usize) -> usize {
    match index.checked_add(holding_period) {
        Some(expiry) if expiry < len => expiry,
        _ => index,
    }
}

/// A run of bars traded as one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// First bar; the option is written at this close.
    pub start: usize,
    /// One past the last bar recorded with this block's cash.
    pub end: usize,
    /// Bar whose close settles the option.
    pub expiry: usize,
}

impl Block {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Iterates consecutive blocks of `holding_period` bars over a series of
/// `len` bars. The trailing block is truncated to the series length.
#[derive(Debug, Clone)]
pub struct BlockIter {
    next: usize,
    len: usize,
    holding_period: usize,
}

impl BlockIter {
    /// `holding_period` must be > 0; the options configs validate this before
    /// a simulation starts.
    #[must_use]
    pub fn new(len: usize, holding_period: usize) -> Self {
        debug_assert!(holding_period > 0);
        Self {
            next: 0,
            len,
            holding_period: holding_period.max(1),
        }
    }
}

impl Iterator for BlockIter {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if self.next >= self.len {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.holding_period).min(self.len);
        self.next = end;
        Some(Block {
            start,
            end,
            expiry: expiry_index(start, self.holding_period, self.len),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len.saturating_sub(self.next).div_ceil(self.holding_period);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BlockIter {}
