//! Offset/limit windows over query results

/// Rows to skip and an optional cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationWindow {
    pub offset: u64,
    /// `None` means no cap
    pub limit: Option<u64>,
}

impl PaginationWindow {
    pub fn new(offset: u64, limit: Option<u64>) -> Self {
        Self { offset, limit }
    }

    /// The whole result set.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A zero limit can never yield rows.
    pub fn is_empty(&self) -> bool {
        self.limit == Some(0)
    }

    /// Apply the window to rows already in memory, keeping their order.
    ///
    /// An offset past the end yields an empty vector.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = self
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }
}
