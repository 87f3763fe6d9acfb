//! Search query parameters

/// Search-option ids of the `Computer` itemtype
pub mod fields {
    /// Computer name
    pub const NAME: u32 = 1;
    /// Database id
    pub const ID: u32 = 2;
    /// Operating system
    pub const OPERATING_SYSTEM: u32 = 12;
    /// Creation date
    pub const DATE_CREATION: u32 = 15;
}

/// Columns forced into every computer search, in display order
pub const FORCED_DISPLAY: [u32; 4] = [
    fields::ID,
    fields::NAME,
    fields::OPERATING_SYSTEM,
    fields::DATE_CREATION,
];

/// Column the computer search is sorted on
pub const SORT_FIELD: u32 = fields::DATE_CREATION;

/// Direction of the computer search sort
pub const SORT_ORDER: &str = "ASC";

/// Inclusive row window requested with `range=start-end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: u64,
    pub end: u64,
}

impl Range {
    /// Window of `size` rows starting at `start`
    ///
    /// A zero `size` is treated as one row; the end saturates at `u64::MAX`.
    #[must_use]
    pub fn page(start: u64, size: u64) -> Self {
        Self {
            start,
            end: start.saturating_add(size.max(1) - 1),
        }
    }

    /// Query value, e.g. `0-49`
    #[must_use]
    pub fn to_query(self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}
