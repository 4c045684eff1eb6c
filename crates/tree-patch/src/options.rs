/// Knobs for [`parse_with`](crate::parse_with) and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject `add`, `replace` and `test` without a value, and `move` and
    /// `copy` without `from`. Off by default: only the shape is checked.
    pub require_operands: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            require_operands: false,
        }
    }
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            require_operands: true,
        }
    }
}
