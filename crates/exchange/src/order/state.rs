/// Order lifecycle as observed through status polling.
///
/// `Unknown` is both the value before the first poll and the value recorded
/// when a status query fails. It never means the order is confirmed live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderState {
    Live,
    PartiallyFilled,
    Filled,
    Canceled,
    Failed,
    #[default]
    Unknown,
}

impl OrderState {
    /// Maps the exchange's `state` field.
    pub fn from_okx(state: &str) -> Self {
        match state {
            "live" => Self::Live,
            "partially_filled" => Self::PartiallyFilled,
            "filled" => Self::Filled,
            "canceled" | "mmp_canceled" => Self::Canceled,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::PartiallyFilled => "partially_filled",
            Self::Filled => "filled",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Filled | Self::PartiallyFilled | Self::Canceled | Self::Failed
        )
    }

    /// Terminal with at least part of the order executed.
    pub const fn has_fill(self) -> bool {
        matches!(self, Self::Filled | Self::PartiallyFilled)
    }

    pub const fn is_terminal_failure(self) -> bool {
        matches!(self, Self::Canceled | Self::Failed)
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
