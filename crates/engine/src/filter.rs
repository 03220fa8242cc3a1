use std::{fmt, str::FromStr};

use crate::EngineError;

const ALL_LABEL: &str = "All";

/// A criterion on one enum dimension.
///
/// `All` imposes no constraint; `Exactly(v)` admits only `v`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Filter<T> {
    All,
    Exactly(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T> Filter<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// `true` for `All`, otherwise the result of `pred` on the wanted value.
    pub fn matches(&self, pred: impl FnOnce(&T) -> bool) -> bool {
        match self {
            Self::All => true,
            Self::Exactly(value) => pred(value),
        }
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn admits(&self, candidate: &T) -> bool {
        self.matches(|wanted| wanted == candidate)
    }
}

impl<T> From<Option<T>> for Filter<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::All, Self::Exactly)
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_LABEL),
            Self::Exactly(value) => value.fmt(f),
        }
    }
}

/// `"All"` (any case) parses to [`Filter::All`]; anything else goes through `T`.
impl<T: FromStr> FromStr for Filter<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_LABEL) {
            return Ok(Self::All);
        }
        s.trim().parse().map(Self::Exactly)
    }
}

/// Forward-looking window, in calendar months from now, in which a
/// subscription must renew to be shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenewalWindow {
    #[default]
    Any,
    WithinMonths(u32),
}

impl RenewalWindow {
    /// Labels offered by the renewal drop-down.
    pub const LABELS: [(&'static str, RenewalWindow); 5] = [
        ("This Month", Self::WithinMonths(1)),
        ("Within 3 Months", Self::WithinMonths(3)),
        ("Within 6 Months", Self::WithinMonths(6)),
        ("This Year", Self::WithinMonths(12)),
        (ALL_LABEL, Self::Any),
    ];

    /// Build from a signed month offset; negative offsets (historically `-1`) mean `Any`.
    pub fn from_offset(offset: i32) -> Self {
        u32::try_from(offset).map_or(Self::Any, Self::WithinMonths)
    }

    pub fn from_label(label: &str) -> Result<Self, EngineError> {
        let label = label.trim();
        Self::LABELS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, window)| *window)
            .ok_or_else(|| EngineError::UnknownRenewalWindow(label.to_string()))
    }

    pub fn months(self) -> Option<u32> {
        match self {
            Self::Any => None,
            Self::WithinMonths(months) => Some(months),
        }
    }
}

/// Accepts a drop-down label or a bare month count (`"2"`, `"-1"`).
impl FromStr for RenewalWindow {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(offset) = s.trim().parse::<i32>() {
            return Ok(Self::from_offset(offset));
        }
        Self::from_label(s)
    }
}

impl fmt::Display for RenewalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(ALL_LABEL),
            Self::WithinMonths(1) => f.write_str("within 1 month"),
            Self::WithinMonths(months) => write!(f, "within {months} months"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::receipt::Category;

    #[test]
    fn all_is_case_insensitive() {
        assert_eq!("all".parse::<Filter<Category>>(), Ok(Filter::All));
        assert_eq!(" All ".parse::<Filter<Category>>(), Ok(Filter::All));
        assert_eq!(
            "Food".parse::<Filter<Category>>(),
            Ok(Filter::Exactly(Category::Food))
        );
    }

    #[test]
    fn all_admits_everything() {
        let any: Filter<Category> = Filter::All;
        assert!(any.admits(&Category::Beauty));
        let food = Filter::Exactly(Category::Food);
        assert!(food.admits(&Category::Food));
        assert!(!food.admits(&Category::Beauty));
    }

    #[test]
    fn negative_offsets_mean_any_window() {
        assert_eq!(RenewalWindow::from_offset(-1), RenewalWindow::Any);
        assert_eq!(RenewalWindow::from_offset(-12), RenewalWindow::Any);
        assert_eq!(RenewalWindow::from_offset(3), RenewalWindow::WithinMonths(3));
    }

    #[test]
    fn renewal_labels_round_trip_through_from_str() {
        assert_eq!(
            "Within 6 Months".parse::<RenewalWindow>(),
            Ok(RenewalWindow::WithinMonths(6))
        );
        assert_eq!("this year".parse::<RenewalWindow>(), Ok(RenewalWindow::WithinMonths(12)));
        assert_eq!("-1".parse::<RenewalWindow>(), Ok(RenewalWindow::Any));
        assert_eq!(
            "Next Decade".parse::<RenewalWindow>(),
            Err(EngineError::UnknownRenewalWindow("Next Decade".to_string()))
        );
    }
}
