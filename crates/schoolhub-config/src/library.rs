use crate::{env_var, parse_or};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryConfig {
    pub loan_days: i64,
    pub fine_per_day_cents: i64,
    pub default_max_books: i32,
    pub card_validity_years: i32,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            loan_days: 14,
            fine_per_day_cents: 500,
            default_max_books: 5,
            card_validity_years: 1,
        }
    }
}

impl LibraryConfig {
    pub fn from_env() -> Self {
        Self::from_source(env_var)
    }

    /// Non-positive values are ignored in favour of the defaults.
    pub fn from_source<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Self {
            loan_days: positive_or(
                parse_or(&lookup, "LIBRARY_LOAN_DAYS", d.loan_days),
                d.loan_days,
            ),
            fine_per_day_cents: parse_or(
                &lookup,
                "LIBRARY_FINE_PER_DAY_CENTS",
                d.fine_per_day_cents,
            )
            .max(0),
            default_max_books: positive_or(
                parse_or(&lookup, "LIBRARY_DEFAULT_MAX_BOOKS", d.default_max_books),
                d.default_max_books,
            ),
            card_validity_years: positive_or(
                parse_or(&lookup, "LIBRARY_CARD_VALIDITY_YEARS", d.card_validity_years),
                d.card_validity_years,
            ),
        }
    }
}

fn positive_or<T: PartialOrd + Default>(value: T, default: T) -> T {
    if value > T::default() { value } else { default }
}
