use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Book-related enums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Available,
    Borrowed,
    Reserved,
    Damaged,
}

impl BookStatus {
    /// Human readable label used by the admin screens.
    pub fn label(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Borrowed => "Borrowed",
            BookStatus::Reserved => "Reserved",
            BookStatus::Damaged => "Damaged",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookStatus::Available => write!(f, "available"),
            BookStatus::Borrowed => write!(f, "borrowed"),
            BookStatus::Reserved => write!(f, "reserved"),
            BookStatus::Damaged => write!(f, "damaged"),
        }
    }
}

impl FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            "reserved" => Ok(BookStatus::Reserved),
            "damaged" => Ok(BookStatus::Damaged),
            other => Err(format!("\"{}\" is not a valid book status", other)),
        }
    }
}

// Admin list filters for date columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilterChoice {
    Today,
    #[serde(rename = "past_7_days")]
    Past7Days,
    ThisMonth,
    ThisYear,
    HasDate,
    NoDate,
}

impl fmt::Display for DateFilterChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFilterChoice::Today => write!(f, "today"),
            DateFilterChoice::Past7Days => write!(f, "past_7_days"),
            DateFilterChoice::ThisMonth => write!(f, "this_month"),
            DateFilterChoice::ThisYear => write!(f, "this_year"),
            DateFilterChoice::HasDate => write!(f, "has_date"),
            DateFilterChoice::NoDate => write!(f, "no_date"),
        }
    }
}
