use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(alias = "Tốt", alias = "good")]
    Good,
    #[serde(alias = "Bình thường", alias = "normal")]
    Normal,
    #[serde(alias = "Yếu", alias = "weak")]
    Weak,
}

impl HealthStatus {
    pub const ALL: [Self; 3] = [Self::Good, Self::Normal, Self::Weak];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Normal => "Normal",
            Self::Weak => "Weak",
        }
    }

    /// Label the remote backend validates against.
    #[must_use]
    pub const fn backend_label(&self) -> &'static str {
        match self {
            Self::Good => "Tốt",
            Self::Normal => "Bình thường",
            Self::Weak => "Yếu",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "good" | "tốt" => Ok(Self::Good),
            "normal" | "bình thường" => Ok(Self::Normal),
            "weak" | "yếu" => Ok(Self::Weak),
            other => Err(format!(
                "Unknown health status '{other}'. Expected one of: Good, Normal, Weak"
            )),
        }
    }
}

/// One physical hive in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beehive {
    pub serial_number: String,

    pub qr_token: String,

    pub import_date: NaiveDate,

    #[serde(default)]
    pub split_date: Option<NaiveDate>,

    pub health_status: HealthStatus,

    /// Set by the remote backend; local hives leave it empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub is_sold: bool,

    /// Present iff `is_sold`.
    #[serde(default)]
    pub sold_date: Option<NaiveDate>,

    #[serde(deserialize_with = "super::string_or_number")]
    pub user_id: String,

    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub created_at: String,

    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub updated_at: String,
}

impl Beehive {
    #[must_use]
    pub fn sold_state_consistent(&self) -> bool {
        self.is_sold == self.sold_date.is_some()
    }

    pub fn mark_sold(&mut self, on: NaiveDate) {
        self.is_sold = true;
        self.sold_date = Some(on);
    }

    pub fn mark_unsold(&mut self) {
        self.is_sold = false;
        self.sold_date = None;
    }
}

/// Creation input. Identifiers, owner and timestamps are assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBeehive {
    pub import_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_date: Option<NaiveDate>,

    pub health_status: HealthStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update. Fields left as `None` keep their previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeehivePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_date: Option<NaiveDate>,

    /// `Some(None)` clears the split date.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::double_option"
    )]
    pub split_date: Option<Option<NaiveDate>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sold: Option<bool>,

    /// Only honoured when the hive ends up sold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_date: Option<NaiveDate>,
}

impl BeehivePatch {
    #[must_use]
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the patch into `hive`, keeping `sold_date` set iff `is_sold`.
    /// `today` is used when a hive becomes sold without an explicit date.
    pub fn apply(&self, hive: &mut Beehive, today: NaiveDate) {
        if let Some(date) = self.import_date {
            hive.import_date = date;
        }
        if let Some(split) = self.split_date {
            hive.split_date = split;
        }
        if let Some(status) = self.health_status {
            hive.health_status = status;
        }
        if let Some(notes) = &self.notes {
            hive.notes = if notes.is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }

        match self.is_sold {
            Some(true) => {
                let date = self.sold_date.or(hive.sold_date).unwrap_or(today);
                hive.mark_sold(date);
            }
            Some(false) => hive.mark_unsold(),
            None => {
                if hive.is_sold {
                    if let Some(date) = self.sold_date {
                        hive.sold_date = Some(date);
                    }
                }
            }
        }
    }
}
