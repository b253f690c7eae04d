// ── Vendor domain types ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Vendor priority, lowest first.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Active/inactive flag as a filterable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum VendorStatus {
    Active,
    Inactive,
}

impl From<bool> for VendorStatus {
    fn from(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}

/// A vendor directory entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub company: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub is_active: bool,
    pub category: Option<String>,
    pub date_published: Option<NaiveDate>,
}

impl Vendor {
    pub fn status(&self) -> VendorStatus {
        VendorStatus::from(self.is_active)
    }

    /// Every field rendered as text, in column order. Used by free-text
    /// search, which matches against any field.
    pub fn field_texts(&self) -> Vec<String> {
        let mut fields = vec![
            self.id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.location.clone(),
        ];
        fields.extend(
            [&self.company, &self.website, &self.notes, &self.category]
                .into_iter()
                .flatten()
                .cloned(),
        );
        if let Some(p) = self.priority {
            fields.push(p.to_string());
        }
        fields.push(self.is_active.to_string());
        if let Some(d) = self.date_published {
            fields.push(d.to_string());
        }
        fields
    }
}
