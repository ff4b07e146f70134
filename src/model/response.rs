//! Survey responses: a header per submission plus its requested items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who filled in the survey. Decides the category of every listed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A resident asking for products. Older clients send `customer`.
    #[serde(alias = "customer")]
    Respondent,
    /// A field agent asking for services
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Respondent => "respondent",
            Role::Agent => "agent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "respondent" | "customer" => Ok(Role::Respondent),
            "agent" => Ok(Role::Agent),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Kind of demand a line item expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Product,
    Service,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Product => "product",
            Category::Service => "service",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Category::Product),
            "service" => Ok(Category::Service),
            other => Err(format!("unknown item category '{other}'")),
        }
    }
}

/// Category every item of a submission gets, fixed by the submitter's role.
pub fn category_for(role: Role) -> Category {
    match role {
        Role::Respondent => Category::Product,
        Role::Agent => Category::Service,
    }
}

/// Stored response header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub id: String,
    pub name: String,
    pub mobile: String,
    /// Panchayath name, matched by string equality against locations
    pub location: String,
    pub ward: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Header fields written by the submission form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResponseHeader {
    pub name: String,
    pub mobile: String,
    pub location: String,
    pub ward: String,
    pub role: Role,
}

/// Stored line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseLineItem {
    pub id: String,
    pub header_id: String,
    pub label: String,
    pub category: Category,
}

/// Line item fields written after the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub header_id: String,
    pub label: String,
    pub category: Category,
}

impl NewLineItem {
    /// One item per label, all categorised from the header's role.
    pub fn for_header(header: &ResponseHeader, labels: &[String]) -> Vec<NewLineItem> {
        let category = category_for(header.role);
        labels
            .iter()
            .map(|label| NewLineItem {
                header_id: header.id.clone(),
                label: label.clone(),
                category,
            })
            .collect()
    }
}

/// Label-and-category projection of a line item, as read for aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLabel {
    pub label: String,
    pub category: Category,
}

impl From<&ResponseLineItem> for ItemLabel {
    fn from(item: &ResponseLineItem) -> Self {
        Self {
            label: item.label.clone(),
            category: item.category,
        }
    }
}
