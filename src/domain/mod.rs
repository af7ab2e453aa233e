use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    EmptyField { field: &'static str },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "{field} must not be empty"),
        }
    }
}

impl std::error::Error for DomainError {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Tenant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Tenant => "tenant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub requests: Vec<Application>,
}

/// A tenant's request to rent a property. Status transitions are owned by the
/// backend: `pending` until the owner accepts or rejects, never deleted here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub property: Option<PropertyRef>,
    #[serde(default)]
    pub tenant: Option<TenantRef>,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRef {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TenantRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of the add-property form. `price` is forwarded as entered; the
/// backend owns any numeric interpretation.
#[derive(Debug, Clone, Default)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub address: String,
    pub price: String,
}

pub fn validate_new_property(fields: &NewProperty) -> Result<(), DomainError> {
    for (field, value) in [
        ("title", &fields.title),
        ("description", &fields.description),
        ("address", &fields.address),
        ("price", &fields.price),
    ] {
        if value.is_empty() {
            return Err(DomainError::EmptyField { field });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

pub fn validate_contact(form: &ContactForm) -> Result<(), DomainError> {
    if form.name.is_empty() {
        return Err(DomainError::EmptyField { field: "name" });
    }
    if form.email.is_empty() {
        return Err(DomainError::EmptyField { field: "email" });
    }
    if form.message.trim().is_empty() {
        return Err(DomainError::EmptyField { field: "message" });
    }
    Ok(())
}
