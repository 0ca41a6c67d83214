//! Marketplace user model.
//!
//! A user is identified by the pair `(username, type)`: the same username may
//! be registered once per role. Each role carries its own profile fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum accepted username length in characters.
pub const USERNAME_MAX: usize = 64;

/// Validation errors raised while building user values.
///
/// Every variant names the offending input field so adapters can report it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// A required field was missing or blank.
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },
    /// Username exceeds [`USERNAME_MAX`].
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    /// Username contains whitespace or control characters.
    #[error("username must not contain whitespace")]
    UsernameInvalidCharacters,
    /// Role string did not name a known user type.
    #[error("unknown user type: {value}")]
    UnknownUserType { value: String },
    /// Aadhaar numbers are exactly twelve digits.
    #[error("aadhaar must be exactly 12 digits")]
    InvalidAadhaar,
    /// Email address lacks the `local@domain` shape.
    #[error("email must look like name@domain")]
    InvalidEmail,
}

impl UserValidationError {
    /// Input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } => field,
            Self::UsernameTooLong { .. } | Self::UsernameInvalidCharacters => "username",
            Self::UnknownUserType { .. } => "type",
            Self::InvalidAadhaar => "aadhaar",
            Self::InvalidEmail => "email",
        }
    }
}

fn required(field: &'static str, value: &str) -> Result<String, UserValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::MissingField { field });
    }
    Ok(trimmed.to_owned())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Login name of a marketplace user.
///
/// ## Invariants
/// - Trimmed, non-empty and at most [`USERNAME_MAX`] characters.
/// - Contains no whitespace.
///
/// # Examples
/// ```
/// use ecoswap::domain::Username;
///
/// let name = Username::new("  alice ").unwrap();
/// assert_eq!(name.as_ref(), "alice");
/// assert!(Username::new("a b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let value = required("username", value.as_ref())?;
        if value.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Marketplace role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Households and shops generating reusable waste.
    Customer,
    /// Collectors picking up scrap for recycling.
    ScrapCollector,
    /// Businesses sourcing raw materials.
    Business,
}

impl UserType {
    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::ScrapCollector => "scrap_collector",
            Self::Business => "business",
        }
    }

    /// Whether users of this role may claim listings.
    pub fn can_claim(self) -> bool {
        matches!(self, Self::ScrapCollector | Self::Business)
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "scrap_collector" | "scrap-collector" | "scrapcollector" => Ok(Self::ScrapCollector),
            "business" => Ok(Self::Business),
            _ => Err(UserValidationError::UnknownUserType {
                value: s.to_owned(),
            }),
        }
    }
}

/// Twelve-digit national identity number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Aadhaar(String);

impl Aadhaar {
    /// Validate a twelve-digit number, ignoring embedded spaces.
    pub fn new(value: &str) -> Result<Self, UserValidationError> {
        let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(UserValidationError::InvalidAadhaar);
        }
        Ok(Self(digits))
    }
}

impl AsRef<str> for Aadhaar {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Aadhaar> for String {
    fn from(value: Aadhaar) -> Self {
        value.0
    }
}

impl TryFrom<String> for Aadhaar {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// Validate an optional email address.
pub fn parse_email(value: Option<&str>) -> Result<Option<String>, UserValidationError> {
    let Some(email) = optional(value) else {
        return Ok(None);
    };
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(Some(email)),
        _ => Err(UserValidationError::InvalidEmail),
    }
}

fn parse_aadhaar(value: Option<&str>) -> Result<Option<Aadhaar>, UserValidationError> {
    optional(value).map(|raw| Aadhaar::new(&raw)).transpose()
}

/// Split a comma separated list of raw materials into trimmed entries.
///
/// # Examples
/// ```
/// use ecoswap::domain::user::parse_raw_materials;
///
/// assert_eq!(parse_raw_materials(" Plastic, ,metal "), vec!["Plastic", "metal"]);
/// ```
pub fn parse_raw_materials(value: &str) -> Vec<String> {
    let mut materials: Vec<String> = Vec::new();
    for entry in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !materials.iter().any(|m| m.eq_ignore_ascii_case(entry)) {
            materials.push(entry.to_owned());
        }
    }
    materials
}

/// Raw, unvalidated role fields supplied at signup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleProfileInput {
    pub address: Option<String>,
    pub aadhaar: Option<String>,
    pub full_name: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub scrap_type: Option<String>,
    pub vehicle: Option<String>,
    pub business_name: Option<String>,
    pub registration_number: Option<String>,
    pub gst_number: Option<String>,
    pub business_address: Option<String>,
    pub business_type: Option<String>,
    pub raw_materials: Option<String>,
    pub rep_name: Option<String>,
    pub rep_role: Option<String>,
    pub rep_phone: Option<String>,
}

/// Role specific profile data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoleProfile {
    #[serde(rename_all = "camelCase")]
    Customer {
        address: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aadhaar: Option<Aadhaar>,
    },
    #[serde(rename_all = "camelCase")]
    ScrapCollector {
        full_name: String,
        address: String,
        city: String,
        pincode: String,
        scrap_type: String,
        vehicle: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aadhaar: Option<Aadhaar>,
    },
    #[serde(rename_all = "camelCase")]
    Business {
        business_name: String,
        raw_materials: Vec<String>,
        #[serde(default)]
        registration_number: Option<String>,
        #[serde(default)]
        gst_number: Option<String>,
        #[serde(default)]
        business_address: Option<String>,
        #[serde(default)]
        business_type: Option<String>,
        #[serde(default)]
        rep_name: Option<String>,
        #[serde(default)]
        rep_role: Option<String>,
        #[serde(default)]
        rep_phone: Option<String>,
    },
}

impl RoleProfile {
    /// Validate raw signup fields for the given role.
    pub fn try_from_input(
        user_type: UserType,
        input: &RoleProfileInput,
    ) -> Result<Self, UserValidationError> {
        let field = |name: &'static str, value: &Option<String>| {
            required(name, value.as_deref().unwrap_or_default())
        };
        match user_type {
            UserType::Customer => Ok(Self::Customer {
                address: field("address", &input.address)?,
                aadhaar: parse_aadhaar(input.aadhaar.as_deref())?,
            }),
            UserType::ScrapCollector => Ok(Self::ScrapCollector {
                full_name: field("fullName", &input.full_name)?,
                address: field("address", &input.address)?,
                city: field("city", &input.city)?,
                pincode: field("pincode", &input.pincode)?,
                scrap_type: field("scrapType", &input.scrap_type)?,
                vehicle: field("vehicle", &input.vehicle)?,
                aadhaar: parse_aadhaar(input.aadhaar.as_deref())?,
            }),
            UserType::Business => {
                let business_name = field("businessName", &input.business_name)?;
                let raw_materials =
                    parse_raw_materials(input.raw_materials.as_deref().unwrap_or_default());
                if raw_materials.is_empty() {
                    return Err(UserValidationError::MissingField {
                        field: "rawMaterials",
                    });
                }
                Ok(Self::Business {
                    business_name,
                    raw_materials,
                    registration_number: optional(input.registration_number.as_deref()),
                    gst_number: optional(input.gst_number.as_deref()),
                    business_address: optional(input.business_address.as_deref()),
                    business_type: optional(input.business_type.as_deref()),
                    rep_name: optional(input.rep_name.as_deref()),
                    rep_role: optional(input.rep_role.as_deref()),
                    rep_phone: optional(input.rep_phone.as_deref()),
                })
            }
        }
    }

    /// Role this profile belongs to.
    pub fn user_type(&self) -> UserType {
        match self {
            Self::Customer { .. } => UserType::Customer,
            Self::ScrapCollector { .. } => UserType::ScrapCollector,
            Self::Business { .. } => UserType::Business,
        }
    }

    /// Raw materials a business sources; empty for other roles.
    pub fn raw_materials(&self) -> &[String] {
        match self {
            Self::Business { raw_materials, .. } => raw_materials,
            _ => &[],
        }
    }
}

/// Public view of a marketplace user.
///
/// ## Invariants
/// - `phone` is non-empty once trimmed.
/// - The role is carried by `profile`, so type and profile fields never
///   disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    username: Username,
    phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(flatten)]
    profile: RoleProfile,
    created_at: DateTime<Utc>,
}

impl User {
    /// Build a user from validated components.
    pub fn try_new(
        username: Username,
        phone: &str,
        email: Option<&str>,
        profile: RoleProfile,
        created_at: DateTime<Utc>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            username,
            phone: required("phone", phone)?,
            email: parse_email(email)?,
            profile,
            created_at,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn user_type(&self) -> UserType {
        self.profile.user_type()
    }

    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn profile(&self) -> &RoleProfile {
        &self.profile
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// PHC formatted password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a stored PHC string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Stored account: the public user plus credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: PasswordHash,
}

#[cfg(test)]
mod tests;
