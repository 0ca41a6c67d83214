//! Authentication primitives: login credentials, registrations and the
//! identity carried by bearer tokens.
//!
//! Inbound payload parsing stays outside the domain; handlers hand raw strings
//! to these constructors before talking to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{RoleProfile, RoleProfileInput, UserType, UserValidationError, Username};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
    /// Role string did not name a known user type.
    UnknownUserType(String),
}

impl LoginValidationError {
    /// Input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
            Self::UnknownUserType(_) => "type",
        }
    }
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::UnknownUserType(value) => write!(f, "unknown user type: {value}"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use ecoswap::domain::{LoginCredentials, UserType};
///
/// let creds = LoginCredentials::try_from_parts("alice", "secret", "business").unwrap();
/// assert_eq!(creds.username(), "alice");
/// assert_eq!(creds.user_type(), UserType::Business);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
    user_type: UserType,
}

impl LoginCredentials {
    /// Construct credentials from raw username, password and role inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        user_type: &str,
    ) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        let user_type = user_type
            .parse::<UserType>()
            .map_err(|_| LoginValidationError::UnknownUserType(user_type.to_owned()))?;

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
            user_type,
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Role the caller is logging in as.
    pub fn user_type(&self) -> UserType {
        self.user_type
    }
}

/// Validation failures for signup requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error(transparent)]
    User(#[from] UserValidationError),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("passwords do not match")]
    PasswordMismatch,
}

impl RegistrationValidationError {
    /// Input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::User(err) => err.field(),
            Self::PasswordTooShort { .. } => "password",
            Self::PasswordMismatch => "confirm_password",
        }
    }
}

/// Raw signup inputs as received from a client.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub user_type: String,
    pub username: String,
    pub password: Zeroizing<String>,
    pub confirm_password: Zeroizing<String>,
    pub phone: String,
    pub email: Option<String>,
    pub profile: RoleProfileInput,
}

/// Validated signup request.
///
/// ## Invariants
/// - `password` is at least [`PASSWORD_MIN`] characters and matched its
///   confirmation.
/// - `profile` satisfies the required fields of its role.
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
    phone: String,
    email: Option<String>,
    profile: RoleProfile,
}

impl Registration {
    /// Validate raw signup inputs.
    pub fn try_from_input(input: RegistrationInput) -> Result<Self, RegistrationValidationError> {
        let user_type = input.user_type.parse::<UserType>()?;
        let username = Username::new(&input.username)?;
        if input.password.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if input.password.as_str() != input.confirm_password.as_str() {
            return Err(RegistrationValidationError::PasswordMismatch);
        }
        let phone = input.phone.trim();
        if phone.is_empty() {
            return Err(UserValidationError::MissingField { field: "phone" }.into());
        }
        let email = super::user::parse_email(input.email.as_deref())?;
        let profile = RoleProfile::try_from_input(user_type, &input.profile)?;

        Ok(Self {
            username,
            password: input.password,
            phone: phone.to_owned(),
            email,
            profile,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn user_type(&self) -> UserType {
        self.profile.user_type()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
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
}

/// Authenticated caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: Username,
    pub user_type: UserType,
}

/// Signed bearer token handed to clients after login.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

impl From<AccessToken> for String {
    fn from(value: AccessToken) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    //! Credential and registration input validation.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn customer_input() -> RegistrationInput {
        RegistrationInput {
            user_type: "customer".into(),
            username: " alice ".into(),
            password: Zeroizing::new("secret1".into()),
            confirm_password: Zeroizing::new("secret1".into()),
            phone: "9876543210".into(),
            email: None,
            profile: RoleProfileInput {
                address: Some("1 Main St".into()),
                ..RoleProfileInput::default()
            },
        }
    }

    #[rstest]
    #[case("", "pw", "customer", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", "customer", LoginValidationError::EmptyUsername)]
    #[case("user", "", "customer", LoginValidationError::EmptyPassword)]
    #[case("user", "pw", "admin", LoginValidationError::UnknownUserType("admin".into()))]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] user_type: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password, user_type)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  alice  ", "secret", "customer")]
    #[case("bob", "correct horse battery staple", "scrap_collector")]
    fn valid_credentials_trim_username(
        #[case] username: &str,
        #[case] password: &str,
        #[case] user_type: &str,
    ) {
        let creds = LoginCredentials::try_from_parts(username, password, user_type)
            .expect("valid inputs should succeed");
        assert_eq!(creds.username(), username.trim());
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    fn registration_accepts_valid_customer(customer_input: RegistrationInput) {
        let registration = Registration::try_from_input(customer_input).expect("valid signup");
        assert_eq!(registration.username().as_ref(), "alice");
        assert_eq!(registration.user_type(), UserType::Customer);
        assert_eq!(registration.phone(), "9876543210");
    }

    #[rstest]
    fn registration_rejects_short_password(mut customer_input: RegistrationInput) {
        customer_input.password = Zeroizing::new("abc".into());
        customer_input.confirm_password = Zeroizing::new("abc".into());
        let err = Registration::try_from_input(customer_input).expect_err("too short");
        assert_eq!(err, RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        assert_eq!(err.field(), "password");
    }

    #[rstest]
    fn registration_rejects_mismatched_confirmation(mut customer_input: RegistrationInput) {
        customer_input.confirm_password = Zeroizing::new("secret2".into());
        let err = Registration::try_from_input(customer_input).expect_err("mismatch");
        assert_eq!(err.field(), "confirm_password");
    }

    #[rstest]
    #[case::phone("phone")]
    #[case::user_type("type")]
    #[case::address("address")]
    fn registration_reports_missing_field(
        mut customer_input: RegistrationInput,
        #[case] field: &str,
    ) {
        match field {
            "phone" => customer_input.phone = "  ".into(),
            "type" => customer_input.user_type = "admin".into(),
            _ => customer_input.profile.address = None,
        }
        let err = Registration::try_from_input(customer_input).expect_err("missing field");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("header.payload.signature");
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
    }
}
