//! What the identity directives need from the rest of the application.

/// Current view of a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: String,
    pub full_name: String,
    pub email: String,
}

/// Read access to user accounts.
pub trait UserDirectory: Send + Sync {
    fn find_by_id(&self, user_id: &str) -> Option<UserInfo>;
}

pub trait EmailConfirmationLinkSupplier: Send + Sync {
    fn email_confirmation_url(&self, user_id: &str) -> String;
}

pub trait PasswordResetLinkSupplier: Send + Sync {
    fn password_reset_url(&self, user_id: &str) -> String;
}

/// Builds both kinds of links below one public base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrlLinks {
    base_url: String,
}

impl BaseUrlLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }
}

impl EmailConfirmationLinkSupplier for BaseUrlLinks {
    fn email_confirmation_url(&self, user_id: &str) -> String {
        format!("{}/login?confirm-email={user_id}", self.base_url)
    }
}

impl PasswordResetLinkSupplier for BaseUrlLinks {
    fn password_reset_url(&self, user_id: &str) -> String {
        format!("{}/new-password?user-id={user_id}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_ignore_trailing_slash() {
        let links = BaseUrlLinks::new("https://data.example.org/");
        assert_eq!(
            links.email_confirmation_url("42"),
            "https://data.example.org/login?confirm-email=42"
        );
        assert_eq!(
            links.password_reset_url("42"),
            "https://data.example.org/new-password?user-id=42"
        );
    }
}
