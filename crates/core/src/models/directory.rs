/// A principal found in the identity directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub user_id: String,
    pub user_name: Option<String>,
}

/// Attributes for creating a directory user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDirectoryUser {
    pub user_name: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    /// Email `Type` attribute, e.g. `work`.
    pub email_type: Option<String>,
    /// `UserType` attribute, e.g. `Student`.
    pub user_type: Option<String>,
}

impl NewDirectoryUser {
    pub fn new(user_name: &str, given_name: &str, family_name: &str, email: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
            email: email.to_string(),
            email_type: None,
            user_type: None,
        }
    }

    pub fn with_email_type(mut self, email_type: &str) -> Self {
        self.email_type = Some(email_type.to_string());
        self
    }

    pub fn with_user_type(mut self, user_type: &str) -> Self {
        self.user_type = Some(user_type.to_string());
        self
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

/// Result of a group membership request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOutcome {
    Created,
    /// The directory reported a conflict: the user is already a member.
    AlreadyMember,
}
