use serde::Deserialize;

/// One record of a Roster Sync file (`Username,FirstName,LastName,Email`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RosterRow {
    #[serde(rename = "Username", default)]
    pub username: String,
    #[serde(rename = "FirstName", default)]
    pub first_name: String,
    #[serde(rename = "LastName", default)]
    pub last_name: String,
    #[serde(rename = "Email", default)]
    pub email: String,
}

impl RosterRow {
    /// Username normalized for directory lookups.
    pub fn normalized_username(&self) -> String {
        self.username.trim().to_lowercase()
    }

    /// True when every required field carries a value.
    pub fn is_complete(&self) -> bool {
        ![
            self.normalized_username().as_str(),
            self.first_name.trim(),
            self.last_name.trim(),
            self.email.trim(),
        ]
        .iter()
        .any(|v| v.is_empty())
    }
}

/// One record of a User Provisioner file
/// (`student_id,first_name,last_name,username,email`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StudentRow {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl StudentRow {
    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            student_id: self.student_id.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }

    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("username", &self.username),
            ("email", &self.email),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
