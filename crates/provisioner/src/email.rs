//! Welcome email sent once a student's access is ready.

use askama::Template;

use lab_access_core::config::ProvisionerConfig;
use lab_access_core::error::{LabAccessError, Result};
use lab_access_core::models::roster::StudentRow;
use lab_access_core::services::EmailMessage;

pub const SUBJECT: &str = "Your AWS Lab Access";

/// Role name students pick in the access portal.
pub const ROLE_LABEL: &str = "CustomPolicy";

#[derive(Template)]
#[template(path = "welcome_email.html")]
struct WelcomeHtml<'a> {
    first_name: &'a str,
    username: &'a str,
    portal_url: &'a str,
    account_id: &'a str,
    role: &'a str,
    sign_off: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "welcome_email.txt")]
struct WelcomeText<'a> {
    first_name: &'a str,
    username: &'a str,
    portal_url: &'a str,
    account_id: &'a str,
    role: &'a str,
    sign_off: Option<&'a str>,
}

/// Render the welcome email for a provisioned student.
pub fn welcome_email(config: &ProvisionerConfig, row: &StudentRow) -> Result<EmailMessage> {
    let html = WelcomeHtml {
        first_name: &row.first_name,
        username: &row.username,
        portal_url: &config.access_portal_url,
        account_id: &config.target_account_id,
        role: ROLE_LABEL,
        sign_off: config.email_sign_off.as_deref(),
    };
    let text = WelcomeText {
        first_name: html.first_name,
        username: html.username,
        portal_url: html.portal_url,
        account_id: html.account_id,
        role: html.role,
        sign_off: html.sign_off,
    };

    Ok(EmailMessage {
        from: config.ses_sender.clone(),
        to: row.email.clone(),
        subject: SUBJECT.to_string(),
        html_body: html
            .render()
            .map_err(|e| LabAccessError::Template(format!("welcome email (html): {e}")))?,
        text_body: text
            .render()
            .map_err(|e| LabAccessError::Template(format!("welcome email (text): {e}")))?,
    })
}
