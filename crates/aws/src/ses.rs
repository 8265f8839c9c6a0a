//! Email delivery through SES v2.

use async_trait::async_trait;
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client;
use tracing::info;

use lab_access_core::error::{LabAccessError, Result};
use lab_access_core::services::{EmailMessage, Mailer};

const CHARSET: &str = "UTF-8";

#[derive(Clone, Debug)]
pub struct SesMailer {
    client: Client,
}

impl SesMailer {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::from_client(Client::new(sdk_config))
    }

    /// Create from a pre-built client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn content(data: &str) -> Result<Content> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| LabAccessError::Email(format!("invalid email content: {e}")))
}

fn email_content(message: &EmailMessage) -> Result<EmailContent> {
    let body = Body::builder()
        .html(content(&message.html_body)?)
        .text(content(&message.text_body)?)
        .build();
    let simple = Message::builder()
        .subject(content(&message.subject)?)
        .body(body)
        .build();
    Ok(EmailContent::builder().simple(simple).build())
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send_email(&self, message: &EmailMessage) -> Result<()> {
        let output = self
            .client
            .send_email()
            .from_email_address(&message.from)
            .destination(Destination::builder().to_addresses(&message.to).build())
            .content(email_content(message)?)
            .send()
            .await
            .map_err(|e| {
                LabAccessError::Email(format!(
                    "SendEmail to {} failed: {}",
                    message.to,
                    DisplayErrorContext(&e)
                ))
            })?;

        info!(to = %message.to, message_id = output.message_id().unwrap_or_default(), "email sent");
        Ok(())
    }
}
