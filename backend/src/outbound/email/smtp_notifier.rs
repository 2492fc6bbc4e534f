//! SMTP implementation of the notification port using `lettre`.
//!
//! Sends a plain-text summary of each submission to the organisers. Sending
//! is best-effort by contract; the caller decides what a failure means.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::domain::ports::{Notifier, NotifierError};
use crate::domain::registration::Registration;

/// Settings for the SMTP relay and the fixed addresses.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Relay host name, resolved with STARTTLS on the submission port.
    pub relay: String,
    /// Relay credentials; `None` for an open relay such as a local test one.
    pub credentials: Option<(String, String)>,
    /// Sender address on outgoing mail.
    pub from: Mailbox,
    /// Organiser inbox that receives every submission summary.
    pub organiser: Mailbox,
}

/// Notifier that mails a submission summary to the organisers.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    organiser: Mailbox,
}

impl SmtpNotifier {
    /// Build a notifier from relay settings.
    pub fn new(config: SmtpConfig) -> Result<Self, NotifierError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.relay)
            .map_err(|err| NotifierError::send(err.to_string()))?;
        if let Some((username, password)) = config.credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }
        Ok(Self {
            transport: builder.build(),
            from: config.from,
            organiser: config.organiser,
        })
    }
}

/// Render the plain-text summary body.
fn compose_body(registration: &Registration) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "New soapbox derby registration: {}\n\n",
        registration.form.team_name
    ));
    body.push_str(&format!("Captain: {}\n", registration.form.captain_name));
    body.push_str(&format!("Email: {}\n", registration.form.contact_email));
    body.push_str(&format!("Phone: {}\n", registration.form.phone_number));
    body.push_str(&format!("Age range: {}\n", registration.form.age_range));
    body.push_str(&format!("Soapbox: {}\n", registration.form.soapbox_name));
    body.push_str(&format!("Dimensions: {}\n", registration.form.dimensions));
    body.push_str(&format!(
        "Brakes and steering: {}\n",
        registration.form.brakes_steering
    ));
    body.push_str(&format!(
        "Design: {}\n\n",
        registration.form.design_description
    ));

    body.push_str(&format!(
        "Team members ({}):\n",
        registration.participants_count()
    ));
    for member in &registration.members {
        body.push_str(&format!("  - {} ({})\n", member.name(), member.age()));
    }

    match &registration.file_ref {
        Some(file_ref) => body.push_str(&format!("\nDesign file: {file_ref}\n")),
        None => body.push_str("\nNo design file uploaded.\n"),
    }
    body.push_str(&format!("\nStatus: {}\n", registration.status));
    body
}

fn compose_message(
    from: &Mailbox,
    organiser: &Mailbox,
    registration: &Registration,
) -> Result<Message, NotifierError> {
    Message::builder()
        .from(from.clone())
        .to(organiser.clone())
        .subject(format!(
            "Registration received: {}",
            registration.form.team_name
        ))
        .header(ContentType::TEXT_PLAIN)
        .body(compose_body(registration))
        .map_err(|err| NotifierError::send(err.to_string()))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_confirmation(&self, registration: &Registration) -> Result<(), NotifierError> {
        let message = compose_message(&self.from, &self.organiser, registration)?;
        self.transport
            .send(message)
            .await
            .map_err(|err| NotifierError::send(err.to_string()))?;
        debug!(registration_id = %registration.id, "sent registration notification");
        Ok(())
    }
}
