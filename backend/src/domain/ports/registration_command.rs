//! Driving port for owner registration submissions.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::owner::OwnerId;
use crate::domain::registration::{
    DesignFile, Registration, RegistrationForm, RegistrationId, RegistrationStatus,
};

/// One member row exactly as the owner submitted it, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSubmission {
    pub name: String,
    pub age: i32,
}

/// A complete owner submission: form, members, optional design file.
///
/// The owner identity comes from the caller's session layer, never from the
/// client payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRegistrationRequest {
    pub owner_id: OwnerId,
    pub form: RegistrationForm,
    pub members: Vec<MemberSubmission>,
    pub attachment: Option<DesignFile>,
}

/// Outcome of a successful submission.
///
/// `notification_failed` is the documented asymmetry of the write path: the
/// registration persisted, but the confirmation message may not have gone
/// out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRegistrationResponse {
    pub registration: Registration,
    pub notification_failed: bool,
}

/// Use-case port: create-or-update the caller's registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Submit the registration; idempotent per owner.
    async fn submit(
        &self,
        request: SubmitRegistrationRequest,
    ) -> Result<SubmitRegistrationResponse, Error>;
}

/// Fixture implementation echoing a pending registration.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRegistrationCommand;

#[async_trait]
impl RegistrationCommand for FixtureRegistrationCommand {
    async fn submit(
        &self,
        request: SubmitRegistrationRequest,
    ) -> Result<SubmitRegistrationResponse, Error> {
        let now = chrono::Utc::now();
        let members = request
            .members
            .iter()
            .filter_map(|member| {
                crate::domain::registration::TeamMember::new(member.name.clone(), member.age).ok()
            })
            .collect();
        Ok(SubmitRegistrationResponse {
            registration: Registration {
                id: RegistrationId::random(),
                owner_id: request.owner_id,
                form: request.form,
                members,
                file_ref: None,
                status: RegistrationStatus::Pending,
                created_at: now,
                updated_at: now,
            },
            notification_failed: false,
        })
    }
}
