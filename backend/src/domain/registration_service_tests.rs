//! Behavioural tests for the submission pipeline, exercising validation,
//! upload ordering, the creation-race retry, and notification isolation
//! against mocked collaborators.

use std::sync::Arc;

use mockall::Sequence;
use rstest::rstest;

use crate::domain::error::ErrorCode;
use crate::domain::owner::OwnerId;
use crate::domain::ports::{
    MemberSubmission, MockBlobStore, MockNotifier, MockRegistrationRepository,
    RegistrationCommand, RegistrationQuery, RegistrationRepositoryError,
    SubmitRegistrationRequest,
};
use crate::domain::registration::{
    DesignFile, FileRef, Registration, RegistrationForm, RegistrationId, RegistrationStatus,
    TeamMember,
};

use super::RegistrationService;

fn form() -> RegistrationForm {
    RegistrationForm {
        team_name: "Galloway Gliders".into(),
        captain_name: "Moira Henderson".into(),
        contact_email: "moira@example.com".into(),
        phone_number: "01556 502000".into(),
        age_range: "adult".into(),
        soapbox_name: "The Flying Haggis".into(),
        design_description: "A tartan rocket on pram wheels".into(),
        dimensions: "2m x 1m x 1.2m".into(),
        brakes_steering: "Drum brake, rope steering".into(),
        terms_accepted: true,
    }
}

fn members() -> Vec<MemberSubmission> {
    vec![
        MemberSubmission {
            name: "Moira Henderson".into(),
            age: 38,
        },
        MemberSubmission {
            name: "Callum Henderson".into(),
            age: 11,
        },
    ]
}

fn request(owner_id: &OwnerId) -> SubmitRegistrationRequest {
    SubmitRegistrationRequest {
        owner_id: owner_id.clone(),
        form: form(),
        members: members(),
        attachment: None,
    }
}

fn persisted(owner_id: &OwnerId, file_ref: Option<FileRef>) -> Registration {
    let now = chrono::Utc::now();
    Registration {
        id: RegistrationId::random(),
        owner_id: owner_id.clone(),
        form: form(),
        members: vec![TeamMember::new("Moira Henderson", 38).expect("valid member")],
        file_ref,
        status: RegistrationStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

fn pdf_attachment() -> DesignFile {
    DesignFile::new("design.pdf", "application/pdf", vec![0x25, 0x50, 0x44, 0x46])
        .expect("valid design file")
}

fn service(
    repository: MockRegistrationRepository,
    blob_store: MockBlobStore,
    notifier: MockNotifier,
) -> RegistrationService<MockRegistrationRepository, MockBlobStore, MockNotifier> {
    RegistrationService::new(Arc::new(repository), Arc::new(blob_store), Arc::new(notifier))
}

fn untouched_collaborators() -> (MockRegistrationRepository, MockBlobStore, MockNotifier) {
    let mut repository = MockRegistrationRepository::new();
    repository.expect_find_by_owner().times(0);
    repository.expect_upsert().times(0);
    let mut blob_store = MockBlobStore::new();
    blob_store.expect_put().times(0);
    let mut notifier = MockNotifier::new();
    notifier.expect_send_confirmation().times(0);
    (repository, blob_store, notifier)
}

#[tokio::test]
async fn rejects_unaccepted_terms_without_side_effects() {
    let (repository, blob_store, notifier) = untouched_collaborators();
    let service = service(repository, blob_store, notifier);

    let owner_id = OwnerId::random();
    let mut request = request(&owner_id);
    request.form.terms_accepted = false;

    let err = service.submit(request).await.expect_err("terms gate");
    assert_eq!(err.code, ErrorCode::InvalidRequest);
    let details = err.details.expect("field details");
    assert_eq!(details["field"], "termsAccepted");
}

#[tokio::test]
async fn rejects_missing_mandatory_field_without_side_effects() {
    let (repository, blob_store, notifier) = untouched_collaborators();
    let service = service(repository, blob_store, notifier);

    let owner_id = OwnerId::random();
    let mut request = request(&owner_id);
    request.form.team_name = "   ".into();

    let err = service.submit(request).await.expect_err("field gate");
    assert_eq!(err.code, ErrorCode::InvalidRequest);
    let details = err.details.expect("field details");
    assert_eq!(details["field"], "teamName");
    assert_eq!(details["code"], "missing_field");
}

#[tokio::test]
async fn rejects_empty_member_list() {
    let (repository, blob_store, notifier) = untouched_collaborators();
    let service = service(repository, blob_store, notifier);

    let owner_id = OwnerId::random();
    let mut request = request(&owner_id);
    request.members.clear();

    let err = service.submit(request).await.expect_err("member gate");
    assert_eq!(err.code, ErrorCode::InvalidRequest);
    let details = err.details.expect("field details");
    assert_eq!(details["code"], "no_members");
}

#[rstest]
#[case("", 11, "empty_member_name")]
#[case("Callum", 0, "invalid_member_age")]
#[tokio::test]
async fn rejects_invalid_member_with_its_index(
    #[case] name: &str,
    #[case] age: i32,
    #[case] expected_code: &str,
) {
    let (repository, blob_store, notifier) = untouched_collaborators();
    let service = service(repository, blob_store, notifier);

    let owner_id = OwnerId::random();
    let mut request = request(&owner_id);
    request.members[1] = MemberSubmission {
        name: name.into(),
        age,
    };

    let err = service.submit(request).await.expect_err("member gate");
    assert_eq!(err.code, ErrorCode::InvalidRequest);
    let details = err.details.expect("member details");
    assert_eq!(details["index"], 1);
    assert_eq!(details["code"], expected_code);
}

#[tokio::test]
async fn first_submission_persists_pending_and_notifies() {
    let owner_id = OwnerId::random();

    let mut repository = MockRegistrationRepository::new();
    repository
        .expect_find_by_owner()
        .times(1)
        .returning(|_| Ok(None));
    let saved = persisted(&owner_id, None);
    let returned = saved.clone();
    repository
        .expect_upsert()
        .times(1)
        .withf(|_, draft| draft.file_ref.is_none() && draft.members.len() == 2)
        .returning(move |_, _| Ok(returned.clone()));

    let mut blob_store = MockBlobStore::new();
    blob_store.expect_put().times(0);

    let mut notifier = MockNotifier::new();
    notifier
        .expect_send_confirmation()
        .times(1)
        .returning(|_| Ok(()));

    let service = service(repository, blob_store, notifier);
    let response = service
        .submit(request(&owner_id))
        .await
        .expect("submission succeeds");

    assert_eq!(response.registration, saved);
    assert!(!response.notification_failed);
}

#[tokio::test]
async fn update_without_attachment_passes_previous_file_ref_through() {
    let owner_id = OwnerId::random();
    let previous = FileRef::new("owner/1714067200000.pdf");

    let mut repository = MockRegistrationRepository::new();
    let existing = persisted(&owner_id, Some(previous.clone()));
    repository
        .expect_find_by_owner()
        .times(1)
        .returning(move |_| Ok(Some(existing.clone())));
    let saved = persisted(&owner_id, Some(previous.clone()));
    let returned = saved.clone();
    repository
        .expect_upsert()
        .times(1)
        .withf(move |_, draft| draft.file_ref.as_ref() == Some(&previous))
        .returning(move |_, _| Ok(returned.clone()));

    let mut blob_store = MockBlobStore::new();
    blob_store.expect_put().times(0);

    let mut notifier = MockNotifier::new();
    notifier
        .expect_send_confirmation()
        .times(1)
        .returning(|_| Ok(()));

    let service = service(repository, blob_store, notifier);
    let response = service
        .submit(request(&owner_id))
        .await
        .expect("submission succeeds");
    assert_eq!(response.registration.file_ref, saved.file_ref);
}

#[tokio::test]
async fn attachment_is_stored_under_an_owner_scoped_key_before_persisting() {
    let owner_id = OwnerId::random();
    let owner_prefix = format!("{owner_id}/");

    let mut blob_store = MockBlobStore::new();
    blob_store
        .expect_put()
        .times(1)
        .withf(move |key, content_type, bytes| {
            key.as_str().starts_with(&owner_prefix)
                && key.as_str().ends_with(".pdf")
                && content_type == "application/pdf"
                && !bytes.is_empty()
        })
        .returning(|key, _, _| Ok(FileRef::new(key.as_str())));

    let mut repository = MockRegistrationRepository::new();
    repository
        .expect_find_by_owner()
        .times(1)
        .returning(|_| Ok(None));
    let saved = persisted(&owner_id, Some(FileRef::new("stored")));
    let returned = saved.clone();
    repository
        .expect_upsert()
        .times(1)
        .withf(|_, draft| draft.file_ref.is_some())
        .returning(move |_, _| Ok(returned.clone()));

    let mut notifier = MockNotifier::new();
    notifier
        .expect_send_confirmation()
        .times(1)
        .returning(|_| Ok(()));

    let service = service(repository, blob_store, notifier);
    let mut request = request(&owner_id);
    request.attachment = Some(pdf_attachment());
    service.submit(request).await.expect("submission succeeds");
}

#[tokio::test]
async fn upload_failure_stops_the_submission_before_any_write() {
    let owner_id = OwnerId::random();

    let mut repository = MockRegistrationRepository::new();
    repository
        .expect_find_by_owner()
        .times(1)
        .returning(|_| Ok(None));
    repository.expect_upsert().times(0);

    let mut blob_store = MockBlobStore::new();
    blob_store
        .expect_put()
        .times(1)
        .returning(|_, _, _| Err(crate::domain::ports::BlobStoreError::unavailable("disk full")));

    let mut notifier = MockNotifier::new();
    notifier.expect_send_confirmation().times(0);

    let service = service(repository, blob_store, notifier);
    let mut request = request(&owner_id);
    request.attachment = Some(pdf_attachment());

    let err = service.submit(request).await.expect_err("upload gate");
    assert_eq!(err.code, ErrorCode::ServiceUnavailable);
    let details = err.details.expect("step details");
    assert_eq!(details["step"], "file_upload");
}

#[tokio::test]
async fn creation_race_retries_the_upsert_exactly_once() {
    let owner_id = OwnerId::random();
    let mut seq = Sequence::new();

    let mut repository = MockRegistrationRepository::new();
    repository
        .expect_find_by_owner()
        .times(1)
        .returning(|_| Ok(None));
    let raced = owner_id.to_string();
    repository
        .expect_upsert()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_, _| Err(RegistrationRepositoryError::duplicate_owner(raced.clone())));
    let saved = persisted(&owner_id, None);
    let returned = saved.clone();
    repository
        .expect_upsert()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_, _| Ok(returned.clone()));

    let mut notifier = MockNotifier::new();
    notifier
        .expect_send_confirmation()
        .times(1)
        .returning(|_| Ok(()));

    let service = service(repository, MockBlobStore::new(), notifier);
    let response = service
        .submit(request(&owner_id))
        .await
        .expect("retry takes the update path");
    assert_eq!(response.registration, saved);
}

#[tokio::test]
async fn persistent_duplicate_surfaces_a_conflict() {
    let owner_id = OwnerId::random();

    let mut repository = MockRegistrationRepository::new();
    repository
        .expect_find_by_owner()
        .times(1)
        .returning(|_| Ok(None));
    let raced = owner_id.to_string();
    repository
        .expect_upsert()
        .times(2)
        .returning(move |_, _| Err(RegistrationRepositoryError::duplicate_owner(raced.clone())));

    let mut notifier = MockNotifier::new();
    notifier.expect_send_confirmation().times(0);

    let service = service(repository, MockBlobStore::new(), notifier);
    let err = service
        .submit(request(&owner_id))
        .await
        .expect_err("conflict after one retry");
    assert_eq!(err.code, ErrorCode::Conflict);
}

#[rstest]
#[case(
    RegistrationRepositoryError::connection("refused"),
    ErrorCode::ServiceUnavailable
)]
#[case(RegistrationRepositoryError::query("bad row"), ErrorCode::InternalError)]
#[tokio::test]
async fn persistence_failures_map_to_their_public_codes(
    #[case] failure: RegistrationRepositoryError,
    #[case] expected: ErrorCode,
) {
    let owner_id = OwnerId::random();

    let mut repository = MockRegistrationRepository::new();
    repository
        .expect_find_by_owner()
        .times(1)
        .returning(|_| Ok(None));
    repository
        .expect_upsert()
        .times(1)
        .returning(move |_, _| Err(failure.clone()));

    let mut notifier = MockNotifier::new();
    notifier.expect_send_confirmation().times(0);

    let service = service(repository, MockBlobStore::new(), notifier);
    let err = service
        .submit(request(&owner_id))
        .await
        .expect_err("persistence failure surfaces");
    assert_eq!(err.code, expected);
}

#[tokio::test]
async fn notification_failure_flags_the_response_without_failing_it() {
    let owner_id = OwnerId::random();

    let mut repository = MockRegistrationRepository::new();
    repository
        .expect_find_by_owner()
        .times(1)
        .returning(|_| Ok(None));
    let saved = persisted(&owner_id, None);
    let returned = saved.clone();
    repository
        .expect_upsert()
        .times(1)
        .returning(move |_, _| Ok(returned.clone()));

    let mut notifier = MockNotifier::new();
    notifier
        .expect_send_confirmation()
        .times(1)
        .returning(|_| Err(crate::domain::ports::NotifierError::send("relay timed out")));

    let service = service(repository, MockBlobStore::new(), notifier);
    let response = service
        .submit(request(&owner_id))
        .await
        .expect("submission still succeeds");
    assert_eq!(response.registration, saved);
    assert!(response.notification_failed);
}

#[tokio::test]
async fn find_own_delegates_to_the_repository() {
    let owner_id = OwnerId::random();

    let mut repository = MockRegistrationRepository::new();
    let existing = persisted(&owner_id, None);
    let returned = existing.clone();
    repository
        .expect_find_by_owner()
        .times(1)
        .returning(move |_| Ok(Some(returned.clone())));

    let service = service(repository, MockBlobStore::new(), MockNotifier::new());
    let found = service
        .find_own(&owner_id)
        .await
        .expect("lookup succeeds")
        .expect("registration exists");
    assert_eq!(found, existing);
}
