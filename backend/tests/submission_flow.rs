//! End-to-end behaviour of the submission write path over in-memory
//! adapters: upsert idempotence, design-file stickiness, the creation-race
//! retry, and best-effort notification.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use derby_backend::domain::ports::{
    BlobKey, BlobStore, BlobStoreError, MemberSubmission, Notifier, NotifierError,
    RegistrationCommand, RegistrationDraft, RegistrationListQuery, RegistrationPage,
    RegistrationQuery, RegistrationRepository, RegistrationRepositoryError,
    SubmitRegistrationRequest,
};
use derby_backend::domain::{
    DesignFile, ErrorCode, FileRef, OwnerId, Registration, RegistrationForm, RegistrationId,
    RegistrationService, RegistrationStatus,
};

#[derive(Default)]
struct InMemoryRepository {
    rows: Mutex<HashMap<String, Registration>>,
    upsert_calls: AtomicUsize,
    duplicate_once: AtomicBool,
}

impl InMemoryRepository {
    fn force_creation_race(&self) {
        self.duplicate_once.store(true, Ordering::SeqCst);
    }

    fn row(&self, owner_id: &OwnerId) -> Option<Registration> {
        self.rows
            .lock()
            .expect("repository lock poisoned")
            .get(owner_id.as_ref())
            .cloned()
    }

    fn set_status_directly(&self, owner_id: &OwnerId, status: RegistrationStatus) {
        let mut rows = self.rows.lock().expect("repository lock poisoned");
        let row = rows.get_mut(owner_id.as_ref()).expect("row exists");
        row.status = status;
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRepository {
    async fn find_by_owner(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError> {
        Ok(self.row(owner_id))
    }

    async fn upsert(
        &self,
        owner_id: &OwnerId,
        draft: &RegistrationDraft,
    ) -> Result<Registration, RegistrationRepositoryError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().expect("repository lock poisoned");

        if self.duplicate_once.swap(false, Ordering::SeqCst) && !rows.contains_key(owner_id.as_ref())
        {
            // Emulate a racing first submission winning between the caller's
            // lookup and its write.
            let now = Utc::now();
            rows.insert(
                owner_id.as_ref().to_owned(),
                Registration {
                    id: RegistrationId::random(),
                    owner_id: owner_id.clone(),
                    form: draft.form.clone(),
                    members: draft.members.clone(),
                    file_ref: None,
                    status: RegistrationStatus::Pending,
                    created_at: now,
                    updated_at: now,
                },
            );
            return Err(RegistrationRepositoryError::duplicate_owner(
                owner_id.to_string(),
            ));
        }

        let now = Utc::now();
        let registration = match rows.get(owner_id.as_ref()) {
            Some(existing) => Registration {
                id: existing.id,
                owner_id: owner_id.clone(),
                form: draft.form.clone(),
                members: draft.members.clone(),
                file_ref: draft.file_ref.clone().or_else(|| existing.file_ref.clone()),
                status: existing.status,
                created_at: existing.created_at,
                updated_at: now,
            },
            None => Registration {
                id: RegistrationId::random(),
                owner_id: owner_id.clone(),
                form: draft.form.clone(),
                members: draft.members.clone(),
                file_ref: draft.file_ref.clone(),
                status: RegistrationStatus::Pending,
                created_at: now,
                updated_at: now,
            },
        };
        rows.insert(owner_id.as_ref().to_owned(), registration.clone());
        Ok(registration)
    }

    async fn set_status(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
    ) -> Result<Registration, RegistrationRepositoryError> {
        let mut rows = self.rows.lock().expect("repository lock poisoned");
        let row = rows
            .values_mut()
            .find(|row| row.id == *id)
            .ok_or_else(|| RegistrationRepositoryError::not_found(id.to_string()))?;
        row.status = status;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn list(
        &self,
        query: &RegistrationListQuery,
    ) -> Result<RegistrationPage, RegistrationRepositoryError> {
        let rows = self.rows.lock().expect("repository lock poisoned");
        let items: Vec<Registration> = rows.values().cloned().collect();
        let total = items.len() as u64;
        Ok(RegistrationPage {
            items,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }
}

#[derive(Default)]
struct RecordingBlobStore {
    puts: Mutex<Vec<(String, String, usize)>>,
}

impl RecordingBlobStore {
    fn recorded(&self) -> Vec<(String, String, usize)> {
        self.puts.lock().expect("blob lock poisoned").clone()
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn put(
        &self,
        key: &BlobKey,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<FileRef, BlobStoreError> {
        self.puts.lock().expect("blob lock poisoned").push((
            key.as_str().to_owned(),
            content_type.to_owned(),
            bytes.len(),
        ));
        Ok(FileRef::new(key.as_str()))
    }
}

#[derive(Default)]
struct FlakyNotifier {
    fail: AtomicBool,
    sent: AtomicUsize,
}

impl FlakyNotifier {
    fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for FlakyNotifier {
    async fn send_confirmation(&self, _registration: &Registration) -> Result<(), NotifierError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(NotifierError::send("relay refused the message"));
        }
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Harness {
    repository: Arc<InMemoryRepository>,
    blob_store: Arc<RecordingBlobStore>,
    notifier: Arc<FlakyNotifier>,
    service: RegistrationService<InMemoryRepository, RecordingBlobStore, FlakyNotifier>,
}

fn harness() -> Harness {
    let repository = Arc::new(InMemoryRepository::default());
    let blob_store = Arc::new(RecordingBlobStore::default());
    let notifier = Arc::new(FlakyNotifier::default());
    let service = RegistrationService::new(
        Arc::clone(&repository),
        Arc::clone(&blob_store),
        Arc::clone(&notifier),
    );
    Harness {
        repository,
        blob_store,
        notifier,
        service,
    }
}

fn form() -> RegistrationForm {
    RegistrationForm {
        team_name: "Galloway Gliders".into(),
        captain_name: "Moira Henderson".into(),
        contact_email: "moira@example.com".into(),
        phone_number: "01556 502000".into(),
        age_range: "adult".into(),
        soapbox_name: "The Flying Haggis".into(),
        design_description: "A tartan rocket on pram wheels".into(),
        dimensions: "2m x 1m x 1m".into(),
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

fn request(owner_id: &OwnerId, attachment: Option<DesignFile>) -> SubmitRegistrationRequest {
    SubmitRegistrationRequest {
        owner_id: owner_id.clone(),
        form: form(),
        members: members(),
        attachment,
    }
}

fn pdf() -> DesignFile {
    DesignFile::new("design.pdf", "application/pdf", b"%PDF-1.7".to_vec()).expect("valid file")
}

fn png() -> DesignFile {
    DesignFile::new("design.png", "image/png", vec![0x89, 0x50, 0x4E, 0x47]).expect("valid file")
}

#[tokio::test]
async fn first_submission_persists_pending_with_its_design_file() {
    let h = harness();
    let owner = OwnerId::random();

    let response = h
        .service
        .submit(request(&owner, Some(pdf())))
        .await
        .expect("submission succeeds");

    assert_eq!(response.registration.status, RegistrationStatus::Pending);
    assert!(!response.notification_failed);
    assert_eq!(response.registration.participants_count(), 2);

    let puts = h.blob_store.recorded();
    assert_eq!(puts.len(), 1);
    let (key, content_type, size) = &puts[0];
    assert!(key.starts_with(&format!("{owner}/")));
    assert!(key.ends_with(".pdf"));
    assert_eq!(content_type, "application/pdf");
    assert_eq!(*size, 8);

    let stored_ref = response
        .registration
        .file_ref
        .as_ref()
        .expect("file reference persisted");
    assert_eq!(stored_ref.as_str(), key);

    let found = h
        .service
        .find_own(&owner)
        .await
        .expect("lookup succeeds")
        .expect("registration exists");
    assert_eq!(found.id, response.registration.id);
}

#[tokio::test]
async fn resubmission_without_attachment_keeps_the_stored_file() {
    let h = harness();
    let owner = OwnerId::random();

    let first = h
        .service
        .submit(request(&owner, Some(pdf())))
        .await
        .expect("first submission succeeds");
    let original_ref = first.registration.file_ref.clone().expect("file stored");

    let mut update = request(&owner, None);
    update.form.soapbox_name = "The Flying Haggis II".into();
    let second = h.service.submit(update).await.expect("update succeeds");

    assert_eq!(second.registration.file_ref, Some(original_ref));
    assert_eq!(second.registration.id, first.registration.id);
    assert_eq!(
        second.registration.created_at,
        first.registration.created_at
    );
    assert_eq!(second.registration.form.soapbox_name, "The Flying Haggis II");
    assert_eq!(h.blob_store.recorded().len(), 1);
}

#[tokio::test]
async fn a_new_upload_replaces_the_stored_reference() {
    let h = harness();
    let owner = OwnerId::random();

    let first = h
        .service
        .submit(request(&owner, Some(pdf())))
        .await
        .expect("first submission succeeds");
    let original_ref = first.registration.file_ref.clone().expect("file stored");

    let mut update = request(&owner, Some(png()));
    update.members.push(MemberSubmission {
        name: "Ailsa Henderson".into(),
        age: 9,
    });
    let second = h.service.submit(update).await.expect("update succeeds");

    let replaced = second.registration.file_ref.clone().expect("file stored");
    assert_ne!(replaced, original_ref);
    assert!(replaced.as_str().ends_with(".png"));
    assert_eq!(second.registration.id, first.registration.id);
    assert_eq!(second.registration.participants_count(), 3);

    let puts = h.blob_store.recorded();
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[1].1, "image/png");
}

#[tokio::test]
async fn resubmission_preserves_an_organiser_decision() {
    let h = harness();
    let owner = OwnerId::random();

    h.service
        .submit(request(&owner, None))
        .await
        .expect("first submission succeeds");
    h.repository
        .set_status_directly(&owner, RegistrationStatus::Approved);

    let second = h
        .service
        .submit(request(&owner, None))
        .await
        .expect("update succeeds");
    assert_eq!(second.registration.status, RegistrationStatus::Approved);
}

#[tokio::test]
async fn a_creation_race_is_absorbed_by_a_single_retry() {
    let h = harness();
    let owner = OwnerId::random();
    h.repository.force_creation_race();

    let response = h
        .service
        .submit(request(&owner, None))
        .await
        .expect("submission survives the race");

    assert_eq!(h.repository.upsert_calls.load(Ordering::SeqCst), 2);
    assert_eq!(response.registration.status, RegistrationStatus::Pending);
    assert!(h.repository.row(&owner).is_some());
}

#[tokio::test]
async fn notifier_failure_flags_the_response_but_persists_the_record() {
    let h = harness();
    let owner = OwnerId::random();
    h.notifier.fail_next();

    let response = h
        .service
        .submit(request(&owner, None))
        .await
        .expect("submission succeeds despite the notifier");

    assert!(response.notification_failed);
    assert!(h.repository.row(&owner).is_some());
    assert_eq!(h.notifier.sent.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn a_concurrent_reader_never_sees_a_partial_member_set() {
    let h = harness();
    let owner = OwnerId::random();

    h.service
        .submit(request(&owner, None))
        .await
        .expect("initial submission succeeds");

    // Alternate between two- and three-member rosters while a reader polls.
    let writer_service = h.service.clone();
    let writer_owner = owner.clone();
    let writer = tokio::spawn(async move {
        for round in 0..50 {
            let mut update = request(&writer_owner, None);
            if round % 2 == 1 {
                update.members.push(MemberSubmission {
                    name: "Ailsa Henderson".into(),
                    age: 9,
                });
            }
            writer_service.submit(update).await.expect("update succeeds");
            tokio::task::yield_now().await;
        }
    });

    let mut observed = Vec::new();
    while !writer.is_finished() {
        let found = h
            .service
            .find_own(&owner)
            .await
            .expect("lookup succeeds")
            .expect("registration exists");
        observed.push(found.members.len());
        tokio::task::yield_now().await;
    }
    writer.await.expect("writer task completes");

    assert!(!observed.is_empty());
    assert!(
        observed.iter().all(|count| *count == 2 || *count == 3),
        "reader saw a partial member set: {observed:?}"
    );
}

#[tokio::test]
async fn a_rejected_submission_touches_no_collaborator() {
    let h = harness();
    let owner = OwnerId::random();

    let mut rejected = request(&owner, Some(pdf()));
    rejected.form.terms_accepted = false;

    let err = h
        .service
        .submit(rejected)
        .await
        .expect_err("terms must be accepted");

    assert_eq!(err.code, ErrorCode::InvalidRequest);
    assert!(h.blob_store.recorded().is_empty());
    assert_eq!(h.repository.upsert_calls.load(Ordering::SeqCst), 0);
    assert!(h.repository.row(&owner).is_none());
}
