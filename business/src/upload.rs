//! Photo upload controller.
//!
//! ## How to use
//! 1) `select_photo(&mut ctx, PhotoFile::from_path(path)?)` validates the file
//!    synchronously. A rejected file never reaches the network and leaves
//!    `is_uploading` untouched. Files are only taken on the photos step and never
//!    while the property is being submitted.
//! 2) On success the upload is marked pending and `UploadPhotoCommand` is queued;
//!    flush commands and sync as usual.
//! 3) When the command finishes, the returned URL is appended to the draft photos
//!    and progress shows 100. [`schedule_progress_reset`] queues
//!    `ResetUploadProgressCommand`, which drops it back to 0 once
//!    [`PROGRESS_RESET_DELAY`] has passed since completion.
//!
//! Only one upload may be in flight.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use estately_states::{
    CancellationToken, Command, CommandFuture, CommandSnapshot, LatestOnlyUpdater, State, StateCtx,
};
use thiserror::Error;

use crate::BusinessConfig;
use crate::api::ApiClient;
use crate::form_store::PropertyFormState;
use crate::notification::{Notification, Notifications};
use crate::submission::SubmissionState;
use crate::wizard::WizardStep;

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
pub const PROGRESS_RESET_DELAY: Duration = Duration::from_secs(1);

/// A local file picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl std::fmt::Debug for PhotoFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .field("mime", &self.mime)
            .finish()
    }
}

impl PhotoFile {
    /// MIME type is guessed from the file name.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        Self { name, bytes, mime }
    }

    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased text after the last `.`, if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejected {
    #[error("File size must be less than {limit_mb}MB")]
    TooLarge { size: u64, limit_mb: u64 },
    #[error("File type must be one of: {allowed}")]
    UnsupportedType {
        extension: Option<String>,
        allowed: String,
    },
    #[error("Another photo is still uploading")]
    Busy,
    #[error("Photos can only be added on the photos step")]
    WrongStep,
    #[error("The property is being submitted")]
    Submitting,
    #[error("No file selected")]
    NoFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_file_size: u64,
    pub allowed_extensions: Vec<&'static str>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            allowed_extensions: ALLOWED_EXTENSIONS.to_vec(),
        }
    }
}

impl UploadPolicy {
    /// Size is checked before type.
    pub fn validate(&self, file: &PhotoFile) -> Result<(), UploadRejected> {
        if file.bytes.is_empty() {
            return Err(UploadRejected::NoFile);
        }
        if file.size() > self.max_file_size {
            return Err(UploadRejected::TooLarge {
                size: file.size(),
                limit_mb: self.max_file_size / 1024 / 1024,
            });
        }
        let extension = file.extension();
        let allowed = extension
            .as_deref()
            .is_some_and(|ext| self.allowed_extensions.iter().any(|a| *a == ext));
        if !allowed {
            return Err(UploadRejected::UnsupportedType {
                extension,
                allowed: self.allowed_extensions.join(", "),
            });
        }
        Ok(())
    }
}

/// Lifecycle of the current upload task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadTask {
    #[default]
    Idle,
    Pending,
    Succeeded(String),
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadStatus {
    pub is_uploading: bool,
    /// Percent, `0..=100`.
    pub progress: u8,
    pub task: UploadTask,
    pub completed_at: Option<DateTime<Utc>>,
    /// Last validation or transfer error shown next to the picker.
    pub last_error: Option<String>,
    /// Ticket of the pending upload. A result for any other ticket is ignored.
    ticket: Option<u64>,
}

impl UploadStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self.task, UploadTask::Pending)
    }

    fn start(&mut self, ticket: u64) {
        self.is_uploading = true;
        self.progress = 0;
        self.task = UploadTask::Pending;
        self.completed_at = None;
        self.last_error = None;
        self.ticket = Some(ticket);
    }

    fn succeed(&mut self, url: String, now: DateTime<Utc>) {
        self.is_uploading = false;
        self.progress = 100;
        self.task = UploadTask::Succeeded(url);
        self.completed_at = Some(now);
        self.ticket = None;
    }

    fn fail(&mut self, message: String, now: DateTime<Utc>) {
        self.is_uploading = false;
        self.progress = 0;
        self.task = UploadTask::Failed(message.clone());
        self.completed_at = Some(now);
        self.last_error = Some(message);
        self.ticket = None;
    }
}

/// The file handed to the next `UploadPhotoCommand`.
#[derive(Debug, Clone, Default)]
pub struct PhotoUploadInput {
    pub file: Option<PhotoFile>,
    ticket: u64,
}

impl State for PhotoUploadInput {}

/// Validate `file` and queue its upload.
pub fn select_photo(ctx: &mut StateCtx, file: PhotoFile) -> Result<(), UploadRejected> {
    select_photo_with(ctx, file, &UploadPolicy::default())
}

pub fn select_photo_with(
    ctx: &mut StateCtx,
    file: PhotoFile,
    policy: &UploadPolicy,
) -> Result<(), UploadRejected> {
    let form = ctx.state::<PropertyFormState>();
    if form.upload.is_uploading {
        return Err(UploadRejected::Busy);
    }
    if form.current_step != WizardStep::Photos {
        return Err(UploadRejected::WrongStep);
    }
    if ctx.state::<SubmissionState>().is_submitting() {
        return Err(UploadRejected::Submitting);
    }
    if let Err(rejected) = policy.validate(&file) {
        log::info!("rejected photo '{}': {rejected}", file.name);
        let message = rejected.to_string();
        ctx.update::<PropertyFormState>(|form| form.upload.last_error = Some(message));
        return Err(rejected);
    }

    let mut ticket = 0;
    ctx.update::<PhotoUploadInput>(|input| {
        input.ticket += 1;
        ticket = input.ticket;
        input.file = Some(file);
    });
    ctx.update::<PropertyFormState>(|form| form.upload.start(ticket));
    ctx.enqueue_command::<UploadPhotoCommand>();
    Ok(())
}

/// Remove the photo at `index` from the draft. Refused while an upload is in flight.
pub fn remove_photo(ctx: &mut StateCtx, index: usize) -> Option<String> {
    let mut removed = None;
    ctx.update::<PropertyFormState>(|form| {
        if form.upload.is_uploading {
            log::warn!("not removing photo {index} while an upload is in flight");
            return;
        }
        removed = form.remove_photo(index);
    });
    removed
}

/// Queue the progress reset for a finished upload. Returns `false` if no bar is showing.
pub fn schedule_progress_reset(ctx: &mut StateCtx) -> bool {
    let upload = &ctx.state::<PropertyFormState>().upload;
    if upload.progress == 0 || upload.completed_at.is_none() {
        return false;
    }
    ctx.enqueue_command::<ResetUploadProgressCommand>();
    true
}

/// Uploads `PhotoUploadInput::file` and appends the resulting URL to the draft.
#[derive(Default, Debug)]
pub struct UploadPhotoCommand;

impl Command for UploadPhotoCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<PhotoUploadInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            let Some(file) = input.file else {
                log::info!("UploadPhotoCommand: no file selected, skipping");
                return;
            };
            let ticket = input.ticket;

            log::info!(
                "UploadPhotoCommand: uploading '{}' ({} bytes)",
                file.name,
                file.size()
            );
            let result = ApiClient::new(config).upload_photo(&file).await;
            let now = Utc::now();

            match result {
                Ok(url) => {
                    log::info!("UploadPhotoCommand: uploaded '{}' to {url}", file.name);
                    // Set by the form update, read by the notification update applied after it.
                    let landed = Arc::new(AtomicBool::new(false));
                    let mark = Arc::clone(&landed);
                    updater.update::<PropertyFormState>(move |form| {
                        if form.upload.ticket != Some(ticket) {
                            log::debug!("UploadPhotoCommand: form moved on, dropping result");
                            return;
                        }
                        form.add_photo(url.clone());
                        form.upload.succeed(url, now);
                        mark.store(true, Ordering::Release);
                    });
                    updater.update::<Notifications>(move |n| {
                        if landed.load(Ordering::Acquire) {
                            n.push(Notification::success("Photos uploaded successfully"));
                        }
                    });
                }
                Err(e) => {
                    log::error!("UploadPhotoCommand: upload of '{}' failed: {e}", file.name);
                    let message = format!("Upload failed: {}", e.user_message());
                    let toast = message.clone();
                    let current = Arc::new(AtomicBool::new(false));
                    let mark = Arc::clone(&current);
                    updater.update::<PropertyFormState>(move |form| {
                        if form.upload.ticket == Some(ticket) {
                            form.upload.fail(message, now);
                            mark.store(true, Ordering::Release);
                        }
                    });
                    updater.update::<Notifications>(move |n| {
                        if current.load(Ordering::Acquire) {
                            n.push(Notification::error(toast));
                        }
                    });
                }
            }
            updater.update::<PhotoUploadInput>(|input| input.file = None);
        })
    }
}

/// Clears the progress bar of the upload that was showing when it was spawned.
#[derive(Default, Debug)]
pub struct ResetUploadProgressCommand;

impl Command for ResetUploadProgressCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let completed_at = snap.state::<PropertyFormState>().upload.completed_at;

        Box::pin(async move {
            let Some(done) = completed_at else {
                return;
            };
            let elapsed = (Utc::now() - done).to_std().unwrap_or_default();
            tokio::time::sleep(PROGRESS_RESET_DELAY.saturating_sub(elapsed)).await;

            updater.update::<PropertyFormState>(move |form| {
                // A newer upload owns the bar now.
                if form.upload.completed_at != Some(done) {
                    return;
                }
                if matches!(form.upload.task, UploadTask::Succeeded(_)) {
                    log::debug!("ResetUploadProgressCommand: clearing progress");
                    form.upload.progress = 0;
                }
            });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> PhotoFile {
        PhotoFile::new(name, vec![0u8; size])
    }

    #[test]
    fn mime_is_guessed_from_name() {
        assert_eq!(file("front.PNG", 1).mime, "image/png");
        assert_eq!(file("front.webp", 1).mime, "image/webp");
        assert_eq!(file("notes", 1).extension(), None);
    }

    #[test]
    fn fifteen_mib_is_too_large() {
        let err = UploadPolicy::default()
            .validate(&file("big.png", 15 * 1024 * 1024))
            .unwrap_err();
        assert_eq!(err.to_string(), "File size must be less than 10MB");
    }

    #[test]
    fn exactly_ten_mib_is_allowed() {
        let policy = UploadPolicy::default();
        assert!(policy.validate(&file("ok.jpeg", 10 * 1024 * 1024)).is_ok());
    }

    #[test]
    fn gif_lists_allowed_types() {
        let err = UploadPolicy::default()
            .validate(&file("anim.gif", 10))
            .unwrap_err();
        assert_eq!(err.to_string(), "File type must be one of: jpg, jpeg, png, webp");
    }

    #[test]
    fn extension_check_ignores_case() {
        assert!(UploadPolicy::default().validate(&file("IMG_01.JPG", 10)).is_ok());
    }

    fn progress_ctx() -> StateCtx {
        let mut ctx = photos_step_ctx();
        ctx.record_command(ResetUploadProgressCommand);
        ctx
    }

    #[tokio::test(start_paused = true)]
    async fn finished_upload_progress_clears_after_delay() {
        let mut ctx = progress_ctx();
        ctx.update::<PropertyFormState>(|form| {
            form.upload.start(1);
            form.upload.succeed("https://cdn.example.com/a.png".into(), Utc::now());
        });
        assert_eq!(ctx.state::<PropertyFormState>().upload.progress, 100);

        assert!(schedule_progress_reset(&mut ctx));
        ctx.flush_commands();
        tokio::time::sleep(PROGRESS_RESET_DELAY / 2).await;
        ctx.sync_updates();
        assert_eq!(ctx.state::<PropertyFormState>().upload.progress, 100);

        ctx.await_tasks().await;
        let upload = &ctx.state::<PropertyFormState>().upload;
        assert_eq!(upload.progress, 0);
        assert_eq!(
            upload.task,
            UploadTask::Succeeded("https://cdn.example.com/a.png".into())
        );
        assert!(!schedule_progress_reset(&mut ctx));
    }

    #[tokio::test(start_paused = true)]
    async fn newer_upload_keeps_its_progress() {
        let mut ctx = progress_ctx();
        ctx.update::<PropertyFormState>(|form| {
            form.upload.start(1);
            form.upload.succeed("https://cdn.example.com/a.png".into(), Utc::now());
        });
        assert!(schedule_progress_reset(&mut ctx));
        ctx.flush_commands();

        ctx.update::<PropertyFormState>(|form| {
            form.upload.start(2);
            let later = Utc::now() + chrono::TimeDelta::seconds(1);
            form.upload.succeed("https://cdn.example.com/b.png".into(), later);
        });
        ctx.await_tasks().await;
        assert_eq!(ctx.state::<PropertyFormState>().upload.progress, 100);
    }

    #[test]
    fn nothing_to_reset_before_any_upload() {
        let mut ctx = progress_ctx();
        assert!(!schedule_progress_reset(&mut ctx));
    }

    #[test]
    fn failure_records_error_and_zero_progress() {
        let mut status = UploadStatus::default();
        status.start(1);
        status.fail("Upload failed: boom".into(), Utc::now());
        assert!(!status.is_uploading);
        assert_eq!(status.progress, 0);
        assert_eq!(status.last_error.as_deref(), Some("Upload failed: boom"));
        assert_eq!(status.task, UploadTask::Failed("Upload failed: boom".into()));
    }

    fn photos_step_ctx() -> StateCtx {
        let mut ctx = StateCtx::new();
        ctx.add_state(PropertyFormState {
            current_step: WizardStep::Photos,
            ..PropertyFormState::default()
        });
        ctx.add_state(PhotoUploadInput::default());
        ctx.add_state(SubmissionState::default());
        ctx
    }

    #[test]
    fn selection_off_the_photos_step_is_refused() {
        let mut ctx = photos_step_ctx();
        ctx.update::<PropertyFormState>(|form| form.current_step = WizardStep::Review);

        assert_eq!(
            select_photo(&mut ctx, file("a.png", 10)),
            Err(UploadRejected::WrongStep)
        );
        assert!(!ctx.state::<PropertyFormState>().upload.is_uploading);
        assert!(ctx.state::<PhotoUploadInput>().file.is_none());
    }

    #[test]
    fn selection_during_submission_is_refused() {
        let mut ctx = photos_step_ctx();
        ctx.set(SubmissionState::Submitting);

        assert_eq!(
            select_photo(&mut ctx, file("a.png", 10)),
            Err(UploadRejected::Submitting)
        );
        assert!(ctx.state::<PhotoUploadInput>().file.is_none());
    }

    #[test]
    fn rejected_file_leaves_uploading_false() {
        let mut ctx = photos_step_ctx();

        let err = select_photo(&mut ctx, file("huge.png", 15 * 1024 * 1024)).unwrap_err();
        assert!(matches!(err, UploadRejected::TooLarge { .. }));

        let form = ctx.state::<PropertyFormState>();
        assert!(!form.upload.is_uploading);
        assert_eq!(
            form.upload.last_error.as_deref(),
            Some("File size must be less than 10MB")
        );
        assert!(ctx.state::<PhotoUploadInput>().file.is_none());
    }

    #[test]
    fn second_selection_while_pending_is_busy() {
        let mut ctx = photos_step_ctx();
        ctx.update::<PropertyFormState>(|form| form.upload.start(1));

        assert_eq!(
            select_photo(&mut ctx, file("a.png", 10)),
            Err(UploadRejected::Busy)
        );
    }

    #[test]
    fn remove_is_refused_during_upload() {
        let mut ctx = StateCtx::new();
        let mut form = PropertyFormState::default();
        form.add_photo("https://cdn.example.com/a.png");
        form.upload.start(1);
        ctx.add_state(form);

        assert_eq!(remove_photo(&mut ctx, 0), None);
        assert_eq!(ctx.state::<PropertyFormState>().draft.photos.len(), 1);
    }
}
