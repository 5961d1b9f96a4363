//! Upload client.
//!
//! Drives one upload at a time through validation, the network call and
//! result display. Selecting a new file supersedes whatever is in flight:
//! every request carries a token and only the reply to the latest token is
//! applied.

pub mod clipboard;
pub mod state;
pub mod transport;

pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use state::{
    validate, ClientError, ClientViewState, SelectedFile, UploadPhase, COPY_FEEDBACK,
    GENERIC_FAILURE,
};
pub use transport::{interpret_reply, HttpTransport, Transport};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Text arrived and is now displayed.
    Extracted,
    /// Failed validation; no request was made.
    Rejected(ClientError),
    /// The request failed; the error is now displayed.
    Failed(ClientError),
    /// A newer selection or a clear happened first; the reply was dropped.
    Superseded,
}

pub struct UploadClient<T, C> {
    transport: T,
    clipboard: C,
    state: Arc<Mutex<ClientViewState>>,
    latest_request: AtomicU64,
    copy_generation: Arc<AtomicU64>,
}

impl<T: Transport, C: Clipboard> UploadClient<T, C> {
    pub fn new(transport: T, clipboard: C) -> Self {
        Self {
            transport,
            clipboard,
            state: Arc::new(Mutex::new(ClientViewState::default())),
            latest_request: AtomicU64::new(0),
            copy_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Snapshot of what should be rendered right now.
    pub fn state(&self) -> ClientViewState {
        self.view().clone()
    }

    pub async fn select_file(&self, file: SelectedFile) -> UploadOutcome {
        // Token and view change together under the view lock, so a reply can
        // never observe one without the other.
        let token = {
            let mut view = self.view();
            let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
            view.begin_selection(&file.name);

            if let Err(e) = validate(&file) {
                info!(file_name = %file.name, "Rejected selection: {}", e);
                view.error = e.to_string();
                view.loading = false;
                return UploadOutcome::Rejected(e);
            }

            view.loading = true;
            token
        };

        let reply = self.transport.upload(&file).await;

        let mut view = self.view();
        if self.latest_request.load(Ordering::SeqCst) != token {
            debug!(token, file_name = %file.name, "Dropping reply to superseded upload");
            return UploadOutcome::Superseded;
        }

        view.loading = false;
        match reply {
            Ok(text) => {
                view.text = text;
                UploadOutcome::Extracted
            }
            Err(e) => {
                warn!(file_name = %file.name, "Upload failed: {}", e);
                view.text.clear();
                view.error = e.to_string();
                UploadOutcome::Failed(e)
            }
        }
    }

    /// Copies the extracted text and shows "Copied!" for [`COPY_FEEDBACK`].
    ///
    /// Does nothing unless a result is displayed. Outside a Tokio runtime the
    /// text is still copied but the flag is left unset, since nothing could
    /// revert it.
    pub fn copy(&self) -> Result<(), ClipboardError> {
        let text = match self.view().visible_text() {
            Some(text) => text.to_string(),
            None => return Ok(()),
        };

        self.clipboard.write_text(&text)?;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No Tokio runtime, skipping copy feedback");
            return Ok(());
        };

        let generation = {
            let mut view = self.view();
            view.copied = true;
            self.copy_generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.copy_generation);
        runtime.spawn(async move {
            tokio::time::sleep(COPY_FEEDBACK).await;
            let mut view = state.lock().unwrap_or_else(PoisonError::into_inner);
            if current.load(Ordering::SeqCst) == generation {
                view.copied = false;
            }
        });

        Ok(())
    }

    /// Back to an empty page. Any reply still in flight is dropped.
    pub fn clear(&self) {
        let mut view = self.view();
        self.latest_request.fetch_add(1, Ordering::SeqCst);
        self.copy_generation.fetch_add(1, Ordering::SeqCst);
        view.clear();
    }

    pub fn toggle_theme(&self) {
        let mut view = self.view();
        view.dark_mode = !view.dark_mode;
    }

    fn view(&self) -> MutexGuard<'_, ClientViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use crate::{MAX_UPLOAD_BYTES, PDF_MEDIA_TYPE};

    /// Echoes the file name back. `slow*` files take 500 ms and `bad.pdf`
    /// fails.
    #[derive(Default)]
    struct StubTransport {
        calls: AtomicUsize,
    }

    impl Transport for StubTransport {
        async fn upload(&self, file: &SelectedFile) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if file.name.starts_with("slow") {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            if file.name == "bad.pdf" {
                return Err(ClientError::request_failed("Failed to parse PDF"));
            }
            Ok(format!("text of {}", file.name))
        }
    }

    fn client() -> UploadClient<StubTransport, MemoryClipboard> {
        UploadClient::new(StubTransport::default(), MemoryClipboard::default())
    }

    fn pdf(name: &str) -> SelectedFile {
        SelectedFile::new(name, PDF_MEDIA_TYPE, b"%PDF-1.4".to_vec())
    }

    #[tokio::test]
    async fn png_never_reaches_the_network() {
        let client = client();
        let outcome = client
            .select_file(SelectedFile::new("photo.png", "image/png", vec![0u8; 16]))
            .await;

        assert!(matches!(outcome, UploadOutcome::Rejected(ClientError::UnsupportedType { .. })));
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 0);

        let view = client.state();
        assert_eq!(view.error, "Only PDF files are supported.");
        assert_eq!(view.file_name, "photo.png");
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn oversized_pdf_never_reaches_the_network() {
        let client = client();
        let big = SelectedFile::new("big.pdf", PDF_MEDIA_TYPE, vec![0u8; MAX_UPLOAD_BYTES + 1024 * 1024]);
        let outcome = client.select_file(big).await;

        assert!(matches!(outcome, UploadOutcome::Rejected(ClientError::TooLarge { .. })));
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.state().error, "File size exceeds 10MB limit.");
    }

    #[tokio::test]
    async fn successful_upload_shows_text() {
        let client = client();
        assert_eq!(client.select_file(pdf("a.pdf")).await, UploadOutcome::Extracted);

        let view = client.state();
        assert_eq!(view.phase(), UploadPhase::Success);
        assert_eq!(view.visible_text(), Some("text of a.pdf"));
        assert!(!view.loading);
        assert!(view.error.is_empty());
    }

    #[tokio::test]
    async fn failed_upload_shows_error_and_clears_text() {
        let client = client();
        client.select_file(pdf("a.pdf")).await;
        let outcome = client.select_file(pdf("bad.pdf")).await;

        assert!(matches!(outcome, UploadOutcome::Failed(_)));
        let view = client.state();
        assert_eq!(view.phase(), UploadPhase::Error);
        assert_eq!(view.error, "Failed to parse PDF");
        assert!(view.text.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn loading_flag_is_set_while_request_is_in_flight() {
        let client = client();
        let upload = client.select_file(pdf("slow.pdf"));
        let observe = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            client.state()
        };

        let (outcome, during) = tokio::join!(upload, observe);
        assert!(during.loading);
        assert_eq!(during.phase(), UploadPhase::Loading);
        assert_eq!(outcome, UploadOutcome::Extracted);
        assert!(!client.state().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_selection_supersedes_stale_reply() {
        let client = client();
        let first = client.select_file(pdf("slow-old.pdf"));
        let second = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            client.select_file(pdf("new.pdf")).await
        };

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first, UploadOutcome::Superseded);
        assert_eq!(second, UploadOutcome::Extracted);

        let view = client.state();
        assert_eq!(view.file_name, "new.pdf");
        assert_eq!(view.text, "text of new.pdf");
        assert!(!view.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn copy_sets_flag_for_two_seconds() {
        let client = client();
        client.select_file(pdf("a.pdf")).await;
        client.copy().unwrap();

        assert_eq!(client.clipboard.contents().as_deref(), Some("text of a.pdf"));
        assert_eq!(client.state().copy_label(), "Copied!");

        tokio::time::sleep(Duration::from_millis(1990)).await;
        assert!(client.state().copied);

        tokio::time::sleep(Duration::from_millis(20)).await;
        tokio::task::yield_now().await;
        assert!(!client.state().copied);
        assert_eq!(client.state().copy_label(), "Copy Text");
    }

    #[tokio::test]
    async fn copy_without_result_is_a_no_op() {
        let client = client();
        client.copy().unwrap();
        assert_eq!(client.clipboard.contents(), None);
        assert!(!client.state().copied);
    }

    #[tokio::test]
    async fn clear_resets_display_state() {
        let client = client();
        client.toggle_theme();
        client.select_file(pdf("a.pdf")).await;
        client.copy().unwrap();
        client.clear();

        let view = client.state();
        assert!(view.file_name.is_empty());
        assert!(view.text.is_empty());
        assert!(view.error.is_empty());
        assert!(!view.copied);
        assert_eq!(view.phase(), UploadPhase::Idle);
        // theme is orthogonal to the upload flow
        assert!(view.dark_mode);
    }

    #[tokio::test]
    async fn clear_after_failure_resets_display_state() {
        let client = client();
        client.select_file(pdf("bad.pdf")).await;
        client.clear();
        assert_eq!(client.state(), ClientViewState::default());
    }

    /// Each upload waits for a permit on the gate matching its file name.
    struct GatedTransport {
        old_gate: tokio::sync::Semaphore,
        new_gate: tokio::sync::Semaphore,
    }

    impl Transport for GatedTransport {
        async fn upload(&self, file: &SelectedFile) -> Result<String, ClientError> {
            let gate = if file.name == "old.pdf" { &self.old_gate } else { &self.new_gate };
            gate.acquire().await.map_err(|_| ClientError::generic())?.forget();
            Ok(format!("text of {}", file.name))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stale_reply_never_lands_while_newer_upload_is_in_flight() {
        for _ in 0..50 {
            let client = Arc::new(UploadClient::new(
                GatedTransport {
                    old_gate: tokio::sync::Semaphore::new(0),
                    new_gate: tokio::sync::Semaphore::new(0),
                },
                MemoryClipboard::default(),
            ));

            let old = tokio::spawn({
                let client = Arc::clone(&client);
                async move { client.select_file(pdf("old.pdf")).await }
            });
            while !client.state().loading {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }

            // Let the old reply and the new selection race for the view.
            let new = {
                let _view = client.state.lock().unwrap();
                client.transport.old_gate.add_permits(1);
                let new = tokio::spawn({
                    let client = Arc::clone(&client);
                    async move { client.select_file(pdf("new.pdf")).await }
                });
                std::thread::sleep(Duration::from_millis(20));
                new
            };

            let old_outcome = old.await.unwrap();
            assert!(matches!(old_outcome, UploadOutcome::Extracted | UploadOutcome::Superseded));

            // Wait for the new selection to be registered, whichever order won.
            while client.state().file_name != "new.pdf" {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            let during = client.state();
            assert!(during.loading, "newer upload still in flight");
            assert!(during.text.is_empty(), "stale text leaked: {:?}", during.text);

            client.transport.new_gate.add_permits(1);
            assert_eq!(new.await.unwrap(), UploadOutcome::Extracted);
            let view = client.state();
            assert_eq!(view.text, "text of new.pdf");
            assert!(!view.loading);
        }
    }

    #[test]
    fn copy_outside_runtime_copies_without_feedback() {
        let client = client();
        client.state.lock().unwrap().text = "plain text".to_string();

        client.copy().unwrap();

        assert_eq!(client.clipboard.contents().as_deref(), Some("plain text"));
        assert!(!client.state().copied);
    }
}
