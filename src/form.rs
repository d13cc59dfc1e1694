//! UI-agnostic form state
//!
//! `FormController` owns everything the screen shows: the requirement being
//! typed, the generated artifact, the error pane, the loading flag and the
//! transient toast. Network and clipboard work happens elsewhere; callers
//! feed the outcomes back in through the `finish_*` methods.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::client::{GenerateError, Generated};
use crate::clipboard::ClipboardSink;
use crate::input::RequirementInput;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);
pub const COPY_FEEDBACK_DURATION: Duration = Duration::from_millis(2000);

pub const EMPTY_REQUIREMENT_ERROR: &str = "Please enter a requirement description";
pub const COPY_FAILED_ERROR: &str = "Failed to copy to clipboard";

pub const PLACEHOLDER: &str = "Describe your feature requirement in plain English...

Example:
As a user, I want to be able to login to the system using my email and password so that I can access my personal dashboard.

The system should validate the credentials and handle various scenarios like invalid email format, wrong password, account lockout, etc.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Output,
}

/// The displayed feature file and the name it can be downloaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub gherkin: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct FormController {
    pub input: RequirementInput,
    pub focus: Focus,
    output: Option<Artifact>,
    error: Option<String>,
    loading: bool,
    toast: Option<Toast>,
    copied_until: Option<Instant>,
    toast_duration: Duration,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl FormController {
    pub fn new(toast_duration: Duration) -> Self {
        Self {
            input: RequirementInput::new(),
            focus: Focus::Input,
            output: None,
            error: None,
            loading: false,
            toast: None,
            copied_until: None,
            toast_duration,
        }
    }

    pub fn output(&self) -> Option<&Artifact> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Filename of the displayed artifact, if any.
    pub fn current_filename(&self) -> Option<&str> {
        self.output.as_ref().map(|a| a.filename.as_str())
    }

    pub fn can_generate(&self) -> bool {
        !self.loading
    }

    pub fn can_download(&self) -> bool {
        self.current_filename().is_some()
    }

    pub fn copy_feedback_active(&self, now: Instant) -> bool {
        self.copied_until.is_some_and(|until| now < until)
    }

    /// Validate the input and enter the loading state.
    ///
    /// Returns the trimmed requirement to submit, or `None` when nothing
    /// should be sent: blank input (an error is shown) or a request already
    /// in flight.
    pub fn begin_generate(&mut self) -> Option<String> {
        if self.loading {
            return None;
        }

        let requirement = self.input.trimmed().to_string();
        if requirement.is_empty() {
            self.show_error(EMPTY_REQUIREMENT_ERROR);
            return None;
        }

        self.loading = true;
        self.error = None;
        self.hide_output();
        Some(requirement)
    }

    pub fn finish_generate(&mut self, result: Result<Generated, GenerateError>, now: Instant) {
        self.loading = false;
        match result {
            Ok(generated) => {
                self.error = None;
                self.output = Some(Artifact {
                    gherkin: generated.gherkin,
                    filename: generated.filename,
                });
                self.show_toast("BDD test cases generated successfully!", now);
            }
            Err(err) => {
                self.hide_output();
                self.show_error(err.to_string());
            }
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.hide_output();
        self.error = None;
        self.focus = Focus::Input;
    }

    pub fn copy(&mut self, clipboard: &mut dyn ClipboardSink, now: Instant) {
        let Some(artifact) = &self.output else {
            return;
        };

        match clipboard.set_text(&artifact.gherkin) {
            Ok(()) => {
                self.show_toast("Copied to clipboard!", now);
                self.copied_until = Some(now + COPY_FEEDBACK_DURATION);
            }
            Err(e) => {
                tracing::warn!(error = %e, "clipboard write failed");
                self.show_error(COPY_FAILED_ERROR);
            }
        }
    }

    /// Start a download of the displayed artifact. Returns the filename to
    /// fetch, or `None` when nothing is displayed.
    pub fn begin_download(&mut self, now: Instant) -> Option<String> {
        let filename = self.current_filename()?.to_string();
        self.show_toast("Download started!", now);
        Some(filename)
    }

    pub fn finish_download(&mut self, result: anyhow::Result<PathBuf>, now: Instant) {
        match result {
            Ok(path) => self.show_toast(format!("Saved to {}", path.display()), now),
            Err(e) => self.show_error(format!("Download failed: {}", e)),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input if self.output.is_some() => Focus::Output,
            _ => Focus::Input,
        };
    }

    /// Drop expired toasts and copy feedback.
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.toast = None;
        }
        if self.copied_until.is_some_and(|until| now >= until) {
            self.copied_until = None;
        }
    }

    pub fn show_toast(&mut self, message: impl Into<String>, now: Instant) {
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: now + self.toast_duration,
        });
    }

    fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    fn hide_output(&mut self) {
        self.output = None;
        if self.focus == Focus::Output {
            self.focus = Focus::Input;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::fake::{FailingClipboard, RecordingClipboard};

    fn generated(text: &str, filename: &str) -> Generated {
        Generated {
            gherkin: text.to_string(),
            filename: filename.to_string(),
            run_id: None,
        }
    }

    fn form_with(text: &str) -> FormController {
        let mut form = FormController::default();
        form.input.insert_str(text);
        form
    }

    fn form_with_output() -> FormController {
        let mut form = form_with("login");
        form.begin_generate().expect("submitted");
        form.finish_generate(Ok(generated("Feature: Login", "a_login.feature")), Instant::now());
        form
    }

    #[test]
    fn test_blank_input_is_not_submitted() {
        for text in ["", "   ", "\n\t \n"] {
            let mut form = form_with(text);
            assert_eq!(form.begin_generate(), None);
            assert_eq!(form.error(), Some(EMPTY_REQUIREMENT_ERROR));
            assert!(!form.is_loading());
        }
    }

    #[test]
    fn test_begin_generate_trims_and_clears_previous_state() {
        let mut form = form_with_output();
        form.input.clear();
        form.input.insert_str("  new requirement \n");

        assert_eq!(form.begin_generate().as_deref(), Some("new requirement"));
        assert!(form.is_loading());
        assert!(form.output().is_none());
        assert!(form.error().is_none());
        assert_eq!(form.current_filename(), None);
    }

    #[test]
    fn test_loading_blocks_second_submit() {
        let mut form = form_with("login");
        assert!(form.begin_generate().is_some());
        assert!(!form.can_generate());
        assert_eq!(form.begin_generate(), None);

        form.finish_generate(Err(GenerateError::Network("reset".into())), Instant::now());
        assert!(form.can_generate());
        assert!(form.begin_generate().is_some());
    }

    #[test]
    fn test_success_shows_output_and_clears_error() {
        let mut form = form_with("");
        form.begin_generate();
        assert!(form.error().is_some());

        form.input.insert_str("login");
        form.begin_generate().expect("submitted");
        let now = Instant::now();
        form.finish_generate(Ok(generated("Feature: Login", "a_login.feature")), now);

        assert!(!form.is_loading());
        assert!(form.error().is_none());
        assert_eq!(form.output().map(|a| a.gherkin.as_str()), Some("Feature: Login"));
        assert_eq!(form.current_filename(), Some("a_login.feature"));
        assert_eq!(
            form.toast().map(|t| t.message.as_str()),
            Some("BDD test cases generated successfully!")
        );
    }

    #[test]
    fn test_failure_shows_error_without_output() {
        let mut form = form_with_output();
        form.begin_generate().expect("submitted");
        form.finish_generate(
            Err(GenerateError::Rejected("Agent execution failed".into())),
            Instant::now(),
        );

        assert!(!form.is_loading());
        assert!(form.output().is_none());
        assert!(!form.can_download());
        assert_eq!(form.error(), Some("Agent execution failed"));
    }

    #[test]
    fn test_network_failure_message() {
        let mut form = form_with("login");
        form.begin_generate();
        form.finish_generate(
            Err(GenerateError::Network("connection refused".into())),
            Instant::now(),
        );
        assert_eq!(form.error(), Some("Network error: connection refused"));
    }

    #[test]
    fn test_clear_forgets_filename_and_disables_download() {
        let mut form = form_with_output();
        form.focus = Focus::Output;
        form.clear();

        assert!(form.input.is_empty());
        assert!(form.output().is_none());
        assert!(form.error().is_none());
        assert_eq!(form.focus, Focus::Input);
        assert!(!form.can_download());
        assert_eq!(form.begin_download(Instant::now()), None);
        assert!(form.toast().map_or(true, |t| t.message != "Download started!"));
    }

    #[test]
    fn test_download_returns_filename_and_toasts() {
        let mut form = form_with_output();
        let now = Instant::now();
        assert_eq!(form.begin_download(now).as_deref(), Some("a_login.feature"));
        assert_eq!(form.toast().map(|t| t.message.as_str()), Some("Download started!"));

        form.finish_download(Err(anyhow::anyhow!("File not found")), now);
        assert_eq!(form.error(), Some("Download failed: File not found"));
    }

    #[test]
    fn test_copy_writes_output_text() {
        let mut form = form_with_output();
        let mut clipboard = RecordingClipboard::default();
        let now = Instant::now();

        form.copy(&mut clipboard, now);

        assert_eq!(clipboard.last().as_deref(), Some("Feature: Login"));
        assert_eq!(form.toast().map(|t| t.message.as_str()), Some("Copied to clipboard!"));
        assert!(form.copy_feedback_active(now));
        assert!(!form.copy_feedback_active(now + COPY_FEEDBACK_DURATION));
    }

    #[test]
    fn test_copy_failure_shows_error() {
        let mut form = form_with_output();
        form.copy(&mut FailingClipboard, Instant::now());
        assert_eq!(form.error(), Some(COPY_FAILED_ERROR));
        assert!(form.output().is_some());
    }

    #[test]
    fn test_copy_without_output_is_noop() {
        let mut form = FormController::default();
        let mut clipboard = RecordingClipboard::default();
        form.copy(&mut clipboard, Instant::now());
        assert!(clipboard.last().is_none());
        assert!(form.error().is_none());
    }

    #[test]
    fn test_toast_expires_after_duration() {
        let mut form = FormController::new(Duration::from_millis(500));
        let now = Instant::now();
        form.show_toast("hello", now);

        form.tick(now + Duration::from_millis(499));
        assert!(form.toast().is_some());

        form.tick(now + Duration::from_millis(500));
        assert!(form.toast().is_none());
    }

    #[test]
    fn test_toggle_focus_requires_output() {
        let mut form = FormController::default();
        form.toggle_focus();
        assert_eq!(form.focus, Focus::Input);

        let mut form = form_with_output();
        form.toggle_focus();
        assert_eq!(form.focus, Focus::Output);
        form.toggle_focus();
        assert_eq!(form.focus, Focus::Input);
    }
}
