use std::path::PathBuf;
use std::time::Instant;

use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::client::{GenerateError, Generated, GeneratorClient};
use crate::clipboard::ClipboardSink;
use crate::config::Settings;
use crate::form::{FormController, Focus};

pub struct App {
    // Core state
    pub should_quit: bool,
    pub form: FormController,

    // Background work
    pub generate_task: Option<JoinHandle<Result<Generated, GenerateError>>>,
    pub download_task: Option<JoinHandle<anyhow::Result<PathBuf>>>,

    // First visible row of the requirement box
    pub input_scroll: u16,

    // Output pane scrolling
    pub output_scroll: u16,
    pub output_height: u16,
    pub output_lines: u16,

    // Animation state
    pub animation_frame: u8,

    // Panel areas for mouse hit-testing (updated during render)
    pub input_area: Option<Rect>,
    pub output_area: Option<Rect>,

    // Collaborators
    pub client: GeneratorClient,
    pub clipboard: Box<dyn ClipboardSink>,
    pub download_dir: PathBuf,
}

impl App {
    pub fn new(settings: Settings, clipboard: Box<dyn ClipboardSink>) -> Self {
        Self {
            should_quit: false,
            form: FormController::new(settings.toast_duration),

            generate_task: None,
            download_task: None,

            input_scroll: 0,

            output_scroll: 0,
            output_height: 0,
            output_lines: 0,

            animation_frame: 0,

            input_area: None,
            output_area: None,

            client: GeneratorClient::new(&settings.server_url),
            clipboard,
            download_dir: settings.download_dir,
        }
    }

    /// Probe `GET /health` in the background. The outcome is only logged.
    pub fn spawn_health_probe(&self) {
        let client = self.client.clone();
        tokio::spawn(async move {
            match client.health().await {
                Ok(health) => tracing::info!(status = %health.status, "service status"),
                Err(e) => tracing::warn!(error = %e, "health check failed"),
            }
        });
    }

    pub fn generate(&mut self) {
        if self.generate_task.is_some() {
            return;
        }

        let Some(requirement) = self.form.begin_generate() else {
            return;
        };

        tracing::info!(chars = requirement.chars().count(), "submitting requirement");
        self.output_scroll = 0;
        let client = self.client.clone();
        self.generate_task = Some(tokio::spawn(async move {
            client.generate(&requirement).await
        }));
    }

    pub fn clear(&mut self) {
        self.form.clear();
        self.input_scroll = 0;
        self.output_scroll = 0;
    }

    pub fn copy(&mut self) {
        self.form.copy(self.clipboard.as_mut(), Instant::now());
    }

    pub fn download(&mut self) {
        if self.download_task.is_some() {
            return;
        }

        let Some(filename) = self.form.begin_download(Instant::now()) else {
            return;
        };

        let client = self.client.clone();
        let dir = self.download_dir.clone();
        self.download_task = Some(tokio::spawn(async move {
            client.download(&filename, &dir).await
        }));
    }

    /// Collect finished background tasks and feed their results to the form.
    pub async fn poll_tasks(&mut self) {
        if self.generate_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.generate_task.take() {
                let result = task
                    .await
                    .unwrap_or_else(|e| Err(GenerateError::Network(e.to_string())));
                match &result {
                    Ok(generated) => tracing::info!(
                        filename = %generated.filename,
                        run_id = generated.run_id.as_deref().unwrap_or("-"),
                        "generation finished"
                    ),
                    Err(e) => tracing::warn!(error = %e, "generation failed"),
                }
                self.form.finish_generate(result, Instant::now());
            }
        }

        if self.download_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.download_task.take() {
                let result = task
                    .await
                    .unwrap_or_else(|e| Err(anyhow::anyhow!(e)));
                if let Err(e) = &result {
                    tracing::warn!(error = %e, "download failed");
                }
                self.form.finish_download(result, Instant::now());
            }
        }
    }

    /// Tick handler: finish tasks, expire toasts, advance the spinner.
    pub async fn tick(&mut self) {
        self.poll_tasks().await;
        self.form.tick(Instant::now());
        if self.form.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 10;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.output_scroll < self.output_lines.saturating_sub(self.output_height) {
            self.output_scroll = self.output_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half_page = self.output_height / 2;
        let max_scroll = self.output_lines.saturating_sub(self.output_height);
        self.output_scroll = (self.output_scroll + half_page).min(max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = self.output_height / 2;
        self.output_scroll = self.output_scroll.saturating_sub(half_page);
    }

    pub fn focus_output(&mut self) {
        if self.form.output().is_some() {
            self.form.focus = Focus::Output;
        }
    }
}
