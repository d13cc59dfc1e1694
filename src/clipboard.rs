use anyhow::{anyhow, Result};

/// Destination for copied output text.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The system clipboard, opened on first use and held open.
/// On X11 the copied contents disappear once the handle is dropped.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| anyhow!("Clipboard unavailable: {}", e))?;
            self.inner = Some(clipboard);
        }
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| anyhow!("Clipboard unavailable"))?;
        clipboard.set_text(text.to_string())?;
        Ok(())
    }
}
