use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::form::Focus;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => {
            if app.form.focus == Focus::Input {
                app.form.input.insert_str(&text);
            }
        }
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick().await,
    }
    Ok(())
}

fn is_submit(key: &KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Enter => ctrl || alt,
        KeyCode::Char('g') => ctrl,
        _ => false,
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work in any focus
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
            app.should_quit = true;
            return;
        }
        _ if is_submit(&key) => {
            if app.form.can_generate() {
                app.generate();
            }
            return;
        }
        KeyCode::Esc => {
            app.clear();
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.form.toggle_focus();
            return;
        }
        KeyCode::Char('y') if ctrl => {
            app.copy();
            return;
        }
        KeyCode::Char('s') if ctrl => {
            app.download();
            return;
        }
        _ => {}
    }

    match app.form.focus {
        Focus::Input => handle_input_key(app, key),
        Focus::Output => handle_output_key(app, key),
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    let input = &mut app.form.input;
    match key.code {
        KeyCode::Enter => input.newline(),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Up => input.move_up(),
        KeyCode::Down => input.move_down(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            input.insert_char(c);
        }
        _ => {}
    }
}

fn handle_output_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::PageDown => app.scroll_half_page_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::Char('g') => app.output_scroll = 0,
        KeyCode::Char('G') => {
            app.output_scroll = app.output_lines.saturating_sub(app.output_height);
        }
        KeyCode::Char('c') => app.copy(),
        KeyCode::Char('d') => app.download(),
        KeyCode::Char('i') => app.form.focus = Focus::Input,
        _ => {}
    }
}

fn contains(area: Option<Rect>, column: u16, row: u16) -> bool {
    area.is_some_and(|a| {
        column >= a.x && column < a.x + a.width && row >= a.y && row < a.y + a.height
    })
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(_) => {
            if contains(app.output_area, col, row) {
                app.focus_output();
            } else if contains(app.input_area, col, row) {
                app.form.focus = Focus::Input;
            }
        }
        MouseEventKind::ScrollDown if contains(app.output_area, col, row) => app.scroll_down(),
        MouseEventKind::ScrollUp if contains(app.output_area, col, row) => app.scroll_up(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};
    use crossterm::event::{KeyEventKind, KeyEventState};
    use crate::client::Generated;
    use crate::clipboard::fake::RecordingClipboard;
    use crate::config::Settings;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn test_app(clipboard: RecordingClipboard) -> App {
        // Nothing listens here; tests never let a request complete.
        let settings = Settings {
            server_url: "http://127.0.0.1:9".to_string(),
            download_dir: PathBuf::from("."),
            toast_duration: Duration::from_millis(3000),
        };
        App::new(settings, Box::new(clipboard))
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            let event = if c == '\n' {
                key(KeyCode::Enter, KeyModifiers::NONE)
            } else {
                key(KeyCode::Char(c), KeyModifiers::NONE)
            };
            handle_event(app, event).await.unwrap();
        }
    }

    fn show_output(app: &mut App) {
        app.form.input.insert_str("login");
        app.form.begin_generate().expect("submitted");
        app.form.finish_generate(
            Ok(Generated {
                gherkin: "Feature: Login".to_string(),
                filename: "a_login.feature".to_string(),
                run_id: None,
            }),
            Instant::now(),
        );
    }

    #[tokio::test]
    async fn test_typing_edits_requirement() {
        let mut app = test_app(RecordingClipboard::default());
        type_text(&mut app, "ab\nc").await;
        handle_event(&mut app, key(KeyCode::Backspace, KeyModifiers::NONE)).await.unwrap();
        assert_eq!(app.form.input.value(), "ab\n");
    }

    #[tokio::test]
    async fn test_whitespace_submit_sends_nothing() {
        let mut app = test_app(RecordingClipboard::default());
        type_text(&mut app, "  \n ").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::CONTROL)).await.unwrap();

        assert!(app.generate_task.is_none());
        assert!(!app.form.is_loading());
        assert!(app.form.error().is_some());
    }

    #[tokio::test]
    async fn test_submit_while_loading_is_ignored() {
        let mut app = test_app(RecordingClipboard::default());
        type_text(&mut app, "login").await;
        handle_event(&mut app, key(KeyCode::Char('g'), KeyModifiers::CONTROL)).await.unwrap();
        assert!(app.form.is_loading());
        assert!(app.generate_task.is_some());

        app.form.input.insert_str(" again");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::ALT)).await.unwrap();
        assert!(app.form.is_loading());
        assert_eq!(app.form.input.value(), "login again");
    }

    #[tokio::test]
    async fn test_escape_clears_everything() {
        let mut app = test_app(RecordingClipboard::default());
        show_output(&mut app);
        app.form.focus = Focus::Output;

        handle_event(&mut app, key(KeyCode::Esc, KeyModifiers::NONE)).await.unwrap();

        assert!(app.form.input.is_empty());
        assert!(app.form.output().is_none());
        assert_eq!(app.form.current_filename(), None);
        assert_eq!(app.form.focus, Focus::Input);

        handle_event(&mut app, key(KeyCode::Char('s'), KeyModifiers::CONTROL)).await.unwrap();
        assert!(app.download_task.is_none());
    }

    #[tokio::test]
    async fn test_copy_shortcut_uses_clipboard() {
        let clipboard = RecordingClipboard::default();
        let mut app = test_app(clipboard.clone());
        show_output(&mut app);

        handle_event(&mut app, key(KeyCode::Char('y'), KeyModifiers::CONTROL)).await.unwrap();
        assert_eq!(clipboard.last().as_deref(), Some("Feature: Login"));
    }

    #[tokio::test]
    async fn test_output_keys_do_not_edit_input() {
        let mut app = test_app(RecordingClipboard::default());
        show_output(&mut app);
        handle_event(&mut app, key(KeyCode::Tab, KeyModifiers::NONE)).await.unwrap();
        assert_eq!(app.form.focus, Focus::Output);

        handle_event(&mut app, key(KeyCode::Char('j'), KeyModifiers::NONE)).await.unwrap();
        assert_eq!(app.form.input.value(), "login");

        handle_event(&mut app, key(KeyCode::Char('i'), KeyModifiers::NONE)).await.unwrap();
        assert_eq!(app.form.focus, Focus::Input);
    }

    #[tokio::test]
    async fn test_arrow_keys_move_between_lines() {
        let mut app = test_app(RecordingClipboard::default());
        type_text(&mut app, "Given a user\nWhen").await;
        handle_event(&mut app, key(KeyCode::Up, KeyModifiers::NONE)).await.unwrap();
        type_text(&mut app, "!").await;
        assert_eq!(app.form.input.value(), "Give!n a user\nWhen");

        handle_event(&mut app, key(KeyCode::Down, KeyModifiers::NONE)).await.unwrap();
        assert_eq!(app.form.input.cursor_position(), (1, 4));
    }

    #[tokio::test]
    async fn test_paste_goes_to_input() {
        let mut app = test_app(RecordingClipboard::default());
        handle_event(&mut app, AppEvent::Paste("line one\r\nline two".to_string()))
            .await
            .unwrap();
        assert_eq!(app.form.input.value(), "line one\nline two");
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = test_app(RecordingClipboard::default());
        handle_event(&mut app, key(KeyCode::Char('c'), KeyModifiers::CONTROL)).await.unwrap();
        assert!(app.should_quit);
    }
}
