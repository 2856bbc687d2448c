//! Terminal feedback: a busy spinner and one-line notices
//!
//! The spinner animates on its own task while a turn is in flight; its label
//! can be swapped at any time and shows up on the next frame.

use std::io::{stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

const ERASE_LINE: &str = "\x1b[2K\r";
const CURSOR_OFF: &str = "\x1b[?25l";
const CURSOR_ON: &str = "\x1b[?25h";
const CYAN: &str = "\x1b[96m";
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Symbols for the current terminal
#[derive(Debug, Clone, Copy)]
struct Glyphs {
    frames: &'static [&'static str],
    info: &'static str,
    ok: &'static str,
    warn: &'static str,
    fail: &'static str,
}

const UNICODE: Glyphs = Glyphs {
    frames: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
    info: "ℹ",
    ok: "✓",
    warn: "⚠",
    fail: "✗",
};

const ASCII: Glyphs = Glyphs {
    frames: &["|", "/", "-", "\\"],
    info: "i",
    ok: "+",
    warn: "!",
    fail: "x",
};

impl Glyphs {
    fn detect() -> Self {
        Self::for_env(|key| std::env::var(key).ok())
    }

    /// UTF-8 locales and common modern terminals get Unicode
    fn for_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let term_ok = lookup("TERM")
            .map(|t| ["xterm", "256color", "kitty"].iter().any(|k| t.contains(k)))
            .unwrap_or(false);
        let locale_ok = ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .filter_map(|k| lookup(k))
            .any(|v| v.to_lowercase().contains("utf"));

        if term_ok || locale_ok {
            UNICODE
        } else {
            ASCII
        }
    }
}

/// Animated busy indicator with a live label
pub struct Spinner {
    label: Arc<Mutex<String>>,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    glyphs: Glyphs,
}

impl Spinner {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Arc::new(Mutex::new(label.into())),
            running: Arc::new(AtomicBool::new(false)),
            task: None,
            glyphs: Glyphs::detect(),
        }
    }

    /// Begin animating; a second call while running does nothing
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let running = Arc::clone(&self.running);
        let label = Arc::clone(&self.label);
        let frames = self.glyphs.frames;

        self.task = Some(tokio::spawn(async move {
            let mut out = stdout();
            let _ = write!(out, "{}", CURSOR_OFF);

            for frame in frames.iter().cycle() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let text = label.lock().clone();
                let _ = write!(out, "{}{}{} {}{}", ERASE_LINE, CYAN, frame, text, RESET);
                let _ = out.flush();
                tokio::time::sleep(FRAME_INTERVAL).await;
            }

            let _ = write!(out, "{}{}", ERASE_LINE, CURSOR_ON);
            let _ = out.flush();
        }));
    }

    /// Stop animating and erase the spinner line
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn set_message(&self, label: impl Into<String>) {
        *self.label.lock() = label.into();
    }

    #[cfg(test)]
    pub fn message(&self) -> String {
        self.label.lock().clone()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        let mut out = stdout();
        let _ = write!(out, "{}", CURSOR_ON);
        let _ = out.flush();
    }
}

/// Colored one-line notices
pub struct StatusLine {
    glyphs: Glyphs,
}

impl StatusLine {
    pub fn new() -> Self {
        Self {
            glyphs: Glyphs::detect(),
        }
    }

    fn emit(&self, color: &str, glyph: &str, message: impl Into<String>) {
        println!("{}{} {}{}", color, glyph, message.into(), RESET);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(CYAN, self.glyphs.info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(GREEN, self.glyphs.ok, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(YELLOW, self.glyphs.warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(RED, self.glyphs.fail, message);
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn glyphs_for(pairs: &[(&str, &str)]) -> Glyphs {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Glyphs::for_env(|key| env.get(key).cloned())
    }

    #[test]
    fn test_glyph_detection() {
        assert_eq!(glyphs_for(&[("LANG", "en_US.UTF-8")]).ok, "✓");
        assert_eq!(glyphs_for(&[("TERM", "xterm-256color")]).frames.len(), 10);
        assert_eq!(glyphs_for(&[("TERM", "dumb"), ("LANG", "C")]).ok, "+");
        assert_eq!(glyphs_for(&[]).frames.len(), 4);
    }

    #[test]
    fn test_set_message_before_start() {
        let spinner = Spinner::new("Thinking...");
        spinner.set_message("Calculating...");
        assert_eq!(spinner.message(), "Calculating...");
        assert!(!spinner.is_running());
    }

    #[tokio::test]
    async fn test_spinner_updates_while_running() {
        let mut spinner = Spinner::new("Thinking...");
        spinner.start();
        assert!(spinner.is_running());
        tokio::time::sleep(Duration::from_millis(50)).await;
        spinner.set_message("Searching the web...");
        tokio::time::sleep(Duration::from_millis(100)).await;
        spinner.stop().await;
        assert!(!spinner.is_running());
        assert_eq!(spinner.message(), "Searching the web...");
    }
}
