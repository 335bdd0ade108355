//! Display collaborator
//!
//! The campaign loop never renders anything itself. It reports errors,
//! summaries and questions through [`GameDisplay`].

/// User-facing surface consumed by the campaign loop.
pub trait GameDisplay {
    /// Whether video output is faked (no window, no interaction).
    ///
    /// Headless mode only suppresses side effects such as linger; it never
    /// changes which path the campaign takes.
    fn is_headless(&self) -> bool;

    /// Show an error dialog.
    fn show_error(&mut self, message: &str);

    /// Show a message that needs no answer.
    fn show_transient_message(&mut self, title: &str, body: &str);

    /// Ask a yes/no question. Returns true for "yes".
    fn show_yes_no(&mut self, title: &str, body: &str) -> bool;
}

/// Display for headless runs: logs everything and answers questions with a fixed choice.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessDisplay {
    answer: bool,
}

impl HeadlessDisplay {
    /// Create a headless display answering every yes/no question with `answer`.
    pub fn new(answer: bool) -> Self {
        Self { answer }
    }
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GameDisplay for HeadlessDisplay {
    fn is_headless(&self) -> bool {
        true
    }

    fn show_error(&mut self, message: &str) {
        tracing::error!("{message}");
    }

    fn show_transient_message(&mut self, title: &str, body: &str) {
        tracing::info!(title, "{body}");
    }

    fn show_yes_no(&mut self, title: &str, body: &str) -> bool {
        tracing::info!(title, answer = self.answer, "{body}");
        self.answer
    }
}
