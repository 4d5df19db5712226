//! The session state machine.

use super::clipboard::Clipboard;
use super::state::{CopyFeedback, Phase, SessionView};
use crate::error::ControllerError;
use crate::extract::{Extractor, PageContent, normalize_blank_lines};
use crate::hint::{ClueLevel, HintClient, Transport};
use crate::render::{RenderedHint, render_markdown};
use crate::session::{KeyValueStore, SessionStore};
use tracing::{error, info, warn};

type ControllerResult<T> = std::result::Result<T, ControllerError>;

/// Wires user actions to the extractor, hint client, renderer, session
/// store and clipboard.
///
/// Actions take `&mut self`, so at most one is in flight per controller;
/// the busy check additionally refuses actions issued while a previous one
/// left the controller mid-flight.
pub struct Controller<T, S, C> {
    extractor: Extractor,
    client: HintClient<T>,
    store: SessionStore<S>,
    clipboard: C,
    phase: Phase,
    problem: String,
    level: ClueLevel,
    default_level: ClueLevel,
    hint: Option<String>,
    rendered: RenderedHint,
    last_error: Option<String>,
}

impl<T: Transport, S: KeyValueStore, C: Clipboard> Controller<T, S, C> {
    /// Creates an idle controller with an empty problem.
    pub fn new(
        extractor: Extractor,
        client: HintClient<T>,
        store: SessionStore<S>,
        clipboard: C,
    ) -> Self {
        Self {
            extractor,
            client,
            store,
            clipboard,
            phase: Phase::Idle,
            problem: String::new(),
            level: ClueLevel::default(),
            default_level: ClueLevel::default(),
            hint: None,
            rendered: RenderedHint::default(),
            last_error: None,
        }
    }

    /// Sets the level used when nothing is saved and after a reset.
    #[must_use]
    pub fn with_default_level(mut self, level: ClueLevel) -> Self {
        self.default_level = level;
        self.level = level;
        self
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current problem text.
    pub fn problem(&self) -> &str {
        &self.problem
    }

    /// Selected level.
    pub const fn level(&self) -> ClueLevel {
        self.level
    }

    /// Raw hint text, when one is shown.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Rendered hint markup (empty when no hint is shown).
    pub const fn rendered(&self) -> &RenderedHint {
        &self.rendered
    }

    /// User-facing message of the last failed action.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The clipboard collaborator.
    pub const fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// The session store.
    pub const fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Snapshot of the displayed state.
    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            problem: self.problem.clone(),
            level: self.level,
            hint: self.hint.clone(),
            rendered: self
                .hint
                .as_ref()
                .map(|_| self.rendered.as_str().to_string()),
            error: self.last_error.clone(),
        }
    }

    /// Restores the saved session.
    ///
    /// With a saved hint the controller lands in [`Phase::HintShown`] with
    /// the hint re-rendered; otherwise it stays [`Phase::Idle`] with only the
    /// problem and level restored.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Session`] if the store cannot be read.
    pub fn restore(&mut self) -> ControllerResult<()> {
        self.ensure_ready("restore")?;
        match self.store.load()? {
            Some(state) => {
                self.problem = state.problem;
                self.level = state.level;
                self.show_hint(state.hint);
            }
            None => {
                self.level = self.store.stored_level()?.unwrap_or(self.default_level);
                self.phase = Phase::Idle;
            }
        }
        info!(phase = %self.phase, level = %self.level, "restored session");
        Ok(())
    }

    /// Extracts the problem from `page`.
    ///
    /// A non-empty result replaces the problem, drops any stale hint and is
    /// persisted. An empty result leaves the problem untouched.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Busy`] while another action is in flight
    /// - [`ControllerError::ExtractionEmpty`] when nothing was found
    /// - [`ControllerError::Session`] if persisting fails
    pub fn detect(&mut self, page: &dyn PageContent) -> ControllerResult<&str> {
        self.ensure_ready("detect")?;
        self.phase = Phase::Detecting;
        self.last_error = None;

        let text = self.extractor.extract(page);
        if text.is_empty() {
            return Err(self.fail(ControllerError::ExtractionEmpty));
        }

        self.problem = text;
        self.hint = None;
        self.rendered = RenderedHint::default();
        if let Err(e) = self.store.save(&self.problem, None, self.level) {
            return Err(self.fail(e.into()));
        }

        self.phase = Phase::Idle;
        info!(len = self.problem.len(), "problem detected");
        Ok(&self.problem)
    }

    /// Replaces the problem text by hand. The text is trimmed and runs of
    /// blank lines collapse to one. A changed problem drops the shown hint.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Busy`] while another action is in flight
    /// - [`ControllerError::Session`] if persisting fails
    pub fn set_problem(&mut self, text: &str) -> ControllerResult<()> {
        self.ensure_ready("set_problem")?;
        let text = normalize_blank_lines(text);
        if text == self.problem {
            return Ok(());
        }

        self.problem = text;
        self.hint = None;
        self.rendered = RenderedHint::default();
        self.last_error = None;
        self.phase = Phase::Idle;
        self.store.save(&self.problem, None, self.level)?;
        Ok(())
    }

    /// Selects the level used for the next request.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Busy`] while another action is in flight
    /// - [`ControllerError::Session`] if persisting fails
    pub fn set_level(&mut self, level: ClueLevel) -> ControllerResult<()> {
        self.ensure_ready("set_level")?;
        self.level = level;
        self.store.save_level(level)?;
        Ok(())
    }

    /// Requests a hint for the current problem at the current level.
    ///
    /// An empty problem fails locally, clears the problem and issues no
    /// request. On success the hint is rendered, shown and persisted with
    /// its problem and level. On failure the previous problem and hint stay.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Busy`] while another action is in flight
    /// - [`ControllerError::Hint`] when validation or the request fails
    /// - [`ControllerError::Session`] if persisting fails; the hint is
    ///   still shown
    pub fn request_hint(&mut self) -> ControllerResult<&RenderedHint> {
        self.ensure_ready("request_hint")?;
        self.last_error = None;

        if self.problem.trim().is_empty() {
            self.problem.clear();
            self.hint = None;
            self.rendered = RenderedHint::default();
            return Err(self.fail(crate::error::HintError::Validation.into()));
        }

        self.phase = Phase::AwaitingHint;
        let raw = match self.client.request(&self.problem, self.level) {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.show_hint(Some(raw));
        if let Err(e) = self.store.save(&self.problem, self.hint.as_deref(), self.level) {
            let err: ControllerError = e.into();
            error!(error = %err, "failed to persist hint");
            self.last_error = Some(err.user_message());
            return Err(err);
        }

        info!(level = %self.level, "hint shown");
        Ok(&self.rendered)
    }

    /// Clears problem, hint, error and level, and empties the store.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Busy`] while another action is in flight
    /// - [`ControllerError::Session`] if clearing the store fails
    pub fn reset(&mut self) -> ControllerResult<()> {
        self.ensure_ready("reset")?;
        self.problem.clear();
        self.hint = None;
        self.rendered = RenderedHint::default();
        self.last_error = None;
        self.level = self.default_level;
        self.phase = Phase::Idle;
        self.store.clear()?;
        info!("session reset");
        Ok(())
    }

    /// Copies the plain text of the shown hint to the clipboard.
    ///
    /// Clipboard failure is reported as [`CopyFeedback::Failed`] and does
    /// not change the phase.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Busy`] while another action is in flight
    /// - [`ControllerError::NothingToCopy`] when no hint is shown
    pub fn copy(&mut self) -> ControllerResult<CopyFeedback> {
        self.ensure_ready("copy")?;
        if self.hint.is_none() {
            return Err(ControllerError::NothingToCopy);
        }

        match self.clipboard.set_text(&self.rendered.plain_text()) {
            Ok(()) => Ok(CopyFeedback::Copied),
            Err(e) => {
                warn!(error = %e, "copy failed");
                Ok(CopyFeedback::Failed)
            }
        }
    }

    fn ensure_ready(&self, action: &str) -> ControllerResult<()> {
        if self.phase.is_busy() {
            warn!(action, phase = %self.phase, "action refused while busy");
            return Err(ControllerError::Busy {
                phase: self.phase.to_string(),
            });
        }
        Ok(())
    }

    fn show_hint(&mut self, raw: Option<String>) {
        match raw {
            Some(raw) => {
                self.rendered = render_markdown(&raw);
                self.hint = Some(raw);
                self.phase = Phase::HintShown;
            }
            None => {
                self.hint = None;
                self.rendered = RenderedHint::default();
                self.phase = Phase::Idle;
            }
        }
    }

    fn fail(&mut self, err: ControllerError) -> ControllerError {
        error!(error = %err, phase = %self.phase, "action failed");
        self.phase = Phase::Error;
        self.last_error = Some(err.user_message());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::MemoryClipboard;
    use crate::error::HintError;
    use crate::extract::{LEETCODE_SELECTOR, PageSnapshot};
    use crate::hint::TransportResponse;
    use crate::session::{MemoryKeyValueStore, WriteBatch};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct QueuedTransport {
        replies: RefCell<VecDeque<std::result::Result<TransportResponse, HintError>>>,
        calls: Cell<usize>,
    }

    impl QueuedTransport {
        fn with_hints(hints: &[&str]) -> Self {
            let transport = Self::default();
            for hint in hints {
                transport.push_ok(hint);
            }
            transport
        }

        fn push_ok(&self, hint: &str) {
            let body = serde_json::json!({
                "candidates": [ { "content": { "parts": [ { "text": hint } ] } } ]
            });
            self.replies.borrow_mut().push_back(Ok(TransportResponse {
                status: 200,
                body: body.to_string(),
            }));
        }
    }

    impl Transport for QueuedTransport {
        fn post_json(
            &self,
            _url: &str,
            _body: &serde_json::Value,
        ) -> std::result::Result<TransportResponse, HintError> {
            self.calls.set(self.calls.get() + 1);
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(HintError::Transport("no scripted reply".to_string())))
        }
    }

    type TestController = Controller<QueuedTransport, MemoryKeyValueStore, MemoryClipboard>;

    fn controller_with(transport: QueuedTransport, store: MemoryKeyValueStore) -> TestController {
        Controller::new(
            Extractor::with_default_adapters(),
            HintClient::new(transport, "http://proxy/v1/generate"),
            SessionStore::new(store),
            MemoryClipboard::new(),
        )
    }

    fn controller(hints: &[&str]) -> TestController {
        controller_with(QueuedTransport::with_hints(hints), MemoryKeyValueStore::new())
    }

    fn leetcode_page(text: &str) -> PageSnapshot {
        PageSnapshot::new().with_container(LEETCODE_SELECTOR, text)
    }

    fn calls(c: &TestController) -> usize {
        c.client.transport().calls.get()
    }

    #[test]
    fn test_detect_populates_problem() {
        let mut c = controller(&[]);
        let problem = c.detect(&leetcode_page("Add two numbers.\n\n\n\nReturn the sum.")).unwrap();
        assert_eq!(problem, "Add two numbers.\n\nReturn the sum.");
        assert_eq!(c.phase(), Phase::Idle);

        let saved = c.store().load().unwrap().unwrap();
        assert_eq!(saved.problem, "Add two numbers.\n\nReturn the sum.");
        assert_eq!(saved.hint, None);
    }

    #[test]
    fn test_detect_empty_keeps_problem() {
        let mut c = controller(&[]);
        c.set_problem("typed by hand").unwrap();
        let err = c.detect(&PageSnapshot::new()).unwrap_err();
        assert_eq!(err, ControllerError::ExtractionEmpty);
        assert_eq!(c.phase(), Phase::Error);
        assert_eq!(c.problem(), "typed by hand");
        assert!(c.last_error().unwrap().contains("No problem description found"));
    }

    #[test]
    fn test_set_problem_normalizes_text() {
        let mut c = controller(&[]);
        c.set_problem("  Reverse a list.\n\n\n\nIn place.\n").unwrap();
        assert_eq!(c.problem(), "Reverse a list.\n\nIn place.");
        assert_eq!(
            c.store().load().unwrap().unwrap().problem,
            "Reverse a list.\n\nIn place."
        );
    }

    #[test]
    fn test_request_hint_success() {
        let mut c = controller(&["Use a **hash map**."]);
        c.set_problem("Two Sum").unwrap();
        c.set_level(ClueLevel::AlgorithmFocus).unwrap();
        let rendered = c.request_hint().unwrap();
        assert_eq!(rendered.as_str(), "Use a <strong>hash map</strong>.");
        assert_eq!(c.phase(), Phase::HintShown);
        assert_eq!(c.hint(), Some("Use a **hash map**."));

        let saved = c.store().load().unwrap().unwrap();
        assert_eq!(saved.problem, "Two Sum");
        assert_eq!(saved.hint.as_deref(), Some("Use a **hash map**."));
        assert_eq!(saved.level, ClueLevel::AlgorithmFocus);
    }

    #[test]
    fn test_request_hint_empty_problem() {
        let mut c = controller(&["unused"]);
        c.set_problem("   ").unwrap();
        let err = c.request_hint().unwrap_err();
        assert_eq!(err, ControllerError::Hint(HintError::Validation));
        assert_eq!(c.phase(), Phase::Error);
        assert_eq!(c.problem(), "");
        assert_eq!(calls(&c), 0);
    }

    #[test]
    fn test_request_hint_failure_keeps_previous_hint() {
        let mut c = controller(&["first hint"]);
        c.set_problem("p").unwrap();
        c.request_hint().unwrap();

        let err = c.request_hint().unwrap_err();
        assert!(matches!(err, ControllerError::Hint(HintError::Transport(_))));
        assert_eq!(c.phase(), Phase::Error);
        assert_eq!(c.problem(), "p");
        assert_eq!(c.hint(), Some("first hint"));
        assert!(c.last_error().unwrap().starts_with("Network error"));
    }

    #[test]
    fn test_restore_with_hint() {
        let mut session = SessionStore::new(MemoryKeyValueStore::new());
        session.save("p", Some("*think*"), ClueLevel::DetailedInsight).unwrap();

        let mut c = Controller::new(
            Extractor::with_default_adapters(),
            HintClient::new(QueuedTransport::default(), "http://proxy"),
            session,
            MemoryClipboard::new(),
        );
        c.restore().unwrap();
        assert_eq!(c.phase(), Phase::HintShown);
        assert_eq!(c.problem(), "p");
        assert_eq!(c.level(), ClueLevel::DetailedInsight);
        assert_eq!(c.rendered().as_str(), "<em>think</em>");
    }

    #[test]
    fn test_restore_level_only() {
        let mut store = MemoryKeyValueStore::new();
        store
            .write_batch(&WriteBatch::new().put(crate::session::KEY_LEVEL, "algorithm-focus".into()))
            .unwrap();
        let mut c = controller_with(QueuedTransport::default(), store);
        c.restore().unwrap();
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.level(), ClueLevel::AlgorithmFocus);
        assert_eq!(c.problem(), "");
    }

    #[test]
    fn test_default_level_applies_to_fresh_session_and_reset() {
        let mut c = controller(&[]).with_default_level(ClueLevel::Generic);
        c.restore().unwrap();
        assert_eq!(c.level(), ClueLevel::Generic);
        c.set_level(ClueLevel::DetailedInsight).unwrap();
        c.reset().unwrap();
        assert_eq!(c.level(), ClueLevel::Generic);
    }

    #[test]
    fn test_detect_drops_stale_hint() {
        let mut c = controller(&["old hint"]);
        c.set_problem("old").unwrap();
        c.request_hint().unwrap();
        c.detect(&leetcode_page("New problem.")).unwrap();
        assert_eq!(c.hint(), None);
        assert_eq!(c.store().load().unwrap().unwrap().hint, None);
    }

    #[test]
    fn test_reset() {
        let mut c = controller(&["h"]);
        c.set_problem("p").unwrap();
        c.set_level(ClueLevel::DetailedInsight).unwrap();
        c.request_hint().unwrap();
        c.reset().unwrap();
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.problem(), "");
        assert_eq!(c.hint(), None);
        assert_eq!(c.level(), ClueLevel::HighLevel);
        assert_eq!(c.store().load().unwrap(), None);
        assert!(c.store().backend().is_empty());
    }

    #[test]
    fn test_copy() {
        let mut c = controller(&["**Step 1**\n* sort\n* scan"]);
        assert_eq!(c.copy(), Err(ControllerError::NothingToCopy));

        c.set_problem("p").unwrap();
        c.request_hint().unwrap();
        assert_eq!(c.copy().unwrap(), CopyFeedback::Copied);
        assert_eq!(c.clipboard().contents(), Some("Step 1\nsort\nscan"));
        assert_eq!(c.phase(), Phase::HintShown);
    }

    #[test]
    fn test_copy_failure_is_feedback_only() {
        let mut c = Controller::new(
            Extractor::with_default_adapters(),
            HintClient::new(QueuedTransport::with_hints(&["h"]), "http://proxy"),
            SessionStore::new(MemoryKeyValueStore::new()),
            MemoryClipboard::failing(),
        );
        c.set_problem("p").unwrap();
        c.request_hint().unwrap();
        assert_eq!(c.copy().unwrap(), CopyFeedback::Failed);
        assert_eq!(c.phase(), Phase::HintShown);
    }

    #[test]
    fn test_busy_guard() {
        let mut c = controller(&["h"]);
        c.phase = Phase::AwaitingHint;
        assert!(matches!(
            c.detect(&leetcode_page("x")),
            Err(ControllerError::Busy { .. })
        ));
        assert!(matches!(c.request_hint(), Err(ControllerError::Busy { .. })));
        assert!(matches!(c.reset(), Err(ControllerError::Busy { .. })));
        assert_eq!(calls(&c), 0);
    }

    #[test]
    fn test_view() {
        let mut c = controller(&["`x`"]);
        c.set_problem("p").unwrap();
        assert_eq!(c.view().rendered, None);
        c.request_hint().unwrap();
        let view = c.view();
        assert_eq!(view.phase, Phase::HintShown);
        assert_eq!(view.rendered.as_deref(), Some("<code>x</code>"));
        assert_eq!(view.error, None);
    }
}
