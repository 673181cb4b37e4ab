//! Generation cycle — the Idle / Pending / Failed state of one feature page for one session.
//!
//! At most one generation is in flight per cycle. Each dispatch gets a [`Ticket`];
//! completions and failures carrying any other ticket are stale and ignored, which is
//! how a reset during a pending request discards the late continuation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::thesis::normalizer::GenerationResult;
use crate::thesis::pages::FeaturePage;
use crate::thesis::schema::TopicContext;

/// Identifies one dispatched generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CycleError {
    #[error("{0}")]
    EmptyTopic(&'static str),

    #[error("A generation is already in progress for this page")]
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleState {
    Idle,
    Pending {
        ticket: Ticket,
        started_at: DateTime<Utc>,
    },
    Failed {
        message: String,
        until: DateTime<Utc>,
    },
}

/// Observable status of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Idle,
    Pending,
    Failed,
}

/// Transient, auto-dismissing error banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBanner {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Snapshot of a cycle for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleView {
    pub page: FeaturePage,
    pub status: CycleStatus,
    pub context: TopicContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBanner>,
    pub result: Option<GenerationResult>,
}

#[derive(Debug)]
pub struct GenerationCycle {
    page: FeaturePage,
    state: CycleState,
    context: TopicContext,
    result: Option<GenerationResult>,
    next_ticket: u64,
    error_display: Duration,
}

impl GenerationCycle {
    pub fn new(page: FeaturePage, error_display: Duration) -> Self {
        Self {
            page,
            state: CycleState::Idle,
            context: TopicContext::default(),
            result: None,
            next_ticket: 0,
            error_display,
        }
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    /// Starts a generation for `ctx`.
    ///
    /// A blank topic is rejected before anything is dispatched. While a generation is
    /// pending, further submissions are no-ops. The previous result stays visible until
    /// the new one arrives, unless the topic changed.
    pub fn begin(&mut self, ctx: TopicContext, now: DateTime<Utc>) -> Result<Ticket, CycleError> {
        self.refresh(now);

        if matches!(self.state, CycleState::Pending { .. }) {
            return Err(CycleError::AlreadyPending);
        }
        if ctx.topic().is_empty() {
            return Err(CycleError::EmptyTopic(self.page.spec().empty_topic_message));
        }

        if ctx != self.context {
            self.result = None;
        }
        self.context = ctx;

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.state = CycleState::Pending {
            ticket,
            started_at: now,
        };
        Ok(ticket)
    }

    /// Stores the normalized result of `ticket`. Returns false if the ticket is stale.
    pub fn complete(&mut self, ticket: Ticket, result: GenerationResult) -> bool {
        if !self.is_pending(ticket) {
            return false;
        }
        self.result = Some(result);
        self.state = CycleState::Idle;
        true
    }

    /// Records an upstream failure of `ticket`. The previous result is left as is.
    /// Returns false if the ticket is stale.
    pub fn fail(&mut self, ticket: Ticket, message: String, now: DateTime<Utc>) -> bool {
        if !self.is_pending(ticket) {
            return false;
        }
        self.state = CycleState::Failed {
            message,
            until: now + self.error_display,
        };
        true
    }

    /// Replaces the topic and discards the result shown for the old one.
    /// A generation still pending for the old topic becomes stale.
    pub fn edit_topic(&mut self, ctx: TopicContext) {
        if ctx != self.context && matches!(self.state, CycleState::Pending { .. }) {
            self.state = CycleState::Idle;
        }
        self.context = ctx;
        self.result = None;
    }

    /// Drops `ticket` if it is still the pending one, e.g. when its request went away
    /// before the upstream answered. Returns false if the ticket is stale.
    pub fn abandon(&mut self, ticket: Ticket) -> bool {
        if !self.is_pending(ticket) {
            return false;
        }
        self.state = CycleState::Idle;
        true
    }

    /// Back to Idle with nothing shown. An in-flight generation becomes stale.
    pub fn reset(&mut self) {
        self.state = CycleState::Idle;
        self.context = TopicContext::default();
        self.result = None;
    }

    /// Clears a Failed state whose display window has elapsed.
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        if let CycleState::Failed { until, .. } = self.state {
            if now >= until {
                self.state = CycleState::Idle;
            }
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> CycleView {
        let (status, error) = match &self.state {
            CycleState::Idle => (CycleStatus::Idle, None),
            CycleState::Pending { .. } => (CycleStatus::Pending, None),
            CycleState::Failed { until, .. } if now >= *until => (CycleStatus::Idle, None),
            CycleState::Failed { message, until } => (
                CycleStatus::Failed,
                Some(ErrorBanner {
                    message: message.clone(),
                    expires_at: *until,
                }),
            ),
        };

        CycleView {
            page: self.page,
            status,
            context: self.context.clone(),
            error,
            result: self.result.clone(),
        }
    }

    fn is_pending(&self, ticket: Ticket) -> bool {
        matches!(self.state, CycleState::Pending { ticket: t, .. } if t == ticket)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Workspaces
// ────────────────────────────────────────────────────────────────────────────

/// All generation cycles, keyed by session and page. In-memory only.
///
/// The lock is held for single transitions and never across an upstream call.
#[derive(Clone)]
pub struct Workspaces {
    cycles: Arc<Mutex<HashMap<(Uuid, FeaturePage), GenerationCycle>>>,
    error_display: Duration,
}

impl Workspaces {
    pub fn new(error_display: Duration) -> Self {
        Self {
            cycles: Arc::new(Mutex::new(HashMap::new())),
            error_display,
        }
    }

    /// Runs `f` against the cycle of (`session_id`, `page`), creating it on first use.
    pub fn with_cycle<R>(
        &self,
        session_id: Uuid,
        page: FeaturePage,
        f: impl FnOnce(&mut GenerationCycle) -> R,
    ) -> R {
        let mut cycles = self
            .cycles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let cycle = cycles
            .entry((session_id, page))
            .or_insert_with(|| GenerationCycle::new(page, self.error_display));
        f(cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thesis::normalizer::normalize;

    fn cycle() -> GenerationCycle {
        GenerationCycle::new(FeaturePage::Argumentative, Duration::seconds(5))
    }

    fn result_for(raw: &str) -> GenerationResult {
        normalize(raw, "topic", FeaturePage::Argumentative.schema())
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_begin_enters_pending() {
        let mut c = cycle();
        let ticket = c.begin(TopicContext::new("AI in courts"), t0()).unwrap();
        assert_eq!(
            c.state(),
            &CycleState::Pending {
                ticket,
                started_at: t0()
            }
        );
        assert_eq!(c.view(t0()).status, CycleStatus::Pending);
    }

    #[test]
    fn test_blank_topic_is_rejected_without_dispatch() {
        let mut c = cycle();
        let err = c.begin(TopicContext::new("   "), t0()).unwrap_err();
        assert_eq!(err, CycleError::EmptyTopic("Please enter a debate topic"));
        assert_eq!(c.state(), &CycleState::Idle);
    }

    #[test]
    fn test_second_submit_while_pending_is_noop() {
        let mut c = cycle();
        let ticket = c.begin(TopicContext::new("A"), t0()).unwrap();
        assert_eq!(
            c.begin(TopicContext::new("B"), t0()),
            Err(CycleError::AlreadyPending)
        );
        // The first request is still the pending one.
        assert!(c.complete(ticket, result_for("x")));
        assert_eq!(c.view(t0()).context.topic, "A");
    }

    #[test]
    fn test_complete_returns_to_idle_with_result() {
        let mut c = cycle();
        let ticket = c.begin(TopicContext::new("A"), t0()).unwrap();
        assert!(c.complete(ticket, result_for("one\n\ntwo")));

        let view = c.view(t0());
        assert_eq!(view.status, CycleStatus::Idle);
        assert_eq!(view.result.unwrap().text("claim"), Some("two"));
    }

    #[test]
    fn test_failure_keeps_previous_result_and_auto_clears() {
        let mut c = cycle();
        let first = c.begin(TopicContext::new("A"), t0()).unwrap();
        c.complete(first, result_for("kept"));

        let second = c.begin(TopicContext::new("A"), t0()).unwrap();
        assert!(c.result().is_some(), "result stays visible while pending");
        assert!(c.fail(second, "quota exceeded".to_string(), t0()));

        let view = c.view(t0() + Duration::seconds(4));
        assert_eq!(view.status, CycleStatus::Failed);
        assert_eq!(view.error.unwrap().message, "quota exceeded");
        assert_eq!(view.result.unwrap().text("thesis"), Some("kept"));

        let later = t0() + Duration::seconds(5);
        assert_eq!(c.view(later).status, CycleStatus::Idle);
        c.refresh(later);
        assert_eq!(c.state(), &CycleState::Idle);
    }

    #[test]
    fn test_submit_allowed_while_failed() {
        let mut c = cycle();
        let ticket = c.begin(TopicContext::new("A"), t0()).unwrap();
        c.fail(ticket, "network".to_string(), t0());
        assert!(c.begin(TopicContext::new("A"), t0()).is_ok());
        assert!(c.view(t0()).error.is_none());
    }

    #[test]
    fn test_new_topic_discards_result() {
        let mut c = cycle();
        let ticket = c.begin(TopicContext::new("A"), t0()).unwrap();
        c.complete(ticket, result_for("x"));

        c.begin(TopicContext::new("B"), t0()).unwrap();
        assert!(c.result().is_none());
    }

    #[test]
    fn test_edit_topic_discards_result() {
        let mut c = cycle();
        let ticket = c.begin(TopicContext::new("A"), t0()).unwrap();
        c.complete(ticket, result_for("x"));

        c.edit_topic(TopicContext::new("A revised"));
        let view = c.view(t0());
        assert!(view.result.is_none());
        assert_eq!(view.context.topic, "A revised");
    }

    #[test]
    fn test_edit_topic_while_pending_discards_late_result() {
        let mut c = cycle();
        let ticket = c.begin(TopicContext::new("old topic"), t0()).unwrap();
        c.edit_topic(TopicContext::new("new topic"));

        assert!(!c.complete(ticket, result_for("Old topic thesis.")));
        let view = c.view(t0());
        assert_eq!(view.status, CycleStatus::Idle);
        assert_eq!(view.context.topic, "new topic");
        assert!(view.result.is_none());
    }

    #[test]
    fn test_abandon_returns_pending_ticket_to_idle() {
        let mut c = cycle();
        let first = c.begin(TopicContext::new("A"), t0()).unwrap();
        assert!(c.abandon(first));
        assert_eq!(c.state(), &CycleState::Idle);

        let second = c.begin(TopicContext::new("A"), t0()).unwrap();
        assert!(!c.abandon(first), "an old ticket leaves the newer request alone");
        assert!(c.complete(second, result_for("fresh")));
    }

    #[test]
    fn test_reset_makes_inflight_ticket_stale() {
        let mut c = cycle();
        let ticket = c.begin(TopicContext::new("A"), t0()).unwrap();
        c.reset();

        assert!(!c.complete(ticket, result_for("late")));
        assert!(!c.fail(ticket, "late".to_string(), t0()));
        let view = c.view(t0());
        assert_eq!(view.status, CycleStatus::Idle);
        assert!(view.result.is_none());
        assert_eq!(view.context, TopicContext::default());
    }

    #[test]
    fn test_old_ticket_cannot_complete_newer_request() {
        let mut c = cycle();
        let first = c.begin(TopicContext::new("A"), t0()).unwrap();
        c.reset();
        let second = c.begin(TopicContext::new("A"), t0()).unwrap();

        assert_ne!(first, second);
        assert!(!c.complete(first, result_for("stale")));
        assert!(c.complete(second, result_for("fresh")));
        assert_eq!(c.result().unwrap().text("thesis"), Some("fresh"));
    }

    #[test]
    fn test_workspaces_isolate_sessions_and_pages() {
        let workspaces = Workspaces::new(Duration::seconds(5));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        workspaces
            .with_cycle(alice, FeaturePage::Policy, |c| {
                c.begin(TopicContext::new("housing"), t0())
            })
            .unwrap();

        let bob_status = workspaces.with_cycle(bob, FeaturePage::Policy, |c| c.view(t0()).status);
        let alice_other = workspaces.with_cycle(alice, FeaturePage::Historical, |c| c.view(t0()).status);
        let alice_policy = workspaces.with_cycle(alice, FeaturePage::Policy, |c| c.view(t0()).status);

        assert_eq!(bob_status, CycleStatus::Idle);
        assert_eq!(alice_other, CycleStatus::Idle);
        assert_eq!(alice_policy, CycleStatus::Pending);
    }
}
