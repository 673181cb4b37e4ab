//! Axum route handlers for the thesis generator pages.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::SessionContext;
use crate::state::AppState;
use crate::thesis::cycle::{CycleView, Ticket, Workspaces};
use crate::thesis::normalizer::{normalize_with, GenerationResult};
use crate::thesis::pages::{ExamplePrompt, FeaturePage, ResponseFormat};
use crate::thesis::schema::{SectionShape, TopicContext};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub page: FeaturePage,
    pub title: &'static str,
    pub tagline: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SectionInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub shape: SectionShape,
}

#[derive(Debug, Serialize)]
pub struct PageDetail {
    pub page: FeaturePage,
    pub title: &'static str,
    pub tagline: &'static str,
    pub format: ResponseFormat,
    pub sections: Vec<SectionInfo>,
    pub examples: &'static [ExamplePrompt],
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub raw: String,
    #[serde(flatten)]
    pub context: TopicContext,
}

/// Returns a pending ticket to Idle if its request is dropped before the upstream answers.
struct PendingGuard {
    workspaces: Workspaces,
    session_id: Uuid,
    page: FeaturePage,
    ticket: Option<Ticket>,
}

impl PendingGuard {
    fn disarm(&mut self) {
        self.ticket = None;
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let abandoned = self
                .workspaces
                .with_cycle(self.session_id, self.page, |cycle| cycle.abandon(ticket));
            if abandoned {
                warn!(
                    "{} request for session {} dropped while pending",
                    self.page, self.session_id
                );
            }
        }
    }
}

fn parse_page(slug: &str) -> Result<FeaturePage, AppError> {
    slug.parse::<FeaturePage>().map_err(AppError::NotFound)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(State(state): State<AppState>) -> Json<SessionContext> {
    let session = state.sessions.create();
    info!("Created session {}", session.id);
    Json(session)
}

/// GET /api/v1/pages
pub async fn handle_list_pages() -> Json<Vec<PageSummary>> {
    Json(
        FeaturePage::ALL
            .into_iter()
            .map(|page| PageSummary {
                page,
                title: page.spec().title,
                tagline: page.spec().tagline,
            })
            .collect(),
    )
}

/// GET /api/v1/pages/:slug
pub async fn handle_get_page(Path(slug): Path<String>) -> Result<Json<PageDetail>, AppError> {
    let page = parse_page(&slug)?;
    let spec = page.spec();

    Ok(Json(PageDetail {
        page,
        title: spec.title,
        tagline: spec.tagline,
        format: spec.format,
        sections: spec
            .schema
            .sections()
            .iter()
            .map(|s| SectionInfo {
                key: s.key,
                label: s.label,
                shape: s.shape(),
            })
            .collect(),
        examples: spec.examples,
    }))
}

/// POST /api/v1/pages/:slug/normalize
///
/// Normalizes a caller-supplied payload against the page schema. Stateless.
pub async fn handle_normalize(
    Path(slug): Path<String>,
    Json(request): Json<NormalizeRequest>,
) -> Result<Json<GenerationResult>, AppError> {
    let page = parse_page(&slug)?;
    Ok(Json(normalize_with(
        &request.raw,
        &request.context,
        page.schema(),
    )))
}

/// POST /api/v1/pages/:slug/generate
///
/// Idle → Pending → (upstream) → Idle with a new result, or Failed with a banner.
/// Blank topics are rejected before dispatch; a second submit while pending is a no-op (409).
pub async fn handle_generate(
    State(state): State<AppState>,
    session: SessionContext,
    Path(slug): Path<String>,
    Json(context): Json<TopicContext>,
) -> Result<Json<CycleView>, AppError> {
    let page = parse_page(&slug)?;

    let ticket = state.workspaces.with_cycle(session.id, page, |cycle| {
        cycle.begin(context.clone(), Utc::now())
    })?;
    let mut guard = PendingGuard {
        workspaces: state.workspaces.clone(),
        session_id: session.id,
        page,
        ticket: Some(ticket),
    };

    let task_template = page.task_template(&context);
    info!(
        "Dispatching {} generation for session {}: {:?}",
        page,
        session.id,
        context.topic()
    );

    let outcome = state.generator.generate(&task_template, context.topic()).await;
    guard.disarm();

    match outcome {
        Ok(raw) => {
            let result = normalize_with(&raw, &context, page.schema());
            if !result.is_complete() {
                info!(
                    "{} result filled {} section(s) with defaults: {:?}",
                    page,
                    result.defaulted.len(),
                    result.defaulted
                );
            }

            let (accepted, view) = state.workspaces.with_cycle(session.id, page, |cycle| {
                let accepted = cycle.complete(ticket, result);
                (accepted, cycle.view(Utc::now()))
            });
            if !accepted {
                warn!("Discarding stale {} result for session {}", page, session.id);
            }
            Ok(Json(view))
        }
        Err(e) => {
            let message = e.to_string();
            let accepted = state.workspaces.with_cycle(session.id, page, |cycle| {
                cycle.fail(ticket, message.clone(), Utc::now())
            });
            if !accepted {
                warn!("Discarding stale {} failure for session {}", page, session.id);
            }
            Err(AppError::Generation(message))
        }
    }
}

/// GET /api/v1/pages/:slug/state
pub async fn handle_get_state(
    State(state): State<AppState>,
    session: SessionContext,
    Path(slug): Path<String>,
) -> Result<Json<CycleView>, AppError> {
    let page = parse_page(&slug)?;
    let now = Utc::now();
    let view = state.workspaces.with_cycle(session.id, page, |cycle| {
        cycle.refresh(now);
        cycle.view(now)
    });
    Ok(Json(view))
}

/// PUT /api/v1/pages/:slug/topic
///
/// Stores an edited topic and discards the result shown for the old one.
pub async fn handle_edit_topic(
    State(state): State<AppState>,
    session: SessionContext,
    Path(slug): Path<String>,
    Json(context): Json<TopicContext>,
) -> Result<Json<CycleView>, AppError> {
    let page = parse_page(&slug)?;
    let now = Utc::now();
    let view = state.workspaces.with_cycle(session.id, page, |cycle| {
        cycle.edit_topic(context);
        cycle.view(now)
    });
    Ok(Json(view))
}

/// DELETE /api/v1/pages/:slug/state
pub async fn handle_reset(
    State(state): State<AppState>,
    session: SessionContext,
    Path(slug): Path<String>,
) -> Result<Json<CycleView>, AppError> {
    let page = parse_page(&slug)?;
    let now = Utc::now();
    let view = state.workspaces.with_cycle(session.id, page, |cycle| {
        cycle.reset();
        cycle.view(now)
    });
    Ok(Json(view))
}
