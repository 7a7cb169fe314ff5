//! Liveness and readiness probes for the edge server.
//!
//! Probes sit outside the route guard, so they never redirect.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use tracing::debug;

/// Lifecycle phase reported by the probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePhase {
    /// Listener not yet bound.
    Starting,
    /// Accepting navigations.
    Serving,
    /// Shutting down; liveness fails fast.
    Draining,
}

impl EdgePhase {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Serving,
            2 => Self::Draining,
            _ => Self::Starting,
        }
    }
}

/// Shared lifecycle flag read by the probe handlers.
#[derive(Debug)]
pub struct HealthState {
    phase: AtomicU8,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            phase: AtomicU8::new(EdgePhase::Starting as u8),
        }
    }
}

impl HealthState {
    /// Start in [`EdgePhase::Starting`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter [`EdgePhase::Serving`] once the listener is bound.
    pub fn mark_ready(&self) {
        let swapped = self.phase.compare_exchange(
            EdgePhase::Starting as u8,
            EdgePhase::Serving as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        // A draining edge never comes back.
        if swapped.is_err() {
            debug!(phase = ?self.phase(), "ready mark ignored");
        }
    }

    /// Enter [`EdgePhase::Draining`].
    pub fn begin_draining(&self) {
        self.phase.store(EdgePhase::Draining as u8, Ordering::Release);
    }

    /// Current phase.
    pub fn phase(&self) -> EdgePhase {
        EdgePhase::from_u8(self.phase.load(Ordering::Acquire))
    }
}

#[derive(Serialize)]
struct ProbeBody {
    phase: EdgePhase,
}

fn probe_response(ok: bool, phase: EdgePhase) -> HttpResponse {
    let mut response = if ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ProbeBody { phase })
}

/// Readiness probe: 200 only while serving.
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    let phase = state.phase();
    probe_response(phase == EdgePhase::Serving, phase)
}

/// Liveness probe: 200 until draining starts.
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    let phase = state.phase();
    probe_response(phase != EdgePhase::Draining, phase)
}
