//! Presentation values derived from a status snapshot.
//!
//! Everything here is pure: the same state always yields the same screen.

use crate::controller::{Phase, UiState};
use crate::types::{AccountInfo, Progress, StatusSnapshot};
use chrono::{DateTime, Local};

/// Values the renderer shows next to the raw snapshot fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedView {
    /// Progress bar fill, always within [0, 100]
    pub percentage: f64,
    /// Currency amount the daily target corresponds to
    pub target_amount: f64,
    pub goal_banner_visible: bool,
}

/// Progress bar fill for `current` out of `target`, clamped to [0, 100].
/// A zero, negative or non-finite target, or a non-finite `current`, gives 0.
pub fn percentage(current: f64, target: f64) -> f64 {
    if !current.is_finite() || !target.is_finite() || target <= 0.0 {
        return 0.0;
    }
    (current / target * 100.0).clamp(0.0, 100.0)
}

pub fn target_amount(balance: f64, target_pct: f64) -> f64 {
    let amount = balance * (target_pct / 100.0);
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

pub fn derive(snapshot: &StatusSnapshot) -> DerivedView {
    let progress = &snapshot.progress;
    DerivedView {
        percentage: percentage(progress.daily_profit_pct, progress.target_pct),
        target_amount: target_amount(snapshot.account.balance, progress.target_pct),
        goal_banner_visible: progress.goal_reached,
    }
}

/// Read-only data for a dashboard that has a snapshot to show
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub account: AccountInfo,
    pub progress: Progress,
    pub connected: bool,
    pub mock_mode: bool,
    pub derived: DerivedView,
    pub updated_at: Option<DateTime<Local>>,
}

/// What the rendering layer should draw
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// No fetch has resolved yet
    Loading,
    /// Fetches have resolved but none succeeded
    Unreachable,
    Dashboard(Box<DashboardView>),
}

impl Screen {
    pub fn from_state(state: &UiState) -> Self {
        match (state.phase, &state.last_snapshot) {
            (_, Some(snapshot)) => Screen::Dashboard(Box::new(DashboardView {
                account: snapshot.account.clone(),
                progress: snapshot.progress.clone(),
                connected: snapshot.connected,
                mock_mode: snapshot.mock_mode,
                derived: derive(snapshot),
                updated_at: state.last_success_at,
            })),
            (Phase::Loading, None) => Screen::Loading,
            (Phase::Ready, None) => Screen::Unreachable,
        }
    }
}
