use crate::view::{DashboardView, Screen};
use anyhow::Result;
use std::io::Write;

const BAR_WIDTH: usize = 30;
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Rendering layer: draws whatever screen the dashboard is in.
pub trait Renderer {
    fn render(&mut self, screen: &Screen) -> Result<()>;
}

/// Plain-text panel writer for a terminal or any other `Write`
pub struct ConsoleRenderer<W: Write> {
    out: W,
    clear: bool,
}

impl<W: Write> ConsoleRenderer<W> {
    /// `clear` redraws in place with ANSI escapes; use it only on a TTY.
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn render(&mut self, screen: &Screen) -> Result<()> {
        let mut frame = String::new();
        if self.clear {
            frame.push_str(CLEAR_SCREEN);
        }
        match screen {
            Screen::Loading => frame.push_str("Loading...\n"),
            Screen::Unreachable => frame.push_str("Error connecting to backend.\n"),
            Screen::Dashboard(view) => frame.push_str(&dashboard_panel(view)),
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

fn dashboard_panel(view: &DashboardView) -> String {
    let mut badges = Vec::new();
    if view.mock_mode {
        badges.push("[MOCK MODE]");
    }
    badges.push(if view.connected { "[CONNECTED]" } else { "[DISCONNECTED]" });

    let account = &view.account;
    let progress = &view.progress;
    let derived = &view.derived;
    let currency = account
        .currency
        .as_deref()
        .map(|c| format!(" {c}"))
        .unwrap_or_default();

    let mut lines = vec![
        format!("Trading Bot Dashboard  {}", badges.join(" ")),
        "=".repeat(48),
        "Account Info".to_string(),
        format!("  Login:    {}", account.login),
        format!("  Balance:  {}{currency}", money(account.balance)),
        format!("  Equity:   {}{currency}", money(account.equity)),
    ];
    if let Some(profit) = account.profit {
        lines.push(format!("  Floating: {}{currency}", money(profit)));
    }
    lines.push(String::new());
    lines.push(format!("Daily Goal ({}%)", progress.target_pct));
    lines.push(format!(
        "  {} Daily Profit: {:.1}%",
        progress_bar(derived.percentage),
        derived.percentage
    ));
    lines.push(format!(
        "  Current: {:<14} Target: {}",
        money(progress.daily_profit),
        money(derived.target_amount)
    ));
    if derived.goal_banner_visible {
        lines.push("  *** DAILY GOAL REACHED! TRADING STOPPED. ***".to_string());
    }
    if let Some(at) = view.updated_at {
        lines.push(String::new());
        lines.push(format!("Last update: {}", at.format("%H:%M:%S")));
    }

    let mut panel = lines.join("\n");
    panel.push('\n');
    panel
}

fn progress_bar(percentage: f64) -> String {
    let filled = ((percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let fill = if filled == BAR_WIDTH { '=' } else { '#' };
    format!(
        "[{}{}]",
        fill.to_string().repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

fn money(amount: f64) -> String {
    if amount < 0.0 && amount.abs() >= 0.005 {
        format!("-${:.2}", -amount)
    } else {
        format!("${:.2}", amount.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Phase, UiState};
    use crate::types::sample_snapshot;

    fn render_to_string(screen: &Screen) -> String {
        let mut renderer = ConsoleRenderer::new(Vec::new(), false);
        renderer.render(screen).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    fn ready_state(snapshot: crate::types::StatusSnapshot) -> UiState {
        UiState {
            phase: Phase::Ready,
            last_snapshot: Some(snapshot),
            ..UiState::default()
        }
    }

    #[test]
    fn test_loading_and_unreachable_screens() {
        assert_eq!(render_to_string(&Screen::Loading), "Loading...\n");
        let text = render_to_string(&Screen::Unreachable);
        assert!(text.contains("Error connecting to backend."));
        assert!(!text.contains("Loading"));
    }

    #[test]
    fn test_dashboard_panel() {
        let text = render_to_string(&Screen::from_state(&ready_state(sample_snapshot())));
        assert!(text.contains("[CONNECTED]"));
        assert!(!text.contains("MOCK MODE"));
        assert!(text.contains("Login:    demo"));
        assert!(text.contains("Balance:  $1000.00"));
        assert!(text.contains("Equity:   $1005.00"));
        assert!(text.contains("Daily Goal (10%)"));
        assert!(text.contains("Daily Profit: 50.0%"));
        assert!(text.contains("Current: $50.00"));
        assert!(text.contains("Target: $100.00"));
        assert!(!text.contains("GOAL REACHED"));
        assert!(!text.contains("Last update"));
    }

    #[test]
    fn test_badges_and_goal_banner() {
        let mut snapshot = sample_snapshot();
        snapshot.connected = false;
        snapshot.mock_mode = true;
        snapshot.progress.daily_profit_pct = 12.0;
        snapshot.progress.goal_reached = true;
        snapshot.account.profit = Some(-2.25);

        let text = render_to_string(&Screen::from_state(&ready_state(snapshot)));
        assert!(text.contains("[MOCK MODE] [DISCONNECTED]"));
        assert!(text.contains("Daily Profit: 100.0%"));
        assert!(text.contains(&format!("[{}]", "=".repeat(BAR_WIDTH))));
        assert!(text.contains("DAILY GOAL REACHED! TRADING STOPPED."));
        assert!(text.contains("Floating: -$2.25"));
    }

    #[test]
    fn test_progress_bar_fill() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(
            progress_bar(50.0),
            format!("[{}{}]", "#".repeat(15), "-".repeat(15))
        );
    }

    #[test]
    fn test_money_sign() {
        assert_eq!(money(-0.0), "$0.00");
        assert_eq!(money(-0.001), "$0.00");
        assert_eq!(money(-2.25), "-$2.25");
        assert_eq!(money(1000.0), "$1000.00");
    }

    #[test]
    fn test_clear_prefix() {
        let mut renderer = ConsoleRenderer::new(Vec::new(), true);
        renderer.render(&Screen::Loading).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.starts_with(CLEAR_SCREEN));
    }
}
