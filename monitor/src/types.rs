use serde::{Deserialize, Deserializer};

/// Status payload served by the trading backend at `/api/trading/status`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusSnapshot {
    pub account: AccountInfo,
    pub progress: Progress,
    /// Backend's live link to its broker
    pub connected: bool,
    /// Backend is running against a simulated account
    pub mock_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountInfo {
    /// Broker account number; the backend may send it as an integer
    #[serde(deserialize_with = "login_from_string_or_number")]
    pub login: String,
    pub balance: f64,
    pub equity: f64,
    /// Floating profit reported by the broker account record
    #[serde(default)]
    pub profit: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Daily goal progress as evaluated by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Progress {
    pub daily_profit: f64,
    pub daily_profit_pct: f64,
    pub target_pct: f64,
    /// Never recomputed client-side
    pub goal_reached: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LoginRepr {
    Text(String),
    Integer(i64),
    Unsigned(u64),
}

fn login_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LoginRepr::deserialize(deserializer)? {
        LoginRepr::Text(s) => s,
        LoginRepr::Integer(n) => n.to_string(),
        LoginRepr::Unsigned(n) => n.to_string(),
    })
}

#[cfg(test)]
pub(crate) fn sample_snapshot() -> StatusSnapshot {
    StatusSnapshot {
        account: AccountInfo {
            login: "demo".into(),
            balance: 1000.0,
            equity: 1005.0,
            profit: None,
            currency: None,
        },
        progress: Progress {
            daily_profit: 50.0,
            daily_profit_pct: 5.0,
            target_pct: 10.0,
            goal_reached: false,
        },
        connected: true,
        mock_mode: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_payload() {
        let body = r#"{
            "connected": true,
            "mock_mode": false,
            "account": {"login": "demo", "balance": 1000, "equity": 1005},
            "progress": {
                "daily_profit": 50,
                "daily_profit_pct": 5,
                "target_pct": 10,
                "goal_reached": false
            }
        }"#;

        let snapshot: StatusSnapshot = serde_json::from_str(body).unwrap();
        assert_eq!(snapshot, sample_snapshot());
    }

    #[test]
    fn test_integer_login_and_broker_fields() {
        let body = r#"{
            "connected": false,
            "mock_mode": true,
            "account": {
                "login": 5012345,
                "balance": 100.0,
                "equity": 98.5,
                "profit": -1.5,
                "currency": "USD",
                "leverage": 500,
                "margin_free": 98.5
            },
            "progress": {
                "daily_profit": -1.5,
                "daily_profit_pct": -1.5,
                "target_pct": 10.0,
                "goal_reached": false
            }
        }"#;

        let snapshot: StatusSnapshot = serde_json::from_str(body).unwrap();
        assert_eq!(snapshot.account.login, "5012345");
        assert_eq!(snapshot.account.profit, Some(-1.5));
        assert_eq!(snapshot.account.currency.as_deref(), Some("USD"));
        assert!(snapshot.mock_mode);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let body = r#"{
            "connected": true,
            "mock_mode": false,
            "account": {"login": "demo", "balance": 1000},
            "progress": {"daily_profit": 0, "daily_profit_pct": 0, "target_pct": 10, "goal_reached": false}
        }"#;

        assert!(serde_json::from_str::<StatusSnapshot>(body).is_err());
    }
}
