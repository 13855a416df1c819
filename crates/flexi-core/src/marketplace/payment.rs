use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: u64,
    #[serde(deserialize_with = "crate::amount::deserialize")]
    pub amount: f64,
    #[serde(default, deserialize_with = "crate::amount::deserialize")]
    pub platform_fee: f64,
    #[serde(default, deserialize_with = "crate::amount::deserialize")]
    pub net_amount: f64,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
}

/// Answer of `payments/earnings/summary/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsSummary {
    #[serde(default, deserialize_with = "crate::amount::deserialize")]
    pub total_earned: f64,
    #[serde(default, deserialize_with = "crate::amount::deserialize_option")]
    pub pending_amount: Option<f64>,
    #[serde(default, deserialize_with = "crate::amount::deserialize_option")]
    pub available_amount: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_history_entry() {
        let payment: Payment = serde_json::from_str(
            r#"{"id": 9, "amount": "250.00", "platform_fee": "25.00", "net_amount": "225.00", "status": "completed"}"#,
        )
        .unwrap();
        assert_eq!(payment.amount, 250.0);
        assert_eq!(payment.status, PaymentStatus::Completed);
    }

    #[test]
    fn test_summary_defaults() {
        let summary: EarningsSummary = serde_json::from_str(r#"{"total_earned": 1200}"#).unwrap();
        assert_eq!(summary.total_earned, 1200.0);
        assert!(summary.pending_amount.is_none());
    }
}
