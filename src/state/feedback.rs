// Notification text for sign and health-check results.

use crate::api::types::{
    BatchHealthCheckResult, BatchSignResult, HealthCheckResult, HealthStatus, SignOutcome,
    SignStatus,
};

use super::console::ConsoleLevel;

pub fn sign_feedback(outcome: &SignOutcome) -> (ConsoleLevel, String) {
    match outcome.effective_status() {
        SignStatus::Success => {
            let reward = outcome.reward_display.as_deref().unwrap_or("$0.00");
            (ConsoleLevel::Success, format!("Signed in, earned {}", reward))
        }
        SignStatus::AlreadySigned => (
            ConsoleLevel::Info,
            "Already signed today, no new reward".to_string(),
        ),
        SignStatus::Failed => {
            let message = if outcome.message.is_empty() {
                "Sign in failed".to_string()
            } else {
                outcome.message.clone()
            };
            (ConsoleLevel::Error, message)
        }
    }
}

pub fn batch_sign_feedback(result: &BatchSignResult) -> (ConsoleLevel, String) {
    (
        ConsoleLevel::Success,
        format!(
            "Sign run complete: {} succeeded, {} already signed, {} failed",
            result.success_count, result.already_signed_count, result.fail_count
        ),
    )
}

pub fn health_feedback(result: &HealthCheckResult) -> (ConsoleLevel, String) {
    match result.health_status {
        HealthStatus::Healthy => (ConsoleLevel::Success, "Account is healthy".to_string()),
        _ => {
            let reason = result
                .health_message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or("credential check failed");
            (ConsoleLevel::Warning, format!("Account unhealthy: {}", reason))
        }
    }
}

pub fn batch_health_feedback(result: &BatchHealthCheckResult) -> (ConsoleLevel, String) {
    if result.unhealthy_count > 0 {
        (
            ConsoleLevel::Warning,
            format!(
                "Health check complete: {} healthy, {} unhealthy",
                result.healthy_count, result.unhealthy_count
            ),
        )
    } else {
        (
            ConsoleLevel::Success,
            format!(
                "Health check complete: all {} accounts healthy",
                result.healthy_count
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockServer;
    use serde_json::json;

    fn outcome(value: serde_json::Value) -> SignOutcome {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sign_feedback_levels() {
        let (level, message) = sign_feedback(&outcome(
            json!({"status": "success", "reward_display": "$2.50", "message": "ok"}),
        ));
        assert_eq!(level, ConsoleLevel::Success);
        assert_eq!(message, "Signed in, earned $2.50");

        let (level, _) = sign_feedback(&outcome(json!({"message": "今日已签到"})));
        assert_eq!(level, ConsoleLevel::Info);

        let (level, message) =
            sign_feedback(&outcome(json!({"status": "failed", "message": "cookie expired"})));
        assert_eq!(level, ConsoleLevel::Error);
        assert_eq!(message, "cookie expired");
    }

    #[tokio::test]
    async fn test_sign_feedback_reports_upstream_failure() {
        let server = MockServer::start().await;
        server.on(
            "POST",
            "/accounts/1/sign",
            200,
            json!({
                "success": true,
                "message": "签到失败",
                "data": {
                    "reward_quota": 0,
                    "reward_display": "$0.00",
                    "message": "签到失败",
                    "sign_time": "2026-10-19T08:00:00"
                }
            }),
        );

        let outcome = server.client().sign_account(1).await.unwrap();
        let (level, message) = sign_feedback(&outcome);
        assert_eq!(level, ConsoleLevel::Error);
        assert_eq!(message, "签到失败");
    }

    #[test]
    fn test_batch_feedback() {
        let result: BatchSignResult = serde_json::from_value(json!({
            "total": 5, "success_count": 3, "fail_count": 1, "already_signed_count": 1, "results": []
        }))
        .unwrap();
        let (level, message) = batch_sign_feedback(&result);
        assert_eq!(level, ConsoleLevel::Success);
        assert_eq!(
            message,
            "Sign run complete: 3 succeeded, 1 already signed, 1 failed"
        );

        let health = BatchHealthCheckResult {
            healthy_count: 4,
            unhealthy_count: 0,
            results: Vec::new(),
        };
        assert_eq!(
            batch_health_feedback(&health),
            (
                ConsoleLevel::Success,
                "Health check complete: all 4 accounts healthy".to_string()
            )
        );
    }

    #[test]
    fn test_health_feedback_reason() {
        let result = HealthCheckResult {
            account_id: 1,
            health_status: HealthStatus::Unhealthy,
            health_message: None,
        };
        assert_eq!(
            health_feedback(&result).1,
            "Account unhealthy: credential check failed"
        );
    }
}
