use serde_json::Value;

/// Emits a business event on the `audit` tracing target.
///
/// The remote store has no audit collection, so audit events go to the log
/// pipeline only.
pub fn log_audit(user_id: Option<&str>, action: &str, resource: Option<&str>, metadata: Option<Value>) {
    let metadata = metadata.unwrap_or_default();
    tracing::info!(
        target: "audit",
        user_id = user_id.unwrap_or("-"),
        action,
        resource = resource.unwrap_or("-"),
        metadata = %metadata,
        "audit event"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_accepts_missing_and_present_metadata() {
        log_audit(None, "contact_submit", None, None);
        log_audit(
            Some("7"),
            "cart_add",
            Some("cart"),
            Some(serde_json::json!({ "product_id": "3", "quantity": 2 })),
        );
    }
}
