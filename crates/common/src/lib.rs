//! Shared building blocks for the dailyfresh workspace: wire types, logging
//! setup and startup environment checks.

pub mod types;
pub mod utils;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok();
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn health_serializes_status_field() {
        let json = serde_json::to_value(types::Health::ok()).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok"}));
    }
}
