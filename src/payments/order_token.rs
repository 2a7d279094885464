use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::config::OrderTokenFormat;

/// Produces the externally visible `order_id` for a new payment order.
pub trait OrderTokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// `ORD-<unix seconds>-<6 digit random>`. Collisions are possible when two
/// orders land in the same second; the store's UNIQUE constraint catches them.
#[derive(Debug, Default, Clone)]
pub struct TimestampTokenGenerator;

impl TimestampTokenGenerator {
    pub fn format(unix_secs: i64, suffix: u32) -> String {
        format!("ORD-{}-{:06}", unix_secs, suffix % 1_000_000)
    }
}

impl OrderTokenGenerator for TimestampTokenGenerator {
    fn generate(&self) -> String {
        let suffix = rand::thread_rng().gen_range(0..1_000_000);
        Self::format(Utc::now().timestamp(), suffix)
    }
}

/// `ORD-<uuid v4 without hyphens>`.
#[derive(Debug, Default, Clone)]
pub struct UuidTokenGenerator;

impl OrderTokenGenerator for UuidTokenGenerator {
    fn generate(&self) -> String {
        format!("ORD-{}", Uuid::new_v4().simple())
    }
}

pub fn generator_for(format: OrderTokenFormat) -> Arc<dyn OrderTokenGenerator> {
    match format {
        OrderTokenFormat::Uuid => Arc::new(UuidTokenGenerator),
        OrderTokenFormat::Timestamp => Arc::new(TimestampTokenGenerator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        assert_eq!(
            TimestampTokenGenerator::format(1_700_000_000, 42),
            "ORD-1700000000-000042"
        );
    }

    #[test]
    fn test_timestamp_generate_shape() {
        let token = TimestampTokenGenerator.generate();
        let parts: Vec<&str> = token.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_uuid_tokens_are_url_safe_and_distinct() {
        let a = UuidTokenGenerator.generate();
        let b = UuidTokenGenerator.generate();
        assert_ne!(a, b);
        assert!(a.starts_with("ORD-"));
        assert_eq!(a.len(), 4 + 32);
        assert!(a[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
