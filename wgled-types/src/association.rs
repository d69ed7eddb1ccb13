//! Tag to product association

use std::fmt;

use chrono::{DateTime, Utc};

use crate::ids::{ProductId, TagId};

/// A tag currently holding a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub tag: TagId,
    pub product: ProductId,
    /// When the tag was linked
    pub created_at: DateTime<Utc>,
}

impl Association {
    pub fn new(tag: TagId, product: ProductId) -> Self {
        Self {
            tag,
            product,
            created_at: Utc::now(),
        }
    }

    /// Time the product has been stored under this tag
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (since {})",
            self.tag,
            self.product,
            self.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_association_age() {
        let mut assoc = Association::new(TagId::new("T1").unwrap(), ProductId::new("PRD1").unwrap());
        assoc.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();

        let later = Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap();
        assert_eq!(assoc.age(later), chrono::Duration::minutes(90));
        assert_eq!(assoc.to_string(), "T1 -> PRD1 (since 2024-01-01 08:00:00)");
    }
}
