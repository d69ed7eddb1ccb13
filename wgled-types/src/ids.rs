//! Scanned identifiers

use std::borrow::Borrow;
use std::fmt;

use crate::error::{Error, Result};

macro_rules! scan_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Build from a scanned token (trimmed, must be non-empty)
            pub fn new(raw: impl AsRef<str>) -> Result<Self> {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(Error::Validation(format!("{} must not be empty", $label)));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

scan_id!(
    /// Product catalog key (scanned from a product QR code)
    ProductId,
    "product id"
);

scan_id!(
    /// Physical RFID tag key
    TagId,
    "tag id"
);
