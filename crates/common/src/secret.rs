//! Secret types for values that must not show up in logs or `Debug` output.
//!
//! Meeting passwords travel through fixtures, mock requests and tracing spans.
//! Holding them as [`SecretString`] means any struct deriving `Debug` that
//! embeds one prints `[REDACTED]` instead of the password, while the builder
//! still reaches the value through [`ExposeSecret::expose_secret`] when it
//! assembles the query string for the mock server.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct RoomPasswords {
//!     attendee: SecretString,
//!     moderator: SecretString,
//! }
//!
//! let passwords = RoomPasswords {
//!     attendee: SecretString::from("ap"),
//!     moderator: SecretString::from("mp"),
//! };
//!
//! assert!(format!("{passwords:?}").contains("REDACTED"));
//! assert_eq!(passwords.moderator.expose_secret(), "mp");
//! ```

pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("mp");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("\"mp\""));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("attendee-pass");
        assert_eq!(secret.expose_secret(), "attendee-pass");
    }

    #[test]
    fn test_struct_with_password_is_safe() {
        #[allow(dead_code)]
        #[derive(Debug)]
        struct Room {
            name: String,
            moderator_password: SecretString,
        }

        let room = Room {
            name: "Weekly seminar".to_string(),
            moderator_password: SecretString::from("super-secret"),
        };

        let debug_str = format!("{room:?}");

        assert!(debug_str.contains("Weekly seminar"));
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super-secret"));
    }

    #[test]
    fn test_clone_works() {
        let secret = SecretString::from("cloneable");
        let cloned = secret.clone();
        assert_eq!(cloned.expose_secret(), "cloneable");
    }
}
