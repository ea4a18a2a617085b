//! Custom validators

use super::constant::ROOM_ORDERS;
use std::borrow::Cow;
use validator::ValidationError;

/// Whether a string holds nothing but whitespace
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        let mut e = ValidationError::new("not_blank");
        e.message = Some(Cow::from("must not be blank"));
        Err(e)
    } else {
        Ok(())
    }
}

pub fn validate_room_order(order: &str) -> Result<(), ValidationError> {
    validate_oneof(order, &ROOM_ORDERS)
}

/// Check whether str is one of the list
fn validate_oneof(item: &str, list: &[&str]) -> Result<(), ValidationError> {
    if list.contains(&item) {
        Ok(())
    } else {
        let mut e = ValidationError::new("validate_oneof");
        let msg = format!("must be one of {}", list.join(","));
        e.message = Some(Cow::from(msg));
        Err(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(!is_blank(" ann "));
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("lobby").is_ok());
    }

    #[test]
    fn room_orders() {
        assert!(validate_room_order("id asc").is_ok());
        assert!(validate_room_order("last_active_at desc").is_ok());
        assert!(validate_room_order("name; drop table rooms").is_err());
    }
}
