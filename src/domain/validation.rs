//! Pre-insert validation.
//!
//! Every rule is checked; all violations come back together so a caller can
//! show the full list at once. An empty vector means the input is valid,
//! and callers must perform no write otherwise.

use super::position::PositionDraft;
use super::trade::TradeDraft;

pub const YEAR_MIN: i32 = 2000;
pub const YEAR_MAX: i32 = 2100;

pub fn validate_trade(draft: &TradeDraft) -> Vec<String> {
    let mut messages = Vec::new();
    check_product(&draft.product, &mut messages);
    check_category(&draft.category, &mut messages);
    check_year(draft.year, &mut messages);
    check_tons(draft.tons, &mut messages);
    if draft.notion == 0.0 {
        messages.push("notion must not be zero".to_string());
    }
    if draft.level < 0.0 {
        messages.push("level must not be negative".to_string());
    }
    messages
}

pub fn validate_position(draft: &PositionDraft) -> Vec<String> {
    let mut messages = Vec::new();
    check_product(&draft.product, &mut messages);
    check_category(&draft.category, &mut messages);
    check_year(draft.year, &mut messages);
    check_tons(draft.tons, &mut messages);
    messages
}

fn check_product(product: &str, messages: &mut Vec<String>) {
    if product.trim().is_empty() {
        messages.push("product must not be empty".to_string());
    }
}

fn check_category(category: &str, messages: &mut Vec<String>) {
    if category.trim().is_empty() {
        messages.push("category must not be empty".to_string());
    }
}

fn check_year(year: i32, messages: &mut Vec<String>) {
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        messages.push(format!("year must be between {YEAR_MIN} and {YEAR_MAX}"));
    }
}

fn check_tons(tons: f64, messages: &mut Vec<String>) {
    // `!(> 0.0)` also rejects NaN.
    if !(tons > 0.0) {
        messages.push("tons must be positive".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::Operation;

    fn valid_draft() -> TradeDraft {
        TradeDraft {
            product: "SoyBean".into(),
            category: "FOB Vessel".into(),
            shipment: "Jan".into(),
            year: 2024,
            operation: Operation::Purchase,
            tons: 100.0,
            level: 1.0,
            notion: 3674.54,
        }
    }

    #[test]
    fn valid_trade_has_no_messages() {
        assert!(validate_trade(&valid_draft()).is_empty());
    }

    #[test]
    fn empty_product_rejected() {
        let mut draft = valid_draft();
        draft.product = "   ".into();
        let messages = validate_trade(&draft);
        assert_eq!(messages, vec!["product must not be empty".to_string()]);
    }

    #[test]
    fn year_bounds_inclusive() {
        for year in [2000, 2100] {
            let mut draft = valid_draft();
            draft.year = year;
            assert!(validate_trade(&draft).is_empty(), "year {year} should pass");
        }
        for year in [1999, 2101] {
            let mut draft = valid_draft();
            draft.year = year;
            assert_eq!(validate_trade(&draft).len(), 1, "year {year} should fail");
        }
    }

    #[test]
    fn zero_tons_rejected() {
        let mut draft = valid_draft();
        draft.tons = 0.0;
        assert_eq!(validate_trade(&draft), vec!["tons must be positive".to_string()]);
    }

    #[test]
    fn nan_tons_rejected() {
        let mut draft = valid_draft();
        draft.tons = f64::NAN;
        assert_eq!(validate_trade(&draft).len(), 1);
    }

    #[test]
    fn zero_notion_and_negative_level_rejected() {
        let mut draft = valid_draft();
        draft.notion = 0.0;
        draft.level = -0.5;
        let messages = validate_trade(&draft);
        assert!(messages.contains(&"notion must not be zero".to_string()));
        assert!(messages.contains(&"level must not be negative".to_string()));
    }

    #[test]
    fn all_violations_reported_together() {
        let draft = TradeDraft {
            product: "".into(),
            category: " ".into(),
            shipment: "Jan".into(),
            year: 1990,
            operation: Operation::Sale,
            tons: -4.0,
            level: -1.0,
            notion: 0.0,
        };
        assert_eq!(validate_trade(&draft).len(), 6);
    }

    #[test]
    fn position_draft_checks_tons_and_names() {
        let draft = PositionDraft {
            product: "".into(),
            category: "FOB Paper".into(),
            shipment: "Feb".into(),
            year: 2024,
            operation: Operation::Sale,
            tons: 0.0,
        };
        let messages = validate_position(&draft);
        assert_eq!(messages.len(), 2);
    }
}
