//! JSON parsing helpers for completion responses
//!
//! Models often wrap the payload in prose or code fences, so the JSON value
//! is located first and then validated against the response union.

use crate::error::{Error, Result};

use super::types::ExtractionResponse;

/// Longest raw excerpt kept in error messages
const RAW_EXCERPT_CHARS: usize = 200;

/// Parse an extraction response (object or array) out of raw model output
pub fn parse_extraction(response: &str) -> Result<ExtractionResponse> {
    let response = response.trim();

    let json_str = locate_json(response).ok_or_else(|| {
        Error::InvalidData(format!(
            "No JSON found in completion response | Raw: {}",
            excerpt(response)
        ))
    })?;

    serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid JSON from completion service: {} | Raw: {}",
            e,
            excerpt(json_str)
        ))
    })
}

// Span from the first opening bracket to its last matching closer
fn locate_json(response: &str) -> Option<&str> {
    let object = response.find('{');
    let array = response.find('[');

    let (start, closer) = match (object, array) {
        (Some(o), Some(a)) if a < o => (a, ']'),
        (Some(o), _) => (o, '}'),
        (None, Some(a)) => (a, ']'),
        (None, None) => return None,
    };

    let end = response.rfind(closer)?;
    (start < end).then(|| &response[start..=end])
}

fn excerpt(text: &str) -> String {
    if text.chars().count() > RAW_EXCERPT_CHARS {
        let cut: String = text.chars().take(RAW_EXCERPT_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawAmount;

    #[test]
    fn test_parse_single_object() {
        let response = r#"{"amount": 50, "type": "expense", "category": "alimentacao",
            "date": "2024-06-09", "description": "Mercado", "isSaving": false, "savingGoal": null}"#;
        match parse_extraction(response).unwrap() {
            ExtractionResponse::Single(tx) => {
                assert_eq!(tx.amount, Some(RawAmount::Number(50.0)));
                assert_eq!(tx.category.as_deref(), Some("alimentacao"));
                assert_eq!(tx.is_saving, Some(false));
            }
            other => panic!("expected single, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_array_with_surrounding_text() {
        let response = "Claro! Aqui está:\n```json\n[{\"amount\": \"1.234,56\"}, {\"amount\": 20}]\n```";
        let items = parse_extraction(response).unwrap().into_transactions();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].amount, Some(RawAmount::Text("1.234,56".into())));
    }

    #[test]
    fn test_parse_wrapped_array() {
        let response = r#"{"transactions": [{"amount": 10}, {"amount": 15}]}"#;
        match parse_extraction(response).unwrap() {
            ExtractionResponse::Wrapped { transactions } => assert_eq!(transactions.len(), 2),
            other => panic!("expected wrapped, got {:?}", other),
        }
    }

    #[test]
    fn test_object_containing_array_is_an_object() {
        let response = r#"{"amount": 10, "description": "itens [a, b]"}"#;
        assert!(matches!(
            parse_extraction(response).unwrap(),
            ExtractionResponse::Single(_)
        ));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_extraction("Desculpe, não entendi.").unwrap_err();
        assert!(err.to_string().contains("No JSON found"));

        let err = parse_extraction("{not json}").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        // An array of numbers is not a list of transactions
        assert!(parse_extraction("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_error_excerpt_is_char_safe() {
        let long = format!("{{{}", "ç".repeat(500));
        let err = parse_extraction(&format!("{}}}", long)).unwrap_err();
        assert!(err.to_string().ends_with("..."));
    }
}
