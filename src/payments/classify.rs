//! Keyword heuristic deciding whether a message snippet reads like a
//! payment notification.

/// Words describing money having moved
pub const ACTION_KEYWORDS: [&str; 3] = ["paid", "credited", "received"];

/// Words describing how it moved
pub const CHANNEL_KEYWORDS: [&str; 3] = ["upi", "card", "transaction"];

/// A snippet is payment evidence when it mentions at least one action
/// keyword and at least one channel keyword, ignoring case.
pub fn is_payment_evidence(snippet: &str) -> bool {
    let snippet = snippet.to_lowercase();
    let mentions_action = ACTION_KEYWORDS.iter().any(|k| snippet.contains(k));
    let mentions_channel = CHANNEL_KEYWORDS.iter().any(|k| snippet.contains(k));
    mentions_action && mentions_channel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_accepts_each_action_keyword_with_a_channel() {
        assert!(is_payment_evidence("You paid Rs 100 via UPI"));
        assert!(is_payment_evidence("Rs 100 credited via UPI"));
        assert!(is_payment_evidence("Rs 100 received via UPI"));
    }

    #[test]
    fn it_accepts_each_channel_keyword_with_an_action() {
        assert!(is_payment_evidence("Paid using UPI"));
        assert!(is_payment_evidence("Paid using your card ending 1234"));
        assert!(is_payment_evidence("Paid, transaction ref 998877"));
    }

    #[test]
    fn it_rejects_action_keywords_alone() {
        assert!(!is_payment_evidence("Invoice paid"));
        assert!(!is_payment_evidence("Refund credited to wallet"));
        assert!(!is_payment_evidence("We received your request"));
    }

    #[test]
    fn it_rejects_channel_keywords_alone() {
        assert!(!is_payment_evidence("Link your UPI id"));
        assert!(!is_payment_evidence("Your new card has shipped"));
        assert!(!is_payment_evidence("Transaction alerts are now enabled"));
    }

    #[test]
    fn it_rejects_snippets_without_any_keyword() {
        assert!(!is_payment_evidence("Lunch tomorrow?"));
        assert!(!is_payment_evidence(""));
    }

    #[test]
    fn it_ignores_case() {
        assert!(is_payment_evidence("RECEIVED VIA CARD"));
        assert!(is_payment_evidence("CrEdItEd, TrAnSaCtIoN 12"));
    }

    #[test]
    fn it_matches_keywords_inside_longer_words() {
        // Substring match, not word match
        assert!(is_payment_evidence("prepaid cards"));
    }
}
