//! Static demo dataset served when the live API is unreachable or empty.

use super::types::Interaction;
use chrono::NaiveDate;

#[allow(clippy::too_many_arguments)]
fn demo(
    id: &str,
    (year, month, day): (i32, u32, u32),
    agent_name: &str,
    issue_type: &str,
    description: &str,
    sentiment: [f64; 4],
    talk: [f64; 3],
    resolution: &str,
    coaching: &[&str],
    greeting_text: &str,
    behavior: &str,
    compliance_score: &str,
) -> Interaction {
    let [sentiment_start, sentiment_end, positive_sentiment, negative_sentiment] = sentiment;
    let [crosstalk_score, mutual_silence_score, nontalk_score] = talk;
    Interaction {
        id: id.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN),
        agent_name: agent_name.to_string(),
        issue_type: issue_type.to_string(),
        description: description.to_string(),
        sentiment_start,
        sentiment_end,
        positive_sentiment,
        negative_sentiment,
        crosstalk_score,
        mutual_silence_score,
        nontalk_score,
        resolution: resolution.to_string(),
        coaching_recommendations: coaching.iter().map(|s| s.to_string()).collect(),
        greeting_text: greeting_text.to_string(),
        has_greeting: true,
        behavior: behavior.to_string(),
        compliance_score: compliance_score.to_string(),
        transcript: None,
    }
}

/// The ten literal demo interactions.
pub fn demo_interactions() -> Vec<Interaction> {
    vec![
        demo(
            "INT-DEMO-001",
            (2024, 1, 15),
            "Sarah",
            "Technical Support",
            "Internet troubleshooting",
            [15.0, 78.0, 72.0, 28.0],
            [2.1, 8.3, 5.2],
            "Excellent recovery",
            &[
                "Great technical problem-solving approach",
                "Excellent customer empathy during frustration",
                "Consider mentoring other agents on de-escalation",
            ],
            "Thank you for calling Spectrum, this is Sarah, how can I help you today?",
            "Complete Professional Greeting",
            "Excellent",
        ),
        demo(
            "INT-DEMO-002",
            (2024, 1, 15),
            "Mike",
            "Billing Dispute",
            "Premium channel charges",
            [25.0, 92.0, 85.0, 15.0],
            [1.8, 4.2, 3.1],
            "Strong resolution",
            &[
                "Exceptional billing knowledge demonstration",
                "Strong conflict resolution skills",
                "Maintain this level of customer advocacy",
            ],
            "Good morning, Spectrum, this is Mike, what can I help you with?",
            "Professional Greeting",
            "Excellent",
        ),
        demo(
            "INT-DEMO-003",
            (2024, 1, 14),
            "Sarah",
            "Sales Success",
            "Internet upgrade",
            [45.0, 88.0, 82.0, 18.0],
            [0.9, 3.1, 2.3],
            "Consultative approach",
            &[
                "Perfect consultative selling technique",
                "Great needs assessment questions",
                "Model for other sales interactions",
            ],
            "Hi there, Spectrum, Sarah speaking, how may I assist you?",
            "Consultative Greeting",
            "Good",
        ),
        demo(
            "INT-DEMO-004",
            (2024, 1, 14),
            "Jessica",
            "Frustrated Customer",
            "Cable outages",
            [8.0, 85.0, 68.0, 32.0],
            [7.2, 12.4, 8.7],
            "Great de-escalation",
            &[
                "Outstanding de-escalation skills",
                "Work on reducing interruptions during venting",
                "Excellent empathy and solution focus",
            ],
            "Spectrum, this is Jessica, I'm here to help you today",
            "Empathetic Greeting",
            "Good",
        ),
        demo(
            "INT-DEMO-005",
            (2024, 1, 13),
            "Mike",
            "Service Transfer",
            "Moving address",
            [55.0, 78.0, 75.0, 25.0],
            [1.2, 6.8, 4.8],
            "Proactive service",
            &[
                "Good proactive service approach",
                "Consider upselling opportunities during transfers",
                "Solid process knowledge",
            ],
            "Thank you for calling Spectrum, Mike here, how can I make your day better?",
            "Personalized Greeting",
            "Good",
        ),
        demo(
            "INT-DEMO-006",
            (2024, 1, 13),
            "Jessica",
            "Chat Support",
            "Bill explanation",
            [35.0, 82.0, 78.0, 22.0],
            [0.0, 2.1, 6.2],
            "Efficient resolution",
            &[
                "Excellent chat efficiency",
                "Clear bill explanation skills",
                "Good use of screen sharing tools",
            ],
            "Hello! Welcome to Spectrum support chat. I'm Jessica and I'm ready to help!",
            "Chat Greeting",
            "Excellent",
        ),
        demo(
            "INT-DEMO-007",
            (2024, 1, 12),
            "David",
            "Service Changes",
            "Cancel cable TV",
            [42.0, 89.0, 81.0, 19.0],
            [3.4, 9.2, 7.1],
            "Value-focused retention",
            &[
                "Strong retention conversation",
                "Good value proposition presentation",
                "Reduce research time with better preparation",
            ],
            "Spectrum Communications, David speaking, what brings you in today?",
            "Casual Professional",
            "Good",
        ),
        demo(
            "INT-DEMO-008",
            (2024, 1, 12),
            "Sarah",
            "Chat Upsell",
            "Add phone service",
            [60.0, 91.0, 88.0, 12.0],
            [0.0, 1.5, 1.8],
            "Consultative sales",
            &[
                "Perfect chat-based selling approach",
                "Excellent needs discovery",
                "Great bundle value explanation",
            ],
            "Hi! Thanks for choosing Spectrum chat support. I'm Sarah - what can I help you explore today?",
            "Engaging Chat Greeting",
            "Excellent",
        ),
        demo(
            "INT-DEMO-009",
            (2024, 1, 11),
            "David",
            "WiFi Issues",
            "Coverage problems",
            [28.0, 86.0, 74.0, 26.0],
            [4.1, 18.3, 15.8],
            "Technical solution",
            &[
                "Strong technical troubleshooting",
                "Improve preparation to reduce research time",
                "Consider technical certification advancement",
            ],
            "Spectrum tech support, this is David, let's solve your connectivity issue",
            "Solution-Focused Greeting",
            "Good",
        ),
        demo(
            "INT-DEMO-010",
            (2024, 1, 11),
            "Mike",
            "Critical Issue",
            "Frequent outages",
            [5.0, 75.0, 58.0, 42.0],
            [5.8, 15.7, 12.3],
            "Escalated support",
            &[
                "Excellent crisis management",
                "Good escalation decision making",
                "Work on active listening during high emotion",
            ],
            "Spectrum Communications, Mike here, I understand you're having some serious issues - let's get this fixed",
            "Crisis-Aware Greeting",
            "Good",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_dataset_shape() {
        let data = demo_interactions();
        assert_eq!(data.len(), 10);
        let ids: HashSet<&str> = data.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), 10);
        assert!(data.iter().all(|i| !i.coaching_recommendations.is_empty()));
        assert!(data.iter().all(|i| i.metrics().iter().all(|m| m.is_finite())));
        assert_eq!(data[0].date.to_string(), "2024-01-15");
        assert_eq!(data[9].agent_name, "Mike");
    }
}
