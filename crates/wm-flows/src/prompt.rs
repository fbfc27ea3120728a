use std::fmt::Write as _;

use wm_model::records::{Language, Mood};
use wm_model::snapshot::FinancialSnapshot;

pub(crate) const PERSONA: &str = "You are the Wealth Map coach, a warm and practical personal \
finance mentor. Ground every suggestion in the user's own numbers. Never recommend specific \
securities and never promise returns.";

pub(crate) fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::En => "Respond in English.",
        Language::Es => "Responde siempre en español.",
    }
}

fn mood_hint(mood: Mood) -> &'static str {
    match mood {
        Mood::Great | Mood::Good => "The user feels positive about money today.",
        Mood::Neutral => "The user feels neutral about money today.",
        Mood::Low | Mood::Stressed => {
            "The user feels low or stressed about money today; be gentle and reassuring."
        }
    }
}

pub(crate) fn system_prompt(language: Language, mood: Option<Mood>) -> String {
    let mut system = format!("{PERSONA} {}", language_instruction(language));
    if let Some(mood) = mood {
        system.push(' ');
        system.push_str(mood_hint(mood));
    }
    system
}

/// Plain-text digest of a snapshot. Reflections left blank are skipped.
pub(crate) fn describe_snapshot(snapshot: &FinancialSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name: {}", snapshot.user_name);

    let totals = wm_model::ledger::totals(&snapshot.transactions);
    let _ = writeln!(
        out,
        "Income: {:.2}, expenses: {:.2}, balance: {:.2} across {} transactions.",
        totals.income,
        totals.expense,
        totals.balance,
        snapshot.transactions.len()
    );

    if snapshot.goals.is_empty() {
        let _ = writeln!(out, "Goals: none yet.");
    } else {
        let _ = writeln!(out, "Goals:");
        for goal in &snapshot.goals {
            let _ = writeln!(
                out,
                "- {} ({}): {:.2} of {:.2} by {}",
                goal.name, goal.importance, goal.current_amount, goal.target_amount, goal.target_date
            );
        }
    }

    if !snapshot.wealth_wheel.is_empty() {
        let wheel = snapshot
            .wealth_wheel
            .iter()
            .map(|entry| format!("{} {}/10", entry.label, entry.value))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "Wealth wheel: {wheel}");
    }

    for reflection in snapshot
        .reflections
        .iter()
        .filter(|r| !r.content.trim().is_empty())
    {
        let _ = writeln!(out, "{}: {}", reflection.prompt, reflection.content.trim());
    }

    if !snapshot.investments.is_empty() {
        let _ = writeln!(out, "Investments:");
        for investment in &snapshot.investments {
            let _ = writeln!(
                out,
                "- {} ({}): {:.2}, expected return {}%",
                investment.name, investment.kind, investment.amount, investment.expected_return
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_model::records::{Goal, Importance, Reflection};

    #[test]
    fn spanish_snapshot_switches_instruction() {
        let system = system_prompt(Language::Es, Some(Mood::Stressed));
        assert!(system.contains("español"));
        assert!(system.contains("gentle"));
    }

    #[test]
    fn digest_skips_blank_reflections() {
        let snapshot = FinancialSnapshot {
            user_name: "Ana".into(),
            goals: vec![Goal {
                id: "1".into(),
                name: "Emergency fund".into(),
                target_amount: 3000.0,
                current_amount: 500.0,
                target_date: "2027-01-01".into(),
                importance: Importance::High,
            }],
            reflections: vec![
                Reflection {
                    id: "wins".into(),
                    prompt: "Recent wins".into(),
                    content: "Paid off a card".into(),
                },
                Reflection {
                    id: "worries".into(),
                    prompt: "Worries".into(),
                    content: "   ".into(),
                },
            ],
            ..FinancialSnapshot::default()
        };
        let digest = describe_snapshot(&snapshot);
        assert!(digest.contains("Emergency fund (high): 500.00 of 3000.00"));
        assert!(digest.contains("Recent wins: Paid off a card"));
        assert!(!digest.contains("Worries"));
    }
}
