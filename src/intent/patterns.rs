use regex::Regex;

use super::types::Intent;

const CREATE_KEYWORDS: &[&str] = &[
    "add", "insert", "create", "record", "log", "enter", "save", "new", "make", "set",
    "establish", "input", "register", "spent", "bought", "paid", "cost", "expense",
    "purchase", "earned", "made", "received", "income", "got", "gained",
];

const UPDATE_KEYWORDS: &[&str] = &[
    "update", "change", "modify", "edit", "alter", "adjust", "revise", "correct", "fix",
    "amend", "set to", "change to", "increase", "decrease", "raise", "lower",
];

const DELETE_KEYWORDS: &[&str] = &[
    "delete", "remove", "erase", "clear", "drop", "cancel", "undo", "eliminate",
];

const VIEW_KEYWORDS: &[&str] = &[
    "show", "view", "display", "list", "get", "see", "find", "what", "how", "where",
    "when", "who", "which", "check", "review", "look up", "search", "query", "total",
    "sum", "calculate", "compute", "amount of",
];

const INTERROGATIVES: &[&str] = &["what", "how", "where", "when", "who", "which"];

const AMOUNT_QUESTIONS: &[&str] = &["how much", "what is", "what was"];

/// Deterministic lexical classifier. Stateless after construction; the same
/// text always yields the same label.
///
/// Classification is a precedence chain, not a scoring system: the first
/// matching rule wins, so e.g. "total my spending" resolves to View even
/// though "total" sits inside the creation-keyword step's override.
pub struct PatternMatcher {
    record_statements: Vec<Regex>,
    amount: Regex,
}

impl PatternMatcher {
    pub fn new() -> Self {
        let record_statements = [
            // Spending statements.
            r"(spent|paid|cost|bought)\s+\$?\d+",
            r"\$?\d+\s+(on|for)\s+\w+",
            r"^i\s+(spent|bought|paid|cost)\s+",
            r"\$?\d+\s+(dollars|bucks)\s+(on|for)",
            // Income statements.
            r"(earned|made|received|got)\s+\$?\d+",
            r"\$?\d+\s+from\s+\w+",
            r"\$?\d+(\.\d{2})?\s+(on|for)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("static pattern compiles"))
        .collect();

        Self {
            record_statements,
            amount: Regex::new(r"\$?\d+(\.\d{2})?").expect("static pattern compiles"),
        }
    }

    /// Whether the text is a spending or income statement, the strongest
    /// lexical signal for record creation.
    pub fn is_record_statement(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.record_statements.iter().any(|p| p.is_match(&lower))
    }

    /// Classify raw text into one of the four intents.
    pub fn classify(&self, text: &str) -> Intent {
        let lower = text.to_lowercase();

        // 1. Spending/income statements.
        if self.record_statements.iter().any(|p| p.is_match(&lower)) {
            return Intent::Create;
        }

        // 2. Delete-action keywords.
        if contains_any(&lower, DELETE_KEYWORDS) {
            return Intent::Delete;
        }

        // 3. Update-action keywords. "set up a budget" is creation, not
        //    modification.
        if contains_any(&lower, UPDATE_KEYWORDS) {
            if lower.contains("set up") || lower.contains("setup") {
                return Intent::Create;
            }
            return Intent::Update;
        }

        // 4. Creation-action keywords, unless the text is aggregate
        //    language ("add up my spending" is a summation query).
        if contains_any(&lower, CREATE_KEYWORDS) {
            if lower.contains("add up") || lower.contains("total") || lower.contains("sum") {
                return Intent::View;
            }
            return Intent::Create;
        }

        // 5. View/question keywords.
        if contains_any(&lower, VIEW_KEYWORDS) {
            return Intent::View;
        }

        // 6. A bare monetary amount: questions about amounts are views,
        //    statements default to record creation.
        if self.amount.is_match(&lower) {
            if contains_any(&lower, AMOUNT_QUESTIONS) {
                return Intent::View;
            }
            return Intent::Create;
        }

        // 7. Interrogative openers.
        if INTERROGATIVES.iter().any(|word| lower.starts_with(word)) {
            return Intent::View;
        }

        // 8. Politeness-wrapped questions.
        if lower.ends_with('?') || lower.contains("can you") || lower.contains("could you") {
            return Intent::View;
        }

        // 9. Short declarative sentences are more likely logging an event
        //    than querying.
        if lower.contains('.') || lower.split_whitespace().count() <= 10 {
            return Intent::Create;
        }

        // 10. Final fallback.
        Intent::View
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> PatternMatcher {
        PatternMatcher::new()
    }

    #[test]
    fn spending_statement_is_create() {
        assert_eq!(matcher().classify("I spent $60 on shoes"), Intent::Create);
        assert_eq!(matcher().classify("paid $30 for lunch"), Intent::Create);
        assert_eq!(matcher().classify("$45 on transportation"), Intent::Create);
    }

    #[test]
    fn income_statement_is_create() {
        assert_eq!(matcher().classify("I got $500 for my birthday"), Intent::Create);
        assert_eq!(matcher().classify("earned $200 from freelance work"), Intent::Create);
    }

    #[test]
    fn delete_keywords_win_over_later_steps() {
        assert_eq!(matcher().classify("delete my last transaction"), Intent::Delete);
        assert_eq!(matcher().classify("remove the dinner expense"), Intent::Delete);
    }

    #[test]
    fn update_keywords_classify_as_update() {
        assert_eq!(matcher().classify("change my rent budget"), Intent::Update);
        assert_eq!(matcher().classify("increase my grocery budget"), Intent::Update);
    }

    #[test]
    fn set_up_is_create_not_update() {
        // "set" alone is a creation keyword, "set to" an update keyword;
        // "set up" must override to creation.
        assert_eq!(matcher().classify("set up a budget to track rent"), Intent::Create);
    }

    #[test]
    fn aggregate_language_overrides_create_keywords() {
        assert_eq!(matcher().classify("add up my restaurant spending this week"), Intent::View);
        // "total" also appears in the view keywords, but the override in
        // the creation step must resolve it before that step is reached.
        assert_eq!(matcher().classify("total my spending"), Intent::View);
    }

    #[test]
    fn question_words_are_view() {
        assert_eq!(matcher().classify("how much did I spend this month?"), Intent::View);
        assert_eq!(matcher().classify("show my balance"), Intent::View);
    }

    #[test]
    fn keyword_matching_is_substring_based() {
        // "expenses" contains the creation keyword "expense", so this
        // resolves at the creation step before view keywords are reached.
        // Deliberate fidelity to the source heuristics.
        assert_eq!(matcher().classify("show my expenses"), Intent::Create);
    }

    #[test]
    fn amount_question_is_view_amount_statement_is_create() {
        assert_eq!(matcher().classify("how much is $60 in euros"), Intent::View);
        assert_eq!(matcher().classify("groceries $82.50"), Intent::Create);
    }

    #[test]
    fn politeness_wrapped_question_is_view() {
        assert_eq!(matcher().classify("could you pull my balance please"), Intent::View);
    }

    #[test]
    fn short_declarative_defaults_to_create() {
        assert_eq!(matcher().classify("lunch with the team yesterday"), Intent::Create);
    }

    #[test]
    fn long_unmatched_text_falls_back_to_view() {
        let text = "the quarterly numbers my accountant shared last tuesday \
                    were already reconciled by the auditing firm";
        assert_eq!(matcher().classify(text), Intent::View);
    }

    #[test]
    fn classification_is_pure() {
        let m = matcher();
        let text = "I spent $60 on shoes";
        let first = m.classify(text);
        for _ in 0..5 {
            assert_eq!(m.classify(text), first);
        }
    }
}
