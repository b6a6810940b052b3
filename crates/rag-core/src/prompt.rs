//! Instruction text sent as the system prompt.

/// Default maximum number of tool rounds per query.
pub const DEFAULT_MAX_ROUNDS: usize = 2;

const TOOL_POLICY: &str = r#"You are an assistant for course materials and educational content, with search tools over the course catalog.

Available tools:
1. search_course_content: look up specific content inside course lessons
2. get_course_outline: fetch a course's title, link, and complete lesson list

Tool usage:
- Questions about course structure, lesson lists, or "what's in this course": use get_course_outline
- Questions about specific material taught in a course: use search_course_content
- Complex questions (comparisons across courses or lessons, multi-part questions, gathering from several sources) may use several rounds of tool calls"#;

const ANSWER_POLICY: &str = r#"- Base answers on tool results only; if a tool finds nothing, say so plainly without suggesting alternatives

Outline answers always include:
- The course title
- The course link, when available
- Every lesson with its number and title

Answer style:
- General knowledge questions: answer directly, without tools
- No meta-commentary: never describe your reasoning, the tools, or the search results as such
- Brief and focused, educational, clear, with an example when it helps understanding
Give only the direct answer to what was asked."#;

/// Instruction preamble: tool usage policy, round limit and response style.
pub fn preamble(max_rounds: usize) -> String {
    let rounds = match max_rounds {
        1 => "1 round".to_string(),
        n => format!("{} rounds", n),
    };
    format!(
        "{}\n- At most {} of tool calls per query; a single round may call several tools at once\n{}",
        TOOL_POLICY, rounds, ANSWER_POLICY
    )
}

/// The preamble with prior exchanges folded in as context.
pub fn system_prompt(history: Option<&str>, max_rounds: usize) -> String {
    let base = preamble(max_rounds);
    match history {
        Some(history) if !history.trim().is_empty() => {
            format!("{}\n\nPrevious conversation:\n{}", base, history)
        }
        _ => base,
    }
}

/// Augment `base` with the position of the current tool round.
///
/// `round` is 1-based.
pub fn round_system_prompt(base: &str, round: usize, max_rounds: usize) -> String {
    if round < max_rounds {
        format!(
            "{}\n\nRound {} of {}: You can make additional tool calls if needed for complex \
             queries requiring multiple searches or comparisons.",
            base, round, max_rounds
        )
    } else {
        format!(
            "{}\n\nFinal round ({} of {}): This is your last opportunity to use tools before \
             providing your final answer.",
            base, round, max_rounds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_both_tools() {
        let prompt = preamble(DEFAULT_MAX_ROUNDS);
        assert!(prompt.contains("search_course_content"));
        assert!(prompt.contains("get_course_outline"));
        assert!(prompt.contains("\n- At most 2 rounds of tool calls per query;"));
    }

    #[test]
    fn test_round_limit_follows_configuration() {
        assert!(preamble(3).contains("At most 3 rounds of tool calls"));
        assert!(preamble(1).contains("At most 1 round of tool calls"));
        assert!(!preamble(3).contains("2 rounds"));
    }

    #[test]
    fn test_history_is_appended() {
        let prompt = system_prompt(Some("User: Hi\nAssistant: Hello"), 2);
        assert!(prompt.starts_with(&preamble(2)));
        assert!(prompt.ends_with("\n\nPrevious conversation:\nUser: Hi\nAssistant: Hello"));
    }

    #[test]
    fn test_blank_history_is_ignored() {
        assert_eq!(system_prompt(None, 2), preamble(2));
        assert_eq!(system_prompt(Some("   "), 2), preamble(2));
    }

    #[test]
    fn test_round_prompt() {
        let first = round_system_prompt("Base system prompt", 1, 2);
        assert!(first.starts_with("Base system prompt\n\n"));
        assert!(first.contains("Round 1 of 2"));
        assert!(first.contains("additional tool calls"));

        let last = round_system_prompt("Base system prompt", 2, 2);
        assert!(last.contains("Final round (2 of 2)"));
        assert!(last.contains("last opportunity"));
    }
}
