//! Prompt construction for classification and synthesis.
//!
//! The classifier prompt is a fixed few-shot instruction: explicit rules for
//! what counts as life-threatening plus worked examples, ending with the
//! patient's message. The responder prompts frame the assistant's role per
//! severity and embed the assembled guideline context verbatim.

/// Build the classification prompt for one patient message.
///
/// Sent as a single user turn at zero temperature with a tight token cap;
/// the expected completion is one word, CRITICAL or NORMAL.
pub fn classifier_prompt(user_text: &str) -> String {
    format!(
        concat!(
            "You are an emergency triage nurse. Analyze the input.\n",
            "- If the symptom implies an immediate life threat (heart attack, stroke, ",
            "severe or uncontrolled bleeding, inability to breathe, loss of consciousness ",
            "after trauma), output only: CRITICAL\n",
            "- Otherwise (cold, headache, chronic condition questions, general ",
            "information), output only: NORMAL\n",
            "- If the user is asking a question (e.g., \"Is this bad?\", \"Could it be ",
            "flu?\"), output: NORMAL\n",
            "\n",
            "Examples:\n",
            "User: \"I have a headache and runny nose.\" -> Output: NORMAL\n",
            "User: \"My chest feels heavy and left arm hurts.\" -> Output: CRITICAL\n",
            "User: \"I cut my finger, it stopped bleeding.\" -> Output: NORMAL\n",
            "User: \"I am choking and cannot breathe.\" -> Output: CRITICAL\n",
            "User: \"Could it be the flu?\" -> Output: NORMAL\n",
            "\n",
            "Input: {input}\n",
            "Output:"
        ),
        input = user_text
    )
}

/// System instruction for the critical response path.
pub fn critical_system_prompt(context: &str) -> String {
    let mut prompt = concat!(
        "You are an Emergency Response System. The user is in danger. ",
        "Output ONLY immediate action steps. Do NOT explain. Do NOT say what ",
        "you are thinking. Give 5 to 8 consolidated numbered steps; merge steps ",
        "that repeat the same action, and stop immediately after the last step. ",
        "BUT: If the user is just asking a question (e.g., Is it flu?), answer ",
        "it normally and calmly. Do NOT repeat yourself."
    )
    .to_string();
    append_context(&mut prompt, "Emergency guidelines", context);
    prompt
}

/// System instruction for the routine response path.
pub fn routine_system_prompt(context: &str) -> String {
    let mut prompt = concat!(
        "You are a helpful medical assistant. Answer concisely. Do NOT output ",
        "any internal thoughts, thought tags, or reasoning steps. Lay out your ",
        "advice as 5 to 8 consolidated numbered steps; merge steps that repeat ",
        "the same action, and stop immediately after the last step."
    )
    .to_string();
    append_context(&mut prompt, "Clinical guidance", context);
    prompt
}

// Retrieval can degrade to nothing; the section is omitted rather than
// left as an empty header.
fn append_context(prompt: &mut String, heading: &str, context: &str) {
    if context.is_empty() {
        return;
    }
    prompt.push_str("\n\n");
    prompt.push_str(heading);
    prompt.push_str(":\n");
    prompt.push_str(context);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_prompt_embeds_input() {
        let prompt = classifier_prompt("My chest feels heavy.");
        assert!(prompt.contains("Input: My chest feels heavy."));
        assert!(prompt.ends_with("Output:"));
    }

    #[test]
    fn classifier_prompt_has_few_shot_examples() {
        let prompt = classifier_prompt("anything");
        assert!(prompt.contains("I am choking and cannot breathe."));
        assert!(prompt.contains("-> Output: CRITICAL"));
        assert!(prompt.contains("-> Output: NORMAL"));
    }

    #[test]
    fn critical_prompt_embeds_context_verbatim() {
        let context = "Call emergency services.\nApply direct pressure.";
        let prompt = critical_system_prompt(context);
        assert!(prompt.contains("Emergency Response System"));
        assert!(prompt.contains(context));
    }

    #[test]
    fn routine_prompt_embeds_context_verbatim() {
        let context = "Rest and hydrate.";
        let prompt = routine_system_prompt(context);
        assert!(prompt.contains("medical assistant"));
        assert!(prompt.contains(context));
    }

    #[test]
    fn empty_context_omits_guideline_section() {
        let prompt = critical_system_prompt("");
        assert!(!prompt.contains("Emergency guidelines"));

        let prompt = routine_system_prompt("");
        assert!(!prompt.contains("Clinical guidance"));
    }

    #[test]
    fn both_prompts_constrain_step_count() {
        assert!(critical_system_prompt("").contains("5 to 8"));
        assert!(routine_system_prompt("").contains("5 to 8"));
    }
}
