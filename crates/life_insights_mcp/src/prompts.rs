use rmcp::model::{GetPromptResult, PromptMessage, PromptMessageRole};

fn user_hint(user_id: Option<&str>) -> String {
    user_id
        .map(|u| format!(" with user_id=\"{}\"", u))
        .unwrap_or_default()
}

pub fn weekly_insights_review_prompt(user_id: Option<&str>, days_back: u32) -> GetPromptResult {
    GetPromptResult::new(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!(
                "Review my life dashboard over the past {} days.\n\nCover:\n1. Which factors move my mood the most (impact ranking)\n2. Sleep, steps and mood correlations, with their strength and direction\n3. My system balance across sleep, movement, nutrition, stress, wealth and relations\n4. The weakest dimension and one concrete change for next week\n\nUse get_insights{} and days_back={}. If using_demo_data is true, say so up front and treat every number as illustrative. A null correlation means there is not enough data, not that there is no relationship.",
                days_back,
                user_hint(user_id),
                days_back
            ),
        )])
    .with_description(format!(
        "Life dashboard review over the past {} days",
        days_back
    ))
}

pub fn sleep_mood_check_prompt(user_id: Option<&str>, days_back: u32) -> GetPromptResult {
    GetPromptResult::new(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!(
                "Check how my sleep relates to my mood over the past {} days.\n\nInclude:\n1. The Sleep ↔ Mood correlation and how to read it\n2. Average mood after nights of 7 hours or more versus shorter nights\n3. Whether the difference is large enough to act on\n4. A realistic bedtime suggestion\n\nUse get_correlations and get_sleep_experiment{} with days_back={}. If the experiment is null, explain that more nights on both sides of 7 hours are needed.",
                days_back,
                user_hint(user_id),
                days_back
            ),
        )])
    .with_description(format!(
        "Sleep and mood check over the past {} days",
        days_back
    ))
}
