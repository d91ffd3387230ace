// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it;
// this file holds the fragments every call uses.

/// System instruction sent with both the extraction and the evaluation call.
pub const QUALITY_EVALUATOR_SYSTEM: &str = "あなたは表現品質評価AIです。";

/// Reminder appended to prompts that must come back as a Markdown table.
pub const TABLE_ONLY_INSTRUCTION: &str =
    "表以外の説明文は出力しない。セル内では | を使用しない。";
