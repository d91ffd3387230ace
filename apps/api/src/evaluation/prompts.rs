// LLM prompt templates for the evaluation pipeline.
// Table headers are filled in from `table::schema` so the prompts and the
// parser always agree on column order.

use crate::evaluation::models::RequirementRow;
use crate::evaluation::rules::{self, Rule};
use crate::llm_client::prompts::TABLE_ONLY_INSTRUCTION;
use crate::table::schema::{EVALUATION, EXTRACTION};

/// Extraction prompt template. Replace `{header}`, `{table_only}` and
/// `{document_text}` before sending.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = "
あなたはソフトウェア要求文抽出AIです。
以下の手順に従い、文書からソフトウェア要求文を抽出してください。

1. 文書を1文単位に分割し、文とみなせないものを除外する
2. ソフトウェア要求文に該当する文のみ抽出する
3. 各文に章番号と章名を推定し、Markdown表形式で出力する。表ヘッダは {header} とする
{table_only}

文書内容:
{document_text}
";

/// Evaluation prompt template. Replace `{rules}`, `{requirements}`, `{header}`
/// and `{table_only}` before sending.
pub const EVALUATION_PROMPT_TEMPLATE: &str = "
あなたは表現品質評価AIです。
以下のルールに基づき、抽出されたソフトウェア要求文を評価してください。

選択されたルール:
{rules}

抽出された要求文と章情報:
{requirements}

該当する文のみ、Markdown表形式で出力する。表ヘッダは {header} とする
{table_only}
";

pub fn extraction_prompt(document_text: &str) -> String {
    // The document goes in last so placeholders inside it are never expanded.
    EXTRACTION_PROMPT_TEMPLATE
        .replace("{header}", &EXTRACTION.header_markdown())
        .replace("{table_only}", TABLE_ONLY_INSTRUCTION)
        .replace("{document_text}", document_text)
}

pub fn evaluation_prompt(selected: &[&Rule], requirements: &[RequirementRow]) -> String {
    let requirement_list = requirements
        .iter()
        .map(|r| format!("- {} | {}", r.chapter, r.sentence))
        .collect::<Vec<_>>()
        .join("\n");

    EVALUATION_PROMPT_TEMPLATE
        .replace("{header}", &EVALUATION.header_markdown())
        .replace("{table_only}", TABLE_ONLY_INSTRUCTION)
        .replace("{rules}", &rules::to_markdown_list(selected))
        .replace("{requirements}", &requirement_list)
}
