//! Evaluation pipeline: extraction call → table parse → evaluation call → exports.
//!
//! The steps run strictly in sequence and every failure ends the run. The second
//! completion call is only made once the first one produced at least one
//! requirement sentence.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::{AppError, CompletionStage};
use crate::evaluation::export;
use crate::evaluation::models::{
    EvaluationReport, EvaluationResult, ExtractionResult, RequirementRow,
};
use crate::evaluation::prompts::{evaluation_prompt, extraction_prompt};
use crate::evaluation::rules::Rule;
use crate::llm_client::prompts::QUALITY_EVALUATOR_SYSTEM;
use crate::llm_client::CompletionService;
use crate::table::{self, schema::EVALUATION, schema::EXTRACTION};

#[derive(Clone)]
pub struct Evaluator {
    llm: Arc<dyn CompletionService>,
    max_tokens: u32,
}

impl Evaluator {
    pub fn new(llm: Arc<dyn CompletionService>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }

    /// Runs both completion calls over `document_text` for the selected rules.
    pub async fn run(
        &self,
        document_text: &str,
        selected: &[&'static Rule],
    ) -> Result<EvaluationReport, AppError> {
        if selected.is_empty() {
            return Err(AppError::MissingInput(
                "select at least one rule".to_string(),
            ));
        }

        let request_id = Uuid::new_v4();
        self.run_stages(request_id, document_text, selected)
            .instrument(info_span!("evaluation", %request_id))
            .await
    }

    async fn run_stages(
        &self,
        request_id: Uuid,
        document_text: &str,
        selected: &[&'static Rule],
    ) -> Result<EvaluationReport, AppError> {
        info!(
            rules = selected.len(),
            chars = document_text.chars().count(),
            "Starting evaluation"
        );

        let extraction = self.extract(document_text).await?;
        info!(
            requirements = extraction.requirements.len(),
            "Requirement sentences extracted"
        );

        let evaluation = self.evaluate(selected, &extraction.requirements).await?;
        info!(
            rows = evaluation.rows.len().saturating_sub(1),
            "Evaluation complete"
        );

        let downloads = export::downloads(&evaluation.markdown, &evaluation.rows)?;

        Ok(EvaluationReport {
            request_id,
            generated_at: Utc::now(),
            rules: selected.iter().map(|r| r.name).collect(),
            extraction,
            evaluation,
            downloads,
        })
    }

    async fn extract(&self, document_text: &str) -> Result<ExtractionResult, AppError> {
        let markdown = self
            .llm
            .complete(
                QUALITY_EVALUATOR_SYSTEM,
                &extraction_prompt(document_text),
                self.max_tokens,
            )
            .await
            .map_err(AppError::completion(CompletionStage::Extraction))?;
        debug!(chars = markdown.len(), "Extraction response received");

        let parsed = EXTRACTION.apply(table::parse(&markdown));
        let requirements: Vec<RequirementRow> = parsed
            .body
            .iter()
            .filter_map(|row| RequirementRow::from_row(row))
            .collect();

        if requirements.is_empty() {
            return Err(AppError::EmptyExtraction);
        }

        Ok(ExtractionResult {
            markdown,
            requirements,
            adjusted_rows: parsed.adjusted,
        })
    }

    async fn evaluate(
        &self,
        selected: &[&'static Rule],
        requirements: &[RequirementRow],
    ) -> Result<EvaluationResult, AppError> {
        let markdown = self
            .llm
            .complete(
                QUALITY_EVALUATOR_SYSTEM,
                &evaluation_prompt(selected, requirements),
                self.max_tokens,
            )
            .await
            .map_err(AppError::completion(CompletionStage::Evaluation))?;
        debug!(chars = markdown.len(), "Evaluation response received");

        let parsed = EVALUATION.apply(table::parse(&markdown));
        let rows = parsed.to_rows();

        Ok(EvaluationResult {
            table_markdown: table::to_markdown(&rows),
            rows,
            header_matches: parsed.header_matches,
            adjusted_rows: parsed.adjusted,
            markdown,
        })
    }
}
