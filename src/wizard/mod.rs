// sello/src/wizard/mod.rs
mod store;
mod translate;

pub use store::{DraftAck, DraftStore};
pub use translate::{DraftField, Lang, PassthroughTranslator, TranslationSequencer, Translator};

use crate::core::{Result, WatermarkError};
use crate::processors::{BatchProcessor, ProcessedImage};
use std::collections::BTreeMap;

/// Ordered wizard steps. Forward transitions are gated by step-local
/// validation; backward transitions are always permitted and never
/// re-validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    BasicInfo,
    Translation,
    Images,
    Watermarking,
    Preview,
}

impl WizardStep {
    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::BasicInfo => Some(WizardStep::Translation),
            WizardStep::Translation => Some(WizardStep::Images),
            WizardStep::Images => Some(WizardStep::Watermarking),
            WizardStep::Watermarking => Some(WizardStep::Preview),
            WizardStep::Preview => None,
        }
    }

    fn back(self) -> Option<WizardStep> {
        match self {
            WizardStep::BasicInfo => None,
            WizardStep::Translation => Some(WizardStep::BasicInfo),
            WizardStep::Images => Some(WizardStep::Translation),
            WizardStep::Watermarking => Some(WizardStep::Images),
            WizardStep::Preview => Some(WizardStep::Watermarking),
        }
    }
}

/// Text keyed by language code.
#[derive(Debug, Clone, Default)]
pub struct LocalizedText {
    entries: BTreeMap<Lang, String>,
}

impl LocalizedText {
    pub fn get(&self, lang: Lang) -> Option<&str> {
        self.entries.get(&lang).map(String::as_str)
    }

    pub fn set(&mut self, lang: Lang, text: impl Into<String>) {
        self.entries.insert(lang, text.into());
    }

    pub fn has(&self, lang: Lang) -> bool {
        self.entries
            .get(&lang)
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false)
    }
}

/// The finished draft handed to the save capability. Created empty at
/// wizard start, filled field by field, submitted once on completion.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub price: Option<f64>,
    pub category_id: Option<String>,
    pub images: Vec<ProcessedImage>,
}

/// Counts of handles released by a cancelled wizard, so callers (and tests)
/// can observe that nothing stayed allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelReport {
    pub uploads_released: usize,
    pub processed_released: usize,
}

/// Multi-step product entry wizard: collects bilingual text, invokes the
/// translation capability, accumulates uploads, runs the watermark batch,
/// and submits the assembled draft through the save capability.
pub struct ProductDraftAssembler<T: Translator, S: DraftStore> {
    step: WizardStep,
    title: LocalizedText,
    description: LocalizedText,
    price: Option<f64>,
    category_id: Option<String>,
    uploads: Vec<Vec<u8>>,
    processed: Vec<ProcessedImage>,
    translator: T,
    store: S,
    fallback_to_mock: bool,
    sequencer: TranslationSequencer,
}

impl<T: Translator, S: DraftStore> ProductDraftAssembler<T, S> {
    pub fn new(translator: T, store: S) -> Self {
        Self {
            step: WizardStep::BasicInfo,
            title: LocalizedText::default(),
            description: LocalizedText::default(),
            price: None,
            category_id: None,
            uploads: Vec::new(),
            processed: Vec::new(),
            translator,
            store,
            fallback_to_mock: false,
            sequencer: TranslationSequencer::new(),
        }
    }

    /// Enables the passthrough fallback when the translation capability is
    /// unavailable. Off by default; the flag is the only silent fallback in
    /// the wizard.
    pub fn with_mock_fallback(mut self, fallback: bool) -> Self {
        self.fallback_to_mock = fallback;
        self
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn set_title(&mut self, lang: Lang, text: &str) {
        // A direct edit supersedes any in-flight translation for the field.
        self.sequencer.invalidate(DraftField::Title, lang);
        self.title.set(lang, text);
    }

    pub fn set_description(&mut self, lang: Lang, text: &str) {
        self.sequencer.invalidate(DraftField::Description, lang);
        self.description.set(lang, text);
    }

    pub fn set_price(&mut self, price: f64) {
        self.price = Some(price);
    }

    pub fn set_category(&mut self, category_id: &str) {
        self.category_id = Some(category_id.to_string());
    }

    pub fn add_image(&mut self, bytes: Vec<u8>) {
        self.uploads.push(bytes);
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.len()
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Fills the counterpart language for any bilingual field authored in
    /// `source` whose translation is still missing.
    pub fn translate_missing(&mut self, source: Lang) -> Result<()> {
        let target = source.other();

        for field in [DraftField::Title, DraftField::Description] {
            let text = match self.field_text(field).get(source) {
                Some(text) if !text.trim().is_empty() => text.to_string(),
                _ => continue,
            };
            if self.field_text(field).has(target) {
                continue;
            }

            let seq = self.sequencer.begin(field, target);
            let translated = self.run_translation(&text, source, target)?;
            self.apply_translation(field, target, seq, translated);
        }

        Ok(())
    }

    /// Starts an explicit translation request for async callers; returns the
    /// sequence number and the text to translate. A later
    /// [`Self::apply_translation`] with a stale sequence number is a no-op.
    pub fn begin_translation(&mut self, field: DraftField, source: Lang) -> (u64, String) {
        let text = self
            .field_text(field)
            .get(source)
            .unwrap_or_default()
            .to_string();
        let seq = self.sequencer.begin(field, source.other());
        (seq, text)
    }

    /// Applies a completed translation if it has not been superseded.
    /// Returns whether the text was accepted.
    pub fn apply_translation(
        &mut self,
        field: DraftField,
        target: Lang,
        seq: u64,
        text: String,
    ) -> bool {
        if !self.sequencer.is_current(field, target, seq) {
            log::debug!(
                "Dropping superseded translation for {} ({})",
                field.name(),
                target.code()
            );
            return false;
        }
        self.field_text_mut(field).set(target, text);
        true
    }

    /// Runs the watermark batch over every uploaded image. All-or-nothing:
    /// a failing upload leaves the processed list unchanged.
    pub fn apply_watermarks(&mut self, batch: &BatchProcessor) -> Result<usize> {
        if self.step != WizardStep::Watermarking {
            return Err(WatermarkError::Validation {
                field: "step".to_string(),
                reason: "watermarking is only available at the watermarking step".to_string(),
            });
        }

        let processed = batch.process_all(&self.uploads)?;
        let count = processed.len();
        self.processed = processed;
        Ok(count)
    }

    /// Advances to the next step if the current step validates.
    pub fn next(&mut self) -> Result<WizardStep> {
        self.validate_step()?;

        match self.step.next() {
            Some(step) => {
                log::debug!("Wizard advancing {:?} -> {:?}", self.step, step);
                self.step = step;
                Ok(step)
            }
            None => Err(WatermarkError::Validation {
                field: "step".to_string(),
                reason: "preview is the final step; submit or cancel".to_string(),
            }),
        }
    }

    /// Steps backward without validating. At the first step this is a no-op.
    pub fn back(&mut self) -> WizardStep {
        if let Some(step) = self.step.back() {
            self.step = step;
        }
        self.step
    }

    /// Submits the assembled draft through the save capability. On failure
    /// the wizard stays on the preview step and the error is surfaced;
    /// retry is a manual re-submit.
    pub fn submit(&mut self) -> Result<DraftAck> {
        if self.step != WizardStep::Preview {
            return Err(WatermarkError::Validation {
                field: "step".to_string(),
                reason: "submit is only available from the preview step".to_string(),
            });
        }

        let draft = self.assemble_draft();
        self.store.save_draft(&draft)
    }

    /// Discards all accumulated state, releasing every upload and processed
    /// image handle.
    pub fn cancel(self) -> CancelReport {
        let report = CancelReport {
            uploads_released: self.uploads.len(),
            processed_released: self.processed.len(),
        };
        log::debug!(
            "Wizard cancelled: releasing {} uploads, {} processed images",
            report.uploads_released,
            report.processed_released
        );
        report
    }

    /// Snapshot of the draft as it stands, used for the preview step.
    pub fn assemble_draft(&self) -> ProductDraft {
        ProductDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            category_id: self.category_id.clone(),
            images: self.processed.clone(),
        }
    }

    fn run_translation(&self, text: &str, source: Lang, target: Lang) -> Result<String> {
        match self.translator.translate(text, source, target) {
            Ok(translated) => Ok(translated),
            Err(WatermarkError::TranslationUnavailable(reason)) if self.fallback_to_mock => {
                log::warn!(
                    "Translation unavailable ({}), falling back to passthrough",
                    reason
                );
                PassthroughTranslator.translate(text, source, target)
            }
            Err(e) => Err(e),
        }
    }

    fn field_text(&self, field: DraftField) -> &LocalizedText {
        match field {
            DraftField::Title => &self.title,
            DraftField::Description => &self.description,
        }
    }

    fn field_text_mut(&mut self, field: DraftField) -> &mut LocalizedText {
        match field {
            DraftField::Title => &mut self.title,
            DraftField::Description => &mut self.description,
        }
    }

    fn validate_step(&self) -> Result<()> {
        match self.step {
            WizardStep::BasicInfo => self.validate_basic_info(),
            WizardStep::Translation => self.validate_translation(),
            WizardStep::Images => self.validate_images(),
            WizardStep::Watermarking => self.validate_watermarking(),
            WizardStep::Preview => Ok(()),
        }
    }

    fn validate_basic_info(&self) -> Result<()> {
        let authored = self.title.has(Lang::En) || self.title.has(Lang::Es);
        if !authored {
            return Err(validation("title", "product title is required"));
        }

        for lang in [Lang::En, Lang::Es] {
            if let Some(text) = self.title.get(lang) {
                if !text.trim().is_empty() && text.trim().chars().count() < 3 {
                    return Err(validation("title", "title must be at least 3 characters"));
                }
            }
        }

        match self.price {
            None => return Err(validation("price", "price is required")),
            Some(price) if !price.is_finite() || price < 0.0 => {
                return Err(validation("price", "price must be a positive number"))
            }
            Some(_) => {}
        }

        if self.category_id.as_deref().unwrap_or("").is_empty() {
            return Err(validation("category", "category is required"));
        }

        Ok(())
    }

    fn validate_translation(&self) -> Result<()> {
        for lang in [Lang::En, Lang::Es] {
            if !self.title.has(lang) {
                return Err(validation(
                    "title",
                    &format!("title is missing in {}", lang.code()),
                ));
            }
            if !self.description.has(lang) {
                return Err(validation(
                    "description",
                    &format!("description is missing in {}", lang.code()),
                ));
            }
        }
        Ok(())
    }

    fn validate_images(&self) -> Result<()> {
        if self.uploads.is_empty() {
            return Err(validation("images", "at least one image must be uploaded"));
        }
        Ok(())
    }

    fn validate_watermarking(&self) -> Result<()> {
        if self.processed.is_empty() {
            return Err(validation(
                "processed_images",
                "at least one image must be watermarked",
            ));
        }
        Ok(())
    }
}

fn validation(field: &str, reason: &str) -> WatermarkError {
    WatermarkError::Validation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
