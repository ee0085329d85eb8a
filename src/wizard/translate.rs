// sello/src/wizard/translate.rs
use crate::core::Result;
use std::collections::HashMap;

/// Supported storefront languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lang {
    En,
    Es,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Es => "es",
        }
    }

    /// The counterpart language in the bilingual catalog.
    pub fn other(self) -> Lang {
        match self {
            Lang::En => Lang::Es,
            Lang::Es => Lang::En,
        }
    }
}

/// Translation capability consumed by the wizard. Implementations live
/// outside this crate (MyMemory, LibreTranslate, ...); failures surface as
/// `WatermarkError::TranslationUnavailable`.
pub trait Translator {
    fn translate(&self, text: &str, source: Lang, target: Lang) -> Result<String>;
}

/// Passthrough stand-in used when the mock fallback flag is set: copies the
/// text over with a target-language marker so untranslated copy is visible,
/// never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

impl Translator for PassthroughTranslator {
    fn translate(&self, text: &str, source: Lang, target: Lang) -> Result<String> {
        if source == target || text.trim().is_empty() {
            return Ok(text.to_string());
        }
        Ok(format!("[{}] {}", target.code(), text))
    }
}

/// Bilingual draft fields that go through translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Title,
    Description,
}

impl DraftField {
    pub fn name(self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::Description => "description",
        }
    }
}

/// Per-field translation sequencing: each new request (or direct edit of the
/// target field) supersedes any in-flight request, so a stale response can
/// never overwrite newer text. Last write wins.
#[derive(Debug, Default)]
pub struct TranslationSequencer {
    latest: HashMap<(DraftField, Lang), u64>,
    next: u64,
}

impl TranslationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new request for `(field, target)` and returns its
    /// sequence number, superseding any earlier request for the same slot.
    pub fn begin(&mut self, field: DraftField, target: Lang) -> u64 {
        self.next += 1;
        self.latest.insert((field, target), self.next);
        self.next
    }

    /// Invalidates any outstanding request for the slot, used when the user
    /// edits the target field directly.
    pub fn invalidate(&mut self, field: DraftField, target: Lang) {
        self.begin(field, target);
    }

    pub fn is_current(&self, field: DraftField, target: Lang, seq: u64) -> bool {
        self.latest.get(&(field, target)) == Some(&seq)
    }
}
