#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use sello::{
        BatchProcessor, DraftAck, DraftField, DraftStore, Lang, Logo, ProcessorOptions,
        ProductDraft, ProductDraftAssembler, Result, Translator, WatermarkError,
        WatermarkPipeline, WatermarkSettings, WizardStep,
    };
    use std::cell::{Cell, RefCell};
    use std::io::Cursor;

    struct TaggingTranslator;

    impl Translator for TaggingTranslator {
        fn translate(&self, text: &str, _source: Lang, target: Lang) -> Result<String> {
            Ok(format!("{}:{}", target.code(), text))
        }
    }

    struct OfflineTranslator;

    impl Translator for OfflineTranslator {
        fn translate(&self, _text: &str, _source: Lang, _target: Lang) -> Result<String> {
            Err(WatermarkError::TranslationUnavailable(
                "provider offline".to_string(),
            ))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        fail_next: Cell<bool>,
        saved: RefCell<Vec<ProductDraft>>,
    }

    impl DraftStore for &MemoryStore {
        fn save_draft(&self, draft: &ProductDraft) -> Result<DraftAck> {
            if self.fail_next.take() {
                return Err(WatermarkError::Save("server rejected draft".to_string()));
            }
            self.saved.borrow_mut().push(draft.clone());
            Ok(DraftAck {
                draft_id: format!("draft-{}", self.saved.borrow().len()),
            })
        }
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 90, 90])));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
        buffer.into_inner()
    }

    fn logo_bytes() -> Vec<u8> {
        let image =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 20, Rgba([255, 0, 0, 255])));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn batch_processor() -> BatchProcessor {
        let settings = WatermarkSettings {
            logo: Logo::Custom(logo_bytes()),
            ..WatermarkSettings::default()
        };
        let pipeline =
            WatermarkPipeline::new(settings, ProcessorOptions::batch_default()).unwrap();
        BatchProcessor::new(pipeline, 0).unwrap()
    }

    fn assembler_with_basic_info(
        store: &MemoryStore,
    ) -> ProductDraftAssembler<TaggingTranslator, &MemoryStore> {
        let mut assembler = ProductDraftAssembler::new(TaggingTranslator, store);
        assembler.set_title(Lang::En, "Chocolate delice");
        assembler.set_description(Lang::En, "Rich dark chocolate dessert");
        assembler.set_price(24.5);
        assembler.set_category("desserts");
        assembler
    }

    #[test]
    fn empty_wizard_rejects_forward_transition() {
        let store = MemoryStore::default();
        let mut assembler = ProductDraftAssembler::new(TaggingTranslator, &store);

        match assembler.next() {
            Err(WatermarkError::Validation { field, .. }) => assert_eq!(field, "title"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(assembler.step(), WizardStep::BasicInfo);
    }

    #[test]
    fn title_minimum_counts_characters_not_bytes() {
        let store = MemoryStore::default();
        let mut assembler = ProductDraftAssembler::new(TaggingTranslator, &store);
        assembler.set_price(10.0);
        assembler.set_category("desserts");

        // Two characters, four bytes in UTF-8: still too short.
        assembler.set_title(Lang::Es, "áé");
        match assembler.next() {
            Err(WatermarkError::Validation { field, .. }) => assert_eq!(field, "title"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(assembler.step(), WizardStep::BasicInfo);

        assembler.set_title(Lang::Es, "áéí");
        assembler.next().unwrap();
        assert_eq!(assembler.step(), WizardStep::Translation);
    }

    #[test]
    fn images_step_requires_an_upload() {
        let store = MemoryStore::default();
        let mut assembler = assembler_with_basic_info(&store);
        assembler.next().unwrap();
        assembler.translate_missing(Lang::En).unwrap();
        assembler.next().unwrap();
        assert_eq!(assembler.step(), WizardStep::Images);

        match assembler.next() {
            Err(WatermarkError::Validation { field, .. }) => assert_eq!(field, "images"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn backward_transitions_never_validate() {
        let store = MemoryStore::default();
        let mut assembler = assembler_with_basic_info(&store);
        assembler.next().unwrap();
        assert_eq!(assembler.step(), WizardStep::Translation);

        // Nothing translated yet; back is still allowed.
        assert_eq!(assembler.back(), WizardStep::BasicInfo);
        assert_eq!(assembler.back(), WizardStep::BasicInfo);
    }

    #[test]
    fn full_walkthrough_submits_draft() {
        let store = MemoryStore::default();
        let mut assembler = assembler_with_basic_info(&store);

        assembler.next().unwrap();
        assembler.translate_missing(Lang::En).unwrap();
        assembler.next().unwrap();

        assembler.add_image(jpeg_bytes(200, 150));
        assembler.add_image(jpeg_bytes(150, 200));
        assembler.next().unwrap();

        let processed = assembler.apply_watermarks(&batch_processor()).unwrap();
        assert_eq!(processed, 2);
        assembler.next().unwrap();
        assert_eq!(assembler.step(), WizardStep::Preview);

        let ack = assembler.submit().unwrap();
        assert_eq!(ack.draft_id, "draft-1");

        let saved = store.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title.get(Lang::Es), Some("es:Chocolate delice"));
        assert_eq!(saved[0].images.len(), 2);
        assert_eq!(saved[0].price, Some(24.5));
    }

    #[test]
    fn failed_submit_stays_on_preview_for_manual_retry() {
        let store = MemoryStore::default();
        let mut assembler = assembler_with_basic_info(&store);
        assembler.next().unwrap();
        assembler.translate_missing(Lang::En).unwrap();
        assembler.next().unwrap();
        assembler.add_image(jpeg_bytes(120, 90));
        assembler.next().unwrap();
        assembler.apply_watermarks(&batch_processor()).unwrap();
        assembler.next().unwrap();

        store.fail_next.set(true);
        match assembler.submit() {
            Err(WatermarkError::Save(_)) => {}
            other => panic!("expected save error, got {:?}", other),
        }
        assert_eq!(assembler.step(), WizardStep::Preview);

        // Manual retry succeeds once the store recovers.
        assert!(assembler.submit().is_ok());
    }

    #[test]
    fn cancel_releases_all_accumulated_handles() {
        let store = MemoryStore::default();
        let mut assembler = assembler_with_basic_info(&store);
        assembler.next().unwrap();
        assembler.translate_missing(Lang::En).unwrap();
        assembler.next().unwrap();

        assembler.add_image(jpeg_bytes(100, 100));
        assembler.add_image(jpeg_bytes(110, 100));
        assembler.next().unwrap();
        assembler.apply_watermarks(&batch_processor()).unwrap();

        // A third upload arrives after watermarking ran over the first two.
        assembler.add_image(jpeg_bytes(120, 100));
        assert_eq!(assembler.upload_count(), 3);
        assert_eq!(assembler.processed_count(), 2);

        let report = assembler.cancel();
        assert_eq!(report.uploads_released, 3);
        assert_eq!(report.processed_released, 2);
    }

    #[test]
    fn watermark_failure_keeps_processed_list_empty() {
        let store = MemoryStore::default();
        let mut assembler = assembler_with_basic_info(&store);
        assembler.next().unwrap();
        assembler.translate_missing(Lang::En).unwrap();
        assembler.next().unwrap();

        assembler.add_image(jpeg_bytes(100, 100));
        assembler.add_image(b"corrupt upload".to_vec());
        assembler.next().unwrap();

        match assembler.apply_watermarks(&batch_processor()) {
            Err(WatermarkError::BatchFailed { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected batch failure, got {:?}", other),
        }
        assert_eq!(assembler.processed_count(), 0);

        // Still gated: no processed images means no preview.
        match assembler.next() {
            Err(WatermarkError::Validation { field, .. }) => {
                assert_eq!(field, "processed_images")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn superseded_translation_is_dropped() {
        let store = MemoryStore::default();
        let mut assembler = assembler_with_basic_info(&store);

        let (seq, text) = assembler.begin_translation(DraftField::Title, Lang::En);
        assert_eq!(text, "Chocolate delice");

        // The user edits the Spanish title before the response lands.
        assembler.set_title(Lang::Es, "Delicia de chocolate");

        let accepted =
            assembler.apply_translation(DraftField::Title, Lang::Es, seq, "stale".to_string());
        assert!(!accepted);

        let draft = assembler.assemble_draft();
        assert_eq!(draft.title.get(Lang::Es), Some("Delicia de chocolate"));
    }

    #[test]
    fn newer_translation_request_wins() {
        let store = MemoryStore::default();
        let mut assembler = assembler_with_basic_info(&store);

        let (old_seq, _) = assembler.begin_translation(DraftField::Title, Lang::En);
        let (new_seq, _) = assembler.begin_translation(DraftField::Title, Lang::En);

        assert!(assembler.apply_translation(
            DraftField::Title,
            Lang::Es,
            new_seq,
            "nuevo".to_string()
        ));
        assert!(!assembler.apply_translation(
            DraftField::Title,
            Lang::Es,
            old_seq,
            "viejo".to_string()
        ));

        let draft = assembler.assemble_draft();
        assert_eq!(draft.title.get(Lang::Es), Some("nuevo"));
    }

    #[test]
    fn translation_outage_fails_without_fallback_flag() {
        let store = MemoryStore::default();
        let mut assembler = ProductDraftAssembler::new(OfflineTranslator, &store);
        assembler.set_title(Lang::En, "Sweet table");

        let result = assembler.translate_missing(Lang::En);
        assert!(matches!(
            result,
            Err(WatermarkError::TranslationUnavailable(_))
        ));
    }

    #[test]
    fn translation_outage_uses_passthrough_when_flagged() {
        let store = MemoryStore::default();
        let mut assembler =
            ProductDraftAssembler::new(OfflineTranslator, &store).with_mock_fallback(true);
        assembler.set_title(Lang::En, "Sweet table");

        assembler.translate_missing(Lang::En).unwrap();
        let draft = assembler.assemble_draft();
        assert_eq!(draft.title.get(Lang::Es), Some("[es] Sweet table"));
    }

    #[test]
    fn translate_missing_keeps_existing_target_text() {
        let store = MemoryStore::default();
        let mut assembler = assembler_with_basic_info(&store);
        assembler.set_title(Lang::Es, "Delicia de chocolate");

        assembler.translate_missing(Lang::En).unwrap();
        let draft = assembler.assemble_draft();
        // The authored Spanish title is not overwritten.
        assert_eq!(draft.title.get(Lang::Es), Some("Delicia de chocolate"));
        // The missing description still gets filled.
        assert_eq!(
            draft.description.get(Lang::Es),
            Some("es:Rich dark chocolate dessert")
        );
    }
}
