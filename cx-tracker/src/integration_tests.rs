//! End-to-end scenarios through the tracker
//!
//! Each test drives a [`Tracker`] with a [`MemoryEditor`] the way the
//! editing surface would: content changes, focus moves and timer ticks.

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    const TEN_TOKENS: &str = "<p>alpha beta gamma delta epsilon zeta eta theta iota kappa</p>";
    const EIGHT_TOKENS: &str = "<p>alpha beta gamma delta epsilon zeta eta theta</p>";

    fn mint() -> ContentOrigin {
        ContentOrigin::Provider("MinT".to_string())
    }

    fn tracker_for(sections: &[(u32, &str)], target_language: &str) -> Tracker<MemoryEditor> {
        let document = SourceDocument::new(
            "Scenario",
            sections
                .iter()
                .map(|(number, html)| SourceSection { number: *number, html: html.to_string() })
                .collect(),
        )
        .unwrap();
        Tracker::new(
            TrackerConfig::new("en", target_language),
            &document,
            &SavedUnits::new(),
            None,
            MemoryEditor::new(),
        )
        .unwrap()
    }

    /// Put content in the editor and run the change through the tracker
    fn edit(tracker: &mut Tracker<MemoryEditor>, section: u32, html: &str, origin: ContentOrigin) {
        let now = Instant::now();
        tracker.editor_mut().set_section(section, html, origin);
        tracker.on_section_change(section, now);
        tracker.process_change_queue(now);
    }

    #[test]
    fn test_scenario_a_untranslated_section() {
        let mut tracker = tracker_for(&[(0, TEN_TOKENS)], "fr");
        tracker.editor_mut().set_section(0, "", ContentOrigin::Untranslated);
        tracker.on_section_change(0, Instant::now());
        tracker.flush(Instant::now());

        let state = tracker.section(0).unwrap();
        assert_eq!(state.metrics().unwrap().translation_progress, 0.0);
        assert_eq!(tracker.current_progress().any, 0.0);
        assert!(tracker.nodes_with_issues().is_empty());
    }

    #[test]
    fn test_scenario_b_user_extends_mt() {
        let mut tracker = tracker_for(&[(0, TEN_TOKENS)], "en");
        edit(&mut tracker, 0, "<p>The cat sat</p>", mint());
        edit(&mut tracker, 0, "<p>The cat sat on the mat</p>", mint());

        let state = tracker.section(0).unwrap();
        assert_eq!(state.unmodified_mt().unwrap().text, "The cat sat");
        let metrics = state.metrics().unwrap();
        assert_eq!(metrics.unmodified_percentage, 0.5);
        assert!(metrics.is_modified);
        assert_eq!(tracker.current_progress().human, 0.6);
    }

    #[test]
    fn test_scenario_c_source_copy_threshold() {
        const TWENTY: &str = "<p>t1 t2 t3 t4 t5 t6 t7 t8 t9 t10 t11 t12 t13 t14 t15 t16 t17 t18 t19 t20</p>";
        const EDITED: &str = "<p>t1 t2 t3 t4 t5 t6 t7 t8 t9 t10 t11 t12 t13 n1 n2 n3 n4 n5 n6 n7</p>";
        let mut tracker = tracker_for(&[(0, TWENTY), (1, TWENTY)], "fr");

        edit(&mut tracker, 0, TWENTY, ContentOrigin::Source);
        edit(&mut tracker, 0, EDITED, ContentOrigin::Source);
        edit(&mut tracker, 1, TWENTY, mint());
        edit(&mut tracker, 1, EDITED, mint());
        tracker.flush_validations();

        assert_eq!(tracker.nodes_with_issues(), vec![IssueTarget::Section(0)]);
        let issues = tracker.editor().issues(IssueTarget::Section(0));
        assert_eq!(issues[0].name, MT_ABUSE_ISSUE);
        assert!(issues[0].message.starts_with("65%"));
    }

    #[test]
    fn test_scenario_d_short_sections_never_flagged() {
        let mut tracker = tracker_for(&[(0, EIGHT_TOKENS)], "fr");
        edit(&mut tracker, 0, EIGHT_TOKENS, mint());
        tracker.flush_validations();
        assert_eq!(
            tracker.validate(0),
            Some(Validation::Skipped(SkipReason::TooShort))
        );
        assert!(tracker.nodes_with_issues().is_empty());
    }

    #[test]
    fn test_scenario_f_engine_switch() {
        let mut tracker = tracker_for(&[(0, TEN_TOKENS)], "es");
        edit(&mut tracker, 0, "<p>uno dos tres cuatro cinco seis siete ocho nueve diez</p>", mint());
        edit(&mut tracker, 0, "<p>uno dos tres cuatro cinco seis siete ocho nueve diez y más</p>", mint());

        // The section state on its own: switching engines drops everything
        let mut state = tracker.section(0).unwrap().clone();
        state.begin_episode(ContentOrigin::Provider("Google".to_string()));
        assert!(state.user_translation().is_none());
        assert_eq!(
            validate_section(&state, tracker.config()),
            Validation::Skipped(SkipReason::NoBaseline)
        );

        // Through the tracker the new baseline is the new engine's output
        let google = "<p>un dos tres cuatro cinco seis siete ocho nueve diez</p>";
        edit(&mut tracker, 0, google, ContentOrigin::Provider("Google".to_string()));
        let state = tracker.section(0).unwrap();
        assert_eq!(state.unmodified_mt().unwrap().html, google);
        assert!(!state.is_modified());
        // Fresh episode: validation waits
        assert!(tracker.nodes_with_issues().is_empty());
        assert!(tracker.validation_delay_queue().contains(0));
    }

    #[test]
    fn test_undo_then_redo_is_a_new_episode() {
        let mut tracker = tracker_for(&[(0, TEN_TOKENS)], "fr");
        edit(&mut tracker, 0, "<p>un deux trois quatre cinq six sept huit neuf dix</p>", mint());
        tracker.editor_mut().set_placeholder(0);
        tracker.on_section_change(0, Instant::now());
        tracker.process_change_queue(Instant::now());
        assert_eq!(tracker.section(0).unwrap().current_provider(), &ContentOrigin::Untranslated);

        edit(&mut tracker, 0, "<p>une autre traduction</p>", mint());
        let state = tracker.section(0).unwrap();
        assert_eq!(state.unmodified_mt().unwrap().text, "une autre traduction");
    }

    #[test]
    fn test_cjk_target_progress() {
        let mut tracker = tracker_for(&[(0, "<p>Good morning</p>")], "ja");
        edit(&mut tracker, 0, "<p>おはよう</p>", mint());
        let metrics = tracker.section(0).unwrap().metrics().unwrap();
        assert_eq!(metrics.translation_progress, 2.0);
    }

    #[test]
    fn test_reentrant_changes_during_drain_are_kept() {
        let mut tracker = tracker_for(&[(0, TEN_TOKENS), (1, TEN_TOKENS)], "fr");
        let start = Instant::now();
        tracker.editor_mut().set_section(0, "<p>un</p>", mint());
        tracker.on_section_change(0, start);
        tracker.process_change_queue(start);

        // A change fired while validating lands in the now empty queue
        tracker.on_section_change(1, start);
        tracker.on_section_change(1, start);
        assert_eq!(tracker.change_queue().entries(), &[1]);
        tracker.editor_mut().set_section(1, "<p>deux</p>", mint());
        assert!(tracker.poll(start + Duration::from_millis(500)).changes_processed);
        assert!(tracker.section(1).unwrap().user_translation().is_some());

        // Draining again with nothing queued changes nothing
        let before = tracker.current_progress();
        tracker.process_change_queue(start);
        assert_eq!(tracker.current_progress(), before);
    }
}
