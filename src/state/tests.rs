use super::*;
use crate::application::assistant::EXPLANATION_PLACEHOLDER;
use crate::domain::{ExamplePair, TurnRole};
use crate::infra::completion::{CompletionError, ScriptedCompletion};
use crate::infra::extract::TEXT_PLAIN;
use std::sync::Arc;

fn outcome(find: &str, replace: &str) -> GenerationOutcome {
    GenerationOutcome {
        pair: PatternPair::new(find, replace),
        explanation: "explained".into(),
        explanation_degraded: false,
        generation_context: "DESCRIPTION:\nnumbers".into(),
    }
}

fn ready_bench() -> Workbench {
    let mut bench = Workbench::new();
    let ticket = bench
        .begin_generation(PatternSpecification::new("numbers"))
        .unwrap();
    bench
        .complete_generation(ticket, Ok(outcome(r"\d+", "#")))
        .unwrap();
    bench
}

#[test]
fn test_generation_transitions() {
    let mut bench = Workbench::new();
    assert_eq!(bench.phase(), DraftPhase::Empty);

    let ticket = bench
        .begin_generation(PatternSpecification::new("numbers"))
        .unwrap();
    assert_eq!(bench.phase(), DraftPhase::Generating);
    assert!(bench.in_flight().generation);
    assert!(bench.draft().is_none());

    assert_eq!(
        bench.complete_generation(ticket, Ok(outcome(r"\d+", "#"))).unwrap(),
        Applied::Current
    );
    assert_eq!(bench.phase(), DraftPhase::Ready);
    let draft = bench.draft().unwrap();
    assert_eq!(draft.edited(), draft.generated());
    assert_eq!(draft.explanation(), "explained");
    assert_eq!(bench.in_flight(), InFlight::default());
}

#[test]
fn test_failed_generation_returns_to_empty() {
    let mut bench = ready_bench();
    let ticket = bench
        .begin_generation(PatternSpecification::new("other"))
        .unwrap();
    assert!(bench.draft().is_none(), "new generation resets fully first");

    let err = bench
        .complete_generation(ticket, Err(AssistError::capability("down")))
        .unwrap_err();
    assert_eq!(err.details(), "down");
    assert_eq!(bench.phase(), DraftPhase::Empty);
    assert_eq!(bench.last_error(), Some(&AssistError::capability("down")));
}

#[test]
fn test_invalid_specification_is_blocked() {
    let mut bench = Workbench::new();
    assert!(matches!(
        bench.begin_generation(PatternSpecification::new(" ")),
        Err(AssistError::Validation(_))
    ));
    assert_eq!(bench.phase(), DraftPhase::Empty);
}

#[test]
fn test_refinement_uses_edited_pair_and_resets_edits() {
    let mut bench = ready_bench();
    bench.edit_find(r"\d{2}").unwrap();

    let (ticket, input) = bench.begin_refinement("  also commas ").unwrap();
    assert_eq!(input.current.find, r"\d{2}");
    assert_eq!(input.feedback, "also commas");
    assert_eq!(bench.phase(), DraftPhase::Refining);

    // the prior draft stays testable while refining
    assert_eq!(bench.test_on_text("a 42", false).unwrap().len(), 1);

    let refined = RefinementOutcome {
        pair: PatternPair::new(r"\d{1,3}(,\d{3})*", "#"),
        explanation: "new".into(),
        explanation_degraded: false,
        feedback: input.feedback.clone(),
    };
    bench.complete_refinement(ticket, Ok(refined)).unwrap();

    let draft = bench.draft().unwrap();
    assert_eq!(draft.generated().find, r"\d{1,3}(,\d{3})*");
    assert_eq!(draft.edited(), draft.generated());
    assert_eq!(draft.explanation(), "new");
    assert_eq!(draft.generation_context(), "DESCRIPTION:\nnumbers");
    assert_eq!(draft.origin(), &DraftOrigin::Refined { turn: 1 });

    let turns = bench.session().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, TurnRole::User);
    assert_eq!(turns[1].content, REFINE_ACKNOWLEDGMENT);
}

#[test]
fn test_failed_refinement_leaves_draft_unchanged() {
    let mut bench = ready_bench();
    let before = bench.draft().cloned();
    let (ticket, _) = bench.begin_refinement("tighter").unwrap();
    bench
        .complete_refinement(ticket, Err(AssistError::capability("timeout")))
        .unwrap_err();

    assert_eq!(bench.draft().cloned(), before);
    assert_eq!(bench.phase(), DraftPhase::Ready);
    assert_eq!(
        bench.session().last().map(|t| t.content.as_str()),
        Some("Error refining: timeout")
    );
}

#[test]
fn test_refinement_validation_never_logs() {
    let mut bench = Workbench::new();
    assert!(bench.begin_refinement("more").is_err());

    let mut bench = ready_bench();
    assert!(bench.begin_refinement("   ").is_err());
    bench.edit_find("").unwrap();
    assert!(bench.begin_refinement("more").is_err());
    assert!(bench.session().is_empty());
    assert!(!bench.in_flight().refinement);
}

#[test]
fn test_new_generation_discards_stale_refinement() {
    let mut bench = ready_bench();
    let (refine_ticket, _) = bench.begin_refinement("more").unwrap();
    let gen_ticket = bench
        .begin_generation(PatternSpecification::new("words"))
        .unwrap();
    assert!(refine_ticket.is_cancelled());

    let late = RefinementOutcome {
        pair: PatternPair::new("late", ""),
        explanation: "late".into(),
        explanation_degraded: false,
        feedback: "more".into(),
    };
    assert_eq!(
        bench.complete_refinement(refine_ticket, Ok(late)).unwrap(),
        Applied::Stale
    );
    assert!(bench.draft().is_none());

    bench
        .complete_generation(gen_ticket, Ok(outcome(r"\w+", "")))
        .unwrap();
    assert_eq!(bench.draft().unwrap().generated().find, r"\w+");
}

#[test]
fn test_repeated_trigger_supersedes_previous_ticket() {
    let mut bench = Workbench::new();
    let first = bench.begin_generation(PatternSpecification::new("a")).unwrap();
    let second = bench.begin_generation(PatternSpecification::new("b")).unwrap();
    assert!(first.is_cancelled());
    assert!(second.seq() > first.seq());

    assert_eq!(
        bench.complete_generation(first, Ok(outcome("a", ""))).unwrap(),
        Applied::Stale
    );
    assert!(bench.in_flight().generation);
    bench.complete_generation(second, Ok(outcome("b", ""))).unwrap();
    assert_eq!(bench.draft().unwrap().generated().find, "b");
}

fn converted(find: &str) -> ConvertedPattern {
    ConvertedPattern {
        dialect: TargetDialect::JavaScript,
        target_find: find.into(),
        target_replace: "#".into(),
    }
}

#[test]
fn test_refinement_discards_in_flight_conversion() {
    let mut bench = ready_bench();
    let (convert_ticket, input) = bench.begin_conversion(TargetDialect::JavaScript).unwrap();
    assert_eq!(input.pair.find, r"\d+");

    let (refine_ticket, _) = bench.begin_refinement("also commas").unwrap();
    let refined = RefinementOutcome {
        pair: PatternPair::new(r"\d{1,3}(,\d{3})*", "#"),
        explanation: "new".into(),
        explanation_degraded: false,
        feedback: "also commas".into(),
    };
    bench.complete_refinement(refine_ticket, Ok(refined)).unwrap();
    assert!(convert_ticket.is_cancelled());
    assert!(!bench.in_flight().conversion);

    assert_eq!(
        bench
            .complete_conversion(convert_ticket, Ok(converted(r"\d+")))
            .unwrap(),
        Applied::Stale
    );
    assert!(bench.converted().is_none());
    assert_eq!(bench.draft().unwrap().edited().find, r"\d{1,3}(,\d{3})*");
}

#[test]
fn test_edits_clear_converted_values() {
    let mut bench = ready_bench();
    let (ticket, _) = bench.begin_conversion(TargetDialect::JavaScript).unwrap();
    bench
        .complete_conversion(ticket, Ok(converted("[0-9]+")))
        .unwrap();
    assert!(bench.converted().is_some());

    bench.edit_replace("<num>").unwrap();
    assert!(bench.converted().is_none());

    let (ticket, _) = bench.begin_conversion(TargetDialect::JavaScript).unwrap();
    bench.edit_find(r"\d{2}").unwrap();
    assert!(ticket.is_cancelled());
    assert_eq!(
        bench
            .complete_conversion(ticket, Ok(converted("[0-9]+")))
            .unwrap(),
        Applied::Stale
    );
    assert!(bench.converted().is_none());
}

#[test]
fn test_conversion_failure_blanks_previous_values() {
    let mut bench = ready_bench();
    let (ticket, input) = bench.begin_conversion(TargetDialect::Python).unwrap();
    assert_eq!(input.description.as_deref(), Some("numbers"));
    bench
        .complete_conversion(
            ticket,
            Ok(ConvertedPattern {
                dialect: TargetDialect::Python,
                target_find: r"\d+".into(),
                target_replace: "#".into(),
            }),
        )
        .unwrap();
    assert!(bench.converted().is_some());

    let (ticket, _) = bench.begin_conversion(TargetDialect::Java).unwrap();
    assert!(bench
        .complete_conversion(ticket, Err(AssistError::capability("boom")))
        .is_err());
    assert!(bench.converted().is_none());
    assert!(bench.draft().is_some(), "conversion never touches the draft");
}

#[test]
fn test_edits_win_for_testing_and_substitution() {
    let mut bench = ready_bench();
    bench.edit_find("cat").unwrap();
    bench.edit_replace("dog").unwrap();
    bench.set_options(PatternOptions {
        case_sensitive: true,
        part_of_word: true,
    });

    let matches = bench.test_on_text("Cat CAT cat", true).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].start, 8);
    assert!(matches[0].context.is_some());

    assert_eq!(
        bench
            .substitute_on_text("Cat CAT cat", ReplaceMode::Template)
            .unwrap(),
        "Cat CAT dog"
    );
    assert_eq!(bench.draft().unwrap().generated().find, r"\d+");
}

#[test]
fn test_text_test_reports_syntax_error() {
    let mut bench = ready_bench();
    bench.edit_find("(").unwrap();
    let err = bench.test_on_text("((", false).unwrap_err();
    assert!(matches!(err, AssistError::PatternSyntax(_)));
    assert!(!bench.in_flight().testing);
}

#[test]
fn test_file_actions_use_edited_pair() {
    let mut bench = ready_bench();
    let file = UploadedFile::new("a.txt", Some(TEXT_PLAIN.into()), b"room 101".to_vec());
    let FileOutcome::Matches { matches } = bench.test_on_file(&file, FileAction::Test).unwrap()
    else {
        panic!("expected matches");
    };
    assert_eq!(matches[0].context.as_deref(), Some("room 101"));

    assert_eq!(
        bench.test_on_file(&file, FileAction::Substitute).unwrap(),
        FileOutcome::Substituted {
            result: "room #".into()
        }
    );
    assert!(!bench.in_flight().file);
}

#[test]
fn test_load_rule_seeds_refinable_draft() {
    let mut bench = ready_bench();
    let rule = Rule {
        id: "pct".into(),
        description: "Spell out percent".into(),
        find: r"(\d+)%".into(),
        replace: "$1 percent".into(),
        case_sensitive: true,
        whole_word: true,
        ..Rule::default()
    };
    bench.load_rule(&rule);

    let draft = bench.draft().unwrap();
    assert_eq!(draft.edited().replace, "$1 percent");
    assert_eq!(draft.explanation(), "Spell out percent");
    assert!(draft.generation_context().contains("Match ENTIRE WORDS ONLY"));
    assert_eq!(draft.origin(), &DraftOrigin::Rule { id: "pct".into() });
    assert!(bench.options().case_sensitive);
    assert!(bench.begin_refinement("only integers").is_ok());
}

#[test]
fn test_log_survives_generation_until_cleared() {
    let mut bench = ready_bench();
    let (ticket, _) = bench.begin_refinement("more").unwrap();
    bench
        .complete_refinement(ticket, Err(AssistError::capability("x")))
        .unwrap_err();
    let ticket = bench.begin_generation(PatternSpecification::new("b")).unwrap();
    bench.complete_generation(ticket, Ok(outcome("b", ""))).unwrap();
    assert_eq!(bench.session().len(), 2);

    let id = bench.session().id().to_string();
    bench.clear_session();
    assert!(bench.session().is_empty());
    assert_eq!(bench.session().id(), id);
    assert!(bench.draft().is_some());
}

#[tokio::test]
async fn test_async_round_trip_with_scripted_provider() {
    let scripted = ScriptedCompletion::with_responses([
        r"\d+|||#",
        "explain one",
        r"\d{1,3}(,\d{3})*|||#",
    ]);
    scripted.push_err(CompletionError::Failed("explain down".into()));
    let assistant = PatternAssistant::new(Arc::new(scripted.clone()));

    let mut bench = Workbench::new();
    let spec =
        PatternSpecification::new("numbers").with_example(ExamplePair::new("I have 42 apples"));
    bench.generate(&assistant, spec).await.unwrap();
    assert_eq!(bench.test_on_text("I have 42 apples", false).unwrap().len(), 1);

    bench
        .refine(&assistant, "also match numbers with commas")
        .await
        .unwrap();
    let draft = bench.draft().unwrap();
    assert_eq!(draft.edited().find, r"\d{1,3}(,\d{3})*");
    assert_eq!(draft.explanation(), EXPLANATION_PLACEHOLDER);
    assert_eq!(bench.session().len(), 2);

    let matches = bench.test_on_text("total 1,234,567", false).unwrap();
    assert_eq!(matches[0].matched, "1,234,567");
    assert_eq!(scripted.remaining(), 0);
}
