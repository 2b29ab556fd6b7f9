//! Single-session workbench: the draft state machine, the refinement log and
//! one in-flight ticket per action category.
//!
//! Every asynchronous action is split into `begin_*` (validate, issue a ticket)
//! and `complete_*` (apply the result if the ticket is still current). A result
//! whose ticket was superseded or cancelled is dropped as [`Applied::Stale`].

use crate::application::assistant::{
    ConvertInput, GenerationOutcome, PatternAssistant, REFINE_ACKNOWLEDGMENT, RefineInput,
    RefinementOutcome, refine_failure_message, render_generation_context, validate_conversion,
    validate_refinement, validate_specification,
};
use crate::application::files::{FileAction, FileJob, FileOutcome, process_file};
use crate::application::pattern::{
    DEFAULT_CONTEXT_RADIUS, DEFAULT_SIZE_LIMIT, MatchFlags, PatternMatcher, ReplaceMode,
};
use crate::domain::{
    AssistError, ConvertedPattern, DraftOrigin, MatchResult, PatternDraft, PatternOptions,
    PatternPair, PatternSpecification, RefinementSession, Rule, TargetDialect,
};
use crate::infra::app_config::AppConfig;
use crate::infra::extract::UploadedFile;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

const NO_DRAFT: &str = "No pattern yet. Generate a pattern first";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Generation,
    Testing,
    File,
    Refinement,
    Conversion,
}

/// Handle for one in-flight action.
#[derive(Debug, Clone)]
pub struct Ticket {
    action: Action,
    seq: u64,
    cancel: CancellationToken,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InFlight {
    pub generation: bool,
    pub testing: bool,
    pub file: bool,
    pub refinement: bool,
    pub conversion: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPhase {
    Empty,
    Generating,
    Ready,
    Refining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    Stale,
}

#[derive(Debug)]
pub struct Workbench {
    specification: Option<PatternSpecification>,
    options: PatternOptions,
    draft: Option<PatternDraft>,
    session: RefinementSession,
    converted: Option<ConvertedPattern>,
    last_error: Option<AssistError>,
    context_radius: usize,
    size_limit: usize,
    next_seq: u64,
    active: HashMap<Action, Ticket>,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbench {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CONTEXT_RADIUS, DEFAULT_SIZE_LIMIT)
    }

    pub fn with_limits(context_radius: usize, size_limit: usize) -> Self {
        Self {
            specification: None,
            options: PatternOptions::default(),
            draft: None,
            session: RefinementSession::new(),
            converted: None,
            last_error: None,
            context_radius,
            size_limit,
            next_seq: 0,
            active: HashMap::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_limits(config.context_radius, config.regex_size_limit)
    }

    pub fn phase(&self) -> DraftPhase {
        if self.is_in_flight(Action::Generation) {
            DraftPhase::Generating
        } else if self.draft.is_none() {
            DraftPhase::Empty
        } else if self.is_in_flight(Action::Refinement) {
            DraftPhase::Refining
        } else {
            DraftPhase::Ready
        }
    }

    pub fn is_in_flight(&self, action: Action) -> bool {
        self.active.contains_key(&action)
    }

    pub fn in_flight(&self) -> InFlight {
        InFlight {
            generation: self.is_in_flight(Action::Generation),
            testing: self.is_in_flight(Action::Testing),
            file: self.is_in_flight(Action::File),
            refinement: self.is_in_flight(Action::Refinement),
            conversion: self.is_in_flight(Action::Conversion),
        }
    }

    pub fn draft(&self) -> Option<&PatternDraft> {
        self.draft.as_ref()
    }

    pub fn session(&self) -> &RefinementSession {
        &self.session
    }

    pub fn converted(&self) -> Option<&ConvertedPattern> {
        self.converted.as_ref()
    }

    pub fn last_error(&self) -> Option<&AssistError> {
        self.last_error.as_ref()
    }

    pub fn specification(&self) -> Option<&PatternSpecification> {
        self.specification.as_ref()
    }

    pub fn options(&self) -> PatternOptions {
        self.options
    }

    pub fn set_options(&mut self, options: PatternOptions) {
        self.options = options;
    }

    fn flags(&self) -> MatchFlags {
        MatchFlags {
            case_sensitive: self.options.case_sensitive,
            size_limit: self.size_limit,
        }
    }

    fn issue(&mut self, action: Action) -> Ticket {
        self.cancel(action);
        self.next_seq += 1;
        let ticket = Ticket {
            action,
            seq: self.next_seq,
            cancel: CancellationToken::new(),
        };
        debug!(target: "workbench", "begin {action:?} #{}", ticket.seq);
        self.active.insert(action, ticket.clone());
        ticket
    }

    fn cancel(&mut self, action: Action) {
        if let Some(previous) = self.active.remove(&action) {
            debug!(target: "workbench", "cancel {action:?} #{}", previous.seq);
            previous.cancel.cancel();
        }
    }

    /// Retire `ticket`. Returns false when it is no longer the current one.
    fn finish(&mut self, ticket: &Ticket) -> bool {
        let current = self
            .active
            .get(&ticket.action)
            .is_some_and(|active| active.seq == ticket.seq);
        if current {
            self.active.remove(&ticket.action);
        } else {
            debug!(
                target: "workbench",
                "discarding stale {:?} #{} result",
                ticket.action,
                ticket.seq
            );
        }
        current
    }

    fn reset_draft(&mut self) {
        self.cancel(Action::Refinement);
        self.cancel(Action::Conversion);
        self.draft = None;
        self.converted = None;
        self.last_error = None;
    }

    /// Empty → Generating. Any refinement or conversion in flight is cancelled.
    pub fn begin_generation(&mut self, spec: PatternSpecification) -> Result<Ticket, AssistError> {
        validate_specification(&spec)?;
        self.reset_draft();
        self.options = spec.options;
        self.specification = Some(spec);
        Ok(self.issue(Action::Generation))
    }

    pub fn complete_generation(
        &mut self,
        ticket: Ticket,
        result: Result<GenerationOutcome, AssistError>,
    ) -> Result<Applied, AssistError> {
        if !self.finish(&ticket) {
            return Ok(Applied::Stale);
        }
        match result {
            Ok(outcome) => {
                self.draft = Some(PatternDraft::new(
                    outcome.pair,
                    outcome.explanation,
                    outcome.generation_context,
                    DraftOrigin::Generated,
                ));
                Ok(Applied::Current)
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Ready → Refining. The user turn is logged once the request is valid.
    pub fn begin_refinement(
        &mut self,
        feedback: &str,
    ) -> Result<(Ticket, RefineInput), AssistError> {
        let draft = self
            .draft
            .as_ref()
            .ok_or_else(|| AssistError::validation(NO_DRAFT))?;
        let input = RefineInput {
            generation_context: draft.generation_context().to_string(),
            current: draft.edited().clone(),
            feedback: feedback.trim().to_string(),
            options: self.options,
        };
        validate_refinement(&input)?;

        self.session.push_user(input.feedback.clone());
        Ok((self.issue(Action::Refinement), input))
    }

    pub fn complete_refinement(
        &mut self,
        ticket: Ticket,
        result: Result<RefinementOutcome, AssistError>,
    ) -> Result<Applied, AssistError> {
        if !self.finish(&ticket) {
            return Ok(Applied::Stale);
        }
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                self.session.push_assistant(refine_failure_message(err.details()));
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };
        let turn = self.session.len();
        let Some(draft) = self.draft.as_mut() else {
            return Ok(Applied::Stale);
        };
        draft.apply_refinement(outcome.pair, outcome.explanation, turn);
        self.session.push_assistant(REFINE_ACKNOWLEDGMENT);
        self.invalidate_conversion();
        Ok(Applied::Current)
    }

    /// The converted values describe a pair that no longer exists.
    fn invalidate_conversion(&mut self) {
        self.cancel(Action::Conversion);
        self.converted = None;
    }

    pub fn begin_conversion(
        &mut self,
        dialect: TargetDialect,
    ) -> Result<(Ticket, ConvertInput), AssistError> {
        let draft = self
            .draft
            .as_ref()
            .ok_or_else(|| AssistError::validation(NO_DRAFT))?;
        let input = ConvertInput {
            pair: draft.edited().clone(),
            description: self.specification.as_ref().map(|s| s.description.clone()),
            dialect,
        };
        validate_conversion(&input)?;
        Ok((self.issue(Action::Conversion), input))
    }

    /// A failed conversion blanks previously converted values.
    pub fn complete_conversion(
        &mut self,
        ticket: Ticket,
        result: Result<ConvertedPattern, AssistError>,
    ) -> Result<Applied, AssistError> {
        if !self.finish(&ticket) {
            return Ok(Applied::Stale);
        }
        match result {
            Ok(converted) => {
                self.converted = Some(converted);
                Ok(Applied::Current)
            }
            Err(err) => {
                self.converted = None;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn edit_find(&mut self, find: impl Into<String>) -> Result<(), AssistError> {
        let draft = self
            .draft
            .as_mut()
            .ok_or_else(|| AssistError::validation(NO_DRAFT))?;
        draft.set_edited_find(find);
        self.invalidate_conversion();
        Ok(())
    }

    pub fn edit_replace(&mut self, replace: impl Into<String>) -> Result<(), AssistError> {
        let draft = self
            .draft
            .as_mut()
            .ok_or_else(|| AssistError::validation(NO_DRAFT))?;
        draft.set_edited_replace(replace);
        self.invalidate_conversion();
        Ok(())
    }

    fn edited_pair(&self) -> Result<PatternPair, AssistError> {
        let pair = self
            .draft
            .as_ref()
            .map(|draft| draft.edited().clone())
            .ok_or_else(|| AssistError::validation(NO_DRAFT))?;
        if pair.find.is_empty() {
            return Err(AssistError::validation("Find pattern is required"));
        }
        Ok(pair)
    }

    /// Test the edited find pattern. `with_context` attaches snippets.
    pub fn test_on_text(
        &mut self,
        subject: &str,
        with_context: bool,
    ) -> Result<Vec<MatchResult>, AssistError> {
        let pair = self.edited_pair()?;
        let ticket = self.issue(Action::Testing);
        let result = PatternMatcher::compile(&pair.find, self.flags()).map(|matcher| {
            if with_context {
                matcher.find_all_with_context(subject, self.context_radius)
            } else {
                matcher.find_all(subject)
            }
        });
        self.finish(&ticket);
        result
    }

    pub fn substitute_on_text(
        &mut self,
        subject: &str,
        mode: ReplaceMode,
    ) -> Result<String, AssistError> {
        let pair = self.edited_pair()?;
        let ticket = self.issue(Action::Testing);
        let result = PatternMatcher::compile(&pair.find, self.flags())
            .map(|matcher| matcher.substitute(subject, &pair.replace, mode));
        self.finish(&ticket);
        result
    }

    pub fn test_on_file(
        &mut self,
        file: &UploadedFile,
        action: FileAction,
    ) -> Result<FileOutcome, AssistError> {
        let pair = self.edited_pair()?;
        let ticket = self.issue(Action::File);
        let result = process_file(&FileJob {
            file: Some(file),
            find: Some(&pair.find),
            replace: Some(&pair.replace),
            action,
            flags: self.flags(),
            context_radius: self.context_radius,
        });
        self.finish(&ticket);
        result
    }

    /// Seed the draft from a dictionary rule so it can be tested and refined.
    pub fn load_rule(&mut self, rule: &Rule) {
        self.cancel(Action::Generation);
        self.reset_draft();
        let spec = rule.to_specification();
        self.options = spec.options;
        self.draft = Some(PatternDraft::new(
            PatternPair::new(rule.find.clone(), rule.replace.clone()),
            rule.description.clone(),
            render_generation_context(&spec),
            DraftOrigin::Rule {
                id: rule.id.clone(),
            },
        ));
        self.specification = Some(spec);
        debug!(target: "workbench", "loaded rule {}", rule.id);
    }

    /// Empty the refinement log. The draft is kept.
    pub fn clear_session(&mut self) {
        self.session.clear();
    }

    pub async fn generate(
        &mut self,
        assistant: &PatternAssistant,
        spec: PatternSpecification,
    ) -> Result<Applied, AssistError> {
        let ticket = self.begin_generation(spec)?;
        let spec = self.specification.clone().unwrap_or_default();
        let result = assistant.generate(&spec, Some(ticket.cancel_token())).await;
        self.complete_generation(ticket, result)
    }

    pub async fn refine(
        &mut self,
        assistant: &PatternAssistant,
        feedback: &str,
    ) -> Result<Applied, AssistError> {
        let (ticket, input) = self.begin_refinement(feedback)?;
        let result = assistant.refine(&input, Some(ticket.cancel_token())).await;
        self.complete_refinement(ticket, result)
    }

    pub async fn convert(
        &mut self,
        assistant: &PatternAssistant,
        dialect: TargetDialect,
    ) -> Result<Applied, AssistError> {
        let (ticket, input) = self.begin_conversion(dialect)?;
        let result = assistant.convert(&input, Some(ticket.cancel_token())).await;
        self.complete_conversion(ticket, result)
    }
}

#[cfg(test)]
mod tests;
