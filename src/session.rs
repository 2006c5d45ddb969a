//! Form session
//!
//! Host-neutral state behind a form page: the loaded forms, the selected
//! form, its answer map and the dynamic option cache. Hosts own the event
//! loop; they call into the session on user input, schedule debounced
//! [`FormSession::persist_draft`] calls, and run option fetches.

use serde_json::Value;
use tracing::info;

use crate::domain::{AnswerMap, AnswerValue, FetchError, FormDefinition, FormError};
use crate::drafts::DraftStore;
use crate::engine::{self, OptionFetcher, OptionRequest, OptionResolver, RenderNode};

pub struct FormSession<S: DraftStore> {
    forms: Vec<FormDefinition>,
    selected: Option<usize>,
    answers: AnswerMap,
    resolver: OptionResolver,
    drafts: S,
    dirty: bool,
}

impl<S: DraftStore> FormSession<S> {
    pub fn new(drafts: S) -> Self {
        Self {
            forms: Vec::new(),
            selected: None,
            answers: AnswerMap::new(),
            resolver: OptionResolver::new(),
            drafts,
            dirty: false,
        }
    }

    /// Replaces the form list and selects the first form, if any
    pub fn load_forms(&mut self, forms: Vec<FormDefinition>) -> Result<(), FormError> {
        self.forms = forms;
        self.selected = None;
        self.answers.clear();
        self.resolver.reset();

        match self.forms.first().map(|f| f.form_id.clone()) {
            Some(first) => self.select_form(&first),
            None => Ok(()),
        }
    }

    pub fn forms(&self) -> &[FormDefinition] {
        &self.forms
    }

    pub fn selected_form(&self) -> Option<&FormDefinition> {
        self.selected.map(|i| &self.forms[i])
    }

    /// Selects a form and restores its draft (or starts empty).
    ///
    /// The schema is checked first; a rejected schema leaves the current
    /// selection untouched.
    pub fn select_form(&mut self, form_id: &str) -> Result<(), FormError> {
        let index = self
            .forms
            .iter()
            .position(|f| f.form_id == form_id)
            .ok_or_else(|| FormError::FormNotFound(form_id.to_string()))?;

        engine::check_schema(&self.forms[index].fields)?;

        self.selected = Some(index);
        self.resolver.reset();
        self.answers = self.drafts.load(form_id)?.unwrap_or_default();
        self.dirty = false;
        Ok(())
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Applies a change event from an input
    pub fn set_answer(&mut self, id: impl Into<String>, value: impl Into<AnswerValue>) {
        self.answers.set(id, value);
        self.dirty = true;
    }

    /// Applies a multi-select checkbox change
    pub fn toggle_choice(&mut self, id: &str, value: &str, checked: bool) {
        self.answers.toggle_choice(id, value, checked);
        self.dirty = true;
    }

    /// True when answers changed since the last persisted draft
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn drafts(&self) -> &S {
        &self.drafts
    }

    /// Writes the current answers under the selected form's draft key
    pub fn persist_draft(&mut self) -> Result<(), FormError> {
        let form_id = self.selected_form().ok_or(FormError::NoFormSelected)?.form_id.clone();
        self.drafts.save(&form_id, &self.answers)?;
        self.dirty = false;
        Ok(())
    }

    /// Option requests needed for the current answers
    pub fn plan_options(&mut self) -> Vec<OptionRequest> {
        match self.selected {
            Some(i) => self.resolver.plan(&self.forms[i].fields, &self.answers),
            None => Vec::new(),
        }
    }

    /// Merges a completed option fetch; false when it was stale
    pub fn apply_options(&mut self, request: &OptionRequest, outcome: Result<Value, FetchError>) -> bool {
        self.resolver.apply(request, outcome)
    }

    /// Plans, fetches and merges option lists for the current answers
    pub async fn resolve_options<F>(&mut self, fetcher: &F)
    where
        F: OptionFetcher + ?Sized,
    {
        if let Some(i) = self.selected {
            self.resolver.resolve(fetcher, &self.forms[i].fields, &self.answers).await;
        }
    }

    /// Render tree for the selected form, always derived from the latest answers
    pub fn render(&self) -> Vec<RenderNode> {
        match self.selected_form() {
            Some(form) => engine::build_render_tree(&form.fields, &self.answers, &self.resolver),
            None => Vec::new(),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        match self.selected_form() {
            Some(form) => engine::validate(&form.fields, &self.answers),
            None => Vec::new(),
        }
    }

    /// Answers to post, or the validation messages blocking submission
    pub fn prepare_submission(&self) -> Result<&AnswerMap, FormError> {
        if self.selected.is_none() {
            return Err(FormError::NoFormSelected);
        }
        let errors = self.validate();
        if errors.is_empty() {
            Ok(&self.answers)
        } else {
            Err(FormError::Validation(errors))
        }
    }

    /// Clears what the API accepted for `form_id`.
    ///
    /// Answers edited while the request was in flight are kept and written as
    /// the new draft. A draft that no longer matches the posted answers is
    /// left alone.
    pub fn complete_submission(&mut self, form_id: &str, submitted: &AnswerMap) -> Result<(), FormError> {
        let is_selected = self.selected_form().is_some_and(|f| f.form_id == form_id);

        if !is_selected {
            if self.drafts.load(form_id)?.as_ref() == Some(submitted) {
                self.drafts.remove(form_id)?;
            }
            info!("Form {} submitted", form_id);
            return Ok(());
        }

        if &self.answers == submitted {
            info!("Form {} submitted, clearing draft", form_id);
            self.answers.clear();
            self.drafts.remove(form_id)?;
        } else {
            info!("Form {} submitted, keeping answers edited since", form_id);
            self.drafts.save(form_id, &self.answers)?;
        }
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldDescriptor, FieldType};
    use crate::drafts::InMemoryDraftStore;
    use serde_json::json;

    fn forms() -> Vec<FormDefinition> {
        vec![
            FormDefinition {
                form_id: "home".to_string(),
                title: "Home".to_string(),
                fields: vec![
                    FieldDescriptor::new("owner", "Owner", FieldType::Text).required(),
                    FieldDescriptor::new("country", "Country", FieldType::Select).with_options(["US", "CA"]),
                    FieldDescriptor::new("state", "State", FieldType::Select).with_dynamic_options("country", "/states"),
                ],
            },
            FormDefinition {
                form_id: "auto".to_string(),
                title: "Auto".to_string(),
                fields: vec![FieldDescriptor::new("plate", "Plate", FieldType::Text)],
            },
        ]
    }

    #[test]
    fn test_first_form_is_selected() {
        let mut session = FormSession::new(InMemoryDraftStore::new());
        session.load_forms(forms()).unwrap();
        assert_eq!(session.selected_form().unwrap().form_id, "home");
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_draft_restored_per_form() {
        let mut session = FormSession::new(InMemoryDraftStore::new());
        session.load_forms(forms()).unwrap();
        session.set_answer("owner", "Ada");
        assert!(session.is_dirty());
        session.persist_draft().unwrap();
        assert!(!session.is_dirty());

        session.select_form("auto").unwrap();
        assert!(session.answers().is_empty());

        session.select_form("home").unwrap();
        assert_eq!(session.answers().text("owner"), Some("Ada"));
    }

    #[test]
    fn test_unknown_form() {
        let mut session = FormSession::new(InMemoryDraftStore::new());
        session.load_forms(forms()).unwrap();
        assert!(matches!(session.select_form("boat"), Err(FormError::FormNotFound(_))));
        assert_eq!(session.selected_form().unwrap().form_id, "home");
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let mut broken = forms();
        broken[1].fields.push(FieldDescriptor::new("plate", "Again", FieldType::Text));
        let mut session = FormSession::new(InMemoryDraftStore::new());
        session.load_forms(broken).unwrap();
        assert!(matches!(session.select_form("auto"), Err(FormError::Schema(_))));
        assert_eq!(session.selected_form().unwrap().form_id, "home");
    }

    #[test]
    fn test_submission_flow() {
        let mut session = FormSession::new(InMemoryDraftStore::new());
        session.load_forms(forms()).unwrap();

        match session.prepare_submission() {
            Err(FormError::Validation(errors)) => assert_eq!(errors, vec!["\"Owner\" is required".to_string()]),
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }

        session.set_answer("owner", "Ada");
        session.persist_draft().unwrap();
        let posted = session.prepare_submission().unwrap().clone();
        assert_eq!(posted.text("owner"), Some("Ada"));

        session.complete_submission("home", &posted).unwrap();
        assert!(session.answers().is_empty());
        assert_eq!(session.drafts().entry("draft-home"), None);
    }

    #[test]
    fn test_edits_during_submission_are_kept() {
        let mut session = FormSession::new(InMemoryDraftStore::new());
        session.load_forms(forms()).unwrap();
        session.set_answer("owner", "Ada");
        let posted = session.prepare_submission().unwrap().clone();

        session.set_answer("country", "CA");
        session.complete_submission("home", &posted).unwrap();

        assert_eq!(session.answers().text("owner"), Some("Ada"));
        assert_eq!(session.answers().text("country"), Some("CA"));
        assert!(!session.is_dirty());
        let draft = session.drafts().load("home").unwrap().unwrap();
        assert_eq!(draft.text("country"), Some("CA"));
    }

    #[test]
    fn test_submission_for_other_form_only_clears_matching_draft() {
        let mut session = FormSession::new(InMemoryDraftStore::new());
        session.load_forms(forms()).unwrap();
        session.set_answer("owner", "Ada");
        session.persist_draft().unwrap();
        let posted = session.prepare_submission().unwrap().clone();

        session.select_form("auto").unwrap();
        session.set_answer("plate", "XYZ");
        session.complete_submission("home", &posted).unwrap();

        assert_eq!(session.drafts().entry("draft-home"), None);
        assert_eq!(session.answers().text("plate"), Some("XYZ"));
    }

    #[test]
    fn test_options_follow_dependency() {
        let mut session = FormSession::new(InMemoryDraftStore::new());
        session.load_forms(forms()).unwrap();
        assert!(session.plan_options().is_empty());
        assert!(session.render()[2].disabled);

        session.set_answer("country", "US");
        let requests = session.plan_options();
        assert_eq!(requests[0].url(), "/states?country=US");
        assert!(session.render()[2].disabled);

        assert!(session.apply_options(&requests[0], Ok(json!(["CA", "NY"]))));
        let state = &session.render()[2];
        assert!(!state.disabled);
        assert_eq!(state.options.len(), 2);
    }
}
