use crate::models::{ActivityRecord, Category, FieldChange, RawResource};
use crate::parsers::activity::{MalformedActivity, parse_activity};

/// Change fields that identify a status transition
pub const STATUS_FIELDS: &[&str] = &["status_id", "workflow_status_id", "status", "workflow_status"];

/// Change fields that identify an assignment change
pub const ASSIGNEE_FIELDS: &[&str] = &["assignee_id", "assignee", "assignee_ids"];

/// Decides whether an activity marks a milestone, and describes it
pub trait MilestonePredicate {
    fn milestone(&self, record: &ActivityRecord) -> Option<String>;
}

impl<F> MilestonePredicate for F
where
    F: Fn(&ActivityRecord) -> Option<String>,
{
    fn milestone(&self, record: &ActivityRecord) -> Option<String> {
        self(record)
    }
}

/// Keyword-based milestone detection
///
/// Matches a keyword (case-insensitive) in the activity body or item name, or an
/// event type designated as a deliverable marker. The description is the text after
/// a `<keyword>:` prefix when there is one, otherwise the whole text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMilestones {
    keywords: Vec<String>,
    event_types: Vec<String>,
}

impl KeywordMilestones {
    pub fn new<K, E>(keywords: K, event_types: E) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(|k| k.into().to_ascii_lowercase()).collect(),
            event_types: event_types.into_iter().map(Into::into).collect(),
        }
    }

    fn describe(&self, text: &str) -> Option<String> {
        let lower = text.to_ascii_lowercase();
        self.keywords.iter().find_map(|keyword| {
            let start = lower.find(keyword.as_str())?;
            let rest = text[start + keyword.len()..].trim_start();
            let description = match rest.strip_prefix(':') {
                Some(after) if !after.trim().is_empty() => after.trim(),
                _ => text.trim(),
            };
            Some(description.to_string())
        })
    }
}

impl Default for KeywordMilestones {
    fn default() -> Self {
        Self::new(["milestone"], ["milestone"])
    }
}

impl MilestonePredicate for KeywordMilestones {
    fn milestone(&self, record: &ActivityRecord) -> Option<String> {
        let texts = [record.body(), record.item_name.as_deref()];

        if let Some(description) = texts.iter().flatten().find_map(|text| self.describe(text)) {
            return Some(description);
        }

        let marker_event = record
            .event_type
            .as_deref()
            .is_some_and(|event| self.event_types.iter().any(|m| m.eq_ignore_ascii_case(event)));
        if marker_event {
            let description = texts
                .iter()
                .flatten()
                .map(|text| text.trim())
                .find(|text| !text.is_empty())
                .unwrap_or("Milestone");
            return Some(description.to_string());
        }

        None
    }
}

/// Everything an activity says about its subject; one record may carry several facets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facets {
    pub status: Option<FieldChange>,
    pub assignment: Option<FieldChange>,
    pub milestone: Option<String>,
}

impl Facets {
    /// All categories in priority order; `Generic` when nothing else applies
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();
        if self.status.is_some() {
            categories.push(Category::StatusChange);
        }
        if self.assignment.is_some() {
            categories.push(Category::AssignmentChange);
        }
        if self.milestone.is_some() {
            categories.push(Category::Milestone);
        }
        if categories.is_empty() {
            categories.push(Category::Generic);
        }
        categories
    }

    /// Highest-priority category
    pub fn primary(&self) -> Category {
        self.categories().first().copied().unwrap_or(Category::Generic)
    }
}

/// A parsed activity together with its facets
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedActivity {
    pub record: ActivityRecord,
    pub facets: Facets,
}

impl ClassifiedActivity {
    pub fn category(&self) -> Category {
        self.facets.primary()
    }
}

/// Derive the facets of a parsed record
///
/// Status and assignment deltas are independent facets. Milestone heuristics only
/// run for records that carry neither.
pub fn facets<P>(record: &ActivityRecord, milestones: &P) -> Facets
where
    P: MilestonePredicate + ?Sized,
{
    let find = |fields: &[&str]| {
        record.changes().iter().find(|change| fields.contains(&change.field.as_str())).cloned()
    };

    let status = find(STATUS_FIELDS);
    let assignment = find(ASSIGNEE_FIELDS);
    let milestone = if status.is_none() && assignment.is_none() {
        milestones.milestone(record)
    } else {
        None
    };

    Facets { status, assignment, milestone }
}

/// Parse and classify one raw activity
pub fn classify<P>(raw: &RawResource, milestones: &P) -> Result<ClassifiedActivity, MalformedActivity>
where
    P: MilestonePredicate + ?Sized,
{
    let record = parse_activity(raw)?;
    let facets = facets(&record, milestones);
    Ok(ClassifiedActivity { record, facets })
}
