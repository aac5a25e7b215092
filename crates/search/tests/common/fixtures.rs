//! Sample fixtures.

use std::borrow::Cow;

use chrono::{DateTime, TimeZone, Utc};

use labbase_search::session::{SearchContext, SessionToken};
use labbase_search::types::{Candidate, SortValue, Sortable};

/// A sample as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFixture {
    /// Technical id.
    pub tech_id: i64,
    /// Permanent id.
    pub perm_id: String,
    /// Code.
    pub code: String,
    /// Code of the sample type.
    pub type_code: String,
    /// Space code.
    pub space: String,
    /// Free-text name, if any.
    pub name: Option<String>,
    /// Registration timestamp.
    pub registered: DateTime<Utc>,
}

impl SampleFixture {
    /// Creates a sample of type PLATE in space LAB.
    pub fn new(tech_id: i64, code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            tech_id,
            perm_id: format!("20250101-{tech_id}"),
            code,
            type_code: "PLATE".to_string(),
            space: "LAB".to_string(),
            name: None,
            registered: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::days(tech_id),
        }
    }

    /// Sets the sample type.
    pub fn with_type(mut self, type_code: impl Into<String>) -> Self {
        self.type_code = type_code.into();
        self
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the space.
    pub fn with_space(mut self, space: impl Into<String>) -> Self {
        self.space = space.into();
        self
    }

    /// Returns the hierarchical identifier, e.g. `/LAB/S1`.
    pub fn identifier(&self) -> String {
        format!("/{}/{}", self.space, self.code)
    }
}

impl Candidate for SampleFixture {
    fn code(&self) -> &str {
        &self.code
    }

    fn perm_id(&self) -> &str {
        &self.perm_id
    }

    fn type_code(&self) -> Option<&str> {
        Some(&self.type_code)
    }

    fn text_field(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "name" => self.name.as_deref().map(Cow::Borrowed),
            "code" => Some(Cow::Borrowed(&self.code)),
            "space" => Some(Cow::Borrowed(&self.space)),
            "identifier" => Some(Cow::Owned(self.identifier())),
            _ => None,
        }
    }
}

/// A sample as returned to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleView {
    /// Permanent id.
    pub perm_id: String,
    /// Code.
    pub code: String,
    /// Name.
    pub name: Option<String>,
    /// Registration timestamp.
    pub registered: DateTime<Utc>,
}

impl From<SampleFixture> for SampleView {
    fn from(sample: SampleFixture) -> Self {
        Self {
            perm_id: sample.perm_id,
            code: sample.code,
            name: sample.name,
            registered: sample.registered,
        }
    }
}

impl Sortable for SampleView {
    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "code" => self.code.as_str().into(),
            "name" => self.name.clone().into(),
            "registration_date" => self.registered.into(),
            _ => SortValue::Null,
        }
    }
}

/// The three-sample collection used by the basic scenarios:
/// A, B (named "bx") and C.
pub fn abc_samples() -> Vec<SampleFixture> {
    vec![
        SampleFixture::new(1, "A").with_name("ax"),
        SampleFixture::new(2, "B").with_name("bx").with_type("WELL"),
        SampleFixture::new(3, "C"),
    ]
}

/// A larger collection spread over two spaces and three types.
pub fn lab_samples() -> Vec<SampleFixture> {
    vec![
        SampleFixture::new(11, "PLATE-1").with_name("Plate one"),
        SampleFixture::new(12, "PLATE-2").with_name("plate two"),
        SampleFixture::new(13, "WELL-A1").with_type("WELL").with_name("A1 well"),
        SampleFixture::new(14, "WELL-A2").with_type("WELL"),
        SampleFixture::new(15, "CELL-HELA")
            .with_type("CELL_LINE")
            .with_space("BIO")
            .with_name("HeLa"),
        SampleFixture::new(16, "CELL-CHO")
            .with_type("CELL_LINE")
            .with_space("BIO")
            .with_name("CHO-K1"),
        SampleFixture::new(17, "PLATE-3").with_space("BIO"),
    ]
}

/// Codes of a list of views, in order.
pub fn codes(views: &[SampleView]) -> Vec<&str> {
    views.iter().map(|v| v.code.as_str()).collect()
}

/// A context for the given session.
pub fn context(session: &str) -> SearchContext {
    SearchContext::new(SessionToken::new(session)).with_user_id("tester")
}
