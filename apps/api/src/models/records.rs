use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored record as it comes back from the record store: arbitrary keys, any field may be absent.
pub type RawRecord = Map<String, Value>;

/// The two record collections the service reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Postings,
    Profiles,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::Postings => "postings",
            Collection::Profiles => "profiles",
        }
    }

    /// The fixed field set accepted on insert, in column order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Collection::Postings => &[
                "title",
                "company",
                "location",
                "about",
                "description",
                "responsibilities",
                "qualifications",
                "preferred",
            ],
            Collection::Profiles => &[
                "name",
                "profile",
                "preferences",
                "experience",
                "education",
                "skills",
                "extracurriculars",
            ],
        }
    }
}

/// Job posting form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingInput {
    pub title: String,
    pub company: String,
    pub location: String,
    pub about: String,
    pub description: String,
    pub responsibilities: String,
    pub qualifications: String,
    pub preferred: String,
}

/// Candidate profile form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    pub name: String,
    pub profile: String,
    pub preferences: String,
    pub experience: String,
    pub education: String,
    pub skills: String,
    pub extracurriculars: String,
}

/// Converts a typed form into the raw key/value shape the store persists.
pub fn to_raw_record<T: Serialize>(input: &T) -> RawRecord {
    match serde_json::to_value(input) {
        Ok(Value::Object(map)) => map,
        _ => RawRecord::new(),
    }
}
