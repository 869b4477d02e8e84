//! Match Request Builder: maps raw stored records onto the matchmaking service's fixed DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::records::RawRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingDto {
    #[serde(rename = "ID")]
    pub id: u32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub about: String,
    pub job_description: String,
    pub responsibilities: String,
    pub qualifications: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDto {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Profile")]
    pub profile: String,
    pub experience: String,
    pub education: String,
    pub skills: String,
    pub extracurricular: String,
    pub preferences: String,
}

/// Body of the outbound matchmaking call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub postings: Vec<PostingDto>,
    pub profiles: Vec<ProfileDto>,
}

impl MatchRequest {
    /// Ids are 1-based positions in the given order, not stored keys.
    pub fn build(postings: &[RawRecord], profiles: &[RawRecord]) -> Self {
        MatchRequest {
            postings: postings
                .iter()
                .zip(1..)
                .map(|(record, id)| posting_dto(id, record))
                .collect(),
            profiles: profiles
                .iter()
                .zip(1..)
                .map(|(record, id)| profile_dto(id, record))
                .collect(),
        }
    }
}

fn posting_dto(id: u32, record: &RawRecord) -> PostingDto {
    PostingDto {
        id,
        title: text_field(record, "title"),
        company: text_field(record, "company"),
        location: text_field(record, "location"),
        about: text_field(record, "about"),
        job_description: text_field(record, "description"),
        responsibilities: text_field(record, "responsibilities"),
        qualifications: text_field(record, "qualifications"),
    }
}

fn profile_dto(id: u32, record: &RawRecord) -> ProfileDto {
    ProfileDto {
        id,
        name: text_field(record, "name"),
        profile: text_field(record, "profile"),
        experience: text_field(record, "experience"),
        education: text_field(record, "education"),
        skills: text_field(record, "skills"),
        extracurricular: text_field(record, "extracurriculars"),
        preferences: text_field(record, "preferences"),
    }
}

/// Absent and falsy values (null, false, 0, "") become empty text.
fn text_field(record: &RawRecord, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(value @ (Value::Array(_) | Value::Object(_))) => value.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<RawRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_ids_are_positional_and_absent_fields_empty() {
        let postings = records(json!([{"title": "A"}, {}]));

        let request = MatchRequest::build(&postings, &[]);

        assert_eq!(request.postings.len(), 2);
        assert_eq!(request.postings[0].id, 1);
        assert_eq!(request.postings[0].title, "A");
        assert_eq!(request.postings[0].company, "");
        assert_eq!(request.postings[0].job_description, "");
        assert_eq!(request.postings[1].id, 2);
        assert_eq!(request.postings[1].title, "");
        assert!(request.profiles.is_empty());
    }

    #[test]
    fn test_stored_primary_key_is_ignored() {
        let profiles = records(json!([{"id": 42, "name": "Ada"}, {"id": 7, "name": "Grace"}]));

        let request = MatchRequest::build(&[], &profiles);

        let ids: Vec<_> = request.profiles.iter().map(|p| p.id).collect();
        let names: Vec<_> = request.profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(names, vec!["Ada", "Grace"]);
    }

    #[test]
    fn test_renamed_fields_are_mapped() {
        let postings = records(json!([{"description": "Build things"}]));
        let profiles = records(json!([{"profile": "Engineer", "extracurriculars": "Chess"}]));

        let request = MatchRequest::build(&postings, &profiles);

        assert_eq!(request.postings[0].job_description, "Build things");
        assert_eq!(request.profiles[0].profile, "Engineer");
        assert_eq!(request.profiles[0].extracurricular, "Chess");
    }

    #[test]
    fn test_null_and_falsy_values_coalesce_to_empty() {
        let profiles = records(json!([{"name": null, "skills": false, "education": 0}]));

        let request = MatchRequest::build(&[], &profiles);

        assert_eq!(request.profiles[0].name, "");
        assert_eq!(request.profiles[0].skills, "");
        assert_eq!(request.profiles[0].education, "");
    }

    #[test]
    fn test_wire_field_names() {
        let request = MatchRequest::build(
            &records(json!([{"title": "Eng"}])),
            &records(json!([{"name": "Ada"}])),
        );

        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["postings"][0]["ID"], 1);
        assert_eq!(body["postings"][0]["title"], "Eng");
        assert_eq!(body["postings"][0]["job_description"], "");
        assert_eq!(body["profiles"][0]["ID"], 1);
        assert_eq!(body["profiles"][0]["Name"], "Ada");
        assert_eq!(body["profiles"][0]["Profile"], "");
        assert_eq!(body["profiles"][0]["extracurricular"], "");
        assert_eq!(body["profiles"][0].as_object().unwrap().len(), 8);
    }
}
