//! Category Model: the user-extensible set of profile categories and their completion.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Well-known categories every session starts with, paired with the hint shown at 0%.
const WELL_KNOWN: &[(&str, &str)] = &[
    ("Experience", "Roles, internships and what you shipped in them"),
    ("Education", "Degrees, schools and notable coursework"),
    ("Projects", "Things you built, alone or with a team"),
    ("Extracurriculars", "Clubs, volunteering and competitions"),
    ("Preferences", "Locations, role types and what you want next"),
    ("Skills", "Languages, tools and frameworks you use"),
];

const GENERIC_HINT: &str = "Tell me anything that belongs here";

pub const MAX_PROGRESS: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub progress: u8,
}

impl Category {
    fn new(name: String) -> Self {
        Self { name, progress: 0 }
    }

    /// Static hint for well-known names, generic otherwise.
    pub fn hint(&self) -> &'static str {
        WELL_KNOWN
            .iter()
            .find(|(name, _)| *name == self.name)
            .map(|(_, hint)| *hint)
            .unwrap_or(GENERIC_HINT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryRejection {
    #[error("category name is blank")]
    Blank,
    #[error("category already exists")]
    Duplicate,
    #[error("no such category")]
    UnknownCategory,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryModel {
    categories: Vec<Category>,
    selected: Option<String>,
}

impl CategoryModel {
    /// A model seeded with the six well-known categories at 0%.
    pub fn with_defaults() -> Self {
        Self {
            categories: WELL_KNOWN
                .iter()
                .map(|(name, _)| Category::new(name.to_string()))
                .collect(),
            selected: None,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn selected(&self) -> Option<&Category> {
        self.selected.as_deref().and_then(|name| self.get(name))
    }

    /// Trims `name` and appends it at 0%. Names are unique, compared case-sensitively.
    pub fn add_category(&mut self, name: &str) -> Result<&Category, CategoryRejection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryRejection::Blank);
        }
        if self.get(name).is_some() {
            return Err(CategoryRejection::Duplicate);
        }
        self.categories.push(Category::new(name.to_string()));
        Ok(&self.categories[self.categories.len() - 1])
    }

    /// Sets progress clamped to 0..=100 and returns the stored value.
    pub fn set_progress(&mut self, name: &str, value: i64) -> Result<u8, CategoryRejection> {
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or(CategoryRejection::UnknownCategory)?;
        category.progress = value.clamp(0, i64::from(MAX_PROGRESS)) as u8;
        Ok(category.progress)
    }

    /// Toggle: selecting the current selection clears it.
    /// Returns the selection after the call.
    pub fn select(&mut self, name: &str) -> Result<Option<&Category>, CategoryRejection> {
        if self.get(name).is_none() {
            return Err(CategoryRejection::UnknownCategory);
        }
        if self.selected.as_deref() == Some(name) {
            self.selected = None;
        } else {
            self.selected = Some(name.to_string());
        }
        Ok(self.selected())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }
}
