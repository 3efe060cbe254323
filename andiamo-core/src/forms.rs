//! Form input checks and the request bodies they produce.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AndiamoError, AndiamoResult};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid regex"));

fn invalid(message: &str) -> AndiamoError {
    AndiamoError::Validation(message.to_string())
}

fn require(value: &str, message: &str) -> AndiamoResult<()> {
    if value.trim().is_empty() {
        Err(invalid(message))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Trimmed email, password as typed.
    pub fn new(email: &str, password: &str) -> AndiamoResult<Self> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(invalid("Please fill in all fields"));
        }

        Ok(LoginForm {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl RegisterForm {
    pub fn new(name: &str, email: &str, password: &str, confirm: &str) -> AndiamoResult<Self> {
        require(name, "Please enter your name")?;
        require(email, "Please enter your email")?;
        if !EMAIL_RE.is_match(email) {
            return Err(invalid("Please enter a valid email address"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AndiamoError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        if password != confirm {
            return Err(invalid("Passwords do not match"));
        }

        Ok(RegisterForm {
            email: email.trim().to_string(),
            password: password.to_string(),
            name: name.trim().to_string(),
        })
    }
}

/// `{ "id": n }` reference to a related record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

/// Body for creating or updating an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub image: String,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub lieu: IdRef,
}

impl EventDraft {
    /// New event; sets both creation and update stamps to `now`.
    pub fn create(
        name: &str,
        description: &str,
        image: &str,
        date: DateTime<Utc>,
        lieu_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> AndiamoResult<Self> {
        let mut draft = Self::update(name, description, image, date, lieu_id, now)?;
        draft.created_at = Some(now);
        Ok(draft)
    }

    /// Edit of an existing event; only the update stamp is sent.
    pub fn update(
        name: &str,
        description: &str,
        image: &str,
        date: DateTime<Utc>,
        lieu_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> AndiamoResult<Self> {
        require(name, "Event name is required")?;
        let lieu_id = lieu_id.ok_or_else(|| invalid("Location ID is required"))?;

        Ok(EventDraft {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            image: image.trim().to_string(),
            date,
            created_at: None,
            updated_at: now,
            lieu: IdRef { id: lieu_id },
        })
    }
}

/// Body for creating a venue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LieuDraft {
    pub nom: String,
    pub adresse: String,
    pub image: Option<String>,
    pub category: IdRef,
}

impl LieuDraft {
    pub fn new(
        nom: &str,
        adresse: &str,
        image: Option<String>,
        category_id: Option<i64>,
    ) -> AndiamoResult<Self> {
        require(nom, "Name is required")?;
        require(adresse, "Address is required")?;
        let category_id = category_id.ok_or_else(|| invalid("Please select a category"))?;

        Ok(LieuDraft {
            nom: nom.trim().to_string(),
            adresse: adresse.trim().to_string(),
            image: image.filter(|i| !i.is_empty()),
            category: IdRef { id: category_id },
        })
    }
}

/// Body for creating a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDraft {
    pub name: String,
    pub image: Option<String>,
}

impl CategoryDraft {
    pub fn new(name: &str, image: Option<String>) -> AndiamoResult<Self> {
        require(name, "Category name is required")?;

        Ok(CategoryDraft {
            name: name.trim().to_string(),
            image: image.filter(|i| !i.is_empty()),
        })
    }
}
