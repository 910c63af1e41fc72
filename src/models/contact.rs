use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Enquiry submitted through the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub phone: String,
    #[serde(default, deserialize_with = "form_field::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "form_field::date")]
    pub event_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "form_field::text")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "form_field::count")]
    pub guests: Option<u32>,
    #[serde(default, deserialize_with = "form_field::text")]
    pub message: Option<String>,
}

/// Browser forms send every field as a string; a blank field means "not given".
mod form_field {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
    }

    fn non_blank(raw: Option<String>) -> Option<String> {
        raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(non_blank(Option::<String>::deserialize(deserializer)?))
    }

    pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match non_blank(Option::<String>::deserialize(deserializer)?) {
            Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid date: {raw}"))),
            None => Ok(None),
        }
    }

    pub fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Count>::deserialize(deserializer)? {
            Some(Count::Number(n)) => Ok(Some(n)),
            Some(Count::Text(raw)) => match non_blank(Some(raw)) {
                Some(raw) => raw
                    .parse()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("invalid guest count: {raw}"))),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }
        if self.phone.trim().is_empty() {
            return Err(AppError::Validation("phone is required".to_string()));
        }
        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
            if !valid {
                return Err(AppError::Validation(format!("invalid email: {email}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactReceipt {
    pub received_at: DateTime<Utc>,
}
