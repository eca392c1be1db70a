use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::messages::Message;

// =============================================================================
// Locale
// =============================================================================

/// Working language of a conversation.
///
/// Only two locales are distinguished. `Russian` is the primary locale and
/// the fallback whenever the classifier has no signal.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// Primary locale (`ru`).
    #[default]
    Russian,
    /// Secondary locale (`ky`).
    Kyrgyz,
}

impl Locale {
    /// The locale used when nothing else is known.
    pub const PRIMARY: Locale = Locale::Russian;

    /// Every supported locale in refresh order.
    pub const ALL: [Locale; 2] = [Locale::Russian, Locale::Kyrgyz];

    /// Two-letter language code.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Russian => "ru",
            Locale::Kyrgyz => "ky",
        }
    }

    /// Parse a two-letter code. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "ru" => Some(Locale::Russian),
            "ky" => Some(Locale::Kyrgyz),
            _ => None,
        }
    }

    pub fn is_primary(&self) -> bool {
        *self == Self::PRIMARY
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Opaque identifier of the person on the other side of the chat transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Conversation
// =============================================================================

/// Author of a message sent to the language model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Grounding prompt. Never stored in a session.
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message of a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A raw spreadsheet row: column header to cell text.
pub type CourseRow = HashMap<String, String>;

/// Column headers of the course spreadsheet.
pub mod columns {
    pub const NAME: &str = "Название курса";
    pub const DESCRIPTION: &str = "Описание";
    pub const PRICE: &str = "Цена / на месяц";
    pub const DURATION: &str = "Продолжительность";
    pub const SCHEDULE: &str = "график учебы";
    pub const AGE: &str = "возрастное ограничение";

    pub const NAME_KY: &str = "Название курса (Кырг.)";
    pub const DESCRIPTION_KY: &str = "Описание (Кырг.)";
    pub const SCHEDULE_KY: &str = "график учебы (Кырг.)";
    pub const AGE_KY: &str = "возрастное ограничение (Кырг.)";
}

/// A single course offering, rendered for one locale.
///
/// Every field is a display string. Missing spreadsheet cells are replaced
/// with a locale-specific placeholder, so no field is ever empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub name: String,
    pub description: String,
    pub price: String,
    pub duration: String,
    pub schedule: String,
    pub age_restriction: String,
}

impl CourseRecord {
    /// Build the record for `locale` from a raw row.
    ///
    /// Returns `None` when the row has no course name for that locale.
    /// Secondary-locale columns fall back to their primary-locale column
    /// before falling back to the placeholder.
    pub fn from_row(row: &CourseRow, locale: Locale) -> Option<Self> {
        let name = match locale {
            Locale::Russian => cell(row, &[columns::NAME]),
            Locale::Kyrgyz => cell(row, &[columns::NAME_KY, columns::NAME]),
        }?;

        let (description, schedule, age) = match locale {
            Locale::Russian => (
                cell(row, &[columns::DESCRIPTION]),
                cell(row, &[columns::SCHEDULE]),
                cell(row, &[columns::AGE]),
            ),
            Locale::Kyrgyz => (
                cell(row, &[columns::DESCRIPTION_KY, columns::DESCRIPTION]),
                cell(row, &[columns::SCHEDULE_KY, columns::SCHEDULE]),
                cell(row, &[columns::AGE_KY, columns::AGE]),
            ),
        };

        Some(Self {
            name,
            description: description
                .unwrap_or_else(|| Message::UnspecifiedDescription.text(locale).to_string()),
            price: cell(row, &[columns::PRICE])
                .unwrap_or_else(|| Message::UnspecifiedPrice.text(locale).to_string()),
            duration: cell(row, &[columns::DURATION])
                .unwrap_or_else(|| Message::UnspecifiedDuration.text(locale).to_string()),
            schedule: schedule
                .unwrap_or_else(|| Message::UnspecifiedSchedule.text(locale).to_string()),
            age_restriction: age.unwrap_or_else(|| Message::UnspecifiedAge.text(locale).to_string()),
        })
    }
}

/// First non-blank cell among `keys`, trimmed.
fn cell(row: &CourseRow, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| row.get(*k))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Free-text knowledge base content for one locale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseText(pub String);

impl KnowledgeBaseText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// An immutable, internally consistent view of the catalog.
///
/// Courses and knowledge text always come from the same refresh cycle.
/// Readers hold an `Arc<CacheSnapshot>`; refreshes replace the whole value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub courses: HashMap<Locale, Vec<CourseRecord>>,
    pub knowledge: HashMap<Locale, KnowledgeBaseText>,
    pub fetched_at: DateTime<Utc>,
    /// Incremented by one on every successful refresh. Zero means "never fetched".
    pub generation: u64,
}

impl CacheSnapshot {
    /// The placeholder snapshot that exists before the first refresh.
    pub fn unpopulated() -> Self {
        Self {
            courses: HashMap::new(),
            knowledge: HashMap::new(),
            fetched_at: DateTime::<Utc>::MIN_UTC,
            generation: 0,
        }
    }

    /// Courses for `locale` in spreadsheet order.
    pub fn courses_for(&self, locale: Locale) -> &[CourseRecord] {
        self.courses.get(&locale).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Knowledge text for `locale`, or `""` when absent.
    pub fn knowledge_for(&self, locale: Locale) -> &str {
        self.knowledge
            .get(&locale)
            .map(KnowledgeBaseText::as_str)
            .unwrap_or("")
    }

    /// True when no locale has any course or any knowledge text.
    pub fn is_empty(&self) -> bool {
        self.courses.values().all(Vec::is_empty) && self.knowledge.values().all(|k| k.is_empty())
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.fetched_at)
    }
}

// =============================================================================
// Failure categories
// =============================================================================

/// Closed set of failure categories a single request can end in.
///
/// Each kind maps to a fixed, localized user-facing message; raw error text
/// is never shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The backing store was unreachable or returned malformed data.
    FetchError,
    RateLimited,
    AuthFailed,
    TimedOut,
    /// Any language-model failure not covered above.
    UnknownOracleError,
    ConversionError,
    TranscriptionError,
}

impl ErrorKind {
    /// The fixed message shown to the user for this kind.
    pub fn user_message(&self, locale: Locale) -> &'static str {
        let message = match self {
            ErrorKind::FetchError => Message::CourseDataError,
            ErrorKind::RateLimited => Message::RateLimited,
            ErrorKind::AuthFailed => Message::AuthFailed,
            ErrorKind::TimedOut => Message::TimedOut,
            ErrorKind::UnknownOracleError => Message::UnknownError,
            ErrorKind::ConversionError | ErrorKind::TranscriptionError => Message::AudioFailed,
        };
        message.text(locale)
    }

    pub fn is_voice(&self) -> bool {
        matches!(self, ErrorKind::ConversionError | ErrorKind::TranscriptionError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::FetchError => "fetch_error",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::AuthFailed => "auth_failed",
            ErrorKind::TimedOut => "timed_out",
            ErrorKind::UnknownOracleError => "unknown_oracle_error",
            ErrorKind::ConversionError => "conversion_error",
            ErrorKind::TranscriptionError => "transcription_error",
        };
        f.write_str(s)
    }
}
