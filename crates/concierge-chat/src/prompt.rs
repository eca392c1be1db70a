//! Grounding prompt assembly.
//!
//! Templates are plain text files named `system_prompt_<code>.txt` with
//! `{placeholder}` markers. A template that is missing, unreadable, or does
//! not reference both `{knowledge_base}` and `{courses}` is replaced by a
//! built-in minimal template; assembly itself cannot fail.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use concierge_core::messages::Message;
use concierge_core::types::{CacheSnapshot, CourseRecord, Locale};

const KNOWLEDGE_BASE: &str = "{knowledge_base}";
const COURSES: &str = "{courses}";

const FALLBACK_TEMPLATE: &str = "You are the IT Run Academy virtual manager. \
Answer questions about the academy and its courses using only the information below. \
If the information is missing, ask the user to fill in the application form.\n\n\
Knowledge base:\n{knowledge_base}\n\nCourses:\n{courses}";

/// The system prompt for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub locale: Locale,
    pub system_prompt: String,
    /// Number of listed courses; zero means the "no course data" marker was used.
    pub course_count: usize,
}

/// Builds grounding prompts from the catalog snapshot and per-locale templates.
pub struct PromptAssembler {
    templates: HashMap<Locale, String>,
}

impl PromptAssembler {
    /// Load the templates for every locale from `dir`.
    pub fn load(dir: &Path) -> Self {
        let templates = Locale::ALL
            .into_iter()
            .map(|locale| (locale, load_template(dir, locale)))
            .collect();
        Self { templates }
    }

    /// Use explicit template texts. Locales without one get the built-in template.
    pub fn from_templates(templates: HashMap<Locale, String>) -> Self {
        let templates = Locale::ALL
            .into_iter()
            .map(|locale| {
                let text = templates
                    .get(&locale)
                    .filter(|t| is_usable(t))
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_TEMPLATE.to_string());
                (locale, text)
            })
            .collect();
        Self { templates }
    }

    pub fn assemble(&self, locale: Locale, snapshot: &CacheSnapshot) -> PromptContext {
        let courses = snapshot.courses_for(locale);
        let course_listing = if courses.is_empty() {
            warn!(locale = %locale, "No courses in snapshot; using marker");
            Message::NoCourseInfo.text(locale).to_string()
        } else {
            courses
                .iter()
                .map(|c| course_line(c, locale))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let knowledge = snapshot.knowledge_for(locale);
        let knowledge = if knowledge.trim().is_empty() {
            warn!(locale = %locale, "Knowledge text empty; using marker");
            Message::KnowledgeUnavailable.text(locale)
        } else {
            knowledge
        };

        let template = self
            .templates
            .get(&locale)
            .map(String::as_str)
            .unwrap_or(FALLBACK_TEMPLATE);

        let system_prompt = render(
            template,
            &[
                ("{off_topic_example}", Message::OffTopicExample.text(locale)),
                ("{enrollment_example}", Message::EnrollmentExample.text(locale)),
                ("{no_info_example}", Message::NoInfoExample.text(locale)),
                ("{trial_lesson_example}", Message::TrialLessonExample.text(locale)),
                (
                    "{post_consultation_example}",
                    Message::PostConsultationExample.text(locale),
                ),
                ("{cooperation_example}", Message::CooperationExample.text(locale)),
                (COURSES, course_listing.as_str()),
                (KNOWLEDGE_BASE, knowledge),
            ],
        );

        debug!(
            locale = %locale,
            generation = snapshot.generation,
            courses = courses.len(),
            chars = system_prompt.chars().count(),
            "Prompt assembled"
        );

        PromptContext {
            locale,
            system_prompt,
            course_count: courses.len(),
        }
    }
}

fn load_template(dir: &Path, locale: Locale) -> String {
    let path = dir.join(format!("system_prompt_{}.txt", locale.code()));
    match std::fs::read_to_string(&path) {
        Ok(text) if is_usable(&text) => {
            debug!(path = %path.display(), "Prompt template loaded");
            text
        }
        Ok(_) => {
            warn!(
                path = %path.display(),
                "Prompt template lacks {{knowledge_base}} or {{courses}}; using built-in template"
            );
            FALLBACK_TEMPLATE.to_string()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Prompt template unavailable; using built-in template");
            FALLBACK_TEMPLATE.to_string()
        }
    }
}

fn is_usable(template: &str) -> bool {
    template.contains(KNOWLEDGE_BASE) && template.contains(COURSES)
}

/// Single-pass substitution; text coming from `values` is never rescanned.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// One listing line: `- name: description, Label: value, ...`.
fn course_line(course: &CourseRecord, locale: Locale) -> String {
    let [price, duration, schedule, age] = match locale {
        Locale::Russian => ["Цена", "Продолжительность", "График учебы", "Возрастное ограничение"],
        Locale::Kyrgyz => ["Баасы", "Узактыгы", "Окуу графиги", "Жаш чеги"],
    };
    format!(
        "- {}: {}, {price}: {}, {duration}: {}, {schedule}: {}, {age}: {}",
        course.name,
        course.description,
        course.price,
        course.duration,
        course.schedule,
        course.age_restriction,
    )
}
