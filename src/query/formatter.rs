//! Query results → user-facing response text.
//!
//! Never fails: absent results give the intent's "no results" line, absent
//! fields render as `Unknown`.

use std::fmt;
use std::str::FromStr;

use super::results::QueryResults;
use super::{INTENT_AID_REQUEST, INTENT_CAMPS, INTENT_HEALTH_FACILITIES, INTENT_WATER_SOURCES};

const UNKNOWN: &str = "Unknown";

/// Response language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// Congolese Swahili.
    #[default]
    Swahili,
    English,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Swahili => "sw",
            Locale::English => "en",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sw" | "swahili" => Ok(Locale::Swahili),
            "en" | "english" => Ok(Locale::English),
            other => Err(format!("unknown locale '{other}' (expected \"sw\" or \"en\")")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ── Message catalogue ─────────────────────────────────────────────────────────

/// Per-intent wording: "no results" line and list header.
struct IntentText {
    empty: &'static str,
    header: &'static str,
}

fn intent_text(locale: Locale, intent: &str) -> Option<IntentText> {
    let (empty, header) = match (locale, intent) {
        (Locale::Swahili, INTENT_HEALTH_FACILITIES) => (
            "Samahani, hakuna vituo vya afya vilivyopatikana.",
            "Hii ni vituo vya afya vilivyopo:",
        ),
        (Locale::Swahili, INTENT_WATER_SOURCES) => (
            "Samahani, hakuna vyanzo vya maji vilivyopatikana.",
            "Hii ni vyanzo vya maji vilivyopo:",
        ),
        (Locale::Swahili, INTENT_CAMPS) => (
            "Samahani, hakuna kambi za wakimbizi zilizopatikana.",
            "Hii ni kambi za wakimbizi ziliopo:",
        ),
        (Locale::Swahili, INTENT_AID_REQUEST) => (
            "Samahani, hakuna mashirika yanayotoa huduma hiyo yaliyopatikana.",
            "Mashirika yanayotoa huduma hiyo:",
        ),
        (Locale::English, INTENT_HEALTH_FACILITIES) => (
            "Sorry, no health facilities were found.",
            "These are the available health facilities:",
        ),
        (Locale::English, INTENT_WATER_SOURCES) => (
            "Sorry, no water sources were found.",
            "These are the available water sources:",
        ),
        (Locale::English, INTENT_CAMPS) => (
            "Sorry, no refugee camps were found.",
            "These are the available refugee camps:",
        ),
        (Locale::English, INTENT_AID_REQUEST) => (
            "Sorry, no organizations offering that service were found.",
            "Organizations offering that service:",
        ),
        _ => return None,
    };
    Some(IntentText { empty, header })
}

struct GenericText {
    empty: &'static str,
    header: &'static str,
    answer: &'static str,
    capacity: &'static str,
    build_failed: &'static str,
}

fn generic_text(locale: Locale) -> GenericText {
    match locale {
        Locale::Swahili => GenericText {
            empty: "Samahani, hakuna majibu yaliyopatikana.",
            header: "Majibu yaliyopatikana:",
            answer: "Jibu",
            capacity: "Uwezo",
            build_failed: "Samahani, sikuweza kuunda hoja kwa ajili ya swali lako.",
        },
        Locale::English => GenericText {
            empty: "Sorry, no answers were found.",
            header: "Answers found:",
            answer: "Answer",
            capacity: "Capacity",
            build_failed: "Sorry, I could not build a query for your question.",
        },
    }
}

// ── Formatter ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultFormatter {
    locale: Locale,
}

impl ResultFormatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Reply used when no query could be built for a turn.
    pub fn build_failed(&self) -> &'static str {
        generic_text(self.locale).build_failed
    }

    /// Render `results` for `intent`.
    pub fn format(&self, results: Option<&QueryResults>, intent: &str) -> String {
        let specific = intent_text(self.locale, intent);
        let generic = generic_text(self.locale);

        let Some(results) = results.filter(|r| !r.is_empty()) else {
            return specific.map_or(generic.empty, |t| t.empty).to_string();
        };

        let Some(text) = specific else {
            return self.generic_dump(results, &generic);
        };

        let mut out = format!("{}\n", text.header);
        for row in 0..results.len() {
            let field = |var: &str| results.value(row, var).unwrap_or(UNKNOWN);
            let line = match intent {
                INTENT_HEALTH_FACILITIES => {
                    format!("- {} ({})", field("facilityName"), field("locName"))
                }
                INTENT_WATER_SOURCES => format!(
                    "- {} ({}) - {}",
                    field("sourceName"),
                    field("locName"),
                    field("status")
                ),
                INTENT_CAMPS => format!(
                    "- {} ({}) - {}: {}",
                    field("campName"),
                    field("locName"),
                    generic.capacity,
                    field("capacity")
                ),
                _ => format!(
                    "- {} ({}) - {}",
                    field("orgName"),
                    field("locName"),
                    field("serviceName")
                ),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Numbered key/value listing of every bound field, projection order
    /// first, then any extra fields by name.
    fn generic_dump(&self, results: &QueryResults, text: &GenericText) -> String {
        let mut out = format!("{}\n", text.header);
        for (i, row) in results.rows.iter().enumerate() {
            out.push_str(&format!("{} {}:\n", text.answer, i + 1));
            let projected = results.vars.iter().filter_map(|v| row.get_key_value(v));
            let extra = row.iter().filter(|(k, _)| !results.vars.contains(*k));
            for (var, binding) in projected.chain(extra) {
                out.push_str(&format!("  {var}: {}\n", binding.value));
            }
        }
        out
    }
}
