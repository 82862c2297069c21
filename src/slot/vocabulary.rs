//! Enum slot vocabularies.
//!
//! A vocabulary is a closed list of canonical options, each with the synonym
//! phrases that select it. Phrases are written in normalized form (lowercase,
//! single spaces) so they can be matched directly against utterance tokens.

use serde::Serialize;

use crate::analysis::NormalizedUtterance;

/// A canonical option and its synonyms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VocabularyOption {
    pub canonical: &'static str,
    pub synonyms: &'static [&'static str],
}

/// A closed set of options for an enum slot.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    pub name: &'static str,
    pub options: &'static [VocabularyOption],
}

/// A synonym occurrence in an utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PhraseMatch {
    start: usize,
    len: usize,
    canonical: &'static str,
}

impl PhraseMatch {
    fn contains(&self, other: &PhraseMatch) -> bool {
        self.start <= other.start && other.start + other.len <= self.start + self.len
    }
}

impl Vocabulary {
    /// Canonical options whose synonyms occur in the utterance.
    ///
    /// A match contained in a longer match is shadowed by it, so "computer lab"
    /// selects only the computer lab even though "lab" is a synonym of several
    /// labs. The result is sorted and free of duplicates.
    pub fn lookup(&self, utterance: &NormalizedUtterance) -> Vec<&'static str> {
        let mut matches: Vec<PhraseMatch> = Vec::new();
        for option in self.options {
            for synonym in option.synonyms {
                let len = synonym.split_whitespace().count();
                for start in utterance.find_phrase(synonym) {
                    matches.push(PhraseMatch {
                        start,
                        len,
                        canonical: option.canonical,
                    });
                }
            }
        }

        // Longest first, so containment only needs to look at kept matches.
        matches.sort_by(|a, b| b.len.cmp(&a.len).then(a.start.cmp(&b.start)));

        let mut kept: Vec<PhraseMatch> = Vec::new();
        for m in matches {
            let shadowed = kept.iter().any(|k| k.len > m.len && k.contains(&m));
            if !shadowed {
                kept.push(m);
            }
        }

        let mut options: Vec<&'static str> = kept.into_iter().map(|m| m.canonical).collect();
        options.sort_unstable();
        options.dedup();
        options
    }

    /// Canonical option names in declaration order.
    pub fn canonical_names(&self) -> Vec<&'static str> {
        self.options.iter().map(|o| o.canonical).collect()
    }

    /// Resolve a canonical name or synonym, case-insensitively.
    pub fn resolve(&self, text: &str) -> Option<&'static str> {
        let needle = text.trim().to_lowercase();
        self.options
            .iter()
            .find(|o| {
                o.canonical.to_lowercase() == needle || o.synonyms.iter().any(|s| *s == needle)
            })
            .map(|o| o.canonical)
    }
}

const fn option(
    canonical: &'static str,
    synonyms: &'static [&'static str],
) -> VocabularyOption {
    VocabularyOption {
        canonical,
        synonyms,
    }
}

pub static LIBRARY_SECTIONS: Vocabulary = Vocabulary {
    name: "library_section",
    options: &[
        option("Reference", &["reference", "reference section", "reference books"]),
        option(
            "Borrowing",
            &["borrowing", "borrowing section", "lending", "circulation", "loans"],
        ),
        option(
            "Reading Room",
            &["reading room", "study hall", "study area", "reading hall"],
        ),
    ],
};

pub static DEPARTMENTS: Vocabulary = Vocabulary {
    name: "department",
    options: &[
        option(
            "Computer Science",
            &["computer science", "cs", "cse", "computing", "comp sci"],
        ),
        option("Mechanical", &["mechanical", "mechanical engineering", "mech"]),
        option(
            "Electrical",
            &["electrical", "electrical engineering", "ee", "eee"],
        ),
        option("Mathematics", &["mathematics", "maths", "math"]),
    ],
};

pub static FACILITIES: Vocabulary = Vocabulary {
    name: "facility_name",
    options: &[
        option("Gym", &["gym", "gymnasium", "fitness centre", "fitness center"]),
        option("Parking", &["parking", "parking lot", "car park", "park"]),
        option(
            "Computer Lab",
            &["computer lab", "computer laboratory", "computer labs", "lab", "labs"],
        ),
        option(
            "Physics Lab",
            &["physics lab", "physics laboratory", "physics labs", "lab", "labs"],
        ),
        option("Auditorium", &["auditorium", "main hall"]),
        option("Library", &["library", "central library"]),
    ],
};

pub static DINING_HALLS: Vocabulary = Vocabulary {
    name: "dining_hall",
    options: &[
        option(
            "Main Canteen",
            &["main canteen", "canteen", "cafeteria", "dining hall"],
        ),
        option("North Mess", &["north mess", "mess", "hostel mess", "dining hall"]),
    ],
};

pub static MEALS: Vocabulary = Vocabulary {
    name: "meal",
    options: &[
        option("Breakfast", &["breakfast", "morning"]),
        option("Lunch", &["lunch", "noon", "afternoon"]),
        option("Dinner", &["dinner", "supper", "tonight", "evening"]),
    ],
};

pub static PROCEDURES: Vocabulary = Vocabulary {
    name: "procedure",
    options: &[
        option(
            "Admissions",
            &["admission", "admissions", "enrol", "enroll", "enrolment", "enrollment"],
        ),
        option(
            "Exam Registration",
            &[
                "exam registration",
                "exam application",
                "exam form",
                "register for exams",
                "register for the exam",
                "exam deadline",
            ],
        ),
        option("Leave", &["leave", "leave application", "absence"]),
        option("Fee Payment", &["fee", "fees", "fee payment", "tuition"]),
        option("Transcript", &["transcript", "transcripts", "marksheet"]),
    ],
};
