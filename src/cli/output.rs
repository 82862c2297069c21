//! Output formatting for CLI commands.

use serde::Serialize;

use crate::classifier::Classification;
use crate::cli::args::{ConciergeArgs, OutputFormat};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::intent::Intent;
use crate::response::ResponsePayload;
use crate::slot::{SlotFill, SlotMap, SlotSchema, SlotValue};

/// Plain-text rendering for the human output format.
pub trait HumanReadable {
    fn to_human(&self, verbosity: u8) -> String;
}

/// Classifier decision plus the slots the utterance would fill.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationReport {
    pub intent: Intent,
    pub confidence: f32,
    pub raw_intent: Intent,
    pub threshold: f32,
    pub candidates: Vec<ScoredIntent>,
    pub slots: Vec<SlotReport>,
}

#[derive(Debug, Serialize)]
pub struct ScoredIntent {
    pub intent: Intent,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct SlotReport {
    pub name: String,
    pub state: &'static str,
    pub values: Vec<String>,
}

impl ClassificationReport {
    pub fn new(
        classification: &Classification,
        slots: &SlotMap,
        top: usize,
        config: &EngineConfig,
    ) -> Self {
        Self {
            intent: classification.intent,
            confidence: classification.confidence,
            raw_intent: classification.raw_intent,
            threshold: config.confidence_threshold,
            candidates: classification
                .scores
                .iter()
                .take(top)
                .map(|score| ScoredIntent {
                    intent: score.intent,
                    confidence: score.confidence,
                })
                .collect(),
            slots: slots
                .iter()
                .map(|(name, fill)| SlotReport {
                    name: name.to_string(),
                    state: match fill {
                        SlotFill::Empty => "empty",
                        SlotFill::Filled(_) => "filled",
                        SlotFill::Ambiguous(_) => "ambiguous",
                    },
                    values: match fill {
                        SlotFill::Empty => Vec::new(),
                        SlotFill::Filled(value) => vec![value.describe()],
                        SlotFill::Ambiguous(candidates) => {
                            candidates.iter().map(SlotValue::describe).collect()
                        }
                    },
                })
                .collect(),
        }
    }
}

impl HumanReadable for ClassificationReport {
    fn to_human(&self, _verbosity: u8) -> String {
        let mut out = format!(
            "Intent: {} (confidence {:.3}, threshold {:.2})\n",
            self.intent, self.confidence, self.threshold
        );
        if self.intent != self.raw_intent {
            out.push_str(&format!("Raw prediction: {}\n", self.raw_intent));
        }
        if !self.candidates.is_empty() {
            out.push_str("Candidates:\n");
            for candidate in &self.candidates {
                out.push_str(&format!(
                    "  {:<20} {:.3}\n",
                    candidate.intent.label(),
                    candidate.confidence
                ));
            }
        }
        if !self.slots.is_empty() {
            out.push_str("Slots:\n");
            for slot in &self.slots {
                out.push_str(&format!("  {:<16} {:<10}", slot.name, slot.state));
                if !slot.values.is_empty() {
                    out.push_str(&slot.values.join(" | "));
                }
                out.push('\n');
            }
        }
        out.trim_end().to_string()
    }
}

/// One intent's slot schema.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaListing {
    pub intent: Intent,
    pub description: &'static str,
    pub slots: Vec<SlotListing>,
}

#[derive(Debug, Serialize)]
pub struct SlotListing {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub required: bool,
    pub prompt: &'static str,
}

impl SchemaListing {
    pub fn new(schema: SlotSchema) -> Self {
        Self {
            intent: schema.intent(),
            description: schema.intent().description(),
            slots: schema
                .slots()
                .iter()
                .map(|spec| SlotListing {
                    name: spec.name.to_string(),
                    kind: spec.kind.label(),
                    required: spec.required,
                    prompt: spec.prompt,
                })
                .collect(),
        }
    }
}

impl HumanReadable for Vec<SchemaListing> {
    fn to_human(&self, verbosity: u8) -> String {
        let mut out = String::new();
        for listing in self {
            out.push_str(&format!("{} - {}\n", listing.intent, listing.description));
            for slot in &listing.slots {
                let marker = if slot.required { "*" } else { " " };
                out.push_str(&format!("  {marker} {:<16} {}\n", slot.name, slot.kind));
                if verbosity > 1 {
                    out.push_str(&format!("      {}\n", slot.prompt));
                }
            }
        }
        out.trim_end().to_string()
    }
}

impl HumanReadable for ResponsePayload {
    fn to_human(&self, verbosity: u8) -> String {
        if verbosity < 2 {
            return self.text.clone();
        }
        let mut out = format!(
            "[{} {:.2} {:?} -> {:?}]\n{}",
            self.intent, self.confidence, self.kind, self.state, self.text
        );
        if !self.options.is_empty() {
            out.push_str(&format!("\nOptions: {}", self.options.join(" | ")));
        }
        out
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanReadable>(result: &T, args: &ConciergeArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            println!("{}", result.to_human(args.verbosity()));
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

pub fn output_payload(payload: &ResponsePayload, args: &ConciergeArgs) -> Result<()> {
    output_result(payload, args)
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &ConciergeArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}
