//! Append-only journal of applied wizard events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cleanorder_core::Event;
use cleanorder_wizard::WizardEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Starts at 1 and never repeats within a session.
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event_type: String,
    pub event: WizardEvent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, events: &[WizardEvent]) {
        let recorded_at = Utc::now();
        for event in events {
            let sequence = self.last_sequence() + 1;
            self.entries.push(JournalEntry {
                sequence,
                recorded_at,
                event_type: event.event_type().to_string(),
                event: event.clone(),
            });
        }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_sequence(&self) -> u64 {
        self.entries.last().map(|e| e.sequence).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanorder_wizard::WizardStep;

    #[test]
    fn sequences_are_contiguous_across_batches() {
        let mut journal = Journal::new();
        journal.record(&[WizardEvent::StepCompleted(WizardStep::ClientSelection)]);
        journal.record(&[
            WizardEvent::StepEntered {
                from: WizardStep::ClientSelection,
                to: WizardStep::BranchSelection,
            },
            WizardEvent::WizardReset,
        ]);
        let sequences: Vec<u64> = journal.entries().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(journal.entries()[2].event_type, "wizard.reset");
    }

    #[test]
    fn empty_batches_record_nothing() {
        let mut journal = Journal::new();
        journal.record(&[]);
        assert!(journal.is_empty());
        assert_eq!(journal.last_sequence(), 0);
    }
}
