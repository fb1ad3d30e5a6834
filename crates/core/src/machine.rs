//! Decide/evolve state machine contract.

/// A fact emitted by a state machine after a command was accepted.
pub trait Event: Clone + core::fmt::Debug {
    /// Stable event name (e.g. "wizard.step.entered").
    fn event_type(&self) -> &'static str;
}

/// State machine execution semantics (pure, deterministic).
///
/// - **Decision logic**: `handle(&self, cmd)` checks guards and returns events.
/// - **State mutation**: `apply(&mut self, event)` evolves state.
///
/// Implementations must not perform IO. A rejected command returns an error and
/// leaves the machine exactly as it was.
pub trait StateMachine {
    type Command: Clone + core::fmt::Debug;
    type Event: Event;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single event.
    ///
    /// Implementations should bump their `version()` once per applied event.
    fn apply(&mut self, event: &Self::Event);

    /// Decide which events to emit given the current state and a command.
    ///
    /// This must not mutate state. State evolution is done through `apply`.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Number of events applied so far.
    fn version(&self) -> u64;
}

/// Decide, then evolve: the single reducer entry point.
///
/// Events are applied only after `handle` accepted the whole command, so a
/// reader never observes a half-applied transition.
pub fn execute<M>(machine: &mut M, command: &M::Command) -> Result<Vec<M::Event>, M::Error>
where
    M: StateMachine,
{
    let events = machine.handle(command)?;
    for event in &events {
        machine.apply(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Toggle {
        Flip,
        Break,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Flipped;

    impl Event for Flipped {
        fn event_type(&self) -> &'static str {
            "test.flipped"
        }
    }

    #[derive(Default)]
    struct Switch {
        on: bool,
        version: u64,
    }

    impl StateMachine for Switch {
        type Command = Toggle;
        type Event = Flipped;
        type Error = &'static str;

        fn apply(&mut self, _event: &Flipped) {
            self.on = !self.on;
            self.version += 1;
        }

        fn handle(&self, command: &Toggle) -> Result<Vec<Flipped>, &'static str> {
            match command {
                Toggle::Flip => Ok(vec![Flipped, Flipped, Flipped]),
                Toggle::Break => Err("rejected"),
            }
        }

        fn version(&self) -> u64 {
            self.version
        }
    }

    #[test]
    fn execute_applies_every_event() {
        let mut switch = Switch::default();
        let events = execute(&mut switch, &Toggle::Flip).unwrap();
        assert_eq!(events.len(), 3);
        assert!(switch.on);
        assert_eq!(switch.version(), 3);
    }

    #[test]
    fn rejected_command_leaves_state_untouched() {
        let mut switch = Switch::default();
        assert_eq!(execute(&mut switch, &Toggle::Break), Err("rejected"));
        assert!(!switch.on);
        assert_eq!(switch.version(), 0);
    }
}
