//! The pending-command registry: at most one outstanding request per
//! command kind. Represented as a fixed-size record of booleans rather than
//! a map, so "at-most-one outstanding" is a type-level property instead of
//! something callers have to maintain by convention.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    MonVer,
    LogInfo,
    MonGnss,
    MonComms,
    MonRf,
    Ack,
    Pvt,
    Reset,
    DrvStop,
}

impl CommandKind {
    pub const ALL: [CommandKind; 9] = [
        CommandKind::MonVer,
        CommandKind::LogInfo,
        CommandKind::MonGnss,
        CommandKind::MonComms,
        CommandKind::MonRf,
        CommandKind::Ack,
        CommandKind::Pvt,
        CommandKind::Reset,
        CommandKind::DrvStop,
    ];

    fn slot(self) -> usize {
        match self {
            CommandKind::MonVer => 0,
            CommandKind::LogInfo => 1,
            CommandKind::MonGnss => 2,
            CommandKind::MonComms => 3,
            CommandKind::MonRf => 4,
            CommandKind::Ack => 5,
            CommandKind::Pvt => 6,
            CommandKind::Reset => 7,
            CommandKind::DrvStop => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PendingCommandSet {
    flags: [bool; CommandKind::ALL.len()],
}

impl PendingCommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a request as awaiting a response. Must be called before the
    /// request is transmitted (§3 invariant).
    pub fn set(&mut self, kind: CommandKind) {
        self.flags[kind.slot()] = true;
    }

    pub fn clear(&mut self, kind: CommandKind) {
        self.flags[kind.slot()] = false;
    }

    pub fn is_pending(&self, kind: CommandKind) -> bool {
        self.flags[kind.slot()]
    }

    /// Clear every flag. Called on every mode transition and on explicit
    /// IBIT entry (§3 lifecycle).
    pub fn clear_all(&mut self) {
        self.flags = [false; CommandKind::ALL.len()];
    }

    pub fn any_pending(&self) -> bool {
        self.flags.iter().any(|&f| f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_clear_round_trips() {
        let mut set = PendingCommandSet::new();
        assert!(!set.is_pending(CommandKind::MonVer));
        set.set(CommandKind::MonVer);
        assert!(set.is_pending(CommandKind::MonVer));
        set.clear(CommandKind::MonVer);
        assert!(!set.is_pending(CommandKind::MonVer));
    }

    #[test]
    fn flags_are_independent_per_kind() {
        let mut set = PendingCommandSet::new();
        set.set(CommandKind::Ack);
        assert!(set.is_pending(CommandKind::Ack));
        assert!(!set.is_pending(CommandKind::Pvt));
    }

    #[test]
    fn clear_all_resets_every_kind() {
        let mut set = PendingCommandSet::new();
        for kind in CommandKind::ALL {
            set.set(kind);
        }
        assert!(set.any_pending());
        set.clear_all();
        assert!(!set.any_pending());
        for kind in CommandKind::ALL {
            assert!(!set.is_pending(kind));
        }
    }
}
