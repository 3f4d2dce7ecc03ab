//! Drop rules for known-benign device noise.

/// A rule that discards a formatted device log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropRule {
    /// Routine start/stop chatter, except the incoming-receive routine
    RoutineNoise,
    /// Send failures that are expected while peers come and go
    BenignSendFailure,
    /// Interface up/down requests logged every second while the tun device is open
    InterfaceToggle,
}

impl DropRule {
    /// All rules in evaluation order.
    pub const ALL: [DropRule; 3] = [
        DropRule::RoutineNoise,
        DropRule::BenignSendFailure,
        DropRule::InterfaceToggle,
    ];

    /// Check whether this rule discards `message`.
    pub fn matches(&self, message: &str) -> bool {
        match self {
            DropRule::RoutineNoise => {
                message.contains("Routine:") && !message.contains("receive incoming")
            }
            DropRule::BenignSendFailure => message.contains("Failed to send data packet"),
            DropRule::InterfaceToggle => {
                message.contains("Interface up requested")
                    || message.contains("Interface down requested")
            }
        }
    }
}

/// First rule that discards `message`, if any.
pub fn drop_rule_for(message: &str) -> Option<DropRule> {
    DropRule::ALL.into_iter().find(|rule| rule.matches(message))
}

/// Check whether `message` should be discarded.
pub fn should_drop(message: &str) -> bool {
    drop_rule_for(message).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routine_noise_dropped() {
        assert_eq!(
            drop_rule_for("Routine: Foo - starting"),
            Some(DropRule::RoutineNoise)
        );
        assert!(should_drop("peer(AAAA…AAAA) - Routine: sequential sender - stopped"));
    }

    #[test]
    fn test_receive_incoming_routine_kept() {
        assert!(!DropRule::RoutineNoise.matches("Routine: receive incoming - ready"));
        assert!(!should_drop("Routine: receive incoming IPv4 - started"));
    }

    #[test]
    fn test_benign_send_failure_dropped() {
        assert_eq!(
            drop_rule_for("peer(AAAA…AAAA) - Failed to send data packet: no route"),
            Some(DropRule::BenignSendFailure)
        );
    }

    #[test]
    fn test_interface_toggle_dropped() {
        assert_eq!(
            drop_rule_for("Interface up requested"),
            Some(DropRule::InterfaceToggle)
        );
        assert_eq!(
            drop_rule_for("Interface down requested"),
            Some(DropRule::InterfaceToggle)
        );
    }

    #[test]
    fn test_first_match_wins() {
        let msg = "Routine: x - Failed to send data packet";
        assert_eq!(drop_rule_for(msg), Some(DropRule::RoutineNoise));
    }

    #[test]
    fn test_ordinary_lines_kept() {
        assert!(!should_drop("Received handshake response"));
        assert!(!should_drop("Interface state was Down, requested Up, now Up"));
        assert!(!should_drop(""));
    }
}
