//! Deterministic replay of the governance log

use weft_core::IdentityKey;

use crate::capability::{CapabilityOp, CapabilitySet};

/// Fold an ordered sequence of capability changes into a snapshot
///
/// Pure and deterministic: the same creator and the same operation sequence
/// always produce an identical [`CapabilitySet`]. Grants to distinct
/// subjects commute; grant/revoke ordering for the same (capability,
/// subject) pair is settled by the caller-supplied order, which the log
/// primitive derives from causal structure, never from wall-clock time.
pub fn replay<'a, I>(creator: &IdentityKey, ops: I) -> CapabilitySet
where
    I: IntoIterator<Item = &'a CapabilityOp>,
{
    let mut set = CapabilitySet::seed(creator);
    for op in ops {
        set.apply(op);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;

    fn key(label: &str) -> IdentityKey {
        IdentityKey::new(label)
    }

    #[test]
    fn test_replay_of_empty_log_is_seed() {
        let creator = key("creator");
        let ops: Vec<CapabilityOp> = Vec::new();
        assert_eq!(replay(&creator, &ops), CapabilitySet::seed(&creator));
    }

    #[test]
    fn test_replay_is_idempotent() {
        let creator = key("creator");
        let ops = vec![
            CapabilityOp::grant(Capability::Write, key("a")),
            CapabilityOp::grant(Capability::Admin, key("b")),
            CapabilityOp::revoke(Capability::Write, key("a")),
        ];
        let first = replay(&creator, &ops);
        let second = replay(&creator, &ops);
        assert_eq!(first, second);
    }

    #[test]
    fn test_last_write_wins_for_same_subject() {
        let creator = key("creator");
        let subject = key("subject");

        let grant_then_revoke = vec![
            CapabilityOp::grant(Capability::Write, subject.clone()),
            CapabilityOp::revoke(Capability::Write, subject.clone()),
        ];
        assert!(!replay(&creator, &grant_then_revoke).contains(Capability::Write, &subject));

        let revoke_then_grant = vec![
            CapabilityOp::revoke(Capability::Write, subject.clone()),
            CapabilityOp::grant(Capability::Write, subject.clone()),
        ];
        assert!(replay(&creator, &revoke_then_grant).contains(Capability::Write, &subject));
    }

    #[test]
    fn test_independent_grants_commute() {
        let creator = key("creator");
        let a = CapabilityOp::grant(Capability::Write, key("a"));
        let b = CapabilityOp::grant(Capability::Admin, key("b"));

        let forward = replay(&creator, [&a, &b]);
        let backward = replay(&creator, [&b, &a]);
        assert_eq!(forward, backward);
    }
}
