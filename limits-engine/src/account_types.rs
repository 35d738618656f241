//! Account-class transfer matrix
//!
//! Who may pay whom is a function of the two account classes alone. The
//! matrix is built once at startup and handed through the dependency
//! container; it is never mutated afterwards.

use std::collections::{HashMap, HashSet};

use gateway_core::AccountType;

use crate::error::RuleViolation;

/// Immutable account-class transfer matrix
#[derive(Debug, Clone)]
pub struct TransferMatrix {
    allowed: HashMap<AccountType, HashSet<AccountType>>,
}

impl TransferMatrix {
    /// Matrix from explicit (payer class, payee classes) rows.
    ///
    /// Classes without a row may pay no one; an empty row states the same
    /// explicitly.
    pub fn new(rows: Vec<(AccountType, Vec<AccountType>)>) -> Self {
        let allowed = rows
            .into_iter()
            .map(|(from, to)| (from, to.into_iter().collect()))
            .collect();
        Self { allowed }
    }

    /// The bank deployment's matrix.
    ///
    /// The bank issues toward its agents, distribution agents hand funds to
    /// retail classes, retail classes trade among themselves and settle
    /// toward settlement agents, settlement agents return funds to the
    /// bank. Exchange agents receive external flows only and may pay no
    /// one at this layer.
    pub fn bank_default() -> Self {
        use AccountType::*;
        Self::new(vec![
            (Bank, vec![SettlementAgent, DistributionAgent]),
            (DistributionAgent, vec![AnonymousUser, RegisteredUser, Merchant]),
            (
                AnonymousUser,
                vec![AnonymousUser, RegisteredUser, Merchant, SettlementAgent],
            ),
            (
                RegisteredUser,
                vec![AnonymousUser, RegisteredUser, Merchant, SettlementAgent],
            ),
            (
                Merchant,
                vec![AnonymousUser, RegisteredUser, Merchant, SettlementAgent],
            ),
            (SettlementAgent, vec![Bank]),
            (ExchangeAgent, vec![]),
        ])
    }

    /// True when `from` may pay `to`
    pub fn allows(&self, from: AccountType, to: AccountType) -> bool {
        self.allowed
            .get(&from)
            .map(|targets| targets.contains(&to))
            .unwrap_or(false)
    }

    /// Checks one transfer, describing the restriction on rejection
    pub fn check(&self, from: AccountType, to: AccountType) -> Option<RuleViolation> {
        if self.allows(from, to) {
            None
        } else {
            Some(RuleViolation::Restricted(format!(
                "payments from {} to {} are restricted",
                from, to
            )))
        }
    }
}

impl Default for TransferMatrix {
    fn default() -> Self {
        Self::bank_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AccountType::*;

    #[test]
    fn bank_pays_its_agents_only() {
        let matrix = TransferMatrix::bank_default();
        assert!(matrix.allows(Bank, DistributionAgent));
        assert!(matrix.allows(Bank, SettlementAgent));
        assert!(!matrix.allows(Bank, AnonymousUser));
        assert!(!matrix.allows(Bank, Merchant));
    }

    #[test]
    fn retail_classes_pay_each_other_and_settlement() {
        let matrix = TransferMatrix::bank_default();
        for payer in [AnonymousUser, RegisteredUser, Merchant] {
            assert!(matrix.allows(payer, Merchant));
            assert!(matrix.allows(payer, AnonymousUser));
            assert!(matrix.allows(payer, SettlementAgent));
            assert!(!matrix.allows(payer, Bank));
        }
    }

    #[test]
    fn exchange_agent_pays_no_one() {
        let matrix = TransferMatrix::bank_default();
        for payee in AccountType::ALL {
            assert!(!matrix.allows(ExchangeAgent, payee));
        }
    }

    #[test]
    fn rejection_names_both_classes() {
        let matrix = TransferMatrix::bank_default();
        let violation = matrix.check(Bank, AnonymousUser).unwrap();
        assert_eq!(
            violation.description(),
            "payments from bank to anonymous_user are restricted"
        );
        assert!(matrix.check(Bank, DistributionAgent).is_none());
    }
}
