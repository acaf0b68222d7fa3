use anchor_lang::prelude::*;

use crate::constants::MAX_SPONSORED_TARGETS;
use crate::errors::BridgeError;
use crate::state::bridge::checked_add;

/// Prepaid relay fees a dApp offers its users for a fixed set of destinations
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct SponsorAccount {
    pub sponsor: Pubkey,

    /// Lamports held in the vault on the sponsor's behalf
    pub balance: u64,

    /// Bounded by `MAX_SPONSORED_TARGETS`
    #[max_len(16)]
    pub allowed_targets: Vec<SponsoredTarget>,

    pub bump: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SponsoredTarget {
    pub chain_id: u32,
    pub address: [u8; 20],
}

impl SponsorAccount {
    pub fn is_sponsored(&self, target: &SponsoredTarget) -> bool {
        self.allowed_targets.contains(target)
    }

    /// Add or remove a destination from the allow-list
    pub fn set_target(&mut self, target: SponsoredTarget, allowed: bool) -> Result<()> {
        let position = self.allowed_targets.iter().position(|t| *t == target);
        match (position, allowed) {
            (None, true) => {
                require!(
                    self.allowed_targets.len() < MAX_SPONSORED_TARGETS,
                    BridgeError::TooManySponsoredTargets
                );
                self.allowed_targets.push(target);
            }
            (Some(index), false) => {
                self.allowed_targets.swap_remove(index);
            }
            _ => {}
        }
        Ok(())
    }

    pub fn deposit(&mut self, amount: u64) -> Result<()> {
        require!(amount > 0, BridgeError::InvalidAmount);
        self.balance = checked_add(self.balance, amount)?;
        Ok(())
    }

    pub fn withdraw(&mut self, amount: u64) -> Result<()> {
        require!(amount > 0, BridgeError::InvalidAmount);
        require!(amount <= self.balance, BridgeError::InsufficientSponsorBalance);
        self.balance -= amount;
        Ok(())
    }

    pub fn ensure_can_pay(&self, target: &SponsoredTarget, fee: u64) -> Result<()> {
        require!(self.is_sponsored(target), BridgeError::TargetNotSponsored);
        require!(fee <= self.balance, BridgeError::InsufficientSponsorBalance);
        Ok(())
    }

    /// Pay a relay fee for an allow-listed destination
    pub fn spend(&mut self, target: &SponsoredTarget, fee: u64) -> Result<()> {
        self.ensure_can_pay(target, fee)?;
        self.balance -= fee;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_bridge_error;

    const TARGET: SponsoredTarget = SponsoredTarget {
        chain_id: 7,
        address: [3; 20],
    };

    #[test]
    fn account_space_fits_a_full_allow_list() {
        let mut sponsor = SponsorAccount::default();
        for chain_id in 0..MAX_SPONSORED_TARGETS as u32 {
            sponsor.set_target(SponsoredTarget { chain_id, ..TARGET }, true).unwrap();
        }
        assert_bridge_error(
            sponsor.set_target(SponsoredTarget { chain_id: 999, ..TARGET }, true),
            BridgeError::TooManySponsoredTargets,
        );

        let mut data = Vec::new();
        sponsor.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), 8 + SponsorAccount::INIT_SPACE);
    }

    #[test]
    fn spend_requires_allow_listed_target() {
        let mut sponsor = SponsorAccount::default();
        sponsor.deposit(1_000).unwrap();
        assert_bridge_error(sponsor.spend(&TARGET, 10), BridgeError::TargetNotSponsored);

        sponsor.set_target(TARGET, true).unwrap();
        sponsor.spend(&TARGET, 10).unwrap();
        assert_eq!(sponsor.balance, 990);

        let other_chain = SponsoredTarget { chain_id: 8, ..TARGET };
        assert_bridge_error(sponsor.spend(&other_chain, 10), BridgeError::TargetNotSponsored);

        sponsor.set_target(TARGET, false).unwrap();
        assert_bridge_error(sponsor.spend(&TARGET, 10), BridgeError::TargetNotSponsored);
    }

    #[test]
    fn balance_never_goes_negative() {
        let mut sponsor = SponsorAccount::default();
        sponsor.set_target(TARGET, true).unwrap();
        sponsor.deposit(100).unwrap();
        assert_bridge_error(sponsor.spend(&TARGET, 101), BridgeError::InsufficientSponsorBalance);
        assert_bridge_error(sponsor.withdraw(101), BridgeError::InsufficientSponsorBalance);
        sponsor.withdraw(100).unwrap();
        assert_eq!(sponsor.balance, 0);
    }

    #[test]
    fn allow_list_is_bounded_and_idempotent() {
        let mut sponsor = SponsorAccount::default();
        sponsor.set_target(TARGET, true).unwrap();
        sponsor.set_target(TARGET, true).unwrap();
        assert_eq!(sponsor.allowed_targets.len(), 1);

        for i in 0..(MAX_SPONSORED_TARGETS as u32 - 1) {
            sponsor
                .set_target(SponsoredTarget { chain_id: 100 + i, address: [0; 20] }, true)
                .unwrap();
        }
        assert_bridge_error(
            sponsor.set_target(SponsoredTarget { chain_id: 999, address: [0; 20] }, true),
            BridgeError::TooManySponsoredTargets,
        );
    }
}
