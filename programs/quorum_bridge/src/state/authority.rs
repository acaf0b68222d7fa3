use anchor_lang::prelude::*;

use crate::errors::BridgeError;
use crate::state::BridgeConfig;

/// Capability deciding who may change chain, relayer and fee settings.
///
/// The bridge never hardcodes the authority: the stored key can be a single
/// admin, a multisig vault or a governance program's PDA signing through CPI.
pub trait GoverningAuthority {
    fn is_authorized(&self, actor: &Pubkey) -> bool;

    fn ensure_authorized(&self, actor: &Pubkey) -> Result<()> {
        require!(self.is_authorized(actor), BridgeError::UnauthorizedAuthority);
        Ok(())
    }
}

impl GoverningAuthority for BridgeConfig {
    fn is_authorized(&self, actor: &Pubkey) -> bool {
        self.authority == *actor
    }
}
