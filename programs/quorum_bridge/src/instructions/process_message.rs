use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar;

use crate::constants::*;
use crate::events::MessageProcessed;
use crate::processor::inbound::{self, InboundEnv};
use crate::state::{
    Attestation, BridgeConfig, ChainConfig, InboundMessage, ProcessedReceipt, RelayerSet, SenderCursor,
    Vault,
};
use crate::utils::execution::{CpiExecutor, PersistedReceipt};
use crate::utils::hash::verify_digest_consistency;
use crate::utils::lamports;
use crate::utils::signature::Ed25519SysvarVerifier;

/// Verify and execute one inbound message.
///
/// `digest` addresses the receipt account and must match the message.
/// Remaining accounts are forwarded to the destination program.
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ProcessMessage<'info>>,
    digest: [u8; 32],
    message: InboundMessage,
    attestations: Vec<Attestation>,
) -> Result<()> {
    let accounts = ctx.accounts;
    let bridge = &accounts.bridge;
    verify_digest_consistency(&digest, bridge.host_chain_id, &bridge.contract_identity, &message)?;
    accounts.receipt.open(digest, ctx.bumps.receipt);

    let verifier = Ed25519SysvarVerifier::load(&accounts.instructions.to_account_info())?;
    let now = Clock::get()?.slot;
    let submitter = accounts.submitter.key();

    let vault = accounts.vault.to_account_info();
    let reserved = bridge.reserved(accounts.relayers.total_stake()?)?;
    let liquidity = lamports::spendable(&vault)?.saturating_sub(reserved);

    let program = accounts.destination_program.to_account_info();
    let inbox = accounts.value_inbox.to_account_info();
    let executor_authority = accounts.executor.to_account_info();
    let mut executor = CpiExecutor {
        program: &program,
        inbox: &inbox,
        vault: &vault,
        executor: &executor_authority,
        executor_bump: bridge.executor_bump,
        accounts: ctx.remaining_accounts,
    };

    let mut env = InboundEnv {
        bridge,
        chain: &mut accounts.chain,
        relayers: &mut accounts.relayers,
        verifier: &verifier,
        submitter,
        liquidity,
        now,
    };
    let mut receipt = PersistedReceipt {
        receipt: &mut accounts.receipt,
    };
    let outcome = inbound::process_inbound(
        &mut env,
        &message,
        &attestations,
        &mut receipt,
        accounts.cursor.as_deref_mut(),
        &mut executor,
    )?;

    accounts.receipt.record(
        outcome.source_chain_id,
        outcome.source_nonce,
        outcome.succeeded,
        submitter,
        now,
    );

    emit!(MessageProcessed {
        digest: outcome.digest,
        source_chain_id: outcome.source_chain_id,
        source_nonce: outcome.source_nonce,
        destination_address: message.destination_address,
        relayer: submitter,
        succeeded: outcome.succeeded,
    });

    msg!(
        "Processed message from chain {} nonce {} (succeeded={}, reward={})",
        outcome.source_chain_id,
        outcome.source_nonce,
        outcome.succeeded,
        outcome.reward
    );
    Ok(())
}

#[derive(Accounts)]
#[instruction(digest: [u8; 32], message: InboundMessage)]
pub struct ProcessMessage<'info> {
    #[account(seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [CHAIN_SEED, message.source_chain_id.to_le_bytes().as_ref()],
        bump = chain.bump
    )]
    pub chain: Account<'info, ChainConfig>,

    #[account(mut, seeds = [RELAYERS_SEED], bump = relayers.bump)]
    pub relayers: Account<'info, RelayerSet>,

    /// Processed-set entry for `digest`
    #[account(
        init_if_needed,
        payer = submitter,
        space = 8 + ProcessedReceipt::INIT_SPACE,
        seeds = [RECEIPT_SEED, digest.as_ref()],
        bump
    )]
    pub receipt: Account<'info, ProcessedReceipt>,

    /// Required on strict-ordering chains
    #[account(mut)]
    pub cursor: Option<Account<'info, SenderCursor>>,

    #[account(mut, seeds = [VAULT_SEED], bump = bridge.vault_bump)]
    pub vault: Account<'info, Vault>,

    /// CHECK: bridge PDA that signs destination calls
    #[account(seeds = [EXECUTOR_SEED], bump = bridge.executor_bump)]
    pub executor: UncheckedAccount<'info>,

    /// CHECK: checked against the message's destination address before execution
    pub destination_program: UncheckedAccount<'info>,

    /// CHECK: must be the destination program's inbox PDA, checked before execution
    #[account(mut)]
    pub value_inbox: UncheckedAccount<'info>,

    /// CHECK: instructions sysvar, read for Ed25519 verifications
    #[account(address = sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    #[account(mut)]
    pub submitter: Signer<'info>,

    pub system_program: Program<'info, System>,
}
