use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar;

use crate::constants::*;
use crate::errors::BridgeError;
use crate::events::MessageProcessed;
use crate::processor::inbound::{self, BatchMember, BatchResult, InboundEnv};
use crate::state::{Attestation, BridgeConfig, ChainConfig, InboundMessage, ProcessedReceipt, RelayerSet, Vault};
use crate::utils::execution::{CpiExecutor, PersistedReceipt};
use crate::utils::hash::message_digest;
use crate::utils::lamports;
use crate::utils::signature::Ed25519SysvarVerifier;

/// Accounts every batch member contributes before its forwarded accounts
const MEMBER_FIXED_ACCOUNTS: usize = 3;

/// Verify and execute a batch of messages from one source chain.
///
/// Remaining accounts, per member in order: receipt (opened beforehand with
/// `open_receipt`), destination program, value inbox, then
/// `extra_accounts[i]` accounts forwarded to the destination.
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ProcessBatch<'info>>,
    messages: Vec<InboundMessage>,
    attestations: Vec<Attestation>,
    extra_accounts: Vec<u8>,
) -> Result<()> {
    require!(
        !messages.is_empty() && messages.len() <= MAX_BATCH_SIZE,
        BridgeError::InvalidBatchSize
    );
    require!(
        extra_accounts.len() == messages.len(),
        BridgeError::MissingBatchAccounts
    );

    let accounts = ctx.accounts;
    let bridge = &accounts.bridge;
    let remaining: &'info [AccountInfo<'info>] = ctx.remaining_accounts;

    let mut receipts: Vec<Account<'info, ProcessedReceipt>> = Vec::with_capacity(messages.len());
    let mut groups: Vec<&'info [AccountInfo<'info>]> = Vec::with_capacity(messages.len());
    let mut cursor = 0usize;
    for (message, extra) in messages.iter().zip(&extra_accounts) {
        let end = cursor + MEMBER_FIXED_ACCOUNTS + *extra as usize;
        require!(end <= remaining.len(), BridgeError::MissingBatchAccounts);
        let group = &remaining[cursor..end];

        let digest = message_digest(bridge.host_chain_id, &bridge.contract_identity, message)?;
        let receipt = Account::<ProcessedReceipt>::try_from(&group[0])?;
        require!(receipt.digest == digest, BridgeError::DigestMismatch);

        receipts.push(receipt);
        groups.push(group);
        cursor = end;
    }
    require!(cursor == remaining.len(), BridgeError::MissingBatchAccounts);

    let verifier = Ed25519SysvarVerifier::load(&accounts.instructions.to_account_info())?;
    let now = Clock::get()?.slot;
    let submitter = accounts.submitter.key();

    let vault = accounts.vault.to_account_info();
    let reserved = bridge.reserved(accounts.relayers.total_stake()?)?;
    let liquidity = lamports::spendable(&vault)?.saturating_sub(reserved);
    let executor_authority = accounts.executor.to_account_info();

    let outcome = {
        let mut executors: Vec<CpiExecutor> = groups
            .iter()
            .map(|group| CpiExecutor {
                program: &group[1],
                inbox: &group[2],
                vault: &vault,
                executor: &executor_authority,
                executor_bump: bridge.executor_bump,
                accounts: &group[MEMBER_FIXED_ACCOUNTS..],
            })
            .collect();
        let mut persisted: Vec<PersistedReceipt> = receipts
            .iter_mut()
            .map(|receipt| PersistedReceipt { receipt })
            .collect();
        let mut members: Vec<BatchMember<PersistedReceipt, CpiExecutor>> = persisted
            .iter_mut()
            .zip(executors.iter_mut())
            .map(|(processed, executor)| BatchMember { processed, executor })
            .collect();

        let mut env = InboundEnv {
            bridge,
            chain: &mut accounts.chain,
            relayers: &mut accounts.relayers,
            verifier: &verifier,
            submitter,
            liquidity,
            now,
        };
        inbound::process_batch(&mut env, &messages, &attestations, &mut members)?
    };

    for ((result, receipt), message) in outcome.results.iter().zip(receipts.iter_mut()).zip(&messages) {
        let BatchResult::Processed(processed) = result else {
            continue;
        };
        receipt.record(
            processed.source_chain_id,
            processed.source_nonce,
            processed.succeeded,
            submitter,
            now,
        );
        receipt.exit(&crate::ID)?;

        emit!(MessageProcessed {
            digest: processed.digest,
            source_chain_id: processed.source_chain_id,
            source_nonce: processed.source_nonce,
            destination_address: message.destination_address,
            relayer: submitter,
            succeeded: processed.succeeded,
        });
    }

    msg!(
        "Processed batch of {} from chain {} ({} new)",
        messages.len(),
        accounts.chain.chain_id,
        outcome.processed_count()
    );
    Ok(())
}

#[derive(Accounts)]
pub struct ProcessBatch<'info> {
    #[account(seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    /// Source chain of the batch; every member must match it
    #[account(
        mut,
        seeds = [CHAIN_SEED, chain.chain_id.to_le_bytes().as_ref()],
        bump = chain.bump
    )]
    pub chain: Account<'info, ChainConfig>,

    #[account(mut, seeds = [RELAYERS_SEED], bump = relayers.bump)]
    pub relayers: Account<'info, RelayerSet>,

    #[account(mut, seeds = [VAULT_SEED], bump = bridge.vault_bump)]
    pub vault: Account<'info, Vault>,

    /// CHECK: bridge PDA that signs destination calls
    #[account(seeds = [EXECUTOR_SEED], bump = bridge.executor_bump)]
    pub executor: UncheckedAccount<'info>,

    /// CHECK: instructions sysvar, read for Ed25519 verifications
    #[account(address = sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    #[account(mut)]
    pub submitter: Signer<'info>,
}
