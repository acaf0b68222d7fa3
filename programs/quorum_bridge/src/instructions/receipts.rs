use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::BridgeError;
use crate::state::{ProcessedReceipt, SenderCursor};
use crate::utils::hash::{sender_key, validate_message_hash};

/// Create the processed-set entry for `digest` ahead of a batch submission.
/// Opening an existing receipt is a no-op.
pub fn open_receipt(ctx: Context<OpenReceipt>, digest: [u8; 32]) -> Result<()> {
    validate_message_hash(&digest)?;
    ctx.accounts.receipt.open(digest, ctx.bumps.receipt);
    Ok(())
}

/// Create the ordering cursor for a sender on a strict-ordering chain
pub fn open_cursor(ctx: Context<OpenCursor>, source_chain_id: u32, source_sender: Vec<u8>) -> Result<()> {
    require!(!source_sender.is_empty(), BridgeError::EmptySender);
    require!(
        source_sender.len() <= MAX_SOURCE_SENDER_LEN,
        BridgeError::SenderTooLong
    );

    let cursor = &mut ctx.accounts.cursor;
    if cursor.sender_key == [0; 32] {
        cursor.source_chain_id = source_chain_id;
        cursor.sender_key = sender_key(&source_sender);
        cursor.bump = ctx.bumps.cursor;

        msg!("Opened sender cursor on chain {}", source_chain_id);
    }
    Ok(())
}

#[derive(Accounts)]
#[instruction(digest: [u8; 32])]
pub struct OpenReceipt<'info> {
    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + ProcessedReceipt::INIT_SPACE,
        seeds = [RECEIPT_SEED, digest.as_ref()],
        bump
    )]
    pub receipt: Account<'info, ProcessedReceipt>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(source_chain_id: u32, source_sender: Vec<u8>)]
pub struct OpenCursor<'info> {
    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + SenderCursor::INIT_SPACE,
        seeds = [
            CURSOR_SEED,
            source_chain_id.to_le_bytes().as_ref(),
            sender_key(&source_sender).as_ref()
        ],
        bump
    )]
    pub cursor: Account<'info, SenderCursor>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}
