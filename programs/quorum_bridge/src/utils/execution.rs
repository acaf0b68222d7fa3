use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    hash,
    instruction::{AccountMeta, Instruction},
    program::invoke_signed,
};

use crate::constants::{EXECUTOR_SEED, INBOX_SEED};
use crate::errors::BridgeError;
use crate::processor::MessageExecutor;
use crate::state::{InboundDelivery, InboundMessage, ProcessedReceipt, ProcessedSet};
use crate::utils::{hash::evm_address, lamports};

/// Anchor sighash of the `receive_bridge_message` instruction destination
/// programs expose
pub fn receive_discriminator() -> [u8; 8] {
    let preimage = hash::hash(b"global:receive_bridge_message").to_bytes();
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&preimage[..8]);
    discriminator
}

/// Delivers a message by paying its value into the destination program's
/// inbox PDA and invoking the program, signed by the bridge executor PDA.
///
/// Account order seen by the destination: executor (signer), inbox
/// (writable), then the caller-supplied accounts unchanged.
pub struct CpiExecutor<'a, 'info> {
    pub program: &'a AccountInfo<'info>,
    pub inbox: &'a AccountInfo<'info>,
    pub vault: &'a AccountInfo<'info>,
    pub executor: &'a AccountInfo<'info>,
    pub executor_bump: u8,
    pub accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> CpiExecutor<'a, 'info> {
    fn instruction(&self, digest: &[u8; 32], message: &InboundMessage) -> Result<Instruction> {
        let mut data = receive_discriminator().to_vec();
        InboundDelivery::new(*digest, message)
            .serialize(&mut data)
            .map_err(|_| error!(anchor_lang::error::ErrorCode::InstructionDidNotSerialize))?;

        let mut metas = vec![
            AccountMeta::new_readonly(*self.executor.key, true),
            AccountMeta::new(*self.inbox.key, false),
        ];
        metas.extend(self.accounts.iter().map(|account| {
            if account.is_writable {
                AccountMeta::new(*account.key, account.is_signer)
            } else {
                AccountMeta::new_readonly(*account.key, account.is_signer)
            }
        }));

        Ok(Instruction {
            program_id: *self.program.key,
            accounts: metas,
            data,
        })
    }
}

impl<'a, 'info> MessageExecutor for CpiExecutor<'a, 'info> {
    fn prepare(&self, message: &InboundMessage) -> Result<()> {
        require!(self.program.executable, BridgeError::DestinationNotExecutable);
        require!(
            evm_address(self.program.key) == message.destination_address,
            BridgeError::DestinationMismatch
        );
        let (inbox, _) = Pubkey::find_program_address(&[INBOX_SEED], self.program.key);
        require_keys_eq!(inbox, *self.inbox.key, BridgeError::InvalidValueInbox);
        Ok(())
    }

    fn execute(&mut self, digest: &[u8; 32], message: &InboundMessage) -> Result<()> {
        lamports::withdraw(self.vault, self.inbox, message.value)?;

        let ix = self.instruction(digest, message)?;
        let mut infos = Vec::with_capacity(self.accounts.len() + 3);
        infos.push(self.executor.clone());
        infos.push(self.inbox.clone());
        infos.extend(self.accounts.iter().cloned());
        infos.push(self.program.clone());

        invoke_signed(&ix, &infos, &[&[EXECUTOR_SEED, &[self.executor_bump]]])?;
        Ok(())
    }
}

/// Receipt account flushed to its data as soon as the digest is inserted, so
/// the processed flag is visible to anything the destination call reaches.
pub struct PersistedReceipt<'a, 'info> {
    pub receipt: &'a mut Account<'info, ProcessedReceipt>,
}

impl<'a, 'info> ProcessedSet for PersistedReceipt<'a, 'info> {
    fn contains(&self, digest: &[u8; 32]) -> bool {
        self.receipt.contains(digest)
    }

    fn insert(&mut self, digest: [u8; 32]) -> Result<()> {
        self.receipt.insert(digest)?;
        self.receipt.exit(&crate::ID)
    }
}
