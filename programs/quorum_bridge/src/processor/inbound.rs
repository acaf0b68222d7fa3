use anchor_lang::prelude::*;

use crate::constants::MAX_BATCH_SIZE;
use crate::errors::BridgeError;
use crate::state::{
    bridge::checked_add, Attestation, BridgeConfig, ChainConfig, InboundMessage, ProcessedSet,
    RelayerSet, SenderCursor,
};
use crate::utils::hash::{batch_digest, message_digest, sender_key};
use crate::utils::signature::{require_quorum, SignatureVerifier};

/// Delivers an inbound message to its destination
pub trait MessageExecutor {
    /// Account and target checks; an error here rejects the message with no state change
    fn prepare(&self, message: &InboundMessage) -> Result<()>;

    /// Runs after the digest is committed. An error is terminal for the message.
    fn execute(&mut self, digest: &[u8; 32], message: &InboundMessage) -> Result<()>;
}

/// Bridge state an inbound submission reads and mutates
pub struct InboundEnv<'a, V> {
    pub bridge: &'a BridgeConfig,
    pub chain: &'a mut ChainConfig,
    pub relayers: &'a mut RelayerSet,
    pub verifier: &'a V,
    /// Account submitting the message
    pub submitter: Pubkey,
    /// Vault lamports available to pay out message value
    pub liquidity: u64,
    pub now: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundOutcome {
    pub digest: [u8; 32],
    pub source_chain_id: u32,
    pub source_nonce: u64,
    pub succeeded: bool,
    /// Compensation credited to the submitting relayer
    pub reward: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResult {
    Skipped { digest: [u8; 32] },
    Processed(InboundOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub batch_digest: [u8; 32],
    pub results: Vec<BatchResult>,
}

impl BatchOutcome {
    pub fn processed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, BatchResult::Processed(_)))
            .count()
    }
}

/// Storage and delivery handles for one batch member
pub struct BatchMember<'a, P, E> {
    pub processed: &'a mut P,
    pub executor: &'a mut E,
}

/// Execute a verified inbound message exactly once.
///
/// Checks run in order: replay, chain active, transport limits, sender
/// ordering, rate limit, quorum, destination. Nothing is written until all of
/// them pass. The digest is committed before the destination call, so a
/// failed call still consumes the message.
pub fn process_inbound<V, P, E>(
    env: &mut InboundEnv<V>,
    message: &InboundMessage,
    attestations: &[Attestation],
    processed: &mut P,
    mut cursor: Option<&mut SenderCursor>,
    executor: &mut E,
) -> Result<InboundOutcome>
where
    V: SignatureVerifier,
    P: ProcessedSet,
    E: MessageExecutor,
{
    let digest = message_digest(env.bridge.host_chain_id, &env.bridge.contract_identity, message)?;
    require!(!processed.contains(&digest), BridgeError::AlreadyProcessed);

    require!(
        env.chain.chain_id == message.source_chain_id,
        BridgeError::ChainMismatch
    );
    env.chain.ensure_active()?;
    env.chain
        .check_limits(message.payload.len(), message.compute_budget)?;

    if env.chain.strict_ordering {
        let cursor = cursor
            .as_deref()
            .ok_or_else(|| error!(BridgeError::MissingSenderCursor))?;
        cursor.ensure_matches(message.source_chain_id, &sender_key(&message.source_sender))?;
        cursor.check(message.source_nonce)?;
    }

    let window = env.chain.inbound_window.admit(
        env.now,
        env.bridge.rate_epoch_length,
        env.chain.rate_limit_per_epoch,
        1,
    )?;

    require_quorum(env.relayers, &digest, attestations, env.verifier)?;

    require!(message.value <= env.liquidity, BridgeError::InsufficientLiquidity);
    executor.prepare(message)?;

    // Commit
    let reward = credit_submitter(env, 1)?;
    processed.insert(digest)?;
    env.chain.inbound_window = window;
    env.chain.record_inbound_nonce(message.source_nonce);
    if env.chain.strict_ordering {
        if let Some(cursor) = cursor.as_deref_mut() {
            cursor.advance(message.source_nonce);
        }
    }

    // External call last
    let succeeded = run(executor, &digest, message);

    Ok(InboundOutcome {
        digest,
        source_chain_id: message.source_chain_id,
        source_nonce: message.source_nonce,
        succeeded,
        reward,
    })
}

/// Execute a batch attested by a single quorum over the batch digest.
///
/// Members already processed are skipped, so a partially delivered batch can
/// be resubmitted unchanged. Any other failure rejects the whole batch.
pub fn process_batch<V, P, E>(
    env: &mut InboundEnv<V>,
    messages: &[InboundMessage],
    attestations: &[Attestation],
    members: &mut [BatchMember<P, E>],
) -> Result<BatchOutcome>
where
    V: SignatureVerifier,
    P: ProcessedSet,
    E: MessageExecutor,
{
    require!(
        !messages.is_empty() && messages.len() <= MAX_BATCH_SIZE,
        BridgeError::InvalidBatchSize
    );
    require!(
        members.len() == messages.len(),
        BridgeError::MissingBatchAccounts
    );
    require!(
        messages
            .iter()
            .all(|m| m.source_chain_id == env.chain.chain_id),
        BridgeError::MixedBatch
    );
    env.chain.ensure_active()?;
    require!(
        !env.chain.strict_ordering,
        BridgeError::StrictOrderingRequiresSingle
    );

    let digests = messages
        .iter()
        .map(|m| message_digest(env.bridge.host_chain_id, &env.bridge.contract_identity, m))
        .collect::<Result<Vec<_>>>()?;
    for (i, digest) in digests.iter().enumerate() {
        require!(
            !digests[..i].contains(digest),
            BridgeError::DuplicateBatchMember
        );
    }

    let pending: Vec<usize> = (0..messages.len())
        .filter(|&i| !members[i].processed.contains(&digests[i]))
        .collect();

    let mut total_value: u64 = 0;
    for &i in &pending {
        let message = &messages[i];
        env.chain
            .check_limits(message.payload.len(), message.compute_budget)?;
        total_value = checked_add(total_value, message.value)?;
    }

    let window = if pending.is_empty() {
        env.chain.inbound_window
    } else {
        env.chain.inbound_window.admit(
            env.now,
            env.bridge.rate_epoch_length,
            env.chain.rate_limit_per_epoch,
            pending.len() as u32,
        )?
    };

    let batch_digest = batch_digest(&digests);
    require_quorum(env.relayers, &batch_digest, attestations, env.verifier)?;

    require!(total_value <= env.liquidity, BridgeError::InsufficientLiquidity);
    for &i in &pending {
        members[i].executor.prepare(&messages[i])?;
    }

    // Commit
    let reward_each = if pending.is_empty() {
        0
    } else {
        credit_submitter(env, pending.len() as u64)? / pending.len() as u64
    };
    env.chain.inbound_window = window;

    let mut results = Vec::with_capacity(messages.len());
    for (i, message) in messages.iter().enumerate() {
        let digest = digests[i];
        if !pending.contains(&i) {
            msg!("Skipping already processed message nonce={}", message.source_nonce);
            results.push(BatchResult::Skipped { digest });
            continue;
        }

        let member = &mut members[i];
        member.processed.insert(digest)?;
        env.chain.record_inbound_nonce(message.source_nonce);
        let succeeded = run(&mut *member.executor, &digest, message);

        results.push(BatchResult::Processed(InboundOutcome {
            digest,
            source_chain_id: message.source_chain_id,
            source_nonce: message.source_nonce,
            succeeded,
            reward: reward_each,
        }));
    }

    Ok(BatchOutcome {
        batch_digest,
        results,
    })
}

/// Credit the submitting relayer for `messages` deliveries; anyone may submit
/// but only registered relayers are paid.
fn credit_submitter<V>(env: &mut InboundEnv<V>, messages: u64) -> Result<u64> {
    let reward = env
        .bridge
        .fees
        .relay_reward
        .checked_mul(messages)
        .ok_or_else(|| error!(BridgeError::ArithmeticOverflow))?;
    if reward == 0 {
        return Ok(0);
    }
    match env.relayers.index_of_owner(&env.submitter) {
        Some(index) => {
            env.relayers.credit(index, reward)?;
            Ok(reward)
        }
        None => Ok(0),
    }
}

fn run<E: MessageExecutor>(executor: &mut E, digest: &[u8; 32], message: &InboundMessage) -> bool {
    match executor.execute(digest, message) {
        Ok(()) => true,
        Err(err) => {
            msg!(
                "Execution failed for source_chain={} nonce={}: {}",
                message.source_chain_id,
                message.source_nonce,
                err
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test_utils::*;

    struct Fixture {
        bridge: BridgeConfig,
        chain: ChainConfig,
        relayers: RelayerSet,
        keys: Vec<TestRelayer>,
        processed: BTreeSet<[u8; 32]>,
        executor: RecordingExecutor,
        now: u64,
    }

    impl Fixture {
        /// M=2 of N=3, source chain 7
        fn new() -> Self {
            let keys = TestRelayer::many(3);
            Self {
                bridge: bridge_config(),
                chain: chain_config(7),
                relayers: relayer_set(&keys, 2),
                keys,
                processed: BTreeSet::new(),
                executor: RecordingExecutor::default(),
                now: 1_000,
            }
        }

        fn env(&mut self) -> InboundEnv<'_, DalekVerifier> {
            InboundEnv {
                bridge: &self.bridge,
                chain: &mut self.chain,
                relayers: &mut self.relayers,
                verifier: &DalekVerifier,
                submitter: self.keys[0].owner,
                liquidity: 1_000_000,
                now: self.now,
            }
        }

        fn attest(&self, indices: &[u8], digest: &[u8; 32]) -> Vec<Attestation> {
            indices
                .iter()
                .map(|&i| sign(&self.keys[i as usize], i, digest))
                .collect()
        }

        fn digest(&self, message: &InboundMessage) -> [u8; 32] {
            message_digest(HOST_CHAIN_ID, &CONTRACT_IDENTITY, message).unwrap()
        }

        fn process(&mut self, message: &InboundMessage, attestations: &[Attestation]) -> Result<InboundOutcome> {
            let mut processed = std::mem::take(&mut self.processed);
            let mut executor = std::mem::take(&mut self.executor);
            let result = process_inbound(
                &mut self.env(),
                message,
                attestations,
                &mut processed,
                None,
                &mut executor,
            );
            self.processed = processed;
            self.executor = executor;
            result
        }
    }

    #[test]
    fn two_of_three_then_replay_then_single_signer() {
        let mut fx = Fixture::new();
        let message = inbound_message(7, 5);
        let digest = fx.digest(&message);

        let attestations = fx.attest(&[0, 2], &digest);
        let outcome = fx.process(&message, &attestations).unwrap();
        assert_eq!(outcome.digest, digest);
        assert!(outcome.succeeded);
        assert!(fx.processed.contains(&digest));
        assert_eq!(fx.executor.executed, vec![digest]);

        assert_bridge_error(fx.process(&message, &attestations), BridgeError::AlreadyProcessed);
        assert_eq!(fx.executor.executed.len(), 1);

        let other = inbound_message(7, 6);
        let single = fx.attest(&[0], &fx.digest(&other));
        assert_bridge_error(fx.process(&other, &single), BridgeError::QuorumNotMet);
        assert!(!fx.processed.contains(&fx.digest(&other)));
    }

    #[test]
    fn value_is_never_credited_twice() {
        let mut fx = Fixture::new();
        let message = InboundMessage {
            value: 5_000,
            ..inbound_message(7, 1)
        };
        let attestations = fx.attest(&[0, 1, 2], &fx.digest(&message));

        fx.process(&message, &attestations).unwrap();
        for _ in 0..3 {
            assert_bridge_error(fx.process(&message, &attestations), BridgeError::AlreadyProcessed);
        }
        assert_eq!(fx.executor.value_delivered, 5_000);
    }

    #[test]
    fn failed_execution_still_consumes_the_message() {
        let mut fx = Fixture::new();
        fx.executor.fail_execution = true;
        let message = inbound_message(7, 9);
        let digest = fx.digest(&message);
        let attestations = fx.attest(&[1, 2], &digest);

        let outcome = fx.process(&message, &attestations).unwrap();
        assert!(!outcome.succeeded);
        assert!(fx.processed.contains(&digest));

        fx.executor.fail_execution = false;
        assert_bridge_error(fx.process(&message, &attestations), BridgeError::AlreadyProcessed);
        assert!(fx.executor.executed.is_empty());
    }

    #[test]
    fn rejected_message_leaves_no_trace() {
        let mut fx = Fixture::new();
        let message = inbound_message(7, 2);
        let digest = fx.digest(&message);

        fx.executor.fail_prepare = true;
        let attestations = fx.attest(&[0, 1], &digest);
        assert_bridge_error(fx.process(&message, &attestations), BridgeError::DestinationMismatch);

        assert!(fx.processed.is_empty());
        assert_eq!(fx.chain.inbound_window.count_in_epoch, 0);
        assert_eq!(fx.relayers.entry(0).unwrap().earned, 0);
    }

    #[test]
    fn quorum_failure_does_not_consume_rate_budget() {
        let mut fx = Fixture::new();
        fx.chain.rate_limit_per_epoch = 1;
        let message = inbound_message(7, 2);
        let digest = fx.digest(&message);

        let single = fx.attest(&[0], &digest);
        assert_bridge_error(fx.process(&message, &single), BridgeError::QuorumNotMet);
        assert_eq!(fx.chain.inbound_window.count_in_epoch, 0);

        let quorum = fx.attest(&[0, 1], &digest);
        fx.process(&message, &quorum).unwrap();
    }

    #[test]
    fn paused_chain_rejects() {
        let mut fx = Fixture::new();
        fx.chain.active = false;
        let message = inbound_message(7, 2);
        let attestations = fx.attest(&[0, 1], &fx.digest(&message));
        assert_bridge_error(fx.process(&message, &attestations), BridgeError::ChainPaused);
    }

    #[test]
    fn wrong_chain_account_is_rejected() {
        let mut fx = Fixture::new();
        let message = inbound_message(8, 2);
        let attestations = fx.attest(&[0, 1], &fx.digest(&message));
        assert_bridge_error(fx.process(&message, &attestations), BridgeError::ChainMismatch);
    }

    #[test]
    fn oversized_inbound_payload_is_rejected() {
        let mut fx = Fixture::new();
        fx.chain.max_message_bytes = 8;
        let message = inbound_message(7, 2);
        let attestations = fx.attest(&[0, 1], &fx.digest(&message));
        assert_bridge_error(fx.process(&message, &attestations), BridgeError::MessageTooLarge);
    }

    #[test]
    fn rate_limit_boundary() {
        let mut fx = Fixture::new();
        fx.chain.rate_limit_per_epoch = 2;

        for nonce in 0..2 {
            let message = inbound_message(7, nonce);
            let attestations = fx.attest(&[0, 1], &fx.digest(&message));
            fx.process(&message, &attestations).unwrap();
        }

        let third = inbound_message(7, 2);
        let attestations = fx.attest(&[0, 1], &fx.digest(&third));
        assert_bridge_error(fx.process(&third, &attestations), BridgeError::RateLimited);

        fx.now += fx.bridge.rate_epoch_length;
        fx.process(&third, &attestations).unwrap();
    }

    #[test]
    fn insufficient_liquidity_is_transient() {
        let mut fx = Fixture::new();
        let message = InboundMessage {
            value: 2_000_000,
            ..inbound_message(7, 3)
        };
        let attestations = fx.attest(&[0, 1], &fx.digest(&message));
        assert_bridge_error(fx.process(&message, &attestations), BridgeError::InsufficientLiquidity);
        assert!(fx.processed.is_empty());
    }

    #[test]
    fn registered_submitter_earns_reward() {
        let mut fx = Fixture::new();
        let message = inbound_message(7, 3);
        let attestations = fx.attest(&[1, 2], &fx.digest(&message));
        let outcome = fx.process(&message, &attestations).unwrap();

        assert_eq!(outcome.reward, fx.bridge.fees.relay_reward);
        assert_eq!(fx.relayers.entry(0).unwrap().earned, fx.bridge.fees.relay_reward);
    }

    #[test]
    fn anonymous_submitter_is_not_paid() {
        let mut fx = Fixture::new();
        let message = inbound_message(7, 3);
        let attestations = fx.attest(&[1, 2], &fx.digest(&message));

        let mut processed = BTreeSet::new();
        let mut executor = RecordingExecutor::default();
        let mut env = fx.env();
        env.submitter = Pubkey::new_unique();
        let outcome = process_inbound(&mut env, &message, &attestations, &mut processed, None, &mut executor)
            .unwrap();
        assert_eq!(outcome.reward, 0);
        assert!(outcome.succeeded);
    }

    #[test]
    fn removed_signer_invalidates_later_submissions_only() {
        let mut fx = Fixture::new();
        let first = inbound_message(7, 1);
        let second = inbound_message(7, 2);
        let first_att = fx.attest(&[0, 1], &fx.digest(&first));
        let second_att = fx.attest(&[0, 1], &fx.digest(&second));

        fx.process(&first, &first_att).unwrap();
        fx.relayers.remove(1).unwrap();

        assert_bridge_error(fx.process(&second, &second_att), BridgeError::QuorumNotMet);
        // The committed digest stays committed
        assert!(fx.processed.contains(&fx.digest(&first)));
    }

    #[test]
    fn strict_ordering_requires_increasing_nonces() {
        let mut fx = Fixture::new();
        fx.chain.strict_ordering = true;
        let sender = vec![0xAB; 20];
        let mut cursor = SenderCursor {
            source_chain_id: 7,
            sender_key: sender_key(&sender),
            ..Default::default()
        };

        let submit = |fx: &mut Fixture, nonce: u64, cursor: Option<&mut SenderCursor>| {
            let message = InboundMessage {
                source_sender: sender.clone(),
                ..inbound_message(7, nonce)
            };
            let attestations = fx.attest(&[0, 1], &fx.digest(&message));
            let mut processed = std::mem::take(&mut fx.processed);
            let mut executor = RecordingExecutor::default();
            let result = process_inbound(&mut fx.env(), &message, &attestations, &mut processed, cursor, &mut executor);
            fx.processed = processed;
            result
        };

        assert_bridge_error(submit(&mut fx, 3, None), BridgeError::MissingSenderCursor);
        submit(&mut fx, 3, Some(&mut cursor)).unwrap();
        assert_eq!(cursor.last_nonce, Some(3));
        assert_bridge_error(submit(&mut fx, 2, Some(&mut cursor)), BridgeError::OutOfOrder);
        submit(&mut fx, 10, Some(&mut cursor)).unwrap();

        let mut foreign = SenderCursor {
            source_chain_id: 7,
            sender_key: [0; 32],
            ..Default::default()
        };
        assert_bridge_error(submit(&mut fx, 11, Some(&mut foreign)), BridgeError::SenderCursorMismatch);
    }

    fn run_batch(
        fx: &mut Fixture,
        messages: &[InboundMessage],
        attestations: &[Attestation],
        sets: &mut [BTreeSet<[u8; 32]>],
        executors: &mut [RecordingExecutor],
    ) -> Result<BatchOutcome> {
        let mut members: Vec<BatchMember<_, _>> = sets
            .iter_mut()
            .zip(executors.iter_mut())
            .map(|(processed, executor)| BatchMember { processed, executor })
            .collect();
        process_batch(&mut fx.env(), messages, attestations, &mut members)
    }

    #[test]
    fn batch_skips_processed_members_on_resubmission() {
        let mut fx = Fixture::new();
        let messages: Vec<_> = (0..3).map(|n| inbound_message(7, n)).collect();
        let digests: Vec<_> = messages.iter().map(|m| fx.digest(m)).collect();
        let attestations = fx.attest(&[0, 2], &batch_digest(&digests));

        // Member 1 already landed individually
        let mut sets = vec![BTreeSet::new(), BTreeSet::from([digests[1]]), BTreeSet::new()];
        let mut executors = vec![RecordingExecutor::default(); 3];

        let outcome = run_batch(&mut fx, &messages, &attestations, &mut sets, &mut executors).unwrap();
        assert_eq!(outcome.processed_count(), 2);
        assert_eq!(outcome.results[1], BatchResult::Skipped { digest: digests[1] });
        assert!(executors[1].executed.is_empty());
        assert_eq!(fx.chain.inbound_window.count_in_epoch, 2);

        // Full resubmission is a no-op
        let again = run_batch(&mut fx, &messages, &attestations, &mut sets, &mut executors).unwrap();
        assert_eq!(again.processed_count(), 0);
        assert_eq!(fx.chain.inbound_window.count_in_epoch, 2);
        assert_eq!(executors.iter().map(|e| e.executed.len()).sum::<usize>(), 2);
    }

    #[test]
    fn batch_quorum_is_over_batch_digest() {
        let mut fx = Fixture::new();
        let messages: Vec<_> = (0..2).map(|n| inbound_message(7, n)).collect();
        // Signatures over the first member alone do not cover the batch
        let attestations = fx.attest(&[0, 1], &fx.digest(&messages[0]));
        let mut sets = vec![BTreeSet::new(); 2];
        let mut executors = vec![RecordingExecutor::default(); 2];
        assert_bridge_error(
            run_batch(&mut fx, &messages, &attestations, &mut sets, &mut executors),
            BridgeError::QuorumNotMet,
        );
        assert!(sets.iter().all(BTreeSet::is_empty));
    }

    #[test]
    fn batch_rejects_mixed_chains_and_duplicates() {
        let mut fx = Fixture::new();
        let mut sets = vec![BTreeSet::new(); 2];
        let mut executors = vec![RecordingExecutor::default(); 2];

        let mixed = vec![inbound_message(7, 1), inbound_message(8, 1)];
        assert_bridge_error(
            run_batch(&mut fx, &mixed, &[], &mut sets, &mut executors),
            BridgeError::MixedBatch,
        );

        let duplicated = vec![inbound_message(7, 1), inbound_message(7, 1)];
        assert_bridge_error(
            run_batch(&mut fx, &duplicated, &[], &mut sets, &mut executors),
            BridgeError::DuplicateBatchMember,
        );

        fx.chain.strict_ordering = true;
        let ordered = vec![inbound_message(7, 1), inbound_message(7, 2)];
        assert_bridge_error(
            run_batch(&mut fx, &ordered, &[], &mut sets, &mut executors),
            BridgeError::StrictOrderingRequiresSingle,
        );
    }

    #[test]
    fn batch_rate_limit_is_all_or_nothing() {
        let mut fx = Fixture::new();
        fx.chain.rate_limit_per_epoch = 2;
        let messages: Vec<_> = (0..3).map(|n| inbound_message(7, n)).collect();
        let digests: Vec<_> = messages.iter().map(|m| fx.digest(m)).collect();
        let attestations = fx.attest(&[0, 1], &batch_digest(&digests));
        let mut sets = vec![BTreeSet::new(); 3];
        let mut executors = vec![RecordingExecutor::default(); 3];

        assert_bridge_error(
            run_batch(&mut fx, &messages, &attestations, &mut sets, &mut executors),
            BridgeError::RateLimited,
        );
        assert!(sets.iter().all(BTreeSet::is_empty));
        assert_eq!(fx.chain.inbound_window.count_in_epoch, 0);
    }

    #[test]
    fn batch_member_failure_is_isolated() {
        let mut fx = Fixture::new();
        let messages: Vec<_> = (0..2).map(|n| inbound_message(7, n)).collect();
        let digests: Vec<_> = messages.iter().map(|m| fx.digest(m)).collect();
        let attestations = fx.attest(&[1, 2], &batch_digest(&digests));
        let mut sets = vec![BTreeSet::new(); 2];
        let mut executors = vec![RecordingExecutor::default(); 2];
        executors[0].fail_execution = true;

        let outcome = run_batch(&mut fx, &messages, &attestations, &mut sets, &mut executors).unwrap();
        match (&outcome.results[0], &outcome.results[1]) {
            (BatchResult::Processed(a), BatchResult::Processed(b)) => {
                assert!(!a.succeeded);
                assert!(b.succeeded);
            }
            other => panic!("unexpected results {other:?}"),
        }
        assert!(sets[0].contains(&digests[0]));
        assert_eq!(
            fx.relayers.entry(0).unwrap().earned,
            2 * fx.bridge.fees.relay_reward
        );
    }
}
