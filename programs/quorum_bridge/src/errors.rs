use anchor_lang::prelude::*;

#[error_code]
pub enum BridgeError {
    // Validation
    #[msg("Payload exceeds the chain's maximum message size")]
    MessageTooLarge,

    #[msg("Compute budget exceeds the chain's maximum")]
    ComputeBudgetExceeded,

    #[msg("Source sender address too long")]
    SenderTooLong,

    #[msg("Empty source sender address")]
    EmptySender,

    #[msg("Invalid chain configuration")]
    InvalidChainConfig,

    #[msg("Invalid bridge parameters")]
    InvalidBridgeParams,

    #[msg("Supplied digest does not match the message")]
    DigestMismatch,

    #[msg("Invalid message hash")]
    InvalidMessageHash,

    // Replay
    #[msg("Message already processed")]
    AlreadyProcessed,

    #[msg("Source nonce is not greater than the last processed nonce for this sender")]
    OutOfOrder,

    #[msg("Strict-ordering chains require a sender cursor")]
    MissingSenderCursor,

    #[msg("Sender cursor does not belong to this message")]
    SenderCursorMismatch,

    // Quorum
    #[msg("Quorum of relayer signatures not met")]
    QuorumNotMet,

    #[msg("Duplicate relayer index in attestations")]
    DuplicateSigner,

    #[msg("Too many attestations")]
    TooManyAttestations,

    #[msg("Invalid Ed25519 instruction data")]
    InvalidEd25519Instruction,

    // Resources
    #[msg("Chain is paused")]
    ChainPaused,

    #[msg("Rate limit exceeded for this epoch")]
    RateLimited,

    #[msg("Bridge vault cannot cover the transfer")]
    InsufficientLiquidity,

    // Fees and sponsors
    #[msg("Fee paid is below the required fee")]
    InsufficientFee,

    #[msg("Destination is not sponsored")]
    TargetNotSponsored,

    #[msg("Sponsor balance too low")]
    InsufficientSponsorBalance,

    #[msg("Sponsor allow-list is full")]
    TooManySponsoredTargets,

    #[msg("Claim exceeds earned compensation")]
    InsufficientEarnings,

    #[msg("Claim exceeds relayer pool balance")]
    InsufficientPoolBalance,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    // Relayers
    #[msg("Stake below the minimum")]
    InsufficientStake,

    #[msg("Relayer public key already registered")]
    RelayerAlreadyRegistered,

    #[msg("Relayer set is full")]
    RelayerSetFull,

    #[msg("Unknown relayer index")]
    UnknownRelayer,

    #[msg("Caller does not own this relayer slot")]
    NotRelayerOwner,

    #[msg("Invalid signature threshold")]
    InvalidThreshold,

    #[msg("Signature threshold exceeds relayer count")]
    ThresholdTooHigh,

    // Outbound lifecycle
    #[msg("Illegal outbound status transition")]
    InvalidStatusTransition,

    #[msg("Message is not old enough to reclaim")]
    ReclaimTooEarly,

    #[msg("Only the original sender may reclaim")]
    NotMessageSender,

    // Batches
    #[msg("Batch is empty or too large")]
    InvalidBatchSize,

    #[msg("Batch members must share one source chain")]
    MixedBatch,

    #[msg("Strict-ordering chains must be processed one message at a time")]
    StrictOrderingRequiresSingle,

    #[msg("Batch contains the same message twice")]
    DuplicateBatchMember,

    #[msg("Missing accounts for batch member")]
    MissingBatchAccounts,

    // Execution accounts
    #[msg("Destination program does not match destination address")]
    DestinationMismatch,

    #[msg("Destination is not an executable program")]
    DestinationNotExecutable,

    #[msg("Value inbox is not the destination program's inbox")]
    InvalidValueInbox,

    // Authority
    #[msg("Unauthorized authority")]
    UnauthorizedAuthority,

    #[msg("Chain identifier does not match account")]
    ChainMismatch,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}
