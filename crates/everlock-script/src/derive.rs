use everlock_core::{Address, Credential, LockError, Network, SpendingValidator};

/// Derive the contract address for `validator` scoped to one owner's stake
/// credential.
///
/// Deterministic: identical (validator, stake credential, network) inputs
/// always yield the identical address, and for a fixed network two distinct
/// (validator, stake) pairs never collide: the address embeds both hashes
/// verbatim. The network is an explicit parameter so the same pair can never
/// silently produce a cross-network address.
pub fn derive_contract_address(
    validator: &SpendingValidator,
    stake: Credential,
    network: Network,
) -> Address {
    Address::Base {
        network,
        payment: Credential::Script(validator.script_hash()),
        stake,
    }
}

/// Resolve the owner's stake credential and derive the contract address.
///
/// Fails with a credential error when `owner` carries no stake credential,
/// before any network call is made.
pub fn contract_address_for_owner(
    validator: &SpendingValidator,
    owner: &Address,
    network: Network,
) -> Result<Address, LockError> {
    let stake = owner.details().require_stake()?;
    Ok(derive_contract_address(validator, stake, network))
}
