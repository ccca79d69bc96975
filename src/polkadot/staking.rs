//! Staking call construction.
//!
//! Calls are built dynamically against the node's metadata, so the same
//! code works on Polkadot, Kusama and Westend.

use subxt::dynamic::Value;
use subxt::tx::DynamicPayload;
use subxt::utils::AccountId32;

/// `Staking::bond { value, payee: Staked }` as a runtime call value.
///
/// Rewards are compounded into the bond.
pub fn bond_call(value: u128) -> Value {
    Value::unnamed_variant(
        "Staking",
        [Value::named_variant(
            "bond",
            [
                ("value", Value::u128(value)),
                ("payee", Value::unnamed_variant("Staked", Vec::<Value>::new())),
            ],
        )],
    )
}

/// `Staking::nominate { targets }` with each target as `MultiAddress::Id`.
pub fn nominate_call(targets: &[AccountId32]) -> Value {
    let targets = targets
        .iter()
        .map(|t| Value::unnamed_variant("Id", [Value::from_bytes(t.0)]));

    Value::unnamed_variant(
        "Staking",
        [Value::named_variant(
            "nominate",
            [("targets", Value::unnamed_composite(targets))],
        )],
    )
}

/// Bond and nominate in one `Utility::batch_all`, so a failed nomination
/// does not leave funds bonded without targets.
pub fn stake_payload(value: u128, targets: &[AccountId32]) -> DynamicPayload {
    subxt::dynamic::tx(
        "Utility",
        "batch_all",
        vec![Value::unnamed_composite([bond_call(value), nominate_call(targets)])],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use subxt::ext::scale_value::{At, ValueDef};

    fn variant_name<T>(value: &subxt::ext::scale_value::Value<T>) -> Option<&str> {
        match &value.value {
            ValueDef::Variant(v) => Some(v.name.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_bond_call_shape() {
        let call = bond_call(15_000_000_000);
        assert_eq!(variant_name(&call), Some("Staking"));

        let inner = call.at(0).unwrap();
        assert_eq!(variant_name(inner), Some("bond"));
        assert_eq!(inner.at("value").and_then(|v| v.as_u128()), Some(15_000_000_000));
        assert_eq!(variant_name(inner.at("payee").unwrap()), Some("Staked"));
    }

    #[test]
    fn test_nominate_call_targets() {
        let targets = vec![AccountId32([1u8; 32]), AccountId32([2u8; 32])];
        let call = nominate_call(&targets);

        let inner = call.at(0).unwrap();
        assert_eq!(variant_name(inner), Some("nominate"));

        let list = inner.at("targets").unwrap();
        let first = list.at(0).unwrap();
        assert_eq!(variant_name(first), Some("Id"));
        assert!(list.at(1).is_some());
        assert!(list.at(2).is_none());
    }

    #[test]
    fn test_stake_payload_builds() {
        let payload = stake_payload(1, &[AccountId32([9u8; 32])]);
        assert_eq!(payload.pallet_name(), "Utility");
        assert_eq!(payload.call_name(), "batch_all");
    }
}
