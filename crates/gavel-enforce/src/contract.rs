use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::context::Context;

/// A named, configurable correctness checker.
///
/// Contracts are bound to declarations with a magic comment:
///
/// ```text
/// // contract:SomeContract
/// ```
///
/// Configuration may follow the name as a JSON object, which is decoded into
/// the contract instance before enforcement. Instances live for exactly one
/// `enforce` call.
pub trait Contract: Send {
    /// Checks the declaration presented by `ctx`. A returned error is a
    /// contract-internal violation: it is reported against the target's
    /// declaration and never aborts the run.
    fn enforce(&mut self, ctx: &Context<'_>) -> Result<(), ContractError>;
}

/// A failure inside a contract implementation.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ContractError(pub String);

impl ContractError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Constructs configured contract instances. The constructor receives the
/// raw configuration payload (empty when the annotation carried none) so
/// each contract decides its own decoding; the [`ContractProvider::of`]
/// constructor performs the strict JSON decode, which rejects unknown
/// fields when the contract struct opts in with
/// `#[serde(deny_unknown_fields)]`.
pub struct ContractProvider {
    /// Help text shown by the `contracts` listing.
    pub help: String,
    ctor: Box<dyn Fn(&str) -> Result<Box<dyn Contract>, serde_json::Error> + Send + Sync>,
}

impl ContractProvider {
    pub fn new(
        help: impl Into<String>,
        ctor: impl Fn(&str) -> Result<Box<dyn Contract>, serde_json::Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            help: help.into(),
            ctor: Box::new(ctor),
        }
    }

    /// A provider for contracts that default-construct and decode their
    /// configuration from JSON.
    pub fn of<C>(help: impl Into<String>) -> Self
    where
        C: Contract + Default + DeserializeOwned + 'static,
    {
        Self::new(help, |config: &str| {
            if config.trim().is_empty() {
                Ok(Box::new(C::default()) as Box<dyn Contract>)
            } else {
                serde_json::from_str::<C>(config).map(|c| Box::new(c) as Box<dyn Contract>)
            }
        })
    }

    pub fn construct(&self, config: &str) -> Result<Box<dyn Contract>, serde_json::Error> {
        (self.ctor)(config)
    }
}

/// The name → provider table a generated linter binary is populated with.
#[derive(Default)]
pub struct ContractRegistry {
    providers: BTreeMap<String, ContractProvider>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, provider: ContractProvider) {
        self.providers.insert(name.into(), provider);
    }

    pub fn get(&self, name: &str) -> Option<&ContractProvider> {
        self.providers.get(name)
    }

    /// Registered providers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContractProvider)> {
        self.providers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Configurable {
        #[serde(rename = "Expected", default)]
        expected: i64,
    }

    impl Contract for Configurable {
        fn enforce(&mut self, _ctx: &Context<'_>) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[test]
    fn test_empty_config_uses_default() {
        let provider = ContractProvider::of::<Configurable>("help");
        assert!(provider.construct("").is_ok());
        assert!(provider.construct("   ").is_ok());
    }

    #[test]
    fn test_config_decodes() {
        let provider = ContractProvider::of::<Configurable>("help");
        assert!(provider.construct(r#"{"Expected": 2}"#).is_ok());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let provider = ContractProvider::of::<Configurable>("help");
        assert!(provider.construct(r#"{"Expectde": 2}"#).is_err());
    }

    #[test]
    fn test_registry_iterates_in_name_order() {
        let mut reg = ContractRegistry::new();
        reg.register("Zeta", ContractProvider::of::<Configurable>(""));
        reg.register("Alpha", ContractProvider::of::<Configurable>(""));
        let names: Vec<&str> = reg.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }
}
