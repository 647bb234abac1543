//! Fee parameter hub.
//!
//! Holds the current governance fee parameters and rebuilds the calculator
//! registry from them on load and on every parameter change.

use crate::params::FeeParam;
use crate::registry::FeeCalculatorRegistry;
use crate::Result;
use std::collections::HashMap;
use tracing::{debug, info};

/// Current fee parameters, in the order they were first introduced.
#[derive(Debug, Clone, Default)]
pub struct FeeParamHub {
    params: Vec<FeeParam>,
}

impl FeeParamHub {
    /// Creates a hub from genesis parameters, validating each one.
    pub fn new(genesis: Vec<FeeParam>) -> Result<Self> {
        for param in &genesis {
            param.check()?;
        }
        Ok(Self { params: genesis })
    }

    /// Current parameters
    pub fn params(&self) -> &[FeeParam] {
        &self.params
    }

    /// Current parameter for `msg_type`
    pub fn param(&self, msg_type: &str) -> Option<&FeeParam> {
        self.params.iter().find(|p| p.msg_type() == msg_type)
    }

    /// Rebuilds every calculator from the current parameters.
    ///
    /// All calculators are unset first; a parameter whose message type has
    /// no registered generator is skipped. Returns the number of calculators
    /// registered.
    pub fn load(&self, registry: &mut FeeCalculatorRegistry) -> Result<usize> {
        for param in &self.params {
            param.check()?;
        }

        registry.unset_all();
        let mut registered = 0;
        for param in &self.params {
            match registry.get_generator(param.msg_type()) {
                Some(generator) => {
                    registry.register_calculator(param.msg_type(), generator(param));
                    registered += 1;
                }
                None => debug!(msg_type = param.msg_type(), "no generator for fee param, skipping"),
            }
        }
        Ok(registered)
    }

    /// Applies a governance fee change.
    ///
    /// Each update replaces the current parameter of the same message type
    /// or is appended. Updates are validated before anything changes, so a
    /// rejected change leaves both the hub and the registry untouched.
    pub fn update(
        &mut self,
        updates: Vec<FeeParam>,
        registry: &mut FeeCalculatorRegistry,
    ) -> Result<usize> {
        for update in &updates {
            update.check()?;
        }

        let mut index: HashMap<String, usize> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.msg_type().to_string(), i))
            .collect();

        let update_count = updates.len();
        for update in updates {
            match index.get(update.msg_type()) {
                Some(&i) => self.params[i] = update,
                None => {
                    index.insert(update.msg_type().to_string(), self.params.len());
                    self.params.push(update);
                }
            }
        }

        let registered = self.load(registry)?;
        info!(
            updates = update_count,
            params = self.params.len(),
            calculators = registered,
            "applied fee param change"
        );
        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::fixed_fee_calculator_gen;
    use crate::params::FixedFeeParams;
    use crate::Error;
    use chainfee_core::FeeDistributeType;

    fn fixed(msg_type: &str, fee: i64) -> FeeParam {
        FixedFeeParams::new(msg_type, fee, FeeDistributeType::ForAll).into()
    }

    #[test]
    fn test_load_skips_types_without_generator() {
        let mut registry = FeeCalculatorRegistry::new();
        registry.register_generator("transfer", fixed_fee_calculator_gen("BNB"));

        let hub = FeeParamHub::new(vec![fixed("transfer", 10), fixed("unknown", 5)]).unwrap();
        assert_eq!(hub.load(&mut registry).unwrap(), 1);
        assert!(registry.get_calculator("transfer").is_some());
        assert!(registry.get_calculator("unknown").is_none());
    }

    #[test]
    fn test_update_replaces_and_appends() {
        let mut registry = FeeCalculatorRegistry::new();
        registry.register_generator("transfer", fixed_fee_calculator_gen("BNB"));
        registry.register_generator("issue", fixed_fee_calculator_gen("BNB"));

        let mut hub = FeeParamHub::new(vec![fixed("transfer", 10)]).unwrap();
        hub.load(&mut registry).unwrap();

        let registered = hub
            .update(vec![fixed("issue", 100), fixed("transfer", 20)], &mut registry)
            .unwrap();
        assert_eq!(registered, 2);
        assert_eq!(hub.params(), &[fixed("transfer", 20), fixed("issue", 100)]);
        assert_eq!(hub.param("issue"), Some(&fixed("issue", 100)));
    }

    #[test]
    fn test_rejected_update_changes_nothing() {
        let mut registry = FeeCalculatorRegistry::new();
        registry.register_generator("transfer", fixed_fee_calculator_gen("BNB"));

        let mut hub = FeeParamHub::new(vec![fixed("transfer", 10)]).unwrap();
        hub.load(&mut registry).unwrap();

        let err = hub
            .update(vec![fixed("transfer", 30), fixed("", 1)], &mut registry)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFeeParam { .. }));
        assert_eq!(hub.params(), &[fixed("transfer", 10)]);
        assert_eq!(registry.calculator_count(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_genesis() {
        assert!(FeeParamHub::new(vec![fixed(" ", 1)]).is_err());
    }
}
