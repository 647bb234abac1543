//! Registry of fee policies keyed by message type.

use crate::calculator::{FeeCalculator, FeeCalculatorGenerator};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Message type -> fee calculator, plus the generators used to rebuild
/// calculators when governance parameters change.
///
/// Unlike the route table, re-registering a message type overwrites the
/// previous entry. Owned by the application and mutated only on the
/// sequential block execution path.
#[derive(Default)]
pub struct FeeCalculatorRegistry {
    calculators: HashMap<String, FeeCalculator>,
    generators: HashMap<String, FeeCalculatorGenerator>,
}

impl FeeCalculatorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `calculator` to `msg_type`, replacing any previous one.
    pub fn register_calculator(&mut self, msg_type: impl Into<String>, calculator: FeeCalculator) {
        let msg_type = msg_type.into();
        debug!(msg_type = %msg_type, "registering fee calculator");
        self.calculators.insert(msg_type, calculator);
    }

    /// Binds `generator` to `msg_type`, replacing any previous one.
    pub fn register_generator(
        &mut self,
        msg_type: impl Into<String>,
        generator: FeeCalculatorGenerator,
    ) {
        let msg_type = msg_type.into();
        debug!(msg_type = %msg_type, "registering fee calculator generator");
        self.generators.insert(msg_type, generator);
    }

    /// Calculator bound to `msg_type`. `None` means no fee applies.
    pub fn get_calculator(&self, msg_type: &str) -> Option<FeeCalculator> {
        self.calculators.get(msg_type).cloned()
    }

    /// Generator bound to `msg_type`
    pub fn get_generator(&self, msg_type: &str) -> Option<FeeCalculatorGenerator> {
        self.generators.get(msg_type).cloned()
    }

    /// Removes every calculator. Generators stay registered.
    pub fn unset_all(&mut self) {
        debug!(count = self.calculators.len(), "unsetting all fee calculators");
        self.calculators.clear();
    }

    /// Number of bound calculators
    pub fn calculator_count(&self) -> usize {
        self.calculators.len()
    }

    /// Message types with a bound calculator, sorted
    pub fn priced_msg_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.calculators.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Debug for FeeCalculatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut generators: Vec<&String> = self.generators.keys().collect();
        generators.sort_unstable();
        f.debug_struct("FeeCalculatorRegistry")
            .field("calculators", &self.priced_msg_types())
            .field("generators", &generators)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{fixed_fee_calculator, fixed_fee_calculator_gen};
    use crate::params::{FeeParam, FixedFeeParams};
    use chainfee_core::{Fee, FeeDistributeType, Msg};
    use std::any::Any;

    #[derive(Debug)]
    struct Transfer;

    impl Msg for Transfer {
        fn msg_type(&self) -> &str {
            "transfer"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_missing_calculator_is_none() {
        let registry = FeeCalculatorRegistry::new();
        assert!(registry.get_calculator("transfer").is_none());
        assert!(registry.get_generator("transfer").is_none());
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = FeeCalculatorRegistry::new();
        registry.register_calculator(
            "transfer",
            fixed_fee_calculator(10, FeeDistributeType::ForAll, "BNB"),
        );
        registry.register_calculator(
            "transfer",
            fixed_fee_calculator(20, FeeDistributeType::ForProposer, "BNB"),
        );
        assert_eq!(registry.calculator_count(), 1);

        let calc = registry.get_calculator("transfer").unwrap();
        assert_eq!(
            calc(&Transfer),
            Fee::single("BNB", 20, FeeDistributeType::ForProposer)
        );
    }

    #[test]
    fn test_unset_all_keeps_generators() {
        let mut registry = FeeCalculatorRegistry::new();
        registry.register_generator("transfer", fixed_fee_calculator_gen("BNB"));
        registry.register_calculator(
            "transfer",
            fixed_fee_calculator(10, FeeDistributeType::ForAll, "BNB"),
        );
        registry.register_calculator(
            "vote",
            fixed_fee_calculator(1, FeeDistributeType::ForAll, "BNB"),
        );

        registry.unset_all();
        assert_eq!(registry.calculator_count(), 0);
        assert!(registry.get_calculator("transfer").is_none());

        let generator = registry.get_generator("transfer").unwrap();
        let param = FeeParam::from(FixedFeeParams::new("transfer", 3, FeeDistributeType::ForAll));
        registry.register_calculator("transfer", generator(&param));
        assert_eq!(registry.priced_msg_types(), vec!["transfer"]);
    }
}
