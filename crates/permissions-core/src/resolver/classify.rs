//! Controller classification for action reporting.

use permissions_book_types::{ControllerClassification, ControllerRef};

use super::{ControllerResolver, OwnershipMode};

impl ControllerResolver<'_> {
    /// Classify one controller of a modifier on `enclosing_contract`.
    ///
    /// First match wins:
    /// 1. the controller's label is a steward name
    /// 2. the controller is a multisig (a steward if the enclosing contract is one)
    /// 3. the controller is a known contract with a steward name
    /// 4. administered resolution; a steward-labelled intermediate controller wins
    /// 5. unowned controllers are stewards by contract or label, otherwise external
    pub fn classify(
        &self,
        controller: &ControllerRef,
        enclosing_contract: &str,
    ) -> ControllerClassification {
        let config = self.config();
        let scope = self.scope();
        let label = scope.labels.get(&controller.address);

        if config.is_steward(label) {
            return ControllerClassification::Steward;
        }

        if controller.is_multisig() {
            return if config.is_steward(Some(enclosing_contract)) {
                ControllerClassification::Steward
            } else {
                ControllerClassification::MultiSig
            };
        }

        if scope
            .contracts
            .find_by_address(&controller.address)
            .is_some_and(|record| config.is_steward(Some(&record.name)))
        {
            return ControllerClassification::Steward;
        }

        let ownership = self.resolve(controller.address, OwnershipMode::Administered);
        if !ownership.owned {
            if config.is_steward(Some(enclosing_contract)) || config.is_steward(label) {
                return ControllerClassification::Steward;
            }
            return ControllerClassification::External;
        }

        if ownership
            .controller_address
            .is_some_and(|owner| config.is_steward(scope.labels.get(&owner)))
        {
            return ControllerClassification::Steward;
        }

        ownership.controller
    }
}
