//! Action aggregation: which controller classes can perform each configured action.

use permissions_book_types::ControllerClassification;
use std::collections::{BTreeMap, BTreeSet};

use super::{ActionsConfig, ControllerResolver};

/// Action name → controller classes able to perform it.
pub type ActionControllers = BTreeMap<String, BTreeSet<ControllerClassification>>;

/// Every configured action appears in the result, possibly with an empty set.
pub fn aggregate(actions: &ActionsConfig, resolver: &ControllerResolver<'_>) -> ActionControllers {
    let scope = resolver.scope();
    let config = resolver.config();
    let mut result = ActionControllers::new();

    for (action, functions) in actions.iter() {
        let classes = result.entry(action.clone()).or_default();
        let pinned = config.is_governance_only(action);

        for record in scope.contracts.iter() {
            for modifier in record.modifiers.iter().filter(|m| m.gates_any(functions)) {
                if pinned {
                    classes.insert(ControllerClassification::governance(scope.restricted));
                    continue;
                }
                for controller in &modifier.controllers {
                    classes.insert(resolver.classify(controller, &record.name));
                }
            }
        }
    }

    result
}
