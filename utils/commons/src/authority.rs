use crate::CustomContractError;
use concordium_std::*;

/// Privileged operator set of a contract instance.
///
/// Seeded with a single address on init. Every operator is allowed to run
/// the privileged entrypoints of the owning contract and to update this set.
#[derive(Debug, Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct Authority<S: HasStateApi> {
    operators: StateSet<Address, S>,
}

impl<S: HasStateApi> Authority<S> {
    pub fn new(state_builder: &mut StateBuilder<S>, operator: Address) -> Self {
        let mut operators = state_builder.new_set();
        operators.insert(operator);
        Self { operators }
    }

    pub fn has_operator_rights(&self, address: &Address) -> bool {
        self.operators.contains(address)
    }

    pub fn handle_update(
        &mut self,
        sender: Address,
        update: OperatorUpdateParams,
    ) -> Result<(), Reject> {
        ensure!(
            self.has_operator_rights(&sender),
            CustomContractError::Unauthorized.into()
        );

        match update.kind {
            OperatorUpdateKind::Remove => {
                self.operators.remove(&update.address);
            }
            OperatorUpdateKind::Add => {
                self.operators.insert(update.address);
            }
        }

        Ok(())
    }

    pub fn handle_view(&self, view: OperatorViewParams) -> Vec<Address> {
        self.operators
            .iter()
            .skip(view.skip as usize)
            .take(view.show as usize)
            .map(|a| *a)
            .collect()
    }
}

#[derive(Debug, SchemaType, Serialize)]
pub enum OperatorUpdateKind {
    Remove,
    Add,
}

#[derive(Debug, SchemaType, Serialize)]
pub struct OperatorUpdateParams {
    pub kind: OperatorUpdateKind,
    pub address: Address,
}

#[derive(Debug, SchemaType, Serialize)]
pub struct OperatorViewParams {
    pub skip: u32,
    pub show: u32,
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use concordium_std::test_infrastructure::*;

    const OPERATOR: AccountAddress = AccountAddress([1; 32]);
    const USER_1: AccountAddress = AccountAddress([16; 32]);
    const USER_2: AccountAddress = AccountAddress([17; 32]);

    fn default_authority() -> Authority<TestStateApi> {
        let mut state_builder = TestStateBuilder::new();
        Authority::new(&mut state_builder, Address::Account(OPERATOR))
    }

    #[concordium_test]
    fn test_operator_add() {
        let mut authority = default_authority();

        let result = authority.handle_update(
            Address::Account(OPERATOR),
            OperatorUpdateParams {
                kind: OperatorUpdateKind::Add,
                address: Address::Account(USER_1),
            },
        );
        claim_eq!(result, Ok(()));
        claim!(authority.has_operator_rights(&Address::Account(USER_1)));

        // The freshly added operator may add further operators
        let result = authority.handle_update(
            Address::Account(USER_1),
            OperatorUpdateParams {
                kind: OperatorUpdateKind::Add,
                address: Address::Account(USER_2),
            },
        );
        claim_eq!(result, Ok(()));
        claim!(authority.has_operator_rights(&Address::Account(USER_2)));
    }

    #[concordium_test]
    fn test_operator_add_unauthorized() {
        let mut authority = default_authority();

        let result = authority.handle_update(
            Address::Account(USER_1),
            OperatorUpdateParams {
                kind: OperatorUpdateKind::Add,
                address: Address::Account(USER_1),
            },
        );
        claim_eq!(result, Err(CustomContractError::Unauthorized.into()));
        claim!(!authority.has_operator_rights(&Address::Account(USER_1)));
    }

    #[concordium_test]
    fn test_operator_remove() {
        let mut authority = default_authority();

        let result = authority.handle_update(
            Address::Account(OPERATOR),
            OperatorUpdateParams {
                kind: OperatorUpdateKind::Add,
                address: Address::Account(USER_1),
            },
        );
        claim_eq!(result, Ok(()));

        let result = authority.handle_update(
            Address::Account(OPERATOR),
            OperatorUpdateParams {
                kind: OperatorUpdateKind::Remove,
                address: Address::Account(USER_1),
            },
        );
        claim_eq!(result, Ok(()));
        claim!(!authority.has_operator_rights(&Address::Account(USER_1)));

        // Removing an address that was never added is accepted and changes nothing
        let result = authority.handle_update(
            Address::Account(OPERATOR),
            OperatorUpdateParams {
                kind: OperatorUpdateKind::Remove,
                address: Address::Account(USER_2),
            },
        );
        claim_eq!(result, Ok(()));
    }

    #[concordium_test]
    fn test_operator_remove_self() {
        // The set is deliberately permissive: an operator may remove itself,
        // even if that leaves the set empty
        let mut authority = default_authority();

        let result = authority.handle_update(
            Address::Account(OPERATOR),
            OperatorUpdateParams {
                kind: OperatorUpdateKind::Remove,
                address: Address::Account(OPERATOR),
            },
        );
        claim_eq!(result, Ok(()));
        claim!(!authority.has_operator_rights(&Address::Account(OPERATOR)));

        let result = authority.handle_update(
            Address::Account(OPERATOR),
            OperatorUpdateParams {
                kind: OperatorUpdateKind::Add,
                address: Address::Account(OPERATOR),
            },
        );
        claim_eq!(result, Err(CustomContractError::Unauthorized.into()));
    }

    #[concordium_test]
    fn test_view_operators() {
        let mut authority = default_authority();

        for n in 16u8..48u8 {
            authority.operators.insert(Address::Account(AccountAddress([n; 32])));
        }

        let mut seen = 0u32;
        loop {
            let page = authority.handle_view(OperatorViewParams {
                skip: seen,
                show: 10,
            });
            for address in page.iter() {
                claim!(authority.has_operator_rights(address));
            }
            seen += page.len() as u32;
            if page.len() != 10 {
                break;
            }
        }

        // 32 inserted plus the seed operator
        claim_eq!(seen, 33);
    }
}
