use super::*;

pub type ContractResult<A> = Result<A, Reject>;
