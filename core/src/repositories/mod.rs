pub mod verification;

pub use verification::{
    apply_transition, check_transition, InMemoryVerificationStore, StateMutator, VerificationStore,
};
