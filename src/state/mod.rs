// Gateway module for state - follows the Train Station Pattern
// All external access must go through this gateway

mod store;

pub use store::{StateDocument, StateStore, Subscription};
