//! everlock-engine
//!
//! The asset-locking protocol engine: per-policy lock and unlock planning,
//! transaction building and balancing, and the confirm → sign → submit
//! controller, tied together by two end-to-end flows. All steps inside one
//! flow run strictly sequentially; every flow re-fetches authoritative chain
//! state and recovers every error at its own boundary.

pub mod builder;
pub mod datum;
pub mod flows;
pub mod planner;
pub mod submit;

pub use builder::{build_lock_tx, build_unlock_tx};
pub use datum::{LockDatum, UnlockRedeemer};
pub use flows::{lock_asset, unlock_asset};
pub use planner::{
    plan_lock, plan_unlock, prepare_lock, prepare_unlock, LockContext, LockIntent, LockPlan,
    UnlockIntent, UnlockPlan,
};
pub use submit::{confirm_sign_submit, Outcome};
