//! The three independent removal estimators
//!
//! Each estimator reads only its own slice of the input bundle and
//! produces a removal grid on the template plus a vector layer; there is
//! no shared state and no required ordering among them.

mod lake;
mod land;
pub(crate) mod stream;

pub use lake::{lake_regression, lake_removal, residence_times, LakeRemoval, LakeRemovalParams};
pub use land::{land_removal, unit_removal, LandRemoval, LandRemovalParams};
pub use stream::{segment_removal, stream_removal, StreamRemoval, StreamRemovalParams};
