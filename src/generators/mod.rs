pub mod backend;
pub mod stub;

pub use backend::BackendClient;
pub use stub::{StubBucket, StubGenerator};
pub use crate::traits::generator::Generator;
