pub mod cluster;

pub use clusterd_store::core;

pub mod store {
    pub use clusterd_store::store::*;
}
