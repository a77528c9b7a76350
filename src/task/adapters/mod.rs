//! Adapter implementations of the task ports.

pub mod memory {
    //! In-memory adapters.

    mod task;

    pub use task::InMemoryTaskRepository;
}

pub mod postgres;
