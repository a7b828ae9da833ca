//! Day/night coverage rostering for therapy departments.
//!
//! Builds and maintains staffing rosters over fixed scheduling cycles:
//! every date has a day slot and a night slot, each needing a minimum
//! number of covering therapists and exactly one designated lead.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Therapist`, `WorkPattern`, `Cycle`,
//!   `Shift`, `AvailabilityOverride`
//! - **`availability`**: Per-date eligibility resolution with override
//!   precedence
//! - **`rotation`**: Round-robin candidate selection and worked-date
//!   tallies
//! - **`store`**: In-memory roster store enforcing uniqueness and the
//!   published-cycle freeze
//! - **`generator`**: Constrained greedy draft generation
//! - **`validate`**: Slot coverage/lead and weekly quota validators
//! - **`lead`**: Designated-lead mutation
//! - **`handler`**: Drag/drop action boundary with undo payloads
//! - **`publish`**: Validation-gated publish and reopen
//! - **`optimistic`**: Snapshot/rollback and single-flight edit guard
//!
//! # Flow
//!
//! A manager drafts a cycle with [`generator::generate_draft`], refines it
//! through [`handler::handle`] actions, watches the validators' reports,
//! and freezes the result with [`publish::publish_cycle`].

pub mod availability;
pub mod config;
pub mod error;
pub mod generator;
pub mod handler;
pub mod lead;
pub mod models;
pub mod optimistic;
pub mod publish;
pub mod rotation;
pub mod store;
pub mod validate;
