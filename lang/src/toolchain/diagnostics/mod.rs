//! Tools for the production and management of diagnostic feedback from the toolchain.
//!
//! This design loosely follows the Carbon toolchain design. The goal is to allow other parts of
//! the toolchain to emit diagnostic messages as structured types, decoupled from how (or whether)
//! those messages are shown to a user.
//!
//! Toolchain code constructs a [Diagnostic] and hands it to a [DiagnosticConsumer], which
//! delivers the diagnostic messages to the user. Subsystems that track their own location types
//! (such as token indices) implement [DiagnosticLocationTranslator] to convert them into source
//! locations.

pub mod diagnostic_emitter;
pub mod diagnostic_kind;

pub use diagnostic_emitter::DiagnosticConsumer;
pub use diagnostic_emitter::DiagnosticLocation;
pub use diagnostic_emitter::DiagnosticLocationTranslator;
pub use diagnostic_emitter::NullDiagnosticConsumer;
pub use diagnostic_emitter::StreamDiagnosticConsumer;
pub use diagnostic_emitter::VecDiagnosticConsumer;
pub use diagnostic_kind::DiagnosticKind;
